//! Symbol error rate versus SNR
//!
//! Every trial draws fresh noise, pushes the transmitted waveform through
//! the channel, the OFDM demodulator and the demapper, and counts symbols
//! whose recovered value differs from the transmitted index. Trials share
//! only read-only inputs, so they can run in any order or concurrently.

use crate::channel::AwgnChannel;
use crate::config::NoiseScaling;
use crate::error::{Result, SimError};
use crate::mapper::SymbolMapper;
use crate::ofdm::OfdmDemodulator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub snr_db: f64,
    pub errors: usize,
    pub symbols: usize,
    /// `errors / symbols`, counted per symbol rather than per bit
    pub error_rate: f64,
}

/// One point per configured SNR, in configured order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepResult {
    points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn snr_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.snr_db).collect()
    }

    pub fn error_rates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.error_rate).collect()
    }

    /// Error rate recorded for an SNR value, if it was part of the sweep
    pub fn error_rate(&self, snr_db: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.snr_db == snr_db)
            .map(|p| p.error_rate)
    }
}

pub struct SweepEvaluator<'a> {
    demodulator: &'a OfdmDemodulator,
    mapper: &'a dyn SymbolMapper,
    noise_scaling: NoiseScaling,
    seed: Option<u64>,
}

impl<'a> SweepEvaluator<'a> {
    pub fn new(
        demodulator: &'a OfdmDemodulator,
        mapper: &'a dyn SymbolMapper,
        noise_scaling: NoiseScaling,
    ) -> Self {
        Self {
            demodulator,
            mapper,
            noise_scaling,
            seed: None,
        }
    }

    /// Fix the noise of every trial; trial `i` uses ChaCha stream `i` of this seed
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn run(&self, original: &[u32], waveform: &[Complex64], snr_values: &[f64]) -> Result<SweepResult> {
        if snr_values.is_empty() {
            return Err(SimError::EmptySweep);
        }
        let points = snr_values
            .iter()
            .enumerate()
            .map(|(trial, &snr_db)| self.trial(trial, original, waveform, snr_db))
            .collect::<Result<Vec<_>>>()?;
        Ok(SweepResult { points })
    }

    /// Same as [`run`](Self::run) with one rayon task per SNR value
    pub fn run_parallel(
        &self,
        original: &[u32],
        waveform: &[Complex64],
        snr_values: &[f64],
    ) -> Result<SweepResult> {
        if snr_values.is_empty() {
            return Err(SimError::EmptySweep);
        }
        let points = snr_values
            .par_iter()
            .enumerate()
            .map(|(trial, &snr_db)| self.trial(trial, original, waveform, snr_db))
            .collect::<Result<Vec<_>>>()?;
        Ok(SweepResult { points })
    }

    fn trial(&self, trial: usize, original: &[u32], waveform: &[Complex64], snr_db: f64) -> Result<SweepPoint> {
        let mut channel = self.channel(trial);
        let received = channel.apply(waveform, snr_db);
        let symbols = self.demodulator.demodulate(&received)?;
        if symbols.len() < original.len() {
            return Err(SimError::GridMismatch {
                expected: original.len(),
                actual: symbols.len(),
            });
        }

        let recovered = self.mapper.demap_all(&symbols[..original.len()]);
        let errors = count_mismatches(original, &recovered);
        let point = SweepPoint {
            snr_db,
            errors,
            symbols: original.len(),
            error_rate: error_rate(errors, original.len()),
        };
        log::info!(
            "SNR {:>5.1} dB: {} / {} symbol errors (rate {:.6})",
            snr_db,
            errors,
            point.symbols,
            point.error_rate
        );
        Ok(point)
    }

    fn channel(&self, trial: usize) -> AwgnChannel {
        match self.seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(trial as u64);
                AwgnChannel::from_rng(self.noise_scaling, rng)
            }
            None => AwgnChannel::new(self.noise_scaling),
        }
    }
}

/// Positions where the recovered value differs from the transmitted index
pub fn count_mismatches(original: &[u32], recovered: &[i64]) -> usize {
    original
        .iter()
        .zip(recovered)
        .filter(|&(&sent, &got)| i64::from(sent) != got)
        .count()
}

/// `errors / total`, or zero when nothing was sent
pub fn error_rate(errors: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        errors as f64 / total as f64
    }
}
