//! Additive white Gaussian noise channel
//!
//! Noise is circularly symmetric: real and imaginary parts are independent
//! standard normal draws scaled by `1/√2`, then by `√noise_power`.

use crate::config::NoiseScaling;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rustfft::num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

pub struct AwgnChannel {
    scaling: NoiseScaling,
    rng: ChaCha8Rng,
}

impl AwgnChannel {
    /// Channel seeded from OS entropy; noise differs on every run
    pub fn new(scaling: NoiseScaling) -> Self {
        Self {
            scaling,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn seeded(scaling: NoiseScaling, seed: u64) -> Self {
        Self::from_rng(scaling, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_rng(scaling: NoiseScaling, rng: ChaCha8Rng) -> Self {
        Self { scaling, rng }
    }

    /// Noise power added per sample at the given SNR
    pub fn noise_power(&self, waveform: &[Complex64], snr_db: f64) -> f64 {
        let nominal = nominal_noise_power(snr_db);
        match self.scaling {
            NoiseScaling::Nominal => nominal,
            NoiseScaling::SignalPower => mean_power(waveform) * nominal,
        }
    }

    /// Return `waveform + noise·√noise_power`
    pub fn apply(&mut self, waveform: &[Complex64], snr_db: f64) -> Vec<Complex64> {
        let amplitude = self.noise_power(waveform, snr_db).sqrt();
        waveform
            .iter()
            .map(|&sample| sample + self.unit_noise() * amplitude)
            .collect()
    }

    /// One complex noise sample with unit total variance
    fn unit_noise(&mut self) -> Complex64 {
        let re: f64 = StandardNormal.sample(&mut self.rng);
        let im: f64 = StandardNormal.sample(&mut self.rng);
        Complex64::new(re, im) * FRAC_1_SQRT_2
    }
}

/// `10^(-snr_db/10)`
pub fn nominal_noise_power(snr_db: f64) -> f64 {
    10f64.powf(-snr_db / 10.0)
}

/// Mean `|x|²` of a waveform; zero for an empty waveform
pub fn mean_power(waveform: &[Complex64]) -> f64 {
    if waveform.is_empty() {
        return 0.0;
    }
    waveform.iter().map(|s| s.norm_sqr()).sum::<f64>() / waveform.len() as f64
}
