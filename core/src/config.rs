use crate::error::{Result, SimError};
use crate::{
    CARRIER_FREQUENCY, CP_LEN, MODULATION_ORDER, NUM_SUBCARRIERS, OPERATING_SNR_DB, SAMPLE_RATE,
    SWEEP_SNR_START_DB, SWEEP_SNR_STEP_DB, SWEEP_SNR_STOP_DB,
};

/// Widest symbol the mappers accept; indices are carried as `u32`.
pub const MAX_BITS_PER_SYMBOL: usize = 16;

/// Most SNR points a single sweep may hold
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// How symbol indices are placed on the complex plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Constellation {
    /// `2·index − 1 − j`, recovered by rounding the real part
    #[default]
    Reference,
    /// Gray-coded rectangular QAM with odd-integer levels on both axes
    GrayQam,
}

/// How the channel turns an SNR in dB into a noise power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseScaling {
    /// `10^(-snr/10)` regardless of the signal level
    #[default]
    Nominal,
    /// Scaled by the measured mean power of the waveform
    SignalPower,
}

/// How recovered symbol values are turned back into output bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteRepacking {
    /// One byte per recovered value, truncated to the input byte count
    #[default]
    Reference,
    /// `k` bits per recovered value, truncated to the input bit count
    Symbols,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Sample rate in Hz; only used to label spectrum frequencies
    pub sample_rate: f64,
    /// Carrier frequency in Hz; carried for reporting, never used in computation
    pub carrier_frequency: f64,
    pub subcarriers: usize,
    pub cp_len: usize,
    /// Constellation size M
    pub order: usize,
    /// Nominal operating SNR for the single receive pass
    pub snr_db: f64,
    pub sweep_snr_db: Vec<f64>,
    pub constellation: Constellation,
    pub noise_scaling: NoiseScaling,
    pub byte_repacking: ByteRepacking,
    /// Fixed noise seed; `None` draws from OS entropy on every trial
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            carrier_frequency: CARRIER_FREQUENCY,
            subcarriers: NUM_SUBCARRIERS,
            cp_len: CP_LEN,
            order: MODULATION_ORDER,
            snr_db: OPERATING_SNR_DB,
            sweep_snr_db: snr_range(SWEEP_SNR_START_DB, SWEEP_SNR_STOP_DB, SWEEP_SNR_STEP_DB)
                .unwrap_or_default(),
            constellation: Constellation::default(),
            noise_scaling: NoiseScaling::default(),
            byte_repacking: ByteRepacking::default(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Bits carried by one symbol, `log2(order)`
    pub fn bits_per_symbol(&self) -> usize {
        self.order.trailing_zeros() as usize
    }

    /// Samples per transmitted block including the cyclic prefix
    pub fn block_len(&self) -> usize {
        self.subcarriers + self.cp_len
    }

    pub fn validate(&self) -> Result<()> {
        if self.subcarriers == 0 {
            return Err(SimError::InvalidConfig("subcarrier count must be positive".to_string()));
        }
        if self.cp_len >= self.subcarriers {
            return Err(SimError::InvalidConfig(format!(
                "cyclic prefix length {} must be less than subcarrier count {}",
                self.cp_len, self.subcarriers
            )));
        }
        if self.order < 2 || !self.order.is_power_of_two() {
            return Err(SimError::InvalidConfig(format!(
                "constellation order {} must be a power of two of at least 2",
                self.order
            )));
        }
        if self.bits_per_symbol() > MAX_BITS_PER_SYMBOL {
            return Err(SimError::InvalidConfig(format!(
                "constellation order {} exceeds {} bits per symbol",
                self.order, MAX_BITS_PER_SYMBOL
            )));
        }
        if !self.snr_db.is_finite() {
            return Err(SimError::InvalidConfig("operating SNR must be finite".to_string()));
        }
        if self.sweep_snr_db.is_empty() {
            return Err(SimError::EmptySweep);
        }
        if self.sweep_snr_db.len() > MAX_SWEEP_POINTS {
            return Err(SimError::InvalidConfig(format!(
                "sweep of {} SNR values exceeds {} points",
                self.sweep_snr_db.len(),
                MAX_SWEEP_POINTS
            )));
        }
        if let Some(bad) = self.sweep_snr_db.iter().find(|snr| !snr.is_finite()) {
            return Err(SimError::InvalidConfig(format!("sweep SNR {} is not finite", bad)));
        }
        Ok(())
    }
}

/// SNR values from `start` up to but excluding `stop`, like a half-open range
///
/// An empty range (`stop <= start`) is returned as-is and left for
/// [`SimConfig::validate`] to reject.
pub fn snr_range(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(SimError::InvalidConfig(format!(
            "sweep bounds {} to {} must be finite",
            start, stop
        )));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(SimError::InvalidConfig(format!(
            "sweep step {} must be positive and finite",
            step
        )));
    }

    let count = ((stop - start) / step).ceil().max(0.0);
    if count > MAX_SWEEP_POINTS as f64 {
        return Err(SimError::InvalidConfig(format!(
            "sweep from {} to {} in steps of {} exceeds {} points",
            start, stop, step, MAX_SWEEP_POINTS
        )));
    }
    Ok((0..count as usize).map(|i| start + i as f64 * step).collect())
}
