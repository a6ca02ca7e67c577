//! JSON views of simulation results for external plotting tools

use ofdmsim_core::{Complex64, Reception, SimConfig, SpectrumPoint, SweepResult, Transmission};
use serde::Serialize;

#[derive(Serialize)]
pub struct ConfigReport {
    pub sample_rate: f64,
    pub carrier_frequency: f64,
    pub subcarriers: usize,
    pub cp_len: usize,
    pub order: usize,
    pub bits_per_symbol: usize,
    pub constellation: String,
    pub noise_scaling: String,
    pub byte_repacking: String,
    pub seed: Option<u64>,
}

impl From<&SimConfig> for ConfigReport {
    fn from(config: &SimConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            carrier_frequency: config.carrier_frequency,
            subcarriers: config.subcarriers,
            cp_len: config.cp_len,
            order: config.order,
            bits_per_symbol: config.bits_per_symbol(),
            constellation: format!("{:?}", config.constellation),
            noise_scaling: format!("{:?}", config.noise_scaling),
            byte_repacking: format!("{:?}", config.byte_repacking),
            seed: config.seed,
        }
    }
}

#[derive(Serialize)]
pub struct SweepPointReport {
    pub snr_db: f64,
    pub errors: usize,
    pub symbols: usize,
    pub error_rate: f64,
}

#[derive(Serialize)]
pub struct SweepReport {
    pub config: ConfigReport,
    pub points: Vec<SweepPointReport>,
}

impl SweepReport {
    pub fn new(config: &SimConfig, result: &SweepResult) -> Self {
        Self {
            config: config.into(),
            points: result
                .points()
                .iter()
                .map(|p| SweepPointReport {
                    snr_db: p.snr_db,
                    errors: p.errors,
                    symbols: p.symbols,
                    error_rate: p.error_rate,
                })
                .collect(),
        }
    }
}

/// Real and imaginary parts as parallel arrays
#[derive(Serialize)]
pub struct ComplexSeries {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl From<&[Complex64]> for ComplexSeries {
    fn from(samples: &[Complex64]) -> Self {
        Self {
            re: samples.iter().map(|s| s.re).collect(),
            im: samples.iter().map(|s| s.im).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct SpectrumReport {
    pub frequency_hz: Vec<f64>,
    pub magnitude: Vec<f64>,
}

impl From<&[SpectrumPoint]> for SpectrumReport {
    fn from(points: &[SpectrumPoint]) -> Self {
        Self {
            frequency_hz: points.iter().map(|p| p.frequency_hz).collect(),
            magnitude: points.iter().map(|p| p.magnitude).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct TransmitReport {
    pub config: ConfigReport,
    pub snr_db: f64,
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub payload_matches: bool,
    pub symbols: usize,
    pub blocks: usize,
    pub errors: usize,
    pub error_rate: f64,
    pub spectrum: SpectrumReport,
    pub constellation: ComplexSeries,
    pub tx_waveform: ComplexSeries,
    pub rx_waveform: ComplexSeries,
}

impl TransmitReport {
    pub fn new(
        config: &SimConfig,
        payload: &[u8],
        tx: &Transmission,
        rx: &Reception,
        spectrum: &[SpectrumPoint],
    ) -> Self {
        Self {
            config: config.into(),
            snr_db: rx.snr_db,
            input_bytes: payload.len(),
            output_bytes: rx.payload.len(),
            payload_matches: rx.payload == payload,
            symbols: tx.indices.len(),
            blocks: tx.blocks,
            errors: rx.errors,
            error_rate: rx.error_rate,
            spectrum: spectrum.into(),
            constellation: rx.symbols.as_slice().into(),
            tx_waveform: tx.waveform.as_slice().into(),
            rx_waveform: rx.waveform.as_slice().into(),
        }
    }
}
