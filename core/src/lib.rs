//! OFDM transceiver simulation over an additive white Gaussian noise channel
//!
//! Bytes are framed into `k`-bit symbols, mapped onto a constellation, carried
//! on cyclic-prefixed OFDM blocks through a noisy channel and recovered again.
//! The sweep measures how the symbol error rate changes with SNR.

pub mod error;
pub mod config;
pub mod framing;
pub mod mapper;
pub mod ofdm;
pub mod channel;
pub mod sweep;
pub mod spectrum;
pub mod transceiver;

pub use channel::AwgnChannel;
pub use config::{ByteRepacking, Constellation, NoiseScaling, SimConfig};
pub use error::{Result, SimError};
pub use mapper::{GrayQamMapper, ReferenceMapper, SymbolMapper};
pub use ofdm::{OfdmBlock, OfdmDemodulator, OfdmGrid, OfdmModulator};
pub use rustfft::num_complex::Complex64;
pub use spectrum::{spectrum, SpectrumPoint};
pub use sweep::{SweepEvaluator, SweepPoint, SweepResult};
pub use transceiver::{Reception, Transceiver, Transmission};

// Signal configuration
pub const SAMPLE_RATE: f64 = 20e6; // Hz
pub const CARRIER_FREQUENCY: f64 = 2.4e9; // Hz, not used by any computation

// OFDM configuration
pub const NUM_SUBCARRIERS: usize = 64;
pub const CP_LEN: usize = 16;

// Modulation configuration
pub const MODULATION_ORDER: usize = 16;
pub const BITS_PER_SYMBOL: usize = 4; // log2(MODULATION_ORDER)

// Channel configuration
pub const OPERATING_SNR_DB: f64 = 30.0;
pub const SWEEP_SNR_START_DB: f64 = 0.0;
pub const SWEEP_SNR_STOP_DB: f64 = 35.0; // exclusive
pub const SWEEP_SNR_STEP_DB: f64 = 5.0;
