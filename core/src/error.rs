use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Waveform of {len} samples is not a whole number of {block_len}-sample blocks")]
    ShapeMismatch { len: usize, block_len: usize },

    #[error("Grid holds {actual} samples, dimensions require {expected}")]
    GridMismatch { expected: usize, actual: usize },

    #[error("Symbol index {index} outside constellation of order {order}")]
    SymbolOutOfRange { index: u32, order: usize },

    #[error("Sweep has no SNR values")]
    EmptySweep,
}

pub type Result<T> = std::result::Result<T, SimError>;
