//! OFDM block construction and recovery with a cyclic prefix
//!
//! Transmit: symbols are laid into an `N × blocks` grid column by column,
//! each column is inverse-transformed and the last `cp_len` samples are
//! copied to its front. Receive undoes this block by block.
//!
//! Block layout:
//! [CP: last cp_len samples] [IFFT output: N samples] [next block...]

use crate::error::{Result, SimError};
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::sync::Arc;

/// Frequency- or time-domain samples arranged as `subcarriers` rows by `blocks` columns
///
/// Stored column-major: column `b` occupies `data[b*N .. (b+1)*N]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OfdmGrid {
    subcarriers: usize,
    blocks: usize,
    data: Vec<Complex64>,
}

impl OfdmGrid {
    pub fn new(subcarriers: usize, blocks: usize, data: Vec<Complex64>) -> Result<Self> {
        let expected = subcarriers * blocks;
        if data.len() != expected {
            return Err(SimError::GridMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            subcarriers,
            blocks,
            data,
        })
    }

    /// Zero-pad `symbols` to whole blocks of `subcarriers` and lay them out by column
    pub fn from_symbols(symbols: &[Complex64], subcarriers: usize) -> Result<Self> {
        if subcarriers == 0 {
            return Err(SimError::InvalidConfig("subcarrier count must be positive".to_string()));
        }
        let blocks = symbols.len().div_ceil(subcarriers);
        let mut data = symbols.to_vec();
        data.resize(blocks * subcarriers, Complex64::new(0.0, 0.0));
        Ok(Self {
            subcarriers,
            blocks,
            data,
        })
    }

    pub fn subcarriers(&self) -> usize {
        self.subcarriers
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn column(&self, block: usize) -> &[Complex64] {
        &self.data[block * self.subcarriers..(block + 1) * self.subcarriers]
    }

    pub fn columns(&self) -> impl Iterator<Item = &[Complex64]> {
        self.data.chunks_exact(self.subcarriers.max(1))
    }

    /// Read columns in order, subcarriers in order within each column
    pub fn into_symbols(self) -> Vec<Complex64> {
        self.data
    }

    pub fn as_symbols(&self) -> &[Complex64] {
        &self.data
    }
}

/// One transmitted block: cyclic prefix followed by the time-domain samples
#[derive(Debug, Clone, PartialEq)]
pub struct OfdmBlock {
    cp_len: usize,
    samples: Vec<Complex64>,
}

impl OfdmBlock {
    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    pub fn cyclic_prefix(&self) -> &[Complex64] {
        &self.samples[..self.cp_len]
    }

    /// The `N` samples after the prefix
    pub fn body(&self) -> &[Complex64] {
        &self.samples[self.cp_len..]
    }
}

pub struct OfdmModulator {
    ifft: Arc<dyn Fft<f64>>,
    subcarriers: usize,
    cp_len: usize,
}

pub struct OfdmDemodulator {
    fft: Arc<dyn Fft<f64>>,
    subcarriers: usize,
    cp_len: usize,
}

impl OfdmModulator {
    pub fn new(subcarriers: usize, cp_len: usize) -> Result<Self> {
        check_dimensions(subcarriers, cp_len)?;
        let mut planner = FftPlanner::new();
        Ok(Self {
            ifft: planner.plan_fft_inverse(subcarriers),
            subcarriers,
            cp_len,
        })
    }

    pub fn build_grid(&self, symbols: &[Complex64]) -> Result<OfdmGrid> {
        OfdmGrid::from_symbols(symbols, self.subcarriers)
    }

    /// Inverse-transform each column and prepend its cyclic prefix
    ///
    /// The inverse transform is scaled by `1/N` so the receiver's unscaled
    /// forward transform restores the grid exactly.
    pub fn to_time_domain(&self, grid: &OfdmGrid) -> Result<Vec<OfdmBlock>> {
        if grid.subcarriers() != self.subcarriers {
            return Err(SimError::GridMismatch {
                expected: self.subcarriers,
                actual: grid.subcarriers(),
            });
        }

        let scale = 1.0 / self.subcarriers as f64;
        let blocks = grid
            .columns()
            .map(|column| {
                let mut time_domain = column.to_vec();
                self.ifft.process(&mut time_domain);
                for sample in time_domain.iter_mut() {
                    *sample *= scale;
                }

                let mut samples = Vec::with_capacity(self.block_len());
                samples.extend_from_slice(&time_domain[self.subcarriers - self.cp_len..]);
                samples.extend_from_slice(&time_domain);
                OfdmBlock {
                    cp_len: self.cp_len,
                    samples,
                }
            })
            .collect();
        Ok(blocks)
    }

    /// Concatenate blocks in order into one waveform
    pub fn flatten(blocks: &[OfdmBlock]) -> Vec<Complex64> {
        blocks
            .iter()
            .flat_map(|block| block.samples.iter().copied())
            .collect()
    }

    /// Symbols to waveform in one pass
    pub fn modulate(&self, symbols: &[Complex64]) -> Result<Vec<Complex64>> {
        let grid = self.build_grid(symbols)?;
        let blocks = self.to_time_domain(&grid)?;
        log::debug!(
            "modulated {} symbols into {} blocks of {} samples",
            symbols.len(),
            blocks.len(),
            self.block_len()
        );
        Ok(Self::flatten(&blocks))
    }

    pub fn block_len(&self) -> usize {
        self.subcarriers + self.cp_len
    }
}

impl OfdmDemodulator {
    pub fn new(subcarriers: usize, cp_len: usize) -> Result<Self> {
        check_dimensions(subcarriers, cp_len)?;
        let mut planner = FftPlanner::new();
        Ok(Self {
            fft: planner.plan_fft_forward(subcarriers),
            subcarriers,
            cp_len,
        })
    }

    /// Split a waveform into blocks and drop each block's cyclic prefix
    pub fn to_blocks(&self, waveform: &[Complex64]) -> Result<OfdmGrid> {
        let block_len = self.block_len();
        if waveform.len() % block_len != 0 {
            return Err(SimError::ShapeMismatch {
                len: waveform.len(),
                block_len,
            });
        }

        let blocks = waveform.len() / block_len;
        let mut data = Vec::with_capacity(blocks * self.subcarriers);
        for block in waveform.chunks_exact(block_len) {
            data.extend_from_slice(&block[self.cp_len..]);
        }
        OfdmGrid::new(self.subcarriers, blocks, data)
    }

    /// Forward-transform each column
    pub fn to_frequency_domain(&self, grid: OfdmGrid) -> Result<OfdmGrid> {
        if grid.subcarriers() != self.subcarriers {
            return Err(SimError::GridMismatch {
                expected: self.subcarriers,
                actual: grid.subcarriers(),
            });
        }

        let OfdmGrid {
            subcarriers,
            blocks,
            mut data,
        } = grid;
        if !data.is_empty() {
            self.fft.process(&mut data);
        }
        Ok(OfdmGrid {
            subcarriers,
            blocks,
            data,
        })
    }

    /// Waveform to recovered symbols, including any zero padding
    pub fn demodulate(&self, waveform: &[Complex64]) -> Result<Vec<Complex64>> {
        let grid = self.to_frequency_domain(self.to_blocks(waveform)?)?;
        Ok(grid.into_symbols())
    }

    pub fn block_len(&self) -> usize {
        self.subcarriers + self.cp_len
    }
}

fn check_dimensions(subcarriers: usize, cp_len: usize) -> Result<()> {
    if subcarriers == 0 {
        return Err(SimError::InvalidConfig("subcarrier count must be positive".to_string()));
    }
    if cp_len >= subcarriers {
        return Err(SimError::InvalidConfig(format!(
            "cyclic prefix length {} must be less than subcarrier count {}",
            cp_len, subcarriers
        )));
    }
    Ok(())
}
