//! Symbol mapping between `k`-bit indices and complex constellation points

use crate::config::Constellation;
use crate::error::{Result, SimError};
use rustfft::num_complex::{Complex, Complex64};

pub trait SymbolMapper: Send + Sync {
    /// Bits per symbol `k`
    fn bits_per_symbol(&self) -> usize;

    /// Map one index in `[0, 2^k)` to a constellation point
    fn map(&self, index: u32) -> Complex64;

    /// Recover the value compared against the transmitted index
    ///
    /// Never fails; a heavily distorted symbol still produces a value.
    fn demap(&self, symbol: Complex64) -> i64;

    fn order(&self) -> usize {
        1 << self.bits_per_symbol()
    }

    /// Map a whole index sequence, rejecting indices outside the constellation
    fn map_all(&self, indices: &[u32]) -> Result<Vec<Complex64>> {
        let order = self.order();
        indices
            .iter()
            .map(|&index| {
                if index as usize >= order {
                    Err(SimError::SymbolOutOfRange { index, order })
                } else {
                    Ok(self.map(index))
                }
            })
            .collect()
    }

    fn demap_all(&self, symbols: &[Complex64]) -> Vec<i64> {
        symbols.iter().map(|&symbol| self.demap(symbol)).collect()
    }
}

impl Constellation {
    pub fn mapper(self, bits_per_symbol: usize) -> Box<dyn SymbolMapper> {
        match self {
            Constellation::Reference => Box::new(ReferenceMapper::new(bits_per_symbol)),
            Constellation::GrayQam => Box::new(GrayQamMapper::new(bits_per_symbol)),
        }
    }
}

/// Pulse-amplitude style mapping: real part `2·index − 1`, imaginary part `−1`
///
/// The whole index rides on the real axis, so the imaginary axis carries no
/// information and the rounded real part is `2·index − 1`, not `index`.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceMapper {
    bits_per_symbol: usize,
}

impl ReferenceMapper {
    pub fn new(bits_per_symbol: usize) -> Self {
        Self { bits_per_symbol }
    }

    /// Round both axes independently to the nearest integer
    pub fn demap_components(&self, symbol: Complex64) -> Complex<i64> {
        Complex::new(symbol.re.round() as i64, symbol.im.round() as i64)
    }
}

impl SymbolMapper for ReferenceMapper {
    fn bits_per_symbol(&self) -> usize {
        self.bits_per_symbol
    }

    fn map(&self, index: u32) -> Complex64 {
        // the index is real-valued, so its imaginary part is always zero
        let value = Complex64::new(index as f64, 0.0);
        Complex64::new(2.0 * value.re - 1.0, 2.0 * value.im - 1.0)
    }

    fn demap(&self, symbol: Complex64) -> i64 {
        self.demap_components(symbol).re
    }
}

/// Gray-coded rectangular QAM
///
/// The high `ceil(k/2)` bits pick the in-phase level and the low `floor(k/2)`
/// bits the quadrature level. Levels are the odd integers `2p − (m − 1)`.
#[derive(Debug, Clone, Copy)]
pub struct GrayQamMapper {
    bits_per_symbol: usize,
    i_bits: usize,
    q_bits: usize,
}

impl GrayQamMapper {
    pub fn new(bits_per_symbol: usize) -> Self {
        let i_bits = bits_per_symbol.div_ceil(2);
        Self {
            bits_per_symbol,
            i_bits,
            q_bits: bits_per_symbol - i_bits,
        }
    }

    fn level(position: u32, bits: usize) -> f64 {
        let levels = (1u32 << bits) as f64;
        2.0 * position as f64 - (levels - 1.0)
    }

    /// Nearest level position on one axis
    fn slice(value: f64, bits: usize) -> u32 {
        let levels = 1i64 << bits;
        let position = ((value + (levels - 1) as f64) / 2.0).round() as i64;
        position.clamp(0, levels - 1) as u32
    }
}

fn gray_encode(value: u32) -> u32 {
    value ^ (value >> 1)
}

fn gray_decode(mut gray: u32) -> u32 {
    let mut value = gray;
    while gray > 0 {
        gray >>= 1;
        value ^= gray;
    }
    value
}

impl SymbolMapper for GrayQamMapper {
    fn bits_per_symbol(&self) -> usize {
        self.bits_per_symbol
    }

    fn map(&self, index: u32) -> Complex64 {
        let q_mask = (1u32 << self.q_bits) - 1;
        let i_position = gray_decode(index >> self.q_bits);
        let q_position = gray_decode(index & q_mask);
        Complex64::new(
            Self::level(i_position, self.i_bits),
            Self::level(q_position, self.q_bits),
        )
    }

    fn demap(&self, symbol: Complex64) -> i64 {
        let i_code = gray_encode(Self::slice(symbol.re, self.i_bits));
        let q_code = gray_encode(Self::slice(symbol.im, self.q_bits));
        i64::from((i_code << self.q_bits) | q_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_mapping_values() {
        let mapper = ReferenceMapper::new(4);
        assert_eq!(mapper.map(0), Complex64::new(-1.0, -1.0));
        assert_eq!(mapper.map(1), Complex64::new(1.0, -1.0));
        assert_eq!(mapper.map(15), Complex64::new(29.0, -1.0));
    }

    #[test]
    fn test_reference_imaginary_axis_constant() {
        let mapper = ReferenceMapper::new(4);
        assert!((0..16).all(|i| mapper.map(i).im == -1.0));
    }

    #[test]
    fn test_reference_demap_rounds_components() {
        let mapper = ReferenceMapper::new(4);
        let pair = mapper.demap_components(Complex64::new(28.6, -1.4));
        assert_eq!(pair, Complex::new(29, -1));
        assert_eq!(mapper.demap(Complex64::new(28.6, -1.4)), 29);
    }

    #[test]
    fn test_reference_demap_is_not_inverse() {
        let mapper = ReferenceMapper::new(4);
        let recovered: Vec<i64> = (0..16).map(|i| mapper.demap(mapper.map(i))).collect();
        // only index 1 survives, since 2·1 − 1 = 1
        let matches: Vec<u32> = (0..16).filter(|&i| recovered[i as usize] == i as i64).collect();
        assert_eq!(matches, vec![1]);
    }

    #[test]
    fn test_map_all_rejects_out_of_range() {
        let mapper = ReferenceMapper::new(2);
        assert_eq!(
            mapper.map_all(&[0, 3, 4]),
            Err(SimError::SymbolOutOfRange { index: 4, order: 4 })
        );
    }

    #[test]
    fn test_gray_code_round_trip() {
        for value in 0..1024 {
            assert_eq!(gray_decode(gray_encode(value)), value);
        }
    }

    #[test]
    fn test_gray_qam_16_levels() {
        let mapper = GrayQamMapper::new(4);
        let points: Vec<Complex64> = (0..16).map(|i| mapper.map(i)).collect();
        for point in &points {
            assert!([-3.0, -1.0, 1.0, 3.0].contains(&point.re));
            assert!([-3.0, -1.0, 1.0, 3.0].contains(&point.im));
        }
        for (a, pa) in points.iter().enumerate() {
            for pb in &points[a + 1..] {
                assert_ne!(pa, pb, "points must be distinct");
            }
        }
    }

    #[test]
    fn test_gray_qam_neighbours_differ_by_one_bit() {
        let mapper = GrayQamMapper::new(4);
        for a in 0..16u32 {
            for b in 0..16u32 {
                let distance = (mapper.map(a) - mapper.map(b)).norm();
                if (distance - 2.0).abs() < 1e-9 {
                    assert_eq!((a ^ b).count_ones(), 1, "{} and {} are adjacent", a, b);
                }
            }
        }
    }

    #[test]
    fn test_gray_qam_exact_inverse() {
        for k in 1..=10 {
            let mapper = GrayQamMapper::new(k);
            for index in 0..(1u32 << k) {
                assert_eq!(mapper.demap(mapper.map(index)), index as i64, "k={}", k);
            }
        }
    }

    #[test]
    fn test_gray_qam_tolerates_small_noise() {
        let mapper = GrayQamMapper::new(6);
        for index in 0..64 {
            let noisy = mapper.map(index) + Complex64::new(0.7, -0.7);
            assert_eq!(mapper.demap(noisy), index as i64);
        }
    }

    #[test]
    fn test_gray_qam_clamps_outliers() {
        let mapper = GrayQamMapper::new(4);
        let corner = mapper.demap(Complex64::new(100.0, 100.0));
        assert_eq!(corner, mapper.demap(Complex64::new(3.0, 3.0)));
    }

    #[test]
    fn test_constellation_builds_mapper() {
        let mapper = Constellation::GrayQam.mapper(4);
        assert_eq!(mapper.order(), 16);
        let mapper = Constellation::Reference.mapper(4);
        assert_eq!(mapper.map(15).re, 29.0);
    }
}
