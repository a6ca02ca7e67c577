//! Magnitude spectrum of a whole waveform, for plotting collaborators

use rustfft::{num_complex::Complex64, FftPlanner};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumPoint {
    pub frequency_hz: f64,
    pub magnitude: f64,
}

/// Forward DFT of the full waveform, ordered from −Fs/2 up to just below +Fs/2
///
/// Bin `i` of the unshifted transform sits at `i·Fs/n` for `i < ceil(n/2)` and
/// at `(i − n)·Fs/n` above that; frequencies and magnitudes are shifted together.
pub fn spectrum(waveform: &[Complex64], sample_rate: f64) -> Vec<SpectrumPoint> {
    let n = waveform.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer = waveform.to_vec();
    FftPlanner::new().plan_fft_forward(n).process(&mut buffer);

    let resolution = sample_rate / n as f64;
    let mut points: Vec<SpectrumPoint> = buffer
        .iter()
        .enumerate()
        .map(|(i, bin)| {
            let signed = if i < n.div_ceil(2) { i as f64 } else { i as f64 - n as f64 };
            SpectrumPoint {
                frequency_hz: signed * resolution,
                magnitude: bin.norm(),
            }
        })
        .collect();

    // negative frequencies first
    points.rotate_left(n.div_ceil(2));
    points
}
