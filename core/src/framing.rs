//! Bit framing between byte payloads and `k`-bit symbol indices
//!
//! Bits are unpacked most-significant-bit first. Grouping reads `k`
//! consecutive bits as an unsigned integer with the first bit as the MSB.

/// Unpack bytes into bits, MSB first
pub fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 == 1);
        }
    }
    bits
}

/// Append zero bits so the length becomes the next multiple of `k`
pub fn pad(bits: &[bool], k: usize) -> Vec<bool> {
    let mut padded = bits.to_vec();
    let remainder = bits.len() % k;
    if remainder != 0 {
        padded.resize(bits.len() + k - remainder, false);
    }
    padded
}

/// Read consecutive `k`-bit groups as symbol indices
///
/// A trailing partial group is ignored; call [`pad`] first.
pub fn group(bits: &[bool], k: usize) -> Vec<u32> {
    bits.chunks_exact(k)
        .map(|chunk| chunk.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32))
        .collect()
}

/// Expand each index back into `k` bits, MSB first
pub fn ungroup(indices: &[u32], k: usize) -> Vec<bool> {
    let mut bits = Vec::with_capacity(indices.len() * k);
    for &index in indices {
        for i in (0..k).rev() {
            bits.push((index >> i) & 1 == 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first; a final partial byte is zero-filled
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    byte |= 1 << (7 - i);
                }
            }
            byte
        })
        .collect()
}

/// Frame a payload into symbol indices: unpack, pad, group
pub fn frame_bytes(data: &[u8], k: usize) -> Vec<u32> {
    group(&pad(&bytes_to_bits(data), k), k)
}

/// One output byte per recovered value, keeping only the low 8 bits
pub fn repack_values_as_bytes(values: &[i64], num_bytes: usize) -> Vec<u8> {
    values.iter().take(num_bytes).map(|&value| value as u8).collect()
}

/// Rebuild the payload from recovered `k`-bit values
///
/// Values outside `[0, 2^k)` are clamped before unpacking.
pub fn repack_values_as_symbols(values: &[i64], k: usize, num_bits: usize) -> Vec<u8> {
    let max = (1i64 << k) - 1;
    let indices: Vec<u32> = values.iter().map(|&value| value.clamp(0, max) as u32).collect();
    let mut bits = ungroup(&indices, k);
    bits.truncate(num_bits);
    bits_to_bytes(&bits)
}
