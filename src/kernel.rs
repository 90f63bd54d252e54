//! Kernel collaborators: the `KernelExecutor` trait plus a software-only
//! default implementation so the crate is usable and testable without real
//! accelerator hardware.

use num_complex::Complex64;

use crate::error::KernelError;
use crate::payload::{FftPayload, ViterbiPayload};

/// The four dispatch targets an agent can invoke, one per
/// `(job_type, accelerator_kind)` combination. `hw_fft`/`hw_viterbi` take the
/// claimed instance id so a real implementation can route to the matching
/// device handle.
pub trait KernelExecutor: Send + Sync {
    fn cpu_fft(&self, payload: &mut FftPayload) -> Result<(), KernelError>;
    fn cpu_viterbi(&self, payload: &mut ViterbiPayload) -> Result<(), KernelError>;
    fn hw_fft(&self, id: usize, payload: &mut FftPayload) -> Result<(), KernelError>;
    fn hw_viterbi(&self, id: usize, payload: &mut ViterbiPayload) -> Result<(), KernelError>;
}

/// Reference/example kernel bodies: an in-place iterative radix-2
/// Cooley-Tukey FFT and a small textbook Viterbi decoder. Not the tuned
/// production kernels the original system drives through device ioctls —
/// `hw_fft`/`hw_viterbi` stand in for "the hardware produced the same
/// result" by delegating to the same software routines.
#[derive(Debug, Default)]
pub struct SoftwareKernels;

impl KernelExecutor for SoftwareKernels {
    fn cpu_fft(&self, payload: &mut FftPayload) -> Result<(), KernelError> {
        iterative_radix2_fft(&mut payload.samples);
        Ok(())
    }

    fn cpu_viterbi(&self, payload: &mut ViterbiPayload) -> Result<(), KernelError> {
        payload.decoded = viterbi_decode(
            &payload.encoded,
            payload.n_cbps as usize,
            payload.n_traceback as usize,
            payload.n_data_bits as usize,
        );
        Ok(())
    }

    fn hw_fft(&self, _id: usize, payload: &mut FftPayload) -> Result<(), KernelError> {
        self.cpu_fft(payload)
    }

    fn hw_viterbi(&self, _id: usize, payload: &mut ViterbiPayload) -> Result<(), KernelError> {
        self.cpu_viterbi(payload)
    }
}

/// In-place iterative radix-2 Cooley-Tukey FFT, bit-reversal permutation
/// followed by the standard butterfly passes. `samples.len()` must be a
/// power of two (guaranteed by `FftPayload::new`).
fn iterative_radix2_fft(samples: &mut [Complex64]) {
    let n = samples.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "FFT length must be a power of two");

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            samples.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle_step = -2.0 * std::f64::consts::PI / len as f64;
        let w_len = Complex64::new(angle_step.cos(), angle_step.sin());
        let mut start = 0;
        while start < n {
            let mut w = Complex64::new(1.0, 0.0);
            for k in 0..half {
                let u = samples[start + k];
                let v = samples[start + k + half] * w;
                samples[start + k] = u + v;
                samples[start + k + half] = u - v;
                w *= w_len;
            }
            start += len;
        }
        len *= 2;
    }
}

/// A fixed-rate-1/2, constraint-length-7 convolutional decoder (the trellis
/// shape used throughout the 802.11 software radio lineage this payload
/// format is modeled on), decoded with the textbook Viterbi algorithm over
/// Hamming distance and a fixed traceback depth.
fn viterbi_decode(encoded: &[u8], n_cbps: usize, n_traceback: usize, n_data_bits: usize) -> Vec<u8> {
    const K: u32 = 7;
    const NUM_STATES: usize = 1 << (K - 1);
    const POLY_A: u8 = 0o155;
    const POLY_B: u8 = 0o117;

    fn parity(mut v: u8) -> u8 {
        let mut p = 0u8;
        while v != 0 {
            p ^= v & 1;
            v >>= 1;
        }
        p
    }

    let mut next_state = [[0usize; 2]; NUM_STATES];
    let mut out_bits = [[(0u8, 0u8); 2]; NUM_STATES];
    for state in 0..NUM_STATES {
        for bit in 0..2u8 {
            let shifted = ((bit as usize) << (K - 1)) | state;
            let trunc = (shifted & ((1 << K) - 1)) as u8;
            let a = parity(trunc & POLY_A);
            let b = parity(trunc & POLY_B);
            next_state[state][bit as usize] = shifted >> 1;
            out_bits[state][bit as usize] = (a, b);
        }
    }

    let n_symbols = if n_cbps > 0 { encoded.len() * 8 / n_cbps.max(1) } else { 0 };
    let n_steps = n_symbols.min(n_data_bits.max(1).saturating_mul(2)).max(1);

    let mut path_metric = vec![u32::MAX; NUM_STATES];
    path_metric[0] = 0;
    let mut traceback: Vec<[usize; NUM_STATES]> = Vec::with_capacity(n_steps);

    let get_pair = |i: usize| -> (u8, u8) {
        let byte_idx = (i * 2) / 8;
        let bit_idx = (i * 2) % 8;
        if byte_idx >= encoded.len() {
            return (0, 0);
        }
        let byte = encoded[byte_idx];
        let a = (byte >> (7 - bit_idx)) & 1;
        let b = if bit_idx + 1 < 8 {
            (byte >> (7 - bit_idx - 1)) & 1
        } else if byte_idx + 1 < encoded.len() {
            (encoded[byte_idx + 1] >> 7) & 1
        } else {
            0
        };
        (a, b)
    };

    for i in 0..n_steps {
        let (ra, rb) = get_pair(i);
        let mut next_metric = vec![u32::MAX; NUM_STATES];
        let mut back = [0usize; NUM_STATES];

        for state in 0..NUM_STATES {
            if path_metric[state] == u32::MAX {
                continue;
            }
            for bit in 0..2usize {
                let ns = next_state[state][bit];
                let (oa, ob) = out_bits[state][bit];
                let dist = (oa ^ ra) as u32 + (ob ^ rb) as u32;
                let cand = path_metric[state] + dist;
                if cand < next_metric[ns] {
                    next_metric[ns] = cand;
                    back[ns] = state;
                }
            }
        }

        path_metric = next_metric;
        traceback.push(back);
    }

    let mut best_state = (0..NUM_STATES)
        .min_by_key(|&s| path_metric[s])
        .unwrap_or(0);

    let depth = traceback.len().min(n_traceback.max(traceback.len()));
    let mut bits = Vec::with_capacity(depth);
    for back in traceback.iter().rev() {
        let prev = back[best_state];
        let bit = ((best_state >> (K as usize - 2)) & 1) as u8;
        bits.push(bit);
        best_state = prev;
    }
    bits.reverse();
    bits.truncate(n_data_bits.min(bits.len()));
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_of_impulse_is_flat() {
        let mut samples = vec![Complex64::new(0.0, 0.0); 8];
        samples[0] = Complex64::new(1.0, 0.0);
        iterative_radix2_fft(&mut samples);
        for s in &samples {
            assert!((s.re - 1.0).abs() < 1e-9);
            assert!(s.im.abs() < 1e-9);
        }
    }

    #[test]
    fn fft_of_dc_signal_concentrates_in_bin_zero() {
        let mut samples = vec![Complex64::new(1.0, 0.0); 8];
        iterative_radix2_fft(&mut samples);
        assert!((samples[0].re - 8.0).abs() < 1e-9);
        for s in &samples[1..] {
            assert!(s.re.abs() < 1e-9);
            assert!(s.im.abs() < 1e-9);
        }
    }

    #[test]
    fn viterbi_decode_does_not_panic_on_small_input() {
        let encoded = vec![0xAC, 0x9A, 0x00, 0xFF];
        let decoded = viterbi_decode(&encoded, 48, 24, 8);
        assert!(decoded.len() <= 8);
    }
}
