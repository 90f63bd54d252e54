//! Task payloads: a tagged enum keyed by `JobType`, so the scheduler core
//! never needs to know the payload's shape.

use num_complex::Complex64;

use crate::types::JobType;

/// FFT task payload. `samples` holds `2^log_n` complex samples; kernels
/// transform it in place.
#[derive(Debug, Clone)]
pub struct FftPayload {
    pub log_n: u32,
    pub samples: Vec<Complex64>,
}

impl FftPayload {
    pub fn new(log_n: u32, samples: Vec<Complex64>) -> Self {
        let expected = 1usize << log_n;
        assert_eq!(
            samples.len(),
            expected,
            "FFT payload must carry exactly 2^log_n samples"
        );
        FftPayload { log_n, samples }
    }
}

/// Viterbi decode task payload, mirroring `viterbi_data_struct_t`'s
/// `n_cbps`/`n_traceback`/`n_data_bits` fields from the original source.
#[derive(Debug, Clone)]
pub struct ViterbiPayload {
    pub n_cbps: u32,
    pub n_traceback: u32,
    pub n_data_bits: u32,
    pub encoded: Vec<u8>,
    pub decoded: Vec<u8>,
}

impl ViterbiPayload {
    pub fn new(n_cbps: u32, n_traceback: u32, n_data_bits: u32, encoded: Vec<u8>) -> Self {
        ViterbiPayload {
            n_cbps,
            n_traceback,
            n_data_bits,
            encoded,
            decoded: Vec::new(),
        }
    }
}

/// The slot's payload storage. `Empty` is the state of a freshly-allocated
/// slot before the caller has written a payload.
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Fft(FftPayload),
    Viterbi(ViterbiPayload),
}

impl Payload {
    pub fn job_type(&self) -> Option<JobType> {
        match self {
            Payload::Empty => None,
            Payload::Fft(_) => Some(JobType::Fft),
            Payload::Viterbi(_) => Some(JobType::Viterbi),
        }
    }

    pub fn as_fft_mut(&mut self) -> Option<&mut FftPayload> {
        match self {
            Payload::Fft(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_viterbi_mut(&mut self) -> Option<&mut ViterbiPayload> {
        match self {
            Payload::Viterbi(p) => Some(p),
            _ => None,
        }
    }

    /// Approximate size in bytes, used only for diagnostics, not for any
    /// allocation decision.
    pub fn size_bytes(&self) -> usize {
        match self {
            Payload::Empty => 0,
            Payload::Fft(p) => p.samples.len() * std::mem::size_of::<Complex64>(),
            Payload::Viterbi(p) => p.encoded.len() + p.decoded.len(),
        }
    }
}
