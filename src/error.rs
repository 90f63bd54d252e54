//! Error taxonomy. This design favors loud failure over silent recovery:
//! only the genuinely recoverable members of the taxonomy (pool
//! exhaustion, bad configuration caught at construction time) are
//! `Result::Err` values here. Invariant violations panic with a preceding
//! `tracing::error!`, reporting and terminating without reaching for
//! `std::process::exit` inside a library.

use thiserror::Error;

use crate::types::AcceleratorKind;

/// Recoverable-by-the-caller members of the error taxonomy: pool exhaustion
/// and bad configuration, both caught before any task has been dispatched.
/// Every variant here is actually returned somewhere in this crate —
/// invariant violations and device/kernel failures are fatal instead (see
/// the module doc comment), so they are never modeled as `SchedulerError`.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no free metadata slot available (pool capacity exhausted)")]
    NoneAvailable,

    #[error("selection policy {0:?} is not supported")]
    UnsupportedPolicy(crate::types::SelectionPolicyKind),

    #[error("hardware accelerator kind {0:?} requested but the `hw-accel` feature was not compiled in")]
    HardwareNotCompiled(AcceleratorKind),
}

/// Error surface for the `KernelExecutor` collaborator trait. A kernel
/// failure is meant to log and terminate the process — callers that want
/// that exact behavior should `.unwrap()`/`.expect()` at the call site; the
/// trait itself returns `Result` so alternative (software-testing)
/// implementations can report failures without aborting.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("payload variant did not match the job type dispatched to this kernel")]
    PayloadMismatch,

    #[error("device ioctl failed: {0}")]
    Ioctl(String),

    #[error("unable to open device path: {0}")]
    DeviceOpen(String),

    #[error("unable to allocate contiguous DMA buffer of {0} bytes")]
    DmaAlloc(usize),
}
