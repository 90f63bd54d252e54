//! A heterogeneous compute-task scheduler: a bounded pool of metadata
//! blocks, per-slot worker agents, pluggable accelerator-selection
//! policies, and a critical-task live list with wait semantics, for
//! dispatching FFT and Viterbi-decode jobs across CPU and optional
//! hardware accelerators.
//!
//! ```no_run
//! use hetsched::{CritLevel, JobType, Payload, Scheduler, SchedulerConfig};
//! use hetsched::payload::FftPayload;
//! use num_complex::Complex64;
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default()).unwrap();
//! let slot = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();
//! slot.set_payload(Payload::Fft(FftPayload::new(4, vec![Complex64::new(1.0, 0.0); 16])));
//! scheduler.request_execution(&slot);
//! while slot.status() != hetsched::Status::Done {
//!     std::thread::yield_now();
//! }
//! scheduler.release_slot(slot);
//! ```

mod agent;
mod critlist;
pub mod device;
mod dispatch;
mod inventory;
mod pool;
mod selector;
mod slot;
mod wait;

pub mod config;
pub mod error;
pub mod kernel;
pub mod payload;
pub mod scheduler;
pub mod types;

pub use config::SchedulerConfig;
pub use error::{KernelError, SchedulerError};
pub use kernel::{KernelExecutor, SoftwareKernels};
pub use payload::{FftPayload, Payload, ViterbiPayload};
pub use scheduler::{Scheduler, SchedulerBuilder};
pub use slot::Slot;
pub use types::{AcceleratorKind, CritLevel, JobType, SelectionPolicyKind, Status};
