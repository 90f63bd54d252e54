//! Core enums shared across the scheduler: job kinds, criticality, lifecycle
//! status, and accelerator kinds.

use serde::{Deserialize, Serialize};

/// The two task families this scheduler dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Fft,
    Viterbi,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Fft => "FFT-TASK",
            JobType::Viterbi => "VITERBI-TASK",
        }
    }
}

/// Criticality of a task. Only `Elevated`/`Critical` (i.e. `> Base`) are
/// tracked on the critical live list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CritLevel {
    Base,
    Elevated,
    Critical,
}

impl CritLevel {
    /// Whether this level belongs on the critical live list.
    pub fn is_critical(self) -> bool {
        self > CritLevel::Base
    }
}

/// Lifecycle status of a metadata slot. Progresses monotonically
/// Free -> Allocated -> Queued -> Running -> Done -> Free, with no other
/// back-edge permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Free,
    Allocated,
    Queued,
    Running,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Free => "TASK-FREE",
            Status::Allocated => "TASK-ALLOCATED",
            Status::Queued => "TASK-QUEUED",
            Status::Running => "TASK-RUNNING",
            Status::Done => "TASK-DONE",
        }
    }
}

/// An addressable execution resource kind. `Cpu` instances are purely
/// logical bookkeeping; `FftHw`/`VitHw` correspond to device handles when
/// the `hw-accel` feature is compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceleratorKind {
    Cpu,
    FftHw,
    VitHw,
}

impl AcceleratorKind {
    pub const ALL: [AcceleratorKind; 3] =
        [AcceleratorKind::Cpu, AcceleratorKind::FftHw, AcceleratorKind::VitHw];

    pub fn as_str(self) -> &'static str {
        match self {
            AcceleratorKind::Cpu => "CPU-ACCELERATOR",
            AcceleratorKind::FftHw => "FFT-HWR-ACCEL",
            AcceleratorKind::VitHw => "VITERBI-HWR-ACCEL",
        }
    }

    /// The hardware kind (if any) that can run a given job type.
    pub fn hw_for(job: JobType) -> AcceleratorKind {
        match job {
            JobType::Fft => AcceleratorKind::FftHw,
            JobType::Viterbi => AcceleratorKind::VitHw,
        }
    }
}

/// Process-wide accelerator-selection policy, set once at scheduler
/// construction. An unrecognized value is a configuration error surfaced as
/// `SchedulerError::UnsupportedPolicy` at construction time, before any
/// task has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicyKind {
    RandomWait,
    FastToSlow,
    /// Any value that doesn't match a known policy name, e.g. from a
    /// hand-edited config file. `#[serde(other)]` routes unrecognized
    /// strings here instead of failing deserialization outright, so
    /// `Scheduler::new` can report it as `SchedulerError::UnsupportedPolicy`
    /// uniformly with a policy value constructed directly in code.
    #[serde(other)]
    Unknown,
}
