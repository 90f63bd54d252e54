//! Typed scheduler configuration, constructed directly or parsed from a
//! TOML file.

use serde::{Deserialize, Serialize};

use crate::types::SelectionPolicyKind;

/// Default FFT transform size: 2^14 = 16384 samples.
pub const DEFAULT_FFT_LOG_N: u32 = 14;
/// Default pool capacity.
pub const DEFAULT_POOL_CAPACITY: usize = 32;
/// Default max instances of each hardware accelerator kind.
pub const DEFAULT_MAX_HW_ACCEL_PER_KIND: usize = 4;
/// Default max logical CPU accelerator instances.
pub const DEFAULT_MAX_CPU_ACCEL: usize = 10;
/// Default hardware-preference threshold: draws in [0, threshold) (of 100)
/// propose hardware, i.e. 25 ⇒ ~75% hardware-routed when hardware exists.
pub const DEFAULT_HW_PREFERENCE_THRESHOLD: u8 = 25;
/// "No hardware present" threshold: never propose hardware.
pub const NO_HARDWARE_THRESHOLD: u8 = 101;

/// Scheduler configuration. Constructed directly, via [`SchedulerConfig::default`],
/// or loaded from a TOML file with [`SchedulerConfig::from_toml_str`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub pool_capacity: usize,
    pub fft_hw_present: bool,
    pub viterbi_hw_present: bool,
    pub fft_hw_count: usize,
    pub viterbi_hw_count: usize,
    pub cpu_count: usize,
    pub fft_default_log_n: u32,
    pub hw_preference_threshold: u8,
    pub selection_policy: SelectionPolicyKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            fft_hw_present: false,
            viterbi_hw_present: false,
            fft_hw_count: DEFAULT_MAX_HW_ACCEL_PER_KIND,
            viterbi_hw_count: DEFAULT_MAX_HW_ACCEL_PER_KIND,
            cpu_count: DEFAULT_MAX_CPU_ACCEL,
            fft_default_log_n: DEFAULT_FFT_LOG_N,
            hw_preference_threshold: DEFAULT_HW_PREFERENCE_THRESHOLD,
            selection_policy: SelectionPolicyKind::RandomWait,
        }
    }
}

impl SchedulerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Effective hardware-preference threshold for a kind that has zero
    /// instances: `NO_HARDWARE_THRESHOLD` (⇒ 0%) rather than `hw_preference_threshold`.
    pub fn effective_threshold(&self, hw_present: bool) -> u8 {
        if hw_present {
            self.hw_preference_threshold
        } else {
            NO_HARDWARE_THRESHOLD
        }
    }
}
