//! Accelerator-selection policies.
//!
//! An instance search that finds nothing free waits on the pool's condvar
//! instead of busy-spinning; the condvar is notified on every accelerator
//! release.
//!
//! Selecting a free instance and claiming it for a task are only race-free
//! if nothing can intervene between a selector's "found free" observation
//! and that claim. The only way to guarantee that in a safe-Rust
//! realization without handing a `MutexGuard` across the trait boundary is
//! to have the policy claim the instance itself, still holding the pool
//! lock at the moment it does so — `request_execution` then only has to
//! record the result onto the slot. This merge of "select" and "claim"
//! into one critical section is noted in DESIGN.md.

use rand::Rng;

use crate::config::SchedulerConfig;
use crate::pool::Pool;
use crate::types::{AcceleratorKind, JobType};

pub(crate) trait SelectionPolicy: Send + Sync {
    /// Choose a currently-free `(kind, id)` for `job` and claim it for
    /// `block_id` before returning, all under one acquisition of the pool
    /// lock per loop iteration — so the "found free" observation and the
    /// claim can never be separated by a concurrent claim from another
    /// dispatcher.
    fn acquire(&self, job: JobType, cfg: &SchedulerConfig, pool: &Pool, block_id: usize) -> (AcceleratorKind, usize);
}

/// Draws one kind proposal per call (hardware with probability
/// `hw_preference_threshold / 100` when hardware is present, else always
/// CPU), then polls only that kind's instance table until one is free.
/// Never falls back to the other kind once a kind has been chosen.
pub(crate) struct RandomWaitPolicy;

impl SelectionPolicy for RandomWaitPolicy {
    fn acquire(&self, job: JobType, cfg: &SchedulerConfig, pool: &Pool, block_id: usize) -> (AcceleratorKind, usize) {
        let hw_kind = AcceleratorKind::hw_for(job);
        let hw_present = match hw_kind {
            AcceleratorKind::FftHw => cfg.fft_hw_present,
            AcceleratorKind::VitHw => cfg.viterbi_hw_present,
            AcceleratorKind::Cpu => unreachable!("hw_for never returns Cpu"),
        };
        let threshold = cfg.effective_threshold(hw_present);
        let draw: u8 = rand::thread_rng().gen_range(0..100);
        let kind = if draw < threshold { hw_kind } else { AcceleratorKind::Cpu };

        let mut guard = pool.lock();
        loop {
            if let Some(id) = guard.inventory.scan_free(kind) {
                guard.inventory.claim(kind, id, block_id);
                return (kind, id);
            }
            guard = pool.wait(guard);
        }
    }
}

/// Always prefers the job's hardware kind (if present) over CPU, scanning
/// fastest-to-slowest and repeating the outer scan until something is
/// free — so a hardware instance that frees up mid-wait is picked up on
/// the next iteration even if CPU also has room.
pub(crate) struct FastToSlowPolicy;

impl SelectionPolicy for FastToSlowPolicy {
    fn acquire(&self, job: JobType, _cfg: &SchedulerConfig, pool: &Pool, block_id: usize) -> (AcceleratorKind, usize) {
        let hw_kind = AcceleratorKind::hw_for(job);

        let mut guard = pool.lock();
        loop {
            if guard.inventory.count(hw_kind) > 0 {
                if let Some(id) = guard.inventory.scan_free(hw_kind) {
                    guard.inventory.claim(hw_kind, id, block_id);
                    return (hw_kind, id);
                }
            }
            if let Some(id) = guard.inventory.scan_free(AcceleratorKind::Cpu) {
                guard.inventory.claim(AcceleratorKind::Cpu, id, block_id);
                return (AcceleratorKind::Cpu, id);
            }
            guard = pool.wait(guard);
        }
    }
}

pub(crate) fn make_policy(kind: crate::types::SelectionPolicyKind) -> Option<Box<dyn SelectionPolicy>> {
    match kind {
        crate::types::SelectionPolicyKind::RandomWait => Some(Box::new(RandomWaitPolicy)),
        crate::types::SelectionPolicyKind::FastToSlow => Some(Box::new(FastToSlowPolicy)),
        crate::types::SelectionPolicyKind::Unknown => None,
    }
}
