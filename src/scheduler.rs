//! The `Scheduler` context object: owns the pool, the per-slot sync objects,
//! the bound agent threads, the kernel collaborator, and the process-wide
//! selection policy. This is the crate's single public entry point.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::agent::spawn_agent;
use crate::config::SchedulerConfig;
use crate::dispatch::request_execution;
use crate::error::SchedulerError;
use crate::kernel::{KernelExecutor, SoftwareKernels};
use crate::pool::Pool;
use crate::selector::{make_policy, SelectionPolicy};
use crate::slot::{Slot, SlotSync};
use crate::types::{AcceleratorKind, CritLevel, JobType, SelectionPolicyKind, Status};
use crate::wait::{wait_all_critical, wait_all_tasks_finish};

/// Owns every long-lived resource the scheduler needs: the bounded metadata
/// pool, one sync object and one bound agent thread per slot, the kernel
/// collaborator, and the process-wide selection policy chosen at
/// construction time.
pub struct Scheduler {
    pool: Arc<Pool>,
    slots: Vec<Arc<SlotSync>>,
    agents: Vec<JoinHandle<()>>,
    policy: Box<dyn SelectionPolicy>,
    config: SchedulerConfig,
    shut_down: bool,
}

impl Scheduler {
    /// Construct a scheduler using the built-in software kernels. Fails if
    /// the configuration names an unsupported policy or requests hardware
    /// this build was not compiled to support.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        Self::with_kernels(config, Arc::new(SoftwareKernels))
    }

    /// Construct a scheduler with a caller-supplied kernel collaborator —
    /// the seam a real device-backed `KernelExecutor` plugs into. Fails with
    /// `SchedulerError::HardwareNotCompiled` if the configuration claims a
    /// hardware kind is present (`fft_hw_present`/`viterbi_hw_present`) but
    /// this build wasn't compiled with the `hw-accel` feature, since this
    /// crate's only real device backend (`device::linux::LinuxAccelDevice`)
    /// only exists behind that feature — regardless of which `kernels` a
    /// caller supplies, a `hw_present` flag with the feature off can never
    /// be backed by anything but a software stand-in impersonating hardware.
    pub fn with_kernels(config: SchedulerConfig, kernels: Arc<dyn KernelExecutor>) -> Result<Self, SchedulerError> {
        if config.fft_hw_present && !cfg!(feature = "hw-accel") {
            return Err(SchedulerError::HardwareNotCompiled(AcceleratorKind::FftHw));
        }
        if config.viterbi_hw_present && !cfg!(feature = "hw-accel") {
            return Err(SchedulerError::HardwareNotCompiled(AcceleratorKind::VitHw));
        }

        let policy = make_policy(config.selection_policy)
            .ok_or(SchedulerError::UnsupportedPolicy(config.selection_policy))?;

        let pool = Arc::new(Pool::new(
            config.pool_capacity,
            config.cpu_count,
            if config.fft_hw_present { config.fft_hw_count } else { 0 },
            if config.viterbi_hw_present { config.viterbi_hw_count } else { 0 },
        ));

        let slots: Vec<Arc<SlotSync>> = (0..config.pool_capacity).map(|_| Arc::new(SlotSync::new())).collect();

        let agents = slots
            .iter()
            .enumerate()
            .map(|(block_id, sync)| spawn_agent(block_id, Arc::clone(sync), Arc::clone(&pool), Arc::clone(&kernels)))
            .collect();

        tracing::info!(
            pool_capacity = config.pool_capacity,
            cpu_count = config.cpu_count,
            fft_hw_present = config.fft_hw_present,
            viterbi_hw_present = config.viterbi_hw_present,
            "scheduler initialized"
        );

        Ok(Scheduler {
            pool,
            slots,
            agents,
            policy,
            config,
            shut_down: false,
        })
    }

    /// Start a [`SchedulerBuilder`], for callers that want to set a handful
    /// of config fields without assembling a full `SchedulerConfig` value.
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Acquire a free metadata block for a task of `job_type` at
    /// `crit_level`, or `SchedulerError::NoneAvailable` if the pool is
    /// exhausted.
    pub fn acquire_slot(&self, job_type: JobType, crit_level: CritLevel) -> Result<Slot, SchedulerError> {
        self.pool.acquire_slot(&self.slots, job_type, crit_level)
    }

    /// Return a finished (or abandoned) slot to the free pool.
    pub fn release_slot(&self, slot: Slot) {
        self.pool.release_slot(&self.slots, slot);
    }

    /// Move `slot` from `Allocated` to dispatched: the selection policy
    /// claims an accelerator instance and the slot's bound agent is woken.
    pub fn request_execution(&self, slot: &Slot) {
        request_execution(&self.pool, &self.config, self.policy.as_ref(), slot);
    }

    /// Current status of the metadata block with id `block_id`, read
    /// lock-free off the slot's atomic status mirror.
    pub fn status(&self, block_id: usize) -> Status {
        self.slots[block_id].status()
    }

    /// Block until every task currently on the critical live list has
    /// completed.
    pub fn wait_all_critical(&self) {
        wait_all_critical(&self.pool, &self.slots);
    }

    /// Block until the free pool has returned to full capacity.
    pub fn wait_all_tasks_finish(&self) {
        wait_all_tasks_finish(&self.pool);
    }

    pub fn free_count(&self) -> usize {
        self.pool.free_count()
    }

    pub fn critical_count(&self) -> usize {
        self.pool.critical_count()
    }

    /// The block id currently holding accelerator instance `id` of `kind`,
    /// if any. Diagnostic, used by tests to assert the busy table returns
    /// to empty once every dispatched task has released its accelerator.
    pub fn accelerator_owner(&self, kind: AcceleratorKind, id: usize) -> Option<usize> {
        self.pool.accelerator_owner(kind, id)
    }

    /// Cancel every agent thread and join them. Does not drain outstanding
    /// work — any slot still `Running` is abandoned mid-kernel from the
    /// scheduler's point of view (the OS thread itself still runs to
    /// completion before observing `shutdown`).
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for sync in &self.slots {
            let mut st = sync.state.lock().unwrap();
            st.shutdown = true;
            sync.condvar.notify_all();
        }

        for handle in self.agents.drain(..) {
            let _ = handle.join();
        }

        tracing::info!("scheduler shut down");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Chainable alternative to assembling a [`SchedulerConfig`] literal and
/// calling [`Scheduler::new`]/[`Scheduler::with_kernels`] directly. Purely
/// ergonomic — `.build()` bottoms out in the same two constructors, so
/// there is no behavior here a config struct couldn't already express.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    kernels: Option<Arc<dyn KernelExecutor>>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        SchedulerBuilder {
            config: SchedulerConfig::default(),
            kernels: None,
        }
    }

    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.config.pool_capacity = capacity;
        self
    }

    pub fn cpu_count(mut self, count: usize) -> Self {
        self.config.cpu_count = count;
        self
    }

    /// Configure the FFT hardware kind: whether it's present, and how many
    /// instances. `present = false` forces the instance count to zero
    /// regardless of `count` (mirrors `Scheduler::with_kernels`'s own
    /// `if fft_hw_present { .. } else { 0 }` treatment of the inventory).
    pub fn fft_hw(mut self, present: bool, count: usize) -> Self {
        self.config.fft_hw_present = present;
        self.config.fft_hw_count = count;
        self
    }

    /// Configure the Viterbi hardware kind: whether it's present, and how
    /// many instances. `present = false` forces the instance count to zero.
    pub fn viterbi_hw(mut self, present: bool, count: usize) -> Self {
        self.config.viterbi_hw_present = present;
        self.config.viterbi_hw_count = count;
        self
    }

    pub fn selection_policy(mut self, policy: SelectionPolicyKind) -> Self {
        self.config.selection_policy = policy;
        self
    }

    /// Supply a caller-built kernel collaborator instead of the default
    /// `SoftwareKernels`, routing `.build()` through `Scheduler::with_kernels`.
    pub fn kernels(mut self, kernels: Arc<dyn KernelExecutor>) -> Self {
        self.kernels = Some(kernels);
        self
    }

    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        match self.kernels {
            Some(kernels) => Scheduler::with_kernels(self.config, kernels),
            None => Scheduler::new(self.config),
        }
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        SchedulerBuilder::new()
    }
}
