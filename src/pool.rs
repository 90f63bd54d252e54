//! The bounded metadata pool: free-list bookkeeping, the critical live list,
//! and the resource inventory, all guarded by one mutex — it covers the
//! free-slot pool, the critlist, and the `busy` table together, since every
//! operation that touches one of them needs a consistent view of all three.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::critlist::CritList;
use crate::error::SchedulerError;
use crate::inventory::Inventory;
use crate::slot::{Slot, SlotSync};
use crate::types::{AcceleratorKind, CritLevel, JobType, Status};

pub(crate) struct PoolInner {
    free_ids: Vec<usize>,
    pub crit: CritList,
    pub inventory: Inventory,
}

/// The shared pool object: free-list + critlist + inventory state, plus the
/// single condvar backing every blocking wait that touches pool state
/// (selector scans, `wait_all_critical`, `wait_all_tasks_finish`). Waiters
/// loop on their own predicate, so one shared condvar with broadcast
/// wakeups is correct even though it occasionally wakes an unrelated
/// waiter.
pub(crate) struct Pool {
    inner: Mutex<PoolInner>,
    pub(crate) cv: Condvar,
    pub(crate) capacity: usize,
}

impl Pool {
    pub fn new(capacity: usize, cpu_count: usize, fft_hw_count: usize, vit_hw_count: usize) -> Self {
        Pool {
            inner: Mutex::new(PoolInner {
                free_ids: (0..capacity).rev().collect(),
                crit: CritList::new(capacity),
                inventory: Inventory::new(cpu_count, fft_hw_count, vit_hw_count),
            }),
            cv: Condvar::new(),
            capacity,
        }
    }

    /// Poisoning is intentionally allowed to propagate: a panic here means
    /// an invariant was violated, and every other thread touching this pool
    /// should fail loudly too rather than silently carry on against
    /// corrupted state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, PoolInner> {
        self.inner.lock().expect("pool mutex poisoned by a prior invariant violation")
    }

    pub(crate) fn wait<'a>(&self, guard: MutexGuard<'a, PoolInner>) -> MutexGuard<'a, PoolInner> {
        self.cv
            .wait(guard)
            .expect("pool mutex poisoned by a prior invariant violation")
    }

    pub(crate) fn notify_all(&self) {
        self.cv.notify_all();
    }

    pub fn free_count(&self) -> usize {
        self.lock().free_ids.len()
    }

    /// Same as `free_count`, but for callers that already hold the lock
    /// (`wait_all_tasks_finish`'s loop condition) — avoids re-entrant
    /// locking the guard-returning variant would cause.
    pub(crate) fn free_count_locked(&self, guard: &MutexGuard<'_, PoolInner>) -> usize {
        guard.free_ids.len()
    }

    /// `acquire_slot`: pop a free block id (LIFO), reset its mutable
    /// metadata, and — if critical — link it onto the critical live list.
    pub fn acquire_slot(
        &self,
        slots: &[Arc<SlotSync>],
        job_type: JobType,
        crit_level: CritLevel,
    ) -> Result<Slot, SchedulerError> {
        let mut guard = self.lock();
        let bi = guard.free_ids.pop().ok_or(SchedulerError::NoneAvailable)?;
        if bi >= self.capacity {
            tracing::error!(block_id = bi, "corrupt free-pool index");
            panic!("corrupt free-pool index {bi} (capacity {})", self.capacity);
        }

        {
            let sync = &slots[bi];
            let mut st = sync.state.lock().unwrap();
            st.job_type = Some(job_type);
            st.crit_level = crit_level;
            st.payload = crate::payload::Payload::Empty;
            st.accelerator_kind = None;
            st.accelerator_id = None;
            st.on_finish = None;
            sync.set_status_locked(&mut st, Status::Allocated);
        }

        if crit_level.is_critical() {
            guard.crit.push(bi);
        }

        drop(guard);
        self.notify_all();

        Ok(Slot {
            block_id: bi,
            sync: Arc::clone(&slots[bi]),
        })
    }

    /// `release_slot`: return the block id to the free pool, unlink it from
    /// the critical list if applicable, and clear its metadata.
    pub fn release_slot(&self, slots: &[Arc<SlotSync>], slot: Slot) {
        let bi = slot.block_id;
        let mut guard = self.lock();

        if guard.free_ids.len() >= self.capacity {
            tracing::error!(block_id = bi, "releasing slot when pool already full");
            panic!("releasing metadata block {bi} with free pool already at capacity");
        }

        let crit_level = slots[bi].state.lock().unwrap().crit_level;
        if crit_level.is_critical() && !guard.crit.remove(bi) {
            tracing::error!(block_id = bi, "critical slot missing from critical live list");
            panic!("critical task block {bi} not found on the critical live list");
        }

        guard.free_ids.push(bi);

        {
            let sync = &slots[bi];
            let mut st = sync.state.lock().unwrap();
            st.job_type = None;
            st.crit_level = CritLevel::Base;
            st.payload = crate::payload::Payload::Empty;
            st.accelerator_kind = None;
            st.accelerator_id = None;
            sync.set_status_locked(&mut st, Status::Free);
        }

        drop(guard);
        self.notify_all();
    }

    /// Snapshot of currently-live critical block ids, head-first.
    pub fn critical_snapshot(&self) -> Vec<usize> {
        self.lock().crit.snapshot()
    }

    pub fn critical_count(&self) -> usize {
        self.lock().crit.len()
    }

    pub fn accelerator_owner(&self, kind: AcceleratorKind, id: usize) -> Option<usize> {
        self.lock().inventory.owner(kind, id)
    }
}
