//! The metadata slot itself: a per-slot `(Mutex, Condvar)` pair, plus a
//! lock-free `AtomicU8` mirror of `status` so that `Scheduler::status()` and
//! the wait primitives can poll without contending on the slot's mutex
//! (which the owning agent may hold for the duration of a kernel call).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::payload::Payload;
use crate::types::{AcceleratorKind, CritLevel, JobType, Status};

pub(crate) type FinishCallback = Box<dyn FnOnce(usize) + Send + 'static>;

/// The mutable metadata protected by a slot's mutex. Excludes `block_id`
/// (stable, carried on `SlotSync`/`Slot` instead) and the agent handle
/// (owned by the scheduler, not the slot).
pub(crate) struct SlotState {
    pub status: Status,
    pub job_type: Option<JobType>,
    pub crit_level: CritLevel,
    pub accelerator_kind: Option<AcceleratorKind>,
    pub accelerator_id: Option<usize>,
    pub payload: Payload,
    pub on_finish: Option<FinishCallback>,
    /// Set by `Scheduler::shutdown`; wakes the agent out of its wait loop
    /// without requiring unsafe thread cancellation.
    pub shutdown: bool,
}

impl SlotState {
    fn fresh() -> Self {
        SlotState {
            status: Status::Free,
            job_type: None,
            crit_level: CritLevel::Base,
            accelerator_kind: None,
            accelerator_id: None,
            payload: Payload::Empty,
            on_finish: None,
            shutdown: false,
        }
    }
}

/// The synchronization half of a slot, shared between the scheduler, the
/// slot's bound agent thread, and every `Slot` handle referencing it.
pub(crate) struct SlotSync {
    pub state: Mutex<SlotState>,
    pub condvar: Condvar,
    /// Lock-free mirror of `state.status`, written atomically in the same
    /// critical section as every authoritative status write.
    pub status_mirror: AtomicU8,
}

impl SlotSync {
    pub fn new() -> Self {
        SlotSync {
            state: Mutex::new(SlotState::fresh()),
            condvar: Condvar::new(),
            status_mirror: AtomicU8::new(Status::Free as u8),
        }
    }

    /// Lock-free status read, used by `Scheduler::status` and the wait
    /// primitives so they never contend with an agent holding the mutex
    /// for the duration of a kernel call.
    pub fn status(&self) -> Status {
        Status::from_u8(self.status_mirror.load(Ordering::SeqCst))
    }

    pub fn set_status_locked(&self, state: &mut SlotState, status: Status) {
        state.status = status;
        self.status_mirror.store(status as u8, Ordering::SeqCst);
    }
}

impl Status {
    fn from_u8(v: u8) -> Status {
        match v {
            0 => Status::Free,
            1 => Status::Allocated,
            2 => Status::Queued,
            3 => Status::Running,
            4 => Status::Done,
            _ => unreachable!("status_mirror holds an out-of-range value"),
        }
    }
}

/// A handle to an acquired metadata slot, returned by `acquire_slot` and
/// consumed by `release_slot`. Cloning the handle is intentionally not
/// provided — a slot is owned by exactly one caller between `acquire_slot`
/// and `release_slot`.
pub struct Slot {
    pub(crate) block_id: usize,
    pub(crate) sync: Arc<SlotSync>,
}

impl Slot {
    pub fn block_id(&self) -> usize {
        self.block_id
    }

    pub fn status(&self) -> Status {
        self.sync.status()
    }

    pub fn job_type(&self) -> Option<JobType> {
        self.sync.state.lock().unwrap().job_type
    }

    pub fn crit_level(&self) -> CritLevel {
        self.sync.state.lock().unwrap().crit_level
    }

    /// The accelerator instance this slot is (or was last) dispatched to,
    /// if it has reached `Queued` or later. Diagnostic; not used by the
    /// scheduler's own control flow.
    pub fn accelerator(&self) -> Option<(AcceleratorKind, usize)> {
        let st = self.sync.state.lock().unwrap();
        match (st.accelerator_kind, st.accelerator_id) {
            (Some(k), Some(i)) => Some((k, i)),
            _ => None,
        }
    }

    /// Write this slot's task payload. Must be called while the slot is
    /// still `Allocated` (i.e. before `request_execution`) — the payload is
    /// conceptually owned by the submitter until then.
    pub fn set_payload(&self, payload: Payload) {
        let mut st = self.sync.state.lock().unwrap();
        st.payload = payload;
    }

    /// Register a completion callback, invoked at most once, after status
    /// observably becomes `Done` and before `release_slot`.
    pub fn set_on_finish<F>(&self, f: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        let mut st = self.sync.state.lock().unwrap();
        st.on_finish = Some(Box::new(f));
    }

    /// Read out the finished payload. Intended for use after the slot's
    /// status has been observed as `Done`.
    pub fn with_payload<R>(&self, f: impl FnOnce(&Payload) -> R) -> R {
        let st = self.sync.state.lock().unwrap();
        f(&st.payload)
    }
}
