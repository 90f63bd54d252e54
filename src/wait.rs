//! `wait_all_critical` and `wait_all_tasks_finish`: condvar waits on the
//! pool's shared condition variable, which is notified on every
//! release/completion, rather than busy-spins.

use crate::pool::Pool;
use crate::slot::SlotSync;
use crate::types::Status;
use std::sync::Arc;

/// Block until every task currently on the critical live list has reached
/// `Done`, as observed at a single point in time. A task that joins the
/// critical list *after* this call starts is not waited on.
///
/// A target block id is satisfied once it is `Done` *or* no longer present
/// on the critical live list. The latter check matters because the free
/// list is LIFO: a target's block id can be released and reused by an
/// unrelated (possibly non-critical) task before this loop wakes again, and
/// that new occupant's status must never gate the wait — only fresh
/// critlist membership, rechecked every iteration under the pool lock,
/// tells the two apart.
pub(crate) fn wait_all_critical(pool: &Pool, slots: &[Arc<SlotSync>]) {
    let targets = pool.critical_snapshot();
    if targets.is_empty() {
        return;
    }

    let mut guard = pool.lock();
    loop {
        let all_satisfied = targets
            .iter()
            .all(|&bi| !guard.crit.contains(bi) || slots[bi].status() == Status::Done);
        if all_satisfied {
            return;
        }
        guard = pool.wait(guard);
    }
}

/// Block until the free pool is back to full capacity, i.e. every allocated
/// metadata block has been released.
pub(crate) fn wait_all_tasks_finish(pool: &Pool) {
    let mut guard = pool.lock();
    while pool.free_count_locked(&guard) != pool.capacity {
        guard = pool.wait(guard);
    }
}
