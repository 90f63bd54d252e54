//! Per-slot worker agents: one OS thread bound to a metadata slot for the
//! scheduler's lifetime, parked on the slot's condvar until dispatched to
//! `Running`, then routed to the matching kernel collaborator.

use std::sync::Arc;

use crate::dispatch::mark_done;
use crate::kernel::KernelExecutor;
use crate::payload::Payload;
use crate::pool::Pool;
use crate::slot::SlotSync;
use crate::types::{AcceleratorKind, JobType, Status};

/// Spawn the thread bound to slot `block_id`. Runs until `shutdown` is set
/// and the condvar wakes it — there is no other exit from the loop.
pub(crate) fn spawn_agent(
    block_id: usize,
    sync: Arc<SlotSync>,
    pool: Arc<Pool>,
    kernels: Arc<dyn KernelExecutor>,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("hetsched-agent-{block_id}"))
        .spawn(move || agent_loop(block_id, sync, pool, kernels))
        .expect("failed to spawn agent thread")
}

fn agent_loop(block_id: usize, sync: Arc<SlotSync>, pool: Arc<Pool>, kernels: Arc<dyn KernelExecutor>) {
    loop {
        let mut st = sync.state.lock().unwrap();
        while st.status != Status::Running && !st.shutdown {
            st = sync.condvar.wait(st).expect("slot mutex poisoned by a prior invariant violation");
        }
        if st.shutdown {
            return;
        }

        let job_type = st.job_type.expect("agent woken to Running with no job_type set");
        let accel_kind = st
            .accelerator_kind
            .expect("agent woken to Running with no accelerator_kind assigned");
        let accel_id = st.accelerator_id.expect("agent woken to Running with no accelerator_id assigned");
        drop(st);

        run_kernel(&sync, &kernels, job_type, accel_kind, accel_id);

        mark_done(&pool, &crate::slot::Slot { block_id, sync: Arc::clone(&sync) });
    }
}

fn run_kernel(
    sync: &SlotSync,
    kernels: &Arc<dyn KernelExecutor>,
    job_type: JobType,
    accel_kind: AcceleratorKind,
    accel_id: usize,
) {
    let mut st = sync.state.lock().unwrap();
    let result = match (accel_kind, job_type, &mut st.payload) {
        (AcceleratorKind::Cpu, JobType::Fft, Payload::Fft(p)) => kernels.cpu_fft(p),
        (AcceleratorKind::Cpu, JobType::Viterbi, Payload::Viterbi(p)) => kernels.cpu_viterbi(p),
        (AcceleratorKind::FftHw, JobType::Fft, Payload::Fft(p)) => kernels.hw_fft(accel_id, p),
        (AcceleratorKind::VitHw, JobType::Viterbi, Payload::Viterbi(p)) => kernels.hw_viterbi(accel_id, p),
        _ => {
            tracing::error!(
                ?accel_kind,
                ?job_type,
                "agent dispatched with a payload/job-type/accelerator-kind mismatch"
            );
            panic!("agent dispatch mismatch: accelerator {accel_kind:?} cannot run {job_type:?} with this payload");
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, ?accel_kind, ?job_type, "kernel execution failed");
        panic!("kernel execution failed on {accel_kind:?}/{job_type:?}: {e}");
    }
}
