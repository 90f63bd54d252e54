// Integration tests for the scheduler's end-to-end scenarios.

use std::time::Duration;

use num_complex::Complex64;
use pretty_assertions::assert_eq;

use hetsched::payload::{FftPayload, ViterbiPayload};
use hetsched::{AcceleratorKind, CritLevel, JobType, Payload, Scheduler, SchedulerConfig, SchedulerError, Status};

fn wait_done(slot: &hetsched::Slot) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while slot.status() != Status::Done {
        assert!(std::time::Instant::now() < deadline, "task did not complete in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn s1_single_cpu_fft() {
    let mut config = SchedulerConfig::default();
    config.pool_capacity = 4;
    config.cpu_count = 1;
    let scheduler = Scheduler::new(config).unwrap();

    let slot = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();
    let samples: Vec<Complex64> = (0..8).map(|n| Complex64::new(n as f64, 0.0)).collect();
    slot.set_payload(Payload::Fft(FftPayload::new(3, samples)));

    scheduler.request_execution(&slot);
    wait_done(&slot);

    slot.with_payload(|p| match p {
        Payload::Fft(p) => {
            let dc = p.samples[0];
            assert!((dc.re - 28.0).abs() < 1e-6, "bin 0 should be the sum of inputs");
        }
        _ => panic!("expected FFT payload"),
    });

    assert_eq!(slot.accelerator(), Some((AcceleratorKind::Cpu, 0)));
    scheduler.release_slot(slot);
}

#[test]
fn s2_pool_exhaustion() {
    let mut config = SchedulerConfig::default();
    config.pool_capacity = 2;
    config.cpu_count = 2;
    let scheduler = Scheduler::new(config).unwrap();

    let a = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();
    let b = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();

    match scheduler.acquire_slot(JobType::Fft, CritLevel::Base) {
        Err(SchedulerError::NoneAvailable) => {}
        Ok(_) => panic!("expected NoneAvailable, pool should have been exhausted"),
        Err(e) => panic!("expected NoneAvailable, got a different error: {e}"),
    }

    scheduler.release_slot(a);
    scheduler.release_slot(b);
}

#[test]
fn s3_critical_wait() {
    let mut config = SchedulerConfig::default();
    config.pool_capacity = 4;
    config.cpu_count = 1;
    let scheduler = Scheduler::new(config).unwrap();

    let base = scheduler.acquire_slot(JobType::Viterbi, CritLevel::Base).unwrap();
    base.set_payload(Payload::Viterbi(ViterbiPayload::new(48, 24, 8, vec![0xAC, 0x9A, 0x00, 0xFF])));

    let critical = scheduler.acquire_slot(JobType::Viterbi, CritLevel::Critical).unwrap();
    critical.set_payload(Payload::Viterbi(ViterbiPayload::new(48, 24, 8, vec![0xAC, 0x9A, 0x00, 0xFF])));

    scheduler.request_execution(&base);
    scheduler.request_execution(&critical);

    scheduler.wait_all_critical();
    assert_eq!(critical.status(), Status::Done);

    wait_done(&base);
    scheduler.release_slot(base);
    scheduler.release_slot(critical);
}

#[test]
fn s4_hardware_preference() {
    let mut config = SchedulerConfig::default();
    config.pool_capacity = 4;
    config.cpu_count = 1;
    config.fft_hw_present = true;
    config.fft_hw_count = 1;
    config.hw_preference_threshold = 100;
    let scheduler = Scheduler::new(config).unwrap();

    let slot = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();
    let samples = vec![Complex64::new(1.0, 0.0); 8];
    slot.set_payload(Payload::Fft(FftPayload::new(3, samples)));

    scheduler.request_execution(&slot);
    wait_done(&slot);

    assert_eq!(slot.accelerator().map(|(k, _)| k), Some(AcceleratorKind::FftHw));
    scheduler.release_slot(slot);
}

#[test]
fn s5_accelerator_release_invariant() {
    let mut config = SchedulerConfig::default();
    config.pool_capacity = 4;
    config.cpu_count = 1;
    let scheduler = Scheduler::new(config).unwrap();

    for _ in 0..5 {
        let slot = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();
        slot.set_payload(Payload::Fft(FftPayload::new(2, vec![Complex64::new(1.0, 0.0); 4])));
        scheduler.request_execution(&slot);
        wait_done(&slot);
        assert_eq!(scheduler.accelerator_owner(AcceleratorKind::Cpu, 0), Some(slot.block_id()));
        scheduler.release_slot(slot);
        assert_eq!(scheduler.accelerator_owner(AcceleratorKind::Cpu, 0), None);
    }
}

#[test]
fn s6_policy_misconfiguration() {
    let toml = "selection_policy = \"not_a_real_policy\"\n";
    let config = SchedulerConfig::from_toml_str(toml).unwrap();

    match Scheduler::new(config) {
        Err(SchedulerError::UnsupportedPolicy(_)) => {}
        Ok(_) => panic!("expected UnsupportedPolicy, construction should have failed"),
        Err(e) => panic!("expected UnsupportedPolicy, got a different error: {e}"),
    }
}

#[test]
fn hardware_present_without_hw_accel_feature_is_rejected_at_construction() {
    let mut config = SchedulerConfig::default();
    config.fft_hw_present = true;
    config.fft_hw_count = 2;

    match Scheduler::new(config) {
        Err(SchedulerError::HardwareNotCompiled(AcceleratorKind::FftHw)) => {}
        Ok(_) => panic!("expected HardwareNotCompiled, this build has no hw-accel feature"),
        Err(e) => panic!("expected HardwareNotCompiled, got a different error: {e}"),
    }
}

#[test]
fn builder_produces_an_equivalent_scheduler_to_a_config_literal() {
    let scheduler = Scheduler::builder()
        .pool_capacity(3)
        .cpu_count(2)
        .build()
        .unwrap();

    let slot = scheduler.acquire_slot(JobType::Fft, CritLevel::Base).unwrap();
    slot.set_payload(Payload::Fft(FftPayload::new(2, vec![Complex64::new(1.0, 0.0); 4])));
    scheduler.request_execution(&slot);
    wait_done(&slot);
    scheduler.release_slot(slot);

    assert_eq!(scheduler.free_count(), 3);
}
