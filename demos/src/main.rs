// demos/src/main.rs — hetsched demo driver
//
// Exercises the scheduler end-to-end: submits a mix of FFT and Viterbi
// tasks at varying criticality, waits on them, and prints a summary. Lives
// outside the library crate's public surface, the same way the reference
// CLI binaries sit alongside the library code they drive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use num_complex::Complex64;

use hetsched::payload::{FftPayload, ViterbiPayload};
use hetsched::{CritLevel, JobType, Payload, Scheduler, SchedulerConfig, Status};

const DEFAULT_CONFIG_PATH: &str = "/etc/hetsched/hetsched.toml";

#[derive(Parser)]
#[command(
    name = "hetsched-demo",
    version,
    about = "hetsched demo driver — submits sample FFT/Viterbi tasks through the scheduler"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file; falls back to built-in defaults if absent.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a fixed batch of FFT and Viterbi tasks and report completion.
    Run {
        #[arg(long, default_value_t = 8)]
        fft_tasks: usize,
        #[arg(long, default_value_t = 8)]
        viterbi_tasks: usize,
        #[arg(long, default_value_t = 2)]
        critical_tasks: usize,
    },
    /// Print the effective configuration and exit.
    Config,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = load_config(&cli.config);

    match cli.command {
        Commands::Config => print_config(&config, cli.json),
        Commands::Run {
            fft_tasks,
            viterbi_tasks,
            critical_tasks,
        } => run_batch(config, fft_tasks, viterbi_tasks, critical_tasks, cli.json),
    }
}

fn load_config(path: &str) -> SchedulerConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match SchedulerConfig::from_toml_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} failed to parse {path}: {e}, using defaults", "warning:".yellow());
                SchedulerConfig::default()
            }
        },
        Err(_) => SchedulerConfig::default(),
    }
}

fn print_config(config: &SchedulerConfig, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(config).unwrap());
    } else {
        println!("{config:#?}");
    }
}

fn run_batch(config: SchedulerConfig, fft_tasks: usize, viterbi_tasks: usize, critical_tasks: usize, json: bool) {
    let scheduler = match Scheduler::new(config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("{} {e}", "error:".red());
            std::process::exit(1);
        }
    };

    let mut slots = Vec::new();

    for i in 0..fft_tasks {
        let crit = if i < critical_tasks { CritLevel::Critical } else { CritLevel::Base };
        let slot = scheduler
            .acquire_slot(JobType::Fft, crit)
            .expect("pool exhausted while submitting demo FFT tasks");
        let samples: Vec<Complex64> = (0..16).map(|n| Complex64::new(n as f64, 0.0)).collect();
        slot.set_payload(Payload::Fft(FftPayload::new(4, samples)));
        scheduler.request_execution(&slot);
        slots.push(slot);
    }

    for i in 0..viterbi_tasks {
        let crit = if i < critical_tasks.saturating_sub(fft_tasks.min(critical_tasks)) {
            CritLevel::Elevated
        } else {
            CritLevel::Base
        };
        let slot = scheduler
            .acquire_slot(JobType::Viterbi, crit)
            .expect("pool exhausted while submitting demo Viterbi tasks");
        let encoded = vec![0xACu8, 0x9A, 0x00, 0xFF];
        slot.set_payload(Payload::Viterbi(ViterbiPayload::new(48, 24, 8, encoded)));
        scheduler.request_execution(&slot);
        slots.push(slot);
    }

    if !json {
        println!(
            "{} [{}] submitted {} tasks ({} critical)",
            "hetsched-demo:".cyan(),
            Utc::now().to_rfc3339(),
            slots.len(),
            scheduler.critical_count()
        );
    }

    scheduler.wait_all_critical();
    for slot in &slots {
        while slot.status() != Status::Done {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "submitted": slots.len(),
                "free_count": scheduler.free_count(),
            })
        );
    } else {
        println!(
            "{} [{}] all tasks completed",
            "hetsched-demo:".green(),
            Utc::now().to_rfc3339()
        );
    }

    for slot in slots {
        scheduler.release_slot(slot);
    }
    scheduler.wait_all_tasks_finish();
}
