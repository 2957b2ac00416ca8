use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lockstep_core::config::HarnessConfig;
use lockstep_core::contention::{shared_sum, LockGranularity};
use lockstep_core::orchestrator::{Orchestrator, RunReport, Strategy};
use lockstep_core::primality::TrialDivision;
use lockstep_core::HarnessResult;

const CONTENTION_THREADS: usize = 2;
const CONTENTION_PER_THREAD: u64 = 5_000_000;

fn main() -> HarnessResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_thread_names(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    run_contention_demo()?;

    let orchestrator = Orchestrator::new(HarnessConfig::default(), Arc::new(TrialDivision))?;
    for (index, strategy) in Strategy::ALL.iter().enumerate() {
        print_header(&format!("Practical Example {}: {strategy}", index + 1));
        let report = orchestrator.run(*strategy)?;
        print_report(&report);
    }

    Ok(())
}

fn run_contention_demo() -> HarnessResult<()> {
    print_header("Lock granularity");
    for granularity in LockGranularity::ALL {
        let report = shared_sum(granularity, CONTENTION_THREADS, CONTENTION_PER_THREAD)?;
        println!(
            "{}: sum of {} x {} = {} (expected {}, lost {})",
            report.granularity,
            CONTENTION_THREADS,
            CONTENTION_PER_THREAD,
            report.total,
            report.expected,
            report.lost_updates()
        );
        println!("Duration: {:.6} seconds", report.elapsed.as_secs_f64());
    }
    println!("=======================================");
    Ok(())
}

fn print_header(title: &str) {
    println!("========== Running {title} ==========");
}

fn print_report(report: &RunReport) {
    println!("{report}");
    println!("Duration: {:.6} seconds", report.elapsed.as_secs_f64());
    println!("=======================================");
}
