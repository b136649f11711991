// Congestion Benchmark Runner: seeded Monte Carlo over traffic scenarios
// Checks link capacity, queue bounds and packet conservation on every tick
//
// Usage:
//   cargo run --release --bin bench                       # All scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5           # Quick mode
//   cargo run --release --bin bench -- BOTTLENECK         # Filter by name
//   cargo run --release --bin bench -- --time-series      # Per-tick JSONL output
//   cargo run --release --bin bench -- --topology net.json

mod monte_carlo;
mod report;
mod scenarios;
mod time_series;

use clap::Parser;
use netflow_engine::TopologyConfig;
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Congestion benchmark runner
///
/// Runs every scenario N times with consecutive seeds and writes a JSON
/// report under the output directory.
#[derive(Parser, Debug)]
#[command(name = "bench")]
#[command(version, about, long_about = None)]
struct Args {
    /// Runs per scenario
    #[arg(long, default_value = "30")]
    runs: usize,

    /// Base seed; run i uses seed + i
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Write per-tick JSONL time series
    #[arg(long)]
    time_series: bool,

    /// Topology JSON file (defaults to the built-in five-node network)
    #[arg(long)]
    topology: Option<PathBuf>,

    /// Output directory for reports
    #[arg(long, default_value = "benchmark-results")]
    out: PathBuf,

    /// Only run scenarios whose name, label or category contains this
    filter: Option<String>,
}

fn load_topology(path: Option<&PathBuf>) -> Result<TopologyConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(TopologyConfig::from_json(&std::fs::read_to_string(p)?)?),
        None => Ok(TopologyConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,netflow_engine=info")),
        )
        .init();

    let args = Args::parse();
    let topology = load_topology(args.topology.as_ref())?;
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &args.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", args.filter);
        std::process::exit(1);
    }

    let ts_dir = args.time_series.then(|| args.out.join("time-series"));

    info!(
        runs = args.runs,
        seed = args.seed,
        scenarios = to_run.len(),
        nodes = topology.nodes.len(),
        links = topology.links.len(),
        "Starting benchmark"
    );

    println!("\n  Congestion Benchmark Runner");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", args.runs, args.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<34} {:>5} {:>12} {:>12} {:>10} {:>6} {:>7}",
        "Scenario", "Pass%", "Loss%", "Deliver%", "Lat(ms)", "PeakQ", "Time");
    println!("  {}", "-".repeat(92));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            args.runs,
            args.seed,
            &topology,
            ts_dir.as_deref(),
        )?;

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<34} {:>4}% {:>6.2}±{:<5.2} {:>6.2}±{:<5.2} {:>10.0} {:>6.1} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.loss_rate.mean * 100.0, report.loss_rate.half_width() * 100.0,
            report.delivery_rate.mean * 100.0, report.delivery_rate.half_width() * 100.0,
            report.avg_latency_ms.mean,
            report.peak_queue.mean,
            report.elapsed_ms.mean,
            status,
        );

        for run in report.individual_runs.iter().filter(|r| !r.pass) {
            println!("      seed {}: {}", run.seed, run.failures.join("; "));
        }

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(92));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis().to_string();

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: args.runs,
        base_seed: args.seed,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    std::fs::create_dir_all(&args.out)?;
    let path = args.out.join(format!("bench-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
