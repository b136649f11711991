// Monte Carlo Infrastructure: N seeded runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use netflow_engine::*;
use tracing::debug;

use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
///
/// Time is simulated: tick `t` happens at `t * TICK_INTERVAL_MS`.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    topology: &TopologyConfig,
    time_series_dir: Option<&std::path::Path>,
) -> Result<BenchResult, ConfigError> {
    let start = Instant::now();
    let config = SimulatorConfig { seed, topology: topology.clone() };
    let mut sim = NetworkSimulator::from_config(&config)?;

    if let Some(setup) = &scenario.setup {
        setup(&mut sim);
    }
    sim.start();

    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());
    let mut peak_queue = 0usize;
    let mut peak_utilization = 0.0_f64;
    let mut capacity_violations = 0u32;
    let mut queue_violations = 0u32;
    let mut conservation_violations = 0u32;

    for tick in 0..scenario.ticks {
        if let Some(event) = &scenario.mid_event {
            event(&mut sim, tick);
        }

        let now_ms = (tick + 1) as f64 * TICK_INTERVAL_MS;
        let outcome = sim.tick_core(now_ms);

        for link in sim.topology().links() {
            if link.current_load > link.capacity {
                capacity_violations += 1;
            }
            peak_utilization = peak_utilization.max(link.utilization);
        }
        for node in sim.topology().nodes() {
            if node.queue.len() > QUEUE_CAPACITY {
                queue_violations += 1;
            }
            peak_queue = peak_queue.max(node.queue.len());
        }
        let held = (outcome.in_flight + outcome.queued) as u64;
        if sim.stats().conservation_error(held) != 0 {
            conservation_violations += 1;
        }

        if let Some(ts) = time_series.as_mut() {
            ts.record(&outcome, &sim);
        }
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("{}-seed-{}.jsonl", scenario.name.to_lowercase(), seed));
        if let Err(e) = ts.write_jsonl(&path) {
            eprintln!("  Warning: failed to write time series: {}", e);
        }
    }

    let stats = sim.stats().clone();
    let final_in_flight = sim.packets().len();
    let final_queued = sim.total_queued();

    let mut failures = Vec::new();
    if capacity_violations > 0 {
        failures.push(format!("{} link load violations", capacity_violations));
    }
    if queue_violations > 0 {
        failures.push(format!("{} queue bound violations", queue_violations));
    }
    if conservation_violations > 0 {
        failures.push(format!("{} conservation violations", conservation_violations));
    }
    let criteria = &scenario.criteria;
    if let Some(max) = criteria.max_loss_rate {
        if stats.loss_rate > max {
            failures.push(format!("loss rate {:.4} > {:.4}", stats.loss_rate, max));
        }
    }
    if let Some(min) = criteria.min_delivery_rate {
        if stats.delivery_rate() < min {
            failures.push(format!("delivery rate {:.4} < {:.4}", stats.delivery_rate(), min));
        }
    }
    if criteria.require_zero_drops && stats.total_packets_dropped > 0 {
        failures.push(format!("{} packets dropped", stats.total_packets_dropped));
    }
    if criteria.require_idle && stats.total_packets_generated > 0 {
        failures.push(format!("{} packets generated on idle network", stats.total_packets_generated));
    }
    if criteria.require_drained && final_in_flight + final_queued > 0 {
        failures.push(format!("{} packets still held", final_in_flight + final_queued));
    }

    let elapsed_ms = start.elapsed().as_millis();
    debug!(scenario = scenario.name, seed, pass = failures.is_empty(), elapsed_ms, "run finished");

    Ok(BenchResult {
        scenario: scenario.name.to_string(),
        seed,
        pass: failures.is_empty(),
        failures,
        ticks: scenario.ticks,
        generated: stats.total_packets_generated,
        delivered: stats.total_packets_delivered,
        dropped: stats.total_packets_dropped,
        loss_rate: stats.loss_rate,
        delivery_rate: stats.delivery_rate(),
        avg_latency_ms: stats.average_latency,
        throughput_per_tick: stats.throughput,
        peak_queue,
        peak_utilization,
        capacity_violations,
        queue_violations,
        conservation_violations,
        final_in_flight,
        final_queued,
        elapsed_ms,
    })
}

/// Run `runs` seeded iterations of a scenario and aggregate them.
pub fn run_monte_carlo(
    scenario: &Scenario,
    runs: usize,
    base_seed: u64,
    topology: &TopologyConfig,
    time_series_dir: Option<&std::path::Path>,
) -> Result<MonteCarloReport, ConfigError> {
    let results = (0..runs as u64)
        .map(|i| run_single(scenario, base_seed + i, topology, time_series_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let sample = |f: fn(&BenchResult) -> f64| -> Stats {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };
    let passed = results.iter().filter(|r| r.pass).count();

    Ok(MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: runs,
        pass_rate: if runs > 0 { passed as f64 / runs as f64 } else { 0.0 },
        loss_rate: sample(|r| r.loss_rate),
        delivery_rate: sample(|r| r.delivery_rate),
        avg_latency_ms: sample(|r| r.avg_latency_ms),
        throughput_per_tick: sample(|r| r.throughput_per_tick),
        peak_queue: sample(|r| r.peak_queue as f64),
        peak_utilization: sample(|r| r.peak_utilization),
        elapsed_ms: sample(|r| r.elapsed_ms as f64),
        individual_runs: results,
    })
}
