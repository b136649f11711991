// Per-Tick JSONL Time Series Recorder
// Outputs one JSON line per tick for independent analysis

use netflow_engine::{NetworkSimulator, TickOutcome};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub generated: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub queued: usize,
    pub in_flight: usize,
    pub total_generated: u64,
    pub total_delivered: u64,
    pub total_dropped: u64,
    pub loss_rate: f64,
    pub average_latency_ms: f64,
    /// Utilization per link, in topology order.
    pub link_utilization: Vec<f64>,
    /// Queue length per node, in topology order.
    pub queue_lengths: Vec<usize>,
}

impl TickSnapshot {
    pub fn capture(outcome: &TickOutcome, sim: &NetworkSimulator) -> Self {
        let stats = sim.stats();
        Self {
            tick: outcome.tick,
            generated: outcome.generated,
            delivered: outcome.delivered,
            dropped: outcome.dropped,
            queued: outcome.queued,
            in_flight: outcome.in_flight,
            total_generated: stats.total_packets_generated,
            total_delivered: stats.total_packets_delivered,
            total_dropped: stats.total_packets_dropped,
            loss_rate: stats.loss_rate,
            average_latency_ms: stats.average_latency,
            link_utilization: sim.topology().links().iter().map(|l| l.utilization).collect(),
            queue_lengths: sim.topology().nodes().iter().map(|n| n.queue_length).collect(),
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, outcome: &TickOutcome, sim: &NetworkSimulator) {
        self.snapshots.push(TickSnapshot::capture(outcome, sim));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for snapshot in &self.snapshots {
            serde_json::to_writer(&mut file, snapshot)?;
            writeln!(file)?;
        }
        file.flush()
    }
}
