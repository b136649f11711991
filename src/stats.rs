// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Statistics

use serde::{Deserialize, Serialize};

/// Running traffic counters since the last reset.
///
/// `average_latency` is an exact running mean over every delivered packet,
/// updated per delivery without keeping per-packet history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    pub total_packets_generated: u64,
    pub total_packets_delivered: u64,
    pub total_packets_dropped: u64,
    /// Milliseconds.
    pub average_latency: f64,
    /// Ticks executed since the last reset.
    pub ticks: u64,
    /// Dropped / generated, 0 when nothing was generated.
    pub loss_rate: f64,
    /// Delivered packets per executed tick.
    pub throughput: f64,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_generated(&mut self) {
        self.total_packets_generated += 1;
        self.refresh_derived();
    }

    pub fn record_dropped(&mut self) {
        self.total_packets_dropped += 1;
        self.refresh_derived();
    }

    /// Count a delivery and fold its latency into the running mean.
    pub fn record_delivered(&mut self, latency_ms: f64) {
        self.total_packets_delivered += 1;
        let n = self.total_packets_delivered as f64;
        self.average_latency = (self.average_latency * (n - 1.0) + latency_ms) / n;
        self.refresh_derived();
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
        self.refresh_derived();
    }

    /// Packets generated but neither delivered nor dropped.
    pub fn outstanding(&self) -> u64 {
        self.total_packets_generated
            .saturating_sub(self.total_packets_delivered + self.total_packets_dropped)
    }

    /// Difference between the outstanding count implied by the counters and
    /// the packets actually held in flight or in queues.
    ///
    /// In a sound run: `generated == delivered + dropped + in_flight + queued`,
    /// so this returns zero.
    pub fn conservation_error(&self, held: u64) -> i64 {
        self.total_packets_generated as i64
            - (self.total_packets_delivered + self.total_packets_dropped + held) as i64
    }

    pub fn delivery_rate(&self) -> f64 {
        if self.total_packets_generated == 0 {
            0.0
        } else {
            self.total_packets_delivered as f64 / self.total_packets_generated as f64
        }
    }

    fn refresh_derived(&mut self) {
        self.loss_rate = if self.total_packets_generated == 0 {
            0.0
        } else {
            self.total_packets_dropped as f64 / self.total_packets_generated as f64
        };
        self.throughput = if self.ticks == 0 {
            0.0
        } else {
            self.total_packets_delivered as f64 / self.ticks as f64
        };
    }
}
