// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::queue::PacketQueue;
use crate::stats::SimulationStats;

/// Maximum number of packets a node may hold while waiting for link capacity.
pub const QUEUE_CAPACITY: usize = 10;

/// Queued packets each node retries per tick before fresh traffic moves.
pub const QUEUE_RETRY_BUDGET: usize = 2;

/// Wall-clock cadence at which hosts drive ticks.
pub const TICK_INTERVAL_MS: f64 = 1000.0;

// ─── NodeId ──────────────────────────────────────────────────────────────────

/// Unique node key ("A", "B", ...)
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self { NodeId(s) }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self { NodeId(s.to_string()) }
}

// ─── LinkId ──────────────────────────────────────────────────────────────────

/// Link identity, derived from the configured `(from, to)` pair as `"from-to"`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub String);

impl LinkId {
    pub fn between(from: &NodeId, to: &NodeId) -> Self {
        LinkId(format!("{}-{}", from, to))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LinkId {
    fn from(s: &str) -> Self { LinkId(s.to_string()) }
}

// ─── Position ────────────────────────────────────────────────────────────────

/// Display coordinates. Never read by the simulation itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// ─── Packet ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    pub id: u64,
    pub source: NodeId,
    pub destination: NodeId,
    pub current_node: NodeId,
    /// Wall-clock creation time in milliseconds.
    pub created_at: f64,
    pub hops: u32,
}

impl Packet {
    pub fn is_delivered(&self) -> bool {
        self.current_node == self.destination
    }

    /// Move the packet one hop forward.
    pub(crate) fn advance_to(&mut self, next: NodeId) {
        self.current_node = next;
        self.hops += 1;
    }
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    /// Packets produced per tick (before halving), real and non-negative.
    pub traffic_rate: f64,
    pub queue: PacketQueue,
    /// Queue length as of the end of the last tick.
    pub queue_length: usize,
    pub packets_generated: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
}

impl Node {
    pub fn new(id: NodeId, position: Position, traffic_rate: f64) -> Self {
        Self {
            id,
            position,
            traffic_rate,
            queue: PacketQueue::new(),
            queue_length: 0,
            packets_generated: 0,
            packets_received: 0,
            packets_dropped: 0,
        }
    }

    /// Clear traffic state, keeping identity, position and rate.
    pub(crate) fn reset_traffic(&mut self) {
        self.queue.clear();
        self.queue_length = 0;
        self.packets_generated = 0;
        self.packets_received = 0;
        self.packets_dropped = 0;
    }
}

// ─── Link ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// Packets per tick.
    pub capacity: u32,
    pub current_load: u32,
    /// Ids of packets that crossed this link during the last tick.
    pub packets_in_transit: Vec<u64>,
    /// Load as a percentage of capacity for the last tick.
    pub utilization: f64,
}

impl Link {
    pub fn new(from: NodeId, to: NodeId, capacity: u32) -> Self {
        Self {
            id: LinkId::between(&from, &to),
            from,
            to,
            capacity,
            current_load: 0,
            packets_in_transit: Vec::new(),
            utilization: 0.0,
        }
    }

    pub fn has_spare_capacity(&self) -> bool {
        self.current_load < self.capacity
    }

    /// Admission: account for one packet crossing this tick.
    pub(crate) fn admit(&mut self, packet_id: u64) {
        debug_assert!(self.has_spare_capacity());
        self.current_load += 1;
        self.packets_in_transit.push(packet_id);
    }

    pub(crate) fn clear_transient(&mut self) {
        self.current_load = 0;
        self.packets_in_transit.clear();
    }

    pub(crate) fn refresh_utilization(&mut self) {
        self.utilization = if self.capacity == 0 {
            0.0
        } else {
            self.current_load as f64 / self.capacity as f64 * 100.0
        };
    }
}

// ─── TickOutcome ─────────────────────────────────────────────────────────────

/// Per-tick deltas reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutcome {
    pub tick: u64,
    /// False when the tick was skipped because the engine is paused.
    pub advanced: bool,
    pub generated: u64,
    pub delivered: u64,
    pub dropped: u64,
    /// Packets sitting in node queues after the tick.
    pub queued: usize,
    /// Packets in the live set after the tick.
    pub in_flight: usize,
}

// ─── NetworkState ────────────────────────────────────────────────────────────

/// Read-only snapshot published to observers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    pub tick: u64,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub packets: Vec<Packet>,
    pub running: bool,
    pub stats: SimulationStats,
}

impl NetworkState {
    pub fn total_queued(&self) -> usize {
        self.nodes.iter().map(|n| n.queue.len()).sum()
    }
}
