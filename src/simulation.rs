// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Simulation Core

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};
use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, SimulatorConfig};
use crate::ledger::PacketLedger;
use crate::routing::RoutingTable;
use crate::stats::SimulationStats;
use crate::topology::Topology;
use crate::types::*;

// ─── NetworkSimulator struct ─────────────────────────────────────────────────

/// Discrete-time packet simulator over a fixed topology.
///
/// Owns the topology, the routing table, every live packet and the running
/// statistics. All mutation goes through its methods, one tick or one control
/// call at a time.
#[wasm_bindgen]
pub struct NetworkSimulator {
    pub(crate) topology: Topology,
    pub(crate) routes: RoutingTable,
    pub(crate) ledger: PacketLedger,
    pub(crate) stats: SimulationStats,
    pub(crate) running: bool,
    pub(crate) current_tick: u64,
    pub(crate) rng: ChaCha8Rng,
}

/// Result of trying to move a packet across its next link.
enum Hop {
    Advanced,
    Saturated,
    NoRoute,
}

// ─── Construction ────────────────────────────────────────────────────────────

impl NetworkSimulator {
    pub fn from_config(config: &SimulatorConfig) -> Result<Self, ConfigError> {
        let topology = Topology::from_config(&config.topology)?;
        Ok(Self::with_rng(topology, ChaCha8Rng::seed_from_u64(config.seed)))
    }

    /// Build an engine around an existing topology and random source.
    ///
    /// The routing table is computed here, so no engine exists without one.
    pub fn with_rng(topology: Topology, rng: ChaCha8Rng) -> Self {
        let routes = RoutingTable::build(&topology);
        Self {
            topology,
            routes,
            ledger: PacketLedger::new(),
            stats: SimulationStats::new(),
            running: false,
            current_tick: 0,
            rng,
        }
    }

    /// Recompute the routing table from the current topology.
    pub fn rebuild_routes(&mut self) {
        self.routes = RoutingTable::build(&self.topology);
        info!(nodes = self.routes.node_count(), "routing table rebuilt");
    }
}

// ─── Accessors ───────────────────────────────────────────────────────────────

impl NetworkSimulator {
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Packets in the live set (queued packets excluded).
    pub fn packets(&self) -> &[Packet] {
        self.ledger.packets()
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn total_queued(&self) -> usize {
        self.topology.nodes().iter().map(|n| n.queue.len()).sum()
    }

    /// Consolidated read-only view for observers.
    pub fn state(&self) -> NetworkState {
        NetworkState {
            tick: self.current_tick,
            nodes: self.topology.nodes().to_vec(),
            links: self.topology.links().to_vec(),
            packets: self.ledger.packets().to_vec(),
            running: self.running,
            stats: self.stats.clone(),
        }
    }
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl NetworkSimulator {
    /// Advance one tick if the simulation is running; a no-op when paused.
    pub fn tick_core(&mut self, now_ms: f64) -> TickOutcome {
        if !self.running {
            return TickOutcome {
                tick: self.current_tick,
                advanced: false,
                queued: self.total_queued(),
                in_flight: self.ledger.len(),
                ..TickOutcome::default()
            };
        }
        self.run_tick(now_ms)
    }

    /// Advance exactly one tick regardless of the running flag.
    pub fn step_core(&mut self, now_ms: f64) -> TickOutcome {
        self.run_tick(now_ms)
    }

    fn run_tick(&mut self, now_ms: f64) -> TickOutcome {
        assert_eq!(
            self.routes.node_count(),
            self.topology.nodes().len(),
            "routing table does not cover the topology"
        );

        self.current_tick += 1;
        let mut outcome = TickOutcome {
            tick: self.current_tick,
            advanced: true,
            ..TickOutcome::default()
        };

        // 1. Per-tick link state starts from zero
        self.topology.clear_transient();

        // 2. Traffic generation
        self.generate_traffic(now_ms, &mut outcome);

        // 3. Queued packets get first claim on link capacity
        self.retry_queued();

        // 4. Forward everything in the live set
        self.forward_packets(now_ms, &mut outcome);

        // 5. Derived display fields
        self.refresh_derived();
        self.stats.record_tick();

        outcome.queued = self.total_queued();
        outcome.in_flight = self.ledger.len();
        outcome
    }

    /// Each node emits `floor(rate / 2)` packets plus one more with
    /// probability equal to the fractional part of `rate / 2`.
    fn generate_traffic(&mut self, now_ms: f64, outcome: &mut TickOutcome) {
        let node_count = self.topology.nodes().len();
        if node_count < 2 {
            return;
        }

        for src in 0..node_count {
            let half = self.topology.nodes()[src].traffic_rate / 2.0;
            let guaranteed = half.floor();
            let extra_probability = half - guaranteed;

            for _ in 0..guaranteed as u64 {
                self.spawn_packet(src, now_ms, outcome);
            }
            if self.rng.gen::<f64>() < extra_probability {
                self.spawn_packet(src, now_ms, outcome);
            }
        }
    }

    /// Mint one packet at `src` bound for a uniformly chosen other node.
    fn spawn_packet(&mut self, src: usize, now_ms: f64, outcome: &mut TickOutcome) {
        let node_count = self.topology.nodes().len();
        let mut dst = self.rng.gen_range(0..node_count - 1);
        if dst >= src {
            dst += 1;
        }

        let nodes = self.topology.nodes_mut();
        let source = nodes[src].id.clone();
        let destination = nodes[dst].id.clone();
        nodes[src].packets_generated += 1;

        self.ledger.mint(source, destination, now_ms);
        self.stats.record_generated();
        outcome.generated += 1;
    }

    /// Retry up to `QUEUE_RETRY_BUDGET` queued packets per node, FIFO.
    ///
    /// Packets that win a hop rejoin the live set and are forwarded again in
    /// the same tick. Failed and unprocessed packets stay queued in order.
    fn retry_queued(&mut self) {
        for idx in 0..self.topology.nodes().len() {
            let mut pending = self.topology.nodes_mut()[idx].queue.take();
            let before = pending.len();
            if before == 0 {
                continue;
            }

            let mut retry = VecDeque::with_capacity(before);
            let mut processed = 0;
            while processed < QUEUE_RETRY_BUDGET {
                let Some(mut packet) = pending.pop_front() else {
                    break;
                };
                processed += 1;
                match Self::try_advance(&mut self.topology, &self.routes, &mut packet) {
                    Hop::Advanced => self.ledger.push(packet),
                    Hop::Saturated | Hop::NoRoute => retry.push_back(packet),
                }
            }
            retry.extend(pending);

            let after = retry.len();
            let node = &mut self.topology.nodes_mut()[idx];
            node.queue.restore(retry);
            debug!(node = %node.id, before, after, processed, "queue retry");
        }
    }

    /// Deliver, advance, queue or drop every packet in the live set.
    fn forward_packets(&mut self, now_ms: f64, outcome: &mut TickOutcome) {
        let live = self.ledger.take();
        let mut survivors = Vec::with_capacity(live.len());

        for mut packet in live {
            if packet.is_delivered() {
                self.deliver(&packet, now_ms);
                outcome.delivered += 1;
                continue;
            }

            match Self::try_advance(&mut self.topology, &self.routes, &mut packet) {
                Hop::Advanced => survivors.push(packet),
                Hop::NoRoute => {
                    trace!(packet = packet.id, node = %packet.current_node, "no route, dropped");
                    self.drop_packet(&packet);
                    outcome.dropped += 1;
                }
                Hop::Saturated => {
                    if let Err(packet) = self.enqueue(packet) {
                        trace!(packet = packet.id, node = %packet.current_node, "queue full, dropped");
                        self.drop_packet(&packet);
                        outcome.dropped += 1;
                    }
                }
            }
        }

        self.ledger.restore(survivors);
    }

    /// Admission check plus hop: moves the packet only if its next link has
    /// spare capacity this tick.
    fn try_advance(topology: &mut Topology, routes: &RoutingTable, packet: &mut Packet) -> Hop {
        let (Some(at), Some(dest)) = (
            topology.node_index(&packet.current_node),
            topology.node_index(&packet.destination),
        ) else {
            return Hop::NoRoute;
        };
        let Some(next) = routes.next_hop_index(at, dest) else {
            return Hop::NoRoute;
        };

        match topology.link_index(at, next) {
            Some(li) if topology.links()[li].has_spare_capacity() => {
                topology.link_mut(li).admit(packet.id);
                packet.advance_to(topology.nodes()[next].id.clone());
                Hop::Advanced
            }
            _ => Hop::Saturated,
        }
    }

    /// Park a packet at its current node; hands it back if the queue is full.
    fn enqueue(&mut self, packet: Packet) -> Result<(), Packet> {
        let Some(at) = self.topology.node_index(&packet.current_node) else {
            return Err(packet);
        };
        let node = &mut self.topology.nodes_mut()[at];
        node.queue.push(packet)?;
        trace!(node = %node.id, queue = node.queue.len(), "packet queued");
        Ok(())
    }

    fn deliver(&mut self, packet: &Packet, now_ms: f64) {
        if let Some(i) = self.topology.node_index(&packet.destination) {
            self.topology.nodes_mut()[i].packets_received += 1;
        }
        self.stats.record_delivered(now_ms - packet.created_at);
    }

    fn drop_packet(&mut self, packet: &Packet) {
        if let Some(i) = self.topology.node_index(&packet.current_node) {
            self.topology.nodes_mut()[i].packets_dropped += 1;
        }
        self.stats.record_dropped();
    }

    fn refresh_derived(&mut self) {
        for link in self.topology.links_mut() {
            link.refresh_utilization();
        }
        for node in self.topology.nodes_mut() {
            node.queue_length = node.queue.len();
        }
    }

    /// Clear all traffic and statistics and pause. Topology is untouched.
    pub(crate) fn reset_traffic(&mut self) {
        self.running = false;
        self.current_tick = 0;
        self.ledger.clear();
        self.stats = SimulationStats::new();
        self.topology.reset_traffic();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkConfig, NodeConfig, TopologyConfig};

    fn line(rates: &[f64], capacity: u32) -> NetworkSimulator {
        let names = ["A", "B", "C", "D", "E"];
        let nodes = rates
            .iter()
            .enumerate()
            .map(|(i, &r)| NodeConfig { id: names[i].to_string(), x: 0.0, y: 0.0, traffic_rate: r })
            .collect();
        let links = (1..rates.len())
            .map(|i| LinkConfig {
                from: names[i - 1].to_string(),
                to: names[i].to_string(),
                capacity,
            })
            .collect();
        let config = SimulatorConfig { seed: 1, topology: TopologyConfig { nodes, links } };
        NetworkSimulator::from_config(&config).unwrap()
    }

    fn packet(id: u64, at: &str, dest: &str) -> Packet {
        Packet {
            id,
            source: at.into(),
            destination: dest.into(),
            current_node: at.into(),
            created_at: 0.0,
            hops: 0,
        }
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut sim = line(&[4.0, 0.0], 1);
        let outcome = sim.tick_core(0.0);
        assert!(!outcome.advanced);
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.stats().total_packets_generated, 0);
    }

    #[test]
    fn test_step_runs_while_paused() {
        let mut sim = line(&[4.0, 0.0], 1);
        let outcome = sim.step_core(0.0);
        assert!(outcome.advanced);
        assert_eq!(outcome.generated, 2);
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn test_integer_rate_generates_exactly_half() {
        let mut sim = line(&[6.0, 0.0, 0.0], 100);
        let outcome = sim.step_core(0.0);
        assert_eq!(outcome.generated, 3);
        assert_eq!(sim.topology().nodes()[0].packets_generated, 3);
        assert!(sim.packets().iter().all(|p| p.source == NodeId::from("A")));
    }

    #[test]
    fn test_destination_never_equals_source() {
        let mut sim = line(&[10.0, 10.0, 10.0], 100);
        for t in 0..20 {
            sim.step_core(t as f64);
            for p in sim.packets() {
                assert_ne!(p.source, p.destination);
            }
        }
    }

    #[test]
    fn test_retried_packet_can_advance_twice() {
        // A-B-C, capacity 1, packet queued at A bound for C.
        let mut sim = line(&[0.0, 0.0, 0.0], 1);
        sim.topology.nodes_mut()[0].queue.push(packet(500, "A", "C")).unwrap();
        sim.stats.record_generated();

        sim.step_core(0.0);
        let p = sim.ledger.get(500).unwrap();
        assert_eq!(p.current_node, NodeId::from("C"));
        assert_eq!(p.hops, 2);
        assert!(sim.topology().nodes()[0].queue.is_empty());
    }

    #[test]
    fn test_retry_budget_limits_queue_drain() {
        let mut sim = line(&[0.0, 0.0], 10);
        for id in 0..5 {
            sim.topology.nodes_mut()[0].queue.push(packet(id, "A", "B")).unwrap();
            sim.stats.record_generated();
        }

        sim.step_core(0.0);
        let remaining: Vec<u64> = sim.topology().nodes()[0].queue.iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![2, 3, 4]);
        assert_eq!(sim.topology().nodes()[0].queue_length, 3);
        // The two retried packets reached B and were delivered in the same tick
        assert_eq!(sim.stats().total_packets_delivered, 2);
        assert!(sim.ledger.is_empty());
    }

    #[test]
    fn test_unroutable_queued_packet_stays_queued() {
        let mut sim = line(&[0.0, 0.0], 10);
        // Destination outside the topology: no route.
        sim.topology.nodes_mut()[0].queue.push(packet(9, "A", "Z")).unwrap();
        sim.step_core(0.0);
        assert_eq!(sim.topology().nodes()[0].queue.len(), 1);
        assert_eq!(sim.stats().total_packets_dropped, 0);
    }

    #[test]
    fn test_utilization_is_percentage() {
        let mut sim = line(&[8.0, 0.0], 4);
        sim.step_core(0.0);
        let link = &sim.topology().links()[0];
        assert_eq!(link.current_load, 4);
        assert_eq!(link.utilization, 100.0);
        assert_eq!(link.packets_in_transit.len(), 4);
    }

    #[test]
    fn test_single_node_generates_nothing() {
        let config = SimulatorConfig {
            seed: 0,
            topology: TopologyConfig {
                nodes: vec![NodeConfig { id: "A".into(), x: 0.0, y: 0.0, traffic_rate: 9.0 }],
                links: vec![],
            },
        };
        let mut sim = NetworkSimulator::from_config(&config).unwrap();
        let outcome = sim.step_core(0.0);
        assert_eq!(outcome.generated, 0);
    }

    #[test]
    #[should_panic(expected = "routing table does not cover the topology")]
    fn test_tick_without_matching_routes_fails_fast() {
        let mut sim = line(&[2.0, 0.0], 1);
        let other = line(&[0.0, 0.0, 0.0], 1);
        sim.routes = other.routes.clone();
        sim.step_core(0.0);
    }
}
