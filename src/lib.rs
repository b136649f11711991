// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator

//! Discrete-time packet simulator for visualizing congestion.
//!
//! Packets are generated at every node each tick, routed hop by hop along
//! shortest paths, and either admitted onto a link with spare capacity,
//! parked in the node's bounded queue, or dropped. The engine is a plain Rust
//! type; the `#[wasm_bindgen]` surface below exposes the same control
//! operations to a JavaScript host.

pub mod types;
pub mod config;
pub mod queue;
pub mod topology;
pub mod routing;
pub mod ledger;
pub mod stats;
pub mod simulation;
pub mod control;

pub use types::*;
pub use config::{ConfigError, LinkConfig, NodeConfig, SimulatorConfig, TopologyConfig};
pub use control::{ControlCommand, ControlError};
pub use routing::RoutingTable;
pub use simulation::NetworkSimulator;
pub use stats::SimulationStats;
pub use topology::Topology;

use tracing::info;
use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl NetworkSimulator {
    /// Engine over the default five-node network.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = SimulatorConfig { seed: seed as u64, ..SimulatorConfig::default() };
        match Self::from_config(&config) {
            Ok(sim) => sim,
            // The built-in topology always validates
            Err(e) => unreachable!("default topology rejected: {e}"),
        }
    }

    /// Engine over a caller-supplied `SimulatorConfig` object.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config_js(config: JsValue) -> Result<NetworkSimulator, JsValue> {
        let config: SimulatorConfig = serde_wasm_bindgen::from_value(config)?;
        Self::from_config(&config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(tick = self.current_tick, "simulation started");
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        if self.running {
            info!(tick = self.current_tick, "simulation paused");
        }
        self.running = false;
    }

    /// Clear traffic, queues and statistics; rates and capacities are kept.
    pub fn reset(&mut self) {
        self.reset_traffic();
        info!("simulation reset");
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Unknown node ids are ignored.
    #[wasm_bindgen(js_name = setNodeRate)]
    pub fn set_node_rate(&mut self, node_id: &str, rate: f64) -> bool {
        self.topology.set_node_rate(&NodeId::from(node_id), rate)
    }

    /// Unknown link ids are ignored.
    #[wasm_bindgen(js_name = setLinkCapacity)]
    pub fn set_link_capacity(&mut self, link_id: &str, capacity: u32) -> bool {
        self.topology.set_link_capacity(&LinkId::from(link_id), capacity)
    }

    pub fn tick(&mut self, now_ms: f64) -> JsValue {
        let outcome = self.tick_core(now_ms);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    pub fn step(&mut self, now_ms: f64) -> JsValue {
        let outcome = self.step_core(now_ms);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.state()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getPacket)]
    pub fn get_packet(&self, packet_id: u32) -> JsValue {
        match self.ledger.get(packet_id as u64) {
            Some(p) => serde_wasm_bindgen::to_value(p).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Decode and apply a control command object such as
    /// `{ type: "updateTrafficRate", nodeId: "A", rate: 4 }`.
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command_js(&mut self, command: JsValue, now_ms: f64) -> Result<bool, JsValue> {
        let command: ControlCommand = serde_wasm_bindgen::from_value(command)
            .map_err(|e| JsValue::from_str(&ControlError::Decode(e.to_string()).to_string()))?;
        Ok(self.apply_command(command, now_ms))
    }
}
