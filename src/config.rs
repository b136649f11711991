// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Configuration

//! Topology and engine configuration.
//!
//! Only ids, endpoints and capacities are mandatory in JSON; the default
//! topology is the five-node congestion demo network.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from building a topology out of configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("topology has no nodes")]
    Empty,
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("link {from}-{to} references unknown node `{missing}`")]
    UnknownEndpoint { from: String, to: String, missing: String },
    #[error("link {0}-{0} connects a node to itself")]
    SelfLoop(String),
    #[error("duplicate link between `{0}` and `{1}`")]
    DuplicateLink(String, String),
    #[error("node `{id}` has invalid traffic rate {rate}")]
    InvalidRate { id: String, rate: f64 },
    #[error("link {0}-{1} has zero capacity")]
    ZeroCapacity(String, String),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, alias = "trafficRate")]
    pub traffic_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub from: String,
    pub to: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: Vec<NodeConfig>,
    pub links: Vec<LinkConfig>,
}

impl Default for TopologyConfig {
    /// Five nodes with deliberately low link capacities so the default
    /// traffic rates saturate them.
    fn default() -> Self {
        let node = |id: &str, x: f64, y: f64, traffic_rate: f64| NodeConfig {
            id: id.to_string(),
            x,
            y,
            traffic_rate,
        };
        let link = |from: &str, to: &str, capacity: u32| LinkConfig {
            from: from.to_string(),
            to: to.to_string(),
            capacity,
        };
        Self {
            nodes: vec![
                node("A", 150.0, 130.0, 15.0),
                node("B", 400.0, 130.0, 8.0),
                node("C", 275.0, 275.0, 10.0),
                node("D", 550.0, 275.0, 8.0),
                node("E", 400.0, 420.0, 12.0),
            ],
            links: vec![
                link("A", "B", 3),
                link("A", "C", 4),
                link("B", "C", 5),
                link("B", "D", 2),
                link("C", "D", 4),
                link("C", "E", 3),
                link("D", "E", 3),
            ],
        }
    }
}

impl TopologyConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Same nodes and links with every traffic rate replaced by `rate`.
    pub fn with_uniform_rate(mut self, rate: f64) -> Self {
        for n in &mut self.nodes {
            n.traffic_rate = rate;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Seed for destination choice and fractional-rate draws.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub topology: TopologyConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { seed: 0, topology: TopologyConfig::default() }
    }
}

impl SimulatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
