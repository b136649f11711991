// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Control Commands

//! Control commands accepted from the transport layer.
//!
//! Each variant maps onto one engine operation. Decoding can fail; applying a
//! decoded command cannot, and unknown node or link ids are ignored.

use serde::{Deserialize, Serialize};

use crate::simulation::NetworkSimulator;
use crate::types::{LinkId, NodeId};

/// Errors from decoding a control payload.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid command payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ControlError {
    fn from(e: serde_json::Error) -> Self {
        ControlError::Decode(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlCommand {
    StartSimulation,
    PauseSimulation,
    ResetSimulation,
    /// Run one tick even while paused.
    Step,
    UpdateTrafficRate {
        #[serde(rename = "nodeId")]
        node_id: NodeId,
        rate: f64,
    },
    UpdateLinkCapacity {
        #[serde(rename = "linkId")]
        link_id: LinkId,
        capacity: u32,
    },
}

impl ControlCommand {
    pub fn from_json(json: &str) -> Result<Self, ControlError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl NetworkSimulator {
    /// Apply one command. `now_ms` is only read by [`ControlCommand::Step`].
    ///
    /// Returns whether observers should be sent a fresh snapshot; every
    /// command counts, including no-op parameter updates.
    pub fn apply_command(&mut self, command: ControlCommand, now_ms: f64) -> bool {
        match command {
            ControlCommand::StartSimulation => self.start(),
            ControlCommand::PauseSimulation => self.pause(),
            ControlCommand::ResetSimulation => self.reset(),
            ControlCommand::Step => {
                self.step_core(now_ms);
            }
            ControlCommand::UpdateTrafficRate { node_id, rate } => {
                self.topology.set_node_rate(&node_id, rate);
            }
            ControlCommand::UpdateLinkCapacity { link_id, capacity } => {
                self.topology.set_link_capacity(&link_id, capacity);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rate_update() {
        let cmd = ControlCommand::from_json(r#"{"type":"updateTrafficRate","nodeId":"A","rate":4}"#)
            .unwrap();
        assert_eq!(
            cmd,
            ControlCommand::UpdateTrafficRate { node_id: NodeId::from("A"), rate: 4.0 }
        );
    }

    #[test]
    fn test_decode_capacity_update() {
        let cmd = ControlCommand::from_json(
            r#"{"type":"updateLinkCapacity","linkId":"B-D","capacity":6}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ControlCommand::UpdateLinkCapacity { link_id: LinkId::from("B-D"), capacity: 6 }
        );
    }

    #[test]
    fn test_decode_rejects_negative_capacity() {
        let err = ControlCommand::from_json(
            r#"{"type":"updateLinkCapacity","linkId":"B-D","capacity":-1}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_decode_unit_commands() {
        assert_eq!(
            ControlCommand::from_json(r#"{"type":"startSimulation"}"#).unwrap(),
            ControlCommand::StartSimulation
        );
        assert_eq!(ControlCommand::from_json(r#"{"type":"step"}"#).unwrap(), ControlCommand::Step);
        assert!(ControlCommand::from_json(r#"{"type":"explode"}"#).is_err());
    }

    #[test]
    fn test_apply_commands() {
        let mut sim = NetworkSimulator::new(3);
        assert!(sim.apply_command(ControlCommand::StartSimulation, 0.0));
        assert!(sim.is_running());

        sim.apply_command(
            ControlCommand::UpdateTrafficRate { node_id: "C".into(), rate: 1.5 },
            0.0,
        );
        assert_eq!(sim.topology().node(&"C".into()).unwrap().traffic_rate, 1.5);

        // Unknown id: still reported as a publishable change, state untouched
        assert!(sim.apply_command(
            ControlCommand::UpdateLinkCapacity { link_id: "X-Y".into(), capacity: 3 },
            0.0,
        ));

        sim.apply_command(ControlCommand::PauseSimulation, 0.0);
        sim.apply_command(ControlCommand::Step, 1000.0);
        assert!(!sim.is_running());
        assert_eq!(sim.current_tick(), 1);

        sim.apply_command(ControlCommand::ResetSimulation, 0.0);
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.stats().total_packets_generated, 0);
    }
}
