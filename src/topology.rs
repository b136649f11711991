// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Topology Store

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{ConfigError, TopologyConfig};
use crate::types::{Link, LinkId, Node, NodeId, Position};

/// Canonical key for an unordered node pair.
///
/// Links are undirected, so `(a, b)` and `(b, a)` must resolve to the same entry.
fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Fixed set of nodes and links in insertion order.
///
/// Static attributes come from configuration; the per-tick fields (queues,
/// loads, transit sets, utilization) live here but only the engine writes them.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
    node_index: HashMap<NodeId, usize>,
    link_by_pair: HashMap<(usize, usize), usize>,
    link_by_id: HashMap<LinkId, usize>,
}

impl Topology {
    pub fn from_config(config: &TopologyConfig) -> Result<Self, ConfigError> {
        if config.nodes.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut nodes = Vec::with_capacity(config.nodes.len());
        let mut node_index = HashMap::with_capacity(config.nodes.len());
        for nc in &config.nodes {
            if !nc.traffic_rate.is_finite() || nc.traffic_rate < 0.0 {
                return Err(ConfigError::InvalidRate { id: nc.id.clone(), rate: nc.traffic_rate });
            }
            let id = NodeId::from(nc.id.as_str());
            if node_index.insert(id.clone(), nodes.len()).is_some() {
                return Err(ConfigError::DuplicateNode(nc.id.clone()));
            }
            nodes.push(Node::new(id, Position { x: nc.x, y: nc.y }, nc.traffic_rate));
        }

        let mut links = Vec::with_capacity(config.links.len());
        let mut link_by_pair = HashMap::with_capacity(config.links.len());
        let mut link_by_id = HashMap::with_capacity(config.links.len());
        for lc in &config.links {
            let lookup = |name: &str| {
                node_index.get(&NodeId::from(name)).copied().ok_or_else(|| {
                    ConfigError::UnknownEndpoint {
                        from: lc.from.clone(),
                        to: lc.to.clone(),
                        missing: name.to_string(),
                    }
                })
            };
            let from = lookup(&lc.from)?;
            let to = lookup(&lc.to)?;
            if from == to {
                return Err(ConfigError::SelfLoop(lc.from.clone()));
            }
            if lc.capacity == 0 {
                return Err(ConfigError::ZeroCapacity(lc.from.clone(), lc.to.clone()));
            }
            if link_by_pair.insert(pair_key(from, to), links.len()).is_some() {
                return Err(ConfigError::DuplicateLink(lc.from.clone(), lc.to.clone()));
            }
            let link = Link::new(nodes[from].id.clone(), nodes[to].id.clone(), lc.capacity);
            link_by_id.insert(link.id.clone(), links.len());
            links.push(link);
        }

        Ok(Self { nodes, links, node_index, link_by_pair, link_by_id })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    pub fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.link_by_id.get(id).map(|&i| &self.links[i])
    }

    /// Look up the link joining two nodes, in either orientation.
    pub fn link_between(&self, a: &NodeId, b: &NodeId) -> Option<&Link> {
        self.link_index_between(a, b).map(|i| &self.links[i])
    }

    pub(crate) fn link_index_between(&self, a: &NodeId, b: &NodeId) -> Option<usize> {
        self.link_index(self.node_index(a)?, self.node_index(b)?)
    }

    /// Link joining two nodes given by topology index.
    pub(crate) fn link_index(&self, a: usize, b: usize) -> Option<usize> {
        self.link_by_pair.get(&pair_key(a, b)).copied()
    }

    /// Endpoint indices of every link, in insertion order.
    pub(crate) fn link_endpoints(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.links.iter().filter_map(move |l| {
            Some((self.node_index(&l.from)?, self.node_index(&l.to)?))
        })
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub(crate) fn link_mut(&mut self, index: usize) -> &mut Link {
        &mut self.links[index]
    }

    pub(crate) fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    /// Replace a node's generation rate. Returns whether anything changed.
    ///
    /// Unknown ids and out-of-domain rates are ignored.
    pub fn set_node_rate(&mut self, id: &NodeId, rate: f64) -> bool {
        if !rate.is_finite() || rate < 0.0 {
            warn!(node = %id, rate, "ignoring invalid traffic rate");
            return false;
        }
        match self.node_index(id) {
            Some(i) => {
                self.nodes[i].traffic_rate = rate;
                true
            }
            None => {
                debug!(node = %id, "traffic rate update for unknown node ignored");
                false
            }
        }
    }

    /// Replace a link's capacity. Returns whether anything changed.
    ///
    /// Unknown ids and zero capacities are ignored.
    pub fn set_link_capacity(&mut self, id: &LinkId, capacity: u32) -> bool {
        if capacity == 0 {
            warn!(link = %id, "ignoring zero link capacity");
            return false;
        }
        match self.link_by_id.get(id) {
            Some(&i) => {
                self.links[i].capacity = capacity;
                true
            }
            None => {
                debug!(link = %id, "capacity update for unknown link ignored");
                false
            }
        }
    }

    pub(crate) fn clear_transient(&mut self) {
        for link in &mut self.links {
            link.clear_transient();
        }
    }

    /// Drop all traffic state; rates, capacities and positions survive.
    pub(crate) fn reset_traffic(&mut self) {
        for node in &mut self.nodes {
            node.reset_traffic();
        }
        for link in &mut self.links {
            link.clear_transient();
            link.utilization = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkConfig, NodeConfig};

    fn default_topology() -> Topology {
        Topology::from_config(&TopologyConfig::default()).unwrap()
    }

    fn node_cfg(id: &str) -> NodeConfig {
        NodeConfig { id: id.to_string(), x: 0.0, y: 0.0, traffic_rate: 1.0 }
    }

    fn link_cfg(from: &str, to: &str, capacity: u32) -> LinkConfig {
        LinkConfig { from: from.to_string(), to: to.to_string(), capacity }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let topo = default_topology();
        let ids: Vec<&str> = topo.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(topo.links()[0].id.as_str(), "A-B");
        assert_eq!(topo.links()[6].id.as_str(), "D-E");
    }

    #[test]
    fn test_link_between_either_orientation() {
        let topo = default_topology();
        let forward = topo.link_between(&"B".into(), &"D".into()).unwrap();
        let reverse = topo.link_between(&"D".into(), &"B".into()).unwrap();
        assert_eq!(forward.id, reverse.id);
        assert_eq!(forward.capacity, 2);
        assert!(topo.link_between(&"A".into(), &"E".into()).is_none());
        assert!(topo.link_between(&"A".into(), &"Z".into()).is_none());
    }

    #[test]
    fn test_set_node_rate_known_and_unknown() {
        let mut topo = default_topology();
        assert!(topo.set_node_rate(&"A".into(), 4.0));
        assert_eq!(topo.node(&"A".into()).unwrap().traffic_rate, 4.0);

        let before: Vec<f64> = topo.nodes().iter().map(|n| n.traffic_rate).collect();
        assert!(!topo.set_node_rate(&"Q".into(), 99.0));
        assert!(!topo.set_node_rate(&"B".into(), -1.0));
        assert!(!topo.set_node_rate(&"B".into(), f64::NAN));
        let after: Vec<f64> = topo.nodes().iter().map(|n| n.traffic_rate).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_link_capacity_by_configured_id_only() {
        let mut topo = default_topology();
        assert!(topo.set_link_capacity(&"A-B".into(), 9));
        assert_eq!(topo.link(&"A-B".into()).unwrap().capacity, 9);
        // Reverse spelling is not a link id
        assert!(!topo.set_link_capacity(&"B-A".into(), 1));
        assert!(!topo.set_link_capacity(&"A-B".into(), 0));
        assert_eq!(topo.link(&"A-B".into()).unwrap().capacity, 9);
    }

    #[test]
    fn test_rejects_duplicate_reverse_link() {
        let cfg = TopologyConfig {
            nodes: vec![node_cfg("A"), node_cfg("B")],
            links: vec![link_cfg("A", "B", 1), link_cfg("B", "A", 1)],
        };
        assert!(matches!(Topology::from_config(&cfg), Err(ConfigError::DuplicateLink(..))));
    }

    #[test]
    fn test_rejects_bad_configs() {
        let unknown = TopologyConfig {
            nodes: vec![node_cfg("A")],
            links: vec![link_cfg("A", "B", 1)],
        };
        assert!(matches!(
            Topology::from_config(&unknown),
            Err(ConfigError::UnknownEndpoint { .. })
        ));

        let self_loop = TopologyConfig {
            nodes: vec![node_cfg("A")],
            links: vec![link_cfg("A", "A", 1)],
        };
        assert!(matches!(Topology::from_config(&self_loop), Err(ConfigError::SelfLoop(_))));

        let dup = TopologyConfig { nodes: vec![node_cfg("A"), node_cfg("A")], links: vec![] };
        assert!(matches!(Topology::from_config(&dup), Err(ConfigError::DuplicateNode(_))));

        let zero = TopologyConfig {
            nodes: vec![node_cfg("A"), node_cfg("B")],
            links: vec![link_cfg("A", "B", 0)],
        };
        assert!(matches!(Topology::from_config(&zero), Err(ConfigError::ZeroCapacity(..))));

        let mut negative = node_cfg("A");
        negative.traffic_rate = -2.0;
        let bad_rate = TopologyConfig { nodes: vec![negative], links: vec![] };
        assert!(matches!(Topology::from_config(&bad_rate), Err(ConfigError::InvalidRate { .. })));

        let empty = TopologyConfig { nodes: vec![], links: vec![] };
        assert!(matches!(Topology::from_config(&empty), Err(ConfigError::Empty)));
    }
}
