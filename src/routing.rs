// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Shortest-Path Routing

//! All-pairs shortest-path routing over the fixed topology.
//!
//! Every link counts as one hop in both directions. The table is built with
//! Floyd-Warshall relaxation; intermediates are tried in node insertion
//! order and only a strictly shorter path replaces a known one, so ties go to
//! the lowest-indexed intermediate and rebuilding an unchanged topology
//! yields an identical table.

use std::collections::HashMap;

use crate::topology::Topology;
use crate::types::NodeId;

/// Distance sentinel for pairs with no path.
const UNREACHABLE: u32 = u32::MAX;

/// Next-hop table for every ordered node pair.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    dist: Vec<Vec<u32>>,
    next: Vec<Vec<Option<usize>>>,
}

impl RoutingTable {
    pub fn build(topology: &Topology) -> Self {
        let ids: Vec<NodeId> = topology.nodes().iter().map(|n| n.id.clone()).collect();
        let n = ids.len();
        let index = ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();

        let mut dist = vec![vec![UNREACHABLE; n]; n];
        let mut next = vec![vec![None; n]; n];
        for (i, row) in dist.iter_mut().enumerate() {
            row[i] = 0;
        }
        for (a, b) in topology.link_endpoints() {
            dist[a][b] = 1;
            dist[b][a] = 1;
            next[a][b] = Some(b);
            next[b][a] = Some(a);
        }

        for k in 0..n {
            for i in 0..n {
                if dist[i][k] == UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    if dist[k][j] == UNREACHABLE {
                        continue;
                    }
                    let through_k = dist[i][k] + dist[k][j];
                    if through_k < dist[i][j] {
                        dist[i][j] = through_k;
                        next[i][j] = next[i][k];
                    }
                }
            }
        }

        Self { ids, index, dist, next }
    }

    /// Number of nodes the table was built over.
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Next node on the shortest path from `from` to `to`, by topology index.
    ///
    /// `None` for unreachable pairs and for `from == to`.
    pub fn next_hop_index(&self, from: usize, to: usize) -> Option<usize> {
        self.next.get(from)?.get(to).copied().flatten()
    }

    /// Next node on the shortest path from `from` to `to`.
    pub fn next_hop(&self, from: &NodeId, to: &NodeId) -> Option<&NodeId> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        self.next_hop_index(from, to).map(|i| &self.ids[i])
    }

    /// Shortest hop count, `None` when unreachable.
    pub fn distance(&self, from: &NodeId, to: &NodeId) -> Option<u32> {
        let d = self.dist[self.index_of(from)?][self.index_of(to)?];
        (d != UNREACHABLE).then_some(d)
    }

    /// Full node sequence from `from` to `to`, both ends included.
    pub fn path(&self, from: &NodeId, to: &NodeId) -> Option<Vec<NodeId>> {
        let mut at = self.index_of(from)?;
        let target = self.index_of(to)?;
        let mut path = vec![self.ids[at].clone()];
        while at != target {
            at = self.next_hop_index(at, target)?;
            path.push(self.ids[at].clone());
            if path.len() > self.ids.len() {
                return None;
            }
        }
        Some(path)
    }

    fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkConfig, NodeConfig, TopologyConfig};

    fn topology(nodes: &[&str], links: &[(&str, &str)]) -> Topology {
        let cfg = TopologyConfig {
            nodes: nodes
                .iter()
                .map(|id| NodeConfig { id: id.to_string(), x: 0.0, y: 0.0, traffic_rate: 0.0 })
                .collect(),
            links: links
                .iter()
                .map(|(a, b)| LinkConfig { from: a.to_string(), to: b.to_string(), capacity: 1 })
                .collect(),
        };
        Topology::from_config(&cfg).unwrap()
    }

    #[test]
    fn test_line_topology_distances() {
        let topo = topology(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        let table = RoutingTable::build(&topo);
        assert_eq!(table.distance(&"A".into(), &"D".into()), Some(3));
        assert_eq!(table.distance(&"D".into(), &"A".into()), Some(3));
        assert_eq!(table.distance(&"B".into(), &"B".into()), Some(0));
        assert_eq!(table.next_hop(&"A".into(), &"D".into()), Some(&NodeId::from("B")));
        assert_eq!(table.next_hop(&"D".into(), &"A".into()), Some(&NodeId::from("C")));
    }

    #[test]
    fn test_self_has_no_next_hop() {
        let topo = topology(&["A", "B"], &[("A", "B")]);
        let table = RoutingTable::build(&topo);
        assert_eq!(table.next_hop(&"A".into(), &"A".into()), None);
    }

    #[test]
    fn test_disconnected_pair_is_unreachable() {
        let topo = topology(&["A", "B", "C"], &[("A", "B")]);
        let table = RoutingTable::build(&topo);
        assert_eq!(table.next_hop(&"A".into(), &"C".into()), None);
        assert_eq!(table.distance(&"C".into(), &"B".into()), None);
        assert_eq!(table.path(&"A".into(), &"C".into()), None);
    }

    #[test]
    fn test_unknown_node_has_no_route() {
        let topo = topology(&["A", "B"], &[("A", "B")]);
        let table = RoutingTable::build(&topo);
        assert_eq!(table.next_hop(&"A".into(), &"Z".into()), None);
    }

    #[test]
    fn test_tie_goes_to_lowest_indexed_intermediate() {
        // Square A-B-D and A-C-D: both two hops, B is indexed before C.
        let topo = topology(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let first = RoutingTable::build(&topo);
        let second = RoutingTable::build(&topo);
        assert_eq!(first.next_hop(&"A".into(), &"D".into()), Some(&NodeId::from("B")));
        assert_eq!(
            first.path(&"A".into(), &"D".into()),
            second.path(&"A".into(), &"D".into())
        );
    }

    #[test]
    fn test_paths_on_default_network_are_optimal() {
        let topo = Topology::from_config(&TopologyConfig::default()).unwrap();
        let table = RoutingTable::build(&topo);
        for a in topo.nodes() {
            for b in topo.nodes() {
                let path = table.path(&a.id, &b.id).unwrap();
                let hops = table.distance(&a.id, &b.id).unwrap();
                assert_eq!(path.len() as u32 - 1, hops);
                for pair in path.windows(2) {
                    assert!(topo.link_between(&pair[0], &pair[1]).is_some());
                }
                let mut seen = path.clone();
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), path.len(), "path revisits a node");
            }
        }
        assert_eq!(table.distance(&"A".into(), &"E".into()), Some(2));
        assert_eq!(table.distance(&"A".into(), &"D".into()), Some(2));
    }
}
