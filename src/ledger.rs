// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Packet Ledger

use crate::types::{NodeId, Packet};

/// Packets currently moving through the network.
///
/// Queued packets live in their node's queue instead and are handed back here
/// once they win a hop. Delivered and dropped packets leave for good.
#[derive(Debug, Clone, Default)]
pub struct PacketLedger {
    packets: Vec<Packet>,
    next_id: u64,
}

impl PacketLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a packet at `source` and add it to the live set.
    pub fn mint(&mut self, source: NodeId, destination: NodeId, now_ms: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.packets.push(Packet {
            id,
            current_node: source.clone(),
            source,
            destination,
            created_at: now_ms,
            hops: 0,
        });
        id
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Packet> {
        self.packets.iter().find(|p| p.id == id)
    }

    pub(crate) fn push(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    /// Take the live set for a forwarding pass.
    pub(crate) fn take(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.packets)
    }

    /// Install the survivors of a forwarding pass.
    pub(crate) fn restore(&mut self, packets: Vec<Packet>) {
        debug_assert!(self.packets.is_empty());
        self.packets = packets;
    }

    /// Forget every live packet. Ids keep counting so they stay unique.
    pub fn clear(&mut self) {
        self.packets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_assigns_unique_ids() {
        let mut ledger = PacketLedger::new();
        let a = ledger.mint("A".into(), "B".into(), 0.0);
        let b = ledger.mint("A".into(), "C".into(), 0.0);
        assert_ne!(a, b);
        assert_eq!(ledger.len(), 2);

        let p = ledger.get(b).unwrap();
        assert_eq!(p.current_node, NodeId::from("A"));
        assert_eq!(p.destination, NodeId::from("C"));
        assert_eq!(p.hops, 0);
    }

    #[test]
    fn test_ids_survive_clear() {
        let mut ledger = PacketLedger::new();
        let first = ledger.mint("A".into(), "B".into(), 0.0);
        ledger.clear();
        assert!(ledger.is_empty());
        let second = ledger.mint("A".into(), "B".into(), 0.0);
        assert!(second > first);
    }
}
