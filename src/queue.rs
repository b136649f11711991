// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Network Congestion Simulator - Bounded Node Queue

use serde::Serialize;
use std::collections::VecDeque;

use crate::types::{Packet, QUEUE_CAPACITY};

/// Bounded FIFO of packets waiting at a node for link capacity.
///
/// Holds at most [`QUEUE_CAPACITY`] packets. A push against a full queue hands
/// the packet back so the caller can count it as dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PacketQueue {
    packets: VecDeque<Packet>,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self { packets: VecDeque::with_capacity(QUEUE_CAPACITY) }
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.packets.len() >= QUEUE_CAPACITY
    }

    /// Enqueue at the tail, or return the packet if the queue is full.
    pub fn push(&mut self, packet: Packet) -> Result<(), Packet> {
        if self.is_full() {
            return Err(packet);
        }
        self.packets.push_back(packet);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.packets.iter()
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }

    /// Take every queued packet out, oldest first, leaving the queue empty.
    pub(crate) fn take(&mut self) -> VecDeque<Packet> {
        std::mem::take(&mut self.packets)
    }

    /// Install the retry buffer built from a previous [`take`](Self::take).
    ///
    /// The buffer never outgrows what was taken, so the bound still holds.
    pub(crate) fn restore(&mut self, retry: VecDeque<Packet>) {
        debug_assert!(retry.len() <= QUEUE_CAPACITY);
        self.packets = retry;
    }
}
