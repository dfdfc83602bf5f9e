//! Transport envelopes: the delivery directive attached to every send.

use std::sync::Arc;

/// Delivery guarantee classes offered by the transport.
///
/// Wire discriminants follow the usual reliable-UDP numbering; the interface
/// core only ever sends [`Reliability::ReliableOrdered`], the rest exist for
/// completeness of the boundary API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Reliability {
    /// Fire and forget.
    Unreliable = 0,
    /// Fire and forget; stale arrivals are dropped.
    UnreliableSequenced = 1,
    /// Retransmitted until acknowledged, delivered in any order.
    Reliable = 2,
    /// Retransmitted until acknowledged, delivered in send order.
    ReliableOrdered = 3,
    /// Retransmitted until acknowledged; stale arrivals are dropped.
    ReliableSequenced = 4,
}

/// Send scheduling hint: immediate sends bypass the worker's batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendPriority {
    /// Queued with the worker's normal send batching.
    #[default]
    Normal,
    /// Flushed ahead of queued sends.
    Immediate,
}

/// One encapsulated send: payload plus reliability/ordering metadata.
///
/// The buffer is shared (`Arc`) so a pre-built envelope can be reused across
/// repeated or broadcast sends of the same encoded payload without copying.
/// An envelope carrying an `ack_sequence` must never be reused: each
/// ACK-requesting send needs its own freshly allocated sequence number.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The framed application bytes handed to the transport.
    pub buffer: Arc<[u8]>,
    /// Delivery guarantee for this send.
    pub reliability: Reliability,
    /// Ordering channel within the connection.
    pub order_channel: u8,
    /// Sequence number to correlate a later ACK notification, if requested.
    pub ack_sequence: Option<u32>,
}

impl Envelope {
    /// Build a reliable-ordered envelope on channel 0, the delivery class
    /// used for all application packets.
    pub fn reliable_ordered(buffer: Arc<[u8]>) -> Self {
        Self {
            buffer,
            reliability: Reliability::ReliableOrdered,
            order_channel: 0,
            ack_sequence: None,
        }
    }

    /// Attach an ACK sequence number to this envelope.
    pub fn with_ack_sequence(mut self, sequence: u32) -> Self {
        self.ack_sequence = Some(sequence);
        self
    }
}
