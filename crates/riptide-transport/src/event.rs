//! Events the transport worker delivers to the main loop.

use std::net::SocketAddr;

use crate::ConnectionId;

/// Value of a named out-of-band option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Free-form text (discovery strings, serialized reports).
    Text(String),
    /// Boolean toggle.
    Flag(bool),
}

/// One event pulled off the worker's queue.
///
/// Events for a single connection arrive in the order the worker enqueued
/// them; the consumer must not reorder them.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The worker accepted a new connection.
    SessionOpen {
        /// Token addressing the new connection.
        conn: ConnectionId,
        /// Remote peer address.
        addr: SocketAddr,
        /// Transport-level client identifier supplied by the peer.
        client_id: u64,
    },
    /// The worker dropped a connection.
    SessionClose {
        /// Token of the closed connection.
        conn: ConnectionId,
        /// Human-readable close reason.
        reason: String,
    },
    /// An application payload arrived inside a transport envelope.
    ///
    /// An empty buffer is a heartbeat/ack-only envelope and carries no
    /// application data.
    Encapsulated {
        /// Source connection.
        conn: ConnectionId,
        /// Raw framed application bytes.
        buffer: Vec<u8>,
    },
    /// An unencapsulated datagram arrived outside any connection
    /// (discovery probes, query traffic).
    Raw {
        /// Source address.
        addr: SocketAddr,
        /// Raw datagram bytes.
        buffer: Vec<u8>,
    },
    /// The worker reported a named option (e.g. a `"bandwidth"` report).
    Option {
        /// Option name.
        name: String,
        /// Option value.
        value: OptionValue,
    },
}
