//! Transport boundary: the API the network interface consumes from the
//! reliable-UDP worker.
//!
//! The transport itself (connection establishment, retransmission, congestion
//! control, fragmentation) runs in an isolated worker and is out of scope
//! here. This crate defines the seam: the [`Transport`] trait the interface
//! drives each tick, the event and envelope types crossing that seam, a
//! channel-backed bridge for talking to a worker thread ([`worker`]), and the
//! address block list the worker consults before accepting packets
//! ([`block_list`]).

pub mod block_list;
pub mod envelope;
pub mod event;
pub mod worker;

pub use block_list::AddressBlockList;
pub use envelope::{Envelope, Reliability, SendPriority};
pub use event::{OptionValue, TransportEvent};
pub use worker::{TransportCommand, WorkerEndpoint, WorkerTransport, worker_channel};

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Opaque token the transport assigns to one peer connection.
///
/// Owned by the transport; the interface only ever uses it as a map key for
/// outbound addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// The boundary API an isolated transport worker exposes to the main loop.
///
/// All methods are non-blocking: [`poll_event`](Transport::poll_event) only
/// drains what is already queued, and the send methods enqueue without
/// waiting. Actual socket I/O happens on the worker's side of the boundary.
pub trait Transport: Send {
    /// Pull the next queued event, if any.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Whether the worker has terminated (cleanly or by crashing).
    fn is_terminated(&self) -> bool;

    /// Send an application payload inside a transport envelope.
    fn send_encapsulated(
        &mut self,
        conn: ConnectionId,
        envelope: Envelope,
        priority: SendPriority,
    );

    /// Send a raw, unencapsulated datagram to an arbitrary address.
    fn send_raw(&mut self, addr: SocketAddr, buffer: Vec<u8>);

    /// Refuse packets from `addr` for `timeout`.
    fn block_address(&mut self, addr: IpAddr, timeout: Duration);

    /// Set a named out-of-band option (discovery string, probe toggle, ...).
    fn send_option(&mut self, name: &str, value: OptionValue);

    /// Ask the worker to terminate one connection.
    fn close_session(&mut self, conn: ConnectionId, reason: &str);

    /// Ask the worker to shut down gracefully.
    fn shutdown(&mut self);

    /// Ask the worker to shut down immediately, dropping queued sends.
    fn emergency_shutdown(&mut self);
}
