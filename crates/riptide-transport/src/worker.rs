//! Channel bridge between the main loop and a transport worker thread.
//!
//! The worker owns the sockets and the reliability machinery; the main loop
//! owns sessions and packet dispatch. They meet over a pair of crossbeam
//! channels: events flow worker → main, commands flow main → worker. A shared
//! liveness flag, flipped when the worker's endpoint is dropped, lets the
//! main loop observe a crashed worker — a panicking worker thread unwinds
//! through the endpoint's `Drop` and is indistinguishable from any other
//! termination.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::envelope::{Envelope, SendPriority};
use crate::event::{OptionValue, TransportEvent};
use crate::{ConnectionId, Transport};

/// One instruction from the main loop to the worker.
#[derive(Debug)]
pub enum TransportCommand {
    /// Send an encapsulated payload on a connection.
    SendEncapsulated {
        /// Destination connection.
        conn: ConnectionId,
        /// Envelope to deliver.
        envelope: Envelope,
        /// Scheduling hint.
        priority: SendPriority,
    },
    /// Send a raw datagram.
    SendRaw {
        /// Destination address.
        addr: SocketAddr,
        /// Datagram bytes.
        buffer: Vec<u8>,
    },
    /// Refuse packets from an address for a while.
    BlockAddress {
        /// Address to block.
        addr: IpAddr,
        /// How long to keep the block.
        timeout: Duration,
    },
    /// Set a named option.
    SendOption {
        /// Option name.
        name: String,
        /// Option value.
        value: OptionValue,
    },
    /// Terminate one connection.
    CloseSession {
        /// Connection to terminate.
        conn: ConnectionId,
        /// Close reason forwarded to the peer.
        reason: String,
    },
    /// Shut down gracefully, flushing queued sends.
    Shutdown,
    /// Shut down immediately, dropping queued sends.
    EmergencyShutdown,
}

/// Create a connected bridge pair.
///
/// The [`WorkerTransport`] goes to the main loop; the [`WorkerEndpoint`]
/// moves into the worker thread.
pub fn worker_channel() -> (WorkerTransport, WorkerEndpoint) {
    let (event_tx, event_rx) = unbounded();
    let (command_tx, command_rx) = unbounded();
    let alive = Arc::new(AtomicBool::new(true));
    (
        WorkerTransport {
            events: event_rx,
            commands: command_tx,
            alive: Arc::clone(&alive),
        },
        WorkerEndpoint {
            events: event_tx,
            commands: command_rx,
            alive,
        },
    )
}

/// Main-loop side of the bridge; implements [`Transport`].
pub struct WorkerTransport {
    events: Receiver<TransportEvent>,
    commands: Sender<TransportCommand>,
    alive: Arc<AtomicBool>,
}

impl WorkerTransport {
    fn command(&self, command: TransportCommand) {
        // A dead worker is surfaced through is_terminated(), not here.
        if self.commands.send(command).is_err() {
            tracing::trace!("dropping command for terminated transport worker");
        }
    }
}

impl Transport for WorkerTransport {
    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    fn is_terminated(&self) -> bool {
        !self.alive.load(Ordering::Acquire)
    }

    fn send_encapsulated(
        &mut self,
        conn: ConnectionId,
        envelope: Envelope,
        priority: SendPriority,
    ) {
        self.command(TransportCommand::SendEncapsulated {
            conn,
            envelope,
            priority,
        });
    }

    fn send_raw(&mut self, addr: SocketAddr, buffer: Vec<u8>) {
        self.command(TransportCommand::SendRaw { addr, buffer });
    }

    fn block_address(&mut self, addr: IpAddr, timeout: Duration) {
        self.command(TransportCommand::BlockAddress { addr, timeout });
    }

    fn send_option(&mut self, name: &str, value: OptionValue) {
        self.command(TransportCommand::SendOption {
            name: name.to_string(),
            value,
        });
    }

    fn close_session(&mut self, conn: ConnectionId, reason: &str) {
        self.command(TransportCommand::CloseSession {
            conn,
            reason: reason.to_string(),
        });
    }

    fn shutdown(&mut self) {
        self.command(TransportCommand::Shutdown);
    }

    fn emergency_shutdown(&mut self) {
        self.command(TransportCommand::EmergencyShutdown);
    }
}

/// Worker-thread side of the bridge.
///
/// Dropping the endpoint (normal return or panic unwind) marks the worker
/// terminated for the main loop.
pub struct WorkerEndpoint {
    events: Sender<TransportEvent>,
    commands: Receiver<TransportCommand>,
    alive: Arc<AtomicBool>,
}

impl WorkerEndpoint {
    /// Queue an event for the main loop. Returns `false` if the main side
    /// of the bridge is gone.
    pub fn push_event(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Pull the next command without blocking.
    pub fn try_next_command(&self) -> Option<TransportCommand> {
        self.commands.try_recv().ok()
    }

    /// Wait up to `timeout` for the next command. Returns `None` on timeout
    /// or when the main side is gone.
    pub fn next_command_timeout(&self, timeout: Duration) -> Option<TransportCommand> {
        self.commands.recv_timeout(timeout).ok()
    }
}

impl Drop for WorkerEndpoint {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
