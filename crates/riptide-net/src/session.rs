//! Session registry: bidirectional connection ↔ session mapping plus
//! per-connection ACK sequence counters.
//!
//! Invariant: a session exists here if and only if the transport has an open
//! connection for it, and the forward (connection → session) and reverse
//! (session id → connection) maps are always consistent inverses. Closing
//! removes every trace before anyone is notified, so re-entrant lookups
//! during a closure callback never see a half-removed session.

use std::collections::HashMap;
use std::net::SocketAddr;

use riptide_transport::ConnectionId;

/// Stable handle for one session, unique for the process lifetime.
///
/// Assigned by the registry at open; never reused, even after the session
/// closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// One connected remote peer.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    conn: ConnectionId,
    addr: SocketAddr,
    client_id: u64,
}

impl Session {
    /// Stable session handle.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The transport connection this session rides on.
    pub fn connection(&self) -> ConnectionId {
        self.conn
    }

    /// Remote peer address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Remote peer port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Transport-level client identifier supplied by the peer.
    pub fn client_id(&self) -> u64 {
        self.client_id
    }
}

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The transport opened a session for a connection that is already
    /// mapped. This is a transport contract breach; the existing mapping is
    /// kept and the new open rejected.
    #[error("connection {0:?} is already mapped to a session")]
    DuplicateSession(ConnectionId),

    /// No session exists for the connection.
    #[error("no session for connection {0:?}")]
    UnknownSession(ConnectionId),
}

/// Maps transport connections to sessions and back, and allocates ACK
/// sequence numbers.
///
/// Mutated only from the tick thread (single writer); see the concurrency
/// notes on [`crate::interface::NetworkInterface`].
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_conn: HashMap<ConnectionId, Session>,
    by_session: HashMap<SessionId, ConnectionId>,
    ack_sequences: HashMap<ConnectionId, u32>,
    next_session: u64,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a session for a freshly opened connection.
    ///
    /// The per-connection ACK counter starts at 0. Rejects with
    /// [`RegistryError::DuplicateSession`] if the connection is already
    /// mapped; overwriting would orphan the existing session's reverse entry.
    pub fn open(
        &mut self,
        conn: ConnectionId,
        addr: SocketAddr,
        client_id: u64,
    ) -> Result<&Session, RegistryError> {
        if self.by_conn.contains_key(&conn) {
            return Err(RegistryError::DuplicateSession(conn));
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;

        self.by_session.insert(id, conn);
        self.ack_sequences.insert(conn, 0);
        Ok(self.by_conn.entry(conn).or_insert(Session {
            id,
            conn,
            addr,
            client_id,
        }))
    }

    /// Remove a session and all its bookkeeping.
    ///
    /// Returns the removed session so the caller can notify it after the
    /// maps are already clean. Closing an unmapped connection is a no-op.
    pub fn close(&mut self, conn: ConnectionId) -> Option<Session> {
        let session = self.by_conn.remove(&conn)?;
        self.by_session.remove(&session.id);
        self.ack_sequences.remove(&conn);
        Some(session)
    }

    /// Look up the session for a connection.
    pub fn session(&self, conn: ConnectionId) -> Option<&Session> {
        self.by_conn.get(&conn)
    }

    /// Look up the connection a session rides on.
    pub fn connection_of(&self, id: SessionId) -> Option<ConnectionId> {
        self.by_session.get(&id).copied()
    }

    /// Allocate the next ACK sequence number for a connection.
    ///
    /// Returns the current counter value and post-increments it: strictly
    /// increasing, never reused, never skipped. Does not auto-create state
    /// for unknown connections.
    pub fn next_ack_sequence(&mut self, conn: ConnectionId) -> Result<u32, RegistryError> {
        let counter = self
            .ack_sequences
            .get_mut(&conn)
            .ok_or(RegistryError::UnknownSession(conn))?;
        let sequence = *counter;
        *counter += 1;
        Ok(sequence)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.by_conn.len()
    }

    /// Whether no sessions are open.
    pub fn is_empty(&self) -> bool {
        self.by_conn.is_empty()
    }

    /// Iterate over open sessions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.by_conn.values()
    }
}
