//! Collaborator traits the owning server implements.

use std::net::SocketAddr;

use riptide_proto::GamePacket;

use crate::session::Session;

/// Opaque error from application-level packet handling.
///
/// The interface never inspects it; it is logged and converted into a short
/// address block for the offending peer.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives session lifecycle events and decoded packets.
///
/// Methods take `&self`; implementations use interior mutability where they
/// need state. Callbacks run on the tick thread, after the registry has
/// already been updated for the event being delivered.
pub trait SessionHandler: Send + Sync {
    /// A new session was opened by the transport.
    fn on_open(&self, session: &Session);

    /// A session was closed (by the transport or by the server).
    fn on_close(&self, session: &Session, reason: &str);

    /// A decoded application packet arrived for a live session.
    ///
    /// An error return is treated as a recoverable per-packet condition:
    /// logged at diagnostic level and answered with a temporary address
    /// block, never a connection or process failure.
    fn on_data_packet(
        &self,
        session: &Session,
        packet: Box<dyn GamePacket>,
    ) -> Result<(), HandlerError>;

    /// A raw, unencapsulated datagram arrived (query/discovery traffic).
    fn on_raw_packet(&self, addr: SocketAddr, buffer: &[u8]);
}

/// Server-side facts embedded in the discovery descriptor.
pub trait ServerQuery: Send + Sync {
    /// Players currently online.
    fn player_count(&self) -> u32;

    /// Configured player cap.
    fn max_player_count(&self) -> u32;
}
