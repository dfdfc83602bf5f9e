//! Network-interface core: bridges the server's session abstraction to the
//! isolated reliable-UDP transport worker.
//!
//! The [`NetworkInterface`] is driven once per server tick. It drains the
//! worker's event queue under a wall-clock budget, keeps the
//! [`SessionRegistry`] consistent with the transport's open connections,
//! decodes inbound application packets through the [`PacketDispatcher`], and
//! turns outbound packets into transport sends with the right reliability,
//! priority, and ACK bookkeeping. A crashed worker is detected every tick and
//! surfaced as a fatal error rather than a silent hang.

pub mod bandwidth;
pub mod dispatch;
pub mod failure;
pub mod handler;
pub mod interface;
pub mod session;

pub use bandwidth::NetworkStats;
pub use dispatch::{OutboundPacket, PacketDispatcher};
pub use failure::{FailureMonitor, InterfaceError};
pub use handler::{HandlerError, ServerQuery, SessionHandler};
pub use interface::{NetworkInterface, SendOutcome};
pub use session::{RegistryError, Session, SessionId, SessionRegistry};
