//! Application-protocol framing and packet codec contracts.
//!
//! The transport carries opaque byte buffers; this crate defines how an
//! application packet is told apart from transport-internal control traffic
//! (the escape-marker framing in [`framing`]) and the contracts a concrete
//! packet catalog must implement to plug into the network interface
//! ([`codec`]).

pub mod codec;
pub mod framing;

pub use codec::{DecodeError, Decoded, GamePacket, PacketCodec};
pub use framing::{ESCAPE_MARKER, Frame, RESERVED_MARKER, frame_packet, split_frame};

/// Wire-protocol revision advertised to discovery probes.
pub const PROTOCOL_VERSION: u32 = 91;

/// Game version string advertised to discovery probes.
pub const GAME_VERSION: &str = "0.16.2";
