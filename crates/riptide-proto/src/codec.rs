//! Packet codec contracts.
//!
//! The full application packet catalog lives outside this layer; the network
//! interface only needs a way to turn an identifier plus payload into a typed
//! packet and back. Decoding failures are data, not exceptions: a peer on a
//! different protocol revision sends identifiers we don't know, and a hostile
//! peer sends payloads that don't parse. Both come back as [`Decoded`]
//! variants for the dispatch site to match on.

/// A typed application packet that knows how to serialize itself.
pub trait GamePacket: Send {
    /// The one-byte identifier this packet is keyed by (0x00–0xFD; 0xFE and
    /// 0xFF are reserved by the framing layer).
    fn packet_id(&self) -> u8;

    /// Append the encoded payload (identifier excluded) to `out`.
    fn encode_payload(&self, out: &mut Vec<u8>);
}

/// Errors produced while turning raw bytes into a typed packet.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// The buffer was too short to contain a packet identifier.
    #[error("buffer too short to contain a packet identifier")]
    Truncated,

    /// The identifier was recognized but the payload did not parse.
    #[error("malformed payload for packet 0x{id:02x}: {reason}")]
    Malformed {
        /// The packet identifier the payload was decoded against.
        id: u8,
        /// Codec-specific description of what went wrong.
        reason: String,
    },
}

/// Outcome of a decode attempt.
pub enum Decoded {
    /// The identifier was recognized and the payload parsed.
    Packet(Box<dyn GamePacket>),
    /// No decoder is registered for this identifier. Not an error: peers on
    /// newer protocol revisions legitimately send identifiers we don't know.
    Unrecognized(u8),
    /// The identifier was recognized but the payload is malformed, or the
    /// buffer was too short to carry an identifier at all.
    Malformed(DecodeError),
}

impl std::fmt::Debug for Decoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decoded::Packet(packet) => f
                .debug_tuple("Packet")
                .field(&format_args!("0x{:02x}", packet.packet_id()))
                .finish(),
            Decoded::Unrecognized(id) => f.debug_tuple("Unrecognized").field(id).finish(),
            Decoded::Malformed(error) => f.debug_tuple("Malformed").field(error).finish(),
        }
    }
}

/// Decoder for the application packet catalog, keyed by packet identifier.
pub trait PacketCodec: Send + Sync {
    /// Decode `payload` as the packet type registered for `id`.
    fn decode(&self, id: u8, payload: &[u8]) -> Decoded;
}
