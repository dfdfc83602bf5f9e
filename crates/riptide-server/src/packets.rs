//! Minimal packet catalog for the demo server.
//!
//! Two packet types are enough to exercise the full dispatch path: a ping
//! with a fixed-width timestamp and a chat line with a UTF-8 payload.

use riptide_proto::{DecodeError, Decoded, GamePacket, PacketCodec};

/// Identifier for [`PingPacket`].
pub const ID_PING: u8 = 0x01;

/// Identifier for [`ChatPacket`].
pub const ID_CHAT: u8 = 0x02;

/// Heartbeat ping carrying a millisecond timestamp.
pub struct PingPacket {
    /// Sender timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl GamePacket for PingPacket {
    fn packet_id(&self) -> u8 {
        ID_PING
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.timestamp_ms.to_be_bytes());
    }
}

/// A chat line.
pub struct ChatPacket {
    /// The chat message.
    pub message: String,
}

impl GamePacket for ChatPacket {
    fn packet_id(&self) -> u8 {
        ID_CHAT
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.message.as_bytes());
    }
}

/// Codec over the demo catalog.
pub struct DemoCodec;

impl PacketCodec for DemoCodec {
    fn decode(&self, id: u8, payload: &[u8]) -> Decoded {
        match id {
            ID_PING => match payload.try_into() {
                Ok(bytes) => Decoded::Packet(Box::new(PingPacket {
                    timestamp_ms: u64::from_be_bytes(bytes),
                })),
                Err(_) => Decoded::Malformed(DecodeError::Malformed {
                    id,
                    reason: format!("expected 8 timestamp bytes, got {}", payload.len()),
                }),
            },
            ID_CHAT => match std::str::from_utf8(payload) {
                Ok(message) => Decoded::Packet(Box::new(ChatPacket {
                    message: message.to_string(),
                })),
                Err(error) => Decoded::Malformed(DecodeError::Malformed {
                    id,
                    reason: format!("invalid UTF-8: {error}"),
                }),
            },
            other => Decoded::Unrecognized(other),
        }
    }
}
