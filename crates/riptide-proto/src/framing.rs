//! Escape-marker framing for application packets.
//!
//! Every application packet rides inside a transport envelope as:
//!
//! ```text
//! +--------+------------+------------------+
//! | 0xFE   | identifier |   payload        |
//! | escape | (1 byte)   |   (rest)         |
//! +--------+------------+------------------+
//! ```
//!
//! The leading `0xFE` escape marker distinguishes application traffic from
//! transport-internal control messages sharing the same byte stream. On the
//! inbound side the marker is optional: a first byte other than `0xFE` is
//! itself the identifier, with the payload starting right after it. This
//! keeps the decoder compatible with peers that send the bare one-byte form.

use crate::codec::DecodeError;

/// Byte value reserved as the escape prefix for application packets.
pub const ESCAPE_MARKER: u8 = 0xFE;

/// Byte value reserved for future protocol use; never a valid identifier.
pub const RESERVED_MARKER: u8 = 0xFF;

/// A parsed view into a raw inbound buffer: the packet identifier and the
/// payload slice that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// The application packet identifier.
    pub packet_id: u8,
    /// The packet payload (may be empty).
    pub payload: &'a [u8],
}

/// Split a raw inbound buffer into identifier and payload.
///
/// A first byte of [`ESCAPE_MARKER`] means the real identifier is the second
/// byte and the payload starts at offset 2; otherwise the first byte is the
/// identifier and the payload starts at offset 1.
///
/// Returns [`DecodeError::Truncated`] for an empty buffer or a lone escape
/// marker with no identifier byte behind it.
pub fn split_frame(buffer: &[u8]) -> Result<Frame<'_>, DecodeError> {
    match buffer {
        [] => Err(DecodeError::Truncated),
        [ESCAPE_MARKER] => Err(DecodeError::Truncated),
        [ESCAPE_MARKER, packet_id, payload @ ..] => Ok(Frame {
            packet_id: *packet_id,
            payload,
        }),
        [packet_id, payload @ ..] => Ok(Frame {
            packet_id: *packet_id,
            payload,
        }),
    }
}

/// Frame an outbound packet: escape marker, identifier, payload.
///
/// Outbound traffic always uses the escaped two-byte form, so an identifier
/// equal to [`ESCAPE_MARKER`] is unambiguous on the wire.
pub fn frame_packet(packet_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + payload.len());
    out.push(ESCAPE_MARKER);
    out.push(packet_id);
    out.extend_from_slice(payload);
    out
}
