//! Packet dispatch: demultiplex inbound buffers into typed packets and the
//! inverse encode path with envelope caching.
//!
//! Outbound packets are wrapped in [`OutboundPacket`], which owns the lazily
//! encoded frame bytes and an optional pre-built envelope. The cache is only
//! valid for sends that do not request an ACK — an ACK send needs its own
//! per-send sequence number, so it always gets a fresh envelope — and is
//! cleared whenever the packet is re-encoded.

use std::sync::Arc;

use riptide_proto::{Decoded, GamePacket, PacketCodec, frame_packet, split_frame};
use riptide_transport::Envelope;

/// An application packet on its way out, with encode and envelope caches.
pub struct OutboundPacket {
    packet: Box<dyn GamePacket>,
    encoded: Option<Arc<[u8]>>,
    cached: Option<Envelope>,
}

impl OutboundPacket {
    /// Wrap a typed packet for sending.
    pub fn new(packet: Box<dyn GamePacket>) -> Self {
        Self {
            packet,
            encoded: None,
            cached: None,
        }
    }

    /// The wrapped packet.
    pub fn packet(&self) -> &dyn GamePacket {
        self.packet.as_ref()
    }

    /// Whether the frame bytes have been built already.
    pub fn is_encoded(&self) -> bool {
        self.encoded.is_some()
    }

    /// Drop the encoded bytes and the cached envelope.
    ///
    /// Must be called after mutating the packet's content; a stale cache
    /// would otherwise keep broadcasting the old bytes.
    pub fn invalidate(&mut self) {
        self.encoded = None;
        self.cached = None;
    }

    /// The framed wire bytes, encoding on first use.
    fn encoded_bytes(&mut self) -> Arc<[u8]> {
        if let Some(encoded) = &self.encoded {
            return Arc::clone(encoded);
        }
        let mut payload = Vec::new();
        self.packet.encode_payload(&mut payload);
        let encoded: Arc<[u8]> = frame_packet(self.packet.packet_id(), &payload).into();
        self.encoded = Some(Arc::clone(&encoded));
        encoded
    }
}

/// Decodes inbound buffers through the codec and builds outbound envelopes.
pub struct PacketDispatcher {
    codec: Arc<dyn PacketCodec>,
}

impl PacketDispatcher {
    /// Create a dispatcher over the given packet catalog.
    pub fn new(codec: Arc<dyn PacketCodec>) -> Self {
        Self { codec }
    }

    /// Decode a raw inbound buffer into a typed packet.
    ///
    /// Framing errors (empty buffer, lone escape marker) surface as
    /// [`Decoded::Malformed`], same as codec-level payload failures: the
    /// dispatch site treats both as recoverable per-packet conditions.
    pub fn decode(&self, buffer: &[u8]) -> Decoded {
        match split_frame(buffer) {
            Ok(frame) => self.codec.decode(frame.packet_id, frame.payload),
            Err(error) => Decoded::Malformed(error),
        }
    }

    /// Build the envelope for one send of `packet`.
    ///
    /// Without an ACK sequence the envelope is cached on the packet and
    /// reused for repeated sends of the same bytes. With one, a fresh
    /// envelope is always built and the cache left untouched.
    pub fn encode(&self, packet: &mut OutboundPacket, ack_sequence: Option<u32>) -> Envelope {
        let buffer = packet.encoded_bytes();
        match ack_sequence {
            None => {
                if let Some(cached) = &packet.cached {
                    return cached.clone();
                }
                let envelope = Envelope::reliable_ordered(buffer);
                packet.cached = Some(envelope.clone());
                envelope
            }
            Some(sequence) => Envelope::reliable_ordered(buffer).with_ack_sequence(sequence),
        }
    }
}
