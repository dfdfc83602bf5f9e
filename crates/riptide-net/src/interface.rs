//! The network interface orchestrator.
//!
//! Lives on the main server loop and is driven once per tick. Everything
//! here is single-threaded: the transport worker produces events on its side
//! of the channel boundary, and [`NetworkInterface::process`] consumes them
//! without ever blocking — it drains what is already queued, bounded by a
//! one-second wall-clock cap so an event flood cannot stall the tick.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use riptide_proto::{Decoded, GAME_VERSION, PROTOCOL_VERSION, PacketCodec};
use riptide_transport::{
    ConnectionId, OptionValue, SendPriority, Transport, TransportEvent,
};

use crate::bandwidth::{self, NetworkStats};
use crate::dispatch::{OutboundPacket, PacketDispatcher};
use crate::failure::{FailureMonitor, InterfaceError};
use crate::handler::{ServerQuery, SessionHandler};
use crate::session::{RegistryError, SessionId, SessionRegistry};

/// Wall-clock cap on one tick's event drain.
const DRAIN_BUDGET: Duration = Duration::from_secs(1);

/// Block applied to peers whose packets fail to decode or handle.
const MISBEHAVIOR_BLOCK: Duration = Duration::from_secs(5);

/// Default administrator block duration.
const DEFAULT_BLOCK: Duration = Duration::from_secs(300);

/// Result of one outbound send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SendOutcome {
    /// The packet was handed to the transport.
    Sent {
        /// Sequence number to correlate the eventual ACK, when one was
        /// requested.
        ack_sequence: Option<u32>,
    },
    /// The session is gone (open/close race with the worker); nothing was
    /// sent. Not an error: callers routinely lose this race.
    UnknownSession,
}

impl SendOutcome {
    /// The allocated ACK sequence, if this send requested one and went out.
    pub fn ack_sequence(&self) -> Option<u32> {
        match self {
            SendOutcome::Sent { ack_sequence } => *ack_sequence,
            SendOutcome::UnknownSession => None,
        }
    }
}

/// Bridges the server's session abstraction to the transport worker.
///
/// All collaborators are injected at construction; the interface holds no
/// global state and can be instantiated once per transport worker.
pub struct NetworkInterface<T: Transport> {
    transport: T,
    registry: SessionRegistry,
    dispatcher: PacketDispatcher,
    handler: Arc<dyn SessionHandler>,
    query: Arc<dyn ServerQuery>,
    stats: Arc<NetworkStats>,
    monitor: FailureMonitor,
}

impl<T: Transport> NetworkInterface<T> {
    /// Wire up an interface over its collaborators.
    pub fn new(
        transport: T,
        codec: Arc<dyn PacketCodec>,
        handler: Arc<dyn SessionHandler>,
        query: Arc<dyn ServerQuery>,
        stats: Arc<NetworkStats>,
    ) -> Self {
        Self {
            transport,
            registry: SessionRegistry::new(),
            dispatcher: PacketDispatcher::new(codec),
            handler,
            query,
            stats,
            monitor: FailureMonitor::new(),
        }
    }

    /// Drive one tick: drain queued transport events, then check worker
    /// liveness. Returns whether any event was processed.
    ///
    /// The drain handles at least one event if available and keeps going
    /// while more are immediately there, aborting once [`DRAIN_BUDGET`] of
    /// wall-clock time has elapsed. The liveness check runs every tick even
    /// when no events arrived; the first observed termination unregisters
    /// the interface and returns [`InterfaceError::TransportCrashed`], after
    /// which the interface goes quiet.
    pub fn process(&mut self) -> Result<bool, InterfaceError> {
        if !self.monitor.is_registered() {
            return Ok(false);
        }

        let mut worked = false;
        if let Some(event) = self.transport.poll_event() {
            worked = true;
            self.handle_event(event);

            let drain_start = Instant::now();
            while let Some(event) = self.transport.poll_event() {
                self.handle_event(event);
                if drain_start.elapsed() >= DRAIN_BUDGET {
                    tracing::warn!("event drain exceeded its time budget, yielding tick");
                    break;
                }
            }
        }

        self.monitor.check(&self.transport)?;
        Ok(worked)
    }

    /// Whether the interface is still registered (no fatal failure seen).
    pub fn is_registered(&self) -> bool {
        self.monitor.is_registered()
    }

    /// Read access to the open sessions.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The bandwidth accumulator fed by the worker's reports.
    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::SessionOpen {
                conn,
                addr,
                client_id,
            } => self.open_session(conn, addr, client_id),
            TransportEvent::SessionClose { conn, reason } => self.close_session(conn, &reason),
            TransportEvent::Encapsulated { conn, buffer } => {
                self.handle_encapsulated(conn, &buffer);
            }
            TransportEvent::Raw { addr, buffer } => self.handler.on_raw_packet(addr, &buffer),
            TransportEvent::Option { name, value } => self.handle_option(&name, value),
        }
    }

    fn open_session(&mut self, conn: ConnectionId, addr: SocketAddr, client_id: u64) {
        match self.registry.open(conn, addr, client_id) {
            Ok(session) => {
                tracing::debug!("session {:?} opened for {addr}", session.id());
                self.handler.on_open(session);
            }
            Err(RegistryError::DuplicateSession(conn)) => {
                // Transport contract breach; keep the existing mapping.
                tracing::error!(
                    "transport opened {conn:?} twice, rejecting the new session for {addr}"
                );
            }
            Err(error @ RegistryError::UnknownSession(_)) => {
                tracing::error!("session open failed: {error}");
            }
        }
    }

    /// Transport-initiated close: update the registry, then notify.
    ///
    /// Idempotent; closing a connection that is already gone is a no-op.
    pub fn close_session(&mut self, conn: ConnectionId, reason: &str) {
        if let Some(session) = self.registry.close(conn) {
            tracing::debug!("session {:?} closed: {reason}", session.id());
            self.handler.on_close(&session, reason);
        }
    }

    /// Server-initiated close: tell the transport to terminate the
    /// connection, then drop the registry entry.
    ///
    /// Converges on the same state as [`close_session`](Self::close_session)
    /// and is equally idempotent. The handler is not notified — the server
    /// initiated this close and already knows.
    pub fn close(&mut self, session: SessionId, reason: &str) {
        if let Some(conn) = self.registry.connection_of(session) {
            self.transport.close_session(conn, reason);
            self.registry.close(conn);
        }
    }

    fn handle_encapsulated(&mut self, conn: ConnectionId, buffer: &[u8]) {
        // Heartbeat/ack-only envelope.
        if buffer.is_empty() {
            return;
        }
        // The session may have closed a moment ago; that race is benign.
        let Some(session) = self.registry.session(conn) else {
            return;
        };

        let peer = session.addr().ip();
        match self.dispatcher.decode(buffer) {
            Decoded::Packet(packet) => {
                if let Err(error) = self.handler.on_data_packet(session, packet) {
                    tracing::debug!("handler rejected packet from {peer}: {error}");
                    self.transport.block_address(peer, MISBEHAVIOR_BLOCK);
                }
            }
            Decoded::Unrecognized(id) => {
                // Peers on other protocol revisions send ids we don't know.
                tracing::trace!("ignoring unrecognized packet 0x{id:02x} from {peer}");
            }
            Decoded::Malformed(error) => {
                tracing::debug!("malformed packet from {peer}: {error}");
                self.transport.block_address(peer, MISBEHAVIOR_BLOCK);
            }
        }
    }

    fn handle_option(&mut self, name: &str, value: OptionValue) {
        match (name, value) {
            ("bandwidth", OptionValue::Text(text)) => match bandwidth::parse_report(&text) {
                Ok(report) => self.stats.add_throughput(report.up, report.down),
                Err(error) => {
                    tracing::debug!("discarding unparseable bandwidth report: {error}");
                }
            },
            (name, value) => tracing::trace!("ignoring transport option {name:?} = {value:?}"),
        }
    }

    /// Send an application packet to a session.
    ///
    /// `needs_ack` allocates and returns a per-connection sequence number so
    /// the caller can correlate the transport's eventual ACK; `immediate`
    /// bypasses the worker's send batching. A session that is already gone
    /// yields [`SendOutcome::UnknownSession`] — sending into an open/close
    /// race is expected and must not be an error.
    pub fn send(
        &mut self,
        session: SessionId,
        packet: &mut OutboundPacket,
        needs_ack: bool,
        immediate: bool,
    ) -> SendOutcome {
        let Some(conn) = self.registry.connection_of(session) else {
            return SendOutcome::UnknownSession;
        };

        let ack_sequence = if needs_ack {
            match self.registry.next_ack_sequence(conn) {
                Ok(sequence) => Some(sequence),
                // Maps and counters are kept in lockstep; treat a missing
                // counter like the session race above.
                Err(_) => return SendOutcome::UnknownSession,
            }
        } else {
            None
        };

        let envelope = self.dispatcher.encode(packet, ack_sequence);
        let priority = if immediate {
            SendPriority::Immediate
        } else {
            SendPriority::Normal
        };
        self.transport.send_encapsulated(conn, envelope, priority);
        SendOutcome::Sent { ack_sequence }
    }

    /// Send a raw, unencapsulated datagram (query replies and the like).
    pub fn send_raw(&mut self, addr: SocketAddr, buffer: Vec<u8>) {
        self.transport.send_raw(addr, buffer);
    }

    /// Block an address for the default administrator timeout.
    pub fn block_address(&mut self, addr: IpAddr) {
        self.block_address_for(addr, DEFAULT_BLOCK);
    }

    /// Block an address for a specific duration.
    pub fn block_address_for(&mut self, addr: IpAddr, timeout: Duration) {
        self.transport.block_address(addr, timeout);
    }

    /// Publish the discovery descriptor under the given server name.
    pub fn advertise(&mut self, name: &str) {
        let descriptor = compose_descriptor(
            name,
            self.query.player_count(),
            self.query.max_player_count(),
        );
        self.transport
            .send_option("name", OptionValue::Text(descriptor));
    }

    /// Toggle whether the transport answers discovery probes.
    pub fn set_discoverable(&mut self, discoverable: bool) {
        self.transport
            .send_option("discoverable", OptionValue::Flag(discoverable));
    }

    /// Ask the worker to shut down gracefully.
    pub fn shutdown(&mut self) {
        self.transport.shutdown();
    }

    /// Ask the worker to shut down immediately.
    pub fn emergency_shutdown(&mut self) {
        self.transport.emergency_shutdown();
    }
}

/// Compose the semicolon-delimited discovery descriptor.
///
/// Format: `MCPE;<name>;<protocol>;<game version>;<players>;<max players>`,
/// with any `;` inside the name escaped by a backslash.
fn compose_descriptor(name: &str, players: u32, max_players: u32) -> String {
    format!(
        "MCPE;{};{PROTOCOL_VERSION};{GAME_VERSION};{players};{max_players}",
        name.replace(';', "\\;")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use riptide_proto::{DecodeError, ESCAPE_MARKER, GamePacket};
    use riptide_transport::{
        Envelope, TransportCommand, WorkerEndpoint, WorkerTransport, worker_channel,
    };

    // --- Test doubles -----------------------------------------------------

    /// Catalog with one packet type: id 0x01, payload = one byte.
    struct EchoCodec;

    struct EchoPacket(u8);

    impl GamePacket for EchoPacket {
        fn packet_id(&self) -> u8 {
            0x01
        }

        fn encode_payload(&self, out: &mut Vec<u8>) {
            out.push(self.0);
        }
    }

    impl PacketCodec for EchoCodec {
        fn decode(&self, id: u8, payload: &[u8]) -> Decoded {
            if id != 0x01 {
                return Decoded::Unrecognized(id);
            }
            match payload {
                [byte] => Decoded::Packet(Box::new(EchoPacket(*byte))),
                _ => Decoded::Malformed(DecodeError::Malformed {
                    id,
                    reason: "expected exactly 1 byte".into(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        opened: Mutex<Vec<SessionId>>,
        closed: Mutex<Vec<(SessionId, String)>>,
        packets: AtomicU32,
        raw: AtomicU32,
        reject_packets: AtomicBool,
    }

    impl SessionHandler for RecordingHandler {
        fn on_open(&self, session: &crate::Session) {
            self.opened.lock().unwrap().push(session.id());
        }

        fn on_close(&self, session: &crate::Session, reason: &str) {
            self.closed
                .lock()
                .unwrap()
                .push((session.id(), reason.to_string()));
        }

        fn on_data_packet(
            &self,
            _session: &crate::Session,
            _packet: Box<dyn GamePacket>,
        ) -> Result<(), crate::HandlerError> {
            if self.reject_packets.load(Ordering::SeqCst) {
                return Err("scripted handler failure".into());
            }
            self.packets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_raw_packet(&self, _addr: SocketAddr, _buffer: &[u8]) {
            self.raw.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FixedQuery;

    impl ServerQuery for FixedQuery {
        fn player_count(&self) -> u32 {
            3
        }

        fn max_player_count(&self) -> u32 {
            20
        }
    }

    struct Harness {
        interface: NetworkInterface<WorkerTransport>,
        endpoint: WorkerEndpoint,
        handler: Arc<RecordingHandler>,
    }

    fn harness() -> Harness {
        let (transport, endpoint) = worker_channel();
        let handler = Arc::new(RecordingHandler::default());
        let interface = NetworkInterface::new(
            transport,
            Arc::new(EchoCodec),
            Arc::clone(&handler) as Arc<dyn SessionHandler>,
            Arc::new(FixedQuery),
            Arc::new(NetworkStats::new()),
        );
        Harness {
            interface,
            endpoint,
            handler,
        }
    }

    fn peer_addr() -> SocketAddr {
        "10.0.0.5:1000".parse().unwrap()
    }

    fn open_event(conn: u64) -> TransportEvent {
        TransportEvent::SessionOpen {
            conn: ConnectionId(conn),
            addr: peer_addr(),
            client_id: 42,
        }
    }

    impl Harness {
        /// Push an event and tick once.
        fn deliver(&mut self, event: TransportEvent) {
            assert!(self.endpoint.push_event(event));
            assert!(self.interface.process().unwrap());
        }

        fn open_session(&mut self, conn: u64) -> SessionId {
            self.deliver(open_event(conn));
            *self.handler.opened.lock().unwrap().last().unwrap()
        }

        fn drain_commands(&mut self) -> Vec<TransportCommand> {
            std::iter::from_fn(|| self.endpoint.try_next_command()).collect()
        }
    }

    // --- Lifecycle --------------------------------------------------------

    #[test]
    fn test_open_event_creates_session_and_notifies_handler() {
        let mut h = harness();
        let id = h.open_session(1);

        let session = h.interface.registry().session(ConnectionId(1)).unwrap();
        assert_eq!(session.id(), id);
        assert_eq!(session.addr(), peer_addr());
        assert_eq!(session.client_id(), 42);
    }

    #[test]
    fn test_close_event_removes_session_and_notifies_handler() {
        let mut h = harness();
        let id = h.open_session(1);

        h.deliver(TransportEvent::SessionClose {
            conn: ConnectionId(1),
            reason: "timeout".into(),
        });

        assert!(h.interface.registry().is_empty());
        assert_eq!(
            h.handler.closed.lock().unwrap().as_slice(),
            &[(id, "timeout".to_string())]
        );
    }

    #[test]
    fn test_transport_and_server_close_paths_converge() {
        let mut h = harness();
        let id = h.open_session(1);

        // Server-initiated close: transport told first, registry cleared,
        // handler not re-notified.
        h.interface.close(id, "kicked");
        assert!(h.interface.registry().is_empty());
        assert!(h.handler.closed.lock().unwrap().is_empty());
        assert!(matches!(
            h.drain_commands().as_slice(),
            [TransportCommand::CloseSession { conn: ConnectionId(1), reason }] if reason == "kicked"
        ));

        // Closing again, by either path, is a no-op.
        h.interface.close(id, "again");
        h.interface.close_session(ConnectionId(1), "again");
        assert!(h.drain_commands().is_empty());
        assert!(h.handler.closed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_open_keeps_existing_session() {
        let mut h = harness();
        let id = h.open_session(1);
        h.deliver(open_event(1));

        assert_eq!(h.interface.registry().len(), 1);
        assert_eq!(
            h.interface.registry().session(ConnectionId(1)).unwrap().id(),
            id
        );
        // Handler saw exactly one open.
        assert_eq!(h.handler.opened.lock().unwrap().len(), 1);
    }

    // --- Inbound packets --------------------------------------------------

    #[test]
    fn test_inbound_packet_dispatched_to_handler() {
        let mut h = harness();
        h.open_session(1);

        h.deliver(TransportEvent::Encapsulated {
            conn: ConnectionId(1),
            buffer: vec![ESCAPE_MARKER, 0x01, 0x55],
        });
        assert_eq!(h.handler.packets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_payload_is_heartbeat_noop() {
        let mut h = harness();
        h.open_session(1);

        h.deliver(TransportEvent::Encapsulated {
            conn: ConnectionId(1),
            buffer: vec![],
        });
        assert_eq!(h.handler.packets.load(Ordering::SeqCst), 0);
        assert!(h.drain_commands().is_empty());
    }

    #[test]
    fn test_packet_for_unknown_connection_ignored() {
        let mut h = harness();
        h.deliver(TransportEvent::Encapsulated {
            conn: ConnectionId(9),
            buffer: vec![ESCAPE_MARKER, 0x01, 0x55],
        });
        assert_eq!(h.handler.packets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unrecognized_identifier_silently_dropped() {
        let mut h = harness();
        h.open_session(1);

        h.deliver(TransportEvent::Encapsulated {
            conn: ConnectionId(1),
            buffer: vec![ESCAPE_MARKER, 0x09, 1, 2, 3],
        });
        assert_eq!(h.handler.packets.load(Ordering::SeqCst), 0);
        assert!(h.drain_commands().is_empty(), "no block for unknown ids");
    }

    #[test]
    fn test_malformed_packet_triggers_short_block() {
        let mut h = harness();
        h.open_session(1);

        h.deliver(TransportEvent::Encapsulated {
            conn: ConnectionId(1),
            buffer: vec![ESCAPE_MARKER, 0x01, 1, 2, 3],
        });

        assert!(matches!(
            h.drain_commands().as_slice(),
            [TransportCommand::BlockAddress { addr, timeout }]
                if *addr == peer_addr().ip() && *timeout == Duration::from_secs(5)
        ));
        // The session itself survives.
        assert_eq!(h.interface.registry().len(), 1);
    }

    #[test]
    fn test_handler_error_triggers_short_block() {
        let mut h = harness();
        h.open_session(1);
        h.handler.reject_packets.store(true, Ordering::SeqCst);

        h.deliver(TransportEvent::Encapsulated {
            conn: ConnectionId(1),
            buffer: vec![ESCAPE_MARKER, 0x01, 0x55],
        });

        assert!(matches!(
            h.drain_commands().as_slice(),
            [TransportCommand::BlockAddress { timeout, .. }]
                if *timeout == Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_raw_packets_forwarded() {
        let mut h = harness();
        h.deliver(TransportEvent::Raw {
            addr: peer_addr(),
            buffer: vec![0xFD, 0xFD],
        });
        assert_eq!(h.handler.raw.load(Ordering::SeqCst), 1);
    }

    // --- Outbound ---------------------------------------------------------

    #[test]
    fn test_send_without_ack_returns_no_sequence() {
        let mut h = harness();
        let id = h.open_session(1);

        let mut packet = OutboundPacket::new(Box::new(EchoPacket(7)));
        let outcome = h.interface.send(id, &mut packet, false, false);
        assert_eq!(outcome, SendOutcome::Sent { ack_sequence: None });

        match h.drain_commands().as_slice() {
            [TransportCommand::SendEncapsulated {
                conn,
                envelope,
                priority,
            }] => {
                assert_eq!(*conn, ConnectionId(1));
                assert_eq!(*priority, SendPriority::Normal);
                assert_eq!(&envelope.buffer[..], &[ESCAPE_MARKER, 0x01, 7]);
                assert_eq!(envelope.ack_sequence, None);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn test_ack_sequences_advance_per_send() {
        let mut h = harness();
        let id = h.open_session(1);

        let mut packet = OutboundPacket::new(Box::new(EchoPacket(7)));
        for _ in 0..3 {
            let _ = h.interface.send(id, &mut packet, true, false);
        }
        // Counter is at 3 now; the next ACK send gets sequence 3.
        let outcome = h.interface.send(id, &mut packet, true, false);
        assert_eq!(outcome.ack_sequence(), Some(3));
    }

    #[test]
    fn test_immediate_flag_sets_priority() {
        let mut h = harness();
        let id = h.open_session(1);

        let mut packet = OutboundPacket::new(Box::new(EchoPacket(7)));
        let _ = h.interface.send(id, &mut packet, false, true);

        assert!(matches!(
            h.drain_commands().as_slice(),
            [TransportCommand::SendEncapsulated {
                priority: SendPriority::Immediate,
                ..
            }]
        ));
    }

    #[test]
    fn test_send_to_closed_session_is_noop() {
        let mut h = harness();
        let id = h.open_session(1);
        h.interface.close_session(ConnectionId(1), "gone");
        let _ = h.drain_commands();

        let mut packet = OutboundPacket::new(Box::new(EchoPacket(7)));
        let outcome = h.interface.send(id, &mut packet, true, false);
        assert_eq!(outcome, SendOutcome::UnknownSession);
        assert!(h.drain_commands().is_empty(), "nothing reaches the transport");
        assert!(h.interface.registry().is_empty(), "registry unchanged");
    }

    // --- Options, discovery, blocking -------------------------------------

    #[test]
    fn test_bandwidth_option_feeds_stats() {
        let mut h = harness();
        h.deliver(TransportEvent::Option {
            name: "bandwidth".into(),
            value: OptionValue::Text(r#"{"up":1024,"down":4096}"#.into()),
        });
        assert_eq!(h.interface.stats().upload_total(), 1024);
        assert_eq!(h.interface.stats().download_total(), 4096);
    }

    #[test]
    fn test_unknown_option_ignored() {
        let mut h = harness();
        h.deliver(TransportEvent::Option {
            name: "mtu".into(),
            value: OptionValue::Text("1492".into()),
        });
        assert_eq!(h.interface.stats().upload_total(), 0);
    }

    #[test]
    fn test_advertise_composes_descriptor() {
        let mut h = harness();
        h.interface.advertise("My Server");

        match h.drain_commands().as_slice() {
            [TransportCommand::SendOption {
                name,
                value: OptionValue::Text(descriptor),
            }] => {
                assert_eq!(name, "name");
                assert_eq!(
                    descriptor,
                    &format!("MCPE;My Server;{PROTOCOL_VERSION};{GAME_VERSION};3;20")
                );
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn test_advertise_escapes_delimiter_in_name() {
        assert_eq!(
            compose_descriptor("a;b", 0, 10),
            format!("MCPE;a\\;b;{PROTOCOL_VERSION};{GAME_VERSION};0;10")
        );
    }

    #[test]
    fn test_set_discoverable_forwards_flag() {
        let mut h = harness();
        h.interface.set_discoverable(false);
        assert!(matches!(
            h.drain_commands().as_slice(),
            [TransportCommand::SendOption {
                name,
                value: OptionValue::Flag(false),
            }] if name == "discoverable"
        ));
    }

    #[test]
    fn test_block_address_uses_admin_default() {
        let mut h = harness();
        h.interface.block_address(peer_addr().ip());
        assert!(matches!(
            h.drain_commands().as_slice(),
            [TransportCommand::BlockAddress { timeout, .. }]
                if *timeout == Duration::from_secs(300)
        ));
    }

    // --- Tick and failure -------------------------------------------------

    #[test]
    fn test_process_reports_whether_work_happened() {
        let mut h = harness();
        assert!(!h.interface.process().unwrap());

        h.endpoint.push_event(open_event(1));
        h.endpoint.push_event(open_event(2));
        assert!(h.interface.process().unwrap());
        // Both queued events were drained in one tick.
        assert_eq!(h.interface.registry().len(), 2);
        assert!(!h.interface.process().unwrap());
    }

    /// Transport whose event queue never runs dry.
    struct FloodTransport;

    impl Transport for FloodTransport {
        fn poll_event(&mut self) -> Option<TransportEvent> {
            Some(TransportEvent::Raw {
                addr: peer_addr(),
                buffer: vec![0xFD],
            })
        }

        fn is_terminated(&self) -> bool {
            false
        }

        fn send_encapsulated(&mut self, _: ConnectionId, _: Envelope, _: SendPriority) {}
        fn send_raw(&mut self, _: SocketAddr, _: Vec<u8>) {}
        fn block_address(&mut self, _: IpAddr, _: Duration) {}
        fn send_option(&mut self, _: &str, _: OptionValue) {}
        fn close_session(&mut self, _: ConnectionId, _: &str) {}
        fn shutdown(&mut self) {}
        fn emergency_shutdown(&mut self) {}
    }

    #[test]
    fn test_event_flood_yields_after_drain_budget() {
        let mut interface = NetworkInterface::new(
            FloodTransport,
            Arc::new(EchoCodec),
            Arc::new(RecordingHandler::default()) as Arc<dyn SessionHandler>,
            Arc::new(FixedQuery),
            Arc::new(NetworkStats::new()),
        );

        // The queue never empties; the drain must give the tick back once
        // its wall-clock budget is spent.
        let start = Instant::now();
        assert!(interface.process().unwrap());
        let elapsed = start.elapsed();
        assert!(elapsed >= DRAIN_BUDGET, "drain gave up early: {elapsed:?}");
        assert!(
            elapsed < DRAIN_BUDGET * 3,
            "drain did not yield near its budget: {elapsed:?}"
        );
    }

    #[test]
    fn test_worker_crash_raises_fatal_exactly_once() {
        let mut h = harness();
        h.open_session(1);

        drop(h.endpoint);

        assert_eq!(
            h.interface.process().unwrap_err(),
            InterfaceError::TransportCrashed
        );
        assert!(!h.interface.is_registered());

        // Subsequent ticks are quiet no-ops.
        assert!(!h.interface.process().unwrap());
        assert!(!h.interface.process().unwrap());
    }

    #[test]
    fn test_crash_detected_even_without_events() {
        let mut h = harness();
        drop(h.endpoint);
        // No events were ever queued; the liveness check must still fire.
        assert_eq!(
            h.interface.process().unwrap_err(),
            InterfaceError::TransportCrashed
        );
    }
}
