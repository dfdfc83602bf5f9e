//! Loopback transport worker for the demo server.
//!
//! Stands in for the real reliable-UDP worker: one synthetic peer connects
//! at startup, pings every few hundred milliseconds, and the worker reports
//! its byte counts through the `"bandwidth"` option once per second. It
//! honors the same command set a real worker would, including the block
//! list consulted before accepting inbound traffic.

use std::time::{Duration, Instant};

use riptide_proto::frame_packet;
use riptide_transport::{
    AddressBlockList, ConnectionId, OptionValue, TransportCommand, TransportEvent,
    WorkerEndpoint,
};

use crate::packets::ID_PING;

const COMMAND_POLL: Duration = Duration::from_millis(20);
const PING_INTERVAL: Duration = Duration::from_millis(400);
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Run the worker loop until shutdown or until the main side goes away.
pub fn run(endpoint: WorkerEndpoint) {
    let conn = ConnectionId(1);
    let peer: std::net::SocketAddr = match "127.0.0.1:52412".parse() {
        Ok(addr) => addr,
        Err(_) => return,
    };

    if !endpoint.push_event(TransportEvent::SessionOpen {
        conn,
        addr: peer,
        client_id: 1,
    }) {
        return;
    }

    let mut blocks = AddressBlockList::new();
    let mut peer_open = true;
    let mut bytes_up: u64 = 0;
    let mut bytes_down: u64 = 0;
    let mut last_ping = Instant::now();
    let mut last_report = Instant::now();

    loop {
        match endpoint.next_command_timeout(COMMAND_POLL) {
            Some(TransportCommand::SendEncapsulated { envelope, .. }) => {
                bytes_up += envelope.buffer.len() as u64;
            }
            Some(TransportCommand::SendRaw { buffer, .. }) => {
                bytes_up += buffer.len() as u64;
            }
            Some(TransportCommand::BlockAddress { addr, timeout }) => {
                blocks.block(addr, timeout);
            }
            Some(TransportCommand::SendOption { name, value }) => {
                tracing::debug!("worker option {name} = {value:?}");
            }
            Some(TransportCommand::CloseSession { conn: closed, .. }) => {
                if closed == conn {
                    peer_open = false;
                }
            }
            Some(TransportCommand::Shutdown) | Some(TransportCommand::EmergencyShutdown) => {
                tracing::info!("transport worker shutting down");
                return;
            }
            None => {}
        }

        if peer_open && !blocks.is_blocked(peer.ip()) && last_ping.elapsed() >= PING_INTERVAL {
            last_ping = Instant::now();
            let now_ms = timestamp_ms();
            let buffer = frame_packet(ID_PING, &now_ms.to_be_bytes());
            bytes_down += buffer.len() as u64;
            if !endpoint.push_event(TransportEvent::Encapsulated { conn, buffer }) {
                return;
            }
        }

        if last_report.elapsed() >= REPORT_INTERVAL {
            last_report = Instant::now();
            let report = serde_json::json!({ "up": bytes_up, "down": bytes_down });
            bytes_up = 0;
            bytes_down = 0;
            if !endpoint.push_event(TransportEvent::Option {
                name: "bandwidth".to_string(),
                value: OptionValue::Text(report.to_string()),
            }) {
                return;
            }
        }
    }
}

fn timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
