//! Riptide demo server: wires config, logging, a loopback transport worker,
//! and the network interface into a tick loop.

mod loopback;
mod packets;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;

use riptide_config::{CliArgs, Config};
use riptide_net::{
    HandlerError, NetworkInterface, NetworkStats, ServerQuery, Session, SessionHandler,
};
use riptide_proto::GamePacket;
use riptide_transport::worker_channel;

use crate::packets::{DemoCodec, ID_CHAT, ID_PING};

const ADVERTISE_INTERVAL: Duration = Duration::from_secs(1);

/// Shared server-side state: who is online, and the configured cap.
struct ServerState {
    players: AtomicU32,
    max_players: u32,
}

impl ServerState {
    fn new(max_players: u32) -> Self {
        Self {
            players: AtomicU32::new(0),
            max_players,
        }
    }
}

impl SessionHandler for ServerState {
    fn on_open(&self, session: &Session) {
        self.players.fetch_add(1, Ordering::Relaxed);
        tracing::info!("peer {} joined (session {:?})", session.addr(), session.id());
    }

    fn on_close(&self, session: &Session, reason: &str) {
        self.players.fetch_sub(1, Ordering::Relaxed);
        tracing::info!("peer {} left: {reason}", session.addr());
    }

    fn on_data_packet(
        &self,
        session: &Session,
        packet: Box<dyn GamePacket>,
    ) -> Result<(), HandlerError> {
        match packet.packet_id() {
            ID_PING => tracing::debug!("ping from {:?}", session.id()),
            ID_CHAT => tracing::info!("chat from {:?}", session.id()),
            id => tracing::debug!("packet 0x{id:02x} from {:?}", session.id()),
        }
        Ok(())
    }

    fn on_raw_packet(&self, addr: SocketAddr, buffer: &[u8]) {
        tracing::debug!("raw {}-byte datagram from {addr}", buffer.len());
    }
}

impl ServerQuery for ServerState {
    fn player_count(&self) -> u32 {
        self.players.load(Ordering::Relaxed)
    }

    fn max_player_count(&self) -> u32 {
        self.max_players
    }
}

fn main() {
    let args = CliArgs::parse();
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(Config::default_path);

    let mut config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    riptide_log::init_logging(Some(&config));
    tracing::info!(
        "starting '{}' on {}:{} (max {} players)",
        config.server.name,
        config.network.bind_address,
        config.network.port,
        config.server.max_players
    );

    let (transport, endpoint) = worker_channel();
    let worker = std::thread::Builder::new()
        .name("transport-worker".to_string())
        .spawn(move || loopback::run(endpoint));
    if let Err(error) = worker {
        tracing::error!("failed to spawn transport worker: {error}");
        std::process::exit(1);
    }

    let state = Arc::new(ServerState::new(config.server.max_players));
    let stats = Arc::new(NetworkStats::new());
    let mut interface = NetworkInterface::new(
        transport,
        Arc::new(DemoCodec),
        Arc::clone(&state) as Arc<dyn SessionHandler>,
        Arc::clone(&state) as Arc<dyn ServerQuery>,
        Arc::clone(&stats),
    );

    interface.set_discoverable(config.network.discoverable);
    interface.advertise(&config.server.name);

    let tick = Duration::from_millis(1000 / u64::from(config.network.tick_rate.max(1)));
    let mut last_advertise = Instant::now();

    loop {
        if let Err(error) = interface.process() {
            // The one condition this layer cannot recover from.
            tracing::error!("networking is down: {error}");
            std::process::exit(1);
        }

        if last_advertise.elapsed() >= ADVERTISE_INTERVAL {
            last_advertise = Instant::now();
            interface.advertise(&config.server.name);
            let (up, down) = stats.snapshot_and_reset();
            if up > 0 || down > 0 {
                tracing::debug!("throughput last period: up={up} B, down={down} B");
            }
        }

        std::thread::sleep(tick);
    }
}
