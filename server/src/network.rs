//! Server network layer handling UDP communications and game loop coordination

use crate::admin::{AdminCommand, USAGE};
use crate::client_manager::ClientManager;
use crate::game::GameState;
use crate::housekeeping::{DailyReset, RESET_NOTICE};
use crate::utils::get_timestamp;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, Vec2, LOOT_INTERVAL_MS, TICK_RATE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    ClientTimeout {
        client_id: u32,
    },
    Admin(AdminCommand),
    Shutdown,
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
    BroadcastPacket { packet: Packet },
}

/// Main server coordinating networking and game simulation
///
/// `run` is the only place game state is mutated: packets, operator commands,
/// timeouts and timers are all handled on its single loop.
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    game_state: GameState,
    daily_reset: DailyReset,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            game_state: GameState::new(),
            daily_reset: DailyReset::new(),
            tick_duration,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet } => {
                        let client_addrs = {
                            let clients_guard = clients.read().await;
                            clients_guard.get_client_addrs()
                        };

                        let data = match serialize(&packet) {
                            Ok(data) => data,
                            Err(e) => {
                                error!("Failed to serialize broadcast: {}", e);
                                continue;
                            }
                        };

                        for (client_id, addr) in client_addrs {
                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    async fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts()
                };

                for client_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout { client_id }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    /// Spawns task that reads operator commands from stdin
    pub async fn spawn_admin_console(&self) {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match AdminCommand::parse(&line) {
                        Some(command) => {
                            if server_tx.send(ServerMessage::Admin(command)).is_err() {
                                break;
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => println!("{}", USAGE),
                    },
                    Ok(None) => {
                        debug!("Operator console closed");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read operator console: {}", e);
                        break;
                    }
                }
            }
        });
    }

    /// Spawns task that asks the main loop to stop on Ctrl+C
    pub async fn spawn_signal_handler(&self) {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down");
                    let _ = server_tx.send(ServerMessage::Shutdown);
                }
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    async fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    async fn broadcast_packet(&self, packet: Packet) {
        if let Err(e) = self.game_tx.send(GameMessage::BroadcastPacket { packet }) {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Resolves the connection of `addr`, refreshing its liveness
    async fn client_for(&self, addr: SocketAddr) -> Option<u32> {
        let mut clients = self.clients.write().await;
        clients.touch(addr)
    }

    /// Processes incoming packets and updates game state
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Join { version, name } => {
                self.handle_join(version, name, addr).await;
            }

            Packet::Move { x, z, last_dir } => {
                if let Some(client_id) = self.client_for(addr).await {
                    if !self
                        .game_state
                        .move_player(client_id, Vec2::new(x, z), last_dir)
                    {
                        debug!("Ignored move from client {}", client_id);
                    }
                }
            }

            Packet::Dash { x, z } => {
                if let Some(client_id) = self.client_for(addr).await {
                    if !self.game_state.dash(client_id, Vec2::new(x, z)) {
                        debug!("Ignored dash from client {}", client_id);
                    }
                }
            }

            Packet::Shoot { weapon } => {
                if let Some(client_id) = self.client_for(addr).await {
                    self.game_state.shoot(client_id, weapon, get_timestamp());
                }
            }

            Packet::Heartbeat => {
                self.client_for(addr).await;
            }

            Packet::Disconnect => {
                let client_id = {
                    let clients = self.clients.read().await;
                    clients.find_client_by_addr(addr)
                };

                if let Some(client_id) = client_id {
                    let mut clients = self.clients.write().await;
                    clients.remove_client(&client_id);
                    self.game_state.release(&client_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    async fn handle_join(&mut self, version: String, name: String, addr: SocketAddr) {
        info!("Join request from {} as {} (version: {})", addr, name, version);

        let client_id = {
            let mut clients = self.clients.write().await;
            match clients.touch(addr) {
                Some(existing_id) => Some(existing_id),
                None => clients.add_client(addr),
            }
        };

        let Some(client_id) = client_id else {
            let response = Packet::VersionError {
                reason: "Server full".to_string(),
            };
            self.send_packet(response, addr).await;
            return;
        };

        let origin = addr.ip().to_string();
        match self.game_state.join(client_id, &origin, &version, &name) {
            Ok(()) => {
                self.send_packet(Packet::Joined { client_id }, addr).await;
            }
            Err(rejection) => {
                let response = Packet::VersionError {
                    reason: rejection.to_string(),
                };
                self.send_packet(response, addr).await;
            }
        }
    }

    fn handle_admin(&mut self, command: AdminCommand) {
        for line in command.execute(&mut self.game_state) {
            println!("{}", line);
        }
    }

    /// Advances the simulation and broadcasts the kill feed and world snapshot
    async fn run_tick(&mut self) {
        let kill_feed = self.game_state.update(get_timestamp());

        let client_count = {
            let clients = self.clients.read().await;
            clients.len()
        };

        if client_count == 0 {
            return;
        }

        for message in kill_feed {
            self.broadcast_packet(Packet::Log { message }).await;
        }
        self.broadcast_packet(Packet::State(self.game_state.snapshot()))
            .await;

        // Periodic performance monitoring
        if self.game_state.tick % TICK_RATE == 0 {
            debug!(
                "Tick {}: {} clients, {} players, {} projectiles",
                self.game_state.tick,
                client_count,
                self.game_state.players.len(),
                self.game_state.projectiles.len()
            );
        }
    }

    async fn run_housekeeping(&mut self) {
        if self.daily_reset.is_due_now() {
            self.perform_reset().await;
        }
    }

    /// Wipes the world and tells every connection to join again
    async fn perform_reset(&mut self) {
        self.game_state.reset();
        self.broadcast_packet(Packet::VersionError {
            reason: RESET_NOTICE.to_string(),
        })
        .await;
        info!("[SYSTEM] Daily reset complete");
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize concurrent tasks
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let loot_period = Duration::from_millis(LOOT_INTERVAL_MS);
        let mut loot_interval = interval_at(Instant::now() + loot_period, loot_period);

        let mut housekeeping_interval = interval(Duration::from_secs(1));

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id }) => {
                            self.game_state.release(&client_id);
                        },
                        Some(ServerMessage::Admin(command)) => {
                            self.handle_admin(command);
                        },
                        Some(ServerMessage::Shutdown) => {
                            info!("Server shutting down");
                            break;
                        }
                        None => {
                            warn!("Server channel closed");
                            break;
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    self.run_tick().await;
                },

                _ = loot_interval.tick() => {
                    if self.game_state.spawn_loot() {
                        debug!("Spawned pickup ({} active)", self.game_state.pickups.len());
                    }
                },

                _ = housekeeping_interval.tick() => {
                    self.run_housekeeping().await;
                },
            }
        }

        Ok(())
    }
}
