//! Headless client that joins the arena, walks in a circle and keeps firing.
//! Useful for smoke-testing a running server and for filling it with targets.

use bincode::{deserialize, serialize};
use clap::Parser;
use log::{info, warn};
use shared::{Packet, Vec2, WeaponId, DEFAULT_PORT, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, timeout, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,

    /// Player name to join as
    #[arg(short, long, default_value = "bot")]
    name: String,

    /// Weapon to fire (pistol, shotgun, rifle, sniper, smg)
    #[arg(short, long, default_value = "pistol")]
    weapon: WeaponId,

    /// Seconds to stay in the arena
    #[arg(short, long, default_value = "30")]
    duration: u64,
}

async fn send_packet(
    socket: &UdpSocket,
    packet: &Packet,
    server_addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = serialize(packet)?;
    socket.send_to(&data, server_addr).await?;
    Ok(())
}

/// Sends the join request and waits for the verdict
async fn join(
    socket: &UdpSocket,
    server_addr: SocketAddr,
    name: &str,
) -> Result<u32, Box<dyn std::error::Error>> {
    let packet = Packet::Join {
        version: PROTOCOL_VERSION.to_string(),
        name: name.to_string(),
    };
    send_packet(socket, &packet, server_addr).await?;

    let mut buf = vec![0u8; 65536];
    let deadline = Instant::now() + Duration::from_secs(5);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let (len, _) = timeout(remaining, socket.recv_from(&mut buf)).await??;

        match deserialize::<Packet>(&buf[..len]) {
            Ok(Packet::Joined { client_id }) => return Ok(client_id),
            Ok(Packet::VersionError { reason }) => return Err(reason.into()),
            // Snapshots may already be arriving if this address joined before
            Ok(_) => continue,
            Err(e) => warn!("Failed to deserialize response: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let server_addr: SocketAddr = args.server.parse()?;
    info!("Bot socket bound to {}", socket.local_addr()?);

    let client_id = join(&socket, server_addr, &args.name).await?;
    info!("Joined {} as {} (client {})", server_addr, args.name, client_id);

    let mut buf = vec![0u8; 65536];
    let mut move_timer = interval(Duration::from_millis(50));
    let mut shoot_timer = interval(Duration::from_millis(300));
    let mut report_timer = interval(Duration::from_secs(5));
    let started = Instant::now();
    let stop_at = started + Duration::from_secs(args.duration);

    let mut angle: f32 = 0.0;
    let mut alive = true;
    let mut leaderboard = Vec::new();

    while Instant::now() < stop_at {
        tokio::select! {
            _ = move_timer.tick() => {
                angle += 0.05;
                let position = Vec2::new(angle.cos() * 6.0, angle.sin() * 6.0);
                // Face along the circle's tangent
                let last_dir = Vec2::new(-angle.sin(), angle.cos());
                let packet = Packet::Move { x: position.x, z: position.z, last_dir };
                send_packet(&socket, &packet, server_addr).await?;
            }
            _ = shoot_timer.tick() => {
                if alive {
                    send_packet(&socket, &Packet::Shoot { weapon: args.weapon }, server_addr).await?;
                }
            }
            _ = report_timer.tick() => {
                if !leaderboard.is_empty() {
                    println!("Scores after {}s:", started.elapsed().as_secs());
                    for (name, score) in &leaderboard {
                        println!("  {:<16} {}", name, score);
                    }
                }
            }
            received = socket.recv_from(&mut buf) => {
                let (len, _) = received?;
                match deserialize::<Packet>(&buf[..len]) {
                    Ok(Packet::State(snapshot)) => {
                        if let Some(me) = snapshot.players.get(&client_id) {
                            alive = me.alive;
                        }
                        let mut scores: Vec<(String, u32)> = snapshot.leaderboard.into_iter().collect();
                        scores.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                        leaderboard = scores;
                    }
                    Ok(Packet::Log { message }) => println!("{}", message),
                    Ok(Packet::VersionError { reason }) => {
                        warn!("Server dropped us: {}", reason);
                        return Ok(());
                    }
                    Ok(other) => warn!("Unexpected packet: {:?}", other),
                    Err(e) => warn!("Failed to deserialize packet: {}", e),
                }
            }
        }
    }

    send_packet(&socket, &Packet::Disconnect, server_addr).await?;
    info!("Bot finished");

    Ok(())
}
