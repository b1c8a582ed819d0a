//! # Arena Server Library
//!
//! This library provides the authoritative server for a top-down multiplayer
//! arena shooter. It owns the canonical game state, validates every client
//! action and broadcasts the full world to all connected clients at 60 Hz.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Player positions, health, ammunition, projectiles, pickups and scores live
//! only here. Clients send intents (move, dash, shoot) and render whatever the
//! server broadcasts back.
//!
//! ### Session Management
//! Players join under a name. The first origin IP to use a name owns it, and
//! the score earned under it survives disconnects until the daily reset.
//!
//! ### State Broadcasting
//! Every tick the server sends the kill feed followed by a full snapshot of
//! the world to every connection.
//!
//! ## Architecture Design
//!
//! ### Single Writer
//! All game state is owned by one [`game::GameState`] value that lives inside
//! the [`network::Server`] loop. Inbound packets, operator commands, client
//! timeouts and the simulation tick are handled one at a time on that loop,
//! so no handler ever observes a half-applied tick.
//!
//! ### Deferred Transitions
//! Reloads and respawns are scheduled as events keyed by connection id
//! ([`timers`]). When they come due the target is looked up again; if the
//! connection has left in the meantime the event does nothing.
//!
//! ### UDP Transport
//! Each datagram carries one bincode-encoded [`shared::Packet`]. Malformed
//! datagrams and packets from addresses that never joined are dropped.
//!
//! ## Module Organization
//!
//! - `client_manager`: connection ids, addresses, liveness and capacity
//! - `session`: name -> identity records and join rejections
//! - `game`: the owning world state, movement, loot, regeneration, tick
//! - `combat`: firing, reloads, projectile flight, death and scoring
//! - `timers`: scheduled reload/respawn events
//! - `housekeeping`: the daily midnight reset
//! - `admin`: operator console commands
//! - `network`: sockets, channels and the main loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new(
//!         "0.0.0.0:26213",
//!         Duration::from_secs_f64(1.0 / 60.0),
//!         32,
//!     ).await?;
//!
//!     server.spawn_admin_console().await;
//!     server.spawn_signal_handler().await;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod client_manager;
pub mod combat;
pub mod game;
pub mod housekeeping;
pub mod network;
pub mod session;
pub mod timers;
pub mod utils;
