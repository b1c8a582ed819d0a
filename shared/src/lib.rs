//! Wire protocol, world types and gameplay constants shared by the server and
//! its clients.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod geometry;
pub mod weapons;

pub use geometry::{can_move, hits_obstacle, Obstacle, Vec2, ARENA_OBSTACLES};
pub use weapons::{WeaponId, WeaponStats};

pub const PROTOCOL_VERSION: &str = "1.1";
pub const DEFAULT_PORT: u16 = 26213;
pub const TICK_RATE: u32 = 60;

pub const MAX_HEALTH: f32 = 100.0;
pub const PLAYER_RADIUS: f32 = 0.6;
pub const RESPAWN_DELAY_MS: u64 = 5000;
pub const REGEN_DELAY_MS: u64 = 5000;
pub const REGEN_PER_TICK: f32 = 0.2;

pub const PROJECTILE_SPEED: f32 = 0.7;
pub const HIT_RADIUS: f32 = 0.75;
pub const PROJECTILE_LIFETIME_MS: u64 = 1500;
pub const SHOTGUN_SPREAD: [f32; 5] = [-0.3, -0.15, 0.0, 0.15, 0.3];

pub const LOOT_CAPACITY: usize = 6;
pub const LOOT_INTERVAL_MS: u64 = 4000;
pub const LOOT_SPAWN_EXTENT: f32 = 20.0;
pub const PICKUP_RADIUS: f32 = 1.5;

pub const SPAWN_POINT: Vec2 = Vec2::new(0.0, 0.0);
pub const DEFAULT_FACING: Vec2 = Vec2::new(0.0, -1.0);

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Join {
        version: String,
        name: String,
    },
    Move {
        x: f32,
        z: f32,
        last_dir: Vec2,
    },
    Dash {
        x: f32,
        z: f32,
    },
    Shoot {
        weapon: WeaponId,
    },
    Heartbeat,
    Disconnect,

    Joined {
        client_id: u32,
    },
    VersionError {
        reason: String,
    },
    Log {
        message: String,
    },
    State(Snapshot),
}

/// Full world state broadcast every tick.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Snapshot {
    pub tick: u32,
    pub players: HashMap<u32, Player>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub obstacles: Vec<Obstacle>,
    /// Player name -> score of every connected player.
    pub leaderboard: HashMap<String, u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: Vec2,
    pub health: f32,
    pub alive: bool,
    pub weapon: WeaponId,
    pub ammo: HashMap<WeaponId, u32>,
    pub reloading: HashMap<WeaponId, bool>,
    pub facing: Vec2,
    pub color: u32,
    pub last_shot_at: u64,
    pub last_damaged_at: u64,
}

impl Player {
    pub fn new(id: u32, name: String, color: u32) -> Self {
        Self {
            id,
            name,
            position: SPAWN_POINT,
            health: MAX_HEALTH,
            alive: true,
            weapon: WeaponId::DEFAULT,
            ammo: WeaponId::all().map(|w| (w, w.clip_size())).collect(),
            reloading: HashMap::new(),
            facing: DEFAULT_FACING,
            color,
            last_shot_at: 0,
            last_damaged_at: 0,
        }
    }

    pub fn ammo(&self, weapon: WeaponId) -> u32 {
        self.ammo.get(&weapon).copied().unwrap_or(0)
    }

    pub fn is_reloading(&self, weapon: WeaponId) -> bool {
        self.reloading.get(&weapon).copied().unwrap_or(false)
    }

    /// Fills the clip of `weapon` and leaves the reloading state.
    pub fn refill(&mut self, weapon: WeaponId) {
        self.ammo.insert(weapon, weapon.clip_size());
        self.reloading.insert(weapon, false);
    }

    /// Applies damage, flooring health at zero. Returns true if the hit was lethal.
    pub fn take_damage(&mut self, damage: f32, now: u64) -> bool {
        self.health = (self.health - damage).max(0.0);
        self.last_damaged_at = now;
        self.health <= 0.0
    }

    pub fn respawn(&mut self) {
        self.health = MAX_HEALTH;
        self.alive = true;
        self.position = SPAWN_POINT;
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Projectile {
    pub owner: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub spawned_at: u64,
    pub damage: f32,
}

impl Projectile {
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.spawned_at) >= PROJECTILE_LIFETIME_MS
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pickup {
    pub id: u64,
    pub position: Vec2,
}
