//! Authoritative world state and the per-tick simulation.

use crate::session::{Identity, JoinRejection, SessionRegistry};
use crate::timers::{Scheduler, TimerEvent};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    can_move, Obstacle, Pickup, Player, Projectile, Snapshot, Vec2, ARENA_OBSTACLES,
    LOOT_CAPACITY, LOOT_SPAWN_EXTENT, MAX_HEALTH, PICKUP_RADIUS, PROTOCOL_VERSION,
    REGEN_DELAY_MS, REGEN_PER_TICK,
};
use std::collections::HashMap;

/// Owns every mutable collection of the running game.
///
/// Handlers receive `&mut GameState`; nothing else holds game data. All
/// time-dependent operations take the current wall-clock time in
/// milliseconds so callers decide what "now" is.
#[derive(Debug)]
pub struct GameState {
    pub tick: u32,
    pub sessions: SessionRegistry,
    pub players: HashMap<u32, Player>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub obstacles: Vec<Obstacle>,
    pub(crate) timers: Scheduler,
    next_pickup_id: u64,
    rng: StdRng,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic loot placement and player colors, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tick: 0,
            sessions: SessionRegistry::new(),
            players: HashMap::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            obstacles: ARENA_OBSTACLES.to_vec(),
            timers: Scheduler::new(),
            next_pickup_id: 0,
            rng,
        }
    }

    /// Binds `name` to the connection and spawns a fresh player for it.
    ///
    /// A connection that joins again replaces its previous player.
    pub fn join(
        &mut self,
        client_id: u32,
        origin: &str,
        version: &str,
        name: &str,
    ) -> Result<(), JoinRejection> {
        if version != PROTOCOL_VERSION {
            warn!(
                "Rejected {} from {}: client version {} != {}",
                name, origin, version, PROTOCOL_VERSION
            );
            return Err(JoinRejection::VersionMismatch {
                server_version: PROTOCOL_VERSION.to_string(),
            });
        }

        if let Err(rejection) = self.sessions.bind(name, origin) {
            if let Some(identity) = self.sessions.get(name) {
                warn!(
                    "Rejected {} (origin mismatch: {} vs {})",
                    name, origin, identity.origin
                );
            }
            return Err(rejection);
        }

        if self.players.contains_key(&client_id) {
            let cancelled = self.timers.cancel(client_id);
            debug!("Client {} rejoined, cancelled {} timer(s)", client_id, cancelled);
        }

        let color = self.rng.gen_range(0..=0xff_ffff);
        self.players
            .insert(client_id, Player::new(client_id, name.to_string(), color));

        info!("Player {} joined as client {} from {}", name, client_id, origin);
        Ok(())
    }

    /// Drops the player of a closed connection. The identity and its score stay.
    pub fn release(&mut self, client_id: &u32) -> bool {
        self.timers.cancel(*client_id);
        match self.players.remove(client_id) {
            Some(player) => {
                info!("Released player {} (client {})", player.name, client_id);
                true
            }
            None => false,
        }
    }

    /// Moves a living player, validating each axis on its own so players slide along walls.
    pub fn move_player(&mut self, client_id: u32, target: Vec2, facing: Vec2) -> bool {
        if !target.is_finite() {
            return false;
        }

        let Some(player) = self.players.get_mut(&client_id) else {
            return false;
        };
        if !player.alive {
            return false;
        }

        if can_move(&self.obstacles, target.x, player.position.z) {
            player.position.x = target.x;
        }
        if can_move(&self.obstacles, player.position.x, target.z) {
            player.position.z = target.z;
        }
        if let Some(facing) = facing.normalize() {
            player.facing = facing;
        }

        self.collect_pickups(client_id);
        true
    }

    /// Teleports a living player if the destination is free.
    pub fn dash(&mut self, client_id: u32, target: Vec2) -> bool {
        if !target.is_finite() {
            return false;
        }

        let Some(player) = self.players.get_mut(&client_id) else {
            return false;
        };
        if !player.alive || !can_move(&self.obstacles, target.x, target.z) {
            return false;
        }

        player.position = target;
        true
    }

    fn collect_pickups(&mut self, client_id: u32) {
        let Some(player) = self.players.get_mut(&client_id) else {
            return;
        };

        let position = player.position;
        let before = self.pickups.len();
        self.pickups
            .retain(|pickup| pickup.position.distance(&position) >= PICKUP_RADIUS);

        if self.pickups.len() < before {
            let weapon = player.weapon;
            player.refill(weapon);
            debug!("{} picked up ammo for {}", player.name, weapon);
        }
    }

    /// Adds one pickup at a random spot unless the pool is full.
    pub fn spawn_loot(&mut self) -> bool {
        if self.pickups.len() >= LOOT_CAPACITY {
            return false;
        }

        let position = Vec2::new(
            self.rng.gen_range(-LOOT_SPAWN_EXTENT..LOOT_SPAWN_EXTENT),
            self.rng.gen_range(-LOOT_SPAWN_EXTENT..LOOT_SPAWN_EXTENT),
        );
        self.next_pickup_id += 1;
        self.pickups.push(Pickup {
            id: self.next_pickup_id,
            position,
        });
        true
    }

    /// Advances the world by one tick and returns the kill feed lines it produced.
    pub fn update(&mut self, now: u64) -> Vec<String> {
        self.run_timers(now);

        let mut kill_feed = self.step_projectiles(now);
        kill_feed.extend(self.resolve_operator_kills(now));

        self.apply_regeneration(now);
        self.tick = self.tick.wrapping_add(1);

        kill_feed
    }

    fn run_timers(&mut self, now: u64) {
        for event in self.timers.take_due(now) {
            match event {
                TimerEvent::Reload { client_id, weapon } => {
                    if let Some(player) = self.players.get_mut(&client_id) {
                        if player.is_reloading(weapon) {
                            player.refill(weapon);
                            debug!("{} finished reloading {}", player.name, weapon);
                        }
                    }
                }
                TimerEvent::Respawn { client_id } => {
                    if let Some(player) = self.players.get_mut(&client_id) {
                        if !player.alive {
                            player.respawn();
                            info!("{} respawned", player.name);
                        }
                    }
                }
            }
        }
    }

    fn apply_regeneration(&mut self, now: u64) {
        for player in self.players.values_mut() {
            if player.alive
                && player.health < MAX_HEALTH
                && now.saturating_sub(player.last_damaged_at) > REGEN_DELAY_MS
            {
                player.health = (player.health + REGEN_PER_TICK).min(MAX_HEALTH);
            }
        }
    }

    /// Name -> score of every connected player. Unknown identities count as zero.
    pub fn leaderboard(&self) -> HashMap<String, u32> {
        self.players
            .values()
            .map(|player| {
                (
                    player.name.clone(),
                    self.sessions.score(&player.name).unwrap_or(0),
                )
            })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            players: self.players.clone(),
            projectiles: self.projectiles.clone(),
            pickups: self.pickups.clone(),
            obstacles: self.obstacles.clone(),
            leaderboard: self.leaderboard(),
        }
    }

    /// Forgets every identity and player. Connected clients have to join again.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.players.clear();
        self.projectiles.clear();
        self.timers.clear();
        info!("Game state reset");
    }

    /// Drops the health of every living player called `name` to zero.
    /// The next tick turns them into regular deaths.
    pub fn kill_by_name(&mut self, name: &str) -> usize {
        let mut killed = 0;
        for player in self.players.values_mut() {
            if player.name == name && player.alive {
                player.health = 0.0;
                killed += 1;
            }
        }
        killed
    }

    pub fn delete_identity(&mut self, name: &str) -> Option<Identity> {
        self.sessions.remove(name)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{WeaponId, LOOT_CAPACITY, SPAWN_POINT};

    const ORIGIN: &str = "127.0.0.1";

    fn state_with_player() -> GameState {
        let mut state = GameState::with_seed(7);
        state.join(1, ORIGIN, PROTOCOL_VERSION, "alice").unwrap();
        state
    }

    #[test]
    fn test_join_creates_player_and_identity() {
        let state = state_with_player();

        let player = &state.players[&1];
        assert_eq!(player.name, "alice");
        assert_eq!(player.health, MAX_HEALTH);
        assert!(player.alive);
        assert_eq!(player.position, SPAWN_POINT);
        assert!(player.color <= 0xff_ffff);
        assert_eq!(state.sessions.score("alice"), Some(0));
    }

    #[test]
    fn test_join_version_mismatch() {
        let mut state = GameState::with_seed(1);
        let result = state.join(1, ORIGIN, "1.0", "alice");

        assert!(matches!(result, Err(JoinRejection::VersionMismatch { .. })));
        assert!(state.players.is_empty());
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_join_name_taken_leaves_first_player_alone() {
        let mut state = state_with_player();
        state.players.get_mut(&1).unwrap().position = Vec2::new(3.0, 3.0);

        let result = state.join(2, "10.1.1.1", PROTOCOL_VERSION, "alice");
        assert!(matches!(result, Err(JoinRejection::NameTaken { .. })));
        assert!(!state.players.contains_key(&2));
        assert_eq!(state.players[&1].position, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_rejoin_keeps_score() {
        let mut state = state_with_player();
        state.sessions.add_score("alice");
        state.release(&1);

        state.join(5, ORIGIN, PROTOCOL_VERSION, "alice").unwrap();
        assert_eq!(state.leaderboard().get("alice"), Some(&1));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut state = state_with_player();
        assert!(state.release(&1));
        assert!(!state.release(&1));
        assert!(!state.release(&42));
        assert!(state.players.is_empty());
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn test_move_slides_along_wall() {
        let mut state = state_with_player();
        // Wall centered at (0, 15), 10 wide, 1 deep: blocked band is z in (13.9, 16.1)
        state.players.get_mut(&1).unwrap().position = Vec2::new(0.0, 13.0);

        assert!(state.move_player(1, Vec2::new(1.0, 14.5), Vec2::new(1.0, 0.0)));
        let player = &state.players[&1];
        assert_eq!(player.position.x, 1.0);
        assert_eq!(player.position.z, 13.0);
        assert_eq!(player.facing, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_move_ignored_for_dead_or_absent_player() {
        let mut state = state_with_player();
        assert!(!state.move_player(9, Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0)));

        state.players.get_mut(&1).unwrap().alive = false;
        assert!(!state.move_player(1, Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0)));
        assert_eq!(state.players[&1].position, SPAWN_POINT);
        assert_eq!(state.players[&1].facing, shared::DEFAULT_FACING);
    }

    #[test]
    fn test_move_normalizes_facing_and_rejects_garbage() {
        let mut state = state_with_player();

        state.move_player(1, Vec2::new(0.5, 0.5), Vec2::new(0.0, 3.0));
        assert_eq!(state.players[&1].facing, Vec2::new(0.0, 1.0));

        state.move_player(1, Vec2::new(0.5, 0.5), Vec2::new(0.0, 0.0));
        assert_eq!(state.players[&1].facing, Vec2::new(0.0, 1.0));

        assert!(!state.move_player(1, Vec2::new(f32::NAN, 0.0), Vec2::new(1.0, 0.0)));
        assert_eq!(state.players[&1].position, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_dash_checks_combined_point() {
        let mut state = state_with_player();

        assert!(!state.dash(1, Vec2::new(10.0, 10.0)));
        assert_eq!(state.players[&1].position, SPAWN_POINT);

        assert!(state.dash(1, Vec2::new(-5.0, 6.0)));
        assert_eq!(state.players[&1].position, Vec2::new(-5.0, 6.0));

        state.players.get_mut(&1).unwrap().alive = false;
        assert!(!state.dash(1, Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_pickup_refills_current_weapon() {
        let mut state = state_with_player();
        {
            let player = state.players.get_mut(&1).unwrap();
            player.weapon = WeaponId::Rifle;
            player.ammo.insert(WeaponId::Rifle, 0);
            player.reloading.insert(WeaponId::Rifle, true);
            player.ammo.insert(WeaponId::Pistol, 3);
        }
        state.pickups.push(Pickup {
            id: 1,
            position: Vec2::new(1.0, 1.0),
        });
        state.pickups.push(Pickup {
            id: 2,
            position: Vec2::new(10.0, -15.0),
        });

        state.move_player(1, Vec2::new(0.5, 0.5), Vec2::new(0.0, -1.0));

        let player = &state.players[&1];
        assert_eq!(player.ammo(WeaponId::Rifle), 30);
        assert!(!player.is_reloading(WeaponId::Rifle));
        assert_eq!(player.ammo(WeaponId::Pistol), 3);
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(state.pickups[0].id, 2);
    }

    #[test]
    fn test_spawn_loot_respects_capacity() {
        let mut state = GameState::with_seed(3);
        for _ in 0..LOOT_CAPACITY {
            assert!(state.spawn_loot());
        }
        assert!(!state.spawn_loot());
        assert_eq!(state.pickups.len(), LOOT_CAPACITY);

        for pickup in &state.pickups {
            assert!(pickup.position.x >= -LOOT_SPAWN_EXTENT && pickup.position.x < LOOT_SPAWN_EXTENT);
            assert!(pickup.position.z >= -LOOT_SPAWN_EXTENT && pickup.position.z < LOOT_SPAWN_EXTENT);
        }

        let mut ids: Vec<u64> = state.pickups.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), LOOT_CAPACITY);
    }

    #[test]
    fn test_regeneration_waits_and_caps() {
        let mut state = state_with_player();
        {
            let player = state.players.get_mut(&1).unwrap();
            player.health = 99.9;
            player.last_damaged_at = 10_000;
        }

        state.update(15_000);
        assert_approx_eq!(state.players[&1].health, 99.9, 1e-4);

        state.update(15_001);
        assert_eq!(state.players[&1].health, MAX_HEALTH);

        state.update(15_002);
        assert_eq!(state.players[&1].health, MAX_HEALTH);
    }

    #[test]
    fn test_regeneration_rate() {
        let mut state = state_with_player();
        {
            let player = state.players.get_mut(&1).unwrap();
            player.health = 50.0;
            player.last_damaged_at = 1_000;
        }

        for i in 0..10 {
            state.update(10_000 + i * 16);
        }
        assert_approx_eq!(state.players[&1].health, 52.0, 1e-3);
    }

    #[test]
    fn test_operator_kill_becomes_death_then_respawn() {
        let mut state = state_with_player();
        state.players.get_mut(&1).unwrap().position = Vec2::new(4.0, 4.0);

        assert_eq!(state.kill_by_name("alice"), 1);
        assert_eq!(state.kill_by_name("nobody"), 0);

        let feed = state.update(20_000);
        assert_eq!(feed.len(), 1);
        assert!(!state.players[&1].alive);
        assert_eq!(state.sessions.score("alice"), Some(0));

        state.update(24_999);
        assert!(!state.players[&1].alive);

        state.update(25_000);
        let player = &state.players[&1];
        assert!(player.alive);
        assert_eq!(player.health, MAX_HEALTH);
        assert_eq!(player.position, SPAWN_POINT);
    }

    #[test]
    fn test_leaderboard_defaults_missing_identity_to_zero() {
        let mut state = state_with_player();
        state.sessions.add_score("alice");
        assert_eq!(state.leaderboard().get("alice"), Some(&1));

        assert!(state.delete_identity("alice").is_some());
        assert_eq!(state.leaderboard().get("alice"), Some(&0));
    }

    #[test]
    fn test_reset_clears_everything_but_loot() {
        let mut state = state_with_player();
        state.spawn_loot();
        state.shoot(1, WeaponId::Pistol, 10_000);

        state.reset();
        assert!(state.players.is_empty());
        assert!(state.sessions.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.pending_timers(), 0);
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_snapshot_contents() {
        let mut state = state_with_player();
        state.update(10_000);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.obstacles.len(), ARENA_OBSTACLES.len());
        assert_eq!(snapshot.leaderboard.get("alice"), Some(&0));
    }
}
