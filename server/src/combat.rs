//! Firing, projectile flight and death handling.

use crate::game::GameState;
use crate::timers::TimerEvent;
use log::{debug, info};
use shared::{hits_obstacle, Projectile, WeaponId, HIT_RADIUS, PROJECTILE_SPEED, RESPAWN_DELAY_MS};

impl GameState {
    /// Fires `weapon` for the player on `client_id`
    ///
    /// Silently ignored (returns false) when the player is missing or dead,
    /// the weapon is reloading or empty, or its cooldown has not elapsed.
    /// Firing also restarts the player's regeneration delay.
    pub fn shoot(&mut self, client_id: u32, weapon: WeaponId, now: u64) -> bool {
        let stats = weapon.stats();

        let Some(player) = self.players.get_mut(&client_id) else {
            return false;
        };
        if !player.alive || player.is_reloading(weapon) || player.ammo(weapon) == 0 {
            debug!("Ignored {} shot from client {}", weapon, client_id);
            return false;
        }
        if now.saturating_sub(player.last_shot_at) < stats.cooldown_ms {
            debug!("Ignored {} shot from client {}: cooldown", weapon, client_id);
            return false;
        }

        player.weapon = weapon;
        player.last_shot_at = now;
        player.last_damaged_at = now;

        let remaining = player.ammo(weapon) - 1;
        player.ammo.insert(weapon, remaining);
        if remaining == 0 {
            player.reloading.insert(weapon, true);
            self.timers.schedule(
                now + stats.reload_ms,
                TimerEvent::Reload { client_id, weapon },
            );
        }

        let origin = player.position;
        let facing = player.facing;
        for offset in weapon.spread() {
            self.projectiles.push(Projectile {
                owner: client_id,
                position: origin,
                velocity: facing.rotate(*offset).scale(PROJECTILE_SPEED),
                spawned_at: now,
                damage: stats.damage,
            });
        }

        true
    }

    /// Moves every projectile one step and resolves what it ran into
    pub(crate) fn step_projectiles(&mut self, now: u64) -> Vec<String> {
        let mut kill_feed = Vec::new();

        for mut projectile in std::mem::take(&mut self.projectiles) {
            projectile.position = projectile.position.add(&projectile.velocity);
            let mut hit = hits_obstacle(&self.obstacles, projectile.position);

            let victims: Vec<u32> = self
                .players
                .values()
                .filter(|p| {
                    p.alive
                        && p.id != projectile.owner
                        && p.position.distance(&projectile.position) < HIT_RADIUS
                })
                .map(|p| p.id)
                .collect();

            for victim_id in victims {
                hit = true;
                let lethal = self
                    .players
                    .get_mut(&victim_id)
                    .map(|victim| victim.take_damage(projectile.damage, now))
                    .unwrap_or(false);

                if lethal {
                    kill_feed.extend(self.handle_death(victim_id, Some(projectile.owner), now));
                }
            }

            if !hit && !projectile.is_expired(now) {
                self.projectiles.push(projectile);
            }
        }

        kill_feed
    }

    /// Players whose health was zeroed from the operator console die without a killer
    pub(crate) fn resolve_operator_kills(&mut self, now: u64) -> Vec<String> {
        let doomed: Vec<u32> = self
            .players
            .values()
            .filter(|p| p.alive && p.health <= 0.0)
            .map(|p| p.id)
            .collect();

        doomed
            .into_iter()
            .filter_map(|id| self.handle_death(id, None, now))
            .collect()
    }

    fn handle_death(&mut self, victim_id: u32, killer_id: Option<u32>, now: u64) -> Option<String> {
        let victim = self.players.get_mut(&victim_id)?;
        victim.alive = false;
        let victim_name = victim.name.clone();

        self.timers.schedule(
            now + RESPAWN_DELAY_MS,
            TimerEvent::Respawn {
                client_id: victim_id,
            },
        );

        let killer_name = killer_id
            .and_then(|id| self.players.get(&id))
            .map(|killer| killer.name.clone());

        let message = match (killer_id, killer_name) {
            (_, Some(killer_name)) => {
                if !self.sessions.add_score(&killer_name) {
                    debug!("No identity for {}, kill not scored", killer_name);
                }
                format!("💀 {} -> {}", killer_name, victim_name)
            }
            (Some(_), None) => format!("💀 ? -> {}", victim_name),
            (None, None) => format!("💀 {}", victim_name),
        };

        info!("{}", message);
        Some(message)
    }
}
