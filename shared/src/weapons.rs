//! Weapon catalog.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Every weapon a player carries. Each player holds all of them at once.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WeaponId {
    Pistol,
    Shotgun,
    Rifle,
    Sniper,
    Smg,
}

/// Static balance numbers of a weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub clip_size: u32,
    pub reload_ms: u64,
    /// Damage per projectile (per pellet for the shotgun).
    pub damage: f32,
    pub cooldown_ms: u64,
    /// Trigger may be held down on the client. The server enforces only the cooldown.
    pub automatic: bool,
}

impl WeaponId {
    pub const DEFAULT: WeaponId = WeaponId::Pistol;

    pub const fn stats(self) -> WeaponStats {
        match self {
            WeaponId::Pistol => WeaponStats {
                clip_size: 17,
                reload_ms: 1500,
                damage: 18.0,
                cooldown_ms: 250,
                automatic: false,
            },
            WeaponId::Shotgun => WeaponStats {
                clip_size: 5,
                reload_ms: 2500,
                damage: 12.0,
                cooldown_ms: 900,
                automatic: false,
            },
            WeaponId::Rifle => WeaponStats {
                clip_size: 30,
                reload_ms: 2000,
                damage: 9.0,
                cooldown_ms: 120,
                automatic: true,
            },
            WeaponId::Sniper => WeaponStats {
                clip_size: 5,
                reload_ms: 3000,
                damage: 75.0,
                cooldown_ms: 1500,
                automatic: false,
            },
            WeaponId::Smg => WeaponStats {
                clip_size: 40,
                reload_ms: 1500,
                damage: 6.0,
                cooldown_ms: 90,
                automatic: true,
            },
        }
    }

    pub fn clip_size(self) -> u32 {
        self.stats().clip_size
    }

    /// Angular offsets (radians) of the projectiles fired by one trigger pull.
    pub fn spread(self) -> &'static [f32] {
        match self {
            WeaponId::Shotgun => &crate::SHOTGUN_SPREAD,
            _ => &[0.0],
        }
    }

    pub fn all() -> impl Iterator<Item = WeaponId> {
        WeaponId::iter()
    }
}
