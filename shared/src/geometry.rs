//! Planar vectors and the static obstacle set of the arena.
//!
//! The arena is a flat plane addressed by `x` and `z`. Obstacles are
//! axis-aligned boxes described by their center and extents; they never move
//! for the lifetime of the process.

use serde::{Deserialize, Serialize};

use crate::PLAYER_RADIUS;

///Represents a vector on the arena floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec2 {
    ///Value along the x-axis.
    pub x: f32,
    ///Value along the z-axis.
    pub z: f32,
}

impl Vec2 {
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    ///Returns the normalized vector, or `None` for a zero or non-finite vector.
    pub fn normalize(&self) -> Option<Vec2> {
        let mag = self.magnitude();
        if mag == 0.0 || !mag.is_finite() {
            None
        } else {
            Some(Vec2 {
                x: self.x / mag,
                z: self.z / mag,
            })
        }
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vec2 {
        Vec2 {
            x: self.x * scalar,
            z: self.z * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            z: self.z + other.z,
        }
    }

    ///Returns the vector rotated by `angle` radians.
    pub fn rotate(&self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2 {
            x: self.x * cos - self.z * sin,
            z: self.x * sin + self.z * cos,
        }
    }

    ///Returns the euclidean distance between two points.
    pub fn distance(&self, other: &Vec2) -> f32 {
        (self.x - other.x).hypot(self.z - other.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

///Represents a static box in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    ///The positional center of the box.
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

impl Obstacle {
    pub const fn new(x: f32, z: f32, width: f32, depth: f32) -> Self {
        Self { x, z, width, depth }
    }

    ///Returns true if the point lies strictly inside the box grown by `margin` on every side.
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        let half_w = self.width / 2.0 + margin;
        let half_d = self.depth / 2.0 + margin;

        point.x > self.x - half_w
            && point.x < self.x + half_w
            && point.z > self.z - half_d
            && point.z < self.z + half_d
    }

    ///Returns true if the point lies strictly inside the box.
    pub fn contains(&self, point: Vec2) -> bool {
        self.contains_with_margin(point, 0.0)
    }
}

/// Walls of the single arena map.
pub const ARENA_OBSTACLES: [Obstacle; 5] = [
    Obstacle::new(10.0, 10.0, 4.0, 4.0),
    Obstacle::new(-10.0, -10.0, 5.0, 2.0),
    Obstacle::new(15.0, -5.0, 2.0, 8.0),
    Obstacle::new(-12.0, 8.0, 6.0, 1.0),
    Obstacle::new(0.0, 15.0, 10.0, 1.0),
];

/// Returns true if a player standing at `(x, z)` overlaps none of the obstacles.
pub fn can_move(obstacles: &[Obstacle], x: f32, z: f32) -> bool {
    let point = Vec2::new(x, z);
    !obstacles
        .iter()
        .any(|o| o.contains_with_margin(point, PLAYER_RADIUS))
}

/// Returns true if a projectile at `point` is inside any obstacle.
pub fn hits_obstacle(obstacles: &[Obstacle], point: Vec2) -> bool {
    obstacles.iter().any(|o| o.contains(point))
}
