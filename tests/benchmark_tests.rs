//! Performance benchmarks for critical game systems

use bincode::serialize;
use server::game::GameState;
use shared::{can_move, Packet, Vec2, WeaponId, ARENA_OBSTACLES, PROTOCOL_VERSION};
use std::time::Instant;

const START: u64 = 1_000_000;

/// A full server: 32 players spread over the arena, each facing outward
fn crowded_arena() -> GameState {
    let mut state = GameState::with_seed(7);
    for id in 0..32u32 {
        let name = format!("player{}", id);
        let origin = format!("10.0.0.{}", id);
        state.join(id, &origin, PROTOCOL_VERSION, &name).unwrap();

        let angle = id as f32 / 32.0 * std::f32::consts::TAU;
        let direction = Vec2::new(angle.cos(), angle.sin());
        state.move_player(id, direction.scale(5.0), direction);
    }
    while state.spawn_loot() {}
    state
}

/// Benchmarks obstacle checks for movement validation
#[test]
fn benchmark_can_move() {
    let iterations = 100_000;
    let start = Instant::now();

    let mut free = 0;
    for i in 0..iterations {
        let x = (i % 400) as f32 * 0.1 - 20.0;
        let z = (i / 400 % 400) as f32 * 0.1 - 20.0;
        if can_move(&ARENA_OBSTACLES, x, z) {
            free += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Movement checks: {} iterations in {:?} ({:.2} ns/iter), {} free",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64,
        free
    );

    assert!(free > 0);
    // Should complete in under 100ms for 100k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks the simulation tick with every player firing continuously
#[test]
fn benchmark_tick_under_fire() {
    let mut state = crowded_arena();
    let weapons = [WeaponId::Smg, WeaponId::Rifle, WeaponId::Shotgun];

    let ticks = 600;
    let start = Instant::now();
    let mut peak_projectiles = 0;

    for tick in 0..ticks {
        let now = START + tick * 16;
        for id in 0..32u32 {
            state.shoot(id, weapons[id as usize % weapons.len()], now);
        }
        state.update(now);
        peak_projectiles = peak_projectiles.max(state.projectiles.len());
    }

    let duration = start.elapsed();
    println!(
        "Simulation: {} ticks in {:?} ({:.2} μs/tick), peak {} projectiles",
        ticks,
        duration,
        duration.as_micros() as f64 / ticks as f64,
        peak_projectiles
    );

    assert!(peak_projectiles > 32);
    // Ten seconds of game time should simulate in well under a second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks building and encoding the per-tick snapshot
#[test]
fn benchmark_snapshot_serialization() {
    let mut state = crowded_arena();
    for id in 0..32u32 {
        state.shoot(id, WeaponId::Shotgun, START);
    }

    let iterations = 1_000;
    let start = Instant::now();
    let mut size = 0;

    for _ in 0..iterations {
        let data = serialize(&Packet::State(state.snapshot())).unwrap();
        size = data.len();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encoding: {} iterations in {:?} ({:.2} μs/iter), {} bytes",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64,
        size
    );

    // A full snapshot must still fit in one datagram
    assert!(size < 65_507);
    assert!(duration.as_millis() < 2000);
}
