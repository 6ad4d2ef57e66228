use std::{f32::consts::FRAC_PI_4, sync::Arc, time::Duration};

use ghost_maze_core::{Event, GhostKind, MazeDimensions, Player};
use ghost_maze_system_flashlight::{Config as FlashlightConfig, Flashlight};
use ghost_maze_system_ghosts::{Config, GhostEngine, TickContext};
use ghost_maze_system_spatial::WallGrid;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const CAP: usize = 60;

#[test]
fn population_is_held_at_cap_through_deaths_and_contacts() {
    let grid = WallGrid::build(
        MazeDimensions::new(1500.0, 1500.0, 100.0),
        Arc::from(Vec::new()),
    );
    let mut engine = GhostEngine::new(Config::new(CAP));
    let mut flashlight = Flashlight::new(FlashlightConfig::new(FRAC_PI_4, 60, 800.0));
    let mut player = Player::new(Vec2::ZERO, 10.0, 10.0);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut now = Duration::ZERO;

    let mut spawned = Vec::new();
    engine.populate(&grid, player.position(), now, &mut rng, &mut spawned);
    assert_eq!(engine.len(), CAP);
    assert!(engine.every_kind_spawned());

    let mut kills = 0;
    let mut hits = 0;
    let dt = Duration::from_millis(16);
    for step in 0..900 {
        now += dt;
        let angle = step as f32 * 0.02;
        player.set_facing(angle);
        flashlight.set_angle(angle);
        let segments = flashlight.cast(player.position(), &grid).to_vec();

        let context = TickContext {
            now,
            dt,
            player: &player,
            segments: &segments,
            flashlight_on: true,
            fov: FRAC_PI_4,
            max_distance: 800.0,
            debug: false,
            grid: &grid,
        };
        let mut events = Vec::new();
        let mut debuffs = Vec::new();
        engine.update(&context, &mut rng, &mut events, &mut debuffs);

        assert_eq!(engine.len(), CAP, "step {step}");
        for ghost in engine.ghosts() {
            assert!((0.0..=1.0).contains(&ghost.opacity()));
            let position = ghost.position();
            assert!(position.x.abs() <= 750.0 && position.y.abs() <= 750.0);
        }

        let killed: Vec<GhostKind> = events
            .iter()
            .filter_map(|event| match event {
                Event::GhostKilled { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        for kind in &killed {
            assert!(events
                .iter()
                .any(|event| matches!(event, Event::GhostSpawned { kind: respawned, .. } if respawned == kind)));
        }
        kills += killed.len();
        hits += events
            .iter()
            .filter(|event| matches!(event, Event::PlayerHit { .. }))
            .count();
    }

    assert!(kills > 0, "a sweeping flashlight should kill something");
    assert!(hits > 0, "some ghost should reach the player");
}

#[test]
fn identical_seeds_replay_identically() {
    fn run(seed: u64) -> Vec<(u32, [u32; 2])> {
        let grid = WallGrid::build(
            MazeDimensions::new(1500.0, 1500.0, 100.0),
            Arc::from(Vec::new()),
        );
        let mut engine = GhostEngine::new(Config::new(20));
        let player = Player::new(Vec2::ZERO, 10.0, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();
        engine.populate(&grid, Vec2::ZERO, Duration::ZERO, &mut rng, &mut events);

        let mut now = Duration::ZERO;
        for _ in 0..120 {
            now += Duration::from_millis(16);
            let context = TickContext {
                now,
                dt: Duration::from_millis(16),
                player: &player,
                segments: &[],
                flashlight_on: false,
                fov: FRAC_PI_4,
                max_distance: 800.0,
                debug: false,
                grid: &grid,
            };
            let mut debuffs = Vec::new();
            engine.update(&context, &mut rng, &mut events, &mut debuffs);
        }
        engine
            .ghosts()
            .iter()
            .map(|ghost| {
                let position = ghost.position();
                (ghost.id().get(), [position.x.to_bits(), position.y.to_bits()])
            })
            .collect()
    }

    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}
