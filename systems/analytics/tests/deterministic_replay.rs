use std::{
    collections::hash_map::DefaultHasher,
    f32::consts::TAU,
    hash::{Hash, Hasher},
    time::Duration,
};

use ghost_maze_core::{Command, DebuffKind, Event};
use ghost_maze_system_analytics::{Analytics, SessionStats};
use ghost_maze_world::{self as world, query, GhostConfig, SimulationConfig, World};
use glam::Vec2;

#[test]
fn session_replays_identically_for_same_seed() {
    let script = session_script();
    let first = replay(5, script.clone());
    let second = replay(5, script.clone());

    assert_eq!(first, second, "session replay diverged");
    assert_eq!(first.stats.levels(), 2);
    assert!(first.stats.debuffs(DebuffKind::WarningHidden) >= 1);
    assert_eq!(first.stats.time_played(), Duration::from_millis(16 * 600));

    let other = replay(6, script);
    assert_ne!(first.fingerprint, other.fingerprint, "seed must matter");
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    stats: SessionStats,
    fingerprint: u64,
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let config = SimulationConfig {
        seed,
        ghosts: GhostConfig {
            population_cap: 80,
            ..GhostConfig::default()
        },
        ..SimulationConfig::default()
    };
    let mut world = World::new(config).expect("world builds");
    let mut analytics = Analytics::new();
    let mut hasher = DefaultHasher::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        analytics.handle(&events);
        for event in &events {
            fingerprint_event(event, &mut hasher);
        }
    }

    for ghost in query::ghost_view(&world).iter() {
        ghost.id.hash(&mut hasher);
        ghost.position.x.to_bits().hash(&mut hasher);
        ghost.position.y.to_bits().hash(&mut hasher);
    }

    ReplayOutcome {
        stats: analytics.stats().clone(),
        fingerprint: hasher.finish(),
    }
}

fn fingerprint_event(event: &Event, hasher: &mut DefaultHasher) {
    match event {
        Event::GhostSpawned { ghost, kind } | Event::PlayerHit { ghost, kind } => {
            ghost.hash(hasher);
            kind.hash(hasher);
        }
        Event::GhostKilled { ghost, kind, .. } => {
            ghost.hash(hasher);
            kind.hash(hasher);
        }
        Event::LevelGenerated {
            wall_count, exit, ..
        } => {
            wall_count.hash(hasher);
            exit.hash(hasher);
        }
        Event::DebuffApplied { kind, expires_at } => {
            kind.hash(hasher);
            expires_at.hash(hasher);
        }
        Event::PlayerMoved { to, .. } => {
            to.x.to_bits().hash(hasher);
            to.y.to_bits().hash(hasher);
        }
        _ => {}
    }
}

fn session_script() -> Vec<Command> {
    let mut commands = vec![Command::GenerateLevel];
    let dt = Duration::from_millis(16);
    for step in 0..600_u32 {
        let angle = (step as f32 * 0.03) % TAU;
        commands.push(Command::AimFlashlight { angle });
        if step % 3 == 0 {
            commands.push(Command::MovePlayer {
                delta: Vec2::from_angle(angle) * 2.0,
            });
        }
        if step == 200 {
            commands.push(Command::ApplyDebuff {
                kind: DebuffKind::WarningHidden,
                duration: Duration::from_secs(3),
            });
        }
        if step == 300 {
            commands.push(Command::ToggleFlashlight);
        }
        if step == 360 {
            commands.push(Command::ToggleFlashlight);
        }
        commands.push(Command::Tick { dt });
    }
    commands.push(Command::GenerateLevel);
    commands
}
