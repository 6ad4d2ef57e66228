#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Ghost Maze session.
//!
//! The session is driven by a scripted autopilot, so a seed and a tick
//! count fully determine the outcome. Every frame is composed into a scene
//! and handed to a headless backend; a summary of the session statistics is
//! printed once the run ends.

mod autopilot;
mod frames;

use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use ghost_maze_core::{Command, DebuffKind, Event, GhostKind};
use ghost_maze_rendering::{Color, HitFlash, RenderingBackend, Scene, SceneSources};
use ghost_maze_system_analytics::{Analytics, SessionStats};
use ghost_maze_world::{self as world, query, SimulationConfig, World};
use tracing::{info, warn};

use autopilot::Autopilot;
use frames::{FrameRecorder, FrameTotals};

#[derive(Parser)]
#[command(author, version, about = "Headless Ghost Maze session", long_about = None)]
struct Args {
    /// TOML file overriding the default session configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed of the simulation's random source
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of simulation ticks to run
    #[arg(short, long, default_value_t = 3600)]
    ticks: u32,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 16)]
    tick_millis: u64,

    /// Debuff applied to the player when the session starts; may repeat
    #[arg(long = "debuff")]
    debuffs: Vec<String>,

    /// Draw hidden ghosts faintly
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Text file receiving one line per rendered frame
    #[arg(long)]
    frame_log: Option<PathBuf>,

    /// Print the session statistics as JSON instead of the text summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Entry point for the Ghost Maze command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut world = World::new(config).context("failed to build the first level")?;
    println!("{}", query::welcome_banner(&world));

    let mut opening = vec![
        Command::GenerateLevel,
        Command::SetDebugMode {
            enabled: args.debug,
        },
    ];
    for tag in &args.debuffs {
        match tag.parse::<DebuffKind>() {
            Ok(kind) => opening.push(Command::ApplyDebuff {
                kind,
                duration: Duration::from_secs(3),
            }),
            Err(error) => warn!(%error, "ignoring debuff"),
        }
    }

    let frame_log = args
        .frame_log
        .as_ref()
        .map(|path| {
            File::create(path)
                .map(BufWriter::new)
                .with_context(|| format!("failed to create frame log {}", path.display()))
        })
        .transpose()?;
    let mut backend = FrameRecorder::new(frame_log);
    let mut analytics = Analytics::new();
    let mut autopilot = Autopilot::default();
    let mut flash = HitFlash::default();
    for command in opening {
        flash.observe(&submit(&mut world, &mut analytics, command));
    }

    let dt = Duration::from_millis(args.tick_millis);
    let step = query::config(&world).player.step;
    for _ in 0..args.ticks {
        let input = autopilot.next_input(&world);
        let commands = input.into_commands(
            dt,
            step,
            query::debug_mode(&world),
            query::play_mode(&world),
        );
        let mut exit_reached = false;
        for command in commands {
            let events = submit(&mut world, &mut analytics, command);
            flash.observe(&events);
            exit_reached |= events
                .iter()
                .any(|event| matches!(event, Event::ExitReached { .. }));
        }
        if exit_reached {
            autopilot.restart();
            let _ = submit(&mut world, &mut analytics, Command::GenerateLevel);
        }

        let scene = compose(&world, flash.advance());
        backend
            .present(&scene)
            .context("failed to present frame")?;
    }
    backend.finish().context("failed to flush frame log")?;

    let totals = backend.totals();
    info!(
        frames = totals.frames,
        flashed = totals.flashed,
        peak_ghosts = totals.peak_ghosts,
        live_ghosts = query::ghost_view(&world).len(),
        "session finished"
    );

    if args.json {
        let json = serde_json::to_string_pretty(analytics.stats())
            .context("failed to serialize session statistics")?;
        println!("{json}");
    } else {
        print!("{}", summary(analytics.stats(), totals));
    }
    Ok(())
}

/// Composes the frame the player would see right now.
fn compose(world: &World, hit_flash: Option<Color>) -> Scene {
    let ghosts = query::ghost_view(world);
    let warnings = query::warnings(world);
    let polygon = query::visibility_polygon(world);
    Scene::compose(SceneSources {
        maze: query::maze(world),
        player: query::player(world),
        flashlight_on: query::flashlight(world).on,
        visibility_polygon: &polygon,
        ghosts: &ghosts,
        warnings: &warnings,
        hit_flash,
        play_mode: query::play_mode(world),
    })
}

/// Applies one command, feeds its events to the stat sink and returns them.
fn submit(world: &mut World, analytics: &mut Analytics, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    analytics.handle(&events);
    events
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
}

fn summary(stats: &SessionStats, totals: FrameTotals) -> String {
    let mut lines = vec![
        format!(
            "levels {} | clears {} | time {:.1}s",
            stats.levels(),
            stats.clears(),
            stats.time_played().as_secs_f32()
        ),
        format!(
            "kills {} | hits {}",
            stats.total_kills(),
            stats.total_hits()
        ),
        format!(
            "frames {} | hit flash frames {}",
            totals.frames, totals.flashed
        ),
    ];
    for kind in GhostKind::ALL {
        lines.push(format!(
            "  {:<13} kills {:>4}  hits {:>4}",
            kind.tag(),
            stats.kills(kind),
            stats.hits(kind)
        ));
    }
    for kind in DebuffKind::ALL {
        lines.push(format!("  {:<18} {:>4}", kind.tag(), stats.debuffs(kind)));
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
