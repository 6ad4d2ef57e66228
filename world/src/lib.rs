#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Ghost Maze.
//!
//! The world owns the maze, the player, the flashlight and the ghost
//! population. Adapters mutate it exclusively through [`apply`] and read it
//! through [`query`]; the world answers every command with events and never
//! fails out of a tick.

mod config;

use std::time::Duration;

use ghost_maze_core::{
    Command, DebuffKind, Event, FlashlightPower, Maze, MoveRejection, PlayMode, Player,
    WELCOME_BANNER,
};
use ghost_maze_system_flashlight::{Config as FlashlightSystemConfig, Flashlight};
use ghost_maze_system_ghosts::{DebuffRequest, GhostEngine, TickContext};
use ghost_maze_system_maze_generation::{Config as GenerationConfig, MazeGenerator};
use ghost_maze_system_spatial::WallGrid;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use config::{FlashlightConfig, GhostConfig, MazeConfig, PlayerConfig, SimulationConfig};

/// Failures surfaced while building a world.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// Every generation attempt produced an unusable maze.
    #[error("maze generation failed after {attempts} attempts")]
    MazeGenerationFailed {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

/// A generated maze together with its wall index.
#[derive(Debug)]
struct Level {
    maze: Maze,
    grid: WallGrid,
    attempts: u32,
}

/// Represents the authoritative Ghost Maze world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    maze: Maze,
    grid: WallGrid,
    player: Player,
    power: FlashlightPower,
    flashlight: Flashlight,
    ghosts: GhostEngine,
    now: Duration,
    debug: bool,
    play_mode: PlayMode,
    exit_reached: bool,
}

impl World {
    /// Creates a world and generates its first level.
    ///
    /// Events produced while populating the first level are discarded; issue
    /// [`Command::GenerateLevel`] to observe a level start.
    pub fn new(config: SimulationConfig) -> Result<Self, WorldError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let level = generate_level(&config, &mut rng)?;
        let flashlight = Flashlight::new(
            FlashlightSystemConfig::new(
                config.flashlight.fov,
                config.flashlight.ray_count,
                config.flashlight.max_distance,
            )
            .with_min_ray_count(config.flashlight.min_ray_count)
            .with_cache_limit(config.flashlight.cache_limit)
            .with_adaptive_ray_count(config.flashlight.adaptive),
        );
        let mut world = Self {
            banner: WELCOME_BANNER,
            player: Player::new(
                Vec2::ZERO,
                config.player.size,
                config.player.collider_size,
            ),
            power: FlashlightPower::new(config.flashlight.starts_on),
            ghosts: GhostEngine::new(config.ghosts.engine_config()),
            maze: level.maze,
            grid: level.grid,
            flashlight,
            rng,
            config,
            now: Duration::ZERO,
            debug: false,
            play_mode: PlayMode::Exploring,
            exit_reached: false,
        };
        let mut discarded = Vec::new();
        world.ghosts.populate(
            &world.grid,
            world.player.position(),
            world.now,
            &mut world.rng,
            &mut discarded,
        );
        info!(
            seed = world.config.seed,
            walls = world.maze.walls().len(),
            ghosts = world.ghosts.len(),
            "world ready"
        );
        Ok(world)
    }

    fn install_level(&mut self, level: Level, out_events: &mut Vec<Event>) {
        let dimensions = *level.maze.dimensions();
        out_events.push(Event::LevelGenerated {
            columns: dimensions.columns(),
            rows: dimensions.rows(),
            wall_count: level.maze.walls().len(),
            exit: level.maze.exit(),
            attempts: level.attempts,
        });

        self.maze = level.maze;
        self.grid = level.grid;
        self.player.set_position(Vec2::ZERO);
        self.player.clear_debuffs();
        self.power = FlashlightPower::new(self.config.flashlight.starts_on);
        self.flashlight.invalidate_cache();
        self.flashlight.clear();
        self.exit_reached = false;
        self.ghosts.populate(
            &self.grid,
            self.player.position(),
            self.now,
            &mut self.rng,
            out_events,
        );
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.now = self.now.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        self.flashlight.record_frame(dt);
        if self.power.is_on() {
            let _ = self.flashlight.cast(self.player.position(), &self.grid);
        } else {
            self.flashlight.clear();
        }

        let context = TickContext {
            now: self.now,
            dt,
            player: &self.player,
            segments: self.flashlight.segments(),
            flashlight_on: self.power.is_on(),
            fov: self.flashlight.fov(),
            max_distance: self.flashlight.max_distance(),
            debug: self.debug,
            grid: &self.grid,
        };
        let mut requests = Vec::new();
        self.ghosts
            .update(&context, &mut self.rng, out_events, &mut requests);
        for DebuffRequest { kind, duration } in requests {
            self.apply_debuff(kind, duration, out_events);
        }

        for kind in self.player.expire_debuffs(self.now) {
            debug!(%kind, "debuff expired");
            out_events.push(Event::DebuffExpired { kind });
            if kind == DebuffKind::FlashlightDisabled
                && !self.player.has_debuff(DebuffKind::FlashlightDisabled)
            {
                self.power.restore();
                if self.power.is_on() {
                    self.flashlight.set_angle(self.player.facing());
                }
            }
        }

        if !self.exit_reached
            && self.maze.dimensions().cell_at(self.player.position()) == Some(self.maze.exit())
        {
            self.exit_reached = true;
            info!(exit = ?self.maze.exit(), "exit reached");
            out_events.push(Event::ExitReached {
                exit: self.maze.exit(),
            });
        }
    }

    fn move_player(&mut self, delta: Vec2, out_events: &mut Vec<Event>) {
        if self.player.has_debuff(DebuffKind::Immobilized) {
            out_events.push(Event::PlayerMoveRejected {
                reason: MoveRejection::Immobilized,
            });
            return;
        }

        let from = self.player.position();
        let to = from + delta;
        if self.grid.collides(to, self.player.collider_size()) {
            out_events.push(Event::PlayerMoveRejected {
                reason: MoveRejection::Wall,
            });
            return;
        }

        self.player.set_position(to);
        out_events.push(Event::PlayerMoved { from, to });
    }

    fn apply_debuff(&mut self, kind: DebuffKind, duration: Duration, out_events: &mut Vec<Event>) {
        let expires_at = self
            .player
            .add_debuff(kind, self.now.saturating_add(duration));
        if kind == DebuffKind::FlashlightDisabled {
            self.power.disable();
            self.flashlight.clear();
        }
        debug!(%kind, ?expires_at, "debuff applied");
        out_events.push(Event::DebuffApplied { kind, expires_at });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::GenerateLevel => match generate_level(&world.config, &mut world.rng) {
            Ok(level) => world.install_level(level, out_events),
            Err(WorldError::MazeGenerationFailed { attempts }) => {
                warn!(attempts, "keeping the previous level");
                out_events.push(Event::LevelGenerationFailed { attempts });
            }
        },
        Command::Tick { dt } => {
            if world.play_mode == PlayMode::Exploring {
                world.tick(dt, out_events);
            }
        }
        Command::MovePlayer { delta } => world.move_player(delta, out_events),
        Command::AimFlashlight { angle } => {
            world.player.set_facing(angle);
            if world.power.is_on() {
                world.flashlight.set_angle(angle);
            }
        }
        Command::ToggleFlashlight => {
            if world.power.toggle() {
                let on = world.power.is_on();
                if on {
                    world.flashlight.set_angle(world.player.facing());
                } else {
                    world.flashlight.clear();
                }
                out_events.push(Event::FlashlightToggled { on });
            } else {
                out_events.push(Event::FlashlightToggleRejected);
            }
        }
        Command::SetDebugMode { enabled } => {
            world.debug = enabled;
        }
        Command::SetPlayMode { mode } => {
            if world.play_mode != mode {
                world.play_mode = mode;
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::ApplyDebuff { kind, duration } => world.apply_debuff(kind, duration, out_events),
    }
}

/// Carves mazes until one leaves the player's spawn point free to move.
fn generate_level<R>(config: &SimulationConfig, rng: &mut R) -> Result<Level, WorldError>
where
    R: Rng + ?Sized,
{
    let dimensions = config.maze.dimensions();
    let generator = MazeGenerator::new(
        GenerationConfig::new(
            dimensions,
            config.maze.start_column_offset,
            config.maze.start_row_offset,
            config.maze.safe_radius,
        )
        .with_exit_exclusion(config.maze.exit_exclusion),
    );

    for attempt in 1..=config.maze.max_attempts {
        let maze = match generator.generate(rng) {
            Ok(maze) => maze,
            Err(error) => {
                debug!(attempt, %error, "maze attempt rejected");
                continue;
            }
        };
        let grid = WallGrid::build(dimensions, maze.shared_walls());
        if spawn_is_stuck(&grid, Vec2::ZERO, config.player.collider_size) {
            debug!(attempt, "player spawn is boxed in; regenerating");
            continue;
        }
        return Ok(Level {
            maze,
            grid,
            attempts: attempt,
        });
    }

    warn!(attempts = config.maze.max_attempts, "maze generation failed");
    Err(WorldError::MazeGenerationFailed {
        attempts: config.maze.max_attempts,
    })
}

/// A spawn is stuck when it lies inside a wall or every axis step away is blocked.
fn spawn_is_stuck(grid: &WallGrid, spawn: Vec2, collider_size: f32) -> bool {
    if grid.collides(spawn, collider_size) {
        return true;
    }
    [
        Vec2::new(-collider_size, 0.0),
        Vec2::new(collider_size, 0.0),
        Vec2::new(0.0, -collider_size),
        Vec2::new(0.0, collider_size),
    ]
    .into_iter()
    .all(|offset| grid.collides(spawn + offset, collider_size))
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use ghost_maze_core::{
        DebuffKind, GhostView, Maze, PlayMode, Player, ProximityWarning, RaySegment,
    };
    use ghost_maze_system_spatial::WallGrid;
    use glam::Vec2;

    use super::{SimulationConfig, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Provides read-only access to the current maze.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Provides read-only access to the wall index of the current maze.
    #[must_use]
    pub fn wall_grid(world: &World) -> &WallGrid {
        &world.grid
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Captures a read-only view of the ghosts haunting the maze.
    #[must_use]
    pub fn ghost_view(world: &World) -> GhostView {
        world.ghosts.view()
    }

    /// Ray segments of the current visibility fan; empty while the flashlight is off.
    #[must_use]
    pub fn ray_segments(world: &World) -> &[RaySegment] {
        world.flashlight.segments()
    }

    /// Outline of the lit area: the player followed by every ray end point.
    #[must_use]
    pub fn visibility_polygon(world: &World) -> Vec<Vec2> {
        world.flashlight.visibility_polygon()
    }

    /// Ghosts close enough to trip the proximity indicator, nearest first.
    ///
    /// Empty while the player carries [`DebuffKind::WarningHidden`].
    #[must_use]
    pub fn warnings(world: &World) -> Vec<ProximityWarning> {
        if world.player.has_debuff(DebuffKind::WarningHidden) {
            return Vec::new();
        }
        world.ghosts.warnings(world.player.position())
    }

    /// Reports the flashlight's switch state and cone.
    #[must_use]
    pub fn flashlight(world: &World) -> FlashlightView {
        FlashlightView {
            on: world.power.is_on(),
            disabled: world.power.is_disabled(),
            angle: world.flashlight.angle(),
            fov: world.flashlight.fov(),
            ray_count: world.flashlight.ray_count(),
            max_distance: world.flashlight.max_distance(),
        }
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Reports the play mode currently active.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Reports whether hidden ghosts are drawn faintly.
    #[must_use]
    pub fn debug_mode(world: &World) -> bool {
        world.debug
    }

    /// Reports whether the player already reached this level's exit.
    #[must_use]
    pub fn exit_reached(world: &World) -> bool {
        world.exit_reached
    }

    /// Read-only description of the flashlight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct FlashlightView {
        /// Whether the flashlight emits light.
        pub on: bool,
        /// Whether a debuff forces it off.
        pub disabled: bool,
        /// Direction of the cone bisector in radians.
        pub angle: f32,
        /// Width of the cone in radians.
        pub fov: f32,
        /// Angular steps across the cone.
        pub ray_count: u32,
        /// Reach of each ray.
        pub max_distance: f32,
    }
}
