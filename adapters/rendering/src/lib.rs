#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Ghost Maze adapters.
//!
//! Backends never read simulation state directly. Adapters compose a
//! [`Scene`] from world queries each frame, and the scene applies the
//! drawing rules of the game: the exit path is only hinted in the dark, and
//! while the flashlight is on only illuminated ghosts are drawn. Ghost
//! identity colors and animated opacity stay separate until this point.

use ghost_maze_core::{
    Command, Event, GhostColor, GhostId, GhostSnapshot, GhostView, Maze, PlayMode, Player,
    ProximityWarning, Wall,
};
use glam::Vec2;
use std::{io, time::Duration};
use thiserror::Error;

const HIT_FLASH_FRAMES: u32 = 30;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Combines a ghost's identity color with its animated opacity.
    #[must_use]
    pub fn from_ghost(color: GhostColor, opacity: f32) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue()).with_alpha(opacity)
    }

    /// Returns the same color with the alpha channel replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Desired movement direction; zero when no movement key is held.
    pub movement: Vec2,
    /// Facing angle derived from the cursor, if the cursor moved.
    pub facing: Option<f32>,
    /// Whether the adapter detected a flashlight toggle press on this frame.
    pub toggle_flashlight: bool,
    /// Whether the adapter detected a debug toggle press on this frame.
    pub toggle_debug: bool,
    /// Whether the adapter detected a pause toggle press on this frame.
    pub toggle_pause: bool,
}

impl FrameInput {
    /// Translates the input into world commands, ending with the frame's tick.
    ///
    /// `step` is the distance covered by one movement step; `debug` and
    /// `play_mode` are the states the toggles flip.
    #[must_use]
    pub fn into_commands(
        self,
        dt: Duration,
        step: f32,
        debug: bool,
        play_mode: PlayMode,
    ) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.toggle_pause {
            let mode = match play_mode {
                PlayMode::Exploring => PlayMode::Paused,
                PlayMode::Paused => PlayMode::Exploring,
            };
            commands.push(Command::SetPlayMode { mode });
        }
        if self.toggle_debug {
            commands.push(Command::SetDebugMode { enabled: !debug });
        }
        if let Some(angle) = self.facing {
            commands.push(Command::AimFlashlight { angle });
        }
        if self.toggle_flashlight {
            commands.push(Command::ToggleFlashlight);
        }
        let direction = self.movement.normalize_or_zero();
        if direction != Vec2::ZERO {
            commands.push(Command::MovePlayer {
                delta: direction * step,
            });
        }
        commands.push(Command::Tick { dt });
        commands
    }
}

/// Maze geometry as drawn this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MazePresentation {
    /// Wall rectangles in world units.
    pub walls: Vec<Wall>,
    /// Side length of one cell.
    pub cell_size: f32,
    /// Upper-left corner of the exit cell.
    pub exit: Vec2,
    /// Upper-left corners of the exit path cells; empty while the flashlight is on.
    pub exit_path: Vec<Vec2>,
    /// Color used for walls.
    pub wall_color: Color,
    /// Color used for the exit path hint.
    pub path_color: Color,
    /// Color used for the exit cell.
    pub exit_color: Color,
}

/// Player avatar as drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Center of the avatar.
    pub position: Vec2,
    /// Radius of the avatar.
    pub radius: f32,
    /// Facing angle in radians.
    pub facing: f32,
}

/// Ghost as drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostPresentation {
    /// Identifier of the ghost.
    pub id: GhostId,
    /// Center of the ghost.
    pub position: Vec2,
    /// Radius of the ghost.
    pub radius: f32,
    /// Identity color with the ghost's opacity folded into alpha.
    pub color: Color,
}

impl GhostPresentation {
    fn from_snapshot(snapshot: &GhostSnapshot) -> Self {
        Self {
            id: snapshot.id,
            position: snapshot.position,
            radius: snapshot.size,
            color: Color::from_ghost(snapshot.color, snapshot.opacity),
        }
    }
}

/// Proximity indicator drawn around the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarningPresentation {
    /// Direction from the player toward the ghost, in radians.
    pub bearing: f32,
    /// Closeness in `0.0..=1.0`, where `1.0` means touching.
    pub urgency: f32,
    /// Identity color of the ghost kind.
    pub color: Color,
}

/// Scene description combining the maze, the player, the light and the ghosts.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Maze geometry.
    pub maze: MazePresentation,
    /// Player avatar.
    pub player: PlayerPresentation,
    /// Outline of the lit area; empty while the flashlight is off.
    pub visibility_polygon: Vec<Vec2>,
    /// Ghosts that should be drawn.
    pub ghosts: Vec<GhostPresentation>,
    /// Proximity indicators.
    pub warnings: Vec<WarningPresentation>,
    /// Full-screen tint after the player was hit.
    pub hit_flash: Option<Color>,
    /// Active play mode for the simulation.
    pub play_mode: PlayMode,
}

/// World state a scene is composed from.
#[derive(Clone, Copy, Debug)]
pub struct SceneSources<'a> {
    /// Current maze.
    pub maze: &'a Maze,
    /// Current player.
    pub player: &'a Player,
    /// Whether the flashlight emits light.
    pub flashlight_on: bool,
    /// Outline of the lit area.
    pub visibility_polygon: &'a [Vec2],
    /// Every live ghost.
    pub ghosts: &'a GhostView,
    /// Active proximity warnings.
    pub warnings: &'a [ProximityWarning],
    /// Tint produced by [`HitFlash::advance`] for this frame.
    pub hit_flash: Option<Color>,
    /// Active play mode.
    pub play_mode: PlayMode,
}

impl Scene {
    /// Composes a scene from the provided world state.
    #[must_use]
    pub fn compose(sources: SceneSources<'_>) -> Self {
        let dimensions = sources.maze.dimensions();
        let exit_path = if sources.flashlight_on {
            Vec::new()
        } else {
            sources
                .maze
                .exit_path()
                .iter()
                .map(|cell| dimensions.cell_origin(*cell))
                .collect()
        };
        let ghosts = sources
            .ghosts
            .iter()
            .filter(|ghost| !sources.flashlight_on || ghost.illuminated)
            .map(GhostPresentation::from_snapshot)
            .collect();
        let warnings = sources
            .warnings
            .iter()
            .map(|warning| {
                let range = warning.kind.profile().warning_range;
                let urgency = if range > 0.0 {
                    (1.0 - warning.distance / range).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let color = warning.kind.profile().color;
                WarningPresentation {
                    bearing: warning.bearing,
                    urgency,
                    color: Color::from_ghost(color, urgency),
                }
            })
            .collect();

        Self {
            maze: MazePresentation {
                walls: sources.maze.walls().to_vec(),
                cell_size: dimensions.cell_size(),
                exit: dimensions.cell_origin(sources.maze.exit()),
                exit_path,
                wall_color: Color::from_rgb_u8(255, 255, 255),
                path_color: Color::from_rgb_u8(128, 128, 128),
                exit_color: Color::from_rgb_u8(0, 128, 0),
            },
            player: PlayerPresentation {
                position: sources.player.position(),
                radius: sources.player.size(),
                facing: sources.player.facing(),
            },
            visibility_polygon: if sources.flashlight_on {
                sources.visibility_polygon.to_vec()
            } else {
                Vec::new()
            },
            ghosts,
            warnings,
            hit_flash: sources.hit_flash,
            play_mode: sources.play_mode,
        }
    }
}

/// Fading full-screen tint triggered by ghost contact.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitFlash {
    color: Option<GhostColor>,
    frames_left: u32,
}

impl HitFlash {
    /// Restarts the flash for the last hit among `events`.
    pub fn observe(&mut self, events: &[Event]) {
        let last_hit = events.iter().rev().find_map(|event| match event {
            Event::PlayerHit { kind, .. } => Some(kind.profile().color),
            _ => None,
        });
        if let Some(color) = last_hit {
            self.color = Some(color);
            self.frames_left = HIT_FLASH_FRAMES;
        }
    }

    /// Advances one frame and returns the tint to draw, if any.
    pub fn advance(&mut self) -> Option<Color> {
        let color = self.color?;
        if self.frames_left == 0 {
            self.color = None;
            return None;
        }
        let alpha = self.frames_left as f32 / HIT_FLASH_FRAMES as f32;
        self.frames_left -= 1;
        Some(Color::from_ghost(color, alpha))
    }
}

/// Rendering backend capable of presenting Ghost Maze scenes.
pub trait RenderingBackend {
    /// Draws one composed frame.
    fn present(&mut self, scene: &Scene) -> Result<(), RenderingError>;

    /// Flushes buffered output once the session ends.
    fn finish(&mut self) -> Result<(), RenderingError> {
        Ok(())
    }
}

/// Errors that can occur while driving a rendering backend.
#[derive(Debug, Error)]
pub enum RenderingError {
    /// The backend could not write a frame to its output.
    #[error("failed to write frame {frame}")]
    Output {
        /// Index of the frame being written, counted from zero.
        frame: u64,
        /// Underlying output failure.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_maze_core::{CellCoord, GhostKind, MazeDimensions};

    fn sample_maze() -> Maze {
        let dimensions = MazeDimensions::new(500.0, 500.0, 100.0);
        let mut open = vec![false; 25];
        for index in [6, 7, 8, 12, 13] {
            open[index] = true;
        }
        Maze::from_occupancy(
            dimensions,
            open,
            CellCoord::new(1, 1),
            CellCoord::new(3, 2),
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
                CellCoord::new(2, 2),
                CellCoord::new(3, 2),
            ],
        )
    }

    fn snapshot(id: u32, illuminated: bool) -> GhostSnapshot {
        let profile = GhostKind::Shadow.profile();
        GhostSnapshot {
            id: GhostId::new(id),
            kind: GhostKind::Shadow,
            position: Vec2::new(40.0, 0.0),
            size: profile.size,
            color: profile.color,
            opacity: 0.5,
            health: profile.health,
            illuminated,
        }
    }

    fn compose(flashlight_on: bool) -> Scene {
        compose_with_flash(flashlight_on, None)
    }

    fn compose_with_flash(flashlight_on: bool, hit_flash: Option<Color>) -> Scene {
        let maze = sample_maze();
        let player = Player::new(Vec2::ZERO, 10.0, 10.0);
        let ghosts = GhostView::from_snapshots(vec![snapshot(1, true), snapshot(2, false)]);
        let polygon = [Vec2::ZERO, Vec2::new(100.0, -10.0), Vec2::new(100.0, 10.0)];
        Scene::compose(SceneSources {
            maze: &maze,
            player: &player,
            flashlight_on,
            visibility_polygon: &polygon,
            ghosts: &ghosts,
            warnings: &[],
            hit_flash,
            play_mode: PlayMode::Exploring,
        })
    }

    #[test]
    fn exit_path_is_hinted_only_in_the_dark() {
        let lit = compose(true);
        assert!(lit.maze.exit_path.is_empty());
        assert_eq!(lit.visibility_polygon.len(), 3);

        let dark = compose(false);
        assert_eq!(dark.maze.exit_path.len(), 4);
        assert_eq!(dark.maze.exit_path[0], Vec2::new(-100.0, -100.0));
        assert!(dark.visibility_polygon.is_empty());
        assert_eq!(dark.maze.exit, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn lit_flashlight_hides_unlit_ghosts() {
        let lit = compose(true);
        assert_eq!(lit.ghosts.len(), 1);
        assert_eq!(lit.ghosts[0].id, GhostId::new(1));

        let dark = compose(false);
        assert_eq!(dark.ghosts.len(), 2);
    }

    #[test]
    fn ghost_opacity_becomes_alpha() {
        let scene = compose(false);
        let color = scene.ghosts[0].color;
        assert_eq!(color, Color::new(0.0, 1.0, 1.0, 0.5));
    }

    #[test]
    fn hit_flash_fades_out() {
        let mut flash = HitFlash::default();
        assert!(flash.advance().is_none());
        flash.observe(&[Event::PlayerHit {
            ghost: GhostId::new(3),
            kind: GhostKind::Follower,
        }]);
        let first = flash.advance().expect("flash starts");
        assert_eq!(first.alpha, 1.0);
        assert_eq!(first.red, 1.0);
        let frames = std::iter::from_fn(|| flash.advance()).count();
        assert_eq!(frames, (HIT_FLASH_FRAMES - 1) as usize);
        assert!(flash.advance().is_none());
    }

    #[test]
    fn input_translates_into_commands() {
        let input = FrameInput {
            movement: Vec2::new(3.0, 0.0),
            facing: Some(0.5),
            toggle_flashlight: true,
            toggle_debug: false,
            toggle_pause: false,
        };
        let dt = Duration::from_millis(16);
        assert_eq!(
            input.into_commands(dt, 2.0, false, PlayMode::Exploring),
            vec![
                Command::AimFlashlight { angle: 0.5 },
                Command::ToggleFlashlight,
                Command::MovePlayer {
                    delta: Vec2::new(2.0, 0.0)
                },
                Command::Tick { dt },
            ]
        );
    }

    #[test]
    fn contact_tints_composed_scenes_for_thirty_frames() {
        let mut flash = HitFlash::default();
        assert_eq!(compose_with_flash(true, flash.advance()).hit_flash, None);

        flash.observe(&[
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            },
            Event::PlayerHit {
                ghost: GhostId::new(8),
                kind: GhostKind::Shadow,
            },
        ]);
        for frame in 0..HIT_FLASH_FRAMES {
            let scene = compose_with_flash(true, flash.advance());
            let tint = scene.hit_flash.expect("flash still showing");
            assert_eq!(tint.green, 1.0, "frame {frame}");
            assert!(tint.alpha > 0.0);
        }
        assert_eq!(compose_with_flash(true, flash.advance()).hit_flash, None);
    }

    #[test]
    fn rendering_error_names_the_frame() {
        let error = RenderingError::Output {
            frame: 12,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "closed"),
        };
        assert_eq!(error.to_string(), "failed to write frame 12");
        assert!(std::error::Error::source(&error).is_some());
    }
}
