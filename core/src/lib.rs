#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ghost Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that stat sinks,
//! audio triggers, and renderers react to. Nothing in a tick is allowed to
//! fail loudly: rejected requests surface as events instead of errors.

mod ghost;
mod maze;
mod player;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use ghost::{GhostColor, GhostKind, GhostProfile, UnknownGhostKind};
pub use maze::{CellCoord, Maze, MazeDimensions, Wall};
pub use player::{Debuff, DebuffKind, FlashlightPower, Player, UnknownDebuff};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Ghost Maze. Keep the light on.";

/// Describes whether the simulation currently advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Ticks advance the simulation.
    Exploring,
    /// Ticks are ignored until the mode changes back.
    Paused,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Regenerates the maze, resets the player and repopulates ghosts.
    GenerateLevel,
    /// Advances the simulation clock by the provided delta time and runs one tick.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player move by the provided world-space delta.
    MovePlayer {
        /// Desired displacement expressed in world units.
        delta: Vec2,
    },
    /// Updates the direction the player faces, in radians.
    AimFlashlight {
        /// Facing angle measured from the positive x axis.
        angle: f32,
    },
    /// Flips the flashlight between on and off.
    ToggleFlashlight,
    /// Enables or disables debug visibility of hidden ghosts.
    SetDebugMode {
        /// Whether debug mode should be active.
        enabled: bool,
    },
    /// Requests that the world transition to the provided play mode.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Applies a timed debuff to the player directly.
    ApplyDebuff {
        /// Kind of debuff to apply.
        kind: DebuffKind,
        /// How long the debuff stays active, measured from the current time.
        duration: Duration,
    },
}

/// Reasons a player movement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The candidate position overlaps a wall.
    Wall,
    /// The player carries an immobilizing debuff.
    Immobilized,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a fresh maze was generated and populated.
    LevelGenerated {
        /// Number of columns in the generated grid.
        columns: u32,
        /// Number of rows in the generated grid.
        rows: u32,
        /// Number of wall rectangles emitted by the generator.
        wall_count: usize,
        /// Cell that the player must reach.
        exit: CellCoord,
        /// Number of generation attempts spent, including the successful one.
        attempts: u32,
    },
    /// Reports that maze generation exhausted its retry budget; the previous level stays.
    LevelGenerationFailed {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Reports that a movement request was refused and the position is unchanged.
    PlayerMoveRejected {
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Confirms that the flashlight switched state.
    FlashlightToggled {
        /// Whether the flashlight is now on.
        on: bool,
    },
    /// Reports that a toggle was refused because the flashlight is disabled.
    FlashlightToggleRejected,
    /// Confirms that a ghost entered the maze.
    GhostSpawned {
        /// Identifier assigned to the ghost.
        ghost: GhostId,
        /// Behavior type of the ghost.
        kind: GhostKind,
    },
    /// Reports that a ghost ran out of health. Drives kill tallies, death audio and effects.
    GhostKilled {
        /// Identifier of the ghost that died.
        ghost: GhostId,
        /// Behavior type of the ghost that died.
        kind: GhostKind,
        /// Where the ghost died, in world units.
        position: Vec2,
        /// Identity color of the ghost for the death effect.
        color: GhostColor,
    },
    /// Reports that a ghost touched the player. Drives hit tallies and hit audio.
    PlayerHit {
        /// Identifier of the ghost that made contact.
        ghost: GhostId,
        /// Behavior type of the ghost that made contact.
        kind: GhostKind,
    },
    /// Reports that the player acquired a debuff.
    DebuffApplied {
        /// Kind of debuff acquired.
        kind: DebuffKind,
        /// Simulation time after which the debuff lapses.
        expires_at: Duration,
    },
    /// Reports that a debuff lapsed and was removed from the player.
    DebuffExpired {
        /// Kind of debuff removed.
        kind: DebuffKind,
    },
    /// Reports that the player stepped onto the exit cell.
    ExitReached {
        /// Cell that holds the exit.
        exit: CellCoord,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
}

/// Unique identifier assigned to a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GhostId(u32);

impl GhostId {
    /// Creates a new ghost identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One cast ray's resolved geometry for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaySegment {
    /// Ray origin, the player position.
    pub start: Vec2,
    /// Closest wall intersection, or the point at maximum distance.
    pub end: Vec2,
    /// Distance from `start` to `end`.
    pub distance: f32,
    /// Whether the ray stopped on a wall.
    pub hit: bool,
}

impl RaySegment {
    /// Length of the segment computed from its endpoints.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Immutable representation of a single ghost's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostSnapshot {
    /// Unique identifier assigned to the ghost.
    pub id: GhostId,
    /// Behavior type of the ghost.
    pub kind: GhostKind,
    /// Center of the ghost in world units.
    pub position: Vec2,
    /// Current drawing radius.
    pub size: f32,
    /// Identity color; opacity is kept separately.
    pub color: GhostColor,
    /// Current opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Remaining health.
    pub health: i32,
    /// Whether the ghost lies inside the current visibility fan.
    pub illuminated: bool,
}

/// Read-only snapshot describing all ghosts within the maze.
#[derive(Clone, Debug, Default)]
pub struct GhostView {
    snapshots: Vec<GhostSnapshot>,
}

impl GhostView {
    /// Creates a new ghost view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GhostSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured ghost snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &GhostSnapshot> {
        self.snapshots.iter()
    }

    /// Number of ghosts captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no ghosts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GhostSnapshot> {
        self.snapshots
    }
}

/// A ghost close enough to trip the player's proximity indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityWarning {
    /// Ghost that tripped the warning.
    pub ghost: GhostId,
    /// Behavior type of the ghost.
    pub kind: GhostKind,
    /// Distance between the player and the ghost.
    pub distance: f32,
    /// Direction from the player toward the ghost, in radians.
    pub bearing: f32,
}

/// Wraps an angle into `-PI..PI`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::{normalize_angle, CellCoord, DebuffKind, GhostId, GhostKind, MoveRejection};
    use serde::{de::DeserializeOwned, Serialize};
    use std::f32::consts::PI;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn ghost_id_round_trips_through_bincode() {
        assert_round_trip(&GhostId::new(42));
    }

    #[test]
    fn closed_sets_round_trip_through_bincode() {
        assert_round_trip(&GhostKind::WeepingAngel);
        assert_round_trip(&DebuffKind::WarningHidden);
        assert_round_trip(&MoveRejection::Immobilized);
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn normalize_angle_wraps_into_half_open_turn() {
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert!((normalize_angle(2.0 * PI + 0.25) - 0.25).abs() < 1e-5);
    }
}
