use std::time::Duration;

use ghost_maze_core::{GhostColor, GhostId, GhostKind, GhostSnapshot};
use glam::Vec2;

/// Opacity transition a ghost is going through, layered over its movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fade {
    /// Opacity follows illumination.
    Visible,
    /// Opacity drains toward zero; the ghost relocates once it is gone.
    Fading,
    /// Opacity climbs toward `ceiling`.
    Appearing {
        /// Opacity at which the ghost becomes visible again.
        ceiling: f32,
    },
}

/// Sub-states of a charging ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargerState {
    /// Waiting for the player to come into vision range.
    Idle,
    /// Running straight at the player at double speed.
    Charging {
        /// Whether the charge has brought the ghost within effective flashlight range.
        entered_range: bool,
    },
    /// Recovering after a ram or a missed charge.
    Cooldown {
        /// Time left before the ghost may charge again.
        remaining: Duration,
    },
}

/// Per-kind behavior state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    /// Re-aims at the player while in vision range.
    Follower,
    /// Keeps its heading.
    Random,
    /// Fades out and relocates on an interval.
    Teleporter {
        /// Simulation time of the last teleport, or of the spawn.
        last_teleport: Duration,
        /// Delay until the next teleport starts.
        interval: Duration,
    },
    /// Approaches only while unobserved.
    WeepingAngel,
    /// Charges the player.
    Charger(ChargerState),
    /// Never moves; hidden unless debugging.
    EarthBound,
    /// Jitters while seen, lunges while unseen.
    Shadow,
}

impl Behavior {
    /// Initial behavior state for `kind`.
    #[must_use]
    pub fn initial(kind: GhostKind, now: Duration, teleport_interval: Duration) -> Self {
        match kind {
            GhostKind::Follower => Self::Follower,
            GhostKind::Random => Self::Random,
            GhostKind::Teleporter => Self::Teleporter {
                last_teleport: now,
                interval: teleport_interval,
            },
            GhostKind::WeepingAngel => Self::WeepingAngel,
            GhostKind::Charger => Self::Charger(ChargerState::Idle),
            GhostKind::EarthBound => Self::EarthBound,
            GhostKind::Shadow => Self::Shadow,
        }
    }

    /// Kind the behavior belongs to.
    #[must_use]
    pub const fn kind(&self) -> GhostKind {
        match self {
            Self::Follower => GhostKind::Follower,
            Self::Random => GhostKind::Random,
            Self::Teleporter { .. } => GhostKind::Teleporter,
            Self::WeepingAngel => GhostKind::WeepingAngel,
            Self::Charger(_) => GhostKind::Charger,
            Self::EarthBound => GhostKind::EarthBound,
            Self::Shadow => GhostKind::Shadow,
        }
    }
}

/// A single ghost and its mutable simulation state.
#[derive(Clone, Debug, PartialEq)]
pub struct Ghost {
    pub(crate) id: GhostId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) base_speed: f32,
    pub(crate) speed: f32,
    pub(crate) size: f32,
    pub(crate) color: GhostColor,
    pub(crate) health: i32,
    pub(crate) opacity: f32,
    pub(crate) vision_range: f32,
    pub(crate) warning_range: f32,
    pub(crate) fade: Fade,
    pub(crate) behavior: Behavior,
    pub(crate) illuminated: bool,
}

impl Ghost {
    /// Creates a ghost with the base statistics of its kind.
    ///
    /// The ghost starts transparent and appears toward the ceiling of its kind.
    #[must_use]
    pub fn new(id: GhostId, position: Vec2, heading: f32, base_speed: f32, behavior: Behavior) -> Self {
        let kind = behavior.kind();
        let profile = kind.profile();
        Self {
            id,
            position,
            velocity: Vec2::from_angle(heading) * base_speed,
            base_speed,
            speed: base_speed,
            size: profile.size,
            color: profile.color,
            health: profile.health,
            opacity: 0.0,
            vision_range: profile.vision_range,
            warning_range: profile.warning_range,
            fade: Fade::Appearing {
                ceiling: appear_ceiling(kind),
            },
            behavior,
            illuminated: false,
        }
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> GhostId {
        self.id
    }

    /// Behavior type.
    #[must_use]
    pub const fn kind(&self) -> GhostKind {
        self.behavior.kind()
    }

    /// Current center in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Displacement applied each tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Speed rolled at spawn.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Speed currently in effect.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Current drawing and contact radius.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Current opacity in `0.0..=1.0`.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Distance within which the player is warned about the ghost.
    #[must_use]
    pub const fn warning_range(&self) -> f32 {
        self.warning_range
    }

    /// Current opacity transition.
    #[must_use]
    pub const fn fade(&self) -> Fade {
        self.fade
    }

    /// Current per-kind behavior state.
    #[must_use]
    pub const fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Whether the ghost was lit during the last update.
    #[must_use]
    pub const fn is_illuminated(&self) -> bool {
        self.illuminated
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> GhostSnapshot {
        GhostSnapshot {
            id: self.id,
            kind: self.kind(),
            position: self.position,
            size: self.size,
            color: self.color,
            opacity: self.opacity,
            health: self.health,
            illuminated: self.illuminated,
        }
    }

    pub(crate) fn aim_at(&mut self, target: Vec2) {
        let offset = target - self.position;
        self.velocity = offset.try_normalize().unwrap_or(Vec2::ZERO) * self.speed;
    }
}

/// Opacity a freshly spawned or relocated ghost of `kind` appears to.
#[must_use]
pub const fn appear_ceiling(kind: GhostKind) -> f32 {
    match kind {
        GhostKind::Teleporter => 0.2,
        _ => 1.0,
    }
}
