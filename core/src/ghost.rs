//! Closed set of ghost behavior types and their base statistics.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Visual identity color of a ghost. Opacity is animated separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GhostColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl GhostColor {
    /// Creates a new ghost color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Behavior types a ghost may have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GhostKind {
    /// Re-aims at the player every tick, ignoring walls.
    Follower,
    /// Keeps its spawn heading forever.
    Random,
    /// Periodically fades out and reappears elsewhere.
    Teleporter,
    /// Moves only while the player is not facing it.
    WeepingAngel,
    /// Telegraphs and executes high-speed charges.
    Charger,
    /// Immobile, invisible trap that immobilizes on contact.
    EarthBound,
    /// Jitters while lit and lunges while unseen.
    Shadow,
}

impl GhostKind {
    /// Every ghost kind in declaration order.
    pub const ALL: [GhostKind; 7] = [
        GhostKind::Follower,
        GhostKind::Random,
        GhostKind::Teleporter,
        GhostKind::WeepingAngel,
        GhostKind::Charger,
        GhostKind::EarthBound,
        GhostKind::Shadow,
    ];

    /// Base statistics applied when a ghost of this kind spawns.
    #[must_use]
    pub const fn profile(self) -> GhostProfile {
        match self {
            Self::Follower => GhostProfile {
                spawn_weight: 0.02,
                color: GhostColor::from_rgb(255, 0, 0),
                speed_multiplier: 0.7,
                size: 20.0,
                health: 30,
                vision_range: 1000.0,
                warning_range: 150.0,
            },
            Self::Random => GhostProfile {
                spawn_weight: 0.5,
                color: GhostColor::from_rgb(0, 255, 0),
                speed_multiplier: 1.2,
                size: 20.0,
                health: 50,
                vision_range: 300.0,
                warning_range: 100.0,
            },
            Self::Teleporter => GhostProfile {
                spawn_weight: 0.2,
                color: GhostColor::from_rgb(0, 0, 255),
                speed_multiplier: 1.5,
                size: 20.0,
                health: 40,
                vision_range: 300.0,
                warning_range: 100.0,
            },
            Self::WeepingAngel => GhostProfile {
                spawn_weight: 0.15,
                color: GhostColor::from_rgb(255, 255, 0),
                speed_multiplier: 1.7,
                size: 20.0,
                health: 30,
                vision_range: 500.0,
                warning_range: 200.0,
            },
            Self::Charger => GhostProfile {
                spawn_weight: 0.05,
                color: GhostColor::from_rgb(255, 0, 255),
                speed_multiplier: 2.5,
                size: 20.0,
                health: 20,
                vision_range: 400.0,
                warning_range: 400.0,
            },
            Self::EarthBound => GhostProfile {
                spawn_weight: 0.3,
                color: GhostColor::from_rgb(50, 50, 50),
                speed_multiplier: 0.0,
                size: 20.0,
                health: 20,
                vision_range: 0.0,
                warning_range: 150.0,
            },
            Self::Shadow => GhostProfile {
                spawn_weight: 0.1,
                color: GhostColor::from_rgb(0, 255, 255),
                speed_multiplier: 2.0,
                size: 20.0,
                health: 50,
                vision_range: 500.0,
                warning_range: 600.0,
            },
        }
    }

    /// Stable lowercase tag used by stat sinks and configuration files.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Follower => "follower",
            Self::Random => "random",
            Self::Teleporter => "teleporter",
            Self::WeepingAngel => "weepingAngel",
            Self::Charger => "charger",
            Self::EarthBound => "earthBound",
            Self::Shadow => "shadow",
        }
    }

    /// Position of the kind inside [`GhostKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GhostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raised when a textual tag names no known ghost kind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown ghost kind `{0}`")]
pub struct UnknownGhostKind(pub String);

impl FromStr for GhostKind {
    type Err = UnknownGhostKind;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownGhostKind(tag.to_owned()))
    }
}

/// Base statistics of a ghost kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostProfile {
    /// Relative weight in the random spawn table.
    pub spawn_weight: f32,
    /// Identity color.
    pub color: GhostColor,
    /// Multiplier applied to the rolled base speed.
    pub speed_multiplier: f32,
    /// Initial drawing and contact radius.
    pub size: f32,
    /// Ticks of illumination required to kill the ghost.
    pub health: i32,
    /// Distance within which the ghost reacts to the player.
    pub vision_range: f32,
    /// Distance within which the player is warned about the ghost.
    pub warning_range: f32,
}
