//! Player state: position, facing, timed debuffs and the flashlight switch.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize_angle;

/// Timed negative status effects that ghosts inflict on the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DebuffKind {
    /// The player cannot move.
    Immobilized,
    /// The flashlight is forced off and cannot be toggled.
    FlashlightDisabled,
    /// Proximity warnings are suppressed.
    WarningHidden,
}

impl DebuffKind {
    /// Every debuff kind in declaration order.
    pub const ALL: [DebuffKind; 3] = [
        DebuffKind::Immobilized,
        DebuffKind::FlashlightDisabled,
        DebuffKind::WarningHidden,
    ];

    /// Stable tag used by stat sinks and command-line input.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Immobilized => "immobilized",
            Self::FlashlightDisabled => "flashlightDisabled",
            Self::WarningHidden => "warningHidden",
        }
    }
}

impl fmt::Display for DebuffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raised when a textual tag names no known debuff.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown debuff `{0}`")]
pub struct UnknownDebuff(pub String);

impl FromStr for DebuffKind {
    type Err = UnknownDebuff;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownDebuff(tag.to_owned()))
    }
}

/// A debuff carried by the player until `expires_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debuff {
    /// Kind of effect.
    pub kind: DebuffKind,
    /// Simulation time after which the debuff lapses.
    pub expires_at: Duration,
}

/// The player avatar.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    position: Vec2,
    size: f32,
    collider_size: f32,
    facing: f32,
    debuffs: Vec<Debuff>,
}

impl Player {
    /// Creates a player at `position` with the provided body and collider radii.
    #[must_use]
    pub fn new(position: Vec2, size: f32, collider_size: f32) -> Self {
        Self {
            position,
            size,
            collider_size,
            facing: 0.0,
            debuffs: Vec::new(),
        }
    }

    /// Current position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the player without any collision check.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Body radius used for ghost contact.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Margin used when testing the player against walls.
    #[must_use]
    pub const fn collider_size(&self) -> f32 {
        self.collider_size
    }

    /// Direction the player faces, in radians.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Updates the facing direction.
    pub fn set_facing(&mut self, angle: f32) {
        self.facing = angle;
    }

    /// Active debuffs, at most one per kind.
    #[must_use]
    pub fn debuffs(&self) -> &[Debuff] {
        &self.debuffs
    }

    /// Reports whether a debuff of `kind` is active.
    #[must_use]
    pub fn has_debuff(&self, kind: DebuffKind) -> bool {
        self.debuffs.iter().any(|debuff| debuff.kind == kind)
    }

    /// Adds a debuff, or extends an existing one of the same kind.
    ///
    /// Returns the expiry that is now in effect.
    pub fn add_debuff(&mut self, kind: DebuffKind, expires_at: Duration) -> Duration {
        if let Some(existing) = self.debuffs.iter_mut().find(|debuff| debuff.kind == kind) {
            existing.expires_at = existing.expires_at.max(expires_at);
            return existing.expires_at;
        }
        self.debuffs.push(Debuff { kind, expires_at });
        expires_at
    }

    /// Removes every debuff whose expiry lies strictly before `now`, returning their kinds.
    pub fn expire_debuffs(&mut self, now: Duration) -> Vec<DebuffKind> {
        let mut expired = Vec::new();
        self.debuffs.retain(|debuff| {
            if now > debuff.expires_at {
                expired.push(debuff.kind);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Drops every debuff immediately.
    pub fn clear_debuffs(&mut self) {
        self.debuffs.clear();
    }

    /// Reports whether the facing cone of the given half-angle touches the
    /// disc of `radius` around `center`.
    #[must_use]
    pub fn is_looking_at(&self, center: Vec2, radius: f32, half_angle: f32) -> bool {
        let offset = center - self.position;
        let distance = offset.length();
        if distance <= radius {
            return true;
        }
        let spread = (radius / distance).asin();
        let bearing = offset.y.atan2(offset.x);
        normalize_angle(bearing - self.facing).abs() < half_angle + spread
    }
}

/// On/off state of the flashlight, including the state to restore after a disable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashlightPower {
    on: bool,
    disabled: bool,
    restore_to: bool,
}

impl FlashlightPower {
    /// Creates a switch in the provided state.
    #[must_use]
    pub const fn new(on: bool) -> Self {
        Self {
            on,
            disabled: false,
            restore_to: on,
        }
    }

    /// Whether the flashlight currently emits light.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// Whether a disable is in effect.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Flips the switch. Refused while disabled; returns whether the toggle happened.
    pub fn toggle(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        self.on = !self.on;
        self.restore_to = self.on;
        true
    }

    /// Forces the flashlight off, remembering the state from before the first disable.
    pub fn disable(&mut self) {
        if !self.disabled {
            self.restore_to = self.on;
            self.disabled = true;
        }
        self.on = false;
    }

    /// Lifts a disable, returning the flashlight to its remembered state.
    pub fn restore(&mut self) {
        if self.disabled {
            self.disabled = false;
            self.on = self.restore_to;
        }
    }
}

impl Default for FlashlightPower {
    fn default() -> Self {
        Self::new(true)
    }
}
