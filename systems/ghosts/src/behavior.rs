//! Per-kind movement policies. Each policy only chooses a velocity and
//! advances its own sub-state; integration, damage and fading happen in the
//! engine afterwards.

use ghost_maze_core::DebuffKind;
use glam::Vec2;
use rand::Rng;

use crate::{
    ghost::{Behavior, ChargerState, Fade, Ghost},
    spawn, Config, TickContext,
};

const CHARGE_MULTIPLIER: f32 = 2.0;
const MISSED_CHARGE_MULTIPLIER: f32 = 0.5;

/// Picks this tick's velocity for `ghost`.
///
/// `lit` reports whether the ghost is inside the visibility fan at its
/// position before moving.
pub(crate) fn steer<R>(
    ghost: &mut Ghost,
    context: &TickContext<'_>,
    config: &Config,
    lit: bool,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    let target = context.player.position();
    let distance = ghost.position.distance(target);
    let in_vision = distance < ghost.vision_range;

    match ghost.behavior {
        Behavior::Follower => {
            if in_vision {
                ghost.aim_at(target);
            }
        }
        Behavior::Random => {}
        Behavior::Teleporter {
            last_teleport,
            interval,
        } => {
            let due = context.now.saturating_sub(last_teleport) > interval;
            if due && ghost.fade != Fade::Fading {
                ghost.fade = Fade::Fading;
                ghost.behavior = Behavior::Teleporter {
                    last_teleport: context.now,
                    interval: spawn::random_interval(&config.teleport_interval, rng),
                };
            }
        }
        Behavior::WeepingAngel => {
            let observed = context
                .player
                .is_looking_at(ghost.position, ghost.size, context.fov / 2.0);
            if in_vision && !observed {
                ghost.aim_at(target);
            } else {
                ghost.velocity = Vec2::ZERO;
            }
        }
        Behavior::Charger(state) => {
            let next = advance_charger(ghost, state, context, config, lit, in_vision, distance);
            ghost.behavior = Behavior::Charger(next);
            if matches!(next, ChargerState::Charging { .. }) {
                ghost.aim_at(target);
            }
        }
        Behavior::EarthBound => {
            ghost.velocity = Vec2::ZERO;
        }
        Behavior::Shadow => {
            if lit || !in_vision {
                set_speed(ghost, ghost.base_speed);
                ghost.velocity = Vec2::from_angle(spawn::random_heading(rng)) * ghost.speed;
            } else {
                set_speed(ghost, ghost.base_speed * config.shadow_lunge_multiplier);
                ghost.aim_at(target);
            }
        }
    }
}

fn advance_charger(
    ghost: &mut Ghost,
    state: ChargerState,
    context: &TickContext<'_>,
    config: &Config,
    lit: bool,
    in_vision: bool,
    distance: f32,
) -> ChargerState {
    let effective_range = context.max_distance * config.effective_range_ratio;
    match state {
        ChargerState::Idle => {
            if in_vision {
                set_speed(ghost, ghost.base_speed * CHARGE_MULTIPLIER);
                ChargerState::Charging {
                    entered_range: false,
                }
            } else {
                ChargerState::Idle
            }
        }
        ChargerState::Charging { entered_range } => {
            let within = distance < effective_range;
            if entered_range && !within && !lit {
                set_speed(ghost, ghost.base_speed * MISSED_CHARGE_MULTIPLIER);
                ChargerState::Cooldown {
                    remaining: config.charger_cooldown,
                }
            } else {
                ChargerState::Charging {
                    entered_range: entered_range || within,
                }
            }
        }
        ChargerState::Cooldown { remaining } => {
            let remaining = remaining.saturating_sub(context.dt);
            if !remaining.is_zero() {
                return ChargerState::Cooldown { remaining };
            }
            if lit {
                set_speed(ghost, ghost.base_speed * CHARGE_MULTIPLIER);
                ChargerState::Charging {
                    entered_range: false,
                }
            } else {
                set_speed(ghost, ghost.base_speed);
                ChargerState::Idle
            }
        }
    }
}

/// Outcome of a ghost touching the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Contact {
    pub(crate) debuff: Option<DebuffKind>,
    pub(crate) dispelled: bool,
}

/// Resolves contact with the player, or `None` when contact is harmless.
pub(crate) fn contact(ghost: &mut Ghost, config: &Config) -> Option<Contact> {
    let (debuff, dispelled) = match ghost.behavior {
        Behavior::Charger(ChargerState::Charging { .. }) => {
            ghost.behavior = Behavior::Charger(ChargerState::Cooldown {
                remaining: config.charger_cooldown,
            });
            set_speed(ghost, ghost.base_speed);
            ghost.velocity = -ghost.velocity;
            (Some(DebuffKind::FlashlightDisabled), false)
        }
        Behavior::Charger(_) => return None,
        Behavior::EarthBound => (Some(DebuffKind::Immobilized), true),
        Behavior::Shadow => (Some(DebuffKind::WarningHidden), true),
        Behavior::Follower
        | Behavior::Random
        | Behavior::Teleporter { .. }
        | Behavior::WeepingAngel => (None, true),
    };
    Some(Contact { debuff, dispelled })
}

fn set_speed(ghost: &mut Ghost, speed: f32) {
    ghost.speed = speed;
    ghost.velocity = ghost.velocity.normalize_or_zero() * speed;
}
