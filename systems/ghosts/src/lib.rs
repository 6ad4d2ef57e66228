#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ghost behavior engine.
//!
//! The engine owns the ghost population and advances every ghost once per
//! tick: it lets the ghost's kind pick a velocity, integrates and wraps the
//! position, applies flashlight damage, animates opacity and resolves
//! contact with the player. Deaths respawn a ghost of the same kind at once;
//! dispelled ghosts are refilled by the population backfill.

mod behavior;
mod ghost;
mod spawn;

use std::{ops::Range, time::Duration};

use ghost_maze_core::{
    DebuffKind, Event, GhostId, GhostKind, GhostView, Player, ProximityWarning, RaySegment,
};
use ghost_maze_system_flashlight::is_illuminated;
use ghost_maze_system_spatial::{circles_touch, WallGrid};
use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

pub use ghost::{appear_ceiling, Behavior, ChargerState, Fade, Ghost};

const OPACITY_STEP: f32 = 0.05;
const FADE_STEP: f32 = 0.1;
const OPACITY_FLOOR: f32 = 0.2;
const DEBUG_OPACITY: f32 = 0.2;
const DAMAGE_GROWTH: f32 = 0.1;

/// Configuration parameters required to construct the ghost engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    population_cap: usize,
    spawn_exclusion_cells: f32,
    relocation_exclusion_cells: f32,
    spawn_attempts: u32,
    effective_range_ratio: f32,
    debuff_duration: Duration,
    charger_cooldown: Duration,
    shadow_lunge_multiplier: f32,
    teleport_interval: Range<Duration>,
}

impl Config {
    /// Creates a configuration that keeps `population_cap` ghosts alive.
    #[must_use]
    pub const fn new(population_cap: usize) -> Self {
        Self {
            population_cap,
            spawn_exclusion_cells: 3.0,
            relocation_exclusion_cells: 2.0,
            spawn_attempts: 64,
            effective_range_ratio: 0.4,
            debuff_duration: Duration::from_secs(3),
            charger_cooldown: Duration::from_secs(3),
            shadow_lunge_multiplier: 2.5,
            teleport_interval: Duration::from_secs(2)..Duration::from_secs(10),
        }
    }

    /// Sets how long debuffs inflicted by ghosts last.
    #[must_use]
    pub const fn with_debuff_duration(mut self, debuff_duration: Duration) -> Self {
        self.debuff_duration = debuff_duration;
        self
    }

    /// Sets how long a charger recovers after a ram or a miss.
    #[must_use]
    pub const fn with_charger_cooldown(mut self, charger_cooldown: Duration) -> Self {
        self.charger_cooldown = charger_cooldown;
        self
    }

    /// Sets the range teleport intervals are rolled from.
    #[must_use]
    pub fn with_teleport_interval(mut self, teleport_interval: Range<Duration>) -> Self {
        self.teleport_interval = teleport_interval;
        self
    }

    /// Sets the half-width, in cells, of the box around the player where ghosts never spawn.
    #[must_use]
    pub const fn with_spawn_exclusion_cells(mut self, cells: f32) -> Self {
        self.spawn_exclusion_cells = cells;
        self
    }

    /// Number of ghosts the backfill maintains.
    #[must_use]
    pub const fn population_cap(&self) -> usize {
        self.population_cap
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(200)
    }
}

/// Everything a tick needs to know about the rest of the world.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    /// Simulation time after the tick's advance.
    pub now: Duration,
    /// Duration of the tick.
    pub dt: Duration,
    /// The player as of this tick.
    pub player: &'a Player,
    /// Visibility fan cast this tick; empty while the flashlight is off.
    pub segments: &'a [RaySegment],
    /// Whether the flashlight emits light.
    pub flashlight_on: bool,
    /// Flashlight cone width in radians.
    pub fov: f32,
    /// Flashlight reach in world units.
    pub max_distance: f32,
    /// Whether debug visibility is active.
    pub debug: bool,
    /// Wall index of the current maze.
    pub grid: &'a WallGrid,
}

/// A debuff the engine wants applied to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebuffRequest {
    /// Kind of debuff.
    pub kind: DebuffKind,
    /// How long it lasts from the current time.
    pub duration: Duration,
}

/// Pure system that owns and advances the ghost population.
#[derive(Debug)]
pub struct GhostEngine {
    config: Config,
    ghosts: Vec<Ghost>,
    next_id: u32,
    spawned_kinds: [bool; GhostKind::ALL.len()],
}

impl GhostEngine {
    /// Creates an engine with no ghosts.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ghosts: Vec::new(),
            next_id: 0,
            spawned_kinds: [false; GhostKind::ALL.len()],
        }
    }

    /// Live ghosts in spawn order.
    #[must_use]
    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    /// Number of live ghosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    /// Reports whether no ghost is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    /// Looks up a live ghost.
    #[must_use]
    pub fn ghost(&self, id: GhostId) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.id == id)
    }

    /// Reports whether every kind has been spawned at least once this session.
    #[must_use]
    pub fn every_kind_spawned(&self) -> bool {
        self.spawned_kinds.iter().all(|spawned| *spawned)
    }

    /// Captures snapshots of every live ghost.
    #[must_use]
    pub fn view(&self) -> GhostView {
        GhostView::from_snapshots(self.ghosts.iter().map(Ghost::snapshot).collect())
    }

    /// Ghosts whose warning range covers `position`, nearest first.
    #[must_use]
    pub fn warnings(&self, position: Vec2) -> Vec<ProximityWarning> {
        let mut warnings: Vec<_> = self
            .ghosts
            .iter()
            .filter_map(|ghost| {
                let offset = ghost.position - position;
                let distance = offset.length();
                (distance < ghost.warning_range).then(|| ProximityWarning {
                    ghost: ghost.id,
                    kind: ghost.kind(),
                    distance,
                    bearing: offset.y.atan2(offset.x),
                })
            })
            .collect();
        warnings.sort_by(|left, right| left.distance.total_cmp(&right.distance));
        warnings
    }

    /// Replaces the population for a fresh level.
    ///
    /// One ghost of every kind is spawned first so the backfill is armed,
    /// then weighted random kinds fill up to the cap.
    pub fn populate<R>(
        &mut self,
        grid: &WallGrid,
        player: Vec2,
        now: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
    {
        self.ghosts.clear();
        for kind in GhostKind::ALL.into_iter().take(self.config.population_cap) {
            let _ = self.spawn(kind, grid, player, now, rng, out);
        }
        self.backfill(grid, player, now, rng, out);
    }

    /// Removes every ghost without touching the session's spawn history.
    pub fn clear(&mut self) {
        self.ghosts.clear();
    }

    /// Spawns a ghost of `kind` at a random position away from the player.
    ///
    /// Returns `None` when no admissible position was found.
    pub fn spawn<R>(
        &mut self,
        kind: GhostKind,
        grid: &WallGrid,
        player: Vec2,
        now: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> Option<GhostId>
    where
        R: Rng + ?Sized,
    {
        let dimensions = grid.dimensions();
        let exclusion = self.config.spawn_exclusion_cells * dimensions.cell_size();
        let walls = (kind == GhostKind::EarthBound).then_some(grid);
        let Some(position) = spawn::random_position(
            dimensions,
            player,
            exclusion,
            walls,
            self.config.spawn_attempts,
            rng,
        ) else {
            warn!(%kind, "no admissible spawn position");
            return None;
        };
        Some(self.spawn_at(kind, position, now, rng, out))
    }

    /// Spawns the replacement for a killed ghost of `kind`.
    ///
    /// When sampling finds no admissible position the replacement goes to the
    /// admissible cell farthest from the player, so a kill never shrinks the
    /// population.
    fn respawn<R>(
        &mut self,
        kind: GhostKind,
        grid: &WallGrid,
        player: Vec2,
        now: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
    {
        if self.spawn(kind, grid, player, now, rng, out).is_some() {
            return;
        }
        let walls = (kind == GhostKind::EarthBound).then_some(grid);
        let position = spawn::farthest_position(grid.dimensions(), player, walls);
        debug!(%kind, x = position.x, y = position.y, "replacement placed at farthest cell");
        let _ = self.spawn_at(kind, position, now, rng, out);
    }

    /// Spawns a ghost of `kind` at `position`.
    pub fn spawn_at<R>(
        &mut self,
        kind: GhostKind,
        position: Vec2,
        now: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> GhostId
    where
        R: Rng + ?Sized,
    {
        let id = GhostId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let heading = spawn::random_heading(rng);
        let speed = spawn::random_speed(kind, rng);
        let interval = spawn::random_interval(&self.config.teleport_interval, rng);
        let behavior = Behavior::initial(kind, now, interval);
        self.ghosts
            .push(Ghost::new(id, position, heading, speed, behavior));
        if let Some(spawned) = self.spawned_kinds.get_mut(kind.index()) {
            *spawned = true;
        }
        out.push(Event::GhostSpawned { ghost: id, kind });
        id
    }

    /// Advances every ghost by one tick.
    ///
    /// Deaths, hits and spawns are reported through `out`; debuffs the player
    /// should suffer are pushed to `debuffs`.
    pub fn update<R>(
        &mut self,
        context: &TickContext<'_>,
        rng: &mut R,
        out: &mut Vec<Event>,
        debuffs: &mut Vec<DebuffRequest>,
    ) where
        R: Rng + ?Sized,
    {
        let player = context.player.position();
        let dimensions = *context.grid.dimensions();
        let effective_range = context.max_distance * self.config.effective_range_ratio;
        let relocation = self.config.relocation_exclusion_cells * dimensions.cell_size();
        let mut departures = Vec::new();

        for ghost in &mut self.ghosts {
            let lit_before = context.flashlight_on
                && is_illuminated(context.segments, ghost.position, ghost.size);
            behavior::steer(ghost, context, &self.config, lit_before, rng);
            ghost.position = dimensions.wrap(ghost.position + ghost.velocity);

            let lit = context.flashlight_on
                && is_illuminated(context.segments, ghost.position, ghost.size);
            ghost.illuminated = lit;
            if lit && ghost.position.distance(player) < effective_range {
                ghost.health -= 1;
                ghost.size += DAMAGE_GROWTH;
                if ghost.health <= 0 {
                    departures.push((ghost.id, Departure::Killed));
                    continue;
                }
            }

            match ghost.fade {
                Fade::Fading => {
                    ghost.opacity -= FADE_STEP;
                    if ghost.opacity <= 0.0 {
                        if let Some(position) = spawn::random_position(
                            &dimensions,
                            player,
                            relocation,
                            None,
                            self.config.spawn_attempts,
                            rng,
                        ) {
                            ghost.position = position;
                        }
                        ghost.opacity = 0.0;
                        ghost.fade = Fade::Appearing {
                            ceiling: appear_ceiling(ghost.kind()),
                        };
                    }
                }
                Fade::Appearing { ceiling } => {
                    ghost.opacity = (ghost.opacity + FADE_STEP).min(ceiling);
                    if ghost.opacity >= ceiling {
                        ghost.fade = Fade::Visible;
                    }
                }
                Fade::Visible => {
                    ghost.opacity = if lit {
                        ghost.opacity + OPACITY_STEP
                    } else {
                        (ghost.opacity - OPACITY_STEP).max(OPACITY_FLOOR)
                    };
                }
            }
            if ghost.kind() == GhostKind::EarthBound {
                ghost.opacity = if context.debug { DEBUG_OPACITY } else { 0.0 };
            }
            ghost.opacity = ghost.opacity.clamp(0.0, 1.0);

            if circles_touch(player, context.player.size(), ghost.position, ghost.size) {
                if let Some(contact) = behavior::contact(ghost, &self.config) {
                    out.push(Event::PlayerHit {
                        ghost: ghost.id,
                        kind: ghost.kind(),
                    });
                    if let Some(kind) = contact.debuff {
                        debuffs.push(DebuffRequest {
                            kind,
                            duration: self.config.debuff_duration,
                        });
                    }
                    if contact.dispelled {
                        departures.push((ghost.id, Departure::Dispelled));
                    }
                }
            }
        }

        for (id, departure) in departures {
            let Some(index) = self.ghosts.iter().position(|ghost| ghost.id == id) else {
                continue;
            };
            let ghost = self.ghosts.remove(index);
            let kind = ghost.kind();
            match departure {
                Departure::Dispelled => {
                    debug!(ghost = id.get(), %kind, "ghost dispelled on contact");
                }
                Departure::Killed => {
                    debug!(ghost = id.get(), %kind, "ghost killed");
                    out.push(Event::GhostKilled {
                        ghost: id,
                        kind,
                        position: ghost.position,
                        color: ghost.color,
                    });
                    self.respawn(kind, context.grid, player, context.now, rng, out);
                    if kind == GhostKind::EarthBound {
                        debuffs.push(DebuffRequest {
                            kind: DebuffKind::Immobilized,
                            duration: self.config.debuff_duration,
                        });
                    }
                }
            }
        }

        self.backfill(context.grid, player, context.now, rng, out);
    }

    /// Tops the population up to the cap once every kind has appeared.
    fn backfill<R>(
        &mut self,
        grid: &WallGrid,
        player: Vec2,
        now: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
    {
        if !self.every_kind_spawned() {
            return;
        }
        while self.ghosts.len() < self.config.population_cap {
            let kind = spawn::random_kind(rng);
            if self.spawn(kind, grid, player, now, rng, out).is_none() {
                break;
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Departure {
    Killed,
    Dispelled,
}
