use std::{f32::consts::TAU, ops::Range, time::Duration};

use ghost_maze_core::{CellCoord, GhostKind, MazeDimensions};
use ghost_maze_system_spatial::WallGrid;
use glam::Vec2;
use rand::Rng;

/// Draws a ghost kind from the weighted spawn table.
pub(crate) fn random_kind<R>(rng: &mut R) -> GhostKind
where
    R: Rng + ?Sized,
{
    let total: f32 = GhostKind::ALL
        .iter()
        .map(|kind| kind.profile().spawn_weight)
        .sum();
    let roll = rng.gen::<f32>() * total;
    let mut cumulative = 0.0;
    for kind in GhostKind::ALL {
        cumulative += kind.profile().spawn_weight;
        if roll <= cumulative {
            return kind;
        }
    }
    GhostKind::Shadow
}

/// Rolls a spawn speed of `uniform[1, 2) * multiplier`.
pub(crate) fn random_speed<R>(kind: GhostKind, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    rng.gen_range(1.0..2.0) * kind.profile().speed_multiplier
}

/// Rolls a uniformly distributed heading in radians.
pub(crate) fn random_heading<R>(rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    rng.gen_range(0.0..TAU)
}

/// Rolls the delay before a teleporter's next teleport.
pub(crate) fn random_interval<R>(range: &Range<Duration>, rng: &mut R) -> Duration
where
    R: Rng + ?Sized,
{
    if range.start >= range.end {
        return range.start;
    }
    let seconds = rng.gen_range(range.start.as_secs_f32()..range.end.as_secs_f32());
    Duration::from_secs_f32(seconds)
}

/// Samples a point inside the maze bounds that lies outside a square box of
/// `exclusion` half-width around `avoid`.
///
/// When `outside_walls` is set, points inside a wall are rejected too.
/// Gives up after `attempts` samples.
pub(crate) fn random_position<R>(
    dimensions: &MazeDimensions,
    avoid: Vec2,
    exclusion: f32,
    grid: Option<&WallGrid>,
    attempts: u32,
    rng: &mut R,
) -> Option<Vec2>
where
    R: Rng + ?Sized,
{
    let half = Vec2::new(dimensions.width(), dimensions.height()) / 2.0;
    if half.x <= 0.0 || half.y <= 0.0 {
        return None;
    }
    (0..attempts).find_map(|_| {
        let candidate = Vec2::new(
            rng.gen_range(-half.x..half.x),
            rng.gen_range(-half.y..half.y),
        );
        let offset = (candidate - avoid).abs();
        if offset.x < exclusion && offset.y < exclusion {
            return None;
        }
        if grid.is_some_and(|grid| grid.collides(candidate, 0.0)) {
            return None;
        }
        Some(candidate)
    })
}

/// Cell center farthest from `avoid`, ignoring any exclusion box.
///
/// With `grid` set, centers inside a wall are skipped; if every center is
/// blocked the farthest corner cell is used anyway.
pub(crate) fn farthest_position(
    dimensions: &MazeDimensions,
    avoid: Vec2,
    grid: Option<&WallGrid>,
) -> Vec2 {
    let last_column = dimensions.columns().saturating_sub(1);
    let last_row = dimensions.rows().saturating_sub(1);
    let farther = |left: &Vec2, right: &Vec2| {
        left.distance_squared(avoid)
            .total_cmp(&right.distance_squared(avoid))
    };
    (0..=last_row)
        .flat_map(|row| (0..=last_column).map(move |column| CellCoord::new(column, row)))
        .map(|cell| dimensions.cell_center(cell))
        .filter(|center| grid.map_or(true, |grid| !grid.collides(*center, 0.0)))
        .max_by(farther)
        .or_else(|| {
            [
                CellCoord::new(0, 0),
                CellCoord::new(last_column, 0),
                CellCoord::new(0, last_row),
                CellCoord::new(last_column, last_row),
            ]
            .into_iter()
            .map(|cell| dimensions.cell_center(cell))
            .max_by(farther)
        })
        .unwrap_or_default()
}
