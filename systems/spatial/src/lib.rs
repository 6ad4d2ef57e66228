#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Uniform wall grid and the collision predicates built on top of it.
//!
//! The grid is rebuilt whole whenever the maze changes and is read-only in
//! between. Every query that names a cell outside the maze bounds yields no
//! walls instead of indexing out of range.

use std::sync::Arc;

use ghost_maze_core::{MazeDimensions, Wall};
use glam::Vec2;

/// Spatial index mapping grid cells to the walls overlapping them.
#[derive(Clone, Debug)]
pub struct WallGrid {
    dimensions: MazeDimensions,
    walls: Arc<[Wall]>,
    buckets: Vec<Vec<u32>>,
}

impl WallGrid {
    /// Builds the index, registering each wall in every cell its rectangle overlaps.
    ///
    /// Portions of a wall outside the grid are dropped.
    #[must_use]
    pub fn build(dimensions: MazeDimensions, walls: Arc<[Wall]>) -> Self {
        let mut buckets = vec![Vec::new(); dimensions.cell_count()];
        let columns = i64::from(dimensions.columns());
        let rows = i64::from(dimensions.rows());

        for (index, wall) in walls.iter().enumerate() {
            let Ok(index) = u32::try_from(index) else {
                break;
            };
            let (first_column, first_row) = dimensions.grid_coords(wall.min());
            let (last_column, last_row) = last_covered_cell(&dimensions, wall);

            for column in first_column.max(0)..=last_column.min(columns - 1) {
                for row in first_row.max(0)..=last_row.min(rows - 1) {
                    let Some(slot) = dimensions
                        .checked_cell(column, row)
                        .and_then(|cell| dimensions.index(cell))
                    else {
                        continue;
                    };
                    if let Some(bucket) = buckets.get_mut(slot) {
                        bucket.push(index);
                    }
                }
            }
        }

        Self {
            dimensions,
            walls,
            buckets,
        }
    }

    /// Builds an index for a maze with no walls.
    #[must_use]
    pub fn empty(dimensions: MazeDimensions) -> Self {
        Self::build(dimensions, Arc::from(Vec::new()))
    }

    /// Dimensions the index was built for.
    #[must_use]
    pub const fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    /// Every wall known to the index.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Walls overlapping the cell at signed grid coordinates; empty outside the grid.
    pub fn query(&self, column: i64, row: i64) -> impl Iterator<Item = &Wall> + '_ {
        let bucket = self
            .dimensions
            .checked_cell(column, row)
            .and_then(|cell| self.dimensions.index(cell))
            .and_then(|slot| self.buckets.get(slot))
            .map_or(&[][..], Vec::as_slice);
        bucket
            .iter()
            .filter_map(|index| self.walls.get(usize::try_from(*index).ok()?))
    }

    /// Reports whether the point grown by `collider_size` overlaps any wall.
    ///
    /// Only the cells around the point are inspected.
    #[must_use]
    pub fn collides(&self, point: Vec2, collider_size: f32) -> bool {
        let margin = Vec2::splat(collider_size.max(0.0));
        let (first_column, first_row) = self.dimensions.grid_coords(point - margin);
        let (last_column, last_row) = self.dimensions.grid_coords(point + margin);

        for column in (first_column - 1)..=(last_column + 1) {
            for row in (first_row - 1)..=(last_row + 1) {
                if self
                    .query(column, row)
                    .any(|wall| wall.contains_inflated(point, collider_size))
                {
                    return true;
                }
            }
        }
        false
    }
}

fn last_covered_cell(dimensions: &MazeDimensions, wall: &Wall) -> (i64, i64) {
    let (first_column, first_row) = dimensions.grid_coords(wall.min());
    let cell_size = dimensions.cell_size();
    if cell_size <= 0.0 {
        return (first_column, first_row);
    }
    let center = dimensions.center();
    let max = wall.max();
    let last_column = (max.x / cell_size).ceil() as i64 - 1 + i64::from(center.column());
    let last_row = (max.y / cell_size).ceil() as i64 - 1 + i64::from(center.row());
    (last_column.max(first_column), last_row.max(first_row))
}

/// Reports whether the point grown by `collider_size` overlaps any wall in the slice.
#[must_use]
pub fn collides(point: Vec2, collider_size: f32, walls: &[Wall]) -> bool {
    walls
        .iter()
        .any(|wall| wall.contains_inflated(point, collider_size))
}

/// Circle-circle contact test between two bodies.
#[must_use]
pub fn circles_touch(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimensions() -> MazeDimensions {
        MazeDimensions::new(1000.0, 1000.0, 100.0)
    }

    #[test]
    fn aligned_wall_occupies_exactly_its_cell() {
        let wall = Wall::new(100.0, -200.0, 100.0, 100.0);
        let grid = WallGrid::build(dimensions(), Arc::from(vec![wall]));
        let (column, row) = dimensions().grid_coords(Vec2::new(150.0, -150.0));

        assert_eq!(grid.query(column, row).count(), 1);
        assert_eq!(grid.query(column + 1, row).count(), 0);
        assert_eq!(grid.query(column, row + 1).count(), 0);
    }

    #[test]
    fn spanning_wall_is_referenced_from_every_cell() {
        let wall = Wall::new(-150.0, 0.0, 300.0, 50.0);
        let grid = WallGrid::build(dimensions(), Arc::from(vec![wall]));
        let (first, row) = dimensions().grid_coords(Vec2::new(-150.0, 10.0));

        for column in first..first + 4 {
            assert_eq!(grid.query(column, row).count(), 1, "column {column}");
        }
        assert_eq!(grid.query(first + 4, row).count(), 0);
    }

    #[test]
    fn out_of_range_queries_are_empty() {
        let wall = Wall::new(-500.0, -500.0, 100.0, 100.0);
        let grid = WallGrid::build(dimensions(), Arc::from(vec![wall]));

        assert_eq!(grid.query(-1, 0).count(), 0);
        assert_eq!(grid.query(0, -1).count(), 0);
        assert_eq!(grid.query(10, 10).count(), 0);
        assert_eq!(grid.query(i64::MAX, i64::MIN).count(), 0);
        assert_eq!(grid.query(0, 0).count(), 1);
    }

    #[test]
    fn walls_beyond_grid_are_clamped() {
        let wall = Wall::new(400.0, 400.0, 400.0, 400.0);
        let grid = WallGrid::build(dimensions(), Arc::from(vec![wall]));
        assert_eq!(grid.query(9, 9).count(), 1);
    }

    #[test]
    fn grid_collision_matches_linear_scan() {
        let walls = vec![
            Wall::new(0.0, 0.0, 100.0, 100.0),
            Wall::new(-300.0, 200.0, 100.0, 100.0),
        ];
        let grid = WallGrid::build(dimensions(), Arc::from(walls.clone()));

        for point in [
            Vec2::new(-5.0, 50.0),
            Vec2::new(-11.0, 50.0),
            Vec2::new(105.0, 105.0),
            Vec2::new(-250.0, 195.0),
            Vec2::new(400.0, -400.0),
        ] {
            assert_eq!(
                grid.collides(point, 10.0),
                collides(point, 10.0, &walls),
                "{point:?}"
            );
        }
    }

    #[test]
    fn circle_contact_uses_sum_of_radii() {
        assert!(circles_touch(Vec2::ZERO, 10.0, Vec2::new(29.0, 0.0), 20.0));
        assert!(!circles_touch(Vec2::ZERO, 10.0, Vec2::new(30.0, 0.0), 20.0));
    }
}
