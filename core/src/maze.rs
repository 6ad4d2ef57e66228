//! Maze geometry shared by the generator, the spatial index and the renderer.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Axis-aligned wall rectangle in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Wall {
    /// Creates a wall whose upper-left corner sits at `(x, y)`.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge of the wall.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Top edge of the wall.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal extent of the wall.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the wall.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Upper-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Lower-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Reports whether `point` lies strictly inside the rectangle grown by `margin` on every side.
    #[must_use]
    pub fn contains_inflated(&self, point: Vec2, margin: f32) -> bool {
        point.x > self.x - margin
            && point.x < self.x + self.width + margin
            && point.y > self.y - margin
            && point.y < self.y + self.height + margin
    }
}

/// World extent of a maze and the size of the cells it is carved from.
///
/// The maze is centered on the world origin: cell `(columns / 2, rows / 2)`
/// has its upper-left corner at `(0, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeDimensions {
    width: f32,
    height: f32,
    cell_size: f32,
}

impl MazeDimensions {
    /// Creates a new description of the maze extent.
    #[must_use]
    pub const fn new(width: f32, height: f32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
        }
    }

    /// Total width in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Total height in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Side length of a square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of whole cell columns; zero when the cell size is not positive.
    #[must_use]
    pub fn columns(&self) -> u32 {
        whole_cells(self.width, self.cell_size)
    }

    /// Number of whole cell rows; zero when the cell size is not positive.
    #[must_use]
    pub fn rows(&self) -> u32 {
        whole_cells(self.height, self.cell_size)
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns()) * u64::from(self.rows());
        usize::try_from(count).unwrap_or(0)
    }

    /// Cell at the center of the grid.
    #[must_use]
    pub fn center(&self) -> CellCoord {
        CellCoord::new(self.columns() / 2, self.rows() / 2)
    }

    /// Upper-left corner of a cell in world units.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        let center = self.center();
        Vec2::new(
            (i64::from(cell.column()) - i64::from(center.column())) as f32 * self.cell_size,
            (i64::from(cell.row()) - i64::from(center.row())) as f32 * self.cell_size,
        )
    }

    /// Center point of a cell in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.cell_size / 2.0)
    }

    /// Signed grid coordinates containing `point`; may lie outside the grid.
    #[must_use]
    pub fn grid_coords(&self, point: Vec2) -> (i64, i64) {
        if self.cell_size <= 0.0 {
            return (0, 0);
        }
        let center = self.center();
        (
            (point.x / self.cell_size).floor() as i64 + i64::from(center.column()),
            (point.y / self.cell_size).floor() as i64 + i64::from(center.row()),
        )
    }

    /// Cell containing `point`, or `None` when the point lies outside the grid.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        let (column, row) = self.grid_coords(point);
        self.checked_cell(column, row)
    }

    /// Converts signed grid coordinates into a cell when they fall inside the grid.
    #[must_use]
    pub fn checked_cell(&self, column: i64, row: i64) -> Option<CellCoord> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        (column < self.columns() && row < self.rows()).then(|| CellCoord::new(column, row))
    }

    /// Row-major index of a cell inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns() && cell.row() < self.rows() {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Wraps a point that left the maze bounds onto the opposite edge.
    #[must_use]
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        let mut wrapped = point;
        if wrapped.x < -half_width {
            wrapped.x = half_width;
        } else if wrapped.x > half_width {
            wrapped.x = -half_width;
        }
        if wrapped.y < -half_height {
            wrapped.y = half_height;
        } else if wrapped.y > half_height {
            wrapped.y = -half_height;
        }
        wrapped
    }
}

fn whole_cells(extent: f32, cell_size: f32) -> u32 {
    if cell_size <= 0.0 || extent <= 0.0 {
        return 0;
    }
    (extent / cell_size).floor() as u32
}

/// Generated maze: occupancy grid, wall rectangles, exit and exit path.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    dimensions: MazeDimensions,
    open: Vec<bool>,
    walls: Arc<[Wall]>,
    start: CellCoord,
    exit: CellCoord,
    exit_path: Vec<CellCoord>,
}

impl Maze {
    /// Builds a maze from a row-major occupancy grid, emitting one wall per closed cell.
    ///
    /// Missing occupancy entries are treated as closed.
    #[must_use]
    pub fn from_occupancy(
        dimensions: MazeDimensions,
        open: Vec<bool>,
        start: CellCoord,
        exit: CellCoord,
        exit_path: Vec<CellCoord>,
    ) -> Self {
        let mut open = open;
        open.resize(dimensions.cell_count(), false);

        let cell_size = dimensions.cell_size();
        let mut walls = Vec::new();
        for column in 0..dimensions.columns() {
            for row in 0..dimensions.rows() {
                let cell = CellCoord::new(column, row);
                let is_open = dimensions
                    .index(cell)
                    .and_then(|index| open.get(index).copied())
                    .unwrap_or(false);
                if !is_open {
                    let origin = dimensions.cell_origin(cell);
                    walls.push(Wall::new(origin.x, origin.y, cell_size, cell_size));
                }
            }
        }

        Self {
            dimensions,
            open,
            walls: walls.into(),
            start,
            exit,
            exit_path,
        }
    }

    /// World extent and cell size of the maze.
    #[must_use]
    pub const fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    /// Wall rectangles, one per closed cell.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Shared handle to the wall rectangles for indexes that outlive a borrow.
    #[must_use]
    pub fn shared_walls(&self) -> Arc<[Wall]> {
        Arc::clone(&self.walls)
    }

    /// Cell the carving started from.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cell the player must reach.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        self.exit
    }

    /// Open cells leading from the start to the exit, both inclusive.
    #[must_use]
    pub fn exit_path(&self) -> &[CellCoord] {
        &self.exit_path
    }

    /// Reports whether a cell is open; cells outside the grid are closed.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.dimensions
            .index(cell)
            .and_then(|index| self.open.get(index).copied())
            .unwrap_or(false)
    }

    /// Iterator over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.dimensions.columns();
        self.open
            .iter()
            .enumerate()
            .filter(|(_, open)| **open)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                let columns = columns.max(1);
                Some(CellCoord::new(index % columns, index / columns))
            })
    }

    /// Center of the exit cell in world units.
    #[must_use]
    pub fn exit_center(&self) -> Vec2 {
        self.dimensions.cell_center(self.exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_coords_invert_cell_origin() {
        let dimensions = MazeDimensions::new(3500.0, 3500.0, 100.0);
        assert_eq!(dimensions.columns(), 35);
        let cell = CellCoord::new(3, 30);
        let center = dimensions.cell_center(cell);
        assert_eq!(dimensions.cell_at(center), Some(cell));
        assert_eq!(dimensions.cell_origin(dimensions.center()), Vec2::ZERO);
    }

    #[test]
    fn cell_at_rejects_points_outside_grid() {
        let dimensions = MazeDimensions::new(500.0, 500.0, 100.0);
        assert!(dimensions.cell_at(Vec2::new(-1000.0, 0.0)).is_none());
        assert!(dimensions.cell_at(Vec2::new(0.0, 1000.0)).is_none());
    }

    #[test]
    fn wrap_moves_points_to_opposite_edge() {
        let dimensions = MazeDimensions::new(1000.0, 800.0, 100.0);
        assert_eq!(
            dimensions.wrap(Vec2::new(-501.0, 401.0)),
            Vec2::new(500.0, -400.0)
        );
        assert_eq!(dimensions.wrap(Vec2::new(10.0, 20.0)), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn closed_cells_become_walls() {
        let dimensions = MazeDimensions::new(300.0, 300.0, 100.0);
        let mut open = vec![false; 9];
        open[4] = true;
        let center = CellCoord::new(1, 1);
        let maze = Maze::from_occupancy(dimensions, open, center, center, vec![center]);

        assert_eq!(maze.walls().len(), 8);
        assert!(maze.is_open(center));
        assert!(!maze.is_open(CellCoord::new(0, 0)));
        assert!(!maze.is_open(CellCoord::new(7, 7)));
        assert_eq!(maze.open_cells().collect::<Vec<_>>(), vec![center]);
    }

    #[test]
    fn inflated_containment_is_strict() {
        let wall = Wall::new(0.0, 0.0, 10.0, 10.0);
        assert!(wall.contains_inflated(Vec2::new(-4.0, 5.0), 5.0));
        assert!(!wall.contains_inflated(Vec2::new(-5.0, 5.0), 5.0));
    }
}
