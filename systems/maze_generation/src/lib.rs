#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural maze generator.
//!
//! Carving runs a randomized depth-first walk with a step of two cells so
//! that corridors stay separated by wall cells, then injects rectangular
//! rooms, reinstates the boundary ring, opens a safe disk around the start
//! and finally selects an exit and records a path to it. Every walk uses an
//! explicit stack, so grid size never bounds call depth.

use ghost_maze_core::{CellCoord, Maze, MazeDimensions};
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;
use tracing::debug;

const DIRECTIONS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const MIN_ROOMS: u32 = 3;
const MAX_ROOMS: u32 = 10;
const MIN_ROOM_SIDE: i64 = 3;
const MAX_ROOM_SIDE: i64 = 5;
const DEFAULT_EXIT_EXCLUSION: u32 = 10;

/// Reasons a single generation attempt may fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The grid cannot hold a boundary ring around an interior.
    #[error("maze grid {columns}x{rows} is too small to carve")]
    GridTooSmall {
        /// Number of columns the dimensions produced.
        columns: u32,
        /// Number of rows the dimensions produced.
        rows: u32,
    },
    /// The start offset places the start cell outside the grid interior.
    #[error("start cell ({column}, {row}) lies outside the grid interior")]
    StartOutOfBounds {
        /// Signed start column.
        column: i64,
        /// Signed start row.
        row: i64,
    },
    /// No open cell qualifies as an exit.
    #[error("no open cell is eligible to hold the exit")]
    NoExitCandidate,
    /// The exit cannot be reached from the start through open cells.
    #[error("exit ({column}, {row}) is unreachable from the start")]
    ExitUnreachable {
        /// Column of the chosen exit.
        column: u32,
        /// Row of the chosen exit.
        row: u32,
    },
}

/// Configuration parameters required to construct the generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    dimensions: MazeDimensions,
    start_column_offset: i64,
    start_row_offset: i64,
    safe_radius: u32,
    exit_exclusion: u32,
}

impl Config {
    /// Creates a configuration carving from the center cell shifted by the provided offsets.
    #[must_use]
    pub const fn new(
        dimensions: MazeDimensions,
        start_column_offset: i64,
        start_row_offset: i64,
        safe_radius: u32,
    ) -> Self {
        Self {
            dimensions,
            start_column_offset,
            start_row_offset,
            safe_radius,
            exit_exclusion: DEFAULT_EXIT_EXCLUSION,
        }
    }

    /// Overrides the Chebyshev distance from the center below which the exit may not lie.
    #[must_use]
    pub const fn with_exit_exclusion(mut self, exit_exclusion: u32) -> Self {
        self.exit_exclusion = exit_exclusion;
        self
    }

    /// Dimensions of the generated maze.
    #[must_use]
    pub const fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }
}

/// Pure system that turns a random source into a [`Maze`].
#[derive(Clone, Debug)]
pub struct MazeGenerator {
    config: Config,
}

impl MazeGenerator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs one generation attempt.
    pub fn generate<R>(&self, rng: &mut R) -> Result<Maze, GenerationError>
    where
        R: Rng + ?Sized,
    {
        let dimensions = self.config.dimensions;
        let columns = dimensions.columns();
        let rows = dimensions.rows();
        if columns < 3 || rows < 3 {
            return Err(GenerationError::GridTooSmall { columns, rows });
        }

        let mut grid = Occupancy::closed(columns, rows);
        let center = dimensions.center();
        let start_column = i64::from(center.column()) + self.config.start_column_offset;
        let start_row = i64::from(center.row()) + self.config.start_row_offset;
        if !grid.is_interior(start_column, start_row) {
            return Err(GenerationError::StartOutOfBounds {
                column: start_column,
                row: start_row,
            });
        }

        grid.carve_corridors(start_column, start_row, rng);
        let rooms = grid.inject_rooms(rng);
        grid.close_boundary();
        grid.open_safe_disk(start_column, start_row, self.config.safe_radius);

        let start = grid
            .cell(start_column, start_row)
            .ok_or(GenerationError::StartOutOfBounds {
                column: start_column,
                row: start_row,
            })?;
        let exit = grid
            .choose_exit(start, center, self.config.exit_exclusion, rng)
            .ok_or(GenerationError::NoExitCandidate)?;
        let exit_path = grid
            .path_between(start, exit)
            .ok_or(GenerationError::ExitUnreachable {
                column: exit.column(),
                row: exit.row(),
            })?;

        debug!(
            columns,
            rows,
            rooms,
            exit_column = exit.column(),
            exit_row = exit.row(),
            path_length = exit_path.len(),
            "carved maze"
        );

        Ok(Maze::from_occupancy(
            dimensions,
            grid.into_row_major(),
            start,
            exit,
            exit_path,
        ))
    }
}

/// Row-major open/closed grid used while carving.
#[derive(Clone, Debug)]
struct Occupancy {
    columns: i64,
    rows: i64,
    open: Vec<bool>,
}

impl Occupancy {
    fn closed(columns: u32, rows: u32) -> Self {
        let columns = i64::from(columns);
        let rows = i64::from(rows);
        let len = usize::try_from(columns * rows).unwrap_or(0);
        Self {
            columns,
            rows,
            open: vec![false; len],
        }
    }

    fn slot(&self, column: i64, row: i64) -> Option<usize> {
        if column < 0 || row < 0 || column >= self.columns || row >= self.rows {
            return None;
        }
        usize::try_from(row * self.columns + column).ok()
    }

    fn cell(&self, column: i64, row: i64) -> Option<CellCoord> {
        let _ = self.slot(column, row)?;
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    fn is_open(&self, column: i64, row: i64) -> bool {
        self.slot(column, row)
            .and_then(|slot| self.open.get(slot).copied())
            .unwrap_or(false)
    }

    fn set(&mut self, column: i64, row: i64, open: bool) {
        if let Some(value) = self
            .slot(column, row)
            .and_then(|slot| self.open.get_mut(slot))
        {
            *value = open;
        }
    }

    fn is_interior(&self, column: i64, row: i64) -> bool {
        column > 0 && column < self.columns - 1 && row > 0 && row < self.rows - 1
    }

    fn carve_corridors<R>(&mut self, column: i64, row: i64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.set(column, row, true);
        let mut stack = vec![Frame::shuffled(column, row, rng)];

        while let Some(frame) = stack.last_mut() {
            let Some((dx, dy)) = frame.next_direction() else {
                let _ = stack.pop();
                continue;
            };
            let (column, row) = (frame.column, frame.row);
            let target = (column + dx * 2, row + dy * 2);
            if self.is_interior(target.0, target.1) && !self.is_open(target.0, target.1) {
                self.set(column + dx, row + dy, true);
                self.set(target.0, target.1, true);
                stack.push(Frame::shuffled(target.0, target.1, rng));
            }
        }
    }

    fn inject_rooms<R>(&mut self, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        let count = rng.gen_range(MIN_ROOMS..=MAX_ROOMS);
        let mut carved = 0;
        for _ in 0..count {
            let width = rng.gen_range(MIN_ROOM_SIDE..=MAX_ROOM_SIDE);
            let height = rng.gen_range(MIN_ROOM_SIDE..=MAX_ROOM_SIDE);
            let column_span = self.columns - width - 2;
            let row_span = self.rows - height - 2;
            if column_span <= 0 || row_span <= 0 {
                continue;
            }
            let left = rng.gen_range(0..column_span) + 1;
            let top = rng.gen_range(0..row_span) + 1;
            for column in left..left + width {
                for row in top..top + height {
                    self.set(column, row, true);
                }
            }
            carved += 1;
        }
        carved
    }

    fn close_boundary(&mut self) {
        for column in 0..self.columns {
            self.set(column, 0, false);
            self.set(column, self.rows - 1, false);
        }
        for row in 0..self.rows {
            self.set(0, row, false);
            self.set(self.columns - 1, row, false);
        }
    }

    fn open_safe_disk(&mut self, column: i64, row: i64, radius: u32) {
        let radius = i64::from(radius);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                if self.is_interior(column + dx, row + dy) {
                    self.set(column + dx, row + dy, true);
                }
            }
        }
    }

    fn choose_exit<R>(
        &self,
        start: CellCoord,
        center: CellCoord,
        exclusion: u32,
        rng: &mut R,
    ) -> Option<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<CellCoord> = (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (column, row)))
            .filter(|&(column, row)| self.is_open(column, row))
            .filter_map(|(column, row)| self.cell(column, row))
            .filter(|cell| *cell != start && cell.chebyshev_distance(center) >= exclusion)
            .collect();
        candidates.choose(rng).copied()
    }

    /// Depth-first walk over open cells, backtracking out of dead ends.
    fn path_between(&self, start: CellCoord, exit: CellCoord) -> Option<Vec<CellCoord>> {
        let mut visited = vec![false; self.open.len()];
        let mut path = vec![start];
        let mut cursors = vec![0_usize];
        let _ = self.mark(&mut visited, start);

        loop {
            let Some(&current) = path.last() else {
                return None;
            };
            if current == exit {
                return Some(path);
            }
            let Some(cursor) = cursors.last_mut() else {
                return None;
            };
            let direction = DIRECTIONS.get(*cursor).copied();
            *cursor += 1;
            let Some((dx, dy)) = direction else {
                let _ = path.pop();
                let _ = cursors.pop();
                continue;
            };

            let column = i64::from(current.column()) + dx;
            let row = i64::from(current.row()) + dy;
            if !self.is_open(column, row) {
                continue;
            }
            let Some(next) = self.cell(column, row) else {
                continue;
            };
            if self.mark(&mut visited, next) {
                path.push(next);
                cursors.push(0);
            }
        }
    }

    fn mark(&self, visited: &mut [bool], cell: CellCoord) -> bool {
        let Some(slot) = self.slot(i64::from(cell.column()), i64::from(cell.row())) else {
            return false;
        };
        match visited.get_mut(slot) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }

    fn into_row_major(self) -> Vec<bool> {
        self.open
    }
}

/// One pending cell on the carving stack and its remaining shuffled directions.
#[derive(Clone, Copy, Debug)]
struct Frame {
    column: i64,
    row: i64,
    directions: [(i64, i64); 4],
    next: usize,
}

impl Frame {
    fn shuffled<R>(column: i64, row: i64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut directions = DIRECTIONS;
        directions.shuffle(rng);
        Self {
            column,
            row,
            directions,
            next: 0,
        }
    }

    fn next_direction(&mut self) -> Option<(i64, i64)> {
        let direction = self.directions.get(self.next).copied()?;
        self.next += 1;
        Some(direction)
    }
}
