use derive_more::{Add, From};
use static_assertions::const_assert;

use crate::{Color, Shape};

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;

// the I piece stands four tall and lies four wide
const_assert!(DEFAULT_WIDTH >= 4 && DEFAULT_HEIGHT >= 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Top-left anchor of a shape. `y` grows downward and may be negative while a
/// piece pokes out above the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Add, From)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// `(row, col)` of every occupied cell of `shape` when anchored at `at`.
pub fn cells_at(shape: &Shape, at: Position) -> impl Iterator<Item = (i32, i32)> + '_ {
    shape
        .occupied()
        .map(move |(row_n, col_n)| (at.y + row_n as i32, at.x + col_n as i32))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum PlacementError {
    #[error("cell at row {row}, column {col} is outside the playfield")]
    OutOfBounds { row: i32, col: i32 },
    #[error("would clobber non-empty cell at row {row}, column {col}")]
    WouldClobber { row: i32, col: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
// choice: static array, sized at compile time, like the playfield it models
// choice: row-wise, because we'll be searching and clearing rows
pub struct Playfield<const WIDTH: usize = DEFAULT_WIDTH, const HEIGHT: usize = DEFAULT_HEIGHT> {
    rows: [[Cell; WIDTH]; HEIGHT],
}

impl<const WIDTH: usize, const HEIGHT: usize> Default for Playfield<WIDTH, HEIGHT> {
    fn default() -> Self {
        Self {
            rows: [Self::empty_row(); HEIGHT],
        }
    }
}

impl<const WIDTH: usize, const HEIGHT: usize> Playfield<WIDTH, HEIGHT> {
    const fn empty_row() -> [Cell; WIDTH] {
        [Cell::Empty; WIDTH]
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub const fn from_rows(rows: [[Cell; WIDTH]; HEIGHT]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[[Cell; WIDTH]; HEIGHT] {
        &self.rows
    }

    /// `None` outside the grid, including the buffer above row 0.
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.rows.get(row)?.get(col).copied()
    }

    pub fn is_row_full(&self, row_n: usize) -> bool {
        self.rows
            .get(row_n)
            .map(|row| row.iter().all(Cell::is_filled))
            .unwrap_or(false)
    }

    /// Checks `shape` anchored at `at`, reporting the first offending cell.
    ///
    /// Cells above row 0 only have to respect the side walls.
    pub fn check_placement(&self, shape: &Shape, at: Position) -> Result<(), PlacementError> {
        for (row, col) in cells_at(shape, at) {
            if col < 0 || col >= WIDTH as i32 || row >= HEIGHT as i32 {
                return Err(PlacementError::OutOfBounds { row, col });
            }
            if row >= 0 && self.rows[row as usize][col as usize].is_filled() {
                return Err(PlacementError::WouldClobber { row, col });
            }
        }
        Ok(())
    }

    pub fn is_valid_placement(&self, shape: &Shape, at: Position) -> bool {
        self.check_placement(shape, at).is_ok()
    }

    /// Writes `shape` into the grid. Cells above row 0 are dropped.
    ///
    /// The placement must have passed [Playfield::is_valid_placement]; this
    /// doesn't re-validate outside of debug builds.
    pub fn commit(&mut self, shape: &Shape, at: Position, color: Color) {
        debug_assert_eq!(self.check_placement(shape, at), Ok(()));
        for (row, col) in cells_at(shape, at) {
            let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
                continue;
            };
            if let Some(cell) = self.rows.get_mut(row).and_then(|row| row.get_mut(col)) {
                *cell = Cell::Filled(color);
            }
        }
    }

    /// Removes every full row, letting the rows above fall into the gap.
    /// Returns how many rows were removed.
    pub fn clear_full_rows(&mut self) -> usize {
        // HEIGHT = 4, scanning bottom up
        // 0  . # . .      . . . .
        // 1  # # # #  =>  . . . .
        // 2  # . # .      . # . .
        // 3  # # # #      # . # .
        let mut write_n = HEIGHT;
        for read_n in (0..HEIGHT).rev() {
            if self.is_row_full(read_n) {
                continue;
            }
            write_n -= 1;
            if write_n != read_n {
                self.rows[write_n] = self.rows[read_n];
            }
        }
        for row in &mut self.rows[..write_n] {
            *row = Self::empty_row();
        }
        write_n
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
