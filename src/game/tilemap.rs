//! # Tile Map
//!
//! Fixed-size grid of integer cell values with world/grid coordinate transforms.
//!
//! Every map-like structure in the game (the text map, the ladder map) is stored
//! in a [`TileMap`]. Cells are addressed by column and row; a cell's world-space
//! footprint is a `tilesize`-sided square whose top-left corner sits at
//! `(x * tilesize, y * tilesize)`.

use crate::{LetterfallError, LetterfallResult, Position, Rect};
use serde::{Deserialize, Serialize};

/// Value of a cell that holds nothing.
pub const EMPTY_CELL: i32 = 0;

/// Row-major grid of integer cells.
///
/// Out-of-range reads and writes are rejected with
/// [`LetterfallError::OutOfBounds`], never clamped.
///
/// # Examples
///
/// ```
/// use letterfall::TileMap;
///
/// let mut map = TileMap::new(8, 4, 3).unwrap();
/// map.set(2, 1, 7).unwrap();
/// assert_eq!(map.get(2, 1).unwrap(), 7);
/// assert!(map.get(4, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    tilesize: i32,
    width: usize,
    height: usize,
    cells: Vec<i32>,
}

impl TileMap {
    /// Creates a map filled with [`EMPTY_CELL`].
    pub fn new(tilesize: i32, width: usize, height: usize) -> LetterfallResult<Self> {
        if width == 0 || height == 0 {
            return Err(LetterfallError::InvalidGrid(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if tilesize <= 0 {
            return Err(LetterfallError::InvalidGrid(format!(
                "tile size must be positive, got {}",
                tilesize
            )));
        }
        let extent = |cells: usize| {
            i32::try_from(cells)
                .ok()
                .and_then(|cells| cells.checked_mul(tilesize))
        };
        if extent(width).is_none() || extent(height).is_none() {
            return Err(LetterfallError::InvalidGrid(format!(
                "{}x{} cells of size {} exceed the coordinate range",
                width, height, tilesize
            )));
        }

        Ok(Self {
            tilesize,
            width,
            height,
            cells: vec![EMPTY_CELL; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tilesize(&self) -> i32 {
        self.tilesize
    }

    /// Checks whether `(x, y)` addresses a cell of this map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> LetterfallResult<usize> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub(crate) fn out_of_bounds(&self, x: i32, y: i32) -> LetterfallError {
        LetterfallError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    pub(crate) fn check_row(&self, y: i32) -> LetterfallResult<usize> {
        if y < 0 || y as usize >= self.height {
            return Err(self.out_of_bounds(0, y));
        }
        Ok(y as usize)
    }

    /// Reads the value at `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> LetterfallResult<i32> {
        let index = self.index(x, y)?;
        Ok(self.cells[index])
    }

    /// Writes `value` at `(x, y)`.
    pub fn set(&mut self, x: i32, y: i32, value: i32) -> LetterfallResult<()> {
        let index = self.index(x, y)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: i32) {
        self.cells.fill(value);
    }

    /// Returns row `y` as a slice of cell values.
    pub fn row(&self, y: i32) -> LetterfallResult<&[i32]> {
        let y = self.check_row(y)?;
        let start = y * self.width;
        Ok(&self.cells[start..start + self.width])
    }

    pub(crate) fn row_mut(&mut self, y: i32) -> LetterfallResult<&mut [i32]> {
        let y = self.check_row(y)?;
        let start = y * self.width;
        let width = self.width;
        Ok(&mut self.cells[start..start + width])
    }

    /// Copies row `src` over row `dst`. Both rows must already be validated.
    pub(crate) fn copy_row(&mut self, src: usize, dst: usize) {
        let width = self.width;
        self.cells
            .copy_within(src * width..(src + 1) * width, dst * width);
    }

    /// Clears a validated row to [`EMPTY_CELL`].
    pub(crate) fn clear_row(&mut self, y: usize) {
        let width = self.width;
        self.cells[y * width..(y + 1) * width].fill(EMPTY_CELL);
    }

    /// Converts a world point to the cell containing it.
    ///
    /// The result may lie outside the map; callers check with [`in_bounds`].
    ///
    /// [`in_bounds`]: TileMap::in_bounds
    pub fn coord_to_map(&self, point: Position) -> Position {
        Position::new(
            point.x.div_euclid(self.tilesize),
            point.y.div_euclid(self.tilesize),
        )
    }

    /// Returns the world rectangle covered by `cell`.
    pub fn map_to_coord(&self, cell: Position) -> Rect {
        Rect::new(
            cell.x * self.tilesize,
            cell.y * self.tilesize,
            self.tilesize,
            self.tilesize,
        )
    }

    /// World rectangle covered by the whole map.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.width as i32 * self.tilesize,
            self.height as i32 * self.tilesize,
        )
    }

    /// Cell range overlapped by a world rectangle, clamped to the map.
    ///
    /// Returns `(min, max)` with `max` exclusive, or `None` when the rectangle
    /// touches no cell.
    pub fn cells_overlapping(&self, rect: &Rect) -> Option<(Position, Position)> {
        if rect.width <= 0 || rect.height <= 0 {
            return None;
        }
        let x0 = rect.x.div_euclid(self.tilesize).max(0);
        let y0 = rect.y.div_euclid(self.tilesize).max(0);
        let x1 = ((rect.right() - 1).div_euclid(self.tilesize) + 1).min(self.width as i32);
        let y1 = ((rect.bottom() - 1).div_euclid(self.tilesize) + 1).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((Position::new(x0, y0), Position::new(x1, y1)))
    }

    /// Finds the first cell, in row-major order, overlapping `rect` whose value
    /// satisfies `predicate`.
    pub fn find_tile<F>(&self, predicate: F, rect: &Rect) -> Option<Position>
    where
        F: Fn(i32) -> bool,
    {
        let (min, max) = self.cells_overlapping(rect)?;
        for y in min.y..max.y {
            for x in min.x..max.x {
                let value = self.cells[y as usize * self.width + x as usize];
                if predicate(value) {
                    return Some(Position::new(x, y));
                }
            }
        }
        None
    }
}
