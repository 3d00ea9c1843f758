//! Grid engine shared by the grid games
//!
//! Board storage, bounds checks, shape overlap tests, locking shapes into the
//! board and compacting full rows. Coordinates are `IVec2` with `y` growing
//! downward; rows above the visible board have negative `y`.

use glam::IVec2;

/// Cell value for an empty board cell
pub const EMPTY: u8 = 0;

/// Board dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn contains(&self, cell: IVec2) -> bool {
        self.in_bounds(cell.x, cell.y)
    }

    /// Every cell, row-major
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + use<> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| IVec2::new(x, y)))
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Occupancy matrix of a piece, stored as rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    /// Build from rows of 0/1 values; rows must all have the same length
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|&v| v != 0).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Offsets of occupied cells relative to the anchor
    pub fn occupied(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| IVec2::new(x as i32, y as i32))
        })
    }

    /// 90° clockwise rotation: column `i` read bottom-to-top becomes row `i`
    pub fn rotated(&self) -> Shape {
        let h = self.height();
        let rows = (0..self.width())
            .map(|i| (0..h).map(|j| self.rows[h - 1 - j][i]).collect())
            .collect();
        Shape { rows }
    }
}

/// Outcome of locking a shape into the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Locked,
    /// Part of the shape sat above the visible board
    TopOut,
}

/// Fixed-size board of color tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: GridSize,
    rows: Vec<Vec<u8>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: GridSize::new(width, height),
            rows: vec![vec![EMPTY; width]; height],
        }
    }

    /// Adopt pre-validated rows; returns None unless they form a `width × height` grid
    pub fn from_rows(width: usize, height: usize, rows: Vec<Vec<u8>>) -> Option<Self> {
        if rows.len() != height || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self {
            size: GridSize::new(width, height),
            rows,
        })
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.size.in_bounds(x, y)
    }

    /// Token at `(x, y)`, None when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if self.in_bounds(x, y) {
            Some(self.rows[y as usize][x as usize])
        } else {
            None
        }
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|c| c != EMPTY)
    }

    /// True if `shape` at `anchor` leaves the sides or bottom, or overlaps a
    /// filled cell. Cells above the top edge only get the horizontal check.
    pub fn collides(&self, shape: &Shape, anchor: IVec2) -> bool {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        shape.occupied().any(|offset| {
            let cell = anchor + offset;
            if cell.x < 0 || cell.x >= w || cell.y >= h {
                return true;
            }
            cell.y >= 0 && self.is_occupied(cell.x, cell.y)
        })
    }

    /// Rotated copy of `shape` if it fits at `anchor`, None if rejected.
    /// No kick offsets are tried.
    pub fn try_rotate(&self, shape: &Shape, anchor: IVec2) -> Option<Shape> {
        let rotated = shape.rotated();
        if self.collides(&rotated, anchor) {
            None
        } else {
            Some(rotated)
        }
    }

    /// Burn `shape` into the board with `token`
    pub fn commit(&mut self, shape: &Shape, anchor: IVec2, token: u8) -> Commit {
        let mut outcome = Commit::Locked;
        for offset in shape.occupied() {
            let cell = anchor + offset;
            if cell.y < 0 {
                outcome = Commit::TopOut;
                continue;
            }
            if self.in_bounds(cell.x, cell.y) {
                self.rows[cell.y as usize][cell.x as usize] = token;
            }
        }
        outcome
    }

    /// Remove full rows bottom-up, shifting everything above down.
    /// Returns the number of rows removed.
    pub fn compact_rows(&mut self) -> u32 {
        if self.size.width == 0 {
            return 0;
        }
        let mut cleared = 0;
        let mut y = self.rows.len();
        while y > 0 {
            let row = y - 1;
            if self.rows[row].iter().all(|&c| c != EMPTY) {
                self.rows.remove(row);
                self.rows.insert(0, vec![EMPTY; self.size.width]);
                cleared += 1;
                // The row that slid into `row` gets rechecked
            } else {
                y -= 1;
            }
        }
        cleared
    }

    pub fn filled_count(&self) -> usize {
        self.rows.iter().flatten().filter(|&&c| c != EMPTY).count()
    }
}
