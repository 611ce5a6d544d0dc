use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};

/// Side length of the square grid every piece occupies.
pub const SHAPE_SIZE: usize = 3;

/// Odds (numerator, denominator) that the generator occupies a cell it reaches.
const GROW_ODDS: (u32, u32) = (2, 3);

/// Deepest recursion level that may still occupy a cell.
///
/// Level 0 is an edge cell next to the center, level 1 is a corner reached through it.
const MAX_GROW_LEVEL: usize = 1;

/// Edge cells seeded around the center, in generation order.
const SEED_CELLS: [(isize, isize); 4] = [(1, 2), (1, 0), (2, 1), (0, 1)];

/// Neighbors visited from a freshly occupied cell, in generation order.
const GROW_ORDER: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Swaps the two axes of a boolean grid: `result[j][i] == grid[i][j]`.
#[must_use]
pub fn transpose<const R: usize, const C: usize>(grid: &[[bool; C]; R]) -> [[bool; R]; C] {
    let mut result = [[false; R]; C];
    for (i, row) in grid.iter().enumerate() {
        for (j, &cell) in row.iter().enumerate() {
            result[j][i] = cell;
        }
    }
    result
}

/// Reverses the order of the cells inside each row: `result[i][j] == grid[i][C - 1 - j]`.
#[must_use]
pub fn reverse_rows<const R: usize, const C: usize>(grid: &[[bool; C]; R]) -> [[bool; C]; R] {
    let mut result = *grid;
    for row in &mut result {
        row.reverse();
    }
    result
}

/// Occupancy of a 3×3 piece grid.
///
/// Cells are indexed as `(x, y)` with `x` growing rightward and `y` growing upward,
/// so `(0, 0)` is the lower-left cell and `(1, 1)` is the center.
///
/// Random shapes are produced by sampling from [`StandardUniform`]:
///
/// ```
/// use polytris_engine::Shape;
/// use rand::Rng as _;
///
/// let shape: Shape = rand::rng().random();
/// assert!(shape.is_occupied(1, 1));
/// assert_eq!(shape.rotated_clockwise().rotated_counterclockwise(), shape);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    cells: [[bool; SHAPE_SIZE]; SHAPE_SIZE],
}

impl Shape {
    pub const EMPTY: Self = Self {
        cells: [[false; SHAPE_SIZE]; SHAPE_SIZE],
    };

    /// Builds a shape from a column-major grid (`cells[x][y]`).
    #[must_use]
    pub const fn from_cells(cells: [[bool; SHAPE_SIZE]; SHAPE_SIZE]) -> Self {
        Self { cells }
    }

    /// Builds a shape from three text rows, top row first.
    ///
    /// `#` marks an occupied cell, any other character an empty one.
    ///
    /// ```
    /// use polytris_engine::Shape;
    ///
    /// let shape = Shape::from_rows(["...", "###", ".#."]);
    /// assert!(shape.is_occupied(0, 1));
    /// assert!(shape.is_occupied(1, 0));
    /// assert!(!shape.is_occupied(1, 2));
    /// ```
    #[must_use]
    pub fn from_rows(rows: [&str; SHAPE_SIZE]) -> Self {
        let mut cells = [[false; SHAPE_SIZE]; SHAPE_SIZE];
        for (line, text) in rows.iter().enumerate() {
            assert_eq!(text.chars().count(), SHAPE_SIZE, "shape row must be 3 cells wide");
            let y = SHAPE_SIZE - 1 - line;
            for (x, ch) in text.chars().enumerate() {
                cells[x][y] = ch == '#';
            }
        }
        Self { cells }
    }

    /// Generates a random shape by growing outward from the center.
    ///
    /// The center is always occupied. Each edge cell is then occupied with 2/3 odds,
    /// and every occupied edge cell gives its two neighboring corners the same odds.
    /// A cell that is already occupied is never revisited.
    pub fn generate<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut shape = Self::EMPTY;
        shape.cells[1][1] = true;
        for (x, y) in SEED_CELLS {
            shape.grow(rng, x, y, 0);
        }
        shape
    }

    fn grow<R>(&mut self, rng: &mut R, x: isize, y: isize, level: usize)
    where
        R: Rng + ?Sized,
    {
        if level > MAX_GROW_LEVEL {
            return;
        }
        let (Ok(ux), Ok(uy)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if ux >= SHAPE_SIZE || uy >= SHAPE_SIZE || self.cells[ux][uy] {
            return;
        }
        if !rng.random_ratio(GROW_ODDS.0, GROW_ODDS.1) {
            return;
        }
        self.cells[ux][uy] = true;
        for (dx, dy) in GROW_ORDER {
            self.grow(rng, x + dx, y + dy, level + 1);
        }
    }

    #[must_use]
    pub const fn cells(&self) -> &[[bool; SHAPE_SIZE]; SHAPE_SIZE] {
        &self.cells
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        assert!(x < SHAPE_SIZE && y < SHAPE_SIZE, "cell ({x}, {y}) outside 3x3 grid");
        self.cells[x][y]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied_positions().next().is_none()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.occupied_positions().count()
    }

    /// Returns an iterator of occupied `(x, y)` cells, column by column.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, column)| {
            column
                .iter()
                .enumerate()
                .filter_map(move |(y, &cell)| cell.then_some((x, y)))
        })
    }

    /// Returns the lowest occupied row of column `x`, or `None` if the column is empty.
    #[must_use]
    pub fn lowest_in_column(&self, x: usize) -> Option<usize> {
        assert!(x < SHAPE_SIZE, "column {x} outside 3x3 grid");
        self.cells[x].iter().position(|&cell| cell)
    }

    /// Returns the leftmost and rightmost occupied columns.
    #[must_use]
    pub fn column_span(&self) -> Option<(usize, usize)> {
        let mut occupied = (0..SHAPE_SIZE).filter(|&x| self.cells[x].contains(&true));
        let first = occupied.next()?;
        let last = occupied.last().unwrap_or(first);
        Some((first, last))
    }

    /// Rotates the shape 90° clockwise around its center cell.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        Self::from_cells(reverse_rows(&transpose(&self.cells)))
    }

    /// Rotates the shape 90° counterclockwise around its center cell.
    #[must_use]
    pub fn rotated_counterclockwise(&self) -> Self {
        Self::from_cells(transpose(&reverse_rows(&self.cells)))
    }
}

impl Distribution<Shape> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        Shape::generate(rng)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..SHAPE_SIZE).rev() {
            for x in 0..SHAPE_SIZE {
                f.write_str(if self.cells[x][y] { "#" } else { "." })?;
            }
            if y > 0 {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
