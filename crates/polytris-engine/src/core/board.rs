use std::fmt;

use tracing::debug;

use super::piece::{CellPosition, Piece};

const FULL_ROW_MASK: u16 = (1 << Board::WIDTH) - 1;

/// One row of locked cells as a bitmask.
///
/// Bit `n` is set when column `n` holds a locked cell. Only the low
/// [`Board::WIDTH`] bits are used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow {
    bits: u16,
}

impl BoardRow {
    pub const EMPTY: Self = Self { bits: 0 };

    #[inline]
    #[must_use]
    pub fn is_full(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub fn is_occupied(self, col: usize) -> bool {
        self.bits & (1 << col) != 0
    }

    #[inline]
    fn occupy(&mut self, col: usize) {
        self.bits |= 1 << col;
    }

    /// Returns the number of locked cells in this row.
    #[inline]
    #[must_use]
    pub fn len(self) -> u32 {
        self.bits.count_ones()
    }
}

/// The playfield: every unit cell locked so far.
///
/// Rows are stored bottom-up and grow on demand, so cells may be locked above the
/// visible area. Anything outside `0..WIDTH` horizontally or below row 0 counts as
/// wall for collision queries.
///
/// # Example
///
/// ```
/// use polytris_engine::{Board, CellPosition};
///
/// let mut board = Board::new();
/// for col in 0..Board::WIDTH {
///     board.lock_cell(CellPosition::new(col, 0));
/// }
/// board.lock_cell(CellPosition::new(3, 1));
///
/// assert!(board.is_row_full(0));
/// assert_eq!(board.clear_lines(), 1);
/// assert!(board.is_occupied(CellPosition::new(3, 0)));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Board {
    rows: Vec<BoardRow>,
}

impl Board {
    /// Number of columns in every row.
    pub const WIDTH: i32 = 10;
    /// Number of rows shown to the player.
    pub const VISIBLE_HEIGHT: i32 = 20;
    /// Locking a cell at or above this row ends the game.
    pub const LOSE_ROW: i32 = 18;
    /// [`Self::WIDTH`] as an array length.
    pub const COLUMNS: usize = 10;
    /// [`Self::VISIBLE_HEIGHT`] as an array length.
    pub const VISIBLE_ROWS: usize = 20;

    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    fn row(&self, row: i32) -> BoardRow {
        usize::try_from(row)
            .ok()
            .and_then(|row| self.rows.get(row).copied())
            .unwrap_or(BoardRow::EMPTY)
    }

    /// Returns the stored rows, bottom row first.
    #[must_use]
    pub fn rows(&self) -> &[BoardRow] {
        &self.rows
    }

    /// Returns the number of stored rows; every row at or above it is empty.
    #[must_use]
    pub fn stack_height(&self) -> i32 {
        i32::try_from(self.rows.len()).expect("board height fits in i32")
    }

    #[must_use]
    pub fn is_inside(cell: CellPosition) -> bool {
        (0..Self::WIDTH).contains(&cell.col()) && cell.row() >= 0
    }

    /// Returns whether a locked cell occupies `cell`.
    #[must_use]
    pub fn is_occupied(&self, cell: CellPosition) -> bool {
        Self::is_inside(cell) && self.row(cell.row()).is_occupied(column_index(cell.col()))
    }

    /// Returns whether `cell` is a wall, the floor, or a locked cell.
    #[must_use]
    pub fn is_blocked(&self, cell: CellPosition) -> bool {
        !Self::is_inside(cell) || self.is_occupied(cell)
    }

    /// Locks a single unit cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` lies inside a wall or below the floor.
    pub fn lock_cell(&mut self, cell: CellPosition) {
        assert!(Self::is_inside(cell), "cannot lock {cell:?} outside the board");
        let row = usize::try_from(cell.row()).expect("row checked non-negative");
        if self.rows.len() <= row {
            self.rows.resize(row + 1, BoardRow::EMPTY);
        }
        self.rows[row].occupy(column_index(cell.col()));
    }

    /// Breaks `piece` into unit cells and locks each of them.
    pub fn lock_piece(&mut self, piece: Piece) {
        let cells = piece.into_cells();
        debug!(cells = cells.len(), "locking piece");
        for cell in cells {
            self.lock_cell(cell);
        }
    }

    /// Returns whether all [`Board::WIDTH`] columns of `row` hold locked cells.
    #[must_use]
    pub fn is_row_full(&self, row: i32) -> bool {
        self.row(row).is_full()
    }

    /// Clears every full row and returns how many were cleared.
    ///
    /// Rows are scanned bottom to top. When a row is cleared, every row above it moves
    /// down by one and the same row index is checked again, so stacked full rows all
    /// collapse in a single pass.
    pub fn clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = 0;
        while row < self.rows.len() {
            if self.rows[row].is_full() {
                self.rows.remove(row);
                cleared += 1;
                continue;
            }
            row += 1;
        }
        while self.rows.last().is_some_and(|row| row.is_empty()) {
            self.rows.pop();
        }
        if cleared > 0 {
            debug!(cleared, "cleared lines");
        }
        cleared
    }

    /// Returns whether any locked cell sits at or above `row`.
    #[must_use]
    pub fn reaches_row(&self, row: i32) -> bool {
        let start = usize::try_from(row).unwrap_or(0);
        self.rows.iter().skip(start).any(|row| !row.is_empty())
    }

    /// Returns an iterator of every locked cell, bottom row first.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellPosition> + '_ {
        self.rows.iter().zip(0..).flat_map(|(row, y)| {
            (0..Self::WIDTH)
                .filter(move |&col| row.is_occupied(column_index(col)))
                .map(move |col| CellPosition::new(col, y))
        })
    }

    /// Builds a board from text rows, top row first; `#` marks a locked cell.
    #[cfg(test)]
    pub(crate) fn parse(rows: &[&str]) -> Self {
        let mut board = Self::new();
        for (line, text) in rows.iter().rev().enumerate() {
            assert_eq!(text.len(), 10, "board row must be 10 cells wide");
            for (col, ch) in text.chars().enumerate() {
                if ch == '#' {
                    board.lock_cell(CellPosition::new(
                        i32::try_from(col).unwrap(),
                        i32::try_from(line).unwrap(),
                    ));
                }
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().rev().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for col in 0..Self::WIDTH {
                f.write_str(if row.is_occupied(column_index(col)) { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

fn column_index(col: i32) -> usize {
    usize::try_from(col).expect("column checked inside the board")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::Shape;

    #[test]
    fn test_empty_board_queries() {
        let board = Board::new();
        assert_eq!(board.stack_height(), 0);
        assert!(!board.is_occupied(CellPosition::new(0, 0)));
        assert!(!board.is_blocked(CellPosition::new(0, 0)));
        assert!(board.is_blocked(CellPosition::new(-1, 5)));
        assert!(board.is_blocked(CellPosition::new(Board::WIDTH, 5)));
        assert!(board.is_blocked(CellPosition::new(4, -1)));
        assert!(!board.is_blocked(CellPosition::new(4, 100)));
        assert!(!board.is_row_full(0));
        assert!(!board.is_row_full(-3));
    }

    #[test]
    fn test_array_lengths_match_dimensions() {
        assert_eq!(usize::try_from(Board::WIDTH), Ok(Board::COLUMNS));
        assert_eq!(usize::try_from(Board::VISIBLE_HEIGHT), Ok(Board::VISIBLE_ROWS));
    }

    #[test]
    fn test_lock_piece_places_cells() {
        let mut board = Board::new();
        let piece = Piece::new(Shape::from_rows(["...", "##.", ".#."]), CellPosition::new(2, 0));
        board.lock_piece(piece);
        assert_eq!(board.to_string(), "..##......\n...#......");
        assert_eq!(board.occupied_cells().count(), 3);
    }

    #[test]
    #[should_panic(expected = "outside the board")]
    fn test_lock_cell_in_wall_panics() {
        Board::new().lock_cell(CellPosition::new(-1, 0));
    }

    #[test]
    fn test_single_full_row_shifts_rows_above() {
        let mut board = Board::parse(&[
            ".#........",
            "#.#.......",
            "##########",
            "#.........",
            "#.........",
            "#.........",
        ]);
        assert!(board.is_row_full(3));
        assert!(!board.is_row_full(2));

        assert_eq!(board.clear_lines(), 1);
        assert!(!board.is_row_full(3));
        assert_eq!(
            board.to_string(),
            [".#........", "#.#.......", "#.........", "#.........", "#........."].join("\n")
        );
        assert!(board.is_occupied(CellPosition::new(0, 3)));
        assert!(board.is_occupied(CellPosition::new(1, 4)));
    }

    #[test]
    fn test_two_stacked_full_rows_leave_board_empty() {
        let mut board = Board::parse(&["##########", "##########"]);
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board.stack_height(), 0);
        assert_eq!(board.occupied_cells().count(), 0);
    }

    #[test]
    fn test_separated_full_rows_are_all_cleared() {
        let mut board = Board::parse(&[
            "..#.......",
            "##########",
            "#.#.#.#.#.",
            "##########",
            "##########",
            ".#.#.#.#.#",
        ]);
        assert_eq!(board.clear_lines(), 3);
        assert_eq!(
            board.to_string(),
            ["..#.......", "#.#.#.#.#.", ".#.#.#.#.#"].join("\n")
        );
    }

    #[test]
    fn test_partial_row_is_kept() {
        let mut board = Board::parse(&["#########."]);
        assert_eq!(board.rows()[0].len(), 9);
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board.stack_height(), 1);
    }

    #[test]
    fn test_reaches_row() {
        let mut board = Board::new();
        board.lock_cell(CellPosition::new(0, 5));
        assert!(board.reaches_row(0));
        assert!(board.reaches_row(5));
        assert!(!board.reaches_row(6));
        assert!(!board.reaches_row(Board::LOSE_ROW));
    }
}
