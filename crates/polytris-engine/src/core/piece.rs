use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::PieceCollisionError;

use super::{
    board::Board,
    shape::{SHAPE_SIZE, Shape},
};

/// Integer cell coordinate on the board.
///
/// One cell is half a world unit. Columns grow rightward from the left wall,
/// rows grow upward from the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    col: i32,
    row: i32,
}

impl CellPosition {
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn row(self) -> i32 {
        self.row
    }

    #[must_use]
    pub const fn offset(self, dcol: i32, drow: i32) -> Self {
        Self::new(self.col + dcol, self.row + drow)
    }

    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dcol, drow) = direction.delta();
        self.offset(dcol, drow)
    }
}

/// Direction a falling piece can be moved in.
///
/// Moving without an explicit direction means moving [`Direction::Down`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the `(column, row)` unit step of this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Converts a raw movement vector into a direction.
    ///
    /// Only the three unit vectors are accepted. Zero-length, diagonal, upward or
    /// longer vectors yield `None`.
    ///
    /// ```
    /// use polytris_engine::Direction;
    ///
    /// assert_eq!(Direction::from_vector(-1, 0), Some(Direction::Left));
    /// assert_eq!(Direction::from_vector(1, -1), None);
    /// assert_eq!(Direction::from_vector(0, 0), None);
    /// ```
    #[must_use]
    pub const fn from_vector(dcol: i32, drow: i32) -> Option<Self> {
        match (dcol, drow) {
            (0, -1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A falling piece: a [`Shape`] anchored at the lower-left cell of its 3×3 grid.
///
/// Movement is resolved with one probe per grid column, placed on the lowest occupied
/// cell of that column. A move is blocked when any probe would step into a wall, the
/// floor, or a locked cell.
///
/// Rotation does not mutate a piece; it yields a new piece that corrects its own
/// placement, and the caller replaces its reference with it.
///
/// # Example
///
/// ```
/// use polytris_engine::{Board, CellPosition, Direction, Piece, Shape};
///
/// let board = Board::new();
/// let mut piece = Piece::new(Shape::from_rows(["...", "###", "..."]), CellPosition::new(4, 5));
///
/// assert!(piece.move_toward(&board, Direction::Left).is_ok());
/// assert_eq!(piece.position(), CellPosition::new(3, 5));
///
/// let piece = piece.rotated_clockwise(&board);
/// assert_eq!(piece.shape(), &Shape::from_rows([".#.", ".#.", ".#."]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    shape: Shape,
    position: CellPosition,
    probes: [Option<u8>; SHAPE_SIZE],
    min_col: i32,
    max_col: i32,
}

impl Piece {
    /// Creates a piece exactly where it is asked to be, without correcting its position.
    #[must_use]
    pub fn new(shape: Shape, position: CellPosition) -> Self {
        let mut probes = [None; SHAPE_SIZE];
        for (x, probe) in probes.iter_mut().enumerate() {
            *probe = shape
                .lowest_in_column(x)
                .map(|y| u8::try_from(y).expect("grid row fits in u8"));
        }

        // A shape without cells is treated as if only its center column were occupied.
        let (left, right) = shape.column_span().unwrap_or((1, 1));
        let min_col = -grid_offset(left);
        let max_col = Board::WIDTH - 1 - grid_offset(right);

        Self {
            shape,
            position,
            probes,
            min_col,
            max_col,
        }
    }

    /// Creates a piece and corrects its position against `board`.
    ///
    /// The piece is first clamped into the legal column range, then lifted one row at a
    /// time while any of its probes would collide on the next downward step.
    #[must_use]
    pub fn corrected(shape: Shape, position: CellPosition, board: &Board) -> Self {
        let mut piece = Self::new(shape, position);
        piece.clamp_horizontally();
        piece.lift_clear_of(board);
        piece
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> CellPosition {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: CellPosition) {
        self.position = position;
    }

    /// Returns the legal range of anchor columns for this shape.
    #[must_use]
    pub fn column_range(&self) -> (i32, i32) {
        (self.min_col, self.max_col)
    }

    /// Returns the board cell of each column probe, or `None` for an empty column.
    #[must_use]
    pub fn probe_cells(&self) -> [Option<CellPosition>; SHAPE_SIZE] {
        let mut cells = [None; SHAPE_SIZE];
        for (x, (cell, probe)) in cells.iter_mut().zip(self.probes).enumerate() {
            *cell = probe.map(|y| self.position.offset(grid_offset(x), i32::from(y)));
        }
        cells
    }

    /// Returns an iterator of the board cells this piece occupies.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellPosition> + '_ {
        self.shape
            .occupied_positions()
            .map(|(x, y)| self.position.offset(grid_offset(x), grid_offset(y)))
    }

    /// Moves the piece one cell in `direction` unless a probe is blocked.
    ///
    /// A blocked move leaves the piece where it was, so repeating it keeps failing.
    pub fn move_toward(
        &mut self,
        board: &Board,
        direction: Direction,
    ) -> Result<(), PieceCollisionError> {
        let blocked = self
            .probe_cells()
            .into_iter()
            .flatten()
            .any(|cell| board.is_blocked(cell.step(direction)));
        if blocked {
            return Err(PieceCollisionError);
        }
        self.force_move(direction);
        Ok(())
    }

    /// Moves the piece one row down; equivalent to `move_toward(board, Direction::Down)`.
    pub fn fall(&mut self, board: &Board) -> Result<(), PieceCollisionError> {
        self.move_toward(board, Direction::default())
    }

    fn force_move(&mut self, direction: Direction) {
        self.position = self.position.step(direction);
    }

    #[must_use]
    pub fn rotated_clockwise(self, board: &Board) -> Self {
        Self::corrected(self.shape.rotated_clockwise(), self.position, board)
    }

    #[must_use]
    pub fn rotated_counterclockwise(self, board: &Board) -> Self {
        Self::corrected(self.shape.rotated_counterclockwise(), self.position, board)
    }

    fn clamp_horizontally(&mut self) {
        let col = self.position.col().clamp(self.min_col, self.max_col);
        self.position = CellPosition::new(col, self.position.row());
    }

    fn is_resting(&self, board: &Board) -> bool {
        self.probe_cells()
            .into_iter()
            .flatten()
            .any(|cell| board.is_blocked(cell.step(Direction::Down)))
    }

    fn lift_clear_of(&mut self, board: &Board) {
        // Once every probe is above the stack nothing can block a fall.
        let max_lift =
            (board.stack_height() - self.position.row()).max(0) + grid_offset(SHAPE_SIZE);
        for _ in 0..max_lift {
            if !self.is_resting(board) {
                break;
            }
            self.position = self.position.offset(0, 1);
        }
    }

    /// Returns whether any cell of this piece lies beyond a side wall.
    #[must_use]
    pub fn overlaps_side_walls(&self) -> bool {
        self.occupied_cells()
            .any(|cell| !(0..Board::WIDTH).contains(&cell.col()))
    }

    /// Nudges the piece one column toward the board center if it overlaps a side wall.
    ///
    /// Returns whether the piece was nudged. Callers repeat this every tick while the
    /// overlap lasts.
    pub fn correct_side_overlap(&mut self) -> bool {
        if !self.overlaps_side_walls() {
            return false;
        }
        if self.position.col() < Board::WIDTH / 2 {
            self.force_move(Direction::Right);
        } else {
            self.force_move(Direction::Left);
        }
        true
    }

    /// Breaks the piece into the unit cells it occupies, consuming it.
    #[must_use]
    pub fn into_cells(self) -> ArrayVec<CellPosition, { SHAPE_SIZE * SHAPE_SIZE }> {
        self.occupied_cells().collect()
    }
}

fn grid_offset(index: usize) -> i32 {
    i32::try_from(index).expect("grid index fits in i32")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> Shape {
        Shape::from_rows(["...", "###", "..."])
    }

    #[test]
    fn test_probes_mark_lowest_cell_per_column() {
        let piece = Piece::new(
            Shape::from_rows(["#..", ".##", ".#."]),
            CellPosition::new(2, 3),
        );
        assert_eq!(
            piece.probe_cells(),
            [
                Some(CellPosition::new(2, 5)),
                Some(CellPosition::new(3, 3)),
                Some(CellPosition::new(4, 4)),
            ]
        );

        let piece = Piece::new(Shape::from_rows(["...", ".#.", "..."]), CellPosition::new(0, 0));
        assert_eq!(
            piece.probe_cells(),
            [None, Some(CellPosition::new(1, 1)), None]
        );
    }

    #[test]
    fn test_column_range_depends_on_edge_columns() {
        let center = Piece::new(Shape::from_rows(["...", ".#.", "..."]), CellPosition::new(4, 0));
        assert_eq!(center.column_range(), (-1, 8));

        let wide = Piece::new(bar(), CellPosition::new(4, 0));
        assert_eq!(wide.column_range(), (0, 7));
    }

    #[test]
    fn test_move_shifts_one_cell() {
        let board = Board::new();
        let mut piece = Piece::new(bar(), CellPosition::new(4, 5));

        assert!(piece.move_toward(&board, Direction::Right).is_ok());
        assert_eq!(piece.position(), CellPosition::new(5, 5));
        assert!(piece.fall(&board).is_ok());
        assert_eq!(piece.position(), CellPosition::new(5, 4));
    }

    #[test]
    fn test_blocked_move_is_idempotent() {
        let board = Board::new();
        let mut piece = Piece::new(bar(), CellPosition::new(4, 5));
        while piece.move_toward(&board, Direction::Left).is_ok() {}
        assert_eq!(piece.position(), CellPosition::new(0, 5));

        for _ in 0..5 {
            assert!(piece.move_toward(&board, Direction::Left).is_err());
            assert_eq!(piece.position(), CellPosition::new(0, 5));
        }
    }

    #[test]
    fn test_empty_edge_column_can_enter_wall_column() {
        let board = Board::new();
        let mut piece = Piece::new(Shape::from_rows([".#.", ".#.", ".#."]), CellPosition::new(1, 5));
        assert!(piece.move_toward(&board, Direction::Left).is_ok());
        assert_eq!(piece.position(), CellPosition::new(0, 5));
        assert!(piece.move_toward(&board, Direction::Left).is_ok());
        assert_eq!(piece.position(), CellPosition::new(-1, 5));
        assert!(piece.move_toward(&board, Direction::Left).is_err());
        assert!(!piece.overlaps_side_walls());
    }

    #[test]
    fn test_fall_stops_on_floor_and_locked_cells() {
        let mut board = Board::new();
        let mut piece = Piece::new(bar(), CellPosition::new(0, 0));
        // The bar sits on grid row 1, so it can fall one more row to the floor.
        assert!(piece.fall(&board).is_ok());
        assert!(piece.fall(&board).is_err());
        assert_eq!(piece.position(), CellPosition::new(0, -1));

        board.lock_cell(CellPosition::new(5, 0));
        let mut piece = Piece::new(bar(), CellPosition::new(4, 1));
        assert!(piece.fall(&board).is_ok());
        assert!(piece.fall(&board).is_err());
        assert_eq!(piece.position(), CellPosition::new(4, 0));
    }

    #[test]
    fn test_only_lowest_cells_probe_sideways() {
        let mut board = Board::new();
        board.lock_cell(CellPosition::new(3, 7));
        let mut piece = Piece::new(
            Shape::from_rows(["#..", "#..", ".#."]),
            CellPosition::new(4, 5),
        );
        // The upper cell of column 0 is not a probe, so the move is allowed.
        assert!(piece.move_toward(&board, Direction::Left).is_ok());

        board.lock_cell(CellPosition::new(2, 6));
        assert!(piece.move_toward(&board, Direction::Left).is_err());
    }

    #[test]
    fn test_rotation_keeps_position_in_open_space() {
        let board = Board::new();
        let piece = Piece::new(bar(), CellPosition::new(4, 10));
        let rotated = piece.rotated_clockwise(&board);
        assert_eq!(rotated.position(), CellPosition::new(4, 10));
        assert_eq!(rotated.shape(), &Shape::from_rows([".#.", ".#.", ".#."]));

        let back = rotated.rotated_counterclockwise(&board);
        assert_eq!(back.shape(), &bar());
    }

    #[test]
    fn test_rotation_near_wall_is_clamped() {
        let board = Board::new();
        let piece = Piece::new(Shape::from_rows([".#.", ".#.", ".#."]), CellPosition::new(-1, 10));
        let rotated = piece.rotated_clockwise(&board);
        assert_eq!(rotated.position(), CellPosition::new(0, 10));
        assert!(!rotated.overlaps_side_walls());

        let piece = Piece::new(Shape::from_rows([".#.", ".#.", ".#."]), CellPosition::new(8, 10));
        let rotated = piece.rotated_counterclockwise(&board);
        assert_eq!(rotated.position(), CellPosition::new(7, 10));
    }

    #[test]
    fn test_rotation_into_locked_cells_lifts_piece() {
        let mut board = Board::new();
        for col in 0..Board::WIDTH {
            board.lock_cell(CellPosition::new(col, 0));
        }
        // Rotating swings the bar onto grid row 0, which lies in the floor and the stack.
        let piece = Piece::new(Shape::from_rows(["#..", "#..", "#.."]), CellPosition::new(4, -1));
        let rotated = piece.rotated_counterclockwise(&board);
        assert_eq!(rotated.shape(), &Shape::from_rows(["...", "...", "###"]));
        assert_eq!(rotated.position(), CellPosition::new(4, 2));
        assert!(rotated.occupied_cells().all(|cell| !board.is_blocked(cell)));
        assert!(rotated.clone().fall(&board).is_ok());

        // A piece dug below the floor is lifted until it could fall again.
        let sunk = Piece::corrected(bar(), CellPosition::new(4, -3), &Board::new());
        assert_eq!(sunk.position(), CellPosition::new(4, 0));
    }

    #[test]
    fn test_rotation_lifts_piece_resting_on_floor() {
        let board = Board::new();
        let mut piece = Piece::new(Shape::from_rows(["...", ".#.", "..."]), CellPosition::new(4, -1));
        assert!(piece.fall(&board).is_err());

        let mut rotated = piece.rotated_clockwise(&board);
        assert_eq!(rotated.position(), CellPosition::new(4, 0));
        assert!(rotated.fall(&board).is_ok());
    }

    #[test]
    fn test_rotation_lifts_piece_resting_on_stack() {
        let mut board = Board::new();
        board.lock_cell(CellPosition::new(5, 0));
        board.lock_cell(CellPosition::new(5, 1));
        let piece = Piece::new(bar(), CellPosition::new(4, 1));
        assert!(piece.clone().fall(&board).is_err());

        let rotated = piece.rotated_clockwise(&board);
        assert_eq!(rotated.shape(), &Shape::from_rows([".#.", ".#.", ".#."]));
        // The center column probe climbs past both locked cells.
        assert_eq!(rotated.position(), CellPosition::new(4, 3));
    }

    #[test]
    fn test_side_overlap_nudges_toward_center() {
        let mut left = Piece::new(bar(), CellPosition::new(-2, 5));
        assert!(left.correct_side_overlap());
        assert_eq!(left.position(), CellPosition::new(-1, 5));
        assert!(left.correct_side_overlap());
        assert!(!left.correct_side_overlap());
        assert_eq!(left.position(), CellPosition::new(0, 5));

        let mut right = Piece::new(bar(), CellPosition::new(8, 5));
        assert!(right.correct_side_overlap());
        assert_eq!(right.position(), CellPosition::new(7, 5));
        assert!(!right.correct_side_overlap());
    }

    #[test]
    fn test_into_cells_covers_occupied_grid() {
        let piece = Piece::new(
            Shape::from_rows(["#..", "##.", ".#."]),
            CellPosition::new(3, 2),
        );
        let mut cells = piece.into_cells().into_iter().collect::<Vec<_>>();
        cells.sort_by_key(|cell| (cell.row(), cell.col()));
        assert_eq!(
            cells,
            [
                CellPosition::new(4, 2),
                CellPosition::new(3, 3),
                CellPosition::new(4, 3),
                CellPosition::new(3, 4),
            ]
        );
    }

    #[test]
    fn test_direction_from_vector_rejects_malformed() {
        assert_eq!(Direction::from_vector(0, -1), Some(Direction::Down));
        assert_eq!(Direction::from_vector(1, 0), Some(Direction::Right));
        assert_eq!(Direction::from_vector(0, 1), None);
        assert_eq!(Direction::from_vector(-1, -1), None);
        assert_eq!(Direction::from_vector(2, 0), None);
        assert_eq!(Direction::from_vector(0, 0), None);
        assert!(Direction::default().is_down());
    }
}
