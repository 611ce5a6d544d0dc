use std::iter;

use polytris_engine::{Board, CellPosition, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{CellDisplay, CellKind};

const COLUMNS: usize = Board::COLUMNS;
const ROWS: usize = Board::VISIBLE_ROWS;

/// The visible part of the board with the falling piece drawn over it.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    falling_piece: Option<&'a Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            falling_piece: None,
            block: None,
        }
    }

    pub fn falling_piece(self, piece: Option<&'a Piece>) -> Self {
        Self {
            falling_piece: piece,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        cell_count(COLUMNS) * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        cell_count(ROWS) * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Returns the cell grid to draw, top row first.
    fn cells(&self) -> [[CellKind; COLUMNS]; ROWS] {
        let mut cells = [[CellKind::Empty; COLUMNS]; ROWS];
        let mut set = |cell: CellPosition, kind| {
            let col = usize::try_from(cell.col()).ok().filter(|&c| c < COLUMNS);
            let row = usize::try_from(cell.row()).ok().filter(|&r| r < ROWS);
            if let (Some(col), Some(row)) = (col, row) {
                cells[ROWS - 1 - row][col] = kind;
            }
        };
        for cell in self.board.occupied_cells() {
            set(cell, CellKind::Locked);
        }
        for cell in self.falling_piece.into_iter().flat_map(|piece| piece.occupied_cells()) {
            set(cell, CellKind::Falling);
        }
        cells
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..COLUMNS).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..ROWS).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<ROWS>(&vertical)
            .into_iter()
            .map(|row| row.layout::<COLUMNS>(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.cells()) {
            for (grid_cell, kind) in iter::zip(grid_row, row) {
                CellDisplay::from_kind(kind, true).render(grid_cell, buf);
            }
        }
    }
}

fn cell_count(len: usize) -> u16 {
    u16::try_from(len).expect("board dimension fits in u16")
}
