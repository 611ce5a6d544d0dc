use polytris_engine::{SHAPE_SIZE, Shape};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{CellDisplay, CellKind};

/// Preview of a queued piece's 3×3 grid.
#[derive(Debug)]
pub struct ShapeDisplay<'a> {
    shape: Shape,
    block: Option<BlockWidget<'a>>,
}

impl<'a> ShapeDisplay<'a> {
    pub fn new(shape: Shape) -> Self {
        Self { shape, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        3 * CellDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        3 * CellDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for ShapeDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &ShapeDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..SHAPE_SIZE).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..SHAPE_SIZE).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints).flex(Flex::Center);

        // Screen rows go down while grid rows go up.
        let grid_rows = area.layout::<SHAPE_SIZE>(&vertical).into_iter().rev();
        for (y, grid_row) in grid_rows.enumerate() {
            for (x, grid_cell) in grid_row.layout::<SHAPE_SIZE>(&horizontal).into_iter().enumerate() {
                let kind = if self.shape.is_occupied(x, y) {
                    CellKind::Falling
                } else {
                    CellKind::Empty
                };
                CellDisplay::from_kind(kind, false).render(grid_cell, buf);
            }
        }
    }
}
