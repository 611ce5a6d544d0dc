use polytris_engine::GameSession;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

/// Score, high score and counters of a session, one labelled value per line.
pub struct StatsDisplay<'a> {
    session: &'a GameSession,
    block: Option<BlockWidget<'a>>,
}

const LINE_COUNT: usize = 5;

impl<'a> StatsDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        18 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        5 + super::block_vertical_margin(self.block.as_ref())
    }

    fn entries(&self) -> [(&'static str, u64); LINE_COUNT] {
        let stats = self.session.stats();
        // The stored high score only catches up when the session ends.
        let high_score = self.session.high_score().max(stats.score());
        [
            ("SCORE", stats.score()),
            ("HIGH", high_score),
            ("LINES", stats.cleared_lines()),
            ("COMBO", stats.combo()),
            ("PIECES", stats.completed_pieces()),
        ]
    }
}

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let rows = area.layout::<LINE_COUNT>(&Layout::vertical(
            [Constraint::Length(1); LINE_COUNT],
        ));
        for (row, (label, value)) in rows.into_iter().zip(self.entries()) {
            let [label_area, value_area] =
                row.layout(&Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]));
            Line::styled(label, style::DEFAULT)
                .left_aligned()
                .render(label_area, buf);
            Line::styled(value.to_string(), style::DEFAULT)
                .right_aligned()
                .render(value_area, buf);
        }
    }
}
