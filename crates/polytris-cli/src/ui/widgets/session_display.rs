use polytris_engine::{GameSession, SessionState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Color,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{BoardDisplay, ShapeDisplay, StatsDisplay, color, style};

/// Board, previews and stats of a session laid out side by side.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self { session }
    }

    fn panel(title: &str, border: Color) -> Block<'_> {
        Block::bordered()
            .title(Line::from(title).centered())
            .padding(Padding::horizontal(1))
            .border_style(border)
            .style(style::DEFAULT)
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = match self.session.state() {
            SessionState::Running => color::WHITE,
            SessionState::Stopped => color::RED,
        };

        let board = BoardDisplay::new(self.session.board())
            .falling_piece(self.session.current_piece())
            .block(Block::bordered().border_style(border).style(style::DEFAULT));
        let next = ShapeDisplay::new(*self.session.next_piece().shape())
            .block(Self::panel("NEXT", border));
        let next_next = ShapeDisplay::new(*self.session.next_next_piece().shape())
            .block(Self::panel("AFTER", border));
        let stats = StatsDisplay::new(self.session).block(Self::panel("STATS", border));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(board.width()),
            Constraint::Length(next.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] = Layout::vertical([Constraint::Length(board.height())]).areas(center_column);
        let [next_area, next_next_area] = Layout::vertical([
            Constraint::Length(next.height()),
            Constraint::Length(next_next.height()),
        ])
        .areas(right_column);

        let board_width = board.width();
        stats.render(stats_area, buf);
        board.render(board_area, buf);
        next.render(next_area, buf);
        next_next.render(next_next_area, buf);

        if self.session.state().is_stopped() {
            let text = Text::from(vec![
                Line::from("GAME OVER!!"),
                Line::from(format!("HIGH SCORE {}", self.session.high_score())),
            ])
            .style(style::GAME_OVER)
            .centered();
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(4));
            let block = Block::new().style(style::GAME_OVER);
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(2)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use polytris_engine::{SaveGame, SessionConfig};

    use super::*;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_game_over_popup_shows_high_score() {
        let seed = "00000000000000000000000000000001".parse().unwrap();
        let mut session = GameSession::with_seed(SessionConfig::default(), seed, SaveGame::new());
        session.tick(std::time::Duration::ZERO);

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        SessionDisplay::new(&session).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("NEXT"));
        assert!(text.contains("SCORE"));
        assert!(!text.contains("GAME OVER"));

        session.lose();
        let mut buf = Buffer::empty(area);
        SessionDisplay::new(&session).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("GAME OVER!!"));
        assert!(text.contains("HIGH SCORE 0"));
    }
}
