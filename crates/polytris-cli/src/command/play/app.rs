use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use polytris_engine::{GameInput, GameSession};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use ratatui_runtime::{App, Runtime};

use crate::ui::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay};

const RUNNING_KEYS: &[KeyBinding<'static>] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["Space"], "Hard Drop"),
    (&["X", "↑"], "Rotate CW"),
    (&["Z", "/"], "Rotate CCW"),
    (&["Q", "Esc"], "Quit"),
];

const STOPPED_KEYS: &[KeyBinding<'static>] = &[(&["Q", "Esc"], "Quit")];

#[derive(Debug)]
pub(crate) struct PlayApp {
    session: GameSession,
    frame_rate: f64,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(session: GameSession, frame_rate: f64) -> Self {
        Self {
            session,
            frame_rate,
            is_exiting: false,
        }
    }

    pub(crate) fn into_session(self) -> GameSession {
        self.session
    }

    fn handle_key(&mut self, event: KeyEvent) {
        // Repeats and releases are ignored so each press fires exactly once.
        if event.kind != KeyEventKind::Press {
            return;
        }
        if self.session.state().is_stopped() {
            if matches!(event.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.is_exiting = true;
            }
            return;
        }
        if let Some(input) = input_for_key(event.code) {
            self.session.handle_input(input);
        }
    }
}

/// Maps a pressed key to the game action bound to it.
fn input_for_key(code: KeyCode) -> Option<GameInput> {
    let input = match code {
        KeyCode::Left => GameInput::MoveLeft,
        KeyCode::Right => GameInput::MoveRight,
        KeyCode::Down => GameInput::SoftDrop,
        KeyCode::Char(' ') => GameInput::HardDrop,
        KeyCode::Up | KeyCode::Char('x') => GameInput::RotateClockwise,
        KeyCode::Char('z' | '/') => GameInput::RotateCounterClockwise,
        KeyCode::Char('q') | KeyCode::Esc => GameInput::Quit,
        _ => return None,
    };
    Some(input)
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_frame_rate(self.frame_rate);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        if let Some(event) = event.as_key_event() {
            self.handle_key(event);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let bindings = if self.session.state().is_running() {
            RUNNING_KEYS
        } else {
            STOPPED_KEYS
        };
        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(24), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(SessionDisplay::new(&self.session), main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, elapsed: Duration) {
        self.session.tick(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, KeyModifiers};
    use polytris_engine::{PieceSeed, SaveGame, SessionConfig};

    use super::*;

    fn app() -> PlayApp {
        let seed: PieceSeed = "0f0e0d0c0b0a09080706050403020100".parse().unwrap();
        let session = GameSession::with_seed(SessionConfig::default(), seed, SaveGame::new());
        PlayApp::new(session, 60.0)
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_key_map() {
        assert_eq!(input_for_key(KeyCode::Left), Some(GameInput::MoveLeft));
        assert_eq!(input_for_key(KeyCode::Right), Some(GameInput::MoveRight));
        assert_eq!(input_for_key(KeyCode::Down), Some(GameInput::SoftDrop));
        assert_eq!(input_for_key(KeyCode::Char(' ')), Some(GameInput::HardDrop));
        assert_eq!(input_for_key(KeyCode::Up), Some(GameInput::RotateClockwise));
        assert_eq!(input_for_key(KeyCode::Char('x')), Some(GameInput::RotateClockwise));
        assert_eq!(
            input_for_key(KeyCode::Char('/')),
            Some(GameInput::RotateCounterClockwise)
        );
        assert_eq!(input_for_key(KeyCode::Esc), Some(GameInput::Quit));
        assert_eq!(input_for_key(KeyCode::Char('p')), None);
    }

    #[test]
    fn test_only_presses_reach_session() {
        let mut app = app();
        app.update(&mut Runtime::new(), Duration::ZERO);
        let spawn = app.session.current_piece().unwrap().position();

        app.handle_key(key(KeyCode::Left, KeyEventKind::Release));
        app.handle_key(key(KeyCode::Left, KeyEventKind::Repeat));
        assert_eq!(app.session.current_piece().unwrap().position(), spawn);

        app.handle_key(key(KeyCode::Left, KeyEventKind::Press));
        assert_eq!(
            app.session.current_piece().unwrap().position().col(),
            spawn.col() - 1
        );
    }

    #[test]
    fn test_quit_stops_then_exits() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('q'), KeyEventKind::Press));
        assert!(app.session.state().is_stopped());
        assert!(!app.should_exit());

        app.handle_key(key(KeyCode::Char('q'), KeyEventKind::Press));
        assert!(app.should_exit());
    }
}
