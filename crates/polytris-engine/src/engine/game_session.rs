use std::{mem, time::Duration};

use rand::Rng as _;
use tracing::{debug, info};

use crate::core::{Board, CellPosition, Direction, Piece};

use super::{ComboRule, GameStats, PieceQueue, PieceSeed, SaveGame, ScoringRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Running,
    Stopped,
}

/// A discrete player action, fired once per key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameInput {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateClockwise,
    RotateCounterClockwise,
    Quit,
}

/// Tunables of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between two gravity steps.
    pub gravity_interval: Duration,
    pub scoring: ScoringRules,
    pub combo_rule: ComboRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gravity_interval: Duration::from_secs(1),
            scoring: ScoringRules::default(),
            combo_rule: ComboRule::default(),
        }
    }
}

/// A single game from the first piece to game over.
///
/// The session is frame driven: [`tick`](Self::tick) advances gravity by the time
/// elapsed since the previous frame, and [`handle_input`](Self::handle_input) applies
/// player actions independently of the gravity timer.
///
/// A piece that cannot fall is not locked right away. The gravity step that first
/// finds it resting marks it as at bottom, and only the next blocked step locks it,
/// which leaves one interval for sliding it sideways.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    queue: PieceQueue,
    current: Option<Piece>,
    stats: GameStats,
    config: SessionConfig,
    gravity_timer: Duration,
    at_bottom: bool,
    state: SessionState,
    save: SaveGame,
}

impl GameSession {
    /// Cell where a dequeued piece enters the board.
    pub const SPAWN_POSITION: CellPosition = CellPosition::new(4, 17);

    /// Creates a session with the default configuration and a random seed.
    #[must_use]
    pub fn new(save: SaveGame) -> Self {
        Self::with_seed(SessionConfig::default(), rand::rng().random(), save)
    }

    #[must_use]
    pub fn with_seed(config: SessionConfig, seed: PieceSeed, save: SaveGame) -> Self {
        debug!(%seed, "starting session");
        Self {
            board: Board::new(),
            queue: PieceQueue::with_seed(seed),
            current: None,
            stats: GameStats::new(),
            config,
            gravity_timer: config.gravity_interval,
            at_bottom: false,
            state: SessionState::Running,
            save,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the falling piece, or `None` between a lock and the next tick.
    #[must_use]
    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn next_piece(&self) -> &Piece {
        self.queue.next()
    }

    #[must_use]
    pub fn next_next_piece(&self) -> &Piece {
        self.queue.next_next()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.save.high_score()
    }

    #[must_use]
    pub fn save_game(&self) -> &SaveGame {
        &self.save
    }

    /// Returns whether the last gravity step found the falling piece resting.
    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// Advances the session by one frame.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.state.is_stopped() {
            return;
        }
        let Some(piece) = &mut self.current else {
            self.dequeue();
            return;
        };
        piece.correct_side_overlap();

        self.gravity_timer = self.gravity_timer.saturating_sub(elapsed);
        if self.gravity_timer.is_zero() {
            self.apply_gravity();
        }
    }

    fn dequeue(&mut self) {
        let mut piece = self.queue.pop();
        piece.set_position(Self::SPAWN_POSITION);
        debug!(shape = %piece.shape(), "spawning piece");
        self.current = Some(piece);
    }

    fn apply_gravity(&mut self) {
        let Some(piece) = &mut self.current else {
            return;
        };
        let collided = piece.fall(&self.board).is_err();
        // The step that locks a piece scores like any other.
        self.stats.add_gravity_points(&self.config.scoring);
        self.gravity_timer = self.config.gravity_interval;
        if collided && self.at_bottom {
            self.lock_current();
        } else {
            self.at_bottom = collided;
        }
    }

    fn lock_current(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.board.lock_piece(piece);
        let cleared = self.board.clear_lines();
        self.stats
            .complete_piece_lock(cleared, &self.config.scoring, self.config.combo_rule);
        self.at_bottom = false;

        if self.board.reaches_row(Board::LOSE_ROW) {
            self.lose();
            return;
        }
        self.dequeue();
    }

    /// Applies a player action. Ignored once stopped or while no piece is falling.
    pub fn handle_input(&mut self, input: GameInput) {
        if self.state.is_stopped() {
            return;
        }
        match input {
            GameInput::MoveLeft => self.shift_current(Direction::Left),
            GameInput::MoveRight => self.shift_current(Direction::Right),
            GameInput::SoftDrop => {
                if self.current.is_some() {
                    self.gravity_timer = Duration::ZERO;
                }
            }
            GameInput::HardDrop => self.hard_drop_current(),
            GameInput::RotateClockwise => self.rotate_current(Piece::rotated_clockwise),
            GameInput::RotateCounterClockwise => {
                self.rotate_current(Piece::rotated_counterclockwise);
            }
            GameInput::Quit => self.lose(),
        }
    }

    fn shift_current(&mut self, direction: Direction) {
        let Some(piece) = &mut self.current else {
            return;
        };
        // A blocked sideways move leaves the piece in place and still counts as a move.
        let _ = piece.move_toward(&self.board, direction);
        if self.at_bottom {
            self.gravity_timer = self.config.gravity_interval;
        }
    }

    fn hard_drop_current(&mut self) {
        let Some(piece) = &mut self.current else {
            return;
        };
        // The lowest cell of a piece is at most two rows above its anchor.
        let max_rows = piece.position().row() + 2;
        let mut rows = 0;
        for _ in 0..max_rows {
            if piece.fall(&self.board).is_err() {
                break;
            }
            rows += 1;
        }
        debug!(rows, "hard drop");
        self.stats.add_hard_drop_points(rows, &self.config.scoring);
        self.at_bottom = true;
        self.gravity_timer = Duration::ZERO;
    }

    fn rotate_current(&mut self, rotate: fn(Piece, &Board) -> Piece) {
        if let Some(piece) = self.current.take() {
            self.current = Some(rotate(piece, &self.board));
        }
    }

    /// Ends the session and records the final score as a high score candidate.
    ///
    /// Calling this again after the session stopped has no effect.
    pub fn lose(&mut self) {
        if mem::replace(&mut self.state, SessionState::Stopped).is_stopped() {
            return;
        }
        let score = self.stats.score();
        let new_high_score = self.save.record_score(score);
        info!(
            score,
            lines = self.stats.cleared_lines(),
            high_score = self.save.high_score(),
            new_high_score,
            "game over"
        );
    }
}
