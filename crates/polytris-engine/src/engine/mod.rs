//! Game flow on top of the core data structures.
//!
//! - [`GameSession`] - Gravity timing, input handling, locking and game over
//! - [`PieceQueue`] - The next/next-next preview queue and its generator
//! - [`GameStats`] - Score, cleared lines and combo counters
//! - [`SaveGame`] / [`SaveFile`] - The high score kept between sessions
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] with the loaded [`SaveGame`]
//! 2. Call [`GameSession::tick`] once per frame with the elapsed time
//! 3. Forward player actions with [`GameSession::handle_input`]
//! 4. Pieces fall, lock after one tick of rest, and clear full rows
//! 5. The session stops when the stack reaches the lose zone or the player quits
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use polytris_engine::{GameInput, GameSession, SaveGame};
//!
//! let mut session = GameSession::new(SaveGame::default());
//!
//! // The first tick brings the next piece onto the board.
//! session.tick(Duration::ZERO);
//! session.handle_input(GameInput::MoveLeft);
//! session.tick(Duration::from_secs(1));
//!
//! assert!(session.state().is_running());
//! ```

pub use self::{game_session::*, game_stats::*, piece_queue::*, save_game::*};

mod game_session;
mod game_stats;
mod piece_queue;
mod save_game;
