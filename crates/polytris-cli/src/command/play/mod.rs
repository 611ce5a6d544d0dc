use std::path::PathBuf;

use anyhow::Context as _;
use polytris_engine::{ComboRule, GameSession, PieceSeed, SaveFile, SessionConfig};
use rand::Rng as _;
use ratatui_runtime::Runtime;
use tracing::info;

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to the save file holding the high score
    #[clap(long, default_value = SaveFile::DEFAULT_PATH)]
    save_path: PathBuf,
    /// Seed for the piece generator, as 32 hexadecimal digits
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// How the combo counter evolves between locks
    #[clap(long, value_enum, default_value_t = ComboArg::Frozen)]
    combo: ComboArg,
    /// Frames per second
    #[clap(long, default_value_t = 60)]
    fps: u16,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(SaveFile::DEFAULT_PATH),
            seed: None,
            combo: ComboArg::Frozen,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ComboArg {
    /// The combo never grows, every clear scores with multiplier 1
    Frozen,
    /// Consecutive clearing locks grow the combo
    Consecutive,
}

impl From<ComboArg> for ComboRule {
    fn from(arg: ComboArg) -> Self {
        match arg {
            ComboArg::Frozen => ComboRule::Frozen,
            ComboArg::Consecutive => ComboRule::Consecutive,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        save_path,
        seed,
        combo,
        fps,
    } = arg;
    anyhow::ensure!(*fps > 0, "frame rate must be positive");

    let save_file = SaveFile::new(save_path);
    let config = SessionConfig {
        combo_rule: (*combo).into(),
        ..SessionConfig::default()
    };
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let session = GameSession::with_seed(config, seed, save_file.load());

    let mut app = PlayApp::new(session, f64::from(*fps));
    // The score is saved even when the terminal fails mid-game.
    let run_result = Runtime::new().run(&mut app);
    finish_session(app.into_session(), seed, &save_file);
    run_result.context("terminal session failed")
}

/// Ends the session, prints its summary and stores the high score.
///
/// A failed store is only reported, so it never fails the run.
fn finish_session(mut session: GameSession, seed: PieceSeed, save_file: &SaveFile) {
    session.lose();
    let stats = session.stats();
    info!(%seed, score = stats.score(), "session finished");
    println!(
        "Score: {}  Lines: {}  High score: {}",
        stats.score(),
        stats.cleared_lines(),
        session.high_score()
    );

    if let Err(e) = save_file.store(session.save_game()) {
        eprintln!(
            "warning: could not save high score to {}: {e}",
            save_file.path().display()
        );
    }
}
