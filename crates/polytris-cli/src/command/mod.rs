use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging;

use self::{high_score::HighScoreArg, play::PlayArg};

mod high_score;
mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Write logs to this file
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a game in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Print the stored high score
    HighScore(#[clap(flatten)] HighScoreArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    if let Some(path) = &args.log_file {
        logging::init(path)?;
    }
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::HighScore(arg) => high_score::run(&arg),
    }
    Ok(())
}
