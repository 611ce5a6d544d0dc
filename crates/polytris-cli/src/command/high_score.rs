use std::path::PathBuf;

use polytris_engine::SaveFile;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HighScoreArg {
    /// Path to the save file
    #[clap(long, default_value = SaveFile::DEFAULT_PATH)]
    save_path: PathBuf,
}

pub(crate) fn run(arg: &HighScoreArg) {
    let save = SaveFile::new(&arg.save_path).load();
    println!("{}", save.high_score());
}
