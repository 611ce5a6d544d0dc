use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Data kept between sessions. Currently just the high score.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGame {
    high_score: u64,
}

impl SaveGame {
    #[must_use]
    pub const fn new() -> Self {
        Self { high_score: 0 }
    }

    #[must_use]
    pub const fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Records `score`, keeping it only if it beats the stored high score.
    ///
    /// Returns whether the high score changed.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score <= self.high_score {
            return false;
        }
        self.high_score = score;
        true
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SaveError {
    #[display("failed to write save file: {_0}")]
    Io(io::Error),
    #[display("failed to encode save data: {_0}")]
    Format(serde_json::Error),
}

/// JSON file holding a [`SaveGame`].
///
/// # Example
///
/// ```no_run
/// use polytris_engine::SaveFile;
///
/// let file = SaveFile::new("./data/save.json");
/// let mut save = file.load();
/// save.record_score(1200);
/// file.store(&save)?;
/// # Ok::<(), polytris_engine::SaveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub const DEFAULT_PATH: &'static str = "./data/save.json";

    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the save, falling back to an empty one.
    ///
    /// A missing file is the normal first-run case. An unreadable or corrupt file is
    /// logged and otherwise treated the same way.
    #[must_use]
    pub fn load(&self) -> SaveGame {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SaveGame::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot open save file");
                return SaveGame::default();
            }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(save) => save,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt save file");
                SaveGame::default()
            }
        }
    }

    /// Overwrites the file with `save`, creating parent directories as needed.
    pub fn store(&self, save: &SaveGame) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, save)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
