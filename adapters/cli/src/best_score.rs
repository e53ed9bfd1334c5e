//! Best final score retained across rounds and, optionally, across runs.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Highest final score seen so far.
#[derive(Debug, Default)]
pub(crate) struct BestScore {
    best: Option<u32>,
    path: Option<PathBuf>,
}

impl BestScore {
    /// Loads the stored best score from `path`. A missing file starts empty.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let best = match fs::read_to_string(path) {
            Ok(text) => Some(text.trim().parse::<u32>().with_context(|| {
                format!("best score file {} is not a number", path.display())
            })?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read best score {}", path.display()))
            }
        };

        Ok(Self {
            best,
            path: Some(path.to_path_buf()),
        })
    }

    pub(crate) fn best(&self) -> Option<u32> {
        self.best
    }

    /// Records a final score and reports whether it beat the previous best.
    pub(crate) fn record(&mut self, score: u32) -> bool {
        if self.best.is_some_and(|best| best >= score) {
            return false;
        }
        self.best = Some(score);
        true
    }

    /// Persists the best score when a file was configured.
    pub(crate) fn save(&self) -> Result<()> {
        let (Some(path), Some(best)) = (&self.path, self.best) else {
            return Ok(());
        };
        fs::write(path, format!("{best}\n"))
            .with_context(|| format!("failed to write best score {}", path.display()))
    }
}
