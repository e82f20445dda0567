use std::fmt;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;

use crate::foundation::error::MintResult;
use crate::foundation::layout::ensure_parent_dir;

/// Line-oriented text log shared between render workers.
///
/// Each line is written with one `write_all` under the lock, so lines from concurrent workers
/// never interleave.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFile {
    /// Create (or truncate) the log at `path`.
    pub fn create(path: impl Into<PathBuf>) -> MintResult<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;
        let file =
            File::create(&path).with_context(|| format!("create log '{}'", path.display()))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Log location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Write failures are reported through `tracing` and otherwise ignored;
    /// a broken log must not fail a render.
    pub fn line(&self, msg: impl fmt::Display) {
        let text = format!("{msg}\n");
        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = file.write_all(text.as_bytes()) {
            tracing::warn!(path = %self.path.display(), "log write failed: {e}");
        }
    }
}

/// The render narrative log and the permanent-failure log.
#[derive(Debug)]
pub struct RenderLogs {
    /// Skips, missing assets, filter graphs, retries, successes.
    pub narrative: LogFile,
    /// Specimens that could not be rendered.
    pub failures: LogFile,
}

impl RenderLogs {
    /// Create both logs, truncating earlier runs.
    pub fn create(narrative: impl Into<PathBuf>, failures: impl Into<PathBuf>) -> MintResult<Self> {
        Ok(Self {
            narrative: LogFile::create(narrative)?,
            failures: LogFile::create(failures)?,
        })
    }
}
