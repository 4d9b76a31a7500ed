//! Output persistence

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::GenError;

/// Destination for generated units
pub trait OutputSink {
    /// Persist `content` at `path`
    ///
    /// Returns `Ok(false)` when an existing file was kept because overwriting
    /// was declined; that is a skip, not a failure.
    fn write(&mut self, path: &Path, content: &[u8], force_overwrite: bool)
        -> Result<bool, GenError>;
}

type ConfirmFn = Box<dyn FnMut(&Path) -> bool>;

/// Writes units below an output directory
pub struct FileSink {
    output_dir: PathBuf,
    confirm: ConfirmFn,
}

impl FileSink {
    /// Sink asking on stdin before replacing an existing file
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_confirm(output_dir, prompt_overwrite)
    }

    /// Sink deciding overwrites of existing files with `confirm`
    pub fn with_confirm<F>(output_dir: impl Into<PathBuf>, confirm: F) -> Self
    where
        F: FnMut(&Path) -> bool + 'static,
    {
        Self {
            output_dir: output_dir.into(),
            confirm: Box::new(confirm),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl OutputSink for FileSink {
    fn write(
        &mut self,
        path: &Path,
        content: &[u8],
        force_overwrite: bool,
    ) -> Result<bool, GenError> {
        let target = self.output_dir.join(path);

        if !force_overwrite && target.exists() && !(self.confirm)(&target) {
            info!(path = ?target, "Skipped existing file");
            return Ok(false);
        }

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&target, content)?;
        debug!(path = ?target, bytes = content.len(), "Wrote file");
        Ok(true)
    }
}

/// Ask on stdout/stdin whether `path` may be replaced; only `y`/`Y` accepts
fn prompt_overwrite(path: &Path) -> bool {
    let mut stdout = io::stdout();
    if write!(stdout, "file({}) already exists, overwrite (Y/N)? ", path.display())
        .and_then(|_| stdout.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "Y" | "y")
}
