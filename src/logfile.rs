//! File-backed run log
//!
//! One timestamped line per appended message. Trimming keeps only the last
//! N lines and rewrites the file; this is deliberate tail truncation, not
//! rotation, so the file never grows past the configured limit.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::error::RunError;
use crate::ports::RunLog;

/// Run log stored as a plain text file.
pub struct FileRunLog {
    path: PathBuf,
}

impl FileRunLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn ensure_parent(&self) -> Result<(), RunError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl RunLog for FileRunLog {
    fn append(&mut self, message: &str) -> Result<(), RunError> {
        self.ensure_parent()?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<String>, RunError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content.lines().map(|l| l.to_string()).collect())
    }

    fn truncate_to_last(&mut self, n: usize) -> Result<(), RunError> {
        let lines = self.read_all()?;
        if lines.len() <= n {
            return Ok(());
        }
        let kept = &lines[lines.len() - n..];
        let mut out = kept.join("\n");
        out.push('\n');
        fs::write(&self.path, out)?;
        log::debug!(
            "Trimmed run log from {} to {} lines",
            lines.len(),
            kept.len()
        );
        Ok(())
    }
}
