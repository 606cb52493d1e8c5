//! Before/after crontab snapshots
//!
//! Each run stores the table as it looked before and after reconciliation
//! under `<backup_dir>/<period_key>/`. A run that changed nothing leaves no
//! trace: identical snapshots are removed along with their directory.

use std::fs;
use std::path::PathBuf;

use crate::error::RunError;
use crate::ports::BackupSink;

const BEFORE_FILE: &str = "crontab.before";
const AFTER_FILE: &str = "crontab.after";

/// Backup sink writing snapshot pairs into per-period directories.
pub struct DirBackupSink {
    base_dir: PathBuf,
}

impl DirBackupSink {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

impl BackupSink for DirBackupSink {
    fn store(&mut self, period_key: &str, before: &str, after: &str) -> Result<(), RunError> {
        let dir = self.base_dir.join(period_key);

        if before == after {
            // Nothing changed this period; drop any snapshot dir left over
            // from an earlier run in the same period.
            if dir.is_dir() {
                fs::remove_dir_all(&dir)?;
                log::debug!("Removed unchanged backup {}", dir.display());
            }
            return Ok(());
        }

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(BEFORE_FILE), before)?;
        fs::write(dir.join(AFTER_FILE), after)?;
        log::info!("Backed up crontab to {}", dir.display());
        Ok(())
    }
}
