//! The user crontab as a schedule store
//!
//! Plain read-modify-write through the `crontab` CLI. There is no locking:
//! the tool assumes at most one instance runs at a time against a given
//! user's crontab (it is itself meant to be driven by a non-overlapping
//! scheduler). Concurrent writers race on the managed block and the last
//! writer wins.

use crate::error::RunError;
use crate::exec::{run_tool, stderr_text, stdout_text, tool_on_path};
use crate::ports::ScheduleStore;

const CRONTAB: &str = "crontab";

/// Schedule store backed by `crontab -l` / `crontab -`.
pub struct UserCrontab;

impl UserCrontab {
    /// Probe for crontab and build the store.
    pub fn new() -> Result<Self, RunError> {
        if !tool_on_path(CRONTAB) {
            return Err(RunError::MissingDependency(CRONTAB.to_string()));
        }
        Ok(Self)
    }
}

impl ScheduleStore for UserCrontab {
    fn read(&self) -> Result<String, RunError> {
        let output = run_tool(CRONTAB, &["-l"], None)
            .map_err(|e| RunError::ScheduleStore(format!("failed to run crontab: {}", e)))?;
        if output.status.success() {
            return Ok(stdout_text(&output));
        }
        // "no crontab for <user>" is a normal first run, not a failure
        let stderr = stderr_text(&output);
        if stderr.to_lowercase().contains("no crontab") {
            Ok(String::new())
        } else {
            Err(RunError::ScheduleStore(stderr))
        }
    }

    fn write(&mut self, table: &str) -> Result<(), RunError> {
        let output = run_tool(CRONTAB, &["-"], Some(table))
            .map_err(|e| RunError::ScheduleStore(format!("failed to run crontab: {}", e)))?;
        if !output.status.success() {
            return Err(RunError::ScheduleStore(stderr_text(&output)));
        }
        Ok(())
    }
}
