//! Error types for a reconciliation run
//!
//! Errors are classified by severity:
//! - Fatal: missing external tools, I/O failures; the run halts immediately
//! - Absorbed: parse skips and ambiguous classifications never become errors;
//!   they are surfaced as log lines only

use thiserror::Error;

/// Error types for a reconciliation run
#[derive(Debug, Error)]
pub enum RunError {
    // Hard dependencies: external tools probed before the run starts
    #[error("Required tool not found on PATH: {0}")]
    MissingDependency(String),

    // Boundary failures
    #[error("Calendar fetch failed: {0}")]
    CalendarFetch(String),

    #[error("Schedule table access failed: {0}")]
    ScheduleStore(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RunError {
    /// Returns true if this error means an external tool must be installed.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, RunError::MissingDependency(_))
    }

    /// Process exit code for the binary. Missing tools get a distinct code
    /// so wrapper scripts can tell "install gcalcli" from a transient failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::MissingDependency(_) => 2,
            _ => 1,
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RunError::MissingDependency(_) => {
                "Install the missing tool and make sure it is on PATH."
            }
            RunError::CalendarFetch(_) => {
                "Check that gcalcli is authenticated (run 'gcalcli list')."
            }
            RunError::ScheduleStore(_) => "Check that your user is allowed to use crontab.",
            RunError::Io(_) => "Check file permissions and disk space.",
            RunError::Config(_) => "Check your MEETCUE_* environment variables.",
        }
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        RunError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_exit_code() {
        let err = RunError::MissingDependency("gcalcli".to_string());
        assert!(err.is_missing_dependency());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RunError = io.into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("denied"));
    }
}
