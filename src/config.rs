//! Run configuration from MEETCUE_* environment variables
//!
//! Resolved once at startup into an immutable `RunConfig` that is threaded
//! through the run. Unset variables fall back to defaults under `~/.meetcue`.

use std::path::PathBuf;

use crate::error::RunError;

/// Default meeting-link pattern: Zoom, Google Meet, Teams join URLs.
pub const DEFAULT_LINK_PATTERN: &str =
    r"https://[^\s]*(?:zoom\.us/j/|meet\.google\.com/|teams\.microsoft\.com/l/meetup-join/)[^\s]*";

/// Calendars whose rows are always dropped before parsing.
pub const BUILTIN_EXCLUDED_CALENDARS: &[&str] = &["Home"];

fn default_log_limit() -> usize {
    100
}

fn default_offset_minutes() -> i64 {
    1
}

/// Immutable per-run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub backup_dir: PathBuf,
    pub enable_backup: bool,
    pub enable_debug: bool,
    pub log_file: PathBuf,
    /// Run-log lines retained after trimming. Always > 0.
    pub log_limit: usize,
    /// Minutes before meeting start at which the job fires.
    pub offset_minutes: i64,
    pub link_pattern: String,
    /// Launcher invoked with the single-quoted join link appended.
    pub open_cmd: String,
    /// Prefix the launch command with a media-pause invocation.
    pub pause_media: bool,
    /// Versioned precedence switch: check Holiday before OutOfOffice.
    pub holiday_first: bool,
    /// Calendar names excluded on top of the built-in list.
    pub exclude_calendars: Vec<String>,
}

impl RunConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, RunError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary lookup function.
    ///
    /// The seam exists so tests never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RunError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home_base = || {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".meetcue")
        };

        let backup_dir = lookup("MEETCUE_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_base().join("backups"));
        let log_file = lookup("MEETCUE_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_base().join("run.log"));

        let log_limit = match lookup("MEETCUE_LOG_LIMIT") {
            Some(raw) => {
                let n: usize = raw.parse().map_err(|_| {
                    RunError::Config(format!("MEETCUE_LOG_LIMIT is not a number: '{}'", raw))
                })?;
                if n == 0 {
                    return Err(RunError::Config(
                        "MEETCUE_LOG_LIMIT must be greater than zero".to_string(),
                    ));
                }
                n
            }
            None => default_log_limit(),
        };

        let offset_minutes = match lookup("MEETCUE_OFFSET_MINUTES") {
            Some(raw) => {
                let n: i64 = raw.parse().map_err(|_| {
                    RunError::Config(format!("MEETCUE_OFFSET_MINUTES is not a number: '{}'", raw))
                })?;
                if n < 0 {
                    return Err(RunError::Config(
                        "MEETCUE_OFFSET_MINUTES must not be negative".to_string(),
                    ));
                }
                n
            }
            None => default_offset_minutes(),
        };

        let exclude_calendars = lookup("MEETCUE_EXCLUDE_CALENDARS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(RunConfig {
            backup_dir,
            enable_backup: bool_var(&lookup, "MEETCUE_BACKUP", true),
            enable_debug: bool_var(&lookup, "MEETCUE_DEBUG", false),
            log_file,
            log_limit,
            offset_minutes,
            link_pattern: lookup("MEETCUE_LINK_PATTERN")
                .unwrap_or_else(|| DEFAULT_LINK_PATTERN.to_string()),
            open_cmd: lookup("MEETCUE_OPEN_CMD").unwrap_or_else(|| "xdg-open".to_string()),
            pause_media: bool_var(&lookup, "MEETCUE_PAUSE_MEDIA", true),
            holiday_first: bool_var(&lookup, "MEETCUE_HOLIDAY_FIRST", false),
            exclude_calendars,
        })
    }

    /// Built-in plus configured excluded calendar names.
    pub fn excluded_calendars(&self) -> Vec<String> {
        let mut out: Vec<String> = BUILTIN_EXCLUDED_CALENDARS
            .iter()
            .map(|s| s.to_string())
            .collect();
        out.extend(self.exclude_calendars.iter().cloned());
        out
    }
}

/// Parse a boolean variable: "1", "true", "yes", "on" (any case) are true,
/// "0", "false", "no", "off" are false, anything else keeps the default.
fn bool_var<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}
