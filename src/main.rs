//! meetcue binary: one reconciliation run per invocation.
//!
//! Meant to be invoked periodically by the same scheduler it writes to
//! (a non-managed crontab line, a systemd timer). `--dry-run` prints the
//! reconciled table instead of committing it; the `calendars` subcommand
//! lists calendar names for building MEETCUE_EXCLUDE_CALENDARS.

use chrono::Local;

use meetcue::backup::DirBackupSink;
use meetcue::config::RunConfig;
use meetcue::crontab::UserCrontab;
use meetcue::error::RunError;
use meetcue::gcal::GcalCalendarSource;
use meetcue::holiday;
use meetcue::logfile::FileRunLog;
use meetcue::ports::{CalendarSource, RunLog, ScheduleStore};
use meetcue::run::RunCoordinator;

const USAGE: &str = "usage: meetcue [--dry-run] | meetcue calendars";

/// Store wrapper for --dry-run: reads the real crontab, prints instead of
/// committing.
struct DryRunStore {
    inner: UserCrontab,
}

impl ScheduleStore for DryRunStore {
    fn read(&self) -> Result<String, RunError> {
        self.inner.read()
    }

    fn write(&mut self, table: &str) -> Result<(), RunError> {
        print!("{}", table);
        Ok(())
    }
}

/// Run log that records nothing, for --dry-run.
struct NoopRunLog;

impl RunLog for NoopRunLog {
    fn append(&mut self, _message: &str) -> Result<(), RunError> {
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<String>, RunError> {
        Ok(Vec::new())
    }

    fn truncate_to_last(&mut self, _n: usize) -> Result<(), RunError> {
        Ok(())
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut dry_run = false;
    let mut list_calendars = false;
    for arg in &args {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            "calendars" => list_calendars = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            other => {
                eprintln!("meetcue: unknown argument '{}'\n{}", other, USAGE);
                std::process::exit(1);
            }
        }
    }

    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("meetcue: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let default_level = if config.enable_debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = if list_calendars {
        print_calendars(&config)
    } else {
        run_once(&config, dry_run)
    };

    if let Err(e) = result {
        log::error!("{} ({})", e, e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn print_calendars(config: &RunConfig) -> Result<(), RunError> {
    let calendar = GcalCalendarSource::new(config.excluded_calendars())?;
    for name in calendar.list_calendars()? {
        println!("{}", name);
    }
    Ok(())
}

fn run_once(config: &RunConfig, dry_run: bool) -> Result<(), RunError> {
    let calendar = GcalCalendarSource::new(config.excluded_calendars())?;
    let crontab = UserCrontab::new()?;

    let holiday_calendar_id = holiday::resolve_holiday_calendar_id();

    let local = Local::now().naive_local();
    let today = local.date();
    let now = local.time();

    let mut config = config.clone();
    if dry_run {
        config.enable_backup = false;
    }

    let mut backup = DirBackupSink::new(config.backup_dir.clone());

    let summary = if dry_run {
        let mut store = DryRunStore { inner: crontab };
        let mut run_log = NoopRunLog;
        RunCoordinator {
            config: &config,
            calendar: &calendar,
            store: &mut store,
            run_log: &mut run_log,
            backup: &mut backup,
        }
        .execute(today, now, holiday_calendar_id.as_deref())?
    } else {
        let mut store = crontab;
        let mut run_log = FileRunLog::new(config.log_file.clone());
        RunCoordinator {
            config: &config,
            calendar: &calendar,
            store: &mut store,
            run_log: &mut run_log,
            backup: &mut backup,
        }
        .execute(today, now, holiday_calendar_id.as_deref())?
    };

    log::debug!(
        "Summary: mode={} meetings={} inserted={}",
        summary.mode,
        summary.meetings_seen,
        summary.inserted
    );
    Ok(())
}
