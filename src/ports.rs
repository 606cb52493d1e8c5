//! Boundary port interfaces
//!
//! The run coordinator only ever talks to these traits; production
//! implementations shell out (`gcalcli`, `crontab`) or touch the filesystem,
//! and the test doubles live in the test modules that use them. All calls
//! are synchronous: the run is single-threaded and blocks at the boundary.

use chrono::NaiveDate;

use crate::error::RunError;

/// Read-only view of the user's calendars.
pub trait CalendarSource {
    /// Raw tab-separated agenda rows for one day, pre-filtered: header rows
    /// and excluded calendars are already dropped.
    fn fetch_agenda(&self, date: NaiveDate) -> Result<String, RunError>;

    /// Same row format, scoped to a single (holiday) calendar.
    fn fetch_holiday_agenda(&self, calendar_id: &str, date: NaiveDate)
        -> Result<String, RunError>;

    /// Names of the account's calendars, for diagnostics.
    fn list_calendars(&self) -> Result<Vec<String>, RunError>;
}

/// The persisted job table (the user's crontab in production).
pub trait ScheduleStore {
    fn read(&self) -> Result<String, RunError>;
    fn write(&mut self, table: &str) -> Result<(), RunError>;
}

/// The user-visible run log. Distinct from process diagnostics (`log`):
/// this file is what the user reads to see what past runs decided.
pub trait RunLog {
    fn append(&mut self, message: &str) -> Result<(), RunError>;
    fn read_all(&self) -> Result<Vec<String>, RunError>;
    /// Destructive tail truncation: keep only the last `n` lines.
    fn truncate_to_last(&mut self, n: usize) -> Result<(), RunError>;
}

/// Before/after snapshot storage. Implementations drop the snapshot when
/// before and after are byte-identical.
pub trait BackupSink {
    fn store(&mut self, period_key: &str, before: &str, after: &str) -> Result<(), RunError>;
}
