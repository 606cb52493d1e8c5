//! Calendar access via the gcalcli CLI
//!
//! Fetches agenda rows as TSV and pre-filters them (header rows, excluded
//! calendars) so the parser only ever sees candidate records. gcalcli is a
//! hard dependency: its absence aborts the run before anything is touched.

use chrono::NaiveDate;

use crate::error::RunError;
use crate::exec::{run_tool, stderr_text, stdout_text, tool_on_path};
use crate::ports::CalendarSource;

const GCALCLI: &str = "gcalcli";

/// Calendar source shelling out to gcalcli.
pub struct GcalCalendarSource {
    excluded_calendars: Vec<String>,
}

impl GcalCalendarSource {
    /// Probe for gcalcli and build the source.
    pub fn new(excluded_calendars: Vec<String>) -> Result<Self, RunError> {
        if !tool_on_path(GCALCLI) {
            return Err(RunError::MissingDependency(GCALCLI.to_string()));
        }
        Ok(Self { excluded_calendars })
    }

    fn agenda_args(date: NaiveDate) -> (String, String) {
        let start = date.format("%Y-%m-%d").to_string();
        let end = (date + chrono::Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        (start, end)
    }

    fn run(args: &[&str]) -> Result<String, RunError> {
        let output = run_tool(GCALCLI, args, None)
            .map_err(|e| RunError::CalendarFetch(format!("failed to run gcalcli: {}", e)))?;
        if !output.status.success() {
            // A failed fetch is NOT an empty agenda: treating it as one
            // would misclassify the day on a transient error.
            return Err(RunError::CalendarFetch(stderr_text(&output)));
        }
        Ok(stdout_text(&output))
    }
}

impl CalendarSource for GcalCalendarSource {
    fn fetch_agenda(&self, date: NaiveDate) -> Result<String, RunError> {
        let (start, end) = Self::agenda_args(date);
        let raw = Self::run(&[
            "--nocolor",
            "agenda",
            &start,
            &end,
            "--tsv",
            "--details",
            "url",
            "--details",
            "calendar",
        ])?;
        Ok(filter_rows(&raw, &self.excluded_calendars))
    }

    fn fetch_holiday_agenda(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> Result<String, RunError> {
        let (start, end) = Self::agenda_args(date);
        let raw = Self::run(&[
            "--nocolor",
            "--calendar",
            calendar_id,
            "agenda",
            &start,
            &end,
            "--tsv",
        ])?;
        Ok(filter_rows(&raw, &[]))
    }

    fn list_calendars(&self) -> Result<Vec<String>, RunError> {
        let raw = Self::run(&["--nocolor", "list"])?;
        Ok(parse_calendar_list(&raw))
    }
}

/// Drop header rows and rows belonging to an excluded calendar.
///
/// gcalcli's TSV header leads with `start_date`; an excluded calendar
/// matches when any tab field equals its name exactly.
pub fn filter_rows(raw: &str, excluded_calendars: &[String]) -> String {
    let mut out = String::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
        if fields.first() == Some(&"start_date") {
            continue;
        }
        let excluded = excluded_calendars
            .iter()
            .any(|name| fields.iter().any(|f| f == name));
        if excluded {
            log::debug!("Dropping row from excluded calendar: {}", line);
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Parse `gcalcli list` output into calendar names.
///
/// Rows look like `  owner      Work` (access level, then the name, which
/// may itself contain spaces). Separator and header rows are skipped.
pub fn parse_calendar_list(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('-') {
                return None;
            }
            let mut parts = trimmed.splitn(2, char::is_whitespace);
            let access = parts.next()?;
            let name = parts.next()?.trim();
            if access == "Access" || name.is_empty() {
                return None; // header row
            }
            Some(name.to_string())
        })
        .collect()
}
