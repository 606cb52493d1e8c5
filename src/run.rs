//! Per-invocation orchestration
//!
//! One run: read the table, fetch and parse the agenda, classify the day,
//! rebuild (or just clear) the managed block, commit, log a one-line
//! summary, trim the run log, and hand the before/after pair to the backup
//! sink. Fatal boundary errors abort at the point of detection; anything
//! already committed stays committed.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::agenda::{self, Meeting};
use crate::classify::{classify, AgendaMode, Precedence};
use crate::config::RunConfig;
use crate::error::RunError;
use crate::ports::{BackupSink, CalendarSource, RunLog, ScheduleStore};
use crate::reconcile::{reconcile, LaunchCommand};

/// What a run decided and did, for the caller and the run log.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: AgendaMode,
    pub meetings_seen: usize,
    pub inserted: usize,
}

impl RunSummary {
    fn log_line(&self) -> String {
        format!(
            "mode={} meetings={} inserted={}",
            self.mode, self.meetings_seen, self.inserted
        )
    }
}

/// Drives one reconciliation run through the injected collaborators.
pub struct RunCoordinator<'a> {
    pub config: &'a RunConfig,
    pub calendar: &'a dyn CalendarSource,
    pub store: &'a mut dyn ScheduleStore,
    pub run_log: &'a mut dyn RunLog,
    pub backup: &'a mut dyn BackupSink,
}

impl RunCoordinator<'_> {
    /// Execute one run for the given date and wall-clock time.
    ///
    /// `holiday_calendar_id` is the pre-resolved holiday calendar, or None
    /// when holiday detection should be skipped.
    pub fn execute(
        &mut self,
        today: NaiveDate,
        now: NaiveTime,
        holiday_calendar_id: Option<&str>,
    ) -> Result<RunSummary, RunError> {
        let link_re = Regex::new(&self.config.link_pattern)
            .map_err(|e| RunError::Config(format!("bad link pattern: {}", e)))?;

        // 1. Current table is both the reconciliation input and the
        //    "before" half of the backup pair.
        let before = self.store.read()?;

        // 2. Agenda
        let raw_agenda = self.calendar.fetch_agenda(today)?;
        let meetings: Vec<Meeting> = agenda::meetings(&raw_agenda, today, &link_re).collect();

        // 3. Holiday confirmation input. A failed holiday fetch downgrades
        //    to "no holiday data" rather than killing the run: the primary
        //    agenda is authoritative, the holiday calendar is advisory.
        let holiday_event = holiday_calendar_id.and_then(|cal_id| {
            match self.calendar.fetch_holiday_agenda(cal_id, today) {
                Ok(raw) => raw.lines().find_map(|line| agenda::row_title(line, today)),
                Err(e) => {
                    log::warn!("Holiday calendar fetch failed, skipping detection: {}", e);
                    None
                }
            }
        });

        // 4. Classify
        let precedence = if self.config.holiday_first {
            Precedence::HolidayFirst
        } else {
            Precedence::OooFirst
        };
        let mode = classify(&raw_agenda, &meetings, holiday_event.as_deref(), precedence);

        // 5. Rebuild the managed block. Only a Normal day schedules
        //    anything; every other mode still clears prior entries.
        let launch = LaunchCommand {
            open_cmd: self.config.open_cmd.clone(),
            pause_media: self.config.pause_media,
        };
        let scheduled: &[Meeting] = match mode {
            AgendaMode::Normal => &meetings,
            _ => &[],
        };
        let (after, inserted) = reconcile(
            &before,
            scheduled,
            self.config.offset_minutes,
            now,
            &launch,
        );

        // 6. Commit
        self.store.write(&after)?;

        let summary = RunSummary {
            mode,
            meetings_seen: meetings.len(),
            inserted,
        };

        // 7. Run log: one line per run, then trim
        self.run_log.append(&summary.log_line())?;
        self.run_log.truncate_to_last(self.config.log_limit)?;

        // 8. Backup pair; the sink drops identical snapshots
        if self.config.enable_backup {
            let period_key = format!("{}-{}", today.format("%Y%m%d"), now.format("%H"));
            self.backup.store(&period_key, &before, &after)?;
        }

        log::info!(
            "Run complete: {} ({} meeting(s) seen, {} job(s) inserted)",
            summary.mode,
            summary.meetings_seen,
            summary.inserted
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ANCHOR_MARKER;

    // ------------------------------------------------------------------
    // In-memory collaborators
    // ------------------------------------------------------------------

    struct FakeCalendar {
        agenda: Result<String, String>,
        holiday_agenda: Option<String>,
    }

    impl CalendarSource for FakeCalendar {
        fn fetch_agenda(&self, _date: NaiveDate) -> Result<String, RunError> {
            self.agenda
                .clone()
                .map_err(RunError::CalendarFetch)
        }

        fn fetch_holiday_agenda(
            &self,
            _calendar_id: &str,
            _date: NaiveDate,
        ) -> Result<String, RunError> {
            match &self.holiday_agenda {
                Some(raw) => Ok(raw.clone()),
                None => Err(RunError::CalendarFetch("holiday fetch failed".to_string())),
            }
        }

        fn list_calendars(&self) -> Result<Vec<String>, RunError> {
            Ok(vec!["Work".to_string()])
        }
    }

    #[derive(Default)]
    struct MemStore {
        table: String,
        writes: usize,
    }

    impl ScheduleStore for MemStore {
        fn read(&self) -> Result<String, RunError> {
            Ok(self.table.clone())
        }

        fn write(&mut self, table: &str) -> Result<(), RunError> {
            self.table = table.to_string();
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemLog {
        lines: Vec<String>,
    }

    impl RunLog for MemLog {
        fn append(&mut self, message: &str) -> Result<(), RunError> {
            self.lines.push(message.to_string());
            Ok(())
        }

        fn read_all(&self) -> Result<Vec<String>, RunError> {
            Ok(self.lines.clone())
        }

        fn truncate_to_last(&mut self, n: usize) -> Result<(), RunError> {
            if self.lines.len() > n {
                self.lines = self.lines[self.lines.len() - n..].to_vec();
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemBackup {
        stored: Vec<(String, String, String)>,
    }

    impl BackupSink for MemBackup {
        fn store(&mut self, period_key: &str, before: &str, after: &str) -> Result<(), RunError> {
            if before != after {
                self.stored
                    .push((period_key.to_string(), before.to_string(), after.to_string()));
            }
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn config() -> RunConfig {
        RunConfig::from_lookup(|_| None).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    fn now() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    fn run(
        calendar: &FakeCalendar,
        store: &mut MemStore,
        holiday_calendar_id: Option<&str>,
    ) -> (Result<RunSummary, RunError>, MemLog, MemBackup) {
        let config = config();
        let mut log = MemLog::default();
        let mut backup = MemBackup::default();
        let result = RunCoordinator {
            config: &config,
            calendar,
            store,
            run_log: &mut log,
            backup: &mut backup,
        }
        .execute(today(), now(), holiday_calendar_id);
        (result, log, backup)
    }

    const NORMAL_AGENDA: &str =
        "2026-08-05\t09:00\tStandup\thttps://zoom.us/j/123\n2026-08-05\t14:00\tDesign\thttps://meet.google.com/abc-defg-hij\n";

    // ------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------

    #[test]
    fn test_normal_run_commits_managed_block() {
        let calendar = FakeCalendar {
            agenda: Ok(NORMAL_AGENDA.to_string()),
            holiday_agenda: None,
        };
        let mut store = MemStore::default();
        let (result, log, backup) = run(&calendar, &mut store, None);

        let summary = result.unwrap();
        assert_eq!(summary.mode, AgendaMode::Normal);
        assert_eq!(summary.meetings_seen, 2);
        assert_eq!(summary.inserted, 2);

        assert!(store.table.contains(ANCHOR_MARKER));
        assert!(store.table.contains("zoom.us/j/123"));
        assert_eq!(log.lines, vec!["mode=normal meetings=2 inserted=2"]);
        assert_eq!(backup.stored.len(), 1);
        assert_eq!(backup.stored[0].0, "20260805-08");
    }

    #[test]
    fn test_ooo_run_is_removal_only() {
        let calendar = FakeCalendar {
            agenda: Ok(format!("{}2026-08-05\t(All day)\tOut of office\n", NORMAL_AGENDA)),
            holiday_agenda: None,
        };
        let mut store = MemStore {
            table: format!("keep\n{}\n0 9 * * 2 old-entry\n", ANCHOR_MARKER),
            ..Default::default()
        };
        let (result, _, _) = run(&calendar, &mut store, None);

        let summary = result.unwrap();
        assert_eq!(summary.mode, AgendaMode::OutOfOffice);
        assert_eq!(summary.inserted, 0);
        assert!(!store.table.contains("old-entry"));
        assert!(store.table.starts_with("keep\n"));
    }

    #[test]
    fn test_empty_agenda_clears_prior_entries() {
        let calendar = FakeCalendar {
            agenda: Ok(String::new()),
            holiday_agenda: None,
        };
        let mut store = MemStore {
            table: format!("{}\n0 9 * * 2 old-entry\n", ANCHOR_MARKER),
            ..Default::default()
        };
        let (result, _, _) = run(&calendar, &mut store, None);

        assert_eq!(result.unwrap().mode, AgendaMode::Empty);
        assert!(!store.table.contains("old-entry"));
    }

    #[test]
    fn test_fetch_failure_leaves_store_untouched() {
        let calendar = FakeCalendar {
            agenda: Err("gcalcli exploded".to_string()),
            holiday_agenda: None,
        };
        let mut store = MemStore {
            table: "precious\n".to_string(),
            ..Default::default()
        };
        let (result, log, _) = run(&calendar, &mut store, None);

        assert!(result.is_err());
        assert_eq!(store.writes, 0);
        assert_eq!(store.table, "precious\n");
        assert!(log.lines.is_empty());
    }

    #[test]
    fn test_confirmed_holiday_skips_scheduling() {
        let calendar = FakeCalendar {
            agenda: Ok(format!(
                "{}2026-08-05\t09:00\tSummer Bank Holiday\thttps://zoom.us/j/9\n",
                NORMAL_AGENDA
            )),
            holiday_agenda: Some("2026-08-05\t(All day)\tSummer Bank Holiday\n".to_string()),
        };
        let mut store = MemStore::default();
        let (result, _, _) = run(&calendar, &mut store, Some("en.uk#holiday@group.v.calendar.google.com"));

        assert_eq!(result.unwrap().mode, AgendaMode::Holiday);
        assert!(!store.table.contains("zoom.us"));
    }

    #[test]
    fn test_holiday_fetch_failure_is_absorbed() {
        let calendar = FakeCalendar {
            agenda: Ok(NORMAL_AGENDA.to_string()),
            holiday_agenda: None, // fetch_holiday_agenda errors
        };
        let mut store = MemStore::default();
        let (result, _, _) = run(&calendar, &mut store, Some("en.usa#holiday@group.v.calendar.google.com"));

        // run proceeds as a normal day
        assert_eq!(result.unwrap().mode, AgendaMode::Normal);
        assert!(store.table.contains(ANCHOR_MARKER));
    }

    #[test]
    fn test_run_log_is_trimmed_to_limit() {
        let calendar = FakeCalendar {
            agenda: Ok(NORMAL_AGENDA.to_string()),
            holiday_agenda: None,
        };
        let mut store = MemStore::default();
        let config = config();
        let mut log = MemLog::default();
        for i in 0..150 {
            log.lines.push(format!("old line {}", i));
        }
        let mut backup = MemBackup::default();

        RunCoordinator {
            config: &config,
            calendar: &calendar,
            store: &mut store,
            run_log: &mut log,
            backup: &mut backup,
        }
        .execute(today(), now(), None)
        .unwrap();

        assert_eq!(log.lines.len(), config.log_limit);
        assert_eq!(log.lines.last().unwrap(), "mode=normal meetings=2 inserted=2");
    }

    #[test]
    fn test_unchanged_run_stores_no_backup() {
        let calendar = FakeCalendar {
            agenda: Ok(NORMAL_AGENDA.to_string()),
            holiday_agenda: None,
        };
        let mut store = MemStore::default();

        let (first, _, backup_first) = run(&calendar, &mut store, None);
        first.unwrap();
        assert_eq!(backup_first.stored.len(), 1);

        // Same agenda, same now: reconcile is idempotent, nothing changes
        let (second, _, backup_second) = run(&calendar, &mut store, None);
        second.unwrap();
        assert!(backup_second.stored.is_empty());
    }
}
