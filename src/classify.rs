//! Day classification
//!
//! Decides, once per run, whether today's agenda should be scheduled at all.
//! Priority is first-match-wins; the OOO/Holiday order changed across
//! versions of this tool, so it stays an explicit, configurable policy
//! rather than an accident of the check sequence.

use crate::agenda::{Meeting, ALL_DAY_MARKER};

/// Out-of-office markers, matched case-insensitively anywhere in the agenda.
const OOO_MARKERS: &[&str] = &["ooo", "out of office"];

/// Per-run agenda mode. Anything other than `Normal` performs the
/// removal-only pass: prior managed entries are cleared, nothing is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaMode {
    Normal,
    Holiday,
    OutOfOffice,
    Empty,
}

impl std::fmt::Display for AgendaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgendaMode::Normal => "normal",
            AgendaMode::Holiday => "holiday",
            AgendaMode::OutOfOffice => "out-of-office",
            AgendaMode::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// Classification precedence between the out-of-office and holiday checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Latest policy: an OOO marker wins even on a public holiday.
    OooFirst,
    /// Earlier policy, kept behind a config switch.
    HolidayFirst,
}

/// Classify the day's agenda.
///
/// `holiday_event` is the event name the resolved holiday calendar produced
/// for today, or None when no holiday calendar could be resolved (in which
/// case holiday detection is skipped entirely). A holiday only counts when
/// that same event name also appears in the primary agenda as a timed row,
/// since public holiday calendars that list every day would otherwise blank
/// out normal working days.
pub fn classify(
    raw_agenda: &str,
    meetings: &[Meeting],
    holiday_event: Option<&str>,
    precedence: Precedence,
) -> AgendaMode {
    let checks: [fn(&str, &[Meeting], Option<&str>) -> Option<(AgendaMode, String)>; 3] =
        match precedence {
            Precedence::OooFirst => [check_ooo, check_holiday, check_empty],
            Precedence::HolidayFirst => [check_holiday, check_ooo, check_empty],
        };

    for check in checks {
        if let Some((mode, reason)) = check(raw_agenda, meetings, holiday_event) {
            log::info!("Agenda classified as {}: {}", mode, reason);
            return mode;
        }
    }

    log::info!(
        "Agenda classified as normal: {} schedulable meeting(s)",
        meetings.iter().filter(|m| m.join_link.is_some()).count()
    );
    AgendaMode::Normal
}

fn check_ooo(
    raw_agenda: &str,
    _meetings: &[Meeting],
    _holiday_event: Option<&str>,
) -> Option<(AgendaMode, String)> {
    let lowered = raw_agenda.to_lowercase();
    OOO_MARKERS
        .iter()
        .find(|marker| lowered.contains(*marker))
        .map(|marker| {
            (
                AgendaMode::OutOfOffice,
                format!("agenda contains '{}'", marker),
            )
        })
}

fn check_holiday(
    raw_agenda: &str,
    _meetings: &[Meeting],
    holiday_event: Option<&str>,
) -> Option<(AgendaMode, String)> {
    let name = holiday_event?;
    if appears_as_timed_row(raw_agenda, name) {
        Some((
            AgendaMode::Holiday,
            format!("holiday calendar event '{}' confirmed by the agenda", name),
        ))
    } else {
        log::debug!(
            "Holiday calendar names '{}' but the agenda has no timed row for it",
            name
        );
        None
    }
}

fn check_empty(
    raw_agenda: &str,
    meetings: &[Meeting],
    _holiday_event: Option<&str>,
) -> Option<(AgendaMode, String)> {
    if raw_agenda.trim().is_empty() {
        return Some((AgendaMode::Empty, "agenda text is empty".to_string()));
    }
    if !meetings.iter().any(|m| m.join_link.is_some()) {
        return Some((
            AgendaMode::Empty,
            "no meeting carries a join link".to_string(),
        ));
    }
    None
}

/// Does `name` appear (case-insensitively) in a timed, non-all-day agenda
/// row? All-day rows are exactly what over-eager holiday calendars produce,
/// so only a timed row confirms the holiday.
fn appears_as_timed_row(raw_agenda: &str, name: &str) -> bool {
    let needle = name.to_lowercase();
    raw_agenda.lines().any(|line| {
        let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
        let timed = matches!(fields.get(1), Some(&f) if f != ALL_DAY_MARKER && is_hhmm(f));
        timed && line.to_lowercase().contains(&needle)
    })
}

fn is_hhmm(field: &str) -> bool {
    matches!(field.split_once(':'), Some((h, m))
        if !h.is_empty()
            && h.len() <= 2
            && m.len() == 2
            && h.bytes().all(|b| b.is_ascii_digit())
            && m.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn meeting(title: &str, link: Option<&str>) -> Meeting {
        Meeting {
            title: title.to_string(),
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            join_link: link.map(|s| s.to_string()),
            is_all_day: false,
        }
    }

    #[test]
    fn test_ooo_wins_regardless_of_meetings() {
        let raw = "2026-08-05\t09:00\tOut of Office\n2026-08-05\t10:00\tSync\thttps://zoom.us/j/1\n";
        let meetings = vec![meeting("Sync", Some("https://zoom.us/j/1"))];
        let mode = classify(raw, &meetings, None, Precedence::OooFirst);
        assert_eq!(mode, AgendaMode::OutOfOffice);
    }

    #[test]
    fn test_ooo_marker_case_insensitive() {
        let mode = classify("2026-08-05\t(All day)\tOOO\n", &[], None, Precedence::OooFirst);
        assert_eq!(mode, AgendaMode::OutOfOffice);
    }

    #[test]
    fn test_empty_text_is_empty() {
        assert_eq!(classify("", &[], None, Precedence::OooFirst), AgendaMode::Empty);
        assert_eq!(classify("  \n ", &[], None, Precedence::OooFirst), AgendaMode::Empty);
    }

    #[test]
    fn test_no_join_links_is_empty() {
        let raw = "2026-08-05\t09:00\tFocus block\n";
        let meetings = vec![meeting("Focus block", None)];
        assert_eq!(
            classify(raw, &meetings, None, Precedence::OooFirst),
            AgendaMode::Empty
        );
    }

    #[test]
    fn test_holiday_requires_timed_confirmation() {
        // Holiday calendar names the day, but the agenda only has it all-day:
        // over-eager holiday calendars must not blank out a working day.
        let all_day = "2026-08-05\t(All day)\tSummer Bank Holiday\n\
                       2026-08-05\t10:00\tSync\thttps://zoom.us/j/1\n";
        let meetings = vec![meeting("Sync", Some("https://zoom.us/j/1"))];
        let mode = classify(
            all_day,
            &meetings,
            Some("Summer Bank Holiday"),
            Precedence::OooFirst,
        );
        assert_eq!(mode, AgendaMode::Normal);

        let timed = "2026-08-05\t09:00\tSummer Bank Holiday\n\
                     2026-08-05\t10:00\tSync\thttps://zoom.us/j/1\n";
        let mode = classify(
            timed,
            &meetings,
            Some("Summer Bank Holiday"),
            Precedence::OooFirst,
        );
        assert_eq!(mode, AgendaMode::Holiday);
    }

    #[test]
    fn test_no_holiday_calendar_skips_detection() {
        let raw = "2026-08-05\t09:00\tSummer Bank Holiday\thttps://zoom.us/j/1\n";
        let meetings = vec![meeting("Summer Bank Holiday", Some("https://zoom.us/j/1"))];
        assert_eq!(
            classify(raw, &meetings, None, Precedence::OooFirst),
            AgendaMode::Normal
        );
    }

    #[test]
    fn test_precedence_is_configurable() {
        let raw = "2026-08-05\t09:00\tNew Year's Day\n2026-08-05\t10:00\tOOO\n";
        let mode = classify(raw, &[], Some("New Year's Day"), Precedence::OooFirst);
        assert_eq!(mode, AgendaMode::OutOfOffice);

        let mode = classify(raw, &[], Some("New Year's Day"), Precedence::HolidayFirst);
        assert_eq!(mode, AgendaMode::Holiday);
    }

    #[test]
    fn test_normal_day() {
        let raw = "2026-08-05\t10:00\tSync\thttps://zoom.us/j/1\n";
        let meetings = vec![meeting("Sync", Some("https://zoom.us/j/1"))];
        assert_eq!(
            classify(raw, &meetings, None, Precedence::OooFirst),
            AgendaMode::Normal
        );
    }
}
