//! Agenda record parsing
//!
//! Turns the calendar CLI's tab-separated agenda rows into `Meeting` values.
//! Rows arrive pre-filtered (header rows and excluded calendars are dropped
//! by the calendar source); here we only decide which rows are schedulable
//! and pull out the join link, title, and start time.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

/// Time-column token the calendar CLI emits for all-day events.
pub const ALL_DAY_MARKER: &str = "(All day)";

/// One calendar entry for the day.
///
/// Constructed per agenda row, immutable afterwards. A meeting without a
/// `join_link` never reaches the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub struct Meeting {
    pub title: String,
    pub start: NaiveTime,
    pub date: NaiveDate,
    pub join_link: Option<String>,
    pub is_all_day: bool,
}

/// Parse agenda rows into meetings, lazily and order-preserving.
///
/// Rows without a field matching `link_re` are not schedulable: they are
/// excluded from the output with a logged skip diagnostic (non-fatal).
/// Re-parsing the same input yields the same sequence.
pub fn meetings<'a>(
    raw: &'a str,
    date: NaiveDate,
    link_re: &'a Regex,
) -> impl Iterator<Item = Meeting> + 'a {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(move |line| parse_record(line, date, link_re))
}

/// Parse one tab-separated record. Returns None (and logs why) for rows
/// that cannot be scheduled.
fn parse_record(line: &str, date: NaiveDate, link_re: &Regex) -> Option<Meeting> {
    let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();

    let join_link = fields
        .iter()
        .find_map(|f| link_re.find(f).map(|m| m.as_str().to_string()));
    let Some(join_link) = join_link else {
        log::info!("Skipping agenda row without a meeting link: {}", row_preview(line));
        return None;
    };

    let (start, is_all_day) = match fields.get(1) {
        Some(&ALL_DAY_MARKER) | Some(&"") => (NaiveTime::MIN, true),
        Some(field) => match parse_hhmm(field) {
            Some(t) => (t, false),
            None => {
                log::info!(
                    "Skipping agenda row with unparseable start time '{}': {}",
                    field,
                    row_preview(line)
                );
                return None;
            }
        },
        None => {
            log::info!("Skipping malformed agenda row: {}", row_preview(line));
            return None;
        }
    };

    let title = row_title(line, date).unwrap_or_else(|| "(No title)".to_string());

    Some(Meeting {
        title,
        start,
        date,
        join_link: Some(join_link),
        is_all_day,
    })
}

/// Title of one raw row: the first field that is not a bare `HH:MM` token,
/// not the all-day marker, not a URL, and not the date itself. Also used to
/// pull the event name out of holiday-calendar rows, which have no link.
pub fn row_title(line: &str, date: NaiveDate) -> Option<String> {
    let date_str = date.format("%Y-%m-%d").to_string();
    line.split('\t')
        .map(|f| f.trim())
        .find(|f| {
            !f.is_empty()
                && parse_hhmm(f).is_none()
                && *f != ALL_DAY_MARKER
                && !is_url(f)
                && *f != date_str
        })
        .map(|f| f.to_string())
}

/// Parse a bare `HH:MM` token. Rejects trailing garbage.
fn parse_hhmm(field: &str) -> Option<NaiveTime> {
    let (h, m) = field.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

fn is_url(field: &str) -> bool {
    field.starts_with("http://") || field.starts_with("https://")
}

/// First ~60 chars of a row for log lines.
fn row_preview(line: &str) -> &str {
    let end = line
        .char_indices()
        .take(60)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &line[..end]
}
