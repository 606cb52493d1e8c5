//! Schedule table reconciliation
//!
//! The crontab is treated as two regions: an untouched user prefix, and a
//! managed block that starts at the anchor marker and runs to the end of the
//! table. Every run strips the managed block and rebuilds it from today's
//! meetings, so entries never need to be matched or updated individually.

use chrono::{Datelike, NaiveTime, Timelike};

use crate::agenda::Meeting;
use crate::timemath::{apply_offset_minutes, is_strictly_future};

/// Sentinel line opening the managed block. Everything after it is owned by
/// this tool and replaced on every run.
pub const ANCHOR_MARKER: &str = "# meetcue: managed meeting entries below, replaced on every run";

/// One entry destined for the schedule table. Owned by the reconciler until
/// the rendered table is handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledJob {
    pub trigger_hour: u32,
    pub trigger_minute: u32,
    /// Cron day-of-week field value (0 = Sunday). Single-day on purpose:
    /// each day's run fully replaces the block, so nothing recurs.
    pub weekday: u32,
    pub command: String,
    pub comment: String,
    pub source_title: String,
}

impl ScheduledJob {
    /// Render the two crontab lines for this job.
    pub fn render(&self) -> String {
        format!(
            "{}\n{} {} * * {} {}",
            self.comment, self.trigger_minute, self.trigger_hour, self.weekday, self.command
        )
    }
}

/// How the launch command for a join link is formatted. The command is
/// emitted as opaque text; nothing here ever executes it.
#[derive(Debug, Clone)]
pub struct LaunchCommand {
    pub open_cmd: String,
    pub pause_media: bool,
}

impl LaunchCommand {
    pub fn for_link(&self, link: &str) -> String {
        let open = format!("{} {}", self.open_cmd, shell_quote(link));
        if self.pause_media {
            // `;` not `&&`: pausing fails when no player is running, and the
            // meeting must still open.
            format!("playerctl --all-players pause; {}", open)
        } else {
            open
        }
    }
}

/// Single-quote a string for /bin/sh, escaping embedded quotes.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Removal pass: copy lines verbatim up to and including the first anchor
/// marker, discard everything after. Returns the retained lines and whether
/// an anchor was found. A table with several anchors keeps only the first;
/// later stale blocks are swept away with the rest.
pub fn strip_managed_block(table: &str) -> (Vec<String>, bool) {
    let mut prefix = Vec::new();
    for line in table.lines() {
        let is_anchor = line == ANCHOR_MARKER;
        prefix.push(line.to_string());
        if is_anchor {
            return (prefix, true);
        }
    }
    (prefix, false)
}

/// Reconcile the schedule table against today's meetings.
///
/// Strips the previous managed block, then appends one comment + job line
/// pair per meeting whose join link exists and whose trigger time (start
/// minus `offset_minutes`) is still strictly ahead of `now`. Returns the
/// rebuilt table and the number of jobs inserted.
///
/// Idempotent over the unmanaged prefix: running twice with the same
/// meetings and the same `now` yields byte-identical output. The
/// still-upcoming filter is intentionally time-relative, so idempotence does
/// not hold across different `now` values.
pub fn reconcile(
    current_table: &str,
    meetings: &[Meeting],
    offset_minutes: i64,
    now: NaiveTime,
    launch: &LaunchCommand,
) -> (String, usize) {
    let (mut lines, anchor_found) = strip_managed_block(current_table);
    let mut inserted = 0;

    if !meetings.is_empty() {
        if !anchor_found {
            lines.push(ANCHOR_MARKER.to_string());
        }
        for meeting in meetings {
            let Some(link) = meeting.join_link.as_deref() else {
                continue;
            };
            let trigger = apply_offset_minutes(meeting.start, offset_minutes);
            if !is_strictly_future(now, trigger) {
                log::debug!(
                    "Not scheduling '{}': trigger {} has already passed",
                    meeting.title,
                    trigger.format("%H:%M")
                );
                continue;
            }
            let job = ScheduledJob {
                trigger_hour: trigger.hour(),
                trigger_minute: trigger.minute(),
                weekday: meeting.date.weekday().num_days_from_sunday(),
                command: launch.for_link(link),
                comment: format!(
                    "# {} at {}",
                    meeting.title,
                    meeting.start.format("%H:%M")
                ),
                source_title: meeting.title.clone(),
            };
            lines.push(job.render());
            inserted += 1;
        }
    }

    let mut table = lines.join("\n");
    if !table.is_empty() {
        table.push('\n');
    }
    (table, inserted)
}
