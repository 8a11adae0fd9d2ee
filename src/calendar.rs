//! iCalendar (RFC 5545) export: one all-day event per habit occurrence.

use crate::models::{HabitKind, Occurrence};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};

const MAX_LINE_OCTETS: usize = 75;

/// Months exported on either side of today.
pub const EXPORT_MONTHS: u32 = 12;

/// The date range the calendar export covers around `today`.
pub fn export_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let months = Months::new(EXPORT_MONTHS);
    (
        today.checked_sub_months(months).unwrap_or(NaiveDate::MIN),
        today.checked_add_months(months).unwrap_or(NaiveDate::MAX),
    )
}

pub fn render_calendar(occurrences: &[Occurrence], stamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, "PRODID:-//habit_tracker//habit calendar//EN");
    push_line(&mut out, "CALSCALE:GREGORIAN");

    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    for occurrence in occurrences {
        let day = occurrence.date.format("%Y%m%d");
        let next_day = occurrence
            .date
            .checked_add_days(Days::new(1))
            .unwrap_or(occurrence.date);

        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("UID:{}-{day}@habit-tracker", occurrence.habit_id));
        push_line(&mut out, &format!("DTSTAMP:{dtstamp}"));
        push_line(&mut out, &format!("DTSTART;VALUE=DATE:{day}"));
        push_line(&mut out, &format!("DTEND;VALUE=DATE:{}", next_day.format("%Y%m%d")));
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&occurrence.name)));
        push_line(&mut out, &format!("DESCRIPTION:{}", describe(occurrence)));
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn describe(occurrence: &Occurrence) -> String {
    match (occurrence.value, occurrence.kind) {
        (None, _) => "Not logged yet".to_string(),
        (Some(value), HabitKind::Boolean) => format!("Completion: {value}"),
        (Some(value), HabitKind::Percentage) => format!("Completion: {value}%"),
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Appends `line` with CRLF, folding it at 75 octets without splitting a
/// UTF-8 sequence.
fn push_line(out: &mut String, line: &str) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if used + len > budget {
            out.push_str("\r\n ");
            // The leading space counts toward the continuation line.
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(ch);
        used += len;
    }
    out.push_str("\r\n");
}
