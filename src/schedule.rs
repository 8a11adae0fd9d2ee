//! Expansion of a habit's `(start, end, repeat)` triple into due dates.
//!
//! Occurrences are anchored on the start date: the n-th occurrence is
//! `start + n * unit`. Monthly and yearly steps that land on a day the
//! target month does not have are clamped to that month's last day, so a
//! habit starting on Jan 31 is due on Feb 29 (or 28), Mar 31, Apr 30 and
//! so on.

use crate::errors::HabitError;
use crate::models::Repeat;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

pub fn expand(
    start: NaiveDate,
    end: NaiveDate,
    repeat: Repeat,
) -> Result<Vec<NaiveDate>, HabitError> {
    check_range(start, end)?;
    Ok(steps(start, repeat).take_while(|date| *date <= end).collect())
}

/// At most `limit` due dates from the start of the range. The flag is set
/// when later due dates were left out.
pub fn expand_capped(
    start: NaiveDate,
    end: NaiveDate,
    repeat: Repeat,
    limit: usize,
) -> Result<(Vec<NaiveDate>, bool), HabitError> {
    check_range(start, end)?;
    let mut dates: Vec<NaiveDate> = steps_from(start, repeat, 0)
        .take_while(|date| *date <= end)
        .take(limit.saturating_add(1))
        .collect();
    let truncated = dates.len() > limit;
    dates.truncate(limit);
    Ok((dates, truncated))
}

/// Due dates falling inside `[from, to]`, without walking the dates
/// before `from`.
pub fn expand_between(
    start: NaiveDate,
    end: NaiveDate,
    repeat: Repeat,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<NaiveDate>, HabitError> {
    check_range(start, end)?;
    let last = end.min(to);
    Ok(steps_from(start, repeat, first_step_near(start, repeat, from))
        .take_while(|date| *date <= last)
        .filter(|date| *date >= from)
        .collect())
}

/// Due dates falling inside the ISO week-numbering `year`.
pub fn expand_in_year(
    start: NaiveDate,
    end: NaiveDate,
    repeat: Repeat,
    year: i32,
) -> Result<Vec<NaiveDate>, HabitError> {
    check_range(start, end)?;
    let Some((first, last)) = iso_year_bounds(year) else {
        return Ok(Vec::new());
    };
    expand_between(start, end, repeat, first, last)
}

pub fn is_due(start: NaiveDate, end: NaiveDate, repeat: Repeat, date: NaiveDate) -> bool {
    if date < start || date > end {
        return false;
    }
    match repeat {
        Repeat::Daily => true,
        Repeat::Weekly => (date - start).num_days() % 7 == 0,
        Repeat::Monthly => {
            let months = (date.year() - start.year()) * 12 + date.month() as i32
                - start.month() as i32;
            u32::try_from(months)
                .ok()
                .and_then(|n| step(start, repeat, n))
                == Some(date)
        }
        Repeat::Yearly => u32::try_from(date.year() - start.year())
            .ok()
            .and_then(|n| step(start, repeat, n))
            == Some(date),
    }
}

/// First and last calendar day of an ISO week-numbering year.
pub fn iso_year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_isoywd_opt(year, 1, Weekday::Mon)?;
    let next = NaiveDate::from_isoywd_opt(year + 1, 1, Weekday::Mon)?;
    Some((first, next.pred_opt()?))
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), HabitError> {
    if end < start {
        return Err(HabitError::InvalidRange { start, end });
    }
    Ok(())
}

fn steps(start: NaiveDate, repeat: Repeat) -> impl Iterator<Item = NaiveDate> {
    steps_from(start, repeat, 0)
}

fn steps_from(start: NaiveDate, repeat: Repeat, first: u32) -> impl Iterator<Item = NaiveDate> {
    (first..).map_while(move |n| step(start, repeat, n))
}

/// A step index whose date is never after the first due date on or after
/// `from`.
fn first_step_near(start: NaiveDate, repeat: Repeat, from: NaiveDate) -> u32 {
    if from <= start {
        return 0;
    }
    let days = (from - start).num_days();
    let estimate = match repeat {
        Repeat::Daily => days,
        Repeat::Weekly => days / 7,
        Repeat::Monthly => {
            i64::from(from.year() - start.year()) * 12 + i64::from(from.month())
                - i64::from(start.month())
                - 1
        }
        Repeat::Yearly => i64::from(from.year() - start.year()) - 1,
    };
    u32::try_from(estimate.max(0)).unwrap_or(u32::MAX)
}

fn step(start: NaiveDate, repeat: Repeat, n: u32) -> Option<NaiveDate> {
    match repeat {
        Repeat::Daily => start.checked_add_days(Days::new(u64::from(n))),
        Repeat::Weekly => start.checked_add_days(Days::new(u64::from(n) * 7)),
        Repeat::Monthly => start.checked_add_months(Months::new(n)),
        Repeat::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
    }
}
