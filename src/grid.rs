use crate::models::{Habit, HabitId};
use crate::schedule;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

pub const WEEKS: u32 = 53;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridTarget {
    All,
    Habit(HabitId),
}

impl FromStr for GridTarget {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(GridTarget::All);
        }
        trimmed.parse().map(GridTarget::Habit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub week: u32,
    /// 0 = Monday.
    pub weekday: u32,
    /// `None` when `(year, week, weekday)` is not a real ISO date.
    pub date: Option<NaiveDate>,
    pub value: u32,
    pub scheduled: u32,
    pub logged: u32,
}

/// Dense weekday × ISO-week grid for one ISO week-numbering year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapGrid {
    pub year: i32,
    pub weeks_in_year: u32,
    /// `rows[weekday][week - 1]`.
    pub rows: Vec<Vec<GridCell>>,
}

impl HeatmapGrid {
    pub fn empty(year: i32) -> Self {
        let rows = WEEKDAYS
            .iter()
            .map(|weekday| {
                (1..=WEEKS)
                    .map(|week| GridCell {
                        week,
                        weekday: weekday.num_days_from_monday(),
                        date: NaiveDate::from_isoywd_opt(year, week, *weekday),
                        value: 0,
                        scheduled: 0,
                        logged: 0,
                    })
                    .collect()
            })
            .collect();
        let weeks_in_year = if NaiveDate::from_isoywd_opt(year, WEEKS, Weekday::Mon).is_some() {
            WEEKS
        } else {
            WEEKS - 1
        };

        Self {
            year,
            weeks_in_year,
            rows,
        }
    }

    pub fn cell(&self, week: u32, weekday: u32) -> Option<&GridCell> {
        let column = week.checked_sub(1)?;
        self.rows.get(weekday as usize)?.get(column as usize)
    }

    pub fn cell_for(&self, date: NaiveDate) -> Option<&GridCell> {
        let iso = date.iso_week();
        if iso.year() != self.year {
            return None;
        }
        self.cell(iso.week(), date.weekday().num_days_from_monday())
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.rows.iter().flatten()
    }

    pub fn total(&self) -> u32 {
        self.cells().map(|cell| cell.value).sum()
    }

    fn cell_mut(&mut self, week: u32, weekday: u32) -> Option<&mut GridCell> {
        let column = week.checked_sub(1)?;
        self.rows
            .get_mut(weekday as usize)?
            .get_mut(column as usize)
            .filter(|cell| cell.date.is_some())
    }
}

/// Sums ledger values of every habit's due dates into the grid for `year`.
///
/// Dates without a ledger entry count as 0. Ledger entries on dates that are
/// not due are ignored.
pub fn build_grid<'a>(habits: impl IntoIterator<Item = &'a Habit>, year: i32) -> HeatmapGrid {
    let mut grid = HeatmapGrid::empty(year);

    for habit in habits {
        let expanded =
            schedule::expand_in_year(habit.start_date, habit.end_date, habit.repeat, year);
        let dates = match expanded {
            Ok(dates) => dates,
            Err(err) => {
                warn!(habit = %habit.id, "skipping habit in heatmap: {err}");
                continue;
            }
        };

        for date in dates {
            let weekday = date.weekday().num_days_from_monday();
            let Some(cell) = grid.cell_mut(date.iso_week().week(), weekday) else {
                continue;
            };
            cell.scheduled += 1;
            if let Some(value) = habit.logs.entry(date) {
                cell.logged += 1;
                cell.value += u32::from(value);
            }
        }
    }

    grid
}
