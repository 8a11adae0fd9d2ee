use crate::errors::HabitError;
use crate::ledger::CompletionLedger;
use crate::schedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for HabitId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
            Repeat::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for Repeat {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            "yearly" => Ok(Repeat::Yearly),
            _ => Err(HabitError::InvalidRepeat(s.to_string())),
        }
    }
}

/// Whether a habit is checked off (0/1) or logged as a percentage (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitKind {
    Boolean,
    Percentage,
}

impl HabitKind {
    pub fn max_value(self) -> u8 {
        match self {
            HabitKind::Boolean => 1,
            HabitKind::Percentage => 100,
        }
    }

    pub fn validate(self, value: i64) -> Result<u8, HabitError> {
        if (0..=i64::from(self.max_value())).contains(&value) {
            Ok(value as u8)
        } else {
            Err(HabitError::InvalidValue { value, kind: self })
        }
    }
}

impl fmt::Display for HabitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HabitKind::Boolean => f.write_str("boolean"),
            HabitKind::Percentage => f.write_str("percentage"),
        }
    }
}

impl FromStr for HabitKind {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(HabitKind::Boolean),
            "percentage" | "percent" => Ok(HabitKind::Percentage),
            _ => Err(HabitError::InvalidKind(s.to_string())),
        }
    }
}

/// One stored habit row. Field names follow the on-disk columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub repeat: Repeat,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HabitKind,
    #[serde(default)]
    pub logs: CompletionLedger,
}

impl Habit {
    /// Checks a row read back from storage against the rules that
    /// `HabitBook` enforces on add, update and log.
    pub fn validate(&self) -> Result<(), HabitError> {
        if self.name.trim().is_empty() {
            return Err(HabitError::EmptyName);
        }
        schedule::check_range(self.start_date, self.end_date)?;
        for (_, value) in self.logs.entries() {
            self.kind.validate(i64::from(value))?;
        }
        Ok(())
    }

    pub fn due_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>, HabitError> {
        schedule::expand_between(self.start_date, self.end_date, self.repeat, from, to)
    }

    pub fn is_due(&self, date: NaiveDate) -> bool {
        schedule::is_due(self.start_date, self.end_date, self.repeat, date)
    }

    pub fn log(&mut self, date: NaiveDate, value: i64) -> Result<Option<u8>, HabitError> {
        self.logs.set(self.kind, date, value)
    }

    pub fn completion(&self, date: NaiveDate) -> u8 {
        self.logs.get(date)
    }
}

/// Validated input for creating a habit.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub repeat: Repeat,
    pub kind: HabitKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub repeat: Option<Repeat>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A habit on one of its due dates, with the logged value if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub habit_id: HabitId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HabitKind,
    pub value: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
    pub repeat: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "boolean".to_string()
}

impl TryFrom<NewHabitRequest> for NewHabit {
    type Error = HabitError;

    fn try_from(request: NewHabitRequest) -> Result<Self, Self::Error> {
        Ok(NewHabit {
            name: request.name,
            repeat: request.repeat.parse()?,
            kind: request.kind.parse()?,
            start_date: request.start_date,
            end_date: request.end_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub repeat: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<UpdateHabitRequest> for HabitChanges {
    type Error = HabitError;

    fn try_from(request: UpdateHabitRequest) -> Result<Self, Self::Error> {
        Ok(HabitChanges {
            name: request.name,
            repeat: request.repeat.as_deref().map(str::parse::<Repeat>).transpose()?,
            start_date: request.start_date,
            end_date: request.end_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub date: NaiveDate,
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub value: u8,
    pub logged: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub habit_id: HabitId,
    pub year: Option<i32>,
    pub dates: Vec<NaiveDate>,
    /// Set when the full schedule was cut short.
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub habit: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub habits: Vec<Occurrence>,
}
