use crate::errors::HabitError;
use crate::models::HabitKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logged completion values for a single habit, keyed by date.
///
/// A missing entry means "not logged", which is distinct from an entry
/// holding 0. [`CompletionLedger::get`] collapses both to 0 for callers that
/// only need a number; [`CompletionLedger::entry`] keeps them apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    entries: BTreeMap<NaiveDate, u8>,
}

impl CompletionLedger {
    pub fn get(&self, date: NaiveDate) -> u8 {
        self.entry(date).unwrap_or(0)
    }

    pub fn entry(&self, date: NaiveDate) -> Option<u8> {
        self.entries.get(&date).copied()
    }

    /// Upserts `value` for `date`, returning the previous value.
    pub fn set(
        &mut self,
        kind: HabitKind,
        date: NaiveDate,
        value: i64,
    ) -> Result<Option<u8>, HabitError> {
        let value = kind.validate(value)?;
        Ok(self.entries.insert(date, value))
    }

    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, u8)> + '_ {
        self.entries.iter().map(|(date, value)| (*date, *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.entries.values().map(|value| u32::from(*value)).sum()
    }
}
