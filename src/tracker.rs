use crate::errors::HabitError;
use crate::grid::{build_grid, GridTarget, HeatmapGrid};
use crate::models::{Habit, HabitChanges, HabitId, NewHabit, Occurrence};
use crate::schedule;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Upper bound on dates returned for an unbounded schedule request.
pub const MAX_SCHEDULE_DATES: usize = 3660;

/// The in-memory habit set. Every operation is keyed by [`HabitId`];
/// names are display-only.
#[derive(Debug, Clone, Default)]
pub struct HabitBook {
    habits: Vec<Habit>,
}

impl HabitBook {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    pub fn list(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Result<&Habit, HabitError> {
        self.habits
            .iter()
            .find(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))
    }

    fn get_mut(&mut self, id: HabitId) -> Result<&mut Habit, HabitError> {
        self.habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))
    }

    pub fn add(&mut self, new: NewHabit) -> Result<&Habit, HabitError> {
        let name = validate_name(&new.name)?;
        schedule::check_range(new.start_date, new.end_date)?;

        let habit = Habit {
            id: HabitId::new(),
            name,
            repeat: new.repeat,
            start_date: new.start_date,
            end_date: new.end_date,
            kind: new.kind,
            logs: Default::default(),
        };
        info!(habit = %habit.id, name = %habit.name, "habit added");
        let index = self.habits.len();
        self.habits.push(habit);
        Ok(&self.habits[index])
    }

    /// Applies `changes` atomically: on error the habit is left untouched.
    pub fn update(&mut self, id: HabitId, changes: HabitChanges) -> Result<&Habit, HabitError> {
        let habit = self.get_mut(id)?;
        let name = changes.name.as_deref().map(validate_name).transpose()?;
        let start_date = changes.start_date.unwrap_or(habit.start_date);
        let end_date = changes.end_date.unwrap_or(habit.end_date);
        schedule::check_range(start_date, end_date)?;

        if let Some(name) = name {
            habit.name = name;
        }
        if let Some(repeat) = changes.repeat {
            habit.repeat = repeat;
        }
        habit.start_date = start_date;
        habit.end_date = end_date;
        info!(habit = %id, "habit updated");
        Ok(habit)
    }

    pub fn remove(&mut self, id: HabitId) -> Result<Habit, HabitError> {
        let index = self
            .habits
            .iter()
            .position(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))?;
        let habit = self.habits.remove(index);
        info!(habit = %id, name = %habit.name, "habit removed");
        Ok(habit)
    }

    /// Records `value` for `date`, returning the previously logged value.
    pub fn log(&mut self, id: HabitId, date: NaiveDate, value: i64) -> Result<Option<u8>, HabitError> {
        let previous = self.get_mut(id)?.log(date, value)?;
        info!(habit = %id, %date, value, "completion logged");
        Ok(previous)
    }

    pub fn completion(&self, id: HabitId, date: NaiveDate) -> Result<Option<u8>, HabitError> {
        Ok(self.get(id)?.logs.entry(date))
    }

    /// Due dates in one ISO week-year, or from the start date onward capped
    /// at [`MAX_SCHEDULE_DATES`]. The flag reports whether dates were cut.
    pub fn schedule(
        &self,
        id: HabitId,
        year: Option<i32>,
    ) -> Result<(Vec<NaiveDate>, bool), HabitError> {
        let habit = self.get(id)?;
        match year {
            Some(year) => {
                let dates =
                    schedule::expand_in_year(habit.start_date, habit.end_date, habit.repeat, year)?;
                Ok((dates, false))
            }
            None => {
                let (dates, truncated) = schedule::expand_capped(
                    habit.start_date,
                    habit.end_date,
                    habit.repeat,
                    MAX_SCHEDULE_DATES,
                )?;
                if truncated {
                    warn!(habit = %id, limit = MAX_SCHEDULE_DATES, "schedule truncated");
                }
                Ok((dates, truncated))
            }
        }
    }

    pub fn due_on(&self, date: NaiveDate) -> Vec<Occurrence> {
        self.habits
            .iter()
            .filter(|habit| habit.is_due(date))
            .map(|habit| occurrence(habit, date))
            .collect()
    }

    /// Every logged entry, newest first, then by habit name.
    pub fn history(&self) -> Vec<Occurrence> {
        let mut entries: Vec<Occurrence> = self
            .habits
            .iter()
            .flat_map(|habit| {
                habit.logs.entries().map(move |(date, value)| Occurrence {
                    date,
                    habit_id: habit.id,
                    name: habit.name.clone(),
                    kind: habit.kind,
                    value: Some(value),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
        entries
    }

    /// Due dates of every habit inside `[from, to]`, in habit order then
    /// date order.
    pub fn occurrences(&self, from: NaiveDate, to: NaiveDate) -> Vec<Occurrence> {
        self.habits
            .iter()
            .flat_map(|habit| {
                let dates = habit.due_between(from, to).unwrap_or_else(|err| {
                    warn!(habit = %habit.id, "skipping habit in calendar export: {err}");
                    Vec::new()
                });
                dates.into_iter().map(move |date| occurrence(habit, date))
            })
            .collect()
    }

    pub fn heatmap(&self, target: GridTarget, year: i32) -> Result<HeatmapGrid, HabitError> {
        match target {
            GridTarget::All => Ok(build_grid(&self.habits, year)),
            GridTarget::Habit(id) => Ok(build_grid([self.get(id)?], year)),
        }
    }
}

fn occurrence(habit: &Habit, date: NaiveDate) -> Occurrence {
    Occurrence {
        date,
        habit_id: habit.id,
        name: habit.name.clone(),
        kind: habit.kind,
        value: habit.logs.entry(date),
    }
}

fn validate_name(name: &str) -> Result<String, HabitError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HabitKind, Repeat};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exercise() -> NewHabit {
        NewHabit {
            name: "Exercise".to_string(),
            repeat: Repeat::Daily,
            kind: HabitKind::Boolean,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 3),
        }
    }

    #[test]
    fn add_assigns_unique_ids_even_for_duplicate_names() {
        let mut book = HabitBook::default();
        let first = book.add(exercise()).unwrap().id;
        let second = book.add(exercise()).unwrap().id;
        assert_ne!(first, second);
        assert_eq!(book.list().len(), 2);

        book.log(second, date(2024, 1, 2), 1).unwrap();
        assert_eq!(book.completion(first, date(2024, 1, 2)).unwrap(), None);
        assert_eq!(book.completion(second, date(2024, 1, 2)).unwrap(), Some(1));
    }

    #[test]
    fn add_rejects_blank_name_and_inverted_range() {
        let mut book = HabitBook::default();
        let blank = NewHabit {
            name: "   ".to_string(),
            ..exercise()
        };
        assert_eq!(book.add(blank).unwrap_err(), HabitError::EmptyName);

        let inverted = NewHabit {
            start_date: date(2024, 2, 1),
            end_date: date(2024, 1, 1),
            ..exercise()
        };
        assert!(matches!(
            book.add(inverted).unwrap_err(),
            HabitError::InvalidRange { .. }
        ));
        assert!(book.list().is_empty());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut book = HabitBook::default();
        let missing = HabitId::new();
        assert_eq!(book.get(missing).unwrap_err(), HabitError::NotFound(missing));
        assert_eq!(
            book.log(missing, date(2024, 1, 1), 1).unwrap_err(),
            HabitError::NotFound(missing)
        );
        assert_eq!(book.remove(missing).unwrap_err(), HabitError::NotFound(missing));
        assert_eq!(
            book.heatmap(GridTarget::Habit(missing), 2024).unwrap_err(),
            HabitError::NotFound(missing)
        );
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut book = HabitBook::default();
        let id = book.add(exercise()).unwrap().id;

        let bad = HabitChanges {
            name: Some("Run".to_string()),
            end_date: Some(date(2023, 12, 1)),
            ..Default::default()
        };
        assert!(book.update(id, bad).is_err());
        assert_eq!(book.get(id).unwrap().name, "Exercise");

        let good = HabitChanges {
            name: Some(" Run ".to_string()),
            repeat: Some(Repeat::Weekly),
            end_date: Some(date(2024, 1, 22)),
            ..Default::default()
        };
        let habit = book.update(id, good).unwrap();
        assert_eq!(habit.name, "Run");
        assert_eq!(
            book.schedule(id, None).unwrap().0,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22)
            ]
        );
    }

    #[test]
    fn log_rejects_values_outside_kind() {
        let mut book = HabitBook::default();
        let id = book.add(exercise()).unwrap().id;
        assert!(matches!(
            book.log(id, date(2024, 1, 1), 5).unwrap_err(),
            HabitError::InvalidValue { value: 5, .. }
        ));
        assert_eq!(book.completion(id, date(2024, 1, 1)).unwrap(), None);
    }

    #[test]
    fn due_on_reports_logged_values() {
        let mut book = HabitBook::default();
        let id = book.add(exercise()).unwrap().id;
        book.add(NewHabit {
            name: "Journal".to_string(),
            repeat: Repeat::Weekly,
            kind: HabitKind::Percentage,
            start_date: date(2024, 1, 3),
            end_date: date(2024, 3, 1),
        })
        .unwrap();
        book.log(id, date(2024, 1, 2), 1).unwrap();

        let due = book.due_on(date(2024, 1, 2));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].habit_id, id);
        assert_eq!(due[0].value, Some(1));

        let due = book.due_on(date(2024, 1, 3));
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|occurrence| occurrence.value.is_none()));
    }

    #[test]
    fn history_orders_newest_first_then_name() {
        let mut book = HabitBook::default();
        let a = book.add(NewHabit {
            name: "Walk".to_string(),
            ..exercise()
        })
        .unwrap()
        .id;
        let b = book.add(exercise()).unwrap().id;
        book.log(a, date(2024, 1, 1), 1).unwrap();
        book.log(a, date(2024, 1, 2), 0).unwrap();
        book.log(b, date(2024, 1, 2), 1).unwrap();

        let history = book.history();
        let rows: Vec<(NaiveDate, &str)> = history
            .iter()
            .map(|entry| (entry.date, entry.name.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (date(2024, 1, 2), "Exercise"),
                (date(2024, 1, 2), "Walk"),
                (date(2024, 1, 1), "Walk")
            ]
        );
    }

    #[test]
    fn occurrences_cover_every_due_date() {
        let mut book = HabitBook::default();
        let id = book.add(exercise()).unwrap().id;
        book.log(id, date(2024, 1, 2), 1).unwrap();

        let occurrences = book.occurrences(date(2023, 1, 1), date(2025, 1, 1));
        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[1].value, Some(1));
        assert_eq!(occurrences[2].value, None);
    }

    #[test]
    fn open_ended_habit_stays_bounded() {
        let mut book = HabitBook::default();
        let id = book
            .add(NewHabit {
                start_date: date(2024, 1, 1),
                end_date: date(9999, 12, 31),
                ..exercise()
            })
            .unwrap()
            .id;

        let occurrences = book.occurrences(date(2025, 1, 1), date(2026, 12, 31));
        assert_eq!(occurrences.len(), 730);
        assert_eq!(occurrences.first().map(|o| o.date), Some(date(2025, 1, 1)));
        assert_eq!(occurrences.last().map(|o| o.date), Some(date(2026, 12, 31)));

        let (dates, truncated) = book.schedule(id, None).unwrap();
        assert_eq!(dates.len(), MAX_SCHEDULE_DATES);
        assert!(truncated);

        let (dates, truncated) = book.schedule(id, Some(2025)).unwrap();
        assert_eq!(dates.len(), 7 * 52);
        assert!(!truncated);
    }

    #[test]
    fn add_returns_the_pushed_habit() {
        let mut book = HabitBook::default();
        book.add(exercise()).unwrap();
        let added = book
            .add(NewHabit {
                name: "Journal".to_string(),
                ..exercise()
            })
            .unwrap()
            .clone();
        assert_eq!(added.name, "Journal");
        assert_eq!(book.list().last(), Some(&added));
    }

    #[test]
    fn heatmap_for_single_habit_and_all() {
        let mut book = HabitBook::default();
        let id = book.add(exercise()).unwrap().id;
        let other = book.add(exercise()).unwrap().id;
        book.log(id, date(2024, 1, 2), 1).unwrap();
        book.log(other, date(2024, 1, 2), 1).unwrap();

        let single = book.heatmap(GridTarget::Habit(id), 2024).unwrap();
        assert_eq!(single.cell_for(date(2024, 1, 2)).unwrap().value, 1);

        let all = book.heatmap(GridTarget::All, 2024).unwrap();
        assert_eq!(all.cell_for(date(2024, 1, 2)).unwrap().value, 2);
        assert_eq!(all.cell_for(date(2024, 1, 1)).unwrap().value, 0);
    }

    #[test]
    fn remove_drops_habit_and_its_ledger() {
        let mut book = HabitBook::default();
        let id = book.add(exercise()).unwrap().id;
        book.log(id, date(2024, 1, 1), 1).unwrap();
        let removed = book.remove(id).unwrap();
        assert_eq!(removed.logs.len(), 1);
        assert!(book.history().is_empty());
    }
}
