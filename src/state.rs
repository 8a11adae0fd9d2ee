use crate::calendar::export_window;
use crate::errors::{AppError, HabitError};
use crate::models::Habit;
use crate::repository::HabitRepository;
use crate::sync::CalendarPublisher;
use crate::tracker::HabitBook;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub book: Arc<Mutex<HabitBook>>,
    pub repository: Arc<dyn HabitRepository>,
    pub publisher: CalendarPublisher,
}

impl AppState {
    pub fn new(
        habits: Vec<Habit>,
        repository: Arc<dyn HabitRepository>,
        publisher: CalendarPublisher,
    ) -> Self {
        Self {
            book: Arc::new(Mutex::new(HabitBook::new(habits))),
            repository,
            publisher,
        }
    }

    /// Runs `apply` on a copy of the book and keeps the copy only once it
    /// has been saved. A failed change or a failed save leaves the book as
    /// it was.
    pub async fn commit<T, F>(&self, apply: F) -> Result<T, AppError>
    where
        T: Send,
        F: FnOnce(&mut HabitBook) -> Result<T, HabitError> + Send,
    {
        let mut book = self.book.lock().await;
        let mut draft = book.clone();
        let outcome = apply(&mut draft)?;
        self.persist(&draft).await?;
        *book = draft;
        Ok(outcome)
    }

    /// Saves the whole habit set, then refreshes the calendar export.
    async fn persist(&self, book: &HabitBook) -> Result<(), AppError> {
        self.repository.save(book.list()).await?;
        let (from, to) = export_window(Local::now().date_naive());
        if let Err(err) = self.publisher.publish(&book.occurrences(from, to)).await {
            error!("failed to write calendar export: {err}");
        }
        Ok(())
    }
}
