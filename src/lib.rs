pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod grid;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod schedule;
pub mod state;
pub mod sync;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use errors::{AppError, HabitError, StorageError};
pub use grid::{build_grid, GridTarget, HeatmapGrid};
pub use ledger::CompletionLedger;
pub use repository::{HabitRepository, JsonFileRepository, MemoryRepository};
pub use state::AppState;
pub use tracker::HabitBook;
