use crate::errors::{HabitError, StorageError};
use crate::models::Habit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::info;

/// Load-all/save-all persistence for the habit set.
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Absent storage is "no data yet" and yields an empty set.
    async fn load(&self) -> Result<Vec<Habit>, StorageError>;

    async fn save(&self, habits: &[Habit]) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HabitFile {
    #[serde(default)]
    habits: Vec<Habit>,
}

/// Stores every habit row, including its completion log, in one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HabitRepository for JsonFileRepository {
    async fn load(&self) -> Result<Vec<Habit>, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no habit data yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        let file: HabitFile = serde_json::from_slice(&bytes)?;
        check_rows(&file.habits)?;
        Ok(file.habits)
    }

    async fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let file = HabitFile {
            habits: habits.to_vec(),
        };
        let payload = serde_json::to_vec_pretty(&file)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

/// Rejects stored rows the habit book would never have produced.
fn check_rows(habits: &[Habit]) -> Result<(), HabitError> {
    let mut seen = HashSet::with_capacity(habits.len());
    for habit in habits {
        habit.validate()?;
        if !seen.insert(habit.id) {
            return Err(HabitError::DuplicateId(habit.id));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    habits: Mutex<Vec<Habit>>,
}

impl MemoryRepository {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self {
            habits: Mutex::new(habits),
        }
    }
}

#[async_trait]
impl HabitRepository for MemoryRepository {
    async fn load(&self) -> Result<Vec<Habit>, StorageError> {
        Ok(self.habits.lock().await.clone())
    }

    async fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        *self.habits.lock().await = habits.to_vec();
        Ok(())
    }
}
