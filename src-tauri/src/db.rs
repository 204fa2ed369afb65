use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::PathBuf;
use tauri::Manager;

use crate::config::AppConfig;
use crate::models::training::TransitionError;
use crate::results::ResultError;
use crate::seed;

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Stored data is malformed: {0}")]
  Corrupt(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: i64 },

  #[error("Invalid input: {0}")]
  Invalid(String),

  #[error(transparent)]
  Transition(#[from] TransitionError),

  #[error(transparent)]
  Result(#[from] ResultError),

  #[error("App data directory unavailable: {0}")]
  DataDir(String),

  #[error("Failed to prepare data directory: {0}")]
  Io(#[from] std::io::Error),
}

impl Serialize for StoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Get the path to the database file inside the platform app data dir
fn get_db_path<R: tauri::Runtime>(
  app: &tauri::AppHandle<R>,
  config: &AppConfig,
) -> Result<PathBuf, StoreError> {
  let data_dir = app
    .path()
    .app_data_dir()
    .map_err(|e| StoreError::DataDir(e.to_string()))?;

  // Create directory if it doesn't exist
  fs::create_dir_all(&data_dir)?;

  Ok(data_dir.join(&config.db_file))
}

/// Open a pool and bring the schema up to date
pub async fn connect(db_url: &str, max_connections: u32) -> Result<DbPool, StoreError> {
  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect(db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  Ok(pool)
}

/// Initialize the database connection pool, run migrations and seed an empty store
pub async fn initialize_db<R: tauri::Runtime>(
  app: &tauri::AppHandle<R>,
  config: &AppConfig,
) -> Result<DbPool, StoreError> {
  let db_path = get_db_path(app, config)?;
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  tracing::info!(path = %db_path.display(), "Initializing database");

  let pool = connect(&db_url, 5).await?;

  if config.seed_defaults && seed::is_empty(&pool).await? {
    seed::seed_defaults(&pool).await?;
    tracing::info!("Seeded empty store with default dataset");
  }

  tracing::info!("Database initialized successfully");

  Ok(pool)
}
