pub mod athletes;
pub mod calendar;
pub mod results;
pub mod statistics;
pub mod trainings;

use crate::db::{AppState, StoreError};
use crate::seed;
use std::sync::Arc;
use tauri::State;

/// Restore default athletes and trainings, dropping results and events
#[tauri::command]
pub async fn reset_to_defaults(state: State<'_, Arc<AppState>>) -> Result<(), StoreError> {
  seed::reset_to_defaults(&state.db).await
}

/// Delete all stored data
#[tauri::command]
pub async fn clear_all_data(state: State<'_, Arc<AppState>>) -> Result<(), StoreError> {
  seed::clear_all(&state.db).await
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
