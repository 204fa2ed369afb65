use crate::db::{AppState, StoreError};
use crate::results::{load_session_results, record_session_results, RecordSessionRequest, SessionResults};
use std::sync::Arc;
use tauri::State;

/// Validate and store one recording of a completed training
#[tauri::command]
pub async fn save_session_results(
  state: State<'_, Arc<AppState>>,
  request: RecordSessionRequest,
) -> Result<SessionResults, StoreError> {
  record_session_results(&state.db, &request).await
}

#[tauri::command]
pub async fn get_session_results(
  state: State<'_, Arc<AppState>>,
  training_id: i64,
) -> Result<Vec<SessionResults>, StoreError> {
  load_session_results(&state.db, training_id).await
}
