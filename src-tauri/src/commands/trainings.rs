//! Tauri commands for trainings and their status machine

use std::sync::Arc;
use tauri::State;

use crate::db::{AppState, StoreError};
use crate::models::{Exercise, NewExercise, NewTraining, Training};
use crate::trainings::{
    add_exercise, complete_training, create_training, delete_training, load_all_trainings,
    load_training, start_training, training_history, TrainingHistoryEntry,
};

/// Get all trainings, newest first
#[tauri::command]
pub async fn get_trainings(state: State<'_, Arc<AppState>>) -> Result<Vec<Training>, StoreError> {
    load_all_trainings(&state.db).await
}

#[tauri::command]
pub async fn get_training(state: State<'_, Arc<AppState>>, id: i64) -> Result<Training, StoreError> {
    load_training(&state.db, id).await
}

/// Create a planned training with no exercises
#[tauri::command]
pub async fn new_training(
    state: State<'_, Arc<AppState>>,
    training: NewTraining,
) -> Result<Training, StoreError> {
    let id = create_training(&state.db, &training).await?;
    load_training(&state.db, id).await
}

#[tauri::command]
pub async fn append_exercise(
    state: State<'_, Arc<AppState>>,
    training_id: i64,
    exercise: NewExercise,
) -> Result<Exercise, StoreError> {
    add_exercise(&state.db, training_id, &exercise).await
}

/// planned -> in_progress
#[tauri::command]
pub async fn begin_training(state: State<'_, Arc<AppState>>, id: i64) -> Result<Training, StoreError> {
    start_training(&state.db, id).await
}

/// in_progress -> completed
#[tauri::command]
pub async fn finish_training(state: State<'_, Arc<AppState>>, id: i64) -> Result<Training, StoreError> {
    complete_training(&state.db, id).await
}

#[tauri::command]
pub async fn remove_training(state: State<'_, Arc<AppState>>, id: i64) -> Result<(), StoreError> {
    delete_training(&state.db, id).await
}

/// Completed trainings with exercise and athlete counts
#[tauri::command]
pub async fn get_training_history(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<TrainingHistoryEntry>, StoreError> {
    let trainings = load_all_trainings(&state.db).await?;
    Ok(training_history(&trainings))
}
