//! Tauri commands for the athlete roster and performance outlook

use std::sync::Arc;
use tauri::State;

use crate::athletes::{
    delete_athlete, insert_athlete, load_all_athletes, load_athlete, record_performance,
    search_athletes, update_athlete, update_cycle,
};
use crate::db::{AppState, StoreError};
use crate::models::{Athlete, NewAthlete};
use crate::prediction::{CycleContext, PerformanceOutlook, PerformanceRecord};

/// Get all athletes with their histories
#[tauri::command]
pub async fn get_athletes(state: State<'_, Arc<AppState>>) -> Result<Vec<Athlete>, StoreError> {
    load_all_athletes(&state.db).await
}

#[tauri::command]
pub async fn get_athlete(state: State<'_, Arc<AppState>>, id: i64) -> Result<Athlete, StoreError> {
    load_athlete(&state.db, id).await
}

/// Filter the roster by name or sport
#[tauri::command]
pub async fn find_athletes(
    state: State<'_, Arc<AppState>>,
    query: String,
) -> Result<Vec<Athlete>, StoreError> {
    let athletes = load_all_athletes(&state.db).await?;
    Ok(search_athletes(&athletes, &query).into_iter().cloned().collect())
}

#[tauri::command]
pub async fn create_athlete(
    state: State<'_, Arc<AppState>>,
    athlete: NewAthlete,
) -> Result<Athlete, StoreError> {
    let id = insert_athlete(&state.db, &athlete).await?;
    load_athlete(&state.db, id).await
}

#[tauri::command]
pub async fn edit_athlete(
    state: State<'_, Arc<AppState>>,
    id: i64,
    athlete: NewAthlete,
) -> Result<Athlete, StoreError> {
    update_athlete(&state.db, id, &athlete).await?;
    load_athlete(&state.db, id).await
}

#[tauri::command]
pub async fn remove_athlete(state: State<'_, Arc<AppState>>, id: i64) -> Result<(), StoreError> {
    delete_athlete(&state.db, id).await
}

/// Move an athlete to another phase or micro-cycle week
#[tauri::command]
pub async fn set_athlete_cycle(
    state: State<'_, Arc<AppState>>,
    id: i64,
    cycle: CycleContext,
) -> Result<(), StoreError> {
    update_cycle(&state.db, id, &cycle).await
}

/// Append a measured result, stamped with the forecast made before it
#[tauri::command]
pub async fn add_performance_record(
    state: State<'_, Arc<AppState>>,
    id: i64,
    period: String,
    actual: f64,
) -> Result<PerformanceRecord, StoreError> {
    record_performance(&state.db, id, &period, actual).await
}

/// Forecast, trend, deviation and chart series for one athlete
#[tauri::command]
pub async fn get_athlete_outlook(
    state: State<'_, Arc<AppState>>,
    id: i64,
) -> Result<PerformanceOutlook, StoreError> {
    let athlete = load_athlete(&state.db, id).await?;
    Ok(PerformanceOutlook::compute(
        &athlete.performance_history,
        &athlete.cycle,
        athlete.improvement_direction,
    ))
}

/// Age in full years as of today
#[tauri::command]
pub async fn get_athlete_age(state: State<'_, Arc<AppState>>, id: i64) -> Result<i32, StoreError> {
    let athlete = load_athlete(&state.db, id).await?;
    Ok(athlete.age_on(chrono::Local::now().date_naive()))
}
