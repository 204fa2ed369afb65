use crate::athletes::load_all_athletes;
use crate::db::{AppState, StoreError};
use crate::statistics::{
  athlete_progress, period_summary, training_volume_by_month, type_distribution, AthleteProgress,
  DashboardStats, MonthlyVolume, PeriodSummary, StatsPeriod, TypeShare,
};
use crate::trainings::load_all_trainings;
use serde::Serialize;
use std::sync::Arc;
use tauri::State;

fn today() -> chrono::NaiveDate {
  chrono::Local::now().date_naive()
}

#[tauri::command]
pub async fn get_dashboard_stats(
  state: State<'_, Arc<AppState>>,
) -> Result<DashboardStats, StoreError> {
  let athletes = load_all_athletes(&state.db).await?;
  let trainings = load_all_trainings(&state.db).await?;
  Ok(DashboardStats::compute(&athletes, &trainings, today()))
}

#[derive(Debug, Serialize)]
pub struct StatisticsReport {
  pub summary: PeriodSummary,
  pub volume_by_month: Vec<MonthlyVolume>,
  pub type_distribution: Vec<TypeShare>,
  pub athlete_progress: Vec<AthleteProgress>,
}

/// Everything the statistics page shows for one period
#[tauri::command]
pub async fn get_statistics(
  state: State<'_, Arc<AppState>>,
  period: Option<StatsPeriod>,
) -> Result<StatisticsReport, StoreError> {
  let athletes = load_all_athletes(&state.db).await?;
  let trainings = load_all_trainings(&state.db).await?;

  Ok(StatisticsReport {
    summary: period_summary(&trainings, period.unwrap_or_default(), today()),
    volume_by_month: training_volume_by_month(&trainings),
    type_distribution: type_distribution(&trainings),
    athlete_progress: athletes.iter().filter_map(athlete_progress).collect(),
  })
}
