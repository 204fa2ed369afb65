mod athletes;
mod calendar;
mod commands;
mod config;
mod db;
mod models;
mod prediction;
mod results;
mod seed;
mod statistics;
mod trainings;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use db::AppState;
use std::sync::Arc;
use tauri::Manager;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
  let filter = EnvFilter::try_new(&config.log_filter)
    .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

  // A subscriber may already be installed (e.g. by a test harness)
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = match AppConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("Invalid configuration, using defaults: {}", e);
      AppConfig::default()
    }
  };
  init_tracing(&config);

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(move |app| {
      // Initialize database
      let app_handle = app.handle().clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle, &config).await {
          Ok(pool) => {
            let state = Arc::new(AppState { db: pool, config });
            tracing::info!(db_file = %state.config.db_file, "Database ready");
            app_handle.manage(state);
          }
          Err(e) => {
            tracing::error!(error = %e, "Failed to initialize database");
          }
        }
      });
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      commands::reset_to_defaults,
      commands::clear_all_data,
      // Athlete commands
      commands::athletes::get_athletes,
      commands::athletes::get_athlete,
      commands::athletes::find_athletes,
      commands::athletes::create_athlete,
      commands::athletes::edit_athlete,
      commands::athletes::remove_athlete,
      commands::athletes::set_athlete_cycle,
      commands::athletes::add_performance_record,
      commands::athletes::get_athlete_outlook,
      commands::athletes::get_athlete_age,
      // Training commands
      commands::trainings::get_trainings,
      commands::trainings::get_training,
      commands::trainings::new_training,
      commands::trainings::append_exercise,
      commands::trainings::begin_training,
      commands::trainings::finish_training,
      commands::trainings::remove_training,
      commands::trainings::get_training_history,
      // Results commands
      commands::results::save_session_results,
      commands::results::get_session_results,
      // Calendar commands
      commands::calendar::get_month_view,
      commands::calendar::get_day_events,
      commands::calendar::create_calendar_event,
      commands::calendar::delete_calendar_event,
      // Statistics commands
      commands::statistics::get_dashboard_stats,
      commands::statistics::get_statistics,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
