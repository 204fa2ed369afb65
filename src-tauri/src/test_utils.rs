//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use crate::athletes::{insert_athlete, insert_history_record};
use crate::db::connect;
use crate::models::{
  Athlete, EvaluationCriterion, Exercise, Gender, NewAthlete, Training, TrainingStatus, TrainingType,
};
use crate::prediction::{CycleContext, CyclePhase, ImprovementDirection, PerformanceRecord};
use crate::results::Scale;
use crate::trainings::insert_training;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  connect("sqlite::memory:", 1)
    .await
    .expect("Failed to create in-memory database")
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed two athletes: a sprinter (lower is better, 3 records)
/// and a long jumper (higher is better, 2 records)
/// Returns their IDs in that order
pub async fn seed_test_athletes(pool: &SqlitePool) -> Vec<i64> {
  let mut sprinter = mock_new_athlete("Oleksandr Petrenko");
  sprinter.cycle = CycleContext::new(CyclePhase::Preparatory, 3);

  let mut jumper = mock_new_athlete("Maria Kovalenko");
  jumper.gender = Gender::Female;
  jumper.specialization = "Long jump".to_string();
  jumper.cycle = CycleContext::new(CyclePhase::Competitive, 2);
  jumper.improvement_direction = ImprovementDirection::HigherIsBetter;

  let athletes = [
    (
      sprinter,
      vec![
        PerformanceRecord::new("W1", 10.95, None),
        PerformanceRecord::new("W2", 10.88, Some(10.9)),
        PerformanceRecord::new("W3", 10.82, Some(10.84)),
      ],
    ),
    (
      jumper,
      vec![
        PerformanceRecord::new("W1", 5.8, Some(5.82)),
        PerformanceRecord::new("W2", 5.88, Some(5.9)),
      ],
    ),
  ];

  let mut ids = Vec::new();
  for (profile, history) in athletes {
    let id = insert_athlete(pool, &profile)
      .await
      .expect("Failed to seed athlete");
    for record in &history {
      insert_history_record(pool, id, record)
        .await
        .expect("Failed to seed performance record");
    }
    ids.push(id);
  }

  ids
}

/// Seed a completed training (the `mock_training` layout) and a later,
/// empty planned one. Returns their IDs in that order
pub async fn seed_test_trainings(pool: &SqlitePool) -> Vec<i64> {
  let completed = mock_training();

  let planned = Training {
    id: 0,
    name: "Acceleration work".to_string(),
    date: NaiveDate::from_ymd_opt(2026, 1, 20).expect("valid date"),
    description: String::new(),
    training_type: TrainingType::Speed,
    status: TrainingStatus::Planned,
    athlete_count: 6,
    exercises: Vec::new(),
    global_criteria: Vec::new(),
  };

  let mut ids = Vec::new();
  for training in [completed, planned] {
    ids.push(
      insert_training(pool, &training)
        .await
        .expect("Failed to seed training"),
    );
  }
  ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

fn mock_criterion(id: &str, scale: &str) -> EvaluationCriterion {
  EvaluationCriterion {
    id: id.to_string(),
    name: format!("Criterion {}", id),
    description: String::new(),
    scale: Scale::parse(scale),
    weight: 3,
  }
}

fn mock_exercise(id: &str, name: &str, criteria: Vec<EvaluationCriterion>) -> Exercise {
  Exercise {
    id: id.to_string(),
    name: name.to_string(),
    description: String::new(),
    sets: 4,
    reps: "8".to_string(),
    rest_seconds: 90,
    criteria,
  }
}

/// Completed strength training dated 2026-01-12
///
/// - e1: c1 (pass/fail), c2 (1-5)
/// - e2: c3 (1-5)
/// - e3: no criteria
/// - global: gc1 (1-10), gc2 (1-10)
pub fn mock_training() -> Training {
  Training {
    id: 1,
    name: "Strength session".to_string(),
    date: NaiveDate::from_ymd_opt(2026, 1, 12).expect("valid date"),
    description: "Lower-body focus".to_string(),
    training_type: TrainingType::Strength,
    status: TrainingStatus::Completed,
    athlete_count: 8,
    exercises: vec![
      mock_exercise(
        "e1",
        "Back squat",
        vec![mock_criterion("c1", "pass/fail"), mock_criterion("c2", "1-5")],
      ),
      mock_exercise("e2", "Bench press", vec![mock_criterion("c3", "1-5")]),
      mock_exercise("e3", "Bent-over row", Vec::new()),
    ],
    global_criteria: vec![mock_criterion("gc1", "1-10"), mock_criterion("gc2", "1-10")],
  }
}

/// Sprinter profile born 2004-03-15
pub fn mock_new_athlete(name: &str) -> NewAthlete {
  NewAthlete {
    name: name.to_string(),
    date_of_birth: NaiveDate::from_ymd_opt(2004, 3, 15).expect("valid date"),
    gender: Gender::Male,
    sport: "Athletics".to_string(),
    specialization: "Sprint 100m".to_string(),
    qualification: String::new(),
    phone: String::new(),
    email: String::new(),
    height_cm: Some(182.0),
    weight_kg: Some(78.0),
    training_age_years: 6,
    cycle: CycleContext::default(),
    macro_cycle_name: String::new(),
    best_result: String::new(),
    target_result: String::new(),
    injury_notes: String::new(),
    improvement_direction: ImprovementDirection::LowerIsBetter,
  }
}

/// Athlete with the `mock_new_athlete` profile and no history
pub fn mock_athlete(id: i64, name: &str) -> Athlete {
  let profile = mock_new_athlete(name);
  Athlete {
    id,
    name: profile.name,
    date_of_birth: profile.date_of_birth,
    gender: profile.gender,
    sport: profile.sport,
    specialization: profile.specialization,
    qualification: profile.qualification,
    phone: profile.phone,
    email: profile.email,
    height_cm: profile.height_cm,
    weight_kg: profile.weight_kg,
    training_age_years: profile.training_age_years,
    cycle: profile.cycle,
    macro_cycle_name: profile.macro_cycle_name,
    best_result: profile.best_result,
    target_result: profile.target_result,
    injury_notes: profile.injury_notes,
    improvement_direction: profile.improvement_direction,
    performance_history: Vec::new(),
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_seed_athletes_returns_ids_with_history() {
    let pool = setup_test_db().await;

    let ids = seed_test_athletes(&pool).await;
    assert_eq!(ids.len(), 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performance_records")
      .fetch_one(&pool)
      .await
      .expect("Failed to count records");
    assert_eq!(count, 5);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_trainings_statuses() {
    let pool = setup_test_db().await;

    let ids = seed_test_trainings(&pool).await;
    let statuses: Vec<String> = sqlx::query_scalar("SELECT status FROM trainings ORDER BY id")
      .fetch_all(&pool)
      .await
      .expect("Failed to load statuses");

    assert_eq!(ids.len(), 2);
    assert_eq!(statuses, vec!["completed", "planned"]);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_training_layout() {
    let training = mock_training();
    assert!(training.find_criterion("c2").is_some());
    assert!(training.find_criterion("gc1").is_some());
    assert_eq!(training.global_criteria[0].scale, Scale::Range { min: 1, max: 10 });
  }
}
