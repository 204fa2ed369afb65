use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use std::collections::HashSet;

use crate::db::StoreError;
use crate::models::{
  EvaluationCriterion, Exercise, NewExercise, NewTraining, Training, TrainingStatus, TrainingType,
};

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS: &str = "10";

/// ---------------------------------------------------------------------------
/// History
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistoryEntry {
  pub id: i64,
  pub name: String,
  pub date: NaiveDate,
  pub training_type: TrainingType,
  pub exercise_count: usize,
  pub athlete_count: u32,
}

/// Completed trainings, newest first
pub fn training_history(trainings: &[Training]) -> Vec<TrainingHistoryEntry> {
  let mut entries: Vec<TrainingHistoryEntry> = trainings
    .iter()
    .filter(|t| t.status == TrainingStatus::Completed)
    .map(|t| TrainingHistoryEntry {
      id: t.id,
      name: t.name.clone(),
      date: t.date,
      training_type: t.training_type,
      exercise_count: t.exercises.len(),
      athlete_count: t.athlete_count,
    })
    .collect();

  entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
  entries
}

/// ---------------------------------------------------------------------------
/// Validation
/// ---------------------------------------------------------------------------

/// First `{prefix}{n}` not already taken, counting from `taken.len() + 1`
fn next_id(prefix: &str, taken: &HashSet<String>) -> String {
  let mut n = taken.len() + 1;
  loop {
    let candidate = format!("{}{}", prefix, n);
    if !taken.contains(&candidate) {
      return candidate;
    }
    n += 1;
  }
}

fn criterion_ids(training: &Training) -> HashSet<String> {
  training
    .global_criteria
    .iter()
    .chain(training.exercises.iter().flat_map(|e| e.criteria.iter()))
    .map(|c| c.id.clone())
    .collect()
}

/// Check names and weights, assign ids to blank criteria and reject
/// ids that collide with `taken`. Accepted ids are added to `taken`.
fn prepare_criteria(
  criteria: &[EvaluationCriterion],
  taken: &mut HashSet<String>,
) -> Result<Vec<EvaluationCriterion>, StoreError> {
  let mut prepared = Vec::with_capacity(criteria.len());

  for criterion in criteria {
    if criterion.name.trim().is_empty() {
      return Err(StoreError::Invalid("Criterion name is required".to_string()));
    }
    if !(1..=5).contains(&criterion.weight) {
      return Err(StoreError::Invalid(format!(
        "Criterion {} weight must be 1-5, got {}",
        criterion.name, criterion.weight
      )));
    }

    let mut criterion = criterion.clone();
    if criterion.id.trim().is_empty() {
      criterion.id = next_id("c", taken);
    } else if taken.contains(&criterion.id) {
      return Err(StoreError::Invalid(format!(
        "Duplicate criterion id: {}",
        criterion.id
      )));
    }
    taken.insert(criterion.id.clone());
    prepared.push(criterion);
  }

  Ok(prepared)
}

/// Build the exercise that `add_exercise` would append
pub fn build_exercise(training: &Training, input: &NewExercise) -> Result<Exercise, StoreError> {
  if input.name.trim().is_empty() {
    return Err(StoreError::Invalid("Exercise name is required".to_string()));
  }

  let exercise_ids: HashSet<String> = training.exercises.iter().map(|e| e.id.clone()).collect();
  let mut taken = criterion_ids(training);
  let criteria = prepare_criteria(&input.criteria, &mut taken)?;

  let reps = input
    .reps
    .as_deref()
    .map(str::trim)
    .filter(|r| !r.is_empty())
    .unwrap_or(DEFAULT_REPS)
    .to_string();

  Ok(Exercise {
    id: next_id("e", &exercise_ids),
    name: input.name.trim().to_string(),
    description: input.description.clone(),
    sets: input.sets.filter(|s| *s > 0).unwrap_or(DEFAULT_SETS),
    reps,
    rest_seconds: input.rest_seconds.unwrap_or(0),
    criteria,
  })
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

const TRAINING_COLUMNS: &str = r#"
  id, name, date, description, training_type, status, athlete_count,
  exercises_json, global_criteria_json
"#;

fn training_from_row(row: &SqliteRow) -> Result<Training, StoreError> {
  let training_type: String = row.try_get("training_type")?;
  let status: String = row.try_get("status")?;
  let athlete_count: i64 = row.try_get("athlete_count")?;
  let exercises_json: String = row.try_get("exercises_json")?;
  let global_criteria_json: String = row.try_get("global_criteria_json")?;

  Ok(Training {
    id: row.try_get("id")?,
    name: row.try_get("name")?,
    date: row.try_get("date")?,
    description: row.try_get("description")?,
    training_type: training_type.parse().map_err(StoreError::Corrupt)?,
    status: status.parse().map_err(StoreError::Corrupt)?,
    athlete_count: u32::try_from(athlete_count)
      .map_err(|_| StoreError::Corrupt(format!("athlete_count out of range: {}", athlete_count)))?,
    exercises: serde_json::from_str(&exercises_json)?,
    global_criteria: serde_json::from_str(&global_criteria_json)?,
  })
}

/// Load all trainings, newest date first
pub async fn load_all_trainings(pool: &SqlitePool) -> Result<Vec<Training>, StoreError> {
  let rows = sqlx::query(&format!(
    "SELECT {} FROM trainings ORDER BY date DESC, id DESC",
    TRAINING_COLUMNS
  ))
  .fetch_all(pool)
  .await?;

  let trainings = rows
    .iter()
    .map(training_from_row)
    .collect::<Result<Vec<_>, _>>()?;

  tracing::debug!(count = trainings.len(), "Loaded trainings");
  Ok(trainings)
}

pub async fn load_training(pool: &SqlitePool, id: i64) -> Result<Training, StoreError> {
  let row = sqlx::query(&format!("SELECT {} FROM trainings WHERE id = ?1", TRAINING_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound {
      entity: "Training",
      id,
    })?;

  training_from_row(&row)
}

/// Store a complete training as given (id is ignored)
pub async fn insert_training<'e, E>(executor: E, training: &Training) -> Result<i64, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let result = sqlx::query(
    r#"
    INSERT INTO trainings (
      name, date, description, training_type, status, athlete_count,
      exercises_json, global_criteria_json
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
  )
  .bind(&training.name)
  .bind(training.date)
  .bind(&training.description)
  .bind(training.training_type.as_str())
  .bind(training.status.to_string())
  .bind(i64::from(training.athlete_count))
  .bind(serde_json::to_string(&training.exercises)?)
  .bind(serde_json::to_string(&training.global_criteria)?)
  .execute(executor)
  .await?;

  Ok(result.last_insert_rowid())
}

/// Create a planned training with no exercises yet
pub async fn create_training(pool: &SqlitePool, input: &NewTraining) -> Result<i64, StoreError> {
  if input.name.trim().is_empty() {
    return Err(StoreError::Invalid("Training name is required".to_string()));
  }

  let mut taken = HashSet::new();
  let global_criteria = prepare_criteria(&input.global_criteria, &mut taken)?;

  let training = Training {
    id: 0,
    name: input.name.trim().to_string(),
    date: input.date,
    description: input.description.clone(),
    training_type: input.training_type.unwrap_or(TrainingType::Mixed),
    status: TrainingStatus::Planned,
    athlete_count: input.athlete_count,
    exercises: Vec::new(),
    global_criteria,
  };

  let id = insert_training(pool, &training).await?;
  tracing::info!(training_id = id, name = %training.name, date = %training.date, "Created training");
  Ok(id)
}

/// Append an exercise to a training that has not been completed
pub async fn add_exercise(
  pool: &SqlitePool,
  training_id: i64,
  input: &NewExercise,
) -> Result<Exercise, StoreError> {
  let mut training = load_training(pool, training_id).await?;

  if training.status == TrainingStatus::Completed {
    return Err(StoreError::Invalid(format!(
      "Training {} is completed and can no longer be edited",
      training_id
    )));
  }

  let exercise = build_exercise(&training, input)?;
  training.exercises.push(exercise.clone());

  sqlx::query(
    "UPDATE trainings SET exercises_json = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
  )
  .bind(serde_json::to_string(&training.exercises)?)
  .bind(training_id)
  .execute(pool)
  .await?;

  tracing::info!(training_id, exercise_id = %exercise.id, "Added exercise");
  Ok(exercise)
}

async fn change_status(
  pool: &SqlitePool,
  training_id: i64,
  to: TrainingStatus,
) -> Result<Training, StoreError> {
  let mut training = load_training(pool, training_id).await?;
  let from = training.status;
  training.status = from.transition(to)?;

  sqlx::query("UPDATE trainings SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2")
    .bind(training.status.to_string())
    .bind(training_id)
    .execute(pool)
    .await?;

  tracing::info!(training_id, %from, to = %training.status, "Training status changed");
  Ok(training)
}

pub async fn start_training(pool: &SqlitePool, training_id: i64) -> Result<Training, StoreError> {
  change_status(pool, training_id, TrainingStatus::InProgress).await
}

pub async fn complete_training(pool: &SqlitePool, training_id: i64) -> Result<Training, StoreError> {
  change_status(pool, training_id, TrainingStatus::Completed).await
}

/// Delete a training; its results go with it, calendar events are unlinked
pub async fn delete_training(pool: &SqlitePool, training_id: i64) -> Result<(), StoreError> {
  let mut tx = pool.begin().await?;

  sqlx::query("DELETE FROM session_results WHERE training_id = ?1")
    .bind(training_id)
    .execute(&mut *tx)
    .await?;

  sqlx::query("UPDATE calendar_events SET training_id = NULL WHERE training_id = ?1")
    .bind(training_id)
    .execute(&mut *tx)
    .await?;

  let result = sqlx::query("DELETE FROM trainings WHERE id = ?1")
    .bind(training_id)
    .execute(&mut *tx)
    .await?;

  if result.rows_affected() == 0 {
    tx.rollback().await?;
    return Err(StoreError::NotFound {
      entity: "Training",
      id: training_id,
    });
  }

  tx.commit().await?;
  tracing::info!(training_id, "Deleted training");
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
