//! Session result recording
//!
//! Raw form input arrives as loose JSON (number, string or bool depending on
//! the criterion). It is resolved here, once, against the criterion's scale
//! into a typed `ResultValue`; nothing untyped is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeMap, BTreeSet};

use crate::athletes::load_athlete;
use crate::db::StoreError;
use crate::models::{Training, TrainingStatus};
use crate::trainings::load_training;

/// ---------------------------------------------------------------------------
/// Scales
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
  Seconds,
  Meters,
  Kilograms,
}

impl MeasurementUnit {
  pub fn descriptor(&self) -> &'static str {
    match self {
      Self::Seconds => "time (s)",
      Self::Meters => "distance (m)",
      Self::Kilograms => "weight (kg)",
    }
  }
}

/// How a criterion is scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scale {
  /// Inclusive integer score, e.g. 1-5
  Range { min: i64, max: i64 },
  PassFail,
  Measurement { unit: MeasurementUnit },
  FreeText,
}

impl Scale {
  /// Resolve a scale descriptor ("1-10", "pass/fail", "time (s)", ...).
  /// Unrecognised descriptors are free text.
  pub fn parse(descriptor: &str) -> Self {
    let normalized = descriptor.trim().to_lowercase();

    if let Some((lo, hi)) = normalized.split_once('-') {
      if let (Ok(min), Ok(max)) = (lo.trim().parse::<i64>(), hi.trim().parse::<i64>()) {
        if min <= max {
          return Scale::Range { min, max };
        }
      }
    }

    // Ukrainian labels are what older stored trainings carry
    match normalized.as_str() {
      "pass/fail" | "прохідний/непрохідний" => Scale::PassFail,
      "time (s)" | "час (с)" => Scale::Measurement {
        unit: MeasurementUnit::Seconds,
      },
      "distance (m)" | "відстань (м)" => Scale::Measurement {
        unit: MeasurementUnit::Meters,
      },
      "weight (kg)" | "вага (кг)" => Scale::Measurement {
        unit: MeasurementUnit::Kilograms,
      },
      _ => Scale::FreeText,
    }
  }

  pub fn descriptor(&self) -> String {
    match self {
      Scale::Range { min, max } => format!("{}-{}", min, max),
      Scale::PassFail => "pass/fail".to_string(),
      Scale::Measurement { unit } => unit.descriptor().to_string(),
      Scale::FreeText => "text".to_string(),
    }
  }

  /// Validate raw form input. Blank input (null or empty string) is `None`:
  /// the criterion simply was not scored.
  pub fn resolve(&self, raw: &Value) -> Result<Option<ResultValue>, ResultError> {
    match raw {
      Value::Null => return Ok(None),
      Value::String(s) if s.trim().is_empty() => return Ok(None),
      _ => {}
    }

    let value = match self {
      Scale::Range { min, max } => {
        let score = as_integer(raw).ok_or_else(|| mismatch("an integer score", raw))?;
        if score < *min || score > *max {
          return Err(ResultError::OutOfRange {
            value: score,
            min: *min,
            max: *max,
          });
        }
        ResultValue::Score(score)
      }
      Scale::PassFail => match raw {
        Value::Bool(true) => ResultValue::PassFail(PassFail::Pass),
        Value::Bool(false) => ResultValue::PassFail(PassFail::Fail),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
          "pass" => ResultValue::PassFail(PassFail::Pass),
          "fail" => ResultValue::PassFail(PassFail::Fail),
          _ => return Err(mismatch("pass or fail", raw)),
        },
        _ => return Err(mismatch("pass or fail", raw)),
      },
      Scale::Measurement { .. } => {
        let measured = as_float(raw)
          .filter(|v| v.is_finite() && *v >= 0.0)
          .ok_or_else(|| mismatch("a non-negative measurement", raw))?;
        ResultValue::Measurement(measured)
      }
      Scale::FreeText => match raw {
        Value::String(s) => ResultValue::Text(s.trim().to_string()),
        Value::Number(n) => ResultValue::Text(n.to_string()),
        _ => return Err(mismatch("text", raw)),
      },
    };

    Ok(Some(value))
  }
}

/// Accept a scale either as a descriptor string (`"1-10"`, `"pass/fail"`)
/// or in its tagged form (`{"kind": "range", "min": 1, "max": 10}`)
pub fn deserialize_scale<'de, D>(deserializer: D) -> Result<Scale, D::Error>
where
  D: serde::Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(descriptor) => Ok(Scale::parse(&descriptor)),
    tagged => serde_json::from_value(tagged).map_err(serde::de::Error::custom),
  }
}

fn as_integer(raw: &Value) -> Option<i64> {
  match raw {
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn as_float(raw: &Value) -> Option<f64> {
  match raw {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn mismatch(expected: &'static str, raw: &Value) -> ResultError {
  ResultError::TypeMismatch {
    expected,
    got: raw.to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Values and Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassFail {
  Pass,
  Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultValue {
  Score(i64),
  PassFail(PassFail),
  Measurement(f64),
  Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ResultError {
  #[error("Unknown criterion: {0}")]
  UnknownCriterion(String),

  #[error("Score {value} is outside {min}-{max}")]
  OutOfRange { value: i64, min: i64, max: i64 },

  #[error("Expected {expected}, got {got}")]
  TypeMismatch { expected: &'static str, got: String },

  #[error("Criterion {criterion_id} ({scale}): {source}")]
  Criterion {
    criterion_id: String,
    scale: String,
    source: Box<ResultError>,
  },
}

/// ---------------------------------------------------------------------------
/// Session Results
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
  pub criterion_id: String,
  pub value: ResultValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteTrainingResults {
  pub athlete_id: i64,
  pub athlete_name: String,
  /// Keyed by exercise id; every exercise of the training has an entry
  pub exercise_results: BTreeMap<String, Vec<CriterionResult>>,
  pub global_results: Vec<CriterionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResults {
  pub id: i64,
  pub training_id: i64,
  pub recorded_at: DateTime<Utc>,
  pub results: Vec<AthleteTrainingResults>,
}

/// Raw values entered for one athlete, keyed by criterion id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteResultInput {
  pub athlete_id: i64,
  #[serde(default)]
  pub values: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSessionRequest {
  pub training_id: i64,
  pub athletes: Vec<AthleteResultInput>,
}

/// Resolve one athlete's raw values against the training's criteria
pub fn resolve_athlete_results(
  training: &Training,
  athlete_id: i64,
  athlete_name: &str,
  values: &BTreeMap<String, Value>,
) -> Result<AthleteTrainingResults, ResultError> {
  if let Some(unknown) = values.keys().find(|id| training.find_criterion(id).is_none()) {
    return Err(ResultError::UnknownCriterion(unknown.clone()));
  }

  let resolve_list = |criteria: &[crate::models::EvaluationCriterion]| {
    let mut resolved = Vec::new();
    for criterion in criteria {
      let Some(raw) = values.get(&criterion.id) else {
        continue;
      };
      let value = criterion
        .scale
        .resolve(raw)
        .map_err(|e| ResultError::Criterion {
          criterion_id: criterion.id.clone(),
          scale: criterion.scale.descriptor(),
          source: Box::new(e),
        })?;
      if let Some(value) = value {
        resolved.push(CriterionResult {
          criterion_id: criterion.id.clone(),
          value,
        });
      }
    }
    Ok::<_, ResultError>(resolved)
  };

  let mut exercise_results = BTreeMap::new();
  for exercise in &training.exercises {
    exercise_results.insert(exercise.id.clone(), resolve_list(&exercise.criteria)?);
  }

  Ok(AthleteTrainingResults {
    athlete_id,
    athlete_name: athlete_name.to_string(),
    exercise_results,
    global_results: resolve_list(&training.global_criteria)?,
  })
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

/// Validate and store results for a completed training
pub async fn record_session_results(
  pool: &SqlitePool,
  request: &RecordSessionRequest,
) -> Result<SessionResults, StoreError> {
  let training = load_training(pool, request.training_id).await?;

  if training.status != TrainingStatus::Completed {
    return Err(StoreError::Invalid(format!(
      "Training {} is {}, results can only be recorded for completed trainings",
      training.id, training.status
    )));
  }

  let mut seen = BTreeSet::new();
  let mut results = Vec::with_capacity(request.athletes.len());
  for input in &request.athletes {
    if !seen.insert(input.athlete_id) {
      return Err(StoreError::Invalid(format!(
        "Athlete {} appears more than once",
        input.athlete_id
      )));
    }
    let athlete = load_athlete(pool, input.athlete_id).await?;
    results.push(resolve_athlete_results(
      &training,
      athlete.id,
      &athlete.name,
      &input.values,
    )?);
  }

  let recorded_at = Utc::now();
  let results_json = serde_json::to_string(&results)?;

  let id = sqlx::query(
    "INSERT INTO session_results (training_id, recorded_at, results_json) VALUES (?1, ?2, ?3)",
  )
  .bind(training.id)
  .bind(recorded_at)
  .bind(&results_json)
  .execute(pool)
  .await?
  .last_insert_rowid();

  tracing::info!(training_id = training.id, athletes = results.len(), "Recorded session results");

  Ok(SessionResults {
    id,
    training_id: training.id,
    recorded_at,
    results,
  })
}

/// Load all recordings for a training, newest first
pub async fn load_session_results(
  pool: &SqlitePool,
  training_id: i64,
) -> Result<Vec<SessionResults>, StoreError> {
  let rows = sqlx::query(
    r#"
    SELECT id, training_id, recorded_at, results_json
    FROM session_results
    WHERE training_id = ?1
    ORDER BY recorded_at DESC, id DESC
    "#,
  )
  .bind(training_id)
  .fetch_all(pool)
  .await?;

  rows
    .into_iter()
    .map(|row| -> Result<SessionResults, StoreError> {
      let results_json: String = row.try_get("results_json")?;
      Ok(SessionResults {
        id: row.try_get("id")?,
        training_id: row.try_get("training_id")?,
        recorded_at: row.try_get("recorded_at")?,
        results: serde_json::from_str(&results_json)?,
      })
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
