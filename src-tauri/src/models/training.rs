use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::results::Scale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingType {
  Strength,
  Speed,
  Endurance,
  Technique,
  Recovery,
  Mixed,
}

impl TrainingType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Strength => "strength",
      Self::Speed => "speed",
      Self::Endurance => "endurance",
      Self::Technique => "technique",
      Self::Recovery => "recovery",
      Self::Mixed => "mixed",
    }
  }
}

impl std::str::FromStr for TrainingType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "strength" => Ok(Self::Strength),
      "speed" => Ok(Self::Speed),
      "endurance" => Ok(Self::Endurance),
      "technique" => Ok(Self::Technique),
      "recovery" => Ok(Self::Recovery),
      "mixed" => Ok(Self::Mixed),
      _ => Err(format!("Unknown training type: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Training Status: planned -> in_progress -> completed
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
  #[default]
  Planned,
  InProgress,
  Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot move training from {from} to {to}")]
pub struct TransitionError {
  pub from: TrainingStatus,
  pub to: TrainingStatus,
}

impl TrainingStatus {
  /// Validate a status change; only forward single steps are allowed
  pub fn transition(self, to: TrainingStatus) -> Result<TrainingStatus, TransitionError> {
    match (self, to) {
      (Self::Planned, Self::InProgress) | (Self::InProgress, Self::Completed) => Ok(to),
      _ => Err(TransitionError { from: self, to }),
    }
  }
}

impl std::fmt::Display for TrainingStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Planned => write!(f, "planned"),
      Self::InProgress => write!(f, "in_progress"),
      Self::Completed => write!(f, "completed"),
    }
  }
}

impl std::str::FromStr for TrainingStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "planned" => Ok(Self::Planned),
      "in_progress" => Ok(Self::InProgress),
      "completed" => Ok(Self::Completed),
      _ => Err(format!("Unknown training status: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Training Structure
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(deserialize_with = "crate::results::deserialize_scale")]
  pub scale: Scale,
  /// Relative importance, 1-5
  pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub sets: u32,
  pub reps: String,
  #[serde(default)]
  pub rest_seconds: u32,
  #[serde(default)]
  pub criteria: Vec<EvaluationCriterion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
  pub id: i64,
  pub name: String,
  pub date: NaiveDate,
  pub description: String,
  pub training_type: TrainingType,
  pub status: TrainingStatus,
  pub athlete_count: u32,
  pub exercises: Vec<Exercise>,
  pub global_criteria: Vec<EvaluationCriterion>,
}

impl Training {
  /// Look a criterion up among the global and per-exercise criteria
  pub fn find_criterion(&self, criterion_id: &str) -> Option<&EvaluationCriterion> {
    self
      .global_criteria
      .iter()
      .chain(self.exercises.iter().flat_map(|e| e.criteria.iter()))
      .find(|c| c.id == criterion_id)
  }
}

/// For creating a new (planned, empty) training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTraining {
  pub name: String,
  pub date: NaiveDate,
  #[serde(default)]
  pub description: String,
  pub training_type: Option<TrainingType>,
  #[serde(default)]
  pub athlete_count: u32,
  #[serde(default)]
  pub global_criteria: Vec<EvaluationCriterion>,
}

/// For appending an exercise; blank sets/reps fall back to 3 x "10"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub sets: Option<u32>,
  pub reps: Option<String>,
  pub rest_seconds: Option<u32>,
  #[serde(default)]
  pub criteria: Vec<EvaluationCriterion>,
}
