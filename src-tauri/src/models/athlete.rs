use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::prediction::{CycleContext, ImprovementDirection, PerformanceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
  Male,
  Female,
}

impl std::fmt::Display for Gender {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Male => write!(f, "male"),
      Self::Female => write!(f, "female"),
    }
  }
}

impl std::str::FromStr for Gender {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "male" => Ok(Self::Male),
      "female" => Ok(Self::Female),
      _ => Err(format!("Unknown gender: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
  pub id: i64,
  pub name: String,
  pub date_of_birth: NaiveDate,
  pub gender: Gender,
  pub sport: String,
  pub specialization: String,
  pub qualification: String,
  pub phone: String,
  pub email: String,
  pub height_cm: Option<f64>,
  pub weight_kg: Option<f64>,
  pub training_age_years: i64,
  pub cycle: CycleContext,
  pub macro_cycle_name: String,
  pub best_result: String,
  pub target_result: String,
  pub injury_notes: String,
  pub improvement_direction: ImprovementDirection,
  /// Oldest first
  pub performance_history: Vec<PerformanceRecord>,
}

impl Athlete {
  /// Age in full years on `today`
  pub fn age_on(&self, today: NaiveDate) -> i32 {
    let mut age = today.year() - self.date_of_birth.year();
    if (today.month(), today.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
      age -= 1;
    }
    age
  }
}

/// For inserting or replacing an athlete profile (without id, history)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAthlete {
  pub name: String,
  pub date_of_birth: NaiveDate,
  pub gender: Gender,
  #[serde(default)]
  pub sport: String,
  #[serde(default)]
  pub specialization: String,
  #[serde(default)]
  pub qualification: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub email: String,
  pub height_cm: Option<f64>,
  pub weight_kg: Option<f64>,
  #[serde(default)]
  pub training_age_years: i64,
  #[serde(default)]
  pub cycle: CycleContext,
  #[serde(default)]
  pub macro_cycle_name: String,
  #[serde(default)]
  pub best_result: String,
  #[serde(default)]
  pub target_result: String,
  #[serde(default)]
  pub injury_notes: String,
  #[serde(default)]
  pub improvement_direction: ImprovementDirection,
}
