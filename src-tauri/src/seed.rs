//! Default dataset and whole-store lifecycle operations

use chrono::{NaiveDate, NaiveTime};
use sqlx::{SqliteConnection, SqlitePool};

use crate::athletes::{insert_athlete, insert_history_record};
use crate::calendar::insert_event;
use crate::db::StoreError;
use crate::models::{
  EvaluationCriterion, Exercise, Gender, NewAthlete, NewCalendarEvent, Training, TrainingStatus,
  TrainingType,
};
use crate::prediction::{CycleContext, CyclePhase, ImprovementDirection, PerformanceRecord};
use crate::results::Scale;
use crate::trainings::insert_training;

/// ---------------------------------------------------------------------------
/// Default Dataset
/// ---------------------------------------------------------------------------

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, StoreError> {
  NaiveDate::from_ymd_opt(year, month, day)
    .ok_or_else(|| StoreError::Invalid(format!("Invalid date: {}-{}-{}", year, month, day)))
}

#[allow(clippy::too_many_arguments)]
fn athlete(
  name: &str,
  date_of_birth: NaiveDate,
  gender: Gender,
  specialization: &str,
  qualification: &str,
  contact: (&str, &str),
  body: (f64, f64),
  training_age_years: i64,
  cycle: CycleContext,
  macro_cycle_name: &str,
  results: (&str, &str),
  injury_notes: &str,
  direction: ImprovementDirection,
) -> NewAthlete {
  NewAthlete {
    name: name.to_string(),
    date_of_birth,
    gender,
    sport: "Athletics".to_string(),
    specialization: specialization.to_string(),
    qualification: qualification.to_string(),
    phone: contact.0.to_string(),
    email: contact.1.to_string(),
    height_cm: Some(body.0),
    weight_kg: Some(body.1),
    training_age_years,
    cycle,
    macro_cycle_name: macro_cycle_name.to_string(),
    best_result: results.0.to_string(),
    target_result: results.1.to_string(),
    injury_notes: injury_notes.to_string(),
    improvement_direction: direction,
  }
}

fn history(points: &[(f64, f64)]) -> Vec<PerformanceRecord> {
  points
    .iter()
    .enumerate()
    .map(|(i, (actual, predicted))| PerformanceRecord::new(format!("W{}", i + 1), *actual, Some(*predicted)))
    .collect()
}

/// Five athletes with short histories
pub fn default_athletes() -> Result<Vec<(NewAthlete, Vec<PerformanceRecord>)>, StoreError> {
  use CyclePhase::*;
  use ImprovementDirection::*;

  let winter_prep = "Winter preparatory 2026";

  Ok(vec![
    (
      athlete(
        "Oleksandr Petrenko",
        ymd(2004, 3, 15)?,
        Gender::Male,
        "Sprint 100m",
        "Candidate Master of Sport",
        ("+380991234567", "petrenko@mail.com"),
        (182.0, 78.0),
        6,
        CycleContext::new(Preparatory, 3),
        winter_prep,
        ("10.45s", "10.20s"),
        "",
        LowerIsBetter,
      ),
      history(&[(10.82, 10.8), (10.75, 10.74), (10.68, 10.68)]),
    ),
    (
      athlete(
        "Maria Kovalenko",
        ymd(2006, 7, 22)?,
        Gender::Female,
        "Long jump",
        "1st category",
        ("+380997654321", "kovalenko@mail.com"),
        (172.0, 62.0),
        4,
        CycleContext::new(Competitive, 2),
        "Winter competitive 2026",
        ("6.12m", "6.35m"),
        "Mild right hamstring strain (October 2025)",
        HigherIsBetter,
      ),
      history(&[(5.8, 5.82), (5.88, 5.9)]),
    ),
    (
      athlete(
        "Ivan Sydorenko",
        ymd(2002, 11, 8)?,
        Gender::Male,
        "Shot put",
        "Candidate Master of Sport",
        ("+380991112233", "sydorenko@mail.com"),
        (190.0, 105.0),
        7,
        CycleContext::new(Transition, 1),
        "Transition period",
        ("18.3m", "19.0m"),
        "Right shoulder problems",
        HigherIsBetter,
      ),
      history(&[(17.5, 17.55), (17.7, 17.72)]),
    ),
    (
      athlete(
        "Anna Shevchenko",
        ymd(2007, 1, 30)?,
        Gender::Female,
        "400m",
        "2nd category",
        ("+380994445566", "shevchenko@mail.com"),
        (168.0, 58.0),
        3,
        CycleContext::new(Preparatory, 5),
        winter_prep,
        ("52.1s", "50.8s"),
        "",
        LowerIsBetter,
      ),
      history(&[(54.2, 54.1), (53.8, 53.7)]),
    ),
    (
      athlete(
        "Dmytro Bondar",
        ymd(2003, 9, 12)?,
        Gender::Male,
        "High jump",
        "1st category",
        ("+380997778899", "bondar@mail.com"),
        (193.0, 82.0),
        5,
        CycleContext::new(Preparatory, 4),
        winter_prep,
        ("2.15m", "2.20m"),
        "",
        HigherIsBetter,
      ),
      history(&[(2.05, 2.06), (2.07, 2.08)]),
    ),
  ])
}

fn criterion(id: &str, name: &str, description: &str, scale: &str, weight: u8) -> EvaluationCriterion {
  EvaluationCriterion {
    id: id.to_string(),
    name: name.to_string(),
    description: description.to_string(),
    scale: Scale::parse(scale),
    weight,
  }
}

fn exercise(
  id: &str,
  name: &str,
  description: &str,
  (sets, reps, rest_seconds): (u32, &str, u32),
  criteria: Vec<EvaluationCriterion>,
) -> Exercise {
  Exercise {
    id: id.to_string(),
    name: name.to_string(),
    description: description.to_string(),
    sets,
    reps: reps.to_string(),
    rest_seconds,
    criteria,
  }
}

/// Two completed trainings with evaluation criteria
pub fn default_trainings() -> Result<Vec<Training>, StoreError> {
  Ok(vec![
    Training {
      id: 0,
      name: "Strength session".to_string(),
      date: ymd(2026, 2, 21)?,
      description: "Base strength work with a lower-body focus".to_string(),
      training_type: TrainingType::Strength,
      status: TrainingStatus::Completed,
      athlete_count: 8,
      exercises: vec![
        exercise(
          "e1",
          "Back squat",
          "Deep squat, knee angle 90 degrees or more",
          (4, "8-10", 120),
          vec![
            criterion("c1", "Squat depth", "Knees bend below 90 degrees", "pass/fail", 5),
            criterion("c2", "Back control", "Neutral spine throughout", "1-5", 4),
          ],
        ),
        exercise(
          "e2",
          "Bench press",
          "Classic barbell press",
          (4, "6-8", 150),
          vec![criterion("c3", "Range of motion", "Full amplitude", "1-5", 3)],
        ),
        exercise("e3", "Bent-over row", "Barbell row to the waist", (3, "10-12", 90), vec![]),
      ],
      global_criteria: vec![
        criterion("gc1", "Overall intensity", "Overall session intensity", "1-10", 4),
        criterion("gc2", "Technique", "Movement technique quality", "1-10", 5),
      ],
    },
    Training {
      id: 0,
      name: "Speed endurance".to_string(),
      date: ymd(2026, 2, 20)?,
      description: "Interval work for speed endurance".to_string(),
      training_type: TrainingType::Speed,
      status: TrainingStatus::Completed,
      athlete_count: 12,
      exercises: vec![
        exercise(
          "e1",
          "Interval runs",
          "200m repeats with 2 min rest",
          (6, "200m", 120),
          vec![
            criterion("c1", "Run time", "Target 200m time", "time (s)", 5),
            criterion("c2", "Pace stability", "Gap between best and worst rep", "time (s)", 4),
          ],
        ),
        exercise("e2", "Shuttle run", "4x10m at maximum speed", (5, "4x10m", 90), vec![]),
      ],
      global_criteria: vec![criterion(
        "gc1",
        "Heart rate recovery",
        "Time to recover to 120 bpm between intervals",
        "time (s)",
        5,
      )],
    },
  ])
}

fn default_events(trainings: &[(i64, Training)]) -> Result<Vec<NewCalendarEvent>, StoreError> {
  let morning = NaiveTime::from_hms_opt(9, 0, 0)
    .ok_or_else(|| StoreError::Invalid("Invalid event time".to_string()))?;

  Ok(trainings
    .iter()
    .map(|(id, training)| NewCalendarEvent {
      date: training.date,
      name: training.name.clone(),
      time: morning,
      athletes: training.athlete_count,
      training_id: Some(*id),
    })
    .collect())
}

/// ---------------------------------------------------------------------------
/// Store Lifecycle
/// ---------------------------------------------------------------------------

/// True when there are no athletes and no trainings
pub async fn is_empty(pool: &SqlitePool) -> Result<bool, StoreError> {
  let athletes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM athletes")
    .fetch_one(pool)
    .await?;
  let trainings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trainings")
    .fetch_one(pool)
    .await?;
  Ok(athletes == 0 && trainings == 0)
}

async fn insert_athletes_and_trainings(
  conn: &mut SqliteConnection,
) -> Result<Vec<(i64, Training)>, StoreError> {
  for (profile, records) in default_athletes()? {
    let id = insert_athlete(&mut *conn, &profile).await?;
    for record in &records {
      insert_history_record(&mut *conn, id, record).await?;
    }
  }

  let mut inserted = Vec::new();
  for training in default_trainings()? {
    let id = insert_training(&mut *conn, &training).await?;
    inserted.push((id, training));
  }
  Ok(inserted)
}

async fn delete_everything(conn: &mut SqliteConnection) -> Result<(), StoreError> {
  for table in [
    "session_results",
    "calendar_events",
    "performance_records",
    "trainings",
    "athletes",
  ] {
    sqlx::query(&format!("DELETE FROM {}", table))
      .execute(&mut *conn)
      .await?;
  }
  Ok(())
}

/// Fill the store with the default dataset, including calendar events.
/// All or nothing.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<(), StoreError> {
  let mut tx = pool.begin().await?;

  let trainings = insert_athletes_and_trainings(&mut tx).await?;
  for event in default_events(&trainings)? {
    insert_event(&mut *tx, &event).await?;
  }

  tx.commit().await?;
  Ok(())
}

/// Delete every row in every table
pub async fn clear_all(pool: &SqlitePool) -> Result<(), StoreError> {
  let mut tx = pool.begin().await?;
  delete_everything(&mut tx).await?;
  tx.commit().await?;

  tracing::info!("Cleared all data");
  Ok(())
}

/// Restore default athletes and trainings; results and calendar start empty.
/// On failure the previous data is kept.
pub async fn reset_to_defaults(pool: &SqlitePool) -> Result<(), StoreError> {
  let mut tx = pool.begin().await?;
  delete_everything(&mut tx).await?;
  insert_athletes_and_trainings(&mut tx).await?;
  tx.commit().await?;

  tracing::info!("Reset store to defaults");
  Ok(())
}
