//! Athlete roster and performance history
//!
//! Profiles live in `athletes`, dated results in `performance_records`
//! (oldest first by id). New results are stamped with the forecast the
//! engine made for them, which is what `compute_deviation` later compares.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use std::collections::HashMap;

use crate::db::StoreError;
use crate::models::{Athlete, NewAthlete};
use crate::prediction::{predict_future, CycleContext, PerformanceRecord};

// ---------------------------------------------------------------------------
// Queries over loaded athletes
// ---------------------------------------------------------------------------

/// Case-insensitive match on name or sport; an empty query matches everyone
pub fn search_athletes<'a>(athletes: &'a [Athlete], query: &str) -> Vec<&'a Athlete> {
    let needle = query.trim().to_lowercase();
    athletes
        .iter()
        .filter(|a| {
            needle.is_empty()
                || a.name.to_lowercase().contains(&needle)
                || a.sport.to_lowercase().contains(&needle)
        })
        .collect()
}

fn validate_profile(profile: &NewAthlete) -> Result<(), StoreError> {
    if profile.name.trim().is_empty() {
        return Err(StoreError::Invalid("Athlete name is required".to_string()));
    }
    for (field, value) in [("height_cm", profile.height_cm), ("weight_kg", profile.weight_kg)] {
        if value.is_some_and(|v| !v.is_finite() || v <= 0.0) {
            return Err(StoreError::Invalid(format!("{} must be positive", field)));
        }
    }
    if profile.training_age_years < 0 {
        return Err(StoreError::Invalid(
            "training_age_years cannot be negative".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Database Operations
// ---------------------------------------------------------------------------

const ATHLETE_COLUMNS: &str = r#"
    id, name, date_of_birth, gender, sport, specialization, qualification,
    phone, email, height_cm, weight_kg, training_age_years, cycle_phase,
    micro_cycle_week, macro_cycle_name, best_result, target_result,
    injury_notes, improvement_direction
"#;

fn athlete_from_row(row: &SqliteRow, history: Vec<PerformanceRecord>) -> Result<Athlete, StoreError> {
    let gender: String = row.try_get("gender")?;
    let phase: String = row.try_get("cycle_phase")?;
    let direction: String = row.try_get("improvement_direction")?;

    Ok(Athlete {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: gender.parse().map_err(StoreError::Corrupt)?,
        sport: row.try_get("sport")?,
        specialization: row.try_get("specialization")?,
        qualification: row.try_get("qualification")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        height_cm: row.try_get("height_cm")?,
        weight_kg: row.try_get("weight_kg")?,
        training_age_years: row.try_get("training_age_years")?,
        cycle: CycleContext {
            phase: phase.parse().map_err(StoreError::Corrupt)?,
            micro_cycle_week: row.try_get("micro_cycle_week")?,
        },
        macro_cycle_name: row.try_get("macro_cycle_name")?,
        best_result: row.try_get("best_result")?,
        target_result: row.try_get("target_result")?,
        injury_notes: row.try_get("injury_notes")?,
        improvement_direction: direction.parse().map_err(StoreError::Corrupt)?,
        performance_history: history,
    })
}

fn record_from_row(row: &SqliteRow) -> Result<PerformanceRecord, StoreError> {
    Ok(PerformanceRecord {
        period: row.try_get("period")?,
        actual: row.try_get("actual")?,
        predicted: row.try_get("predicted")?,
    })
}

/// Load one athlete's history, oldest first
pub async fn load_history(
    pool: &SqlitePool,
    athlete_id: i64,
) -> Result<Vec<PerformanceRecord>, StoreError> {
    let rows = sqlx::query(
        "SELECT period, actual, predicted FROM performance_records WHERE athlete_id = ?1 ORDER BY id",
    )
    .bind(athlete_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Load all athletes with their histories
pub async fn load_all_athletes(pool: &SqlitePool) -> Result<Vec<Athlete>, StoreError> {
    let rows = sqlx::query(&format!("SELECT {} FROM athletes ORDER BY id", ATHLETE_COLUMNS))
        .fetch_all(pool)
        .await?;

    let record_rows = sqlx::query(
        "SELECT athlete_id, period, actual, predicted FROM performance_records ORDER BY athlete_id, id",
    )
    .fetch_all(pool)
    .await?;

    let mut histories: HashMap<i64, Vec<PerformanceRecord>> = HashMap::new();
    for row in &record_rows {
        let athlete_id: i64 = row.try_get("athlete_id")?;
        histories
            .entry(athlete_id)
            .or_default()
            .push(record_from_row(row)?);
    }

    let athletes = rows
        .iter()
        .map(|row| -> Result<Athlete, StoreError> {
            let id: i64 = row.try_get("id")?;
            athlete_from_row(row, histories.remove(&id).unwrap_or_default())
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = athletes.len(), "Loaded athletes");
    Ok(athletes)
}

/// Load a single athlete by id
pub async fn load_athlete(pool: &SqlitePool, id: i64) -> Result<Athlete, StoreError> {
    let row = sqlx::query(&format!("SELECT {} FROM athletes WHERE id = ?1", ATHLETE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "Athlete",
            id,
        })?;

    let history = load_history(pool, id).await?;
    athlete_from_row(&row, history)
}

/// Insert a new athlete, returning its id
pub async fn insert_athlete<'e, E>(executor: E, profile: &NewAthlete) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    validate_profile(profile)?;

    let result = sqlx::query(
        r#"
        INSERT INTO athletes (
            name, date_of_birth, gender, sport, specialization, qualification,
            phone, email, height_cm, weight_kg, training_age_years, cycle_phase,
            micro_cycle_week, macro_cycle_name, best_result, target_result,
            injury_notes, improvement_direction
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        "#,
    )
    .bind(profile.name.trim())
    .bind(profile.date_of_birth)
    .bind(profile.gender.to_string())
    .bind(&profile.sport)
    .bind(&profile.specialization)
    .bind(&profile.qualification)
    .bind(&profile.phone)
    .bind(&profile.email)
    .bind(profile.height_cm)
    .bind(profile.weight_kg)
    .bind(profile.training_age_years)
    .bind(profile.cycle.phase.to_string())
    .bind(profile.cycle.micro_cycle_week)
    .bind(&profile.macro_cycle_name)
    .bind(&profile.best_result)
    .bind(&profile.target_result)
    .bind(&profile.injury_notes)
    .bind(profile.improvement_direction.to_string())
    .execute(executor)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(athlete_id = id, name = %profile.name, "Added athlete");
    Ok(id)
}

/// Replace profile fields; history is untouched
pub async fn update_athlete(
    pool: &SqlitePool,
    id: i64,
    profile: &NewAthlete,
) -> Result<(), StoreError> {
    validate_profile(profile)?;

    let result = sqlx::query(
        r#"
        UPDATE athletes
        SET name = ?1,
            date_of_birth = ?2,
            gender = ?3,
            sport = ?4,
            specialization = ?5,
            qualification = ?6,
            phone = ?7,
            email = ?8,
            height_cm = ?9,
            weight_kg = ?10,
            training_age_years = ?11,
            cycle_phase = ?12,
            micro_cycle_week = ?13,
            macro_cycle_name = ?14,
            best_result = ?15,
            target_result = ?16,
            injury_notes = ?17,
            improvement_direction = ?18,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?19
        "#,
    )
    .bind(profile.name.trim())
    .bind(profile.date_of_birth)
    .bind(profile.gender.to_string())
    .bind(&profile.sport)
    .bind(&profile.specialization)
    .bind(&profile.qualification)
    .bind(&profile.phone)
    .bind(&profile.email)
    .bind(profile.height_cm)
    .bind(profile.weight_kg)
    .bind(profile.training_age_years)
    .bind(profile.cycle.phase.to_string())
    .bind(profile.cycle.micro_cycle_week)
    .bind(&profile.macro_cycle_name)
    .bind(&profile.best_result)
    .bind(&profile.target_result)
    .bind(&profile.injury_notes)
    .bind(profile.improvement_direction.to_string())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Athlete",
            id,
        });
    }

    tracing::info!(athlete_id = id, "Updated athlete");
    Ok(())
}

/// Delete an athlete together with its history
pub async fn delete_athlete(pool: &SqlitePool, id: i64) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM performance_records WHERE athlete_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM athletes WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(StoreError::NotFound {
            entity: "Athlete",
            id,
        });
    }

    tx.commit().await?;
    tracing::info!(athlete_id = id, "Deleted athlete");
    Ok(())
}

/// Move an athlete to another phase / micro-cycle week
pub async fn update_cycle(
    pool: &SqlitePool,
    id: i64,
    cycle: &CycleContext,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE athletes
        SET cycle_phase = ?1, micro_cycle_week = ?2, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?3
        "#,
    )
    .bind(cycle.phase.to_string())
    .bind(cycle.micro_cycle_week)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Athlete",
            id,
        });
    }

    tracing::info!(athlete_id = id, phase = %cycle.phase, week = cycle.micro_cycle_week, "Updated cycle");
    Ok(())
}

/// Append a raw history record as-is
pub async fn insert_history_record<'e, E>(
    executor: E,
    athlete_id: i64,
    record: &PerformanceRecord,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO performance_records (athlete_id, period, actual, predicted) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(athlete_id)
    .bind(&record.period)
    .bind(record.actual)
    .bind(record.predicted)
    .execute(executor)
    .await?;

    Ok(())
}

/// Record a measured result. The stored `predicted` is the next-period
/// forecast made from the history as it stood before this result.
pub async fn record_performance(
    pool: &SqlitePool,
    athlete_id: i64,
    period: &str,
    actual: f64,
) -> Result<PerformanceRecord, StoreError> {
    if period.trim().is_empty() {
        return Err(StoreError::Invalid("Period label is required".to_string()));
    }
    if !actual.is_finite() || actual <= 0.0 {
        return Err(StoreError::Invalid(format!(
            "Result must be a positive number, got {}",
            actual
        )));
    }

    let athlete = load_athlete(pool, athlete_id).await?;
    let predicted = predict_future(&athlete.performance_history, &athlete.cycle)
        .first()
        .map(|p| p.predicted);

    let record = PerformanceRecord::new(period.trim(), actual, predicted);
    insert_history_record(pool, athlete_id, &record).await?;

    tracing::info!(
        athlete_id,
        period = %record.period,
        actual,
        predicted = ?record.predicted,
        "Recorded performance"
    );

    Ok(record)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
