use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::db::StoreError;
use crate::models::{CalendarEvent, NewCalendarEvent};

/// ---------------------------------------------------------------------------
/// Month Grid
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
  pub date: NaiveDate,
  pub day: u32,
  pub event_count: usize,
  pub has_events: bool,
}

/// Monday-first month view. Leading `None` cells pad the first week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGrid {
  pub year: i32,
  pub month: u32,
  pub cells: Vec<Option<DayCell>>,
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, StoreError> {
  NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or_else(|| StoreError::Invalid(format!("Invalid month: {}-{:02}", year, month)))
}

/// Inclusive first and last day of a month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), StoreError> {
  let first = first_of_month(year, month)?;
  let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
  let last = first_of_month(next_year, next_month)?
    .pred_opt()
    .ok_or_else(|| StoreError::Invalid(format!("Invalid month: {}-{:02}", year, month)))?;
  Ok((first, last))
}

impl MonthGrid {
  pub fn build(year: i32, month: u32, events: &[CalendarEvent]) -> Result<Self, StoreError> {
    let (first, last) = month_bounds(year, month)?;
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut cells: Vec<Option<DayCell>> = vec![None; offset];
    for date in first.iter_days().take_while(|d| *d <= last) {
      let event_count = events.iter().filter(|e| e.date == date).count();
      cells.push(Some(DayCell {
        date,
        day: date.day(),
        event_count,
        has_events: event_count > 0,
      }));
    }

    Ok(Self { year, month, cells })
  }

  pub fn previous(&self) -> (i32, u32) {
    if self.month == 1 {
      (self.year - 1, 12)
    } else {
      (self.year, self.month - 1)
    }
  }

  pub fn next(&self) -> (i32, u32) {
    if self.month == 12 {
      (self.year + 1, 1)
    } else {
      (self.year, self.month + 1)
    }
  }
}

/// Events on one day, by start time
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
  let mut day: Vec<&CalendarEvent> = events.iter().filter(|e| e.date == date).collect();
  day.sort_by_key(|e| (e.time, e.id));
  day
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

fn event_from_row(row: &SqliteRow) -> Result<CalendarEvent, StoreError> {
  let athletes: i64 = row.try_get("athletes")?;
  Ok(CalendarEvent {
    id: row.try_get("id")?,
    date: row.try_get("date")?,
    name: row.try_get("name")?,
    time: row.try_get("time")?,
    athletes: u32::try_from(athletes)
      .map_err(|_| StoreError::Corrupt(format!("athletes out of range: {}", athletes)))?,
    training_id: row.try_get("training_id")?,
  })
}

/// Events with `from <= date <= to`
pub async fn load_events_between(
  pool: &SqlitePool,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<CalendarEvent>, StoreError> {
  let rows = sqlx::query(
    r#"
    SELECT id, date, name, time, athletes, training_id
    FROM calendar_events
    WHERE date >= ?1 AND date <= ?2
    ORDER BY date, time, id
    "#,
  )
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  rows.iter().map(event_from_row).collect()
}

pub async fn add_calendar_event(
  pool: &SqlitePool,
  event: &NewCalendarEvent,
) -> Result<i64, StoreError> {
  if event.name.trim().is_empty() {
    return Err(StoreError::Invalid("Event name is required".to_string()));
  }

  if let Some(training_id) = event.training_id {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM trainings WHERE id = ?1")
      .bind(training_id)
      .fetch_optional(pool)
      .await?;
    if exists.is_none() {
      return Err(StoreError::NotFound {
        entity: "Training",
        id: training_id,
      });
    }
  }

  let id = insert_event(pool, event).await?;
  tracing::info!(event_id = id, date = %event.date, "Added calendar event");
  Ok(id)
}

/// Store an event as given; the caller has checked name and training link
pub async fn insert_event<'e, E>(executor: E, event: &NewCalendarEvent) -> Result<i64, StoreError>
where
  E: Executor<'e, Database = Sqlite>,
{
  let result = sqlx::query(
    "INSERT INTO calendar_events (date, name, time, athletes, training_id) VALUES (?1, ?2, ?3, ?4, ?5)",
  )
  .bind(event.date)
  .bind(event.name.trim())
  .bind(event.time)
  .bind(i64::from(event.athletes))
  .bind(event.training_id)
  .execute(executor)
  .await?;

  Ok(result.last_insert_rowid())
}

pub async fn remove_calendar_event(pool: &SqlitePool, id: i64) -> Result<(), StoreError> {
  let result = sqlx::query("DELETE FROM calendar_events WHERE id = ?1")
    .bind(id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound {
      entity: "Calendar event",
      id,
    });
  }

  tracing::info!(event_id = id, "Removed calendar event");
  Ok(())
}
