use crate::calendar::{
  add_calendar_event, events_on, load_events_between, month_bounds, remove_calendar_event, MonthGrid,
};
use crate::db::{AppState, StoreError};
use crate::models::{CalendarEvent, NewCalendarEvent};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tauri::State;

#[derive(Debug, Serialize)]
pub struct MonthView {
  pub grid: MonthGrid,
  pub previous: (i32, u32),
  pub next: (i32, u32),
  pub events: Vec<CalendarEvent>,
}

/// Month grid plus the events that fall inside it
#[tauri::command]
pub async fn get_month_view(
  state: State<'_, Arc<AppState>>,
  year: i32,
  month: u32,
) -> Result<MonthView, StoreError> {
  let (first, last) = month_bounds(year, month)?;
  let events = load_events_between(&state.db, first, last).await?;
  let grid = MonthGrid::build(year, month, &events)?;

  Ok(MonthView {
    previous: grid.previous(),
    next: grid.next(),
    grid,
    events,
  })
}

#[tauri::command]
pub async fn get_day_events(
  state: State<'_, Arc<AppState>>,
  date: NaiveDate,
) -> Result<Vec<CalendarEvent>, StoreError> {
  let events = load_events_between(&state.db, date, date).await?;
  Ok(events_on(&events, date).into_iter().cloned().collect())
}

#[tauri::command]
pub async fn create_calendar_event(
  state: State<'_, Arc<AppState>>,
  event: NewCalendarEvent,
) -> Result<i64, StoreError> {
  add_calendar_event(&state.db, &event).await
}

#[tauri::command]
pub async fn delete_calendar_event(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<(), StoreError> {
  remove_calendar_event(&state.db, id).await
}
