use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
  pub id: i64,
  pub date: NaiveDate,
  pub name: String,
  pub time: NaiveTime,
  pub athletes: u32,
  pub training_id: Option<i64>,
}

/// For inserting new events (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCalendarEvent {
  pub date: NaiveDate,
  pub name: String,
  pub time: NaiveTime,
  #[serde(default)]
  pub athletes: u32,
  pub training_id: Option<i64>,
}
