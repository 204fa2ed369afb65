//! Dashboard and statistics aggregates over loaded athletes and trainings
//!
//! Everything here is a pure function of its inputs; commands load the data
//! and pass it in together with `today`.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Athlete, Training, TrainingStatus, TrainingType};
use crate::prediction::{classify_trend, round2, Trend};

/// ---------------------------------------------------------------------------
/// Reporting Periods
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatsPeriod {
  Week,
  #[default]
  Month,
  Quarter,
}

impl StatsPeriod {
  pub fn days(self) -> i64 {
    match self {
      Self::Week => 7,
      Self::Month => 30,
      Self::Quarter => 91,
    }
  }

  /// Inclusive window of `days()` days ending on `today`
  pub fn window(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(self.days() - 1), today)
  }
}

impl std::fmt::Display for StatsPeriod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Week => write!(f, "week"),
      Self::Month => write!(f, "month"),
      Self::Quarter => write!(f, "quarter"),
    }
  }
}

impl std::str::FromStr for StatsPeriod {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "week" => Ok(Self::Week),
      "month" => Ok(Self::Month),
      "quarter" => Ok(Self::Quarter),
      _ => Err(format!("Unknown period: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Training Aggregates
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyVolume {
  /// `YYYY-MM`
  pub month: String,
  pub trainings: usize,
}

/// Completed trainings per calendar month, oldest month first
pub fn training_volume_by_month(trainings: &[Training]) -> Vec<MonthlyVolume> {
  let mut by_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
  for training in trainings.iter().filter(|t| t.status == TrainingStatus::Completed) {
    *by_month
      .entry((training.date.year(), training.date.month()))
      .or_default() += 1;
  }

  by_month
    .into_iter()
    .map(|((year, month), count)| MonthlyVolume {
      month: format!("{:04}-{:02}", year, month),
      trainings: count,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
  pub training_type: TrainingType,
  pub count: usize,
  pub percentage: f64,
}

/// Share of each training type present, largest first
pub fn type_distribution(trainings: &[Training]) -> Vec<TypeShare> {
  if trainings.is_empty() {
    return Vec::new();
  }

  let mut counts: BTreeMap<TrainingType, usize> = BTreeMap::new();
  for training in trainings {
    *counts.entry(training.training_type).or_default() += 1;
  }

  let total = trainings.len() as f64;
  let mut shares: Vec<TypeShare> = counts
    .into_iter()
    .map(|(training_type, count)| TypeShare {
      training_type,
      count,
      percentage: count as f64 / total * 100.0,
    })
    .collect();

  // Stable sort keeps enum order among equal counts
  shares.sort_by(|a, b| b.count.cmp(&a.count));
  shares
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
  pub period: StatsPeriod,
  pub from: NaiveDate,
  pub to: NaiveDate,
  pub total: usize,
  pub planned: usize,
  pub in_progress: usize,
  pub completed: usize,
}

pub fn period_summary(trainings: &[Training], period: StatsPeriod, today: NaiveDate) -> PeriodSummary {
  let (from, to) = period.window(today);
  let in_window: Vec<&Training> = trainings
    .iter()
    .filter(|t| t.date >= from && t.date <= to)
    .collect();
  let count = |status: TrainingStatus| in_window.iter().filter(|t| t.status == status).count();

  PeriodSummary {
    period,
    from,
    to,
    total: in_window.len(),
    planned: count(TrainingStatus::Planned),
    in_progress: count(TrainingStatus::InProgress),
    completed: count(TrainingStatus::Completed),
  }
}

/// ---------------------------------------------------------------------------
/// Athlete Progress
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProgress {
  pub athlete_id: i64,
  pub name: String,
  pub first_result: f64,
  pub latest_result: f64,
  pub best_result: f64,
  /// Positive means the athlete improved, whatever the metric's direction
  pub progress_pct: f64,
  pub trend: Trend,
}

/// Progress from first to latest record; `None` without history
pub fn athlete_progress(athlete: &Athlete) -> Option<AthleteProgress> {
  let history = &athlete.performance_history;
  let first = history.first()?.actual;
  let latest = history.last()?.actual;
  let direction = athlete.improvement_direction;

  let best_result = history
    .iter()
    .map(|r| r.actual)
    .fold(first, |best, v| if direction.is_better(v, best) { v } else { best });

  let progress_pct = if first == 0.0 {
    0.0
  } else {
    round2(direction.improvement_pct((latest - first) / first * 100.0))
  };

  Some(AthleteProgress {
    athlete_id: athlete.id,
    name: athlete.name.clone(),
    first_result: first,
    latest_result: latest,
    best_result,
    progress_pct,
    trend: classify_trend(history, direction),
  })
}

/// ---------------------------------------------------------------------------
/// Dashboard
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
  pub athlete_count: usize,
  pub completed_trainings: usize,
  /// Planned trainings in the ISO week containing `today`
  pub planned_this_week: usize,
  /// Mean `progress_pct` over athletes with history
  pub average_progress_pct: Option<f64>,
}

impl DashboardStats {
  pub fn compute(athletes: &[Athlete], trainings: &[Training], today: NaiveDate) -> Self {
    let week = today.iso_week();

    let progress: Vec<f64> = athletes
      .iter()
      .filter_map(athlete_progress)
      .map(|p| p.progress_pct)
      .collect();

    let average_progress_pct = if progress.is_empty() {
      None
    } else {
      Some(round2(progress.iter().sum::<f64>() / progress.len() as f64))
    };

    Self {
      athlete_count: athletes.len(),
      completed_trainings: trainings
        .iter()
        .filter(|t| t.status == TrainingStatus::Completed)
        .count(),
      planned_this_week: trainings
        .iter()
        .filter(|t| t.status == TrainingStatus::Planned && t.date.iso_week() == week)
        .count(),
      average_progress_pct,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::prediction::{ImprovementDirection, PerformanceRecord};
  use crate::test_utils::{mock_athlete, mock_training};

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn training(id: i64, on: NaiveDate, status: TrainingStatus, kind: TrainingType) -> Training {
    let mut t = mock_training();
    t.id = id;
    t.date = on;
    t.status = status;
    t.training_type = kind;
    t
  }

  fn with_history(id: i64, direction: ImprovementDirection, actuals: &[f64]) -> Athlete {
    let mut athlete = mock_athlete(id, "Test Athlete");
    athlete.improvement_direction = direction;
    athlete.performance_history = actuals
      .iter()
      .enumerate()
      .map(|(i, a)| PerformanceRecord::new(format!("W{}", i + 1), *a, None))
      .collect();
    athlete
  }

  #[test]
  fn test_period_windows() {
    let today = date(2026, 3, 31);
    assert_eq!(StatsPeriod::Week.window(today).0, date(2026, 3, 25));
    assert_eq!(StatsPeriod::Month.window(today).0, date(2026, 3, 2));
    assert_eq!(StatsPeriod::Quarter.days(), 91);
    assert_eq!("quarter".parse::<StatsPeriod>(), Ok(StatsPeriod::Quarter));
    assert!("year".parse::<StatsPeriod>().is_err());
  }

  #[test]
  fn test_volume_by_month_counts_completed_only() {
    let trainings = vec![
      training(1, date(2026, 2, 3), TrainingStatus::Completed, TrainingType::Speed),
      training(2, date(2025, 12, 30), TrainingStatus::Completed, TrainingType::Speed),
      training(3, date(2026, 2, 17), TrainingStatus::Completed, TrainingType::Strength),
      training(4, date(2026, 2, 20), TrainingStatus::Planned, TrainingType::Strength),
    ];

    let volume = training_volume_by_month(&trainings);
    assert_eq!(
      volume,
      vec![
        MonthlyVolume { month: "2025-12".to_string(), trainings: 1 },
        MonthlyVolume { month: "2026-02".to_string(), trainings: 2 },
      ]
    );
  }

  #[test]
  fn test_type_distribution_sums_to_hundred() {
    let day = date(2026, 2, 3);
    let trainings = vec![
      training(1, day, TrainingStatus::Completed, TrainingType::Speed),
      training(2, day, TrainingStatus::Planned, TrainingType::Speed),
      training(3, day, TrainingStatus::Completed, TrainingType::Endurance),
    ];

    let shares = type_distribution(&trainings);
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].training_type, TrainingType::Speed);
    assert_eq!(shares[0].count, 2);
    let total: f64 = shares.iter().map(|s| s.percentage).sum();
    assert_approx_eq!(total, 100.0, 1e-9);

    assert!(type_distribution(&[]).is_empty());
  }

  #[test]
  fn test_progress_lower_is_better() {
    let athlete = with_history(1, ImprovementDirection::LowerIsBetter, &[11.0, 10.7, 10.8]);
    let progress = athlete_progress(&athlete).unwrap();

    assert_eq!(progress.best_result, 10.7);
    assert_eq!(progress.latest_result, 10.8);
    // 10.8 vs 11.0 is a 1.82% drop, an improvement for timed events
    assert_approx_eq!(progress.progress_pct, 1.82, 1e-9);
    assert_eq!(progress.trend, Trend::Declining);
  }

  #[test]
  fn test_progress_higher_is_better() {
    let athlete = with_history(2, ImprovementDirection::HigherIsBetter, &[7.0, 7.35]);
    let progress = athlete_progress(&athlete).unwrap();

    assert_eq!(progress.best_result, 7.35);
    assert_approx_eq!(progress.progress_pct, 5.0, 1e-9);
    assert_eq!(progress.trend, Trend::Improving);
  }

  #[test]
  fn test_progress_needs_history() {
    assert!(athlete_progress(&mock_athlete(3, "Rookie")).is_none());
  }

  #[test]
  fn test_dashboard_stats() {
    // Wednesday; ISO week runs 2026-03-09 to 2026-03-15
    let today = date(2026, 3, 11);
    let athletes = vec![
      with_history(1, ImprovementDirection::LowerIsBetter, &[11.0, 10.78]),
      with_history(2, ImprovementDirection::HigherIsBetter, &[7.0, 7.35]),
      mock_athlete(3, "Rookie"),
    ];
    let trainings = vec![
      training(1, date(2026, 3, 2), TrainingStatus::Completed, TrainingType::Speed),
      training(2, date(2026, 3, 9), TrainingStatus::Planned, TrainingType::Speed),
      training(3, date(2026, 3, 15), TrainingStatus::Planned, TrainingType::Mixed),
      training(4, date(2026, 3, 16), TrainingStatus::Planned, TrainingType::Mixed),
    ];

    let stats = DashboardStats::compute(&athletes, &trainings, today);
    assert_eq!(stats.athlete_count, 3);
    assert_eq!(stats.completed_trainings, 1);
    assert_eq!(stats.planned_this_week, 2);
    // (2.0 + 5.0) / 2
    assert_eq!(stats.average_progress_pct, Some(3.5));

    let empty = DashboardStats::compute(&[], &[], today);
    assert_eq!(empty.average_progress_pct, None);
  }

  #[test]
  fn test_period_summary_by_status() {
    let today = date(2026, 3, 11);
    let trainings = vec![
      training(1, date(2026, 3, 5), TrainingStatus::Completed, TrainingType::Speed),
      training(2, date(2026, 3, 11), TrainingStatus::InProgress, TrainingType::Speed),
      training(3, date(2026, 3, 4), TrainingStatus::Completed, TrainingType::Speed),
      training(4, date(2026, 3, 12), TrainingStatus::Planned, TrainingType::Speed),
    ];

    let week = period_summary(&trainings, StatsPeriod::Week, today);
    assert_eq!(week.from, date(2026, 3, 5));
    assert_eq!(week.total, 2);
    assert_eq!(week.completed, 1);
    assert_eq!(week.in_progress, 1);
    assert_eq!(week.planned, 0);
  }
}
