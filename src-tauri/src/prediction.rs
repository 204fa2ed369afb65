//! Performance Forecasting Engine
//!
//! Pure functions over an athlete's performance history:
//! - synthetic forecast of the next periods, shaped by the training-cycle phase
//! - short-term trend from the two most recent actual results
//! - deviation between the latest actual and the forecast made for it
//! - merged chart series (history followed by forecast)
//!
//! Key principles:
//! - No I/O, no shared state; callers load history and pass it in
//! - "Not enough data" is a normal result (empty forecast, stable, 0), never an error
//! - Direction of improvement is explicit: sprint times improve downward,
//!   jumps and throws improve upward

use serde::{Deserialize, Serialize};

/// Number of future periods produced by a forecast
pub const FORECAST_HORIZON: usize = 8;

/// Relative change (percent) below which two results count as unchanged
pub const STABLE_THRESHOLD_PCT: f64 = 0.3;

// ---------------------------------------------------------------------------
/// Performance Record: one point of history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Opaque ordering label supplied by the caller ("W1", "2026-02-21", ...)
    pub period: String,
    pub actual: f64,
    /// Forecast that existed for this period; None or 0 means there was none
    #[serde(default)]
    pub predicted: Option<f64>,
}

impl PerformanceRecord {
    pub fn new(period: impl Into<String>, actual: f64, predicted: Option<f64>) -> Self {
        Self {
            period: period.into(),
            actual,
            predicted,
        }
    }

    /// Forecast value usable as a divisor
    fn forecast(&self) -> Option<f64> {
        self.predicted.filter(|p| *p != 0.0 && p.is_finite())
    }
}

// ---------------------------------------------------------------------------
/// Cycle Phase: periodization state selecting the forecast curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// General build-up: gradual improvement with a load wave
    #[default]
    Preparatory,
    /// Competition block: steeper taper, smaller oscillation
    Competitive,
    /// Recovery block: slow steady drift
    Transition,
}

impl CyclePhase {
    /// Multiplier applied to the baseline for horizon step `step` (1-based)
    pub fn forecast_factor(self, micro_cycle_week: i32, step: usize) -> f64 {
        let i = step as f64;
        let wave_position = f64::from(micro_cycle_week) + i;
        match self {
            Self::Preparatory => 1.0 - 0.005 * i + 0.008 * (0.8 * wave_position).sin(),
            Self::Competitive => 1.0 - 0.008 * i + 0.003 * (1.2 * wave_position).sin(),
            Self::Transition => 1.0 + 0.002 * i,
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preparatory => write!(f, "preparatory"),
            Self::Competitive => write!(f, "competitive"),
            Self::Transition => write!(f, "transition"),
        }
    }
}

impl std::str::FromStr for CyclePhase {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparatory" => Ok(Self::Preparatory),
            "competitive" => Ok(Self::Competitive),
            "transition" => Ok(Self::Transition),
            _ => Err(format!("Unknown cycle phase: {}", s)),
        }
    }
}

/// Where the athlete currently sits in the training plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleContext {
    pub phase: CyclePhase,
    /// Week index inside the current micro-cycle; values below 1 only shift the wave
    pub micro_cycle_week: i32,
}

impl CycleContext {
    pub fn new(phase: CyclePhase, micro_cycle_week: i32) -> Self {
        Self {
            phase,
            micro_cycle_week,
        }
    }
}

impl Default for CycleContext {
    fn default() -> Self {
        Self::new(CyclePhase::Preparatory, 1)
    }
}

// ---------------------------------------------------------------------------
/// Improvement Direction: which way is "better" for the athlete's metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementDirection {
    /// Timed events: a smaller number is a better result
    #[default]
    LowerIsBetter,
    /// Distances and heights: a larger number is a better result
    HigherIsBetter,
}

impl ImprovementDirection {
    /// Signed change re-oriented so that positive always means improvement
    pub fn improvement_pct(self, raw_pct: f64) -> f64 {
        match self {
            Self::LowerIsBetter => -raw_pct,
            Self::HigherIsBetter => raw_pct,
        }
    }

    /// Whether `candidate` is a better result than `current`
    pub fn is_better(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::LowerIsBetter => candidate < current,
            Self::HigherIsBetter => candidate > current,
        }
    }
}

impl std::fmt::Display for ImprovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowerIsBetter => write!(f, "lower_is_better"),
            Self::HigherIsBetter => write!(f, "higher_is_better"),
        }
    }
}

impl std::str::FromStr for ImprovementDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lower_is_better" => Ok(Self::LowerIsBetter),
            "higher_is_better" => Ok(Self::HigherIsBetter),
            _ => Err(format!("Unknown improvement direction: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Engine outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Horizon label relative to now: "+1" .. "+8"
    pub period: String,
    pub predicted: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Improving => write!(f, "improving"),
            Self::Declining => write!(f, "declining"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// One point of the merged history + forecast series.
///
/// `actual` is `None` for forecast points: "not happened yet" is distinct
/// from a measured zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub period: String,
    pub actual: Option<f64>,
    pub predicted: Option<f64>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Round to two decimals, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Forecast the next [`FORECAST_HORIZON`] periods from the latest actual result
pub fn predict_future(history: &[PerformanceRecord], cycle: &CycleContext) -> Vec<PredictionPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };
    let baseline = last.actual;

    (1..=FORECAST_HORIZON)
        .map(|step| PredictionPoint {
            period: format!("+{}", step),
            predicted: round2(
                baseline * cycle.phase.forecast_factor(cycle.micro_cycle_week, step),
            ),
        })
        .collect()
}

/// Classify the change between the two most recent actual results
pub fn classify_trend(history: &[PerformanceRecord], direction: ImprovementDirection) -> Trend {
    let [.., prev, last] = history else {
        return Trend::Stable;
    };

    if prev.actual == 0.0 {
        return Trend::Stable;
    }

    let percent_diff = (last.actual - prev.actual) / prev.actual * 100.0;
    if !percent_diff.is_finite() || percent_diff.abs() < STABLE_THRESHOLD_PCT {
        return Trend::Stable;
    }

    if direction.improvement_pct(percent_diff) > 0.0 {
        Trend::Improving
    } else {
        Trend::Declining
    }
}

/// Signed percentage gap between the latest actual and its forecast
pub fn compute_deviation(history: &[PerformanceRecord]) -> f64 {
    let Some(last) = history.last() else {
        return 0.0;
    };
    let Some(predicted) = last.forecast() else {
        return 0.0;
    };

    let deviation = ((last.actual - predicted) / predicted * 10000.0).round() / 100.0;
    if deviation.is_finite() {
        deviation
    } else {
        0.0
    }
}

/// History points followed by forecast points, in order, without merging labels
pub fn build_chart_series(
    history: &[PerformanceRecord],
    predictions: &[PredictionPoint],
) -> Vec<ChartPoint> {
    let recorded = history.iter().map(|r| ChartPoint {
        period: r.period.clone(),
        actual: Some(r.actual),
        predicted: r.predicted,
    });
    let forecast = predictions.iter().map(|p| ChartPoint {
        period: p.period.clone(),
        actual: None,
        predicted: Some(p.predicted),
    });

    recorded.chain(forecast).collect()
}

// ---------------------------------------------------------------------------
/// Performance Outlook: all engine outputs from one history snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceOutlook {
    pub cycle: CycleContext,
    pub direction: ImprovementDirection,
    pub predictions: Vec<PredictionPoint>,
    pub trend: Trend,
    pub deviation_pct: f64,
    pub chart: Vec<ChartPoint>,
}

impl PerformanceOutlook {
    pub fn compute(
        history: &[PerformanceRecord],
        cycle: &CycleContext,
        direction: ImprovementDirection,
    ) -> Self {
        let predictions = predict_future(history, cycle);
        let chart = build_chart_series(history, &predictions);

        Self {
            cycle: *cycle,
            direction,
            trend: classify_trend(history, direction),
            deviation_pct: compute_deviation(history),
            predictions,
            chart,
        }
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn history(actuals: &[f64]) -> Vec<PerformanceRecord> {
        actuals
            .iter()
            .enumerate()
            .map(|(i, a)| PerformanceRecord::new(format!("W{}", i + 1), *a, None))
            .collect()
    }

    fn sprint_history() -> Vec<PerformanceRecord> {
        vec![
            PerformanceRecord::new("W1", 10.82, Some(10.8)),
            PerformanceRecord::new("W2", 10.75, Some(10.74)),
            PerformanceRecord::new("W3", 10.68, Some(10.68)),
        ]
    }

    #[test]
    fn test_empty_history_neutral_results() {
        let cycle = CycleContext::new(CyclePhase::Competitive, 2);
        assert!(predict_future(&[], &cycle).is_empty());
        assert_eq!(classify_trend(&[], ImprovementDirection::LowerIsBetter), Trend::Stable);
        assert_eq!(compute_deviation(&[]), 0.0);
        assert!(build_chart_series(&[], &[]).is_empty());
    }

    #[test]
    fn test_forecast_has_full_horizon_with_ordered_labels() {
        for phase in [CyclePhase::Preparatory, CyclePhase::Competitive, CyclePhase::Transition] {
            let points = predict_future(&sprint_history(), &CycleContext::new(phase, 3));
            assert_eq!(points.len(), FORECAST_HORIZON);
            for (i, point) in points.iter().enumerate() {
                assert_eq!(point.period, format!("+{}", i + 1));
                assert!(point.predicted.is_finite());
            }
        }
    }

    #[test]
    fn test_preparatory_first_point_matches_formula() {
        let records = vec![PerformanceRecord::new("W1", 10.82, None)];
        let points = predict_future(&records, &CycleContext::new(CyclePhase::Preparatory, 3));

        let expected = round2(10.82 * (1.0 - 0.005 + 0.008 * (0.8_f64 * 4.0).sin()));
        assert_eq!(points[0].predicted, expected);
        assert_eq!(points[0].predicted, 10.76);
    }

    #[test]
    fn test_competitive_curve_tapers() {
        let records = history(&[100.0]);
        let points = predict_future(&records, &CycleContext::new(CyclePhase::Competitive, 1));

        // 1 - 0.008*8 + 0.003*sin(1.2*9)
        let expected_last = round2(100.0 * (1.0 - 0.064 + 0.003 * (10.8_f64).sin()));
        assert_eq!(points[7].predicted, expected_last);
        assert!(points[7].predicted < points[0].predicted);
    }

    #[test]
    fn test_transition_curve_is_linear() {
        let records = history(&[50.0]);
        let points = predict_future(&records, &CycleContext::new(CyclePhase::Transition, 7));
        let values: Vec<f64> = points.iter().map(|p| p.predicted).collect();
        assert_eq!(values, vec![50.1, 50.2, 50.3, 50.4, 50.5, 50.6, 50.7, 50.8]);
    }

    #[test]
    fn test_forecast_uses_only_last_actual() {
        let cycle = CycleContext::new(CyclePhase::Preparatory, 2);
        let short = predict_future(&history(&[12.0]), &cycle);
        let long = predict_future(&history(&[11.0, 13.5, 12.0]), &cycle);
        assert_eq!(short, long);
    }

    #[test]
    fn test_non_positive_micro_cycle_week_accepted() {
        let records = history(&[10.0]);
        for week in [0, -3] {
            let points = predict_future(&records, &CycleContext::new(CyclePhase::Preparatory, week));
            assert_eq!(points.len(), FORECAST_HORIZON);
        }
        let shifted = predict_future(&records, &CycleContext::new(CyclePhase::Preparatory, 0));
        let expected = round2(10.0 * (1.0 - 0.005 + 0.008 * (0.8_f64).sin()));
        assert_eq!(shifted[0].predicted, expected);
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let cycle = CycleContext::new(CyclePhase::Competitive, 4);
        let a = predict_future(&sprint_history(), &cycle);
        let b = predict_future(&sprint_history(), &cycle);
        let bits = |v: &[PredictionPoint]| v.iter().map(|p| p.predicted.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_trend_decrease_is_improvement_for_timed_events() {
        let records = history(&[100.0, 90.0]);
        assert_eq!(classify_trend(&records, ImprovementDirection::LowerIsBetter), Trend::Improving);
        assert_eq!(classify_trend(&records, ImprovementDirection::HigherIsBetter), Trend::Declining);
    }

    #[test]
    fn test_trend_increase_for_distance_events() {
        let records = history(&[5.8, 5.88]);
        assert_eq!(classify_trend(&records, ImprovementDirection::HigherIsBetter), Trend::Improving);
        assert_eq!(classify_trend(&records, ImprovementDirection::LowerIsBetter), Trend::Declining);
    }

    #[test]
    fn test_trend_small_change_is_stable() {
        let records = history(&[100.0, 100.2]);
        assert_eq!(classify_trend(&records, ImprovementDirection::LowerIsBetter), Trend::Stable);
        assert_eq!(classify_trend(&records, ImprovementDirection::HigherIsBetter), Trend::Stable);
    }

    #[test]
    fn test_trend_needs_two_records() {
        assert_eq!(classify_trend(&history(&[10.0]), ImprovementDirection::LowerIsBetter), Trend::Stable);
    }

    #[test]
    fn test_trend_zero_previous_is_stable() {
        let records = history(&[0.0, 5.0]);
        assert_eq!(classify_trend(&records, ImprovementDirection::HigherIsBetter), Trend::Stable);
    }

    #[test]
    fn test_trend_only_looks_at_last_two() {
        let records = history(&[200.0, 100.0, 100.1]);
        assert_eq!(classify_trend(&records, ImprovementDirection::LowerIsBetter), Trend::Stable);
    }

    #[test]
    fn test_deviation_rounded_to_two_decimals() {
        let records = vec![PerformanceRecord::new("W2", 10.45, Some(10.44))];
        assert_eq!(compute_deviation(&records), 0.1);
    }

    #[test]
    fn test_deviation_is_signed() {
        let records = vec![PerformanceRecord::new("W1", 9.0, Some(10.0))];
        assert_eq!(compute_deviation(&records), -10.0);
    }

    #[test]
    fn test_deviation_without_forecast_is_zero() {
        let zero = vec![PerformanceRecord::new("W1", 12.3, Some(0.0))];
        let missing = vec![PerformanceRecord::new("W1", 12.3, None)];
        assert_eq!(compute_deviation(&zero), 0.0);
        assert_eq!(compute_deviation(&missing), 0.0);
    }

    #[test]
    fn test_chart_series_appends_forecast() {
        let records = sprint_history();
        let predictions = predict_future(&records, &CycleContext::new(CyclePhase::Preparatory, 3));
        let chart = build_chart_series(&records, &predictions);

        assert_eq!(chart.len(), records.len() + FORECAST_HORIZON);
        assert_eq!(chart[0].period, "W1");
        assert_eq!(chart[0].actual, Some(10.82));
        assert_eq!(chart[0].predicted, Some(10.8));
        assert_eq!(chart[3].period, "+1");
        assert!(chart[3..].iter().all(|p| p.actual.is_none() && p.predicted.is_some()));
    }

    #[test]
    fn test_chart_series_keeps_colliding_labels() {
        let records = vec![PerformanceRecord::new("+1", 10.0, None)];
        let predictions = predict_future(&records, &CycleContext::new(CyclePhase::Transition, 1));
        let chart = build_chart_series(&records, &predictions);
        assert_eq!(chart.iter().filter(|p| p.period == "+1").count(), 2);
    }

    #[test]
    fn test_forecast_actual_serializes_as_null() {
        let point = ChartPoint {
            period: "+1".to_string(),
            actual: None,
            predicted: Some(10.7),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert!(json["actual"].is_null());
        assert_eq!(json["predicted"], serde_json::json!(10.7));
    }

    #[test]
    fn test_outlook_is_consistent_with_operations() {
        let records = sprint_history();
        let cycle = CycleContext::new(CyclePhase::Preparatory, 3);
        let outlook = PerformanceOutlook::compute(&records, &cycle, ImprovementDirection::LowerIsBetter);

        assert_eq!(outlook.predictions, predict_future(&records, &cycle));
        assert_eq!(outlook.trend, Trend::Improving);
        assert_eq!(outlook.deviation_pct, 0.0);
        assert_eq!(outlook.chart.len(), 11);
    }

    #[test]
    fn test_enum_string_roundtrip() {
        for phase in [CyclePhase::Preparatory, CyclePhase::Competitive, CyclePhase::Transition] {
            assert_eq!(phase.to_string().parse::<CyclePhase>().unwrap(), phase);
        }
        assert_eq!(
            "higher_is_better".parse::<ImprovementDirection>().unwrap(),
            ImprovementDirection::HigherIsBetter
        );
        assert!("sideways".parse::<ImprovementDirection>().is_err());
    }
}
