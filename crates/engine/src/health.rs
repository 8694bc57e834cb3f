//! Battery state-of-health estimation.
//!
//! Every sufficiently large charge yields one capacity estimate
//! (`energy_added / soc_delta`). Single estimates are noisy, so they are first
//! averaged per calendar month (weighted by SoC delta) and a weighted
//! least-squares line is fitted through the monthly averages.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::session::Session;

const SECS_PER_DAY: f64 = 86_400.0;

/// Monthly SoC-delta weights are scaled down by this before regression
const REGRESSION_WEIGHT_SCALE: f64 = 100.0;

/// A capacity estimate taken from one session
#[derive(Debug, Clone, PartialEq)]
pub struct CapacitySample {
    pub date: DateTime<Utc>,
    pub days: f64,
    pub capacity: f64,
    pub soc_delta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCapacity {
    pub year: i32,
    pub month: u32,
    pub date: DateTime<Utc>,
    pub avg_capacity: f64,
    pub avg_days: f64,
    pub total_soc_delta: f64,
    pub count: usize,
}

impl MonthlyCapacity {
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPointKind {
    Raw,
    MonthlyAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPoint {
    pub date: DateTime<Utc>,
    /// Raw estimate for session points, trend value for monthly points
    pub capacity: f64,
    pub raw_capacity: f64,
    pub soc_delta: f64,
    pub trend: f64,
    pub kind: CapacityPointKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl CapacityPoint {
    pub fn is_monthly_average(&self) -> bool {
        self.kind == CapacityPointKind::MonthlyAverage
    }
}

/// Fitted line `capacity = slope_per_day * days_since_epoch + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityTrend {
    pub slope_per_day: f64,
    pub intercept: f64,
    pub months: usize,
}

impl CapacityTrend {
    pub fn at(&self, days: f64) -> f64 {
        self.slope_per_day * days + self.intercept
    }

    pub fn at_date(&self, date: DateTime<Utc>) -> f64 {
        self.at(days_since_epoch(date))
    }

    pub fn slope_per_year(&self) -> f64 {
        self.slope_per_day * 365.25
    }
}

pub fn days_since_epoch(date: DateTime<Utc>) -> f64 {
    date.timestamp() as f64 / SECS_PER_DAY
}

pub fn capacity_samples(sessions: &[Session], config: &EngineConfig) -> Vec<CapacitySample> {
    sessions
        .iter()
        .filter(|s| s.energy_added >= config.min_energy_added_kwh)
        .filter(|s| s.soc_delta() >= config.min_soc_delta)
        .map(|s| {
            let soc_delta = s.soc_delta();
            CapacitySample {
                date: s.start_time,
                days: days_since_epoch(s.start_time),
                capacity: s.energy_added * 100.0 / soc_delta,
                soc_delta,
            }
        })
        .collect()
}

/// Buckets samples by calendar month, ordered chronologically
pub fn monthly_averages(samples: &[CapacitySample]) -> Vec<MonthlyCapacity> {
    let mut buckets: BTreeMap<(i32, u32), Vec<&CapacitySample>> = BTreeMap::new();
    for sample in samples {
        buckets
            .entry((sample.date.year(), sample.date.month()))
            .or_default()
            .push(sample);
    }

    buckets
        .into_iter()
        .map(|((year, month), points)| {
            let (sum_capacity, sum_days, sum_weight) =
                points.iter().fold((0.0, 0.0, 0.0), |(c, d, w), p| {
                    (
                        c + p.capacity * p.soc_delta,
                        d + p.days * p.soc_delta,
                        w + p.soc_delta,
                    )
                });

            MonthlyCapacity {
                year,
                month,
                date: points[points.len() / 2].date,
                avg_capacity: sum_capacity / sum_weight,
                avg_days: sum_days / sum_weight,
                total_soc_delta: sum_weight,
                count: points.len(),
            }
        })
        .collect()
}

/// Weighted least squares over monthly averages; `None` below two months
pub fn fit_monthly_trend(months: &[MonthlyCapacity]) -> Option<CapacityTrend> {
    if months.len() < 2 {
        return None;
    }

    let (total_weight, sum_x, sum_y, sum_xy, sum_xx) = months.iter().fold(
        (0.0, 0.0, 0.0, 0.0, 0.0),
        |(w, x, y, xy, xx), m| {
            let weight = m.total_soc_delta / REGRESSION_WEIGHT_SCALE;
            (
                w + weight,
                x + m.avg_days * weight,
                y + m.avg_capacity * weight,
                xy + m.avg_days * m.avg_capacity * weight,
                xx + m.avg_days * m.avg_days * weight,
            )
        },
    );

    if total_weight <= 0.0 {
        let mean = months.iter().map(|m| m.avg_capacity).sum::<f64>() / months.len() as f64;
        return Some(CapacityTrend {
            slope_per_day: 0.0,
            intercept: mean,
            months: months.len(),
        });
    }

    let mean_x = sum_x / total_weight;
    let mean_y = sum_y / total_weight;
    let mean_xy = sum_xy / total_weight;
    let mean_xx = sum_xx / total_weight;
    let variance = mean_xx - mean_x * mean_x;

    let (slope_per_day, intercept) = if variance != 0.0 {
        let slope = (mean_xy - mean_x * mean_y) / variance;
        (slope, mean_y - slope * mean_x)
    } else {
        (0.0, mean_y)
    };

    Some(CapacityTrend {
        slope_per_day,
        intercept,
        months: months.len(),
    })
}

pub fn fit_capacity_trend(sessions: &[Session], config: &EngineConfig) -> Option<CapacityTrend> {
    let samples = capacity_samples(sessions, config);
    fit_monthly_trend(&monthly_averages(&samples))
}

/// Raw per-session points plus monthly averages, sorted by date.
///
/// With fewer than two months of data no trend exists and only raw points
/// are returned, each with `trend == capacity`.
pub fn estimate_battery_health(sessions: &[Session], config: &EngineConfig) -> Vec<CapacityPoint> {
    let samples = capacity_samples(sessions, config);
    let months = monthly_averages(&samples);

    let Some(trend) = fit_monthly_trend(&months) else {
        debug!(
            samples = samples.len(),
            months = months.len(),
            "Not enough months for a capacity trend"
        );
        return samples.iter().map(|s| raw_point(s, s.capacity)).collect();
    };

    debug!(
        samples = samples.len(),
        months = months.len(),
        slope_per_year = trend.slope_per_year(),
        "Fitted capacity trend"
    );

    let mut points: Vec<CapacityPoint> = samples
        .iter()
        .map(|s| raw_point(s, trend.at(s.days)))
        .collect();

    points.extend(months.iter().map(|m| {
        let value = trend.at(m.avg_days);
        CapacityPoint {
            date: m.date,
            capacity: value,
            raw_capacity: m.avg_capacity,
            soc_delta: m.total_soc_delta,
            trend: value,
            kind: CapacityPointKind::MonthlyAverage,
            month: Some(m.label()),
            count: Some(m.count),
        }
    }));

    // Stable: a raw point and its month's average on the same date keep raw first
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

fn raw_point(sample: &CapacitySample, trend: f64) -> CapacityPoint {
    CapacityPoint {
        date: sample.date,
        capacity: sample.capacity,
        raw_capacity: sample.capacity,
        soc_delta: sample.soc_delta,
        trend,
        kind: CapacityPointKind::Raw,
        month: None,
        count: None,
    }
}
