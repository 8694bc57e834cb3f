use std::path::Path;

use chargeview_engine::{estimate_battery_health, fit_capacity_trend, CapacityPoint, CapacityTrend};
use color_eyre::eyre::Result;
use serde::Serialize;

use super::{heading, is_json, load_sessions, print_json};
use crate::cli::DateRange;
use crate::config::{OutputFormat, UserConfig};

#[derive(Serialize)]
struct HealthReport {
    trend: Option<CapacityTrend>,
    points: Vec<CapacityPoint>,
}

pub fn run(
    file: &Path,
    range: &DateRange,
    config: &UserConfig,
    format: OutputFormat,
) -> Result<()> {
    let sessions = load_sessions(file, Some(range), &config.engine)?;
    let report = HealthReport {
        trend: fit_capacity_trend(&sessions, &config.engine),
        points: estimate_battery_health(&sessions, &config.engine),
    };

    if is_json(format) {
        return print_json(&report);
    }

    heading("Battery Capacity", 60);
    if report.points.is_empty() {
        println!("No session added enough energy to estimate capacity.");
        return Ok(());
    }

    match &report.trend {
        Some(trend) => {
            println!("Months fitted:    {}", trend.months);
            println!("Trend:            {:+.2} kWh/year", trend.slope_per_year());
            if let Some(last) = report.points.last() {
                println!("Current estimate: {:.1} kWh", trend.at_date(last.date));
            }
        }
        None => println!("Need at least two months of data for a trend."),
    }

    println!();
    println!(
        "{:<12} {:<8} {:>10} {:>10} {:>8}",
        "Date", "Kind", "Capacity", "Trend", "SoC Δ"
    );
    println!("{}", "-".repeat(60));
    for point in &report.points {
        let kind = match &point.month {
            Some(month) => month.clone(),
            None => "session".to_string(),
        };
        println!(
            "{:<12} {:<8} {:>10.1} {:>10.1} {:>8.0}",
            point.date.format("%Y-%m-%d"),
            kind,
            point.raw_capacity,
            point.trend,
            point.soc_delta
        );
    }

    Ok(())
}
