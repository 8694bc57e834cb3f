use std::path::Path;

use chargeview_engine::{find_session, Session};
use color_eyre::eyre::{eyre, Result};

use super::{heading, is_json, load_sessions, print_json, truncate};
use crate::cli::DateRange;
use crate::config::{OutputFormat, UserConfig};

pub fn run(
    file: &Path,
    range: &DateRange,
    id: Option<&str>,
    config: &UserConfig,
    format: OutputFormat,
) -> Result<()> {
    let sessions = load_sessions(file, Some(range), &config.engine)?;

    if let Some(id) = id {
        let session =
            find_session(&sessions, id).ok_or_else(|| eyre!("No session with id {}", id))?;
        if is_json(format) {
            return print_json(session);
        }
        print_details(session, config);
        return Ok(());
    }

    if is_json(format) {
        return print_json(&sessions);
    }

    heading(&format!("Sessions ({})", sessions.len()), 90);
    println!(
        "{:<11} {:<44} {:>4} {:>9} {:>9} {:>8}",
        "Id", "Session", "Type", "SoC", "Added", "Cost"
    );
    println!("{}", "-".repeat(90));
    for s in &sessions {
        let marker = if s.is_energy_estimated { "*" } else { "" };
        println!(
            "{:<11} {:<44} {:>4} {:>4.0}-{:<4.0} {:>7.1}{:<1} {:>8.2}",
            s.id,
            truncate(&s.label(), 44),
            s.charging_type(&config.engine).label(),
            s.soc_start,
            s.soc_end,
            s.energy_added,
            marker,
            s.cost
        );
    }
    if sessions.iter().any(|s| s.is_energy_estimated) {
        println!();
        println!("* battery-side energy estimated from grid energy");
    }

    Ok(())
}

fn print_details(s: &Session, config: &UserConfig) {
    heading(&s.label(), 50);
    println!("Id:               {}", s.id);
    println!("Provider:         {}", s.provider);
    println!(
        "Duration:         {:.0} min ({})",
        s.duration_minutes,
        s.charging_type(&config.engine).label()
    );
    println!("SoC:              {:.0}% -> {:.0}%", s.soc_start, s.soc_end);
    println!("From grid:        {:.2} kWh", s.energy_from_grid);
    println!(
        "Added:            {:.2} kWh{}",
        s.energy_added,
        if s.is_energy_estimated { " (estimated)" } else { "" }
    );
    println!("Efficiency:       {:.1}%", s.efficiency * 100.0);
    println!("Avg power:        {:.1} kW", s.avg_power);
    println!("Cost:             {:.2}", s.cost);
    println!("Mileage:          {:.0} km", s.mileage);
    if s.has_coordinates() {
        println!("Coordinates:      {:.5}, {:.5}", s.latitude, s.longitude);
    }
    println!("Status:           {}", if s.is_successful() { "OK" } else { "Failed" });
}
