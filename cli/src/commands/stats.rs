use std::path::Path;

use chargeview_engine::{compute_aggregate_stats, ProviderCount};
use color_eyre::eyre::Result;

use super::{heading, is_json, load_sessions, print_json};
use crate::cli::DateRange;
use crate::config::{OutputFormat, UserConfig};

pub fn run(
    file: &Path,
    range: &DateRange,
    config: &UserConfig,
    format: OutputFormat,
) -> Result<()> {
    let sessions = load_sessions(file, Some(range), &config.engine)?;
    let stats = compute_aggregate_stats(&sessions, &config.engine);

    if is_json(format) {
        return print_json(&stats);
    }

    heading("Charging Summary", 50);
    let counts = &stats.session_stats;
    println!("Sessions:         {}", counts.total_sessions);
    println!("  Successful:     {}", counts.successful_sessions);
    println!("  Failed:         {}", counts.failed_sessions);
    println!("Efficiency:       {:.1}%", stats.overall_efficiency * 100.0);
    println!("Consumption:      {:.2} kWh/100km", stats.power_per_100km);
    println!("  Into battery:   {:.2} kWh/100km", stats.power_per_100km_no_losses);
    if stats.uses_estimated_energy {
        println!("Note: some battery-side energy values are estimated");
    }

    let soc = &stats.soc_stats;
    println!();
    heading("State of Charge (successful sessions)", 50);
    println!("Avg start:        {:.1}%", soc.average_start_soc);
    println!("Avg end:          {:.1}%", soc.average_end_soc);
    println!("Lowest start:     {:.1}%", soc.lowest_start_soc);
    println!("Ended below 80%:  {}", soc.below_80_count);
    println!("Ended at 80%:     {}", soc.exactly_80_count);
    println!(
        "Ended above 80%:  {} ({:.1}%)",
        soc.above_80_count, soc.above_80_percentage
    );
    println!(
        "Ended above 90%:  {} ({:.1}%)",
        soc.above_90_count, soc.above_90_percentage
    );
    println!("Ended at 100%:    {}", soc.exactly_100_count);

    print_leaderboard(
        "Top Providers (successful)",
        &counts.top_successful_providers,
    );
    print_leaderboard("Top Providers (failed)", &counts.top_failed_providers);

    Ok(())
}

fn print_leaderboard(title: &str, providers: &[ProviderCount]) {
    println!();
    heading(title, 50);
    if providers.is_empty() {
        println!("None");
        return;
    }
    for (i, p) in providers.iter().enumerate() {
        println!("{:>2}. {:<38} {:>6}", i + 1, p.provider, p.count);
    }
}
