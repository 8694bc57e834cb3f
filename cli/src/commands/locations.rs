use std::path::Path;

use chargeview_engine::summarize_locations;
use color_eyre::eyre::Result;

use super::{heading, is_json, load_sessions, print_json, truncate};
use crate::config::{OutputFormat, UserConfig};

pub fn run(file: &Path, config: &UserConfig, format: OutputFormat) -> Result<()> {
    let sessions = load_sessions(file, None, &config.engine)?;
    let locations = summarize_locations(&sessions);

    if is_json(format) {
        return print_json(&locations);
    }

    heading(&format!("Charging Locations ({})", locations.len()), 80);
    for loc in &locations {
        println!("{}", truncate(&loc.name, 80));
        println!(
            "  {:.5}, {:.5}  {}  last {}",
            loc.latitude,
            loc.longitude,
            loc.provider,
            loc.last_session_at.format("%Y-%m-%d")
        );
        println!(
            "  {} sessions ({} ok, {} failed), {:.1} kWh",
            loc.session_count, loc.success_count, loc.failed_count, loc.total_energy
        );
    }

    Ok(())
}
