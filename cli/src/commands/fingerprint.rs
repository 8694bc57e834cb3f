use std::path::Path;

use chargeview_engine::Fleet;
use color_eyre::eyre::Result;
use serde::Serialize;

use super::{is_json, load_sessions, print_json};
use crate::config::{OutputFormat, UserConfig};

#[derive(Serialize)]
struct FingerprintReport {
    sessions: usize,
    fingerprint: String,
}

pub fn run(file: &Path, config: &UserConfig, format: OutputFormat) -> Result<()> {
    let fleet = Fleet::new();
    let fingerprint = fleet.replace(load_sessions(file, None, &config.engine)?);
    let report = FingerprintReport {
        sessions: fleet.len(),
        fingerprint,
    };

    if is_json(format) {
        return print_json(&report);
    }

    println!("{}  {} sessions", report.fingerprint, report.sessions);
    Ok(())
}
