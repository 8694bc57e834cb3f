pub mod config;
pub mod fingerprint;
pub mod health;
pub mod locations;
pub mod providers;
pub mod sessions;
pub mod stats;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chargeview_engine::{
    filter_by_date_range, normalize_reader, parse_date_range, EngineConfig, Session,
};
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::info;

use crate::cli::DateRange;
use crate::config::OutputFormat;

/// Read and normalize an export, optionally narrowed to a date range
pub fn load_sessions(
    path: &Path,
    range: Option<&DateRange>,
    engine: &EngineConfig,
) -> Result<Vec<Session>> {
    let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    let sessions = normalize_reader(BufReader::new(file), engine)
        .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

    info!(path = %path.display(), sessions = sessions.len(), "Loaded sessions");

    match range {
        Some(DateRange {
            from: Some(from),
            to: Some(to),
        }) => {
            let (from, to) = parse_date_range(from, to)?;
            Ok(filter_by_date_range(&sessions, from, to))
        }
        _ => Ok(sessions),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn is_json(format: OutputFormat) -> bool {
    format == OutputFormat::Json
}

pub fn heading(title: &str, width: usize) {
    println!("{}", title);
    println!("{}", "=".repeat(width));
}

/// Shortens `s` to `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
