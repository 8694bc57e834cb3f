use std::path::Path;

use chargeview_engine::{group_providers, ProviderGroup, ProviderGrouping};
use color_eyre::eyre::Result;

use super::{heading, is_json, load_sessions, print_json, truncate};
use crate::cli::DateRange;
use crate::config::{OutputFormat, UserConfig};

pub fn run(
    file: &Path,
    range: &DateRange,
    debug: bool,
    config: &UserConfig,
    format: OutputFormat,
) -> Result<()> {
    let sessions = load_sessions(file, Some(range), &config.engine)?;
    let mut grouping = group_providers(&sessions, &config.engine);

    if !debug {
        grouping.unknown_providers.clear();
        grouping.provider_matches.clear();
    }

    if is_json(format) {
        return print_json(&grouping);
    }

    print_groups("Most Successful Providers", &grouping.top_successful, "OK");
    print_groups("Most Failures", &grouping.top_failed, "Failed");
    print_groups("All Providers", &grouping.all_groups, "Total");

    if debug {
        print_diagnostics(&grouping);
    }

    Ok(())
}

fn print_groups(title: &str, groups: &[ProviderGroup], count_label: &str) {
    heading(title, 70);
    if groups.is_empty() {
        println!("None");
        println!();
        return;
    }

    println!(
        "{:<36} {:>8} {:>8} {:>8} {:>7}",
        "Provider", count_label, "Total", "OK %", "Fail %"
    );
    println!("{}", "-".repeat(70));
    for g in groups {
        println!(
            "{:<36} {:>8} {:>8} {:>7.1}% {:>6.1}%",
            truncate(&g.provider, 36),
            g.count,
            g.total,
            g.success_rate,
            g.failure_rate
        );
    }
    println!();
}

fn print_diagnostics(grouping: &ProviderGrouping) {
    heading("Unknown Providers", 70);
    if grouping.unknown_providers.is_empty() {
        println!("None");
    }
    for unknown in &grouping.unknown_providers {
        println!("{:<30} {}", format!("{:?}", unknown.original_value), unknown.reason);
    }

    println!();
    heading("Merges", 70);
    if grouping.provider_matches.is_empty() {
        println!("None");
    }
    for m in &grouping.provider_matches {
        println!(
            "{:<30} -> {:<30} {:.2}",
            truncate(&m.original, 30),
            truncate(&m.matched, 30),
            m.similarity
        );
    }
}
