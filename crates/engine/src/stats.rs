use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::session::{Session, UNKNOWN_PROVIDER};

const SOC_HIGH_THRESHOLD: f64 = 80.0;
const SOC_VERY_HIGH_THRESHOLD: f64 = 90.0;
const SOC_FULL: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub overall_efficiency: f64,
    pub power_per_100km: f64,
    pub power_per_100km_no_losses: f64,
    pub soc_stats: SocStats,
    pub session_stats: SessionStats,
    pub uses_estimated_energy: bool,
}

/// End-of-charge distribution, computed over successful sessions only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocStats {
    pub total_sessions: usize,
    pub failed_sessions: usize,
    pub average_start_soc: f64,
    pub average_end_soc: f64,
    pub lowest_start_soc: f64,
    pub below_80_count: usize,
    pub exactly_80_count: usize,
    pub above_80_count: usize,
    pub above_90_count: usize,
    pub exactly_100_count: usize,
    pub above_80_percentage: f64,
    pub above_90_percentage: f64,
}

impl Default for SocStats {
    fn default() -> Self {
        Self {
            total_sessions: 0,
            failed_sessions: 0,
            average_start_soc: 0.0,
            average_end_soc: 0.0,
            lowest_start_soc: SOC_FULL,
            below_80_count: 0,
            exactly_80_count: 0,
            above_80_count: 0,
            above_90_count: 0,
            exactly_100_count: 0,
            above_80_percentage: 0.0,
            above_90_percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub successful_sessions: usize,
    pub failed_sessions: usize,
    pub top_successful_providers: Vec<ProviderCount>,
    pub top_failed_providers: Vec<ProviderCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCount {
    pub provider: String,
    pub count: usize,
}

pub fn compute_aggregate_stats(sessions: &[Session], config: &EngineConfig) -> AggregateStats {
    let (overall_efficiency, power_per_100km, power_per_100km_no_losses) = overall_stats(sessions);

    let stats = AggregateStats {
        overall_efficiency,
        power_per_100km,
        power_per_100km_no_losses,
        soc_stats: soc_statistics(sessions),
        session_stats: session_statistics(sessions, config.top_n),
        uses_estimated_energy: crate::session::uses_estimated_energy(sessions),
    };

    debug!(
        sessions = sessions.len(),
        efficiency = stats.overall_efficiency,
        failed = stats.session_stats.failed_sessions,
        "Computed aggregate stats"
    );

    stats
}

#[derive(Debug, Clone, Copy)]
struct Totals {
    energy_added: f64,
    energy_from_grid: f64,
    min_mileage: f64,
    max_mileage: f64,
}

/// Returns (efficiency, kWh/100km from grid, kWh/100km into the battery)
pub fn overall_stats(sessions: &[Session]) -> (f64, f64, f64) {
    if sessions.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let totals = sessions.iter().fold(
        Totals {
            energy_added: 0.0,
            energy_from_grid: 0.0,
            min_mileage: f64::INFINITY,
            max_mileage: f64::NEG_INFINITY,
        },
        |acc, s| Totals {
            energy_added: acc.energy_added + s.energy_added,
            energy_from_grid: acc.energy_from_grid + s.energy_from_grid,
            min_mileage: acc.min_mileage.min(s.mileage),
            max_mileage: acc.max_mileage.max(s.mileage),
        },
    );

    let efficiency = if totals.energy_from_grid > 0.0 {
        totals.energy_added / totals.energy_from_grid
    } else {
        0.0
    };

    let distance = totals.max_mileage - totals.min_mileage;
    if distance > 0.0 {
        (
            efficiency,
            totals.energy_from_grid / distance * 100.0,
            totals.energy_added / distance * 100.0,
        )
    } else {
        (efficiency, 0.0, 0.0)
    }
}

pub fn soc_statistics(sessions: &[Session]) -> SocStats {
    let mut stats = sessions.iter().fold(SocStats::default(), |mut acc, s| {
        acc.total_sessions += 1;
        if !s.is_successful() {
            acc.failed_sessions += 1;
            return acc;
        }

        // Sums are accumulated here and turned into averages below
        acc.average_start_soc += s.soc_start;
        acc.average_end_soc += s.soc_end;
        acc.lowest_start_soc = acc.lowest_start_soc.min(s.soc_start);

        if s.soc_end < SOC_HIGH_THRESHOLD {
            acc.below_80_count += 1;
        } else if s.soc_end == SOC_HIGH_THRESHOLD {
            acc.exactly_80_count += 1;
        } else {
            acc.above_80_count += 1;
        }
        if s.soc_end > SOC_VERY_HIGH_THRESHOLD {
            acc.above_90_count += 1;
        }
        if s.soc_end == SOC_FULL {
            acc.exactly_100_count += 1;
        }
        acc
    });

    let successful = stats.total_sessions - stats.failed_sessions;
    if successful > 0 {
        let n = successful as f64;
        stats.average_start_soc /= n;
        stats.average_end_soc /= n;
        stats.above_80_percentage = stats.above_80_count as f64 / n * 100.0;
        stats.above_90_percentage = stats.above_90_count as f64 / n * 100.0;
    }

    stats
}

pub fn session_statistics(sessions: &[Session], top_n: usize) -> SessionStats {
    let mut successful = ProviderTally::default();
    let mut failed = ProviderTally::default();

    for session in sessions {
        if session.is_successful() {
            successful.add(&session.provider);
        } else {
            failed.add(&session.provider);
        }
    }

    SessionStats {
        total_sessions: sessions.len(),
        successful_sessions: successful.total,
        failed_sessions: failed.total,
        top_successful_providers: successful.leaderboard(top_n),
        top_failed_providers: failed.leaderboard(top_n),
    }
}

/// Per-provider counter that remembers first-seen order for tie-breaks
#[derive(Debug, Default)]
struct ProviderTally {
    index: HashMap<String, usize>,
    counts: Vec<ProviderCount>,
    total: usize,
}

impl ProviderTally {
    fn add(&mut self, provider: &str) {
        self.total += 1;
        match self.index.get(provider) {
            Some(&i) => self.counts[i].count += 1,
            None => {
                self.index.insert(provider.to_string(), self.counts.len());
                self.counts.push(ProviderCount {
                    provider: provider.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn leaderboard(self, top_n: usize) -> Vec<ProviderCount> {
        let mut ranked: Vec<ProviderCount> = self
            .counts
            .into_iter()
            .filter(|p| !p.provider.is_empty() && p.provider != UNKNOWN_PROVIDER)
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(top_n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn make_session(id: i64, soc_start: f64, soc_end: f64, provider: &str) -> Session {
        let start: DateTime<Utc> = DateTime::from_timestamp(id, 0).unwrap();
        Session {
            id: id.to_string(),
            start_time: start,
            end_time: start,
            soc_start,
            soc_end,
            energy_from_grid: 10.0,
            energy_added: 9.0,
            cost: 0.0,
            efficiency: 0.9,
            location: "Somewhere".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            avg_power: 11.0,
            grid_power: vec![11.0],
            mileage: 0.0,
            duration_minutes: 0.0,
            provider: provider.to_string(),
            is_energy_estimated: false,
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let stats = compute_aggregate_stats(&[], &EngineConfig::default());

        assert_eq!(stats.overall_efficiency, 0.0);
        assert_eq!(stats.power_per_100km, 0.0);
        assert_eq!(stats.power_per_100km_no_losses, 0.0);
        assert_eq!(stats.soc_stats.total_sessions, 0);
        assert_eq!(stats.soc_stats.average_end_soc, 0.0);
        assert!(stats.session_stats.top_successful_providers.is_empty());
        assert!(stats.session_stats.top_failed_providers.is_empty());
        assert!(!stats.uses_estimated_energy);
    }

    #[test]
    fn test_overall_efficiency_and_consumption() {
        let mut a = make_session(1, 20.0, 80.0, "A");
        a.mileage = 1000.0;
        let mut b = make_session(2, 20.0, 80.0, "A");
        b.mileage = 1200.0;
        b.energy_from_grid = 30.0;
        b.energy_added = 27.0;

        let (eff, per_100, no_losses) = overall_stats(&[a, b]);
        assert!((eff - 36.0 / 40.0).abs() < 1e-9);
        assert!((per_100 - 20.0).abs() < 1e-9);
        assert!((no_losses - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_mileage_span_gives_zero_consumption() {
        let sessions = vec![make_session(1, 20.0, 80.0, "A"), make_session(2, 20.0, 80.0, "A")];
        let (eff, per_100, no_losses) = overall_stats(&sessions);

        assert!(eff > 0.0);
        assert_eq!(per_100, 0.0);
        assert_eq!(no_losses, 0.0);
    }

    #[test]
    fn test_soc_stats_skip_failed_sessions() {
        let sessions = vec![
            make_session(1, 40.0, 40.0, "A"),
            make_session(2, 10.0, 70.0, "A"),
            make_session(3, 30.0, 80.0, "A"),
            make_session(4, 50.0, 95.0, "A"),
            make_session(5, 20.0, 100.0, "A"),
        ];

        let soc = soc_statistics(&sessions);
        assert_eq!(soc.total_sessions, 5);
        assert_eq!(soc.failed_sessions, 1);
        assert_eq!(soc.below_80_count, 1);
        assert_eq!(soc.exactly_80_count, 1);
        assert_eq!(soc.above_80_count, 2);
        assert_eq!(soc.above_90_count, 2);
        assert_eq!(soc.exactly_100_count, 1);
        assert!((soc.average_start_soc - 27.5).abs() < 1e-9);
        assert!((soc.average_end_soc - 86.25).abs() < 1e-9);
        assert!((soc.lowest_start_soc - 10.0).abs() < 1e-9);
        assert!((soc.above_80_percentage - 50.0).abs() < 1e-9);
        assert!((soc.above_90_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_session_is_independent_of_energy() {
        let mut session = make_session(1, 40.0, 40.0, "IONITY");
        session.energy_added = 25.0;
        session.energy_from_grid = 26.0;

        let stats = compute_aggregate_stats(&[session], &EngineConfig::default());
        assert_eq!(stats.soc_stats.failed_sessions, 1);
        assert_eq!(stats.session_stats.failed_sessions, 1);
        assert_eq!(stats.session_stats.successful_sessions, 0);
        assert_eq!(
            stats.session_stats.top_failed_providers,
            vec![ProviderCount {
                provider: "IONITY".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_leaderboards_exclude_unknown_and_empty() {
        let sessions = vec![
            make_session(1, 20.0, 80.0, "Unknown"),
            make_session(2, 20.0, 80.0, "Unknown"),
            make_session(3, 20.0, 80.0, ""),
            make_session(4, 20.0, 80.0, "EnBW"),
        ];

        let stats = session_statistics(&sessions, 5);
        assert_eq!(stats.successful_sessions, 4);
        assert_eq!(stats.top_successful_providers.len(), 1);
        assert_eq!(stats.top_successful_providers[0].provider, "EnBW");
    }

    #[test]
    fn test_leaderboard_is_ranked_truncated_and_stable() {
        let mut sessions = Vec::new();
        let providers = ["A", "B", "C", "D", "E", "F", "B", "C", "C"];
        for (i, p) in providers.iter().enumerate() {
            sessions.push(make_session(i as i64, 20.0, 80.0, p));
        }

        let stats = session_statistics(&sessions, 5);
        let names: Vec<&str> = stats
            .top_successful_providers
            .iter()
            .map(|p| p.provider.as_str())
            .collect();
        assert_eq!(names, vec!["C", "B", "A", "D", "E"]);
    }
}
