//! Provider clustering and per-group success rates.

mod normalize;
mod similarity;

pub use normalize::{clean_provider, normalize_provider_name, Coercion};
pub use similarity::provider_similarity;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::session::{Session, UNKNOWN_PROVIDER};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderGroup {
    pub provider: String,
    /// Sessions counted towards the leaderboard this group appears on
    pub count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub total: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
}

impl ProviderGroup {
    fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            count: 0,
            success_count: 0,
            failed_count: 0,
            total: 0,
            success_rate: 0.0,
            failure_rate: 0.0,
        }
    }

    fn record(&mut self, successful: bool) {
        self.total += 1;
        if successful {
            self.success_count += 1;
        } else {
            self.failed_count += 1;
        }
    }

    fn finish_rates(&mut self) {
        if self.total > 0 {
            let total = self.total as f64;
            self.success_rate = self.success_count as f64 / total * 100.0;
            self.failure_rate = self.failed_count as f64 / total * 100.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownProvider {
    pub original_value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMatch {
    pub original: String,
    pub matched: String,
    pub similarity: f64,
    pub is_unknown: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderGrouping {
    pub top_successful: Vec<ProviderGroup>,
    pub top_failed: Vec<ProviderGroup>,
    pub all_groups: Vec<ProviderGroup>,
    /// Sorted by original value
    pub unknown_providers: Vec<UnknownProvider>,
    /// Sorted by original value
    pub provider_matches: Vec<ProviderMatch>,
}

/// Incremental clustering state; groups stay in first-seen order
#[derive(Default)]
struct Clusters {
    groups: Vec<ProviderGroup>,
    unknown: BTreeMap<String, UnknownProvider>,
    matches: BTreeMap<String, ProviderMatch>,
}

impl Clusters {
    fn best_match(&self, provider: &str) -> Option<(usize, f64)> {
        self.groups
            .iter()
            .enumerate()
            .fold(None, |best, (idx, group)| {
                let score = provider_similarity(provider, &group.provider);
                match best {
                    Some((_, top)) if score <= top => best,
                    _ if score > 0.0 => Some((idx, score)),
                    _ => best,
                }
            })
    }

    fn add(mut self, session: &Session, config: &EngineConfig) -> Self {
        let original = session.provider.as_str();
        let (provider, coercion) = clean_provider(original);
        if let Some(coercion) = coercion {
            self.unknown.insert(
                original.to_string(),
                UnknownProvider {
                    original_value: original.to_string(),
                    reason: coercion.describe(original),
                },
            );
        }

        let threshold = if provider == UNKNOWN_PROVIDER {
            config.unknown_similarity_threshold
        } else {
            config.similarity_threshold
        };

        let successful = session.is_successful();
        match self.best_match(&provider) {
            Some((idx, score)) if score >= threshold => {
                let group = &mut self.groups[idx];
                trace!(
                    provider = %provider,
                    group = %group.provider,
                    similarity = score,
                    "Merged provider into group"
                );
                group.record(successful);

                let matched_unknown = group.provider == UNKNOWN_PROVIDER;
                if matched_unknown && provider != UNKNOWN_PROVIDER {
                    self.unknown.insert(
                        original.to_string(),
                        UnknownProvider {
                            original_value: original.to_string(),
                            reason: format!("Matched to Unknown with similarity: {:.2}", score),
                        },
                    );
                }
                self.matches.insert(
                    original.to_string(),
                    ProviderMatch {
                        original: original.to_string(),
                        matched: group.provider.clone(),
                        similarity: score,
                        is_unknown: matched_unknown,
                    },
                );
            }
            _ => {
                let mut group = ProviderGroup::new(&provider);
                group.record(successful);
                self.groups.push(group);
            }
        }

        self
    }

    fn finish(self, top_n: usize) -> ProviderGrouping {
        let mut all_groups: Vec<ProviderGroup> = self
            .groups
            .into_iter()
            .map(|mut g| {
                g.finish_rates();
                g
            })
            .collect();

        let leaderboard = |pick: fn(&ProviderGroup) -> usize| -> Vec<ProviderGroup> {
            let mut board: Vec<ProviderGroup> = all_groups
                .iter()
                .filter(|g| pick(g) > 0)
                .map(|g| ProviderGroup {
                    count: pick(g),
                    ..g.clone()
                })
                .collect();
            board.sort_by(|a, b| b.count.cmp(&a.count));
            board.truncate(top_n);
            board
        };

        let top_successful = leaderboard(|g| g.success_count);
        let top_failed = leaderboard(|g| g.failed_count);

        for group in &mut all_groups {
            group.count = group.total;
        }
        all_groups.sort_by(|a, b| b.total.cmp(&a.total));

        ProviderGrouping {
            top_successful,
            top_failed,
            all_groups,
            unknown_providers: self.unknown.into_values().collect(),
            provider_matches: self.matches.into_values().collect(),
        }
    }
}

/// Cluster sessions by provider similarity and rank the clusters.
///
/// Each session joins the most similar existing group when the score reaches
/// the threshold (a lower one applies to unknown providers), otherwise it
/// starts a new group named after its cleaned provider string.
pub fn group_providers(sessions: &[Session], config: &EngineConfig) -> ProviderGrouping {
    let clusters = sessions
        .iter()
        .fold(Clusters::default(), |clusters, s| clusters.add(s, config));

    debug!(
        sessions = sessions.len(),
        groups = clusters.groups.len(),
        unknown = clusters.unknown.len(),
        "Grouped providers"
    );

    clusters.finish(config.top_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn session(id: i64, provider: &str, successful: bool) -> Session {
        let start: DateTime<Utc> = DateTime::from_timestamp(1_704_096_000 + id * 3600, 0).unwrap();
        Session {
            id: id.to_string(),
            start_time: start,
            end_time: start,
            soc_start: 20.0,
            soc_end: if successful { 80.0 } else { 20.0 },
            energy_from_grid: 40.0,
            energy_added: 36.0,
            cost: 0.0,
            efficiency: 0.9,
            location: "Depot".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            avg_power: 50.0,
            grid_power: vec![50.0],
            mileage: 0.0,
            duration_minutes: 0.0,
            provider: provider.to_string(),
            is_energy_estimated: false,
        }
    }

    fn names(groups: &[ProviderGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.provider.as_str()).collect()
    }

    #[test]
    fn test_name_variants_form_one_group() {
        let sessions = vec![
            session(0, "IONITY", true),
            session(1, "IONITY GmbH", true),
            session(2, "HPC/IONITY", false),
        ];
        let grouping = group_providers(&sessions, &EngineConfig::default());

        assert_eq!(names(&grouping.all_groups), vec!["IONITY"]);
        let group = &grouping.all_groups[0];
        assert_eq!(group.total, 3);
        assert_eq!(group.success_count, 2);
        assert_eq!(group.failed_count, 1);
        assert!((group.success_rate - 66.666).abs() < 0.01);
        assert!((group.failure_rate - 33.333).abs() < 0.01);
        assert_eq!(grouping.provider_matches.len(), 2);
        assert!(grouping.provider_matches.iter().all(|m| m.matched == "IONITY"));
    }

    #[test]
    fn test_junk_providers_become_unknown() {
        let sessions = vec![
            session(0, "", true),
            session(1, "123", false),
            session(2, "--", true),
            session(3, "EWE", true),
        ];
        let grouping = group_providers(&sessions, &EngineConfig::default());

        let mut groups = names(&grouping.all_groups);
        groups.sort();
        assert_eq!(groups, vec!["EWE", "Unknown"]);

        let unknown = grouping
            .all_groups
            .iter()
            .find(|g| g.provider == "Unknown")
            .unwrap();
        assert_eq!(unknown.total, 3);

        let originals: Vec<&str> = grouping
            .unknown_providers
            .iter()
            .map(|u| u.original_value.as_str())
            .collect();
        assert_eq!(originals, vec!["", "--", "123"]);
        assert_eq!(grouping.unknown_providers[0].reason, "Empty string");
        assert_eq!(grouping.unknown_providers[1].reason, "Too few letters (0): --");
        assert_eq!(grouping.unknown_providers[2].reason, "Only numbers: 123");

        let merged: Vec<(&str, &str)> = grouping
            .provider_matches
            .iter()
            .map(|m| (m.original.as_str(), m.matched.as_str()))
            .collect();
        assert_eq!(merged, vec![("--", "Unknown"), ("123", "Unknown")]);
        assert!(grouping.provider_matches.iter().all(|m| m.is_unknown));
        assert!(grouping.provider_matches.iter().all(|m| m.similarity == 1.0));
    }

    #[test]
    fn test_matches_keep_raw_spelling() {
        let sessions = vec![
            session(0, "IONITY", true),
            session(1, " IONITY  ", true),
            session(2, "IONITY GmbH", false),
        ];
        let grouping = group_providers(&sessions, &EngineConfig::default());

        assert_eq!(names(&grouping.all_groups), vec!["IONITY"]);
        let originals: Vec<&str> = grouping
            .provider_matches
            .iter()
            .map(|m| m.original.as_str())
            .collect();
        assert_eq!(originals, vec![" IONITY  ", "IONITY GmbH"]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut config = EngineConfig::default();
        config.similarity_threshold = 1.0;
        let sessions = vec![
            session(0, "IONITY", true),
            session(1, "IONITY", false),
            session(2, "Fastned", true),
        ];
        let grouping = group_providers(&sessions, &config);

        assert_eq!(names(&grouping.all_groups), vec!["IONITY", "Fastned"]);
        assert_eq!(grouping.all_groups[0].total, 2);
        assert_eq!(grouping.provider_matches.len(), 1);
        assert_eq!(grouping.provider_matches[0].similarity, 1.0);
    }

    #[test]
    fn test_ties_keep_earliest_group() {
        // "orchid walnut" contains both keys at the same length ratio
        let sessions = vec![
            session(0, "Orchid", true),
            session(1, "Walnut", true),
            session(2, "Orchid Walnut", true),
        ];
        let grouping = group_providers(&sessions, &EngineConfig::default());
        assert_eq!(names(&grouping.all_groups), vec!["Orchid", "Walnut"]);
        assert_eq!(grouping.all_groups[0].total, 2);
        assert_eq!(grouping.provider_matches[0].matched, "Orchid");

        let reversed = vec![
            session(0, "Walnut", true),
            session(1, "Orchid", true),
            session(2, "Orchid Walnut", true),
        ];
        let grouping = group_providers(&reversed, &EngineConfig::default());
        assert_eq!(names(&grouping.all_groups), vec!["Walnut", "Orchid"]);
        assert_eq!(grouping.provider_matches[0].matched, "Walnut");
    }

    #[test]
    fn test_unknown_providers_use_their_own_threshold() {
        let sessions = vec![
            session(0, "", true),
            session(1, "123", true),
            session(2, "IONITY", true),
            session(3, "IONITY", true),
        ];

        let mut config = EngineConfig::default();
        config.similarity_threshold = 1.5;
        let grouping = group_providers(&sessions, &config);
        assert_eq!(names(&grouping.all_groups), vec!["Unknown", "IONITY", "IONITY"]);
        assert_eq!(grouping.all_groups[0].total, 2);

        let mut config = EngineConfig::default();
        config.unknown_similarity_threshold = 1.5;
        let grouping = group_providers(&sessions, &config);
        assert_eq!(names(&grouping.all_groups), vec!["IONITY", "Unknown", "Unknown"]);
        assert_eq!(grouping.all_groups[0].total, 2);
    }

    #[test]
    fn test_distinct_operators_stay_separate() {
        let sessions = vec![
            session(0, "Fastned", true),
            session(1, "IONITY", true),
            session(2, "Allego", false),
            session(3, "IONITY GmbH", true),
        ];
        let grouping = group_providers(&sessions, &EngineConfig::default());

        assert_eq!(names(&grouping.all_groups), vec!["IONITY", "Fastned", "Allego"]);
        assert_eq!(grouping.all_groups[0].total, 2);
    }

    #[test]
    fn test_leaderboards_filter_and_truncate() {
        let mut config = EngineConfig::default();
        config.top_n = 1;
        let sessions = vec![
            session(0, "IONITY", true),
            session(1, "Fastned", true),
            session(2, "Fastned", true),
            session(3, "Allego", false),
        ];
        let grouping = group_providers(&sessions, &config);

        assert_eq!(names(&grouping.top_successful), vec!["Fastned"]);
        assert_eq!(grouping.top_successful[0].count, 2);
        assert_eq!(names(&grouping.top_failed), vec!["Allego"]);
        assert_eq!(grouping.top_failed[0].count, 1);
        assert_eq!(grouping.all_groups.len(), 3);
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let sessions = vec![
            session(0, "EnBW", true),
            session(1, "EnBW mobility+", false),
            session(2, "Allego", true),
            session(3, "", false),
        ];
        let config = EngineConfig::default();
        assert_eq!(
            group_providers(&sessions, &config),
            group_providers(&sessions, &config)
        );
    }

    #[test]
    fn test_empty_input() {
        let grouping = group_providers(&[], &EngineConfig::default());
        assert_eq!(grouping, ProviderGrouping::default());
    }
}
