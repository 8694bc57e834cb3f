use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::session::Session;

/// Charging activity at one physical spot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    /// Provider of the most recent session here
    pub provider: String,
    pub last_session_id: String,
    pub last_session_at: DateTime<Utc>,
    pub session_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub total_energy: f64,
}

fn location_key(s: &Session) -> String {
    format!("{:.5}:{:.5}", s.latitude, s.longitude)
}

/// Group sessions with coordinates by spot, in order of first appearance.
pub fn summarize_locations(sessions: &[Session]) -> Vec<LocationSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<LocationSummary> = Vec::new();

    for s in sessions.iter().filter(|s| s.has_coordinates()) {
        let idx = *index.entry(location_key(s)).or_insert_with(|| {
            summaries.push(LocationSummary {
                latitude: s.latitude,
                longitude: s.longitude,
                name: s.location.clone(),
                provider: s.provider.clone(),
                last_session_id: s.id.clone(),
                last_session_at: s.start_time,
                session_count: 0,
                success_count: 0,
                failed_count: 0,
                total_energy: 0.0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[idx];
        summary.session_count += 1;
        summary.total_energy += s.energy_added;
        if s.is_successful() {
            summary.success_count += 1;
        } else {
            summary.failed_count += 1;
        }
        if s.start_time > summary.last_session_at {
            summary.last_session_at = s.start_time;
            summary.last_session_id = s.id.clone();
            summary.provider = s.provider.clone();
        }
    }

    debug!(locations = summaries.len(), "Summarized charging locations");
    summaries
}
