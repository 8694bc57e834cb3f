//! Canonical charging sessions and the normalizer that produces them.

use std::collections::HashSet;
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{ParseError, Result};
use crate::raw::RawSession;

pub const UNKNOWN_PROVIDER: &str = "Unknown";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargingType {
    Ac,
    Dc,
}

impl ChargingType {
    pub fn classify(avg_power_kw: f64, config: &EngineConfig) -> Self {
        if avg_power_kw >= config.dc_power_threshold_kw {
            ChargingType::Dc
        } else {
            ChargingType::Ac
        }
    }

    /// Assumed grid-to-battery efficiency for this charging type
    pub fn efficiency(&self, config: &EngineConfig) -> f64 {
        match self {
            ChargingType::Ac => config.ac_efficiency,
            ChargingType::Dc => config.dc_efficiency,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChargingType::Ac => "AC",
            ChargingType::Dc => "DC",
        }
    }
}

/// One complete charging event, from plug-in to plug-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub soc_start: f64,
    pub soc_end: f64,
    pub energy_from_grid: f64,
    pub energy_added: f64,
    pub cost: f64,
    pub efficiency: f64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub avg_power: f64,
    pub grid_power: Vec<f64>,
    pub mileage: f64,
    pub duration_minutes: f64,
    pub provider: String,
    pub is_energy_estimated: bool,
}

impl Session {
    /// A session failed when the state of charge did not move at all
    pub fn is_successful(&self) -> bool {
        self.soc_end != self.soc_start
    }

    pub fn soc_delta(&self) -> f64 {
        self.soc_end - self.soc_start
    }

    pub fn charging_type(&self, config: &EngineConfig) -> ChargingType {
        ChargingType::classify(self.avg_power, config)
    }

    pub fn has_coordinates(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0)
    }

    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%Y-%m-%d %H:%M"),
            self.location
        )
    }
}

/// Parse a telemetry export and normalize every record.
///
/// Fails on the first malformed record; no partial list is returned.
pub fn normalize(json: &str, config: &EngineConfig) -> Result<Vec<Session>> {
    let value: Value = serde_json::from_str(json)?;
    normalize_value(value, config)
}

pub fn normalize_reader<R: Read>(reader: R, config: &EngineConfig) -> Result<Vec<Session>> {
    let value: Value = serde_json::from_reader(reader)?;
    normalize_value(value, config)
}

pub fn normalize_value(value: Value, config: &EngineConfig) -> Result<Vec<Session>> {
    if !value.is_array() {
        return Err(ParseError::NotAnArray(json_type_name(&value)));
    }

    let raw: Vec<RawSession> = serde_json::from_value(value)?;
    normalize_records(&raw, config)
}

pub fn normalize_records(raw: &[RawSession], config: &EngineConfig) -> Result<Vec<Session>> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut sessions = Vec::with_capacity(raw.len());

    for (index, record) in raw.iter().enumerate() {
        let session = normalize_record(index, record, config)?;
        if !seen.insert(session.id.clone()) {
            warn!(
                id = %session.id,
                index, "Dropping session with duplicate start timestamp"
            );
            continue;
        }
        sessions.push(session);
    }

    let estimated = sessions.iter().filter(|s| s.is_energy_estimated).count();
    debug!(
        records = raw.len(),
        sessions = sessions.len(),
        estimated,
        "Normalized telemetry"
    );

    Ok(sessions)
}

fn normalize_record(index: usize, raw: &RawSession, config: &EngineConfig) -> Result<Session> {
    let start_time = to_instant(index, raw.start_time)?;
    let end_time = to_instant(index, raw.end_time)?;
    if end_time < start_time {
        return Err(ParseError::EndBeforeStart {
            index,
            start: raw.start_time,
            end: raw.end_time,
        });
    }

    let grid_power = raw.block_powers();
    let avg_power = grid_power.iter().sum::<f64>() / grid_power.len().max(1) as f64;

    let energy_from_grid = raw.energy_consumed_from_power_grid_kwh;
    let reported = raw.energy_increase_kwh();
    let is_energy_estimated = reported == 0.0;
    let energy_added = if is_energy_estimated {
        let charging_type = ChargingType::classify(avg_power, config);
        energy_from_grid * charging_type.efficiency(config)
    } else {
        reported
    };

    let efficiency = if energy_from_grid > 0.0 {
        energy_added / energy_from_grid
    } else {
        0.0
    };

    let location = if raw.charging_location.formatted_address.is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        raw.charging_location.formatted_address.clone()
    };

    let provider = raw
        .provider_name()
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_PROVIDER.to_string());

    let cost = raw
        .charging_cost_information
        .as_ref()
        .map(|c| c.calculated_charging_cost)
        .unwrap_or(0.0);

    Ok(Session {
        id: raw.start_time.to_string(),
        start_time,
        end_time,
        soc_start: raw.displayed_start_soc,
        soc_end: raw.displayed_soc,
        energy_from_grid,
        energy_added,
        cost,
        efficiency,
        location,
        latitude: raw.charging_location.map_matched_latitude,
        longitude: raw.charging_location.map_matched_longitude,
        avg_power,
        grid_power,
        mileage: raw.mileage,
        duration_minutes: (end_time - start_time).num_seconds() as f64 / 60.0,
        provider,
        is_energy_estimated,
    })
}

fn to_instant(index: usize, secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(ParseError::InvalidTimestamp {
        index,
        value: secs,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// True when at least one session carries an estimated battery-side energy
pub fn uses_estimated_energy(sessions: &[Session]) -> bool {
    sessions.iter().any(|s| s.is_energy_estimated)
}

pub fn find_session<'a>(sessions: &'a [Session], id: &str) -> Option<&'a Session> {
    sessions.iter().find(|s| s.id == id)
}
