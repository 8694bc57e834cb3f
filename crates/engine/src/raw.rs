//! Wire format of the telemetry export consumed by the normalizer.
//!
//! Only the fields the engine reads are modelled; anything else in the
//! export is ignored by serde.

use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` the same way as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSession {
    pub start_time: i64,
    pub end_time: i64,
    pub displayed_start_soc: f64,
    pub displayed_soc: f64,
    pub energy_consumed_from_power_grid_kwh: f64,
    #[serde(default)]
    pub energy_increase_hvb_kwh: Option<f64>,
    #[serde(default)]
    pub charging_cost_information: Option<RawCost>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub charging_location: RawLocation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub charging_blocks: Vec<RawChargingBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mileage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub public_charging_point: RawChargingPoint,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCost {
    #[serde(default, deserialize_with = "null_as_default")]
    pub calculated_charging_cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub formatted_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub map_matched_latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub map_matched_longitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChargingBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_power_grid_kw: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChargingPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub potential_charging_point_matches: Vec<RawProviderMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProviderMatch {
    #[serde(default)]
    pub provider_name: Option<String>,
}

impl RawSession {
    /// Battery-side energy delta, treating an absent field as zero
    pub fn energy_increase_kwh(&self) -> f64 {
        self.energy_increase_hvb_kwh.unwrap_or(0.0)
    }

    pub fn block_powers(&self) -> Vec<f64> {
        self.charging_blocks
            .iter()
            .map(|b| b.average_power_grid_kw)
            .collect()
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.public_charging_point
            .potential_charging_point_matches
            .first()
            .and_then(|m| m.provider_name.as_deref())
    }
}
