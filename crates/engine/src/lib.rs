mod config;
mod error;
mod filter;
mod fingerprint;
mod fleet;
mod health;
mod locations;
mod providers;
mod raw;
mod session;
mod stats;

pub use config::EngineConfig;
pub use error::{ConfigError, ParseError, Result};
pub use filter::{filter_by_date_range, parse_date, parse_date_range};
pub use fingerprint::content_fingerprint;
pub use fleet::Fleet;
pub use health::{
    capacity_samples, estimate_battery_health, fit_capacity_trend, fit_monthly_trend,
    monthly_averages, CapacityPoint, CapacityPointKind, CapacitySample, CapacityTrend,
    MonthlyCapacity,
};
pub use locations::{summarize_locations, LocationSummary};
pub use providers::{
    clean_provider, group_providers, normalize_provider_name, provider_similarity, Coercion,
    ProviderGroup, ProviderGrouping, ProviderMatch, UnknownProvider,
};
pub use raw::RawSession;
pub use session::{
    find_session, normalize, normalize_reader, normalize_records, normalize_value,
    uses_estimated_energy, ChargingType, Session, UNKNOWN_LOCATION, UNKNOWN_PROVIDER,
};
pub use stats::{
    compute_aggregate_stats, overall_stats, session_statistics, soc_statistics, AggregateStats,
    ProviderCount, SessionStats, SocStats,
};
