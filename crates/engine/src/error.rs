use std::path::PathBuf;

use chrono::NaiveDate;

/// Errors raised while turning raw telemetry into sessions
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telemetry must be a JSON array of sessions, got {0}")]
    NotAnArray(&'static str),

    #[error("Session {index}: timestamp {value} is out of range")]
    InvalidTimestamp { index: usize, value: i64 },

    #[error("Session {index}: end time {end} is before start time {start}")]
    EndBeforeStart { index: usize, start: i64, end: i64 },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Date range ends on {to}, before it starts on {from}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

/// Errors raised while loading or validating engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;
