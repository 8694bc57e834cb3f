use chrono::{Days, NaiveDate};

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::session::Session;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(value.to_string()))
}

/// Parse a `YYYY-MM-DD` pair, rejecting ranges that end before they start
pub fn parse_date_range(from: &str, to: &str) -> Result<(NaiveDate, NaiveDate)> {
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    if to < from {
        return Err(ParseError::InvertedRange { from, to });
    }
    Ok((from, to))
}

/// Sessions starting within `from..=to` (whole UTC days, end date inclusive).
pub fn filter_by_date_range(sessions: &[Session], from: NaiveDate, to: NaiveDate) -> Vec<Session> {
    let start = from.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = to
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();

    let filtered: Vec<Session> = sessions
        .iter()
        .filter(|s| s.start_time >= start && s.start_time < end)
        .cloned()
        .collect();

    debug!(
        from = %from,
        to = %to,
        kept = filtered.len(),
        total = sessions.len(),
        "Filtered sessions by date"
    );
    filtered
}
