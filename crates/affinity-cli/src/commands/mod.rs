//! Command implementations.

pub mod befriend;
pub mod explain;
pub mod friends;
pub mod rescore;
pub mod score;
pub mod send;
pub mod unfriend;

pub use self::befriend::execute_befriend;
pub use self::explain::execute_explain;
pub use self::friends::execute_friends;
pub use self::rescore::execute_rescore;
pub use self::score::execute_score;
pub use self::send::execute_send;
pub use self::unfriend::execute_unfriend;

use crate::error::{CliError, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Parse an optional instant, defaulting to now.
///
/// Accepts RFC 3339 (`2025-06-01T18:30:00+09:00`) or a bare date, which
/// means midnight UTC.
pub(crate) fn parse_instant(value: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(value) = value else {
        return Ok(Utc::now());
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date",
                value
            ))
        })
}

/// Reject blank party ids.
pub(crate) fn parse_party(value: &str) -> Result<affinity_domain::PartyId> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::InvalidInput("Party id must not be empty".to_string()));
    }
    Ok(affinity_domain::PartyId::new(trimmed))
}
