//! Time-to-threshold results.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

/// Outcome of projecting when the auction price reaches a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "duration", rename_all = "snake_case")]
pub enum Eta {
    /// The current price is already at or below the threshold.
    AlreadyReached,
    /// The threshold is reached after this much time from the observation.
    After(Duration),
    /// The model cannot reach the threshold (degenerate inputs).
    Unavailable,
}

impl Eta {
    /// Build from a positive number of seconds. Fractional seconds are
    /// discarded; spans beyond `u64` seconds saturate.
    pub fn from_seconds(seconds: Decimal) -> Self {
        if seconds <= Decimal::ZERO {
            return Self::AlreadyReached;
        }
        let whole = seconds.trunc().to_u64().unwrap_or(u64::MAX);
        Self::After(Duration::from_secs(whole))
    }

    /// Remaining time, with "already reached" as zero.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::AlreadyReached => Some(Duration::ZERO),
            Self::After(d) => Some(*d),
            Self::Unavailable => None,
        }
    }

    /// Whole hours and whole leftover minutes.
    pub fn hours_minutes(&self) -> Option<(u64, u64)> {
        self.duration().map(|d| {
            let secs = d.as_secs();
            (secs / 3600, (secs % 3600) / 60)
        })
    }
}

impl std::fmt::Display for Eta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.hours_minutes() {
            Some((hours, minutes)) => write!(f, "{} hours {} minutes", hours, minutes),
            None => write!(f, "n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display() {
        assert_eq!(Eta::AlreadyReached.to_string(), "0 hours 0 minutes");
        assert_eq!(Eta::Unavailable.to_string(), "n/a");
        assert_eq!(
            Eta::After(Duration::from_secs(2 * 3600 + 5 * 60 + 59)).to_string(),
            "2 hours 5 minutes"
        );
    }

    #[test]
    fn test_from_seconds_truncates() {
        let eta = Eta::from_seconds(Decimal::from_str("2231.99").unwrap());
        assert_eq!(eta, Eta::After(Duration::from_secs(2231)));
        assert_eq!(eta.hours_minutes(), Some((0, 37)));

        assert_eq!(Eta::from_seconds(Decimal::ZERO), Eta::AlreadyReached);
        assert_eq!(
            Eta::from_seconds(Decimal::MAX),
            Eta::After(Duration::from_secs(u64::MAX))
        );
    }
}
