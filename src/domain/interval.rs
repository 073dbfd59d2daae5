//! Interval value object
//!
//! Human-readable durations used by the location subscription
//! (`5s`, `2m`, `1m30s`, `1h`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::IntervalParseError;

/// Default minimum interval between location fixes (5 seconds)
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 5;

/// Default age after which a location snapshot is considered stale (2 minutes)
pub const DEFAULT_STALE_AFTER_SECS: u64 = 120;

/// Immutable, strictly positive time interval with second granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    seconds: u64,
}

impl Interval {
    /// Create an interval from seconds
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Default minimum interval between location fixes
    pub const fn default_update_interval() -> Self {
        Self::from_secs(DEFAULT_UPDATE_INTERVAL_SECS)
    }

    /// Default staleness threshold for location snapshots
    pub const fn default_stale_after() -> Self {
        Self::from_secs(DEFAULT_STALE_AFTER_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_secs(self.seconds)
    }

    /// Convert to a chrono duration for timestamp arithmetic
    pub fn as_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.seconds as i64)
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    /// Parse `<number><unit>` segments where unit is `h`, `m` or `s`.
    /// Units must appear in descending order and at most once each.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IntervalParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(err());
        }

        let mut total: u64 = 0;
        let mut digits = String::new();
        // Rank of the last unit seen; h=3, m=2, s=1
        let mut last_rank = u8::MAX;

        for ch in input.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }

            let (rank, factor) = match ch {
                'h' => (3, 3600),
                'm' => (2, 60),
                's' => (1, 1),
                _ => return Err(err()),
            };
            if digits.is_empty() || rank >= last_rank {
                return Err(err());
            }

            let value: u64 = digits.parse().map_err(|_| err())?;
            total = value
                .checked_mul(factor)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(err)?;
            digits.clear();
            last_rank = rank;
        }

        if !digits.is_empty() || total == 0 {
            return Err(err());
        }

        Ok(Self { seconds: total })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;

        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        if seconds > 0 || self.seconds == 0 {
            write!(f, "{}s", seconds)?;
        }
        Ok(())
    }
}
