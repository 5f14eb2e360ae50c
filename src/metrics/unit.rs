//! Time unit conversion for recorded durations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of duration units, each convertible to nanoseconds by integer
/// multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// 1 ns
    Nanoseconds,
    /// 1_000 ns
    Microseconds,
    /// 1_000_000 ns
    Milliseconds,
    /// 1e9 ns
    Seconds,
    /// 60 s
    Minutes,
    /// 60 min
    Hours,
    /// 24 h
    Days,
}

impl TimeUnit {
    /// Nanoseconds in one unit.
    pub const fn nanos_per_unit(self) -> i64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 60 * 60 * 1_000_000_000,
            Self::Days => 24 * 60 * 60 * 1_000_000_000,
        }
    }

    /// Converts `value` of this unit to nanoseconds, saturating at the i64
    /// range. Negative inputs stay negative so callers can reject them.
    pub fn to_nanos(self, value: i64) -> i64 {
        value.saturating_mul(self.nanos_per_unit())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
            Self::Days => "d",
        };
        f.write_str(label)
    }
}
