//! `HH:MM` wall-clock times used by session and break windows.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ProgramError, ProgramResult};

const MINUTES_PER_HOUR: u32 = 60;
const HOURS_PER_DAY: u32 = 24;

/// Wall-clock time of day with minute resolution.
///
/// Parsed from `HH:MM` (a single-digit hour such as `9:05` is accepted).
/// Serialized back as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    /// Build from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour >= HOURS_PER_DAY || minute >= MINUTES_PER_HOUR {
            return None;
        }
        Some(Self {
            minutes: hour * MINUTES_PER_HOUR + minute,
        })
    }

    /// Parse an `HH:MM` string.
    pub fn parse(value: &str) -> ProgramResult<Self> {
        let invalid = || ProgramError::InvalidTimeFormat {
            value: value.to_string(),
        };

        let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
        let hour = parse_component(hour).ok_or_else(invalid)?;
        let minute = parse_component(minute).ok_or_else(invalid)?;

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.minutes
    }

    pub fn hour(&self) -> u32 {
        self.minutes / MINUTES_PER_HOUR
    }

    pub fn minute(&self) -> u32 {
        self.minutes % MINUTES_PER_HOUR
    }
}

/// One or two ASCII digits.
fn parse_component(raw: &str) -> Option<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl FromStr for ClockTime {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw).map_err(de::Error::custom)
    }
}
