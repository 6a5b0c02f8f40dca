use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a single stored reading against its alarm thresholds.
///
/// Ordered so that comparisons follow alarm priority: `Critical` dominates
/// `Warning`, which dominates `Normal`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    /// Value within thresholds
    Normal,
    /// Value inside the buffer band next to a threshold
    Warning,
    /// Value beyond the min/max alarm threshold
    Critical,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Normal => "normal",
            ReadingStatus::Warning => "warning",
            ReadingStatus::Critical => "critical",
        }
    }

    /// Worst status across a set, defaulting to `Normal` when empty.
    pub fn worst(statuses: impl IntoIterator<Item = ReadingStatus>) -> ReadingStatus {
        statuses
            .into_iter()
            .max()
            .unwrap_or(ReadingStatus::Normal)
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ReadingStatus::Normal),
            "warning" => Ok(ReadingStatus::Warning),
            "critical" => Ok(ReadingStatus::Critical),
            _ => Err(()),
        }
    }
}

/// Which threshold a hard alarm breach crossed.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmType {
    /// Below the minimum threshold
    Low,
    /// Above the maximum threshold
    High,
}

impl fmt::Display for AlarmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmType::Low => f.write_str("low"),
            AlarmType::High => f.write_str("high"),
        }
    }
}

/// Per-sensor freshness tier derived from the age of the latest reading.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorLiveness {
    /// Updated within the online window
    Live,
    /// Updated within the last 24 hours
    Stale,
    /// Has readings, all older than 24 hours
    Offline,
    /// Never reported
    Unknown,
}
