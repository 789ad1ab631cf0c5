use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::calendar::Calendar;

/// Tunable thresholds and calendar configuration for the analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes east of UTC used for all date bucketing. `None` uses the host's local offset.
    pub utc_offset_minutes: Option<i32>,

    /// Expenses above `mean + multiplier * std_dev` are flagged as unusual.
    pub unusual_stddev_multiplier: f64,

    /// Minimum number of expenses before outlier detection says anything.
    pub min_unusual_sample: usize,

    /// Slope must exceed this fraction of the first month's spending to count as a trend.
    pub trend_threshold: f64,

    /// Number of months the spending trend looks back over.
    pub trend_months: usize,

    /// Weekend share of monthly spending (0-1) above which an insight is produced.
    pub weekend_share_threshold: f64,

    /// Backups kept by `cleanup_old_backups`.
    pub max_backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            unusual_stddev_multiplier: 2.0,
            min_unusual_sample: 5,
            trend_threshold: 0.1,
            trend_months: 3,
            weekend_share_threshold: 0.4,
            max_backups: 5,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Settings with a fixed UTC calendar, handy for deterministic output.
    pub fn utc() -> Self {
        Self {
            utc_offset_minutes: Some(0),
            ..Self::default()
        }
    }

    pub fn calendar(&self) -> Result<Calendar, CoreError> {
        match self.utc_offset_minutes {
            Some(minutes) => Calendar::from_offset_minutes(minutes),
            None => Ok(Calendar::local()),
        }
    }
}
