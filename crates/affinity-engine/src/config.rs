//! Configuration for the affinity engine
//!
//! Defines the interaction window, repository timeout, and the tunable
//! scoring thresholds. Every field has a default, so a TOML file only needs
//! the keys it overrides.

use crate::EngineError;
use affinity_domain::scoring::{
    CONSISTENCY_SAMPLE_SIZE, FREQUENCY_MULTIPLIER, FREQUENCY_WINDOW_DAYS, MESSAGE_COUNT_CEILING,
    SPARSE_HISTORY_THRESHOLD,
};
use affinity_domain::{ScoringConfig, INTERACTION_WINDOW_LIMIT};
use chrono::{FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted frequency window (about ten years)
pub const MAX_FREQUENCY_WINDOW_DAYS: u32 = 3650;

/// Configuration for the affinity engine
///
/// # Examples
///
/// ```
/// use affinity_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.window_limit, 1000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Most recent interactions read per relationship
    /// Default: 1000
    pub window_limit: usize,

    /// Upper bound on each repository call (in milliseconds)
    /// Default: 2000
    pub fetch_timeout_ms: u64,

    /// Message count that earns a full message-count score
    /// Default: 5000
    pub message_count_ceiling: u32,

    /// Trailing window of the frequency component (in days)
    /// Default: 30
    pub frequency_window_days: u32,

    /// Scale applied to the active-day fraction
    /// Default: 3.3
    pub frequency_multiplier: f64,

    /// Recent interactions sampled for consistency
    /// Default: 100
    pub consistency_sample_size: usize,

    /// Interaction count under which consistency scales linearly
    /// Default: 10
    pub sparse_history_threshold: usize,

    /// Offset (minutes east of UTC) defining calendar days
    /// Default: unset, meaning the machine's local offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,

    /// Write computed totals back to the repository
    /// Default: true
    pub persist_scores: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_limit: INTERACTION_WINDOW_LIMIT,
            fetch_timeout_ms: 2000,
            message_count_ceiling: MESSAGE_COUNT_CEILING,
            frequency_window_days: FREQUENCY_WINDOW_DAYS,
            frequency_multiplier: FREQUENCY_MULTIPLIER,
            consistency_sample_size: CONSISTENCY_SAMPLE_SIZE,
            sparse_history_threshold: SPARSE_HISTORY_THRESHOLD,
            utc_offset_minutes: None,
            persist_scores: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window_limit == 0 {
            return Err(EngineError::Config("window_limit must be greater than 0".to_string()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(EngineError::Config("fetch_timeout_ms must be greater than 0".to_string()));
        }
        if self.message_count_ceiling == 0 {
            return Err(EngineError::Config(
                "message_count_ceiling must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_FREQUENCY_WINDOW_DAYS).contains(&self.frequency_window_days) {
            return Err(EngineError::Config(format!(
                "frequency_window_days must be between 1 and {}",
                MAX_FREQUENCY_WINDOW_DAYS
            )));
        }
        if !self.frequency_multiplier.is_finite() || self.frequency_multiplier <= 0.0 {
            return Err(EngineError::Config(
                "frequency_multiplier must be a positive number".to_string(),
            ));
        }
        if self.consistency_sample_size < 2 {
            return Err(EngineError::Config(
                "consistency_sample_size must be at least 2".to_string(),
            ));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if Self::offset_from_minutes(minutes).is_none() {
                return Err(EngineError::Config(format!(
                    "utc_offset_minutes out of range: {}",
                    minutes
                )));
            }
        }
        Ok(())
    }

    /// Get the repository timeout as Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Offset used for calendar-day grouping
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(Self::offset_from_minutes)
            .unwrap_or_else(|| *Local::now().offset())
    }

    /// Scoring parameters for the domain computation
    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            message_count_ceiling: self.message_count_ceiling,
            frequency_window_days: self.frequency_window_days,
            frequency_multiplier: self.frequency_multiplier,
            consistency_sample_size: self.consistency_sample_size,
            sparse_history_threshold: self.sparse_history_threshold,
            ..ScoringConfig::default()
        }
    }

    fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
        minutes.checked_mul(60).and_then(FixedOffset::east_opt)
    }
}
