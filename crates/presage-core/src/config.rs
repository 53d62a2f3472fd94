//! Engine configuration.
//!
//! Every operational tunable (Rule B use budget, burst threshold, retry
//! depth, pause cycle) is configuration rather than hard-coded; the defaults
//! below are the canonical deployment values.

use crate::effects::ChannelId;
use crate::errors::{PresageError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_mirror_threshold() -> u32 {
    6
}
fn default_rule_b_budget() -> u32 {
    1
}
fn default_burst_threshold() -> u32 {
    4
}
fn default_max_retries() -> u8 {
    3
}
fn default_pause_cycle_secs() -> Vec<u64> {
    vec![300, 600, 900]
}
fn default_summary_interval_mins() -> u64 {
    20
}
fn default_reset_time() -> String {
    "00:59".to_string()
}
fn default_reset_utc_offset_hours() -> i32 {
    1
}
fn default_announce_channel() -> ChannelId {
    ChannelId(0)
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Mirror-pair difference at which Rule B trips.
    #[serde(default = "default_mirror_threshold")]
    pub mirror_threshold: u32,
    /// Consecutive forecasts one Rule B authorization may drive.
    #[serde(default = "default_rule_b_budget")]
    pub rule_b_budget: u32,
    /// Forecasts sent before the next trigger starts a pause.
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: u32,
    /// Extra checks after a missed target (attempt indices 1..=max_retries).
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Rotating pause durations, in seconds.
    #[serde(default = "default_pause_cycle_secs")]
    pub pause_cycle_secs: Vec<u64>,
    /// Minutes between periodic win/loss summaries.
    #[serde(default = "default_summary_interval_mins")]
    pub summary_interval_mins: u64,
    /// Wall-clock time of the daily full reset, `HH:MM`.
    #[serde(default = "default_reset_time")]
    pub reset_time: String,
    /// UTC offset, in hours, the reset time is expressed in.
    #[serde(default = "default_reset_utc_offset_hours")]
    pub reset_utc_offset_hours: i32,
    /// Destination for forecast announcements and summaries.
    #[serde(default = "default_announce_channel")]
    pub announce_channel: ChannelId,
    /// Optional destination for Rule B imposition notices.
    #[serde(default)]
    pub admin_channel: Option<ChannelId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mirror_threshold: default_mirror_threshold(),
            rule_b_budget: default_rule_b_budget(),
            burst_threshold: default_burst_threshold(),
            max_retries: default_max_retries(),
            pause_cycle_secs: default_pause_cycle_secs(),
            summary_interval_mins: default_summary_interval_mins(),
            reset_time: default_reset_time(),
            reset_utc_offset_hours: default_reset_utc_offset_hours(),
            announce_channel: default_announce_channel(),
            admin_channel: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document into a config, then validate it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)
            .map_err(|e| PresageError::invalid(format!("config parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.mirror_threshold < 2 {
            return Err(PresageError::invalid("mirror_threshold must be at least 2"));
        }
        if self.rule_b_budget == 0 {
            return Err(PresageError::invalid("rule_b_budget must be positive"));
        }
        if self.burst_threshold == 0 {
            return Err(PresageError::invalid("burst_threshold must be positive"));
        }
        if self.pause_cycle_secs.is_empty() {
            return Err(PresageError::invalid("pause_cycle_secs must be non-empty"));
        }
        if self.pause_cycle_secs.iter().any(|&s| s == 0) {
            return Err(PresageError::invalid("pause durations must be positive"));
        }
        if self.summary_interval_mins == 0 {
            return Err(PresageError::invalid(
                "summary_interval_mins must be positive",
            ));
        }
        if !(-12..=14).contains(&self.reset_utc_offset_hours) {
            return Err(PresageError::invalid("reset_utc_offset_hours out of range"));
        }
        self.reset_time_parts()?;
        Ok(())
    }

    /// The pause cycle as durations.
    pub fn pause_cycle(&self) -> Vec<Duration> {
        self.pause_cycle_secs
            .iter()
            .map(|&s| Duration::from_secs(s))
            .collect()
    }

    /// Parse `reset_time` into `(hour, minute)`.
    pub fn reset_time_parts(&self) -> Result<(u32, u32)> {
        let (h, m) = self
            .reset_time
            .split_once(':')
            .ok_or_else(|| PresageError::invalid("reset_time must look like HH:MM"))?;
        let hour: u32 = h
            .parse()
            .map_err(|_| PresageError::invalid("reset_time hour is not a number"))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| PresageError::invalid("reset_time minute is not a number"))?;
        if hour > 23 || minute > 59 {
            return Err(PresageError::invalid("reset_time out of range"));
        }
        Ok((hour, minute))
    }
}
