//! Monitor configuration structures
//!
//! Recognized options for one emission scheduler instance, loadable from
//! YAML or built in code. Options are validated before a scheduler accepts
//! them; out-of-range values are rejected with the offending field named.

use crate::selection::SelectionWeights;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration of one emission scheduler instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Cap on per-host entries per snapshot.
    #[serde(default = "default_max_hosts_per_report")]
    pub max_hosts_per_report: usize,
    /// Cadence while the cluster looks healthy (minutes-scale).
    #[serde(default = "default_normal_interval_ms")]
    pub normal_interval_ms: u64,
    /// Cadence while any host looks unhealthy (seconds-scale).
    #[serde(default = "default_alert_interval_ms")]
    pub alert_interval_ms: u64,
    /// Cluster drop level or host badness score that triggers the alert
    /// cadence.
    #[serde(default = "default_alert_drop_threshold")]
    pub alert_drop_threshold: f64,
    /// Consecutive clean ticks required to leave the alert cadence.
    #[serde(default = "default_hysteresis_intervals")]
    pub hysteresis_intervals: u32,
    /// Capacity of the bounded hand-off queue to the sink worker.
    #[serde(default = "default_emission_queue_capacity")]
    pub emission_queue_capacity: usize,
    /// Badness-score weights of the host selection policy.
    #[serde(default)]
    pub selection: SelectionWeights,
}

fn default_max_hosts_per_report() -> usize {
    20
}
fn default_normal_interval_ms() -> u64 {
    60_000
}
fn default_alert_interval_ms() -> u64 {
    1_000
}
fn default_alert_drop_threshold() -> f64 {
    0.5
}
fn default_hysteresis_intervals() -> u32 {
    3
}
fn default_emission_queue_capacity() -> usize {
    16
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_hosts_per_report: default_max_hosts_per_report(),
            normal_interval_ms: default_normal_interval_ms(),
            alert_interval_ms: default_alert_interval_ms(),
            alert_drop_threshold: default_alert_drop_threshold(),
            hysteresis_intervals: default_hysteresis_intervals(),
            emission_queue_capacity: default_emission_queue_capacity(),
            selection: SelectionWeights::default(),
        }
    }
}

impl MonitorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-snapshot host cap
    pub fn with_max_hosts_per_report(mut self, max_hosts: usize) -> Self {
        self.max_hosts_per_report = max_hosts;
        self
    }

    /// Set the healthy-cluster cadence
    pub fn with_normal_interval(mut self, interval: Duration) -> Self {
        self.normal_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the alert cadence
    pub fn with_alert_interval(mut self, interval: Duration) -> Self {
        self.alert_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the alert threshold
    pub fn with_alert_drop_threshold(mut self, threshold: f64) -> Self {
        self.alert_drop_threshold = threshold;
        self
    }

    /// Set the consecutive clean ticks required to leave alert
    pub fn with_hysteresis_intervals(mut self, intervals: u32) -> Self {
        self.hysteresis_intervals = intervals;
        self
    }

    /// Set the hand-off queue capacity
    pub fn with_emission_queue_capacity(mut self, capacity: usize) -> Self {
        self.emission_queue_capacity = capacity;
        self
    }

    /// Set the selection-policy weights
    pub fn with_selection(mut self, weights: SelectionWeights) -> Self {
        self.selection = weights;
        self
    }

    pub fn normal_interval(&self) -> Duration {
        Duration::from_millis(self.normal_interval_ms)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_millis(self.alert_interval_ms)
    }

    /// Parse and validate a config from a YAML document.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: MonitorConfig = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Checks every recognized option against its documented bounds.
    pub fn validate(&self) -> Result<()> {
        if self.max_hosts_per_report == 0 {
            return Err(Error::configuration(
                "max_hosts_per_report",
                "must be greater than 0",
            ));
        }
        if self.normal_interval_ms == 0 {
            return Err(Error::configuration(
                "normal_interval_ms",
                "must be greater than 0",
            ));
        }
        if self.alert_interval_ms == 0 {
            return Err(Error::configuration(
                "alert_interval_ms",
                "must be greater than 0",
            ));
        }
        if !self.alert_drop_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.alert_drop_threshold)
        {
            return Err(Error::configuration(
                "alert_drop_threshold",
                format!("must be within [0, 1], got {}", self.alert_drop_threshold),
            ));
        }
        if self.hysteresis_intervals == 0 {
            return Err(Error::configuration(
                "hysteresis_intervals",
                "must be at least 1",
            ));
        }
        if self.emission_queue_capacity == 0 {
            return Err(Error::configuration(
                "emission_queue_capacity",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
