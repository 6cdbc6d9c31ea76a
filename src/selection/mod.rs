//! 主机选择策略：在基数上限内挑选快照应包含的主机。
//!
//! Host selection policy.
//!
//! This module is intentionally **pure logic**: it performs no I/O and holds
//! no state. Given one tracker view and the quarantine set observed on the
//! previous selection, it ranks hosts by a badness score and returns the
//! bounded, deterministically ordered subset worth reporting.
//!
//! Two rules drive the output:
//! 1. Every host whose quarantine state changed since the previous selection
//!    is included regardless of score, so transitions are always visible.
//! 2. Remaining slots go to the worst-scoring hosts. Hosts scoring zero are
//!    omitted entirely; a healthy cluster reports few or zero hosts.

use crate::tracker::{HostObservation, TrackerView};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Weights of the badness-score components.
///
/// The producing formula is a policy parameter, not part of the emitted
/// contract; the drop rate carries the highest default weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    /// Weight of the host's computed drop rate.
    #[serde(default = "default_drop_rate_weight")]
    pub drop_rate: f64,
    /// Weight of the error rate (errors over current calls).
    #[serde(default = "default_error_rate_weight")]
    pub error_rate: f64,
    /// Weight of the backlog ratio (outstanding over total calls).
    #[serde(default = "default_backlog_weight")]
    pub backlog: f64,
    /// Weight of the quarantine flag.
    #[serde(default = "default_quarantine_weight")]
    pub quarantine: f64,
}

fn default_drop_rate_weight() -> f64 {
    0.5
}
fn default_error_rate_weight() -> f64 {
    0.2
}
fn default_backlog_weight() -> f64 {
    0.15
}
fn default_quarantine_weight() -> f64 {
    0.15
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            drop_rate: default_drop_rate_weight(),
            error_rate: default_error_rate_weight(),
            backlog: default_backlog_weight(),
            quarantine: default_quarantine_weight(),
        }
    }
}

impl SelectionWeights {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drop-rate weight
    pub fn with_drop_rate(mut self, weight: f64) -> Self {
        self.drop_rate = weight;
        self
    }

    /// Set the error-rate weight
    pub fn with_error_rate(mut self, weight: f64) -> Self {
        self.error_rate = weight;
        self
    }

    /// Set the backlog-ratio weight
    pub fn with_backlog(mut self, weight: f64) -> Self {
        self.backlog = weight;
        self
    }

    /// Set the quarantine-flag weight
    pub fn with_quarantine(mut self, weight: f64) -> Self {
        self.quarantine = weight;
        self
    }
}

/// Identity of a host across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostKey {
    pub host_name: String,
    pub port: u16,
}

impl HostKey {
    pub fn of(host: &HostObservation) -> Self {
        Self {
            host_name: host.host_name.clone(),
            port: host.port,
        }
    }
}

/// Result of one selection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Hosts to include, most significant first. Length is bounded by the
    /// `max_hosts` given to [`select`].
    pub hosts: Vec<HostObservation>,
    /// Hosts currently quarantined; feed this back as `previous_quarantined`
    /// on the next tick.
    pub quarantined: HashSet<HostKey>,
    /// Highest badness score over all hosts in the view (not only the
    /// selected ones).
    pub max_score: f64,
}

/// Badness score of a single host under the given weights.
///
/// Deterministic combination of drop rate, error rate, backlog ratio and the
/// quarantine flag; components with a zero denominator contribute nothing.
pub fn badness_score(host: &HostObservation, weights: &SelectionWeights) -> f64 {
    let error_rate = if host.current_call_count == 0 {
        0.0
    } else {
        (host.current_error_count as f64 / host.current_call_count as f64).min(1.0)
    };
    let backlog = if host.total_call_count == 0 {
        0.0
    } else {
        (host.outstanding_count as f64 / host.total_call_count as f64).min(1.0)
    };
    let quarantine = if host.is_quarantined() { 1.0 } else { 0.0 };

    weights.drop_rate * host.computed_drop_rate
        + weights.error_rate * error_rate
        + weights.backlog * backlog
        + weights.quarantine * quarantine
}

/// Selects the hosts one snapshot should include.
///
/// Pure function of its inputs: identical view, previous quarantine set and
/// weights always yield the identical ordered output. Ties are broken by
/// ascending host name, then ascending port.
pub fn select(
    view: &TrackerView,
    previous_quarantined: &HashSet<HostKey>,
    max_hosts: usize,
    weights: &SelectionWeights,
) -> Selection {
    let mut quarantined = HashSet::new();
    let mut transitioned: Vec<(f64, &HostObservation)> = Vec::new();
    let mut remaining: Vec<(f64, &HostObservation)> = Vec::new();
    let mut max_score: f64 = 0.0;

    for host in &view.hosts {
        let key = HostKey::of(host);
        if host.is_quarantined() {
            quarantined.insert(key.clone());
        }

        let score = badness_score(host, weights);
        max_score = max_score.max(score);

        if previous_quarantined.contains(&key) != host.is_quarantined() {
            transitioned.push((score, host));
        } else {
            remaining.push((score, host));
        }
    }

    sort_by_rank(&mut transitioned);
    sort_by_rank(&mut remaining);

    let mut hosts: Vec<HostObservation> = transitioned
        .into_iter()
        .take(max_hosts)
        .map(|(_, host)| host.clone())
        .collect();
    let free_slots = max_hosts - hosts.len();
    hosts.extend(
        remaining
            .into_iter()
            .filter(|(score, _)| *score > 0.0)
            .take(free_slots)
            .map(|(_, host)| host.clone()),
    );

    Selection {
        hosts,
        quarantined,
        max_score,
    }
}

fn sort_by_rank(hosts: &mut [(f64, &HostObservation)]) {
    hosts.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| a.host_name.cmp(&b.host_name))
            .then_with(|| a.port.cmp(&b.port))
    });
}
