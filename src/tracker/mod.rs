//! 集群健康跟踪器边界：负载均衡器热路径发布的无锁健康视图。
//!
//! Cluster health tracker boundary.
//!
//! The load balancer's routing path produces raw per-host counters and a
//! cluster aggregate; this module defines the read seam the emission
//! scheduler consumes them through. Reads must never block the hot call
//! path, so the crate-provided implementation ([`SharedHealthView`]) keeps
//! the current view behind an atomically swapped `Arc`: the publisher swaps
//! in a fresh immutable view, readers load whatever is current.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ClusterHealthTracker`] | Read seam for one consistent point-in-time view |
//! | [`TrackerView`] | Cluster aggregate plus raw per-host observations |
//! | [`SharedHealthView`] | Lock-free publish/observe implementation |

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// The health tracker read failed; the tick is skipped and retried later.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("no health view has been published yet")]
    Unavailable,
    #[error("health tracker read failed: {0}")]
    ReadFailed(String),
}

/// Raw per-host counters as produced by the load balancer.
///
/// Pre-aggregated input; this crate never derives these from individual
/// calls. The field set mirrors the emitted per-host record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostObservation {
    pub host_name: String,
    pub port: u16,
    pub current_call_count: u64,
    pub total_call_count: u64,
    pub outstanding_count: u64,
    pub current_latency: f64,
    pub current_error_count: u32,
    pub p50_latency: u64,
    pub p90_latency: u64,
    pub p95_latency: u64,
    pub p99_latency: u64,
    /// Milliseconds spent in quarantine; 0 means not quarantined.
    pub quarantine_duration: u64,
    pub computed_drop_rate: f64,
    pub transmission_points: u32,
}

impl HostObservation {
    pub fn is_quarantined(&self) -> bool {
        self.quarantine_duration > 0
    }
}

/// Raw cluster aggregate as produced by the load balancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterObservation {
    pub call_count: u64,
    pub average_latency: f64,
    pub dropped_calls: u64,
    pub error_count: u64,
    pub failed_route_calls: u64,
    pub drop_level: f64,
    pub num_hosts: u32,
}

/// One consistent point-in-time read of the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerView {
    pub cluster: ClusterObservation,
    pub hosts: Vec<HostObservation>,
}

/// Non-blocking, consistent point-in-time read of current health counters.
///
/// `observe` is synchronous and must not suspend; the scheduler calls it
/// once per tick.
pub trait ClusterHealthTracker: Send + Sync {
    fn observe(&self) -> Result<Arc<TrackerView>, TrackerError>;
}

/// Atomically swapped immutable health view.
///
/// The load balancer publishes a complete fresh [`TrackerView`]; readers get
/// whichever view is current without taking a lock. Until the first publish,
/// `observe` reports [`TrackerError::Unavailable`].
#[derive(Default)]
pub struct SharedHealthView {
    current: ArcSwapOption<TrackerView>,
}

impl SharedHealthView {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Replaces the current view. Called from the load balancer side.
    pub fn publish(&self, view: TrackerView) {
        self.current.store(Some(Arc::new(view)));
    }

    /// Clears the current view; subsequent reads report `Unavailable`.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl ClusterHealthTracker for SharedHealthView {
    fn observe(&self) -> Result<Arc<TrackerView>, TrackerError> {
        self.current.load_full().ok_or(TrackerError::Unavailable)
    }
}
