//! Monitor registry.
//!
//! Owns the running scheduler instances, one per (service, cluster,
//! partition) tuple. Instances are independent; the registry only tracks
//! their handles so monitoring can be torn down per tuple or wholesale.

use crate::scheduler::emitter::{EmissionScheduler, MonitorHandle};
use crate::sink::TelemetrySink;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Identity of one monitored (service, cluster, partition) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonitorKey {
    pub service: String,
    pub cluster: String,
    pub partition: u32,
}

/// Running scheduler instances keyed by tuple.
#[derive(Default)]
pub struct MonitorSet {
    monitors: HashMap<MonitorKey, MonitorHandle>,
}

impl MonitorSet {
    pub fn new() -> Self {
        Self {
            monitors: HashMap::new(),
        }
    }

    /// Starts the scheduler unless its tuple is already monitored.
    ///
    /// Returns `false` (without spawning) if a monitor for the tuple is
    /// already running.
    pub fn spawn(&mut self, scheduler: EmissionScheduler, sink: Arc<dyn TelemetrySink>) -> bool {
        let key = scheduler.key();
        if self.monitors.contains_key(&key) {
            return false;
        }
        info!(
            service = %key.service,
            cluster = %key.cluster,
            partition = key.partition,
            "starting cluster monitor"
        );
        self.monitors.insert(key, scheduler.spawn(sink));
        true
    }

    pub fn contains(&self, key: &MonitorKey) -> bool {
        self.monitors.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Stops monitoring one tuple; returns `false` if it was not monitored.
    pub async fn stop(&mut self, key: &MonitorKey) -> bool {
        match self.monitors.remove(key) {
            Some(handle) => {
                handle.shutdown().await;
                info!(
                    service = %key.service,
                    cluster = %key.cluster,
                    partition = key.partition,
                    "stopped cluster monitor"
                );
                true
            }
            None => false,
        }
    }

    /// Stops every running monitor.
    pub async fn stop_all(&mut self) {
        for (_, handle) in self.monitors.drain() {
            handle.shutdown().await;
        }
    }
}
