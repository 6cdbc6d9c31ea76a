//! 遥测汇模块：快照的尽力而为消费端（可插拔）。
//!
//! Telemetry sink module.
//!
//! Best-effort consumers of finished snapshots. Delivery is inherently
//! lossy: a failing or slow sink never stalls the emission scheduler, and a
//! lost snapshot is never escalated. The transport/format behind a sink is
//! owned by the sink implementation, not by this crate.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TelemetrySink`] | Trait for snapshot destinations |
//! | [`NoopTelemetrySink`] | Default no-op sink (no collection) |
//! | [`InMemoryTelemetrySink`] | Bounded in-memory sink for testing |
//! | [`ConsoleTelemetrySink`] | JSON-line console sink for debugging |
//! | [`CompositeTelemetrySink`] | Multi-destination composite sink |

use crate::model::Snapshot;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Telemetry sink trait.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn report(&self, snapshot: Snapshot) -> Result<()>;
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// No-op sink (always available).
pub struct NoopTelemetrySink;

#[async_trait]
impl TelemetrySink for NoopTelemetrySink {
    async fn report(&self, _: Snapshot) -> Result<()> {
        Ok(())
    }
}

/// Returns a no-op telemetry sink.
pub fn noop_sink() -> Arc<dyn TelemetrySink> {
    Arc::new(NoopTelemetrySink)
}

/// Bounded in-memory sink for testing.
pub struct InMemoryTelemetrySink {
    snapshots: Arc<RwLock<Vec<Snapshot>>>,
    max_snapshots: usize,
}

impl InMemoryTelemetrySink {
    pub fn new(max: usize) -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(Vec::new())),
            max_snapshots: max,
        }
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.read().unwrap().clone()
    }

    pub fn snapshots_for_cluster(&self, cluster_name: &str) -> Vec<Snapshot> {
        self.snapshots
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.cluster_name() == cluster_name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.snapshots.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TelemetrySink for InMemoryTelemetrySink {
    async fn report(&self, snapshot: Snapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().unwrap();
        snapshots.push(snapshot);
        if snapshots.len() > self.max_snapshots {
            snapshots.remove(0);
        }
        Ok(())
    }
}

/// Console sink for debugging; one JSON line per snapshot.
pub struct ConsoleTelemetrySink {
    prefix: String,
}

impl ConsoleTelemetrySink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for ConsoleTelemetrySink {
    fn default() -> Self {
        Self::new("[Telemetry]")
    }
}

#[async_trait]
impl TelemetrySink for ConsoleTelemetrySink {
    async fn report(&self, snapshot: Snapshot) -> Result<()> {
        let line = serde_json::to_string(&snapshot)?;
        println!("{} {}", self.prefix, line);
        Ok(())
    }
}

/// Composite sink for multiple destinations.
pub struct CompositeTelemetrySink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl CompositeTelemetrySink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Default for CompositeTelemetrySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetrySink for CompositeTelemetrySink {
    async fn report(&self, snapshot: Snapshot) -> Result<()> {
        for s in &self.sinks {
            let _ = s.report(snapshot.clone()).await;
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        for s in &self.sinks {
            let _ = s.close().await;
        }
        Ok(())
    }
}

static GLOBAL_SINK: once_cell::sync::Lazy<RwLock<Arc<dyn TelemetrySink>>> =
    once_cell::sync::Lazy::new(|| RwLock::new(Arc::new(NoopTelemetrySink)));

/// Returns the globally configured telemetry sink.
pub fn telemetry_sink() -> Arc<dyn TelemetrySink> {
    GLOBAL_SINK.read().unwrap().clone()
}

/// Sets the global telemetry sink.
pub fn set_telemetry_sink(sink: Arc<dyn TelemetrySink>) {
    *GLOBAL_SINK.write().unwrap() = sink;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotAssembler;
    use crate::tracker::ClusterObservation;

    fn snapshot(cluster: &str, interval_ms: u64) -> Snapshot {
        let aggregate = ClusterObservation {
            call_count: 10,
            average_latency: 5.0,
            dropped_calls: 0,
            error_count: 0,
            failed_route_calls: 0,
            drop_level: 0.0,
            num_hosts: 1,
        };
        SnapshotAssembler::assemble("svc", cluster, &aggregate, &[], 0, interval_ms).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_sink_collects_in_order() {
        let sink = InMemoryTelemetrySink::new(10);
        sink.report(snapshot("a", 1)).await.unwrap();
        sink.report(snapshot("a", 2)).await.unwrap();

        let collected = sink.snapshots();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].interval_ms(), 1);
        assert_eq!(collected[1].interval_ms(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_sink_is_bounded() {
        let sink = InMemoryTelemetrySink::new(2);
        for i in 0..5 {
            sink.report(snapshot("a", i)).await.unwrap();
        }
        let collected = sink.snapshots();
        assert_eq!(collected.len(), 2);
        // oldest entries were evicted
        assert_eq!(collected[0].interval_ms(), 3);
        assert_eq!(collected[1].interval_ms(), 4);
    }

    #[tokio::test]
    async fn test_in_memory_sink_filters_by_cluster() {
        let sink = InMemoryTelemetrySink::new(10);
        sink.report(snapshot("a", 1)).await.unwrap();
        sink.report(snapshot("b", 2)).await.unwrap();
        assert_eq!(sink.snapshots_for_cluster("b").len(), 1);
    }

    #[tokio::test]
    async fn test_composite_sink_fans_out() {
        let first = Arc::new(InMemoryTelemetrySink::new(10));
        let second = Arc::new(InMemoryTelemetrySink::new(10));
        let composite = CompositeTelemetrySink::new()
            .add_sink(first.clone())
            .add_sink(second.clone());

        composite.report(snapshot("a", 1)).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_global_sink_replacement() {
        let sink = Arc::new(InMemoryTelemetrySink::new(10));
        set_telemetry_sink(sink.clone());
        telemetry_sink().report(snapshot("a", 1)).await.unwrap();
        assert_eq!(sink.len(), 1);

        set_telemetry_sink(noop_sink());
    }
}
