//! # lb-telemetry
//!
//! 这是面向客户端负载均衡器的集群健康遥测核心，提供自适应节奏的快照发射控制。
//!
//! Adaptive cluster-health telemetry core for client-side load balancers:
//! bounded-size snapshots of cluster and per-host call statistics, emitted
//! at a cadence that tightens automatically while hosts degrade.
//!
//! ## Overview
//!
//! The load balancer's routing path publishes raw health counters through a
//! lock-free view; an emission scheduler samples that view, ranks hosts by a
//! badness score, assembles an invariant-checked immutable snapshot, and
//! hands it to a pluggable telemetry sink. The monitoring loop never touches
//! the hot call path and never blocks on a slow sink.
//!
//! ## Core Philosophy
//!
//! - **Signal over volume**: healthy clusters emit rarely and report few or
//!   zero hosts; degrading hosts are reported within seconds
//! - **Transition visibility**: a host entering or leaving quarantine always
//!   appears in the very next snapshot, regardless of rank
//! - **Lossy by contract**: telemetry delivery is best-effort; every failure
//!   degrades to "skip this interval", never to backpressure on routing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lb_telemetry::{
//!     ClusterObservation, EmissionScheduler, InMemoryTelemetrySink, MonitorConfig,
//!     SharedHealthView, TrackerView,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> lb_telemetry::Result<()> {
//!     let tracker = Arc::new(SharedHealthView::new());
//!     let sink = Arc::new(InMemoryTelemetrySink::new(128));
//!
//!     let scheduler = EmissionScheduler::new(
//!         "checkout-service",
//!         "checkout-cluster",
//!         0,
//!         MonitorConfig::default(),
//!         tracker.clone(),
//!     )?;
//!     let handle = scheduler.spawn(sink);
//!
//!     // The load balancer publishes fresh counters as it routes calls:
//!     tracker.publish(TrackerView {
//!         cluster: ClusterObservation {
//!             call_count: 1000,
//!             average_latency: 12.0,
//!             dropped_calls: 0,
//!             error_count: 2,
//!             failed_route_calls: 0,
//!             drop_level: 0.0,
//!             num_hosts: 4,
//!         },
//!         hosts: vec![],
//!     });
//!
//!     // ...
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | Immutable snapshot entities and the validating assembler |
//! | [`tracker`] | Health tracker read seam and the lock-free shared view |
//! | [`selection`] | Host selection policy (pure, deterministic) |
//! | [`scheduler`] | Cadence state machine and per-cluster emission loops |
//! | [`sink`] | Telemetry sink trait and reference sinks |
//! | [`config`] | Recognized monitor options, YAML-loadable |

pub mod config;
pub mod model;
pub mod scheduler;
pub mod selection;
pub mod sink;
pub mod tracker;

// Re-export main types for convenience
pub use config::MonitorConfig;
pub use model::{ClusterStats, Snapshot, SnapshotAssembler, UriInfo, ValidationError};
pub use scheduler::{
    CadenceController, CadencePhase, EmissionScheduler, MonitorHandle, MonitorKey, MonitorSet,
};
pub use selection::{badness_score, select, HostKey, Selection, SelectionWeights};
pub use sink::{
    noop_sink, set_telemetry_sink, telemetry_sink, CompositeTelemetrySink, ConsoleTelemetrySink,
    InMemoryTelemetrySink, NoopTelemetrySink, TelemetrySink,
};
pub use tracker::{
    ClusterHealthTracker, ClusterObservation, HostObservation, SharedHealthView, TrackerError,
    TrackerView,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
