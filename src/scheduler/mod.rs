//! 发射调度模块：自适应节奏状态机与每集群的发射循环。
//!
//! # Emission Scheduling Module
//!
//! Decides *when* snapshots are emitted. A healthy cluster is sampled at a
//! slow, minutes-scale cadence; as soon as the cluster aggregate or any host
//! crosses the alert threshold the cadence drops to seconds-scale, and it
//! only recovers after a configured number of consecutive clean ticks, so a
//! host oscillating near the threshold cannot flap the cadence.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CadenceController`] | Pure two-phase state machine with hysteresis |
//! | [`EmissionScheduler`] | Tick loop for one (service, cluster, partition) tuple |
//! | [`MonitorHandle`] | Deterministic teardown of a running instance |
//! | [`MonitorSet`] | Registry of running instances, one per tuple |
//!
//! ## Cadence behavior
//!
//! - `Normal`: emit every `normal_interval_ms`. An unhealthy tick switches
//!   to `Alert` with no extra wait — the triggering tick already emits and
//!   the next wait uses the fast interval.
//! - `Alert`: emit every `alert_interval_ms`. `hysteresis_intervals`
//!   consecutive clean ticks switch back to `Normal`.
//! - A failed tracker read or a failed assembly consumes the tick without
//!   emitting and leaves the cadence untouched.

pub mod cadence;
pub mod emitter;
pub mod registry;

pub use cadence::{CadenceController, CadenceDecision, CadencePhase};
pub use emitter::{EmissionScheduler, MonitorHandle};
pub use registry::{MonitorKey, MonitorSet};
