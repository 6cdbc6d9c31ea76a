//! Emission scheduler.
//!
//! One scheduler instance owns the monitoring control loop for a single
//! (service, cluster, partition) tuple: tick → read tracker → run selection
//! → assemble → hand off to the sink worker → wait for the cadence the
//! state machine picked. The timer wait is the only suspension point;
//! tracker reads, selection and assembly are synchronous and bounded by the
//! host cap.

use crate::config::MonitorConfig;
use crate::model::{SnapshotAssembler, ValidationError};
use crate::scheduler::cadence::CadenceController;
use crate::scheduler::registry::MonitorKey;
use crate::selection::{self, HostKey, Selection};
use crate::sink::TelemetrySink;
use crate::tracker::{ClusterHealthTracker, ClusterObservation};
use crate::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Cluster badness for the cadence decision: the cluster-wide drop level,
/// any host scoring past the threshold, or any quarantined host.
fn is_unhealthy(cluster: &ClusterObservation, selection: &Selection, threshold: f64) -> bool {
    cluster.drop_level >= threshold
        || selection.max_score >= threshold
        || !selection.quarantined.is_empty()
}

/// Periodic snapshot emitter for one (service, cluster, partition) tuple.
///
/// Instances share no mutable state and run fully in parallel; within one
/// instance ticks are strictly sequential.
pub struct EmissionScheduler {
    service_name: String,
    cluster_name: String,
    partition_id: u32,
    config: MonitorConfig,
    tracker: Arc<dyn ClusterHealthTracker>,
}

impl EmissionScheduler {
    /// Validates the configuration and identity up front; a scheduler that
    /// could never assemble a valid snapshot is rejected here instead of
    /// failing every interval.
    pub fn new(
        service_name: impl Into<String>,
        cluster_name: impl Into<String>,
        partition_id: u32,
        config: MonitorConfig,
        tracker: Arc<dyn ClusterHealthTracker>,
    ) -> Result<Self> {
        config.validate()?;
        let service_name = service_name.into();
        let cluster_name = cluster_name.into();
        if service_name.is_empty() {
            return Err(ValidationError {
                field: "serviceName".to_string(),
                value: "\"\"".to_string(),
                reason: "must be non-empty",
            }
            .into());
        }
        if cluster_name.is_empty() {
            return Err(ValidationError {
                field: "clusterName".to_string(),
                value: "\"\"".to_string(),
                reason: "must be non-empty",
            }
            .into());
        }

        Ok(Self {
            service_name,
            cluster_name,
            partition_id,
            config,
            tracker,
        })
    }

    /// Identity of this scheduler instance.
    pub fn key(&self) -> MonitorKey {
        MonitorKey {
            service: self.service_name.clone(),
            cluster: self.cluster_name.clone(),
            partition: self.partition_id,
        }
    }

    /// Starts the tick loop and the sink worker; returns the handle that
    /// tears both down.
    pub fn spawn(self, sink: Arc<dyn TelemetrySink>) -> MonitorHandle {
        let (tx, mut rx) = mpsc::channel::<crate::model::Snapshot>(self.config.emission_queue_capacity);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(async move {
            while let Some(snapshot) = rx.recv().await {
                if let Err(error) = sink.report(snapshot).await {
                    warn!(%error, "telemetry sink rejected snapshot; dropping");
                }
            }
        });

        let Self {
            service_name,
            cluster_name,
            partition_id,
            config,
            tracker,
        } = self;

        let ticker = tokio::spawn(async move {
            let mut cadence = CadenceController::new(
                config.normal_interval(),
                config.alert_interval(),
                config.hysteresis_intervals,
            );
            let mut previous_quarantined: HashSet<HostKey> = HashSet::new();
            let mut last_emission = Instant::now();
            let mut next_wait = cadence.current_wait();

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(next_wait) => {}
                }

                next_wait = match tracker.observe() {
                    Err(error) => {
                        warn!(
                            service = %service_name,
                            cluster = %cluster_name,
                            partition = partition_id,
                            %error,
                            "tracker read failed; skipping this interval"
                        );
                        cadence.current_wait()
                    }
                    Ok(view) => {
                        let selection = selection::select(
                            &view,
                            &previous_quarantined,
                            config.max_hosts_per_report,
                            &config.selection,
                        );
                        let unhealthy =
                            is_unhealthy(&view.cluster, &selection, config.alert_drop_threshold);

                        let phase_before = cadence.phase();
                        let decision = cadence.observe_tick(unhealthy);
                        if decision.phase != phase_before {
                            info!(
                                service = %service_name,
                                cluster = %cluster_name,
                                partition = partition_id,
                                from = ?phase_before,
                                to = ?decision.phase,
                                "emission cadence changed"
                            );
                        }

                        let elapsed_ms = last_emission.elapsed().as_millis() as u64;
                        match SnapshotAssembler::assemble(
                            &service_name,
                            &cluster_name,
                            &view.cluster,
                            &selection.hosts,
                            partition_id,
                            elapsed_ms,
                        ) {
                            Err(error) => {
                                warn!(
                                    service = %service_name,
                                    cluster = %cluster_name,
                                    field = %error.field,
                                    value = %error.value,
                                    "snapshot failed validation; skipping this emission"
                                );
                            }
                            Ok(snapshot) => match tx.try_send(snapshot) {
                                Ok(()) => {
                                    // interval bookkeeping advances only on a
                                    // successful hand-off, so consumers can
                                    // detect skipped intervals
                                    last_emission = Instant::now();
                                    debug!(
                                        service = %service_name,
                                        cluster = %cluster_name,
                                        hosts = selection.hosts.len(),
                                        phase = ?decision.phase,
                                        "snapshot emitted"
                                    );
                                }
                                Err(mpsc::error::TrySendError::Full(_)) => {
                                    warn!(
                                        service = %service_name,
                                        cluster = %cluster_name,
                                        "emission queue full; dropping snapshot"
                                    );
                                }
                                Err(mpsc::error::TrySendError::Closed(_)) => {
                                    warn!(
                                        service = %service_name,
                                        cluster = %cluster_name,
                                        "sink worker stopped; dropping snapshot"
                                    );
                                }
                            },
                        }

                        previous_quarantined = selection.quarantined;
                        decision.next_wait
                    }
                };
            }
        });

        MonitorHandle {
            shutdown: shutdown_tx,
            ticker,
            worker,
        }
    }
}

/// Handle to a running scheduler instance.
///
/// Dropping the handle also stops the tick loop (the shutdown channel
/// closes); `shutdown` additionally joins the loop and abandons any
/// in-flight emission.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    ticker: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stops scheduling new ticks and tears the instance down. In-flight
    /// emissions are abandoned without waiting for sink acknowledgment.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.ticker.await;
        self.worker.abort();
        let _ = self.worker.await;
    }

    pub fn is_running(&self) -> bool {
        !self.ticker.is_finished()
    }
}
