//! Snapshot assembler.
//!
//! The only construction path for [`Snapshot`]. Re-derives every data-model
//! invariant from the raw tracker counters and either returns a fully valid
//! immutable snapshot or a [`ValidationError`] naming the offending field and
//! value. The caller skips the interval on error; no partial object is ever
//! built.

use crate::model::{ClusterStats, Snapshot, UriInfo};
use crate::tracker::{ClusterObservation, HostObservation};
use thiserror::Error;

/// A field of an assembled snapshot would violate an invariant.
///
/// `field` is the wire-contract path of the offending field (e.g.
/// `uriList[2].computedDropRate`), `value` its rendered value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field {field} has invalid value {value}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub reason: &'static str,
}

impl ValidationError {
    fn new(field: impl Into<String>, value: impl ToString, reason: &'static str) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
            reason,
        }
    }
}

/// Validating constructor for [`Snapshot`].
///
/// Construction is a straight field copy; no business logic beyond
/// validation lives here.
pub struct SnapshotAssembler;

impl SnapshotAssembler {
    /// Validates all inputs and assembles an immutable [`Snapshot`], or
    /// reports the first violated invariant.
    pub fn assemble(
        service_name: &str,
        cluster_name: &str,
        aggregate: &ClusterObservation,
        selected_hosts: &[HostObservation],
        partition_id: u32,
        elapsed_ms: u64,
    ) -> Result<Snapshot, ValidationError> {
        if service_name.is_empty() {
            return Err(ValidationError::new(
                "serviceName",
                "\"\"",
                "must be non-empty",
            ));
        }
        if cluster_name.is_empty() {
            return Err(ValidationError::new(
                "clusterName",
                "\"\"",
                "must be non-empty",
            ));
        }

        let cluster_stats = Self::validate_cluster(aggregate)?;

        let mut uri_list = Vec::with_capacity(selected_hosts.len());
        for (index, host) in selected_hosts.iter().enumerate() {
            uri_list.push(Self::validate_host(index, host)?);
        }

        Ok(Snapshot::new(
            service_name.to_string(),
            cluster_name.to_string(),
            partition_id,
            elapsed_ms,
            cluster_stats,
            uri_list,
        ))
    }

    fn validate_cluster(aggregate: &ClusterObservation) -> Result<ClusterStats, ValidationError> {
        if !aggregate.average_latency.is_finite() || aggregate.average_latency < 0.0 {
            return Err(ValidationError::new(
                "clusterStats.averageLatency",
                aggregate.average_latency,
                "must be finite and >= 0",
            ));
        }
        if aggregate.dropped_calls > aggregate.call_count {
            return Err(ValidationError::new(
                "clusterStats.droppedCalls",
                aggregate.dropped_calls,
                "must not exceed callCount",
            ));
        }
        if aggregate.error_count > aggregate.call_count {
            return Err(ValidationError::new(
                "clusterStats.errorCount",
                aggregate.error_count,
                "must not exceed callCount",
            ));
        }
        if !aggregate.drop_level.is_finite()
            || !(0.0..=1.0).contains(&aggregate.drop_level)
        {
            return Err(ValidationError::new(
                "clusterStats.dropLevel",
                aggregate.drop_level,
                "must be within [0, 1]",
            ));
        }

        Ok(ClusterStats::new(
            aggregate.call_count,
            aggregate.average_latency,
            aggregate.dropped_calls,
            aggregate.error_count,
            aggregate.failed_route_calls,
            aggregate.drop_level,
            aggregate.num_hosts,
        ))
    }

    fn validate_host(index: usize, host: &HostObservation) -> Result<UriInfo, ValidationError> {
        let path = |field: &str| format!("uriList[{index}].{field}");

        if host.host_name.is_empty() {
            return Err(ValidationError::new(
                path("hostName"),
                "\"\"",
                "must be non-empty",
            ));
        }
        if host.outstanding_count > host.total_call_count {
            return Err(ValidationError::new(
                path("outstandingCount"),
                host.outstanding_count,
                "must not exceed totalCallCount",
            ));
        }
        if !host.current_latency.is_finite() || host.current_latency < 0.0 {
            return Err(ValidationError::new(
                path("currentLatency"),
                host.current_latency,
                "must be finite and >= 0",
            ));
        }
        if host.p50_latency > host.p90_latency {
            return Err(ValidationError::new(
                path("p50Latency"),
                host.p50_latency,
                "must not exceed p90Latency",
            ));
        }
        if host.p90_latency > host.p95_latency {
            return Err(ValidationError::new(
                path("p90Latency"),
                host.p90_latency,
                "must not exceed p95Latency",
            ));
        }
        if host.p95_latency > host.p99_latency {
            return Err(ValidationError::new(
                path("p95Latency"),
                host.p95_latency,
                "must not exceed p99Latency",
            ));
        }
        if !host.computed_drop_rate.is_finite()
            || !(0.0..=1.0).contains(&host.computed_drop_rate)
        {
            return Err(ValidationError::new(
                path("computedDropRate"),
                host.computed_drop_rate,
                "must be within [0, 1]",
            ));
        }

        Ok(UriInfo::new(
            host.host_name.clone(),
            host.port,
            host.current_call_count,
            host.total_call_count,
            host.outstanding_count,
            host.current_latency,
            host.current_error_count,
            host.p50_latency,
            host.p90_latency,
            host.p95_latency,
            host.p99_latency,
            host.quarantine_duration,
            host.computed_drop_rate,
            host.transmission_points,
        ))
    }
}
