//! 快照数据模型：每次发射生成的不可变遥测记录（集群统计与主机统计）。
//!
//! Snapshot data model.
//!
//! The immutable entities emitted per interval: cluster-level stats, per-host
//! stats, and the enclosing snapshot. Instances can only be produced through
//! [`SnapshotAssembler`], which validates every invariant before construction;
//! a partially-invalid snapshot cannot exist.
//!
//! Field names on the wire are camelCase and constitute the contract with the
//! telemetry sink — they must remain stable.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Snapshot`] | One emitted telemetry record for a cluster/partition |
//! | [`ClusterStats`] | Cluster-wide call statistics |
//! | [`UriInfo`] | Per-host statistics, ordered by selection rank |
//! | [`SnapshotAssembler`] | Validating constructor for all of the above |

pub mod assembler;

pub use assembler::{SnapshotAssembler, ValidationError};

use serde::Serialize;

/// One immutable telemetry record for a cluster/partition at a point in time.
///
/// Owns exactly one [`ClusterStats`] and zero-or-more [`UriInfo`] by value.
/// The host list is ordered by selection rank, most significant first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    service_name: String,
    cluster_name: String,
    partition_id: u32,
    /// Wall-clock milliseconds since the previous successful emission,
    /// not the configured cadence.
    interval_ms: u64,
    cluster_stats: ClusterStats,
    uri_list: Vec<UriInfo>,
}

impl Snapshot {
    pub(crate) fn new(
        service_name: String,
        cluster_name: String,
        partition_id: u32,
        interval_ms: u64,
        cluster_stats: ClusterStats,
        uri_list: Vec<UriInfo>,
    ) -> Self {
        Self {
            service_name,
            cluster_name,
            partition_id,
            interval_ms,
            cluster_stats,
            uri_list,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn cluster_stats(&self) -> &ClusterStats {
        &self.cluster_stats
    }

    pub fn uri_list(&self) -> &[UriInfo] {
        &self.uri_list
    }
}

/// Cluster-wide call statistics for one emission interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    call_count: u64,
    average_latency: f64,
    dropped_calls: u64,
    error_count: u64,
    failed_route_calls: u64,
    drop_level: f64,
    num_hosts: u32,
}

impl ClusterStats {
    pub(crate) fn new(
        call_count: u64,
        average_latency: f64,
        dropped_calls: u64,
        error_count: u64,
        failed_route_calls: u64,
        drop_level: f64,
        num_hosts: u32,
    ) -> Self {
        Self {
            call_count,
            average_latency,
            dropped_calls,
            error_count,
            failed_route_calls,
            drop_level,
            num_hosts,
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    pub fn average_latency(&self) -> f64 {
        self.average_latency
    }

    pub fn dropped_calls(&self) -> u64 {
        self.dropped_calls
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn failed_route_calls(&self) -> u64 {
        self.failed_route_calls
    }

    pub fn drop_level(&self) -> f64 {
        self.drop_level
    }

    pub fn num_hosts(&self) -> u32 {
        self.num_hosts
    }
}

/// Per-host statistics included in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UriInfo {
    host_name: String,
    port_number: u16,
    current_call_count: u64,
    total_call_count: u64,
    outstanding_count: u64,
    current_latency: f64,
    current_error_count: u32,
    p50_latency: u64,
    p90_latency: u64,
    p95_latency: u64,
    p99_latency: u64,
    /// Milliseconds spent in quarantine; 0 means not quarantined.
    quarantine_duration: u64,
    computed_drop_rate: f64,
    /// Count of distinct call-routing points that observed this host.
    transmission_points: u32,
}

impl UriInfo {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        host_name: String,
        port_number: u16,
        current_call_count: u64,
        total_call_count: u64,
        outstanding_count: u64,
        current_latency: f64,
        current_error_count: u32,
        p50_latency: u64,
        p90_latency: u64,
        p95_latency: u64,
        p99_latency: u64,
        quarantine_duration: u64,
        computed_drop_rate: f64,
        transmission_points: u32,
    ) -> Self {
        Self {
            host_name,
            port_number,
            current_call_count,
            total_call_count,
            outstanding_count,
            current_latency,
            current_error_count,
            p50_latency,
            p90_latency,
            p95_latency,
            p99_latency,
            quarantine_duration,
            computed_drop_rate,
            transmission_points,
        }
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn port_number(&self) -> u16 {
        self.port_number
    }

    pub fn current_call_count(&self) -> u64 {
        self.current_call_count
    }

    pub fn total_call_count(&self) -> u64 {
        self.total_call_count
    }

    pub fn outstanding_count(&self) -> u64 {
        self.outstanding_count
    }

    pub fn current_latency(&self) -> f64 {
        self.current_latency
    }

    pub fn current_error_count(&self) -> u32 {
        self.current_error_count
    }

    pub fn p50_latency(&self) -> u64 {
        self.p50_latency
    }

    pub fn p90_latency(&self) -> u64 {
        self.p90_latency
    }

    pub fn p95_latency(&self) -> u64 {
        self.p95_latency
    }

    pub fn p99_latency(&self) -> u64 {
        self.p99_latency
    }

    pub fn quarantine_duration(&self) -> u64 {
        self.quarantine_duration
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantine_duration > 0
    }

    pub fn computed_drop_rate(&self) -> f64 {
        self.computed_drop_rate
    }

    pub fn transmission_points(&self) -> u32 {
        self.transmission_points
    }
}

#[cfg(test)]
mod tests {
    use crate::model::SnapshotAssembler;
    use crate::tracker::{ClusterObservation, HostObservation};

    fn aggregate() -> ClusterObservation {
        ClusterObservation {
            call_count: 100,
            average_latency: 12.5,
            dropped_calls: 3,
            error_count: 2,
            failed_route_calls: 0,
            drop_level: 0.03,
            num_hosts: 2,
        }
    }

    fn host(name: &str, port: u16) -> HostObservation {
        HostObservation {
            host_name: name.to_string(),
            port,
            current_call_count: 50,
            total_call_count: 500,
            outstanding_count: 4,
            current_latency: 10.0,
            current_error_count: 1,
            p50_latency: 8,
            p90_latency: 15,
            p95_latency: 20,
            p99_latency: 40,
            quarantine_duration: 0,
            computed_drop_rate: 0.0,
            transmission_points: 2,
        }
    }

    #[test]
    fn test_snapshot_wire_field_names() {
        let snapshot = SnapshotAssembler::assemble(
            "svc",
            "cluster-a",
            &aggregate(),
            &[host("h1.example.com", 8080)],
            0,
            60_000,
        )
        .unwrap();

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["serviceName"], "svc");
        assert_eq!(value["clusterName"], "cluster-a");
        assert_eq!(value["partitionId"], 0);
        assert_eq!(value["intervalMs"], 60_000);
        assert_eq!(value["clusterStats"]["callCount"], 100);
        assert_eq!(value["clusterStats"]["dropLevel"], 0.03);
        assert_eq!(value["clusterStats"]["failedRouteCalls"], 0);

        let uri = &value["uriList"][0];
        assert_eq!(uri["hostName"], "h1.example.com");
        assert_eq!(uri["portNumber"], 8080);
        assert_eq!(uri["p50Latency"], 8);
        assert_eq!(uri["p99Latency"], 40);
        assert_eq!(uri["quarantineDuration"], 0);
        assert_eq!(uri["computedDropRate"], 0.0);
        assert_eq!(uri["transmissionPoints"], 2);
    }

    #[test]
    fn test_uri_list_preserves_input_order() {
        let snapshot = SnapshotAssembler::assemble(
            "svc",
            "cluster-a",
            &aggregate(),
            &[host("b.example.com", 2), host("a.example.com", 1)],
            0,
            1000,
        )
        .unwrap();

        let names: Vec<&str> = snapshot.uri_list().iter().map(|u| u.host_name()).collect();
        assert_eq!(names, vec!["b.example.com", "a.example.com"]);
    }
}
