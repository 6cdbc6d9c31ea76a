use lb_telemetry::{
    ClusterObservation, EmissionScheduler, HostObservation, InMemoryTelemetrySink, MonitorConfig,
    SharedHealthView, TrackerView,
};
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn healthy_cluster(num_hosts: u32) -> ClusterObservation {
    ClusterObservation {
        call_count: 1000,
        average_latency: 12.0,
        dropped_calls: 0,
        error_count: 1,
        failed_route_calls: 0,
        drop_level: 0.0,
        num_hosts,
    }
}

fn degraded_cluster() -> ClusterObservation {
    ClusterObservation {
        call_count: 1000,
        average_latency: 250.0,
        dropped_calls: 900,
        error_count: 100,
        failed_route_calls: 20,
        drop_level: 0.9,
        num_hosts: 2,
    }
}

fn host(name: &str, quarantine_duration: u64) -> HostObservation {
    HostObservation {
        host_name: name.to_string(),
        port: 8080,
        current_call_count: 100,
        total_call_count: 5000,
        outstanding_count: 0,
        current_latency: 15.0,
        current_error_count: 0,
        p50_latency: 10,
        p90_latency: 20,
        p95_latency: 30,
        p99_latency: 60,
        quarantine_duration,
        computed_drop_rate: 0.0,
        transmission_points: 2,
    }
}

#[tokio::test]
async fn test_healthy_cluster_emits_at_normal_cadence() {
    init_tracing();
    let tracker = Arc::new(SharedHealthView::new());
    tracker.publish(TrackerView {
        cluster: healthy_cluster(2),
        hosts: vec![host("a.example.com", 0), host("b.example.com", 0)],
    });

    let sink = Arc::new(InMemoryTelemetrySink::new(128));
    let config = MonitorConfig::default()
        .with_normal_interval(Duration::from_millis(40))
        .with_alert_interval(Duration::from_millis(10));
    let scheduler =
        EmissionScheduler::new("svc", "cluster-a", 0, config, tracker.clone()).unwrap();
    let handle = scheduler.spawn(sink.clone());

    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.shutdown().await;

    let snapshots = sink.snapshots();
    assert!(
        snapshots.len() >= 3,
        "expected steady emissions, got {}",
        snapshots.len()
    );
    for snapshot in &snapshots {
        assert_eq!(snapshot.service_name(), "svc");
        assert_eq!(snapshot.cluster_name(), "cluster-a");
        // healthy hosts are not worth reporting
        assert!(snapshot.uri_list().is_empty());
        assert!(snapshot.interval_ms() > 0);
    }
}

#[tokio::test]
async fn test_degraded_cluster_switches_to_alert_cadence() {
    init_tracing();
    let tracker = Arc::new(SharedHealthView::new());
    tracker.publish(TrackerView {
        cluster: degraded_cluster(),
        hosts: vec![host("a.example.com", 0)],
    });

    let sink = Arc::new(InMemoryTelemetrySink::new(256));
    let config = MonitorConfig::default()
        .with_normal_interval(Duration::from_millis(200))
        .with_alert_interval(Duration::from_millis(10))
        .with_alert_drop_threshold(0.5);
    let scheduler =
        EmissionScheduler::new("svc", "cluster-a", 0, config, tracker.clone()).unwrap();
    let handle = scheduler.spawn(sink.clone());

    tokio::time::sleep(Duration::from_millis(600)).await;
    handle.shutdown().await;

    // At the normal cadence alone at most ~3 snapshots fit in the window;
    // the alert cadence must have taken over after the first tick.
    let count = sink.len();
    assert!(count >= 6, "expected alert-cadence emissions, got {count}");
}

#[tokio::test]
async fn test_recovery_returns_to_normal_cadence_after_hysteresis() {
    let tracker = Arc::new(SharedHealthView::new());
    tracker.publish(TrackerView {
        cluster: degraded_cluster(),
        hosts: vec![],
    });

    let sink = Arc::new(InMemoryTelemetrySink::new(512));
    let config = MonitorConfig::default()
        .with_normal_interval(Duration::from_millis(60))
        .with_alert_interval(Duration::from_millis(10))
        .with_alert_drop_threshold(0.5)
        .with_hysteresis_intervals(3);
    let scheduler =
        EmissionScheduler::new("svc", "cluster-a", 0, config, tracker.clone()).unwrap();
    let handle = scheduler.spawn(sink.clone());

    // Let the monitor enter the alert cadence, then recover the cluster.
    tokio::time::sleep(Duration::from_millis(100)).await;
    tracker.publish(TrackerView {
        cluster: healthy_cluster(2),
        hosts: vec![],
    });

    // Three clean ticks at the alert cadence fit easily in this window.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let count_after_recovery = sink.len();
    assert!(
        count_after_recovery >= 4,
        "alert cadence never engaged: {count_after_recovery} emissions"
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.shutdown().await;

    // Back at the normal cadence the follow-up window fits a few emissions;
    // the alert cadence would have produced ~15.
    let late_emissions = sink.len() - count_after_recovery;
    assert!(
        late_emissions <= 4,
        "cadence did not slow back down: {late_emissions} emissions after recovery"
    );
}

#[tokio::test]
async fn test_no_emissions_until_tracker_publishes() {
    let tracker = Arc::new(SharedHealthView::new());
    let sink = Arc::new(InMemoryTelemetrySink::new(64));
    let config = MonitorConfig::default()
        .with_normal_interval(Duration::from_millis(30))
        .with_alert_interval(Duration::from_millis(10));
    let scheduler =
        EmissionScheduler::new("svc", "cluster-a", 0, config, tracker.clone()).unwrap();
    let handle = scheduler.spawn(sink.clone());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(sink.is_empty(), "ticks without a view must not emit");

    tracker.publish(TrackerView {
        cluster: healthy_cluster(1),
        hosts: vec![host("a.example.com", 0)],
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.shutdown().await;

    assert!(!sink.is_empty(), "emission should resume once a view exists");
}

#[tokio::test]
async fn test_quarantine_release_is_visible_in_next_snapshot() {
    let tracker = Arc::new(SharedHealthView::new());
    tracker.publish(TrackerView {
        cluster: healthy_cluster(1),
        hosts: vec![host("q.example.com", 5000)],
    });

    let sink = Arc::new(InMemoryTelemetrySink::new(256));
    let config = MonitorConfig::default()
        .with_normal_interval(Duration::from_millis(30))
        .with_alert_interval(Duration::from_millis(10))
        .with_hysteresis_intervals(2);
    let scheduler =
        EmissionScheduler::new("svc", "cluster-a", 0, config, tracker.clone()).unwrap();
    let handle = scheduler.spawn(sink.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Release the host from quarantine.
    tracker.publish(TrackerView {
        cluster: healthy_cluster(1),
        hosts: vec![host("q.example.com", 0)],
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.shutdown().await;

    let snapshots = sink.snapshots();
    assert!(!snapshots.is_empty());

    // While quarantined the host is always reported.
    let quarantined_reported = snapshots
        .iter()
        .any(|s| s.uri_list().iter().any(|u| u.quarantine_duration() > 0));
    assert!(quarantined_reported, "quarantined host never reported");

    // The release transition itself must appear even though the host is
    // healthy again and scores zero.
    let release_reported = snapshots
        .iter()
        .any(|s| s.uri_list().iter().any(|u| {
            u.host_name() == "q.example.com" && u.quarantine_duration() == 0
        }));
    assert!(release_reported, "quarantine release not reported");

    // Once the transition is reported and the streak is clean, the healthy
    // host drops out of the report again.
    let last = snapshots.last().unwrap();
    assert!(
        last.uri_list().is_empty(),
        "healthy host still reported after release tick"
    );
}

#[tokio::test]
async fn test_parallel_monitors_do_not_interfere() {
    let tracker = Arc::new(SharedHealthView::new());
    tracker.publish(TrackerView {
        cluster: healthy_cluster(1),
        hosts: vec![],
    });

    let sink = Arc::new(InMemoryTelemetrySink::new(256));
    let config = MonitorConfig::default()
        .with_normal_interval(Duration::from_millis(30))
        .with_alert_interval(Duration::from_millis(10));

    let first = EmissionScheduler::new("svc", "cluster-a", 0, config.clone(), tracker.clone())
        .unwrap()
        .spawn(sink.clone());
    let second = EmissionScheduler::new("svc", "cluster-b", 1, config, tracker.clone())
        .unwrap()
        .spawn(sink.clone());

    tokio::time::sleep(Duration::from_millis(150)).await;
    first.shutdown().await;
    second.shutdown().await;

    assert!(!sink.snapshots_for_cluster("cluster-a").is_empty());
    assert!(!sink.snapshots_for_cluster("cluster-b").is_empty());
    for snapshot in sink.snapshots_for_cluster("cluster-b") {
        assert_eq!(snapshot.partition_id(), 1);
    }
}
