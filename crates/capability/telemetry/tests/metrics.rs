use hb_telemetry::{TelemetryMetrics, metrics, record_pool_saturated};

#[test]
fn fresh_metrics_are_zero() {
    let snapshot = TelemetryMetrics::new().snapshot();
    assert_eq!(snapshot.pings_registered, 0);
    assert_eq!(snapshot.pool_saturated, 0);
}

#[test]
fn saturation_counter_increments() {
    let before = metrics().snapshot().pool_saturated;
    record_pool_saturated();
    assert!(metrics().snapshot().pool_saturated >= before + 1);
}
