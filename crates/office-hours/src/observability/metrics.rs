//! Metrics definitions for the office hours simulation.
//!
//! All metrics follow Prometheus naming conventions:
//! - `oh_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `group`: 2 values (A, B)
//! - `reason`: 4 values (bounded by `AdmissionBlock`)
//! - `actor_type`: 3 values (office, professor, student)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for rendering the exposition at the end of a run.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Waiting and visit times are simulation-scale: seconds to minutes.
        .set_buckets_for_metric(
            Matcher::Prefix("oh_admission_wait".to_string()),
            &[0.0, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0],
        )
        .map_err(|e| format!("Failed to set admission wait buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("oh_visit_duration".to_string()),
            &[0.0, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0],
        )
        .map_err(|e| format!("Failed to set visit duration buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}

// ============================================================================
// Office Occupancy (Gauges)
// ============================================================================

/// Set the number of occupied seats.
///
/// Metric: `oh_seats_occupied`
/// Labels: none
pub fn set_seats_occupied(count: u32) {
    gauge!("oh_seats_occupied").set(f64::from(count));
}

/// Set the number of students parked at the gate.
///
/// Metric: `oh_waiting_students`
/// Labels: none
pub fn set_waiting_students(count: usize) {
    // usize to f64 conversion is safe for realistic waiting-room sizes
    #[allow(clippy::cast_precision_loss)]
    gauge!("oh_waiting_students").set(count as f64);
}

// ============================================================================
// Admission Control (Counters)
// ============================================================================

/// Record an admission.
///
/// Metric: `oh_admissions_total`
/// Labels: `group`
pub fn record_admission(group: &str) {
    counter!("oh_admissions_total", "group" => group.to_string()).increment(1);
}

/// Record an admission check that did not pass.
///
/// Metric: `oh_admission_blocked_total`
/// Labels: `reason`
pub fn record_admission_blocked(reason: &str) {
    counter!("oh_admission_blocked_total", "reason" => reason.to_string()).increment(1);
}

/// Record a completed visit.
///
/// Metric: `oh_departures_total`
/// Labels: `group`
pub fn record_departure(group: &str) {
    counter!("oh_departures_total", "group" => group.to_string()).increment(1);
}

/// Record a professor break.
///
/// Metric: `oh_professor_breaks_total`
/// Labels: none
pub fn record_professor_break() {
    counter!("oh_professor_breaks_total").increment(1);
}

/// Record a failed invariant check. Any non-zero value indicates a bug.
///
/// Metric: `oh_invariant_violations_total`
/// Labels: none
pub fn record_invariant_violation() {
    counter!("oh_invariant_violations_total").increment(1);
}

/// Record an actor task that ended with an error or panic.
///
/// Metric: `oh_actor_failures_total`
/// Labels: `actor_type`
pub fn record_actor_failure(actor_type: &str) {
    counter!("oh_actor_failures_total", "actor_type" => actor_type.to_string()).increment(1);
}

// ============================================================================
// Latency Metrics (Histograms)
// ============================================================================

/// Record how long a student waited between arrival and taking a seat.
///
/// Metric: `oh_admission_wait_seconds`
/// Labels: `group`
pub fn record_admission_wait(group: &str, duration: Duration) {
    histogram!("oh_admission_wait_seconds", "group" => group.to_string())
        .record(duration.as_secs_f64());
}

/// Record how long a student spent in the office.
///
/// Metric: `oh_visit_duration_seconds`
/// Labels: `group`
pub fn record_visit_duration(group: &str, duration: Duration) {
    histogram!("oh_visit_duration_seconds", "group" => group.to_string())
        .record(duration.as_secs_f64());
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    #[test]
    fn test_metrics_are_recorded() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            set_seats_occupied(2);
            set_waiting_students(4);
            record_admission("A");
            record_admission("A");
            record_admission("B");
            record_admission_blocked("streak_limit");
            record_departure("A");
            record_professor_break();
            record_invariant_violation();
            record_actor_failure("student");
            record_admission_wait("B", Duration::from_secs(3));
            record_visit_duration("A", Duration::from_secs(1));
        });

        let metrics = snapshotter.snapshot().into_vec();

        let admissions_a = metrics.iter().find(|(key, _, _, _)| {
            key.key().name() == "oh_admissions_total"
                && key.key().labels().any(|l| l.key() == "group" && l.value() == "A")
        });
        assert!(matches!(
            admissions_a,
            Some((_, _, _, DebugValue::Counter(2)))
        ));

        let seats = metrics
            .iter()
            .find(|(key, _, _, _)| key.key().name() == "oh_seats_occupied");
        assert!(matches!(seats, Some((_, _, _, DebugValue::Gauge(v))) if v.into_inner() == 2.0));

        assert!(
            metrics.len() >= 11,
            "expected every metric to be recorded, got {}",
            metrics.len()
        );
    }

    #[test]
    fn test_cardinality_bounds() {
        for group in ["A", "B"] {
            record_admission(group);
            record_departure(group);
            record_admission_wait(group, Duration::from_millis(10));
            record_visit_duration(group, Duration::from_millis(10));
        }

        for reason in [
            "opposite_group_inside",
            "professor_needs_rest",
            "streak_limit",
            "office_full",
        ] {
            record_admission_blocked(reason);
        }

        for actor_type in ["office", "professor", "student"] {
            record_actor_failure(actor_type);
        }
    }
}
