//! Observability module for the office hours simulation.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `oh_seats_occupied` | Gauge | none | Current office occupancy |
//! | `oh_waiting_students` | Gauge | none | Students parked at the gate |
//! | `oh_admissions_total` | Counter | `group` | Admissions per group |
//! | `oh_admission_blocked_total` | Counter | `reason` | Failed admission checks |
//! | `oh_departures_total` | Counter | `group` | Completed visits |
//! | `oh_professor_breaks_total` | Counter | none | Professor breaks |
//! | `oh_invariant_violations_total` | Counter | none | Protocol defects (must stay 0) |
//! | `oh_actor_failures_total` | Counter | `actor_type` | Actor tasks that failed |
//! | `oh_admission_wait_seconds` | Histogram | `group` | Arrival to seat |
//! | `oh_visit_duration_seconds` | Histogram | `group` | Seat to departure |

pub mod metrics;

// Re-exports for convenience
pub use metrics::{
    init_metrics_recorder, record_actor_failure, record_admission, record_admission_blocked,
    record_admission_wait, record_departure, record_invariant_violation, record_professor_break,
    record_visit_duration, set_seats_occupied, set_waiting_students,
};
