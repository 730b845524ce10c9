//! In-process actor metrics.
//!
//! `OfficeMetrics` is shared between the gate actor (which updates values)
//! and the driver (which reads a snapshot for the run report). All fields
//! are atomic for lock-free concurrent access.

use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Waiting-room depth above which the gate logs at debug level.
pub const WAITING_ROOM_NORMAL: usize = 100;

/// Waiting-room depth above which the gate warns.
pub const WAITING_ROOM_WARNING: usize = 500;

/// Actor type for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorType {
    /// `OfficeActor` (singleton gate).
    Office,
    /// `ProfessorActor` (singleton overseer).
    Professor,
    /// `StudentActor` (one per arrival record).
    Student,
}

impl ActorType {
    /// Returns the actor type as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActorType::Office => "office",
            ActorType::Professor => "professor",
            ActorType::Student => "student",
        }
    }
}

/// Waiting-room depth level for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitingLevel {
    Normal,
    Warning,
    Critical,
}

impl WaitingLevel {
    #[must_use]
    pub fn for_depth(depth: usize) -> Self {
        if depth > WAITING_ROOM_WARNING {
            WaitingLevel::Critical
        } else if depth > WAITING_ROOM_NORMAL {
            WaitingLevel::Warning
        } else {
            WaitingLevel::Normal
        }
    }
}

/// Counters for one office.
#[derive(Debug, Default)]
pub struct OfficeMetrics {
    admissions: AtomicU64,
    departures: AtomicU64,
    breaks: AtomicU32,
    /// Admission checks that did not pass.
    blocked_checks: AtomicU64,
    peak_occupancy: AtomicU32,
    waiting: AtomicUsize,
    peak_waiting: AtomicUsize,
    messages_processed: AtomicU64,
}

/// Snapshot of office metrics at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OfficeMetricsSnapshot {
    pub admissions: u64,
    pub departures: u64,
    pub breaks: u32,
    pub blocked_checks: u64,
    pub peak_occupancy: u32,
    pub peak_waiting: usize,
    pub messages_processed: u64,
}

impl OfficeMetrics {
    /// Create a new shared metrics instance.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record an admission and the occupancy it produced.
    pub fn record_admission(&self, seats_occupied: u32) {
        self.admissions.fetch_add(1, Ordering::Relaxed);
        self.peak_occupancy
            .fetch_max(seats_occupied, Ordering::Relaxed);
    }

    pub fn record_departure(&self) {
        self.departures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_break(&self) {
        self.breaks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blocked_check(&self) {
        self.blocked_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the number of students parked at the gate.
    pub fn set_waiting(&self, depth: usize) {
        let previous = self.waiting.swap(depth, Ordering::Relaxed);
        self.peak_waiting.fetch_max(depth, Ordering::Relaxed);

        match WaitingLevel::for_depth(depth) {
            WaitingLevel::Critical => {
                warn!(
                    target: "oh.actor.office",
                    depth,
                    threshold = WAITING_ROOM_WARNING,
                    "Waiting room depth critical"
                );
            }
            WaitingLevel::Warning if WaitingLevel::for_depth(previous) == WaitingLevel::Normal => {
                // Log once when crossing the warning threshold
                debug!(target: "oh.actor.office", depth, "Waiting room depth elevated");
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn breaks(&self) -> u32 {
        self.breaks.load(Ordering::Relaxed)
    }

    /// Take a snapshot of current metrics.
    #[must_use]
    pub fn snapshot(&self) -> OfficeMetricsSnapshot {
        OfficeMetricsSnapshot {
            admissions: self.admissions.load(Ordering::Relaxed),
            departures: self.departures.load(Ordering::Relaxed),
            breaks: self.breaks.load(Ordering::Relaxed),
            blocked_checks: self.blocked_checks.load(Ordering::Relaxed),
            peak_occupancy: self.peak_occupancy.load(Ordering::Relaxed),
            peak_waiting: self.peak_waiting.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
        }
    }
}
