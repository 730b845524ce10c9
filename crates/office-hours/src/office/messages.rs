//! Message types for the office gate actor.
//!
//! Request-reply messages carry a `tokio::sync::oneshot` sender.

use super::seats::SeatPermit;
use super::state::OfficeSnapshot;
use crate::arrivals::Group;
use crate::errors::OfficeError;
use serde::Serialize;
use tokio::sync::oneshot;

/// Messages sent to `OfficeActor`.
#[derive(Debug)]
pub enum OfficeMessage {
    /// A student arrived; reply once it has been admitted.
    Arrive {
        student_id: usize,
        group: Group,
        /// Response channel, answered only when the admission predicate passes.
        respond_to: oneshot::Sender<Result<Admission, OfficeError>>,
    },

    /// An admitted student is leaving and hands back its seat.
    Leave {
        admission: Admission,
        seat: SeatPermit,
        respond_to: oneshot::Sender<Result<OfficeSnapshot, OfficeError>>,
    },

    /// The professor starts a break.
    BeginRest {
        respond_to: oneshot::Sender<Result<OfficeSnapshot, OfficeError>>,
    },

    /// The professor ends a break.
    EndRest {
        respond_to: oneshot::Sender<Result<OfficeSnapshot, OfficeError>>,
    },

    /// Get the current counters.
    GetSnapshot {
        respond_to: oneshot::Sender<OfficeSnapshot>,
    },

    /// Get every event recorded so far.
    GetHistory {
        respond_to: oneshot::Sender<Vec<OfficeEvent>>,
    },
}

/// Proof of admission, consumed on leave.
#[derive(Debug, PartialEq, Eq)]
pub struct Admission {
    pub student_id: usize,
    pub group: Group,
    /// 1-based admission order across the whole run.
    pub sequence: u64,
}

/// One state change at the gate, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OfficeEvent {
    Arrived {
        student_id: usize,
        group: Group,
        after: OfficeSnapshot,
    },
    Admitted {
        student_id: usize,
        group: Group,
        before: OfficeSnapshot,
        after: OfficeSnapshot,
    },
    Departed {
        student_id: usize,
        group: Group,
        after: OfficeSnapshot,
    },
    /// A waiting student went away before admission.
    Withdrew {
        student_id: usize,
        group: Group,
        after: OfficeSnapshot,
    },
    RestStarted {
        after: OfficeSnapshot,
    },
    RestEnded {
        after: OfficeSnapshot,
    },
}

impl OfficeEvent {
    /// Counters after the event was applied.
    #[must_use]
    pub fn after(&self) -> &OfficeSnapshot {
        match self {
            OfficeEvent::Arrived { after, .. }
            | OfficeEvent::Admitted { after, .. }
            | OfficeEvent::Departed { after, .. }
            | OfficeEvent::Withdrew { after, .. }
            | OfficeEvent::RestStarted { after }
            | OfficeEvent::RestEnded { after } => after,
        }
    }
}
