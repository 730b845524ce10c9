//! The office: counters, seats, and the admission gate.
//!
//! ```text
//! StudentActor ──Arrive──▶ OfficeActor ◀──BeginRest/EndRest── ProfessorActor
//!      │                      │  owns OfficeState
//!      └──SeatPool            └──watch<OfficeSnapshot> ──▶ ProfessorActor
//! ```

pub mod gate;
pub mod messages;
pub mod seats;
pub mod state;

pub use gate::{OfficeActor, OfficeHandle, SnapshotReceiver};
pub use messages::{Admission, OfficeEvent, OfficeMessage};
pub use seats::{SeatPermit, SeatPool};
pub use state::{
    AdmissionBlock, OfficeLimits, OfficeSnapshot, OfficeState, PerGroup, ProfessorState,
};
