//! Professor and student actors.
//!
//! ```text
//! run_simulation
//! ├── OfficeActor (singleton gate, see `office::gate`)
//! ├── ProfessorActor (singleton, cancelled once every student is done)
//! └── StudentActor × N (one per arrival record, one visit each)
//! ```

pub mod metrics;
pub mod professor;
pub mod student;

pub use metrics::{ActorType, OfficeMetrics, OfficeMetricsSnapshot, WaitingLevel};
pub use professor::{ProfessorActor, ProfessorSummary};
pub use student::{StudentActor, StudentPhase, StudentVisit};
