//! Office Hours Library
//!
//! Admission control for a professor's office with a fixed number of seats,
//! shared by students from two groups under a professor who periodically
//! takes a break. The gate enforces:
//!
//! - a hard capacity bound
//! - mutual exclusion between the two groups inside the office
//! - a break for the professor after a fixed number of students
//! - anti-starvation: a group's streak of admissions is capped while the
//!   other group has students present
//!
//! # Architecture
//!
//! ```text
//! run_simulation
//! ├── OfficeActor (singleton, owns OfficeState, serializes every check)
//! ├── ProfessorActor (watches snapshots, starts and ends breaks)
//! └── StudentActor × N (arrive → wait → sit → ask → leave)
//! ```
//!
//! # Modules
//!
//! - [`office`] - counters, seat pool and the admission gate
//! - [`actors`] - professor and student actors
//! - [`arrivals`] - arrival records and the input file loader
//! - [`simulation`] - top-level driver
//! - [`config`] - configuration from environment
//! - [`errors`] - error types

pub mod actors;
pub mod arrivals;
pub mod config;
pub mod errors;
pub mod observability;
pub mod office;
pub mod simulation;

pub use simulation::{run_simulation, SimulationReport};
