//! # Office Hours Test Utilities
//!
//! Shared fixtures and assertions for the office hours integration tests.
//!
//! ## Modules
//!
//! - `fixtures` - arrival records, arrival files and test configuration
//! - `assertions` - protocol checks over a recorded gate history
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oh_test_utils::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_example() {
//!     let arrivals = ArrivalsBuilder::new().a(0, 1).b(0, 1).build();
//!     let report = run_simulation(&test_config(), arrivals).await.unwrap();
//!
//!     report
//!         .history
//!         .assert_protocol(&test_config().limits())
//!         .assert_all_departed();
//! }
//! ```

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
