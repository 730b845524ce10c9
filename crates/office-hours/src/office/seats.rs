//! Seat pool - a counting resource with one unit per office seat.
//!
//! Fairness is decided at the gate, not here: waiters are woken in
//! whatever order the semaphore chooses.

use crate::errors::OfficeError;

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed pool of seats.
#[derive(Debug, Clone)]
pub struct SeatPool {
    semaphore: Arc<Semaphore>,
}

/// One occupied seat. Dropping it releases the seat.
#[derive(Debug)]
pub struct SeatPermit {
    _permit: OwnedSemaphorePermit,
}

impl SeatPool {
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity as usize)),
        }
    }

    /// Wait for a free seat and take it.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::Internal` if the pool's semaphore was closed.
    pub async fn acquire(&self) -> Result<SeatPermit, OfficeError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| OfficeError::Internal("seat pool closed".to_string()))?;
        Ok(SeatPermit { _permit: permit })
    }

    /// Seats currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
