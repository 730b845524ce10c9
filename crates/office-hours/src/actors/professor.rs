//! `ProfessorActor` - the overseer loop.
//!
//! Two states: Serving (initial) and Resting. The actor observes the
//! gate's published counters and starts a break once the professor has
//! served the limit and the office has drained. The break itself is a
//! fixed sleep followed by `EndRest`, which resets the served count and
//! wakes the waiting room.
//!
//! The actor holds no seat and no gate turn while it waits, so it can be
//! cancelled at any point.

use crate::errors::OfficeError;
use crate::office::{OfficeHandle, OfficeSnapshot, SnapshotReceiver};

use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// What the professor did during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProfessorSummary {
    pub breaks_taken: u32,
}

/// The `ProfessorActor` implementation.
pub struct ProfessorActor {
    office: OfficeHandle,
    snapshots: SnapshotReceiver,
    break_duration: Duration,
    cancel_token: CancellationToken,
    breaks_taken: u32,
}

impl ProfessorActor {
    /// Spawn the professor.
    ///
    /// The task runs until `cancel_token` is cancelled.
    pub fn spawn(
        office: OfficeHandle,
        break_duration: Duration,
        cancel_token: CancellationToken,
    ) -> JoinHandle<Result<ProfessorSummary, OfficeError>> {
        let actor = Self {
            snapshots: office.subscribe(),
            office,
            break_duration,
            cancel_token,
            breaks_taken: 0,
        };

        tokio::spawn(actor.run())
    }

    #[instrument(skip_all, name = "oh.actor.professor")]
    async fn run(mut self) -> Result<ProfessorSummary, OfficeError> {
        info!(
            target: "oh.actor.professor",
            "The professor arrived and is starting office hours"
        );

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    debug!(
                        target: "oh.actor.professor",
                        breaks_taken = self.breaks_taken,
                        "ProfessorActor received cancellation signal"
                    );
                    break;
                }

                due = self.snapshots.wait_until(OfficeSnapshot::rest_due) => {
                    due?;
                }
            }

            if !self.take_break().await? {
                break;
            }
        }

        Ok(ProfessorSummary {
            breaks_taken: self.breaks_taken,
        })
    }

    /// Rest for the break duration. Returns `false` if cancelled mid-break.
    async fn take_break(&mut self) -> Result<bool, OfficeError> {
        let resting = self.office.begin_rest().await?;
        self.breaks_taken += 1;

        info!(
            target: "oh.actor.professor",
            served_since_rest = resting.served_since_rest,
            breaks_taken = self.breaks_taken,
            "The professor is taking a break now"
        );

        tokio::select! {
            () = self.cancel_token.cancelled() => {
                debug!(
                    target: "oh.actor.professor",
                    "ProfessorActor cancelled during a break"
                );
                return Ok(false);
            }
            () = tokio::time::sleep(self.break_duration) => {}
        }

        self.office.end_rest().await?;
        debug!(
            target: "oh.actor.professor",
            "The professor is back from the break"
        );
        Ok(true)
    }
}
