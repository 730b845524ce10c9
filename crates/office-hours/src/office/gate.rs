//! `OfficeActor` - the admission gate.
//!
//! The gate owns the authoritative [`OfficeState`]. Every check-and-update
//! sequence is a message, and messages are processed one at a time, so no
//! two students can both observe a passing state and both enter.
//!
//! # Waiting
//!
//! A student whose check fails is parked in a FIFO waiting room without a
//! seat. The waiting room is re-evaluated after every state change (entry,
//! exit, break start, break end); a parked student is answered as soon as
//! its admission predicate passes. Nothing polls.
//!
//! # Seats
//!
//! Admission counts the seat as occupied. The student then takes a unit
//! from the [`SeatPool`](super::SeatPool); the gate only admits while a seat
//! is free, so that acquisition completes without waiting. On leave the
//! student hands the permit back in the `Leave` message and the gate drops
//! it in the same step that decrements the counters.

use super::messages::{Admission, OfficeEvent, OfficeMessage};
use super::seats::SeatPermit;
use super::state::{OfficeLimits, OfficeSnapshot, OfficeState};
use crate::actors::metrics::OfficeMetrics;
use crate::arrivals::Group;
use crate::errors::OfficeError;
use crate::observability;

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Default channel buffer size for the office mailbox.
const OFFICE_CHANNEL_BUFFER: usize = 1000;

/// Handle to the `OfficeActor`.
///
/// This is the public interface for interacting with the gate.
/// All request methods are async and return results via oneshot channels.
#[derive(Clone)]
pub struct OfficeHandle {
    sender: mpsc::Sender<OfficeMessage>,
    snapshots: watch::Receiver<OfficeSnapshot>,
    cancel_token: CancellationToken,
}

impl OfficeHandle {
    /// Register a student's arrival and wait until it is admitted.
    ///
    /// The returned [`Admission`] must be handed back through [`leave`](Self::leave).
    pub async fn arrive_and_wait(
        &self,
        student_id: usize,
        group: Group,
    ) -> Result<Admission, OfficeError> {
        let (tx, rx) = oneshot::channel();
        self.send(OfficeMessage::Arrive {
            student_id,
            group,
            respond_to: tx,
        })
        .await?;

        rx.await
            .map_err(|e| OfficeError::Internal(format!("response receive failed: {e}")))?
    }

    /// Leave the office, releasing the seat. Returns the counters afterwards.
    pub async fn leave(
        &self,
        admission: Admission,
        seat: SeatPermit,
    ) -> Result<OfficeSnapshot, OfficeError> {
        let (tx, rx) = oneshot::channel();
        self.send(OfficeMessage::Leave {
            admission,
            seat,
            respond_to: tx,
        })
        .await?;

        rx.await
            .map_err(|e| OfficeError::Internal(format!("response receive failed: {e}")))?
    }

    /// Start the professor's break. Fails unless a break is due.
    pub async fn begin_rest(&self) -> Result<OfficeSnapshot, OfficeError> {
        let (tx, rx) = oneshot::channel();
        self.send(OfficeMessage::BeginRest { respond_to: tx })
            .await?;

        rx.await
            .map_err(|e| OfficeError::Internal(format!("response receive failed: {e}")))?
    }

    /// End the professor's break.
    pub async fn end_rest(&self) -> Result<OfficeSnapshot, OfficeError> {
        let (tx, rx) = oneshot::channel();
        self.send(OfficeMessage::EndRest { respond_to: tx }).await?;

        rx.await
            .map_err(|e| OfficeError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get the current counters.
    pub async fn snapshot(&self) -> Result<OfficeSnapshot, OfficeError> {
        let (tx, rx) = oneshot::channel();
        self.send(OfficeMessage::GetSnapshot { respond_to: tx })
            .await?;

        rx.await
            .map_err(|e| OfficeError::Internal(format!("response receive failed: {e}")))
    }

    /// Get every event the gate has recorded.
    pub async fn history(&self) -> Result<Vec<OfficeEvent>, OfficeError> {
        let (tx, rx) = oneshot::channel();
        self.send(OfficeMessage::GetHistory { respond_to: tx })
            .await?;

        rx.await
            .map_err(|e| OfficeError::Internal(format!("response receive failed: {e}")))
    }

    /// Observe counter changes without going through the mailbox.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotReceiver {
        SnapshotReceiver(self.snapshots.clone())
    }

    /// Cancel the actor (for immediate shutdown).
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Get a child token for actors that must stop with the office.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    async fn send(&self, message: OfficeMessage) -> Result<(), OfficeError> {
        self.sender
            .send(message)
            .await
            .map_err(|e| OfficeError::Internal(format!("channel send failed: {e}")))
    }
}

/// Wrapper around the snapshot watch receiver.
///
/// Copies snapshots out so callers never hold the borrow lock.
#[derive(Debug, Clone)]
pub struct SnapshotReceiver(watch::Receiver<OfficeSnapshot>);

impl SnapshotReceiver {
    /// The most recently published counters.
    #[must_use]
    pub fn current(&self) -> OfficeSnapshot {
        *self.0.borrow()
    }

    /// Wait until the published counters satisfy `predicate`.
    ///
    /// Returns immediately if they already do.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::Internal` if the gate has stopped.
    pub async fn wait_until(
        &mut self,
        predicate: impl FnMut(&OfficeSnapshot) -> bool,
    ) -> Result<OfficeSnapshot, OfficeError> {
        self.0
            .wait_for(predicate)
            .await
            .map(|snapshot| *snapshot)
            .map_err(|_| OfficeError::Internal("office snapshot channel closed".to_string()))
    }
}

/// A student parked at the gate.
struct WaitingStudent {
    student_id: usize,
    group: Group,
    respond_to: oneshot::Sender<Result<Admission, OfficeError>>,
}

/// The `OfficeActor` implementation.
pub struct OfficeActor {
    /// Message receiver.
    receiver: mpsc::Receiver<OfficeMessage>,
    /// Cancellation token.
    cancel_token: CancellationToken,
    /// Counters and fairness ledger.
    state: OfficeState,
    /// Students whose admission check has not passed yet, in arrival order.
    waiting: VecDeque<WaitingStudent>,
    /// Every state change, in processing order.
    history: Vec<OfficeEvent>,
    /// Publishes counters after each change.
    snapshots: watch::Sender<OfficeSnapshot>,
    /// Admissions granted so far.
    admissions: u64,
    /// Set once an invariant check fails; the gate refuses all work after that.
    fault: Option<String>,
    /// Shared metrics.
    metrics: Arc<OfficeMetrics>,
}

impl OfficeActor {
    /// Spawn a new office actor.
    ///
    /// Returns a handle and the task join handle.
    pub fn spawn(
        limits: OfficeLimits,
        cancel_token: CancellationToken,
        metrics: Arc<OfficeMetrics>,
    ) -> (OfficeHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(OFFICE_CHANNEL_BUFFER);
        let state = OfficeState::new(limits);
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());

        let actor = Self {
            receiver,
            cancel_token: cancel_token.clone(),
            state,
            waiting: VecDeque::new(),
            history: Vec::new(),
            snapshots,
            admissions: 0,
            fault: None,
            metrics,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = OfficeHandle {
            sender,
            snapshots: snapshot_rx,
            cancel_token,
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "oh.actor.office")]
    async fn run(mut self) {
        let limits = self.state.limits();
        info!(
            target: "oh.actor.office",
            capacity = limits.capacity,
            professor_limit = limits.professor_limit,
            consecutive_limit = limits.consecutive_limit,
            "OfficeActor started"
        );

        loop {
            tokio::select! {
                // Handle cancellation
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "oh.actor.office",
                        "OfficeActor received cancellation signal"
                    );
                    self.close_waiting_room();
                    break;
                }

                // Handle messages
                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message);
                            self.metrics.record_message_processed();
                        }
                        None => {
                            info!(
                                target: "oh.actor.office",
                                "OfficeActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        let metrics = self.metrics.snapshot();
        info!(
            target: "oh.actor.office",
            admissions = metrics.admissions,
            departures = metrics.departures,
            breaks = metrics.breaks,
            messages_processed = metrics.messages_processed,
            "OfficeActor stopped"
        );
    }

    /// Handle a single message.
    fn handle_message(&mut self, message: OfficeMessage) {
        match message {
            OfficeMessage::Arrive {
                student_id,
                group,
                respond_to,
            } => {
                self.handle_arrive(student_id, group, respond_to);
            }

            OfficeMessage::Leave {
                admission,
                seat,
                respond_to,
            } => {
                let result = self.handle_leave(admission, seat);
                let _ = respond_to.send(result);
            }

            OfficeMessage::BeginRest { respond_to } => {
                let result = self.handle_begin_rest();
                let _ = respond_to.send(result);
            }

            OfficeMessage::EndRest { respond_to } => {
                let result = self.handle_end_rest();
                let _ = respond_to.send(result);
            }

            OfficeMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.state.snapshot());
            }

            OfficeMessage::GetHistory { respond_to } => {
                let _ = respond_to.send(self.history.clone());
            }
        }
    }

    fn handle_arrive(
        &mut self,
        student_id: usize,
        group: Group,
        respond_to: oneshot::Sender<Result<Admission, OfficeError>>,
    ) {
        if let Err(e) = self.ensure_healthy() {
            let _ = respond_to.send(Err(e));
            return;
        }

        self.state.arrive(group);
        self.record(OfficeEvent::Arrived {
            student_id,
            group,
            after: self.state.snapshot(),
        });

        self.waiting.push_back(WaitingStudent {
            student_id,
            group,
            respond_to,
        });
        self.admit_waiting();
    }

    fn handle_leave(
        &mut self,
        admission: Admission,
        seat: SeatPermit,
    ) -> Result<OfficeSnapshot, OfficeError> {
        self.ensure_healthy()?;

        let Admission {
            student_id, group, ..
        } = admission;

        self.state.depart(group)?;
        // Released in the same step as the counter update.
        drop(seat);
        self.verify()?;

        let after = self.record_departure(student_id, group);
        self.admit_waiting();
        Ok(after)
    }

    fn handle_begin_rest(&mut self) -> Result<OfficeSnapshot, OfficeError> {
        self.ensure_healthy()?;
        self.state.begin_rest()?;
        self.verify()?;

        let after = self.state.snapshot();
        self.record(OfficeEvent::RestStarted { after });
        self.metrics.record_break();
        observability::record_professor_break();

        debug!(
            target: "oh.actor.office",
            waiting = self.waiting.len(),
            "Professor break started"
        );
        Ok(after)
    }

    fn handle_end_rest(&mut self) -> Result<OfficeSnapshot, OfficeError> {
        self.ensure_healthy()?;
        self.state.end_rest()?;
        self.verify()?;

        let after = self.state.snapshot();
        self.record(OfficeEvent::RestEnded { after });

        debug!(
            target: "oh.actor.office",
            waiting = self.waiting.len(),
            "Professor break ended"
        );

        self.admit_waiting();
        Ok(after)
    }

    /// Admit every parked student whose check now passes, in arrival order.
    fn admit_waiting(&mut self) {
        // A withdrawal or departure mid-pass can unblock students already
        // passed over, so repeat until a pass frees nothing.
        while self.scan_waiting() && !self.waiting.is_empty() {}

        self.metrics.set_waiting(self.waiting.len());
        observability::set_waiting_students(self.waiting.len());

        if self.fault.is_some() {
            self.fail_waiting();
        }
    }

    /// One pass over the waiting room. Returns whether anyone left the
    /// system during the pass.
    fn scan_waiting(&mut self) -> bool {
        let mut released = false;
        let mut still_waiting = VecDeque::with_capacity(self.waiting.len());

        while let Some(student) = self.waiting.pop_front() {
            if self.fault.is_some() {
                still_waiting.push_back(student);
                continue;
            }

            if student.respond_to.is_closed() {
                self.withdraw(student.student_id, student.group);
                released = true;
                continue;
            }

            let before = self.state.snapshot();
            match self.state.admit(student.group) {
                Ok(()) => {
                    if let Err(e) = self.verify() {
                        let _ = student.respond_to.send(Err(e));
                        continue;
                    }
                    released |= self.grant(student, before);
                }
                Err(block) => {
                    self.metrics.record_blocked_check();
                    observability::record_admission_blocked(block.as_str());
                    debug!(
                        target: "oh.actor.office",
                        student_id = student.student_id,
                        group = %student.group,
                        reason = block.as_str(),
                        "Admission check did not pass"
                    );
                    still_waiting.push_back(student);
                }
            }
        }

        self.waiting = still_waiting;
        released && self.fault.is_none()
    }

    /// Record an admission that already passed the check, and answer the student.
    ///
    /// Returns `true` if the student had already gone and was checked out again.
    fn grant(&mut self, student: WaitingStudent, before: OfficeSnapshot) -> bool {
        let WaitingStudent {
            student_id,
            group,
            respond_to,
        } = student;

        self.admissions += 1;
        let after = self.state.snapshot();
        self.record(OfficeEvent::Admitted {
            student_id,
            group,
            before,
            after,
        });
        self.metrics.record_admission(after.seats_occupied);
        observability::record_admission(group.as_str());

        debug!(
            target: "oh.actor.office",
            student_id,
            group = %group,
            seats_occupied = after.seats_occupied,
            served_since_rest = after.served_since_rest,
            consecutive = after.consecutive.get(group),
            "Admission granted"
        );

        let admission = Admission {
            student_id,
            group,
            sequence: self.admissions,
        };

        let Err(Ok(abandoned)) = respond_to.send(Ok(admission)) else {
            return false;
        };

        // The student went away after being counted in; record it as a
        // visit that ended immediately.
        if self.state.depart(abandoned.group).is_err() || self.verify().is_err() {
            return false;
        }
        self.record_departure(student_id, group);
        true
    }

    /// History, counters and metrics for a departure already applied to the state.
    fn record_departure(&mut self, student_id: usize, group: Group) -> OfficeSnapshot {
        let after = self.state.snapshot();
        self.record(OfficeEvent::Departed {
            student_id,
            group,
            after,
        });
        self.metrics.record_departure();
        observability::record_departure(group.as_str());

        debug!(
            target: "oh.actor.office",
            student_id,
            group = %group,
            seats_occupied = after.seats_occupied,
            served_since_rest = after.served_since_rest,
            "Departure recorded"
        );
        after
    }

    fn withdraw(&mut self, student_id: usize, group: Group) {
        self.state.withdraw(group);
        self.record(OfficeEvent::Withdrew {
            student_id,
            group,
            after: self.state.snapshot(),
        });
        debug!(
            target: "oh.actor.office",
            student_id,
            group = %group,
            "Waiting student withdrew"
        );
    }

    /// Append to history and publish the new counters.
    fn record(&mut self, event: OfficeEvent) {
        let snapshot = *event.after();
        self.history.push(event);
        observability::set_seats_occupied(snapshot.seats_occupied);
        self.snapshots.send_replace(snapshot);
    }

    fn verify(&mut self) -> Result<(), OfficeError> {
        if let Err(e) = self.state.check_invariants() {
            observability::record_invariant_violation();
            error!(
                target: "oh.actor.office",
                error = %e,
                snapshot = ?self.state.snapshot(),
                "Office invariant violated"
            );
            self.fault = Some(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    fn ensure_healthy(&self) -> Result<(), OfficeError> {
        match &self.fault {
            Some(fault) => Err(OfficeError::InvariantViolation(fault.clone())),
            None => Ok(()),
        }
    }

    fn fail_waiting(&mut self) {
        let fault = self.fault.clone().unwrap_or_default();
        for student in self.waiting.drain(..) {
            let _ = student
                .respond_to
                .send(Err(OfficeError::InvariantViolation(fault.clone())));
        }
    }

    fn close_waiting_room(&mut self) {
        for student in self.waiting.drain(..) {
            let _ = student.respond_to.send(Err(OfficeError::Internal(
                "office closed before admission".to_string(),
            )));
        }
    }
}
