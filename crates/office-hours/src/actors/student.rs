//! `StudentActor` - one visit to the office.
//!
//! Lifecycle: Arrived → WaitingForAdmission → InOffice → Departing → Done.
//! A student takes a seat only after the gate has admitted it, and hands
//! the seat back to the gate in the same step that records its departure.

use crate::arrivals::{ArrivalRecord, Group};
use crate::errors::OfficeError;
use crate::observability;
use crate::office::{OfficeHandle, SeatPool};

use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Student lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StudentPhase {
    Arrived,
    WaitingForAdmission,
    InOffice,
    Departing,
    Done,
}

impl StudentPhase {
    /// The only phase reachable from this one.
    #[must_use]
    pub const fn next(self) -> Option<StudentPhase> {
        match self {
            StudentPhase::Arrived => Some(StudentPhase::WaitingForAdmission),
            StudentPhase::WaitingForAdmission => Some(StudentPhase::InOffice),
            StudentPhase::InOffice => Some(StudentPhase::Departing),
            StudentPhase::Departing => Some(StudentPhase::Done),
            StudentPhase::Done => None,
        }
    }
}

/// Outcome of a completed visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentVisit {
    pub student_id: usize,
    pub group: Group,
    /// Arrival to seat.
    pub waited: Duration,
    pub question_time: Duration,
    /// 1-based admission order across the run.
    pub admission_sequence: u64,
}

/// The `StudentActor` implementation.
pub struct StudentActor {
    record: ArrivalRecord,
    question_time: Duration,
    office: OfficeHandle,
    seats: SeatPool,
    phase: StudentPhase,
}

impl StudentActor {
    #[must_use]
    pub fn new(
        record: ArrivalRecord,
        question_time: Duration,
        office: OfficeHandle,
        seats: SeatPool,
    ) -> Self {
        Self {
            record,
            question_time,
            office,
            seats,
            phase: StudentPhase::Arrived,
        }
    }

    /// Spawn the visit as its own task.
    pub fn spawn(self) -> JoinHandle<Result<StudentVisit, OfficeError>> {
        tokio::spawn(self.run())
    }

    #[must_use]
    pub fn phase(&self) -> StudentPhase {
        self.phase
    }

    /// Run the whole visit.
    #[instrument(
        skip_all,
        name = "oh.actor.student",
        fields(student_id = self.record.student_id, group = %self.record.group)
    )]
    pub async fn run(mut self) -> Result<StudentVisit, OfficeError> {
        let student_id = self.record.student_id;
        let group = self.record.group;
        let arrived_at = Instant::now();

        info!(
            target: "oh.actor.student",
            student_id,
            group = %group,
            "Student arrives at the office"
        );

        self.advance(StudentPhase::WaitingForAdmission)?;
        let admission = self.office.arrive_and_wait(student_id, group).await?;
        let seat = self.seats.acquire().await?;
        let waited = arrived_at.elapsed();
        let admission_sequence = admission.sequence;

        self.advance(StudentPhase::InOffice)?;
        observability::record_admission_wait(group.as_str(), waited);
        info!(
            target: "oh.actor.student",
            student_id,
            group = %group,
            waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            "Student enters the office"
        );

        info!(
            target: "oh.actor.student",
            student_id,
            minutes = self.record.question_time,
            "Student starts asking questions"
        );
        let seated_at = Instant::now();
        tokio::time::sleep(self.question_time).await;
        info!(
            target: "oh.actor.student",
            student_id,
            "Student finishes asking questions and prepares to leave"
        );

        self.advance(StudentPhase::Departing)?;
        let after = self.office.leave(admission, seat).await?;
        observability::record_visit_duration(group.as_str(), seated_at.elapsed());
        info!(
            target: "oh.actor.student",
            student_id,
            group = %group,
            seats_occupied = after.seats_occupied,
            "Student leaves the office"
        );

        self.advance(StudentPhase::Done)?;

        Ok(StudentVisit {
            student_id,
            group,
            waited,
            question_time: self.question_time,
            admission_sequence,
        })
    }

    fn advance(&mut self, to: StudentPhase) -> Result<(), OfficeError> {
        if self.phase.next() != Some(to) {
            return Err(OfficeError::InvalidTransition(format!(
                "student {} cannot move from {:?} to {to:?}",
                self.record.student_id, self.phase
            )));
        }
        debug!(
            target: "oh.actor.student",
            student_id = self.record.student_id,
            from = ?self.phase,
            to = ?to,
            "Student phase changed"
        );
        self.phase = to;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actors::metrics::OfficeMetrics;
    use crate::office::{OfficeActor, OfficeLimits};
    use tokio_util::sync::CancellationToken;

    fn record(student_id: usize, group: Group, question_time: u64) -> ArrivalRecord {
        ArrivalRecord {
            student_id,
            group,
            arrival_delay: 0,
            question_time,
        }
    }

    #[test]
    fn test_phase_order() {
        let mut phase = StudentPhase::Arrived;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            seen.push(next);
            phase = next;
        }
        assert_eq!(
            seen,
            vec![
                StudentPhase::Arrived,
                StudentPhase::WaitingForAdmission,
                StudentPhase::InOffice,
                StudentPhase::Departing,
                StudentPhase::Done,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_student_completes_visit() {
        let token = CancellationToken::new();
        let (office, _task) =
            OfficeActor::spawn(OfficeLimits::default(), token.clone(), OfficeMetrics::new());
        let seats = SeatPool::new(3);

        let student = StudentActor::new(
            record(0, Group::A, 1),
            Duration::from_secs(1),
            office.clone(),
            seats.clone(),
        );
        assert_eq!(student.phase(), StudentPhase::Arrived);

        let visit = student.run().await.unwrap();
        assert_eq!(visit.student_id, 0);
        assert_eq!(visit.group, Group::A);
        assert_eq!(visit.waited, Duration::ZERO);
        assert_eq!(visit.admission_sequence, 1);
        assert_eq!(seats.available(), 3);

        let snapshot = office.snapshot().await.unwrap();
        assert_eq!(snapshot.seats_occupied, 0);
        assert_eq!(snapshot.present.total(), 0);

        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_student_waits_for_opposite_group() {
        let token = CancellationToken::new();
        let (office, _task) =
            OfficeActor::spawn(OfficeLimits::default(), token.clone(), OfficeMetrics::new());
        let seats = SeatPool::new(3);

        let first = StudentActor::new(
            record(0, Group::A, 4),
            Duration::from_secs(4),
            office.clone(),
            seats.clone(),
        )
        .spawn();
        tokio::time::sleep(Duration::from_millis(1)).await;

        let second = StudentActor::new(
            record(1, Group::B, 1),
            Duration::from_secs(1),
            office.clone(),
            seats.clone(),
        )
        .spawn();

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.waited, Duration::ZERO);
        assert!(second.waited >= Duration::from_millis(3999));
        assert_eq!(second.admission_sequence, 2);

        token.cancel();
    }

    #[tokio::test]
    async fn test_student_fails_when_office_closed() {
        let token = CancellationToken::new();
        let (office, task) =
            OfficeActor::spawn(OfficeLimits::default(), token.clone(), OfficeMetrics::new());
        token.cancel();
        task.await.unwrap();

        let student = StudentActor::new(
            record(0, Group::B, 1),
            Duration::from_secs(1),
            office,
            SeatPool::new(3),
        );
        let result = student.run().await;
        assert!(matches!(result, Err(OfficeError::Internal(_))));
    }
}
