//! Integration tests for the admission gate.
//!
//! Drives the gate directly, one step at a time, and checks the recorded
//! history against every protocol rule.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use office_hours::actors::{OfficeMetrics, ProfessorActor};
use office_hours::arrivals::Group;
use office_hours::office::{
    Admission, OfficeActor, OfficeEvent, OfficeHandle, OfficeLimits, ProfessorState, SeatPermit,
    SeatPool,
};
use oh_test_utils::{admission_order, position_of, settle, HistoryAssertions};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Helpers
// ============================================================================

struct Office {
    handle: OfficeHandle,
    seats: SeatPool,
    limits: OfficeLimits,
    token: CancellationToken,
}

impl Office {
    fn open(limits: OfficeLimits) -> Self {
        let token = CancellationToken::new();
        let (handle, _task) = OfficeActor::spawn(limits, token.clone(), OfficeMetrics::new());
        Self {
            handle,
            seats: SeatPool::new(limits.capacity),
            limits,
            token,
        }
    }

    /// Arrive and wait in a separate task.
    fn arrive(&self, student_id: usize, group: Group) -> JoinHandle<(Admission, SeatPermit)> {
        let handle = self.handle.clone();
        let seats = self.seats.clone();
        tokio::spawn(async move {
            let admission = handle.arrive_and_wait(student_id, group).await.unwrap();
            let seat = seats.acquire().await.unwrap();
            (admission, seat)
        })
    }

    /// Arrive and expect immediate admission.
    async fn enter(&self, student_id: usize, group: Group) -> (Admission, SeatPermit) {
        let waiter = self.arrive(student_id, group);
        settle().await;
        assert!(
            waiter.is_finished(),
            "student {student_id} of group {group} should have been admitted"
        );
        waiter.await.unwrap()
    }

    async fn leave(&self, visit: (Admission, SeatPermit)) {
        let (admission, seat) = visit;
        self.handle.leave(admission, seat).await.unwrap();
    }

    async fn history(&self) -> Vec<OfficeEvent> {
        self.handle.history().await.unwrap()
    }

    fn close(self) {
        self.token.cancel();
    }
}

fn limits() -> OfficeLimits {
    OfficeLimits {
        capacity: 3,
        professor_limit: 10,
        consecutive_limit: 5,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_lone_student_admitted_and_office_empties() {
    let office = Office::open(limits());

    let visit = office.enter(0, Group::A).await;
    office.leave(visit).await;

    let snapshot = office.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.seats_occupied, 0);
    assert_eq!(snapshot.inside.total(), 0);
    assert_eq!(snapshot.present.total(), 0);
    assert_eq!(snapshot.consecutive.a, 1);
    assert_eq!(snapshot.consecutive.b, 0);
    assert_eq!(snapshot.served_since_rest, 1);

    let history = office.history().await;
    assert!(!history.iter().any(|e| matches!(e, OfficeEvent::Withdrew { .. })));
    history.assert_protocol(&office.limits).assert_all_departed();

    office.close();
}

#[tokio::test(start_paused = true)]
async fn test_streak_freezes_without_rivals() {
    let office = Office::open(limits());

    for id in 0..6 {
        let visit = office.enter(id, Group::A).await;
        office.leave(visit).await;
    }

    let snapshot = office.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.consecutive.a, 5);
    assert_eq!(snapshot.served_since_rest, 6);

    office
        .history()
        .await
        .assert_protocol(&office.limits)
        .assert_all_departed();

    office.close();
}

#[tokio::test(start_paused = true)]
async fn test_streak_limit_yields_to_waiting_rival() {
    let office = Office::open(limits());

    let a0 = office.enter(0, Group::A).await;
    let a1 = office.enter(1, Group::A).await;
    let a2 = office.enter(2, Group::A).await;

    // B waits behind the A students inside.
    let b0 = office.arrive(100, Group::B);
    settle().await;
    assert!(!b0.is_finished());

    office.leave(a0).await;
    let a3 = office.enter(3, Group::A).await;
    office.leave(a1).await;
    let a4 = office.enter(4, Group::A).await;
    office.leave(a2).await;

    // Fifth A admission in a row; the sixth must wait for B.
    assert_eq!(office.handle.snapshot().await.unwrap().consecutive.a, 5);
    let a5 = office.arrive(5, Group::A);
    settle().await;
    assert!(!a5.is_finished());

    office.leave(a3).await;
    office.leave(a4).await;
    let b0 = b0.await.unwrap();
    settle().await;
    assert!(!a5.is_finished(), "A must wait while B is inside");

    office.leave(b0).await;
    let a5 = a5.await.unwrap();
    assert_eq!(office.handle.snapshot().await.unwrap().consecutive.a, 1);
    office.leave(a5).await;

    let history = office.history().await;
    let order = admission_order(&history);
    let b_position = order.iter().position(|(id, _)| *id == 100).unwrap();
    let a5_position = order.iter().position(|(id, _)| *id == 5).unwrap();
    assert_eq!(b_position, 5);
    assert!(b_position < a5_position);

    history.assert_protocol(&office.limits).assert_all_departed();

    office.close();
}

#[tokio::test(start_paused = true)]
async fn test_professor_limit_forces_rest() {
    let office = Office::open(limits());
    let professor_token = office.handle.child_token();
    let professor = ProfessorActor::spawn(
        office.handle.clone(),
        Duration::from_secs(5),
        professor_token.clone(),
    );

    for id in 0..10 {
        let group = if id % 2 == 0 { Group::A } else { Group::B };
        let visit = office.enter(id, group).await;
        office.leave(visit).await;
    }

    let eleventh = office.arrive(10, Group::A);
    settle().await;
    assert!(!eleventh.is_finished());
    let snapshot = office.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.professor, ProfessorState::Resting);
    assert_eq!(snapshot.served_since_rest, 10);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(!eleventh.is_finished());

    let visit = eleventh.await.unwrap();
    assert_eq!(office.handle.snapshot().await.unwrap().served_since_rest, 1);
    office.leave(visit).await;

    let history = office.history().await;
    let rest_ended =
        position_of(&history, |e| matches!(e, OfficeEvent::RestEnded { .. })).unwrap();
    let eleventh_admitted = position_of(&history, |e| {
        matches!(e, OfficeEvent::Admitted { student_id: 10, .. })
    })
    .unwrap();
    assert!(rest_ended < eleventh_admitted);
    history.assert_protocol(&office.limits).assert_all_departed();

    professor_token.cancel();
    assert_eq!(professor.await.unwrap().unwrap().breaks_taken, 1);
    office.close();
}

#[tokio::test(start_paused = true)]
async fn test_capacity_bound_with_full_office() {
    let office = Office::open(limits());

    let visits = vec![
        office.enter(0, Group::B).await,
        office.enter(1, Group::B).await,
        office.enter(2, Group::B).await,
    ];
    assert_eq!(office.seats.available(), 0);

    let fourth = office.arrive(3, Group::B);
    settle().await;
    assert!(!fourth.is_finished());

    for visit in visits {
        office.leave(visit).await;
    }
    let fourth = fourth.await.unwrap();
    office.leave(fourth).await;

    office
        .history()
        .await
        .assert_protocol(&office.limits)
        .assert_all_departed();

    office.close();
}

#[tokio::test(start_paused = true)]
async fn test_exclusivity_with_interleaved_groups() {
    let office = Office::open(limits());

    let a0 = office.enter(0, Group::A).await;
    let b0 = office.arrive(1, Group::B);
    let a1 = office.arrive(2, Group::A);
    settle().await;

    // A1 may join A0 even though B0 is waiting.
    let a1 = a1.await.unwrap();
    assert!(!b0.is_finished());

    office.leave(a0).await;
    settle().await;
    assert!(!b0.is_finished());
    office.leave(a1).await;

    let b0 = b0.await.unwrap();
    office.leave(b0).await;

    office
        .history()
        .await
        .assert_protocol(&office.limits)
        .assert_all_departed();

    office.close();
}
