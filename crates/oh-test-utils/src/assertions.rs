//! Protocol assertions over a recorded gate history.
//!
//! Every `OfficeEvent` carries the counters after it was applied, and
//! admissions also carry the counters the check saw. These helpers walk the
//! whole history and fail the test on the first event that breaks a rule.

use office_hours::arrivals::Group;
use office_hours::office::{OfficeEvent, OfficeLimits, ProfessorState};
use std::collections::HashMap;

/// Custom assertions for a gate history.
///
/// # Example
/// ```rust,ignore
/// report
///     .history
///     .assert_capacity(3)
///     .assert_exclusive()
///     .assert_all_departed();
/// ```
pub trait HistoryAssertions {
    /// Assert occupancy never exceeded `capacity` and matched the per-group counts.
    fn assert_capacity(&self, capacity: u32) -> &Self;

    /// Assert both groups were never inside together.
    fn assert_exclusive(&self) -> &Self;

    /// Assert no admission happened at the limit or during a break, and
    /// breaks only started and ended with the office empty.
    fn assert_rest_threshold(&self, professor_limit: u32) -> &Self;

    /// Assert no group extended a full streak while the other group was present.
    fn assert_no_starvation(&self, consecutive_limit: u32) -> &Self;

    /// Assert each departure reset the opposite group's streak.
    fn assert_consecutive_reset(&self) -> &Self;

    /// Assert every student went arrived → admitted → departed, once each.
    fn assert_student_order(&self) -> &Self;

    /// Assert every arrived student departed.
    fn assert_all_departed(&self) -> &Self;

    /// All protocol rules for `limits`.
    fn assert_protocol(&self, limits: &OfficeLimits) -> &Self {
        self.assert_capacity(limits.capacity)
            .assert_exclusive()
            .assert_rest_threshold(limits.professor_limit)
            .assert_no_starvation(limits.consecutive_limit)
            .assert_consecutive_reset()
            .assert_student_order()
    }
}

impl HistoryAssertions for [OfficeEvent] {
    fn assert_capacity(&self, capacity: u32) -> &Self {
        for (index, event) in self.iter().enumerate() {
            let after = event.after();
            assert!(
                after.seats_occupied <= capacity,
                "event {index}: {} seats occupied exceeds capacity {capacity}: {event:?}",
                after.seats_occupied
            );
            assert_eq!(
                after.seats_occupied,
                after.inside.total(),
                "event {index}: seats occupied does not match students inside: {event:?}"
            );
        }
        self
    }

    fn assert_exclusive(&self) -> &Self {
        for (index, event) in self.iter().enumerate() {
            let inside = event.after().inside;
            assert!(
                inside.a == 0 || inside.b == 0,
                "event {index}: both groups inside: {event:?}"
            );
        }
        self
    }

    fn assert_rest_threshold(&self, professor_limit: u32) -> &Self {
        for (index, event) in self.iter().enumerate() {
            match event {
                OfficeEvent::Admitted { before, .. } => {
                    assert!(
                        before.served_since_rest < professor_limit,
                        "event {index}: admission at the professor limit: {event:?}"
                    );
                    assert_eq!(
                        before.professor,
                        ProfessorState::Serving,
                        "event {index}: admission during a break: {event:?}"
                    );
                }
                OfficeEvent::RestStarted { after } => {
                    assert_eq!(
                        after.seats_occupied, 0,
                        "event {index}: break started with students inside"
                    );
                    assert_eq!(
                        after.served_since_rest, professor_limit,
                        "event {index}: break started before the limit"
                    );
                }
                OfficeEvent::RestEnded { after } => {
                    assert_eq!(
                        after.served_since_rest, 0,
                        "event {index}: break ended without resetting the served count"
                    );
                    assert_eq!(
                        after.seats_occupied, 0,
                        "event {index}: break ended with students inside"
                    );
                }
                _ => {}
            }
        }
        self
    }

    fn assert_no_starvation(&self, consecutive_limit: u32) -> &Self {
        for (index, event) in self.iter().enumerate() {
            if let OfficeEvent::Admitted { group, before, .. } = event {
                let streak = before.consecutive.get(*group);
                let rivals = before.present.get(group.opposite());
                assert!(
                    streak < consecutive_limit || rivals == 0,
                    "event {index}: group {group} admitted on a streak of {streak} \
                     with {rivals} of group {} present",
                    group.opposite()
                );
            }
            for group in [Group::A, Group::B] {
                assert!(
                    event.after().consecutive.get(group) <= consecutive_limit,
                    "event {index}: group {group} streak above the limit: {event:?}"
                );
            }
        }
        self
    }

    fn assert_consecutive_reset(&self) -> &Self {
        for (index, event) in self.iter().enumerate() {
            if let OfficeEvent::Departed { group, after, .. } = event {
                assert_eq!(
                    after.consecutive.get(group.opposite()),
                    0,
                    "event {index}: departure of group {group} did not reset group {}",
                    group.opposite()
                );
            }
        }
        self
    }

    fn assert_student_order(&self) -> &Self {
        // 0 = arrived, 1 = admitted, 2 = departed
        let mut progress: HashMap<usize, u8> = HashMap::new();

        for (index, event) in self.iter().enumerate() {
            match event {
                OfficeEvent::Arrived { student_id, .. } => {
                    let previous = progress.insert(*student_id, 0);
                    assert!(
                        previous.is_none(),
                        "event {index}: student {student_id} arrived twice"
                    );
                }
                OfficeEvent::Admitted { student_id, .. } => {
                    let stage = progress.get_mut(student_id);
                    assert!(
                        matches!(stage.as_deref(), Some(0)),
                        "event {index}: student {student_id} admitted out of order"
                    );
                    if let Some(stage) = stage {
                        *stage = 1;
                    }
                }
                OfficeEvent::Departed { student_id, .. } => {
                    let stage = progress.get_mut(student_id);
                    assert!(
                        matches!(stage.as_deref(), Some(1)),
                        "event {index}: student {student_id} departed out of order"
                    );
                    if let Some(stage) = stage {
                        *stage = 2;
                    }
                }
                OfficeEvent::Withdrew { student_id, .. } => {
                    let stage = progress.remove(student_id);
                    assert_eq!(
                        stage,
                        Some(0),
                        "event {index}: student {student_id} withdrew after admission"
                    );
                }
                OfficeEvent::RestStarted { .. } | OfficeEvent::RestEnded { .. } => {}
            }
        }
        self
    }

    fn assert_all_departed(&self) -> &Self {
        let arrived: Vec<usize> = self
            .iter()
            .filter_map(|e| match e {
                OfficeEvent::Arrived { student_id, .. } => Some(*student_id),
                _ => None,
            })
            .collect();

        for student_id in arrived {
            assert!(
                self.iter().any(
                    |e| matches!(e, OfficeEvent::Departed { student_id: id, .. } if *id == student_id)
                ),
                "student {student_id} arrived but never departed"
            );
        }
        self
    }
}

impl HistoryAssertions for Vec<OfficeEvent> {
    fn assert_capacity(&self, capacity: u32) -> &Self {
        self.as_slice().assert_capacity(capacity);
        self
    }

    fn assert_exclusive(&self) -> &Self {
        self.as_slice().assert_exclusive();
        self
    }

    fn assert_rest_threshold(&self, professor_limit: u32) -> &Self {
        self.as_slice().assert_rest_threshold(professor_limit);
        self
    }

    fn assert_no_starvation(&self, consecutive_limit: u32) -> &Self {
        self.as_slice().assert_no_starvation(consecutive_limit);
        self
    }

    fn assert_consecutive_reset(&self) -> &Self {
        self.as_slice().assert_consecutive_reset();
        self
    }

    fn assert_student_order(&self) -> &Self {
        self.as_slice().assert_student_order();
        self
    }

    fn assert_all_departed(&self) -> &Self {
        self.as_slice().assert_all_departed();
        self
    }
}

/// Admitted students in admission order.
pub fn admission_order(history: &[OfficeEvent]) -> Vec<(usize, Group)> {
    history
        .iter()
        .filter_map(|e| match e {
            OfficeEvent::Admitted {
                student_id, group, ..
            } => Some((*student_id, *group)),
            _ => None,
        })
        .collect()
}

/// Index of the first event matching `predicate`.
pub fn position_of(history: &[OfficeEvent], predicate: impl Fn(&OfficeEvent) -> bool) -> Option<usize> {
    history.iter().position(predicate)
}
