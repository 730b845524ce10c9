//! Shared office state and the fairness ledger.
//!
//! `OfficeState` is plain data. It is owned by the gate actor and mutated
//! only from its message loop, so every check-and-update below runs as one
//! indivisible step.
//!
//! Invariants (checked after every mutation by [`OfficeState::check_invariants`]):
//! - `seats_occupied == inside.a + inside.b <= capacity`
//! - at most one group is inside at any instant
//! - `served_since_rest <= professor_limit`
//! - each consecutive counter is `<= consecutive_limit`
//! - a group's `inside` count never exceeds its `present` count

use crate::arrivals::Group;
use crate::errors::OfficeError;
use serde::Serialize;

/// Admission limits, fixed for the lifetime of an office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfficeLimits {
    /// Number of seats.
    pub capacity: u32,
    /// Students served before the professor must rest.
    pub professor_limit: u32,
    /// Same-group admissions in a row before the other group gets priority.
    pub consecutive_limit: u32,
}

impl Default for OfficeLimits {
    fn default() -> Self {
        Self {
            capacity: crate::config::DEFAULT_SEATS,
            professor_limit: crate::config::DEFAULT_PROFESSOR_LIMIT,
            consecutive_limit: crate::config::DEFAULT_CONSECUTIVE_LIMIT,
        }
    }
}

/// A pair of per-group counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerGroup {
    pub a: u32,
    pub b: u32,
}

impl PerGroup {
    #[must_use]
    pub const fn get(&self, group: Group) -> u32 {
        match group {
            Group::A => self.a,
            Group::B => self.b,
        }
    }

    pub fn get_mut(&mut self, group: Group) -> &mut u32 {
        match group {
            Group::A => &mut self.a,
            Group::B => &mut self.b,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.a + self.b
    }
}

/// Professor state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ProfessorState {
    #[default]
    Serving,
    Resting,
}

/// Why an admission check did not pass.
///
/// Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdmissionBlock {
    /// Students of the other group are inside.
    OppositeGroupInside,
    /// The professor has served its limit or is resting.
    ProfessorNeedsRest,
    /// This group used up its streak while the other group is waiting.
    StreakLimit,
    /// All seats are taken.
    OfficeFull,
}

impl AdmissionBlock {
    /// Label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AdmissionBlock::OppositeGroupInside => "opposite_group_inside",
            AdmissionBlock::ProfessorNeedsRest => "professor_needs_rest",
            AdmissionBlock::StreakLimit => "streak_limit",
            AdmissionBlock::OfficeFull => "office_full",
        }
    }
}

/// Point-in-time copy of the office counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OfficeSnapshot {
    pub seats_occupied: u32,
    /// Students currently inside, per group.
    pub inside: PerGroup,
    pub served_since_rest: u32,
    /// Students arrived and not yet finished, per group.
    pub present: PerGroup,
    /// Same-group admissions in a row, per group.
    pub consecutive: PerGroup,
    pub professor: ProfessorState,
    /// Limit copied in so observers can evaluate `rest_due` alone.
    pub professor_limit: u32,
}

impl OfficeSnapshot {
    /// The professor may start a break: limit reached and office drained.
    #[must_use]
    pub fn rest_due(&self) -> bool {
        self.professor == ProfessorState::Serving
            && self.served_since_rest >= self.professor_limit
            && self.seats_occupied == 0
    }
}

/// Authoritative office counters plus the fairness ledger.
#[derive(Debug, Clone)]
pub struct OfficeState {
    limits: OfficeLimits,
    seats_occupied: u32,
    inside: PerGroup,
    served_since_rest: u32,
    present: PerGroup,
    consecutive: PerGroup,
    professor: ProfessorState,
}

impl OfficeState {
    #[must_use]
    pub fn new(limits: OfficeLimits) -> Self {
        Self {
            limits,
            seats_occupied: 0,
            inside: PerGroup::default(),
            served_since_rest: 0,
            present: PerGroup::default(),
            consecutive: PerGroup::default(),
            professor: ProfessorState::Serving,
        }
    }

    #[must_use]
    pub fn limits(&self) -> OfficeLimits {
        self.limits
    }

    #[must_use]
    pub fn snapshot(&self) -> OfficeSnapshot {
        OfficeSnapshot {
            seats_occupied: self.seats_occupied,
            inside: self.inside,
            served_since_rest: self.served_since_rest,
            present: self.present,
            consecutive: self.consecutive,
            professor: self.professor,
            professor_limit: self.limits.professor_limit,
        }
    }

    /// Record a student of `group` entering the system.
    pub fn arrive(&mut self, group: Group) {
        *self.present.get_mut(group) += 1;
    }

    /// Record a waiting student of `group` leaving without a visit.
    pub fn withdraw(&mut self, group: Group) {
        let present = self.present.get_mut(group);
        *present = present.saturating_sub(1);
    }

    /// Evaluate the admission predicate for one student of `group`.
    pub fn admission_check(&self, group: Group) -> Result<(), AdmissionBlock> {
        let other = group.opposite();

        if self.inside.get(other) > 0 {
            return Err(AdmissionBlock::OppositeGroupInside);
        }

        if self.professor == ProfessorState::Resting
            || self.served_since_rest >= self.limits.professor_limit
        {
            return Err(AdmissionBlock::ProfessorNeedsRest);
        }

        // Applies only while the other group has students present.
        if self.consecutive.get(group) >= self.limits.consecutive_limit
            && self.present.get(other) > 0
        {
            return Err(AdmissionBlock::StreakLimit);
        }

        if self.seats_occupied >= self.limits.capacity {
            return Err(AdmissionBlock::OfficeFull);
        }

        Ok(())
    }

    /// Check and, if it passes, record the admission of one student.
    pub fn admit(&mut self, group: Group) -> Result<(), AdmissionBlock> {
        self.admission_check(group)?;

        self.seats_occupied += 1;
        *self.inside.get_mut(group) += 1;
        self.served_since_rest += 1;

        // Frozen at the limit until the other group completes a visit.
        let streak = self.consecutive.get_mut(group);
        if *streak < self.limits.consecutive_limit {
            *streak += 1;
        }

        Ok(())
    }

    /// Record a student of `group` leaving the office after its visit.
    pub fn depart(&mut self, group: Group) -> Result<(), OfficeError> {
        if self.inside.get(group) == 0 || self.seats_occupied == 0 {
            return Err(OfficeError::InvalidTransition(format!(
                "class {group} student left an office holding no class {group} students"
            )));
        }

        self.seats_occupied -= 1;
        *self.inside.get_mut(group) -= 1;
        *self.present.get_mut(group) -= 1;
        *self.consecutive.get_mut(group.opposite()) = 0;

        Ok(())
    }

    /// Whether the professor may start a break now.
    #[must_use]
    pub fn rest_due(&self) -> bool {
        self.snapshot().rest_due()
    }

    /// Serving -> Resting.
    pub fn begin_rest(&mut self) -> Result<(), OfficeError> {
        if !self.rest_due() {
            return Err(OfficeError::InvalidTransition(format!(
                "break requested with {} served, {} seated, professor {:?}",
                self.served_since_rest, self.seats_occupied, self.professor
            )));
        }
        self.professor = ProfessorState::Resting;
        Ok(())
    }

    /// Resting -> Serving; resets the served count.
    pub fn end_rest(&mut self) -> Result<(), OfficeError> {
        if self.professor != ProfessorState::Resting {
            return Err(OfficeError::InvalidTransition(
                "break ended while the professor was serving".to_string(),
            ));
        }
        if self.seats_occupied != 0 {
            return Err(OfficeError::InvariantViolation(format!(
                "{} students inside during the professor's break",
                self.seats_occupied
            )));
        }
        self.served_since_rest = 0;
        self.professor = ProfessorState::Serving;
        Ok(())
    }

    /// Verify every office invariant.
    pub fn check_invariants(&self) -> Result<(), OfficeError> {
        let limits = &self.limits;

        if self.seats_occupied != self.inside.total() {
            return Err(OfficeError::InvariantViolation(format!(
                "{} seats occupied but {} + {} students inside",
                self.seats_occupied, self.inside.a, self.inside.b
            )));
        }
        if self.seats_occupied > limits.capacity {
            return Err(OfficeError::InvariantViolation(format!(
                "{} seats occupied exceeds capacity {}",
                self.seats_occupied, limits.capacity
            )));
        }
        if self.inside.a > 0 && self.inside.b > 0 {
            return Err(OfficeError::InvariantViolation(format!(
                "both classes inside ({} A, {} B)",
                self.inside.a, self.inside.b
            )));
        }
        if self.served_since_rest > limits.professor_limit {
            return Err(OfficeError::InvariantViolation(format!(
                "{} served since break exceeds limit {}",
                self.served_since_rest, limits.professor_limit
            )));
        }
        if self.consecutive.a > limits.consecutive_limit
            || self.consecutive.b > limits.consecutive_limit
        {
            return Err(OfficeError::InvariantViolation(format!(
                "consecutive counts ({}, {}) exceed limit {}",
                self.consecutive.a, self.consecutive.b, limits.consecutive_limit
            )));
        }
        if self.inside.a > self.present.a || self.inside.b > self.present.b {
            return Err(OfficeError::InvariantViolation(
                "more students inside than present".to_string(),
            ));
        }
        if self.professor == ProfessorState::Resting && self.seats_occupied != 0 {
            return Err(OfficeError::InvariantViolation(
                "students inside while the professor rests".to_string(),
            ));
        }
        Ok(())
    }
}
