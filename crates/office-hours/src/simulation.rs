//! Top-level driver for one simulated office hour.
//!
//! Spawns the gate and the professor, dispatches one student per arrival
//! record after that record's relative delay, joins every student, then
//! cancels the professor and stops the gate.

use crate::actors::{
    ActorType, OfficeMetrics, OfficeMetricsSnapshot, ProfessorActor, StudentActor, StudentVisit,
};
use crate::arrivals::{validate_count, ArrivalRecord};
use crate::config::Config;
use crate::errors::OfficeError;
use crate::observability;
use crate::office::{OfficeActor, OfficeEvent, OfficeSnapshot, SeatPool};

use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Everything observed during a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub students: usize,
    /// Completed visits, in input order.
    pub visits: Vec<StudentVisit>,
    pub breaks_taken: u32,
    pub final_snapshot: OfficeSnapshot,
    pub metrics: OfficeMetricsSnapshot,
    /// Every state change at the gate, in processing order.
    pub history: Vec<OfficeEvent>,
}

/// Run one office hour over `arrivals`.
///
/// # Errors
///
/// Fails if the arrival count is out of range, if any actor fails, or if
/// the office is not empty once every student is done.
#[instrument(skip_all, name = "oh.simulation", fields(students = arrivals.len()))]
pub async fn run_simulation(
    config: &Config,
    arrivals: Vec<ArrivalRecord>,
) -> Result<SimulationReport, OfficeError> {
    validate_count(&arrivals, config.max_students)?;
    let students = arrivals.len();

    let metrics = OfficeMetrics::new();
    let office_token = CancellationToken::new();
    let (office, office_task) =
        OfficeActor::spawn(config.limits(), office_token, Arc::clone(&metrics));
    let seats = SeatPool::new(config.seats);

    let professor_token = office.child_token();
    let professor = ProfessorActor::spawn(
        office.clone(),
        config.break_duration(),
        professor_token.clone(),
    );

    let mut visits_in_progress = Vec::with_capacity(students);
    for record in arrivals {
        tokio::time::sleep(config.units(record.arrival_delay)).await;
        debug!(
            target: "oh.simulation",
            student_id = record.student_id,
            group = %record.group,
            "Dispatching student"
        );
        let question_time = config.units(record.question_time);
        visits_in_progress
            .push(StudentActor::new(record, question_time, office.clone(), seats.clone()).spawn());
    }

    let mut failure: Option<OfficeError> = None;
    let mut visits = Vec::with_capacity(students);
    for handle in visits_in_progress {
        match handle.await {
            Ok(Ok(visit)) => visits.push(visit),
            Ok(Err(e)) => {
                observability::record_actor_failure(ActorType::Student.as_str());
                error!(target: "oh.simulation", error = %e, "Student failed");
                failure.get_or_insert(e);
            }
            Err(e) => {
                observability::record_actor_failure(ActorType::Student.as_str());
                error!(target: "oh.simulation", error = %e, "Student task panicked");
                failure.get_or_insert(OfficeError::Internal(format!("student task failed: {e}")));
            }
        }
    }

    professor_token.cancel();
    let breaks_taken = match professor.await {
        Ok(Ok(summary)) => summary.breaks_taken,
        Ok(Err(e)) => {
            observability::record_actor_failure(ActorType::Professor.as_str());
            error!(target: "oh.simulation", error = %e, "Professor failed");
            failure.get_or_insert(e);
            metrics.breaks()
        }
        Err(e) => {
            observability::record_actor_failure(ActorType::Professor.as_str());
            error!(target: "oh.simulation", error = %e, "Professor task panicked");
            failure.get_or_insert(OfficeError::Internal(format!("professor task failed: {e}")));
            metrics.breaks()
        }
    };

    let history = office.history().await;
    let final_snapshot = office.snapshot().await;

    office.cancel();
    if let Err(e) = office_task.await {
        observability::record_actor_failure(ActorType::Office.as_str());
        error!(target: "oh.simulation", error = %e, "Office task panicked");
        failure.get_or_insert(OfficeError::Internal(format!("office task failed: {e}")));
    }

    if let Some(e) = failure {
        return Err(e);
    }

    let history = history?;
    let final_snapshot = final_snapshot?;
    if final_snapshot.seats_occupied != 0 || final_snapshot.present.total() != 0 {
        observability::record_invariant_violation();
        return Err(OfficeError::InvariantViolation(format!(
            "office not empty after every student finished: {final_snapshot:?}"
        )));
    }

    info!(
        target: "oh.simulation",
        students,
        breaks_taken,
        "Every student has left the office"
    );

    Ok(SimulationReport {
        students,
        visits,
        breaks_taken,
        final_snapshot,
        metrics: metrics.snapshot(),
        history,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::arrivals::Group;
    use std::time::Duration;

    fn config() -> Config {
        Config {
            time_unit: Duration::from_millis(100),
            ..Config::default()
        }
    }

    fn arrival(student_id: usize, group: Group, arrival_delay: u64, question_time: u64) -> ArrivalRecord {
        ArrivalRecord {
            student_id,
            group,
            arrival_delay,
            question_time,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_student_run() {
        let report = run_simulation(&config(), vec![arrival(0, Group::A, 0, 1)])
            .await
            .unwrap();

        assert_eq!(report.students, 1);
        assert_eq!(report.visits.len(), 1);
        assert_eq!(report.breaks_taken, 0);
        assert_eq!(report.final_snapshot.seats_occupied, 0);
        assert_eq!(report.final_snapshot.inside.total(), 0);
        assert_eq!(report.metrics.admissions, 1);
        assert_eq!(report.metrics.departures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_rejected() {
        let result = run_simulation(&config(), Vec::new()).await;
        assert!(matches!(result, Err(OfficeError::NoStudents)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_too_many_students_rejected() {
        let config = Config {
            max_students: 2,
            ..config()
        };
        let arrivals = (0..3).map(|id| arrival(id, Group::B, 0, 1)).collect();

        let result = run_simulation(&config, arrivals).await;
        assert!(matches!(
            result,
            Err(OfficeError::TooManyStudents { count: 3, limit: 2 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrival_delays_are_relative() {
        let arrivals = vec![
            arrival(0, Group::A, 2, 0),
            arrival(1, Group::A, 3, 0),
        ];
        let started = tokio::time::Instant::now();
        let report = run_simulation(&config(), arrivals).await.unwrap();

        assert_eq!(report.visits.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eleven_students_force_one_break() {
        let arrivals = (0..11).map(|id| arrival(id, Group::B, 0, 1)).collect();
        let report = run_simulation(&config(), arrivals).await.unwrap();

        assert_eq!(report.visits.len(), 11);
        assert_eq!(report.breaks_taken, 1);
        assert_eq!(report.metrics.breaks, 1);
        assert!(report.metrics.peak_occupancy <= 3);
    }
}
