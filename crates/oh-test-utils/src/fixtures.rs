//! Test fixtures: arrival records, arrival files and configuration.

use office_hours::arrivals::{ArrivalRecord, Group};
use office_hours::config::Config;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Wall-clock length of one time unit in tests (virtual under paused time).
pub const TEST_TIME_UNIT: Duration = Duration::from_millis(100);

/// Default configuration with a short time unit.
pub fn test_config() -> Config {
    Config {
        time_unit: TEST_TIME_UNIT,
        ..Config::default()
    }
}

/// Single arrival record.
pub fn arrival(
    student_id: usize,
    group: Group,
    arrival_delay: u64,
    question_time: u64,
) -> ArrivalRecord {
    ArrivalRecord {
        student_id,
        group,
        arrival_delay,
        question_time,
    }
}

/// Builder for arrival sequences with input-order ids.
///
/// # Example
/// ```rust,ignore
/// let arrivals = ArrivalsBuilder::new()
///     .repeat(Group::A, 5, 0, 2)
///     .b(1, 1)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ArrivalsBuilder {
    records: Vec<ArrivalRecord>,
}

impl ArrivalsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, group: Group, arrival_delay: u64, question_time: u64) -> Self {
        let student_id = self.records.len();
        self.records
            .push(arrival(student_id, group, arrival_delay, question_time));
        self
    }

    /// Group A student.
    pub fn a(self, arrival_delay: u64, question_time: u64) -> Self {
        self.push(Group::A, arrival_delay, question_time)
    }

    /// Group B student.
    pub fn b(self, arrival_delay: u64, question_time: u64) -> Self {
        self.push(Group::B, arrival_delay, question_time)
    }

    /// `count` students of one group with identical timing.
    pub fn repeat(
        mut self,
        group: Group,
        count: usize,
        arrival_delay: u64,
        question_time: u64,
    ) -> Self {
        for _ in 0..count {
            self = self.push(group, arrival_delay, question_time);
        }
        self
    }

    pub fn build(self) -> Vec<ArrivalRecord> {
        self.records
    }
}

/// Render records in the on-disk `class arrival question` format.
pub fn to_input_text(records: &[ArrivalRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let class = match r.group {
                Group::A => 0,
                Group::B => 1,
            };
            format!("{class} {} {}\n", r.arrival_delay, r.question_time)
        })
        .collect()
}

/// Write raw text to a temporary arrival file.
pub fn write_arrival_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create arrival file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write arrival file");
    file
}

/// Let spawned actors process everything that is ready.
///
/// Under paused time this advances the clock by one millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
