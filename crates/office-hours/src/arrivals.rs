//! Arrival records and the input loader.
//!
//! The input is a plain text stream of whitespace-separated integer
//! triples, one per student:
//!
//! ```text
//! <class> <arrival delay> <question time>
//! ```
//!
//! `class` is `0` for class A and `1` for class B. The arrival delay is
//! relative to the previous student's dispatch. Both times are counts of
//! simulation time units.

use crate::errors::OfficeError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// One of the two competing student groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Group {
    A,
    B,
}

impl Group {
    /// The competing group.
    #[must_use]
    pub const fn opposite(self) -> Group {
        match self {
            Group::A => Group::B,
            Group::B => Group::A,
        }
    }

    /// Label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Group::A => "A",
            Group::B => "B",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one student's visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalRecord {
    /// 0-based position in the input.
    pub student_id: usize,
    pub group: Group,
    /// Time units to wait after the previous dispatch.
    pub arrival_delay: u64,
    /// Time units spent asking questions once inside.
    pub question_time: u64,
}

/// Errors reading or parsing the arrival input.
#[derive(Debug, Error)]
pub enum ArrivalError {
    #[error("Cannot open input file {path} for reading: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record {record}: {token:?} is not an integer")]
    NotANumber { record: usize, token: String },

    #[error("record {record}: negative time {value}")]
    NegativeTime { record: usize, value: i64 },

    #[error("record {record}: unknown class {value} (expected 0 or 1)")]
    InvalidGroup { record: usize, value: i64 },

    #[error("input ends with an incomplete record ({fields} of 3 fields)")]
    IncompleteRecord { fields: usize },
}

/// Parse arrival records from text.
pub fn parse_arrivals(input: &str) -> Result<Vec<ArrivalRecord>, ArrivalError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let mut records = Vec::with_capacity(tokens.len() / 3);

    for (student_id, fields) in tokens.chunks(3).enumerate() {
        let &[class, arrival, question] = fields else {
            return Err(ArrivalError::IncompleteRecord {
                fields: fields.len(),
            });
        };

        let group = match parse_int(student_id, class)? {
            0 => Group::A,
            1 => Group::B,
            value => {
                return Err(ArrivalError::InvalidGroup {
                    record: student_id,
                    value,
                })
            }
        };

        records.push(ArrivalRecord {
            student_id,
            group,
            arrival_delay: parse_time(student_id, arrival)?,
            question_time: parse_time(student_id, question)?,
        });
    }

    Ok(records)
}

/// Read and validate the arrival file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, holds no records, or holds
/// more than `max_students` records.
pub fn load_arrivals(path: &Path, max_students: usize) -> Result<Vec<ArrivalRecord>, OfficeError> {
    let input = std::fs::read_to_string(path).map_err(|source| ArrivalError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_arrivals(&input)?;
    validate_count(&records, max_students)?;

    debug!(
        target: "oh.simulation",
        path = %path.display(),
        students = records.len(),
        "Arrival records loaded"
    );

    Ok(records)
}

/// Reject empty inputs and inputs beyond the actor limit.
pub fn validate_count(records: &[ArrivalRecord], max_students: usize) -> Result<(), OfficeError> {
    if records.is_empty() {
        return Err(OfficeError::NoStudents);
    }
    if records.len() > max_students {
        return Err(OfficeError::TooManyStudents {
            count: records.len(),
            limit: max_students,
        });
    }
    Ok(())
}

fn parse_int(record: usize, token: &str) -> Result<i64, ArrivalError> {
    token.parse().map_err(|_| ArrivalError::NotANumber {
        record,
        token: token.to_string(),
    })
}

fn parse_time(record: usize, token: &str) -> Result<u64, ArrivalError> {
    let value = parse_int(record, token)?;
    u64::try_from(value).map_err(|_| ArrivalError::NegativeTime { record, value })
}
