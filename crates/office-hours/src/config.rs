//! Office hours configuration.
//!
//! Configuration is loaded from environment variables. Every value has a
//! default matching the classic simulation parameters; a value that is set
//! but cannot be parsed, or is zero, is rejected.

use crate::office::OfficeLimits;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default number of seats in the professor's office.
pub const DEFAULT_SEATS: u32 = 3;

/// Default number of students the professor helps before a break.
pub const DEFAULT_PROFESSOR_LIMIT: u32 = 10;

/// Default number of consecutive same-class admissions allowed.
pub const DEFAULT_CONSECUTIVE_LIMIT: u32 = 5;

/// Default maximum number of students in one simulation.
pub const DEFAULT_MAX_STUDENTS: usize = 1000;

/// Default break length, in time units.
pub const DEFAULT_BREAK_UNITS: u64 = 5;

/// Default wall-clock length of one time unit, in milliseconds.
pub const DEFAULT_TIME_UNIT_MS: u64 = 1000;

/// Office hours configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of seats (default: 3).
    pub seats: u32,

    /// Students served between breaks (default: 10).
    pub professor_limit: u32,

    /// Same-class admissions in a row before the other class gets priority (default: 5).
    pub consecutive_limit: u32,

    /// Maximum number of arrival records accepted (default: 1000).
    pub max_students: usize,

    /// Break length in time units (default: 5).
    pub break_units: u64,

    /// Wall-clock duration of one time unit (default: 1s).
    pub time_unit: Duration,

    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seats: DEFAULT_SEATS,
            professor_limit: DEFAULT_PROFESSOR_LIMIT,
            consecutive_limit: DEFAULT_CONSECUTIVE_LIMIT,
            max_students: DEFAULT_MAX_STUDENTS,
            break_units: DEFAULT_BREAK_UNITS,
            time_unit: Duration::from_millis(DEFAULT_TIME_UNIT_MS),
            report_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let seats = parse_positive(vars, "OH_SEATS", DEFAULT_SEATS)?;
        let professor_limit = parse_positive(vars, "OH_PROFESSOR_LIMIT", DEFAULT_PROFESSOR_LIMIT)?;
        let consecutive_limit =
            parse_positive(vars, "OH_CONSECUTIVE_LIMIT", DEFAULT_CONSECUTIVE_LIMIT)?;
        let max_students = parse_positive(vars, "OH_MAX_STUDENTS", DEFAULT_MAX_STUDENTS)?;
        let break_units = parse_positive(vars, "OH_BREAK_UNITS", DEFAULT_BREAK_UNITS)?;
        let time_unit_ms = parse_positive(vars, "OH_TIME_UNIT_MS", DEFAULT_TIME_UNIT_MS)?;

        let report_path = vars
            .get("OH_REPORT_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Config {
            seats,
            professor_limit,
            consecutive_limit,
            max_students,
            break_units,
            time_unit: Duration::from_millis(time_unit_ms),
            report_path,
        })
    }

    /// Admission limits for the office gate.
    #[must_use]
    pub fn limits(&self) -> OfficeLimits {
        OfficeLimits {
            capacity: self.seats,
            professor_limit: self.professor_limit,
            consecutive_limit: self.consecutive_limit,
        }
    }

    /// Wall-clock length of the professor's break.
    #[must_use]
    pub fn break_duration(&self) -> Duration {
        self.units(self.break_units)
    }

    /// Convert a count of simulation time units to wall-clock time.
    #[must_use]
    pub fn units(&self, count: u64) -> Duration {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        self.time_unit.saturating_mul(count)
    }
}

fn parse_positive<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{name}={raw:?} is not a number")))?;

    if value == T::default() {
        return Err(ConfigError::InvalidValue(format!("{name} must be positive")));
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load successfully");

        assert_eq!(config.seats, DEFAULT_SEATS);
        assert_eq!(config.professor_limit, DEFAULT_PROFESSOR_LIMIT);
        assert_eq!(config.consecutive_limit, DEFAULT_CONSECUTIVE_LIMIT);
        assert_eq!(config.max_students, DEFAULT_MAX_STUDENTS);
        assert_eq!(config.break_units, DEFAULT_BREAK_UNITS);
        assert_eq!(config.time_unit, Duration::from_secs(1));
        assert!(config.report_path.is_none());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let vars = HashMap::from([
            ("OH_SEATS".to_string(), "4".to_string()),
            ("OH_PROFESSOR_LIMIT".to_string(), "12".to_string()),
            ("OH_CONSECUTIVE_LIMIT".to_string(), " 2 ".to_string()),
            ("OH_MAX_STUDENTS".to_string(), "50".to_string()),
            ("OH_BREAK_UNITS".to_string(), "3".to_string()),
            ("OH_TIME_UNIT_MS".to_string(), "10".to_string()),
            ("OH_REPORT_PATH".to_string(), "/tmp/report.json".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.seats, 4);
        assert_eq!(config.professor_limit, 12);
        assert_eq!(config.consecutive_limit, 2);
        assert_eq!(config.max_students, 50);
        assert_eq!(config.break_duration(), Duration::from_millis(30));
        assert_eq!(config.units(7), Duration::from_millis(70));
        assert_eq!(config.report_path, Some(PathBuf::from("/tmp/report.json")));
    }

    #[test]
    fn test_from_vars_rejects_unparsable_value() {
        let vars = HashMap::from([("OH_SEATS".to_string(), "three".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(msg)) if msg.contains("OH_SEATS")));
    }

    #[test]
    fn test_from_vars_rejects_zero() {
        let vars = HashMap::from([("OH_PROFESSOR_LIMIT".to_string(), "0".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidValue(msg)) if msg == "OH_PROFESSOR_LIMIT must be positive")
        );
    }

    #[test]
    fn test_limits_follow_config() {
        let config = Config {
            seats: 2,
            professor_limit: 4,
            consecutive_limit: 3,
            ..Config::default()
        };

        let limits = config.limits();
        assert_eq!(limits.capacity, 2);
        assert_eq!(limits.professor_limit, 4);
        assert_eq!(limits.consecutive_limit, 3);
    }

    #[test]
    fn test_empty_report_path_is_unset() {
        let vars = HashMap::from([("OH_REPORT_PATH".to_string(), String::new())]);
        let config = Config::from_vars(&vars).unwrap();
        assert!(config.report_path.is_none());
    }
}
