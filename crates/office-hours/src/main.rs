//! Office Hours
//!
//! Runs one simulated office hour over an arrival file.
//!
//! ```text
//! office-hours <input-file>
//! ```
//!
//! The input holds one `class arrival question` triple per student
//! (class 0 or 1, times in whole units). Limits and timing come from
//! `OH_*` environment variables.
//!
//! # Startup Flow
//!
//! 1. Parse the command line
//! 2. Load configuration from environment
//! 3. Load and validate the arrival records
//! 4. Initialize Prometheus metrics recorder
//! 5. Run the simulation
//! 6. Write the JSON report if `OH_REPORT_PATH` is set

#![warn(clippy::pedantic)]

use std::path::Path;
use std::process::ExitCode;

use office_hours::arrivals::load_arrivals;
use office_hours::config::Config;
use office_hours::errors::OfficeError;
use office_hours::observability::init_metrics_recorder;
use office_hours::{run_simulation, SimulationReport};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for wrong command-line usage (EINVAL).
const USAGE_EXIT_CODE: u8 = 22;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "office_hours=info,oh=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let [_, input] = args.as_slice() else {
        error!("Usage: office-hours <input-file>");
        return ExitCode::from(USAGE_EXIT_CODE);
    };

    match run(Path::new(input)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_startup_error() => {
            error!(error = %e, "Office hour simulation could not start");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "Office hour simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path) -> Result<(), OfficeError> {
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        seats = config.seats,
        professor_limit = config.professor_limit,
        consecutive_limit = config.consecutive_limit,
        max_students = config.max_students,
        break_units = config.break_units,
        time_unit_ms = u64::try_from(config.time_unit.as_millis()).unwrap_or(u64::MAX),
        "Configuration loaded successfully"
    );

    // No actor starts before the input is known to be valid.
    let arrivals = load_arrivals(input, config.max_students)?;
    info!(
        path = %input.display(),
        students = arrivals.len(),
        "Arrival records loaded"
    );

    let prometheus_handle = init_metrics_recorder().map_err(|e| {
        error!(error = %e, "Failed to install Prometheus metrics recorder");
        OfficeError::Internal(e)
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| OfficeError::Internal(format!("failed to start runtime: {e}")))?;

    let report = runtime.block_on(run_simulation(&config, arrivals))?;

    if let Some(path) = &config.report_path {
        write_report(path, &report)?;
        info!(path = %path.display(), "Simulation report written");
    }

    debug!(metrics = %prometheus_handle.render(), "Final metrics");

    info!(
        students = report.students,
        breaks_taken = report.breaks_taken,
        peak_occupancy = report.metrics.peak_occupancy,
        "Office hour simulation done"
    );

    Ok(())
}

fn write_report(path: &Path, report: &SimulationReport) -> Result<(), OfficeError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| OfficeError::Internal(format!("failed to serialize report: {e}")))?;
    std::fs::write(path, json).map_err(|e| {
        OfficeError::Internal(format!("failed to write report to {}: {e}", path.display()))
    })
}
