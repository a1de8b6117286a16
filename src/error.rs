//! Error types used by the jobvisor runtime and its collaborators.
//!
//! Three enums cover the failure surfaces:
//!
//! - [`RuntimeError`] — errors raised by the supervision runtime itself.
//! - [`SpawnError`] — failures while launching one instance; consumed by the
//!   supervisor loop and reported as events, never propagated to callers.
//! - [`ConfigError`] — configuration loading and validation failures,
//!   surfaced before anything starts.
//!
//! OS-level races during kill (target already gone, signal errors) are by
//! design not errors at the entry points: they are logged and the registry is
//! updated regardless.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by the supervision runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period elapsed with instances still unaccounted for.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Jobs whose instances never reported exit.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// Failures while launching one job instance.
///
/// A spawn failure is a distinguishable, loggable condition: the supervisor
/// publishes a spawn-failed event and records nothing in the registry.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// Opening one of the log sinks failed.
    #[error("failed to open log sink {path}: {source}")]
    Sink {
        /// Path of the sink that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Creating the operating-system process failed.
    #[error("failed to spawn '{cmd}': {source}")]
    Spawn {
        /// Command that failed to start.
        cmd: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The child reported no pid (already reaped at observation time).
    #[error("spawned process has no observable pid")]
    PidUnavailable,
}

/// Configuration loading and validation failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the expected schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying deserialization error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A job entry has an empty command.
    #[error("job '{job}' has an empty command")]
    EmptyCommand {
        /// Offending job, rendered `kind/name`.
        job: String,
    },

    /// A schedule's cron expression does not parse.
    #[error("schedule '{schedule}' has an invalid cron expression '{cron}': {source}")]
    InvalidCron {
        /// Name of the offending schedule.
        schedule: String,
        /// The expression as written.
        cron: String,
        /// Underlying parse error.
        #[source]
        source: cron::error::Error,
    },

    /// A schedule references a task name that is not configured.
    #[error("schedule '{schedule}' references unknown task '{task}'")]
    UnknownTask {
        /// Name of the offending schedule.
        schedule: String,
        /// The task name it referenced.
        task: String,
    },
}
