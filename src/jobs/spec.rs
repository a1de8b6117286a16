//! # Job specification: what to run and how.
//!
//! Defines [`JobSpec`], the immutable description the supervisor receives for
//! every start request: command line, restart and uniqueness policies, and the
//! log file destinations for the captured output streams.
//!
//! A spec is assembled either by the configuration layer (which applies the
//! kind-dependent restart default) or explicitly via the builder methods.
//!
//! ## Rules
//! - Specs are validated by the configuration collaborator; the core treats
//!   them as already valid and never re-checks them.
//! - Log paths are keyed per job *name*, not per instance: concurrent
//!   instances of the same non-unique job append into the same files.

use std::path::PathBuf;

/// Destinations for a job's captured standard output and error streams.
///
/// Both files are opened in append mode (created if absent) at spawn time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    /// Path of the standard output log file.
    pub stdout: PathBuf,
    /// Path of the standard error log file.
    pub stderr: PathBuf,
}

impl LogPaths {
    /// Creates a pair of log destinations.
    pub fn new(stdout: impl Into<PathBuf>, stderr: impl Into<PathBuf>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Immutable description of a supervisable job.
///
/// ## Example
/// ```rust
/// use jobvisor::{JobSpec, LogPaths};
///
/// let spec = JobSpec::new("sleep", LogPaths::new("/tmp/out.log", "/tmp/err.log"))
///     .with_args(["60"])
///     .with_restart(true);
///
/// assert_eq!(spec.cmd, "sleep");
/// assert_eq!(spec.args, vec!["60".to_string()]);
/// assert!(spec.restart);
/// assert!(spec.unique);
/// ```
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Command to execute.
    pub cmd: String,
    /// Arguments passed to the command.
    pub args: Vec<String>,
    /// Whether an observed exit triggers a replacement instance.
    pub restart: bool,
    /// Whether starting this job first terminates all prior instances under
    /// the same key.
    pub unique: bool,
    /// Log file destinations for the captured output streams.
    pub logs: LogPaths,
}

impl JobSpec {
    /// Creates a spec with no arguments, `restart = false`, and
    /// `unique = true`.
    ///
    /// A spec built here says what it means explicitly: the kind-dependent
    /// restart default (`true` for processes) is applied only by the
    /// configuration layer, for fields left unset in the file — never by the
    /// start entry points. Pass [`with_restart`](JobSpec::with_restart) for a
    /// process that should stay alive.
    pub fn new(cmd: impl Into<String>, logs: LogPaths) -> Self {
        Self {
            cmd: cmd.into(),
            args: Vec::new(),
            restart: false,
            unique: true,
            logs,
        }
    }

    /// Returns the spec with the given arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the spec with the given restart policy.
    pub fn with_restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }

    /// Returns the spec with the given uniqueness policy.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}
