//! # Job addressing: kinds, keys, and instance ids.
//!
//! A logical job is addressed by a [`JobKey`] — the pair of its [`JobKind`]
//! and its configured name. Many concurrent instances may run under one key;
//! each one gets a fresh [`InstanceId`] at spawn time.
//!
//! ## Rules
//! - Instance ids are UUID v7: time-ordered, globally unique, never reused
//!   for the lifetime of the supervisor.
//! - Keys render as `kind/name` (e.g. `process/web`), which is also the form
//!   used in log output.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// The two logical kinds of job.
///
/// They differ only in their default restart policy: a process is expected to
/// run continuously (restart defaults on), a task runs to completion (restart
/// defaults off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Long-running job that should stay alive.
    Process,
    /// One-shot job that runs to completion.
    Task,
}

impl JobKind {
    /// Stable lowercase label, as used in registry keys and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Process => "process",
            JobKind::Task => "task",
        }
    }

    /// Default restart policy for this kind.
    pub fn default_restart(&self) -> bool {
        matches!(self, JobKind::Process)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized job kind label.
#[derive(Debug, Error)]
#[error("unknown job kind '{0}' (expected 'process' or 'task')")]
pub struct ParseJobKindError(String);

impl FromStr for JobKind {
    type Err = ParseJobKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(JobKind::Process),
            "task" => Ok(JobKind::Task),
            other => Err(ParseJobKindError(other.to_string())),
        }
    }
}

/// Identifies a logical job: kind plus configured name.
///
/// ## Example
/// ```rust
/// use jobvisor::{JobKey, JobKind};
///
/// let key = JobKey::new(JobKind::Process, "web");
/// assert_eq!(key.to_string(), "process/web");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    /// Kind of the job.
    pub kind: JobKind,
    /// Configured job name.
    pub name: String,
}

impl JobKey {
    /// Creates a key from a kind and a name.
    pub fn new(kind: JobKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Unique identifier of one running (or terminated) instance of a job.
///
/// Ids are UUID v7, so they sort by creation time. A restarted job gets a new
/// id; ids are never revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Generates a fresh, time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_round_trip() {
        for kind in [JobKind::Process, JobKind::Task] {
            assert_eq!(kind.as_str().parse::<JobKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!("cron".parse::<JobKind>().is_err());
        assert!("".parse::<JobKind>().is_err());
        assert!("Process".parse::<JobKind>().is_err());
    }

    #[test]
    fn test_default_restart_by_kind() {
        assert!(JobKind::Process.default_restart());
        assert!(!JobKind::Task.default_restart());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(InstanceId::generate()));
        }
    }
}
