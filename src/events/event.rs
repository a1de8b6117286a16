//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies what happened; the [`Event`] struct
//! carries the metadata (job key, instance id, pid, exit code/signal, reason).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::jobs::{InstanceId, JobKey};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Instance lifecycle ===
    /// A new instance was spawned and recorded in the registry.
    ///
    /// Sets: `job`, `instance`, `pid`.
    JobStarted,

    /// Launching the operating-system process failed; nothing was recorded.
    ///
    /// Sets: `job`, `reason`.
    SpawnFailed,

    /// A tracked instance's process terminated.
    ///
    /// Sets: `job`, `instance`, and `exit_code` and/or `signal` when the
    /// status could be observed.
    JobExited,

    /// An exited instance's spec asks for a replacement; a new start request
    /// was enqueued.
    ///
    /// Sets: `job`.
    JobRestarting,

    // === Kill operation ===
    /// A termination signal was delivered to the instance's process group.
    ///
    /// Sets: `job`, `instance`, `pid`.
    KillSignaled,

    /// The kill target was already gone (benign; the instance is still
    /// deregistered).
    ///
    /// Sets: `job`, `instance`, `pid`.
    KillTargetGone,

    /// Signaling the kill target failed for a reason other than it being gone
    /// (the instance is still deregistered).
    ///
    /// Sets: `job`, `instance`, `pid`, `reason`.
    KillFailed,

    // === Shutdown ===
    /// Shutdown requested.
    ///
    /// Sets: `reason` with the signal name when an OS signal triggered it;
    /// unset for an explicit shutdown request.
    ShutdownRequested,

    /// Every tracked instance reported its exit within the grace window.
    AllStoppedWithin,

    /// The grace window elapsed with instances still unaccounted for.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Job key rendered as `kind/name`, if applicable.
    pub job: Option<Arc<str>>,
    /// Instance the event refers to, if applicable.
    pub instance: Option<InstanceId>,
    /// Recorded pid of the instance, if applicable.
    pub pid: Option<i32>,
    /// Exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// Terminating signal number, when the process was signaled.
    pub signal: Option<i32>,
    /// Human-readable reason (spawn or signal errors).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            instance: None,
            pid: None,
            exit_code: None,
            signal: None,
            reason: None,
        }
    }

    /// Attaches the job key.
    #[inline]
    pub fn with_job(mut self, key: &JobKey) -> Self {
        self.job = Some(key.to_string().into());
        self
    }

    /// Attaches an instance id.
    #[inline]
    pub fn with_instance(mut self, id: InstanceId) -> Self {
        self.instance = Some(id);
        self
    }

    /// Attaches the instance's pid.
    #[inline]
    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches an exit code.
    #[inline]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Attaches a terminating signal number.
    #[inline]
    pub fn with_signal(mut self, signal: i32) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobKind;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::now(EventKind::JobStarted);
        let b = Event::now(EventKind::JobExited);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let key = JobKey::new(JobKind::Task, "backup");
        let id = InstanceId::generate();
        let ev = Event::now(EventKind::KillFailed)
            .with_job(&key)
            .with_instance(id)
            .with_pid(42)
            .with_reason("permission denied");

        assert_eq!(ev.kind, EventKind::KillFailed);
        assert_eq!(ev.job.as_deref(), Some("task/backup"));
        assert_eq!(ev.instance, Some(id));
        assert_eq!(ev.pid, Some(42));
        assert_eq!(ev.reason.as_deref(), Some("permission denied"));
        assert!(ev.exit_code.is_none());
    }
}
