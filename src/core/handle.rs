//! # Supervisor handle: the entry points collaborators call.
//!
//! [`SupervisorHandle`] is a cheap, cloneable sender into the supervisor's
//! command queue. The boot sequence, the HTTP surface, and the scheduler use
//! it to start jobs and request kills; exit observers use the same queue
//! internally, which is what serializes every registry mutation onto one
//! logical thread.
//!
//! ## Rules
//! - Start and kill are **fire-and-forget**: they enqueue and return; all
//!   failure paths inside the engine are logged, never raised back here.
//! - Name resolution ("job not found") is the caller's concern; the engine
//!   treats an unknown key in a kill request as an empty target set.

use std::process::ExitStatus;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::jobs::{InstanceId, JobKey, JobKind, JobSpec};

/// Messages consumed by the supervisor loop.
pub(crate) enum Command {
    /// Start a new instance of a job.
    Start {
        kind: JobKind,
        name: String,
        spec: Arc<JobSpec>,
    },
    /// Terminate one instance (by id) or every instance of a job.
    Kill {
        kind: JobKind,
        name: String,
        id: Option<InstanceId>,
    },
    /// An exit observer saw the instance's process terminate.
    ///
    /// `status` is `None` when waiting on the child failed.
    Exited {
        key: JobKey,
        id: InstanceId,
        status: Option<ExitStatus>,
        spec: Arc<JobSpec>,
    },
    /// Snapshot of the instance ids currently tracked under a key.
    Snapshot {
        kind: JobKind,
        name: String,
        reply: oneshot::Sender<Vec<InstanceId>>,
    },
    /// Begin graceful shutdown.
    Shutdown,
}

/// Cloneable handle for submitting work to a running [`Supervisor`](crate::Supervisor).
///
/// All senders share one unbounded queue; a handle outliving the supervisor
/// turns every operation into a no-op.
#[derive(Clone)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SupervisorHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Starts an instance of a process-kind job.
    ///
    /// The spec is forwarded as given: restart and uniqueness are whatever it
    /// carries. Only the configuration layer supplies the process restart
    /// default (`true`), for fields left unset in the file.
    pub fn start_process(&self, name: impl Into<String>, spec: JobSpec) {
        self.start_job(JobKind::Process, name, spec);
    }

    /// Starts an instance of a task-kind job.
    pub fn start_task(&self, name: impl Into<String>, spec: JobSpec) {
        self.start_job(JobKind::Task, name, spec);
    }

    /// Starts an instance of a job under an explicit kind.
    pub fn start_job(&self, kind: JobKind, name: impl Into<String>, spec: JobSpec) {
        let _ = self.tx.send(Command::Start {
            kind,
            name: name.into(),
            spec: Arc::new(spec),
        });
    }

    /// Requests termination of one instance (`id` given) or of every
    /// instance tracked under `(kind, name)`.
    ///
    /// Best-effort: targets are deregistered regardless of whether the
    /// termination signal could be delivered. Unknown names are a no-op.
    pub fn kill(&self, kind: JobKind, name: impl Into<String>, id: Option<InstanceId>) {
        let _ = self.tx.send(Command::Kill {
            kind,
            name: name.into(),
            id,
        });
    }

    /// Returns the ids of the instances currently tracked under
    /// `(kind, name)`, in insertion order.
    ///
    /// Returns an empty list when the supervisor is gone.
    pub async fn instances(&self, kind: JobKind, name: impl Into<String>) -> Vec<InstanceId> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(Command::Snapshot {
                kind,
                name: name.into(),
                reply,
            })
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Requests graceful shutdown of the supervisor loop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}
