//! # Built-in logging subscriber.
//!
//! [`LogWriter`] renders runtime events as structured `tracing` records, one
//! line per event. Severity follows the event's meaning: lifecycle events are
//! informational, a benign kill race is debug, signal and spawn errors are
//! errors.
//!
//! ## Output shape
//! ```text
//! INFO  job started job=process/web instance=0198... pid=4242
//! INFO  job exited job=process/web instance=0198... exit_code=0
//! DEBUG kill target already gone job=task/backup instance=0198...
//! ERROR spawn failed job=task/backup reason=No such file or directory
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Structured logging subscriber.
///
/// Install it in the subscriber set to get one log line per runtime event;
/// implement a custom [`Subscribe`] for metrics or alerting instead.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new log writer.
    pub fn new() -> Self {
        Self
    }
}

/// Renders an optional field for display without quoting `None`.
fn fmt_opt<T: std::fmt::Display>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref().unwrap_or("");
        match e.kind {
            EventKind::JobStarted => {
                info!(
                    job,
                    instance = %fmt_opt(&e.instance),
                    pid = %fmt_opt(&e.pid),
                    "job started"
                );
            }
            EventKind::SpawnFailed => {
                error!(job, reason = %fmt_opt(&e.reason), "spawn failed");
            }
            EventKind::JobExited => {
                info!(
                    job,
                    instance = %fmt_opt(&e.instance),
                    exit_code = %fmt_opt(&e.exit_code),
                    signal = %fmt_opt(&e.signal),
                    "job exited"
                );
            }
            EventKind::JobRestarting => {
                info!(job, "restarting job");
            }
            EventKind::KillSignaled => {
                debug!(
                    job,
                    instance = %fmt_opt(&e.instance),
                    pid = %fmt_opt(&e.pid),
                    "sent termination signal to process group"
                );
            }
            EventKind::KillTargetGone => {
                debug!(
                    job,
                    instance = %fmt_opt(&e.instance),
                    "kill target already exited"
                );
            }
            EventKind::KillFailed => {
                error!(
                    job,
                    instance = %fmt_opt(&e.instance),
                    pid = %fmt_opt(&e.pid),
                    reason = %fmt_opt(&e.reason),
                    "error signaling job"
                );
            }
            EventKind::ShutdownRequested => {
                info!(reason = %fmt_opt(&e.reason), "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!("all jobs stopped within grace period");
            }
            EventKind::GraceExceeded => {
                warn!("grace period exceeded; some jobs did not report exit");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
