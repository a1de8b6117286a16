//! # Process launching and process-group signaling.
//!
//! Launching an instance:
//! 1. open the append-mode log sinks,
//! 2. assign a fresh instance id,
//! 3. spawn the command detached into its own process group, stdin discarded,
//!    stdout/stderr captured as pipes.
//!
//! The caller records the instance first and then calls
//! [`Launched::wire_output`], which hands each captured stream to a copy task
//! that owns the corresponding sink; the file handle closes when the stream
//! ends, so restarts do not leak descriptors.
//!
//! Termination goes to the **negative pid**, i.e. the whole process group, so
//! descendants spawned by the job are signaled too.

use std::process::Stdio;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::SpawnError;
use crate::jobs::{InstanceId, JobSpec};

/// A freshly spawned instance, before it is wired up and observed.
pub(crate) struct Launched {
    /// Assigned instance id.
    pub id: InstanceId,
    /// Pid of the child (equal to its process-group id).
    pub pid: i32,
    /// Handle used by the exit observer.
    pub child: Child,

    stdout: Option<(Box<dyn AsyncRead + Send + Unpin>, File)>,
    stderr: Option<(Box<dyn AsyncRead + Send + Unpin>, File)>,
}

impl Launched {
    /// Spawns copy tasks draining the captured streams into their sinks.
    ///
    /// Each copy task owns its sink file; the handle is released when the
    /// stream reaches end-of-file.
    pub fn wire_output(&mut self) {
        for (stream, sink) in [self.stdout.take(), self.stderr.take()].into_iter().flatten() {
            drain_into(stream, sink);
        }
    }
}

/// Launches the command described by `spec` in its own process group.
pub(crate) async fn launch(spec: &JobSpec) -> Result<Launched, SpawnError> {
    let out = open_sink(&spec.logs.stdout).await?;
    let err = open_sink(&spec.logs.stderr).await?;

    let id = InstanceId::generate();

    let mut command = Command::new(&spec.cmd);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);

    let mut child = command.spawn().map_err(|source| SpawnError::Spawn {
        cmd: spec.cmd.clone(),
        source,
    })?;
    let pid = child.id().ok_or(SpawnError::PidUnavailable)? as i32;

    let stdout = child
        .stdout
        .take()
        .map(|s| (Box::new(s) as Box<dyn AsyncRead + Send + Unpin>, out));
    let stderr = child
        .stderr
        .take()
        .map(|s| (Box::new(s) as Box<dyn AsyncRead + Send + Unpin>, err));

    Ok(Launched {
        id,
        pid,
        child,
        stdout,
        stderr,
    })
}

/// Sends SIGTERM to the process group of `pid`.
pub(crate) fn signal_group(pid: i32) -> nix::Result<()> {
    kill(Pid::from_raw(-pid), Signal::SIGTERM)
}

async fn open_sink(path: &std::path::Path) -> Result<File, SpawnError> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await
        .map_err(|source| SpawnError::Sink {
            path: path.to_path_buf(),
            source,
        })
}

fn drain_into(mut stream: Box<dyn AsyncRead + Send + Unpin>, mut sink: File) {
    tokio::spawn(async move {
        if let Err(error) = tokio::io::copy(&mut stream, &mut sink).await {
            debug!(%error, "output stream copy ended with error");
        }
    });
}
