//! # Supervisor: the job supervision engine.
//!
//! The [`Supervisor`] owns the instance [`Registry`], the event [`Bus`], and
//! the command queue every entry point feeds. It spawns operating-system
//! processes from job specifications, tracks them as instances, enforces
//! uniqueness, reacts to exits, and terminates process groups on request.
//!
//! ## High-level architecture
//! ```text
//! boot / HTTP surface / scheduler
//!        │  start_process / start_task / kill      (SupervisorHandle)
//!        ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  command queue (mpsc) ─► Supervisor::run() loop               │
//! │    Start  ─► unique? kill first ─► launch ─► register ─► wire │
//! │    Kill   ─► signal process group(s) ─► deregister            │
//! │    Exited ─► log ─► deregister ─► restart? re-enqueue Start   │
//! └──────┬────────────────────────────────────────────────────────┘
//!        │ publish(Event)
//!        ▼
//!      Bus ──► subscriber listener ──► SubscriberSet ──► LogWriter, ...
//!
//! exit observers (one task per instance):
//!      child.wait() ──► queue Exited     (never interleaves with the loop)
//! ```
//!
//! ## Rules
//! - All registry mutations happen inside the loop, one command at a time;
//!   no locks are needed and no mutation interleaves at sub-operation
//!   granularity.
//! - An instance is registered before its exit observer exists, and exit
//!   notifications travel through the queue, so an exit is always handled in
//!   a later turn than the registration it refers to.
//! - Restarts are re-enqueued start commands, not recursive calls, so
//!   pathologically fast restart loops cannot grow the call stack.
//! - The window between the OS-level spawn and registry insertion is not
//!   closed by any synchronization primitive; kill during that window is
//!   best-effort by design.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use jobvisor::{JobSpec, LogPaths, LogWriter, Subscribe, Supervisor, SupervisorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!     let handle = sup.handle();
//!
//!     let spec = JobSpec::new("sleep", LogPaths::new("/tmp/out.log", "/tmp/err.log"))
//!         .with_args(["60"])
//!         .with_restart(true);
//!     handle.start_process("napper", spec);
//!
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::Child;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{timeout_at, Instant};
use tracing::{error, warn};

use crate::core::config::SupervisorConfig;
use crate::core::handle::{Command, SupervisorHandle};
use crate::core::launch;
use crate::core::registry::{Instance, Registry};
use crate::core::shutdown;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{InstanceId, JobKey, JobKind, JobSpec};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (instance lifecycle, kill results,
    /// shutdown progress) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor.
    ///
    /// Must be called from within a tokio runtime (subscriber workers are
    /// spawned here).
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers));
        let (tx, rx) = mpsc::unbounded_channel();

        Supervisor {
            cfg: self.cfg,
            bus,
            subs,
            registry: Registry::new(),
            tx,
            rx,
        }
    }
}

/// The job supervision engine.
///
/// Owns the registry of live instances and consumes the command queue fed by
/// [`SupervisorHandle`]s. See the module docs for the wiring diagram.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    registry: Registry,
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl Supervisor {
    /// Starts building a supervisor with the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Returns a handle for submitting work to this supervisor.
    ///
    /// Handles stay valid across [`run`](Supervisor::run); commands sent
    /// before the loop starts are buffered in order.
    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle::new(self.tx.clone())
    }

    /// Runs the supervision loop until an OS termination signal arrives or a
    /// handle requests shutdown, then terminates every tracked instance and
    /// waits up to the configured grace for their exits.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        self.subscriber_listener();

        let signal = shutdown::wait_for_termination();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                res = &mut signal => {
                    let reason = res.unwrap_or("signal listener failed");
                    return self.graceful_shutdown(Some(reason)).await;
                }
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Shutdown) => return self.graceful_shutdown(None).await,
                    Some(cmd) => self.dispatch(cmd).await,
                    None => return Ok(()),
                },
            }
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                }
            }
        });
    }

    async fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::Start { kind, name, spec } => self.start_job(kind, name, spec).await,
            Command::Kill { kind, name, id } => self.kill_job(&JobKey::new(kind, name), id),
            Command::Exited {
                key,
                id,
                status,
                spec,
            } => self.observe_exit(key, id, status, spec),
            Command::Snapshot { kind, name, reply } => {
                let _ = reply.send(self.registry.instance_ids(&JobKey::new(kind, name)));
            }
            Command::Shutdown => {}
        }
    }

    /// Creates and tracks exactly one new instance, subject to uniqueness.
    ///
    /// When `spec.unique` is set, every prior instance under the key is
    /// killed and deregistered first, synchronously within this turn. A
    /// launch failure publishes [`EventKind::SpawnFailed`] and records
    /// nothing.
    async fn start_job(&mut self, kind: JobKind, name: String, spec: Arc<JobSpec>) {
        let key = JobKey::new(kind, name);
        if spec.unique {
            self.kill_job(&key, None);
        }

        match launch::launch(&spec).await {
            Ok(mut launched) => {
                let (id, pid) = (launched.id, launched.pid);
                self.registry.register(
                    key.clone(),
                    Instance {
                        id,
                        pid,
                        spec: Arc::clone(&spec),
                    },
                );
                self.bus.publish(
                    Event::now(EventKind::JobStarted)
                        .with_job(&key)
                        .with_instance(id)
                        .with_pid(pid),
                );
                launched.wire_output();
                self.observe(launched.child, key, id, spec);
            }
            Err(error) => {
                self.bus.publish(
                    Event::now(EventKind::SpawnFailed)
                        .with_job(&key)
                        .with_reason(error.to_string()),
                );
            }
        }
    }

    /// Registers the exit observer for a freshly launched instance.
    fn observe(&self, mut child: Child, key: JobKey, id: InstanceId, spec: Arc<JobSpec>) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let status = match child.wait().await {
                Ok(status) => Some(status),
                Err(err) => {
                    error!(job = %key, instance = %id, error = %err, "failed to await child exit");
                    None
                }
            };
            let _ = tx.send(Command::Exited {
                key,
                id,
                status,
                spec,
            });
        });
    }

    /// Handles an observed exit: log, deregister exactly once, and re-enqueue
    /// a start for the identical spec when restart is set.
    fn observe_exit(
        &mut self,
        key: JobKey,
        id: InstanceId,
        status: Option<ExitStatus>,
        spec: Arc<JobSpec>,
    ) {
        self.bus.publish(Self::exit_event(&key, id, status));
        self.registry.remove(&key, id);

        if spec.restart {
            self.bus
                .publish(Event::now(EventKind::JobRestarting).with_job(&key));
            let _ = self.tx.send(Command::Start {
                kind: key.kind,
                name: key.name,
                spec,
            });
        }
    }

    fn exit_event(key: &JobKey, id: InstanceId, status: Option<ExitStatus>) -> Event {
        let mut ev = Event::now(EventKind::JobExited)
            .with_job(key)
            .with_instance(id);
        if let Some(status) = status {
            if let Some(code) = status.code() {
                ev = ev.with_exit_code(code);
            }
            #[cfg(unix)]
            if let Some(signal) = std::os::unix::process::ExitStatusExt::signal(&status) {
                ev = ev.with_signal(signal);
            }
        }
        ev
    }

    /// Best-effort termination and unconditional deregistration.
    ///
    /// Targets the single matching instance when `id` is given, otherwise
    /// every instance under the key. Instances not targeted are retained
    /// unchanged; nothing is raised back to the caller.
    fn kill_job(&mut self, key: &JobKey, id: Option<InstanceId>) {
        let targets = match id {
            Some(id) => self.registry.remove(key, id).into_iter().collect(),
            None => self.registry.remove_all(key),
        };
        for instance in &targets {
            self.signal_instance(key, instance);
        }
    }

    /// Signals the instance's process group and publishes the outcome.
    ///
    /// "No such process" is benign; any other failure is an error event. The
    /// caller has already deregistered the instance either way.
    fn signal_instance(&self, key: &JobKey, instance: &Instance) {
        let kind = match launch::signal_group(instance.pid) {
            Ok(()) => EventKind::KillSignaled,
            Err(nix::errno::Errno::ESRCH) => EventKind::KillTargetGone,
            Err(errno) => {
                self.bus.publish(
                    Event::now(EventKind::KillFailed)
                        .with_job(key)
                        .with_instance(instance.id)
                        .with_pid(instance.pid)
                        .with_reason(errno.to_string()),
                );
                return;
            }
        };
        self.bus.publish(
            Event::now(kind)
                .with_job(key)
                .with_instance(instance.id)
                .with_pid(instance.pid),
        );
    }

    /// Terminates every tracked instance and drains their exit notifications
    /// for up to [`SupervisorConfig::grace`].
    ///
    /// `reason` names the OS signal that triggered shutdown, when one did.
    /// Restart policies are not honored here: exits observed during shutdown
    /// only count toward the drain. Returns
    /// [`RuntimeError::GraceExceeded`] naming the jobs whose instances never
    /// reported exit.
    async fn graceful_shutdown(&mut self, reason: Option<&'static str>) -> Result<(), RuntimeError> {
        let mut requested = Event::now(EventKind::ShutdownRequested);
        if let Some(reason) = reason {
            requested = requested.with_reason(reason);
        }
        self.bus.publish(requested);

        let targets = self.registry.drain();
        let mut pending: HashMap<InstanceId, String> = HashMap::with_capacity(targets.len());
        for (key, instance) in &targets {
            self.signal_instance(key, instance);
            pending.insert(instance.id, key.to_string());
        }

        let deadline = Instant::now() + self.cfg.grace;
        while !pending.is_empty() {
            match timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(Command::Exited {
                    key, id, status, ..
                })) => {
                    self.bus.publish(Self::exit_event(&key, id, status));
                    pending.remove(&id);
                }
                Ok(Some(_)) => {} // new work is not accepted once shutdown begins
                Ok(None) => break,
                Err(_elapsed) => {
                    self.bus.publish(Event::now(EventKind::GraceExceeded));
                    let mut stuck: Vec<String> = pending.into_values().collect();
                    stuck.sort_unstable();
                    stuck.dedup();
                    return Err(RuntimeError::GraceExceeded {
                        grace: self.cfg.grace,
                        stuck,
                    });
                }
            }
        }

        self.bus.publish(Event::now(EventKind::AllStoppedWithin));
        Ok(())
    }
}
