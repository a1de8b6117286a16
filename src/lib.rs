//! # jobvisor
//!
//! **jobvisor** supervises externally executed commands on a single host:
//! long-running *processes* that should stay alive, and *tasks* that run to
//! completion, optionally on a trigger or timer.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   boot sequence        HTTP surface         cron scheduler
//!  (all processes)    /trigger  /kill        (fires tasks)
//!        │                  │                      │
//!        └────────────┬─────┴──────────────────────┘
//!                     ▼  SupervisorHandle (command queue)
//! ┌────────────────────────────────────────────────────────────┐
//! │  Supervisor (single-threaded bookkeeping loop)             │
//! │  - Registry (job key → live instances)                     │
//! │  - spawn: unique-kill → launch → register → wire sinks     │
//! │  - kill: SIGTERM to process group → deregister             │
//! │  - exit: log → deregister → restart? re-enqueue start      │
//! └──────┬─────────────────────────────────────────────────────┘
//!        │ publish(Event)
//!        ▼
//!      Bus (broadcast) ──► SubscriberSet ──► LogWriter, custom ...
//!
//!   one OS process per instance, detached into its own process
//!   group; stdout/stderr appended to the job's log files
//! ```
//!
//! ### Instance lifecycle
//! ```text
//! start_job(kind, name, spec)
//!   ├─► spec.unique? ─► kill_job(kind, name)          (prior instances go)
//!   ├─► open append sinks (stdout/stderr paths)
//!   ├─► launch detached process group, fresh v7 id
//!   ├─► register instance, publish JobStarted
//!   └─► exit observer: child.wait()
//!            └─► JobExited ─► deregister (at most once)
//!                  └─► spec.restart? ─► re-enqueue start (new id)
//!
//! kill_job(kind, name, id?)
//!   ├─► select: one instance by id, or all under the key
//!   ├─► SIGTERM to -pid (whole group; descendants included)
//!   │     ├─ ESRCH        → benign, logged low-severity
//!   │     └─ other errno  → error event, operation continues
//!   └─► deregister targets unconditionally
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types                                    |
//! |-------------------|-----------------------------------------------------------|----------------------------------------------|
//! | **Supervision**   | Spawn, track, kill, and restart job instances.            | [`Supervisor`], [`SupervisorHandle`]         |
//! | **Specifications**| Describe what to run and how.                             | [`JobSpec`], [`JobKind`], [`LogPaths`]       |
//! | **Events**        | Observe the runtime (logging, metrics, custom hooks).     | [`Event`], [`EventKind`], [`Subscribe`]      |
//! | **Configuration** | YAML model, loading, validation.                          | [`ConfigFile`], [`load_and_validate`]        |
//! | **Collaborators** | HTTP trigger/kill surface, cron schedule evaluator.       | [`http::router`], [`sched::spawn_schedules`] |
//! | **Errors**        | Typed errors for runtime, spawning, and configuration.    | [`RuntimeError`], [`SpawnError`], [`ConfigError`] |
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
//!     handle.start_process(
//!         "web",
//!         JobSpec::new("./server", LogPaths::new("web.out", "web.err")),
//!     );
//!
//!     // Runs until SIGINT/SIGTERM, then terminates every tracked instance.
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod jobs;
mod subscribers;

pub mod config;
pub mod http;
pub mod sched;

// ---- Public re-exports ----

pub use config::{load_and_validate, ConfigFile};
pub use core::{Supervisor, SupervisorBuilder, SupervisorConfig, SupervisorHandle};
pub use error::{ConfigError, RuntimeError, SpawnError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{InstanceId, JobKey, JobKind, JobSpec, LogPaths, ParseJobKindError};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
