//! End-to-end supervision behaviour against real child processes.

#![cfg(unix)]

use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;

use jobvisor::{
    InstanceId, JobKind, JobSpec, LogPaths, RuntimeError, Supervisor, SupervisorConfig,
    SupervisorHandle,
};

fn logs_in(dir: &TempDir) -> LogPaths {
    LogPaths::new(dir.path().join("out.log"), dir.path().join("err.log"))
}

/// Long-running child that only goes away when signaled.
fn sleeper(dir: &TempDir) -> JobSpec {
    JobSpec::new("sleep", logs_in(dir)).with_args(["60"])
}

/// A supervisor running in a background task, stoppable from the test body.
struct Harness {
    handle: SupervisorHandle,
    join: JoinHandle<Result<(), RuntimeError>>,
}

impl Harness {
    fn start() -> Self {
        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let handle = sup.handle();
        let join = tokio::spawn(sup.run());
        Self { handle, join }
    }

    async fn stop(self) {
        self.handle.shutdown();
        self.join
            .await
            .expect("supervisor task panicked")
            .expect("graceful shutdown failed");
    }
}

/// Polls the registry snapshot until `pred` holds (or panics after 10s).
async fn wait_until<F>(
    handle: &SupervisorHandle,
    kind: JobKind,
    name: &str,
    pred: F,
) -> Vec<InstanceId>
where
    F: Fn(&[InstanceId]) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let ids = handle.instances(kind, name).await;
        if pred(&ids) {
            return ids;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time; last snapshot: {ids:?}"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn unique_start_replaces_previous_instance() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle.start_task("pinned", sleeper(&dir));
    let first = wait_until(&h.handle, JobKind::Task, "pinned", |ids| ids.len() == 1).await[0];

    h.handle.start_task("pinned", sleeper(&dir));
    let ids = wait_until(&h.handle, JobKind::Task, "pinned", |ids| {
        ids.len() == 1 && ids[0] != first
    })
    .await;
    assert_ne!(ids[0], first, "the survivor must be the second instance");

    h.stop().await;
}

#[tokio::test]
async fn kill_all_empties_registry_for_that_job_only() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle
        .start_task("crowd", sleeper(&dir).with_unique(false));
    h.handle
        .start_task("crowd", sleeper(&dir).with_unique(false));
    h.handle.start_task("bystander", sleeper(&dir));
    wait_until(&h.handle, JobKind::Task, "crowd", |ids| ids.len() == 2).await;
    let bystander = wait_until(&h.handle, JobKind::Task, "bystander", |ids| ids.len() == 1).await;

    h.handle.kill(JobKind::Task, "crowd", None);
    wait_until(&h.handle, JobKind::Task, "crowd", |ids| ids.is_empty()).await;
    assert_eq!(
        h.handle.instances(JobKind::Task, "bystander").await,
        bystander,
        "untargeted jobs must be retained unchanged"
    );

    h.stop().await;
}

#[tokio::test]
async fn kill_by_id_retains_other_instances() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle
        .start_task("pool", sleeper(&dir).with_unique(false));
    h.handle
        .start_task("pool", sleeper(&dir).with_unique(false));
    let ids = wait_until(&h.handle, JobKind::Task, "pool", |ids| ids.len() == 2).await;

    h.handle.kill(JobKind::Task, "pool", Some(ids[0]));
    let rest = wait_until(&h.handle, JobKind::Task, "pool", |ids| ids.len() == 1).await;
    assert_eq!(rest, vec![ids[1]]);

    h.stop().await;
}

#[tokio::test]
async fn kill_unknown_job_is_a_silent_noop() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle.kill(JobKind::Task, "nonexistent", None);

    // The loop must stay responsive and the registry untouched.
    h.handle.start_task("probe", sleeper(&dir));
    wait_until(&h.handle, JobKind::Task, "probe", |ids| ids.len() == 1).await;
    assert!(h
        .handle
        .instances(JobKind::Task, "nonexistent")
        .await
        .is_empty());

    h.stop().await;
}

#[tokio::test]
async fn task_exit_deregisters_instance() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle.start_task(
        "quick",
        JobSpec::new("sleep", logs_in(&dir)).with_args(["0.3"]),
    );
    wait_until(&h.handle, JobKind::Task, "quick", |ids| ids.len() == 1).await;
    wait_until(&h.handle, JobKind::Task, "quick", |ids| ids.is_empty()).await;

    h.stop().await;
}

#[tokio::test]
async fn restart_produces_fresh_instance() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle.start_process(
        "flapper",
        JobSpec::new("sleep", logs_in(&dir))
            .with_args(["0.2"])
            .with_restart(true),
    );
    let first = wait_until(&h.handle, JobKind::Process, "flapper", |ids| !ids.is_empty()).await[0];

    // After the child exits, a replacement with a previously-unseen id shows up.
    wait_until(&h.handle, JobKind::Process, "flapper", |ids| {
        !ids.is_empty() && ids[0] != first
    })
    .await;

    h.stop().await;
}

#[tokio::test]
async fn spawn_failure_registers_nothing() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle.start_task(
        "ghost",
        JobSpec::new("/definitely/not/a/binary", logs_in(&dir)),
    );

    // The failed start must leave no trace and must not wedge the loop.
    h.handle.start_task("probe", sleeper(&dir));
    wait_until(&h.handle, JobKind::Task, "probe", |ids| ids.len() == 1).await;
    assert!(h.handle.instances(JobKind::Task, "ghost").await.is_empty());

    h.stop().await;
}

#[tokio::test]
async fn captured_output_lands_in_the_job_log_file() {
    let dir = TempDir::new().unwrap();
    let logs = logs_in(&dir);
    let h = Harness::start();

    h.handle.start_task(
        "greeter",
        JobSpec::new("sh", logs.clone()).with_args(["-c", "echo hello-from-child"]),
    );
    wait_until(&h.handle, JobKind::Task, "greeter", |ids| ids.is_empty()).await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let contents = tokio::fs::read_to_string(&logs.stdout)
            .await
            .unwrap_or_default();
        if contents.contains("hello-from-child") {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "stdout sink never received the child's output: {contents:?}"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    h.stop().await;
}

#[tokio::test]
async fn shutdown_terminates_long_running_instances() {
    let dir = TempDir::new().unwrap();
    let h = Harness::start();

    h.handle.start_process("clingy", sleeper(&dir));
    wait_until(&h.handle, JobKind::Process, "clingy", |ids| ids.len() == 1).await;

    // `sleep 60` only dies because shutdown signals its process group; stop()
    // asserts the drain finished within the grace window.
    h.stop().await;
}
