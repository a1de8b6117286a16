//! # Periodic schedule evaluator.
//!
//! Turns each configured schedule into a tokio task that sleeps until the
//! cron expression's next fire time and starts the referenced task through
//! the supervisor entry point. One tick, one start request — overlapping runs
//! are governed by the task's own uniqueness policy, not by the scheduler.
//!
//! Expressions are parsed here again even though validation already checked
//! them; a schedule that stops yielding fire times simply ends its task.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ConfigFile;
use crate::core::SupervisorHandle;

/// Spawns one evaluator task per configured schedule.
///
/// Schedules referencing unknown tasks are skipped with an error log (config
/// validation also rejects them up front). Evaluators stop when `shutdown` is
/// cancelled.
pub fn spawn_schedules(config: &ConfigFile, handle: &SupervisorHandle, shutdown: &CancellationToken) {
    for (name, schedule) in &config.schedules {
        let Some(spec) = config.task_spec(&schedule.task) else {
            error!(
                schedule = %name,
                task = %schedule.task,
                "task not found for scheduling"
            );
            continue;
        };

        let parsed: cron::Schedule = match schedule.cron.parse() {
            Ok(parsed) => parsed,
            Err(err) => {
                error!(schedule = %name, cron = %schedule.cron, error = %err, "invalid cron expression");
                continue;
            }
        };

        info!(
            schedule = %name,
            task = %schedule.task,
            cron = %schedule.cron,
            "scheduling task"
        );

        let handle = handle.clone();
        let token = shutdown.clone();
        let schedule_name = name.clone();
        let task_name = schedule.task.clone();

        tokio::spawn(async move {
            loop {
                let Some(next) = parsed.upcoming(Utc).next() else {
                    warn!(schedule = %schedule_name, "cron expression has no future fire times");
                    break;
                };
                let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {
                        info!(
                            schedule = %schedule_name,
                            task = %task_name,
                            "executing scheduled task"
                        );
                        handle.start_task(&task_name, spec.clone());
                    }
                }
            }
        });
    }
}
