//! # Configuration data model.
//!
//! Mirrors the on-disk YAML shape: three maps keyed by name — `processes`,
//! `tasks`, and `schedules`. Raw entries are deserialized here and converted
//! into [`JobSpec`]s with the kind-dependent restart default applied.
//!
//! ```yaml
//! processes:
//!   web:
//!     cmd: ./server
//!     args: ["--port", "8080"]
//!     logs: { stdout: /var/log/web.out, stderr: /var/log/web.err }
//!
//! tasks:
//!   backup:
//!     cmd: ./backup.sh
//!     unique: false
//!     logs: { stdout: /var/log/backup.out, stderr: /var/log/backup.err }
//!
//! schedules:
//!   nightly-backup:
//!     cron: "0 0 3 * * *"
//!     task: backup
//! ```
//!
//! ## Defaults
//! - `args`: empty
//! - `restart`: `true` for processes, `false` for tasks (overridable in both)
//! - `unique`: `true`

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::jobs::{JobKind, JobSpec, LogPaths};

/// Raw log destinations as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLogs {
    /// Path to the standard output log file.
    pub stdout: PathBuf,
    /// Path to the standard error log file.
    pub stderr: PathBuf,
}

/// Raw job entry shared by the `processes` and `tasks` maps.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJob {
    /// The command to execute.
    pub cmd: String,
    /// Arguments to pass to the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Whether to restart the job when it exits; unset means the
    /// kind-dependent default.
    #[serde(default)]
    pub restart: Option<bool>,
    /// Whether only one instance of the job may run at a time.
    #[serde(default = "default_unique")]
    pub unique: bool,
    /// Log file paths for the job.
    pub logs: RawLogs,
}

fn default_unique() -> bool {
    true
}

impl RawJob {
    /// Converts the raw entry into a validated spec for the given kind.
    pub fn to_spec(&self, kind: JobKind) -> JobSpec {
        JobSpec {
            cmd: self.cmd.clone(),
            args: self.args.clone(),
            restart: self.restart.unwrap_or_else(|| kind.default_restart()),
            unique: self.unique,
            logs: LogPaths::new(&self.logs.stdout, &self.logs.stderr),
        }
    }
}

/// Raw schedule entry: a cron expression firing a named task.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSchedule {
    /// Cron expression for scheduling.
    pub cron: String,
    /// Name of the task to run.
    pub task: String,
}

/// Top-level configuration file.
///
/// Maps are ordered by name so boot order is deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Jobs to run continuously.
    #[serde(default)]
    pub processes: BTreeMap<String, RawJob>,
    /// One-off jobs started on trigger or schedule.
    #[serde(default)]
    pub tasks: BTreeMap<String, RawJob>,
    /// Cron schedules referring to tasks by name.
    #[serde(default)]
    pub schedules: BTreeMap<String, RawSchedule>,
}

impl ConfigFile {
    /// Semantic validation beyond the serde shape.
    ///
    /// Checks every job has a non-empty command, every cron expression
    /// parses, and every schedule references a configured task.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, jobs) in [
            (JobKind::Process, &self.processes),
            (JobKind::Task, &self.tasks),
        ] {
            for (name, job) in jobs {
                if job.cmd.trim().is_empty() {
                    return Err(ConfigError::EmptyCommand {
                        job: format!("{kind}/{name}"),
                    });
                }
            }
        }

        for (name, schedule) in &self.schedules {
            cron::Schedule::from_str(&schedule.cron).map_err(|source| {
                ConfigError::InvalidCron {
                    schedule: name.clone(),
                    cron: schedule.cron.clone(),
                    source,
                }
            })?;
            if !self.tasks.contains_key(&schedule.task) {
                return Err(ConfigError::UnknownTask {
                    schedule: name.clone(),
                    task: schedule.task.clone(),
                });
            }
        }

        Ok(())
    }

    /// Specs for every configured process, in name order.
    pub fn process_specs(&self) -> Vec<(String, JobSpec)> {
        self.processes
            .iter()
            .map(|(name, job)| (name.clone(), job.to_spec(JobKind::Process)))
            .collect()
    }

    /// Specs for every configured task, keyed by name.
    pub fn task_specs(&self) -> BTreeMap<String, JobSpec> {
        self.tasks
            .iter()
            .map(|(name, job)| (name.clone(), job.to_spec(JobKind::Task)))
            .collect()
    }

    /// Spec for a single configured task, if present.
    pub fn task_spec(&self, name: &str) -> Option<JobSpec> {
        self.tasks.get(name).map(|job| job.to_spec(JobKind::Task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ConfigFile {
        serde_yaml::from_str(yaml).expect("valid yaml")
    }

    const MINIMAL: &str = r#"
processes:
  web:
    cmd: ./server
    logs: { stdout: /tmp/web.out, stderr: /tmp/web.err }
tasks:
  backup:
    cmd: ./backup.sh
    logs: { stdout: /tmp/backup.out, stderr: /tmp/backup.err }
schedules:
  nightly:
    cron: "0 0 3 * * *"
    task: backup
"#;

    #[test]
    fn test_restart_defaults_by_kind() {
        let cfg = parse(MINIMAL);
        assert!(cfg.process_specs()[0].1.restart);
        assert!(!cfg.task_spec("backup").unwrap().restart);
    }

    #[test]
    fn test_restart_is_overridable_in_both_sections() {
        let cfg = parse(
            r#"
processes:
  once:
    cmd: ./run
    restart: false
    logs: { stdout: /tmp/o, stderr: /tmp/e }
tasks:
  stubborn:
    cmd: ./run
    restart: true
    logs: { stdout: /tmp/o, stderr: /tmp/e }
"#,
        );
        assert!(!cfg.process_specs()[0].1.restart);
        assert!(cfg.task_spec("stubborn").unwrap().restart);
    }

    #[test]
    fn test_args_default_empty_and_unique_default_true() {
        let cfg = parse(MINIMAL);
        let (_, web) = &cfg.process_specs()[0];
        assert!(web.args.is_empty());
        assert!(web.unique);
    }

    #[test]
    fn test_validate_accepts_minimal() {
        assert!(parse(MINIMAL).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let cfg = parse(
            r#"
tasks:
  broken:
    cmd: "  "
    logs: { stdout: /tmp/o, stderr: /tmp/e }
"#,
        );
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EmptyCommand { job }) if job == "task/broken"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_cron() {
        let cfg = parse(
            r#"
tasks:
  backup:
    cmd: ./backup.sh
    logs: { stdout: /tmp/o, stderr: /tmp/e }
schedules:
  broken:
    cron: "not a cron line"
    task: backup
"#,
        );
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidCron { schedule, .. }) if schedule == "broken"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_task_reference() {
        let cfg = parse(
            r#"
schedules:
  nightly:
    cron: "0 0 3 * * *"
    task: ghost
"#,
        );
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnknownTask { task, .. }) if task == "ghost"
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let res: Result<ConfigFile, _> = serde_yaml::from_str(
            r#"
tasks:
  backup:
    cmd: ./backup.sh
    retries: 3
    logs: { stdout: /tmp/o, stderr: /tmp/e }
"#,
        );
        assert!(res.is_err());
    }
}
