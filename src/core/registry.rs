//! # Instance registry: job key → live instances.
//!
//! The registry is the authoritative in-memory table of currently tracked
//! instances. It is owned by the supervisor loop and mutated only there, so it
//! needs no locking; it has no persistence and is rebuilt empty on every boot.
//!
//! ## Rules
//! - Instances are kept in insertion order under their key (the order is not
//!   otherwise significant).
//! - Removal happens at most once per instance: a second removal attempt for
//!   the same id is a no-op.
//! - Entries whose instance list becomes empty are dropped from the map.

use std::collections::HashMap;
use std::sync::Arc;

use crate::jobs::{InstanceId, JobKey, JobSpec};

/// One tracked execution of a job.
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    /// Unique, time-ordered id assigned at spawn.
    pub id: InstanceId,
    /// Pid of the spawned process (also its process-group id).
    pub pid: i32,
    /// Specification snapshot taken at spawn time.
    ///
    /// The exit observer carries its own copy of the snapshot; this one keeps
    /// the record self-describing.
    #[allow(dead_code)]
    pub spec: Arc<JobSpec>,
}

/// In-memory table of live instances, keyed by job.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    jobs: HashMap<JobKey, Vec<Instance>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an instance under its key, after any existing instances.
    pub fn register(&mut self, key: JobKey, instance: Instance) {
        self.jobs.entry(key).or_default().push(instance);
    }

    /// Removes and returns the instance with the given id, if tracked.
    pub fn remove(&mut self, key: &JobKey, id: InstanceId) -> Option<Instance> {
        let instances = self.jobs.get_mut(key)?;
        let pos = instances.iter().position(|i| i.id == id)?;
        let removed = instances.remove(pos);
        if instances.is_empty() {
            self.jobs.remove(key);
        }
        Some(removed)
    }

    /// Removes and returns every instance tracked under the key.
    pub fn remove_all(&mut self, key: &JobKey) -> Vec<Instance> {
        self.jobs.remove(key).unwrap_or_default()
    }

    /// Ids of the instances currently tracked under the key, in insertion
    /// order.
    pub fn instance_ids(&self, key: &JobKey) -> Vec<InstanceId> {
        self.jobs
            .get(key)
            .map(|instances| instances.iter().map(|i| i.id).collect())
            .unwrap_or_default()
    }

    /// Removes and returns every tracked instance together with its key.
    pub fn drain(&mut self) -> Vec<(JobKey, Instance)> {
        self.jobs
            .drain()
            .flat_map(|(key, instances)| {
                instances
                    .into_iter()
                    .map(move |instance| (key.clone(), instance))
            })
            .collect()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobKind, LogPaths};

    fn spec() -> Arc<JobSpec> {
        Arc::new(JobSpec::new(
            "sleep",
            LogPaths::new("/tmp/out.log", "/tmp/err.log"),
        ))
    }

    fn instance(pid: i32) -> Instance {
        Instance {
            id: InstanceId::generate(),
            pid,
            spec: spec(),
        }
    }

    fn key(name: &str) -> JobKey {
        JobKey::new(JobKind::Process, name)
    }

    #[test]
    fn test_register_keeps_insertion_order() {
        let mut reg = Registry::new();
        let (a, b) = (instance(1), instance(2));
        let (ida, idb) = (a.id, b.id);
        reg.register(key("web"), a);
        reg.register(key("web"), b);
        assert_eq!(reg.instance_ids(&key("web")), vec![ida, idb]);
    }

    #[test]
    fn test_remove_by_id_retains_others() {
        let mut reg = Registry::new();
        let (a, b) = (instance(1), instance(2));
        let (ida, idb) = (a.id, b.id);
        reg.register(key("web"), a);
        reg.register(key("web"), b);

        let removed = reg.remove(&key("web"), ida).expect("tracked");
        assert_eq!(removed.id, ida);
        assert_eq!(reg.instance_ids(&key("web")), vec![idb]);
    }

    #[test]
    fn test_remove_is_at_most_once() {
        let mut reg = Registry::new();
        let a = instance(1);
        let ida = a.id;
        reg.register(key("web"), a);

        assert!(reg.remove(&key("web"), ida).is_some());
        assert!(reg.remove(&key("web"), ida).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_all_empties_only_that_key() {
        let mut reg = Registry::new();
        reg.register(key("web"), instance(1));
        reg.register(key("web"), instance(2));
        let other = JobKey::new(JobKind::Task, "backup");
        let c = instance(3);
        let idc = c.id;
        reg.register(other.clone(), c);

        assert_eq!(reg.remove_all(&key("web")).len(), 2);
        assert!(reg.instance_ids(&key("web")).is_empty());
        assert_eq!(reg.instance_ids(&other), vec![idc]);
    }

    #[test]
    fn test_missing_key_is_benign() {
        let mut reg = Registry::new();
        assert!(reg.remove(&key("ghost"), InstanceId::generate()).is_none());
        assert!(reg.remove_all(&key("ghost")).is_empty());
        assert!(reg.instance_ids(&key("ghost")).is_empty());
    }

    #[test]
    fn test_drain_returns_everything() {
        let mut reg = Registry::new();
        reg.register(key("web"), instance(1));
        reg.register(key("api"), instance(2));
        let drained = reg.drain();
        assert_eq!(drained.len(), 2);
        assert!(reg.is_empty());
    }
}
