//! Job identity and specification types.
//!
//! This module groups the **data model** shared by the supervisor core and its
//! collaborators:
//! - [`JobKind`], [`JobKey`], [`InstanceId`] — how jobs and their running
//!   instances are addressed;
//! - [`JobSpec`], [`LogPaths`] — what to run and where its output goes.
//!
//! Specifications are immutable once constructed; the supervisor snapshots
//! them per instance and never re-validates them.

mod key;
mod spec;

pub use key::{InstanceId, JobKey, JobKind, ParseJobKindError};
pub use spec::{JobSpec, LogPaths};
