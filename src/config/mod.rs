//! Configuration: YAML model, loader, and validation.
//!
//! The supervision engine treats specifications as already valid; everything
//! that can be wrong with a configuration is caught here, before boot.

mod loader;
mod model;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, RawJob, RawLogs, RawSchedule};
