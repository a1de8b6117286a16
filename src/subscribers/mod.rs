//! # Event subscribers for the jobvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out, and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► subscriber listener
//!                                              │
//!                                        SubscriberSet::emit(&Event)
//!                                              │
//!                                    ┌─────────┼─────────┐
//!                                    ▼         ▼         ▼
//!                                LogWriter  Metrics   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use jobvisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::SpawnFailed {
//!             // increment a counter...
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
