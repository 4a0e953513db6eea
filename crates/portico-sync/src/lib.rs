//! # portico-sync
//!
//! The per-cycle driver and the interval scheduler that runs it.
//!
//! [`SyncOrchestrator::run_cycle`] checks for a credential, discovers and
//! normalizes the portal's APIs, builds the replace-all batch and submits
//! it. [`TaskScheduler`] runs it on a fixed cadence, one run at a time,
//! each bounded by a timeout.

mod error;
pub mod orchestrator;
pub mod scheduler;

pub use error::SyncError;
pub use orchestrator::{CredentialSource, CycleOutcome, CycleReport, SyncOrchestrator};
pub use scheduler::{TaskDefinition, TaskScheduler, refresh_task_id};
