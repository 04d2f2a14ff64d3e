/*
[INPUT]:  Public API exports for the nailgun-cluster-page crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod dialogs;
pub mod error;
pub mod events;
pub mod model;
pub mod page;
pub mod scheduler;
pub mod sync;
pub mod task_store;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::PageConfig;
pub use dialogs::{ConfirmPrompt, Dialogs};
pub use error::{PageError, PageResult, ValidationError};
pub use page::{ClusterPage, DeployOutcome, PageOptions};
pub use scheduler::{PollPhase, PollScheduler};
pub use sync::{CycleReport, PageNotification, SyncCoordinator};
pub use task_store::{TaskFilter, TaskStore};
pub use view::{PageSnapshot, TabKind};
