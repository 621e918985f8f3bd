//! Application services.

pub mod download_coordinator;
pub mod execution;

pub use download_coordinator::{CoordinatorOptions, CoordinatorPorts, DownloadCoordinator};
pub use execution::{
    Completion, CompletionQueue, CompletionSender, ExecutionMode, completion_channel,
};
