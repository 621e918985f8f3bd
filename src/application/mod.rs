//! Application layer with the image download coordinator.

/// Coordinator and execution strategies.
pub mod services;

pub use services::{
    CompletionQueue, CompletionSender, CoordinatorOptions, CoordinatorPorts, DownloadCoordinator,
    ExecutionMode, completion_channel,
};
