//! netimage - image fetching with memory, disk and network tiers.
//!
//! This crate resolves logical image paths to decoded images, answering from
//! registered fakes, an in-memory LRU, an on-disk cache, or the network, and
//! supports cancellation and an inline execution mode for deterministic tests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the download coordinator.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = "netimage";
