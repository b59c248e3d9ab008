#![deny(missing_docs)]
//! Discord transport adapter for the reaction sorter.

/// Discord-specific bot/transport implementation.
pub mod bot;
/// Discord transport configuration.
pub mod config;
/// Discord runtime entrypoint.
pub mod runner;
