#![deny(missing_docs)]
//! Reaction sorter core library.
//!
//! Platform-agnostic logic for tracking reactions, collecting image posts and
//! republishing them ranked by engagement.

/// Image-post collection from channel history.
pub mod collector;
/// Chat commands and their replies.
pub mod commands;
/// Configuration management.
pub mod config;
/// Live reaction ledger maintained from gateway events.
pub mod ledger;
/// Chat platform seam and shared data model.
pub mod platform;
/// Score computation and ordering.
pub mod ranking;
/// Republishing ranked posts into the destination channel.
pub mod republish;
/// Utility functions.
pub mod utils;

/// Test fixtures and mock helpers.
#[cfg(test)]
pub mod testing;
