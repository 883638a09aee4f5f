//! Integration test suite for stattrack-deps
//!
//! End-to-end tests against a local mock release server. Nothing here touches
//! the real network or the user's home directory.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The `stattrack-deps` binary and its subcommands
//! - **pipeline**: Check-and-install cycles through the library API
//! - **settings_store**: File-backed settings as seen by the manager

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod pipeline;
mod settings_store;
