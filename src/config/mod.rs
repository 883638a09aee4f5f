//! Configuration management for stattrack-deps.
//!
//! [`ManagerConfig`] decides where the CLI lives and which releases it comes
//! from. Runtime options that the surrounding application owns (`proxy`,
//! `no_ssl_verify`) are not part of it; those are read through the
//! [`SettingsProvider`](crate::settings::SettingsProvider) at call time.

mod global;

pub use global::{CONFIG_PATH_ENV, ManagerConfig};
