//! Core types and error handling for stattrack-deps.
//!
//! - [`error`] - the [`StattrackError`] taxonomy and CLI-facing [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, Result, StattrackError, user_friendly_error};
