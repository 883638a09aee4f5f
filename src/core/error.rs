//! Error handling for stattrack-deps
//!
//! The crate distinguishes two categories of operations:
//!
//! - **Critical** operations (downloading the release archive, extracting it)
//!   return `Result<T, StattrackError>` and abort the install cycle on failure.
//! - **Best-effort** operations (stale archive cleanup, missing-platform
//!   reports, permission bits, the stable-name alias, archive deletion) log a
//!   warning and return `()`.
//!
//! Neither category surfaces to the caller of
//! [`CliManager::check_and_install`](crate::manager::CliManager::check_and_install):
//! that entry point always completes, and "no usable binary afterwards" is the
//! only failure signal.
//!
//! # Error Categories
//!
//! - **Network**: [`StattrackError::NetworkError`], [`StattrackError::Http`]
//! - **Archive**: [`StattrackError::ArchiveError`]
//! - **File system**: [`StattrackError::FilesystemError`]
//! - **Subprocess**: [`StattrackError::SubprocessError`]
//! - **Configuration**: [`StattrackError::ConfigurationError`],
//!   [`StattrackError::SettingsError`], [`StattrackError::TomlSer`]
//!
//! For the command-line front end, [`user_friendly_error`] converts any
//! [`anyhow::Error`] into an [`ErrorContext`] with a suggestion.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the critical operations of this crate.
pub type Result<T> = std::result::Result<T, StattrackError>;

/// All failure cases of the dependency manager.
#[derive(Error, Debug)]
pub enum StattrackError {
    /// A network request failed or returned an unexpected status.
    #[error("Network error: {operation}: {reason}")]
    NetworkError {
        /// The network operation that failed (e.g. "download", "fetch releases")
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// A downloaded archive could not be read or unpacked.
    #[error("Archive error in {path}: {reason}")]
    ArchiveError {
        /// Archive being processed
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// A file system operation failed.
    #[error("File system error: {operation} on {path}")]
    FilesystemError {
        /// The operation that failed (e.g. "rename", "chmod", "symlink")
        operation: String,
        /// Path involved in the failure
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The installed binary could not be invoked.
    #[error("Failed to run {program}: {reason}")]
    SubprocessError {
        /// Program that was spawned
        program: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// A configured or host-reported value is malformed.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the problem
        message: String,
    },

    /// The settings store could not be read or written.
    #[error("Settings error: {message}")]
    SettingsError {
        /// Description of the problem
        message: String,
    },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl StattrackError {
    /// Shorthand for [`StattrackError::FilesystemError`].
    pub fn filesystem(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FilesystemError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Shorthand for [`StattrackError::NetworkError`].
    pub fn network(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::NetworkError {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from the network layer.
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Http(_))
    }
}

/// An error prepared for display, with optional details and suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// Main error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`StattrackError`], [`std::io::Error`] and [`toml::de::Error`];
/// anything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(err) = error.downcast_ref::<StattrackError>() {
        return create_error_context(err);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(error.to_string())
                    .with_suggestion("Check ownership of the resources directory or choose another one with --resources-dir");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(error.to_string())
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(format!("Invalid configuration file: {toml_error}"))
            .with_suggestion("Check the TOML syntax of your configuration file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(message)
}

fn create_error_context(error: &StattrackError) -> ErrorContext {
    let context = ErrorContext::new(error.to_string());
    match error {
        StattrackError::NetworkError { .. } | StattrackError::Http(_) => context
            .with_suggestion("Check your internet connection, or configure settings.proxy / settings.no_ssl_verify")
            .with_details("The release server could not be reached; nothing was changed on disk"),
        StattrackError::ArchiveError { .. } => context
            .with_suggestion("Run the install again; the previous binary has been restored")
            .with_details("The downloaded archive was corrupt or incomplete"),
        StattrackError::FilesystemError { .. } => context
            .with_suggestion("Check permissions on the resources directory"),
        StattrackError::SubprocessError { .. } => context
            .with_suggestion("Reinstall the CLI with `stattrack-deps install`"),
        StattrackError::ConfigurationError { .. } | StattrackError::TomlSer(_) => context
            .with_suggestion("Check the configuration file (see --config or STATTRACK_DEPS_CONFIG)"),
        StattrackError::SettingsError { .. } => context
            .with_suggestion("Check that the settings file is valid TOML with one table per namespace"),
    }
}
