//! Error handling module for klipkit
//!
//! Provides the top-level error type using thiserror. Layer-specific errors
//! (`RegistryError`, `SelectionError`) convert into it with `?`, and every
//! variant maps onto a process exit code so `main` never has to guess.

use thiserror::Error;

use crate::logic::order::SelectionError;
use crate::registry::RegistryError;

/// Process exit codes.
///
/// Clap reports usage errors with code 2 on its own, so it is not reused here.
pub mod exit_code {
    /// Every selected component was applied (or skipped).
    pub const SUCCESS: i32 = 0;
    /// At least one component's apply hook failed.
    pub const COMPONENT_FAILED: i32 = 1;
    /// Missing privilege, tooling, scripts or terminal, a bad config or
    /// catalog. Nothing was run.
    pub const PRECONDITION_FAILED: i32 = 3;
    /// Unknown slug, dependency cycle, or missing dependency. Nothing was run.
    pub const SELECTION_INVALID: i32 = 4;
    /// The operator quit the interactive selector.
    pub const CANCELLED: i32 = 5;
}

/// Main error type for klipkit
#[derive(Error, Debug)]
pub enum KlipkitError {
    /// IO errors (terminal, files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// The built-in catalog is malformed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The chosen component set cannot be installed as a whole
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Environment is not fit for a mutating run
    #[error("Pre-flight check failed: {0}")]
    Precondition(String),

    /// Terminal setup or drawing failed
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for klipkit operations
pub type Result<T> = std::result::Result<T, KlipkitError>;

impl KlipkitError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Exit code the process should report for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Hook failures are reported through InstallReport, never as errors
            Self::Precondition(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Registry(_)
            | Self::Terminal(_) => exit_code::PRECONDITION_FAILED,
            Self::Selection(_) => exit_code::SELECTION_INVALID,
        }
    }
}
