//! Error handling for the bootstrapper
//!
//! Every fatal condition is a `BuildError`. Errors propagate up to `main`,
//! which prints the diagnostic and exits with `BuildError::exit_code()`.
//! User cancellation is not an error and never shows up here.

use thiserror::Error;

/// Exit status for a missing prerequisite or a failed build step
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for the bootstrapper
#[derive(Error, Debug)]
pub enum BuildError {
    /// A required external command is not on the search path
    #[error("required command `{name}` was not found in PATH")]
    MissingCommand { name: String },

    /// A wrapped external command exited with a non-zero status
    #[error("{step} failed (exit code {})", describe_code(.code))]
    StepFailed { step: String, code: Option<i32> },

    /// The external command could not be started at all
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Build layout errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (marker file, prompts, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Result type alias for bootstrap operations
pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    /// Create a missing-command error
    pub fn missing_command(name: impl Into<String>) -> Self {
        Self::MissingCommand { name: name.into() }
    }

    /// Create a step failure from the step label and the child's exit code
    pub fn step_failed(step: impl Into<String>, code: Option<i32>) -> Self {
        Self::StepFailed {
            step: step.into(),
            code,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit status for this error.
    ///
    /// Every fatal condition maps to 1; argument errors (2) are reported by
    /// clap before a `BuildError` can exist.
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

impl From<anyhow::Error> for BuildError {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(format!("{err:#}"))
    }
}
