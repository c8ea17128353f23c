//! Archipel bootstrap library
//!
//! Prompts for (or reads from flags) which parts of the Archipel client to
//! build, then drives the external build tools that do the work.

pub mod cli;
pub mod command_runner;
pub mod config_file;
pub mod error;
pub mod orchestrator;
pub mod process_guard;
pub mod prompt;
pub mod properties;
pub mod sanity;
pub mod spinner;
pub mod steps;
pub mod theme;
pub mod types;

// Re-export main types for convenience
pub use cli::Cli;
pub use command_runner::{CommandOutcome, CommandRunner, DryRunRunner, Invocation, SystemRunner};
pub use config_file::BuildConfig;
pub use error::BuildError;
pub use orchestrator::{Bootstrap, Mode, RunOutcome};
pub use process_guard::{ActiveTool, CommandProcessGroup};
pub use prompt::Prompter;
pub use properties::InstallProperties;
pub use sanity::{command_exists, require_command, SearchPath};
pub use spinner::Spinner;
pub use steps::{BuildStep, StepContext};
pub use types::{Library, Severity};
