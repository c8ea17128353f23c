use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Archipel bootstrap - build the Archipel client and its Cappuccino libraries
#[derive(Parser, Debug, Clone)]
#[command(name = "archipel-bootstrap")]
#[command(about = "Builds Cappuccino, the bundled libraries and the Archipel client")]
#[command(version)]
pub struct Cli {
    /// Take every choice from the flags below instead of prompting
    #[arg(long)]
    pub notinteractive: bool,

    /// Build and install Cappuccino
    #[arg(long)]
    pub cappuccino: bool,

    /// Build GrowlCappuccino
    #[arg(long)]
    pub growlcappuccino: bool,

    /// Build VNCCappuccino
    #[arg(long)]
    pub vnccappuccino: bool,

    /// Build StropheCappuccino
    #[arg(long)]
    pub strophecappuccino: bool,

    /// Build LPKit
    #[arg(long)]
    pub lpkit: bool,

    /// Build TNKit
    #[arg(long)]
    pub tnkit: bool,

    /// Build the Archipel client
    #[arg(long)]
    pub archipel: bool,

    /// Copy the built client to this directory (implies applying frameworks)
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Root of the Archipel client tree
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// JSON file overriding the default build layout
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show what would be executed without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command line arguments; usage errors exit with status 2
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default tracing filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
