//! Archipel bootstrap - main entry point
//!
//! Parses flags, sets up logging and interrupt handling, then hands over to
//! the orchestrator. This is the only place that picks the exit status.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use archipel_bootstrap::cli::Cli;
use archipel_bootstrap::command_runner::{DryRunRunner, SystemRunner};
use archipel_bootstrap::config_file::BuildConfig;
use archipel_bootstrap::error::{BuildError, Result};
use archipel_bootstrap::orchestrator::{Bootstrap, Mode, RunOutcome};
use archipel_bootstrap::process_guard;
use archipel_bootstrap::prompt::Prompter;
use archipel_bootstrap::properties::InstallProperties;
use archipel_bootstrap::sanity::SearchPath;
use archipel_bootstrap::theme::Theme;

/// Build tool output goes here unless `-v` is given
const LOG_FILE_NAME: &str = "archipel-bootstrap.log";

/// Initialize tracing; `RUST_LOG` overrides the verbosity flags
fn init_logging(level: &str, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("archipel_bootstrap={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn main() {
    // Usage errors exit with status 2 inside clap
    let cli = Cli::parse_args();

    // Diagnostics go to stderr and prompts to stdout; color only when both are terminals
    let colors = std::io::stdout().is_terminal() && std::io::stderr().is_terminal();
    if !colors {
        Theme::set_colors_enabled(false);
    }

    init_logging(cli.log_level(), colors);
    info!("Archipel bootstrap starting up");

    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }
    debug!("Signal handlers initialized");

    match run(&cli) {
        Ok(outcome) => {
            info!("finished: {:?}", outcome);
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}{}", Theme::bullet(), Theme::error(&e));
            if let Some(log) = build_log(&cli).filter(|_| matches!(e, BuildError::StepFailed { .. })) {
                eprintln!("   Build output was written to {}", log.display());
            }
            std::process::exit(e.exit_code());
        }
    }
}

/// Log file for build tool output, when output is not shown live
fn build_log(cli: &Cli) -> Option<PathBuf> {
    (!cli.dry_run && cli.verbose == 0).then(|| cli.root.join(LOG_FILE_NAME))
}

fn run(cli: &Cli) -> Result<RunOutcome> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading build layout from {:?}", path);
            BuildConfig::load_from_file(path)?
        }
        None => BuildConfig::default(),
    };
    config.validate()?;

    let mode = if cli.notinteractive {
        Mode::NonInteractive(InstallProperties::from_cli(cli))
    } else {
        Mode::Interactive
    };

    let mut prompter = Prompter::stdio();
    let show_spinner = std::io::stdout().is_terminal();

    if cli.dry_run {
        let mut runner = DryRunRunner::new(std::io::stdout());
        Bootstrap {
            root: cli.root.clone(),
            config,
            search_path: SearchPath::from_env(),
            runner: &mut runner,
            show_spinner: false,
            write_marker: false,
        }
        .run(mode, &mut prompter)
    } else {
        let mut runner = match build_log(cli) {
            Some(log) => SystemRunner::with_log_file(&cli.root, log),
            None => SystemRunner::new(&cli.root),
        };
        Bootstrap {
            root: cli.root.clone(),
            config,
            search_path: SearchPath::from_env(),
            runner: &mut runner,
            show_spinner,
            write_marker: true,
        }
        .run(mode, &mut prompter)
    }
}
