//! Build steps and their runner
//!
//! A `BuildStep` knows which external commands it stands for. `run_step`
//! prints the status line, keeps the spinner going while the commands run
//! one after another, and turns the first non-zero exit into
//! `BuildError::StepFailed`.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::command_runner::{CommandRunner, Invocation};
use crate::config_file::BuildConfig;
use crate::error::Result;
use crate::spinner::Spinner;
use crate::theme::Theme;
use crate::types::Library;

/// One independently toggleable unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    Cappuccino,
    Library(Library),
    ApplyFrameworks,
    Archipel,
    Export(PathBuf),
}

impl BuildStep {
    /// Human-readable status line
    pub fn label(&self) -> String {
        match self {
            Self::Cappuccino => "Building Cappuccino".to_string(),
            Self::Library(lib) => format!("Building {}", lib),
            Self::ApplyFrameworks => "Applying Cappuccino frameworks to Archipel".to_string(),
            Self::Archipel => "Building Archipel".to_string(),
            Self::Export(dest) => format!("Exporting Archipel to {}", dest.display()),
        }
    }

    /// Commands for this step, in execution order.
    ///
    /// `root` is only read to find which library frameworks exist when
    /// applying frameworks.
    pub fn invocations(&self, root: &Path, config: &BuildConfig) -> Vec<Invocation> {
        match self {
            Self::Cappuccino => vec![
                Invocation::new(&config.task_runner, config.cappuccino_dir())
                    .arg(&config.cappuccino_build_task),
            ],
            Self::Library(lib) => vec![
                Invocation::new(&config.task_runner, config.library_dir(*lib))
                    .arg(&config.library_build_task),
            ],
            Self::ApplyFrameworks => {
                let mut commands = vec![
                    Invocation::new(&config.framework_tool, ".").args(["gen", "-f", "--force", "."]),
                ];
                for lib in Library::all() {
                    let output = config.library_output(lib);
                    if root.join(&output).exists() {
                        commands.push(Invocation::new("cp", ".").args([
                            "-a".to_string(),
                            output.display().to_string(),
                            format!("{}/", config.frameworks_dir.display()),
                        ]));
                    } else {
                        debug!("{} has no build output, not linking it", lib);
                    }
                }
                commands
            }
            Self::Archipel => vec![
                Invocation::new(&config.task_runner, ".").arg(&config.client_build_task),
            ],
            Self::Export(dest) => {
                let dest = dest.display().to_string();
                vec![
                    Invocation::new("mkdir", ".").args(["-p", dest.as_str()]),
                    Invocation::new("cp", ".").args([
                        "-a".to_string(),
                        format!("{}/.", config.build_output.display()),
                        dest,
                    ]),
                ]
            }
        }
    }
}

/// Everything a step needs to run
pub struct StepContext<'a> {
    pub root: &'a Path,
    pub config: &'a BuildConfig,
    pub runner: &'a mut dyn CommandRunner,
    /// Draw the spinner while commands run
    pub show_spinner: bool,
}

/// Run every command of `step`; stops at the first failure
pub fn run_step(step: &BuildStep, ctx: &mut StepContext<'_>, out: &mut dyn Write) -> Result<()> {
    let label = step.label();
    writeln!(out, "{}{}", Theme::bullet(), label)?;
    out.flush()?;
    info!("step: {}", label);

    let invocations = step.invocations(ctx.root, ctx.config);
    if invocations.is_empty() {
        warn!("{} has nothing to run", label);
    }

    let spinner = if ctx.show_spinner && !ctx.runner.inherits_terminal() {
        Spinner::start(label.clone())
    } else {
        Spinner::disabled()
    };

    let result = invocations.iter().try_for_each(|invocation| {
        debug!("{}: {}", label, invocation);
        ctx.runner.run(invocation)?.ensure_success(&label)
    });

    spinner.stop();

    match result {
        Ok(()) => {
            writeln!(out, "   {}", Theme::success(format!("{}: done", label)))?;
            Ok(())
        }
        Err(e) => {
            writeln!(out, "   {}", Theme::error(format!("{}: failed", label)))?;
            Err(e)
        }
    }
}
