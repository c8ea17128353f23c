//! Installation flow
//!
//! Two ways in, one way through:
//!
//! 1. Pre-flight command checks.
//! 2. The properties mapping, either asked interactively (ending with a
//!    confirmation the operator may decline) or taken from flags.
//! 3. Submodule initialization on first run.
//! 4. The base framework (built, or checked for), then every enabled step in
//!    fixed order: libraries, apply frameworks, client build, export.
//!
//! The first failure ends the run. Nothing is retried or rolled back.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::info;

use crate::command_runner::CommandRunner;
use crate::config_file::BuildConfig;
use crate::error::{BuildError, Result};
use crate::prompt::{self, Prompter};
use crate::properties::InstallProperties;
use crate::sanity::{self, SearchPath};
use crate::steps::{self, BuildStep, StepContext};
use crate::theme::Theme;
use crate::types::{Library, Severity};

/// Export destination offered when the operator just presses Enter
pub const DEFAULT_EXPORT_PATH: &str = "./Archipel";

/// How the properties mapping is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    NonInteractive(InstallProperties),
}

/// How a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Operator declined the final confirmation, or input ended first
    Cancelled,
}

impl RunOutcome {
    /// Both outcomes are a clean exit
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// Ask every question of the interactive flow.
///
/// Returns `None` when the operator declines the final confirmation. Input
/// ending early is an `UnexpectedEof` IO error.
pub fn collect_interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<Option<InstallProperties>> {
    let mut props = InstallProperties::default();

    prompter.say(Theme::heading("Archipel bootstrap"))?;
    props.cappuccino =
        prompter.ask_bool("Do you want to build and install Cappuccino?", Some("n"))?;

    for lib in Library::all() {
        let enabled = prompter.ask_bool(&format!("Do you want to build {}?", lib), Some("y"))?;
        props.set_library(lib, enabled);
    }

    props.apply_frameworks =
        prompter.ask_bool("Do you want to apply Cappuccino frameworks to Archipel?", Some("y"))?;
    props.archipel = prompter.ask_bool("Do you want to build Archipel?", Some("y"))?;

    if prompter.ask_bool("Do you want to export Archipel?", Some("n"))? {
        let path = prompter.ask(
            "Where do you want to export Archipel?",
            None,
            Some(DEFAULT_EXPORT_PATH),
        )?;
        props.export = Some(PathBuf::from(path));
        if !props.apply_frameworks {
            prompter.say(Theme::warning(
                "   Exporting needs the frameworks applied, enabling it.",
            ))?;
        }
        props.apply_export_rule();
    }

    print_summary(prompter.writer(), &props)?;

    if prompter.ask_bool("Proceed with these settings?", Some("y"))? {
        Ok(Some(props))
    } else {
        Ok(None)
    }
}

fn print_summary(out: &mut dyn Write, props: &InstallProperties) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", Theme::heading("Summary"))?;
    for line in props.summary() {
        writeln!(out, "   {}", line)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Build steps for `props`, in execution order.
///
/// The base framework check is not a step; see `Bootstrap::execute`.
pub fn plan(props: &InstallProperties) -> Vec<BuildStep> {
    let mut steps = Vec::new();
    if props.cappuccino {
        steps.push(BuildStep::Cappuccino);
    }
    steps.extend(props.enabled_libraries().into_iter().map(BuildStep::Library));
    if props.apply_frameworks {
        steps.push(BuildStep::ApplyFrameworks);
    }
    if props.archipel {
        steps.push(BuildStep::Archipel);
    }
    if let Some(dest) = &props.export {
        let dest = std::path::absolute(dest).unwrap_or_else(|_| dest.clone());
        steps.push(BuildStep::Export(dest));
    }
    steps
}

/// One bootstrap run against a client tree
pub struct Bootstrap<'a> {
    pub root: PathBuf,
    pub config: BuildConfig,
    pub search_path: SearchPath,
    pub runner: &'a mut dyn CommandRunner,
    pub show_spinner: bool,
    /// Write the submodule marker after a successful update
    pub write_marker: bool,
}

impl Bootstrap<'_> {
    /// Run the whole flow
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mode: Mode,
        prompter: &mut Prompter<R, W>,
    ) -> Result<RunOutcome> {
        sanity::check_environment(&self.search_path, &self.config, prompter.writer())?;

        let props = match mode {
            Mode::NonInteractive(props) => {
                print_summary(prompter.writer(), &props)?;
                props
            }
            Mode::Interactive => {
                let answered = match collect_interactive(prompter) {
                    Ok(answered) => answered,
                    Err(BuildError::Io(e)) if prompt::is_input_closed(&e) => {
                        info!("input closed before confirmation");
                        None
                    }
                    Err(e) => return Err(e),
                };
                let Some(props) = answered else {
                    info!("operator cancelled at confirmation");
                    prompter.say(format!("{}Canceled. Bye.", Theme::bullet()))?;
                    return Ok(RunOutcome::Cancelled);
                };
                props
            }
        };

        if sanity::ensure_submodules(&self.root, &self.config, self.runner, self.write_marker)? {
            prompter.say(format!("{}Submodules initialized", Theme::bullet()))?;
        }

        self.execute(&props, prompter.writer())?;

        prompter.say(Theme::success("All done."))?;
        Ok(RunOutcome::Completed)
    }

    /// Base framework check or build, then every planned step
    pub fn execute(&mut self, props: &InstallProperties, out: &mut dyn Write) -> Result<()> {
        if !props.cappuccino {
            writeln!(out, "{}Checking for an installed Cappuccino", Theme::bullet())?;
            sanity::require_command(
                &self.search_path,
                &self.config.framework_tool,
                Severity::Fatal,
                out,
            )?;
        }

        let steps = plan(props);
        info!("{} build step(s) planned", steps.len());

        let mut ctx = StepContext {
            root: &self.root,
            config: &self.config,
            runner: &mut *self.runner,
            show_spinner: self.show_spinner,
        };
        for step in &steps {
            steps::run_step(step, &mut ctx, out)?;
        }
        Ok(())
    }
}
