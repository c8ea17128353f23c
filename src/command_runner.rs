//! External command execution
//!
//! Every build tool the bootstrapper calls goes through a `CommandRunner`.
//! `SystemRunner` spawns real processes; `DryRunRunner` only reports what
//! would run. Tests plug in their own recording runners.
//!
//! # Invariants
//!
//! - Success is decided by exit status alone; output is never parsed.
//! - Each invocation carries its own working directory, relative to the
//!   client root. The bootstrapper never changes its own cwd.
//! - Spawned children run in their own process group and are tracked in
//!   `ActiveTool` until they have been reaped.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{BuildError, Result};
use crate::process_guard::{ActiveTool, CommandProcessGroup};

/// One external command: program, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory relative to the client root
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program and arguments joined with spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cwd.as_os_str().is_empty() || self.cwd == Path::new(".") {
            write!(f, "{}", self.command_line())
        } else {
            write!(f, "{} (in {})", self.command_line(), self.cwd.display())
        }
    }
}

/// Exit status of a finished invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code (None if terminated by signal)
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl CommandOutcome {
    pub fn ok() -> Self {
        Self {
            exit_code: Some(0),
            success: true,
        }
    }

    pub fn failed(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            success: false,
        }
    }

    /// Turn a failed outcome into `BuildError::StepFailed`
    pub fn ensure_success(&self, step: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(BuildError::step_failed(step, self.exit_code))
        }
    }
}

/// Seam between the build steps and the operating system
pub trait CommandRunner {
    /// Run one invocation to completion.
    ///
    /// `Err` means the command could not be run at all; a command that ran
    /// and failed is `Ok` with `success == false`.
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutcome>;

    /// True when the wrapped tools write straight to the terminal
    fn inherits_terminal(&self) -> bool {
        false
    }
}

/// Runs invocations as real child processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    root: PathBuf,
    log_file: Option<PathBuf>,
}

impl SystemRunner {
    /// Runner whose children write to the terminal
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_file: None,
        }
    }

    /// Runner that appends children's stdout/stderr to `log_file`
    pub fn with_log_file(root: impl Into<PathBuf>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_file: Some(log_file.into()),
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    fn output_streams(&self, invocation: &Invocation) -> Result<(Stdio, Stdio)> {
        let Some(path) = &self.log_file else {
            return Ok((Stdio::inherit(), Stdio::inherit()));
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "==> {}", invocation)?;
        let stderr = file.try_clone()?;
        Ok((Stdio::from(file), Stdio::from(stderr)))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutcome> {
        let cwd = self.root.join(&invocation.cwd);
        let (stdout, stderr) = self.output_streams(invocation)?;

        info!("exec: {} cwd={}", invocation.command_line(), cwd.display());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .in_new_process_group();

        let mut child = cmd.spawn().map_err(|source| BuildError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
        let pid = child.id();

        ActiveTool::global().set(pid);
        let status = child.wait();
        ActiveTool::global().clear(pid);

        let status = status?;
        debug!("{} exited with {:?}", invocation.program, status.code());

        if status.success() {
            Ok(CommandOutcome::ok())
        } else {
            Ok(CommandOutcome::failed(status.code()))
        }
    }

    fn inherits_terminal(&self) -> bool {
        self.log_file.is_none()
    }
}

/// Prints each invocation instead of running it
#[derive(Debug)]
pub struct DryRunRunner<W: Write> {
    out: W,
    executed: Vec<Invocation>,
}

impl<W: Write> DryRunRunner<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            executed: Vec::new(),
        }
    }

    /// Everything that would have run, in order
    pub fn planned(&self) -> &[Invocation] {
        &self.executed
    }
}

impl<W: Write> CommandRunner for DryRunRunner<W> {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutcome> {
        info!("dry-run: {}", invocation);
        writeln!(self.out, "   [dry-run] {}", invocation)?;
        self.executed.push(invocation.clone());
        Ok(CommandOutcome::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("jake", "Libraries/LPKit").arg("release");
        assert_eq!(inv.command_line(), "jake release");
        assert_eq!(inv.to_string(), "jake release (in Libraries/LPKit)");

        let inv = Invocation::new("git", ".").args(["submodule", "update"]);
        assert_eq!(inv.to_string(), "git submodule update");
    }

    #[test]
    fn test_outcome_ensure_success() {
        assert!(CommandOutcome::ok().ensure_success("Building TNKit").is_ok());

        let err = CommandOutcome::failed(Some(3))
            .ensure_success("Building TNKit")
            .unwrap_err();
        assert!(matches!(err, BuildError::StepFailed { code: Some(3), .. }));
    }

    #[test]
    fn test_system_runner_reports_exit_codes() {
        let dir = tempdir().unwrap();
        let mut runner = SystemRunner::new(dir.path());

        let ok = runner.run(&Invocation::new("true", ".")).unwrap();
        assert!(ok.success);

        let failed = runner
            .run(&Invocation::new("sh", ".").args(["-c", "exit 7"]))
            .unwrap();
        assert_eq!(failed, CommandOutcome::failed(Some(7)));
    }

    #[test]
    fn test_system_runner_uses_invocation_cwd() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Libraries/TNKit")).unwrap();
        let mut runner = SystemRunner::new(dir.path());

        let outcome = runner
            .run(&Invocation::new("sh", "Libraries/TNKit").args(["-c", "touch built"]))
            .unwrap();

        assert!(outcome.success);
        assert!(dir.path().join("Libraries/TNKit/built").exists());
    }

    #[test]
    fn test_system_runner_missing_program() {
        let dir = tempdir().unwrap();
        let mut runner = SystemRunner::new(dir.path());
        let err = runner
            .run(&Invocation::new("definitely-not-a-real-tool-4242", "."))
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }

    #[test]
    fn test_system_runner_log_file_collects_output() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("logs/bootstrap.log");
        let mut runner = SystemRunner::with_log_file(dir.path(), &log);
        assert!(!runner.inherits_terminal());

        runner
            .run(&Invocation::new("sh", ".").args(["-c", "echo out; echo err >&2"]))
            .unwrap();

        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains("==> sh -c"));
        assert!(content.contains("out"));
        assert!(content.contains("err"));
    }

    #[test]
    fn test_dry_run_runs_nothing() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("touched");
        let mut runner = DryRunRunner::new(Vec::new());

        let inv = Invocation::new("touch", ".").arg(marker.display().to_string());
        assert!(runner.run(&inv).unwrap().success);

        assert!(!marker.exists());
        assert_eq!(runner.planned(), &[inv]);
    }
}
