//! Pre-flight checks
//!
//! Verifies the external tools are installed before anything is built, and
//! fetches git submodules the first time the bootstrapper runs in a tree.
//! Submodules are fetched once; the marker file records that they were.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::command_runner::{CommandRunner, Invocation};
use crate::config_file::BuildConfig;
use crate::error::{BuildError, Result};
use crate::theme::Theme;
use crate::types::Severity;

/// Where to look for executables
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    /// `None` means the process `PATH`
    paths: Option<OsString>,
}

impl SearchPath {
    /// Search the process `PATH`
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Search an explicit `PATH`-style list instead of the environment
    pub fn custom(paths: impl Into<OsString>) -> Self {
        Self {
            paths: Some(paths.into()),
        }
    }

    /// Full path of `name`, if it resolves to an executable
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        match &self.paths {
            None => which::which(name).ok(),
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd).ok()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }
}

/// Check if a command is available in the process `PATH`
pub fn command_exists(name: &str) -> bool {
    SearchPath::from_env().contains(name)
}

/// Check for a command; a miss is fatal or a printed warning per `severity`.
///
/// Returns whether the command was found.
pub fn require_command(
    search: &SearchPath,
    name: &str,
    severity: Severity,
    out: &mut dyn Write,
) -> Result<bool> {
    if let Some(path) = search.locate(name) {
        debug!("found {} at {}", name, path.display());
        return Ok(true);
    }

    match severity {
        Severity::Fatal => Err(BuildError::missing_command(name)),
        Severity::Warning => {
            warn!("optional command {} not found", name);
            writeln!(
                out,
                "{}{}",
                Theme::bullet(),
                Theme::warning(format!("`{}` is not installed. Some steps may fail.", name))
            )?;
            Ok(false)
        }
    }
}

/// Run `require_command` for every pre-flight command of the layout
pub fn check_environment(
    search: &SearchPath,
    config: &BuildConfig,
    out: &mut dyn Write,
) -> Result<()> {
    for (name, severity) in config.preflight_commands() {
        require_command(search, name, severity, out)?;
    }
    info!("pre-flight checks passed");
    Ok(())
}

/// The command that fetches every submodule of the client tree
pub fn submodule_invocation(config: &BuildConfig) -> Invocation {
    Invocation::new(&config.git, ".").args(["submodule", "update", "--init", "--recursive"])
}

/// Fetch submodules unless the marker says it was already done.
///
/// Returns `true` when the update ran. With `write_marker == false` (dry
/// run) the marker is left untouched.
pub fn ensure_submodules(
    root: &Path,
    config: &BuildConfig,
    runner: &mut dyn CommandRunner,
    write_marker: bool,
) -> Result<bool> {
    let marker = root.join(&config.submodule_marker);
    if marker.exists() {
        debug!("submodule marker {} present, skipping update", marker.display());
        return Ok(false);
    }

    let invocation = submodule_invocation(config);
    info!("initializing submodules: {}", invocation);
    runner
        .run(&invocation)?
        .ensure_success("Updating git submodules")?;

    if write_marker {
        fs::write(&marker, b"")?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_runner::CommandOutcome;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    struct Recorder {
        calls: Vec<Invocation>,
        exit_code: i32,
    }

    impl CommandRunner for Recorder {
        fn run(&mut self, invocation: &Invocation) -> Result<CommandOutcome> {
            self.calls.push(invocation.clone());
            Ok(if self.exit_code == 0 {
                CommandOutcome::ok()
            } else {
                CommandOutcome::failed(Some(self.exit_code))
            })
        }
    }

    fn fake_tool(dir: &Path, name: &str) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_command_exists_sh() {
        assert!(command_exists("sh"));
        assert!(!command_exists("this_binary_definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_custom_search_path() {
        let bin = tempdir().unwrap();
        fake_tool(bin.path(), "jake");

        let search = SearchPath::custom(bin.path());
        assert!(search.contains("jake"));
        assert!(!search.contains("capp"));
    }

    #[test]
    fn test_require_command_fatal() {
        let bin = tempdir().unwrap();
        let search = SearchPath::custom(bin.path());
        let mut out = Vec::new();

        let err = require_command(&search, "jake", Severity::Fatal, &mut out).unwrap_err();
        assert!(matches!(err, BuildError::MissingCommand { ref name } if name == "jake"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_require_command_warning_continues() {
        let bin = tempdir().unwrap();
        let search = SearchPath::custom(bin.path());
        let mut out = Vec::new();

        let found = require_command(&search, "capp", Severity::Warning, &mut out).unwrap();
        assert!(!found);
        assert!(String::from_utf8(out).unwrap().contains("`capp` is not installed"));
    }

    #[test]
    fn test_check_environment_only_fails_on_required() {
        let bin = tempdir().unwrap();
        fake_tool(bin.path(), "git");
        fake_tool(bin.path(), "jake");
        let search = SearchPath::custom(bin.path());

        let mut out = Vec::new();
        check_environment(&search, &BuildConfig::default(), &mut out).unwrap();

        std::fs::remove_file(bin.path().join("jake")).unwrap();
        let err = check_environment(&search, &BuildConfig::default(), &mut out).unwrap_err();
        assert!(matches!(err, BuildError::MissingCommand { .. }));
    }

    #[test]
    fn test_marker_present_skips_update() {
        let root = tempdir().unwrap();
        let config = BuildConfig::default();
        fs::write(root.path().join(&config.submodule_marker), b"").unwrap();
        let mut runner = Recorder { calls: vec![], exit_code: 0 };

        let ran = ensure_submodules(root.path(), &config, &mut runner, true).unwrap();

        assert!(!ran);
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_first_run_updates_and_writes_marker() {
        let root = tempdir().unwrap();
        let config = BuildConfig::default();
        let mut runner = Recorder { calls: vec![], exit_code: 0 };

        assert!(ensure_submodules(root.path(), &config, &mut runner, true).unwrap());

        assert_eq!(runner.calls, vec![submodule_invocation(&config)]);
        assert_eq!(
            runner.calls[0].command_line(),
            "git submodule update --init --recursive"
        );
        assert!(root.path().join(".submodules_updated").exists());
    }

    #[test]
    fn test_failed_update_leaves_no_marker() {
        let root = tempdir().unwrap();
        let config = BuildConfig::default();
        let mut runner = Recorder { calls: vec![], exit_code: 128 };

        let err = ensure_submodules(root.path(), &config, &mut runner, true).unwrap_err();

        assert!(matches!(err, BuildError::StepFailed { code: Some(128), .. }));
        assert!(!root.path().join(".submodules_updated").exists());
    }

    #[test]
    fn test_dry_run_does_not_write_marker() {
        let root = tempdir().unwrap();
        let config = BuildConfig::default();
        let mut runner = Recorder { calls: vec![], exit_code: 0 };

        assert!(ensure_submodules(root.path(), &config, &mut runner, false).unwrap());
        assert!(!root.path().join(".submodules_updated").exists());
    }
}
