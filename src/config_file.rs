//! Build layout loading
//!
//! The layout says where the client tree keeps its libraries, frameworks and
//! build output, and which external tools to call. The defaults describe the
//! stock Archipel client; a JSON file can override any subset of fields.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Library, Severity};

/// Build layout of an Archipel client tree
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    // Tree layout, relative to the client root
    pub libraries_dir: PathBuf,
    pub frameworks_dir: PathBuf,
    pub build_output: PathBuf,
    pub submodule_marker: PathBuf,

    // External tools
    pub task_runner: String,
    pub framework_tool: String,
    pub git: String,

    // Task names passed to the task runner
    pub cappuccino_build_task: String,
    pub library_build_task: String,
    pub client_build_task: String,

    // Pre-flight
    pub required_commands: Vec<String>,
    pub optional_commands: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            libraries_dir: PathBuf::from("Libraries"),
            frameworks_dir: PathBuf::from("Frameworks"),
            build_output: PathBuf::from("Build/Release/Archipel"),
            submodule_marker: PathBuf::from(".submodules_updated"),
            task_runner: "jake".to_string(),
            framework_tool: "capp".to_string(),
            git: "git".to_string(),
            cappuccino_build_task: "install".to_string(),
            library_build_task: "release".to_string(),
            client_build_task: "release".to_string(),
            required_commands: vec!["git".to_string(), "jake".to_string()],
            optional_commands: vec!["capp".to_string()],
        }
    }
}

impl BuildConfig {
    /// Load the layout from a JSON file; absent fields keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read build layout from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse build layout JSON")?;

        Ok(config)
    }

    /// Validate the layout
    pub fn validate(&self) -> Result<()> {
        for (field, path) in [
            ("libraries_dir", &self.libraries_dir),
            ("frameworks_dir", &self.frameworks_dir),
            ("build_output", &self.build_output),
            ("submodule_marker", &self.submodule_marker),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{} must not be empty", field);
            }
        }

        for (field, value) in [
            ("task_runner", &self.task_runner),
            ("framework_tool", &self.framework_tool),
            ("git", &self.git),
            ("cappuccino_build_task", &self.cappuccino_build_task),
            ("library_build_task", &self.library_build_task),
            ("client_build_task", &self.client_build_task),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", field);
            }
        }

        if let Some(blank) = self
            .required_commands
            .iter()
            .chain(&self.optional_commands)
            .find(|c| c.trim().is_empty())
        {
            anyhow::bail!("command names must not be blank (got {:?})", blank);
        }

        Ok(())
    }

    /// Every pre-flight command paired with what a miss means
    pub fn preflight_commands(&self) -> Vec<(&str, Severity)> {
        self.required_commands
            .iter()
            .map(|c| (c.as_str(), Severity::Fatal))
            .chain(
                self.optional_commands
                    .iter()
                    .map(|c| (c.as_str(), Severity::Warning)),
            )
            .collect()
    }

    /// Source directory of the Cappuccino framework itself
    pub fn cappuccino_dir(&self) -> PathBuf {
        self.libraries_dir.join("Cappuccino")
    }

    /// Source directory of a bundled library
    pub fn library_dir(&self, lib: Library) -> PathBuf {
        self.libraries_dir.join(lib.dir_name())
    }

    /// Where a library's `release` task leaves its framework
    pub fn library_output(&self, lib: Library) -> PathBuf {
        self.library_dir(lib)
            .join("Build")
            .join("Release")
            .join(lib.dir_name())
    }
}
