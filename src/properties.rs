//! The properties mapping: which build steps run, and where to export.
//!
//! Built once per run, either from prompts or from command-line flags, and
//! consumed by the orchestrator.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::types::Library;

/// Enabled/disabled state of every install step plus the export destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallProperties {
    pub cappuccino: bool,
    pub growlcappuccino: bool,
    pub vnccappuccino: bool,
    pub strophecappuccino: bool,
    pub lpkit: bool,
    pub tnkit: bool,
    pub apply_frameworks: bool,
    pub archipel: bool,
    pub export: Option<PathBuf>,
}

impl InstallProperties {
    /// Build the mapping from non-interactive flags.
    ///
    /// Exporting needs the frameworks applied, so `--export` forces
    /// `apply_frameworks` on.
    pub fn from_cli(cli: &Cli) -> Self {
        let mut props = Self {
            cappuccino: cli.cappuccino,
            growlcappuccino: cli.growlcappuccino,
            vnccappuccino: cli.vnccappuccino,
            strophecappuccino: cli.strophecappuccino,
            lpkit: cli.lpkit,
            tnkit: cli.tnkit,
            apply_frameworks: false,
            archipel: cli.archipel,
            export: cli.export.clone(),
        };
        props.apply_export_rule();
        props
    }

    /// Force `apply_frameworks` when an export path is set
    pub fn apply_export_rule(&mut self) {
        if self.export.is_some() {
            self.apply_frameworks = true;
        }
    }

    pub fn library_enabled(&self, lib: Library) -> bool {
        match lib {
            Library::GrowlCappuccino => self.growlcappuccino,
            Library::VncCappuccino => self.vnccappuccino,
            Library::StropheCappuccino => self.strophecappuccino,
            Library::LpKit => self.lpkit,
            Library::TnKit => self.tnkit,
        }
    }

    pub fn set_library(&mut self, lib: Library, enabled: bool) {
        let slot = match lib {
            Library::GrowlCappuccino => &mut self.growlcappuccino,
            Library::VncCappuccino => &mut self.vnccappuccino,
            Library::StropheCappuccino => &mut self.strophecappuccino,
            Library::LpKit => &mut self.lpkit,
            Library::TnKit => &mut self.tnkit,
        };
        *slot = enabled;
    }

    /// Libraries to build, in build order
    pub fn enabled_libraries(&self) -> Vec<Library> {
        Library::all().filter(|l| self.library_enabled(*l)).collect()
    }

    /// True when anything beyond the base framework check will run
    pub fn any_step_enabled(&self) -> bool {
        self.cappuccino
            || !self.enabled_libraries().is_empty()
            || self.apply_frameworks
            || self.archipel
            || self.export.is_some()
    }

    /// One `key: value` line per entry, in execution order
    pub fn summary(&self) -> Vec<String> {
        let yes_no = |b: bool| if b { "yes" } else { "no" };

        let mut lines = vec![format!("cappuccino: {}", yes_no(self.cappuccino))];
        lines.extend(
            Library::all().map(|l| format!("{}: {}", l.key(), yes_no(self.library_enabled(l)))),
        );
        lines.push(format!("apply_frameworks: {}", yes_no(self.apply_frameworks)));
        lines.push(format!("archipel: {}", yes_no(self.archipel)));
        lines.push(match &self.export {
            Some(path) => format!("export: {}", path.display()),
            None => "export: no".to_string(),
        });
        lines
    }
}
