//! Type-safe names for the things the bootstrapper builds
//!
//! Library names double as directory names under `Libraries/`, so they are
//! enums rather than strings scattered through the code.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Bundled Cappuccino library that can be built on its own.
///
/// Iteration order is the build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum Library {
    #[strum(to_string = "GrowlCappuccino", serialize = "growlcappuccino")]
    GrowlCappuccino,
    #[strum(to_string = "VNCCappuccino", serialize = "vnccappuccino")]
    VncCappuccino,
    #[strum(to_string = "StropheCappuccino", serialize = "strophecappuccino")]
    StropheCappuccino,
    #[strum(to_string = "LPKit", serialize = "lpkit")]
    LpKit,
    #[strum(to_string = "TNKit", serialize = "tnkit")]
    TnKit,
}

impl Library {
    /// Directory name under `Libraries/` and name of the built framework
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::GrowlCappuccino => "GrowlCappuccino",
            Self::VncCappuccino => "VNCCappuccino",
            Self::StropheCappuccino => "StropheCappuccino",
            Self::LpKit => "LPKit",
            Self::TnKit => "TNKit",
        }
    }

    /// Lowercase key used by CLI flags and the properties summary
    pub fn key(&self) -> &'static str {
        match self {
            Self::GrowlCappuccino => "growlcappuccino",
            Self::VncCappuccino => "vnccappuccino",
            Self::StropheCappuccino => "strophecappuccino",
            Self::LpKit => "lpkit",
            Self::TnKit => "tnkit",
        }
    }

    /// All libraries in build order
    pub fn all() -> impl Iterator<Item = Library> {
        Self::iter()
    }
}

/// What to do when a pre-flight command check fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Abort the run
    #[default]
    Fatal,
    /// Print a warning and keep going
    Warning,
}
