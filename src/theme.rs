//! Centralized colors for terminal output
//!
//! Every colored string the bootstrapper prints goes through here so the
//! palette stays consistent. With colors switched off (stdout or stderr is not
//! a terminal) the text is written bare, without any escape sequences.
//!
//! # Usage
//! ```rust
//! use archipel_bootstrap::theme::Theme;
//!
//! println!("{} Building LPKit", Theme::bullet());
//! println!("{}", Theme::success("LPKit built"));
//! ```

use crossterm::style::{style, Color, StyledContent, Stylize};
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicBool, Ordering};

static COLORS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Core color palette
pub struct Colors;

impl Colors {
    /// Section headings
    pub const HEADING: Color = Color::Cyan;

    /// Success messages, highlighted default answers
    pub const SUCCESS: Color = Color::Green;

    /// Warnings and re-ask messages
    pub const WARNING: Color = Color::Yellow;

    /// Fatal diagnostics
    pub const ERROR: Color = Color::Red;
}

/// Styled text that renders plain while colors are off
pub struct Painted<D: Display>(StyledContent<D>);

impl<D: Display> Display for Painted<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if COLORS_ENABLED.load(Ordering::Relaxed) {
            Display::fmt(&self.0, f)
        } else {
            Display::fmt(self.0.content(), f)
        }
    }
}

/// Semantic styles built from the palette
pub struct Theme;

impl Theme {
    pub fn heading<D: Display>(text: D) -> Painted<D> {
        Painted(style(text).with(Colors::HEADING).bold())
    }

    pub fn success<D: Display>(text: D) -> Painted<D> {
        Painted(style(text).with(Colors::SUCCESS))
    }

    pub fn default_answer<D: Display>(text: D) -> Painted<D> {
        Painted(style(text).with(Colors::SUCCESS))
    }

    pub fn warning<D: Display>(text: D) -> Painted<D> {
        Painted(style(text).with(Colors::WARNING))
    }

    pub fn error<D: Display>(text: D) -> Painted<D> {
        Painted(style(text).with(Colors::ERROR).bold())
    }

    /// Prefix for status and prompt lines
    pub fn bullet() -> Painted<&'static str> {
        Painted(" * ".with(Colors::HEADING))
    }

    /// Force colors on or off, overriding terminal detection
    pub fn set_colors_enabled(enabled: bool) {
        COLORS_ENABLED.store(enabled, Ordering::Relaxed);
        crossterm::style::force_color_output(enabled);
    }
}
