//! Centralized theme and styling for the selector
//!
//! Single source of truth for the colors, styles and fixed strings used by
//! the selector screen and the install summary.
//!
//! # Usage
//! ```rust
//! use klipkit::theme::{Colors, Styles};
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! ```

use ratatui::style::{Color, Modifier, Style};

use crate::logic::InstallStatus;

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette
pub struct Colors;

impl Colors {
    /// Panel background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Secondary/muted text color
    pub const FG_SECONDARY: Color = Color::Gray;

    /// Hints and counters
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Borders and title
    pub const PRIMARY: Color = Color::Cyan;

    /// Category header color
    pub const CATEGORY: Color = Color::Yellow;

    /// Cursor row highlight
    pub const CURSOR_BG: Color = Color::Cyan;

    /// Cursor row text (for contrast on cyan bg)
    pub const CURSOR_FG: Color = Color::Black;

    /// Checked entries
    pub const CHECKED: Color = Color::Green;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for the selector screen
pub struct Styles;

impl Styles {
    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn subtitle() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Category header (yellow, bold)
    pub fn category() -> Style {
        Style::default()
            .fg(Colors::CATEGORY)
            .add_modifier(Modifier::BOLD)
    }

    /// Entry row, by checked state
    pub fn entry(checked: bool) -> Style {
        if checked {
            Style::default().fg(Colors::CHECKED)
        } else {
            Style::default().fg(Colors::FG_PRIMARY)
        }
    }

    /// Description text after the entry name
    pub fn description() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Highlight applied on top of the cursor row
    pub fn cursor() -> Style {
        Style::default()
            .fg(Colors::CURSOR_FG)
            .bg(Colors::CURSOR_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key-help footer and counter
    pub fn hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn border() -> Style {
        Style::default().fg(Colors::PRIMARY)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }
}

// =============================================================================
// TEXT CONSTANTS
// =============================================================================

/// Fixed UI strings
pub struct UiText;

impl UiText {
    pub const TITLE: &'static str = "3D Printer Component Installer";
    pub const SUBTITLE: &'static str = "Select components to install";

    pub const CHECKED: &'static str = "[X]";
    pub const UNCHECKED: &'static str = "[ ]";

    /// Marker appended to truncated descriptions
    pub const ELLIPSIS: &'static str = "...";

    /// Summary glyph for an install outcome
    pub fn status_icon(status: InstallStatus) -> &'static str {
        match status {
            InstallStatus::Applied => "✓",
            InstallStatus::Failed => "✗",
            InstallStatus::Skipped => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_icons_are_distinct() {
        let icons = [
            UiText::status_icon(InstallStatus::Applied),
            UiText::status_icon(InstallStatus::Skipped),
            UiText::status_icon(InstallStatus::Failed),
        ];
        assert_ne!(icons[0], icons[1]);
        assert_ne!(icons[1], icons[2]);
        assert_ne!(icons[0], icons[2]);
    }

    #[test]
    fn test_entry_style_reflects_checked() {
        assert_ne!(Styles::entry(true), Styles::entry(false));
        assert_eq!(Styles::cursor().bg, Some(Colors::CURSOR_BG));
    }
}
