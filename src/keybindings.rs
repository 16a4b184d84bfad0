//! Keyboard bindings for the component selector
//!
//! Maps crossterm key events onto [`SelectorInput`]s and produces the key-help
//! footer from the same table, so the help text cannot drift from the actual
//! bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::selection::SelectorInput;

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub input: SelectorInput,
    /// Key label shown in the footer. Aliases leave this empty.
    pub display: &'static str,
    pub description: &'static str,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(
        key: KeyCode,
        input: SelectorInput,
        display: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            input,
            display,
            description,
        }
    }

    /// Alternative key for an input that already has a labelled binding
    pub fn alias(key: KeyCode, input: SelectorInput) -> Self {
        Self::new(key, input, "", "")
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(key: KeyCode, modifiers: KeyModifiers, input: SelectorInput) -> Self {
        Self {
            modifiers,
            ..Self::alias(key, input)
        }
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        // Shift is implied by the character itself ('A' vs 'a')
        let modifiers = match key.code {
            KeyCode::Char(_) => key.modifiers.difference(KeyModifiers::SHIFT),
            _ => key.modifiers,
        };
        self.key == key.code && self.modifiers == modifiers
    }
}

/// Footer rows: navigation/selection on the first, finishing on the second
const FOOTER_ROWS: [&[SelectorInput]; 2] = [
    &[
        SelectorInput::Up,
        SelectorInput::Toggle,
        SelectorInput::SelectAll,
        SelectorInput::SelectNone,
    ],
    &[SelectorInput::Confirm, SelectorInput::Cancel],
];

/// The selector's key table
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<Keybinding>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::selector()
    }
}

impl Keymap {
    pub fn selector() -> Self {
        use SelectorInput::*;
        Self {
            bindings: vec![
                Keybinding::new(KeyCode::Up, Up, "↑/↓", "Navigate"),
                Keybinding::alias(KeyCode::Down, Down),
                Keybinding::alias(KeyCode::Char('k'), Up),
                Keybinding::alias(KeyCode::Char('j'), Down),
                Keybinding::new(KeyCode::Char(' '), Toggle, "SPACE", "Toggle"),
                Keybinding::new(KeyCode::Char('a'), SelectAll, "A", "Select All"),
                Keybinding::alias(KeyCode::Char('A'), SelectAll),
                Keybinding::new(KeyCode::Char('n'), SelectNone, "N", "Deselect All"),
                Keybinding::alias(KeyCode::Char('N'), SelectNone),
                Keybinding::new(KeyCode::Enter, Confirm, "ENTER", "Confirm and Install"),
                Keybinding::new(KeyCode::Char('q'), Cancel, "Q/ESC", "Cancel"),
                Keybinding::alias(KeyCode::Char('Q'), Cancel),
                Keybinding::alias(KeyCode::Esc, Cancel),
                Keybinding::with_modifiers(KeyCode::Char('c'), KeyModifiers::CONTROL, Cancel),
            ],
        }
    }

    /// Translate a key event. Releases and unknown keys become `Unbound`.
    pub fn resolve(&self, key: &KeyEvent) -> SelectorInput {
        if key.kind != KeyEventKind::Press {
            return SelectorInput::Unbound;
        }
        self.bindings
            .iter()
            .find(|b| b.matches(key))
            .map(|b| b.input)
            .unwrap_or(SelectorInput::Unbound)
    }

    /// Labelled binding for `input`, if any
    fn labelled(&self, input: SelectorInput) -> Option<&Keybinding> {
        self.bindings
            .iter()
            .find(|b| b.input == input && !b.display.is_empty())
    }

    /// Key-help lines for the selector footer
    pub fn footer_lines(&self) -> Vec<String> {
        FOOTER_ROWS
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|&input| self.labelled(input))
                    .map(|b| format!("{}: {}", b.display, b.description))
                    .collect::<Vec<_>>()
                    .join("   ")
            })
            .collect()
    }
}
