//! Selection State Machine
//!
//! Models the interactive selector as an explicit finite-state machine. Every
//! transition takes the current snapshot by reference and returns a new one,
//! so the renderer only ever sees complete states and the transition table can
//! be tested without a terminal.
//!
//! # Modes
//!
//! ```text
//! Browsing ──Enter──▶ Confirmed   (terminal)
//!     │
//!     └──Q / Esc───▶ Cancelled   (terminal, selection cleared)
//! ```
//!
//! Inputs received outside `Browsing` are ignored, so a finished session can
//! never re-enter `Browsing`.

use std::collections::BTreeSet;
use std::fmt;

use crate::registry::Component;

/// Selector mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorMode {
    /// Operator is moving the cursor and toggling entries
    Browsing,
    /// Selection frozen and handed to the orchestrator (terminal)
    Confirmed,
    /// Operator quit; nothing will be installed (terminal)
    Cancelled,
}

impl SelectorMode {
    /// Returns true for `Confirmed` and `Cancelled`
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for SelectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Browsing => "browsing",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Abstract selector inputs, decoupled from any terminal key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorInput {
    Up,
    Down,
    Toggle,
    SelectAll,
    SelectNone,
    Confirm,
    Cancel,
    /// Any key without a binding. Always a no-op.
    Unbound,
}

/// Immutable snapshot of the selector.
///
/// `entries` borrows the registry table; the snapshot itself is cheap to
/// clone, which is what every transition does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState<'r> {
    entries: &'r [Component],
    cursor: usize,
    selected: BTreeSet<&'r str>,
    mode: SelectorMode,
}

impl<'r> SelectionState<'r> {
    /// Start browsing with nothing selected and the cursor on the first entry.
    pub fn new(entries: &'r [Component]) -> Self {
        Self {
            entries,
            cursor: 0,
            selected: BTreeSet::new(),
            mode: SelectorMode::Browsing,
        }
    }

    /// Start browsing with the given slugs pre-selected.
    ///
    /// Slugs that are not among `entries` are dropped.
    pub fn with_selected<S: AsRef<str>>(
        entries: &'r [Component],
        initial: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut state = Self::new(entries);
        for slug in initial {
            if let Some(entry) = entries.iter().find(|c| c.slug == slug.as_ref()) {
                state.selected.insert(entry.slug.as_str());
            }
        }
        state
    }

    pub fn entries(&self) -> &'r [Component] {
        self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> SelectorMode {
        self.mode
    }

    pub fn is_selected(&self, slug: &str) -> bool {
        self.selected.contains(slug)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Currently selected slugs, sorted
    pub fn selected(&self) -> impl Iterator<Item = &'r str> + '_ {
        self.selected.iter().copied()
    }

    /// The component under the cursor, if there are any entries
    pub fn current(&self) -> Option<&'r Component> {
        self.entries.get(self.cursor)
    }

    /// The frozen selection, available only once the operator confirmed.
    pub fn confirmed_selection(&self) -> Option<BTreeSet<String>> {
        (self.mode == SelectorMode::Confirmed)
            .then(|| self.selected.iter().map(|s| s.to_string()).collect())
    }

    /// Apply one input and return the resulting snapshot.
    #[must_use]
    pub fn apply(&self, input: SelectorInput) -> Self {
        let mut next = self.clone();
        if self.mode.is_terminal() {
            return next;
        }

        match input {
            SelectorInput::Up => {
                next.cursor = self.cursor.saturating_sub(1);
            }
            SelectorInput::Down => {
                if self.cursor + 1 < self.entries.len() {
                    next.cursor = self.cursor + 1;
                }
            }
            SelectorInput::Toggle => {
                if let Some(entry) = self.current() {
                    let slug = entry.slug.as_str();
                    if !next.selected.remove(slug) {
                        next.selected.insert(slug);
                    }
                }
            }
            SelectorInput::SelectAll => {
                next.selected = self.entries.iter().map(|c| c.slug.as_str()).collect();
            }
            SelectorInput::SelectNone => {
                next.selected.clear();
            }
            SelectorInput::Confirm => {
                next.mode = SelectorMode::Confirmed;
            }
            SelectorInput::Cancel => {
                next.mode = SelectorMode::Cancelled;
                next.selected.clear();
            }
            SelectorInput::Unbound => {}
        }
        next
    }

    /// Apply a sequence of inputs in order.
    #[must_use]
    pub fn apply_all(&self, inputs: impl IntoIterator<Item = SelectorInput>) -> Self {
        inputs
            .into_iter()
            .fold(self.clone(), |state, input| state.apply(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentRegistry;
    use SelectorInput::*;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::builtin().unwrap()
    }

    #[test]
    fn test_initial_state() {
        let registry = registry();
        let state = SelectionState::new(registry.list());
        assert_eq!(state.mode(), SelectorMode::Browsing);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_with_selected_drops_unknown_slugs() {
        let registry = registry();
        let state = SelectionState::with_selected(registry.list(), ["kamp", "octoprint"]);
        assert_eq!(state.selected().collect::<Vec<_>>(), vec!["kamp"]);
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let registry = registry();
        let state = SelectionState::new(registry.list());
        assert_eq!(state.apply(Up).cursor(), 0);

        let bottom = state.apply_all(std::iter::repeat(Down).take(50));
        assert_eq!(bottom.cursor(), registry.len() - 1);
        assert_eq!(bottom.apply(Down).cursor(), registry.len() - 1);
        assert_eq!(bottom.apply(Up).cursor(), registry.len() - 2);
    }

    #[test]
    fn test_toggle_current_entry() {
        let registry = registry();
        let state = SelectionState::new(registry.list()).apply_all([Down, Toggle]);
        assert!(state.is_selected("mainsail"));
        assert_eq!(state.selected_count(), 1);

        let state = state.apply(Toggle);
        assert!(!state.is_selected("mainsail"));
    }

    #[test]
    fn test_select_all_and_none() {
        let registry = registry();
        let state = SelectionState::new(registry.list()).apply(SelectAll);
        assert_eq!(state.selected_count(), registry.len());
        assert_eq!(state.apply(SelectNone).selected_count(), 0);
    }

    #[test]
    fn test_confirm_freezes_selection() {
        let registry = registry();
        let state = SelectionState::with_selected(registry.list(), ["kamp"]).apply(Confirm);
        assert_eq!(state.mode(), SelectorMode::Confirmed);

        let after = state.apply_all([SelectAll, Down, Toggle, Cancel]);
        assert_eq!(after, state);
        assert_eq!(
            after.confirmed_selection(),
            Some(BTreeSet::from(["kamp".to_string()]))
        );
    }

    #[test]
    fn test_confirm_with_empty_selection() {
        let registry = registry();
        let state = SelectionState::new(registry.list()).apply(Confirm);
        assert_eq!(state.confirmed_selection(), Some(BTreeSet::new()));
    }

    #[test]
    fn test_cancel_clears_and_is_terminal() {
        let registry = registry();
        let state = SelectionState::with_selected(registry.list(), registry.defaults())
            .apply(Cancel);
        assert_eq!(state.mode(), SelectorMode::Cancelled);
        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.confirmed_selection(), None);
        assert_eq!(state.apply(Confirm).mode(), SelectorMode::Cancelled);
    }

    #[test]
    fn test_unbound_is_noop() {
        let registry = registry();
        let state = SelectionState::with_selected(registry.list(), ["mainsail"]).apply(Down);
        assert_eq!(state.apply(Unbound), state);
    }

    #[test]
    fn test_empty_entries_do_not_panic() {
        let state = SelectionState::new(&[]).apply_all([Down, Up, Toggle, SelectAll]);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.selected_count(), 0);
        assert!(state.current().is_none());
    }
}
