//! Interactive selector session
//!
//! Owns the terminal while the operator picks components. The loop reads one
//! event, maps it through the [`Keymap`], advances the [`SelectionState`] and
//! redraws. It returns as soon as the state reaches `Confirmed` or
//! `Cancelled`; the terminal is restored on every exit path.
//!
//! Nothing above `debug` is logged while the session is active, since log
//! lines go to the same terminal.

use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::error::{KlipkitError, Result};
use crate::keybindings::Keymap;
use crate::registry::ComponentRegistry;
use crate::selection::{SelectionState, SelectorInput};
use crate::ui::render_selector;

/// Set while a [`TerminalSession`] holds raw mode and the alternate screen
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Source of terminal events for the selector loop
pub trait EventSource {
    /// Block until the next event. `None` means input is closed.
    fn next_event(&mut self) -> io::Result<Option<Event>>;
}

/// Blocking reads from the real terminal
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> io::Result<Option<Event>> {
        event::read().map(Some)
    }
}

/// Raw mode plus alternate screen for as long as this value lives
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub fn new() -> Result<Self> {
        enable_raw_mode()
            .map_err(|e| KlipkitError::terminal(format!("Failed to enable raw mode: {}", e)))?;
        if let Err(e) = crossterm::execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(KlipkitError::terminal(format!(
                "Failed to enter alternate screen: {}",
                e
            )));
        }

        // From here on Drop restores the terminal
        SESSION_ACTIVE.store(true, Ordering::SeqCst);
        let session = Terminal::new(CrosstermBackend::new(io::stdout()))
            .map(|terminal| Self { terminal })
            .map_err(|e| KlipkitError::terminal(format!("Failed to create terminal: {}", e)));
        if session.is_err() {
            restore_terminal();
        }
        session
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!("Failed to disable raw mode: {}", e);
    }
    if let Err(e) = crossterm::execute!(io::stdout(), LeaveAlternateScreen) {
        warn!("Failed to leave alternate screen: {}", e);
    }
}

/// Leave raw mode and the alternate screen if a session is still active.
///
/// For exit paths that skip destructors (the signal handler). Returns whether
/// anything was restored; a later `Drop` of the session is then a no-op.
pub fn restore_active_session() -> bool {
    if !SESSION_ACTIVE.swap(false, Ordering::SeqCst) {
        return false;
    }
    let _ = crossterm::execute!(io::stdout(), crossterm::cursor::Show);
    restore_terminal();
    true
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if SESSION_ACTIVE.swap(false, Ordering::SeqCst) {
            let _ = self.terminal.show_cursor();
            restore_terminal();
            debug!("Terminal restored");
        }
    }
}

/// Drive `state` with events until it is confirmed or cancelled.
///
/// Draws once up front and again after every accepted transition or resize.
/// Closed input counts as a cancel.
pub fn run_selector<'r, B, E>(
    terminal: &mut Terminal<B>,
    initial: SelectionState<'r>,
    events: &mut E,
) -> Result<SelectionState<'r>>
where
    B: Backend,
    E: EventSource,
{
    let keymap = Keymap::selector();
    let mut state = initial;
    terminal.draw(|frame| render_selector(frame, &state))?;

    while !state.mode().is_terminal() {
        let input = match events.next_event()? {
            Some(Event::Key(key)) => keymap.resolve(&key),
            Some(Event::Resize(width, height)) => {
                debug!(width, height, "Terminal resized");
                terminal.autoresize()?;
                terminal.draw(|frame| render_selector(frame, &state))?;
                continue;
            }
            Some(_) => continue,
            None => {
                debug!("Input closed, cancelling selection");
                SelectorInput::Cancel
            }
        };
        if input == SelectorInput::Unbound {
            continue;
        }

        state = state.apply(input);
        terminal.draw(|frame| render_selector(frame, &state))?;
    }

    debug!(
        mode = %state.mode(),
        selected = state.selected_count(),
        "Selector finished"
    );
    Ok(state)
}

/// Run the selector on the real terminal with the registry defaults checked.
pub fn select_interactively(registry: &ComponentRegistry) -> Result<SelectionState<'_>> {
    let initial = SelectionState::with_selected(registry.list(), registry.defaults());
    let mut session = TerminalSession::new()?;
    run_selector(session.terminal_mut(), initial, &mut CrosstermEvents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectorMode;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Event>);

    impl Scripted {
        fn keys(codes: &[KeyCode]) -> Self {
            Self(
                codes
                    .iter()
                    .map(|&code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
                    .collect(),
            )
        }
    }

    impl EventSource for Scripted {
        fn next_event(&mut self) -> io::Result<Option<Event>> {
            Ok(self.0.pop_front())
        }
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(100, 30)).unwrap()
    }

    #[test]
    fn test_confirm_with_toggles() {
        let registry = ComponentRegistry::builtin().unwrap();
        let initial = SelectionState::new(registry.list());
        let mut events = Scripted::keys(&[
            KeyCode::Char(' '),
            KeyCode::Char('j'),
            KeyCode::Char('x'),
            KeyCode::Down,
            KeyCode::Char(' '),
            KeyCode::Enter,
        ]);

        let state = run_selector(&mut terminal(), initial, &mut events).unwrap();
        let selected = state.confirmed_selection().unwrap();
        assert_eq!(
            selected.into_iter().collect::<Vec<_>>(),
            vec!["guppyscreen", "ustreamer"]
        );
    }

    #[test]
    fn test_stops_at_terminal_mode() {
        let registry = ComponentRegistry::builtin().unwrap();
        let initial = SelectionState::with_selected(registry.list(), registry.defaults());
        let mut events = Scripted::keys(&[KeyCode::Esc, KeyCode::Enter]);

        let state = run_selector(&mut terminal(), initial, &mut events).unwrap();
        assert_eq!(state.mode(), SelectorMode::Cancelled);
        assert_eq!(state.selected_count(), 0);
        // Enter was never consumed
        assert_eq!(events.0.len(), 1);
    }

    #[test]
    fn test_closed_input_cancels() {
        let registry = ComponentRegistry::builtin().unwrap();
        let initial = SelectionState::with_selected(registry.list(), registry.defaults());
        let mut events = Scripted::keys(&[KeyCode::Char('a')]);

        let state = run_selector(&mut terminal(), initial, &mut events).unwrap();
        assert_eq!(state.mode(), SelectorMode::Cancelled);
        assert!(state.confirmed_selection().is_none());
    }

    #[test]
    fn test_restore_active_session_runs_once() {
        assert!(!restore_active_session());
        SESSION_ACTIVE.store(true, Ordering::SeqCst);
        assert!(restore_active_session());
        assert!(!restore_active_session());
    }

    #[test]
    fn test_last_frame_shows_state() {
        let registry = ComponentRegistry::builtin().unwrap();
        let initial = SelectionState::new(registry.list());
        let mut events = Scripted(VecDeque::from([
            Event::Key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Event::Resize(100, 30),
            Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
        ]));
        let mut terminal = terminal();

        run_selector(&mut terminal, initial, &mut events).unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Selected: 13/13"));
    }
}
