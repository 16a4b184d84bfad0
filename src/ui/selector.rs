//! Component selector screen
//!
//! Layout, top to bottom: title, subtitle, the grouped component list, the
//! `Selected: n/total` counter and the key-help footer.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::keybindings::Keymap;
use crate::selection::SelectionState;
use crate::theme::{Styles, UiText};
use crate::types::Category;

const HIGHLIGHT_SYMBOL: &str = "> ";

/// One visual row of the component list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow<'r> {
    CategoryHeader(Category),
    Entry {
        /// Index into the selector's entries
        index: usize,
        checked: bool,
        is_cursor: bool,
        name: &'r str,
        description: &'r str,
    },
}

/// Rows in display order: a header whenever the category changes, then the
/// entries under it.
pub fn display_rows<'r>(state: &SelectionState<'r>) -> Vec<DisplayRow<'r>> {
    let mut rows = Vec::with_capacity(state.entries().len() + 5);
    let mut current_category = None;

    for (index, component) in state.entries().iter().enumerate() {
        if current_category != Some(component.category) {
            current_category = Some(component.category);
            rows.push(DisplayRow::CategoryHeader(component.category));
        }
        rows.push(DisplayRow::Entry {
            index,
            checked: state.is_selected(&component.slug),
            is_cursor: index == state.cursor(),
            name: &component.display_name,
            description: &component.description,
        });
    }
    rows
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let ellipsis_len = UiText::ELLIPSIS.len();
    if max_chars <= ellipsis_len {
        return UiText::ELLIPSIS.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - ellipsis_len).collect();
    out.push_str(UiText::ELLIPSIS);
    out
}

fn row_item<'a>(row: &DisplayRow<'a>, width: usize) -> ListItem<'a> {
    match row {
        DisplayRow::CategoryHeader(category) => {
            ListItem::new(Line::from(Span::styled(
                format!("── {} ──", category),
                Styles::category(),
            )))
        }
        DisplayRow::Entry {
            checked,
            name,
            description,
            ..
        } => {
            let checkbox = if *checked { UiText::CHECKED } else { UiText::UNCHECKED };
            let head = format!("  {} {}", checkbox, name);
            let mut spans = vec![Span::styled(head.clone(), Styles::entry(*checked))];

            // " - " separator plus at least one visible character
            let remaining = width.saturating_sub(head.chars().count() + 3);
            if !description.is_empty() && remaining > 0 {
                spans.push(Span::styled(
                    format!(" - {}", truncate_with_ellipsis(description, remaining)),
                    Styles::description(),
                ));
            }
            ListItem::new(Line::from(spans))
        }
    }
}

/// Draw the whole selector screen for `state`.
pub fn render_selector(frame: &mut Frame, state: &SelectionState<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Subtitle
            Constraint::Min(3),    // List
            Constraint::Length(1), // Counter
            Constraint::Length(2), // Key help
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(UiText::TITLE)
            .style(Styles::title())
            .alignment(Alignment::Center),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(UiText::SUBTITLE)
            .style(Styles::subtitle())
            .alignment(Alignment::Center),
        chunks[1],
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::panel_bg());
    let inner_width = block.inner(chunks[2]).width as usize;
    let item_width = inner_width.saturating_sub(HIGHLIGHT_SYMBOL.len());

    let rows = display_rows(state);
    let cursor_row = rows
        .iter()
        .position(|row| matches!(row, DisplayRow::Entry { is_cursor: true, .. }));
    let items: Vec<ListItem> = rows.iter().map(|row| row_item(row, item_width)).collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Styles::cursor())
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    // List scrolls its offset so the selected row stays inside the viewport
    let mut list_state = ListState::default().with_selected(cursor_row);
    frame.render_stateful_widget(list, chunks[2], &mut list_state);

    frame.render_widget(
        Paragraph::new(format!(
            "Selected: {}/{}",
            state.selected_count(),
            state.entries().len()
        ))
        .style(Styles::hint())
        .alignment(Alignment::Center),
        chunks[3],
    );

    let footer: Vec<Line> = Keymap::selector()
        .footer_lines()
        .into_iter()
        .map(Line::from)
        .collect();
    frame.render_widget(
        Paragraph::new(footer)
            .style(Styles::hint())
            .alignment(Alignment::Center),
        chunks[4],
    );
}
