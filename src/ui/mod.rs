//! Terminal rendering
//!
//! - `selector` - the component selection screen
//!
//! Rendering is a pure function of a [`SelectionState`](crate::selection::SelectionState)
//! snapshot; nothing here mutates state or reads input.

mod selector;

pub use selector::{display_rows, render_selector, truncate_with_ellipsis, DisplayRow};
