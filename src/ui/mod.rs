pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Top-level draw: header, the active view, breadcrumb footer, and the
/// command overlay on top.
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Active view
      Constraint::Length(1), // Breadcrumb footer
    ])
    .split(frame.area());

  let api_url = app.api_url().to_string();
  let title = app.title().map(String::from);
  let admin = app.current_admin().map(String::from);
  let shortcuts = app.current_shortcuts();
  let breadcrumb = app.breadcrumb();

  renderfns::draw_header(
    frame,
    chunks[0],
    &api_url,
    title.as_deref(),
    admin.as_deref(),
    &shortcuts,
  );

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  renderfns::draw_footer(frame, chunks[2], &breadcrumb);

  // Command overlay sits above whatever the view drew
  app.command_input().render_overlay(frame, chunks[1]);
}

/// Keep a list selection within bounds after the underlying data changed.
///
/// An empty list clears the selection; a selection past the end clamps to
/// the last row; a non-empty list with no selection selects the first row.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
    None => state.select(Some(0)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_cleared_when_list_empties() {
    let mut state = ListState::default();
    state.select(Some(2));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_selection_clamped_to_last_row() {
    let mut state = ListState::default();
    state.select(Some(9));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));
  }

  #[test]
  fn test_first_row_selected_when_unset() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 5);
    assert_eq!(state.selected(), Some(0));
  }
}
