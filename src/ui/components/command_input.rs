use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Events emitted by command input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Command submitted
  Submitted(String),
  /// Command cancelled
  Cancelled,
}

/// Command input component with autocomplete
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if command mode is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Get autocomplete suggestions for current input
  fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Resolve to the selected suggestion, falling back to the raw input
  fn resolve_command(&self) -> String {
    let suggestions = self.suggestions();
    if let Some(cmd) = suggestions.get(self.selected_suggestion) {
      cmd.name.to_string()
    } else {
      self.input.value().trim().to_lowercase()
    }
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.active = true;
        self.input.clear();
        self.selected_suggestion = 0;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.active = false;
        self.input.clear();
        self.selected_suggestion = 0;
        KeyResult::Event(CommandEvent::Cancelled)
      }
      KeyCode::Enter => {
        self.active = false;
        let cmd = self.resolve_command();
        self.input.clear();
        self.selected_suggestion = 0;
        KeyResult::Event(CommandEvent::Submitted(cmd))
      }
      KeyCode::Tab | KeyCode::Down => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = self.selected_suggestion.checked_sub(1).unwrap_or(count - 1);
        }
        KeyResult::Handled
      }
      _ => match self.input.handle_key(key) {
        InputResult::Consumed => {
          // Reset selection on input change
          self.selected_suggestion = 0;
          KeyResult::Handled
        }
        _ => KeyResult::NotHandled,
      },
    }
  }

  /// Render the command overlay with autocomplete if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let width = (area.width * 60 / 100).clamp(30, 60);
    let suggestion_count = suggestions.len().min(8);
    let height = 3 + suggestion_count as u16;

    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Input line
        Constraint::Min(0),    // Suggestions
      ])
      .split(inner);

    let input_line = Line::from(vec![
      Span::styled(":", Style::default().fg(Color::Yellow)),
      Span::raw(self.input.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if !suggestions.is_empty() && chunks[1].height > 0 {
      let items: Vec<ListItem> = suggestions
        .iter()
        .take(8)
        .map(|cmd| {
          let line = Line::from(vec![
            Span::styled(
              format!("{:<12}", cmd.name),
              Style::default().fg(Color::Cyan),
            ),
            Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
          ]);
          ListItem::new(line)
        })
        .collect();

      let list =
        List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

      let mut state = ListState::default();
      state.select(Some(self.selected_suggestion));

      frame.render_stateful_widget(list, chunks[1], &mut state);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_activation_on_colon() {
    let mut cmd = CommandInput::new();
    assert!(!cmd.is_active());

    assert_eq!(cmd.handle_key(key(KeyCode::Char(':'))), KeyResult::Handled);
    assert!(cmd.is_active());
  }

  #[test]
  fn test_submit_resolves_selected_suggestion() {
    let mut cmd = CommandInput::new();
    cmd.handle_key(key(KeyCode::Char(':')));
    cmd.handle_key(key(KeyCode::Char('o')));

    let result = cmd.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(CommandEvent::Submitted("orders".to_string()))
    );
    assert!(!cmd.is_active());
  }

  #[test]
  fn test_escape_cancels() {
    let mut cmd = CommandInput::new();
    cmd.handle_key(key(KeyCode::Char(':')));
    cmd.handle_key(key(KeyCode::Char('x')));

    let result = cmd.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(CommandEvent::Cancelled));
    assert!(!cmd.is_active());
  }
}
