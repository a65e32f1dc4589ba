use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Terminal view shown once the API token is rejected.
///
/// The session latch is one-way: every other view has been torn down and
/// the cached data cleared by the time this renders, so the only ways out
/// are quitting and restarting with a fresh token.
pub struct SessionExpiredView;

impl View for SessionExpiredView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let lines = vec![
      Line::default(),
      Line::from(Span::styled(
        " Your session has expired.",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
      )),
      Line::default(),
      Line::from(" The API rejected the stored token and it has been removed,"),
      Line::from(" along with locally cached data."),
      Line::default(),
      Line::from(vec![
        Span::raw(" Set "),
        Span::styled("S9S_TOKEN", Style::default().fg(Color::Cyan)),
        Span::raw(" to a fresh token and restart."),
      ]),
      Line::default(),
      Line::from(Span::styled(
        " Press q to quit.",
        Style::default().fg(Color::DarkGray),
      )),
    ];

    let block = Block::default()
      .title(" Session expired ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Session expired".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "quit").with_priority(10)]
  }
}
