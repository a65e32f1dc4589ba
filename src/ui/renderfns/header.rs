use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::view::ShortcutInfo;

/// Draw the header bar with logo, context, and the current view's shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  api_url: &str,
  title: Option<&str>,
  admin: Option<&str>,
  shortcuts: &[ShortcutInfo],
) {
  let context = title.unwrap_or_else(|| extract_domain(api_url));

  let mut spans = vec![
    Span::styled(" s9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", context), Style::default().fg(Color::White)),
  ];

  if let Some(admin) = admin {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} ", admin),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }

  spans.push(Span::raw("  "));

  // Shortcuts - keys highlighted, descriptions dimmed
  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  for shortcut in sorted {
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::raw("   "));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Extract domain from the API URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(
      extract_domain("https://api.example.com"),
      "api.example.com"
    );
    assert_eq!(
      extract_domain("https://api.example.com/v1"),
      "api.example.com"
    );
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
  }
}
