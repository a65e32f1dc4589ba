use crate::api::types::{User, UserStats};
use crate::api::CachedStoreClient;
use crate::cache::CacheResult;
use crate::query::{Query, QueryState};
use crate::ui::components::{KeyResult, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// View for browsing user accounts
pub struct UserListView {
  query: Query<CacheResult<Vec<User>>>,
  stats: Query<UserStats>,
  list_state: ListState,
  search: SearchInput,
}

impl UserListView {
  pub fn new(client: CachedStoreClient) -> Self {
    let client_for_users = client.clone();
    let mut query = Query::new(move || {
      let client = client_for_users.clone();
      async move { client.users().await.map_err(|e| e.to_string()) }
    });

    let mut stats = Query::new(move || {
      let client = client.clone();
      async move { client.user_stats().await.map_err(|e| e.to_string()) }
    });

    query.fetch();
    stats.fetch();

    Self {
      query,
      stats,
      list_state: ListState::default(),
      search: SearchInput::new(),
    }
  }

  fn users(&self) -> &[User] {
    self
      .query
      .data()
      .map(|r| r.data.as_slice())
      .unwrap_or(&[])
  }

  fn visible(&self) -> Vec<&User> {
    filter_users(self.users(), self.search.query())
  }

  fn title(&self) -> String {
    match self.query.state() {
      QueryState::Loading => " Users (loading...) ".to_string(),
      QueryState::TimedOut => " Users (taking too long - still waiting) ".to_string(),
      QueryState::Error(e) => format!(" Users (error: {}) ", e),
      _ => match self.query.data().and_then(|r| r.stale_error()) {
        Some(e) => format!(" Users ({}, offline: {}) ", self.visible().len(), e),
        None => format!(" Users ({}) ", self.visible().len()),
      },
    }
  }

  fn render_stats(&self, frame: &mut Frame, area: Rect) {
    let line = match self.stats.state() {
      QueryState::Success(s) => Line::from(vec![
        Span::styled(" Total ", Style::default().fg(Color::DarkGray)),
        Span::raw(s.total.to_string()),
        Span::styled("  Admins ", Style::default().fg(Color::DarkGray)),
        Span::styled(s.admins.to_string(), Style::default().fg(Color::Magenta)),
        Span::styled("  Customers ", Style::default().fg(Color::DarkGray)),
        Span::styled(s.customers.to_string(), Style::default().fg(Color::Cyan)),
      ]),
      QueryState::Error(e) => Line::from(Span::styled(
        format!(" stats unavailable: {}", e),
        Style::default().fg(Color::DarkGray),
      )),
      _ => Line::from(Span::styled(
        " stats loading...",
        Style::default().fg(Color::DarkGray),
      )),
    };
    frame.render_widget(Paragraph::new(line), area);
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let title = self.title();
    let visible_len = self.visible().len();
    ensure_valid_selection(&mut self.list_state, visible_len);

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if visible_len == 0 && !self.query.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load users. Press 'r' to retry."
      } else if self.query.is_timed_out() {
        "The request is taking too long. Press 'r' to retry."
      } else if !self.search.query().is_empty() {
        "No users match the current filter."
      } else {
        "No users found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .visible()
      .iter()
      .map(|user| {
        let role_color = match user.role.as_str() {
          "admin" | "superadmin" => Color::Magenta,
          _ => Color::Cyan,
        };

        let line = Line::from(vec![
          Span::raw(format!("{:<24}", truncate(&user.name, 24))),
          Span::raw(" "),
          Span::styled(
            format!("{:<32}", truncate(&user.email, 32)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<10}", truncate(&user.role, 10)),
            Style::default().fg(role_color),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for UserListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Handled | KeyResult::Event(_) => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.query.refetch();
        self.stats.refetch();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Stats strip
        Constraint::Min(1),    // User list
      ])
      .split(area);

    self.render_stats(frame, chunks[0]);
    self.render_list(frame, chunks[1]);
    self.search.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Users".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
    self.stats.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "filter").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(40),
    ]
  }
}

/// Case-insensitive substring match against name, email and role.
fn filter_users<'a>(users: &'a [User], search: &str) -> Vec<&'a User> {
  let needle = search.to_lowercase();
  users
    .iter()
    .filter(|u| {
      needle.is_empty()
        || u.name.to_lowercase().contains(&needle)
        || u.email.to_lowercase().contains(&needle)
        || u.role.to_lowercase().contains(&needle)
    })
    .collect()
}
