use std::io::stdout;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use crate::api::CachedStoreClient;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::session::Session;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{
  OrderListView, ProductListView, RevenueView, SessionExpiredView, UserListView,
};

/// Main application state: the view stack, the command palette, and the
/// shared client/session handles.
///
/// Input flows App -> CommandInput -> active view. Background views in the
/// stack keep ticking so their queries settle while covered.
pub struct App {
  config: Config,
  client: CachedStoreClient,
  session: Session,
  /// Admin/vendor scope used by newly opened list views
  admin_scope: Option<String>,
  view_stack: Vec<Box<dyn View>>,
  command: CommandInput,
  /// One-shot latch so the forced logout runs exactly once
  session_handled: bool,
  should_quit: bool,
}

impl App {
  pub fn new(
    config: Config,
    client: CachedStoreClient,
    session: Session,
    admin_override: Option<String>,
  ) -> Self {
    let admin_scope = admin_override.or_else(|| config.default_admin.clone());

    let home: Box<dyn View> = Box::new(OrderListView::new(
      client.clone(),
      admin_scope.clone(),
      config.shipping.clone(),
    ));

    Self {
      config,
      client,
      session,
      admin_scope,
      view_stack: vec![home],
      command: CommandInput::new(),
      session_handled: false,
      should_quit: false,
    }
  }

  /// Main event loop. Draws, then waits for the next key/tick.
  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    // Command palette gets first refusal
    match self.command.handle_key(key) {
      KeyResult::Handled => return,
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.execute_command(&cmd);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) => return,
      KeyResult::NotHandled => {}
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };

    match action {
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        // Popping the last view quits
        if self.view_stack.len() <= 1 {
          self.should_quit = true;
        } else {
          self.view_stack.pop();
        }
      }
      ViewAction::None => {}
    }
  }

  fn tick(&mut self) {
    for view in &mut self.view_stack {
      view.tick();
    }

    if self.session.is_expired() && !self.session_handled {
      self.handle_session_expiry();
    }
  }

  /// Forced logout: wipe cached data and replace the whole UI with the
  /// session-expired screen. Runs once per process.
  fn handle_session_expiry(&mut self) {
    self.session_handled = true;
    info!("session expired, tearing down views");

    if let Err(e) = self.client.clear_cache() {
      warn!("failed to clear cache on session expiry: {}", e);
    }

    self.view_stack.clear();
    self.view_stack.push(Box::new(SessionExpiredView));
  }

  fn execute_command(&mut self, command: &str) {
    // After expiry the only accepted command is quit
    if self.session_handled && command != "quit" {
      return;
    }

    let view: Option<Box<dyn View>> = match command {
      "orders" => Some(Box::new(OrderListView::new(
        self.client.clone(),
        self.admin_scope.clone(),
        self.config.shipping.clone(),
      ))),
      "products" => Some(Box::new(ProductListView::new(
        self.client.clone(),
        self.admin_scope.clone(),
      ))),
      "users" => Some(Box::new(UserListView::new(self.client.clone()))),
      "revenue" => Some(Box::new(RevenueView::new(self.client.clone()))),
      "cache-clear" => {
        match self.client.clear_cache() {
          Ok(()) => info!("cache cleared"),
          Err(e) => warn!("failed to clear cache: {}", e),
        }
        None
      }
      "quit" => {
        self.should_quit = true;
        None
      }
      other => {
        warn!("unknown command: {}", other);
        None
      }
    };

    // Switching resources resets the stack rather than nesting
    if let Some(view) = view {
      self.view_stack.clear();
      self.view_stack.push(view);
    }
  }

  // Accessors for the top-level draw

  pub fn api_url(&self) -> &str {
    &self.config.api.url
  }

  pub fn title(&self) -> Option<&str> {
    self.config.title.as_deref()
  }

  pub fn current_admin(&self) -> Option<&str> {
    self.view_stack.last().and_then(|v| v.admin())
  }

  pub fn current_shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn test_app() -> App {
    let yaml = "api:\n  url: https://api.example.com\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let session = Session::in_memory("test-token");
    let client = CachedStoreClient::new(&config, session.clone(), true).unwrap();
    App::new(config, client, session, None)
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_starts_on_orders() {
    let app = test_app();
    assert_eq!(app.breadcrumb(), vec!["Orders".to_string()]);
  }

  #[tokio::test]
  async fn test_command_switches_view() {
    let mut app = test_app();
    app.execute_command("revenue");
    assert_eq!(app.breadcrumb(), vec!["Revenue [Daily]".to_string()]);

    // Switching resets the stack rather than nesting
    app.execute_command("users");
    assert_eq!(app.breadcrumb(), vec!["Users".to_string()]);
  }

  #[tokio::test]
  async fn test_quit_command() {
    let mut app = test_app();
    app.execute_command("quit");
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_pop_on_last_view_quits() {
    let mut app = test_app();
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_session_expiry_replaces_stack() {
    let mut app = test_app();
    app.execute_command("revenue");

    app.session.mark_expired();
    app.tick();

    assert_eq!(app.breadcrumb(), vec!["Session expired".to_string()]);

    // Only quit is accepted afterwards
    app.execute_command("orders");
    assert_eq!(app.breadcrumb(), vec!["Session expired".to_string()]);
    app.execute_command("quit");
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_admin_override_scopes_home_view() {
    let yaml = "api:\n  url: https://api.example.com\ndefault_admin: config-admin\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let session = Session::in_memory("test-token");
    let client = CachedStoreClient::new(&config, session.clone(), true).unwrap();

    let app = App::new(config, client, session, Some("cli-admin".to_string()));
    assert_eq!(app.current_admin(), Some("cli-admin"));
  }
}
