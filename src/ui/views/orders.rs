use crate::api::types::{Order, OrderStats};
use crate::api::CachedStoreClient;
use crate::cache::CacheResult;
use crate::query::{Query, QueryState};
use crate::revenue::ShippingRates;
use crate::ui::components::{KeyResult, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_amount, status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::OrderDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Status values the `f` key cycles through. `None` means no filter.
const STATUS_CYCLE: &[Option<&str>] = &[
  None,
  Some("Pending"),
  Some("Processing"),
  Some("Delivered"),
  Some("Cancelled"),
];

/// View for browsing orders, optionally scoped to one admin
pub struct OrderListView {
  admin: Option<String>,
  rates: ShippingRates,
  query: Query<CacheResult<Vec<Order>>>,
  stats: Query<OrderStats>,
  list_state: ListState,
  search: SearchInput,
  status_cycle_idx: usize,
}

impl OrderListView {
  pub fn new(client: CachedStoreClient, admin: Option<String>, rates: ShippingRates) -> Self {
    let client_for_orders = client.clone();
    let admin_for_orders = admin.clone();
    let mut query = Query::new(move || {
      let client = client_for_orders.clone();
      let admin = admin_for_orders.clone();
      async move {
        client
          .orders(admin.as_deref())
          .await
          .map_err(|e| e.to_string())
      }
    });

    let mut stats = Query::new(move || {
      let client = client.clone();
      async move { client.order_stats().await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();
    stats.fetch();

    Self {
      admin,
      rates,
      query,
      stats,
      list_state: ListState::default(),
      search: SearchInput::new(),
      status_cycle_idx: 0,
    }
  }

  fn orders(&self) -> &[Order] {
    self
      .query
      .data()
      .map(|r| r.data.as_slice())
      .unwrap_or(&[])
  }

  fn status_filter(&self) -> Option<&str> {
    STATUS_CYCLE[self.status_cycle_idx]
  }

  fn visible(&self) -> Vec<&Order> {
    filter_orders(self.orders(), self.search.query(), self.status_filter())
  }

  fn title(&self) -> String {
    let scope = match &self.admin {
      Some(admin) => format!("Orders [{}]", admin),
      None => "Orders".to_string(),
    };
    let filter_tag = self
      .status_filter()
      .map(|s| format!(" {} ", s))
      .unwrap_or_default();

    match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", scope),
      QueryState::TimedOut => format!(" {} (taking too long - still waiting) ", scope),
      QueryState::Error(e) => format!(" {} (error: {}) ", scope, e),
      _ => match self.query.data().and_then(|r| r.stale_error()) {
        // Stale data preserved after a failed refresh
        Some(e) => format!(" {}{} ({}, offline: {}) ", scope, filter_tag, self.visible().len(), e),
        None => format!(" {}{} ({}) ", scope, filter_tag, self.visible().len()),
      },
    }
  }

  fn render_stats(&self, frame: &mut Frame, area: Rect) {
    let line = match self.stats.state() {
      QueryState::Success(s) => Line::from(vec![
        Span::styled(" Total ", Style::default().fg(Color::DarkGray)),
        Span::raw(s.total.to_string()),
        Span::styled("  Pending ", Style::default().fg(Color::DarkGray)),
        Span::styled(s.pending.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled("  Processing ", Style::default().fg(Color::DarkGray)),
        Span::styled(s.processing.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled("  Delivered ", Style::default().fg(Color::DarkGray)),
        Span::styled(s.delivered.to_string(), Style::default().fg(Color::Green)),
        Span::styled("  Cancelled ", Style::default().fg(Color::DarkGray)),
        Span::styled(s.cancelled.to_string(), Style::default().fg(Color::Red)),
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
        "Failed to load orders. Press 'r' to retry."
      } else if self.query.is_timed_out() {
        "The request is taking too long. Press 'r' to retry."
      } else if !self.search.query().is_empty() || self.status_filter().is_some() {
        "No orders match the current filter."
      } else {
        "No orders found."
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
      .map(|order| {
        let color = status_color(&order.status);

        let line = Line::from(vec![
          Span::styled(
            format!("{:<10}", truncate(&order.id, 10)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", truncate(&order.status, 12)),
            Style::default().fg(color),
          ),
          Span::raw(" "),
          Span::raw(format!("{:<24}", truncate(&order.customer, 24))),
          Span::raw(" "),
          Span::raw(format!("{:<16}", truncate(&order.city, 16))),
          Span::raw(" "),
          Span::styled(
            format!("{:>12}", format_amount(order.total)),
            Style::default().fg(Color::Green),
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

impl View for OrderListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Let the filter component try to handle first
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
        // Manual refresh - the only retry path
        self.query.refetch();
        self.stats.refetch();
      }
      KeyCode::Char('f') => {
        self.status_cycle_idx = (self.status_cycle_idx + 1) % STATUS_CYCLE.len();
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(order) = self.visible().get(idx) {
            return ViewAction::Push(Box::new(OrderDetailView::new(
              (*order).clone(),
              self.rates.clone(),
            )));
          }
        }
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
        Constraint::Min(1),    // Order list
      ])
      .split(area);

    self.render_stats(frame, chunks[0]);
    self.render_list(frame, chunks[1]);
    // Let the filter component render its overlay
    self.search.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    match &self.admin {
      Some(admin) => format!("Orders [{}]", admin),
      None => "Orders".to_string(),
    }
  }

  fn admin(&self) -> Option<&str> {
    self.admin.as_deref()
  }

  fn tick(&mut self) {
    self.query.poll();
    self.stats.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "filter").with_priority(20),
      ShortcutInfo::new("f", "status").with_priority(30),
      ShortcutInfo::new("r", "refresh").with_priority(40),
      ShortcutInfo::new("q", "back").with_priority(50),
    ]
  }
}

/// Apply the text filter and status filter to the order list.
///
/// The text filter is a case-insensitive substring match against id,
/// customer and city; the status filter is an exact (case-insensitive)
/// status match.
fn filter_orders<'a>(
  orders: &'a [Order],
  search: &str,
  status: Option<&str>,
) -> Vec<&'a Order> {
  let needle = search.to_lowercase();
  orders
    .iter()
    .filter(|o| {
      if let Some(status) = status {
        if !o.status.eq_ignore_ascii_case(status) {
          return false;
        }
      }
      if needle.is_empty() {
        return true;
      }
      o.id.to_lowercase().contains(&needle)
        || o.customer.to_lowercase().contains(&needle)
        || o.city.to_lowercase().contains(&needle)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn order(id: &str, customer: &str, city: &str, status: &str) -> Order {
    Order {
      id: id.to_string(),
      customer: customer.to_string(),
      city: city.to_string(),
      status: status.to_string(),
      total: 100.0,
      shipping_fee: None,
      created_by: None,
      item_count: 1,
      created_at: String::new(),
      updated_at: String::new(),
    }
  }

  fn sample() -> Vec<Order> {
    vec![
      order("o1", "Ama Mensah", "Accra", "Pending"),
      order("o2", "Kofi Boateng", "Kumasi", "Delivered"),
      order("o3", "Esi Owusu", "Accra", "Delivered"),
    ]
  }

  #[test]
  fn test_no_filter_returns_all() {
    let orders = sample();
    assert_eq!(filter_orders(&orders, "", None).len(), 3);
  }

  #[test]
  fn test_text_filter_matches_customer_and_city() {
    let orders = sample();
    let hits = filter_orders(&orders, "kofi", None);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "o2");

    let hits = filter_orders(&orders, "ACCRA", None);
    assert_eq!(hits.len(), 2);
  }

  #[test]
  fn test_status_filter() {
    let orders = sample();
    let hits = filter_orders(&orders, "", Some("Delivered"));
    assert_eq!(hits.len(), 2);
  }

  #[test]
  fn test_combined_filters() {
    let orders = sample();
    let hits = filter_orders(&orders, "accra", Some("Delivered"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "o3");
  }
}
