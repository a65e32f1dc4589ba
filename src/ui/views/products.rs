use crate::api::types::{Product, ProductStats};
use crate::api::CachedStoreClient;
use crate::cache::CacheResult;
use crate::query::{Query, QueryState};
use crate::ui::components::{KeyResult, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_amount, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// View for browsing the product catalog, optionally scoped to one admin
pub struct ProductListView {
  admin: Option<String>,
  query: Query<CacheResult<Vec<Product>>>,
  stats: Query<ProductStats>,
  list_state: ListState,
  search: SearchInput,
}

impl ProductListView {
  pub fn new(client: CachedStoreClient, admin: Option<String>) -> Self {
    let client_for_products = client.clone();
    let admin_for_products = admin.clone();
    let mut query = Query::new(move || {
      let client = client_for_products.clone();
      let admin = admin_for_products.clone();
      async move {
        client
          .products(admin.as_deref())
          .await
          .map_err(|e| e.to_string())
      }
    });

    let mut stats = Query::new(move || {
      let client = client.clone();
      async move { client.product_stats().await.map_err(|e| e.to_string()) }
    });

    query.fetch();
    stats.fetch();

    Self {
      admin,
      query,
      stats,
      list_state: ListState::default(),
      search: SearchInput::new(),
    }
  }

  fn products(&self) -> &[Product] {
    self
      .query
      .data()
      .map(|r| r.data.as_slice())
      .unwrap_or(&[])
  }

  fn visible(&self) -> Vec<&Product> {
    filter_products(self.products(), self.search.query())
  }

  fn title(&self) -> String {
    let scope = match &self.admin {
      Some(admin) => format!("Products [{}]", admin),
      None => "Products".to_string(),
    };
    match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", scope),
      QueryState::TimedOut => format!(" {} (taking too long - still waiting) ", scope),
      QueryState::Error(e) => format!(" {} (error: {}) ", scope, e),
      _ => match self.query.data().and_then(|r| r.stale_error()) {
        Some(e) => format!(" {} ({}, offline: {}) ", scope, self.visible().len(), e),
        None => format!(" {} ({}) ", scope, self.visible().len()),
      },
    }
  }

  fn render_stats(&self, frame: &mut Frame, area: Rect) {
    let line = match self.stats.state() {
      QueryState::Success(s) => Line::from(vec![
        Span::styled(" Total ", Style::default().fg(Color::DarkGray)),
        Span::raw(s.total.to_string()),
        Span::styled("  Out of stock ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          s.out_of_stock.to_string(),
          Style::default().fg(if s.out_of_stock > 0 {
            Color::Red
          } else {
            Color::Green
          }),
        ),
        Span::styled("  Inventory ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          format_amount(s.inventory_value),
          Style::default().fg(Color::Green),
        ),
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
        "Failed to load products. Press 'r' to retry."
      } else if self.query.is_timed_out() {
        "The request is taking too long. Press 'r' to retry."
      } else if !self.search.query().is_empty() {
        "No products match the current filter."
      } else {
        "No products found."
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
      .map(|product| {
        let stock_color = if product.stock == 0 {
          Color::Red
        } else if product.stock < 10 {
          Color::Yellow
        } else {
          Color::Green
        };

        let line = Line::from(vec![
          Span::raw(format!("{:<32}", truncate(&product.title, 32))),
          Span::raw(" "),
          Span::styled(
            format!("{:<16}", truncate(&product.category, 16)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:>10}", format_amount(product.price)),
            Style::default().fg(Color::Green),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:>6}", product.stock),
            Style::default().fg(stock_color),
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

impl View for ProductListView {
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
        Constraint::Min(1),    // Product list
      ])
      .split(area);

    self.render_stats(frame, chunks[0]);
    self.render_list(frame, chunks[1]);
    self.search.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    match &self.admin {
      Some(admin) => format!("Products [{}]", admin),
      None => "Products".to_string(),
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
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(40),
    ]
  }
}

/// Case-insensitive substring match against title and category.
fn filter_products<'a>(products: &'a [Product], search: &str) -> Vec<&'a Product> {
  let needle = search.to_lowercase();
  products
    .iter()
    .filter(|p| {
      needle.is_empty()
        || p.title.to_lowercase().contains(&needle)
        || p.category.to_lowercase().contains(&needle)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(title: &str, category: &str) -> Product {
    Product {
      id: title.to_string(),
      title: title.to_string(),
      category: category.to_string(),
      price: 10.0,
      stock: 5,
      created_by: None,
      updated_at: String::new(),
    }
  }

  #[test]
  fn test_empty_filter_returns_all() {
    let products = vec![
      product("Wax Print Dress", "Clothing"),
      product("Shea Butter", "Beauty"),
    ];
    assert_eq!(filter_products(&products, "").len(), 2);
  }

  #[test]
  fn test_filter_matches_title_or_category() {
    let products = vec![
      product("Wax Print Dress", "Clothing"),
      product("Shea Butter", "Beauty"),
    ];

    let hits = filter_products(&products, "beauty");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Shea Butter");

    let hits = filter_products(&products, "WAX");
    assert_eq!(hits.len(), 1);
  }
}
