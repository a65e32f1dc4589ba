use crate::api::types::{Period, RevenuePeriod};
use crate::api::CachedStoreClient;
use crate::cache::CacheResult;
use crate::query::{Query, QueryMap, QueryState};
use crate::revenue::{self, RevenueTotals};
use crate::ui::renderfns::{format_amount, format_pct, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use std::collections::HashMap;

/// Revenue dashboard: one query per time bucket, all fetched up front so
/// switching tabs is instant once each bucket has settled.
///
/// The header reports loading while *any* bucket is still in flight;
/// a failed bucket only affects its own tab.
pub struct RevenueView {
  selected: Period,
  queries: QueryMap<Period, CacheResult<Vec<RevenuePeriod>>>,
  table_states: HashMap<Period, TableState>,
}

impl RevenueView {
  pub fn new(client: CachedStoreClient) -> Self {
    let mut queries = QueryMap::new();
    for period in Period::ALL {
      let client = client.clone();
      queries.insert(
        period,
        Query::new(move || {
          let client = client.clone();
          async move {
            client
              .revenue_by_time(period)
              .await
              .map_err(|e| e.to_string())
          }
        }),
      );
    }
    queries.fetch_all();

    Self {
      selected: Period::Daily,
      queries,
      table_states: HashMap::new(),
    }
  }

  fn select(&mut self, period: Period) {
    self.selected = period;
  }

  fn next_period(&mut self) {
    let idx = Period::ALL
      .iter()
      .position(|p| *p == self.selected)
      .unwrap_or(0);
    self.selected = Period::ALL[(idx + 1) % Period::ALL.len()];
  }

  fn periods(&self) -> &[RevenuePeriod] {
    self
      .queries
      .get(&self.selected)
      .and_then(|q| q.data())
      .map(|r| r.data.as_slice())
      .unwrap_or(&[])
  }

  fn title(&self) -> String {
    let label = self.selected.label();
    // "loading" reflects every bucket, not just the visible one
    if self.queries.any_loading() {
      return format!(" Revenue - {} (loading...) ", label);
    }
    match self.queries.get(&self.selected).map(|q| q.state()) {
      Some(QueryState::TimedOut) => {
        format!(" Revenue - {} (taking too long - still waiting) ", label)
      }
      Some(QueryState::Error(e)) => format!(" Revenue - {} (error: {}) ", label, e),
      _ => {
        let stale = self
          .queries
          .get(&self.selected)
          .and_then(|q| q.data())
          .and_then(|r| r.stale_error());
        match stale {
          Some(e) => format!(" Revenue - {} (offline: {}) ", label, e),
          None => format!(" Revenue - {} ", label),
        }
      }
    }
  }

  fn render_tabs(&self, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for period in Period::ALL {
      let style = if period == self.selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let key = period.label()[..1].to_lowercase();
      spans.push(Span::styled(format!("[{}] {}", key, period.label()), style));
      spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let title = self.title();

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let query = self.queries.get(&self.selected);
    let empty_message = match query.map(|q| q.state()) {
      Some(QueryState::Error(_)) => Some("Failed to load revenue. Press 'r' to retry."),
      Some(QueryState::TimedOut) => Some("The request is taking too long. Press 'r' to retry."),
      Some(QueryState::Loading) | Some(QueryState::Idle) | None => Some(""),
      Some(QueryState::Success(_)) if self.periods().is_empty() => {
        Some("No revenue recorded for this period.")
      }
      _ => None,
    };

    if let Some(message) = empty_message {
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let periods = self.periods().to_vec();
    let totals = RevenueTotals::from_periods(&periods);

    let header = Row::new(vec![
      Cell::from("Period"),
      Cell::from(Text::from("Revenue").alignment(Alignment::Right)),
      Cell::from(Text::from("Fees").alignment(Alignment::Right)),
      Cell::from(Text::from("Share").alignment(Alignment::Right)),
      Cell::from(Text::from("Net").alignment(Alignment::Right)),
      Cell::from(Text::from("Shipping").alignment(Alignment::Right)),
      Cell::from(Text::from("Orders").alignment(Alignment::Right)),
    ])
    .style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );

    let mut rows: Vec<Row> = periods
      .iter()
      .map(|p| {
        let net = revenue::net_revenue(p.revenue, p.platform_fees);
        let share = revenue::platform_share_pct(p.revenue, p.platform_fees);
        Row::new(vec![
          Cell::from(truncate(&p.label, 16)),
          right(format_amount(p.revenue), Color::Green),
          right(format_amount(p.platform_fees), Color::Yellow),
          right(format_pct(share), Color::Yellow),
          right(format_amount(net), Color::Green),
          right(format_amount(p.shipping_fees), Color::Reset),
          right(p.order_count.to_string(), Color::Reset),
        ])
      })
      .collect();

    // Totals row at the bottom, visually separated by bold styling
    rows.push(
      Row::new(vec![
        Cell::from("Total"),
        right(format_amount(totals.revenue), Color::Green),
        right(format_amount(totals.platform_fees), Color::Yellow),
        right(format_pct(totals.platform_share_pct()), Color::Yellow),
        right(format_amount(totals.net_revenue()), Color::Green),
        right(format_amount(totals.shipping_fees), Color::Reset),
        right(totals.orders.to_string(), Color::Reset),
      ])
      .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let row_count = rows.len();
    let table = Table::new(
      rows,
      [
        Constraint::Length(16),
        Constraint::Min(12),
        Constraint::Min(10),
        Constraint::Length(7),
        Constraint::Min(12),
        Constraint::Min(10),
        Constraint::Length(7),
      ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    );

    let state = self.table_states.entry(self.selected).or_default();
    // Keep each bucket's selection within bounds after a refresh
    match state.selected() {
      Some(i) if i >= row_count => state.select(Some(row_count - 1)),
      Some(_) => {}
      None => state.select(Some(0)),
    }

    frame.render_stateful_widget(table, area, state);
  }
}

/// Right-aligned colored table cell.
fn right(text: String, color: Color) -> Cell<'static> {
  Cell::from(Text::from(text).alignment(Alignment::Right)).style(Style::default().fg(color))
}

impl View for RevenueView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('d') => self.select(Period::Daily),
      KeyCode::Char('w') => self.select(Period::Weekly),
      KeyCode::Char('m') => self.select(Period::Monthly),
      KeyCode::Char('y') => self.select(Period::Yearly),
      KeyCode::Tab => self.next_period(),
      KeyCode::Char('j') | KeyCode::Down => {
        if let Some(state) = self.table_states.get_mut(&self.selected) {
          state.select_next();
        }
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if let Some(state) = self.table_states.get_mut(&self.selected) {
          state.select_previous();
        }
      }
      KeyCode::Char('r') => {
        // Refresh only the visible bucket
        if let Some(query) = self.queries.get_mut(&self.selected) {
          query.refetch();
        }
      }
      KeyCode::Char('R') => self.queries.refetch_all(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Period tabs
        Constraint::Min(1),    // Revenue table
      ])
      .split(area);

    self.render_tabs(frame, chunks[0]);
    self.render_table(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    format!("Revenue [{}]", self.selected.label())
  }

  fn tick(&mut self) {
    self.queries.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("d/w/m/y", "period").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("q", "back").with_priority(40),
    ]
  }
}
