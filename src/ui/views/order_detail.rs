use crate::api::types::Order;
use crate::revenue::{self, ShippingRates};
use crate::ui::renderfns::{format_amount, status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Detail view for a single order.
///
/// Rendered from the already-fetched order - no extra endpoint. The one
/// piece of derivation is the shipping fee: when the backend did not set
/// one, the regional fallback table supplies an estimate and the view says
/// so.
pub struct OrderDetailView {
  order: Order,
  rates: ShippingRates,
}

impl OrderDetailView {
  pub fn new(order: Order, rates: ShippingRates) -> Self {
    Self { order, rates }
  }

  fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![
      Span::styled(format!(" {:<14}", label), Style::default().fg(Color::DarkGray)),
      value,
    ])
  }
}

impl View for OrderDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let order = &self.order;
    let fee = revenue::shipping_fee(order.shipping_fee, &order.city, &self.rates);
    let fee_value = if order.shipping_fee.is_some() {
      Span::styled(format_amount(fee), Style::default().fg(Color::Green))
    } else {
      Span::styled(
        format!("{} (regional estimate)", format_amount(fee)),
        Style::default().fg(Color::Yellow),
      )
    };

    let lines = vec![
      Line::default(),
      Self::field("Order", Span::styled(order.id.clone(), Style::default().fg(Color::Cyan))),
      Self::field(
        "Status",
        Span::styled(
          order.status.clone(),
          Style::default().fg(status_color(&order.status)),
        ),
      ),
      Line::default(),
      Self::field("Customer", Span::raw(order.customer.clone())),
      Self::field("City", Span::raw(order.city.clone())),
      Self::field(
        "Admin",
        Span::raw(order.created_by.clone().unwrap_or_else(|| "-".to_string())),
      ),
      Line::default(),
      Self::field("Items", Span::raw(order.item_count.to_string())),
      Self::field(
        "Total",
        Span::styled(format_amount(order.total), Style::default().fg(Color::Green)),
      ),
      Self::field("Shipping", fee_value),
      Line::default(),
      Self::field("Created", Span::raw(order.created_at.clone())),
      Self::field("Updated", Span::raw(order.updated_at.clone())),
    ];

    let block = Block::default()
      .title(format!(" Order {} ", truncate(&order.id, 24)))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.order.id, 12)
  }

  fn admin(&self) -> Option<&str> {
    self.order.created_by.as_deref()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(20),
    ]
  }
}
