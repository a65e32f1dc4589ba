use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if
/// truncated. Counts chars, not bytes, so multibyte names never split
/// mid-character.
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for an order status
pub fn status_color(status: &str) -> Color {
  match status {
    "Delivered" | "Completed" => Color::Green,
    "Pending" | "Processing" | "Shipped" => Color::Yellow,
    "Cancelled" | "Refunded" => Color::Red,
    _ => Color::White,
  }
}

/// Format a monetary amount with two decimals, e.g. "1,234.50"
pub fn format_amount(amount: f64) -> String {
  let negative = amount < 0.0;
  let cents = (amount.abs() * 100.0).round() as u64;
  let whole = cents / 100;
  let frac = cents % 100;

  let digits = whole.to_string();
  let mut grouped = String::new();
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }

  format!(
    "{}{}.{:02}",
    if negative { "-" } else { "" },
    grouped,
    frac
  )
}

/// Format a percentage with one decimal, e.g. "5.0%"
pub fn format_pct(pct: f64) -> String {
  format!("{:.1}%", pct)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte_names() {
    // Customer and city strings come straight from the backend; cutting
    // inside a multibyte character must not panic.
    assert_eq!(truncate("éééééééé", 10), "éééééééé");
    assert_eq!(truncate("Kwabená Osei-Agyemang", 10), "Kwaben\u{e1}...");
    assert_eq!(truncate("アクラ中央市場の注文", 6), "アクラ...");
  }

  #[test]
  fn test_status_color_delivered() {
    assert_eq!(status_color("Delivered"), Color::Green);
    assert_eq!(status_color("Completed"), Color::Green);
  }

  #[test]
  fn test_status_color_in_flight() {
    assert_eq!(status_color("Pending"), Color::Yellow);
    assert_eq!(status_color("Processing"), Color::Yellow);
  }

  #[test]
  fn test_status_color_cancelled() {
    assert_eq!(status_color("Cancelled"), Color::Red);
  }

  #[test]
  fn test_status_color_default() {
    assert_eq!(status_color("Unknown"), Color::White);
  }

  #[test]
  fn test_format_amount() {
    assert_eq!(format_amount(0.0), "0.00");
    assert_eq!(format_amount(950.0), "950.00");
    assert_eq!(format_amount(1234.5), "1,234.50");
    assert_eq!(format_amount(1234567.891), "1,234,567.89");
    assert_eq!(format_amount(-25.0), "-25.00");
  }

  #[test]
  fn test_format_pct() {
    assert_eq!(format_pct(5.0), "5.0%");
    assert_eq!(format_pct(12.345), "12.3%");
  }
}
