//! Derived revenue and shipping figures.
//!
//! Pure, deterministic transformations over already-fetched numeric fields.
//! Nothing here mutates state; everything is safe to recompute on every
//! render. Missing backend numerics arrive as 0 (see `api::api_types`).

use serde::Deserialize;

use crate::api::types::RevenuePeriod;

/// Net revenue after the platform's cut.
pub fn net_revenue(revenue: f64, platform_fees: f64) -> f64 {
  revenue - platform_fees
}

/// Platform fees as a percentage of revenue. 0 when there is no revenue.
pub fn platform_share_pct(revenue: f64, platform_fees: f64) -> f64 {
  if revenue == 0.0 {
    0.0
  } else {
    platform_fees / revenue * 100.0
  }
}

/// Two-tier regional shipping rates used when the backend did not compute
/// a fee for an order. The capital region is matched by a case-insensitive
/// substring of the destination city.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingRates {
  #[serde(default = "default_capital_rate")]
  pub capital_rate: f64,
  #[serde(default = "default_other_rate")]
  pub other_rate: f64,
  #[serde(default = "default_capital_match")]
  pub capital_match: String,
}

fn default_capital_rate() -> f64 {
  15.0
}

fn default_other_rate() -> f64 {
  25.0
}

fn default_capital_match() -> String {
  "accra".to_string()
}

impl Default for ShippingRates {
  fn default() -> Self {
    Self {
      capital_rate: default_capital_rate(),
      other_rate: default_other_rate(),
      capital_match: default_capital_match(),
    }
  }
}

impl ShippingRates {
  /// Rate from the fallback table for a destination city.
  pub fn fallback_fee(&self, city: &str) -> f64 {
    if city
      .to_lowercase()
      .contains(&self.capital_match.to_lowercase())
    {
      self.capital_rate
    } else {
      self.other_rate
    }
  }
}

/// Effective shipping fee for an order.
///
/// A server-supplied fee always wins; the fallback table is consulted only
/// when the backend sent none.
pub fn shipping_fee(backend_fee: Option<f64>, city: &str, rates: &ShippingRates) -> f64 {
  match backend_fee {
    Some(fee) => fee,
    None => rates.fallback_fee(city),
  }
}

/// Column totals across a set of revenue buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevenueTotals {
  pub revenue: f64,
  pub platform_fees: f64,
  pub shipping_fees: f64,
  pub orders: u32,
}

impl RevenueTotals {
  pub fn from_periods(periods: &[RevenuePeriod]) -> Self {
    let mut totals = Self::default();
    for p in periods {
      totals.revenue += p.revenue;
      totals.platform_fees += p.platform_fees;
      totals.shipping_fees += p.shipping_fees;
      totals.orders += p.order_count;
    }
    totals
  }

  pub fn net_revenue(&self) -> f64 {
    net_revenue(self.revenue, self.platform_fees)
  }

  pub fn platform_share_pct(&self) -> f64 {
    platform_share_pct(self.revenue, self.platform_fees)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn period(revenue: f64, fees: f64, shipping: f64, orders: u32) -> RevenuePeriod {
    RevenuePeriod {
      label: "p".to_string(),
      revenue,
      platform_fees: fees,
      shipping_fees: shipping,
      order_count: orders,
    }
  }

  #[test]
  fn test_net_revenue() {
    assert_eq!(net_revenue(1000.0, 50.0), 950.0);
  }

  #[test]
  fn test_platform_share_pct() {
    assert_eq!(platform_share_pct(1000.0, 50.0), 5.0);
  }

  #[test]
  fn test_platform_share_pct_zero_revenue() {
    // No division by zero: defined as 0 when revenue is 0
    assert_eq!(platform_share_pct(0.0, 0.0), 0.0);
    assert_eq!(platform_share_pct(0.0, 10.0), 0.0);
  }

  #[test]
  fn test_fallback_fee_capital_region() {
    let rates = ShippingRates::default();
    assert_eq!(rates.fallback_fee("Accra"), rates.capital_rate);
    assert_eq!(rates.fallback_fee("ACCRA CENTRAL"), rates.capital_rate);
    assert_eq!(rates.fallback_fee("Greater Accra Region"), rates.capital_rate);
  }

  #[test]
  fn test_fallback_fee_other_region() {
    let rates = ShippingRates::default();
    assert_eq!(rates.fallback_fee("Kumasi"), rates.other_rate);
    assert_eq!(rates.fallback_fee("Tamale"), rates.other_rate);
    assert_eq!(rates.fallback_fee(""), rates.other_rate);
  }

  #[test]
  fn test_backend_fee_is_never_overridden() {
    let rates = ShippingRates::default();
    // A server-supplied fee wins even for a capital-region city
    assert_eq!(shipping_fee(Some(7.5), "Accra", &rates), 7.5);
    assert_eq!(shipping_fee(Some(0.0), "Kumasi", &rates), 0.0);
  }

  #[test]
  fn test_missing_backend_fee_uses_fallback() {
    let rates = ShippingRates::default();
    assert_eq!(shipping_fee(None, "accra", &rates), rates.capital_rate);
    assert_eq!(shipping_fee(None, "Takoradi", &rates), rates.other_rate);
  }

  #[test]
  fn test_totals() {
    let periods = vec![period(1000.0, 50.0, 30.0, 10), period(500.0, 25.0, 20.0, 5)];
    let totals = RevenueTotals::from_periods(&periods);

    assert_eq!(totals.revenue, 1500.0);
    assert_eq!(totals.platform_fees, 75.0);
    assert_eq!(totals.net_revenue(), 1425.0);
    assert_eq!(totals.platform_share_pct(), 5.0);
    assert_eq!(totals.orders, 15);
  }

  #[test]
  fn test_totals_empty() {
    let totals = RevenueTotals::from_periods(&[]);
    assert_eq!(totals.platform_share_pct(), 0.0);
  }
}
