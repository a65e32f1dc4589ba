use serde::{Deserialize, Serialize};

/// Revenue aggregation buckets supported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
  Daily,
  Weekly,
  Monthly,
  Yearly,
}

impl Period {
  pub const ALL: [Period; 4] = [
    Period::Daily,
    Period::Weekly,
    Period::Monthly,
    Period::Yearly,
  ];

  /// Query-parameter value expected by `/revenue/by-time`.
  pub fn as_str(&self) -> &'static str {
    match self {
      Period::Daily => "daily",
      Period::Weekly => "weekly",
      Period::Monthly => "monthly",
      Period::Yearly => "yearly",
    }
  }

  /// Human label for view titles.
  pub fn label(&self) -> &'static str {
    match self {
      Period::Daily => "Daily",
      Period::Weekly => "Weekly",
      Period::Monthly => "Monthly",
      Period::Yearly => "Yearly",
    }
  }
}

/// An order as listed by `/orders/all` and `/orders/admin/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
  pub id: String,
  pub customer: String,
  pub city: String,
  pub status: String,
  pub total: f64,
  /// Server-computed shipping fee. Absent for legacy orders, in which case
  /// the regional fallback table applies.
  pub shipping_fee: Option<f64>,
  /// Admin/vendor the order belongs to.
  pub created_by: Option<String>,
  pub item_count: u32,
  pub created_at: String,
  pub updated_at: String,
}

/// A product as listed by `/products/all` and `/products/admin/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
  pub id: String,
  pub title: String,
  pub category: String,
  pub price: f64,
  pub stock: u32,
  pub created_by: Option<String>,
  pub updated_at: String,
}

/// A user account as listed by `/users/all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub name: String,
  pub email: String,
  pub role: String,
  pub created_at: String,
}

/// One aggregated revenue bucket from `/revenue/by-time`.
///
/// Numeric fields default to 0 when the backend omits them; net revenue and
/// platform share are derived client-side (see `crate::revenue`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePeriod {
  /// Bucket label, e.g. "2026-08-29" or "2026-W35".
  pub label: String,
  pub revenue: f64,
  pub platform_fees: f64,
  pub shipping_fees: f64,
  pub order_count: u32,
}

/// Aggregate order counters from `/orders/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStats {
  pub total: u32,
  pub pending: u32,
  pub processing: u32,
  pub delivered: u32,
  pub cancelled: u32,
}

/// Aggregate product counters from `/products/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductStats {
  pub total: u32,
  pub out_of_stock: u32,
  pub inventory_value: f64,
}

/// Aggregate user counters from `/users/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
  pub total: u32,
  pub admins: u32,
  pub customers: u32,
}
