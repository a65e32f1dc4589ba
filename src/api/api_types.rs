//! Serde-deserializable types matching storefront API responses.
//!
//! These types are separate from domain types so the wire shape (camelCase
//! keys, success envelopes, optional numerics) is validated at the network
//! boundary and never leaks into the rest of the application. Missing
//! numeric fields deserialize to 0.

use serde::Deserialize;

use super::types::{Order, OrderStats, Product, ProductStats, RevenuePeriod, User, UserStats};

// ============================================================================
// Common nested payload types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiOrder {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(rename = "customerName", default)]
  pub customer_name: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub status: String,
  #[serde(rename = "totalAmount", default)]
  pub total_amount: f64,
  #[serde(rename = "shippingFee")]
  pub shipping_fee: Option<f64>,
  #[serde(rename = "createdBy")]
  pub created_by: Option<String>,
  #[serde(rename = "itemCount", default)]
  pub item_count: u32,
  #[serde(rename = "createdAt", default)]
  pub created_at: String,
  #[serde(rename = "updatedAt", default)]
  pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiProduct {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub stock: u32,
  #[serde(rename = "createdBy")]
  pub created_by: Option<String>,
  #[serde(rename = "updatedAt", default)]
  pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  #[serde(rename = "_id")]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub role: String,
  #[serde(rename = "createdAt", default)]
  pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiRevenuePeriod {
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub revenue: f64,
  #[serde(rename = "platformFees", default)]
  pub platform_fees: f64,
  #[serde(rename = "shippingFees", default)]
  pub shipping_fees: f64,
  #[serde(rename = "orderCount", default)]
  pub order_count: u32,
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiOrdersResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub orders: Vec<ApiOrder>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProductsResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub products: Vec<ApiProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUsersResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRevenueResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(rename = "timePeriod", default)]
  pub time_period: String,
  #[serde(rename = "revenueData", default)]
  pub revenue_data: Vec<ApiRevenuePeriod>,
}

#[derive(Debug, Deserialize)]
pub struct ApiOrderStatsResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub stats: ApiOrderStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiOrderStats {
  #[serde(rename = "totalOrders", default)]
  pub total_orders: u32,
  #[serde(default)]
  pub pending: u32,
  #[serde(default)]
  pub processing: u32,
  #[serde(default)]
  pub delivered: u32,
  #[serde(default)]
  pub cancelled: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApiProductStatsResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub stats: ApiProductStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiProductStats {
  #[serde(rename = "totalProducts", default)]
  pub total_products: u32,
  #[serde(rename = "outOfStock", default)]
  pub out_of_stock: u32,
  #[serde(rename = "inventoryValue", default)]
  pub inventory_value: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApiUserStatsResponse {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub stats: ApiUserStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiUserStats {
  #[serde(rename = "totalUsers", default)]
  pub total_users: u32,
  #[serde(default)]
  pub admins: u32,
  #[serde(default)]
  pub customers: u32,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiOrder> for Order {
  fn from(o: ApiOrder) -> Self {
    Order {
      id: o.id,
      customer: o.customer_name,
      city: o.city,
      status: o.status,
      total: o.total_amount,
      shipping_fee: o.shipping_fee,
      created_by: o.created_by,
      item_count: o.item_count,
      created_at: o.created_at,
      updated_at: o.updated_at,
    }
  }
}

impl From<ApiProduct> for Product {
  fn from(p: ApiProduct) -> Self {
    Product {
      id: p.id,
      title: p.title,
      category: p.category,
      price: p.price,
      stock: p.stock,
      created_by: p.created_by,
      updated_at: p.updated_at,
    }
  }
}

impl From<ApiUser> for User {
  fn from(u: ApiUser) -> Self {
    User {
      id: u.id,
      name: u.name,
      email: u.email,
      role: u.role,
      created_at: u.created_at,
    }
  }
}

impl From<ApiRevenuePeriod> for RevenuePeriod {
  fn from(r: ApiRevenuePeriod) -> Self {
    RevenuePeriod {
      label: r.label,
      revenue: r.revenue,
      platform_fees: r.platform_fees,
      shipping_fees: r.shipping_fees,
      order_count: r.order_count,
    }
  }
}

impl From<ApiOrderStats> for OrderStats {
  fn from(s: ApiOrderStats) -> Self {
    OrderStats {
      total: s.total_orders,
      pending: s.pending,
      processing: s.processing,
      delivered: s.delivered,
      cancelled: s.cancelled,
    }
  }
}

impl From<ApiProductStats> for ProductStats {
  fn from(s: ApiProductStats) -> Self {
    ProductStats {
      total: s.total_products,
      out_of_stock: s.out_of_stock,
      inventory_value: s.inventory_value,
    }
  }
}

impl From<ApiUserStats> for UserStats {
  fn from(s: ApiUserStats) -> Self {
    UserStats {
      total: s.total_users,
      admins: s.admins,
      customers: s.customers,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_order_missing_numerics_default_to_zero() {
    let json = r#"{"_id": "o1", "customerName": "Ama", "status": "Pending"}"#;
    let order: Order = serde_json::from_str::<ApiOrder>(json).unwrap().into();
    assert_eq!(order.total, 0.0);
    assert_eq!(order.item_count, 0);
    assert_eq!(order.shipping_fee, None);
  }

  #[test]
  fn test_revenue_envelope() {
    let json = r#"{
      "success": true,
      "timePeriod": "monthly",
      "revenueData": [
        {"label": "2026-08", "revenue": 1000.0, "platformFees": 50.0}
      ]
    }"#;
    let resp: ApiRevenueResponse = serde_json::from_str(json).unwrap();
    assert!(resp.success);
    assert_eq!(resp.time_period, "monthly");
    let period: RevenuePeriod = resp.revenue_data.into_iter().next().unwrap().into();
    assert_eq!(period.revenue, 1000.0);
    assert_eq!(period.platform_fees, 50.0);
    assert_eq!(period.shipping_fees, 0.0);
    assert_eq!(period.order_count, 0);
  }

  #[test]
  fn test_server_supplied_shipping_fee_survives() {
    let json = r#"{"_id": "o2", "shippingFee": 12.5}"#;
    let order: Order = serde_json::from_str::<ApiOrder>(json).unwrap().into();
    assert_eq!(order.shipping_fee, Some(12.5));
  }
}
