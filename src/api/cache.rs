//! Caching implementations for storefront types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::{Order, Period, Product, RevenuePeriod, User};

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for Order {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "order"
  }
}

impl Cacheable for Product {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "product"
  }
}

impl Cacheable for User {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "user"
  }
}

impl Cacheable for RevenuePeriod {
  fn cache_key(&self) -> String {
    self.label.clone()
  }

  fn entity_type() -> &'static str {
    "revenue_period"
  }
}

// ============================================================================
// Query key types
// ============================================================================

/// Query key types for storefront API calls.
///
/// One variant per logical request; the revenue key carries the time
/// bucket, the list keys carry the optional admin scope.
#[derive(Clone, Debug)]
pub enum StoreQueryKey {
  /// Aggregated revenue for one time bucket
  Revenue { period: Period },
  /// Order list, optionally scoped to one admin
  Orders { admin: Option<String> },
  /// Product list, optionally scoped to one admin
  Products { admin: Option<String> },
  /// All user accounts
  Users,
}

impl QueryKey for StoreQueryKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::Revenue { period } => format!("revenue:{}", period.as_str()),
      Self::Orders { admin } => format!("orders:{}", admin.as_deref().unwrap_or("")),
      Self::Products { admin } => format!("products:{}", admin.as_deref().unwrap_or("")),
      Self::Users => "users".to_string(),
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
  }

  fn description(&self) -> String {
    match self {
      Self::Revenue { period } => format!("revenue by {}", period.as_str()),
      Self::Orders { admin } => match admin {
        Some(a) => format!("orders for admin {}", a),
        None => "all orders".to_string(),
      },
      Self::Products { admin } => match admin {
        Some(a) => format!("products for admin {}", a),
        None => "all products".to_string(),
      },
      Self::Users => "all users".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sibling_periods_hash_differently() {
    let daily = StoreQueryKey::Revenue {
      period: Period::Daily,
    };
    let weekly = StoreQueryKey::Revenue {
      period: Period::Weekly,
    };
    assert_ne!(daily.cache_hash(), weekly.cache_hash());
  }

  #[test]
  fn test_admin_scope_changes_the_key() {
    let all = StoreQueryKey::Orders { admin: None };
    let scoped = StoreQueryKey::Orders {
      admin: Some("a1".to_string()),
    };
    assert_ne!(all.cache_hash(), scoped.cache_hash());
  }

  #[test]
  fn test_hash_is_stable() {
    let key = || StoreQueryKey::Products {
      admin: Some("a1".to_string()),
    };
    assert_eq!(key().cache_hash(), key().cache_hash());
  }
}
