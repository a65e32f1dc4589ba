use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::session::Session;

use super::api_types::{
  ApiOrderStatsResponse, ApiOrdersResponse, ApiProductStatsResponse, ApiProductsResponse,
  ApiRevenueResponse, ApiUserStatsResponse, ApiUsersResponse,
};
use super::error::{ApiError, ApiErrorBody};
use super::types::{
  Order, OrderStats, Period, Product, ProductStats, RevenuePeriod, User, UserStats,
};

/// Storefront API client wrapper.
///
/// Attaches the bearer token from the session, normalizes error payloads,
/// and converts wire envelopes into domain types. No retries anywhere; a
/// failure surfaces as-is and recovery is user-initiated.
#[derive(Clone)]
pub struct StoreClient {
  http: reqwest::Client,
  base: Url,
  session: Session,
}

impl StoreClient {
  pub fn new(config: &Config, session: Session) -> Result<Self> {
    let base = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API url {}: {}", config.api.url, e))?;

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      session,
    })
  }

  /// Perform an authenticated GET and decode the JSON body.
  ///
  /// Exactly one network call; a non-2xx body is parsed with the backend's
  /// `{ message, tokenExpired? }` convention, and an expiry signal marks
  /// the whole session expired before the error is returned.
  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T, ApiError> {
    let token = self.session.bearer()?;

    let url = self
      .base
      .join(path)
      .map_err(|e| ApiError::Transport(format!("invalid path {}: {}", path, e)))?;

    debug!(%url, "GET");

    let response = self
      .http
      .get(url)
      .query(query)
      .bearer_auth(token)
      .send()
      .await
      .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body: ApiErrorBody = response.json().await.unwrap_or_default();
      let err = ApiError::from_response(status.as_u16(), &body);
      if err.is_session_expired() {
        self.session.mark_expired();
      }
      return Err(err);
    }

    response
      .json()
      .await
      .map_err(|e| ApiError::Decode(e.to_string()))
  }

  /// Aggregated revenue buckets for the given time period.
  pub async fn revenue_by_time(&self, period: Period) -> Result<Vec<RevenuePeriod>, ApiError> {
    let resp: ApiRevenueResponse = self
      .get_json("/revenue/by-time", &[("period", period.as_str())])
      .await?;
    Ok(resp.revenue_data.into_iter().map(Into::into).collect())
  }

  /// All orders, or the orders of a single admin when one is given.
  pub async fn orders(&self, admin: Option<&str>) -> Result<Vec<Order>, ApiError> {
    let path = match admin {
      Some(id) => format!("/orders/admin/{}", id),
      None => "/orders/all".to_string(),
    };
    let resp: ApiOrdersResponse = self.get_json(&path, &[]).await?;
    Ok(resp.orders.into_iter().map(Into::into).collect())
  }

  pub async fn order_stats(&self) -> Result<OrderStats, ApiError> {
    let resp: ApiOrderStatsResponse = self.get_json("/orders/stats", &[]).await?;
    Ok(resp.stats.into())
  }

  /// All products, or one admin's products.
  pub async fn products(&self, admin: Option<&str>) -> Result<Vec<Product>, ApiError> {
    let path = match admin {
      Some(id) => format!("/products/admin/{}", id),
      None => "/products/all".to_string(),
    };
    let resp: ApiProductsResponse = self.get_json(&path, &[]).await?;
    Ok(resp.products.into_iter().map(Into::into).collect())
  }

  pub async fn product_stats(&self) -> Result<ProductStats, ApiError> {
    let resp: ApiProductStatsResponse = self.get_json("/products/stats", &[]).await?;
    Ok(resp.stats.into())
  }

  pub async fn users(&self) -> Result<Vec<User>, ApiError> {
    let resp: ApiUsersResponse = self.get_json("/users/all", &[]).await?;
    Ok(resp.users.into_iter().map(Into::into).collect())
  }

  pub async fn user_stats(&self) -> Result<UserStats, ApiError> {
    let resp: ApiUserStatsResponse = self.get_json("/users/stats", &[]).await?;
    Ok(resp.stats.into())
  }
}
