//! Error classification for the storefront API.
//!
//! The backend's error convention is a non-2xx response with a JSON body
//! `{ message, tokenExpired? }`. Session expiry is fatal to the whole
//! session; everything else is scoped to the request that failed.

use serde::Deserialize;
use thiserror::Error;

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub message: Option<String>,
  #[serde(rename = "tokenExpired", default)]
  pub token_expired: bool,
}

/// Errors produced by the API client.
///
/// Clone is required because query results travel through channels and are
/// retained in view state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
  /// The session token was rejected or is missing. Fatal to the session.
  #[error("session expired: {0}")]
  SessionExpired(String),

  /// The backend answered with a non-2xx status. Scoped to one request.
  #[error("{message}")]
  Api { status: u16, message: String },

  /// The request never produced a response (DNS, TLS, connection, ...).
  #[error("request failed: {0}")]
  Transport(String),

  /// The response body did not match the expected shape.
  #[error("invalid response: {0}")]
  Decode(String),
}

impl ApiError {
  /// Classify a non-2xx response according to the backend convention.
  ///
  /// A `tokenExpired` flag, or a message containing "expired" or
  /// "Invalid token", means the session is gone regardless of status code.
  pub fn from_response(status: u16, body: &ApiErrorBody) -> Self {
    let message = body
      .message
      .clone()
      .unwrap_or_else(|| format!("HTTP {}", status));

    if body.token_expired || message.contains("expired") || message.contains("Invalid token") {
      ApiError::SessionExpired(message)
    } else {
      ApiError::Api { status, message }
    }
  }

  /// Whether this error ends the session.
  pub fn is_session_expired(&self) -> bool {
    matches!(self, ApiError::SessionExpired(_))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_token_expired_flag() {
    let body = ApiErrorBody {
      message: Some("Unauthorized".to_string()),
      token_expired: true,
    };
    let err = ApiError::from_response(401, &body);
    assert!(err.is_session_expired());
  }

  #[test]
  fn test_expired_message_heuristic() {
    let body = ApiErrorBody {
      message: Some("Token has expired".to_string()),
      token_expired: false,
    };
    assert!(ApiError::from_response(401, &body).is_session_expired());

    let body = ApiErrorBody {
      message: Some("Invalid token".to_string()),
      token_expired: false,
    };
    assert!(ApiError::from_response(403, &body).is_session_expired());
  }

  #[test]
  fn test_scoped_error() {
    let body = ApiErrorBody {
      message: Some("Order not found".to_string()),
      token_expired: false,
    };
    let err = ApiError::from_response(404, &body);
    assert!(!err.is_session_expired());
    assert_eq!(
      err,
      ApiError::Api {
        status: 404,
        message: "Order not found".to_string()
      }
    );
  }

  #[test]
  fn test_empty_body_falls_back_to_status() {
    let err = ApiError::from_response(500, &ApiErrorBody::default());
    assert_eq!(
      err,
      ApiError::Api {
        status: 500,
        message: "HTTP 500".to_string()
      }
    );
  }
}
