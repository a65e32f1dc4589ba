//! Session token handling and forced-logout state.
//!
//! The token lives in two stores: the `S9S_TOKEN` environment variable and a
//! token file under the user data dir. The stores are reconciled at load
//! time (environment wins and is persisted to the file), so a token passed
//! for one invocation is still there for the next. When the backend signals
//! expiry the session latches into an expired state: both stores are
//! cleared and every later request is refused without touching the network.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::api::error::ApiError;

/// Shared session state. Cheap to clone; all clones see the same token and
/// expiry flag.
#[derive(Clone)]
pub struct Session {
  inner: Arc<SessionInner>,
}

struct SessionInner {
  token: RwLock<Option<String>>,
  expired: AtomicBool,
  /// None for in-memory sessions (tests); nothing is persisted then.
  token_path: Option<PathBuf>,
}

impl Session {
  /// Load the session from the environment and the token file.
  ///
  /// Checks S9S_TOKEN first, then STORE_API_TOKEN, then the token file.
  /// An environment-supplied token is written through to the file so the
  /// two stores agree.
  pub fn load() -> Result<Self> {
    let token_path = Self::default_token_path()?;

    let env_token = std::env::var("S9S_TOKEN")
      .or_else(|_| std::env::var("STORE_API_TOKEN"))
      .ok()
      .filter(|t| !t.trim().is_empty());

    let token = match env_token {
      Some(t) => {
        let t = t.trim().to_string();
        persist_token(&token_path, &t);
        Some(t)
      }
      None => read_token_file(&token_path),
    };

    let token = token.ok_or_else(|| {
      eyre!(
        "API token not found. Set S9S_TOKEN or STORE_API_TOKEN, or place it in {}.",
        token_path.display()
      )
    })?;

    Ok(Self {
      inner: Arc::new(SessionInner {
        token: RwLock::new(Some(token)),
        expired: AtomicBool::new(false),
        token_path: Some(token_path),
      }),
    })
  }

  /// Create a session from a literal token, without any persistence.
  pub fn in_memory(token: &str) -> Self {
    Self {
      inner: Arc::new(SessionInner {
        token: RwLock::new(Some(token.to_string())),
        expired: AtomicBool::new(false),
        token_path: None,
      }),
    }
  }

  /// Get the bearer token, or refuse if the session already expired.
  pub fn bearer(&self) -> Result<String, ApiError> {
    if self.is_expired() {
      return Err(ApiError::SessionExpired("session ended".to_string()));
    }
    self
      .inner
      .token
      .read()
      .ok()
      .and_then(|t| t.clone())
      .ok_or_else(|| ApiError::SessionExpired("no token".to_string()))
  }

  /// Whether the session has been force-ended.
  pub fn is_expired(&self) -> bool {
    self.inner.expired.load(Ordering::SeqCst)
  }

  /// End the session: clear the in-memory token and remove the token file.
  ///
  /// Idempotent; called by the client when the backend signals expiry.
  pub fn mark_expired(&self) {
    if self.inner.expired.swap(true, Ordering::SeqCst) {
      return;
    }
    info!("session expired, clearing credentials");

    if let Ok(mut token) = self.inner.token.write() {
      *token = None;
    }
    if let Some(path) = &self.inner.token_path {
      if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
          warn!("failed to remove token file {}: {}", path.display(), e);
        }
      }
    }
  }

  fn default_token_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;
    Ok(data_dir.join("s9s").join("token"))
  }
}

fn read_token_file(path: &PathBuf) -> Option<String> {
  std::fs::read_to_string(path)
    .ok()
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
}

fn persist_token(path: &PathBuf, token: &str) {
  if let Some(parent) = path.parent() {
    if let Err(e) = std::fs::create_dir_all(parent) {
      warn!("failed to create token directory: {}", e);
      return;
    }
  }
  // Skip the write when the stores already agree.
  if read_token_file(path).as_deref() == Some(token) {
    return;
  }
  if let Err(e) = std::fs::write(path, token) {
    warn!("failed to persist token to {}: {}", path.display(), e);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bearer_returns_token() {
    let session = Session::in_memory("abc123");
    assert_eq!(session.bearer().unwrap(), "abc123");
  }

  #[test]
  fn test_expired_session_refuses_requests() {
    let session = Session::in_memory("abc123");
    session.mark_expired();

    assert!(session.is_expired());
    assert!(matches!(
      session.bearer(),
      Err(ApiError::SessionExpired(_))
    ));
  }

  #[test]
  fn test_expiry_is_shared_across_clones() {
    let session = Session::in_memory("abc123");
    let clone = session.clone();

    clone.mark_expired();
    assert!(session.is_expired());
    assert!(session.bearer().is_err());
  }

  #[test]
  fn test_mark_expired_is_idempotent() {
    let session = Session::in_memory("abc123");
    session.mark_expired();
    session.mark_expired();
    assert!(session.is_expired());
  }
}
