use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::revenue::ShippingRates;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Scope order/product lists to one admin/vendor by default
  pub default_admin: Option<String>,
  /// Custom title for header (defaults to API domain if not set)
  pub title: Option<String>,
  /// Regional fallback rates for orders without a server-computed fee
  #[serde(default)]
  pub shipping: ShippingRates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the storefront admin API, e.g. https://api.example.com
  pub url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./s9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/s9s/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/s9s/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("s9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("s9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config() {
    let yaml = "api:\n  url: https://api.example.com\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.url, "https://api.example.com");
    assert!(config.default_admin.is_none());
    // Shipping falls back to the built-in two-tier table
    assert_eq!(config.shipping.capital_match, "accra");
  }

  #[test]
  fn test_shipping_overrides() {
    let yaml = "api:\n  url: https://api.example.com\n\
                shipping:\n  capital_rate: 10.0\n  other_rate: 30.0\n  capital_match: lagos\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.shipping.capital_rate, 10.0);
    assert_eq!(config.shipping.fallback_fee("Lagos Island"), 10.0);
    assert_eq!(config.shipping.fallback_fee("Abuja"), 30.0);
  }
}
