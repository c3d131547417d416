//! Loading dashboard configuration from TOML.
//!
//! See `DashboardConfig` and `PanelTexts` for the expected schema. Every field
//! has a default, so an absent or broken file still yields a working server.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::catalog::{ContentPolicy, DatasetSource};

pub const DEFAULT_DATASET_SOURCE: &str = "./static/data/dataset.json";
pub const DEFAULT_STATIC_DIR: &str = "./static";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
  /// Local path or http(s) URL of the `{ "data": ... }` dataset document.
  pub dataset_source: String,
  pub static_dir: String,
  pub max_upload_bytes: usize,
  /// Sessions untouched for this long are evicted with their document. 0 disables eviction.
  pub session_idle_secs: u64,
  /// Prefer subtopic-specific explanations/questions when the dataset has them.
  pub subtopic_overrides: bool,
  pub texts: PanelTexts,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      dataset_source: DEFAULT_DATASET_SOURCE.into(),
      static_dir: DEFAULT_STATIC_DIR.into(),
      max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
      session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
      subtopic_overrides: false,
      texts: PanelTexts::default(),
    }
  }
}

impl DashboardConfig {
  pub fn dataset_source(&self) -> DatasetSource {
    DatasetSource::parse(&self.dataset_source)
  }

  pub fn content_policy(&self) -> ContentPolicy {
    ContentPolicy::from_flag(self.subtopic_overrides)
  }

  pub fn session_idle(&self) -> Option<Duration> {
    (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
  }

  /// Apply DATASET_SOURCE / STATIC_DIR on top of the file values.
  pub fn with_env_overrides(mut self) -> Self {
    if let Ok(v) = std::env::var("DATASET_SOURCE") {
      if !v.trim().is_empty() { self.dataset_source = v; }
    }
    if let Ok(v) = std::env::var("STATIC_DIR") {
      if !v.trim().is_empty() { self.static_dir = v; }
    }
    self
  }
}

/// Fixed strings rendered by the explanation and quiz panels.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PanelTexts {
  pub explanation_placeholder: String,
  pub missing_explanation: String,
  pub quiz_placeholder: String,
  pub completion: String,
}

impl Default for PanelTexts {
  fn default() -> Self {
    Self {
      explanation_placeholder: "Select a subtopic to see its explanation.".into(),
      missing_explanation: "No explanation available for this topic yet.".into(),
      quiz_placeholder: "No questions available for this subtopic.".into(),
      completion: "You have completed all questions for this subtopic!".into(),
    }
  }
}

pub fn parse_config(raw: &str) -> Result<DashboardConfig, toml::de::Error> {
  toml::from_str::<DashboardConfig>(raw)
}

/// Load from DASHBOARD_CONFIG_PATH, falling back to defaults on any IO/parse error.
/// Environment overrides are applied either way.
pub fn load_config_from_env() -> DashboardConfig {
  let Ok(path) = std::env::var("DASHBOARD_CONFIG_PATH") else {
    return DashboardConfig::default().with_env_overrides();
  };
  let cfg = match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "sensei_dashboard", %path, "Loaded dashboard config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "sensei_dashboard", %path, error = %e, "Failed to parse TOML config; using defaults");
        DashboardConfig::default()
      }
    },
    Err(e) => {
      error!(target: "sensei_dashboard", %path, error = %e, "Failed to read TOML config file; using defaults");
      DashboardConfig::default()
    }
  };
  cfg.with_env_overrides()
}
