use std::env;

use crate::navigation::Variant;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

const MODE_VAR: &str = "WORKOUT_LOG_MODE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Invalid WORKOUT_LOG_MODE value '{0}' (expected 'local' or 'cloud')")]
  InvalidMode(String),
}

/// Firebase project the networked variant talks to
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
  pub api_key: String,
  pub project_id: String,
  pub auth_url: String,
  pub token_url: String,
  pub firestore_url: String,
}

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl FirebaseConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      api_key: non_empty_var("FIREBASE_API_KEY")
        .ok_or_else(|| ConfigError::MissingConfig("FIREBASE_API_KEY".into()))?,
      project_id: non_empty_var("FIREBASE_PROJECT_ID")
        .ok_or_else(|| ConfigError::MissingConfig("FIREBASE_PROJECT_ID".into()))?,
      auth_url: non_empty_var("FIREBASE_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
      token_url: non_empty_var("FIREBASE_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
      firestore_url: non_empty_var("FIRESTORE_URL").unwrap_or_else(|| DEFAULT_FIRESTORE_URL.into()),
    })
  }

  /// Point every endpoint at one base URL (mock servers in tests)
  pub fn with_base_url(api_key: &str, project_id: &str, base_url: &str) -> Self {
    Self {
      api_key: api_key.to_string(),
      project_id: project_id.to_string(),
      auth_url: base_url.to_string(),
      token_url: base_url.to_string(),
      firestore_url: base_url.to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub variant: Variant,
  pub firebase: Option<FirebaseConfig>,
}

impl AppConfig {
  /// Read the mode and Firebase settings from the environment.
  ///
  /// Without an explicit mode, the networked variant is used when Firebase is
  /// configured and the local one otherwise.
  pub fn from_env() -> Result<Self, ConfigError> {
    match non_empty_var(MODE_VAR).map(|m| m.trim().to_ascii_lowercase()) {
      Some(mode) if mode == "local" => Ok(Self::local()),
      Some(mode) if mode == "cloud" => Ok(Self {
        variant: Variant::Networked,
        firebase: Some(FirebaseConfig::from_env()?),
      }),
      Some(other) => Err(ConfigError::InvalidMode(other)),
      None => Ok(match FirebaseConfig::from_env() {
        Ok(firebase) => Self {
          variant: Variant::Networked,
          firebase: Some(firebase),
        },
        Err(_) => Self::local(),
      }),
    }
  }

  pub fn local() -> Self {
    Self {
      variant: Variant::Local,
      firebase: None,
    }
  }
}
