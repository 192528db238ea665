//! Account gateway
//!
//! Email/password accounts through the Firebase Identity Toolkit REST API.
//! The core only sees the `AuthGateway` trait; provider error messages are
//! passed through unchanged so the auth screen can show them.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::FirebaseConfig;

const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

/// ---------------------------------------------------------------------------
/// Identity
/// ---------------------------------------------------------------------------

/// A signed-in user. `uid` is the owner id on saved records; the tokens only
/// authorize remote calls and never leave the Rust side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
  pub uid: String,
  pub email: String,
  pub id_token: String,
  pub refresh_token: String,
  pub expires_at: DateTime<Utc>,
}

impl Identity {
  pub fn needs_refresh(&self) -> bool {
    let buffer = Duration::minutes(TOKEN_REFRESH_BUFFER_MINUTES);
    Utc::now() + buffer >= self.expires_at
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
  #[default]
  Unauthenticated,
  Authenticated(Identity),
}

impl AuthState {
  pub fn identity(&self) -> Option<&Identity> {
    match self {
      Self::Authenticated(identity) => Some(identity),
      Self::Unauthenticated => None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
  /// Message from the provider, verbatim (e.g. "EMAIL_EXISTS")
  #[error("{0}")]
  Provider(String),

  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("Not signed in")]
  NotAuthenticated,
}

impl From<reqwest::Error> for AuthError {
  fn from(e: reqwest::Error) -> Self {
    Self::Request(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Gateway
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait AuthGateway: Send + Sync {
  async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

  async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

  /// Forget provider-side state; never fails from the caller's point of view
  async fn sign_out(&self);

  /// Exchange the refresh token for a fresh id token
  async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError>;
}

/// ---------------------------------------------------------------------------
/// Firebase Identity Toolkit
/// ---------------------------------------------------------------------------

pub struct FirebaseAuth {
  client: Client,
  config: FirebaseConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
  email: &'a str,
  password: &'a str,
  return_secure_token: bool,
}

/// Response from accounts:signUp and accounts:signInWithPassword
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
  local_id: String,
  #[serde(default)]
  email: String,
  id_token: String,
  refresh_token: String,
  expires_in: String,
}

/// Response from the secure token endpoint (snake_case, unlike the rest)
#[derive(Debug, Deserialize)]
struct RefreshResponse {
  user_id: String,
  id_token: String,
  refresh_token: String,
  expires_in: String,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorResponse {
  error: FirebaseErrorDetail,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorDetail {
  message: String,
}

fn expiry_from(expires_in: &str) -> DateTime<Utc> {
  let seconds = expires_in.trim().parse::<i64>().unwrap_or(0);
  Utc::now() + Duration::seconds(seconds)
}

/// Pull the provider's message out of an error body, falling back to the raw text
fn provider_message(body: &str) -> String {
  serde_json::from_str::<FirebaseErrorResponse>(body)
    .map(|e| e.error.message)
    .unwrap_or_else(|_| body.trim().to_string())
}

/// Only a 4xx is the provider's verdict on the credentials; a 5xx is transient
fn status_error(status: StatusCode, body: &str) -> AuthError {
  if status.is_client_error() {
    AuthError::Provider(provider_message(body))
  } else {
    AuthError::Request(format!("{}: {}", status, provider_message(body)))
  }
}

impl FirebaseAuth {
  pub fn new(config: FirebaseConfig) -> Self {
    Self {
      client: Client::new(),
      config,
    }
  }

  fn endpoint(&self, base: &str, path: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(base)
      .and_then(|u| u.join(path))
      .map_err(|e| AuthError::MissingConfig(format!("invalid Firebase URL: {}", e)))?;
    url.query_pairs_mut().append_pair("key", &self.config.api_key);
    Ok(url)
  }

  async fn password_call(
    &self,
    path: &str,
    email: &str,
    password: &str,
  ) -> Result<Identity, AuthError> {
    let url = self.endpoint(&self.config.auth_url, path)?;
    log::debug!("auth request: {}", path);

    let response = self
      .client
      .post(url)
      .json(&PasswordRequest {
        email,
        password,
        return_secure_token: true,
      })
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(status_error(status, &error_text));
    }

    let body: PasswordResponse = response.json().await?;
    Ok(Identity {
      uid: body.local_id,
      email: if body.email.is_empty() {
        email.to_string()
      } else {
        body.email
      },
      id_token: body.id_token,
      refresh_token: body.refresh_token,
      expires_at: expiry_from(&body.expires_in),
    })
  }
}

#[async_trait]
impl AuthGateway for FirebaseAuth {
  async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
    self.password_call("/v1/accounts:signUp", email, password).await
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
    self
      .password_call("/v1/accounts:signInWithPassword", email, password)
      .await
  }

  async fn sign_out(&self) {
    // Tokens are client-held; dropping them is the sign out
    log::debug!("auth sign out");
  }

  async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
    let url = self.endpoint(&self.config.token_url, "/v1/token")?;
    log::debug!("auth token refresh for {}", identity.uid);

    let response = self
      .client
      .post(url)
      .form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", identity.refresh_token.as_str()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(status_error(status, &error_text));
    }

    let body: RefreshResponse = response.json().await?;
    Ok(Identity {
      uid: body.user_id,
      email: identity.email.clone(),
      id_token: body.id_token,
      refresh_token: body.refresh_token,
      expires_at: expiry_from(&body.expires_in),
    })
  }
}
