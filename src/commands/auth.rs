use super::{respond, CommandError};
use crate::db::AppState;
use crate::view::AppView;
use std::sync::Arc;
use tauri::State;

/// ---------------------------------------------------------------------------
/// Account
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn sign_up(
  state: State<'_, Arc<AppState>>,
  email: String,
  password: String,
) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.sign_up(email.trim(), &password).await;
  respond(&app, outcome)
}

#[tauri::command]
pub async fn sign_in(
  state: State<'_, Arc<AppState>>,
  email: String,
  password: String,
) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.sign_in(email.trim(), &password).await;
  respond(&app, outcome)
}

/// Sign out and return to the auth screen
#[tauri::command]
pub async fn logout(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.logout().await;
  respond(&app, outcome)
}
