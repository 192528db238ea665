pub mod auth;
pub mod history;
pub mod session;

use crate::app::{AppError, WorkoutApp};
use crate::db::AppState;
use crate::view::AppView;
use serde::Serialize;
use std::sync::Arc;
use tauri::State;

/// Failure handed to the front end.
///
/// `kind` is the form field for validation errors so the form can mark it,
/// otherwise the layer that failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandError {
  pub kind: &'static str,
  pub message: String,
}

impl CommandError {
  /// A command argument that could not be parsed
  pub fn input(message: impl Into<String>) -> Self {
    Self {
      kind: "input",
      message: message.into(),
    }
  }
}

impl From<AppError> for CommandError {
  fn from(e: AppError) -> Self {
    let kind = match &e {
      AppError::Validation(v) => v.field(),
      AppError::Session(_) => "session",
      AppError::Navigation(_) => "navigation",
      AppError::Auth(_) => "auth",
      AppError::Storage(_) => "storage",
      AppError::LocalOnly(_) => "local_only",
    };
    Self {
      kind,
      message: e.to_string(),
    }
  }
}

/// Render the app after an action, or report why it failed
fn respond<T>(app: &WorkoutApp, outcome: Result<T, AppError>) -> Result<AppView, CommandError> {
  outcome?;
  Ok(app.view())
}

#[tauri::command]
pub async fn get_view(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let app = state.app.lock().await;
  Ok(app.view())
}
