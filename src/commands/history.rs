use super::{respond, CommandError};
use crate::db::AppState;
use crate::view::AppView;
use std::sync::Arc;
use tauri::State;

/// Re-query the signed-in user's saved workouts
#[tauri::command]
pub async fn refresh_history(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.refresh_history().await;
  respond(&app, outcome)
}
