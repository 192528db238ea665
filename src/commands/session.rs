use super::{respond, CommandError};
use crate::db::AppState;
use crate::models::WorkoutCategory;
use crate::session::DraftField;
use crate::view::AppView;
use std::sync::Arc;
use tauri::State;

/// ---------------------------------------------------------------------------
/// Workout Selection
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn toggle_workout(
  state: State<'_, Arc<AppState>>,
  category: String,
) -> Result<AppView, CommandError> {
  let category: WorkoutCategory = category.parse().map_err(CommandError::input)?;
  let mut app = state.app.lock().await;
  app.toggle_workout(category);
  Ok(app.view())
}

/// ---------------------------------------------------------------------------
/// Exercise Form
/// ---------------------------------------------------------------------------

/// Map a form input onto a draft edit.
///
/// `field` is one of "name", "sets", "reps", "weight" (needs `index`) or
/// "weights" (the free-text box). Counts that do not parse read as zero.
pub fn parse_draft_field(
  field: &str,
  value: String,
  index: Option<usize>,
) -> Result<DraftField, String> {
  let count = |v: &str| v.trim().parse::<i64>().unwrap_or(0);
  match field {
    "name" => Ok(DraftField::Name(value)),
    "sets" => Ok(DraftField::Sets(count(&value))),
    "reps" => Ok(DraftField::Reps(count(&value))),
    "weight" => index
      .map(|index| DraftField::Weight { index, value })
      .ok_or_else(|| "A per-set weight needs a set index".to_string()),
    "weights" => Ok(DraftField::WeightsText(value)),
    other => Err(format!("Unknown form field '{}'", other)),
  }
}

#[tauri::command]
pub async fn update_draft(
  state: State<'_, Arc<AppState>>,
  field: String,
  value: String,
  index: Option<usize>,
) -> Result<AppView, CommandError> {
  let edit = parse_draft_field(&field, value, index).map_err(CommandError::input)?;
  let mut app = state.app.lock().await;
  app.update_draft(edit);
  Ok(app.view())
}

#[tauri::command]
pub async fn commit_draft(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.commit_draft().await;
  respond(&app, outcome)
}

#[tauri::command]
pub async fn delete_exercise(
  state: State<'_, Arc<AppState>>,
  index: usize,
) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.delete_exercise(index).await;
  respond(&app, outcome)
}

/// ---------------------------------------------------------------------------
/// Navigation
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn next_screen(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.next();
  respond(&app, outcome)
}

#[tauri::command]
pub async fn back_screen(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.back();
  respond(&app, outcome)
}

/// Append the current session to the signed-in user's history
#[tauri::command]
pub async fn save_session(state: State<'_, Arc<AppState>>) -> Result<AppView, CommandError> {
  let mut app = state.app.lock().await;
  let outcome = app.save_session().await;
  respond(&app, outcome)
}
