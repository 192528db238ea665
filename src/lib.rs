mod app;
mod auth;
mod commands;
mod config;
mod db;
mod models;
mod navigation;
mod session;
mod storage;
mod view;
mod weights;

#[cfg(test)]
mod test_utils;

use app::{RemoteServices, WorkoutApp};
use auth::FirebaseAuth;
use config::AppConfig;
use db::AppState;
use std::sync::Arc;
use storage::{FirestoreRecordStore, LocalStore, SqliteLocalStore};
use tauri::Manager;

/// Open the database and build the tracker for the configured variant
async fn build_state<R: tauri::Runtime>(
  app: &tauri::AppHandle<R>,
) -> Result<AppState, Box<dyn std::error::Error>> {
  let pool = db::initialize_db(app).await?;
  let local: Arc<dyn LocalStore> = Arc::new(SqliteLocalStore::new(pool));

  let config = AppConfig::from_env().unwrap_or_else(|e| {
    log::warn!("{}; falling back to local mode", e);
    AppConfig::local()
  });
  log::info!("Starting in {:?} mode", config.variant);

  let workout_app = match config.firebase {
    Some(firebase) => {
      let remote = RemoteServices {
        auth: Arc::new(FirebaseAuth::new(firebase.clone())),
        records: Arc::new(FirestoreRecordStore::new(firebase)),
      };
      WorkoutApp::networked(local, remote).await
    }
    None => WorkoutApp::local(local).await,
  };

  Ok(AppState::new(workout_app))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  tauri::Builder::default()
    .setup(|app| {
      let app_handle = app.handle().clone();
      let state = tauri::async_runtime::block_on(async move { build_state(&app_handle).await })
        .map_err(|e| {
          log::error!("Failed to initialize workout log: {}", e);
          e
        })?;
      app.manage(Arc::new(state));
      log::info!("Workout log ready");
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      commands::get_view,
      // Session commands
      commands::session::toggle_workout,
      commands::session::update_draft,
      commands::session::commit_draft,
      commands::session::delete_exercise,
      commands::session::next_screen,
      commands::session::back_screen,
      commands::session::save_session,
      // Account commands
      commands::auth::sign_up,
      commands::auth::sign_in,
      commands::auth::logout,
      // History commands
      commands::history::refresh_history,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
