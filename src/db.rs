use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::PathBuf;
use tauri::Manager;
use tokio::sync::Mutex;

use crate::app::WorkoutApp;

pub type DbPool = SqlitePool;

/// Application state shared by every command
pub struct AppState {
  pub app: Mutex<WorkoutApp>,
}

impl AppState {
  pub fn new(app: WorkoutApp) -> Self {
    Self {
      app: Mutex::new(app),
    }
  }
}

/// Get the path to the database file
/// Stored in the platform app data dir, e.g. ~/.local/share/<identifier>/workout-log.db
fn get_db_path<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<PathBuf, Box<dyn std::error::Error>> {
  let data_dir = app
    .path()
    .app_data_dir()
    .map_err(|e| format!("Failed to get app data dir: {}", e))?;

  // Create directory if it doesn't exist
  fs::create_dir_all(&data_dir)?;

  Ok(data_dir.join("workout-log.db"))
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<DbPool, Box<dyn std::error::Error>> {
  let db_path = get_db_path(app)?;
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  log::info!("Initializing database at: {}", db_path.display());

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  log::info!("Database initialized successfully");

  Ok(pool)
}
