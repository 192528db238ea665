//! Persistence gateways
//!
//! - `local.rs`: the exercise list under one fixed key in SQLite, plus the
//!   remembered sign-in
//! - `firestore.rs`: append-only workout records in a Firestore collection

pub mod firestore;
pub mod local;

use async_trait::async_trait;

use crate::auth::Identity;
use crate::models::{ExerciseEntry, NewWorkoutRecord, RecordId, WorkoutRecord};

pub use firestore::FirestoreRecordStore;
pub use local::SqliteLocalStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("Cannot save a workout without a signed-in owner")]
  MissingOwner,

  #[error("Write rejected: {0}")]
  Rejected(String),

  #[error("Database error: {0}")]
  Database(String),

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl From<sqlx::Error> for StorageError {
  fn from(e: sqlx::Error) -> Self {
    Self::Database(e.to_string())
  }
}

impl From<reqwest::Error> for StorageError {
  fn from(e: reqwest::Error) -> Self {
    Self::Request(e.to_string())
  }
}

impl From<serde_json::Error> for StorageError {
  fn from(e: serde_json::Error) -> Self {
    Self::Parse(e.to_string())
  }
}

/// Best-effort storage on this machine
#[async_trait]
pub trait LocalStore: Send + Sync {
  /// Last saved exercise list; empty if nothing was saved or it can't be read
  async fn load_local(&self) -> Vec<ExerciseEntry>;

  /// Replace the saved exercise list in full
  async fn save_local(&self, exercises: &[ExerciseEntry]) -> Result<(), StorageError>;

  async fn load_identity(&self) -> Option<Identity>;

  async fn save_identity(&self, identity: &Identity) -> Result<(), StorageError>;

  async fn clear_identity(&self) -> Result<(), StorageError>;
}

/// Remote, append-only workout history
#[async_trait]
pub trait RecordStore: Send + Sync {
  /// Store a finished session; `auth` authorizes the write
  async fn append_record(
    &self,
    auth: &Identity,
    record: &NewWorkoutRecord,
  ) -> Result<RecordId, StorageError>;

  /// Every record owned by `owner_id`, in no particular order
  async fn query_records_by_owner(
    &self,
    auth: &Identity,
    owner_id: &str,
  ) -> Result<Vec<WorkoutRecord>, StorageError>;
}
