//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - In-memory fakes for the auth and storage gateways
//! - Mock data factories

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::app::RemoteServices;
use crate::auth::{AuthError, AuthGateway, Identity};
use crate::models::{ExerciseEntry, NewWorkoutRecord, RecordId, WorkoutCategory, WorkoutRecord};
use crate::storage::{LocalStore, RecordStore, StorageError};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Write a raw value into the local key-value table
pub async fn seed_local_value(pool: &SqlitePool, key: &str, value: &str) {
  sqlx::query("INSERT OR REPLACE INTO local_store (key, value) VALUES (?1, ?2)")
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .expect("Failed to seed local value");
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_exercises() -> Vec<ExerciseEntry> {
  vec![
    ExerciseEntry::new("Squat", 3, 10, &[Some(100.0), Some(110.0), Some(120.0)])
      .expect("valid squat"),
    ExerciseEntry::new("Plank", 2, 1, &[]).expect("valid plank"),
  ]
}

/// An entry whose middle set was left blank
pub fn mock_partial_exercise() -> ExerciseEntry {
  ExerciseEntry::new("Squat", 3, 5, &[Some(100.0), None, Some(120.0)])
    .expect("valid partial squat")
}

pub fn mock_identity(uid: &str) -> Identity {
  Identity {
    uid: uid.to_string(),
    email: format!("{}@example.com", uid),
    id_token: format!("token-{}", uid),
    refresh_token: format!("refresh-{}", uid),
    expires_at: Utc::now() + Duration::hours(1),
  }
}

pub fn mock_record(owner_id: &str, date: DateTime<Utc>) -> WorkoutRecord {
  WorkoutRecord {
    id: String::new(),
    owner_id: owner_id.to_string(),
    date,
    workouts: vec![WorkoutCategory::Legs],
    exercises: mock_exercises(),
  }
}

/// ---------------------------------------------------------------------------
/// Gateway Fakes
/// ---------------------------------------------------------------------------

/// Local store kept in memory; `failing()` makes every write fail
#[derive(Default)]
pub struct MemoryLocalStore {
  exercises: Mutex<Vec<ExerciseEntry>>,
  identity: Mutex<Option<Identity>>,
  fail_writes: bool,
}

impl MemoryLocalStore {
  pub fn with_exercises(exercises: Vec<ExerciseEntry>) -> Self {
    Self {
      exercises: Mutex::new(exercises),
      ..Self::default()
    }
  }

  pub fn failing() -> Self {
    Self {
      fail_writes: true,
      ..Self::default()
    }
  }

  pub fn saved_exercises(&self) -> Vec<ExerciseEntry> {
    self.exercises.lock().unwrap().clone()
  }

  fn check_write(&self) -> Result<(), StorageError> {
    if self.fail_writes {
      Err(StorageError::Database("disk full".into()))
    } else {
      Ok(())
    }
  }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
  async fn load_local(&self) -> Vec<ExerciseEntry> {
    self.saved_exercises()
  }

  async fn save_local(&self, exercises: &[ExerciseEntry]) -> Result<(), StorageError> {
    self.check_write()?;
    *self.exercises.lock().unwrap() = exercises.to_vec();
    Ok(())
  }

  async fn load_identity(&self) -> Option<Identity> {
    self.identity.lock().unwrap().clone()
  }

  async fn save_identity(&self, identity: &Identity) -> Result<(), StorageError> {
    self.check_write()?;
    *self.identity.lock().unwrap() = Some(identity.clone());
    Ok(())
  }

  async fn clear_identity(&self) -> Result<(), StorageError> {
    *self.identity.lock().unwrap() = None;
    Ok(())
  }
}

/// Accounts in a map; errors use the provider's message codes
#[derive(Default)]
pub struct FakeAuth {
  /// email -> (password, uid)
  accounts: Mutex<HashMap<String, (String, String)>>,
  refreshes: AtomicUsize,
}

impl FakeAuth {
  /// Create an account directly, returning its uid
  pub fn register(&self, email: &str, password: &str) -> String {
    let mut accounts = self.accounts.lock().unwrap();
    let uid = format!("uid-{}", accounts.len() + 1);
    accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
    uid
  }

  pub fn refresh_count(&self) -> usize {
    self.refreshes.load(Ordering::SeqCst)
  }

  fn identity_for(uid: &str, email: &str) -> Identity {
    Identity {
      email: email.to_string(),
      ..mock_identity(uid)
    }
  }
}

#[async_trait]
impl AuthGateway for FakeAuth {
  async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
    if self.accounts.lock().unwrap().contains_key(email) {
      return Err(AuthError::Provider("EMAIL_EXISTS".into()));
    }
    let uid = self.register(email, password);
    Ok(Self::identity_for(&uid, email))
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
    let accounts = self.accounts.lock().unwrap();
    match accounts.get(email) {
      None => Err(AuthError::Provider("EMAIL_NOT_FOUND".into())),
      Some((stored, _)) if stored != password => {
        Err(AuthError::Provider("INVALID_PASSWORD".into()))
      }
      Some((_, uid)) => Ok(Self::identity_for(uid, email)),
    }
  }

  async fn sign_out(&self) {}

  async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
    self.refreshes.fetch_add(1, Ordering::SeqCst);
    let known = self
      .accounts
      .lock()
      .unwrap()
      .values()
      .any(|(_, uid)| *uid == identity.uid);
    if !known {
      return Err(AuthError::Provider("TOKEN_EXPIRED".into()));
    }
    Ok(Self::identity_for(&identity.uid, &identity.email))
  }
}

/// Record store kept in memory
#[derive(Default)]
pub struct FakeRecordStore {
  records: Mutex<Vec<WorkoutRecord>>,
  reject: Mutex<Option<String>>,
}

impl FakeRecordStore {
  pub fn seed(&self, record: WorkoutRecord) {
    self.records.lock().unwrap().push(record);
  }

  pub fn records(&self) -> Vec<WorkoutRecord> {
    self.records.lock().unwrap().clone()
  }

  /// Make every following append fail with `message`
  pub fn reject_writes(&self, message: &str) {
    *self.reject.lock().unwrap() = Some(message.to_string());
  }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
  async fn append_record(
    &self,
    _auth: &Identity,
    record: &NewWorkoutRecord,
  ) -> Result<RecordId, StorageError> {
    if record.owner_id.is_empty() {
      return Err(StorageError::MissingOwner);
    }
    if let Some(message) = self.reject.lock().unwrap().clone() {
      return Err(StorageError::Rejected(message));
    }
    let mut records = self.records.lock().unwrap();
    let id = format!("rec-{}", records.len() + 1);
    records.push(record.clone().into_record(id.clone()));
    Ok(id)
  }

  async fn query_records_by_owner(
    &self,
    _auth: &Identity,
    owner_id: &str,
  ) -> Result<Vec<WorkoutRecord>, StorageError> {
    Ok(
      self
        .records()
        .into_iter()
        .filter(|r| r.owner_id == owner_id)
        .collect(),
    )
  }
}

/// Every fake wired together, shared with the app under test
pub struct Fakes {
  pub local: Arc<MemoryLocalStore>,
  pub auth: Arc<FakeAuth>,
  pub records: Arc<FakeRecordStore>,
}

impl Fakes {
  pub fn new() -> Self {
    Self {
      local: Arc::new(MemoryLocalStore::default()),
      auth: Arc::new(FakeAuth::default()),
      records: Arc::new(FakeRecordStore::default()),
    }
  }

  pub fn remote(&self) -> RemoteServices {
    RemoteServices {
      auth: self.auth.clone(),
      records: self.records.clone(),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name = 'local_store'",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let exercises = mock_exercises();
    assert_eq!(exercises[0].weights().len(), exercises[0].sets() as usize);
    assert!(exercises[1].weights().is_empty());

    let identity = mock_identity("uid-1");
    assert!(!identity.needs_refresh());
  }

  #[tokio::test]
  async fn test_fake_auth_checks_password() {
    let auth = FakeAuth::default();
    auth.register("ana@example.com", "hunter22");

    let err = auth.sign_in("ana@example.com", "nope").await.unwrap_err();
    assert_eq!(err.to_string(), "INVALID_PASSWORD");
    assert!(auth.sign_in("ana@example.com", "hunter22").await.is_ok());
  }
}
