use async_trait::async_trait;

use super::{LocalStore, StorageError};
use crate::auth::Identity;
use crate::db::DbPool;
use crate::models::ExerciseEntry;

/// Key holding the serialized exercise list
pub const EXERCISES_KEY: &str = "exercises";
/// Key holding the remembered sign-in
pub const IDENTITY_KEY: &str = "auth_session";

/// Key-value rows in the `local_store` table
pub struct SqliteLocalStore {
  db: DbPool,
}

impl SqliteLocalStore {
  pub fn new(db: DbPool) -> Self {
    Self { db }
  }

  async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM local_store WHERE key = ?1")
      .bind(key)
      .fetch_optional(&self.db)
      .await?;
    Ok(value)
  }

  async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
    sqlx::query(
      r#"
      INSERT INTO local_store (key, value, updated_at)
      VALUES (?1, ?2, CURRENT_TIMESTAMP)
      ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(key)
    .bind(value)
    .execute(&self.db)
    .await?;
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM local_store WHERE key = ?1")
      .bind(key)
      .execute(&self.db)
      .await?;
    Ok(())
  }
}

/// Serialize in the canonical `{name, sets, reps, weight: [..]}` shape
pub fn encode_exercises(exercises: &[ExerciseEntry]) -> Result<String, StorageError> {
  Ok(serde_json::to_string(exercises)?)
}

/// Parse a stored list, skipping elements that no longer form a valid entry.
///
/// Only fails when the text is not a JSON array at all.
pub fn decode_exercises(json: &str) -> Result<Vec<ExerciseEntry>, StorageError> {
  let items: Vec<serde_json::Value> = serde_json::from_str(json)?;
  Ok(entries_from_values(items))
}

/// Convert loosely-typed stored elements, dropping the ones that fail validation
pub(crate) fn entries_from_values(items: Vec<serde_json::Value>) -> Vec<ExerciseEntry> {
  let total = items.len();

  let exercises: Vec<ExerciseEntry> = items
    .into_iter()
    .enumerate()
    .filter_map(|(i, item)| match serde_json::from_value::<ExerciseEntry>(item) {
      Ok(entry) => Some(entry),
      Err(e) => {
        log::warn!("Skipping stored exercise #{}: {}", i, e);
        None
      }
    })
    .collect();

  if exercises.len() < total {
    log::warn!("Restored {} of {} stored exercises", exercises.len(), total);
  }
  exercises
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
  async fn load_local(&self) -> Vec<ExerciseEntry> {
    let stored = match self.get(EXERCISES_KEY).await {
      Ok(Some(json)) => json,
      Ok(None) => return Vec::new(),
      Err(e) => {
        log::warn!("Failed to read stored exercises: {}", e);
        return Vec::new();
      }
    };

    decode_exercises(&stored).unwrap_or_else(|e| {
      log::warn!("Stored exercises are unreadable, starting empty: {}", e);
      Vec::new()
    })
  }

  async fn save_local(&self, exercises: &[ExerciseEntry]) -> Result<(), StorageError> {
    let json = encode_exercises(exercises)?;
    self.put(EXERCISES_KEY, &json).await?;
    log::debug!("Saved {} exercises locally", exercises.len());
    Ok(())
  }

  async fn load_identity(&self) -> Option<Identity> {
    match self.get(IDENTITY_KEY).await {
      Ok(Some(json)) => serde_json::from_str(&json)
        .map_err(|e| log::warn!("Ignoring unreadable saved sign-in: {}", e))
        .ok(),
      Ok(None) => None,
      Err(e) => {
        log::warn!("Failed to read saved sign-in: {}", e);
        None
      }
    }
  }

  async fn save_identity(&self, identity: &Identity) -> Result<(), StorageError> {
    let json = serde_json::to_string(identity)?;
    self.put(IDENTITY_KEY, &json).await
  }

  async fn clear_identity(&self) -> Result<(), StorageError> {
    self.delete(IDENTITY_KEY).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;

  #[tokio::test]
  async fn test_load_without_saved_list_is_empty() {
    let pool = setup_test_db().await;
    let store = SqliteLocalStore::new(pool.clone());

    assert!(store.load_local().await.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_save_then_load_roundtrip() {
    let pool = setup_test_db().await;
    let store = SqliteLocalStore::new(pool.clone());
    let exercises = mock_exercises();

    store.save_local(&exercises).await.expect("Should save");
    assert_eq!(store.load_local().await, exercises);

    // Overwrites rather than appends
    store.save_local(&exercises[..1]).await.expect("Should save");
    assert_eq!(store.load_local().await, exercises[..1].to_vec());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_blank_weight_slot_survives_save_and_load() {
    let pool = setup_test_db().await;
    let store = SqliteLocalStore::new(pool.clone());
    let partial = mock_partial_exercise();

    store.save_local(&[partial.clone()]).await.expect("Should save");
    let loaded = store.load_local().await;

    assert_eq!(loaded, vec![partial]);
    assert_eq!(loaded[0].weights(), &[Some(100.0), None, Some(120.0)]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_load_skips_entry_with_huge_set_count() {
    let pool = setup_test_db().await;
    seed_local_value(
      &pool,
      EXERCISES_KEY,
      r#"[
        {"name": "X", "sets": 4000000000, "reps": 1, "weight": 40},
        {"name": "Row", "sets": 2, "reps": 8, "weight": [50, null]}
      ]"#,
    )
    .await;
    let store = SqliteLocalStore::new(pool.clone());

    let loaded = store.load_local().await;

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name(), "Row");
    assert_eq!(loaded[0].weights(), &[Some(50.0), None]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_load_accepts_legacy_rows_and_skips_broken_ones() {
    let pool = setup_test_db().await;
    seed_local_value(
      &pool,
      EXERCISES_KEY,
      r#"[
        {"name": "Squat", "sets": "3", "reps": "10", "weight": ["60", "70", "80"]},
        {"name": "", "sets": "3", "reps": "10", "weight": []},
        {"name": "Press", "sets": 2, "reps": 8, "weight": 40}
      ]"#,
    )
    .await;
    let store = SqliteLocalStore::new(pool.clone());

    let loaded = store.load_local().await;

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].weights(), &[Some(60.0), Some(70.0), Some(80.0)]);
    assert_eq!(loaded[1].weights(), &[Some(40.0), Some(40.0)]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_load_degrades_to_empty_on_garbage() {
    let pool = setup_test_db().await;
    seed_local_value(&pool, EXERCISES_KEY, "not json").await;
    let store = SqliteLocalStore::new(pool.clone());

    assert!(store.load_local().await.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_identity_save_load_clear() {
    let pool = setup_test_db().await;
    let store = SqliteLocalStore::new(pool.clone());
    let identity = mock_identity("uid-7");

    assert!(store.load_identity().await.is_none());
    store.save_identity(&identity).await.expect("Should save identity");
    assert_eq!(store.load_identity().await, Some(identity));

    store.clear_identity().await.expect("Should clear identity");
    assert!(store.load_identity().await.is_none());

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_encode_decode_roundtrip() {
    let exercises = mock_exercises();
    let json = encode_exercises(&exercises).unwrap();
    assert_eq!(decode_exercises(&json).unwrap(), exercises);
  }
}
