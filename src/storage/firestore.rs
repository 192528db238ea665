//! Workout history in Firestore, over the REST API
//!
//! Documents live in the `workouts` collection with fields
//! `{ownerId, date, workouts, exercises}`. Firestore wraps every value in a
//! type tag (`{"stringValue": ..}`, `{"arrayValue": {"values": [..]}}`), so
//! records go through a small JSON <-> typed-value codec on the way in and out.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::local::entries_from_values;
use super::{RecordStore, StorageError};
use crate::auth::Identity;
use crate::config::FirebaseConfig;
use crate::models::{NewWorkoutRecord, RecordId, WorkoutCategory, WorkoutRecord};

const COLLECTION: &str = "workouts";

/// ---------------------------------------------------------------------------
/// Typed value codec
/// ---------------------------------------------------------------------------

/// Plain JSON to a Firestore typed value
pub fn encode_value(value: &Value) -> Value {
  match value {
    Value::Null => json!({ "nullValue": null }),
    Value::Bool(b) => json!({ "booleanValue": b }),
    Value::Number(n) => match (n.as_i64(), n.as_u64()) {
      (Some(i), _) => json!({ "integerValue": i.to_string() }),
      (None, Some(u)) => json!({ "integerValue": u.to_string() }),
      _ => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
    },
    Value::String(s) => json!({ "stringValue": s }),
    Value::Array(items) => json!({
      "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
    }),
    Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
  }
}

fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
  map
    .iter()
    .map(|(k, v)| (k.clone(), encode_value(v)))
    .collect()
}

/// Firestore typed value back to plain JSON; timestamps become RFC 3339 strings
pub fn decode_value(value: &Value) -> Result<Value, StorageError> {
  let object = value
    .as_object()
    .ok_or_else(|| StorageError::Parse(format!("expected typed value, got {}", value)))?;
  let (tag, inner) = object
    .iter()
    .next()
    .ok_or_else(|| StorageError::Parse("empty typed value".into()))?;

  match tag.as_str() {
    "nullValue" => Ok(Value::Null),
    "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" => Ok(inner.clone()),
    "integerValue" => {
      let parsed = match inner {
        Value::String(s) => s.parse::<i64>().ok(),
        other => other.as_i64(),
      };
      parsed
        .map(Value::from)
        .ok_or_else(|| StorageError::Parse(format!("bad integerValue {}", inner)))
    }
    "arrayValue" => {
      let values = match inner.get("values").and_then(Value::as_array) {
        Some(values) => values.iter().map(decode_value).collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
      };
      Ok(Value::Array(values))
    }
    "mapValue" => {
      let fields = inner.get("fields").and_then(Value::as_object);
      Ok(Value::Object(decode_fields(fields)?))
    }
    other => Err(StorageError::Parse(format!("unsupported Firestore type {}", other))),
  }
}

fn decode_fields(fields: Option<&Map<String, Value>>) -> Result<Map<String, Value>, StorageError> {
  let mut out = Map::new();
  if let Some(fields) = fields {
    for (k, v) in fields {
      out.insert(k.clone(), decode_value(v)?);
    }
  }
  Ok(out)
}

/// ---------------------------------------------------------------------------
/// Record <-> document
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
  /// Full resource name, ".../documents/workouts/{id}"
  pub name: String,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
  document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorResponse {
  error: FirestoreErrorDetail,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorDetail {
  message: String,
}

pub fn encode_record(record: &NewWorkoutRecord) -> Result<Value, StorageError> {
  let workouts: Vec<Value> = record
    .workouts
    .iter()
    .map(|w| json!({ "stringValue": w.name() }))
    .collect();
  let exercises = serde_json::to_value(&record.exercises)?;

  Ok(json!({
    "fields": {
      "ownerId": { "stringValue": record.owner_id },
      "date": { "timestampValue": record.date.to_rfc3339() },
      "workouts": { "arrayValue": { "values": workouts } },
      "exercises": encode_value(&exercises),
    }
  }))
}

pub fn decode_document(doc: &FirestoreDocument) -> Result<WorkoutRecord, StorageError> {
  let mut fields = decode_fields(Some(&doc.fields))?;

  // Categories and exercises are read leniently; other app versions wrote them
  let workouts: Vec<WorkoutCategory> = match fields.remove("workouts") {
    Some(Value::Array(items)) => items
      .iter()
      .filter_map(|item| item.as_str())
      .filter_map(|name| match name.parse() {
        Ok(category) => Some(category),
        Err(e) => {
          log::warn!("Skipping stored category: {}", e);
          None
        }
      })
      .collect(),
    _ => Vec::new(),
  };
  let exercises = match fields.remove("exercises") {
    Some(Value::Array(items)) => entries_from_values(items),
    _ => Vec::new(),
  };

  let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
  fields.insert("id".into(), Value::String(id));

  let mut record: WorkoutRecord = serde_json::from_value(Value::Object(fields))?;
  record.workouts = workouts;
  record.exercises = exercises;
  Ok(record)
}

fn error_message(body: &str) -> String {
  serde_json::from_str::<FirestoreErrorResponse>(body)
    .map(|e| e.error.message)
    .unwrap_or_else(|_| body.trim().to_string())
}

/// ---------------------------------------------------------------------------
/// Store
/// ---------------------------------------------------------------------------

pub struct FirestoreRecordStore {
  client: Client,
  config: FirebaseConfig,
}

impl FirestoreRecordStore {
  pub fn new(config: FirebaseConfig) -> Self {
    Self {
      client: Client::new(),
      config,
    }
  }

  fn documents_url(&self) -> String {
    format!(
      "{}/v1/projects/{}/databases/(default)/documents",
      self.config.firestore_url.trim_end_matches('/'),
      self.config.project_id
    )
  }
}

#[async_trait]
impl RecordStore for FirestoreRecordStore {
  async fn append_record(
    &self,
    auth: &Identity,
    record: &NewWorkoutRecord,
  ) -> Result<RecordId, StorageError> {
    if record.owner_id.is_empty() {
      return Err(StorageError::MissingOwner);
    }
    if record.owner_id != auth.uid {
      return Err(StorageError::Rejected("record owner is not the signed-in user".into()));
    }

    let url = format!("{}/{}", self.documents_url(), COLLECTION);
    log::debug!("firestore append: {} exercises", record.exercises.len());

    let response = self
      .client
      .post(&url)
      .header("Authorization", format!("Bearer {}", auth.id_token))
      .json(&encode_record(record)?)
      .send()
      .await?;

    if !response.status().is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(StorageError::Rejected(error_message(&error_text)));
    }

    let doc: FirestoreDocument = response.json().await?;
    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
    Ok(id)
  }

  async fn query_records_by_owner(
    &self,
    auth: &Identity,
    owner_id: &str,
  ) -> Result<Vec<WorkoutRecord>, StorageError> {
    let url = format!("{}:runQuery", self.documents_url());
    let query = json!({
      "structuredQuery": {
        "from": [{ "collectionId": COLLECTION }],
        "where": {
          "fieldFilter": {
            "field": { "fieldPath": "ownerId" },
            "op": "EQUAL",
            "value": { "stringValue": owner_id }
          }
        }
      }
    });

    let response = self
      .client
      .post(&url)
      .header("Authorization", format!("Bearer {}", auth.id_token))
      .json(&query)
      .send()
      .await?;

    if !response.status().is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(StorageError::Request(error_message(&error_text)));
    }

    let rows: Vec<RunQueryRow> = response.json().await?;
    let mut records = Vec::with_capacity(rows.len());
    for doc in rows.iter().filter_map(|row| row.document.as_ref()) {
      match decode_document(doc) {
        Ok(record) => records.push(record),
        Err(e) => log::warn!("Skipping unreadable workout {}: {}", doc.name, e),
      }
    }
    log::debug!("firestore query: {} records for owner", records.len());
    Ok(records)
  }
}
