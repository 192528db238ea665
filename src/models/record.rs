use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExerciseEntry, WorkoutCategory};

/// Store-assigned id of a saved workout
pub type RecordId = String;

/// A saved session as it comes back from the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
  #[serde(default)]
  pub id: RecordId,
  pub owner_id: String,
  pub date: DateTime<Utc>,
  #[serde(default)]
  pub workouts: Vec<WorkoutCategory>,
  #[serde(default)]
  pub exercises: Vec<ExerciseEntry>,
}

/// For appending new records (without id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutRecord {
  pub owner_id: String,
  pub date: DateTime<Utc>,
  pub workouts: Vec<WorkoutCategory>,
  pub exercises: Vec<ExerciseEntry>,
}

impl NewWorkoutRecord {
  pub fn into_record(self, id: RecordId) -> WorkoutRecord {
    WorkoutRecord {
      id,
      owner_id: self.owner_id,
      date: self.date,
      workouts: self.workouts,
      exercises: self.exercises,
    }
  }
}

/// Newest first; the store gives no ordering guarantee
pub fn sort_newest_first(records: &mut [WorkoutRecord]) {
  records.sort_by(|a, b| b.date.cmp(&a.date));
}
