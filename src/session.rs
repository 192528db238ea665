//! Session state: selected categories, the exercise form being edited, and
//! the exercises committed so far.
//!
//! Every mutation leaves the draft consistent: `draft.weights` always has
//! exactly `draft.sets` slots.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{ExerciseEntry, ValidationError, WorkoutCategory};
use crate::weights::{self, WeightSlot, MAX_SETS};

/// ---------------------------------------------------------------------------
/// Draft
/// ---------------------------------------------------------------------------

/// The exercise form before it is committed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExerciseFormDraft {
  pub name: String,
  pub sets: u32,
  pub reps: u32,
  pub weights: Vec<WeightSlot>,
  /// Last free-text weights, re-applied whenever the set count changes.
  /// Cleared by an edit to a single set.
  pub weights_text: Option<String>,
}

/// One edit to the draft form
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
  Name(String),
  /// Clamped to `0..=MAX_SETS`
  Sets(i64),
  Reps(i64),
  /// A single per-set weight field
  Weight { index: usize, value: String },
  /// The free-text weights field ("60, 70 80")
  WeightsText(String),
}

fn clamp_count(value: i64, max: u32) -> u32 {
  value.clamp(0, i64::from(max)) as u32
}

impl ExerciseFormDraft {
  pub fn apply(&mut self, field: DraftField) {
    match field {
      DraftField::Name(name) => self.name = name,
      DraftField::Sets(sets) => {
        self.sets = clamp_count(sets, MAX_SETS);
        weights::resize(&mut self.weights, self.sets as usize);
        if let Some(text) = &self.weights_text {
          weights::fill_from_text(&mut self.weights, text);
        }
      }
      DraftField::Reps(reps) => self.reps = clamp_count(reps, u32::MAX),
      DraftField::Weight { index, value } => {
        if let Some(slot) = self.weights.get_mut(index) {
          *slot = weights::parse_slot(&value);
          self.weights_text = None;
        }
      }
      DraftField::WeightsText(text) => {
        weights::fill_from_text(&mut self.weights, &text);
        self.weights_text = Some(text);
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}

/// ---------------------------------------------------------------------------
/// Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
  #[error("No exercise at position {index} (session has {len})")]
  OutOfRange { index: usize, len: usize },
}

/// ---------------------------------------------------------------------------
/// Session
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SessionState {
  selected: BTreeSet<WorkoutCategory>,
  exercises: Vec<ExerciseEntry>,
  draft: ExerciseFormDraft,
}

impl SessionState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start from exercises restored from local storage
  pub fn with_exercises(exercises: Vec<ExerciseEntry>) -> Self {
    Self {
      exercises,
      ..Self::default()
    }
  }

  /// Add the category if absent, remove it if present
  pub fn toggle_workout(&mut self, category: WorkoutCategory) {
    if !self.selected.remove(&category) {
      self.selected.insert(category);
    }
  }

  pub fn is_selected(&self, category: WorkoutCategory) -> bool {
    self.selected.contains(&category)
  }

  /// Selected categories in display order
  pub fn selected_workouts(&self) -> Vec<WorkoutCategory> {
    self.selected.iter().copied().collect()
  }

  pub fn selected_count(&self) -> usize {
    self.selected.len()
  }

  pub fn draft(&self) -> &ExerciseFormDraft {
    &self.draft
  }

  pub fn update_draft_field(&mut self, field: DraftField) {
    self.draft.apply(field);
  }

  /// Validate the draft and append it as a new entry.
  ///
  /// On failure nothing changes and the draft stays editable.
  pub fn commit_draft(&mut self) -> Result<&ExerciseEntry, ValidationError> {
    let entry = ExerciseEntry::new(
      &self.draft.name,
      self.draft.sets,
      self.draft.reps,
      &self.draft.weights,
    )?;
    self.exercises.push(entry);
    self.draft = ExerciseFormDraft::default();
    Ok(&self.exercises[self.exercises.len() - 1])
  }

  pub fn delete_exercise(&mut self, index: usize) -> Result<ExerciseEntry, SessionError> {
    if index >= self.exercises.len() {
      return Err(SessionError::OutOfRange {
        index,
        len: self.exercises.len(),
      });
    }
    Ok(self.exercises.remove(index))
  }

  pub fn exercises(&self) -> &[ExerciseEntry] {
    &self.exercises
  }

  /// Drop selection, exercises and draft
  pub fn clear(&mut self) {
    *self = Self::default();
  }
}
