use serde::{Deserialize, Serialize};

use crate::weights::{self, WeightSlot, MAX_SETS};

/// A committed exercise. Fields are only reachable through accessors so an
/// entry cannot change once it is part of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExercise")]
pub struct ExerciseEntry {
  name: String,
  sets: u32,
  reps: u32,
  /// Either empty or exactly `sets` long
  #[serde(rename = "weight")]
  weights: Vec<WeightSlot>,
}

/// Which field stopped a draft from being committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("Exercise name is required")]
  MissingName,

  #[error("Sets must be greater than zero")]
  ZeroSets,

  #[error("Sets must be at most {}", MAX_SETS)]
  TooManySets,

  #[error("Reps must be greater than zero")]
  ZeroReps,
}

impl ValidationError {
  /// Form field the error belongs to
  pub fn field(&self) -> &'static str {
    match self {
      Self::MissingName => "name",
      Self::ZeroSets | Self::TooManySets => "sets",
      Self::ZeroReps => "reps",
    }
  }
}

impl ExerciseEntry {
  /// Build an entry, checking name, then sets, then reps.
  ///
  /// `weights` is collapsed: an all-blank vector is stored as empty.
  pub fn new(
    name: &str,
    sets: u32,
    reps: u32,
    weights: &[WeightSlot],
  ) -> Result<Self, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(ValidationError::MissingName);
    }
    if sets == 0 {
      return Err(ValidationError::ZeroSets);
    }
    if sets > MAX_SETS {
      return Err(ValidationError::TooManySets);
    }
    if reps == 0 {
      return Err(ValidationError::ZeroReps);
    }

    Ok(Self {
      name: name.to_string(),
      sets,
      reps,
      weights: weights::fit_to_sets(weights.to_vec(), sets as usize),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn sets(&self) -> u32 {
    self.sets
  }

  pub fn reps(&self) -> u32 {
    self.reps
  }

  pub fn weights(&self) -> &[WeightSlot] {
    &self.weights
  }
}

/// ---------------------------------------------------------------------------
/// Tolerant read path
/// ---------------------------------------------------------------------------

/// Stored shape as written by any version of the tracker.
///
/// Older builds stored counts as strings and weights as a list of strings, a
/// bare number, or the raw text field.
#[derive(Debug, Deserialize)]
struct RawExercise {
  #[serde(default)]
  name: String,
  #[serde(default)]
  sets: LooseCount,
  #[serde(default)]
  reps: LooseCount,
  #[serde(default, alias = "weights")]
  weight: LooseWeights,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum LooseCount {
  Number(f64),
  Text(String),
  #[default]
  Missing,
}

impl LooseCount {
  fn value(&self) -> u32 {
    let parsed = match self {
      Self::Number(n) => Some(*n),
      Self::Text(s) => s.trim().parse::<f64>().ok(),
      Self::Missing => None,
    };
    match parsed {
      Some(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
      _ => 0,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum LooseWeights {
  List(Vec<LooseSlot>),
  Single(f64),
  Text(String),
  #[default]
  Missing,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseSlot {
  Number(f64),
  Text(String),
  Blank,
}

impl LooseWeights {
  fn into_slots(self, sets: u32) -> Vec<WeightSlot> {
    match self {
      Self::List(slots) => slots
        .into_iter()
        .map(|slot| match slot {
          LooseSlot::Number(n) if n.is_finite() => Some(n),
          LooseSlot::Number(_) | LooseSlot::Blank => None,
          LooseSlot::Text(s) => weights::parse_slot(&s),
        })
        .collect(),
      // One number meant "same weight every set"
      Self::Single(n) if n.is_finite() => vec![Some(n); sets as usize],
      Self::Single(_) | Self::Missing => Vec::new(),
      Self::Text(s) => weights::parse_free_text(&s).into_iter().map(Some).collect(),
    }
  }
}

impl TryFrom<RawExercise> for ExerciseEntry {
  type Error = ValidationError;

  fn try_from(raw: RawExercise) -> Result<Self, Self::Error> {
    let sets = raw.sets.value();
    // Checked before a bare-number weight is expanded to one slot per set
    if sets > MAX_SETS {
      return Err(ValidationError::TooManySets);
    }
    let reps = raw.reps.value();
    let slots = raw.weight.into_slots(sets);
    ExerciseEntry::new(&raw.name, sets, reps, &slots)
  }
}
