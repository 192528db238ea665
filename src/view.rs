//! What the front end renders: a snapshot of the app after each command

use serde::Serialize;

use crate::models::{ExerciseEntry, WorkoutCategory, WorkoutRecord};
use crate::navigation::{Screen, Variant};
use crate::weights::{format_weight, WeightSlot};

#[derive(Debug, Clone, Serialize)]
pub struct AppView {
  pub variant: Variant,
  pub screen: Screen,
  pub user: Option<UserView>,
  pub categories: Vec<CategoryOption>,
  /// Whether "Next" is enabled on the selection screen
  pub can_advance: bool,
  pub draft: DraftView,
  pub exercises: Vec<ExerciseCard>,
  pub history: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
  pub uid: String,
  pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
  pub name: &'static str,
  pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
  pub name: String,
  pub sets: u32,
  pub reps: u32,
  pub weights: Vec<WeightSlot>,
  /// Free-text weights box contents
  pub weights_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseCard {
  pub index: usize,
  pub name: String,
  pub sets: u32,
  pub reps: u32,
  /// One pill per set: "60 lbs", or "?" for a blank set
  pub weight_pills: Vec<String>,
  /// "-" when no weights were entered
  pub weights_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
  pub id: String,
  pub date: String,
  pub workouts: Vec<&'static str>,
  pub exercises: Vec<ExerciseCard>,
}

pub fn category_options(is_selected: impl Fn(WorkoutCategory) -> bool) -> Vec<CategoryOption> {
  WorkoutCategory::ALL
    .iter()
    .map(|c| CategoryOption {
      name: c.name(),
      selected: is_selected(*c),
    })
    .collect()
}

pub fn exercise_card(index: usize, entry: &ExerciseEntry) -> ExerciseCard {
  let weight_pills: Vec<String> = entry
    .weights()
    .iter()
    .map(|slot| match slot {
      Some(w) => format!("{} lbs", format_weight(*w)),
      None => "?".to_string(),
    })
    .collect();
  let weights_label = if weight_pills.is_empty() {
    "-".to_string()
  } else {
    weight_pills.join(", ")
  };

  ExerciseCard {
    index,
    name: entry.name().to_string(),
    sets: entry.sets(),
    reps: entry.reps(),
    weight_pills,
    weights_label,
  }
}

pub fn history_item(record: &WorkoutRecord) -> HistoryItem {
  HistoryItem {
    id: record.id.clone(),
    date: record.date.to_rfc3339(),
    workouts: record.workouts.iter().map(|w| w.name()).collect(),
    exercises: record
      .exercises
      .iter()
      .enumerate()
      .map(|(i, e)| exercise_card(i, e))
      .collect(),
  }
}
