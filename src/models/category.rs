use serde::{Deserialize, Serialize};

/// Muscle group / workout type a session can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkoutCategory {
  Legs,
  Back,
  Biceps,
  Shoulders,
  #[serde(rename = "Full-body")]
  FullBody,
  Cardio,
}

impl WorkoutCategory {
  /// Every category, in the order the selection screen shows them
  pub const ALL: [WorkoutCategory; 6] = [
    Self::Legs,
    Self::Back,
    Self::Biceps,
    Self::Shoulders,
    Self::FullBody,
    Self::Cardio,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Self::Legs => "Legs",
      Self::Back => "Back",
      Self::Biceps => "Biceps",
      Self::Shoulders => "Shoulders",
      Self::FullBody => "Full-body",
      Self::Cardio => "Cardio",
    }
  }
}

impl std::fmt::Display for WorkoutCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl std::str::FromStr for WorkoutCategory {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "legs" => Ok(Self::Legs),
      "back" => Ok(Self::Back),
      "biceps" => Ok(Self::Biceps),
      "shoulders" => Ok(Self::Shoulders),
      "full-body" | "full_body" | "fullbody" | "full body" => Ok(Self::FullBody),
      "cardio" => Ok(Self::Cardio),
      _ => Err(format!("Unknown workout category: {}", s)),
    }
  }
}
