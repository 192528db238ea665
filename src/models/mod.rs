pub mod category;
pub mod exercise;
pub mod record;

pub use category::WorkoutCategory;
pub use exercise::{ExerciseEntry, ValidationError};
pub use record::{NewWorkoutRecord, RecordId, WorkoutRecord};
