pub mod athlete;
pub mod calendar;
pub mod training;

pub use athlete::{Athlete, Gender, NewAthlete};
pub use calendar::{CalendarEvent, NewCalendarEvent};
pub use training::{
  EvaluationCriterion, Exercise, NewExercise, NewTraining, Training, TrainingStatus, TrainingType,
};
