//! Timetable computation and time handling for rollouts.

mod clock;
mod duration;
mod timetable;

pub use clock::{Clock, SystemClock};
pub use duration::{DurationError, format_duration, parse_duration};
pub use timetable::TimetableBuilder;
