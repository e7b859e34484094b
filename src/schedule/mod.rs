//! Turns load curves into fire times and interleaves many fire-time
//! streams into one ascending schedule.

mod flatten;
mod merge;


pub use flatten::{FireTimes, LoadCurve, MAX_RATE, flatten_loads};
pub use merge::{MergedSchedule, Timed, merge_schedules};
