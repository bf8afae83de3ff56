//! Scheduling domain models.
//!
//! The problem is expressed as a single [`Schedule`] value: an employee
//! arena (problem facts), a task list (planning entities), and a horizon
//! description. Scores are lexicographic hard/soft decimal pairs.

mod employee;
mod schedule;
mod score;
mod task;

pub use employee::Employee;
pub use schedule::{Schedule, ScheduleInfo};
pub use score::HardSoftScore;
pub use task::Task;
