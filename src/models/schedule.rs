//! Schedule (problem and solution) model.
//!
//! A schedule bundles the employee arena, the task list, and the horizon
//! description. The same value is both problem and solution: the
//! optimizer mutates the tasks' planning fields in place and attaches a
//! score once computed.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Employee, HardSoftScore, Task};
use crate::slots;

/// Horizon description for a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    /// Capacity of the horizon in slots.
    pub total_slots: i64,
    /// Calendar date corresponding to slot 0.
    pub base_date: NaiveDate,
    /// Optional IANA timezone name, carried for serialization fidelity.
    /// All slot arithmetic is naive local time.
    pub base_timezone: Option<String>,
}

impl ScheduleInfo {
    /// Creates a new horizon description.
    pub fn new(total_slots: i64, base_date: NaiveDate) -> Self {
        Self {
            total_slots,
            base_date,
            base_timezone: None,
        }
    }

    /// Sets the timezone name.
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.base_timezone = Some(tz.into());
        self
    }
}

/// A scheduling problem and its (partial) solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Employee arena. Tasks reference employees by index.
    pub employees: Vec<Employee>,
    /// Tasks, pinned and unpinned alike.
    pub tasks: Vec<Task>,
    /// Horizon description.
    pub schedule_info: ScheduleInfo,
    /// Score of the current task assignment, if computed.
    pub score: Option<HardSoftScore>,
}

impl Schedule {
    /// Creates an unscored schedule.
    pub fn new(employees: Vec<Employee>, tasks: Vec<Task>, schedule_info: ScheduleInfo) -> Self {
        Self {
            employees,
            tasks,
            schedule_info,
            score: None,
        }
    }

    /// The employee assigned to a task, if any.
    pub fn employee_of(&self, task: &Task) -> Option<&Employee> {
        task.employee.and_then(|idx| self.employees.get(idx))
    }

    /// Calendar date on which a task starts.
    pub fn task_date(&self, task: &Task) -> NaiveDate {
        slots::slot_date(task.start_slot, self.schedule_info.base_date)
    }

    /// Wall-clock start of a task.
    pub fn task_start(&self, task: &Task) -> NaiveDateTime {
        slots::slot_to_datetime(task.start_slot, self.schedule_info.base_date)
    }

    /// Wall-clock end of a task.
    pub fn task_end(&self, task: &Task) -> NaiveDateTime {
        slots::slot_to_datetime(task.end_slot(), self.schedule_info.base_date)
    }

    /// Indices of tasks the optimizer may move.
    pub fn unpinned_indices(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.pinned)
            .map(|(i, _)| i)
            .collect()
    }

    /// Per-employee assigned-task counts, including employees with none.
    pub fn employee_task_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.employees.len()];
        for task in &self.tasks {
            if let Some(idx) = task.employee {
                if idx < counts.len() {
                    counts[idx] += 1;
                }
            }
        }
        counts
    }

    /// Whether the attached score reports feasibility.
    ///
    /// `false` when no score has been computed yet.
    pub fn is_feasible(&self) -> bool {
        self.score.map(|s| s.is_feasible()).unwrap_or(false)
    }
}
