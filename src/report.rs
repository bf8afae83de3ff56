//! Tabular views of a schedule.
//!
//! Flattens a (solved) schedule into presentation rows: one per task
//! with resolved wall-clock times and derived preference flags, plus a
//! per-employee summary. Callers render these however they like; the
//! crate itself keeps no display logic.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Schedule;

/// Employee name used for tasks without an assignment.
pub const UNASSIGNED: &str = "Unassigned";

/// One task of a schedule, flattened for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Project grouping (empty = none).
    pub project_id: String,
    /// Order within the project.
    pub sequence_number: i64,
    /// Assigned employee name, or [`UNASSIGNED`].
    pub employee_name: String,
    /// Task description.
    pub description: String,
    /// Wall-clock start.
    pub start: NaiveDateTime,
    /// Wall-clock end.
    pub end: NaiveDateTime,
    /// Duration in hours.
    pub duration_hours: f64,
    /// Skill the task requires.
    pub required_skill: String,
    /// Whether the task was a fixed input.
    pub pinned: bool,
    /// Task lands on its employee's unavailable date.
    pub unavailable: bool,
    /// Task lands on its employee's undesired date.
    pub undesired: bool,
    /// Task lands on its employee's desired date.
    pub desired: bool,
}

/// Flattens a schedule into rows, sorted by (project, sequence).
pub fn schedule_rows(schedule: &Schedule) -> Vec<ScheduleRow> {
    let mut rows: Vec<ScheduleRow> = schedule
        .tasks
        .iter()
        .map(|task| {
            let employee = schedule.employee_of(task);
            let date = schedule.task_date(task);
            ScheduleRow {
                project_id: task.project_id.clone(),
                sequence_number: task.sequence_number,
                employee_name: employee
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| UNASSIGNED.to_string()),
                description: task.description.clone(),
                start: schedule.task_start(task),
                end: schedule.task_end(task),
                duration_hours: task.duration_hours(),
                required_skill: task.required_skill.clone(),
                pinned: task.pinned,
                unavailable: employee
                    .map(|e| e.unavailable_dates.contains(&date))
                    .unwrap_or(false),
                undesired: employee
                    .map(|e| e.undesired_dates.contains(&date))
                    .unwrap_or(false),
                desired: employee
                    .map(|e| e.desired_dates.contains(&date))
                    .unwrap_or(false),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.project_id.as_str(), a.sequence_number)
            .cmp(&(b.project_id.as_str(), b.sequence_number))
    });
    rows
}

/// Per-employee summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRow {
    /// Employee name.
    pub name: String,
    /// Comma-separated skill list.
    pub skills: String,
    /// Number of unavailable dates.
    pub unavailable_count: usize,
    /// Number of undesired dates.
    pub undesired_count: usize,
    /// Number of desired dates.
    pub desired_count: usize,
    /// Tasks currently assigned.
    pub assigned_tasks: usize,
}

/// Summarizes the employee pool.
pub fn employee_rows(schedule: &Schedule) -> Vec<EmployeeRow> {
    let counts = schedule.employee_task_counts();
    schedule
        .employees
        .iter()
        .zip(counts)
        .map(|(employee, assigned_tasks)| EmployeeRow {
            name: employee.name.clone(),
            skills: employee
                .skills
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            unavailable_count: employee.unavailable_dates.len(),
            undesired_count: employee.undesired_dates.len(),
            desired_count: employee.desired_dates.len(),
            assigned_tasks,
        })
        .collect()
}
