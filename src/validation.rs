//! Structural validation of assembled schedules.
//!
//! Checks the integrity of a schedule before it is handed to the
//! optimizer. These are input defects, not constraint violations: a
//! schedule that fails here is malformed rather than infeasible.

use std::collections::HashSet;

use crate::models::Schedule;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same identifier.
    DuplicateId,
    /// A task references an employee index outside the arena.
    InvalidEmployeeReference,
    /// A task has a non-positive duration.
    NonPositiveDuration,
    /// A pinned task lies outside the horizon.
    PinnedOutOfHorizon,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a schedule's structure.
///
/// Checks:
/// 1. No duplicate task ids
/// 2. No duplicate employee names
/// 3. Every task duration is positive
/// 4. Every employee reference points into the arena
/// 5. Pinned tasks start at or after slot 0 and end within the horizon
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_schedule(schedule: &Schedule) -> ValidationResult {
    let mut errors = Vec::new();

    let mut employee_names = HashSet::new();
    for employee in &schedule.employees {
        if !employee_names.insert(employee.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee name: {}", employee.name),
            ));
        }
    }

    let mut task_ids = HashSet::new();
    for task in &schedule.tasks {
        if !task_ids.insert(task.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task id: {}", task.id),
            ));
        }

        if task.duration_slots <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!(
                    "Task '{}' has non-positive duration {}",
                    task.id, task.duration_slots
                ),
            ));
        }

        if let Some(idx) = task.employee {
            if idx >= schedule.employees.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidEmployeeReference,
                    format!("Task '{}' references unknown employee index {idx}", task.id),
                ));
            }
        }

        if task.pinned
            && (task.start_slot < 0 || task.end_slot() > schedule.schedule_info.total_slots)
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::PinnedOutOfHorizon,
                format!(
                    "Pinned task '{}' occupies slots {}..{} outside horizon 0..{}",
                    task.id,
                    task.start_slot,
                    task.end_slot(),
                    schedule.schedule_info.total_slots
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, ScheduleInfo, Task};
    use chrono::NaiveDate;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn valid_schedule() -> Schedule {
        Schedule::new(
            vec![
                Employee::new("Amy Cole").with_skill("X"),
                Employee::new("Beth Fox").with_skill("Y"),
            ],
            vec![
                Task::new("0", "Kickoff", "X", 2)
                    .with_start_slot(0)
                    .with_employee(0)
                    .pinned(),
                Task::new("1", "Build", "Y", 4).with_employee(1),
            ],
            ScheduleInfo::new(60, base()),
        )
    }

    #[test]
    fn test_valid_schedule() {
        assert!(validate_schedule(&valid_schedule()).is_ok());
    }

    #[test]
    fn test_duplicate_task_id() {
        let mut s = valid_schedule();
        s.tasks[1].id = "0".into();
        let errors = validate_schedule(&s).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_duplicate_employee_name() {
        let mut s = valid_schedule();
        s.employees[1].name = "Amy Cole".into();
        let errors = validate_schedule(&s).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("employee")));
    }

    #[test]
    fn test_non_positive_duration() {
        let mut s = valid_schedule();
        s.tasks[1].duration_slots = 0;
        let errors = validate_schedule(&s).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NonPositiveDuration));
    }

    #[test]
    fn test_invalid_employee_reference() {
        let mut s = valid_schedule();
        s.tasks[1].employee = Some(9);
        let errors = validate_schedule(&s).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidEmployeeReference));
    }

    #[test]
    fn test_pinned_out_of_horizon() {
        let mut s = valid_schedule();
        s.tasks[0].start_slot = 59;
        let errors = validate_schedule(&s).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::PinnedOutOfHorizon));
    }

    #[test]
    fn test_unpinned_out_of_horizon_is_solver_concern() {
        // Unpinned tasks outside the horizon are scored, not rejected.
        let mut s = valid_schedule();
        s.tasks[1].start_slot = 500;
        assert!(validate_schedule(&s).is_ok());
    }

    #[test]
    fn test_multiple_errors_reported() {
        let mut s = valid_schedule();
        s.tasks[1].id = "0".into();
        s.tasks[1].duration_slots = -1;
        let errors = validate_schedule(&s).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
