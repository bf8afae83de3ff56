//! Task model.
//!
//! A task is the planning entity: a unit of work requiring one skill for
//! a whole number of 30-minute slots. `start_slot` and `employee` are
//! the decision variables; on pinned tasks they are fixed inputs that
//! the optimizer must never touch.

use serde::{Deserialize, Serialize};

/// A task to be scheduled.
///
/// The assigned employee is an index into the owning schedule's employee
/// arena, so moves can reference assignments without a pointer graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Skill the assigned employee must have.
    pub required_skill: String,
    /// Number of 30-minute slots required (> 0).
    pub duration_slots: i64,
    /// Project this task belongs to. Empty = no project grouping.
    pub project_id: String,
    /// Order of this task within its project.
    pub sequence_number: i64,
    /// Whether employee and start slot are fixed inputs.
    pub pinned: bool,
    /// Slot index at which the task starts.
    pub start_slot: i64,
    /// Index of the assigned employee, if any.
    pub employee: Option<usize>,
}

impl Task {
    /// Creates an unpinned task starting at slot 0 with no employee.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        required_skill: impl Into<String>,
        duration_slots: i64,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            required_skill: required_skill.into(),
            duration_slots,
            project_id: String::new(),
            sequence_number: 0,
            pinned: false,
            start_slot: 0,
            employee: None,
        }
    }

    /// Sets the project grouping.
    pub fn with_project(mut self, project_id: impl Into<String>, sequence_number: i64) -> Self {
        self.project_id = project_id.into();
        self.sequence_number = sequence_number;
        self
    }

    /// Sets the start slot.
    pub fn with_start_slot(mut self, start_slot: i64) -> Self {
        self.start_slot = start_slot;
        self
    }

    /// Assigns an employee by arena index.
    pub fn with_employee(mut self, employee: usize) -> Self {
        self.employee = Some(employee);
        self
    }

    /// Pins the task at its current employee and start slot.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Slot one past the last slot this task occupies.
    #[inline]
    pub fn end_slot(&self) -> i64 {
        self.start_slot + self.duration_slots
    }

    /// Number of slots this task shares with another.
    ///
    /// Zero for adjacent or disjoint tasks.
    pub fn slot_overlap(&self, other: &Task) -> i64 {
        let overlap_start = self.start_slot.max(other.start_slot);
        let overlap_end = self.end_slot().min(other.end_slot());
        (overlap_end - overlap_start).max(0)
    }

    /// Duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.duration_slots as f64 / 2.0
    }
}
