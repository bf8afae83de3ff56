//! Infeasibility diagnosis.
//!
//! When a solve ends with a negative hard score the schedule is
//! structurally over-constrained; retrying will not help. This module
//! turns the scorer's breakdown plus a few whole-problem checks into an
//! explanation a caller can act on: which skills nobody has, whether
//! the horizon is simply too small, how many tasks stayed unassigned,
//! and which project orderings are contradicted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::Schedule;
use crate::scoring::{self, ConstraintAnalysis};

/// Result of the capacity check: demanded versus available work hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityCheck {
    /// Hours of work the tasks require.
    pub required_hours: Decimal,
    /// Hours the employee pool can supply over the horizon.
    pub available_hours: Decimal,
}

impl CapacityCheck {
    /// Whether demand exceeds supply.
    pub fn is_shortfall(&self) -> bool {
        self.required_hours > self.available_hours
    }
}

/// A contradicted project ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConflict {
    /// Project the two tasks belong to.
    pub project_id: String,
    /// Id of the task that should run first.
    pub earlier_task: String,
    /// Id of the task it currently collides with.
    pub later_task: String,
}

/// Structured explanation of an infeasible schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDiagnosis {
    /// Skills required by some task but held by no employee.
    pub missing_skills: Vec<String>,
    /// Demand-versus-supply hours check.
    pub capacity: CapacityCheck,
    /// Tasks with no assigned employee.
    pub unassigned_tasks: usize,
    /// Project orderings contradicted by the current assignment.
    pub sequence_conflicts: Vec<SequenceConflict>,
    /// Constraints contributing a negative score.
    pub broken_constraints: Vec<ConstraintAnalysis>,
}

impl ScheduleDiagnosis {
    /// Analyzes a schedule.
    ///
    /// Meaningful when the hard score is negative; on a feasible
    /// schedule every field comes back empty or zero.
    pub fn diagnose(schedule: &Schedule) -> Self {
        let pool_skills: BTreeSet<&str> = schedule
            .employees
            .iter()
            .flat_map(|e| e.skills.iter().map(String::as_str))
            .collect();
        let missing_skills: Vec<String> = schedule
            .tasks
            .iter()
            .map(|t| t.required_skill.as_str())
            .filter(|s| !s.is_empty() && !pool_skills.contains(s))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();

        let required_slots: i64 = schedule.tasks.iter().map(|t| t.duration_slots).sum();
        let available_slots =
            schedule.schedule_info.total_slots * schedule.employees.len() as i64;
        let capacity = CapacityCheck {
            required_hours: Decimal::from(required_slots) / Decimal::from(2),
            available_hours: Decimal::from(available_slots) / Decimal::from(2),
        };

        let unassigned_tasks = schedule
            .tasks
            .iter()
            .filter(|t| t.employee.is_none())
            .count();

        let mut sequence_conflicts = Vec::new();
        for earlier in &schedule.tasks {
            if earlier.project_id.is_empty() || earlier.employee.is_none() {
                continue;
            }
            for later in &schedule.tasks {
                if later.employee.is_none()
                    || earlier.id == later.id
                    || earlier.project_id != later.project_id
                    || earlier.sequence_number >= later.sequence_number
                {
                    continue;
                }
                if earlier.end_slot() > later.start_slot {
                    sequence_conflicts.push(SequenceConflict {
                        project_id: earlier.project_id.clone(),
                        earlier_task: earlier.id.clone(),
                        later_task: later.id.clone(),
                    });
                }
            }
        }

        let broken_constraints = scoring::analyze(schedule)
            .constraints
            .into_iter()
            .filter(|c| {
                c.score.hard < Decimal::ZERO || c.score.soft < Decimal::ZERO
            })
            .collect();

        Self {
            missing_skills,
            capacity,
            unassigned_tasks,
            sequence_conflicts,
            broken_constraints,
        }
    }

    /// Actionable suggestions derived from the findings, always ending
    /// with the generic remediation list.
    pub fn suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::new();
        if !self.missing_skills.is_empty() {
            suggestions.push(format!(
                "No employee covers: {}. Add employees with these skills or reassign the tasks.",
                self.missing_skills.join(", ")
            ));
        }
        if self.capacity.is_shortfall() {
            suggestions.push(format!(
                "Tasks need {} hours but only {} are available. Add employees or extend the horizon.",
                self.capacity.required_hours, self.capacity.available_hours
            ));
        }
        if self.unassigned_tasks > 0 {
            suggestions.push(format!(
                "{} task(s) have no employee assigned.",
                self.unassigned_tasks
            ));
        }
        if !self.sequence_conflicts.is_empty() {
            suggestions.push(format!(
                "{} project ordering conflict(s) detected. Review task dependencies.",
                self.sequence_conflicts.len()
            ));
        }
        suggestions.extend(
            [
                "Add more employees to increase capacity.",
                "Extend the schedule horizon.",
                "Reduce the task scope.",
                "Relax project sequencing requirements.",
            ]
            .map(String::from),
        );
        suggestions
    }

    /// Human-readable violation summary.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for constraint in &self.broken_constraints {
            lines.push(format!(
                "{}: {} ({} match(es))",
                constraint.name, constraint.score, constraint.matches
            ));
        }
        if lines.is_empty() {
            "No constraint violations detected.".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Renders a one-shot status message for a schedule's current score.
///
/// Feasible schedules report their score; infeasible ones get the
/// violation summary and remediation suggestions attached.
pub fn status_message(schedule: &Schedule) -> String {
    let Some(score) = schedule.score else {
        return "Solving...".to_string();
    };
    if score.is_feasible() {
        return format!("Solved successfully! Score: {score}");
    }

    tracing::warn!(%score, "infeasible solution");
    let diagnosis = ScheduleDiagnosis::diagnose(schedule);
    let suggestions = diagnosis
        .suggestions()
        .into_iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Constraints violated; the schedule is not feasible. Score: {score}\n\n{}\n\nSuggestions:\n{suggestions}",
        diagnosis.summary()
    )
}
