//! Constraint scoring.
//!
//! Each constraint is an independent pure function over a [`Schedule`]
//! that reports its score contribution and how many times it matched.
//! [`score`] sums the contributions; [`analyze`] keeps the breakdown for
//! diagnostics.
//!
//! The scorer recomputes from scratch on every call. At the scale this
//! crate targets a full pass is cheap enough for the optimizer's move
//! loop, and it keeps the constraint code free of incremental-update
//! invariants.
//!
//! # Constraint exemptions
//!
//! Unassigned tasks are exempt from the employee-keyed constraints
//! (required skill, overlap, unavailable/undesired/desired day). The
//! time-shape constraints (bounds, lunch, weekend) apply regardless of
//! assignment.

use rust_decimal::{Decimal, MathematicalOps};

use crate::models::{HardSoftScore, Schedule};
use crate::slots;

/// One constraint's contribution to the total score.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConstraintAnalysis {
    /// Constraint name.
    pub name: &'static str,
    /// Score contribution (negative = penalty, positive = reward).
    pub score: HardSoftScore,
    /// Number of matches that produced the contribution.
    pub matches: usize,
}

/// Per-constraint breakdown of a schedule's score.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScoreAnalysis {
    /// Total score across all constraints.
    pub score: HardSoftScore,
    /// Individual constraint contributions.
    pub constraints: Vec<ConstraintAnalysis>,
}

type ConstraintFn = fn(&Schedule) -> ConstraintAnalysis;

const CONSTRAINTS: &[ConstraintFn] = &[
    required_skill,
    no_overlapping_tasks,
    task_within_schedule,
    task_fits_in_schedule,
    unavailable_employee,
    no_lunch_break_spanning,
    no_weekend_scheduling,
    project_sequence_order,
    undesired_day_for_employee,
    desired_day_for_employee,
    balanced_workload,
];

/// Computes the total hard/soft score of a schedule.
pub fn score(schedule: &Schedule) -> HardSoftScore {
    CONSTRAINTS.iter().map(|c| c(schedule).score).sum()
}

/// Computes the total score with a per-constraint breakdown.
pub fn analyze(schedule: &Schedule) -> ScoreAnalysis {
    let constraints: Vec<ConstraintAnalysis> = CONSTRAINTS.iter().map(|c| c(schedule)).collect();
    let score = constraints.iter().map(|c| c.score).sum();
    ScoreAnalysis { score, constraints }
}

/// Assigned employee must have the task's required skill.
pub fn required_skill(schedule: &Schedule) -> ConstraintAnalysis {
    let mut matches = 0;
    for task in &schedule.tasks {
        if let Some(employee) = schedule.employee_of(task) {
            if !employee.has_skill(&task.required_skill) {
                matches += 1;
            }
        }
    }
    penalty_hard("Required skill", matches, Decimal::from(matches as i64))
}

/// Tasks of the same employee must not overlap; penalty is the number of
/// shared slots per offending pair.
pub fn no_overlapping_tasks(schedule: &Schedule) -> ConstraintAnalysis {
    let mut matches = 0;
    let mut total = Decimal::ZERO;
    for (i, a) in schedule.tasks.iter().enumerate() {
        let Some(emp_a) = a.employee else { continue };
        for b in &schedule.tasks[i + 1..] {
            if b.employee != Some(emp_a) {
                continue;
            }
            let overlap = a.slot_overlap(b);
            if overlap > 0 {
                matches += 1;
                total += Decimal::from(overlap);
            }
        }
    }
    penalty_hard("No overlapping tasks", matches, total)
}

/// Tasks must not start before slot 0.
pub fn task_within_schedule(schedule: &Schedule) -> ConstraintAnalysis {
    let matches = schedule.tasks.iter().filter(|t| t.start_slot < 0).count();
    penalty_hard("Task within schedule", matches, Decimal::from(matches as i64))
}

/// Tasks must end within the horizon.
pub fn task_fits_in_schedule(schedule: &Schedule) -> ConstraintAnalysis {
    let total_slots = schedule.schedule_info.total_slots;
    let matches = schedule
        .tasks
        .iter()
        .filter(|t| t.end_slot() > total_slots)
        .count();
    penalty_hard("Task fits in schedule", matches, Decimal::from(matches as i64))
}

/// Tasks must not land on their employee's unavailable dates.
pub fn unavailable_employee(schedule: &Schedule) -> ConstraintAnalysis {
    let matches = schedule
        .tasks
        .iter()
        .filter(|t| {
            schedule
                .employee_of(t)
                .map(|e| e.unavailable_dates.contains(&schedule.task_date(t)))
                .unwrap_or(false)
        })
        .count();
    penalty_hard("Unavailable employee", matches, Decimal::from(matches as i64))
}

/// Tasks must not span the lunch hour.
pub fn no_lunch_break_spanning(schedule: &Schedule) -> ConstraintAnalysis {
    let matches = schedule
        .tasks
        .iter()
        .filter(|t| slots::spans_lunch(t.start_slot, t.duration_slots))
        .count();
    penalty_hard("No lunch break spanning", matches, Decimal::from(matches as i64))
}

/// Tasks must not start on the (simplified) weekend.
pub fn no_weekend_scheduling(schedule: &Schedule) -> ConstraintAnalysis {
    let matches = schedule
        .tasks
        .iter()
        .filter(|t| slots::is_weekend_slot(t.start_slot))
        .count();
    penalty_hard("No weekend scheduling", matches, Decimal::from(matches as i64))
}

/// Within a project, a lower-sequence task must finish before a
/// higher-sequence task starts; penalty is the slot overlap of the
/// violation.
pub fn project_sequence_order(schedule: &Schedule) -> ConstraintAnalysis {
    let mut matches = 0;
    let mut total = Decimal::ZERO;
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
            let spill = earlier.end_slot() - later.start_slot;
            if spill > 0 {
                matches += 1;
                total += Decimal::from(spill);
            }
        }
    }
    penalty_hard("Project task sequence order", matches, total)
}

/// Soft penalty per task on an undesired date of its employee.
pub fn undesired_day_for_employee(schedule: &Schedule) -> ConstraintAnalysis {
    let matches = schedule
        .tasks
        .iter()
        .filter(|t| {
            schedule
                .employee_of(t)
                .map(|e| e.undesired_dates.contains(&schedule.task_date(t)))
                .unwrap_or(false)
        })
        .count();
    ConstraintAnalysis {
        name: "Undesired day for employee",
        score: HardSoftScore::new(Decimal::ZERO, -Decimal::from(matches as i64)),
        matches,
    }
}

/// Soft reward per task on a desired date of its employee.
pub fn desired_day_for_employee(schedule: &Schedule) -> ConstraintAnalysis {
    let matches = schedule
        .tasks
        .iter()
        .filter(|t| {
            schedule
                .employee_of(t)
                .map(|e| e.desired_dates.contains(&schedule.task_date(t)))
                .unwrap_or(false)
        })
        .count();
    ConstraintAnalysis {
        name: "Desired day for employee",
        score: HardSoftScore::new(Decimal::ZERO, Decimal::from(matches as i64)),
        matches,
    }
}

/// Soft penalty for uneven task distribution across employees.
///
/// The unfairness metric is the population standard deviation of the
/// per-employee task counts (employees with zero tasks included):
/// counts (2, 2) score 0, (2, 1) score 0.5, (3, 0) score 1.5.
pub fn balanced_workload(schedule: &Schedule) -> ConstraintAnalysis {
    let unfairness = workload_unfairness(&schedule.employee_task_counts());
    ConstraintAnalysis {
        name: "Balance employee task assignments",
        score: HardSoftScore::new(Decimal::ZERO, -unfairness),
        matches: usize::from(!schedule.employees.is_empty()),
    }
}

/// Population standard deviation of task counts.
fn workload_unfairness(counts: &[usize]) -> Decimal {
    if counts.is_empty() {
        return Decimal::ZERO;
    }
    let n = Decimal::from(counts.len() as i64);
    let sum: Decimal = counts.iter().map(|&c| Decimal::from(c as i64)).sum();
    let mean = sum / n;
    let variance: Decimal = counts
        .iter()
        .map(|&c| {
            let d = Decimal::from(c as i64) - mean;
            d * d
        })
        .sum::<Decimal>()
        / n;
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

fn penalty_hard(name: &'static str, matches: usize, amount: Decimal) -> ConstraintAnalysis {
    ConstraintAnalysis {
        name,
        score: HardSoftScore::new(-amount, Decimal::ZERO),
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, ScheduleInfo, Task};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn schedule_with(employees: Vec<Employee>, tasks: Vec<Task>) -> Schedule {
        Schedule::new(employees, tasks, ScheduleInfo::new(100, base()))
    }

    fn alice() -> Employee {
        Employee::new("Alice").with_skills(["Python", "Java"])
    }

    fn bob() -> Employee {
        Employee::new("Bob").with_skill("Java")
    }

    #[test]
    fn test_required_skill_violation() {
        // Bob lacks Python.
        let s = schedule_with(
            vec![alice(), bob()],
            vec![Task::new("t1", "Python work", "Python", 2).with_employee(1)],
        );
        let a = required_skill(&s);
        assert_eq!(a.matches, 1);
        assert_eq!(a.score, HardSoftScore::of_hard(-1));
    }

    #[test]
    fn test_required_skill_satisfied() {
        let s = schedule_with(
            vec![alice()],
            vec![Task::new("t1", "Python work", "Python", 2).with_employee(0)],
        );
        assert_eq!(required_skill(&s).score, HardSoftScore::ZERO);
    }

    #[test]
    fn test_required_skill_unassigned_exempt() {
        let s = schedule_with(
            vec![alice()],
            vec![Task::new("t1", "Python work", "Python", 2)],
        );
        assert_eq!(required_skill(&s).matches, 0);
    }

    #[test]
    fn test_overlap_penalty_is_slot_count() {
        // Slots 0-3 and 2-4 share exactly 2 slots.
        let s = schedule_with(
            vec![alice()],
            vec![
                Task::new("t1", "A", "Python", 4).with_start_slot(0).with_employee(0),
                Task::new("t2", "B", "Java", 3).with_start_slot(2).with_employee(0),
            ],
        );
        let a = no_overlapping_tasks(&s);
        assert_eq!(a.matches, 1);
        assert_eq!(a.score, HardSoftScore::of_hard(-2));
    }

    #[test]
    fn test_overlap_different_employees_ok() {
        let s = schedule_with(
            vec![alice(), bob()],
            vec![
                Task::new("t1", "A", "Python", 4).with_start_slot(0).with_employee(0),
                Task::new("t2", "B", "Java", 4).with_start_slot(0).with_employee(1),
            ],
        );
        assert_eq!(no_overlapping_tasks(&s).matches, 0);
    }

    #[test]
    fn test_overlap_adjacent_tasks_ok() {
        let s = schedule_with(
            vec![alice()],
            vec![
                Task::new("t1", "A", "Python", 4).with_start_slot(0).with_employee(0),
                Task::new("t2", "B", "Java", 2).with_start_slot(4).with_employee(0),
            ],
        );
        assert_eq!(no_overlapping_tasks(&s).score, HardSoftScore::ZERO);
    }

    #[test]
    fn test_overlap_unassigned_exempt() {
        let s = schedule_with(
            vec![alice()],
            vec![
                Task::new("t1", "A", "Python", 4).with_start_slot(0),
                Task::new("t2", "B", "Java", 4).with_start_slot(0),
            ],
        );
        assert_eq!(no_overlapping_tasks(&s).matches, 0);
    }

    #[test]
    fn test_task_bounds() {
        let mut early = Task::new("t1", "A", "Python", 2).with_employee(0);
        early.start_slot = -1;
        let late = Task::new("t2", "B", "Python", 10)
            .with_start_slot(95)
            .with_employee(0);
        let s = schedule_with(vec![alice()], vec![early, late]);

        assert_eq!(task_within_schedule(&s).matches, 1);
        assert_eq!(task_fits_in_schedule(&s).matches, 1);
    }

    #[test]
    fn test_unavailable_employee() {
        let day = base(); // slot 0 maps to the base date
        let s = schedule_with(
            vec![alice().with_unavailable_date(day)],
            vec![Task::new("t1", "A", "Python", 2).with_start_slot(0).with_employee(0)],
        );
        assert_eq!(unavailable_employee(&s).matches, 1);

        // Next day is fine.
        let s2 = schedule_with(
            vec![alice().with_unavailable_date(day)],
            vec![Task::new("t1", "A", "Python", 2).with_start_slot(20).with_employee(0)],
        );
        assert_eq!(unavailable_employee(&s2).matches, 0);
    }

    #[test]
    fn test_lunch_spanning_applies_without_employee() {
        let s = schedule_with(
            vec![alice()],
            vec![Task::new("t1", "A", "Python", 4).with_start_slot(6)],
        );
        assert_eq!(no_lunch_break_spanning(&s).matches, 1);
    }

    #[test]
    fn test_weekend_scheduling() {
        let s = schedule_with(
            vec![alice()],
            vec![Task::new("t1", "A", "Python", 2).with_start_slot(5 * 20).with_employee(0)],
        );
        assert_eq!(no_weekend_scheduling(&s).matches, 1);

        let s2 = schedule_with(
            vec![alice()],
            vec![Task::new("t1", "A", "Python", 2).with_start_slot(4 * 20).with_employee(0)],
        );
        assert_eq!(no_weekend_scheduling(&s2).matches, 0);
    }

    #[test]
    fn test_sequence_order_violation_and_fix() {
        // A (seq 1) occupies slots 0-3, B (seq 2) starts at slot 2: 2-slot spill.
        let make = |b_start: i64| {
            schedule_with(
                vec![alice()],
                vec![
                    Task::new("a", "First", "Python", 4)
                        .with_project("P", 1)
                        .with_start_slot(0)
                        .with_employee(0),
                    Task::new("b", "Second", "Java", 3)
                        .with_project("P", 2)
                        .with_start_slot(b_start)
                        .with_employee(0),
                ],
            )
        };
        let a = project_sequence_order(&make(2));
        assert_eq!(a.matches, 1);
        assert_eq!(a.score, HardSoftScore::of_hard(-2));

        // B starting at A's end slot resolves the violation.
        assert_eq!(project_sequence_order(&make(4)).score, HardSoftScore::ZERO);
    }

    #[test]
    fn test_sequence_order_ignores_other_projects_and_unassigned() {
        let s = schedule_with(
            vec![alice()],
            vec![
                Task::new("a", "First", "Python", 4)
                    .with_project("P", 1)
                    .with_start_slot(0)
                    .with_employee(0),
                Task::new("b", "Second", "Java", 3)
                    .with_project("Q", 2)
                    .with_start_slot(2)
                    .with_employee(0),
                Task::new("c", "Third", "Java", 3).with_project("P", 2).with_start_slot(2),
            ],
        );
        assert_eq!(project_sequence_order(&s).matches, 0);
    }

    #[test]
    fn test_undesired_and_desired_days() {
        let day = base();
        let employees = vec![alice().with_undesired_date(day), bob().with_desired_date(day)];
        let s = schedule_with(
            employees,
            vec![
                Task::new("t1", "A", "Python", 2).with_start_slot(0).with_employee(0),
                Task::new("t2", "B", "Java", 2).with_start_slot(4).with_employee(1),
            ],
        );
        assert_eq!(undesired_day_for_employee(&s).score, HardSoftScore::of_soft(-1));
        assert_eq!(desired_day_for_employee(&s).score, HardSoftScore::of_soft(1));
    }

    #[test]
    fn test_preference_days_unassigned_exempt() {
        let day = base();
        let s = schedule_with(
            vec![alice().with_undesired_date(day).with_desired_date(day)],
            vec![Task::new("t1", "A", "Python", 2).with_start_slot(0)],
        );
        assert_eq!(undesired_day_for_employee(&s).matches, 0);
        assert_eq!(desired_day_for_employee(&s).matches, 0);
    }

    #[test]
    fn test_workload_unfairness_metric() {
        assert_eq!(workload_unfairness(&[2, 2]), Decimal::ZERO);
        let uneven = workload_unfairness(&[3, 0]);
        let mild = workload_unfairness(&[2, 1]);
        assert!(uneven > mild);
        assert!(mild > Decimal::ZERO);
        // Exact values: population std dev.
        assert_eq!(mild, dec!(0.5));
        assert_eq!(uneven, dec!(1.5));
    }

    #[test]
    fn test_balanced_workload_counts_idle_employees() {
        // Both tasks on Alice while Bob idles: counts (2, 0) → penalty 1.
        let s = schedule_with(
            vec![alice(), bob()],
            vec![
                Task::new("t1", "A", "Python", 2).with_start_slot(0).with_employee(0),
                Task::new("t2", "B", "Java", 2).with_start_slot(4).with_employee(0),
            ],
        );
        let a = balanced_workload(&s);
        assert_eq!(a.score, HardSoftScore::of_soft(-1));
    }

    #[test]
    fn test_score_sums_constraints() {
        // One skill violation plus one 2-slot overlap.
        let s = schedule_with(
            vec![bob()],
            vec![
                Task::new("t1", "A", "Python", 4).with_start_slot(0).with_employee(0),
                Task::new("t2", "B", "Java", 3).with_start_slot(2).with_employee(0),
            ],
        );
        let total = score(&s);
        assert_eq!(total.hard, dec!(-3));
    }

    #[test]
    fn test_analyze_breakdown() {
        let s = schedule_with(
            vec![bob()],
            vec![Task::new("t1", "A", "Python", 2).with_start_slot(0).with_employee(0)],
        );
        let analysis = analyze(&s);
        assert_eq!(analysis.score, score(&s));
        let skill = analysis
            .constraints
            .iter()
            .find(|c| c.name == "Required skill")
            .unwrap();
        assert_eq!(skill.matches, 1);
        assert_eq!(analysis.constraints.len(), 11);
    }

    #[test]
    fn test_empty_schedule_scores_zero() {
        let s = schedule_with(vec![], vec![]);
        assert_eq!(score(&s), HardSoftScore::ZERO);
    }
}
