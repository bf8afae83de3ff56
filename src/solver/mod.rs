//! Schedule optimization.
//!
//! Two phases over a mutable [`Schedule`]:
//!
//! 1. **Construction** places every unpinned task greedily at the first
//!    (employee, start slot) pair with no hard violations against the
//!    tasks already fixed, falling back to the least-bad placement.
//! 2. **Local search** refines the assignment with late-acceptance hill
//!    climbing (Burke & Bykov, 2017): a candidate move is accepted when
//!    its score is no worse than the current one or the one from
//!    `history_length` steps ago. Scores compare lexicographically, so a
//!    move never trades hard feasibility for soft quality.
//!
//! Pinned tasks are excluded from the move candidate index by
//! construction; no move can touch them.
//!
//! Every strict improvement of the best score is reported through the
//! listener with a deep copy of the schedule, which is what the job
//! registry in [`service`] stores for polling.

pub mod service;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::models::Schedule;
use crate::scoring;
use crate::slots;

/// Solver tuning and termination parameters.
///
/// With every limit set to `None` the solver runs until cooperatively
/// terminated, matching the submit-and-poll workflow.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Seed for move selection.
    pub seed: u64,
    /// Late-acceptance history length.
    pub history_length: usize,
    /// Maximum local-search steps.
    pub max_steps: Option<u64>,
    /// Wall-clock limit for the local search.
    pub time_limit: Option<Duration>,
    /// Steps without a best-score improvement before giving up.
    pub stall_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: 37,
            history_length: 128,
            max_steps: Some(50_000),
            time_limit: None,
            stall_limit: Some(10_000),
        }
    }
}

impl SolverConfig {
    /// A configuration with no step, time, or stall limits; the solve
    /// runs until terminated externally.
    pub fn unbounded() -> Self {
        Self {
            max_steps: None,
            time_limit: None,
            stall_limit: None,
            ..Self::default()
        }
    }

    /// Sets the move-selection seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the step limit.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the stall limit.
    pub fn with_stall_limit(mut self, stall_limit: u64) -> Self {
        self.stall_limit = Some(stall_limit);
        self
    }
}

/// Construction plus late-acceptance local search.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Creates a solver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solves to completion and returns the best schedule found.
    pub fn solve(&self, schedule: Schedule) -> Schedule {
        let terminate = AtomicBool::new(false);
        self.solve_with_listener(schedule, &terminate, |_| {})
    }

    /// Solves, invoking `on_best` with a scored deep copy on every
    /// strict improvement of the best score (including the constructed
    /// initial solution). Checks `terminate` between moves and exits
    /// cleanly when it is set.
    pub fn solve_with_listener(
        &self,
        mut schedule: Schedule,
        terminate: &AtomicBool,
        mut on_best: impl FnMut(&Schedule),
    ) -> Schedule {
        construct(&mut schedule);
        let mut current_score = scoring::score(&schedule);
        schedule.score = Some(current_score);
        let mut best = schedule.clone();
        let mut best_score = current_score;
        on_best(&best);
        tracing::info!(score = %current_score, "construction finished");

        let unpinned = schedule.unpinned_indices();
        if unpinned.is_empty() || schedule.employees.is_empty() {
            return best;
        }

        let history_length = self.config.history_length.max(1);
        let mut history = vec![current_score; history_length];
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let started = Instant::now();
        let mut stall: u64 = 0;
        let mut step: u64 = 0;

        loop {
            if terminate.load(Ordering::Relaxed) {
                tracing::debug!(step, "termination requested");
                break;
            }
            if self.config.max_steps.is_some_and(|max| step >= max) {
                break;
            }
            if self
                .config
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                break;
            }
            if self.config.stall_limit.is_some_and(|limit| stall >= limit) {
                break;
            }

            let candidate_move = propose_move(&schedule, &unpinned, &mut rng);
            let inverse = candidate_move.apply(&mut schedule);
            let candidate_score = scoring::score(&schedule);

            let slot = (step as usize) % history_length;
            if candidate_score >= current_score || candidate_score >= history[slot] {
                current_score = candidate_score;
                if candidate_score > best_score {
                    best_score = candidate_score;
                    schedule.score = Some(candidate_score);
                    best = schedule.clone();
                    on_best(&best);
                    stall = 0;
                } else {
                    stall += 1;
                }
            } else {
                inverse.apply(&mut schedule);
                stall += 1;
            }
            history[slot] = current_score;
            step += 1;
        }

        tracing::info!(steps = step, score = %best_score, "local search finished");
        best
    }
}

/// A local-search move over unpinned tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    /// Change one task's employee.
    Reassign {
        task: usize,
        employee: Option<usize>,
    },
    /// Change one task's start slot.
    Shift { task: usize, start_slot: i64 },
    /// Exchange the (employee, start slot) pairs of two tasks.
    Swap { a: usize, b: usize },
}

impl Move {
    /// Applies the move and returns its inverse.
    fn apply(self, schedule: &mut Schedule) -> Move {
        match self {
            Move::Reassign { task, employee } => {
                let previous = schedule.tasks[task].employee;
                schedule.tasks[task].employee = employee;
                Move::Reassign {
                    task,
                    employee: previous,
                }
            }
            Move::Shift { task, start_slot } => {
                let previous = schedule.tasks[task].start_slot;
                schedule.tasks[task].start_slot = start_slot;
                Move::Shift {
                    task,
                    start_slot: previous,
                }
            }
            Move::Swap { a, b } => {
                let (emp_a, start_a) = (schedule.tasks[a].employee, schedule.tasks[a].start_slot);
                let (emp_b, start_b) = (schedule.tasks[b].employee, schedule.tasks[b].start_slot);
                schedule.tasks[a].employee = emp_b;
                schedule.tasks[a].start_slot = start_b;
                schedule.tasks[b].employee = emp_a;
                schedule.tasks[b].start_slot = start_a;
                Move::Swap { a, b }
            }
        }
    }
}

/// Picks a random move over the unpinned candidate index.
fn propose_move(schedule: &Schedule, unpinned: &[usize], rng: &mut SmallRng) -> Move {
    let kind = rng.random_range(0..3u8);
    match kind {
        0 if schedule.employees.len() > 1 => {
            let task = *unpinned.choose(rng).expect("non-empty candidate index");
            let employee = rng.random_range(0..schedule.employees.len());
            Move::Reassign {
                task,
                employee: Some(employee),
            }
        }
        2 if unpinned.len() > 1 => {
            let a = *unpinned.choose(rng).expect("non-empty candidate index");
            let mut b = *unpinned.choose(rng).expect("non-empty candidate index");
            while b == a {
                b = *unpinned.choose(rng).expect("non-empty candidate index");
            }
            Move::Swap { a, b }
        }
        _ => {
            let task = *unpinned.choose(rng).expect("non-empty candidate index");
            let duration = schedule.tasks[task].duration_slots;
            let max_start = (schedule.schedule_info.total_slots - duration).max(0);
            Move::Shift {
                task,
                start_slot: rng.random_range(0..=max_start),
            }
        }
    }
}

/// Greedy construction: place unpinned tasks in (project, sequence)
/// order at the first hard-feasible (employee, start slot), else the
/// least-bad one found.
fn construct(schedule: &mut Schedule) {
    if schedule.employees.is_empty() {
        return;
    }
    let mut order = schedule.unpinned_indices();
    order.sort_by(|&a, &b| {
        let ta = &schedule.tasks[a];
        let tb = &schedule.tasks[b];
        (ta.project_id.as_str(), ta.sequence_number)
            .cmp(&(tb.project_id.as_str(), tb.sequence_number))
    });

    let mut placed: Vec<bool> = schedule.tasks.iter().map(|t| t.pinned).collect();
    for &idx in &order {
        let (employee, start_slot) = best_placement(schedule, idx, &placed);
        schedule.tasks[idx].employee = Some(employee);
        schedule.tasks[idx].start_slot = start_slot;
        placed[idx] = true;
    }
}

fn best_placement(schedule: &Schedule, idx: usize, placed: &[bool]) -> (usize, i64) {
    let task = &schedule.tasks[idx];
    let max_start = (schedule.schedule_info.total_slots - task.duration_slots).max(0);

    // Skill holders first; the sort is stable so index order breaks ties.
    let mut employee_order: Vec<usize> = (0..schedule.employees.len()).collect();
    employee_order.sort_by_key(|&e| !schedule.employees[e].has_skill(&task.required_skill));

    let mut best = (employee_order[0], 0i64);
    let mut best_violations = i64::MAX;
    for &employee in &employee_order {
        for start_slot in 0..=max_start {
            let violations = placement_violations(schedule, idx, employee, start_slot, placed);
            if violations < best_violations {
                best = (employee, start_slot);
                best_violations = violations;
                if violations == 0 {
                    return best;
                }
            }
        }
    }
    best
}

/// Hard-violation count for placing one task, evaluated against the
/// already-fixed tasks only.
fn placement_violations(
    schedule: &Schedule,
    idx: usize,
    employee: usize,
    start_slot: i64,
    placed: &[bool],
) -> i64 {
    let task = &schedule.tasks[idx];
    let end_slot = start_slot + task.duration_slots;
    let info = &schedule.schedule_info;
    let mut violations = 0i64;

    let holder = &schedule.employees[employee];
    if !holder.has_skill(&task.required_skill) {
        violations += 1;
    }
    if end_slot > info.total_slots {
        violations += 1;
    }
    if slots::spans_lunch(start_slot, task.duration_slots) {
        violations += 1;
    }
    if slots::is_weekend_slot(start_slot) {
        violations += 1;
    }
    if holder
        .unavailable_dates
        .contains(&slots::slot_date(start_slot, info.base_date))
    {
        violations += 1;
    }

    for (j, other) in schedule.tasks.iter().enumerate() {
        if j == idx || !placed[j] {
            continue;
        }
        if other.employee == Some(employee) {
            let overlap_start = start_slot.max(other.start_slot);
            let overlap_end = end_slot.min(other.end_slot());
            violations += (overlap_end - overlap_start).max(0);
        }
        if !task.project_id.is_empty()
            && task.project_id == other.project_id
            && other.employee.is_some()
        {
            if other.sequence_number < task.sequence_number {
                violations += (other.end_slot() - start_slot).max(0);
            } else if task.sequence_number < other.sequence_number {
                violations += (end_slot - other.start_slot).max(0);
            }
        }
    }

    violations
}
