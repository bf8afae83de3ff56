//! Problem builder.
//!
//! Assembles a solvable [`Schedule`] from two task sources and a
//! generated employee pool:
//!
//! - calendar entries (already validated against working-hour rules by
//!   the caller) become *pinned* tasks whose start slot and employee the
//!   optimizer never touches;
//! - decomposition triples (description, duration, skill) become
//!   *unpinned* tasks seeded at slot 0 for the optimizer to place.
//!
//! Employee generation is seeded: identical inputs and the same seed
//! produce an identical schedule.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::models::{Employee, Schedule, ScheduleInfo, Task};
use crate::slots;
use crate::validation;

/// Project id given to calendar-derived pinned tasks.
pub const EXISTING_PROJECT_ID: &str = "EXISTING";

/// Default project id for decomposition-derived tasks.
pub const DEFAULT_PROJECT_ID: &str = "PROJECT";

const FIRST_NAMES: &[&str] = &[
    "Amy", "Beth", "Carl", "Dan", "Elsa", "Flo", "Gus", "Hugo", "Ivy", "Jay",
];
const LAST_NAMES: &[&str] = &[
    "Cole", "Fox", "Green", "Jones", "King", "Li", "Poe", "Rye", "Smith", "Watt",
];

/// A calendar event to be scheduled as a pinned task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Event summary, used as the task description.
    pub summary: String,
    /// Event start (naive local time).
    pub start: NaiveDateTime,
    /// Event end (naive local time).
    pub end: NaiveDateTime,
}

impl CalendarEntry {
    /// Creates a calendar entry.
    pub fn new(summary: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
        }
    }

    /// Creates a calendar entry from ISO-8601 timestamps.
    ///
    /// Accepts both plain naive timestamps (`2025-01-06T09:00:00`) and
    /// RFC 3339 timestamps with an offset or `Z` suffix (the offset is
    /// dropped; the schedule works in naive local time).
    pub fn from_iso(
        summary: impl Into<String>,
        start_iso: &str,
        end_iso: &str,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            summary: summary.into(),
            start: parse_iso(start_iso)?,
            end: parse_iso(end_iso)?,
        })
    }

    /// Event duration in 30-minute slots, rounded to the nearest slot
    /// with a minimum of one.
    pub fn duration_slots(&self) -> i64 {
        let minutes = (self.end - self.start).num_minutes();
        (minutes + slots::SLOT_MINUTES / 2)
            .div_euclid(slots::SLOT_MINUTES)
            .max(1)
    }
}

fn parse_iso(value: &str) -> Result<NaiveDateTime, BuildError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .map_err(|_| BuildError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// A decomposition-derived task request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Task description.
    pub description: String,
    /// Duration in 30-minute slots.
    pub duration_slots: i64,
    /// Skill the task requires.
    pub skill: String,
}

impl TaskSpec {
    /// Creates a task spec.
    pub fn new(
        description: impl Into<String>,
        duration_slots: i64,
        skill: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            duration_slots,
            skill: skill.into(),
        }
    }
}

/// A weighted count used when sampling how many optional skills an
/// employee receives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountDistribution {
    /// Count drawn when this entry is selected.
    pub count: usize,
    /// Relative selection weight.
    pub weight: f64,
}

impl CountDistribution {
    /// Creates a weighted count.
    pub fn new(count: usize, weight: f64) -> Self {
        Self { count, weight }
    }
}

/// The skill universe employees are generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    /// Skills every generated employee may anchor on (one each).
    pub required_skills: Vec<String>,
    /// Skills distributed on top via the weighted count distribution.
    pub optional_skills: Vec<String>,
}

impl SkillSet {
    /// Creates a skill set.
    pub fn new<I, J, S>(required: I, optional: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_skills: required.into_iter().map(Into::into).collect(),
            optional_skills: optional.into_iter().map(Into::into).collect(),
        }
    }

    /// All skills in the set.
    pub fn all_skills(&self) -> impl Iterator<Item = &str> {
        self.required_skills
            .iter()
            .chain(self.optional_skills.iter())
            .map(String::as_str)
    }
}

/// Parameters controlling employee-pool generation and the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerParams {
    /// Skill universe for employee generation.
    pub skill_set: SkillSet,
    /// Horizon length in working days.
    pub days_in_schedule: i64,
    /// Number of employees to generate.
    pub employee_count: usize,
    /// Weighted distribution of optional-skill counts per employee.
    pub optional_skill_distribution: Vec<CountDistribution>,
    /// Seed for all randomized generation.
    pub random_seed: u64,
}

impl PlannerParams {
    /// Demo parameter set: an engineering skill pool, a year-long
    /// horizon, and a twelve-person team.
    pub fn demo() -> Self {
        Self {
            skill_set: SkillSet::new(
                ["Frontend Engineer", "Backend Engineer", "Cloud Engineer"],
                [
                    "Security Expert",
                    "DevOps Engineer",
                    "Data Engineer",
                    "Network Engineer",
                    "AI Engineer",
                ],
            ),
            days_in_schedule: 365,
            employee_count: 12,
            optional_skill_distribution: vec![
                CountDistribution::new(1, 3.0),
                CountDistribution::new(2, 1.0),
            ],
            random_seed: 37,
        }
    }

    /// Single-employee parameter set: one person who is given the whole
    /// skill superset and no date preferences.
    pub fn solo() -> Self {
        let mut params = Self::demo();
        params.employee_count = 1;
        params
    }

    /// Overrides the employee count.
    pub fn with_employee_count(mut self, employee_count: usize) -> Self {
        self.employee_count = employee_count;
        self
    }

    /// Overrides the horizon length in days.
    pub fn with_days_in_schedule(mut self, days: i64) -> Self {
        self.days_in_schedule = days;
        self
    }

    /// Overrides the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }
}

/// Builds a [`Schedule`] from calendar entries, task specs, and planner
/// parameters.
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    params: PlannerParams,
    calendar_entries: Vec<CalendarEntry>,
    task_specs: Vec<TaskSpec>,
    project_id: String,
    today: Option<NaiveDate>,
    solo: bool,
}

impl ProblemBuilder {
    /// Creates a builder with the given parameters.
    pub fn new(params: PlannerParams) -> Self {
        Self {
            params,
            calendar_entries: Vec::new(),
            task_specs: Vec::new(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            today: None,
            solo: false,
        }
    }

    /// Adds calendar entries (pinned tasks).
    pub fn with_calendar_entries<I: IntoIterator<Item = CalendarEntry>>(
        mut self,
        entries: I,
    ) -> Self {
        self.calendar_entries.extend(entries);
        self
    }

    /// Adds one calendar entry.
    pub fn add_calendar_entry(mut self, entry: CalendarEntry) -> Self {
        self.calendar_entries.push(entry);
        self
    }

    /// Adds decomposition task specs (unpinned tasks).
    pub fn with_task_specs<I: IntoIterator<Item = TaskSpec>>(mut self, specs: I) -> Self {
        self.task_specs.extend(specs);
        self
    }

    /// Adds one task spec.
    pub fn add_task_spec(mut self, spec: TaskSpec) -> Self {
        self.task_specs.push(spec);
        self
    }

    /// Sets the project id for decomposition-derived tasks.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Fixes "today" for base-date defaulting. Without this the current
    /// local date is used.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Requests single-employee construction. Fails at build time unless
    /// `employee_count` is exactly one.
    pub fn solo(mut self) -> Self {
        self.solo = true;
        self
    }

    /// Assembles the schedule.
    pub fn build(self) -> Result<Schedule, BuildError> {
        if self.solo && self.params.employee_count != 1 {
            return Err(BuildError::SoloPoolMismatch {
                employee_count: self.params.employee_count,
            });
        }
        if self.params.employee_count == 0 {
            return Err(BuildError::EmptyEmployeePool);
        }
        let single = self.params.employee_count == 1;
        if !single && self.params.skill_set.required_skills.is_empty() {
            return Err(BuildError::EmptySkillPool);
        }

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let base_date = self
            .calendar_entries
            .iter()
            .map(|e| e.start.date())
            .min()
            .unwrap_or_else(|| next_monday_on_or_after(today));
        tracing::info!(%base_date, "building schedule");

        let mut rng = SmallRng::seed_from_u64(self.params.random_seed);

        let mut tasks = Vec::with_capacity(self.calendar_entries.len() + self.task_specs.len());
        for (seq, entry) in self.calendar_entries.iter().enumerate() {
            let skill = random_skill(&self.params.skill_set, &mut rng);
            tasks.push(
                Task::new(
                    tasks.len().to_string(),
                    &entry.summary,
                    skill,
                    entry.duration_slots(),
                )
                .with_project(EXISTING_PROJECT_ID, seq as i64)
                .with_start_slot(slots::datetime_to_slot(entry.start, base_date))
                .pinned(),
            );
        }
        for (seq, spec) in self.task_specs.iter().enumerate() {
            tasks.push(
                Task::new(
                    tasks.len().to_string(),
                    &spec.description,
                    &spec.skill,
                    spec.duration_slots,
                )
                .with_project(&self.project_id, seq as i64),
            );
        }
        tracing::info!(
            pinned = self.calendar_entries.len(),
            unpinned = self.task_specs.len(),
            "converted tasks"
        );

        let total_slots = self.params.days_in_schedule * slots::SLOTS_PER_DAY;
        let needed_slots = tasks
            .iter()
            .filter(|t| t.pinned)
            .map(Task::end_slot)
            .max()
            .unwrap_or(0);
        if needed_slots > total_slots {
            return Err(BuildError::HorizonTooSmall {
                needed_slots,
                total_slots,
            });
        }

        let needed_skills: BTreeSet<String> = tasks
            .iter()
            .map(|t| t.required_skill.clone())
            .filter(|s| !s.is_empty())
            .collect();

        let employees = if single {
            vec![solo_employee(&self.params.skill_set, &needed_skills, &mut rng)]
        } else {
            let mut pool = generate_employees(&self.params, &needed_skills, &mut rng)?;
            generate_availability(&mut pool, &self.params, base_date, &mut rng);
            pool
        };
        tracing::info!(count = employees.len(), "generated employees");

        seed_assignments(&mut tasks, &employees);

        let schedule = Schedule::new(
            employees,
            tasks,
            ScheduleInfo::new(total_slots, base_date),
        );
        validation::validate_schedule(&schedule).map_err(BuildError::Invalid)?;
        Ok(schedule)
    }
}

/// The next Monday on or after the given date.
pub fn next_monday_on_or_after(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    let offset = (7 - i64::from(date.weekday().num_days_from_monday())) % 7;
    date + Duration::days(offset)
}

fn random_skill(skill_set: &SkillSet, rng: &mut SmallRng) -> String {
    let from_required = rng.random_bool(0.5) || skill_set.optional_skills.is_empty();
    let pool = if from_required && !skill_set.required_skills.is_empty() {
        &skill_set.required_skills
    } else {
        &skill_set.optional_skills
    };
    pool.choose(rng).cloned().unwrap_or_default()
}

fn solo_employee(
    skill_set: &SkillSet,
    needed_skills: &BTreeSet<String>,
    rng: &mut SmallRng,
) -> Employee {
    let name = generate_names(1, rng).remove(0);
    Employee::new(name)
        .with_skills(skill_set.all_skills())
        .with_skills(needed_skills.iter().cloned())
}

fn generate_employees(
    params: &PlannerParams,
    needed_skills: &BTreeSet<String>,
    rng: &mut SmallRng,
) -> Result<Vec<Employee>, BuildError> {
    let names = generate_names(params.employee_count, rng);
    let count_index = if params.optional_skill_distribution.is_empty() {
        None
    } else {
        Some(
            WeightedIndex::new(params.optional_skill_distribution.iter().map(|d| d.weight))
                .map_err(|e| BuildError::InvalidDistribution(e.to_string()))?,
        )
    };

    let mut employees = Vec::with_capacity(params.employee_count);
    for name in names {
        let mut employee = Employee::new(name);
        if let Some(anchor) = params.skill_set.required_skills.choose(rng) {
            employee.skills.insert(anchor.clone());
        }
        if let Some(index) = &count_index {
            let count = params.optional_skill_distribution[index.sample(rng)]
                .count
                .min(params.skill_set.optional_skills.len());
            for skill in params.skill_set.optional_skills.choose_multiple(rng, count) {
                employee.skills.insert(skill.clone());
            }
        }
        employees.push(employee);
    }

    // Every skill some task needs must be held by at least one employee.
    for (i, skill) in needed_skills.iter().enumerate() {
        let idx = i % employees.len();
        employees[idx].skills.insert(skill.clone());
    }

    Ok(employees)
}

/// Random availability preferences, proportional to the horizon length:
/// per 365 days an employee gets at most 21 unavailable and 12 each of
/// undesired/desired days. The three sets are drawn disjointly.
fn generate_availability(
    employees: &mut [Employee],
    params: &PlannerParams,
    base_date: NaiveDate,
    rng: &mut SmallRng,
) {
    let days = params.days_in_schedule;
    let max_unavailable = proportional_limit(21, days).max(1);
    let max_undesired = proportional_limit(12, days);
    let max_desired = proportional_limit(12, days);

    let all_dates: Vec<NaiveDate> = (0..days).map(|i| base_date + Duration::days(i)).collect();

    for employee in employees.iter_mut() {
        let n = rng.random_range(1..=max_unavailable) as usize;
        let unavailable: BTreeSet<NaiveDate> = all_dates
            .choose_multiple(rng, n.min(all_dates.len()))
            .copied()
            .collect();

        let mut remaining: Vec<NaiveDate> = all_dates
            .iter()
            .filter(|d| !unavailable.contains(d))
            .copied()
            .collect();

        let undesired: BTreeSet<NaiveDate> = if max_undesired > 0 && !remaining.is_empty() {
            let n = rng.random_range(0..=max_undesired.min(remaining.len() as i64)) as usize;
            remaining.choose_multiple(rng, n).copied().collect()
        } else {
            BTreeSet::new()
        };
        remaining.retain(|d| !undesired.contains(d));

        let desired: BTreeSet<NaiveDate> = if max_desired > 0 && !remaining.is_empty() {
            let n = rng.random_range(0..=max_desired.min(remaining.len() as i64)) as usize;
            remaining.choose_multiple(rng, n).copied().collect()
        } else {
            BTreeSet::new()
        };

        employee.unavailable_dates = unavailable;
        employee.undesired_dates = undesired;
        employee.desired_dates = desired;
    }
}

fn proportional_limit(per_year: i64, days: i64) -> i64 {
    ((per_year as f64 * days as f64 / 365.0).round() as i64).max(0)
}

fn generate_names(count: usize, rng: &mut SmallRng) -> Vec<String> {
    let mut pool: Vec<String> = FIRST_NAMES
        .iter()
        .flat_map(|first| LAST_NAMES.iter().map(move |last| format!("{first} {last}")))
        .collect();
    pool.shuffle(rng);
    while pool.len() < count {
        let n = pool.len();
        pool.push(format!("Employee {n}"));
    }
    pool.truncate(count);
    pool
}

/// Naive initial assignment: first employee holding the skill, else the
/// first employee. The optimizer overwrites this for unpinned tasks.
fn seed_assignments(tasks: &mut [Task], employees: &[Employee]) {
    for task in tasks.iter_mut() {
        let chosen = employees
            .iter()
            .position(|e| e.has_skill(&task.required_skill))
            .unwrap_or_else(|| {
                tracing::warn!(
                    task = %task.id,
                    skill = %task.required_skill,
                    "no employee holds the required skill; seeding with the first employee"
                );
                0
            });
        task.employee = Some(chosen);
    }
}
