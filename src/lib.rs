//! Slot-based employee task scheduling.
//!
//! Assigns skilled tasks to a pool of employees over a horizon of
//! 30-minute working-time slots, searching for an assignment that
//! satisfies hard feasibility rules (skills, no overlap, availability,
//! lunch and weekend protection, project ordering) and optimizes soft
//! preferences (desired days, workload balance).
//!
//! # Modules
//!
//! - **`slots`**: conversion between calendar time and slot indices
//! - **`models`**: `Employee`, `Task`, `Schedule`, `HardSoftScore`
//! - **`scoring`**: pure constraint functions and score analysis
//! - **`builder`**: merges calendar-pinned and decomposed tasks into a
//!   solvable schedule with a generated employee pool
//! - **`validation`**: structural integrity checks before solving
//! - **`solver`**: greedy construction + late-acceptance local search;
//!   `solver::service` runs jobs on worker threads behind a polling
//!   registry
//! - **`analysis`**: explains infeasible results
//! - **`report`**: flat tabular views for presentation
//!
//! # Workflow
//!
//! ```no_run
//! use slotplan::builder::{PlannerParams, ProblemBuilder, TaskSpec};
//! use slotplan::solver::service::SolverService;
//!
//! let schedule = ProblemBuilder::new(PlannerParams::demo())
//!     .add_task_spec(TaskSpec::new("Draft the design", 4, "Backend Engineer"))
//!     .build()?;
//!
//! let service = SolverService::new();
//! let job_id = service.solve(schedule);
//! // ... poll service.get_result(job_id) until satisfied ...
//! # Ok::<(), slotplan::Error>(())
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Burke & Bykov (2017), "The Late Acceptance Hill-Climbing Heuristic"

pub mod analysis;
pub mod builder;
pub mod error;
pub mod models;
pub mod report;
pub mod scoring;
pub mod slots;
pub mod solver;
pub mod validation;

pub use error::{Error, Result};
