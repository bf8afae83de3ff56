//! Job-based solving with a polling registry.
//!
//! Each submitted schedule gets its own worker thread and job id. The
//! worker owns its schedule exclusively; the only shared state is the
//! registry map, which stores a deep copy of the best schedule every
//! time the solver reports an improvement (copy-on-report). Polls are
//! non-blocking: an unknown or not-yet-improved job simply has no
//! result. Termination is cooperative through a per-job flag the worker
//! checks between moves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use uuid::Uuid;

use crate::error::JobError;
use crate::models::Schedule;
use crate::solver::{Solver, SolverConfig};

/// Lifecycle state of a solve job.
///
/// Improvements are events, not states: they bump the job's improvement
/// counter and replace its stored schedule while the job stays running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JobStatus {
    /// Accepted, worker not yet started.
    Submitted,
    /// Worker actively solving.
    Running,
    /// Worker exited (finished or terminated early).
    Terminated,
}

struct JobEntry {
    status: JobStatus,
    best: Option<Schedule>,
    improvements: u64,
    terminate: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Runs solve jobs on worker threads and tracks their best schedules.
pub struct SolverService {
    config: SolverConfig,
    jobs: Arc<Mutex<HashMap<Uuid, JobEntry>>>,
}

impl SolverService {
    /// Creates a service with the default solver configuration.
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    /// Creates a service whose jobs use the given configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submits a schedule for solving and returns its job id
    /// immediately.
    pub fn solve(&self, schedule: Schedule) -> Uuid {
        let id = Uuid::new_v4();
        let terminate = Arc::new(AtomicBool::new(false));
        lock_jobs(&self.jobs).insert(
            id,
            JobEntry {
                status: JobStatus::Submitted,
                best: None,
                improvements: 0,
                terminate: Arc::clone(&terminate),
                handle: None,
            },
        );

        let jobs = Arc::clone(&self.jobs);
        let config = self.config.clone();
        let handle = std::thread::spawn(move || {
            if let Some(entry) = lock_jobs(&jobs).get_mut(&id) {
                entry.status = JobStatus::Running;
            }
            tracing::info!(job = %id, "solve started");

            let listener_jobs = Arc::clone(&jobs);
            let solver = Solver::with_config(config);
            let result = solver.solve_with_listener(schedule, &terminate, move |best| {
                if let Some(entry) = lock_jobs(&listener_jobs).get_mut(&id) {
                    entry.best = Some(best.clone());
                    entry.improvements += 1;
                }
            });

            if let Some(entry) = lock_jobs(&jobs).get_mut(&id) {
                entry.best = Some(result);
                entry.status = JobStatus::Terminated;
            }
            tracing::info!(job = %id, "solve finished");
        });

        if let Some(entry) = lock_jobs(&self.jobs).get_mut(&id) {
            entry.handle = Some(handle);
        }
        id
    }

    /// Whether a job has reported at least one schedule.
    pub fn has_result(&self, id: Uuid) -> bool {
        lock_jobs(&self.jobs)
            .get(&id)
            .map(|entry| entry.best.is_some())
            .unwrap_or(false)
    }

    /// Snapshot of a job's latest reported schedule.
    pub fn get_result(&self, id: Uuid) -> Option<Schedule> {
        lock_jobs(&self.jobs)
            .get(&id)
            .and_then(|entry| entry.best.clone())
    }

    /// Current lifecycle state of a job.
    pub fn status(&self, id: Uuid) -> Option<JobStatus> {
        lock_jobs(&self.jobs).get(&id).map(|entry| entry.status)
    }

    /// How many improved schedules a job has reported.
    pub fn improvement_count(&self, id: Uuid) -> u64 {
        lock_jobs(&self.jobs)
            .get(&id)
            .map(|entry| entry.improvements)
            .unwrap_or(0)
    }

    /// Requests early termination of a job.
    ///
    /// Returns `false` if the job id is unknown. The worker exits at its
    /// next move boundary, leaving its last reported schedule in place.
    pub fn terminate(&self, id: Uuid) -> bool {
        match lock_jobs(&self.jobs).get(&id) {
            Some(entry) => {
                entry.terminate.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Requests early termination of every job.
    pub fn terminate_all(&self) {
        for entry in lock_jobs(&self.jobs).values() {
            entry.terminate.store(true, Ordering::Relaxed);
        }
    }

    /// Ids of all known jobs.
    pub fn list_jobs(&self) -> Vec<Uuid> {
        lock_jobs(&self.jobs).keys().copied().collect()
    }

    /// Blocks until a job's worker has exited.
    pub fn join(&self, id: Uuid) -> Result<(), JobError> {
        let handle = {
            let mut jobs = lock_jobs(&self.jobs);
            let entry = jobs.get_mut(&id).ok_or(JobError::NotFound { id })?;
            entry.handle.take()
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!(job = %id, "solver worker panicked");
            }
        }
        Ok(())
    }

    /// Drops a job, returning its latest schedule if it had one.
    ///
    /// Terminates the worker first so it does not keep solving for a
    /// registry entry that no longer exists.
    pub fn remove_job(&self, id: Uuid) -> Option<Schedule> {
        let mut jobs = lock_jobs(&self.jobs);
        let entry = jobs.remove(&id)?;
        entry.terminate.store(true, Ordering::Relaxed);
        entry.best
    }
}

impl Default for SolverService {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_jobs(jobs: &Arc<Mutex<HashMap<Uuid, JobEntry>>>) -> MutexGuard<'_, HashMap<Uuid, JobEntry>> {
    jobs.lock().expect("job registry lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, ScheduleInfo, Task};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::time::{Duration, Instant};

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn small_problem() -> Schedule {
        let employees = vec![Employee::new("Amy Cole").with_skill("X")];
        let tasks = vec![
            Task::new("0", "Morning meeting", "X", 2)
                .with_start_slot(0)
                .with_employee(0)
                .pinned(),
            Task::new("1", "First piece", "X", 1),
            Task::new("2", "Second piece", "X", 1),
        ];
        Schedule::new(employees, tasks, ScheduleInfo::new(3 * 20, base()))
    }

    fn wait_for_result(service: &SolverService, id: Uuid) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !service.has_result(id) {
            assert!(Instant::now() < deadline, "no result within deadline");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_submit_and_poll() {
        let service = SolverService::new();
        let id = service.solve(small_problem());
        service.join(id).unwrap();

        assert!(service.has_result(id));
        let solved = service.get_result(id).unwrap();
        assert_eq!(solved.score.unwrap().hard, dec!(0));
        assert_eq!(service.status(id), Some(JobStatus::Terminated));
        assert!(service.improvement_count(id) >= 1);

        // Pinned task survived optimization untouched.
        assert_eq!(solved.tasks[0].start_slot, 0);
        assert_eq!(solved.tasks[0].employee, Some(0));
    }

    #[test]
    fn test_unknown_job_polls_empty() {
        let service = SolverService::new();
        let id = Uuid::new_v4();
        assert!(!service.has_result(id));
        assert!(service.get_result(id).is_none());
        assert_eq!(service.status(id), None);
        assert!(!service.terminate(id));
        assert!(matches!(
            service.join(id),
            Err(JobError::NotFound { id: missing }) if missing == id
        ));
    }

    #[test]
    fn test_terminate_unbounded_job() {
        let service = SolverService::with_config(SolverConfig::unbounded());
        let id = service.solve(small_problem());

        // The construction report arrives even though the search never
        // finishes on its own.
        wait_for_result(&service, id);
        assert!(service.terminate(id));
        service.join(id).unwrap();
        assert_eq!(service.status(id), Some(JobStatus::Terminated));
        assert!(service.get_result(id).is_some());
    }

    #[test]
    fn test_jobs_run_independently() {
        let service = SolverService::new();
        let first = service.solve(small_problem());
        let second = service.solve(small_problem());
        assert_ne!(first, second);

        service.join(first).unwrap();
        service.join(second).unwrap();

        let a = service.get_result(first).unwrap();
        let b = service.get_result(second).unwrap();
        // Same deterministic config, same input, uncoordinated jobs.
        assert_eq!(a, b);
        assert_eq!(service.list_jobs().len(), 2);
    }

    #[test]
    fn test_remove_job() {
        let service = SolverService::new();
        let id = service.solve(small_problem());
        service.join(id).unwrap();

        let removed = service.remove_job(id);
        assert!(removed.is_some());
        assert!(service.get_result(id).is_none());
        assert!(service.list_jobs().is_empty());
        assert!(service.remove_job(id).is_none());
    }

    #[test]
    fn test_terminate_all() {
        let service = SolverService::with_config(SolverConfig::unbounded());
        let first = service.solve(small_problem());
        let second = service.solve(small_problem());
        wait_for_result(&service, first);
        wait_for_result(&service, second);

        service.terminate_all();
        service.join(first).unwrap();
        service.join(second).unwrap();
        assert_eq!(service.status(first), Some(JobStatus::Terminated));
        assert_eq!(service.status(second), Some(JobStatus::Terminated));
    }
}
