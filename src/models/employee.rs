//! Employee model.
//!
//! Employees are immutable problem facts during a solve: the optimizer
//! assigns tasks to them but never changes their skills or date
//! preferences.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An employee that can be assigned to tasks.
///
/// The name doubles as the identifier. The three date sets express
/// availability preferences: unavailable dates are a hard constraint,
/// undesired and desired dates adjust the soft score. They are mutually
/// exclusive in practice but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee name (acts as the id).
    pub name: String,
    /// Skills this employee can cover.
    pub skills: BTreeSet<String>,
    /// Dates the employee cannot work at all.
    pub unavailable_dates: BTreeSet<NaiveDate>,
    /// Dates the employee would prefer not to work.
    pub undesired_dates: BTreeSet<NaiveDate>,
    /// Dates the employee would prefer to work.
    pub desired_dates: BTreeSet<NaiveDate>,
}

impl Employee {
    /// Creates a new employee with no skills or date preferences.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: BTreeSet::new(),
            unavailable_dates: BTreeSet::new(),
            undesired_dates: BTreeSet::new(),
            desired_dates: BTreeSet::new(),
        }
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    /// Adds several skills.
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills.extend(skills.into_iter().map(Into::into));
        self
    }

    /// Adds an unavailable date.
    pub fn with_unavailable_date(mut self, date: NaiveDate) -> Self {
        self.unavailable_dates.insert(date);
        self
    }

    /// Adds an undesired date.
    pub fn with_undesired_date(mut self, date: NaiveDate) -> Self {
        self.undesired_dates.insert(date);
        self
    }

    /// Adds a desired date.
    pub fn with_desired_date(mut self, date: NaiveDate) -> Self {
        self.desired_dates.insert(date);
        self
    }

    /// Whether this employee has a given skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    /// Removes all date preferences.
    pub fn clear_date_preferences(&mut self) {
        self.unavailable_dates.clear();
        self.undesired_dates.clear();
        self.desired_dates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_builder() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let emp = Employee::new("Amy Cole")
            .with_skill("Backend Engineer")
            .with_skills(["Data Engineer", "DevOps Engineer"])
            .with_unavailable_date(date);

        assert_eq!(emp.name, "Amy Cole");
        assert!(emp.has_skill("Backend Engineer"));
        assert!(emp.has_skill("DevOps Engineer"));
        assert!(!emp.has_skill("Frontend Engineer"));
        assert!(emp.unavailable_dates.contains(&date));
    }

    #[test]
    fn test_clear_date_preferences() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut emp = Employee::new("Beth Fox")
            .with_unavailable_date(date)
            .with_undesired_date(date)
            .with_desired_date(date);

        emp.clear_date_preferences();
        assert!(emp.unavailable_dates.is_empty());
        assert!(emp.undesired_dates.is_empty());
        assert!(emp.desired_dates.is_empty());
    }

    #[test]
    fn test_employee_serde_roundtrip() {
        let emp = Employee::new("Carl Green").with_skill("Cloud Engineer");
        let json = serde_json::to_string(&emp).unwrap();
        let back: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(emp, back);
    }
}
