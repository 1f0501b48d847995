//! Domain model for the roster optimization problem.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::time_window;

/// How an employee feels about working inside an availability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityType {
    Preferred,
    Neutral,
    Avoided,
    /// Hard exclusion: no decision variable is created for a covered shift.
    Blackout,
}

/// A span of time tagged with an availability type.
///
/// Windows apply to a shift only when they fully contain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    #[serde(with = "time_window::serde_instant")]
    pub start: NaiveDateTime,
    #[serde(with = "time_window::serde_instant")]
    pub end: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: AvailabilityType,
}

impl AvailabilityWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, kind: AvailabilityType) -> Self {
        Self { start, end, kind }
    }
}

/// An employee who can be assigned to shifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    #[serde(default)]
    pub skills: HashSet<String>,
    /// Ordered: the first covering window decides the preference weight.
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    /// Shift-code → preference weight. Absent codes weigh 0.
    #[serde(default)]
    pub preferences: HashMap<String, i64>,
}

impl Employee {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skills: HashSet::new(),
            availability: Vec::new(),
            preferences: HashMap::new(),
        }
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for skill in skills {
            self.skills.insert(skill.into());
        }
        self
    }

    pub fn with_window(mut self, window: AvailabilityWindow) -> Self {
        self.availability.push(window);
        self
    }

    pub fn with_preference(mut self, shift_code: impl Into<String>, weight: i64) -> Self {
        self.preferences.insert(shift_code.into(), weight);
        self
    }

    /// Returns true if the employee holds every skill in `required`.
    pub fn has_skills<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> bool {
        required.into_iter().all(|skill| self.skills.contains(skill))
    }

    /// Preference weight for a shift code (0 when absent).
    pub fn preference_for(&self, shift_code: &str) -> i64 {
        self.preferences.get(shift_code).copied().unwrap_or(0)
    }
}

/// A shift that needs to be staffed by one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenShift {
    pub id: String,
    pub day: NaiveDate,
    pub shift_code: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub duration_hours: f64,
    #[serde(default, with = "time_window::serde_time_of_day")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "time_window::serde_time_of_day")]
    pub end_time: Option<NaiveTime>,
}

impl OpenShift {
    pub fn new(
        id: impl Into<String>,
        day: NaiveDate,
        shift_code: impl Into<String>,
        duration_hours: f64,
    ) -> Self {
        Self {
            id: id.into(),
            day,
            shift_code: shift_code.into(),
            required_skills: Vec::new(),
            duration_hours,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_required_skills(
        mut self,
        skills: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }
}

/// Objective weight per availability type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub preferred: i64,
    pub neutral: i64,
    pub avoided: i64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            preferred: 10,
            neutral: 0,
            avoided: -10,
        }
    }
}

impl Weights {
    /// Weight for the covering window type; uncovered shifts use the neutral weight.
    ///
    /// ```
    /// use roster_optimizer::domain::{AvailabilityType, Weights};
    ///
    /// let weights = Weights::default();
    /// assert_eq!(weights.for_coverage(Some(AvailabilityType::Preferred)), 10);
    /// assert_eq!(weights.for_coverage(Some(AvailabilityType::Avoided)), -10);
    /// assert_eq!(weights.for_coverage(None), 0);
    /// ```
    pub fn for_coverage(&self, coverage: Option<AvailabilityType>) -> i64 {
        match coverage {
            Some(AvailabilityType::Preferred) => self.preferred,
            Some(AvailabilityType::Avoided) => self.avoided,
            _ => self.neutral,
        }
    }
}

/// Penalty for unfilled shifts in the relaxed model.
pub const RELAXED_UNASSIGNED_PENALTY: u32 = 10;

/// Solve settings supplied with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub unassigned_penalty: u32,
    pub max_shifts_per_day: u32,
    pub timeout_seconds: u64,
    pub weights: Weights,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unassigned_penalty: 100,
            max_shifts_per_day: 1,
            timeout_seconds: 30,
            weights: Weights::default(),
        }
    }
}

impl Settings {
    /// Settings for the relaxed re-solve: AVOIDED costs nothing, unfilled shifts
    /// are cheap, and the budget is capped.
    pub fn relaxed(&self, timeout_cap_seconds: u64) -> Self {
        Self {
            unassigned_penalty: RELAXED_UNASSIGNED_PENALTY,
            max_shifts_per_day: self.max_shifts_per_day,
            timeout_seconds: self.timeout_seconds.min(timeout_cap_seconds),
            weights: Weights {
                avoided: 0,
                ..self.weights
            },
        }
    }
}

/// A shift filled by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub shift_id: String,
    pub employee_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Closed set of optimize outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizeStatus {
    Optimal,
    Feasible,
    Infeasible,
    OptimalRelaxed,
    Timeout,
    Error,
}

impl OptimizeStatus {
    /// Returns the status as sent over the wire.
    ///
    /// ```
    /// use roster_optimizer::domain::OptimizeStatus;
    ///
    /// assert_eq!(OptimizeStatus::OptimalRelaxed.as_str(), "OPTIMAL_RELAXED");
    /// assert_eq!(OptimizeStatus::Timeout.as_str(), "TIMEOUT");
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizeStatus::Optimal => "OPTIMAL",
            OptimizeStatus::Feasible => "FEASIBLE",
            OptimizeStatus::Infeasible => "INFEASIBLE",
            OptimizeStatus::OptimalRelaxed => "OPTIMAL_RELAXED",
            OptimizeStatus::Timeout => "TIMEOUT",
            OptimizeStatus::Error => "ERROR",
        }
    }

    /// True when the response carries a usable roster.
    pub fn is_solved(self) -> bool {
        matches!(
            self,
            OptimizeStatus::Optimal | OptimizeStatus::Feasible | OptimizeStatus::OptimalRelaxed
        )
    }
}

impl std::fmt::Display for OptimizeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub relaxed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimal_unsat: Option<Vec<String>>,
    pub solve_time_ms: u64,
    pub total_shifts: usize,
    pub assigned_shifts: usize,
    pub unfilled_shifts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    RelaxSkillRequirement,
    AddAvailableEmployee,
    TrainEmployees,
    ReduceScope,
}

/// Advisory remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, description: impl Into<String>, impact: &str) -> Self {
        Self {
            kind,
            description: description.into(),
            impact: Some(impact.to_string()),
        }
    }
}

/// Best-effort alternative produced after an infeasible primary solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxedSolution {
    pub status: OptimizeStatus,
    pub assignments: Vec<Assignment>,
    pub fitness: i64,
    pub relaxed_constraints: Vec<String>,
}
