//! DTOs for the optimize request/response boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{
    Assignment, Diagnostics, Employee, OpenShift, OptimizeStatus, RelaxedSolution, Settings,
    Suggestion,
};
use crate::error::{RosterError, RosterResult};
use crate::time_window::MAX_SHIFT_HOURS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub team_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub open_shifts: Vec<OpenShift>,
    #[serde(default)]
    pub settings: Settings,
}

impl OptimizeRequest {
    /// Checks the request and returns the settings to solve with, the timeout
    /// clamped to `max_timeout_secs`.
    pub fn validate(&self, max_timeout_secs: u64) -> RosterResult<Settings> {
        let mut employee_ids = HashSet::with_capacity(self.employees.len());
        for employee in &self.employees {
            if !employee_ids.insert(employee.id.as_str()) {
                return Err(invalid(format!("duplicate employee id {:?}", employee.id)));
            }
            if let Some(window) = employee.availability.iter().find(|w| w.end < w.start) {
                return Err(invalid(format!(
                    "employee {:?} has an availability window ending before it starts ({} > {})",
                    employee.id, window.start, window.end
                )));
            }
        }

        let mut shift_ids = HashSet::with_capacity(self.open_shifts.len());
        for shift in &self.open_shifts {
            if !shift_ids.insert(shift.id.as_str()) {
                return Err(invalid(format!("duplicate shift id {:?}", shift.id)));
            }
            if !shift.duration_hours.is_finite() || shift.duration_hours <= 0.0 {
                return Err(invalid(format!(
                    "shift {:?} has non-positive duration {}",
                    shift.id, shift.duration_hours
                )));
            }
            if shift.duration_hours > MAX_SHIFT_HOURS {
                return Err(invalid(format!(
                    "shift {:?} lasts {} hours, more than {}",
                    shift.id, shift.duration_hours, MAX_SHIFT_HOURS
                )));
            }
        }

        if self.settings.max_shifts_per_day == 0 {
            return Err(invalid("max_shifts_per_day must be at least 1".to_string()));
        }
        if self.settings.timeout_seconds == 0 {
            return Err(invalid("timeout_seconds must be at least 1".to_string()));
        }

        Ok(Settings {
            timeout_seconds: self.settings.timeout_seconds.min(max_timeout_secs),
            ..self.settings.clone()
        })
    }
}

fn invalid(message: String) -> RosterError {
    RosterError::InvalidRequest(message)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub status: OptimizeStatus,
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<i64>,
    pub diagnostics: Diagnostics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Suggestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relaxed_solution: Option<RelaxedSolution>,
}

impl OptimizeResponse {
    /// Body returned for faults: ERROR status with the cause as the reason.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: OptimizeStatus::Error,
            assignments: Vec::new(),
            fitness: None,
            diagnostics: Diagnostics {
                reason: Some(reason.into()),
                ..Diagnostics::default()
            },
            suggestions: None,
            relaxed_solution: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub solver: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub solver_engine: &'static str,
}
