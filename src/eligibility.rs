//! Eligibility filtering: which (employee, shift) pairs get a decision variable.
//!
//! Only pairs passing the hard rules (skills, no covering blackout) reach the
//! model, which keeps it at O(employees × shifts) without impossible pairs.

use tracing::debug;

use crate::domain::{AvailabilityType, Employee, OpenShift};
use crate::time_window::{self, Interval};

/// An employee eligible for a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Index into the request's employee list.
    pub employee_idx: usize,
    /// Type of the first covering window, `None` when uncovered.
    pub coverage: Option<AvailabilityType>,
}

/// A shift with its resolved interval and eligible employees (input order).
#[derive(Debug, Clone)]
pub struct ShiftSlot {
    pub shift_idx: usize,
    pub interval: Interval,
    pub candidates: Vec<Candidate>,
}

impl ShiftSlot {
    pub fn is_structurally_infeasible(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Eligibility for every shift of a request, in shift order.
#[derive(Debug, Clone, Default)]
pub struct Eligibility {
    pub slots: Vec<ShiftSlot>,
}

impl Eligibility {
    /// Number of eligible pairs.
    pub fn pair_count(&self) -> usize {
        self.slots.iter().map(|slot| slot.candidates.len()).sum()
    }

    /// Indices of shifts with zero eligible employees.
    pub fn infeasible_shifts(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.is_structurally_infeasible())
            .map(|slot| slot.shift_idx)
    }
}

/// Why a pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingSkills,
    Blackout,
}

/// Checks one pair against the hard rules.
///
/// Returns the covering availability type for eligible pairs.
pub fn check_pair(
    employee: &Employee,
    shift: &OpenShift,
    interval: &Interval,
) -> Result<Option<AvailabilityType>, Rejection> {
    if !employee.has_skills(&shift.required_skills) {
        return Err(Rejection::MissingSkills);
    }
    if time_window::is_blacked_out(&employee.availability, interval) {
        return Err(Rejection::Blackout);
    }
    Ok(time_window::covering_type(&employee.availability, interval))
}

/// Builds the eligibility table for all shifts.
pub fn filter(employees: &[Employee], shifts: &[OpenShift]) -> Eligibility {
    let slots = shifts
        .iter()
        .enumerate()
        .map(|(shift_idx, shift)| {
            let interval = time_window::resolve_shift(shift);
            let candidates = employees
                .iter()
                .enumerate()
                .filter_map(|(employee_idx, employee)| {
                    match check_pair(employee, shift, &interval) {
                        Ok(coverage) => Some(Candidate {
                            employee_idx,
                            coverage,
                        }),
                        Err(reason) => {
                            debug!(
                                employee = %employee.id,
                                shift = %shift.id,
                                ?reason,
                                "Pair rejected"
                            );
                            None
                        }
                    }
                })
                .collect();
            ShiftSlot {
                shift_idx,
                interval,
                candidates,
            }
        })
        .collect();

    Eligibility { slots }
}
