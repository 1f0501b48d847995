//! Best-effort relaxed re-solve after an infeasible primary verdict.
//!
//! The relaxed model keeps every hard constraint and swaps the objective for
//! pure coverage: minimize unfilled shifts, ignore preference weights. A
//! relaxed solve that fails or faults yields `None`; it never turns the
//! primary INFEASIBLE verdict into an error.

use std::time::Duration;
use tracing::{info, warn};

use crate::constraints::{build_model, ObjectivePolicy};
use crate::domain::{
    AvailabilityType, Employee, OpenShift, OptimizeStatus, RelaxedSolution, Settings,
};
use crate::eligibility;
use crate::interpret::interpret;
use crate::solver::{ConstraintSolver, SolverError};

/// Names of the constraints loosened in the relaxed model.
pub const RELAXED_CONSTRAINTS: [&str; 2] = ["avoided_preferences", "unassigned_penalty"];

/// Note attached to relaxed assignments covered by an AVOIDED window.
pub const AVOIDED_NOTE: &str = "Assigned despite AVOIDED preference";

/// Attempts the relaxed solve; `None` when no relaxed solution was found.
pub fn relax(
    employees: &[Employee],
    shifts: &[OpenShift],
    settings: &Settings,
    solver: &dyn ConstraintSolver,
    timeout_cap_seconds: u64,
) -> Option<RelaxedSolution> {
    match try_relax(employees, shifts, settings, solver, timeout_cap_seconds) {
        Ok(solution) => solution,
        Err(e) => {
            warn!(error = %e, "Relaxed optimization failed");
            None
        }
    }
}

fn try_relax(
    employees: &[Employee],
    shifts: &[OpenShift],
    settings: &Settings,
    solver: &dyn ConstraintSolver,
    timeout_cap_seconds: u64,
) -> Result<Option<RelaxedSolution>, SolverError> {
    let relaxed = settings.relaxed(timeout_cap_seconds);
    let eligibility = eligibility::filter(employees, shifts);
    let built = build_model(
        employees,
        shifts,
        &eligibility,
        &relaxed,
        ObjectivePolicy::CoverageOnly,
    );

    let budget = Duration::from_secs(relaxed.timeout_seconds);
    let outcome = solver.solve(&built.model, budget)?;
    if !outcome.verdict.has_solution() {
        info!(verdict = ?outcome.verdict, "Relaxed solve found no solution");
        return Ok(None);
    }

    let mut result = interpret(employees, shifts, &eligibility, &built, &outcome);
    for (pick, assignment) in result.picks.iter().zip(result.assignments.iter_mut()) {
        let coverage = eligibility.slots[pick.shift_idx].candidates[pick.candidate_pos].coverage;
        if coverage == Some(AvailabilityType::Avoided) {
            assignment.notes = Some(AVOIDED_NOTE.to_string());
        }
    }

    let fitness = -(result.unfilled() as i64);
    info!(
        assigned = result.assigned(),
        unfilled = result.unfilled(),
        "Relaxed solve complete"
    );

    Ok(Some(RelaxedSolution {
        status: OptimizeStatus::OptimalRelaxed,
        assignments: result.assignments,
        fitness,
        relaxed_constraints: RELAXED_CONSTRAINTS.iter().map(|name| name.to_string()).collect(),
    }))
}
