//! Reads solved variable values back into assignment records.

use std::time::Duration;

use crate::constraints::BuiltModel;
use crate::domain::{Assignment, Diagnostics, Employee, OpenShift};
use crate::eligibility::Eligibility;
use crate::solver::SolveOutcome;

/// One assignment picked from a solution, before annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub shift_idx: usize,
    pub employee_idx: usize,
    /// Position of the employee among the shift's candidates.
    pub candidate_pos: usize,
}

/// Assignments plus totals read from a solved model.
#[derive(Debug, Clone)]
pub struct Interpretation {
    pub picks: Vec<Pick>,
    pub assignments: Vec<Assignment>,
    pub total_shifts: usize,
}

impl Interpretation {
    pub fn assigned(&self) -> usize {
        self.assignments.len()
    }

    pub fn unfilled(&self) -> usize {
        self.total_shifts - self.assigned()
    }

    /// Diagnostics for a non-relaxed solve.
    pub fn diagnostics(&self, elapsed: Duration) -> Diagnostics {
        Diagnostics {
            relaxed: false,
            reason: None,
            minimal_unsat: None,
            solve_time_ms: whole_millis(elapsed),
            total_shifts: self.total_shifts,
            assigned_shifts: self.assigned(),
            unfilled_shifts: self.unfilled(),
        }
    }
}

/// For each shift, takes the first candidate (input order) whose variable is
/// true. The model allows at most one, so the scan order never decides ties.
pub fn interpret(
    employees: &[Employee],
    shifts: &[OpenShift],
    eligibility: &Eligibility,
    built: &BuiltModel,
    outcome: &SolveOutcome,
) -> Interpretation {
    let mut picks = Vec::new();
    let mut assignments = Vec::new();

    for (slot, vars) in eligibility.slots.iter().zip(&built.slot_vars) {
        let chosen = vars
            .iter()
            .enumerate()
            .find(|(_, entry)| outcome.value(entry.1));
        if let Some((candidate_pos, &(employee_idx, _))) = chosen {
            let shift = &shifts[slot.shift_idx];
            picks.push(Pick {
                shift_idx: slot.shift_idx,
                employee_idx,
                candidate_pos,
            });
            assignments.push(Assignment {
                shift_id: shift.id.clone(),
                employee_id: employees[employee_idx].id.clone(),
                start: slot.interval.start,
                end: slot.interval.end,
                notes: None,
            });
        }
    }

    Interpretation {
        picks,
        assignments,
        total_shifts: shifts.len(),
    }
}

/// Whole milliseconds, saturating.
pub fn whole_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{build_model, ObjectivePolicy};
    use crate::domain::Settings;
    use crate::eligibility;
    use crate::solver::Verdict;
    use chrono::NaiveDate;

    fn setup() -> (Vec<Employee>, Vec<OpenShift>, Eligibility, BuiltModel) {
        let employees = vec![Employee::new("e1"), Employee::new("e2")];
        let day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let shifts = vec![
            OpenShift::new("s1", day, "code", 4.0),
            OpenShift::new("s2", day.succ_opt().unwrap(), "code", 4.0),
        ];
        let eligibility = eligibility::filter(&employees, &shifts);
        let built = build_model(
            &employees,
            &shifts,
            &eligibility,
            &Settings::default(),
            ObjectivePolicy::Weighted,
        );
        (employees, shifts, eligibility, built)
    }

    #[test]
    fn test_reads_true_variables() {
        let (employees, shifts, eligibility, built) = setup();
        // vars: s1/e1, s1/e2, s2/e1, s2/e2, unfilled s1, unfilled s2
        let values = vec![false, true, false, false, false, true];
        let outcome = SolveOutcome::solved(Verdict::Optimal, &built.model, values);

        let result = interpret(&employees, &shifts, &eligibility, &built, &outcome);

        assert_eq!(result.assigned(), 1);
        assert_eq!(result.unfilled(), 1);
        assert_eq!(result.assignments[0].shift_id, "s1");
        assert_eq!(result.assignments[0].employee_id, "e2");
        assert_eq!(result.picks[0].candidate_pos, 1);
        assert_eq!(
            result.assignments[0].start,
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_diagnostics_totals() {
        let (employees, shifts, eligibility, built) = setup();
        let values = vec![true, false, false, true, false, false];
        let outcome = SolveOutcome::solved(Verdict::Feasible, &built.model, values);

        let result = interpret(&employees, &shifts, &eligibility, &built, &outcome);
        let diagnostics = result.diagnostics(Duration::from_micros(12_345));

        assert_eq!(diagnostics.total_shifts, 2);
        assert_eq!(diagnostics.assigned_shifts, 2);
        assert_eq!(diagnostics.unfilled_shifts, 0);
        assert_eq!(diagnostics.solve_time_ms, 12);
        assert!(!diagnostics.relaxed);
    }

    #[test]
    fn test_no_solution_assigns_nothing() {
        let (employees, shifts, eligibility, built) = setup();
        let result = interpret(&employees, &shifts, &eligibility, &built, &SolveOutcome::unknown());
        assert!(result.assignments.is_empty());
        assert_eq!(result.unfilled(), 2);
    }
}
