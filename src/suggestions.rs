//! Remediation hints for infeasible and timed-out requests.

use std::collections::BTreeSet;

use crate::domain::{Employee, OpenShift, Suggestion, SuggestionKind};
use crate::eligibility::Eligibility;

/// Suggestions accompanying an INFEASIBLE verdict.
///
/// Rules apply independently: per-shift skill relaxation for shifts nobody can
/// take, a staffing hint when shifts outnumber employees, and a training hint
/// for required skills no employee holds.
pub fn for_infeasible(
    employees: &[Employee],
    shifts: &[OpenShift],
    eligibility: &Eligibility,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = eligibility
        .infeasible_shifts()
        .map(|shift_idx| {
            let shift = &shifts[shift_idx];
            Suggestion::new(
                SuggestionKind::RelaxSkillRequirement,
                format!(
                    "Remove or reduce skill requirements for shift {}: {:?}",
                    shift.id, shift.required_skills
                ),
                "May allow less qualified employees to fill the shift",
            )
        })
        .collect();

    if shifts.len() > employees.len() {
        suggestions.push(Suggestion::new(
            SuggestionKind::AddAvailableEmployee,
            format!(
                "Add more employees ({} shifts but only {} employees)",
                shifts.len(),
                employees.len()
            ),
            "Would enable better coverage",
        ));
    }

    let missing = missing_skills(employees, shifts);
    if !missing.is_empty() {
        suggestions.push(Suggestion::new(
            SuggestionKind::TrainEmployees,
            format!("Train employees in missing skills: {:?}", missing),
            "Would enable full shift coverage",
        ));
    }

    suggestions
}

/// The single suggestion attached to a timeout.
pub fn for_timeout() -> Vec<Suggestion> {
    vec![Suggestion::new(
        SuggestionKind::ReduceScope,
        "Try reducing the date range or number of shifts",
        "Faster solve time",
    )]
}

/// Required skills held by no employee, sorted.
///
/// ```
/// use chrono::NaiveDate;
/// use roster_optimizer::domain::{Employee, OpenShift};
/// use roster_optimizer::suggestions::missing_skills;
///
/// let day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
/// let employees = vec![Employee::new("e1").with_skills(["cashier"])];
/// let shifts = vec![OpenShift::new("s1", day, "am", 4.0).with_required_skills(["forklift", "cashier"])];
/// assert_eq!(missing_skills(&employees, &shifts), vec!["forklift"]);
/// ```
pub fn missing_skills<'a>(employees: &[Employee], shifts: &'a [OpenShift]) -> Vec<&'a str> {
    let held: BTreeSet<&str> = employees
        .iter()
        .flat_map(|employee| employee.skills.iter().map(String::as_str))
        .collect();
    let required: BTreeSet<&'a str> = shifts
        .iter()
        .flat_map(|shift| shift.required_skills.iter().map(String::as_str))
        .collect();
    required
        .into_iter()
        .filter(|skill| !held.contains(*skill))
        .collect()
}

/// One explanation per shift with no eligible employee.
pub fn minimal_unsat(shifts: &[OpenShift], eligibility: &Eligibility) -> Vec<String> {
    eligibility
        .infeasible_shifts()
        .map(|shift_idx| {
            let shift = &shifts[shift_idx];
            format!(
                "Shift {} requires skills {:?} but no available employee has them",
                shift.id, shift.required_skills
            )
        })
        .collect()
}
