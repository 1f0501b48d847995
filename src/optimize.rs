//! The optimize operation: validate, filter, build, solve, interpret.
//!
//! The primary solve ends in one of four states, each mapped to a response:
//!
//! | verdict      | status       | extras                                   |
//! |--------------|--------------|------------------------------------------|
//! | `Optimal`    | `OPTIMAL`    | assignments, fitness                     |
//! | `Feasible`   | `FEASIBLE`   | assignments, fitness                     |
//! | `Infeasible` | `INFEASIBLE` | suggestions, minimal_unsat, relaxed run  |
//! | `Unknown`    | `TIMEOUT`    | scope suggestion                         |
//!
//! Validation failures and solver faults come back as [`RosterError`](crate::error::RosterError); the
//! HTTP layer turns those into `ERROR` bodies.

use std::time::{Duration, Instant};
use tracing::{info, info_span};

use crate::config::OptimizeContext;
use crate::constraints::{build_model, ObjectivePolicy};
use crate::domain::{Diagnostics, OptimizeStatus};
use crate::dto::{OptimizeRequest, OptimizeResponse};
use crate::eligibility;
use crate::error::RosterResult;
use crate::interpret::{interpret, whole_millis};
use crate::relaxation;
use crate::solver::{ConstraintSolver, Verdict};
use crate::suggestions;

pub const INFEASIBLE_REASON: &str = "No feasible assignment exists with current constraints";

pub fn timeout_reason(timeout_seconds: u64) -> String {
    format!("Solver did not find solution within {timeout_seconds}s")
}

/// Runs one optimize request to completion on the calling thread.
///
/// Blocks for up to the request's (clamped) timeout, plus the relaxed budget
/// when the primary verdict is infeasible. Call from `spawn_blocking` inside
/// async code.
pub fn optimize(
    request: &OptimizeRequest,
    ctx: &OptimizeContext,
    solver: &dyn ConstraintSolver,
) -> RosterResult<OptimizeResponse> {
    let span = info_span!("optimize", request_id = %ctx.request_id, team_id = %request.team_id);
    let _guard = span.enter();

    let settings = request.validate(ctx.max_timeout_secs)?;
    let started = Instant::now();
    let employees = &request.employees;
    let shifts = &request.open_shifts;

    info!(
        employees = employees.len(),
        shifts = shifts.len(),
        date_from = %request.date_from,
        date_to = %request.date_to,
        timeout_seconds = settings.timeout_seconds,
        "Optimization started"
    );

    let eligibility = eligibility::filter(employees, shifts);
    let built = build_model(
        employees,
        shifts,
        &eligibility,
        &settings,
        ObjectivePolicy::Weighted,
    );
    #[cfg(feature = "console")]
    crate::console::print_model_built(
        employees.len(),
        shifts.len(),
        eligibility.pair_count(),
        built.model.var_count(),
        built.model.constraints().len(),
    );

    let outcome = solver.solve(&built.model, Duration::from_secs(settings.timeout_seconds))?;

    let response = match outcome.verdict {
        Verdict::Optimal | Verdict::Feasible => {
            let result = interpret(employees, shifts, &eligibility, &built, &outcome);
            let status = if outcome.verdict == Verdict::Optimal {
                OptimizeStatus::Optimal
            } else {
                OptimizeStatus::Feasible
            };
            OptimizeResponse {
                status,
                diagnostics: result.diagnostics(started.elapsed()),
                assignments: result.assignments,
                fitness: outcome.objective,
                suggestions: None,
                relaxed_solution: None,
            }
        }
        Verdict::Infeasible => {
            let relaxed_solution = relaxation::relax(
                employees,
                shifts,
                &settings,
                solver,
                ctx.relaxed_timeout_secs,
            );
            let minimal_unsat = suggestions::minimal_unsat(shifts, &eligibility);
            OptimizeResponse {
                status: OptimizeStatus::Infeasible,
                assignments: Vec::new(),
                fitness: None,
                diagnostics: Diagnostics {
                    reason: Some(INFEASIBLE_REASON.to_string()),
                    minimal_unsat: (!minimal_unsat.is_empty()).then_some(minimal_unsat),
                    ..unsolved_diagnostics(shifts.len(), started.elapsed())
                },
                suggestions: Some(suggestions::for_infeasible(employees, shifts, &eligibility)),
                relaxed_solution,
            }
        }
        Verdict::Unknown => OptimizeResponse {
            status: OptimizeStatus::Timeout,
            assignments: Vec::new(),
            fitness: None,
            diagnostics: Diagnostics {
                reason: Some(timeout_reason(settings.timeout_seconds)),
                ..unsolved_diagnostics(shifts.len(), started.elapsed())
            },
            suggestions: Some(suggestions::for_timeout()),
            relaxed_solution: None,
        },
    };

    info!(
        status = %response.status,
        fitness = ?response.fitness,
        assigned = response.diagnostics.assigned_shifts,
        unfilled = response.diagnostics.unfilled_shifts,
        solve_time_ms = response.diagnostics.solve_time_ms,
        relaxed = response.relaxed_solution.is_some(),
        "Optimization finished"
    );

    #[cfg(feature = "console")]
    crate::console::print_outcome(&response, started.elapsed());

    Ok(response)
}

fn unsolved_diagnostics(total_shifts: usize, elapsed: Duration) -> Diagnostics {
    Diagnostics {
        relaxed: false,
        reason: None,
        minimal_unsat: None,
        solve_time_ms: whole_millis(elapsed),
        total_shifts,
        assigned_shifts: 0,
        unfilled_shifts: total_shifts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AvailabilityType, AvailabilityWindow, Employee, OpenShift, Settings, SuggestionKind,
    };
    use crate::demo_data::{self, DemoData};
    use crate::domain::Assignment;
    use crate::error::RosterError;
    use crate::model::Model;
    use crate::solver::{MilpSolver, SolveOutcome, SolverError};
    use crate::time_window::{self, resolve_shift, Interval};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    fn at(hour: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn shift(id: &str, code: &str, start: u32, end: u32, skills: &[&str]) -> OpenShift {
        OpenShift::new(id, day(), code, f64::from(end - start))
            .with_required_skills(skills.iter().copied())
            .with_times(
                NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            )
    }

    fn request(employees: Vec<Employee>, open_shifts: Vec<OpenShift>) -> OptimizeRequest {
        OptimizeRequest {
            team_id: "team-1".to_string(),
            date_from: day(),
            date_to: day(),
            employees,
            open_shifts,
            settings: Settings::default(),
        }
    }

    fn run(request: &OptimizeRequest) -> OptimizeResponse {
        optimize(request, &OptimizeContext::default(), &MilpSolver::new()).unwrap()
    }

    /// Checks every hard rule on `assignments` against the request they came from.
    fn assert_roster_rules(request: &OptimizeRequest, assignments: &[Assignment], cap: usize) {
        let employees: HashMap<&str, &Employee> =
            request.employees.iter().map(|e| (e.id.as_str(), e)).collect();
        let shifts: HashMap<&str, &OpenShift> =
            request.open_shifts.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut filled = HashSet::new();
        let mut per_day: HashMap<(&str, NaiveDate), Vec<Interval>> = HashMap::new();
        for assignment in assignments {
            let employee = employees[assignment.employee_id.as_str()];
            let shift = shifts[assignment.shift_id.as_str()];
            let interval = resolve_shift(shift);

            assert!(filled.insert(shift.id.as_str()), "{} filled twice", shift.id);
            assert_eq!((assignment.start, assignment.end), (interval.start, interval.end));
            assert!(
                eligibility::check_pair(employee, shift, &interval).is_ok(),
                "{} cannot work {}",
                employee.id,
                shift.id
            );
            per_day
                .entry((employee.id.as_str(), shift.day))
                .or_default()
                .push(interval);
        }

        for ((employee_id, date), intervals) in &per_day {
            assert!(
                intervals.len() <= cap,
                "{employee_id} works {} shifts on {date}",
                intervals.len()
            );
            for (i, a) in intervals.iter().enumerate() {
                for b in &intervals[i + 1..] {
                    assert!(!a.overlaps(b), "{employee_id} double-booked on {date}");
                }
            }
        }
    }

    /// Replays scripted verdicts in order and records the budgets it saw.
    struct ScriptedSolver {
        script: Mutex<Vec<Result<SolveOutcome, SolverError>>>,
        budgets: Mutex<Vec<Duration>>,
    }

    impl ScriptedSolver {
        fn new(script: Vec<Result<SolveOutcome, SolverError>>) -> Self {
            Self {
                script: Mutex::new(script),
                budgets: Mutex::new(Vec::new()),
            }
        }
    }

    impl ConstraintSolver for ScriptedSolver {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn solve(&self, _model: &Model, budget: Duration) -> Result<SolveOutcome, SolverError> {
            self.budgets.lock().unwrap().push(budget);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                Ok(SolveOutcome::unknown())
            } else {
                script.remove(0)
            }
        }
    }

    #[test]
    fn test_single_preferred_match() {
        let employees = vec![Employee::new("e1")
            .with_skills(["skill_cashier"])
            .with_window(AvailabilityWindow::new(at(8), at(18), AvailabilityType::Preferred))];
        let shifts = vec![shift("s1", "shift_morning", 9, 13, &["skill_cashier"])];

        let response = run(&request(employees, shifts));

        assert_eq!(response.status, OptimizeStatus::Optimal);
        assert_eq!(response.assignments.len(), 1);
        assert_eq!(response.assignments[0].employee_id, "e1");
        assert_eq!(response.assignments[0].shift_id, "s1");
        assert_eq!(response.fitness, Some(10));
        assert_eq!(response.diagnostics.unfilled_shifts, 0);
        assert!(response.suggestions.is_none());
    }

    #[test]
    fn test_missing_skill_leaves_shift_unfilled() {
        let employees = vec![Employee::new("e1").with_skills(["cashier"])];
        let shifts = vec![
            shift("s1", "am", 9, 13, &["cashier"]),
            shift("s2", "pm", 14, 18, &["forklift"]),
        ];

        let response = run(&request(employees, shifts));

        assert_eq!(response.status, OptimizeStatus::Optimal);
        assert_eq!(response.assignments.len(), 1);
        assert_eq!(response.diagnostics.total_shifts, 2);
        assert_eq!(response.diagnostics.assigned_shifts, 1);
        assert_eq!(response.diagnostics.unfilled_shifts, 1);
        assert_eq!(response.fitness, Some(-100));
    }

    #[test]
    fn test_blackout_blocks_assignment() {
        let employees = vec![Employee::new("e1")
            .with_window(AvailabilityWindow::new(at(0), at(23), AvailabilityType::Blackout))];
        let shifts = vec![shift("s1", "am", 9, 13, &[])];

        let response = run(&request(employees, shifts));

        assert!(response.assignments.is_empty());
        assert_eq!(response.diagnostics.unfilled_shifts, 1);
    }

    #[test]
    fn test_daily_cap_and_overlap() {
        let employees = vec![Employee::new("e1")];
        let shifts = vec![
            shift("s1", "am", 9, 13, &[]),
            shift("s2", "pm", 14, 18, &[]),
        ];

        let response = run(&request(employees.clone(), shifts.clone()));
        assert_eq!(response.assignments.len(), 1);

        let mut relaxed_cap = request(employees, shifts);
        relaxed_cap.settings.max_shifts_per_day = 2;
        let response = run(&relaxed_cap);
        assert_eq!(response.assignments.len(), 2);
    }

    #[test]
    fn test_overlapping_shifts_never_share_employee() {
        let employees = vec![Employee::new("e1")];
        let mut req = request(
            employees,
            vec![shift("s1", "am", 9, 13, &[]), shift("s2", "mid", 12, 16, &[])],
        );
        req.settings.max_shifts_per_day = 3;

        let response = run(&req);

        assert_eq!(response.assignments.len(), 1);
    }

    #[test]
    fn test_prefers_preferred_employee() {
        let employees = vec![
            Employee::new("avoider")
                .with_window(AvailabilityWindow::new(at(6), at(22), AvailabilityType::Avoided)),
            Employee::new("keen")
                .with_window(AvailabilityWindow::new(at(6), at(22), AvailabilityType::Preferred)),
        ];
        let shifts = vec![shift("s1", "am", 9, 13, &[])];

        let response = run(&request(employees, shifts));

        assert_eq!(response.assignments[0].employee_id, "keen");
        assert_eq!(response.fitness, Some(10));
    }

    #[test]
    fn test_empty_request_is_optimal() {
        let response = run(&request(Vec::new(), Vec::new()));

        assert_eq!(response.status, OptimizeStatus::Optimal);
        assert_eq!(response.fitness, Some(0));
        assert_eq!(response.diagnostics.total_shifts, 0);
    }

    #[test]
    fn test_no_employees_leaves_all_unfilled() {
        let response = run(&request(Vec::new(), vec![shift("s1", "am", 9, 13, &[])]));

        assert_eq!(response.status, OptimizeStatus::Optimal);
        assert_eq!(response.fitness, Some(-100));
        assert_eq!(response.diagnostics.unfilled_shifts, 1);
    }

    #[test]
    fn test_infeasible_verdict_runs_relaxation_and_suggestions() {
        let employees = vec![Employee::new("e1").with_skills(["cashier"])];
        let shifts = vec![
            shift("s1", "am", 9, 13, &["cashier"]),
            shift("s2", "pm", 14, 18, &["forklift"]),
        ];
        let solver = ScriptedSolver::new(vec![Ok(SolveOutcome::infeasible())]);

        let response =
            optimize(&request(employees, shifts), &OptimizeContext::default(), &solver).unwrap();

        assert_eq!(response.status, OptimizeStatus::Infeasible);
        assert!(response.assignments.is_empty());
        assert_eq!(response.fitness, None);
        assert_eq!(response.diagnostics.reason.as_deref(), Some(INFEASIBLE_REASON));
        assert_eq!(response.diagnostics.unfilled_shifts, 2);
        assert_eq!(response.diagnostics.minimal_unsat.as_ref().map(Vec::len), Some(1));
        let kinds: Vec<_> = response
            .suggestions
            .unwrap()
            .iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SuggestionKind::RelaxSkillRequirement,
                SuggestionKind::AddAvailableEmployee,
                SuggestionKind::TrainEmployees,
            ]
        );
        // the scripted relaxed solve answers unknown
        assert!(response.relaxed_solution.is_none());
        assert_eq!(
            *solver.budgets.lock().unwrap(),
            vec![Duration::from_secs(30), Duration::from_secs(10)]
        );
    }

    #[test]
    fn test_infeasible_with_real_relaxed_solve() {
        struct InfeasibleThenReal(Mutex<bool>);

        impl ConstraintSolver for InfeasibleThenReal {
            fn name(&self) -> &'static str {
                "infeasible-then-real"
            }

            fn solve(&self, model: &Model, budget: Duration) -> Result<SolveOutcome, SolverError> {
                let mut first = self.0.lock().unwrap();
                if *first {
                    *first = false;
                    Ok(SolveOutcome::infeasible())
                } else {
                    MilpSolver::new().solve(model, budget)
                }
            }
        }

        let employees = vec![Employee::new("e1")
            .with_window(AvailabilityWindow::new(at(6), at(22), AvailabilityType::Avoided))];
        let shifts = vec![shift("s1", "am", 9, 13, &[])];

        let response = optimize(
            &request(employees, shifts),
            &OptimizeContext::default(),
            &InfeasibleThenReal(Mutex::new(true)),
        )
        .unwrap();

        let relaxed = response.relaxed_solution.expect("relaxed solution");
        assert_eq!(relaxed.status, OptimizeStatus::OptimalRelaxed);
        assert_eq!(relaxed.fitness, 0);
        assert_eq!(
            relaxed.assignments[0].notes.as_deref(),
            Some(relaxation::AVOIDED_NOTE)
        );
        assert!(response.diagnostics.minimal_unsat.is_none());
    }

    #[test]
    fn test_unknown_verdict_is_timeout() {
        let solver = ScriptedSolver::new(vec![Ok(SolveOutcome::unknown())]);
        let mut req = request(vec![Employee::new("e1")], vec![shift("s1", "am", 9, 13, &[])]);
        req.settings.timeout_seconds = 5;

        let response = optimize(&req, &OptimizeContext::default(), &solver).unwrap();

        assert_eq!(response.status, OptimizeStatus::Timeout);
        assert_eq!(
            response.diagnostics.reason.as_deref(),
            Some("Solver did not find solution within 5s")
        );
        assert_eq!(response.diagnostics.assigned_shifts, 0);
        assert_eq!(response.diagnostics.unfilled_shifts, 1);
        assert_eq!(response.suggestions.as_ref().map(Vec::len), Some(1));
        assert!(response.relaxed_solution.is_none());
    }

    #[test]
    fn test_timeout_clamped_by_context() {
        let solver = ScriptedSolver::new(Vec::new());
        let mut req = request(Vec::new(), vec![shift("s1", "am", 9, 13, &[])]);
        req.settings.timeout_seconds = 1_000;
        let ctx = OptimizeContext {
            max_timeout_secs: 60,
            ..OptimizeContext::default()
        };

        let response = optimize(&req, &ctx, &solver).unwrap();

        assert_eq!(*solver.budgets.lock().unwrap(), vec![Duration::from_secs(60)]);
        assert_eq!(
            response.diagnostics.reason.as_deref(),
            Some("Solver did not find solution within 60s")
        );
    }

    #[test]
    fn test_solver_fault_is_error() {
        let solver = ScriptedSolver::new(vec![Err(SolverError::Backend("exploded".into()))]);
        let req = request(vec![Employee::new("e1")], vec![shift("s1", "am", 9, 13, &[])]);

        let result = optimize(&req, &OptimizeContext::default(), &solver);

        assert!(matches!(result, Err(RosterError::Solver(SolverError::Backend(_)))));
    }

    #[test]
    fn test_invalid_request_never_reaches_solver() {
        let solver = ScriptedSolver::new(Vec::new());
        let mut req = request(Vec::new(), vec![shift("s1", "am", 9, 13, &[])]);
        req.settings.max_shifts_per_day = 0;

        let result = optimize(&req, &OptimizeContext::default(), &solver);

        assert!(matches!(result, Err(RosterError::InvalidRequest(_))));
        assert!(solver.budgets.lock().unwrap().is_empty());
    }

    #[test]
    fn test_demo_rosters_respect_hard_rules() {
        for demo in [DemoData::Large, DemoData::Understaffed] {
            for cap in [1u32, 2] {
                let mut req = demo_data::generate(demo);
                req.settings.max_shifts_per_day = cap;

                let response = run(&req);

                assert!(response.status.is_solved(), "{} cap {cap}: {}", demo.as_str(), response.status);
                let diagnostics = &response.diagnostics;
                assert_eq!(diagnostics.total_shifts, req.open_shifts.len());
                assert_eq!(
                    diagnostics.assigned_shifts + diagnostics.unfilled_shifts,
                    diagnostics.total_shifts
                );
                assert_eq!(response.assignments.len(), diagnostics.assigned_shifts);
                assert_roster_rules(&req, &response.assignments, cap as usize);
            }
        }
    }

    #[test]
    fn test_relaxed_roster_respects_hard_rules_and_notes_avoided() {
        let req = demo_data::generate(DemoData::Understaffed);
        let settings = req.validate(300).unwrap();

        let relaxed = relaxation::relax(
            &req.employees,
            &req.open_shifts,
            &settings,
            &MilpSolver::new(),
            10,
        )
        .expect("relaxed solution");

        assert_roster_rules(&req, &relaxed.assignments, settings.max_shifts_per_day as usize);
        let unfilled = req.open_shifts.len() - relaxed.assignments.len();
        assert_eq!(relaxed.fitness, -(unfilled as i64));

        for assignment in &relaxed.assignments {
            let employee = req.employees.iter().find(|e| e.id == assignment.employee_id).unwrap();
            let shift = req.open_shifts.iter().find(|s| s.id == assignment.shift_id).unwrap();
            let coverage = time_window::covering_type(&employee.availability, &resolve_shift(shift));
            assert_eq!(
                assignment.notes.is_some(),
                coverage == Some(AvailabilityType::Avoided),
                "{} on {}",
                employee.id,
                shift.id
            );
            if let Some(note) = &assignment.notes {
                assert_eq!(note, relaxation::AVOIDED_NOTE);
            }
        }
    }
}
