//! Solver boundary for roster models.
//!
//! The optimization engine is an external collaborator: it receives a
//! [`Model`] and a wall-clock budget and answers with a [`Verdict`] and, when
//! it found a solution, one truth value per variable. [`MilpSolver`] adapts the
//! `good_lp` MILP front-end.

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::model::{Comparison, Constraint, LinearExpr, Model, Sense};

/// Solver verdict for one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Proven optimal solution.
    Optimal,
    /// A solution without optimality proof.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// Budget exhausted before a verdict.
    Unknown,
}

impl Verdict {
    pub fn has_solution(self) -> bool {
        matches!(self, Verdict::Optimal | Verdict::Feasible)
    }
}

/// Verdict plus, for solved models, variable values and objective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub verdict: Verdict,
    /// Indexed by [`VarId::index`](crate::model::VarId::index); empty without a solution.
    pub values: Vec<bool>,
    pub objective: Option<i64>,
}

impl SolveOutcome {
    /// A solved outcome; the objective is evaluated from `values`.
    pub fn solved(verdict: Verdict, model: &Model, values: Vec<bool>) -> Self {
        let objective = Some(model.objective_value(&values));
        Self {
            verdict,
            values,
            objective,
        }
    }

    pub fn infeasible() -> Self {
        Self {
            verdict: Verdict::Infeasible,
            values: Vec::new(),
            objective: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            verdict: Verdict::Unknown,
            values: Vec::new(),
            objective: None,
        }
    }

    /// Value of a variable; false when the outcome carries no solution.
    pub fn value(&self, var: crate::model::VarId) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }
}

/// Unexpected failures of the solving backend.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver backend failed: {0}")]
    Backend(String),
}

/// An optimization engine for 0-1 models.
pub trait ConstraintSolver: Send + Sync {
    /// Engine identity, reported by the health endpoint.
    fn name(&self) -> &'static str;

    /// Solves `model` within `budget`, on the calling thread.
    ///
    /// Infeasibility and timeouts are verdicts; `Err` is reserved for faults.
    fn solve(&self, model: &Model, budget: Duration) -> Result<SolveOutcome, SolverError>;
}

/// Branch-and-bound MILP via `good_lp` with the pure-Rust microlp backend.
///
/// The budget is handed to the backend as its time limit, so the solve stops
/// on its own. An incumbent found before the limit comes back as `Feasible`;
/// no incumbent is `Unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

impl MilpSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Error text good_lp's microlp adapter uses when the limit hits with no incumbent.
const NO_INCUMBENT: &str = "Time limit reached before finding a feasible solution";

impl ConstraintSolver for MilpSolver {
    fn name(&self) -> &'static str {
        "good_lp/microlp MILP"
    }

    fn solve(&self, model: &Model, budget: Duration) -> Result<SolveOutcome, SolverError> {
        if model.var_count() == 0 {
            return Ok(SolveOutcome::solved(Verdict::Optimal, model, Vec::new()));
        }

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = (0..model.var_count())
            .map(|_| vars.add(variable().binary()))
            .collect();

        let objective = to_expression(&model.objective().expr, &handles);
        let mut problem = match model.objective().sense {
            Sense::Maximize => vars.maximise(objective),
            Sense::Minimize => vars.minimise(objective),
        }
        .using(microlp)
        .with_time_limit(budget.as_secs_f64());

        for c in model.constraints() {
            let row = match c {
                Constraint::Linear { expr, cmp, rhs } => {
                    let lhs = to_expression(expr, &handles);
                    let rhs = *rhs as f64;
                    match cmp {
                        Comparison::Eq => constraint!(lhs == rhs),
                        Comparison::Le => constraint!(lhs <= rhs),
                        Comparison::Ge => constraint!(lhs >= rhs),
                    }
                }
                Constraint::AtMostOne(members) => {
                    let lhs = to_expression(&LinearExpr::sum(members.iter().copied()), &handles);
                    constraint!(lhs <= 1.0)
                }
            };
            problem = problem.with(row);
        }

        match problem.solve() {
            Ok(solution) => {
                let verdict = match solution.status() {
                    SolutionStatus::Optimal => Verdict::Optimal,
                    SolutionStatus::TimeLimit | SolutionStatus::GapLimit => Verdict::Feasible,
                };
                let values = handles.iter().map(|&var| solution.value(var) > 0.5).collect();
                Ok(SolveOutcome::solved(verdict, model, values))
            }
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome::infeasible()),
            Err(ResolutionError::Other(reason)) if reason == NO_INCUMBENT => {
                debug!(budget_ms = budget.as_millis() as u64, "Time limit hit without incumbent");
                Ok(SolveOutcome::unknown())
            }
            Err(e) => Err(SolverError::Backend(e.to_string())),
        }
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    expr.terms
        .iter()
        .fold(Expression::from(expr.constant as f64), |acc, &(var, coefficient)| {
            acc + (coefficient as f64) * handles[var.index()]
        })
}
