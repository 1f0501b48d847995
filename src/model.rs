//! Solver-neutral optimization model.
//!
//! Boolean variables, linear constraints and a linear objective, in the shape
//! every [`ConstraintSolver`](crate::solver::ConstraintSolver) consumes.

use std::fmt;

/// Handle to a boolean variable in a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Weighted sum of variables plus a constant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, i64)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|var| (var, 1)).collect(),
            constant: 0,
        }
    }

    pub fn add_term(&mut self, var: VarId, coefficient: i64) {
        self.terms.push((var, coefficient));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression under a full variable assignment.
    ///
    /// Saturates at the `i64` bounds instead of overflowing.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(var, _)| values[var.index()])
            .fold(self.constant, |acc, &(_, coefficient)| acc.saturating_add(coefficient))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Eq => "==",
            Comparison::Le => "<=",
            Comparison::Ge => ">=",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `expr <cmp> rhs`
    Linear {
        expr: LinearExpr,
        cmp: Comparison,
        rhs: i64,
    },
    /// At most one of the variables may be true.
    AtMostOne(Vec<VarId>),
}

impl Constraint {
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        match self {
            Constraint::Linear { expr, cmp, rhs } => {
                let lhs = expr.evaluate(values);
                match cmp {
                    Comparison::Eq => lhs == *rhs,
                    Comparison::Le => lhs <= *rhs,
                    Comparison::Ge => lhs >= *rhs,
                }
            }
            Constraint::AtMostOne(vars) => vars.iter().filter(|var| values[var.index()]).count() <= 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub sense: Sense,
    pub expr: LinearExpr,
}

/// A 0-1 integer program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    var_names: Vec<String>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            var_names: Vec::new(),
            constraints: Vec::new(),
            objective: Objective {
                sense: Sense::Maximize,
                expr: LinearExpr::new(),
            },
        }
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.var_names.push(name.into());
        VarId(self.var_names.len() - 1)
    }

    pub fn add_linear(&mut self, expr: LinearExpr, cmp: Comparison, rhs: i64) {
        self.constraints.push(Constraint::Linear { expr, cmp, rhs });
    }

    pub fn add_at_most_one(&mut self, vars: Vec<VarId>) {
        self.constraints.push(Constraint::AtMostOne(vars));
    }

    pub fn maximize(&mut self, expr: LinearExpr) {
        self.objective = Objective {
            sense: Sense::Maximize,
            expr,
        };
    }

    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Objective {
            sense: Sense::Minimize,
            expr,
        };
    }

    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    pub fn var_name(&self, var: VarId) -> &str {
        &self.var_names[var.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Objective value under a full variable assignment.
    pub fn objective_value(&self, values: &[bool]) -> i64 {
        self.objective.expr.evaluate(values)
    }

    /// True if every constraint holds under `values`.
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        values.len() == self.var_count() && self.constraints.iter().all(|c| c.is_satisfied_by(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_evaluation() {
        let mut model = Model::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let mut expr = LinearExpr::new();
        expr.add_term(a, 3);
        expr.add_term(b, -2);
        expr.constant = 1;

        assert_eq!(expr.evaluate(&[true, false]), 4);
        assert_eq!(expr.evaluate(&[true, true]), 2);
        assert_eq!(model.var_name(b), "b");
    }

    #[test]
    fn test_evaluation_saturates() {
        let mut model = Model::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let mut expr = LinearExpr::new();
        expr.add_term(a, i64::MAX);
        expr.add_term(b, i64::MAX);

        assert_eq!(expr.evaluate(&[true, true]), i64::MAX);

        let mut negative = LinearExpr::new();
        negative.add_term(a, i64::MIN);
        negative.add_term(b, -1);
        assert_eq!(negative.evaluate(&[true, true]), i64::MIN);
    }

    #[test]
    fn test_constraint_satisfaction() {
        let mut model = Model::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.add_linear(LinearExpr::sum([a, b]), Comparison::Eq, 1);
        model.add_at_most_one(vec![a, b]);

        assert!(model.is_satisfied_by(&[true, false]));
        assert!(!model.is_satisfied_by(&[true, true]));
        assert!(!model.is_satisfied_by(&[false, false]));
        assert!(!model.is_satisfied_by(&[true]));
    }

    #[test]
    fn test_objective_sense() {
        let mut model = Model::new();
        let a = model.new_bool_var("a");
        model.minimize(LinearExpr::sum([a]));
        assert_eq!(model.objective().sense, Sense::Minimize);
        assert_eq!(model.objective_value(&[true]), 1);
    }
}
