//! Model construction for roster optimization.
//!
//! Encodes eligible pairs as boolean variables and adds the three hard
//! constraint families (one-of per shift, daily cap, no same-day overlap)
//! plus the objective.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::domain::{Employee, OpenShift, Settings};
use crate::eligibility::Eligibility;
use crate::model::{Comparison, LinearExpr, Model, VarId};

/// Composite key for an (employee, shift) decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub employee_idx: usize,
    pub shift_idx: usize,
}

impl PairKey {
    pub fn new(employee_idx: usize, shift_idx: usize) -> Self {
        Self {
            employee_idx,
            shift_idx,
        }
    }
}

/// Which objective to attach to the constraint structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectivePolicy {
    /// Maximize availability + preference weights, minus the unfilled penalty.
    Weighted,
    /// Minimize the number of unfilled shifts; weights are ignored.
    CoverageOnly,
}

/// The model plus the variable handles needed to read a solution back.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub model: Model,
    pub pair_vars: HashMap<PairKey, VarId>,
    /// Per shift: `(employee_idx, var)` in candidate (input) order.
    pub slot_vars: Vec<Vec<(usize, VarId)>>,
    /// Per shift "unfilled" variable.
    pub unfilled_vars: Vec<VarId>,
}

/// Builds the optimization model for a filtered request.
pub fn build_model(
    employees: &[Employee],
    shifts: &[OpenShift],
    eligibility: &Eligibility,
    settings: &Settings,
    policy: ObjectivePolicy,
) -> BuiltModel {
    let mut model = Model::new();
    let mut pair_vars = HashMap::with_capacity(eligibility.pair_count());
    let mut slot_vars = Vec::with_capacity(shifts.len());

    for slot in &eligibility.slots {
        let shift = &shifts[slot.shift_idx];
        let vars: Vec<(usize, VarId)> = slot
            .candidates
            .iter()
            .map(|candidate| {
                let employee = &employees[candidate.employee_idx];
                let var = model.new_bool_var(format!("x[{}][{}]", employee.id, shift.id));
                pair_vars.insert(PairKey::new(candidate.employee_idx, slot.shift_idx), var);
                (candidate.employee_idx, var)
            })
            .collect();
        slot_vars.push(vars);
    }

    let unfilled_vars: Vec<VarId> = shifts
        .iter()
        .map(|shift| model.new_bool_var(format!("unfilled[{}]", shift.id)))
        .collect();

    add_assignment_constraints(&mut model, &slot_vars, &unfilled_vars);

    let days = shifts_by_day(shifts);
    add_daily_caps(&mut model, employees.len(), &days, &pair_vars, settings.max_shifts_per_day);
    add_no_overlap(&mut model, eligibility, &days, &pair_vars);

    match policy {
        ObjectivePolicy::Weighted => {
            model.maximize(weighted_objective(employees, shifts, eligibility, &slot_vars, &unfilled_vars, settings))
        }
        ObjectivePolicy::CoverageOnly => model.minimize(LinearExpr::sum(unfilled_vars.iter().copied())),
    }

    debug!(
        variables = model.var_count(),
        constraints = model.constraints().len(),
        ?policy,
        "Model built"
    );

    BuiltModel {
        model,
        pair_vars,
        slot_vars,
        unfilled_vars,
    }
}

/// Each shift: exactly one eligible employee or unfilled.
fn add_assignment_constraints(model: &mut Model, slot_vars: &[Vec<(usize, VarId)>], unfilled: &[VarId]) {
    for (vars, &unfilled_var) in slot_vars.iter().zip(unfilled) {
        if vars.is_empty() {
            model.add_linear(LinearExpr::sum([unfilled_var]), Comparison::Eq, 1);
        } else {
            let expr = LinearExpr::sum(vars.iter().map(|&(_, var)| var).chain([unfilled_var]));
            model.add_linear(expr, Comparison::Eq, 1);
        }
    }
}

/// Shift indices grouped by calendar day, in input order within a day.
fn shifts_by_day(shifts: &[OpenShift]) -> BTreeMap<NaiveDate, Vec<usize>> {
    let mut days: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (idx, shift) in shifts.iter().enumerate() {
        days.entry(shift.day).or_default().push(idx);
    }
    days
}

fn add_daily_caps(
    model: &mut Model,
    employee_count: usize,
    days: &BTreeMap<NaiveDate, Vec<usize>>,
    pair_vars: &HashMap<PairKey, VarId>,
    max_per_day: u32,
) {
    for employee_idx in 0..employee_count {
        for day_shifts in days.values() {
            let vars: Vec<VarId> = day_shifts
                .iter()
                .filter_map(|&shift_idx| pair_vars.get(&PairKey::new(employee_idx, shift_idx)).copied())
                .collect();
            if vars.is_empty() {
                continue;
            }
            if max_per_day == 1 {
                model.add_at_most_one(vars);
            } else {
                model.add_linear(LinearExpr::sum(vars), Comparison::Le, i64::from(max_per_day));
            }
        }
    }
}

/// Same-day overlapping shifts never go to one employee, whatever the cap.
fn add_no_overlap(
    model: &mut Model,
    eligibility: &Eligibility,
    days: &BTreeMap<NaiveDate, Vec<usize>>,
    pair_vars: &HashMap<PairKey, VarId>,
) {
    for day_shifts in days.values() {
        for (i, &first) in day_shifts.iter().enumerate() {
            let first_slot = &eligibility.slots[first];
            for &second in &day_shifts[i + 1..] {
                let second_slot = &eligibility.slots[second];
                if !first_slot.interval.overlaps(&second_slot.interval) {
                    continue;
                }
                for candidate in &first_slot.candidates {
                    let a = pair_vars.get(&PairKey::new(candidate.employee_idx, first));
                    let b = pair_vars.get(&PairKey::new(candidate.employee_idx, second));
                    if let (Some(&a), Some(&b)) = (a, b) {
                        model.add_at_most_one(vec![a, b]);
                    }
                }
            }
        }
    }
}

fn weighted_objective(
    employees: &[Employee],
    shifts: &[OpenShift],
    eligibility: &Eligibility,
    slot_vars: &[Vec<(usize, VarId)>],
    unfilled_vars: &[VarId],
    settings: &Settings,
) -> LinearExpr {
    let mut expr = LinearExpr::new();
    for (slot, vars) in eligibility.slots.iter().zip(slot_vars) {
        let shift = &shifts[slot.shift_idx];
        for (candidate, &(_, var)) in slot.candidates.iter().zip(vars) {
            let availability = settings.weights.for_coverage(candidate.coverage);
            let preference = employees[candidate.employee_idx].preference_for(&shift.shift_code);
            expr.add_term(var, availability.saturating_add(preference));
        }
    }
    let penalty = i64::from(settings.unassigned_penalty);
    for &var in unfilled_vars {
        expr.add_term(var, -penalty);
    }
    expr
}
