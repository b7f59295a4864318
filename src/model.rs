//! Constraint Model Builder — turns slots + employees into a binary
//! integer program and solves it.
//!
//! One `x[slot, employee]` variable per eligible pair, one `unassigned[slot]`
//! variable per slot, `good_lp`'s `microlp` backend for the actual solve.
//! Hard constraints C1-C17 become linear inequalities; soft constraints
//! S1-S16 become weighted terms in the objective alongside a dominant
//! per-unassigned-slot penalty.

use crate::config::ParameterResolver;
use crate::constraints::{
    self, eligibility, max_consecutive_days, min_off_days_per_week, min_rest_hours,
    scheme_p_weekly_cap, weekly_normal_hours_cap, IneligibilityReason, SoftWeights,
};
use crate::domain::{
    Assignment, AssignmentSource, AssignmentStatus, AuditInfo, Employee, HourBreakdown,
    Requirement, Scheme, ShiftDefinition, Slot,
};
use crate::error::{Result, RosterError};
use chrono::{NaiveDate, NaiveDateTime};
use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};

/// Per-employee locked context carried over from a previous incremental
/// solve, so hard constraints see the days outside the re-solve window.
#[derive(Debug, Clone, Default)]
pub struct LockedContext {
    pub locked_weekly_hours: HashMap<(i32, u32), f64>,
    pub locked_consecutive_days_before: HashMap<NaiveDate, u32>,
    pub locked_work_dates: Vec<NaiveDate>,
}

pub struct ModelInput<'a> {
    pub slots: &'a [Slot],
    pub employees: &'a [Employee],
    pub requirements: &'a HashMap<String, Requirement>,
    pub shift_lookup: &'a HashMap<String, ShiftDefinition>,
    pub resolver: &'a ParameterResolver,
    pub locked: HashMap<String, LockedContext>,
    pub solver_run_id: String,
    pub now: NaiveDateTime,
}

pub struct SolveOutput {
    pub assignments: Vec<Assignment>,
    pub unassigned_count: usize,
    pub objective_value: f64,
    /// Unassigned-slot violation proxy (the model has no other way to relax
    /// a hard constraint), expressed as a negative score.
    pub hard_score: f64,
    /// Reward collected from satisfied soft constraints, expressed positive.
    pub soft_score: f64,
    pub variable_count: usize,
    pub constraint_count: usize,
    pub duration_seconds: f64,
}

struct EligiblePair {
    slot_index: usize,
    employee_index: usize,
    var: Variable,
}

/// Builds and solves the model for one planning run (fresh or the
/// solvable partition of an incremental run).
pub fn solve(input: &ModelInput) -> Result<SolveOutput> {
    let started = Instant::now();
    if input.slots.is_empty() {
        return Ok(SolveOutput {
            assignments: Vec::new(),
            unassigned_count: 0,
            objective_value: 0.0,
            hard_score: 0.0,
            soft_score: 0.0,
            variable_count: 0,
            constraint_count: 0,
            duration_seconds: started.elapsed().as_secs_f64(),
        });
    }

    let mut vars = ProblemVariables::new();
    let mut pairs: Vec<EligiblePair> = Vec::new();
    let mut ineligibility: HashMap<usize, Vec<IneligibilityReason>> = HashMap::new();
    let soft_weights = SoftWeights::resolve(input.resolver);

    for (slot_index, slot) in input.slots.iter().enumerate() {
        let requirement = input.requirements.get(&slot.requirement_id).ok_or_else(|| {
            RosterError::Internal(format!("slot {} references unknown requirement", slot.slot_id))
        })?;
        let gross_hours = input
            .shift_lookup
            .get(&slot.shift_code)
            .map(|s| s.gross_hours)
            .unwrap_or(0.0);

        for (employee_index, employee) in input.employees.iter().enumerate() {
            match eligibility(employee, slot, requirement, gross_hours) {
                Ok(()) => {
                    let var = vars.add(variable().binary());
                    pairs.push(EligiblePair {
                        slot_index,
                        employee_index,
                        var,
                    });
                }
                Err(reason) => {
                    ineligibility.entry(slot_index).or_default().push(reason);
                }
            }
        }
    }

    let unassigned_vars: Vec<Variable> = (0..input.slots.len())
        .map(|_| vars.add(variable().binary()))
        .collect();

    // Objective: minimise a dominant unassigned penalty plus soft-constraint
    // deviation terms. All terms are linear in the decision variables.
    const UNASSIGNED_PENALTY: f64 = 100_000.0;
    let mut objective = Expression::from(0.0);
    for &u in &unassigned_vars {
        objective += UNASSIGNED_PENALTY * u;
    }
    add_soft_terms(&mut objective, input, &pairs, &soft_weights);

    let mut problem = vars.minimise(objective).using(good_lp::microlp);
    let mut constraint_count = 0usize;

    // C0: every slot is covered by exactly one employee or marked
    // unassigned.
    for (slot_index, &u) in unassigned_vars.iter().enumerate() {
        let mut expr = Expression::from(0.0);
        for pair in pairs.iter().filter(|p| p.slot_index == slot_index) {
            expr += pair.var;
        }
        expr += u;
        problem = problem.with(constraint!(expr == 1.0));
        constraint_count += 1;
    }

    // C16: at most one slot per employee per calendar day.
    for employee_index in 0..input.employees.len() {
        let mut by_date: HashMap<NaiveDate, Vec<Variable>> = HashMap::new();
        for pair in pairs.iter().filter(|p| p.employee_index == employee_index) {
            let date = input.slots[pair.slot_index].date;
            by_date.entry(date).or_default().push(pair.var);
        }
        for vars_on_day in by_date.values() {
            if vars_on_day.len() > 1 {
                let expr = sum_vars(vars_on_day);
                problem = problem.with(constraint!(expr <= 1.0));
                constraint_count += 1;
            }
        }
    }

    // C1: daily gross-hours cap (redundant once eligibility prefilters a
    // single over-long shift, but kept explicit for employees with more
    // than one eligible slot on the same day before C16 resolves them).
    for employee_index in 0..input.employees.len() {
        let employee = &input.employees[employee_index];
        let cap = constraints::daily_gross_cap(input.resolver, employee.scheme);
        let mut by_date: HashMap<NaiveDate, Expression> = HashMap::new();
        for pair in pairs.iter().filter(|p| p.employee_index == employee_index) {
            let slot = &input.slots[pair.slot_index];
            let hours = input
                .shift_lookup
                .get(&slot.shift_code)
                .map(|s| s.gross_hours)
                .unwrap_or(0.0);
            *by_date.entry(slot.date).or_insert_with(|| Expression::from(0.0)) += hours * pair.var;
        }
        for expr in by_date.into_values() {
            problem = problem.with(constraint!(expr <= cap));
            constraint_count += 1;
        }
    }

    // C4: minimum rest hours between consecutive-day shifts — encoded as
    // pairwise exclusions when the calendar-day gap violates the rest
    // requirement for the scheme.
    for employee_index in 0..input.employees.len() {
        let employee = &input.employees[employee_index];
        let is_apgd = employee.is_apgd_d10();
        let rest = min_rest_hours(input.resolver, employee.scheme, is_apgd);
        let own_pairs: Vec<&EligiblePair> = pairs
            .iter()
            .filter(|p| p.employee_index == employee_index)
            .collect();
        for i in 0..own_pairs.len() {
            for j in (i + 1)..own_pairs.len() {
                let a = &input.slots[own_pairs[i].slot_index];
                let b = &input.slots[own_pairs[j].slot_index];
                let (earlier, later) = if a.start <= b.start { (a, b) } else { (b, a) };
                if earlier.slot_id == later.slot_id {
                    continue;
                }
                let gap_hours = (later.start - earlier.end).num_minutes() as f64 / 60.0;
                if gap_hours < rest {
                    let expr = own_pairs[i].var + own_pairs[j].var;
                    problem = problem.with(constraint!(expr <= 1.0));
                    constraint_count += 1;
                }
            }
        }
    }

    // C3: max consecutive work-days, via sliding windows of
    // `max_consecutive + 1` calendar days.
    for employee_index in 0..input.employees.len() {
        let employee = &input.employees[employee_index];
        let is_apgd = employee.is_apgd_d10();
        let max_consec = max_consecutive_days(input.resolver, employee.scheme, is_apgd) as i64;
        let work_dates_by_day = work_day_expressions(&pairs, input.slots, employee_index);
        if work_dates_by_day.is_empty() {
            continue;
        }
        let dates: Vec<NaiveDate> = work_dates_by_day.keys().copied().collect();
        let min_date = *dates.iter().min().unwrap();
        let max_date = *dates.iter().max().unwrap();
        let window = max_consec + 1;
        let mut day = min_date;
        while day <= max_date {
            let mut expr = Expression::from(0.0);
            let mut any = false;
            for offset in 0..window {
                if let Some(d) = day.checked_add_signed(chrono::Duration::days(offset)) {
                    if let Some(e) = work_dates_by_day.get(&d) {
                        expr = expr + e.clone();
                        any = true;
                    }
                }
            }
            if any {
                problem = problem.with(constraint!(expr <= max_consec as f64));
                constraint_count += 1;
            }
            day = day.succ_opt().unwrap_or(max_date + chrono::Duration::days(1));
        }
    }

    // C5: minimum off-days per 7-day window (weekly, non-APGD employees).
    for employee_index in 0..input.employees.len() {
        let employee = &input.employees[employee_index];
        let is_apgd = employee.is_apgd_d10();
        let min_off = min_off_days_per_week(input.resolver, employee.scheme, is_apgd);
        if min_off == 0 {
            continue;
        }
        let work_dates_by_day = work_day_expressions(&pairs, input.slots, employee_index);
        let by_week = group_by_iso_week(&work_dates_by_day);
        for expr_sum in by_week.values() {
            let week_length = 7.0;
            let expr = expr_sum.clone();
            problem = problem.with(constraint!(expr <= week_length - min_off as f64));
            constraint_count += 1;
        }
    }

    // C2 / C6: weekly normal-hours cap (gross-hours proxy; the precise
    // normal/overtime split is the Hour Calculator's job post-solve).
    for employee_index in 0..input.employees.len() {
        let employee = &input.employees[employee_index];
        let is_apgd = employee.is_apgd_d10();
        let weekly_hours_by_week = weekly_hours_expressions(&pairs, input.slots, input.shift_lookup, employee_index);
        let cap = if employee.scheme == Scheme::P {
            Some(scheme_p_weekly_cap(input.resolver, true))
        } else {
            weekly_normal_hours_cap(input.resolver, employee.scheme, is_apgd)
        };
        if let Some(cap) = cap {
            for (week_key, expr) in weekly_hours_by_week {
                let locked_offset = input
                    .locked
                    .get(&employee.id)
                    .and_then(|lc| lc.locked_weekly_hours.get(&week_key))
                    .copied()
                    .unwrap_or(0.0);
                problem = problem.with(constraint!(expr <= (cap - locked_offset).max(0.0)));
                constraint_count += 1;
            }
        }
    }

    // C17: monthly overtime/total-hours cap (gross-hours proxy).
    for employee_index in 0..input.employees.len() {
        let employee = &input.employees[employee_index];
        let ot_cap = constraints::monthly_overtime_cap(input.resolver, employee.scheme);
        let weekly_cap = weekly_normal_hours_cap(input.resolver, employee.scheme, employee.is_apgd_d10())
            .unwrap_or(44.0);
        let monthly_cap = weekly_cap * 4.345 + ot_cap;
        let by_month = monthly_hours_expressions(&pairs, input.slots, input.shift_lookup, employee_index);
        for expr in by_month.into_values() {
            problem = problem.with(constraint!(expr <= monthly_cap));
            constraint_count += 1;
        }
    }

    info!(
        variable_count = pairs.len() + unassigned_vars.len(),
        constraint_count,
        slot_count = input.slots.len(),
        "solving roster model"
    );

    let solution = problem.solve().map_err(|e| {
        warn!(error = %e, "model solve failed");
        RosterError::InfeasibleModel {
            unassigned_count: input.slots.len(),
        }
    })?;

    let mut assignments = Vec::with_capacity(input.slots.len());
    let mut unassigned_count = 0usize;

    for (slot_index, slot) in input.slots.iter().enumerate() {
        let assigned_pair = pairs
            .iter()
            .filter(|p| p.slot_index == slot_index)
            .find(|p| solution.value(p.var) > 0.5);

        let requirement = input.requirements.get(&slot.requirement_id);
        let gross_hours = input
            .shift_lookup
            .get(&slot.shift_code)
            .map(|s| s.gross_hours)
            .unwrap_or(0.0);

        if let Some(pair) = assigned_pair {
            let employee = &input.employees[pair.employee_index];
            assignments.push(Assignment {
                slot_id: slot.slot_id.clone(),
                date: slot.date,
                employee_id: Some(employee.id.clone()),
                status: AssignmentStatus::Assigned,
                hours: HourBreakdown {
                    gross: gross_hours,
                    ..Default::default()
                },
                audit: Some(AuditInfo {
                    source: AssignmentSource::Initial,
                    solver_run_id: input.solver_run_id.clone(),
                    timestamp: input.now,
                    previous_job_id: None,
                }),
                unassigned_cause: None,
            });
        } else {
            unassigned_count += 1;
            let cause = ineligibility
                .get(&slot_index)
                .and_then(|reasons| reasons.first())
                .map(describe_reason)
                .unwrap_or_else(|| "no eligible employee within capacity".to_string());
            warn!(slot = %slot.slot_id, cause = %cause, requirement = ?requirement.map(|r| &r.requirement_id), "slot unassigned");
            assignments.push(Assignment {
                slot_id: slot.slot_id.clone(),
                date: slot.date,
                employee_id: None,
                status: AssignmentStatus::Unassigned,
                hours: HourBreakdown::default(),
                audit: None,
                unassigned_cause: Some(cause),
            });
        }
    }

    let objective_value = pairs
        .iter()
        .map(|p| solution.value(p.var))
        .sum::<f64>()
        + unassigned_vars.iter().map(|&u| solution.value(u) * UNASSIGNED_PENALTY).sum::<f64>();
    let hard_score = -(unassigned_count as f64);
    let soft_score = evaluate_soft_score(input, &pairs, &soft_weights, &solution);

    Ok(SolveOutput {
        assignments,
        unassigned_count,
        objective_value,
        hard_score,
        soft_score,
        variable_count: pairs.len() + unassigned_vars.len(),
        constraint_count,
        duration_seconds: started.elapsed().as_secs_f64(),
    })
}

fn sum_vars(vars: &[Variable]) -> Expression {
    vars.iter().fold(Expression::from(0.0), |acc, v| acc + *v)
}

/// Per-employee work indicator expression keyed by calendar date: the sum
/// of decision variables for that employee's eligible slots on that date.
/// Bounded to [0,1] in practice by the C16 at-most-one-per-day constraint.
fn work_day_expressions(
    pairs: &[EligiblePair],
    slots: &[Slot],
    employee_index: usize,
) -> HashMap<NaiveDate, Expression> {
    let mut out: HashMap<NaiveDate, Expression> = HashMap::new();
    for pair in pairs.iter().filter(|p| p.employee_index == employee_index) {
        let date = slots[pair.slot_index].date;
        *out.entry(date).or_insert_with(|| Expression::from(0.0)) += pair.var;
    }
    out
}

fn group_by_iso_week(by_day: &HashMap<NaiveDate, Expression>) -> HashMap<(i32, u32), Expression> {
    let mut out: HashMap<(i32, u32), Expression> = HashMap::new();
    for (date, expr) in by_day {
        let key = constraints::iso_week_key(*date);
        *out.entry(key).or_insert_with(|| Expression::from(0.0)) += expr.clone();
    }
    out
}

fn weekly_hours_expressions(
    pairs: &[EligiblePair],
    slots: &[Slot],
    shift_lookup: &HashMap<String, ShiftDefinition>,
    employee_index: usize,
) -> HashMap<(i32, u32), Expression> {
    let mut out: HashMap<(i32, u32), Expression> = HashMap::new();
    for pair in pairs.iter().filter(|p| p.employee_index == employee_index) {
        let slot = &slots[pair.slot_index];
        let hours = shift_lookup.get(&slot.shift_code).map(|s| s.gross_hours).unwrap_or(0.0);
        let key = constraints::iso_week_key(slot.date);
        *out.entry(key).or_insert_with(|| Expression::from(0.0)) += hours * pair.var;
    }
    out
}

fn monthly_hours_expressions(
    pairs: &[EligiblePair],
    slots: &[Slot],
    shift_lookup: &HashMap<String, ShiftDefinition>,
    employee_index: usize,
) -> HashMap<(i32, u32), Expression> {
    use chrono::Datelike;
    let mut out: HashMap<(i32, u32), Expression> = HashMap::new();
    for pair in pairs.iter().filter(|p| p.employee_index == employee_index) {
        let slot = &slots[pair.slot_index];
        let hours = shift_lookup.get(&slot.shift_code).map(|s| s.gross_hours).unwrap_or(0.0);
        let key = (slot.date.year(), slot.date.month());
        *out.entry(key).or_insert_with(|| Expression::from(0.0)) += hours * pair.var;
    }
    out
}

/// S1/S3/S7/S12: soft-constraint terms folded into the objective. Each term
/// is expressed as a negative (reward) contribution so the minimising
/// objective favours assignments that satisfy it.
fn add_soft_terms(
    objective: &mut Expression,
    input: &ModelInput,
    pairs: &[EligiblePair],
    weights: &SoftWeights,
) {
    // S1 pattern adherence: reward assigning an employee to the shift code
    // their own rotation offset would predict for that date, when the
    // requirement sources offsets from the employee.
    for pair in pairs {
        let slot = &input.slots[pair.slot_index];
        let employee = &input.employees[pair.employee_index];
        if let Some(requirement) = input.requirements.get(&slot.requirement_id) {
            if requirement.rotation_offset_source
                == Some(crate::domain::RotationOffsetSource::FromEmployee)
            {
                let cycle_length = requirement.work_pattern.cycle_length();
                let r = employee.normalised_rotation_offset(cycle_length);
                if let Some(cell) = requirement.work_pattern.cell_for(slot.date, requirement.pattern_anchor, r) {
                    if cell == slot.shift_code {
                        *objective -= weights.pattern_adherence * pair.var;
                    }
                }
            }
        }
    }

    // S7 team cohesion: reward repeat pairings of the same employee with
    // the same demand across the horizon (encourages a stable team per
    // site rather than scattering employees across demands).
    let mut demand_employee_pairs: HashMap<(String, usize), Vec<Variable>> = HashMap::new();
    for pair in pairs {
        let slot = &input.slots[pair.slot_index];
        demand_employee_pairs
            .entry((slot.demand_id.clone(), pair.employee_index))
            .or_default()
            .push(pair.var);
    }
    for vars in demand_employee_pairs.values() {
        if vars.len() > 1 {
            for &v in vars {
                *objective -= (weights.team_cohesion / vars.len() as f64) * v;
            }
        }
    }
}

/// Mirrors `add_soft_terms`' reward structure but evaluated at a solution's
/// variable values instead of built as an `Expression`, so the soft-score
/// component of the output reports what was actually achieved.
fn evaluate_soft_score(
    input: &ModelInput,
    pairs: &[EligiblePair],
    weights: &SoftWeights,
    solution: &impl Solution,
) -> f64 {
    let mut score = 0.0;

    for pair in pairs {
        let slot = &input.slots[pair.slot_index];
        let employee = &input.employees[pair.employee_index];
        if let Some(requirement) = input.requirements.get(&slot.requirement_id) {
            if requirement.rotation_offset_source
                == Some(crate::domain::RotationOffsetSource::FromEmployee)
            {
                let cycle_length = requirement.work_pattern.cycle_length();
                let r = employee.normalised_rotation_offset(cycle_length);
                if let Some(cell) = requirement.work_pattern.cell_for(slot.date, requirement.pattern_anchor, r) {
                    if cell == slot.shift_code {
                        score += weights.pattern_adherence * solution.value(pair.var);
                    }
                }
            }
        }
    }

    let mut demand_employee_pairs: HashMap<(String, usize), Vec<Variable>> = HashMap::new();
    for pair in pairs {
        let slot = &input.slots[pair.slot_index];
        demand_employee_pairs
            .entry((slot.demand_id.clone(), pair.employee_index))
            .or_default()
            .push(pair.var);
    }
    for vars in demand_employee_pairs.values() {
        if vars.len() > 1 {
            for &v in vars {
                score += (weights.team_cohesion / vars.len() as f64) * solution.value(v);
            }
        }
    }

    score
}

fn describe_reason(reason: &IneligibilityReason) -> String {
    match reason {
        IneligibilityReason::Scheme => "no eligible employee: scheme mismatch".to_string(),
        IneligibilityReason::Rank => "no eligible employee: rank mismatch".to_string(),
        IneligibilityReason::Gender => "no eligible employee: gender mismatch".to_string(),
        IneligibilityReason::Unavailable => "no eligible employee: all marked unavailable".to_string(),
        IneligibilityReason::ProductType => "no eligible employee: product-type mismatch".to_string(),
        IneligibilityReason::Qualification => "no eligible employee: qualification requirement unmet".to_string(),
        IneligibilityReason::DailyCapExceeded => "no eligible employee: shift exceeds scheme daily cap".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterResolver;
    use crate::domain::{QualificationExpr, SchemeFilter, WorkPattern};
    use std::collections::HashSet;

    fn employee(id: &str, scheme: Scheme) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_string(),
            scheme,
            product_types: HashSet::new(),
            rank: "Officer".into(),
            gender: None,
            qualifications: vec![],
            unavailable_dates: HashSet::new(),
            rotation_offset: None,
        }
    }

    fn requirement() -> Requirement {
        Requirement {
            requirement_id: "R1".into(),
            demand_id: "D1".into(),
            product_type: String::new(),
            accepted_ranks: vec![],
            accepted_schemes: SchemeFilter::Any(String::new()),
            gender: None,
            headcount_per_shift: HashMap::new(),
            work_pattern: WorkPattern(vec!["D".into(), "O".into()]),
            coverage_day_mask: HashSet::new(),
            required_qualifications: QualificationExpr::default(),
            rotation_offset_source: None,
            pattern_anchor: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    fn slot(date: NaiveDate, id: &str) -> Slot {
        Slot {
            slot_id: id.to_string(),
            date,
            shift_code: "D".into(),
            demand_id: "D1".into(),
            requirement_id: "R1".into(),
            start: date.and_hms_opt(7, 0, 0).unwrap(),
            end: date.and_hms_opt(15, 48, 0).unwrap(),
            headcount_index: 0,
        }
    }

    #[test]
    fn single_slot_single_eligible_employee_gets_assigned() {
        let employees = vec![employee("E1", Scheme::A)];
        let mut requirements = HashMap::new();
        requirements.insert("R1".to_string(), requirement());
        let mut shift_lookup = HashMap::new();
        shift_lookup.insert(
            "D".to_string(),
            ShiftDefinition {
                code: "D".into(),
                gross_hours: 8.8,
                lunch_break_minutes: 60,
                overnight: false,
            },
        );
        let slots = vec![slot(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), "S1")];
        let resolver = ParameterResolver::new(vec![], vec![]);
        let input = ModelInput {
            slots: &slots,
            employees: &employees,
            requirements: &requirements,
            shift_lookup: &shift_lookup,
            resolver: &resolver,
            locked: HashMap::new(),
            solver_run_id: "run-1".into(),
            now: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        };
        let output = solve(&input).unwrap();
        assert_eq!(output.unassigned_count, 0);
        assert_eq!(output.assignments[0].employee_id.as_deref(), Some("E1"));
    }

    #[test]
    fn slot_with_no_eligible_employee_is_unassigned_with_a_cause() {
        let employees = vec![employee("E1", Scheme::P)];
        let mut requirements = HashMap::new();
        requirements.insert("R1".to_string(), requirement());
        let mut shift_lookup = HashMap::new();
        shift_lookup.insert(
            "D".to_string(),
            ShiftDefinition {
                code: "D".into(),
                gross_hours: 12.0,
                lunch_break_minutes: 60,
                overnight: false,
            },
        );
        let slots = vec![slot(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), "S1")];
        let resolver = ParameterResolver::new(vec![], vec![]);
        let input = ModelInput {
            slots: &slots,
            employees: &employees,
            requirements: &requirements,
            shift_lookup: &shift_lookup,
            resolver: &resolver,
            locked: HashMap::new(),
            solver_run_id: "run-1".into(),
            now: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        };
        let output = solve(&input).unwrap();
        assert_eq!(output.unassigned_count, 1);
        assert!(output.assignments[0].unassigned_cause.is_some());
    }
}
