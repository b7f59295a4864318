//! ICPMP Preprocessor — minimum-employee & offset assignment with U-slot
//! injection.
//!
//! Given a requirement's work pattern, headcount, planning horizon, and
//! coverage mask, computes the minimum number of strict-pattern-following
//! employees `E` and an `assign_offset : [0,E) -> [0,L)` such that every
//! covered calendar day receives >= headcount employees on a work shift.

use crate::domain::{Employee, Requirement, Scheme, ShiftDefinition, OFF_CODE};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageType {
    Complete,
    Partial,
}

#[derive(Debug, Clone)]
pub struct IcpmpOutput {
    pub employees_required: usize,
    pub strict_employees: usize,
    pub flexible_employees: usize,
    pub offset_distribution: Vec<usize>,
    /// (employee index in the produced plan, date) pairs deliberately
    /// marked 'U' because coverage was already met.
    pub u_slots: Vec<(usize, NaiveDate)>,
    pub expected_coverage_rate: f64,
    pub coverage_type: CoverageType,
}

pub struct IcpmpOptions {
    pub enable_ot_aware_icpmp: bool,
}

impl Default for IcpmpOptions {
    fn default() -> Self {
        Self {
            enable_ot_aware_icpmp: true,
        }
    }
}

/// Computes the ceiling of `a / b` for positive integers.
fn ceil_div(a: usize, b: usize) -> usize {
    if b == 0 {
        0
    } else {
        (a + b - 1) / b
    }
}

/// Scheme-P weekly capacity in work-days, OT-aware: `(normal_cap +
/// monthly_ot_cap/4) / shift_hours` instead of literal work-days/cycle.
fn scheme_p_capacity_days(shift_hours: f64, cycle_work_days: usize) -> usize {
    const NORMAL_CAP: f64 = 34.98;
    const MONTHLY_OT_CAP: f64 = 72.0;
    if shift_hours <= 0.0 {
        return cycle_work_days;
    }
    let capacity_hours = NORMAL_CAP + MONTHLY_OT_CAP / 4.0;
    (capacity_hours / shift_hours).floor().max(1.0) as usize
}

/// Runs the ICPMP algorithm for one requirement.
pub fn compute_icpmp(
    requirement: &Requirement,
    headcount: usize,
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    eligible_pool: &[Employee],
    shift_lookup: &HashMap<String, ShiftDefinition>,
    options: &IcpmpOptions,
) -> IcpmpOutput {
    let pattern = &requirement.work_pattern;
    let l = pattern.cycle_length().max(1);
    let work_days_in_cycle = pattern.work_days_count().max(1);

    // 1. Lower bound.
    let mut lb = headcount.max(ceil_div(headcount * l, work_days_in_cycle));

    // 4. Scheme-aware capacity for scheme P (OT-aware ICPMP).
    if options.enable_ot_aware_icpmp
        && !eligible_pool.is_empty()
        && eligible_pool.iter().all(|e| e.scheme == Scheme::P)
    {
        let representative_hours = requirement
            .headcount_per_shift
            .keys()
            .next()
            .and_then(|code| shift_lookup.get(code))
            .map(|s| s.gross_hours)
            .unwrap_or(8.8);
        let p_capacity = scheme_p_capacity_days(representative_hours, work_days_in_cycle);
        if p_capacity > 0 {
            lb = headcount.max(ceil_div(headcount * l, p_capacity));
        }
    }

    // 2. Try increasing E from the lower bound until coverage is met.
    let mut chosen: Option<(usize, Vec<usize>, Vec<(usize, NaiveDate)>)> = None;
    let pool_cap = eligible_pool.len().max(lb);
    for e_candidate in lb..=pool_cap.max(lb) {
        let offsets = distribute_offsets_evenly(e_candidate, l);
        let (feasible, u_slots) = simulate_coverage(
            &offsets,
            pattern,
            headcount,
            horizon_start,
            horizon_end,
            requirement,
        );
        if feasible {
            chosen = Some((e_candidate, offsets, u_slots));
            break;
        }
        if e_candidate >= eligible_pool.len() && e_candidate >= lb + l {
            // Bail out once we have tried a full cycle's worth of extra
            // headcount beyond the pool size without success.
            break;
        }
    }

    let Some((mut e, mut offsets, mut u_slots)) = chosen else {
        // No feasible E within the pool: degrade to partial coverage at
        // the best E we can staff.
        let e = eligible_pool.len().max(lb.min(eligible_pool.len()));
        let offsets = distribute_offsets_evenly(e.max(1), l);
        let (_, u_slots) = simulate_coverage(
            &offsets,
            pattern,
            headcount,
            horizon_start,
            horizon_end,
            requirement,
        );
        let rate = coverage_rate(&offsets, pattern, headcount, horizon_start, horizon_end, requirement);
        info!(requirement = %requirement.requirement_id, employees_required = e, coverage_rate = rate, "ICPMP partial coverage");
        return IcpmpOutput {
            employees_required: e,
            strict_employees: e,
            flexible_employees: 0,
            offset_distribution: offsets,
            u_slots,
            expected_coverage_rate: rate,
            coverage_type: CoverageType::Partial,
        };
    };

    // 3. Offset-completeness rule.
    if e < l {
        let distinct: std::collections::HashSet<usize> = offsets.iter().copied().collect();
        if distinct.len() < l {
            e = l;
            offsets = distribute_offsets_evenly(e, l);
            let (_, new_u_slots) = simulate_coverage(
                &offsets,
                pattern,
                headcount,
                horizon_start,
                horizon_end,
                requirement,
            );
            u_slots = new_u_slots;
        }
    }

    info!(requirement = %requirement.requirement_id, employees_required = e, u_slot_count = u_slots.len(), "ICPMP complete coverage");
    IcpmpOutput {
        employees_required: e,
        strict_employees: e,
        flexible_employees: 0,
        offset_distribution: offsets,
        u_slots,
        expected_coverage_rate: 100.0,
        coverage_type: CoverageType::Complete,
    }
}

/// Distributes `e` offsets as evenly as possible across `[0, l)`.
fn distribute_offsets_evenly(e: usize, l: usize) -> Vec<usize> {
    if e == 0 || l == 0 {
        return Vec::new();
    }
    (0..e).map(|i| (i * l) / e).collect()
}

fn simulate_coverage(
    offsets: &[usize],
    pattern: &crate::domain::WorkPattern,
    headcount: usize,
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    requirement: &Requirement,
) -> (bool, Vec<(usize, NaiveDate)>) {
    let mut feasible = true;
    let mut u_slots = Vec::new();
    let mut date = horizon_start;
    while date <= horizon_end {
        let iso_weekday = date.weekday().number_from_monday();
        if requirement.covers_weekday(iso_weekday) {
            let mut working_employee_indices = Vec::new();
            for (idx, &r) in offsets.iter().enumerate() {
                if let Some(cell) = pattern.cell_for(date, requirement.pattern_anchor, r) {
                    if cell != OFF_CODE {
                        working_employee_indices.push(idx);
                    }
                }
            }
            if working_employee_indices.len() < headcount {
                feasible = false;
            } else {
                for &idx in working_employee_indices.iter().skip(headcount) {
                    u_slots.push((idx, date));
                }
            }
        }
        date = date.succ_opt().unwrap_or(date);
        if date == horizon_start {
            break;
        }
    }
    (feasible, u_slots)
}

fn coverage_rate(
    offsets: &[usize],
    pattern: &crate::domain::WorkPattern,
    headcount: usize,
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    requirement: &Requirement,
) -> f64 {
    let mut covered_days = 0usize;
    let mut total_days = 0usize;
    let mut date = horizon_start;
    while date <= horizon_end {
        let iso_weekday = date.weekday().number_from_monday();
        if requirement.covers_weekday(iso_weekday) {
            total_days += 1;
            let working = offsets
                .iter()
                .filter(|&&r| {
                    pattern
                        .cell_for(date, requirement.pattern_anchor, r)
                        .map(|c| c != OFF_CODE)
                        .unwrap_or(false)
                })
                .count();
            if working >= headcount {
                covered_days += 1;
            }
        }
        date = date.succ_opt().unwrap_or(date);
        if date == horizon_start {
            break;
        }
    }
    if total_days == 0 {
        100.0
    } else {
        100.0 * covered_days as f64 / total_days as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QualificationExpr, SchemeFilter, WorkPattern};
    use std::collections::{HashMap as Map, HashSet};

    fn req(codes: &[&str], anchor: NaiveDate) -> Requirement {
        Requirement {
            requirement_id: "R1".into(),
            demand_id: "D1".into(),
            product_type: "SO".into(),
            accepted_ranks: vec![],
            accepted_schemes: SchemeFilter::Any(String::new()),
            gender: None,
            headcount_per_shift: Map::new(),
            work_pattern: WorkPattern(codes.iter().map(|s| s.to_string()).collect()),
            coverage_day_mask: HashSet::new(),
            required_qualifications: QualificationExpr::default(),
            rotation_offset_source: None,
            pattern_anchor: anchor,
        }
    }

    #[test]
    fn five_two_pattern_headcount_two_needs_seven_employees() {
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // Monday
        let requirement = req(&["D", "D", "D", "D", "D", "O", "O"], anchor);
        let end = anchor + chrono::Duration::days(30);
        let output = compute_icpmp(
            &requirement,
            2,
            anchor,
            end,
            &vec![sample_employee(Scheme::A); 20],
            &Map::new(),
            &IcpmpOptions::default(),
        );
        assert_eq!(output.employees_required, 7);
        assert_eq!(output.coverage_type, CoverageType::Complete);
        assert_eq!(output.expected_coverage_rate, 100.0);
    }

    fn sample_employee(scheme: Scheme) -> Employee {
        Employee {
            id: "E".into(),
            name: "E".into(),
            scheme,
            product_types: HashSet::new(),
            rank: "Officer".into(),
            gender: None,
            qualifications: vec![],
            unavailable_dates: HashSet::new(),
            rotation_offset: None,
        }
    }
}
