//! Eligibility predicates and the hard/soft constraint parameter catalogue
//! (C1-C17, S1-S16) shared between the Constraint Model Builder and the
//! Incremental Solver's locked-context injection.
//!
//! Each numeric lookup here goes through `crate::config::ParameterResolver`
//! instead of being hard-coded at the call site — the spec's design notes
//! call this out by name as the fix for several historical regressions.

use crate::config::ParameterResolver;
use crate::domain::{Employee, Requirement, Scheme, Slot};
use chrono::{Datelike, NaiveDate};

/// Why a slot couldn't take a given employee — used only for best-effort
/// UNASSIGNED attribution, never to drive correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibilityReason {
    Scheme,
    Rank,
    Gender,
    Unavailable,
    ProductType,
    Qualification,
    DailyCapExceeded,
}

/// Evaluates every eligibility predicate for `employee` against `slot`
/// under `requirement`, in a stable order so attribution is deterministic.
pub fn eligibility(
    employee: &Employee,
    slot: &Slot,
    requirement: &Requirement,
    shift_gross_hours: f64,
) -> Result<(), IneligibilityReason> {
    if !requirement.accepted_schemes.accepts(employee.scheme) {
        return Err(IneligibilityReason::Scheme);
    }
    if !requirement.accepts_rank(&employee.rank) {
        return Err(IneligibilityReason::Rank);
    }
    if let Some(g) = requirement.gender {
        if employee.gender != Some(g) {
            return Err(IneligibilityReason::Gender);
        }
    }
    if employee.unavailable_dates.contains(&slot.date) {
        return Err(IneligibilityReason::Unavailable);
    }
    if !requirement.product_type.is_empty()
        && !employee.product_types.is_empty()
        && !employee.product_types.contains(&requirement.product_type)
    {
        return Err(IneligibilityReason::ProductType);
    }
    if !requirement
        .required_qualifications
        .is_satisfied_by(employee, slot.date)
    {
        return Err(IneligibilityReason::Qualification);
    }
    if shift_gross_hours > employee.scheme.daily_cap_hours() {
        return Err(IneligibilityReason::DailyCapExceeded);
    }
    Ok(())
}

/// C4 / overlap: minimum rest hours required between the end of one shift
/// and the start of the next.
pub fn min_rest_hours(resolver: &ParameterResolver, scheme: Scheme, is_apgd_d10: bool) -> f64 {
    resolver.resolve("C4", "minRestHours", scheme, is_apgd_d10, scheme.min_rest_hours())
}

/// C3: max consecutive work-days, with the APGD-D10 override (8 instead of
/// the scheme default of 12).
pub fn max_consecutive_days(resolver: &ParameterResolver, scheme: Scheme, is_apgd_d10: bool) -> u32 {
    let default = if is_apgd_d10 { 8.0 } else { scheme.max_consecutive_days() as f64 };
    resolver.resolve("C3", "maxConsecutiveDays", scheme, is_apgd_d10, default) as u32
}

/// C5: minimum off-days per 7-day week; APGD-D10 employees are exempt.
pub fn min_off_days_per_week(resolver: &ParameterResolver, scheme: Scheme, is_apgd_d10: bool) -> u32 {
    if is_apgd_d10 {
        return 0;
    }
    resolver.resolve("C5", "minOffDaysPerWeek", scheme, is_apgd_d10, 1.0) as u32
}

/// C2: weekly normal-hours cap. `None` for APGD-D10 (bounded instead by the
/// monthly totalMaxHours rule) and for scheme P (governed by C6 instead).
pub fn weekly_normal_hours_cap(
    resolver: &ParameterResolver,
    scheme: Scheme,
    is_apgd_d10: bool,
) -> Option<f64> {
    if is_apgd_d10 || scheme == Scheme::P {
        return None;
    }
    Some(resolver.resolve("C2", "weeklyNormalHoursCap", scheme, is_apgd_d10, 44.0))
}

/// C6: scheme-P weekly normal-hours cap, which depends on whether the
/// employee works <= 4 days that week (34.98h) or more (29.98h).
pub fn scheme_p_weekly_cap(resolver: &ParameterResolver, work_days_le_four: bool) -> f64 {
    let default = if work_days_le_four { 34.98 } else { 29.98 };
    resolver.resolve("C6", "partTimerWeeklyHours", Scheme::P, false, default)
}

/// C17: monthly overtime cap, default 72h unless a matching rule overrides.
pub fn monthly_overtime_cap(resolver: &ParameterResolver, scheme: Scheme) -> f64 {
    resolver.resolve("C17", "monthlyOvertimeCap", scheme, false, 72.0)
}

/// C1: daily gross-hours cap for the scheme.
pub fn daily_gross_cap(resolver: &ParameterResolver, scheme: Scheme) -> f64 {
    resolver.resolve("C1", "dailyGrossCap", scheme, false, scheme.daily_cap_hours())
}

/// Returns the ISO (year, week) pair a date belongs to — the key used for
/// weekly-hour aggregation everywhere in the engine.
pub fn iso_week_key(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// Soft-constraint weights (S1-S16), resolved once per solve. Unlisted
/// weights fall back to a modest default so an unconfigured soft
/// constraint still nudges the objective rather than vanishing silently.
pub struct SoftWeights {
    pub pattern_adherence: f64,
    pub shift_consistency: f64,
    pub team_cohesion: f64,
    pub fairness: f64,
}

impl SoftWeights {
    pub fn resolve(resolver: &ParameterResolver) -> Self {
        Self {
            pattern_adherence: resolver.resolve("S1", "weight", Scheme::A, false, 5.0),
            shift_consistency: resolver.resolve("S3", "weight", Scheme::A, false, 2.0),
            team_cohesion: resolver.resolve("S7", "weight", Scheme::A, false, 1.0),
            fairness: resolver.resolve("S12", "weight", Scheme::A, false, 3.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QualificationExpr, SchemeFilter, WorkPattern};
    use std::collections::{HashMap, HashSet};

    fn employee() -> Employee {
        Employee {
            id: "E1".into(),
            name: "Test".into(),
            scheme: Scheme::A,
            product_types: HashSet::new(),
            rank: "Officer".into(),
            gender: None,
            qualifications: vec![],
            unavailable_dates: HashSet::new(),
            rotation_offset: None,
        }
    }

    fn slot(date: NaiveDate) -> Slot {
        Slot {
            slot_id: "S1".into(),
            date,
            shift_code: "D".into(),
            demand_id: "D1".into(),
            requirement_id: "R1".into(),
            start: date.and_hms_opt(7, 0, 0).unwrap(),
            end: date.and_hms_opt(19, 0, 0).unwrap(),
            headcount_index: 0,
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
            work_pattern: WorkPattern(vec!["D".into()]),
            coverage_day_mask: HashSet::new(),
            required_qualifications: QualificationExpr::default(),
            rotation_offset_source: None,
            pattern_anchor: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    #[test]
    fn scheme_p_excluded_from_twelve_hour_shift_by_daily_cap() {
        let mut emp = employee();
        emp.scheme = Scheme::P;
        let req = requirement();
        let s = slot(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let result = eligibility(&emp, &s, &req, 12.0);
        assert_eq!(result, Err(IneligibilityReason::DailyCapExceeded));
    }

    #[test]
    fn unavailable_date_excludes_employee() {
        let mut emp = employee();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        emp.unavailable_dates.insert(date);
        let req = requirement();
        let s = slot(date);
        assert_eq!(
            eligibility(&emp, &s, &req, 8.8),
            Err(IneligibilityReason::Unavailable)
        );
    }

    #[test]
    fn product_type_mismatch_excludes_employee_when_both_sides_specific() {
        let mut emp = employee();
        emp.product_types.insert("SO".to_string());
        let mut req = requirement();
        req.product_type = "APO".to_string();
        let s = slot(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(
            eligibility(&emp, &s, &req, 8.8),
            Err(IneligibilityReason::ProductType)
        );
    }
}
