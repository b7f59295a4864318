//! Pattern Validator — upfront MOM feasibility check of a work pattern.
//!
//! Runs once per requirement, before any solving, for each distinct scheme
//! represented among eligible employees. A structural failure here aborts
//! the solve before model construction: per-day CP feedback cannot surface
//! a structural infeasibility and would otherwise silently unassign days.

use crate::domain::{Requirement, Scheme, ShiftDefinition};
use crate::error::{Result, RosterError};
use tracing::{debug, warn};

const WEEKLY_NORMAL_CAP: f64 = 44.0;
const MONTHLY_OT_CAP: f64 = 72.0;
const MIN_OFF_DAYS_PER_WEEK: usize = 1;

#[derive(Debug)]
pub struct PatternValidationOutcome {
    pub alternatives: Vec<String>,
}

/// Validates `requirement`'s work pattern against `scheme`, given the
/// shift definition the pattern's work days reference.
///
/// `shift_gross_hours` is the per-shift gross hours (the validator
/// projects a single representative shift; mixed-shift patterns should be
/// validated once per distinct shift code present).
pub fn validate_pattern(
    requirement: &Requirement,
    scheme: Scheme,
    is_apgd_d10: bool,
    shift: &ShiftDefinition,
) -> Result<PatternValidationOutcome> {
    let pattern = &requirement.work_pattern;
    let l = pattern.cycle_length();
    if l == 0 {
        return Err(RosterError::InvalidInput {
            reason: format!(
                "requirement {} has an empty work pattern",
                requirement.requirement_id
            ),
        });
    }

    let mut violations = Vec::new();

    // 1. Off-day presence.
    let min_off_days = if is_apgd_d10 { 0 } else { MIN_OFF_DAYS_PER_WEEK };
    let off_days_per_week = pattern.off_days_in_window(7);
    if off_days_per_week < min_off_days {
        violations.push(format!(
            "no off-days: pattern provides {} off-day(s) per 7-day window, needs >= {}",
            off_days_per_week, min_off_days
        ));
    }

    // 2. Wrap-around consecutive work-days.
    let max_consecutive = if is_apgd_d10 { 8 } else { scheme.max_consecutive_days() };
    let longest_run = pattern.longest_wraparound_work_run();
    if longest_run > max_consecutive as usize {
        violations.push(format!(
            "wrap-around consecutive work-days {} exceeds scheme limit {}",
            longest_run, max_consecutive
        ));
    }

    // 3. Weekly normal-hour projection.
    let work_days = pattern.work_days_count();
    let weekly_normal_projection =
        work_days as f64 * shift.gross_hours * (7.0 / l as f64);
    if !is_apgd_d10 && scheme != Scheme::P && weekly_normal_projection > WEEKLY_NORMAL_CAP {
        violations.push(format!(
            "weekly normal {:.1}h > {:.1}h",
            weekly_normal_projection, WEEKLY_NORMAL_CAP
        ));
    }

    // 4. Monthly OT projection — approximate OT as hours beyond the daily
    // pattern-aware cap, projected across a nominal 30-day month.
    let monthly_ot_projection = {
        let daily_cap = match pattern.work_days_count().min(6) {
            4 => 11.0,
            5 | 6 => 8.8,
            _ => WEEKLY_NORMAL_CAP / 5.0,
        };
        let per_shift_ot = (shift.gross_hours - daily_cap).max(0.0);
        work_days as f64 * per_shift_ot * (30.0 / l as f64)
    };
    if monthly_ot_projection > MONTHLY_OT_CAP {
        violations.push(format!(
            "monthly OT projection {:.1}h > {:.1}h",
            monthly_ot_projection, MONTHLY_OT_CAP
        ));
    }

    // 5. Daily cap.
    if shift.gross_hours > scheme.daily_cap_hours() {
        violations.push(format!(
            "shift gross hours {:.1}h exceeds scheme {:?} daily cap {:.1}h",
            shift.gross_hours, scheme, scheme.daily_cap_hours()
        ));
    }

    if violations.is_empty() {
        debug!(requirement = %requirement.requirement_id, ?scheme, "pattern validation passed");
        return Ok(PatternValidationOutcome {
            alternatives: Vec::new(),
        });
    }

    let alternatives = suggest_alternatives(scheme, is_apgd_d10, shift.gross_hours);
    warn!(
        requirement = %requirement.requirement_id,
        ?scheme,
        violation_count = violations.len(),
        "pattern validation failed"
    );
    Err(RosterError::InfeasiblePattern {
        requirement_id: requirement.requirement_id.clone(),
        violations,
        alternatives,
    })
}

fn suggest_alternatives(scheme: Scheme, is_apgd_d10: bool, shift_gross_hours: f64) -> Vec<String> {
    let max_consecutive = if is_apgd_d10 { 8 } else { scheme.max_consecutive_days() };
    vec![
        "5 work days + 2 off days per 7-day cycle (D,D,D,D,D,O,O)".to_string(),
        format!(
            "4 work days + 3 off days, capped at {} consecutive work days",
            max_consecutive.min(4)
        ),
        format!(
            "6 work days + 1 off day, only if shift gross hours ({:.1}h) stay within the scheme cap",
            shift_gross_hours
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SchemeFilter, WorkPattern};
    use chrono::NaiveDate;
    use std::collections::{HashMap, HashSet};

    fn requirement_with_pattern(codes: &[&str]) -> Requirement {
        Requirement {
            requirement_id: "R1".into(),
            demand_id: "D1".into(),
            product_type: "SO".into(),
            accepted_ranks: vec![],
            accepted_schemes: SchemeFilter::Any(String::new()),
            gender: None,
            headcount_per_shift: HashMap::new(),
            work_pattern: WorkPattern(codes.iter().map(|s| s.to_string()).collect()),
            coverage_day_mask: HashSet::new(),
            required_qualifications: Default::default(),
            rotation_offset_source: None,
            pattern_anchor: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    fn shift(gross_hours: f64) -> ShiftDefinition {
        ShiftDefinition {
            code: "D".into(),
            gross_hours,
            lunch_break_minutes: 60,
            overnight: false,
        }
    }

    #[test]
    fn seven_day_work_pattern_is_infeasible_no_off_days_and_weekly_hours() {
        let req = requirement_with_pattern(&["D", "D", "D", "D", "D", "D", "D"]);
        let err = validate_pattern(&req, Scheme::B, false, &shift(8.8)).unwrap_err();
        match err {
            RosterError::InfeasiblePattern { violations, alternatives, .. } => {
                assert!(violations.iter().any(|v| v.contains("no off-days")));
                assert!(violations.iter().any(|v| v.contains("weekly normal")));
                assert_eq!(alternatives.len(), 3);
            }
            other => panic!("expected InfeasiblePattern, got {other:?}"),
        }
    }

    #[test]
    fn five_and_two_pattern_passes() {
        let req = requirement_with_pattern(&["D", "D", "D", "D", "D", "O", "O"]);
        let outcome = validate_pattern(&req, Scheme::A, false, &shift(8.8)).unwrap();
        assert!(outcome.alternatives.is_empty());
    }

    #[test]
    fn scheme_p_weekly_cap_not_the_general_forty_four_hour_check() {
        // Scheme P is governed by partTimerWeeklyHours elsewhere, not this
        // general weekly-hour projection, so a tight pattern still passes
        // the validator's weekly check even near the general cap.
        let req = requirement_with_pattern(&["D", "D", "D", "D", "O", "O", "O"]);
        let outcome = validate_pattern(&req, Scheme::P, false, &shift(9.0));
        assert!(outcome.is_ok());
    }
}
