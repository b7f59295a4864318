//! End-to-end scenarios against the two public entry points.

use chrono::NaiveDate;
use mom_roster_core::demo_data::{generate, DemoSize};
use mom_roster_core::domain::{
    Employee, Gender, QualificationExpr, RotationOffsetSource, Scheme, SchemeFilter,
    ShiftDefinition, WorkPattern,
};
use mom_roster_core::dto::{IncrementalInput, IncrementalMode, IcpmpRequestOptions, RosterInput, SolverOptions};
use mom_roster_core::error::RosterError;
use mom_roster_core::{solve_incremental, solve_roster};
use std::collections::{HashMap, HashSet};

fn base_employee(id: &str, scheme: Scheme) -> Employee {
    Employee {
        id: id.to_string(),
        name: id.to_string(),
        scheme,
        product_types: HashSet::new(),
        rank: "Officer".to_string(),
        gender: None,
        qualifications: vec![],
        unavailable_dates: HashSet::new(),
        rotation_offset: Some(0),
    }
}

fn shift(code: &str, gross_hours: f64) -> ShiftDefinition {
    ShiftDefinition {
        code: code.to_string(),
        gross_hours,
        lunch_break_minutes: 60,
        overnight: false,
    }
}

fn pattern(codes: &[&str]) -> WorkPattern {
    WorkPattern(codes.iter().map(|s| s.to_string()).collect())
}

fn requirement_with(
    id: &str,
    work_pattern: WorkPattern,
    headcount: u32,
    shift_code: &str,
    anchor: NaiveDate,
) -> mom_roster_core::domain::Requirement {
    let mut headcount_per_shift = HashMap::new();
    headcount_per_shift.insert(shift_code.to_string(), headcount);
    mom_roster_core::domain::Requirement {
        requirement_id: id.to_string(),
        demand_id: format!("{id}-demand"),
        product_type: String::new(),
        accepted_ranks: vec![],
        accepted_schemes: SchemeFilter::Any(String::new()),
        gender: None,
        headcount_per_shift,
        work_pattern,
        coverage_day_mask: HashSet::new(),
        required_qualifications: QualificationExpr::default(),
        rotation_offset_source: Some(RotationOffsetSource::FromEmployee),
        pattern_anchor: anchor,
    }
}

/// Scenario 1: a seven-day work pattern with no off-days is structurally
/// infeasible under MOM rules and must abort before any slot is generated.
#[test]
fn seven_day_pattern_aborts_with_infeasible_pattern_before_solving() {
    let anchor = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
    let input = RosterInput {
        horizon_start: anchor,
        horizon_end: anchor + chrono::Duration::days(13),
        employees: vec![base_employee("E1", Scheme::B)],
        requirements: vec![requirement_with(
            "R1",
            pattern(&["D", "D", "D", "D", "D", "D", "D"]),
            1,
            "D",
            anchor,
        )],
        shift_definitions: vec![shift("D", 8.8)],
        constraint_list: vec![],
        monthly_hour_limits: vec![],
        public_holidays: vec![],
        icpmp: IcpmpRequestOptions {
            run_icpmp: false,
            enable_ot_aware_icpmp: false,
        },
        solver: SolverOptions::default(),
    };

    let err = solve_roster(input).unwrap_err();
    match err {
        RosterError::InfeasiblePattern { violations, .. } => {
            assert!(violations.iter().any(|v| v.contains("no off-days")));
        }
        other => panic!("expected InfeasiblePattern, got {other:?}"),
    }
}

/// Scenario 6: a 12h shift exceeds scheme P's 9h daily cap, so the
/// eligibility predicate excludes every scheme-P employee from it and the
/// slot is reported unassigned with a daily-cap cause.
#[test]
fn scheme_p_employees_are_ineligible_for_twelve_hour_shifts() {
    let anchor = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
    let input = RosterInput {
        horizon_start: anchor,
        horizon_end: anchor,
        employees: vec![base_employee("P1", Scheme::P)],
        requirements: vec![requirement_with(
            "R1",
            pattern(&["X", "O"]),
            1,
            "X",
            anchor,
        )],
        shift_definitions: vec![shift("X", 12.0)],
        constraint_list: vec![],
        monthly_hour_limits: vec![],
        public_holidays: vec![],
        icpmp: IcpmpRequestOptions {
            run_icpmp: false,
            enable_ot_aware_icpmp: false,
        },
        solver: SolverOptions::default(),
    };

    let output = solve_roster(input).unwrap();
    assert_eq!(output.solver_run.unassigned_count, 1);
    let unassigned = output
        .assignments
        .iter()
        .find(|a| a.status == mom_roster_core::domain::AssignmentStatus::Unassigned)
        .unwrap();
    assert!(unassigned.unassigned_cause.as_deref().unwrap().contains("daily cap"));
}

/// Scenario 7: an APGD-D10 employee (scheme A + APO) on a six-work-day
/// pattern is exempt from the 44h weekly cap, and day six of the run
/// becomes rest-day-pay rather than normal/overtime hours.
#[test]
fn apgd_d10_employee_on_six_day_pattern_solves_and_exempts_weekly_cap() {
    let anchor = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(); // Monday
    let mut employee = base_employee("E1", Scheme::A);
    employee.product_types.insert("APO".to_string());
    assert!(employee.is_apgd_d10());

    let input = RosterInput {
        horizon_start: anchor,
        horizon_end: anchor + chrono::Duration::days(6),
        employees: vec![employee],
        requirements: vec![requirement_with(
            "R1",
            pattern(&["D", "D", "D", "D", "D", "D", "O"]),
            1,
            "D",
            anchor,
        )],
        shift_definitions: vec![shift("D", 8.8)],
        constraint_list: vec![],
        monthly_hour_limits: vec![],
        public_holidays: vec![],
        icpmp: IcpmpRequestOptions {
            run_icpmp: false,
            enable_ot_aware_icpmp: false,
        },
        solver: SolverOptions::default(),
    };

    let output = solve_roster(input).unwrap();
    let assigned: Vec<_> = output
        .assignments
        .iter()
        .filter(|a| a.status == mom_roster_core::domain::AssignmentStatus::Assigned)
        .collect();
    assert_eq!(assigned.len(), 6);
    let sixth_day = assigned.iter().max_by_key(|a| a.date).unwrap();
    assert_eq!(sixth_day.hours.normal, 0.0);
    assert!(sixth_day.hours.rest_day_pay > 0.0);
}

/// A deterministic demo fixture solves cleanly end to end: every slot ends
/// up either assigned or unassigned-with-cause, and the summary counts
/// reconcile against the assignments array (the single source of truth).
#[test]
fn demo_fixture_solves_and_summary_reconciles_with_assignments() {
    let input = generate(DemoSize::Small);
    let total_employees = input.employees.len();
    let output = solve_roster(input).expect("demo fixture should solve");

    let total_from_summary: usize = output.roster_summary.by_status.values().sum();
    assert_eq!(total_from_summary, output.assignments.len());
    assert_eq!(output.roster_summary.total_employees, total_employees);

    for assignment in &output.assignments {
        if assignment.status == mom_roster_core::domain::AssignmentStatus::Unassigned {
            assert!(assignment.unassigned_cause.is_some());
        }
    }
}

/// Scenario 5 (trimmed): an incremental re-solve leaves everything before
/// the cutoff untouched and only decides the solvable window.
#[test]
fn incremental_solve_preserves_locked_history() {
    let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    let solve_from = cutoff + chrono::Duration::days(1);
    let solve_to = cutoff + chrono::Duration::days(7);
    let anchor = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

    let employee = base_employee("E1", Scheme::A);
    let requirement = requirement_with("R1", pattern(&["D", "D", "D", "D", "D", "O", "O"]), 1, "D", anchor);
    let shift_def = shift("D", 8.8);

    let locked_date = cutoff - chrono::Duration::days(1);
    let previous_assignments = vec![mom_roster_core::domain::Assignment {
        slot_id: "LOCKED-1".to_string(),
        date: locked_date,
        employee_id: Some("E1".to_string()),
        status: mom_roster_core::domain::AssignmentStatus::Assigned,
        hours: mom_roster_core::domain::HourBreakdown {
            gross: 8.8,
            lunch: 0.75,
            normal: 8.05,
            overtime: 0.0,
            rest_day_pay: 0.0,
            paid: 8.05,
        },
        audit: None,
        unassigned_cause: None,
    }];

    let base = RosterInput {
        horizon_start: anchor,
        horizon_end: solve_to,
        employees: vec![employee],
        requirements: vec![requirement],
        shift_definitions: vec![shift_def],
        constraint_list: vec![],
        monthly_hour_limits: vec![],
        public_holidays: vec![],
        icpmp: IcpmpRequestOptions {
            run_icpmp: false,
            enable_ot_aware_icpmp: false,
        },
        solver: SolverOptions::default(),
    };

    let incremental_input = IncrementalInput {
        base,
        previous_assignments: previous_assignments.clone(),
        previous_job_id: "job-1".to_string(),
        cutoff_date: cutoff,
        solve_from,
        solve_to,
        mode: IncrementalMode::DemandBased,
    };

    let output = solve_incremental(incremental_input).expect("incremental solve should succeed");
    let locked = output
        .assignments
        .iter()
        .find(|a| a.slot_id == "LOCKED-1")
        .expect("locked assignment must survive the merge");
    assert_eq!(locked.date, locked_date);
    assert_eq!(locked.hours.normal, 8.05);
}

#[test]
fn missing_previous_assignments_is_rejected() {
    let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    let anchor = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let base = RosterInput {
        horizon_start: anchor,
        horizon_end: cutoff,
        employees: vec![base_employee("E1", Scheme::A)],
        requirements: vec![requirement_with("R1", pattern(&["D", "O"]), 1, "D", anchor)],
        shift_definitions: vec![shift("D", 8.8)],
        constraint_list: vec![],
        monthly_hour_limits: vec![],
        public_holidays: vec![],
        icpmp: IcpmpRequestOptions {
            run_icpmp: false,
            enable_ot_aware_icpmp: false,
        },
        solver: SolverOptions::default(),
    };
    let incremental_input = IncrementalInput {
        base,
        previous_assignments: vec![],
        previous_job_id: "job-1".to_string(),
        cutoff_date: cutoff,
        solve_from: cutoff + chrono::Duration::days(1),
        solve_to: cutoff + chrono::Duration::days(1),
        mode: IncrementalMode::DemandBased,
    };
    assert!(matches!(
        solve_incremental(incremental_input).unwrap_err(),
        RosterError::MissingPrevious
    ));
}

#[test]
fn unused_gender_variant_compiles() {
    let _ = Gender::Female;
}
