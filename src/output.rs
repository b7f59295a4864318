//! Output Assembler — the last stage of a solve.
//!
//! Treats `assignments[]` as the single source of truth: every per-employee
//! daily status and every hour total in the output is derived from that one
//! array, never maintained as a separate parallel structure. Also where the
//! full {gross, lunch, normal, overtime, restDayPay, paid} breakdown gets
//! filled in, since the Constraint Model Builder only knows gross hours at
//! solve time.

use crate::config::ParameterResolver;
use crate::constraints::iso_week_key;
use crate::domain::{Assignment, AssignmentStatus, Employee, Requirement, ShiftDefinition, Slot};
use crate::dto::{
    DailyStatusEntry, EmployeeRosterEntry, OutputMeta, RosterOutput, RosterSummary, ScoreBreakdown,
    SolverRunInfo,
};
use crate::error::Result;
use crate::hours::{calculate_hours, HourContext, RunningCounters};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

pub struct AssemblyInput<'a> {
    pub employees: &'a [Employee],
    pub requirements: &'a HashMap<String, Requirement>,
    pub shift_lookup: &'a HashMap<String, ShiftDefinition>,
    pub slots_by_id: HashMap<String, &'a Slot>,
    pub resolver: &'a ParameterResolver,
    pub public_holidays: &'a [NaiveDate],
}

/// Recomputes full hour breakdowns for every Assigned entry (walking each
/// employee's own assignments in date order so running weekly/monthly
/// counters and the sixth-consecutive-day rule see correct history), then
/// folds the result into roster-level rollups.
pub fn assemble(
    input: &AssemblyInput,
    mut assignments: Vec<Assignment>,
    solver_run: SolverRunInfo,
    score: ScoreBreakdown,
    meta: OutputMeta,
) -> Result<RosterOutput> {
    let mut by_employee: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, a) in assignments.iter().enumerate() {
        if let Some(id) = &a.employee_id {
            by_employee.entry(id.clone()).or_default().push(idx);
        }
    }

    let employee_lookup: HashMap<&str, &Employee> =
        input.employees.iter().map(|e| (e.id.as_str(), e)).collect();

    for (employee_id, mut indices) in by_employee {
        indices.sort_by_key(|&idx| assignments[idx].date);
        let Some(employee) = employee_lookup.get(employee_id.as_str()) else {
            continue;
        };
        let rule = input
            .resolver
            .monthly_limit_rule(employee.scheme, &employee.product_types, &employee.rank);

        let mut counters = RunningCounters::default();
        let mut current_week = None;
        let mut current_month = None;
        let mut consecutive_run = 0u32;
        let mut previous_date: Option<NaiveDate> = None;

        for idx in indices {
            if assignments[idx].status != AssignmentStatus::Assigned {
                previous_date = None;
                consecutive_run = 0;
                continue;
            }
            let date = assignments[idx].date;
            let week_key = iso_week_key(date);
            let month_key = (date.year(), date.month());
            if current_week != Some(week_key) {
                counters.week_normal_hours_so_far = 0.0;
                current_week = Some(week_key);
            }
            if current_month != Some(month_key) {
                counters.month_to_date_hours = 0.0;
                counters.month_overtime_so_far = 0.0;
                current_month = Some(month_key);
            }
            consecutive_run = match previous_date {
                Some(prev) if prev.succ_opt() == Some(date) => consecutive_run + 1,
                _ => 1,
            };
            previous_date = Some(date);

            let Some(slot) = input.slots_by_id.get(&assignments[idx].slot_id) else {
                // No slot record for this run means the assignment was
                // already resolved (and its hours computed) in a previous
                // solve; fold the existing totals into the running
                // counters instead of recomputing them.
                let hb = assignments[idx].hours;
                counters.week_normal_hours_so_far += hb.normal;
                counters.month_to_date_hours += hb.normal + hb.overtime;
                counters.month_overtime_so_far += hb.overtime;
                continue;
            };
            let requirement = input.requirements.get(&slot.requirement_id);
            let is_holiday = input.public_holidays.contains(&date);
            let work_days_per_week = requirement
                .map(|r| scale_to_week(r.work_pattern.work_days_count(), r.work_pattern.cycle_length()))
                .unwrap_or(5);
            let days_in_month = days_in_month(date.year(), date.month());

            let ctx = HourContext {
                scheme: employee.scheme,
                is_apgd_d10: employee.is_apgd_d10(),
                date,
                is_public_holiday: is_holiday,
                pattern_is_work_day: true,
                work_days_per_week_in_pattern: work_days_per_week,
                planned_work_days_in_month: indices_count_in_month(&assignments, &employee_id, date),
                month_length: days_in_month,
                rule,
                counters,
            };
            let is_sixth = work_days_per_week == 6 && consecutive_run % 6 == 0;
            let breakdown = calculate_hours(slot.start, slot.end, &ctx, is_sixth)?;
            counters.week_normal_hours_so_far += breakdown.normal;
            counters.month_to_date_hours += breakdown.normal + breakdown.overtime;
            counters.month_overtime_so_far += breakdown.overtime;
            assignments[idx].hours = breakdown;
        }
    }

    let employee_roster = build_employee_roster(input.employees, &assignments);
    let roster_summary = build_summary(&assignments, input.employees.len());

    Ok(RosterOutput {
        solver_run,
        score,
        meta,
        assignments,
        employee_roster,
        roster_summary,
        icpmp_preprocessing: None,
        incremental_solve: None,
    })
}

fn scale_to_week(work_days: usize, cycle_length: usize) -> u32 {
    if cycle_length == 0 {
        return 5;
    }
    ((work_days as f64 * 7.0 / cycle_length as f64).round() as u32).clamp(1, 7)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap();
    let this_month_first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (next_month_first - this_month_first).num_days() as u32
}

fn indices_count_in_month(assignments: &[Assignment], employee_id: &str, date: NaiveDate) -> u32 {
    assignments
        .iter()
        .filter(|a| {
            a.employee_id.as_deref() == Some(employee_id)
                && a.status == AssignmentStatus::Assigned
                && a.date.year() == date.year()
                && a.date.month() == date.month()
        })
        .count() as u32
}

fn build_employee_roster(employees: &[Employee], assignments: &[Assignment]) -> Vec<EmployeeRosterEntry> {
    employees
        .iter()
        .map(|employee| {
            let mut daily_status = Vec::new();
            let mut weekly_hours: HashMap<String, f64> = HashMap::new();
            let mut monthly_hours: HashMap<String, f64> = HashMap::new();

            for a in assignments.iter().filter(|a| a.employee_id.as_deref() == Some(&employee.id)) {
                daily_status.push(DailyStatusEntry {
                    date: a.date,
                    status: a.status,
                    shift_code: None,
                });
                if a.status == AssignmentStatus::Assigned {
                    let (year, week) = iso_week_key(a.date);
                    *weekly_hours.entry(format!("{year}-W{week:02}")).or_insert(0.0) +=
                        a.hours.normal + a.hours.overtime;
                    *monthly_hours
                        .entry(format!("{}-{:02}", a.date.year(), a.date.month()))
                        .or_insert(0.0) += a.hours.normal + a.hours.overtime;
                }
            }

            daily_status.sort_by_key(|d| d.date);
            EmployeeRosterEntry {
                employee_id: employee.id.clone(),
                daily_status,
                weekly_hours,
                monthly_hours,
            }
        })
        .collect()
}

fn build_summary(assignments: &[Assignment], total_employees: usize) -> RosterSummary {
    let mut by_status: HashMap<String, usize> = HashMap::new();
    for a in assignments {
        let key = match a.status {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::OffDay => "offDay",
            AssignmentStatus::Unassigned => "unassigned",
            AssignmentStatus::Locked => "locked",
        };
        *by_status.entry(key.to_string()).or_insert(0) += 1;
    }
    RosterSummary {
        by_status,
        total_slots: assignments.len(),
        total_employees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HourBreakdown;
    use std::collections::HashSet;

    fn employee() -> Employee {
        Employee {
            id: "E1".into(),
            name: "Test".into(),
            scheme: crate::domain::Scheme::A,
            product_types: HashSet::new(),
            rank: "Officer".into(),
            gender: None,
            qualifications: vec![],
            unavailable_dates: HashSet::new(),
            rotation_offset: None,
        }
    }

    #[test]
    fn summary_counts_by_status() {
        let assignments = vec![
            Assignment {
                slot_id: "S1".into(),
                date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                employee_id: Some("E1".into()),
                status: AssignmentStatus::Assigned,
                hours: HourBreakdown::default(),
                audit: None,
                unassigned_cause: None,
            },
            Assignment {
                slot_id: "S2".into(),
                date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
                employee_id: None,
                status: AssignmentStatus::Unassigned,
                hours: HourBreakdown::default(),
                audit: None,
                unassigned_cause: Some("x".into()),
            },
        ];
        let summary = build_summary(&assignments, 1);
        assert_eq!(summary.by_status.get("assigned"), Some(&1));
        assert_eq!(summary.by_status.get("unassigned"), Some(&1));
        assert_eq!(summary.total_slots, 2);
    }

    #[test]
    fn days_in_month_handles_december_rollover() {
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2024, 2), 29);
    }

    #[test]
    fn employee_roster_skips_employees_with_no_assignments() {
        let employees = vec![employee()];
        let roster = build_employee_roster(&employees, &[]);
        assert_eq!(roster.len(), 1);
        assert!(roster[0].daily_status.is_empty());
    }
}
