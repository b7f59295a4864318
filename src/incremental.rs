//! Incremental Solver — re-solves a bounded window of an existing roster
//! without disturbing locked history.
//!
//! Splits assignments into three partitions relative to `cutoff_date`:
//! locked (on or before cutoff, never touched), solvable (inside
//! `[solve_from, solve_to]`), and freed (inside the window but previously
//! assigned — released back into the pool before the re-solve). Everything
//! else — including any gap between `cutoff_date` and `solve_from` — is
//! carried forward unchanged.

use crate::domain::{Assignment, AssignmentSource, AssignmentStatus, Employee};
use crate::dto::IncrementalMode;
use crate::error::{Result, RosterError};
use crate::model::LockedContext;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::info;

pub struct PartitionedAssignments {
    pub locked: Vec<Assignment>,
    pub freed_slot_ids: HashSet<String>,
    pub carried_forward: Vec<Assignment>,
}

/// Validates the incremental window: `solve_from <= solve_to`, and
/// `cutoff_date` must fall strictly before `solve_from` — a re-solve can
/// never start on or before the boundary of already-locked history.
pub fn validate_window(cutoff: NaiveDate, solve_from: NaiveDate, solve_to: NaiveDate) -> Result<()> {
    if solve_from > solve_to || solve_from <= cutoff {
        return Err(RosterError::IncrementalWindow {
            cutoff,
            solve_from,
            solve_to,
        });
    }
    Ok(())
}

/// Splits `previous_assignments` into locked / freed / carried-forward,
/// relative to `cutoff_date` and the re-solve window. Dates strictly between
/// `cutoff_date` and `solve_from` (possible now that the window no longer
/// has to start immediately after the cutoff) fall into carried-forward.
pub fn partition(
    previous_assignments: &[Assignment],
    cutoff: NaiveDate,
    solve_from: NaiveDate,
    solve_to: NaiveDate,
) -> PartitionedAssignments {
    let mut locked = Vec::new();
    let mut freed_slot_ids = HashSet::new();
    let mut carried_forward = Vec::new();

    for assignment in previous_assignments {
        if assignment.date <= cutoff {
            locked.push(assignment.clone());
        } else if assignment.date >= solve_from && assignment.date <= solve_to {
            freed_slot_ids.insert(assignment.slot_id.clone());
        } else {
            carried_forward.push(assignment.clone());
        }
    }

    info!(
        locked = locked.len(),
        freed = freed_slot_ids.len(),
        carried_forward = carried_forward.len(),
        "incremental partition computed"
    );

    PartitionedAssignments {
        locked,
        freed_slot_ids,
        carried_forward,
    }
}

/// Computes each employee's locked context (weekly hours already spent,
/// consecutive-day run ending at the cutoff) from the locked partition, so
/// hard constraints in the re-solve window see history outside it.
pub fn locked_contexts(
    locked: &[Assignment],
    employees: &[Employee],
    shift_gross_hours: &HashMap<String, f64>,
    cutoff: NaiveDate,
) -> HashMap<String, LockedContext> {
    let mut out: HashMap<String, LockedContext> = employees
        .iter()
        .map(|e| (e.id.clone(), LockedContext::default()))
        .collect();

    for assignment in locked {
        let Some(employee_id) = &assignment.employee_id else {
            continue;
        };
        let Some(ctx) = out.get_mut(employee_id) else {
            continue;
        };
        if assignment.status == AssignmentStatus::Assigned {
            let key = crate::constraints::iso_week_key(assignment.date);
            let hours = shift_gross_hours.get(&assignment.slot_id).copied().unwrap_or(0.0);
            *ctx.locked_weekly_hours.entry(key).or_insert(0.0) += hours;
            ctx.locked_work_dates.push(assignment.date);
        }
    }

    for ctx in out.values_mut() {
        ctx.locked_work_dates.sort();
        let run = consecutive_run_ending_at(&ctx.locked_work_dates, cutoff);
        if run > 0 {
            ctx.locked_consecutive_days_before.insert(cutoff, run);
        }
    }

    out
}

/// Counts the consecutive run of worked days ending at `cutoff`, inclusive:
/// starts at `cutoff` itself when the locked partition (now `date <= cutoff`)
/// has an assignment there, otherwise at the day before.
fn consecutive_run_ending_at(sorted_dates: &[NaiveDate], cutoff: NaiveDate) -> u32 {
    let mut expected = if sorted_dates.last() == Some(&cutoff) {
        Some(cutoff)
    } else {
        cutoff.pred_opt()
    };
    let mut run = 0u32;
    for date in sorted_dates.iter().rev() {
        match expected {
            Some(e) if *date == e => {
                run += 1;
                expected = date.pred_opt();
            }
            Some(e) if *date > e => continue,
            _ => break,
        }
    }
    run
}

/// Determines the effective mode: `demandBased` re-solves against the
/// current demand/requirement set within the window; `outcomeBased` instead
/// pins slots whose prior outcome is a `Locked` status even inside the
/// window, only freeing truly open slots.
pub fn effective_freed_ids(
    mode: IncrementalMode,
    partitioned: &PartitionedAssignments,
    previous_assignments: &[Assignment],
) -> HashSet<String> {
    match mode {
        IncrementalMode::DemandBased => partitioned.freed_slot_ids.clone(),
        IncrementalMode::OutcomeBased => {
            let locked_status_ids: HashSet<String> = previous_assignments
                .iter()
                .filter(|a| a.status == AssignmentStatus::Locked)
                .map(|a| a.slot_id.clone())
                .collect();
            partitioned
                .freed_slot_ids
                .difference(&locked_status_ids)
                .cloned()
                .collect()
        }
    }
}

/// Merges the re-solved window's assignments with the locked and
/// carried-forward partitions into the canonical, single-source-of-truth
/// assignments array.
pub fn merge(
    mut locked: Vec<Assignment>,
    mut resolved: Vec<Assignment>,
    carried_forward: Vec<Assignment>,
    solver_run_id: &str,
) -> Vec<Assignment> {
    for assignment in &mut locked {
        if let Some(audit) = &mut assignment.audit {
            audit.source = AssignmentSource::Locked;
        }
    }
    for assignment in &mut resolved {
        if let Some(audit) = &mut assignment.audit {
            audit.source = AssignmentSource::Incremental;
            audit.solver_run_id = solver_run_id.to_string();
        }
    }
    let mut merged = locked;
    merged.extend(resolved);
    merged.extend(carried_forward);
    merged.sort_by(|a, b| a.date.cmp(&b.date).then(a.slot_id.cmp(&b.slot_id)));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HourBreakdown;

    fn assignment(date: NaiveDate, slot_id: &str, status: AssignmentStatus) -> Assignment {
        Assignment {
            slot_id: slot_id.to_string(),
            date,
            employee_id: Some("E1".to_string()),
            status,
            hours: HourBreakdown::default(),
            audit: None,
            unassigned_cause: None,
        }
    }

    #[test]
    fn rejects_window_starting_before_cutoff() {
        let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let from = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert!(validate_window(cutoff, from, to).is_err());
    }

    #[test]
    fn rejects_window_starting_exactly_at_cutoff() {
        let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert!(validate_window(cutoff, cutoff, to).is_err());
    }

    #[test]
    fn partitions_by_date_relative_to_window() {
        let d = |day: u32| NaiveDate::from_ymd_opt(2026, 2, day).unwrap();
        let previous = vec![
            assignment(d(1), "S-locked", AssignmentStatus::Assigned),
            assignment(d(5), "S-freed", AssignmentStatus::Assigned),
            assignment(d(20), "S-future", AssignmentStatus::Assigned),
        ];
        let out = partition(&previous, d(2), d(3), d(10));
        assert_eq!(out.locked.len(), 1);
        assert!(out.freed_slot_ids.contains("S-freed"));
        assert_eq!(out.carried_forward.len(), 1);
    }

    #[test]
    fn partitions_gap_between_cutoff_and_solve_from_as_carried_forward() {
        let d = |day: u32| NaiveDate::from_ymd_opt(2026, 2, day).unwrap();
        let previous = vec![assignment(d(3), "S-gap", AssignmentStatus::Assigned)];
        let out = partition(&previous, d(1), d(5), d(10));
        assert!(out.locked.is_empty());
        assert!(out.freed_slot_ids.is_empty());
        assert_eq!(out.carried_forward.len(), 1);
    }

    #[test]
    fn consecutive_run_counts_backward_from_cutoff() {
        let cutoff = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let dates = vec![
            NaiveDate::from_ymd_opt(2026, 2, 7).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
        ];
        assert_eq!(consecutive_run_ending_at(&dates, cutoff), 3);
    }
}
