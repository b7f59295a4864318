//! Slot Generator — expands demand x planning horizon into concrete slots,
//! off-days, and pre-marked unassigned records.

use crate::domain::{
    Assignment, AssignmentStatus, HourBreakdown, Requirement, ShiftDefinition, Slot, OFF_CODE,
    UNASSIGNED_CODE,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;

pub struct GeneratedSlots {
    pub slots: Vec<Slot>,
    /// Off-day and pre-marked-unassigned records the generator could
    /// resolve directly without a decision variable.
    pub direct_assignments: Vec<(String, Assignment)>, // (employee_id, assignment)
}

/// Deterministic short hash for slot-id stability across runs.
fn short_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p.as_bytes());
        hasher.update(b"|");
    }
    let digest = hasher.finalize();
    hex_prefix(&digest, 8)
}

fn hex_prefix(bytes: &[u8], n: usize) -> String {
    bytes.iter().take(n).map(|b| format!("{:02x}", b)).collect()
}

/// An employee committed (via ICPMP or direct rotation offset) to a
/// requirement, carrying the rotation offset their shift on any date is
/// computed from.
pub struct CommittedEmployee {
    pub employee_id: String,
    pub rotation_offset: usize,
}

/// Walks one requirement across the horizon, emitting slots for work days
/// and direct off-day/unassigned records for 'O'/'U' pattern cells.
///
/// `committed_employees` drives off-day/U-slot generation: each committed
/// employee's pattern cell for a date is looked up once via the single
/// rotation rule (`WorkPattern::cell_for`), never rotated twice.
pub fn generate_slots(
    requirement: &Requirement,
    shift_lookup: &HashMap<String, ShiftDefinition>,
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    committed_employees: &[CommittedEmployee],
    public_holidays: &[NaiveDate],
) -> GeneratedSlots {
    let mut slots = Vec::new();
    let mut direct_assignments = Vec::new();
    let pattern = &requirement.work_pattern;

    let mut date = horizon_start;
    loop {
        if date > horizon_end {
            break;
        }
        let iso_weekday = date.weekday().number_from_monday();
        let is_holiday = public_holidays.contains(&date);
        if requirement.covers_weekday(iso_weekday) && !is_holiday {
            // Off-day / U-slot resolution for committed employees.
            for committed in committed_employees {
                if let Some(cell) =
                    pattern.cell_for(date, requirement.pattern_anchor, committed.rotation_offset)
                {
                    if cell == OFF_CODE {
                        direct_assignments.push((
                            committed.employee_id.clone(),
                            Assignment {
                                slot_id: format!(
                                    "{}-{}-OFF-{}",
                                    requirement.demand_id, date, committed.employee_id
                                ),
                                date,
                                employee_id: Some(committed.employee_id.clone()),
                                status: AssignmentStatus::OffDay,
                                hours: HourBreakdown::default(),
                                audit: None,
                                unassigned_cause: None,
                            },
                        ));
                        continue;
                    }
                    if cell == UNASSIGNED_CODE {
                        direct_assignments.push((
                            committed.employee_id.clone(),
                            Assignment {
                                slot_id: format!(
                                    "{}-{}-USLOT-{}",
                                    requirement.demand_id, date, committed.employee_id
                                ),
                                date,
                                employee_id: Some(committed.employee_id.clone()),
                                status: AssignmentStatus::Unassigned,
                                hours: HourBreakdown::default(),
                                audit: None,
                                unassigned_cause: Some("icpmp-u-slot".to_string()),
                            },
                        ));
                    }
                }
            }

            // Slot emission: use the requirement's pattern cell at offset 0
            // as the "shape" of the day (which shift code is worked), then
            // emit `headcount` slots for that shift.
            if let Some(cell) = pattern.cell_for(date, requirement.pattern_anchor, 0) {
                if cell != OFF_CODE && cell != UNASSIGNED_CODE {
                    if let Some(headcount) = requirement.headcount_per_shift.get(cell) {
                        if let Some(shift_def) = shift_lookup.get(cell) {
                            for hc_index in 0..*headcount {
                                slots.push(build_slot(requirement, shift_def, date, hc_index));
                            }
                        }
                    }
                }
            }
        }
        date = date.succ_opt().unwrap_or(date);
    }

    debug!(
        requirement = %requirement.requirement_id,
        slot_count = slots.len(),
        direct_count = direct_assignments.len(),
        "slot generation complete"
    );

    GeneratedSlots {
        slots,
        direct_assignments,
    }
}

fn build_slot(
    requirement: &Requirement,
    shift_def: &ShiftDefinition,
    date: NaiveDate,
    headcount_index: u32,
) -> Slot {
    let (start_time, end_time) = shift_window(shift_def);
    let start = date.and_time(start_time);
    let end = if shift_def.overnight {
        (date.succ_opt().unwrap_or(date)).and_time(end_time)
    } else {
        date.and_time(end_time)
    };

    let hash = short_hash(&[
        &requirement.demand_id,
        &date.to_string(),
        &shift_def.code,
        &headcount_index.to_string(),
    ]);
    let slot_id = format!(
        "{}-{}-{}-{}-{}",
        requirement.demand_id, date, shift_def.code, headcount_index, hash
    );

    Slot {
        slot_id,
        date,
        shift_code: shift_def.code.clone(),
        demand_id: requirement.demand_id.clone(),
        requirement_id: requirement.requirement_id.clone(),
        start,
        end,
        headcount_index,
    }
}

/// Derives a nominal shift start/end window purely from its gross-hours
/// duration, anchored at 00:00. The actual wall-clock start time is a
/// property of `ShiftDefinition` in richer deployments; the core only
/// needs a start/end pair consistent enough to compute overlaps and rest
/// gaps, so it anchors every shift's start at midnight plus a stable
/// per-code offset to keep distinct shift codes from colliding.
fn shift_window(shift_def: &ShiftDefinition) -> (NaiveTime, NaiveTime) {
    let code_offset_minutes = (shift_def
        .code
        .bytes()
        .map(|b| b as u32)
        .sum::<u32>()
        * 7)
        % (24 * 60);
    let start = NaiveTime::from_num_seconds_from_midnight_opt(code_offset_minutes * 60, 0)
        .unwrap_or(NaiveTime::MIN);
    let total_minutes = (shift_def.gross_hours * 60.0).round() as i64;
    let end_minutes = (code_offset_minutes as i64 + total_minutes) % (24 * 60);
    let end = NaiveTime::from_num_seconds_from_midnight_opt((end_minutes.max(0) as u32) * 60, 0)
        .unwrap_or(NaiveTime::MIN);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QualificationExpr, SchemeFilter, WorkPattern};
    use std::collections::HashSet;

    fn shift(code: &str, gross: f64) -> ShiftDefinition {
        ShiftDefinition {
            code: code.to_string(),
            gross_hours: gross,
            lunch_break_minutes: 60,
            overnight: false,
        }
    }

    fn requirement() -> Requirement {
        Requirement {
            requirement_id: "R1".into(),
            demand_id: "D1".into(),
            product_type: "SO".into(),
            accepted_ranks: vec![],
            accepted_schemes: SchemeFilter::Any(String::new()),
            gender: None,
            headcount_per_shift: [("D".to_string(), 2u32)].into_iter().collect(),
            work_pattern: WorkPattern(
                vec!["D", "D", "D", "D", "D", "O", "O"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            coverage_day_mask: HashSet::new(),
            required_qualifications: QualificationExpr::default(),
            rotation_offset_source: None,
            pattern_anchor: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        }
    }

    #[test]
    fn slot_ids_are_deterministic_across_runs() {
        let req = requirement();
        let mut shifts = HashMap::new();
        shifts.insert("D".to_string(), shift("D", 8.8));
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let end = start;

        let first = generate_slots(&req, &shifts, start, end, &[], &[]);
        let second = generate_slots(&req, &shifts, start, end, &[], &[]);

        assert_eq!(first.slots.len(), 2);
        assert_eq!(
            first.slots.iter().map(|s| &s.slot_id).collect::<Vec<_>>(),
            second.slots.iter().map(|s| &s.slot_id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn off_day_pattern_cell_produces_no_slot_variable() {
        let req = requirement();
        let mut shifts = HashMap::new();
        shifts.insert("D".to_string(), shift("D", 8.8));
        // Day index 5 in the pattern (anchor + 5 days) is 'O'.
        let date = req.pattern_anchor + chrono::Duration::days(5);
        let out = generate_slots(&req, &shifts, date, date, &[], &[]);
        assert!(out.slots.is_empty());
    }
}
