//! Core rostering engine for Singapore MOM Employment Act compliant shift
//! scheduling.
//!
//! Two entry points: [`solve_roster`] for a fresh planning horizon, and
//! [`solve_incremental`] to re-solve a bounded window of an existing one
//! without disturbing locked history. Everything upstream of the
//! Constraint Model Builder (pattern validation, ICPMP preprocessing, slot
//! generation) is pure and side-effect-free; the model builder is the only
//! place a domain object becomes a decision variable.

pub mod config;
pub mod constraints;
pub mod demo_data;
pub mod domain;
pub mod dto;
pub mod error;
pub mod hours;
pub mod icpmp;
pub mod incremental;
pub mod model;
pub mod output;
pub mod pattern_validator;
pub mod slots;

use chrono::{NaiveDate, NaiveDateTime};
use config::ParameterResolver;
use domain::{Requirement, Scheme, ShiftDefinition, Slot};
use dto::{
    IcpmpSummary, IncrementalInput, IncrementalSolveInfo, OutputMeta, RosterInput, RosterOutput,
    ScoreBreakdown, SolverRunInfo, SolverStatus,
};
use error::{Result, RosterError};
use model::{LockedContext, ModelInput};
use output::AssemblyInput;
use serde::Serialize;
use sha2::{Digest, Sha256};
use slots::CommittedEmployee;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Solves a fresh planning horizon end-to-end.
pub fn solve_roster(input: RosterInput) -> Result<RosterOutput> {
    validate_input(&input)?;

    let resolver = ParameterResolver::new(input.constraint_list.clone(), input.monthly_hour_limits.clone());
    let shift_lookup: HashMap<String, ShiftDefinition> = input
        .shift_definitions
        .iter()
        .map(|s| (s.code.clone(), s.clone()))
        .collect();
    let requirements: HashMap<String, Requirement> = input
        .requirements
        .iter()
        .map(|r| (r.requirement_id.clone(), r.clone()))
        .collect();

    validate_all_patterns(&input, &shift_lookup)?;

    let mut all_slots: Vec<Slot> = Vec::new();
    let mut direct_assignments = Vec::new();
    let mut icpmp_summaries = HashMap::new();

    for requirement in &input.requirements {
        let eligible: Vec<&domain::Employee> = input
            .employees
            .iter()
            .filter(|e| requirement.accepted_schemes.accepts(e.scheme) && requirement.accepts_rank(&e.rank))
            .collect();

        if input.icpmp.run_icpmp {
            let headcount = requirement.headcount_per_shift.values().copied().max().unwrap_or(0) as usize;
            let options = icpmp::IcpmpOptions {
                enable_ot_aware_icpmp: input.icpmp.enable_ot_aware_icpmp,
            };
            let owned_eligible: Vec<domain::Employee> = eligible.iter().map(|e| (*e).clone()).collect();
            let output = icpmp::compute_icpmp(
                requirement,
                headcount,
                input.horizon_start,
                input.horizon_end,
                &owned_eligible,
                &shift_lookup,
                &options,
            );
            icpmp_summaries.insert(
                requirement.requirement_id.clone(),
                IcpmpSummary {
                    employees_required: output.employees_required,
                    expected_coverage_rate: output.expected_coverage_rate,
                    coverage_type: format!("{:?}", output.coverage_type),
                },
            );
        }

        let committed: Vec<CommittedEmployee> = eligible
            .iter()
            .filter(|e| {
                requirement.rotation_offset_source == Some(domain::RotationOffsetSource::FromEmployee)
            })
            .map(|e| CommittedEmployee {
                employee_id: e.id.clone(),
                rotation_offset: e.normalised_rotation_offset(requirement.work_pattern.cycle_length()),
            })
            .collect();

        let generated = slots::generate_slots(
            requirement,
            &shift_lookup,
            input.horizon_start,
            input.horizon_end,
            &committed,
            &input.public_holidays,
        );
        all_slots.extend(generated.slots);
        direct_assignments.extend(generated.direct_assignments.into_iter().map(|(_, a)| a));
    }

    let solver_run_id = run_id(&input.employees.len().to_string(), &all_slots.len().to_string());
    let now = deterministic_timestamp(input.horizon_start);
    let input_hash = compute_input_hash(&input)?;

    let model_input = ModelInput {
        slots: &all_slots,
        employees: &input.employees,
        requirements: &requirements,
        shift_lookup: &shift_lookup,
        resolver: &resolver,
        locked: HashMap::new(),
        solver_run_id: solver_run_id.clone(),
        now,
    };
    let solved = model::solve(&model_input)?;

    let mut assignments = solved.assignments;
    assignments.extend(direct_assignments);

    let slots_by_id: HashMap<String, &Slot> = all_slots.iter().map(|s| (s.slot_id.clone(), s)).collect();
    let assembly_input = AssemblyInput {
        employees: &input.employees,
        requirements: &requirements,
        shift_lookup: &shift_lookup,
        slots_by_id,
        resolver: &resolver,
        public_holidays: &input.public_holidays,
    };

    let solver_run = SolverRunInfo {
        run_id: solver_run_id,
        status: if solved.unassigned_count == 0 {
            SolverStatus::Optimal
        } else {
            SolverStatus::FeasibleWithUnassigned
        },
        objective_value: solved.objective_value,
        variable_count: solved.variable_count,
        constraint_count: solved.constraint_count,
        unassigned_count: solved.unassigned_count,
        duration_seconds: solved.duration_seconds,
    };
    let score = ScoreBreakdown {
        overall: solved.hard_score + solved.soft_score,
        hard: solved.hard_score,
        soft: solved.soft_score,
    };
    let meta = OutputMeta { input_hash };

    let mut output = output::assemble(&assembly_input, assignments, solver_run, score, meta)?;
    if !icpmp_summaries.is_empty() {
        output.icpmp_preprocessing = Some(icpmp_summaries);
    }
    Ok(output)
}

/// Re-solves the window `[solve_from, solve_to]` of an existing roster,
/// leaving everything before `cutoff_date` untouched.
pub fn solve_incremental(input: IncrementalInput) -> Result<RosterOutput> {
    incremental::validate_window(input.cutoff_date, input.solve_from, input.solve_to)?;
    if input.previous_assignments.is_empty() {
        return Err(RosterError::MissingPrevious);
    }

    let resolver = ParameterResolver::new(
        input.base.constraint_list.clone(),
        input.base.monthly_hour_limits.clone(),
    );
    let shift_lookup: HashMap<String, ShiftDefinition> = input
        .base
        .shift_definitions
        .iter()
        .map(|s| (s.code.clone(), s.clone()))
        .collect();
    let requirements: HashMap<String, Requirement> = input
        .base
        .requirements
        .iter()
        .map(|r| (r.requirement_id.clone(), r.clone()))
        .collect();

    let input_hash = compute_input_hash(&input)?;
    let partitioned = incremental::partition(
        &input.previous_assignments,
        input.cutoff_date,
        input.solve_from,
        input.solve_to,
    );
    let freed_ids = incremental::effective_freed_ids(input.mode, &partitioned, &input.previous_assignments);

    let shift_gross_by_slot: HashMap<String, f64> = input
        .previous_assignments
        .iter()
        .map(|a| (a.slot_id.clone(), a.hours.gross))
        .collect();
    let locked: HashMap<String, LockedContext> = incremental::locked_contexts(
        &partitioned.locked,
        &input.base.employees,
        &shift_gross_by_slot,
        input.cutoff_date,
    );

    let mut window_slots: Vec<Slot> = Vec::new();
    for requirement in &input.base.requirements {
        let eligible: Vec<&domain::Employee> = input
            .base
            .employees
            .iter()
            .filter(|e| requirement.accepted_schemes.accepts(e.scheme) && requirement.accepts_rank(&e.rank))
            .collect();
        let committed: Vec<CommittedEmployee> = eligible
            .iter()
            .filter(|e| {
                requirement.rotation_offset_source == Some(domain::RotationOffsetSource::FromEmployee)
            })
            .map(|e| CommittedEmployee {
                employee_id: e.id.clone(),
                rotation_offset: e.normalised_rotation_offset(requirement.work_pattern.cycle_length()),
            })
            .collect();
        let generated = slots::generate_slots(
            requirement,
            &shift_lookup,
            input.solve_from,
            input.solve_to,
            &committed,
            &input.base.public_holidays,
        );
        window_slots.extend(generated.slots.into_iter().filter(|s| freed_ids.contains(&s.slot_id) || !was_previously_assigned(&input.previous_assignments, &s.slot_id)));
    }

    // Window-dated assignments the mode chose not to free (outcomeBased
    // pins anything already Locked) are carried through untouched, same as
    // the before-cutoff locked partition.
    let pinned_in_window: Vec<domain::Assignment> = input
        .previous_assignments
        .iter()
        .filter(|a| a.date >= input.solve_from && a.date <= input.solve_to && !freed_ids.contains(&a.slot_id))
        .cloned()
        .collect();

    let solver_run_id = run_id(&input.previous_job_id, &window_slots.len().to_string());
    let now = deterministic_timestamp(input.base.horizon_start);

    let model_input = ModelInput {
        slots: &window_slots,
        employees: &input.base.employees,
        requirements: &requirements,
        shift_lookup: &shift_lookup,
        resolver: &resolver,
        locked,
        solver_run_id: solver_run_id.clone(),
        now,
    };
    let solved = model::solve(&model_input)?;

    let mut locked_for_merge = partitioned.locked;
    locked_for_merge.extend(pinned_in_window);
    let merged = incremental::merge(
        locked_for_merge,
        solved.assignments,
        partitioned.carried_forward,
        &solver_run_id,
    );

    let slots_by_id: HashMap<String, &Slot> = window_slots.iter().map(|s| (s.slot_id.clone(), s)).collect();
    let assembly_input = AssemblyInput {
        employees: &input.base.employees,
        requirements: &requirements,
        shift_lookup: &shift_lookup,
        slots_by_id,
        resolver: &resolver,
        public_holidays: &input.base.public_holidays,
    };
    let solver_run = SolverRunInfo {
        run_id: solver_run_id,
        status: if solved.unassigned_count == 0 {
            SolverStatus::Optimal
        } else {
            SolverStatus::FeasibleWithUnassigned
        },
        objective_value: solved.objective_value,
        variable_count: solved.variable_count,
        constraint_count: solved.constraint_count,
        unassigned_count: solved.unassigned_count,
        duration_seconds: solved.duration_seconds,
    };
    let score = ScoreBreakdown {
        overall: solved.hard_score + solved.soft_score,
        hard: solved.hard_score,
        soft: solved.soft_score,
    };
    let meta = OutputMeta { input_hash };

    let mut output = output::assemble(&assembly_input, merged, solver_run, score, meta)?;
    output.incremental_solve = Some(IncrementalSolveInfo {
        mode: input.mode,
        locked_count: output
            .assignments
            .iter()
            .filter(|a| a.date <= input.cutoff_date)
            .count(),
        freed_count: freed_ids.len(),
        resolved_count: window_slots.len(),
    });
    info!(run_id = %output.solver_run.run_id, "incremental solve complete");
    Ok(output)
}

fn was_previously_assigned(previous: &[domain::Assignment], slot_id: &str) -> bool {
    previous.iter().any(|a| a.slot_id == slot_id)
}

fn validate_input(input: &RosterInput) -> Result<()> {
    if input.horizon_start > input.horizon_end {
        return Err(RosterError::invalid("horizonStart must not be after horizonEnd"));
    }
    if input.employees.is_empty() {
        return Err(RosterError::invalid("at least one employee is required"));
    }
    if input.requirements.is_empty() {
        return Err(RosterError::invalid("at least one requirement is required"));
    }
    for requirement in &input.requirements {
        for (&_, &headcount) in &requirement.headcount_per_shift {
            if (headcount as i64) < 0 {
                return Err(RosterError::NegativeHeadcount {
                    requirement_id: requirement.requirement_id.clone(),
                    headcount: headcount as i64,
                });
            }
        }
    }
    Ok(())
}

fn validate_all_patterns(input: &RosterInput, shift_lookup: &HashMap<String, ShiftDefinition>) -> Result<()> {
    for requirement in &input.requirements {
        let mut seen: HashSet<(Scheme, bool)> = HashSet::new();
        for employee in &input.employees {
            if !requirement.accepted_schemes.accepts(employee.scheme) {
                continue;
            }
            seen.insert((employee.scheme, employee.is_apgd_d10()));
        }
        let Some(representative_code) = requirement.headcount_per_shift.keys().next() else {
            continue;
        };
        let Some(shift) = shift_lookup.get(representative_code) else {
            continue;
        };
        for (scheme, is_apgd) in seen {
            pattern_validator::validate_pattern(requirement, scheme, is_apgd, shift)?;
        }
    }
    Ok(())
}

fn run_id(seed_a: &str, seed_b: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed_a.as_bytes());
    hasher.update(b"|");
    hasher.update(seed_b.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{:02x}", b)).collect();
    format!("run-{hex}")
}

/// Audit timestamp for a run, derived from the horizon rather than
/// wall-clock time: `solve_roster`/`solve_incremental` must produce
/// byte-identical output for identical input, and every `Assigned` record's
/// audit timestamp is part of that output.
fn deterministic_timestamp(horizon_start: NaiveDate) -> NaiveDateTime {
    horizon_start.and_hms_opt(0, 0, 0).unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    })
}

/// `sha256(canonical-JSON(input))`. Round-tripping through `serde_json::Value`
/// (backed by a `BTreeMap`, not a hash map, since this crate doesn't enable
/// the `preserve_order` feature) sorts object keys regardless of the
/// iteration order of any `HashMap`/`HashSet` fields nested in `input`, so
/// the digest is stable across process runs for logically identical input.
fn compute_input_hash<T: Serialize>(input: &T) -> Result<String> {
    let canonical = serde_json::to_value(input)
        .map_err(|e| RosterError::internal(format!("failed to canonicalise input: {e}")))?
        .to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
