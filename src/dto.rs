//! External interface bundles: the serde-shaped request/response types for
//! `solve_roster` and `solve_incremental`. Internal modules never see these
//! directly — each entry point converts to/from the domain types in
//! `crate::domain` at the boundary.

use crate::config::ConstraintConfigEntry;
use crate::domain::{
    Assignment, Employee, MonthlyHourLimitRule, Requirement, ShiftDefinition,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterInput {
    pub horizon_start: NaiveDate,
    pub horizon_end: NaiveDate,
    pub employees: Vec<Employee>,
    pub requirements: Vec<Requirement>,
    pub shift_definitions: Vec<ShiftDefinition>,
    #[serde(default)]
    pub constraint_list: Vec<ConstraintConfigEntry>,
    #[serde(default)]
    pub monthly_hour_limits: Vec<MonthlyHourLimitRule>,
    #[serde(default)]
    pub public_holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub icpmp: IcpmpRequestOptions,
    #[serde(default)]
    pub solver: SolverOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcpmpRequestOptions {
    #[serde(default = "default_true")]
    pub run_icpmp: bool,
    #[serde(default = "default_true")]
    pub enable_ot_aware_icpmp: bool,
}

impl Default for IcpmpRequestOptions {
    fn default() -> Self {
        Self {
            run_icpmp: true,
            enable_ot_aware_icpmp: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverOptions {
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: u64,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub random_seed: u64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            time_limit_seconds: default_time_limit(),
            worker_count: default_worker_count(),
            random_seed: 0,
        }
    }
}

fn default_time_limit() -> u64 {
    60
}

fn default_worker_count() -> usize {
    rayon::current_num_threads().max(1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalInput {
    pub base: RosterInput,
    pub previous_assignments: Vec<Assignment>,
    pub previous_job_id: String,
    pub cutoff_date: NaiveDate,
    pub solve_from: NaiveDate,
    pub solve_to: NaiveDate,
    #[serde(default)]
    pub mode: IncrementalMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum IncrementalMode {
    #[default]
    DemandBased,
    OutcomeBased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterOutput {
    pub solver_run: SolverRunInfo,
    pub score: ScoreBreakdown,
    pub meta: OutputMeta,
    pub assignments: Vec<Assignment>,
    pub employee_roster: Vec<EmployeeRosterEntry>,
    pub roster_summary: RosterSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icpmp_preprocessing: Option<HashMap<String, IcpmpSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental_solve: Option<IncrementalSolveInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverRunInfo {
    pub run_id: String,
    pub status: SolverStatus,
    pub objective_value: f64,
    pub variable_count: usize,
    pub constraint_count: usize,
    pub unassigned_count: usize,
    pub duration_seconds: f64,
}

/// Objective breakdown: `hard` is the unassigned-slot violation proxy (the
/// model has no other way to relax a hard constraint), `soft` is the reward
/// collected from satisfied soft constraints, `overall` is their sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub overall: f64,
    pub hard: f64,
    pub soft: f64,
}

/// Run metadata independent of the solve outcome itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMeta {
    /// `sha256(canonical-JSON(input))`, lets a caller verify two runs were
    /// given byte-identical input without re-sending the whole bundle.
    pub input_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverStatus {
    Optimal,
    FeasibleWithUnassigned,
    Infeasible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatusEntry {
    pub date: NaiveDate,
    pub status: crate::domain::AssignmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRosterEntry {
    pub employee_id: String,
    pub daily_status: Vec<DailyStatusEntry>,
    pub weekly_hours: HashMap<String, f64>,
    pub monthly_hours: HashMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub by_status: HashMap<String, usize>,
    pub total_slots: usize,
    pub total_employees: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcpmpSummary {
    pub employees_required: usize,
    pub expected_coverage_rate: f64,
    pub coverage_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalSolveInfo {
    pub mode: IncrementalMode,
    pub locked_count: usize,
    pub freed_count: usize,
    pub resolved_count: usize,
}
