//! Domain model for the MOM roster engine.
//!
//! Mirrors the data model of the rostering contract: employees, work
//! patterns, coverage requirements, slots, and assignments. Kept as plain
//! serde structs — the teacher's `#[problem_fact]` / `#[planning_entity]`
//! macros came from a solver framework this crate no longer depends on, so
//! domain state here is just data, and the Constraint Model Builder (see
//! `crate::model`) is the only place a `Slot` gets turned into a decision
//! variable.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Labour-law scheme classification (MOM Employment Act).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    A,
    B,
    P,
}

impl Scheme {
    /// Hard daily gross-hours cap for the scheme (C1).
    pub fn daily_cap_hours(self) -> f64 {
        match self {
            Scheme::A => 14.0,
            Scheme::B => 13.0,
            Scheme::P => 9.0,
        }
    }

    /// Hard max-consecutive-work-days cap (C3), before any APGD-D10 override.
    pub fn max_consecutive_days(self) -> u32 {
        match self {
            Scheme::A => 12,
            Scheme::B => 12,
            Scheme::P => 12,
        }
    }

    /// Minimum rest hours between consecutive shifts (C4).
    pub fn min_rest_hours(self) -> f64 {
        match self {
            Scheme::P => 1.0,
            Scheme::A | Scheme::B => 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// A qualification held by an employee, valid over a date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualification {
    pub code: String,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl Qualification {
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        let after_start = self.valid_from.map(|d| date >= d).unwrap_or(true);
        let before_end = self.valid_to.map(|d| date <= d).unwrap_or(true);
        after_start && before_end
    }
}

/// An employee who can be assigned to slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub scheme: Scheme,
    #[serde(default)]
    pub product_types: HashSet<String>,
    pub rank: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    #[serde(default)]
    pub unavailable_dates: HashSet<NaiveDate>,
    /// 0-based cyclic offset into the work pattern this employee follows.
    /// Not validated against the pattern length at parse time; see
    /// `normalised_rotation_offset`.
    #[serde(default)]
    pub rotation_offset: Option<i64>,
}

impl Employee {
    /// APGD-D10 is derived, never stored: scheme A *and* product type APO.
    pub fn is_apgd_d10(&self) -> bool {
        self.scheme == Scheme::A && self.product_types.contains("APO")
    }

    /// Normalises the stored rotation offset modulo the pattern's cycle
    /// length. The spec requires 0 <= r < L and prescribes modulo
    /// normalisation rather than rejection for out-of-range values.
    pub fn normalised_rotation_offset(&self, cycle_length: usize) -> usize {
        if cycle_length == 0 {
            return 0;
        }
        let r = self.rotation_offset.unwrap_or(0);
        r.rem_euclid(cycle_length as i64) as usize
    }

    pub fn has_qualification_on(&self, code: &str, date: NaiveDate) -> bool {
        self.qualifications
            .iter()
            .any(|q| q.code == code && q.is_valid_on(date))
    }
}

/// A single day-code in a cyclic work pattern.
pub type ShiftCode = String;

pub const OFF_CODE: &str = "O";
pub const UNASSIGNED_CODE: &str = "U";

/// A finite, ordered, cyclic sequence of shift codes. 'O' = off,
/// 'U' = deliberately unassigned (injected by ICPMP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPattern(pub Vec<ShiftCode>);

impl WorkPattern {
    pub fn cycle_length(&self) -> usize {
        self.0.len()
    }

    /// Returns the pattern cell for calendar date `date`, given `anchor`
    /// (the date pattern index 0 aligns with) and rotation offset `r`.
    ///
    /// The rotation is applied exactly once here: `(d - anchor + r) mod L`.
    /// Callers must never additionally rotate the pattern before calling
    /// this (double rotation is the historical defect this contract
    /// forbids — see the engine's design notes on single-rotation).
    pub fn cell_for(&self, date: NaiveDate, anchor: NaiveDate, r: usize) -> Option<&str> {
        let l = self.cycle_length();
        if l == 0 {
            return None;
        }
        let delta = (date - anchor).num_days();
        let idx = (delta + r as i64).rem_euclid(l as i64) as usize;
        self.0.get(idx).map(|s| s.as_str())
    }

    pub fn work_days_count(&self) -> usize {
        self.0
            .iter()
            .filter(|c| c.as_str() != OFF_CODE && c.as_str() != UNASSIGNED_CODE)
            .count()
    }

    /// Longest run of non-'O' cells scanning the pattern concatenated with
    /// itself (wrap-around consecutive work days). 'U' counts as work for
    /// this purpose since it still occupies a rotation slot.
    pub fn longest_wraparound_work_run(&self) -> usize {
        let l = self.cycle_length();
        if l == 0 {
            return 0;
        }
        let doubled: Vec<&str> = self
            .0
            .iter()
            .chain(self.0.iter())
            .map(|s| s.as_str())
            .collect();
        let mut best = 0usize;
        let mut cur = 0usize;
        for cell in doubled.iter() {
            if *cell != OFF_CODE {
                cur += 1;
                best = best.max(cur);
            } else {
                cur = 0;
            }
        }
        best.min(l)
    }

    pub fn off_days_in_window(&self, window: usize) -> usize {
        if self.0.is_empty() {
            return 0;
        }
        self.0
            .iter()
            .cycle()
            .take(window)
            .filter(|c| c.as_str() == OFF_CODE)
            .count()
    }
}

/// How a set of accepted schemes should be interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemeFilter {
    Any(String), // "Any" | "Global" | ""
    List(Vec<Scheme>),
}

impl SchemeFilter {
    pub fn accepts(&self, scheme: Scheme) -> bool {
        match self {
            SchemeFilter::Any(s) => {
                s.is_empty() || s.eq_ignore_ascii_case("any") || s.eq_ignore_ascii_case("global")
            }
            SchemeFilter::List(list) => list.is_empty() || list.contains(&scheme),
        }
    }
}

/// ALL/ANY match semantics for a qualification group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    All,
    Any,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationGroup {
    pub codes: Vec<String>,
    #[serde(rename = "match")]
    pub match_kind: MatchKind,
}

/// An expression over required qualifications: every group must itself be
/// satisfied (ALL across groups), each group satisfied per its own
/// ALL/ANY semantic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualificationExpr {
    #[serde(default)]
    pub groups: Vec<QualificationGroup>,
}

impl QualificationExpr {
    pub fn is_satisfied_by(&self, employee: &Employee, date: NaiveDate) -> bool {
        self.groups.iter().all(|g| match g.match_kind {
            MatchKind::All => g
                .codes
                .iter()
                .all(|c| employee.has_qualification_on(c, date)),
            MatchKind::Any => g
                .codes
                .iter()
                .any(|c| employee.has_qualification_on(c, date)),
        })
    }
}

/// Where a requirement's employees should source their rotation offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationOffsetSource {
    FromEmployee,
    FromIcpmp,
}

/// One coverage need.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub requirement_id: String,
    pub demand_id: String,
    pub product_type: String,
    #[serde(default)]
    pub accepted_ranks: Vec<String>,
    #[serde(default = "default_scheme_filter")]
    pub accepted_schemes: SchemeFilter,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Headcount needed per shift code on a covered day.
    pub headcount_per_shift: HashMap<ShiftCode, u32>,
    pub work_pattern: WorkPattern,
    /// Subset of ISO weekdays (1 = Monday .. 7 = Sunday) this requirement
    /// needs covered. Empty means every day.
    #[serde(default)]
    pub coverage_day_mask: HashSet<u32>,
    #[serde(default)]
    pub required_qualifications: QualificationExpr,
    #[serde(default)]
    pub rotation_offset_source: Option<RotationOffsetSource>,
    pub pattern_anchor: NaiveDate,
}

fn default_scheme_filter() -> SchemeFilter {
    SchemeFilter::Any(String::new())
}

impl Requirement {
    pub fn accepts_rank(&self, rank: &str) -> bool {
        self.accepted_ranks.is_empty()
            || self.accepted_ranks.iter().any(|r| r == rank)
            || self.accepted_ranks.iter().any(|r| r == "All")
    }

    /// The pattern's effective length: coverage-day-mask length when a
    /// weekday mask is given, otherwise 7.
    pub fn effective_week_length(&self) -> usize {
        if self.coverage_day_mask.is_empty() {
            7
        } else {
            self.coverage_day_mask.len()
        }
    }

    pub fn covers_weekday(&self, iso_weekday: u32) -> bool {
        self.coverage_day_mask.is_empty() || self.coverage_day_mask.contains(&iso_weekday)
    }
}

/// code -> (gross hours, lunch break minutes, overnight flag).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDefinition {
    pub code: ShiftCode,
    pub gross_hours: f64,
    pub lunch_break_minutes: u32,
    #[serde(default)]
    pub overnight: bool,
}

/// Accounting method for normal/overtime split, resolved per employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountingMethod {
    WeeklyThreshold,
    DailyProrated,
    MonthlyCumulative,
}

impl AccountingMethod {
    /// Parses a method name, accepting the documented aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weeklyThreshold" | "weekly44h" => Some(AccountingMethod::WeeklyThreshold),
            "dailyProrated" | "dailyContractual" => Some(AccountingMethod::DailyProrated),
            "monthlyCumulative" | "monthlyContractual" => Some(AccountingMethod::MonthlyCumulative),
            _ => None,
        }
    }
}

/// Applicability filter: schemes/productTypes/ranks, 'All' wildcard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicabilityFilter {
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub ranks: Vec<String>,
}

impl ApplicabilityFilter {
    pub fn matches(&self, scheme: Scheme, product_types: &HashSet<String>, rank: &str) -> bool {
        let scheme_ok = self.schemes.is_empty() || self.schemes.contains(&scheme);
        let product_ok = self.product_types.is_empty()
            || self.product_types.iter().any(|p| p == "All")
            || self.product_types.iter().any(|p| product_types.contains(p));
        let rank_ok = self.ranks.is_empty()
            || self.ranks.iter().any(|r| r == "All")
            || self.ranks.iter().any(|r| r == rank);
        scheme_ok && product_ok && rank_ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyLimitValues {
    pub max_overtime_hours: f64,
    pub minimum_contractual_hours: f64,
    #[serde(default)]
    pub total_max_hours: Option<f64>,
}

/// Keyed by month-length (28/29/30/31).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyHourLimitRule {
    pub applicability: ApplicabilityFilter,
    pub accounting_method: AccountingMethod,
    pub values_by_month_length: HashMap<u32, MonthlyLimitValues>,
}

impl MonthlyHourLimitRule {
    pub fn values_for(&self, month_length: u32) -> Option<&MonthlyLimitValues> {
        self.values_by_month_length.get(&month_length)
    }
}

/// Atomic assignable unit produced by the Slot Generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub slot_id: String,
    pub date: NaiveDate,
    pub shift_code: ShiftCode,
    pub demand_id: String,
    pub requirement_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub headcount_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Assigned,
    OffDay,
    Unassigned,
    Locked,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourBreakdown {
    pub gross: f64,
    pub lunch: f64,
    pub normal: f64,
    pub overtime: f64,
    pub rest_day_pay: f64,
    pub paid: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentSource {
    Locked,
    Incremental,
    Initial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    pub source: AssignmentSource,
    pub solver_run_id: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub previous_job_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub slot_id: String,
    pub date: NaiveDate,
    pub employee_id: Option<String>,
    pub status: AssignmentStatus,
    #[serde(default)]
    pub hours: HourBreakdown,
    #[serde(default)]
    pub audit: Option<AuditInfo>,
    /// Best-effort cause when status = Unassigned; never affects correctness.
    #[serde(default)]
    pub unassigned_cause: Option<String>,
}
