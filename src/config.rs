//! Centralised constraint-parameter resolution.
//!
//! Every hard-coded numeric the distilled spec calls out (daily caps,
//! weekly cap, consecutive-day limits, rest hours, part-timer thresholds)
//! is looked up through this resolver instead of being scattered across
//! constraint implementations — the spec's design notes call this out by
//! name as the fix for several historical regressions.

use crate::domain::{ApplicabilityFilter, MonthlyHourLimitRule, Scheme};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `{id, enforcement, params}` entry from the input bundle's
/// `constraintList`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintConfigEntry {
    pub constraint_id: String,
    pub hard: bool,
    /// Keys look like "General.maxConsecutiveDays" or "A.minRestHours" or
    /// "A+APGD.weeklyCapHours" — see `ParamKey::parse`.
    pub params: HashMap<String, f64>,
}

/// A parsed parameter-lookup key: which scope a raw key string names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Scope {
    SchemeApgd(SchemeTag),
    Scheme(SchemeTag),
    General,
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SchemeTag {
    A,
    B,
    P,
}

impl SchemeTag {
    fn from_scheme(s: Scheme) -> Self {
        match s {
            Scheme::A => SchemeTag::A,
            Scheme::B => SchemeTag::B,
            Scheme::P => SchemeTag::P,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            SchemeTag::A => "A",
            SchemeTag::B => "B",
            SchemeTag::P => "P",
        }
    }
}

fn parse_scope(raw_key: &str) -> (Scope, &str) {
    if let Some((scope, name)) = raw_key.split_once('.') {
        let scope = match scope {
            "A+APGD" => Scope::SchemeApgd(SchemeTag::A),
            "B+APGD" => Scope::SchemeApgd(SchemeTag::B),
            "P+APGD" => Scope::SchemeApgd(SchemeTag::P),
            "A" => Scope::Scheme(SchemeTag::A),
            "B" => Scope::Scheme(SchemeTag::B),
            "P" => Scope::Scheme(SchemeTag::P),
            "General" => Scope::General,
            _ => Scope::Bare,
        };
        (scope, name)
    } else {
        (Scope::Bare, raw_key)
    }
}

/// Resolves constraint parameters and monthly-hour-limit rules. Built once
/// per solve from the input bundle and passed by reference to every
/// component that needs a numeric constant.
pub struct ParameterResolver {
    constraints: HashMap<String, ConstraintConfigEntry>,
    monthly_limits: Vec<MonthlyHourLimitRule>,
}

impl ParameterResolver {
    pub fn new(
        constraints: Vec<ConstraintConfigEntry>,
        monthly_limits: Vec<MonthlyHourLimitRule>,
    ) -> Self {
        let constraints = constraints
            .into_iter()
            .map(|c| (c.constraint_id.clone(), c))
            .collect();
        Self {
            constraints,
            monthly_limits,
        }
    }

    pub fn is_hard(&self, constraint_id: &str, default_hard: bool) -> bool {
        self.constraints
            .get(constraint_id)
            .map(|c| c.hard)
            .unwrap_or(default_hard)
    }

    /// Resolves `constraint_id`'s `param_name` using the four-level
    /// priority: (scheme + APGD-D10) -> scheme-specific -> "General" ->
    /// bare -> `compiled_default`.
    pub fn resolve(
        &self,
        constraint_id: &str,
        param_name: &str,
        scheme: Scheme,
        is_apgd_d10: bool,
        compiled_default: f64,
    ) -> f64 {
        let Some(entry) = self.constraints.get(constraint_id) else {
            return compiled_default;
        };
        let tag = SchemeTag::from_scheme(scheme);

        let mut candidates: Vec<Scope> = Vec::new();
        if is_apgd_d10 {
            candidates.push(Scope::SchemeApgd(tag));
        }
        candidates.push(Scope::Scheme(tag));
        candidates.push(Scope::General);
        candidates.push(Scope::Bare);

        for wanted in candidates {
            for (raw_key, value) in &entry.params {
                let (scope, name) = parse_scope(raw_key);
                if scope == wanted && name == param_name {
                    return *value;
                }
            }
        }
        compiled_default
    }

    /// Finds the applicable monthly-hour-limit rule for an employee,
    /// falling back to the first rule whose filter is fully wildcarded
    /// (the "default rule" the spec refers to), else `None`.
    pub fn monthly_limit_rule(
        &self,
        scheme: Scheme,
        product_types: &std::collections::HashSet<String>,
        rank: &str,
    ) -> Option<&MonthlyHourLimitRule> {
        self.monthly_limits
            .iter()
            .find(|r| r.applicability.matches(scheme, product_types, rank))
            .or_else(|| {
                self.monthly_limits.iter().find(|r| {
                    r.applicability == ApplicabilityFilter::default()
                })
            })
    }
}
