//! Demo data generators for the roster engine — fixed-seed fixtures used by
//! tests and as worked examples. Not part of the public solve path.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

use crate::domain::{Employee, QualificationExpr, Requirement, Scheme, SchemeFilter, ShiftDefinition, WorkPattern};
use crate::dto::RosterInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSize {
    Small,
    Large,
}

impl std::str::FromStr for DemoSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoSize::Small),
            "LARGE" => Ok(DemoSize::Large),
            _ => Err(()),
        }
    }
}

impl DemoSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoSize::Small => "SMALL",
            DemoSize::Large => "LARGE",
        }
    }

    fn parameters(&self) -> DemoParameters {
        match self {
            DemoSize::Small => DemoParameters {
                demand_count: 2,
                employee_count: 20,
                days_in_schedule: 28,
                scheme_distribution: vec![(Scheme::A, 5.0), (Scheme::B, 3.0), (Scheme::P, 2.0)],
                unavailable_count_distribution: vec![(0, 5.0), (1, 3.0), (2, 1.0)],
            },
            DemoSize::Large => DemoParameters {
                demand_count: 6,
                employee_count: 80,
                days_in_schedule: 60,
                scheme_distribution: vec![(Scheme::A, 6.0), (Scheme::B, 3.0), (Scheme::P, 2.0)],
                unavailable_count_distribution: vec![(0, 6.0), (1, 3.0), (2, 2.0), (3, 1.0)],
            },
        }
    }
}

struct DemoParameters {
    demand_count: usize,
    employee_count: usize,
    days_in_schedule: i64,
    scheme_distribution: Vec<(Scheme, f64)>,
    unavailable_count_distribution: Vec<(usize, f64)>,
}

pub fn list_demo_sizes() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

const RANKS: &[&str] = &["Officer", "Senior Officer", "Supervisor"];
const PRODUCT_TYPES: &[&str] = &["SO", "APO"];

/// Generates a deterministic `RosterInput` fixture: a handful of demands
/// with 5-work/2-off patterns, a pool of employees spread across schemes
/// A/B/P (including some APGD-D10-eligible scheme-A officers), and two
/// shift definitions.
pub fn generate(size: DemoSize) -> RosterInput {
    let params = size.parameters();
    let mut rng = StdRng::seed_from_u64(42);

    let horizon_start = find_next_monday(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let horizon_end = horizon_start + Duration::days(params.days_in_schedule - 1);

    let shift_definitions = vec![
        ShiftDefinition {
            code: "D".to_string(),
            gross_hours: 8.8,
            lunch_break_minutes: 60,
            overnight: false,
        },
        ShiftDefinition {
            code: "N".to_string(),
            gross_hours: 8.8,
            lunch_break_minutes: 60,
            overnight: true,
        },
    ];

    let mut employees = Vec::with_capacity(params.employee_count);
    for i in 0..params.employee_count {
        let scheme = pick_weighted(&mut rng, &params.scheme_distribution);
        let rank = RANKS.choose(&mut rng).unwrap().to_string();
        let mut product_types = HashSet::new();
        if scheme == Scheme::A && rng.gen_bool(0.3) {
            product_types.insert("APO".to_string());
        } else {
            product_types.insert(PRODUCT_TYPES.choose(&mut rng).unwrap().to_string());
        }

        let unavailable_count = pick_count(&mut rng, &params.unavailable_count_distribution);
        let mut unavailable_dates = HashSet::new();
        for _ in 0..unavailable_count {
            let offset = rng.gen_range(0..params.days_in_schedule);
            unavailable_dates.insert(horizon_start + Duration::days(offset));
        }

        employees.push(Employee {
            id: format!("E{:03}", i),
            name: format!("Employee {:03}", i),
            scheme,
            product_types,
            rank,
            gender: None,
            qualifications: vec![],
            unavailable_dates,
            rotation_offset: Some((i % 7) as i64),
        });
    }

    let mut requirements = Vec::with_capacity(params.demand_count);
    for d in 0..params.demand_count {
        let mut headcount_per_shift = HashMap::new();
        headcount_per_shift.insert("D".to_string(), 2u32);
        requirements.push(Requirement {
            requirement_id: format!("R{:03}", d),
            demand_id: format!("DEM{:03}", d),
            product_type: String::new(),
            accepted_ranks: vec![],
            accepted_schemes: SchemeFilter::Any(String::new()),
            gender: None,
            headcount_per_shift,
            work_pattern: WorkPattern(
                vec!["D", "D", "D", "D", "D", "O", "O"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            coverage_day_mask: HashSet::new(),
            required_qualifications: QualificationExpr::default(),
            rotation_offset_source: Some(crate::domain::RotationOffsetSource::FromEmployee),
            pattern_anchor: horizon_start,
        });
    }

    RosterInput {
        horizon_start,
        horizon_end,
        employees,
        requirements,
        shift_definitions,
        constraint_list: vec![],
        monthly_hour_limits: vec![],
        public_holidays: vec![],
        icpmp: Default::default(),
        solver: Default::default(),
    }
}

fn find_next_monday(date: NaiveDate) -> NaiveDate {
    let days_until_monday = match date.weekday() {
        Weekday::Mon => 0,
        Weekday::Tue => 6,
        Weekday::Wed => 5,
        Weekday::Thu => 4,
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        Weekday::Sun => 1,
    };
    date + Duration::days(days_until_monday)
}

fn pick_count(rng: &mut StdRng, distribution: &[(usize, f64)]) -> usize {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;
    for (count, weight) in distribution {
        if choice < *weight {
            return *count;
        }
        choice -= weight;
    }
    distribution.last().map(|(c, _)| *c).unwrap_or(0)
}

fn pick_weighted<T: Copy>(rng: &mut StdRng, distribution: &[(T, f64)]) -> T {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;
    for (value, weight) in distribution {
        if choice < *weight {
            return *value;
        }
        choice -= weight;
    }
    distribution.last().map(|(v, _)| *v).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_demo_has_expected_shape() {
        let input = generate(DemoSize::Small);
        assert_eq!(input.employees.len(), 20);
        assert_eq!(input.requirements.len(), 2);
        assert_eq!(input.shift_definitions.len(), 2);
        assert!(input.horizon_end > input.horizon_start);
    }

    #[test]
    fn generation_is_deterministic_across_runs() {
        let a = generate(DemoSize::Small);
        let b = generate(DemoSize::Small);
        let ids_a: Vec<&str> = a.employees.iter().map(|e| e.id.as_str()).collect();
        let ids_b: Vec<&str> = b.employees.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        let schemes_a: Vec<Scheme> = a.employees.iter().map(|e| e.scheme).collect();
        let schemes_b: Vec<Scheme> = b.employees.iter().map(|e| e.scheme).collect();
        assert_eq!(schemes_a, schemes_b);
    }

    #[test]
    fn some_scheme_a_employees_are_apgd_d10() {
        let input = generate(DemoSize::Large);
        assert!(input.employees.iter().any(|e| e.is_apgd_d10()));
    }

    #[test]
    fn demo_size_from_str() {
        assert_eq!("SMALL".parse::<DemoSize>(), Ok(DemoSize::Small));
        assert_eq!("large".parse::<DemoSize>(), Ok(DemoSize::Large));
        assert!("invalid".parse::<DemoSize>().is_err());
    }
}
