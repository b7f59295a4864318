//! MOM Hour Calculator — pure shift -> hours decomposition.
//!
//! Every function here is side-effect-free: given a shift and enough
//! context (scheme, applicable monthly-hour-limit rule, running weekly and
//! monthly counters), it returns an `HourBreakdown` or a `RosterError`. It
//! never clamps silently; see the distilled spec's failure-mode list.

use crate::domain::{AccountingMethod, HourBreakdown, MonthlyHourLimitRule, Scheme};
use crate::error::{Result, RosterError};
use chrono::{NaiveDate, NaiveDateTime};

/// Running counters an employee has accumulated so far, needed to resolve
/// the normal/overtime split for the *next* shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningCounters {
    pub week_normal_hours_so_far: f64,
    pub month_to_date_hours: f64,
    pub month_overtime_so_far: f64,
}

/// Context the calculator needs beyond the shift's own start/end.
pub struct HourContext<'a> {
    pub scheme: Scheme,
    pub is_apgd_d10: bool,
    pub date: NaiveDate,
    pub is_public_holiday: bool,
    pub pattern_is_work_day: bool,
    pub work_days_per_week_in_pattern: u32,
    pub planned_work_days_in_month: u32,
    pub month_length: u32,
    pub rule: Option<&'a MonthlyHourLimitRule>,
    pub counters: RunningCounters,
}

const MONTHLY_OT_CAP_DEFAULT: f64 = 72.0;
const WEEKLY_NORMAL_CAP_DEFAULT: f64 = 44.0;

/// Computes the universal three-tier lunch deduction from gross hours.
fn lunch_deduction(gross: f64) -> f64 {
    if gross > 8.0 {
        1.0
    } else if gross > 6.0 {
        0.75
    } else {
        0.0
    }
}

/// Pattern-aware normal-hour-per-shift cap under `weeklyThreshold`, and
/// whether the shift lands on the "sixth day" special case (0h normal,
/// all rest-day-pay).
fn pattern_aware_normal_cap(work_days_per_week: u32, is_sixth_consecutive_day: bool) -> f64 {
    match work_days_per_week {
        4 => 11.0,
        5 => 8.8,
        6 => {
            if is_sixth_consecutive_day {
                0.0
            } else {
                8.8
            }
        }
        _ => WEEKLY_NORMAL_CAP_DEFAULT / 5.0,
    }
}

/// Decomposes one shift into {gross, lunch, normal, overtime,
/// rest-day-pay, paid}.
pub fn calculate_hours(
    start: NaiveDateTime,
    end: NaiveDateTime,
    ctx: &HourContext,
    is_sixth_consecutive_work_day: bool,
) -> Result<HourBreakdown> {
    if end <= start {
        return Err(RosterError::internal(format!(
            "shift end {} is not after start {} (non-overnight shift must satisfy end > start)",
            end, start
        )));
    }
    let gross = (end - start).num_minutes() as f64 / 60.0;
    if gross <= 0.0 {
        return Err(RosterError::internal("gross hours must be positive"));
    }

    let lunch = lunch_deduction(gross);
    let workable = (gross - lunch).max(0.0);

    // Public-holiday handling: worked hours on a holiday the employee
    // isn't scheduled to work become entirely rest-day-pay.
    if ctx.is_public_holiday && !ctx.pattern_is_work_day {
        return Ok(HourBreakdown {
            gross,
            lunch,
            normal: 0.0,
            overtime: 0.0,
            rest_day_pay: workable,
            paid: workable,
        });
    }

    let method = ctx
        .rule
        .map(|r| r.accounting_method)
        .unwrap_or(AccountingMethod::WeeklyThreshold);

    let (normal, overtime, rest_day_pay) = match method {
        AccountingMethod::WeeklyThreshold => {
            split_weekly_threshold(workable, ctx, is_sixth_consecutive_work_day)
        }
        AccountingMethod::DailyProrated => split_daily_prorated(workable, ctx),
        AccountingMethod::MonthlyCumulative => split_monthly_cumulative(workable, ctx),
    };

    Ok(HourBreakdown {
        gross,
        lunch,
        normal,
        overtime,
        rest_day_pay,
        paid: normal + overtime + rest_day_pay,
    })
}

fn split_weekly_threshold(
    workable: f64,
    ctx: &HourContext,
    is_sixth_consecutive_work_day: bool,
) -> (f64, f64, f64) {
    if ctx.is_apgd_d10 {
        // Exempt from the weekly cap; bounded by totalMaxHours/month instead
        // (enforced at model level, not here).
        return (workable, 0.0, 0.0);
    }

    let per_shift_cap = pattern_aware_normal_cap(
        ctx.work_days_per_week_in_pattern,
        is_sixth_consecutive_work_day,
    );

    if ctx.work_days_per_week_in_pattern == 6 && is_sixth_consecutive_work_day {
        // Day six: 0h normal, 0h OT, all worked hours are rest-day-pay.
        return (0.0, 0.0, workable);
    }

    let remaining_week_capacity =
        (WEEKLY_NORMAL_CAP_DEFAULT - ctx.counters.week_normal_hours_so_far).max(0.0);
    let shift_cap = per_shift_cap.min(remaining_week_capacity);
    let normal = workable.min(shift_cap);
    let overtime = workable - normal;
    (normal, overtime, 0.0)
}

fn split_daily_prorated(workable: f64, ctx: &HourContext) -> (f64, f64, f64) {
    let minimum_contractual = ctx
        .rule
        .and_then(|r| r.values_for(ctx.month_length))
        .map(|v| v.minimum_contractual_hours)
        .unwrap_or(WEEKLY_NORMAL_CAP_DEFAULT * 52.0 / 12.0);
    let planned_days = ctx.planned_work_days_in_month.max(1) as f64;
    let daily_threshold = minimum_contractual / planned_days;
    let normal = workable.min(daily_threshold);
    let overtime = workable - normal;
    (normal, overtime, 0.0)
}

fn split_monthly_cumulative(workable: f64, ctx: &HourContext) -> (f64, f64, f64) {
    let minimum_contractual = ctx
        .rule
        .and_then(|r| r.values_for(ctx.month_length))
        .map(|v| v.minimum_contractual_hours)
        .unwrap_or(WEEKLY_NORMAL_CAP_DEFAULT * 52.0 / 12.0);

    let banked_so_far = ctx.counters.month_to_date_hours;
    if banked_so_far >= minimum_contractual {
        (0.0, workable, 0.0)
    } else {
        let remaining_bank = minimum_contractual - banked_so_far;
        let normal = workable.min(remaining_bank);
        let overtime = workable - normal;
        (normal, overtime, 0.0)
    }
}

/// Monthly OT cap applicable to an employee-day: the rule's
/// `maxOvertimeHours` when present, else the hard default of 72h.
pub fn monthly_overtime_cap(rule: Option<&MonthlyHourLimitRule>, month_length: u32) -> f64 {
    rule.and_then(|r| r.values_for(month_length))
        .map(|v| v.max_overtime_hours)
        .unwrap_or(MONTHLY_OT_CAP_DEFAULT)
}

/// Additional monthly ceiling on gross hours, when `totalMaxHours` is
/// configured.
pub fn monthly_total_hours_cap(rule: Option<&MonthlyHourLimitRule>, month_length: u32) -> Option<f64> {
    rule.and_then(|r| r.values_for(month_length))
        .and_then(|v| v.total_max_hours)
}
