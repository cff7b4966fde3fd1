//! Pregnancy progress calculations.
//!
//! Pure functions from a due date and an explicit "today" to elapsed
//! weeks/days, the due-date countdown, the trimester, and the composed
//! progress view. No function here reads a clock; callers pass the
//! current date in, which keeps every computation deterministic.
//!
//! All arithmetic in this module is calendar-day arithmetic over
//! `NaiveDate`. Second-granularity timestamp math (session durations)
//! lives in `session` and must not be mixed in here.

use crate::{BabySize, PregnancyInfo, Trimester, WeeksPregnant};
use chrono::{Duration, NaiveDate};

/// A full-term pregnancy counted back from the due date.
pub const PREGNANCY_DURATION_DAYS: i64 = 280;

/// Week thresholds for the trimester boundaries (half-open on the lower
/// edge: week 14 is already `Mid`, week 28 already `Late`).
pub const MID_TRIMESTER_WEEK: i64 = 14;
pub const LATE_TRIMESTER_WEEK: i64 = 28;

/// Elapsed pregnancy time for the given due date.
///
/// The pregnancy start is `due_date - 280 days`; the result splits the
/// calendar days since then into whole weeks plus leftover days. Floor
/// division keeps `days` in `0..7` and preserves
/// `weeks * 7 + days == total_days` even before the start date, where
/// `weeks` goes negative.
pub fn weeks_pregnant(due_date: NaiveDate, today: NaiveDate) -> WeeksPregnant {
    let start = due_date - Duration::days(PREGNANCY_DURATION_DAYS);
    let total_days = (today - start).num_days();

    WeeksPregnant {
        weeks: total_days.div_euclid(7),
        days: total_days.rem_euclid(7),
    }
}

/// Signed calendar days from `today` to the due date; negative once the
/// due date has passed.
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

/// Trimester for an elapsed-week count. Total over all inputs.
pub fn trimester_for(weeks: i64) -> Trimester {
    if weeks < MID_TRIMESTER_WEEK {
        Trimester::Early
    } else if weeks < LATE_TRIMESTER_WEEK {
        Trimester::Mid
    } else {
        Trimester::Late
    }
}

/// Size descriptor for an elapsed-week count (chart lookup with fallback).
pub fn size_for_week(weeks: i64) -> &'static BabySize {
    crate::growth::size_for_week(weeks)
}

/// The composed progress view for display surfaces.
pub fn pregnancy_info(due_date: NaiveDate, today: NaiveDate) -> PregnancyInfo {
    let WeeksPregnant { weeks, days } = weeks_pregnant(due_date, today);

    PregnancyInfo {
        weeks,
        days,
        days_until_due: days_until_due(due_date, today),
        trimester: trimester_for(weeks),
        baby_size: size_for_week(weeks).clone(),
    }
}
