//! Parking fee arithmetic.
//!
//! Durations round up to whole minutes, minutes round up to whole billed
//! hours, and the fee is billed hours times the hourly rate in cents.

use chrono::{DateTime, Utc};

use crate::models::Money;

const MILLIS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_HOUR: i64 = 60;

/// Whole minutes between entry and exit, partial minutes rounded up.
/// An exit recorded before the entry counts as zero.
pub fn duration_minutes(entry_time: DateTime<Utc>, exit_time: DateTime<Utc>) -> i64 {
    let elapsed_ms = (exit_time - entry_time).num_milliseconds().max(0);
    ceil_div(elapsed_ms, MILLIS_PER_MINUTE)
}

pub fn billed_hours(duration_minutes: i64) -> i64 {
    ceil_div(duration_minutes.max(0), MINUTES_PER_HOUR)
}

/// `None` if the fee does not fit in an `i64` of cents.
pub fn parking_fee(duration_minutes: i64, hourly_rate: Money) -> Option<Money> {
    hourly_rate.checked_mul(billed_hours(duration_minutes))
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    value / divisor + i64::from(value % divisor != 0)
}
