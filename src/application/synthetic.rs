// Synthetic history - plausible stand-in data seeded from the current reading
use crate::domain::history::{DailyAverage, HistoricalSample};
use crate::domain::locale::Locale;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rand::Rng;

const INTRADAY_HOURS: i64 = 24;
const INTRADAY_BASE: f64 = 0.85;
const INTRADAY_SPREAD: f64 = 0.3;

const DAILY_DAYS: u64 = 7;
const DAILY_BASE: f64 = 0.9;
const DAILY_SPREAD: f64 = 0.2;

/// Hourly samples from 24 hours ago up to `now` inclusive, oldest first.
/// Each value is `current * U[0.85, 1.15)`.
pub fn intraday_series<R: Rng + ?Sized>(
    current: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<HistoricalSample> {
    (0..=INTRADAY_HOURS)
        .rev()
        .map(|hours_ago| {
            let factor = INTRADAY_BASE + rng.gen_range(0.0..1.0) * INTRADAY_SPREAD;
            HistoricalSample::new(now - TimeDelta::hours(hours_ago), current * factor)
        })
        .collect()
}

/// Averages for the seven days before `today`, newest first.
/// Each value is `current * U[0.9, 1.1)`.
pub fn daily_averages<R: Rng + ?Sized>(
    current: f64,
    today: NaiveDate,
    locale: Locale,
    rng: &mut R,
) -> Vec<DailyAverage> {
    let mut averages: Vec<DailyAverage> = (1..=DAILY_DAYS)
        .rev()
        .filter_map(|days_ago| today.checked_sub_days(chrono::Days::new(days_ago)))
        .map(|date| {
            let factor = DAILY_BASE + rng.gen_range(0.0..1.0) * DAILY_SPREAD;
            DailyAverage::new(date, locale.format_date(date), current * factor)
        })
        .collect();

    averages.reverse();
    averages
}
