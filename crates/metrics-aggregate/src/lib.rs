//! # Metrics Aggregate
//!
//! The pure aggregation kernel: retention purge, the monthly rollup
//! reduction, month-record construction with gain formatting, and date
//! sorting. None of these functions touch the store or the network —
//! they are unit-tested in isolation.

use chrono::{Datelike, TimeZone, Utc};
use metrics_core::{DailySample, MonthRecord};

/// Daily samples older than this (relative to "now at job start") are purged.
pub const RETENTION_DAYS: i64 = 90;

/// Something orderable by a `date` field, so `sort_by_date` works for both
/// [`DailySample`] and [`MonthRecord`].
pub trait HasDate {
    fn date(&self) -> chrono::DateTime<Utc>;
}

impl HasDate for DailySample {
    fn date(&self) -> chrono::DateTime<Utc> {
        self.date
    }
}

impl HasDate for MonthRecord {
    fn date(&self) -> chrono::DateTime<Utc> {
        self.date
    }
}

/// Whole days between `now` and `date`, floored — matches `floor(hours / 24)`.
#[must_use]
pub fn day_diff(now: chrono::DateTime<Utc>, date: chrono::DateTime<Utc>) -> i64 {
    (now - date).num_hours().div_euclid(24)
}

/// Sort ascending by date. A no-op allocation-wise when already sorted.
pub fn sort_by_date<T: HasDate>(items: &mut [T]) {
    if items.windows(2).all(|w| w[0].date() <= w[1].date()) {
        return;
    }
    items.sort_by_key(HasDate::date);
}

/// Keep only samples within [`RETENTION_DAYS`] of `now`.
#[must_use]
pub fn retention_purge(dailies: &[DailySample], now: chrono::DateTime<Utc>) -> Vec<DailySample> {
    dailies
        .iter()
        .copied()
        .filter(|d| day_diff(now, d.date) < RETENTION_DAYS)
        .collect()
}

/// The calendar month this job's monthly rollup targets: always the month
/// preceding `now`, wrapping December for January.
#[must_use]
pub fn target_month(now: chrono::DateTime<Utc>) -> u32 {
    if now.month() == 1 {
        12
    } else {
        now.month() - 1
    }
}

/// The calendar year paired with [`target_month`], decremented on wraparound.
#[must_use]
pub fn target_year(now: chrono::DateTime<Utc>) -> i32 {
    if now.month() == 1 {
        now.year() - 1
    } else {
        now.year()
    }
}

/// Purge retention, then compute peak/average over samples in the target month.
///
/// Returns `(retained_dailies_sorted_ascending, peak, avg)`. `retained`
/// carries the full 90-day history (not just the target month) — the
/// monthly operation replaces `app.dailies` with it directly.
#[must_use]
pub fn monthly_reduce(dailies: &[DailySample], now: chrono::DateTime<Utc>) -> (Vec<DailySample>, i64, i64) {
    let mut retained = retention_purge(dailies, now);
    sort_by_date(&mut retained);

    let month = target_month(now);
    let mut peak = 0i64;
    let mut sum = 0i64;
    let mut n = 0i64;

    for d in &retained {
        if d.date.month() == month {
            peak = peak.max(d.count);
            sum += d.count;
            n += 1;
        }
    }

    let avg = if n > 0 { sum / n } else { 0 };
    (retained, peak, avg)
}

/// Build the new [`MonthRecord`] for the target month, with gain deltas
/// against `prev` (the last existing record, if any).
#[must_use]
pub fn construct_month_record(
    prev: Option<&MonthRecord>,
    peak: i64,
    avg: i64,
    now: chrono::DateTime<Utc>,
) -> MonthRecord {
    let month = target_month(now);
    let year = target_year(now);
    let date = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("target year/month is always a valid calendar date");

    let (gain, gain_pct) = match prev {
        None => ("-".to_string(), "-".to_string()),
        Some(p) => {
            let gain = avg - p.avg;
            let gain_pct = if p.avg > 0 {
                format!("{:.2}%", gain as f64 / p.avg as f64)
            } else {
                "-".to_string()
            };
            (gain.to_string(), gain_pct)
        }
    };

    MonthRecord {
        date,
        avg,
        peak,
        gain,
        gain_pct,
    }
}
