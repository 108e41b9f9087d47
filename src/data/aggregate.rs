//! Grouped statistics over a record view.
//!
//! Every function is pure and total: an empty view yields an empty (or `None`)
//! result, never an error.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::filter::DayType;
use super::model::RentalRecord;

// ---------------------------------------------------------------------------
// Recency / frequency / monetary
// ---------------------------------------------------------------------------

/// Latest date in the view.
pub fn max_date(view: &[&RentalRecord]) -> Option<NaiveDate> {
    view.iter().map(|r| r.date).max()
}

/// Whole days between the latest date in the view and each row's date.
pub fn recency_days(view: &[&RentalRecord]) -> Vec<i64> {
    let Some(latest) = max_date(view) else {
        return Vec::new();
    };
    view.iter()
        .map(|r| (latest - r.date).num_days())
        .collect()
}

/// Row count per weekday code.
pub fn frequency_by_weekday(view: &[&RentalRecord]) -> BTreeMap<i64, usize> {
    let mut out = BTreeMap::new();
    for r in view {
        *out.entry(r.weekday_code).or_insert(0) += 1;
    }
    out
}

/// Sum of the daily total per weekday code.
pub fn monetary_by_weekday(view: &[&RentalRecord]) -> BTreeMap<i64, u64> {
    let mut out = BTreeMap::new();
    for r in view {
        *out.entry(r.weekday_code).or_insert(0) += r.total_count_day;
    }
    out
}

/// The three headline RFM metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RfmSummary {
    /// Mean of the per-row recency.
    pub mean_recency_days: f64,
    /// Mean of the per-weekday row counts.
    pub mean_frequency: f64,
    /// Mean of the per-weekday daily-total sums.
    pub mean_monetary: f64,
}

pub fn rfm_summary(view: &[&RentalRecord]) -> Option<RfmSummary> {
    let recency = recency_days(view);
    let frequency = frequency_by_weekday(view);
    let monetary = monetary_by_weekday(view);

    Some(RfmSummary {
        mean_recency_days: mean(recency.iter().map(|&d| d as f64))?,
        mean_frequency: mean(frequency.values().map(|&c| c as f64))?,
        mean_monetary: mean(monetary.values().map(|&s| s as f64))?,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Distinct days per day-level weather label. Rows without a day-level code
/// are skipped; each date counts once, under its first row's label.
pub fn daily_weather_counts(view: &[&RentalRecord]) -> BTreeMap<String, usize> {
    let mut days: BTreeMap<NaiveDate, String> = BTreeMap::new();
    for r in view {
        if let Some(label) = r.weather_label_day() {
            days.entry(r.date).or_insert(label);
        }
    }
    let mut out = BTreeMap::new();
    for label in days.into_values() {
        *out.entry(label).or_insert(0) += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One equal-width bin `[start, end)`; the last bin also includes `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Bin `values` into `bins` equal-width buckets spanning their min..max.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // A single distinct value still gets a unit-wide bin.
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0 / bins as f64
    };

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Hour-of-day profiles
// ---------------------------------------------------------------------------

/// Mean casual and registered counts for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyUsers {
    pub hour: u8,
    pub casual: f64,
    pub registered: f64,
}

pub fn hourly_user_profile(view: &[&RentalRecord]) -> Vec<HourlyUsers> {
    let mut acc: BTreeMap<u8, (u64, u64, usize)> = BTreeMap::new();
    for r in view {
        let Some(hour) = r.hour else { continue };
        let e = acc.entry(hour).or_insert((0, 0, 0));
        e.0 += r.casual_count;
        e.1 += r.registered_count;
        e.2 += 1;
    }
    acc.into_iter()
        .map(|(hour, (casual, registered, n))| HourlyUsers {
            hour,
            casual: casual as f64 / n as f64,
            registered: registered as f64 / n as f64,
        })
        .collect()
}

/// Mean hourly total per hour, restricted to rows matching `day_type`.
pub fn hourly_mean_by_day_type(view: &[&RentalRecord], day_type: DayType) -> BTreeMap<u8, f64> {
    let mut acc: BTreeMap<u8, (u64, usize)> = BTreeMap::new();
    for r in view {
        let Some(hour) = r.hour else { continue };
        if !day_type.matches(r.workingday_flag) {
            continue;
        }
        let e = acc.entry(hour).or_insert((0, 0));
        e.0 += r.total_count_hour;
        e.1 += 1;
    }
    acc.into_iter()
        .map(|(hour, (sum, n))| (hour, sum as f64 / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Weather pivot
// ---------------------------------------------------------------------------

/// Mean hourly total indexed by hour, one column per weather code.
/// Combinations never observed are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherPivot {
    /// Every weather code seen in the view (the column set).
    pub weather_codes: BTreeSet<i64>,
    /// hour → weather code → mean count.
    pub rows: BTreeMap<u8, BTreeMap<i64, f64>>,
}

impl WeatherPivot {
    pub fn get(&self, hour: u8, weather_code: i64) -> Option<f64> {
        self.rows.get(&hour)?.get(&weather_code).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn weather_pivot(view: &[&RentalRecord]) -> WeatherPivot {
    let mut acc: BTreeMap<(u8, i64), (u64, usize)> = BTreeMap::new();
    for r in view {
        let (Some(hour), Some(code)) = (r.hour, r.weather_code()) else {
            continue;
        };
        let e = acc.entry((hour, code)).or_insert((0, 0));
        e.0 += r.total_count_hour;
        e.1 += 1;
    }

    let mut pivot = WeatherPivot::default();
    for ((hour, code), (sum, n)) in acc {
        pivot.weather_codes.insert(code);
        pivot
            .rows
            .entry(hour)
            .or_default()
            .insert(code, sum as f64 / n as f64);
    }
    pivot
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey (1.5 × IQR) whiskers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub count: usize,
}

/// Linear-interpolated quantile of an already sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    // Whiskers reach the most extreme observation still inside the fences.
    let lower_whisker = sorted.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= hi_fence)
        .unwrap_or(q3);

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        count: sorted.len(),
    })
}

/// Daily totals grouped by `key`, summarised per group. Records without a
/// key are left out.
pub fn box_stats_by<F>(view: &[&RentalRecord], key: F) -> BTreeMap<String, BoxStats>
where
    F: Fn(&RentalRecord) -> Option<&str>,
{
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in view {
        let Some(label) = key(r) else { continue };
        groups
            .entry(label.to_string())
            .or_default()
            .push(r.total_count_day as f64);
    }
    groups
        .into_iter()
        .filter_map(|(label, values)| box_stats(&values).map(|s| (label, s)))
        .collect()
}
