//! Weekly aggregation
//!
//! Derives a fixed seven-entry, day-bucketed summary of average mood
//! and energy over the trailing calendar week, shaped for direct
//! charting. Buckets are keyed by full calendar date; the weekday short
//! name is attached per bucket for display.

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::mood::store::SeriesStore;
use crate::storage::KvStore;

/// Averages for one calendar day in the trailing week.
///
/// `mood` and `energy` are independently averaged and rounded to one
/// decimal, or `None` when no points fell on that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAggregate {
    /// Weekday short label, e.g. "Mon".
    pub day: String,
    pub mood: Option<f64>,
    pub energy: Option<f64>,
}

/// Aggregate the trailing seven calendar days ending now.
///
/// The series is sanitized first, so a corrupted block self-heals on
/// the read path before anything is averaged.
pub fn weekly_aggregates<S: KvStore>(store: &SeriesStore<S>, subject_id: &str) -> Vec<DayAggregate> {
    weekly_aggregates_at(store, subject_id, Local::now())
}

/// Aggregate the seven calendar days ending at `now`.
///
/// The window runs from 00:00:00 local time six days before `now` up to
/// `now` itself. Every day in the window gets a bucket, in day order,
/// even when empty.
pub fn weekly_aggregates_at<S, Tz>(
    store: &SeriesStore<S>,
    subject_id: &str,
    now: DateTime<Tz>,
) -> Vec<DayAggregate>
where
    S: KvStore,
    Tz: TimeZone,
{
    let points = store.sanitize_series(subject_id).points;

    let start_date = now.date_naive() - Days::new(6);
    let mut buckets: Vec<DayBucket> = (0..7)
        .map(|offset| DayBucket::new(start_date + Days::new(offset)))
        .collect();

    for point in &points {
        let Some(ts) = DateTime::<Utc>::from_timestamp_millis(point.timestamp) else {
            continue;
        };
        let local = ts.with_timezone(&now.timezone());
        if local > now {
            continue;
        }

        let date = local.date_naive();
        if let Some(bucket) = buckets.iter_mut().find(|b| b.date == date) {
            bucket.moods.push(point.mood);
            bucket.energies.push(point.energy);
        }
    }

    buckets.into_iter().map(DayBucket::finish).collect()
}

struct DayBucket {
    date: NaiveDate,
    moods: Vec<u8>,
    energies: Vec<u8>,
}

impl DayBucket {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            moods: Vec::new(),
            energies: Vec::new(),
        }
    }

    fn finish(self) -> DayAggregate {
        DayAggregate {
            day: self.date.format("%a").to_string(),
            mood: average(&self.moods),
            energy: average(&self.energies),
        }
    }
}

fn average(values: &[u8]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sum: f64 = values.iter().map(|v| f64::from(*v)).sum();
    let avg = sum / values.len() as f64;
    Some((avg * 10.0).round() / 10.0)
}
