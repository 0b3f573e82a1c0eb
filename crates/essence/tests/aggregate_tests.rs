//! Integration tests for the weekly aggregator
//!
//! Covers the fixed 7-bucket shape and the end-to-end scenario of
//! scoring two messages on the same calendar day.

use chrono::{DateTime, Utc};
use essence::mood::{RawMoodPoint, SeriesStore, weekly_aggregates, weekly_aggregates_at};
use essence::storage::{KvStore, MemoryStore};

/// Test fixture: a fixed "now" so day buckets are deterministic.
fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-10T20:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Test fixture: add an accepted point at an RFC 3339 instant.
fn add_at(store: &SeriesStore<MemoryStore>, message_id: &str, ts: &str, mood: f64, energy: f64) {
    let ms = DateTime::parse_from_rfc3339(ts).unwrap().timestamp_millis();
    let outcome = store.add_point(
        &RawMoodPoint::new("p1", message_id)
            .with_timestamp(ms)
            .with_scores(mood, energy),
    );
    assert!(outcome.is_added(), "Fixture point should be accepted");
}

#[test]
fn test_shape_is_always_seven_days() {
    let store = SeriesStore::new(MemoryStore::new());

    // With no data at all
    let empty = weekly_aggregates(&store, "p1");
    assert_eq!(empty.len(), 7);
    assert!(empty.iter().all(|d| !d.day.is_empty()));
    assert!(empty.iter().all(|d| d.mood.is_none() && d.energy.is_none()));

    // And with a single point
    store.add_point(&RawMoodPoint::new("p1", "m1").with_scores(5.0, 5.0));
    let one = weekly_aggregates(&store, "p1");
    assert_eq!(one.len(), 7);
    let scored = one.iter().filter(|d| d.mood.is_some()).count();
    assert_eq!(scored, 1, "A fresh point lands in today's bucket");
}

#[test]
fn test_same_day_scores_average_to_expected_values() {
    let store = SeriesStore::new(MemoryStore::new());
    add_at(&store, "m1", "2024-03-10T09:00:00Z", 9.0, 8.0);
    add_at(&store, "m2", "2024-03-10T11:30:00Z", 1.0, 1.0);

    let weekly = weekly_aggregates_at(&store, "p1", fixed_now());
    let today = weekly.last().expect("Seven buckets expected");

    assert_eq!(today.mood, Some(5.0));
    assert_eq!(today.energy, Some(4.5));
}

#[test]
fn test_each_day_averages_independently() {
    let store = SeriesStore::new(MemoryStore::new());
    add_at(&store, "m1", "2024-03-08T10:00:00Z", 2.0, 9.0);
    add_at(&store, "m2", "2024-03-09T10:00:00Z", 8.0, 3.0);

    let weekly = weekly_aggregates_at(&store, "p1", fixed_now());

    assert_eq!(weekly[4].mood, Some(2.0));
    assert_eq!(weekly[4].energy, Some(9.0));
    assert_eq!(weekly[5].mood, Some(8.0));
    assert_eq!(weekly[5].energy, Some(3.0));
    // 2024-03-10 itself has no points
    assert_eq!(weekly.last().unwrap().day, "Sun");
    assert!(weekly.last().unwrap().mood.is_none());
}

#[test]
fn test_aggregation_heals_corrupt_storage_first() {
    let kv = MemoryStore::new();
    let block = format!(
        r#"[
            {{"subjectId":"p1","messageId":"m1","timestamp":{},"mood":25,"energy":-3}},
            {{"noIdentity":true}}
        ]"#,
        fixed_now().timestamp_millis() - 3_600_000
    );
    kv.set("essence:mood:p1", &block).unwrap();
    let store = SeriesStore::new(kv);

    let weekly = weekly_aggregates_at(&store, "p1", fixed_now());
    let today = weekly.last().unwrap();
    assert_eq!(today.mood, Some(10.0), "Out-of-range mood clamps, then averages");
    assert_eq!(today.energy, Some(0.0));

    // The healed series is what remains persisted
    assert_eq!(store.series("p1").len(), 1);
}
