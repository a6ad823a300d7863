//! Time-of-day buckets that drive the backdrop artwork and text palette.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    PreDawn,
    Sunrise,
    Morning,
    Day,
    Evening,
    Night,
}

impl TimeBucket {
    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::PreDawn => "pre_dawn",
            TimeBucket::Sunrise => "sunrise",
            TimeBucket::Morning => "morning",
            TimeBucket::Day => "day",
            TimeBucket::Evening => "evening",
            TimeBucket::Night => "night",
        }
    }
}

/// Which text palette stays legible over the bucket's artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

/// Map a wall-clock time to its bucket and palette. Lower bounds inclusive,
/// upper bounds exclusive; the six ranges partition the full 24-hour day.
pub fn classify(t: NaiveTime) -> (TimeBucket, ThemeMode) {
    match t.hour() {
        0..=3 => (TimeBucket::PreDawn, ThemeMode::Light),
        4..=5 => (TimeBucket::Sunrise, ThemeMode::Light),
        6..=9 => (TimeBucket::Morning, ThemeMode::Dark),
        10..=16 => (TimeBucket::Day, ThemeMode::Dark),
        17..=19 => (TimeBucket::Evening, ThemeMode::Dark),
        _ => (TimeBucket::Night, ThemeMode::Light),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn boundary_instants_belong_to_starting_bucket() {
        assert_eq!(classify(at(0, 0, 0)), (TimeBucket::PreDawn, ThemeMode::Light));
        assert_eq!(classify(at(4, 0, 0)), (TimeBucket::Sunrise, ThemeMode::Light));
        assert_eq!(classify(at(6, 0, 0)), (TimeBucket::Morning, ThemeMode::Dark));
        assert_eq!(classify(at(10, 0, 0)), (TimeBucket::Day, ThemeMode::Dark));
        assert_eq!(classify(at(17, 0, 0)), (TimeBucket::Evening, ThemeMode::Dark));
        assert_eq!(classify(at(20, 0, 0)), (TimeBucket::Night, ThemeMode::Light));
    }

    #[test]
    fn last_instants_before_boundaries() {
        assert_eq!(classify(at(3, 59, 59)).0, TimeBucket::PreDawn);
        assert_eq!(classify(at(5, 59, 59)).0, TimeBucket::Sunrise);
        assert_eq!(classify(at(9, 59, 59)).0, TimeBucket::Morning);
        assert_eq!(classify(at(16, 59, 59)).0, TimeBucket::Day);
        assert_eq!(classify(at(19, 59, 59)).0, TimeBucket::Evening);
        assert_eq!(classify(at(23, 59, 59)).0, TimeBucket::Night);
    }

    #[test]
    fn every_hour_is_covered() {
        // Totality: no hour falls outside the six buckets.
        for h in 0..24 {
            let (bucket, _) = classify(at(h, 30, 0));
            assert!(!bucket.label().is_empty(), "hour {} unclassified", h);
        }
    }

    #[test]
    fn mid_bucket_times() {
        assert_eq!(classify(at(14, 30, 0)), (TimeBucket::Day, ThemeMode::Dark));
        assert_eq!(classify(at(3, 30, 0)), (TimeBucket::PreDawn, ThemeMode::Light));
    }
}
