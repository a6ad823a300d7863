//! Civil-time conversion between IANA timezones.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::ConversionResult;

/// Canonical timestamp format carried across every boundary.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `time_str`, bind it to `from_zone`'s civil calendar, and return the
/// same instant formatted in `to_zone`. Pure function of its three inputs.
pub fn convert(time_str: &str, from_zone: &str, to_zone: &str) -> AppResult<ConversionResult> {
    let naive = parse_timestamp(time_str)?;

    let from_tz: Tz = from_zone
        .parse()
        .map_err(|_| AppError::UnknownZone(from_zone.to_string()))?;
    let to_tz: Tz = to_zone
        .parse()
        .map_err(|_| AppError::UnknownZone(to_zone.to_string()))?;

    let localized = localize(&from_tz, naive, time_str)?;
    let converted = localized.with_timezone(&to_tz);

    Ok(ConversionResult {
        from_zone: from_zone.to_string(),
        to_zone: to_zone.to_string(),
        original: time_str.to_string(),
        converted: converted.format(TIME_FORMAT).to_string(),
    })
}

/// Strict parse of the canonical `YYYY-MM-DD HH:MM:SS` form.
pub fn parse_timestamp(time_str: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(time_str, TIME_FORMAT)
        .map_err(|e| AppError::InvalidFormat(format!("'{}': {}", time_str, e)))
}

/// Bind a naive datetime to a zone, resolving DST transitions: the earlier
/// offset wins on a fold-back, and a skipped civil time shifts forward one
/// hour (the width of a real-world DST gap).
fn localize(tz: &Tz, naive: NaiveDateTime, time_str: &str) -> AppResult<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| AppError::InvalidFormat(format!("'{}' is not a valid local time", time_str))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_york_to_tokyo_summer() {
        // EDT is UTC-4 in June, JST is UTC+9: 13 hours forward.
        let res = convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo").unwrap();
        assert_eq!(res.converted, "2024-06-16 03:30:00");
        assert_eq!(res.original, "2024-06-15 14:30:00");
    }

    #[test]
    fn round_trip_restores_input() {
        let first = convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo").unwrap();
        let back = convert(&first.converted, "Asia/Tokyo", "America/New_York").unwrap();
        assert_eq!(back.converted, "2024-06-15 14:30:00");
    }

    #[test]
    fn winter_offset_differs_from_summer() {
        // EST is UTC-5 in January: 14 hours forward to JST.
        let res = convert("2024-01-15 14:30:00", "America/New_York", "Asia/Tokyo").unwrap();
        assert_eq!(res.converted, "2024-01-16 04:30:00");
    }

    #[test]
    fn dst_gap_shifts_forward() {
        // 02:30 does not exist on 2024-03-10 in New York; it lands on 03:30 EDT.
        let res = convert("2024-03-10 02:30:00", "America/New_York", "UTC").unwrap();
        assert_eq!(res.converted, "2024-03-10 07:30:00");
    }

    #[test]
    fn dst_fold_uses_earlier_offset() {
        // 01:30 occurs twice on 2024-11-03 in New York; the EDT occurrence wins.
        let res = convert("2024-11-03 01:30:00", "America/New_York", "UTC").unwrap();
        assert_eq!(res.converted, "2024-11-03 05:30:00");
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let err = convert("2024/06/15 14:30", "UTC", "UTC").unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = convert("2024-06-15 14:30:00", "Mars/Olympus", "UTC").unwrap_err();
        assert!(matches!(err, AppError::UnknownZone(_)));
    }
}
