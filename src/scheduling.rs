use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Parses a duration string into a `chrono::Duration`.
///
/// Accepted formats: `"<int>min"`, `"<int>hr"`, `"<int>d"`, `"HH:MM"` and
/// `"DD:HH:MM"`.
pub fn parse_duration(spec: &str) -> Result<Duration, AppError> {
    const MINUTE_MS: i64 = 60 * 1000;
    const HOUR_MS: i64 = 60 * MINUTE_MS;
    const DAY_MS: i64 = 24 * HOUR_MS;

    let spec = spec.trim();

    if spec.contains(':') {
        let parts: Vec<i64> = spec
            .split(':')
            .map(|p| p.parse::<u32>().map(i64::from))
            .collect::<Result<_, _>>()
            .map_err(|_| invalid_duration(spec))?;

        let ms = match parts.as_slice() {
            [days, hours, minutes] => days * DAY_MS + hours * HOUR_MS + minutes * MINUTE_MS,
            [hours, minutes] => hours * HOUR_MS + minutes * MINUTE_MS,
            _ => return Err(invalid_duration(spec)),
        };
        return Ok(Duration::milliseconds(ms));
    }

    let (value, unit_ms) = if let Some(v) = spec.strip_suffix("min") {
        (v, MINUTE_MS)
    } else if let Some(v) = spec.strip_suffix("hr") {
        (v, HOUR_MS)
    } else if let Some(v) = spec.strip_suffix('d') {
        (v, DAY_MS)
    } else {
        return Err(invalid_duration(spec));
    };

    let value: u32 = value.parse().map_err(|_| invalid_duration(spec))?;
    Ok(Duration::milliseconds(i64::from(value) * unit_ms))
}

fn invalid_duration(spec: &str) -> AppError {
    AppError::Validation(format!(
        "Invalid duration format '{spec}'. Use formats like \"2hr\", \"30min\", \"3d\", \"02:30\", or \"1:00:00\"."
    ))
}

/// Parses an operating-hours label like `"9:00 AM"` or `"12:30 PM"` into
/// 24-hour `(hour, minute)`.
pub fn parse_clock_label(label: &str) -> Result<(u32, u32), AppError> {
    let invalid = || AppError::Validation("Invalid time format. Use H:MM AM/PM".to_string());

    let (time, period) = label.trim().split_once(' ').ok_or_else(invalid)?;
    let (hour, minute) = time.split_once(':').ok_or_else(invalid)?;

    let mut hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour == 0 || hour > 12 || minute > 59 {
        return Err(invalid());
    }

    match period.trim().to_ascii_uppercase().as_str() {
        "PM" if hour != 12 => hour += 12,
        "AM" if hour == 12 => hour = 0,
        "AM" | "PM" => {}
        _ => return Err(invalid()),
    }

    Ok((hour, minute))
}

/// Checks that `instant` falls inside the vendor's operating hours, evaluated
/// in the vendor's timezone. When the end label is at or before the start label
/// the window spans midnight (overnight operation).
pub fn validate_operating_hours(
    instant: DateTime<Utc>,
    start_label: &str,
    end_label: &str,
    timezone: Tz,
) -> Result<(), AppError> {
    let local = instant.with_timezone(&timezone);

    let (start_hour, start_minute) = parse_clock_label(start_label)?;
    let (end_hour, end_minute) = parse_clock_label(end_label)?;

    let at = |hour, minute| {
        local
            .with_hour(hour)
            .and_then(|t| t.with_minute(minute))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| AppError::Validation("Invalid time validation parameters".to_string()))
    };

    let start = at(start_hour, start_minute)?;
    let mut end = at(end_hour, end_minute)?;
    if end <= start {
        end += Duration::days(1);
    }

    if local < start || local > end {
        return Err(AppError::OutsideOperatingHours(format!(
            "Order time must be between {start_label} and {end_label} ({timezone})"
        )));
    }

    Ok(())
}

/// Name of the weekday of `instant` in the vendor's timezone ("Monday" ..
/// "Sunday"), for matching against a vendor's available days.
pub fn weekday_name(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant.with_timezone(&timezone).format("%A").to_string()
}

/// The half-open interval during which a vendor is committed to an order.
///
/// Setup orders occupy `[setup_start, delivery)`; non-setup orders collapse to
/// a zero-width instant at the delivery time. `end` is always the delivery
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OccupiedWindow {
    pub fn instant(delivery: DateTime<Utc>) -> Self {
        Self {
            start: delivery,
            end: delivery,
        }
    }

    pub fn with_setup(setup_start: DateTime<Utc>, delivery: DateTime<Utc>) -> Self {
        Self {
            start: setup_start,
            end: delivery,
        }
    }

    /// Half-open overlap, plus an equality rule: two orders delivering at the
    /// exact same instant always conflict, even when both windows are
    /// zero-width. Windows that merely share a start/end boundary do not.
    pub fn conflicts_with(&self, other: &OccupiedWindow) -> bool {
        (other.start < self.end && other.end > self.start) || other.end == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    #[test]
    fn parses_compact_durations() {
        assert_eq!(parse_duration("30min").unwrap(), Duration::minutes(30));
        assert_eq!(parse_duration("2hr").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("3d").unwrap(), Duration::days(3));
    }

    #[test]
    fn parses_colon_durations() {
        assert_eq!(parse_duration("02:30").unwrap(), Duration::minutes(150));
        assert_eq!(
            parse_duration("1:02:30").unwrap(),
            Duration::days(1) + Duration::hours(2) + Duration::minutes(30)
        );
    }

    #[test]
    fn rejects_unknown_duration_formats() {
        for bad in ["", "2h", "min", "1:2:3:4", "abc:30", "-5min"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn clock_labels_convert_to_24_hour() {
        assert_eq!(parse_clock_label("9:00 AM").unwrap(), (9, 0));
        assert_eq!(parse_clock_label("12:00 AM").unwrap(), (0, 0));
        assert_eq!(parse_clock_label("12:30 PM").unwrap(), (12, 30));
        assert_eq!(parse_clock_label("11:45 pm").unwrap(), (23, 45));
        assert!(parse_clock_label("25:00 AM").is_err());
        assert!(parse_clock_label("9:00").is_err());
    }

    #[test]
    fn operating_hours_accept_in_window_instants() {
        // 10:00 New York local on a June Monday is 14:00 UTC.
        let instant = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        assert!(validate_operating_hours(instant, "9:00 AM", "5:00 PM", New_York).is_ok());
    }

    #[test]
    fn operating_hours_reject_out_of_window_instants() {
        // 07:00 New York local, before opening.
        let instant = Utc.with_ymd_and_hms(2025, 6, 2, 11, 0, 0).unwrap();
        let err = validate_operating_hours(instant, "9:00 AM", "5:00 PM", New_York).unwrap_err();
        assert!(matches!(err, AppError::OutsideOperatingHours(_)));
    }

    #[test]
    fn overnight_windows_span_midnight() {
        // 1:00 AM New York local falls inside an 8 PM - 2 AM window.
        let instant = Utc.with_ymd_and_hms(2025, 6, 2, 5, 0, 0).unwrap();
        assert!(validate_operating_hours(instant, "8:00 PM", "2:00 AM", New_York).is_ok());
        // 3:00 AM local falls outside it.
        let after = Utc.with_ymd_and_hms(2025, 6, 2, 7, 0, 0).unwrap();
        assert!(validate_operating_hours(after, "8:00 PM", "2:00 AM", New_York).is_err());
    }

    #[test]
    fn back_to_back_windows_do_not_conflict() {
        let first = OccupiedWindow::with_setup(at(8, 0), at(10, 0));
        let second = OccupiedWindow::with_setup(at(10, 0), at(12, 0));
        assert!(!second.conflicts_with(&first));
        assert!(!first.conflicts_with(&second));
    }

    #[test]
    fn overlapping_setup_windows_conflict() {
        let first = OccupiedWindow::with_setup(at(8, 0), at(10, 0));
        let second = OccupiedWindow::with_setup(at(9, 0), at(11, 0));
        assert!(second.conflicts_with(&first));
    }

    #[test]
    fn instant_inside_setup_window_conflicts() {
        let setup = OccupiedWindow::with_setup(at(8, 0), at(10, 0));
        let inside = OccupiedWindow::instant(at(9, 0));
        assert!(inside.conflicts_with(&setup));
        assert!(setup.conflicts_with(&inside));
    }

    #[test]
    fn same_delivery_instant_conflicts() {
        let first = OccupiedWindow::instant(at(10, 0));
        let second = OccupiedWindow::instant(at(10, 0));
        assert!(second.conflicts_with(&first));
    }

    #[test]
    fn distinct_instants_do_not_conflict() {
        let first = OccupiedWindow::instant(at(10, 0));
        let second = OccupiedWindow::instant(at(11, 0));
        assert!(!second.conflicts_with(&first));
    }

    #[test]
    fn instant_at_setup_start_boundary_does_not_conflict() {
        let setup = OccupiedWindow::with_setup(at(8, 0), at(10, 0));
        let at_start = OccupiedWindow::instant(at(8, 0));
        assert!(!at_start.conflicts_with(&setup));
    }
}
