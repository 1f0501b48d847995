//! Shift time resolution and interval tests.
//!
//! Shifts are pinned to a calendar day and resolved to concrete instants here.
//! Availability windows apply by containment only: a window that merely
//! overlaps a shift says nothing about it.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::domain::{AvailabilityType, AvailabilityWindow, OpenShift};

/// Default start hour for shifts without explicit times.
const DEFAULT_START_HOUR: i64 = 9;

/// Longest shift a request may carry.
pub const MAX_SHIFT_HOURS: f64 = 24.0;

/// A resolved, half-open `[start, end)` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Touching intervals do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if `other` lies entirely within `self`, boundaries included.
    #[inline]
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

/// Resolves a shift to concrete instants on its day.
///
/// With both explicit times, an end at or before the start rolls over to the
/// next day. With only a start time, the end is start + duration. Otherwise the
/// shift starts at 09:00 and lasts its duration.
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use roster_optimizer::domain::OpenShift;
/// use roster_optimizer::time_window::resolve_shift;
///
/// let day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
/// let night = OpenShift::new("s1", day, "night", 8.0).with_times(
///     NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
/// );
/// let interval = resolve_shift(&night);
/// assert_eq!(interval.end.date(), NaiveDate::from_ymd_opt(2025, 12, 2).unwrap());
///
/// let plain = OpenShift::new("s2", day, "day", 4.0);
/// let interval = resolve_shift(&plain);
/// assert_eq!(interval.start.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
/// assert_eq!(interval.end.time(), NaiveTime::from_hms_opt(13, 0, 0).unwrap());
/// ```
pub fn resolve_shift(shift: &OpenShift) -> Interval {
    let duration = duration_from_hours(shift.duration_hours);
    match (shift.start_time, shift.end_time) {
        (Some(start_time), Some(end_time)) => {
            let start = shift.day.and_time(start_time);
            let mut end = shift.day.and_time(end_time);
            if end <= start {
                end = shifted(end, Duration::days(1));
            }
            Interval::new(start, end)
        }
        (Some(start_time), None) => {
            let start = shift.day.and_time(start_time);
            Interval::new(start, shifted(start, duration))
        }
        _ => {
            let start = shifted(shift.day.and_time(NaiveTime::MIN), Duration::hours(DEFAULT_START_HOUR));
            Interval::new(start, shifted(start, duration))
        }
    }
}

/// Durations are clamped to `[0, MAX_SHIFT_HOURS]`; requests outside that
/// range are rejected before resolution.
fn duration_from_hours(hours: f64) -> Duration {
    let millis = (hours.clamp(0.0, MAX_SHIFT_HOURS) * 3_600_000.0).round() as i64;
    Duration::try_milliseconds(millis).unwrap_or_else(Duration::zero)
}

/// `at + by`, or `at` unchanged at the edge of the representable calendar.
fn shifted(at: NaiveDateTime, by: Duration) -> NaiveDateTime {
    at.checked_add_signed(by).unwrap_or(at)
}

/// Returns the window's type if it fully covers `shift`, `None` otherwise.
pub fn coverage(window: &AvailabilityWindow, shift: &Interval) -> Option<AvailabilityType> {
    Interval::new(window.start, window.end)
        .contains(shift)
        .then_some(window.kind)
}

/// Type of the first window (in input order) that covers `shift`.
///
/// `None` means no window covers the shift: the preference layer falls back to
/// the neutral weight and the shift stays eligible.
pub fn covering_type(windows: &[AvailabilityWindow], shift: &Interval) -> Option<AvailabilityType> {
    windows.iter().find_map(|window| coverage(window, shift))
}

/// True if any BLACKOUT window covers `shift`.
pub fn is_blacked_out(windows: &[AvailabilityWindow], shift: &Interval) -> bool {
    windows
        .iter()
        .any(|window| coverage(window, shift) == Some(AvailabilityType::Blackout))
}

/// Serde for availability instants.
///
/// Accepts naive ISO-8601 (`2025-12-01T08:00:00`, optional fraction, or
/// minutes only), RFC 3339 with an offset (compared by local wall-clock), or a
/// bare date (midnight).
pub mod serde_instant {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid instant: {raw:?}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
    }
}

/// Serde for optional `HH:MM` / `HH:MM:SS` times of day.
pub mod serde_time_of_day {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.collect_str(&time.format("%H:%M")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time of day: {text:?}"))),
        }
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }
}
