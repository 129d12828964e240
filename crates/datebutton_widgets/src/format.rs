//! Date rendering and epoch-millisecond conversions
//!
//! Dates are exchanged with the host as epoch milliseconds and rendered in
//! the host's local timezone.

use chrono::offset::Local;
use chrono::{DateTime, TimeZone, Utc};

/// How a date renders as label text
///
/// An immutable wrapper around a strftime-style pattern. The default renders
/// abbreviated weekday, day of month, and abbreviated month, e.g.
/// `Fri, 15-Mar`.
///
/// Patterns are not validated; a malformed pattern surfaces as the
/// formatting routine's own failure when the label renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// Create a format from a strftime-style pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Get the pattern string
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render a date with this format
    pub fn render(&self, date: DateTime<Local>) -> String {
        date.format(&self.pattern).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new("%a, %d-%b")
    }
}

/// Convert epoch milliseconds to a local date-time
///
/// Every `i64` is accepted; values outside chrono's representable range
/// clamp to its bounds for rendering purposes.
pub fn datetime_from_millis(ms: i64) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or(if ms < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
        .with_timezone(&Local)
}

/// Epoch milliseconds of local midnight on the given calendar day
///
/// `month0` is zero-indexed. Returns `None` when the day does not exist or
/// midnight does not occur on it in the local timezone; an ambiguous
/// midnight (clocks rolled back across it) resolves to its first
/// occurrence.
pub fn millis_at_local_midnight(year: i32, month0: u32, day: u32) -> Option<i64> {
    let month = month0.checked_add(1)?;
    Local
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_default_pattern() {
        assert_eq!(DateFormat::default().pattern(), "%a, %d-%b");
    }

    #[test]
    fn test_render_default_format() {
        // 2024-03-15 was a Friday
        let date = Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(DateFormat::default().render(date), "Fri, 15-Mar");
    }

    #[test]
    fn test_render_custom_format() {
        let date = Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(DateFormat::new("%Y-%m-%d").render(date), "2024-03-15");
    }

    #[test]
    fn test_midnight_round_trip() {
        let ms = millis_at_local_midnight(2024, 2, 15).unwrap();
        let dt = datetime_from_millis(ms);

        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month0(), 2);
        assert_eq!(dt.day(), 15);
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_nonexistent_day() {
        // February 30th
        assert_eq!(millis_at_local_midnight(2024, 1, 30), None);
        // Month index past December
        assert_eq!(millis_at_local_midnight(2024, 12, 1), None);
    }

    #[test]
    fn test_out_of_range_millis_clamp() {
        // Any i64 is accepted; extremes clamp to chrono's bounds
        let max = datetime_from_millis(i64::MAX);
        assert_eq!(max, DateTime::<Utc>::MAX_UTC.with_timezone(&Local));

        let min = datetime_from_millis(i64::MIN);
        assert_eq!(min, DateTime::<Utc>::MIN_UTC.with_timezone(&Local));
    }
}
