//! Display-time formatting.
//!
//! The admin frontend shows timestamps in a single fixed regional convention rather than the
//! viewer's local time. The conversion is a fixed UTC offset applied at write time; documents
//! store the preformatted string so reads never convert. [`format_display`] is also the fallback
//! for older documents that predate the stored string.

use chrono::{DateTime, FixedOffset, Utc};

/// Name of the display time convention, stored alongside every preformatted string.
pub const DISPLAY_TIMEZONE: &str = "Asia/Kolkata";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The fixed display offset: UTC+05:30.
pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 1800).expect("static offset is in range")
}

/// Formats a UTC instant in the display timezone, e.g. `2025-01-02 19:35:07`.
pub fn format_display(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&display_offset()).format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn utc_instant_formats_at_fixed_offset() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 14, 5, 7).unwrap();
        assert_eq!(format_display(instant), "2025-01-02 19:35:07");
    }

    #[test]
    fn midnight_rollover() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 20, 0, 0).unwrap();
        assert_eq!(format_display(instant), "2025-01-03 01:30:00");
    }
}
