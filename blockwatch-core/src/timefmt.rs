//! Uptime and record-timestamp formatting.
//!
//! Everything here is a pure function of its inputs; the only clock read is
//! [`UptimeClock::start`], which captures the reference instant once.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

use crate::config::DisplayConfig;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Fixed reference instant for uptime figures. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeClock {
    reference: DateTime<Utc>,
}

impl UptimeClock {
    pub fn start() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(reference: DateTime<Utc>) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> String {
        format_uptime(now, self.reference)
    }

    pub fn percentage_within_hour(&self, now: DateTime<Utc>) -> f64 {
        uptime_percentage_within_hour(now, self.reference)
    }
}

/// Milliseconds elapsed since `reference`; a `now` before the reference
/// counts as zero.
fn elapsed_ms(now: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    (now - reference).num_milliseconds().max(0)
}

/// Formats elapsed time as `HH:MM:SS`, prefixed with `"{d}D "` when at least
/// one whole day has passed.
pub fn format_uptime(now: DateTime<Utc>, reference: DateTime<Utc>) -> String {
    let diff = elapsed_ms(now, reference);

    let days = diff / DAY_MS;
    let hours = (diff % DAY_MS) / HOUR_MS;
    let minutes = (diff % HOUR_MS) / MINUTE_MS;
    let seconds = (diff % MINUTE_MS) / SECOND_MS;

    let clock = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
    if days > 0 {
        format!("{}D {}", days, clock)
    } else {
        clock
    }
}

/// Whole minutes into the current hour as a percentage in `[0, 100)`.
/// Seconds are ignored.
pub fn uptime_percentage_within_hour(now: DateTime<Utc>, reference: DateTime<Utc>) -> f64 {
    let minutes = (elapsed_ms(now, reference) % HOUR_MS) / MINUTE_MS;
    minutes as f64 / 60.0 * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Fixed(FixedOffset),
}

/// Formats record timestamps for the derived display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pub time_format: String,
    pub datetime_format: String,
    pub zone: DisplayZone,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::from_config(&DisplayConfig::default())
    }
}

impl DisplayFormat {
    pub fn from_config(config: &DisplayConfig) -> Self {
        let zone = if config.utc {
            DisplayZone::Fixed(Utc.fix())
        } else {
            DisplayZone::Local
        };
        Self {
            time_format: config.time_format.clone(),
            datetime_format: config.datetime_format.clone(),
            zone,
        }
    }

    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    /// Time-of-day string used for query rows.
    pub fn format_time(&self, ts: &DateTime<Utc>) -> String {
        self.render(ts, &self.time_format)
    }

    /// Date and time string used for client rows.
    pub fn format_datetime(&self, ts: &DateTime<Utc>) -> String {
        self.render(ts, &self.datetime_format)
    }

    fn render(&self, ts: &DateTime<Utc>, pattern: &str) -> String {
        let mut out = String::new();
        let written = match self.zone {
            DisplayZone::Local => write!(out, "{}", ts.with_timezone(&Local).format(pattern)),
            DisplayZone::Fixed(offset) => write!(out, "{}", ts.with_timezone(&offset).format(pattern)),
        };
        match written {
            Ok(()) => out,
            Err(_) => INVALID_TIMESTAMP.to_string(),
        }
    }
}

/// Shown for a timestamp that is missing or cannot be formatted.
pub const INVALID_TIMESTAMP: &str = "Invalid Date";

/// Whether `pattern` is a non-empty strftime pattern chrono can render.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.is_empty() && StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn parse_back(formatted: &str) -> i64 {
        let (days, clock) = match formatted.split_once("D ") {
            Some((d, rest)) => (d.parse::<i64>().unwrap(), rest),
            None => (0, formatted),
        };
        let parts: Vec<i64> = clock.split(':').map(|p| p.parse().unwrap()).collect();
        assert_eq!(parts.len(), 3);
        assert!(clock.split(':').all(|p| p.len() == 2));
        ((days * 24 + parts[0]) * 60 + parts[1]) * 60 + parts[2]
    }

    #[test]
    fn test_format_uptime_under_a_day() {
        let r = reference();
        assert_eq!(format_uptime(r, r), "00:00:00");
        assert_eq!(format_uptime(r + Duration::seconds(61), r), "00:01:01");
        assert_eq!(
            format_uptime(r + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59), r),
            "23:59:59"
        );
    }

    #[test]
    fn test_format_uptime_with_days() {
        let r = reference();
        let now = r + Duration::days(2) + Duration::hours(3) + Duration::minutes(4) + Duration::seconds(5);
        assert_eq!(format_uptime(now, r), "2D 03:04:05");
    }

    #[test]
    fn test_format_uptime_reconstructs_elapsed_seconds() {
        let r = reference();
        for secs in [0_i64, 1, 59, 60, 3_599, 3_600, 86_399, 86_400, 90_061, 1_000_000] {
            let formatted = format_uptime(r + Duration::seconds(secs), r);
            assert_eq!(parse_back(&formatted), secs, "{}", formatted);
        }
    }

    #[test]
    fn test_sub_second_remainder_truncates() {
        let r = reference();
        assert_eq!(format_uptime(r + Duration::milliseconds(1_999), r), "00:00:01");
    }

    #[test]
    fn test_now_before_reference_clamps_to_zero() {
        let r = reference();
        assert_eq!(format_uptime(r - Duration::minutes(5), r), "00:00:00");
        assert_eq!(uptime_percentage_within_hour(r - Duration::minutes(5), r), 0.0);
    }

    #[test]
    fn test_percentage_uses_minutes_only() {
        let r = reference();
        assert_eq!(uptime_percentage_within_hour(r, r), 0.0);
        assert_eq!(
            uptime_percentage_within_hour(r + Duration::minutes(30) + Duration::seconds(59), r),
            50.0
        );
        assert_eq!(
            uptime_percentage_within_hour(r + Duration::hours(5) + Duration::minutes(15), r),
            25.0
        );
    }

    #[test]
    fn test_percentage_is_below_one_hundred() {
        let r = reference();
        for secs in (0..7_200).step_by(37) {
            let pct = uptime_percentage_within_hour(r + Duration::seconds(secs), r);
            assert!((0.0..100.0).contains(&pct));
            let minutes = (secs % 3_600) / 60;
            assert!((pct - minutes as f64 / 60.0 * 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_uptime_clock_is_pure_over_reference() {
        let clock = UptimeClock::at(reference());
        let now = reference() + Duration::minutes(90);
        assert_eq!(clock.uptime(now), "01:30:00");
        assert_eq!(clock.percentage_within_hour(now), 50.0);
        assert_eq!(clock.reference(), reference());
    }

    #[test]
    fn test_display_format_fixed_zone() {
        let format = DisplayFormat::default()
            .with_zone(DisplayZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap()));
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 22, 15, 9).unwrap();

        assert_eq!(format.format_time(&ts), "00:15:09");
        assert_eq!(format.format_datetime(&ts), "2024-03-02 00:15:09");
    }

    #[test]
    fn test_pattern_validation() {
        assert!(is_valid_pattern("%H:%M:%S"));
        assert!(is_valid_pattern("%Y-%m-%d %H:%M"));
        assert!(!is_valid_pattern(""));
        assert!(!is_valid_pattern("%Q"));
        assert!(!is_valid_pattern("%H:%"));
    }

    #[test]
    fn test_unrenderable_pattern_falls_back() {
        let format = DisplayFormat {
            time_format: "%Q".to_string(),
            ..DisplayFormat::default()
        };
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 7, 5, 0).unwrap();
        assert_eq!(format.format_time(&ts), INVALID_TIMESTAMP);
        assert_ne!(format.format_datetime(&ts), INVALID_TIMESTAMP);
    }

    #[test]
    fn test_display_format_utc_config() {
        let config = DisplayConfig {
            utc: true,
            ..DisplayConfig::default()
        };
        let format = DisplayFormat::from_config(&config);
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 7, 5, 0).unwrap();
        assert_eq!(format.format_time(&ts), "07:05:00");
    }
}
