//! Replaceable UTC time source.
//!
//! The only time-dependent operation in this crate is producing the
//! `SendingTime` (tag 52) value for outbound messages. The controller never
//! reads the wall clock directly; it asks a [`Clock`] exactly once per built
//! message. Production uses [`SystemClock`]; tests substitute [`FixedClock`]
//! to make every emitted frame deterministic.

use chrono::{DateTime, Utc};

/// Abstract UTC time source.
pub trait Clock {
    /// Current UTC time.
    ///
    /// Implementations must be monotonically non-decreasing within one
    /// session; the controller samples this at most once per built message.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock pinned to `instant`.
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Render a timestamp in the FIX `SendingTime` format:
/// `YYYYMMDD-HH:MM:SS.mmm`, UTC.
#[must_use]
pub fn format_sending_time(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn sending_time_format_is_millisecond_utc() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(format_sending_time(instant), "20260307-14:05:09.042");
    }

    #[test]
    fn fixed_clock_reports_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now_utc(), instant);
        assert_eq!(format_sending_time(clock.now_utc()), "20260101-00:00:00.000");
    }
}
