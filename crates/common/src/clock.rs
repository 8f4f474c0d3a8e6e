//! Clock abstraction and timestamp formatting.
//!
//! Every persisted and exported timestamp goes through [`format_timestamp`]
//! so records and manifests share one representation: RFC 3339, UTC,
//! millisecond precision, `Z` suffix.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time formatted with [`format_timestamp`].
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant (for tests and reproducible exports).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pin to an RFC 3339 string. Returns `None` if it does not parse.
    pub fn parse(rfc3339: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(rfc3339)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format a UTC instant, e.g. `2024-05-01T10:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current wall-clock time, formatted.
pub fn now_timestamp() -> String {
    SystemClock.timestamp()
}
