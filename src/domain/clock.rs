/// Time sources and the reference timezone
///
/// The streak evaluator never reads the system clock itself. Whoever drives it
/// hands it an instant taken from a `Clock`, which lets tests pin "now" to a
/// fixed calendar day.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

use crate::domain::DomainError;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Wall clock of the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Jump to a specific instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    /// Move the clock forward (or backward with a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse a UTC offset such as `+09:00`, `-0530`, `Z` or `UTC`
///
/// This is the reference timezone in which calendar days are compared.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, DomainError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    trimmed.parse::<FixedOffset>().map_err(|e| {
        DomainError::InvalidTimezone(format!(
            "'{}' is not a UTC offset like +09:00 or -05:30 ({})",
            value, e
        ))
    })
}
