//! Timestamps and the injectable clock.
//!
//! Timestamps are RFC 3339 UTC strings with millisecond precision and a `Z`
//! suffix. Every timestamp the board writes has the same width, so lexical
//! order is chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use std::cell::Cell;

/// Format `at` as a board timestamp.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Source of "now" for stamping `createdAt`/`updatedAt`.
pub trait Clock {
    fn now(&self) -> String;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        format_timestamp(Utc::now())
    }
}

/// Deterministic clock for tests: starts at a fixed instant and advances by
/// one second on every reading.
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<DateTime<Utc>>,
}

impl SteppingClock {
    #[must_use]
    pub const fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Cell::new(start),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::default())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> String {
        let current = self.next.get();
        self.next.set(current + chrono::Duration::seconds(1));
        format_timestamp(current)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> String {
        (**self).now()
    }
}
