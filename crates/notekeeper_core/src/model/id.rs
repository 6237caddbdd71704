//! Clock-derived monotonic identifiers.
//!
//! # Responsibility
//! - Produce string ids from wall-clock milliseconds.
//! - Disambiguate creations that land in the same millisecond.
//!
//! # Invariants
//! - Every id handed out is strictly greater (numerically) than the previous
//!   one and than every id the generator was seeded with.
//! - Ids are decimal digit strings; callers treat them as opaque.
//! - Once `i64::MAX` has been handed out or observed, no further id is
//!   produced.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in Unix epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}

/// Monotonic id source: `max(now_ms, last + 1)`.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id for a creation observed at `now_ms`.
    ///
    /// Returns `None` when the id space is exhausted.
    pub fn next_id(&mut self, now_ms: i64) -> Option<String> {
        let next = now_ms.max(self.last.checked_add(1)?);
        self.last = next;
        Some(next.to_string())
    }

    /// Raises the floor above every numeric id in `ids`.
    ///
    /// Non-numeric ids (written by some other tool) are ignored; they cannot
    /// collide with decimal ids of a different value anyway.
    pub fn observe<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            if let Ok(value) = id.parse::<i64>() {
                self.last = self.last.max(value);
            }
        }
    }
}
