//! Fixed-step tick scheduling for host loops.
//!
//! The host feeds real elapsed time in; the clock releases whole ticks.
//! After a stall the backlog is capped so at most `max_catch_up` ticks
//! run at once and the rest of the elapsed time is discarded.

use crate::config::EconomyRules;

/// Accumulates elapsed milliseconds and releases whole ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickClock {
    tick_ms: u64,
    accumulated_ms: u64,
    max_catch_up: u32,
}

impl TickClock {
    /// Create a clock. Zero arguments are raised to one.
    #[must_use]
    pub fn new(tick_ms: u64, max_catch_up: u32) -> Self {
        Self {
            tick_ms: tick_ms.max(1),
            accumulated_ms: 0,
            max_catch_up: max_catch_up.max(1),
        }
    }

    /// Create a clock matching the economy's tick length and catch-up cap.
    #[must_use]
    pub fn from_rules(rules: &EconomyRules) -> Self {
        Self::new(rules.tick_millis(), rules.max_catch_up_ticks)
    }

    /// Tick length in milliseconds.
    #[must_use]
    pub const fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Time banked toward the next tick.
    #[must_use]
    pub const fn pending_ms(&self) -> u64 {
        self.accumulated_ms
    }

    /// Bank `elapsed_ms` and return how many ticks to run now.
    pub fn advance(&mut self, elapsed_ms: u64) -> u32 {
        let cap = self.tick_ms.saturating_mul(u64::from(self.max_catch_up));
        self.accumulated_ms = self.accumulated_ms.saturating_add(elapsed_ms).min(cap);

        let ticks = self.accumulated_ms / self.tick_ms;
        self.accumulated_ms %= self.tick_ms;
        // Bounded by `max_catch_up`
        u32::try_from(ticks).unwrap_or(self.max_catch_up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_whole_ticks() {
        let mut clock = TickClock::new(1000, 5);

        assert_eq!(clock.advance(400), 0);
        assert_eq!(clock.advance(700), 1);
        assert_eq!(clock.pending_ms(), 100);
        assert_eq!(clock.advance(1900), 2);
        assert_eq!(clock.pending_ms(), 0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut clock = TickClock::new(1000, 5);

        assert_eq!(clock.advance(60_000), 5);
        // The rest of the backlog is gone
        assert_eq!(clock.pending_ms(), 0);
        assert_eq!(clock.advance(999), 0);
    }

    #[test]
    fn test_zero_arguments_are_clamped() {
        let mut clock = TickClock::new(0, 0);
        assert_eq!(clock.tick_ms(), 1);
        assert_eq!(clock.advance(10), 1);
    }
}
