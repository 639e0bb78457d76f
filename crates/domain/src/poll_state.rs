//! Mutable state of one poll scheduler and the delays it reschedules with.

use std::time::Duration;

use crate::interval::PollInterval;

/// Delay before the first tick after a new resource list is set.
pub const START_DELAY: Duration = Duration::from_millis(100);
/// Delay between two resources of the same cycle.
pub const BURST_DELAY: Duration = Duration::from_millis(100);
/// Delay before re-checking while a request is still in flight.
pub const BUSY_DELAY: Duration = Duration::from_millis(500);
/// Delay before retrying when no transport handle could be created.
pub const TRANSPORT_RETRY_DELAY: Duration = Duration::from_millis(5_000);

/// Cursor, cadence and in-flight slot of a scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollState {
    pub index: usize,
    pub interval: PollInterval,
    pub in_flight: bool,
}

/// What follows a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// More resources remain in this cycle.
    Burst,
    /// The cursor wrapped back to the first resource.
    CycleEnd,
}

impl PollState {
    /// Move the cursor past the resource that was just requested.
    ///
    /// `len` is the length of the resource list and must be non-zero.
    pub fn advance(&mut self, len: usize) -> Advance {
        self.index += 1;
        if self.index >= len {
            self.index = 0;
            Advance::CycleEnd
        } else {
            Advance::Burst
        }
    }

    /// Delay until the next tick after an [`Advance`].
    #[must_use]
    pub fn delay_after(&self, advance: Advance) -> Duration {
        match advance {
            Advance::Burst => BURST_DELAY,
            Advance::CycleEnd => self.interval.as_duration(),
        }
    }

    /// Rewind the cursor for a freshly configured resource list.
    pub fn restart(&mut self) {
        self.index = 0;
    }
}
