//! Poll cadence between two full cycles over the resource list.

use std::num::NonZeroU64;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// Delay between full poll cycles, in milliseconds. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u64")]
pub struct PollInterval(NonZeroU64);

impl PollInterval {
    /// Cadence used while a watched value is changing.
    pub const FAST: Self = Self(NonZeroU64::new(1_000).unwrap());
    /// Cadence used once a watched value has settled.
    pub const SLOW: Self = Self(NonZeroU64::new(5_000).unwrap());

    /// Build an interval from a millisecond count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroInterval`] when `millis` is zero.
    pub fn from_millis(millis: u64) -> Result<Self, ValidationError> {
        NonZeroU64::new(millis)
            .map(Self)
            .ok_or(ValidationError::ZeroInterval)
    }

    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0.get()
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0.get())
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::FAST
    }
}

impl TryFrom<u64> for PollInterval {
    type Error = ValidationError;

    fn try_from(millis: u64) -> Result<Self, Self::Error> {
        Self::from_millis(millis)
    }
}

impl std::fmt::Display for PollInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
