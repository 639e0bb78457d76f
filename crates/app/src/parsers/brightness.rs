//! Brightness sensor page parser.
//!
//! Polls fast for a short window after the reading changes and settles back
//! to a slow cadence once the value has stayed put for a few observations.

use statuspoll_domain::interval::PollInterval;
use statuspoll_domain::observation::observations;

use super::{ParseContext, ResponseParser, non_empty};

/// Observation key and element id of the brightness reading.
pub const CURRENT_BRIGHTNESS: &str = "CurrentBrightness";

/// Number of observations the fast cadence is kept after a change.
const CHANGE_WINDOW: u8 = 3;

/// Parser for `CurrentBrightness=<percent>` bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrightnessParser {
    last_value: String,
    change_counter: u8,
}

impl Default for BrightnessParser {
    fn default() -> Self {
        Self {
            last_value: "0".to_string(),
            change_counter: 0,
        }
    }
}

impl BrightnessParser {
    #[must_use]
    pub fn last_value(&self) -> &str {
        &self.last_value
    }

    /// Remaining observations before the cadence drops back to slow.
    #[must_use]
    pub fn change_counter(&self) -> u8 {
        self.change_counter
    }

    fn observe(&mut self, value: &str, ctx: &mut ParseContext<'_>) {
        self.change_counter = self.change_counter.saturating_sub(1);
        if value != self.last_value {
            tracing::debug!(from = %self.last_value, to = value, "brightness changed");
            self.change_counter = CHANGE_WINDOW;
        }
        value.clone_into(&mut self.last_value);

        if self.change_counter == 0 {
            ctx.set_poll_interval(PollInterval::SLOW);
        } else {
            ctx.set_poll_interval(PollInterval::FAST);
        }
        ctx.set_text(CURRENT_BRIGHTNESS, &format!("{value}%"));
    }
}

impl ResponseParser for BrightnessParser {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn element_ids(&self) -> &'static [&'static str] {
        &[CURRENT_BRIGHTNESS]
    }

    fn parse(&mut self, body: Option<&str>, ctx: &mut ParseContext<'_>) {
        let Some(body) = non_empty(body) else {
            return;
        };
        for observation in observations(body) {
            if observation.key == CURRENT_BRIGHTNESS {
                self.observe(observation.value, ctx);
            }
        }
    }
}
