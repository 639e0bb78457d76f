//! Clock page parser. A clock always changes, so it always polls fast.

use statuspoll_domain::interval::PollInterval;
use statuspoll_domain::observation::observations;

use super::{ParseContext, ResponseParser, non_empty};

/// Seconds elapsed since the start of the day.
pub const SECONDS: &str = "Seconds";
/// Formatted wall-clock time.
pub const TIME: &str = "Time";

/// Parser for `Seconds=<n>` and `Time=<text>` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockParser;

impl ResponseParser for ClockParser {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn element_ids(&self) -> &'static [&'static str] {
        &[SECONDS, TIME]
    }

    fn parse(&mut self, body: Option<&str>, ctx: &mut ParseContext<'_>) {
        let Some(body) = non_empty(body) else {
            return;
        };
        ctx.set_poll_interval(PollInterval::FAST);
        for observation in observations(body) {
            match observation.key {
                SECONDS => ctx.set_text(SECONDS, &format!("{} Sekunden", observation.value)),
                TIME => ctx.set_text(TIME, observation.value),
                _ => {}
            }
        }
    }
}
