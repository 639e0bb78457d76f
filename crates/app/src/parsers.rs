//! Response parsers — turn a status body into view updates and cadence
//! requests.
//!
//! Each device page polls with one parser variant, chosen when its scheduler
//! is set up. Parsers produce side effects only, through a [`ParseContext`]:
//! element text and the poll interval of the scheduler that fetched the body.

pub mod brightness;
pub mod clock;

use std::str::FromStr;

use statuspoll_domain::error::ValidationError;
use statuspoll_domain::interval::PollInterval;

use crate::ports::View;

pub use brightness::BrightnessParser;
pub use clock::ClockParser;

/// Effects a parser may have on the world while consuming a body.
pub struct ParseContext<'a> {
    view: &'a dyn View,
    interval: &'a mut PollInterval,
}

impl<'a> ParseContext<'a> {
    pub fn new(view: &'a dyn View, interval: &'a mut PollInterval) -> Self {
        Self { view, interval }
    }

    /// Write `text` into the element `element_id`.
    pub fn set_text(&self, element_id: &str, text: &str) {
        self.view.set_text(element_id, text);
    }

    /// Change the pause between two full poll cycles.
    ///
    /// Applies from the next cycle boundary on; it never re-times a tick that
    /// is already scheduled.
    pub fn set_poll_interval(&mut self, interval: PollInterval) {
        *self.interval = interval;
    }

    #[cfg(test)]
    fn poll_interval(&self) -> PollInterval {
        *self.interval
    }
}

/// Consumes the body of a status resource.
pub trait ResponseParser: Send {
    /// Short name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Ids of the view elements this parser writes.
    fn element_ids(&self) -> &'static [&'static str];

    /// Handle one response body.
    ///
    /// `None` means the request produced no usable body. Absent and empty
    /// bodies must leave every piece of state untouched.
    fn parse(&mut self, body: Option<&str>, ctx: &mut ParseContext<'_>);
}

impl ResponseParser for Box<dyn ResponseParser> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn element_ids(&self) -> &'static [&'static str] {
        (**self).element_ids()
    }

    fn parse(&mut self, body: Option<&str>, ctx: &mut ParseContext<'_>) {
        (**self).parse(body, ctx);
    }
}

/// Parser variants selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Brightness,
    Clock,
}

impl ParserKind {
    /// Instantiate a fresh parser of this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn ResponseParser> {
        match self {
            Self::Brightness => Box::new(BrightnessParser::default()),
            Self::Clock => Box::new(ClockParser),
        }
    }
}

impl FromStr for ParserKind {
    type Err = ValidationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "brightness" => Ok(Self::Brightness),
            "clock" => Ok(Self::Clock),
            _ => Err(ValidationError::UnknownParser(name.to_string())),
        }
    }
}

/// Returns `Some(body)` only for bodies worth parsing.
fn non_empty(body: Option<&str>) -> Option<&str> {
    body.filter(|body| !body.is_empty())
}
