//! `key=value` observations parsed from a status resource body.
//!
//! Devices answer a REST status request with one `name=value` pair per line,
//! separated by CRLF:
//!
//! ```text
//! Seconds=36912
//! Time=10:15
//! ```
//!
//! Pure functions over `&str`, borrowing from the body. Nothing here is
//! stored: observations live only as long as the response they came from.

/// A single `key=value` pair taken from one line of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Observation<'a> {
    /// Parse one line.
    ///
    /// The line must contain exactly one `=`; anything else (no separator,
    /// or a value that itself contains `=`) is not an observation.
    #[must_use]
    pub fn parse_line(line: &'a str) -> Option<Self> {
        let (key, value) = line.split_once('=')?;
        if value.contains('=') {
            return None;
        }
        Some(Self { key, value })
    }
}

/// Iterate over the well-formed observations of a response body.
///
/// Lines are separated by CRLF; a bare LF is accepted too. Malformed lines
/// are skipped silently.
pub fn observations(body: &str) -> impl Iterator<Item = Observation<'_>> {
    body.lines().filter_map(Observation::parse_line)
}

/// Lowest error code a device reports for a failed action.
pub const MIN_FAULT_CODE: u16 = 100;

/// Error answer returned by a device when the requested action failed.
///
/// Instead of `key=value` lines the device then sends a single
/// `<code>:<description>` line, e.g. `501:Not Implemented`. Action error
/// codes have at least three digits, so a body like `10:15` is not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFault<'a> {
    pub code: u16,
    pub description: &'a str,
}

impl<'a> ActionFault<'a> {
    /// Detect an action fault body. Returns `None` for regular bodies.
    #[must_use]
    pub fn detect(body: &'a str) -> Option<Self> {
        let line = body.trim_end_matches(['\r', '\n']);
        if line.contains(['\r', '\n', '=']) {
            return None;
        }
        let (code, description) = line.split_once(':')?;
        let code: u16 = code.trim().parse().ok()?;
        if code < MIN_FAULT_CODE {
            return None;
        }
        Some(Self {
            code,
            description: description.trim(),
        })
    }
}
