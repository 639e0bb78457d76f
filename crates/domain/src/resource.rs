//! Ordered list of status resource URLs polled by one scheduler.

use crate::error::ValidationError;

/// Path segment a device inserts between a service path and an action name.
pub const REST_SEGMENT: &str = "/rest/";

/// Build the URL of a device REST status resource.
///
/// Devices expose every parameterless action of a service at
/// `<base><service_path>/rest/<action>`, e.g.
/// `http://192.168.1.20:4004/service/Clock/rest/getTime`.
#[must_use]
pub fn rest_url(base: &str, service_path: &str, action: &str) -> String {
    let base = base.trim_end_matches('/');
    let service_path = service_path.trim_matches('/');
    let action = action.trim_start_matches('/');
    if service_path.is_empty() {
        format!("{base}{REST_SEGMENT}{action}")
    } else {
        format!("{base}/{service_path}{REST_SEGMENT}{action}")
    }
}

/// Ordered, read-only sequence of URLs. Indices wrap modulo the length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList(Vec<String>);

impl ResourceList {
    /// Build a list, rejecting blank URLs.
    ///
    /// An empty list is valid: a scheduler holding it simply stays idle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] if any entry is blank.
    pub fn new<I, S>(urls: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls = urls
            .into_iter()
            .map(|url| {
                let url: String = url.into();
                let trimmed = url.trim();
                if trimmed.is_empty() {
                    Err(ValidationError::EmptyUrl)
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(urls))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// URL at `index`, wrapping around the end of the list.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        if self.0.is_empty() {
            return None;
        }
        self.0.get(index % self.0.len()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
