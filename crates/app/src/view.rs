//! In-process view holding the latest text of each element.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use crate::ports::View;

/// [`View`] backed by a fixed set of elements kept in memory.
///
/// Elements exist from construction on, with empty text. Writes to ids that
/// were not declared are dropped, the way a page ignores updates for markup
/// it does not contain.
#[derive(Debug, Default)]
pub struct InMemoryView {
    elements: Mutex<HashMap<String, String>>,
}

impl InMemoryView {
    /// Create a view exposing the given element ids.
    #[must_use]
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = ids
            .into_iter()
            .map(|id| (id.into(), String::new()))
            .collect();
        Self {
            elements: Mutex::new(elements),
        }
    }

    /// Current text of an element, or `None` if the view has no such element.
    #[must_use]
    pub fn text(&self, element_id: &str) -> Option<String> {
        self.elements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(element_id)
            .cloned()
    }

    /// Copy of every element, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.elements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, text)| (id.clone(), text.clone()))
            .collect()
    }
}

impl View for InMemoryView {
    fn set_text(&self, element_id: &str, text: &str) {
        let mut elements = self.elements.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = elements.get_mut(element_id) else {
            tracing::debug!(element_id, "ignoring update for unknown element");
            return;
        };
        if *slot != text {
            tracing::info!(element_id, text, "element updated");
            text.clone_into(slot);
        }
    }
}
