//! View port — addressable text elements showing the latest observations.

use std::sync::Arc;

/// Sink for observation text, keyed by element id.
///
/// Element ids match the observation keys a parser recognises
/// (`CurrentBrightness`, `Seconds`, `Time`, …). Writing an element the view
/// does not have must be a silent no-op.
pub trait View: Send + Sync {
    /// Replace the text content of `element_id`.
    fn set_text(&self, element_id: &str, text: &str);
}

impl<V: View + ?Sized> View for Arc<V> {
    fn set_text(&self, element_id: &str, text: &str) {
        (**self).set_text(element_id, text);
    }
}
