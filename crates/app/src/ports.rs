//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the poll scheduler and the outside
//! world. They are defined here (in `app`) so that both the scheduler and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod transport;
pub mod view;

pub use transport::{HttpRequest, Transport};
pub use view::View;
