//! # statuspoll-domain
//!
//! Pure domain model for the statuspoll device status poller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, poll intervals
//! - Define the **resource list** a scheduler cycles through
//! - Define the **poll state** (index, interval, in-flight flag) and its
//!   advance/wrap rules
//! - Split device response bodies into `key=value` **observations**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod interval;
pub mod observation;
pub mod poll_state;
pub mod resource;
