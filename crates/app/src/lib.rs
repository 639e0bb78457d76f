//! # statuspoll-app
//!
//! Application layer — the poll scheduler, response parsers and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Transport` / `HttpRequest` — one-shot asynchronous GET
//!   - `View` — write text into an addressable element
//! - Define the `ResponseParser` interface and its device variants
//!   (brightness, clock)
//! - Drive the single in-flight poll cycle (`PollScheduler`)
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (`InMemoryView`)
//!
//! ## Dependency rule
//! Depends on `statuspoll-domain` only (plus `tokio` for tasks, channels and
//! timers). Never imports adapter crates.

pub mod parsers;
pub mod ports;
pub mod scheduler;
pub mod view;
