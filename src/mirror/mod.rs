//! Mirror Module
//!
//! The fetch, verify, cache and fallback state machine.

mod orchestrator;

pub use orchestrator::{Orchestrator, Served};
