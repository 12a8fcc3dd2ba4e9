//! Channel layer for output buffering and trigger dispatch.
//!
//! This module synchronizes with the child's unstructured text stream:
//! buffered output, prompt patterns, and racing pattern/timeout watchers.

mod buffer;
pub mod patterns;
mod triggers;

pub use buffer::OutputBuffer;
pub use patterns::PatternMatch;
pub use triggers::{TimeoutKind, TriggerDispatcher, TriggerId};
