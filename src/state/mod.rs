//! Shared session state primitives

pub mod processing;

pub use processing::{ProcessingGuard, ProcessingState, ProcessingTracker};
