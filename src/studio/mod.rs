//! Studio module - composition of the styling session and generation

pub mod composer;
pub mod generation;

pub use composer::{CompositionPolicy, StudioComposer};
pub use generation::{GenerationMode, GenerationOrchestrator, GenerationOutput};
