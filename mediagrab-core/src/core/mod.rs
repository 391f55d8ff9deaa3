pub mod artifact;
pub mod events;
pub mod filename;
pub mod format;
pub mod orchestrator;
pub mod progress;
pub mod stats;
