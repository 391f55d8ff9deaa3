pub mod core;
pub mod error;
pub mod models;
pub mod platforms;

pub use crate::core::events::ProgressSink;
pub use crate::core::orchestrator::{CompletedJob, JobResult, Orchestrator, DELIVERY_SIZE_LIMIT};
pub use crate::core::stats::{Stats, StatsSnapshot};
pub use crate::error::{FailureKind, JobError};
pub use crate::platforms::traits::Extractor;
pub use crate::platforms::{classify, Platform, PlatformInfo};
