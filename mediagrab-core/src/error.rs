use serde::Serialize;
use thiserror::Error;

use crate::core::format::format_size;

/// Longest retrieval error text surfaced to a user before truncation.
pub const MAX_ERROR_CHARS: usize = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    UnrecognizedPlatform,
    RetrievalError,
    ArtifactMissing,
    ArtifactTooLarge,
}

/// Terminal failure of a retrieval job. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Unknown platform or invalid link.")]
    UnrecognizedPlatform,

    #[error("{0}")]
    Retrieval(String),

    #[error("Downloaded file not found.")]
    ArtifactMissing,

    #[error("File too large: {} (limit {})", human(.size), human(.limit))]
    ArtifactTooLarge { size: u64, limit: u64 },
}

impl JobError {
    pub fn retrieval(err: impl std::fmt::Display) -> Self {
        JobError::Retrieval(truncate_message(&format!("{:#}", err)))
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::UnrecognizedPlatform => FailureKind::UnrecognizedPlatform,
            JobError::Retrieval(_) => FailureKind::RetrievalError,
            JobError::ArtifactMissing => FailureKind::ArtifactMissing,
            JobError::ArtifactTooLarge { .. } => FailureKind::ArtifactTooLarge,
        }
    }
}

fn human(bytes: &u64) -> String {
    format_size(*bytes)
}

pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_CHARS {
        return message.to_string();
    }
    let mut out: String = message.chars().take(MAX_ERROR_CHARS).collect();
    out.push_str("...");
    out
}
