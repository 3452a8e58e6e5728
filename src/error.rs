use thiserror::Error;

/// Caller-facing failure kinds of the audit pipeline.
///
/// An unreachable website is deliberately absent: it is a degenerate success,
/// not an error. `ModelCallFailed` and `MalformedModelOutput` are recovered
/// inside the pipeline and only surface through logs; they exist as variants
/// so internal layers can classify what happened without string matching.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("no business found for \"{name}\" in {location}")]
    ProfileNotFound { name: String, location: String },

    #[error("profile lookup failed: {0}")]
    LookupFailed(String),

    #[error("model call failed: {0}")]
    ModelCallFailed(String),

    #[error("model produced unusable output: {0}")]
    MalformedModelOutput(String),

    #[error("report rendering failed: {0}")]
    RenderFailed(String),

    #[error("audit store unavailable: {0}")]
    StorageUnavailable(String),
}
