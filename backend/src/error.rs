use crate::services::renderer::RenderError;
use thiserror::Error;

/// Failures surfaced by report generation. Every stage either succeeds
/// completely or fails with exactly one of these.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The named template is absent or inactive.
    #[error("Template '{0}' not found or inactive")]
    NotFound(String),

    /// Structural or referential template defects, all of them.
    #[error("Template '{template}' is invalid: {}", reasons.join("; "))]
    ValidationFailed {
        template: String,
        reasons: Vec<String>,
    },

    /// The template store failed or returned something unreadable.
    #[error("Data access failed during {operation} ({target}): {source}")]
    DataAccess {
        operation: &'static str,
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Required fields are absent or blank at render time.
    #[error("Missing required fields: {}", missing.join(", "))]
    RenderFailed { missing: Vec<String> },

    /// Painting or writing the artifact failed.
    #[error("Failed to generate '{file_name}': {reason}")]
    GenerationFailed { file_name: String, reason: String },
}

impl ReportError {
    pub(crate) fn data_access(
        operation: &'static str,
        target: impl Into<String>,
    ) -> impl FnOnce(rusqlite::Error) -> ReportError {
        let target = target.into();
        move |source| ReportError::DataAccess {
            operation,
            target,
            source,
        }
    }
}

impl From<RenderError> for ReportError {
    fn from(err: RenderError) -> Self {
        ReportError::RenderFailed {
            missing: err.missing,
        }
    }
}
