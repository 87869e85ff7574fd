//! # Report Service Module
//!
//! HTTP surface of the report engine, mounted under `/api/reports`.
//!
//! ## Sub-modules:
//! - `generate`: schedules a background generation job.
//! - `status`: reports the status of a generation job.
//! - `validate`: lists the validation errors of a stored template.
//! - `preview`: returns the primitives a template would be painted with.

mod generate;
mod preview;
mod status;
mod validate;

use crate::error::ReportError;
use crate::repository::SqliteReportRepository;
use crate::services::engine::ReportEngine;
use crate::services::pdf::GenpdfBackend;
use actix_web::web::{get, post, scope};
use actix_web::{HttpResponse, Scope};
use std::sync::Arc;

const API_PATH: &str = "/api/reports";

pub type SharedEngine = Arc<ReportEngine<SqliteReportRepository, GenpdfBackend>>;

/// Configures and returns the Actix `Scope` for all report routes.
///
/// *   **`POST /generate`**: body `{ "template_name": ... }`, answers
///     `{ "job_id": ... }` immediately; the PDF is produced in the background.
/// *   **`GET /status/{job_id}`**: current `JobStatus` of a generation job.
/// *   **`GET /validate/{template_name}`**: validation errors, empty when valid.
/// *   **`GET /preview/{template_name}`**: extracted document primitives.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/generate", post().to(generate::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/validate/{template_name}", get().to(validate::process))
        .route("/preview/{template_name}", get().to(preview::process))
}

/// Maps an engine failure to an HTTP response carrying its message.
fn error_response(err: &ReportError) -> HttpResponse {
    let body = err.to_string();
    match err {
        ReportError::NotFound(_) => HttpResponse::NotFound().body(body),
        ReportError::ValidationFailed { .. } | ReportError::RenderFailed { .. } => {
            HttpResponse::UnprocessableEntity().body(body)
        }
        ReportError::DataAccess { .. } => HttpResponse::ServiceUnavailable().body(body),
        ReportError::GenerationFailed { .. } => HttpResponse::InternalServerError().body(body),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::renderer::{Renderer, SanitizePolicy};
    use actix_web::http::StatusCode;
    use tempfile::TempDir;

    /// Engine over a temp database holding the sample template. The fonts
    /// directory does not exist, so painting always fails.
    pub(crate) fn seeded_engine() -> (TempDir, SqliteReportRepository, SharedEngine) {
        let dir = tempfile::tempdir().unwrap();
        let repository = SqliteReportRepository::new(dir.path().join("reports.sqlite"));
        repository.initialize_schema().unwrap();
        repository.seed_sample().unwrap();

        let backend = GenpdfBackend::new(dir.path().join("no-fonts"), "Arial", "LiberationSans");
        let engine = ReportEngine::new(
            repository.clone(),
            backend,
            Renderer::new(SanitizePolicy::Preserve),
            dir.path().join("Reports"),
        );
        (dir, repository, Arc::new(engine))
    }

    #[test]
    fn errors_map_to_http_statuses() {
        let cases = [
            (ReportError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (
                ReportError::ValidationFailed {
                    template: "x".to_string(),
                    reasons: vec!["bad".to_string()],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ReportError::RenderFailed {
                    missing: vec!["Title".to_string()],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ReportError::DataAccess {
                    operation: "get_all_data_records",
                    target: "report_data".to_string(),
                    source: rusqlite::Error::QueryReturnedNoRows,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ReportError::GenerationFailed {
                    file_name: "x.pdf".to_string(),
                    reason: "disk full".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(error_response(&err).status(), expected, "{}", err);
        }
    }
}
