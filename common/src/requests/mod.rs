use serde::Deserialize;

#[derive(Deserialize)]
/// Request payload for the report generation endpoint.
pub struct GenerateReportRequest {
    /// Name of an active stored template.
    pub template_name: String,
}
