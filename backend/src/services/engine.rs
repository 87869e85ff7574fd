//! # Report Orchestrator
//!
//! Sequences one generation request:
//!
//! 1.  fetch the active template by name (`NotFound` when absent);
//! 2.  validate it (`ValidationFailed` with every reason);
//! 3.  fetch all data records and resolve one value per field;
//! 4.  render the markup (`RenderFailed` when required fields are missing);
//! 5.  extract document primitives;
//! 6.  paint them into `<name>_<yyyyMMdd_HHmmss>.pdf` under the output
//!     directory (`GenerationFailed` on any backend or write error).
//!
//! The engine holds no mutable state, so one instance can serve concurrent
//! requests. Wall-clock duration is logged on success and on failure.

use crate::error::ReportError;
use crate::repository::ReportRepository;
use crate::services::extractor;
use crate::services::pdf::LayoutBackend;
use crate::services::renderer::Renderer;
use crate::services::resolver;
use crate::services::validator;
use chrono::{Local, NaiveDateTime};
use common::model::document::DocumentPrimitive;
use common::model::template::TemplateDefinition;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

pub struct ReportEngine<R, L> {
    repository: R,
    backend: L,
    renderer: Renderer,
    output_directory: PathBuf,
}

impl<R: ReportRepository, L: LayoutBackend> ReportEngine<R, L> {
    pub fn new(
        repository: R,
        backend: L,
        renderer: Renderer,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            backend,
            renderer,
            output_directory: output_directory.into(),
        }
    }

    /// Runs the whole pipeline and returns the path of the written PDF.
    pub fn generate_report(&self, template_name: &str) -> Result<PathBuf, ReportError> {
        let start = Instant::now();
        info!("Starting report generation: {}", template_name);

        let result = self
            .prepare(template_name)
            .and_then(|primitives| self.write_artifact(template_name, &primitives));

        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            Ok(path) => {
                info!("PDF generated: {}", path.display());
                info!("Report generated in {:.1}s", elapsed);
            }
            Err(e) => error!(
                "Report generation failed: {} (elapsed: {:.1}s): {}",
                template_name, elapsed, e
            ),
        }
        result
    }

    /// Everything up to extraction; nothing is written.
    pub fn preview(&self, template_name: &str) -> Result<Vec<DocumentPrimitive>, ReportError> {
        self.prepare(template_name)
    }

    /// Validation errors of a stored template; empty when it is valid.
    pub fn validate_template(&self, template_name: &str) -> Result<Vec<String>, ReportError> {
        let template = self.load_template(template_name)?;
        Ok(validator::validate(Some(&template)))
    }

    fn load_template(&self, template_name: &str) -> Result<TemplateDefinition, ReportError> {
        self.repository
            .get_template_by_name(template_name)?
            .ok_or_else(|| ReportError::NotFound(template_name.to_string()))
    }

    fn prepare(&self, template_name: &str) -> Result<Vec<DocumentPrimitive>, ReportError> {
        let template = self.load_template(template_name)?;

        let reasons = validator::validate(Some(&template));
        if !reasons.is_empty() {
            error!("Template validation errors: {}", reasons.join("; "));
            return Err(ReportError::ValidationFailed {
                template: template_name.to_string(),
                reasons,
            });
        }

        let records = self.repository.get_all_data_records()?;
        let data = resolver::resolve(&records);
        info!("Data resolved: {} fields", data.len());

        let html = self.renderer.render(&template, &data)?;
        Ok(extractor::extract(&html))
    }

    fn write_artifact(
        &self,
        template_name: &str,
        primitives: &[DocumentPrimitive],
    ) -> Result<PathBuf, ReportError> {
        let file_name = artifact_file_name(template_name, Local::now().naive_local());
        let failed = |reason: String| ReportError::GenerationFailed {
            file_name: file_name.clone(),
            reason,
        };

        if !self.output_directory.exists() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| failed(e.to_string()))?;
            info!("Output directory created: {}", self.output_directory.display());
        }

        let output_path = self.output_directory.join(&file_name);
        info!("Starting PDF generation: {}", file_name);
        self.backend
            .paint(primitives, &output_path)
            .map_err(|e| failed(e.to_string()))?;
        Ok(output_path)
    }
}

/// `<name>_<yyyyMMdd_HHmmss>.pdf`, with path separators in the name
/// replaced by `_`.
pub fn artifact_file_name(template_name: &str, generated_at: NaiveDateTime) -> String {
    let safe: String = template_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}_{}.pdf", safe, generated_at.format("%Y%m%d_%H%M%S"))
}
