//! Template store access.
//!
//! The engine only sees [`ReportRepository`]; [`sqlite::SqliteReportRepository`]
//! is the store shipped with the binary.

pub mod sqlite;

use crate::error::ReportError;
use common::model::data::DataRecord;
use common::model::template::{FieldDefinition, TemplateDefinition};

pub use sqlite::SqliteReportRepository;

pub trait ReportRepository: Send + Sync {
    /// Active template with its fields ordered by display order; `None`
    /// when the name is unknown or the template is inactive.
    fn get_template_by_name(&self, name: &str) -> Result<Option<TemplateDefinition>, ReportError>;

    fn get_fields_for_template(&self, template_id: i64)
        -> Result<Vec<FieldDefinition>, ReportError>;

    /// Every stored record, ordered by field name then insertion.
    fn get_all_data_records(&self) -> Result<Vec<DataRecord>, ReportError>;

    /// Most recent value stored for one field.
    fn get_field_value(&self, field_name: &str) -> Result<Option<String>, ReportError>;
}
