use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A stored report template: style sheet, three markup sections and the
/// fields its placeholders refer to.
///
/// Templates are loaded once per generation request and never mutated by
/// the rendering pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Store-assigned row id.
    pub id: i64,
    /// Unique, case-sensitive template name.
    pub name: String,
    /// Style sheet placed in the page `<style>` block.
    pub css: Option<String>,
    /// Markup sections. At least one must have content.
    pub header_html: Option<String>,
    pub body_html: Option<String>,
    pub footer_html: Option<String>,
    /// Inactive templates are never returned by name lookups.
    pub active: bool,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    /// Ordered by `display_order`.
    pub fields: Vec<FieldDefinition>,
}

impl TemplateDefinition {
    /// Header, body and footer joined with a single space, the text every
    /// placeholder scan runs over.
    pub fn combined_markup(&self) -> String {
        format!(
            "{} {} {}",
            self.header_html.as_deref().unwrap_or_default(),
            self.body_html.as_deref().unwrap_or_default(),
            self.footer_html.as_deref().unwrap_or_default()
        )
    }
}

/// A named value slot of one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: i64,
    /// Owning template.
    pub template_id: i64,
    /// Join key against placeholders and resolved data.
    pub field_name: String,
    /// Human-readable caption.
    pub label: Option<String>,
    /// Free-form grouping tag such as `Header`, `Body` or `Footer`.
    pub section: String,
    /// Free-form type tag such as `Text` or `Image`.
    pub field_type: String,
    /// Presentation order within the template.
    pub display_order: i32,
    /// Rendering fails when a required field has no non-blank value.
    pub required: bool,
}

impl FieldDefinition {
    /// `Image` or `Imagem`, in any case.
    pub fn is_image(&self) -> bool {
        self.field_type.eq_ignore_ascii_case("Image")
            || self.field_type.eq_ignore_ascii_case("Imagem")
    }
}
