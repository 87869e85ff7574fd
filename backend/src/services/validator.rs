//! Structural and referential checks run on a template before rendering.
//!
//! Validation never looks at data values, so one validated template can be
//! rendered against any number of data snapshots. Every check runs even
//! after an earlier one fails; the caller gets the full list in one pass.

use common::model::template::TemplateDefinition;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// `{{name}}` where `name` may not contain `}`. Group 1 is the raw name.
pub(crate) static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("url pattern is valid"));

/// Distinct placeholder names in order of first appearance, trimmed.
pub fn extract_placeholders(markup: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(markup)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

pub fn is_valid_url(value: &str) -> bool {
    !value.trim().is_empty() && URL_RE.is_match(value)
}

/// Returns every defect found; an empty list means the template is valid.
pub fn validate(template: Option<&TemplateDefinition>) -> Vec<String> {
    let Some(template) = template else {
        return vec!["Template must not be null".to_string()];
    };

    let mut errors = Vec::new();

    if template.name.trim().is_empty() {
        errors.push("Template name is required".to_string());
    }

    let has_content = [&template.header_html, &template.body_html, &template.footer_html]
        .iter()
        .any(|section| section.as_deref().is_some_and(|s| !s.trim().is_empty()));
    if !has_content {
        errors.push(
            "Template must have at least one section (header, body or footer) with content"
                .to_string(),
        );
    }

    if template.fields.is_empty() {
        errors.push("Template must define at least one field".to_string());
    }

    let placeholders = extract_placeholders(&template.combined_markup());
    let field_names: HashSet<&str> = template
        .fields
        .iter()
        .map(|f| f.field_name.as_str())
        .collect();

    for name in placeholders.iter().filter(|p| !field_names.contains(p.as_str())) {
        errors.push(format!("Placeholder without matching field: {}", name));
    }

    for field in template.fields.iter().filter(|f| f.is_image()) {
        if !placeholders.contains(&field.field_name) {
            errors.push(format!(
                "Image field '{}' is not used in the template",
                field.field_name
            ));
        }
    }

    // Implied by the empty-fields check; reported separately all the same.
    if template.fields.iter().any(|f| f.required) && field_names.is_empty() {
        errors.push("Template has required fields but no fields defined".to_string());
    }

    errors
}
