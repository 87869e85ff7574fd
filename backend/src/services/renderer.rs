//! Placeholder substitution and page assembly.

use crate::services::resolver::ResolvedDataSet;
use crate::services::validator::{is_valid_url, PLACEHOLDER_RE};
use common::model::template::TemplateDefinition;
use log::{info, warn};
use regex::Captures;
use serde::Deserialize;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields: {}", missing.join(", "))]
pub struct RenderError {
    pub missing: Vec<String>,
}

/// What happens to a substituted value that does not carry table markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizePolicy {
    /// Values are inserted verbatim.
    #[default]
    Preserve,
    /// Values are HTML-escaped.
    Escape,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    policy: SanitizePolicy,
}

impl Renderer {
    pub fn new(policy: SanitizePolicy) -> Self {
        Self { policy }
    }

    /// Substitutes every placeholder and wraps the sections into one page.
    ///
    /// Fails only when a required field is absent or blank; the error lists
    /// all such fields. Missing optional fields are replaced by a visible
    /// `[name not found]` marker.
    pub fn render(
        &self,
        template: &TemplateDefinition,
        data: &ResolvedDataSet,
    ) -> Result<String, RenderError> {
        info!("Rendering markup for template: {}", template.name);

        let missing: Vec<String> = template
            .fields
            .iter()
            .filter(|f| f.required && data.get(&f.field_name).map_or(true, |v| v.trim().is_empty()))
            .map(|f| f.field_name.clone())
            .collect();
        if !missing.is_empty() {
            let err = RenderError { missing };
            log::error!("{}", err);
            return Err(err);
        }

        for field in template.fields.iter().filter(|f| f.is_image()) {
            if let Some(value) = data.get(&field.field_name) {
                if !is_valid_url(value) {
                    warn!("Image field '{}' does not hold an http(s) URL", field.field_name);
                }
            }
        }

        let header = self.replace_placeholders(template.header_html.as_deref(), data);
        let body = self.replace_placeholders(template.body_html.as_deref(), data);
        let footer = self.replace_placeholders(template.footer_html.as_deref(), data);

        let html = build_page(
            &template.name,
            template.css.as_deref().unwrap_or_default(),
            &header,
            &body,
            &footer,
        );
        info!("Markup rendered: {:.1}KB", html.len() as f64 / 1024.0);
        Ok(html)
    }

    fn replace_placeholders(&self, section: Option<&str>, data: &ResolvedDataSet) -> String {
        let Some(content) = section.filter(|s| !s.trim().is_empty()) else {
            return String::new();
        };

        PLACEHOLDER_RE
            .replace_all(content, |caps: &Captures| {
                let field_name = caps[1].trim();
                match data.get(field_name) {
                    Some(value) => self.sanitize(field_name, value).into_owned(),
                    None => {
                        warn!("Placeholder not found in data: {}", field_name);
                        format!("[{} not found]", field_name)
                    }
                }
            })
            .into_owned()
    }

    fn sanitize<'a>(&self, field_name: &str, value: &'a str) -> Cow<'a, str> {
        if carries_table_markup(field_name, value) {
            return Cow::Borrowed(value);
        }
        match self.policy {
            SanitizePolicy::Preserve => Cow::Borrowed(value),
            SanitizePolicy::Escape => html_escape::encode_text(value),
        }
    }
}

/// Naming convention or content that marks a value as embedded table markup.
fn carries_table_markup(field_name: &str, value: &str) -> bool {
    field_name.contains("Table") || field_name.contains("Tabela") || value.contains("<table")
}

fn build_page(title: &str, css: &str, header: &str, body: &str, footer: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html>\n");
    html.push_str("<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(&format!("    <title>{}</title>\n", html_escape::encode_text(title)));
    html.push_str("    <style>\n");
    html.push_str(css);
    html.push_str("\n    </style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    for section in [header, body, footer] {
        html.push_str(section);
        html.push('\n');
    }
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validator::tests::{field, invoice, template};

    fn data(pairs: &[(&str, &str)]) -> ResolvedDataSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn substitutes_declared_values() {
        let html = Renderer::default()
            .render(
                &invoice(),
                &data(&[("Title", "Invoice #1"), ("ClientName", "Acme Co")]),
            )
            .unwrap();
        assert!(html.contains("<h1>Invoice #1</h1><p><strong>Client:</strong> Acme Co</p>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn missing_required_field_fails_with_exact_list() {
        let err = Renderer::default()
            .render(&invoice(), &data(&[("Title", "Invoice #1")]))
            .unwrap_err();
        assert_eq!(err.missing, vec!["ClientName".to_string()]);
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let err = Renderer::default()
            .render(&invoice(), &data(&[("Title", "  "), ("ClientName", "")]))
            .unwrap_err();
        assert_eq!(err.missing, vec!["Title".to_string(), "ClientName".to_string()]);
    }

    #[test]
    fn missing_optional_field_gets_a_marker() {
        let t = template("<p>{{ Notes }}</p>", vec![field("Notes", "Text", false)]);
        let html = Renderer::default().render(&t, &data(&[])).unwrap();
        assert!(html.contains("<p>[Notes not found]</p>"));
    }

    #[test]
    fn preserve_policy_keeps_raw_markup() {
        let t = template("<p>{{Notes}}</p>", vec![field("Notes", "Text", false)]);
        let html = Renderer::new(SanitizePolicy::Preserve)
            .render(&t, &data(&[("Notes", "<b>A & B</b>")]))
            .unwrap();
        assert!(html.contains("<p><b>A & B</b></p>"));
    }

    #[test]
    fn escape_policy_spares_table_values() {
        let t = template(
            "<p>{{Notes}}</p>{{ItemsTable}}",
            vec![field("Notes", "Text", false), field("ItemsTable", "Text", false)],
        );
        let html = Renderer::new(SanitizePolicy::Escape)
            .render(
                &t,
                &data(&[("Notes", "<b>A & B</b>"), ("ItemsTable", "<tr><td>1</td></tr>")]),
            )
            .unwrap();
        assert!(html.contains("<p>&lt;b&gt;A &amp; B&lt;/b&gt;</p>"));
        assert!(html.contains("<tr><td>1</td></tr>"));
    }

    #[test]
    fn style_sheet_and_sections_are_assembled_in_order() {
        let mut t = template("<p>body</p>", vec![field("X", "Text", false)]);
        t.css = Some("h1 { color: red; }".to_string());
        t.header_html = Some("<div>head</div>".to_string());
        t.footer_html = Some("<div class=\"footer\"><p>foot</p></div>".to_string());
        let html = Renderer::default().render(&t, &data(&[])).unwrap();

        let style = html.find("h1 { color: red; }").unwrap();
        let head = html.find("head</div>").unwrap();
        let body = html.find("<p>body</p>").unwrap();
        let foot = html.find("foot</p>").unwrap();
        assert!(style < head && head < body && body < foot);
    }

    #[test]
    fn rendering_is_deterministic() {
        let d = data(&[("Title", "T"), ("ClientName", "C")]);
        let renderer = Renderer::default();
        assert_eq!(
            renderer.render(&invoice(), &d).unwrap(),
            renderer.render(&invoice(), &d).unwrap()
        );
    }
}
