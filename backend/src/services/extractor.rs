//! Recovers document motifs from rendered markup by pattern scans.
//!
//! There is no markup tree here. Five independent scans run over the text
//! and each contributes zero or more primitives:
//!
//! 1. the first `<h1>` becomes a `Title`;
//! 2. every `<p><strong>label</strong> value</p>` becomes a `LabelValueRow`;
//! 3. the first `<table>` becomes a `Table` (header cells from `<th>`, one
//!    row per `<tr>` that has at least one `<td>`);
//! 4. `<strong>Total:</strong> text</p>` becomes a `TotalLine`;
//! 5. every `<p>` inside `<div class="footer">` becomes a `FooterLine`.
//!
//! Output order is always the scan order above, whatever the position of
//! each motif in the source. A motif that is absent simply contributes
//! nothing; extraction cannot fail.

use common::model::document::DocumentPrimitive;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("extractor pattern is valid")
}

// Tag openers are written as `<tag(?:\s[^>]*)?>` so `<p` never matches
// `<pre>` and `<th` never matches `<thead>`.
static TITLE_RE: Lazy<Regex> = Lazy::new(|| pattern(r"<h1(?:\s[^>]*)?>(.*?)</h1>"));
static LABEL_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| pattern(r"<p(?:\s[^>]*)?><strong>(.*?)</strong>\s*(.*?)</p>"));
static TABLE_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?s)<table(?:\s[^>]*)?>(.*?)</table>"));
static HEADER_CELL_RE: Lazy<Regex> = Lazy::new(|| pattern(r"<th(?:\s[^>]*)?>(.*?)</th>"));
static ROW_RE: Lazy<Regex> = Lazy::new(|| pattern(r"(?s)<tr(?:\s[^>]*)?>(.*?)</tr>"));
static DATA_CELL_RE: Lazy<Regex> = Lazy::new(|| pattern(r"<td(?:\s[^>]*)?>(.*?)</td>"));
static TOTAL_RE: Lazy<Regex> = Lazy::new(|| pattern(r"<strong>Total:</strong>\s*(.*?)</p>"));
static FOOTER_RE: Lazy<Regex> =
    Lazy::new(|| pattern(r#"(?s)<div\s+class\s*=\s*"footer"[^>]*>(.*?)</div>"#));
static PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| pattern(r"<p(?:\s[^>]*)?>(.*?)</p>"));

/// Entity-decoded, trimmed text of a captured group.
fn text(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}

fn captured_texts(re: &Regex, haystack: &str) -> Vec<String> {
    re.captures_iter(haystack).map(|c| text(&c[1])).collect()
}

pub fn extract(markup: &str) -> Vec<DocumentPrimitive> {
    let mut primitives = Vec::new();

    if let Some(caps) = TITLE_RE.captures(markup) {
        primitives.push(DocumentPrimitive::Title(text(&caps[1])));
    }

    primitives.extend(LABEL_VALUE_RE.captures_iter(markup).map(|caps| {
        DocumentPrimitive::LabelValueRow {
            label: text(&caps[1]),
            value: text(&caps[2]),
        }
    }));

    if let Some(table) = TABLE_RE.captures(markup).map(|c| c.get(1).map_or("", |m| m.as_str())) {
        let headers = captured_texts(&HEADER_CELL_RE, table);
        let rows: Vec<Vec<String>> = ROW_RE
            .captures_iter(table)
            .map(|row| captured_texts(&DATA_CELL_RE, &row[1]))
            .filter(|cells| !cells.is_empty())
            .collect();
        primitives.push(DocumentPrimitive::Table { headers, rows });
    }

    if let Some(caps) = TOTAL_RE.captures(markup) {
        primitives.push(DocumentPrimitive::TotalLine(text(&caps[1])));
    }

    if let Some(caps) = FOOTER_RE.captures(markup) {
        primitives.extend(
            captured_texts(&PARAGRAPH_RE, &caps[1])
                .into_iter()
                .map(DocumentPrimitive::FooterLine),
        );
    }

    debug!("Extracted {} document primitives", primitives.len());
    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use DocumentPrimitive::*;

    fn row(label: &str, value: &str) -> DocumentPrimitive {
        LabelValueRow {
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn title_and_label_rows() {
        let out = extract("<h1>Invoice #1</h1><p><strong>Client:</strong> Acme Co</p>");
        assert_eq!(out, vec![Title("Invoice #1".to_string()), row("Client:", "Acme Co")]);
    }

    #[test]
    fn only_the_first_heading_is_a_title() {
        let out = extract("<h1 class=\"big\">One</h1><h1>Two</h1>");
        assert_eq!(out, vec![Title("One".to_string())]);
    }

    #[test]
    fn entities_are_decoded() {
        let out = extract(
            "<h1>R&amp;D &lt;2024&gt;</h1><p><strong>Regi&#xE3;o:</strong> S&#227;o Paulo</p>",
        );
        assert_eq!(
            out,
            vec![Title("R&D <2024>".to_string()), row("Região:", "São Paulo")]
        );
    }

    #[test]
    fn table_headers_and_data_rows() {
        let markup = r#"<table class="table"><thead><tr><th>Produto</th><th>Qtd</th></tr></thead>
            <tbody>
              <tr><td>Notebook</td><td>12</td></tr>
              <tr><td>Mouse</td><td>3</td></tr>
            </tbody></table>"#;
        let out = extract(markup);
        assert_eq!(
            out,
            vec![Table {
                headers: vec!["Produto".to_string(), "Qtd".to_string()],
                rows: vec![
                    vec!["Notebook".to_string(), "12".to_string()],
                    vec!["Mouse".to_string(), "3".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn only_the_first_table_is_used() {
        let out = extract("<table><tr><td>a</td></tr></table><table><tr><td>b</td></tr></table>");
        assert_eq!(
            out,
            vec![Table {
                headers: vec![],
                rows: vec![vec!["a".to_string()]],
            }]
        );
    }

    #[test]
    fn no_table_motif_means_no_table() {
        let out = extract("<h1>x</h1><p>plain</p>");
        assert!(!out.iter().any(|p| matches!(p, Table { .. })));
    }

    #[test]
    fn total_line_is_also_a_label_row() {
        let out = extract("<p><strong>Total:</strong> R$ 45.320,00</p>");
        assert_eq!(
            out,
            vec![row("Total:", "R$ 45.320,00"), TotalLine("R$ 45.320,00".to_string())]
        );
    }

    #[test]
    fn footer_paragraphs_in_order() {
        let out = extract(r#"<div class="footer"><p>Line 1</p><p>Line &amp; 2</p></div>"#);
        assert_eq!(
            out,
            vec![
                FooterLine("Line 1".to_string()),
                FooterLine("Line & 2".to_string())
            ]
        );
    }

    #[test]
    fn output_order_is_fixed_regardless_of_source_order() {
        let markup = r#"<div class="footer"><p>foot</p></div>
<table><tr><th>H</th></tr><tr><td>v</td></tr></table>
<p><strong>Total:</strong> 10</p>
<p><strong>Name:</strong> Ana</p>
<h1>Report</h1>"#;
        let kinds: Vec<&str> = extract(markup)
            .iter()
            .map(|p| match p {
                Title(_) => "title",
                LabelValueRow { .. } => "row",
                Table { .. } => "table",
                TotalLine(_) => "total",
                FooterLine(_) => "footer",
            })
            .collect();
        assert_eq!(kinds, vec!["title", "row", "row", "table", "total", "footer"]);
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(extract("").is_empty());
        assert!(extract("<h1>unclosed <p><strong>x").is_empty());
    }
}
