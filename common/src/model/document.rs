use serde::{Deserialize, Serialize};

/// A typed drawing primitive recovered from rendered markup and handed to
/// the layout backend.
///
/// The extractor always emits them in variant order: title, label rows,
/// table, total, footer lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentPrimitive {
    /// Text of the first `<h1>`.
    Title(String),
    /// `<p><strong>label</strong> value</p>`.
    LabelValueRow { label: String, value: String },
    /// The first table: `<th>` texts and the `<td>` texts of each data row.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Text following `<strong>Total:</strong>`.
    TotalLine(String),
    /// One paragraph of the `footer` container.
    FooterLine(String),
}
