use common::model::document::DocumentPrimitive;
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Document, Element, PaperSize};
use log::info;
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub type BackendError = Box<dyn Error + Send + Sync>;

const MARGIN_MM: i32 = 20;
const BASE_FONT_SIZE: u8 = 12;
const TITLE_FONT_SIZE: u8 = 20;
const TOTAL_FONT_SIZE: u8 = 14;
const FOOTER_FONT_SIZE: u8 = 9;
const ACCENT: Color = Color::Rgb(230, 81, 0);
const MUTED: Color = Color::Rgb(97, 97, 97);

/// Paints an ordered primitive sequence into one paginated artifact.
pub trait LayoutBackend: Send + Sync {
    fn paint(&self, primitives: &[DocumentPrimitive], output_path: &Path)
        -> Result<(), BackendError>;
}

/// genpdf backend: A4, 20 mm margins, 12 pt default text.
#[derive(Debug, Clone)]
pub struct GenpdfBackend {
    fonts_dir: PathBuf,
    font_family: String,
    fallback_family: String,
}

impl GenpdfBackend {
    pub fn new(
        fonts_dir: impl Into<PathBuf>,
        font_family: impl Into<String>,
        fallback_family: impl Into<String>,
    ) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
            fallback_family: fallback_family.into(),
        }
    }

    /// Load the primary font family, falling back to the secondary one.
    fn load_font(&self) -> Result<FontFamily<FontData>, BackendError> {
        if let Ok(family) = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None) {
            return Ok(family);
        }
        genpdf::fonts::from_files(&self.fonts_dir, &self.fallback_family, None).map_err(|e| {
            format!(
                "no usable font family '{}' or '{}' in {}: {}",
                self.font_family,
                self.fallback_family,
                self.fonts_dir.display(),
                e
            )
            .into()
        })
    }

    fn configure_document(&self, title: &str) -> Result<Document, BackendError> {
        let mut doc = Document::new(self.load_font()?);
        doc.set_title(title);
        doc.set_paper_size(PaperSize::A4);
        doc.set_font_size(BASE_FONT_SIZE);
        doc.set_line_spacing(1.25);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(MARGIN_MM);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

impl LayoutBackend for GenpdfBackend {
    fn paint(
        &self,
        primitives: &[DocumentPrimitive],
        output_path: &Path,
    ) -> Result<(), BackendError> {
        let title = primitives
            .iter()
            .find_map(|p| match p {
                DocumentPrimitive::Title(t) => Some(t.as_str()),
                _ => None,
            })
            .unwrap_or("Report");
        let mut doc = self.configure_document(title)?;

        let mut footer_started = false;
        for primitive in primitives {
            match primitive {
                DocumentPrimitive::Title(text) => push_title(&mut doc, text),
                DocumentPrimitive::LabelValueRow { label, value } => {
                    push_label_value(&mut doc, label, value)
                }
                DocumentPrimitive::Table { headers, rows } => push_table(&mut doc, headers, rows)?,
                DocumentPrimitive::TotalLine(text) => push_total(&mut doc, text),
                DocumentPrimitive::FooterLine(text) => {
                    if !footer_started {
                        doc.push(Break::new(2));
                        footer_started = true;
                    }
                    push_footer_line(&mut doc, text);
                }
            }
        }

        let mut rendered = Vec::new();
        doc.render(&mut rendered).map_err(|e| e.to_string())?;
        write_atomically(&rendered, output_path)?;
        info!("PDF written: {}", output_path.display());
        Ok(())
    }
}

fn push_title(doc: &mut Document, text: &str) {
    let style = Style::new()
        .bold()
        .with_font_size(TITLE_FONT_SIZE)
        .with_color(ACCENT);
    doc.push(Paragraph::new(StyledString::new(text.to_string(), style)).aligned(Alignment::Center));
    doc.push(Break::new(1));
}

fn push_label_value(doc: &mut Document, label: &str, value: &str) {
    let mut p = Paragraph::new("");
    p.push(StyledString::new(label.to_string(), Style::new().bold()));
    p.push(StyledString::new(format!(" {}", value), Style::new()));
    doc.push(p);
}

/// Column count and body cells of a table. Every row is padded or truncated
/// to the header width; without headers the widest row decides.
fn table_grid(headers: &[String], rows: &[Vec<String>]) -> (usize, Vec<Vec<String>>) {
    let columns = if headers.is_empty() {
        rows.iter().map(Vec::len).max().unwrap_or(0)
    } else {
        headers.len()
    };
    let grid = rows
        .iter()
        .map(|cells| {
            (0..columns)
                .map(|i| cells.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    (columns, grid)
}

/// Framed grid with a bold header row. A table without columns is skipped.
fn push_table(
    doc: &mut Document,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<(), BackendError> {
    let (columns, grid) = table_grid(headers, rows);
    if columns == 0 {
        return Ok(());
    }

    let mut table = TableLayout::new(vec![1; columns]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    if !headers.is_empty() {
        let mut row = table.row();
        for header in headers {
            row.push_element(
                Paragraph::new(StyledString::new(header.clone(), Style::new().bold()))
                    .padded(1),
            );
        }
        row.push().map_err(|e| e.to_string())?;
    }

    for cells in grid {
        let mut row = table.row();
        for cell in cells {
            row.push_element(Paragraph::new(cell).padded(1));
        }
        row.push().map_err(|e| e.to_string())?;
    }

    doc.push(Break::new(1));
    doc.push(table);
    doc.push(Break::new(1));
    Ok(())
}

fn push_total(doc: &mut Document, text: &str) {
    let style = Style::new().bold().with_font_size(TOTAL_FONT_SIZE);
    doc.push(Paragraph::new(StyledString::new(format!("Total: {}", text), style)));
}

fn push_footer_line(doc: &mut Document, text: &str) {
    let style = Style::new().with_font_size(FOOTER_FONT_SIZE).with_color(MUTED);
    doc.push(Paragraph::new(StyledString::new(text.to_string(), style)).aligned(Alignment::Center));
}

/// Writes through a temp file in the target directory and renames it into
/// place, so a failed write leaves nothing at `output_path`.
pub fn write_atomically(bytes: &[u8], output_path: &Path) -> Result<(), BackendError> {
    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(output_path).map_err(|e| e.error)?;
    Ok(())
}
