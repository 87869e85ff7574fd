//! SQLite-backed template store.
//!
//! A connection is opened per call, so one repository can serve concurrent
//! generation requests without locking.
//!
//! ## Tables
//! - `report_template`: one row per template, unique `name`, `active` flag.
//! - `report_field`: fields of a template, ordered by `display_order`.
//! - `report_data`: timestamped values, many per `field_name`.

use crate::error::ReportError;
use crate::repository::ReportRepository;
use crate::services::resolver;
use chrono::NaiveDateTime;
use common::model::data::DataRecord;
use common::model::template::{FieldDefinition, TemplateDefinition};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS report_template (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE,
    css         TEXT,
    header_html TEXT,
    body_html   TEXT,
    footer_html TEXT,
    active      INTEGER NOT NULL DEFAULT 1,
    version     INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at  TEXT
);
CREATE TABLE IF NOT EXISTS report_field (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    report_template_id INTEGER NOT NULL REFERENCES report_template(id) ON DELETE CASCADE,
    field_name         TEXT    NOT NULL,
    label              TEXT,
    section            TEXT    NOT NULL DEFAULT 'Body',
    field_type         TEXT    NOT NULL DEFAULT 'Text',
    display_order      INTEGER NOT NULL DEFAULT 0,
    required           INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS report_data (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    field_name TEXT NOT NULL,
    value      TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS ix_report_field_template_id ON report_field(report_template_id);
CREATE INDEX IF NOT EXISTS ix_report_data_field_name ON report_data(field_name);
";

pub const SAMPLE_TEMPLATE: &str = "RelatorioVendas";

#[derive(Debug, Clone)]
pub struct SqliteReportRepository {
    path: PathBuf,
}

impl SqliteReportRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self, operation: &'static str, target: &str) -> Result<Connection, ReportError> {
        let conn = Connection::open(&self.path)
            .map_err(ReportError::data_access(operation, target))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(ReportError::data_access(operation, target))?;
        Ok(conn)
    }

    pub fn initialize_schema(&self) -> Result<(), ReportError> {
        let target = self.path.display().to_string();
        let conn = self.connect("initialize_schema", &target)?;
        conn.execute_batch(SCHEMA)
            .map_err(ReportError::data_access("initialize_schema", target))
    }

    /// Inserts the template or replaces the stored one with the same name,
    /// fields included. Returns the template id.
    pub fn save_template(&self, template: &TemplateDefinition) -> Result<i64, ReportError> {
        let name = template.name.as_str();
        let mut conn = self.connect("save_template", name)?;
        let tx = conn
            .transaction()
            .map_err(ReportError::data_access("save_template", name))?;

        tx.execute(
            "INSERT INTO report_template
                 (name, css, header_html, body_html, footer_html, active, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(name) DO UPDATE SET
                 css = excluded.css,
                 header_html = excluded.header_html,
                 body_html = excluded.body_html,
                 footer_html = excluded.footer_html,
                 active = excluded.active,
                 version = excluded.version,
                 updated_at = CURRENT_TIMESTAMP",
            params![
                name,
                template.css,
                template.header_html,
                template.body_html,
                template.footer_html,
                template.active,
                template.version,
                template.created_at,
                template.updated_at,
            ],
        )
        .map_err(ReportError::data_access("save_template", name))?;

        let id: i64 = tx
            .query_row(
                "SELECT id FROM report_template WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map_err(ReportError::data_access("save_template", name))?;

        tx.execute(
            "DELETE FROM report_field WHERE report_template_id = ?1",
            params![id],
        )
        .map_err(ReportError::data_access("save_template", name))?;

        for field in &template.fields {
            tx.execute(
                "INSERT INTO report_field
                     (report_template_id, field_name, label, section, field_type, display_order, required)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    field.field_name,
                    field.label,
                    field.section,
                    field.field_type,
                    field.display_order,
                    field.required,
                ],
            )
            .map_err(ReportError::data_access("save_template", name))?;
        }

        tx.commit()
            .map_err(ReportError::data_access("save_template", name))?;
        Ok(id)
    }

    pub fn insert_data_record(&self, record: &DataRecord) -> Result<(), ReportError> {
        let conn = self.connect("insert_data_record", &record.field_name)?;
        conn.execute(
            "INSERT INTO report_data (field_name, value, created_at) VALUES (?1, ?2, ?3)",
            params![record.field_name, record.value, record.created_at],
        )
        .map_err(ReportError::data_access("insert_data_record", &record.field_name))?;
        Ok(())
    }

    /// Installs the sample sales report with its fields and data unless a
    /// template with that name already exists. Returns whether it did.
    pub fn seed_sample(&self) -> Result<bool, ReportError> {
        let conn = self.connect("seed_sample", SAMPLE_TEMPLATE)?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM report_template WHERE name = ?1)",
                params![SAMPLE_TEMPLATE],
                |row| row.get(0),
            )
            .map_err(ReportError::data_access("seed_sample", SAMPLE_TEMPLATE))?;
        if exists {
            return Ok(false);
        }

        let now = chrono::Local::now().naive_local();
        self.save_template(&sample_template(now))?;
        for (field_name, value) in SAMPLE_DATA {
            self.insert_data_record(&DataRecord {
                field_name: field_name.to_string(),
                value: Some(value.to_string()),
                created_at: now,
            })?;
        }
        info!("Sample template '{}' installed", SAMPLE_TEMPLATE);
        Ok(true)
    }
}

fn template_from_row(row: &Row) -> rusqlite::Result<TemplateDefinition> {
    Ok(TemplateDefinition {
        id: row.get(0)?,
        name: row.get(1)?,
        css: row.get(2)?,
        header_html: row.get(3)?,
        body_html: row.get(4)?,
        footer_html: row.get(5)?,
        active: row.get(6)?,
        version: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        fields: Vec::new(),
    })
}

fn field_from_row(row: &Row) -> rusqlite::Result<FieldDefinition> {
    Ok(FieldDefinition {
        id: row.get(0)?,
        template_id: row.get(1)?,
        field_name: row.get(2)?,
        label: row.get(3)?,
        section: row.get(4)?,
        field_type: row.get(5)?,
        display_order: row.get(6)?,
        required: row.get(7)?,
    })
}

fn record_from_row(row: &Row) -> rusqlite::Result<DataRecord> {
    Ok(DataRecord {
        field_name: row.get(0)?,
        value: row.get(1)?,
        created_at: row.get::<_, NaiveDateTime>(2)?,
    })
}

impl ReportRepository for SqliteReportRepository {
    fn get_template_by_name(&self, name: &str) -> Result<Option<TemplateDefinition>, ReportError> {
        info!("Fetching template: {}", name);
        let conn = self.connect("get_template_by_name", name)?;

        let template = conn
            .query_row(
                "SELECT id, name, css, header_html, body_html, footer_html,
                        active, version, created_at, updated_at
                 FROM report_template
                 WHERE name = ?1 AND active = 1",
                params![name],
                template_from_row,
            )
            .optional()
            .map_err(ReportError::data_access("get_template_by_name", name))?;

        let Some(mut template) = template else {
            warn!("Template not found: {}", name);
            return Ok(None);
        };

        template.fields = self.get_fields_for_template(template.id)?;
        info!(
            "Template loaded: {} fields found",
            template.fields.len()
        );
        Ok(Some(template))
    }

    fn get_fields_for_template(
        &self,
        template_id: i64,
    ) -> Result<Vec<FieldDefinition>, ReportError> {
        let target = format!("template id {}", template_id);
        let conn = self.connect("get_fields_for_template", &target)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, report_template_id, field_name, label, section, field_type,
                        display_order, required
                 FROM report_field
                 WHERE report_template_id = ?1
                 ORDER BY display_order, id",
            )
            .map_err(ReportError::data_access("get_fields_for_template", &target))?;
        let fields = stmt
            .query_map(params![template_id], field_from_row)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(ReportError::data_access("get_fields_for_template", &target))?;
        Ok(fields)
    }

    fn get_all_data_records(&self) -> Result<Vec<DataRecord>, ReportError> {
        info!("Fetching report data");
        let conn = self.connect("get_all_data_records", "report_data")?;
        let mut stmt = conn
            .prepare(
                "SELECT field_name, value, created_at FROM report_data ORDER BY field_name, id",
            )
            .map_err(ReportError::data_access("get_all_data_records", "report_data"))?;
        let records = stmt
            .query_map([], record_from_row)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(ReportError::data_access("get_all_data_records", "report_data"))?;
        info!("Data loaded: {} records", records.len());
        Ok(records)
    }

    fn get_field_value(&self, field_name: &str) -> Result<Option<String>, ReportError> {
        let conn = self.connect("get_field_value", field_name)?;
        let mut stmt = conn
            .prepare(
                "SELECT field_name, value, created_at FROM report_data
                 WHERE field_name = ?1 ORDER BY id",
            )
            .map_err(ReportError::data_access("get_field_value", field_name))?;
        let records = stmt
            .query_map(params![field_name], record_from_row)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(ReportError::data_access("get_field_value", field_name))?;
        Ok(resolver::resolve(&records)
            .get(field_name)
            .map(str::to_string))
    }
}

const SAMPLE_CSS: &str = "body { font-family: Arial, sans-serif; font-size: 12px; margin: 20px; color: #333; }
h1 { color: #FF6600; margin-bottom: 5px; }
.header { text-align: center; border-bottom: 2px solid #FF6600; padding-bottom: 10px; margin-bottom: 20px; }
.info { background: #f9f9f9; padding: 10px; border-left: 4px solid #FF6600; margin-bottom: 15px; }
.table { width: 100%; border-collapse: collapse; margin-top: 15px; }
.table th { background: #FF6600; color: white; padding: 8px; text-align: left; }
.table td { padding: 8px; border-bottom: 1px solid #ddd; }
.footer { text-align: center; margin-top: 30px; font-size: 10px; color: #666; border-top: 1px solid #ccc; padding-top: 10px; }";

const SAMPLE_HEADER: &str =
    r#"<div class="header"><h1>Relatório de Vendas - {{Periodo}}</h1><p>{{Empresa}}</p></div>"#;

const SAMPLE_BODY: &str = r#"<div class="info"><p><strong>Vendedor:</strong> {{Vendedor}}</p><p><strong>Região:</strong> {{Regiao}}</p><p><strong>Total:</strong> {{TotalVendas}}</p></div>
<table class="table"><thead><tr><th>Produto</th><th>Quantidade</th><th>Valor</th></tr></thead><tbody><tr><td>{{Produto}}</td><td>{{Quantidade}}</td><td>{{Valor}}</td></tr></tbody></table>"#;

const SAMPLE_FOOTER: &str =
    r#"<div class="footer"><p>Gerado em {{DataGeracao}} por DynamicReportEngine</p></div>"#;

/// (name, label, section, type, required)
const SAMPLE_FIELDS: [(&str, &str, &str, &str, bool); 9] = [
    ("Periodo", "Período", "Header", "Text", true),
    ("Empresa", "Nome da Empresa", "Header", "Text", true),
    ("Vendedor", "Nome do Vendedor", "Body", "Text", true),
    ("Regiao", "Região de Vendas", "Body", "Text", false),
    ("TotalVendas", "Total de Vendas (R$)", "Body", "Currency", true),
    ("Produto", "Nome do Produto", "Body", "Text", false),
    ("Quantidade", "Quantidade Vendida", "Body", "Number", false),
    ("Valor", "Valor Unitário", "Body", "Currency", false),
    ("DataGeracao", "Data de Geração", "Footer", "Date", true),
];

const SAMPLE_DATA: [(&str, &str); 9] = [
    ("Periodo", "Janeiro/2024"),
    ("Empresa", "TechCorp Ltda"),
    ("Vendedor", "João Silva"),
    ("Regiao", "Sudeste"),
    ("TotalVendas", "R$ 45.320,00"),
    ("Produto", "Notebook Dell Inspiron 15"),
    ("Quantidade", "12"),
    ("Valor", "R$ 3.200,00"),
    ("DataGeracao", "2024-01-31 14:30:00"),
];

fn sample_template(now: NaiveDateTime) -> TemplateDefinition {
    TemplateDefinition {
        id: 0,
        name: SAMPLE_TEMPLATE.to_string(),
        css: Some(SAMPLE_CSS.to_string()),
        header_html: Some(SAMPLE_HEADER.to_string()),
        body_html: Some(SAMPLE_BODY.to_string()),
        footer_html: Some(SAMPLE_FOOTER.to_string()),
        active: true,
        version: 1,
        created_at: now,
        updated_at: None,
        fields: SAMPLE_FIELDS
            .iter()
            .zip(1..)
            .map(|(&(name, label, section, field_type, required), order)| FieldDefinition {
                id: 0,
                template_id: 0,
                field_name: name.to_string(),
                label: Some(label.to_string()),
                section: section.to_string(),
                field_type: field_type.to_string(),
                display_order: order,
                required,
            })
            .collect(),
    }
}
