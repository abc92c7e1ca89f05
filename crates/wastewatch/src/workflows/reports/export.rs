use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use minijinja::{context, Environment};
use serde::Serialize;

use super::domain::WasteReport;

pub const EXPORT_COLUMNS: [&str; 6] = [
    "id",
    "status",
    "wasteType",
    "severity",
    "address",
    "createdAt",
];

const HTML_TEMPLATE_NAME: &str = "report_export.html";

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #999; padding: 4px 8px; text-align: left; }
@media print { body { margin: 0; } }
</style>
</head>
<body>
<h1>{{ title }}</h1>
<p>Generated {{ generated_at }}, {{ rows|length }} report(s)</p>
<table>
<thead>
<tr>{% for column in columns %}<th>{{ column }}</th>{% endfor %}</tr>
</thead>
<tbody>
{% for row in rows %}<tr><td>{{ row.id }}</td><td>{{ row.status }}</td><td>{{ row.waste_type }}</td><td>{{ row.severity }}</td><td>{{ row.address }}</td><td>{{ row.created_at }}</td></tr>
{% endfor %}</tbody>
</table>
</body>
</html>
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub fn content_type(self) -> mime::Mime {
        match self {
            ExportFormat::Csv => mime::TEXT_CSV_UTF_8,
            ExportFormat::Html => mime::TEXT_HTML_UTF_8,
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "waste-reports.csv",
            ExportFormat::Html => "waste-reports.html",
        }
    }

    pub fn render(self, reports: &[WasteReport]) -> Result<String, ExportError> {
        match self {
            ExportFormat::Csv => to_csv(reports),
            ExportFormat::Html => to_html(reports, Utc::now()),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" | "htm" => Ok(ExportFormat::Html),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Flattened export columns. Absent optional fields become empty strings.
#[derive(Debug, Clone, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    status: &'static str,
    waste_type: &'static str,
    severity: String,
    address: &'a str,
    created_at: String,
}

impl<'a> From<&'a WasteReport> for ExportRow<'a> {
    fn from(report: &'a WasteReport) -> Self {
        Self {
            id: &report.id.0,
            status: report.status.label(),
            waste_type: report.waste_type.label(),
            severity: format!("{:.1}", report.severity),
            address: report.address(),
            created_at: report
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Every field is quoted and embedded quotes are doubled.
pub fn to_csv(reports: &[WasteReport]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for report in reports {
        let row = ExportRow::from(report);
        writer.write_record([
            row.id,
            row.status,
            row.waste_type,
            row.severity.as_str(),
            row.address,
            row.created_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Encoding(err.to_string()))
}

/// Self-contained, print-friendly document with the same columns as the CSV.
pub fn to_html(reports: &[WasteReport], generated_at: DateTime<Utc>) -> Result<String, ExportError> {
    let mut env = Environment::new();
    env.add_template(HTML_TEMPLATE_NAME, HTML_TEMPLATE)?;
    let template = env.get_template(HTML_TEMPLATE_NAME)?;

    let rows: Vec<ExportRow<'_>> = reports.iter().map(ExportRow::from).collect();
    let html = template.render(context! {
        title => "Waste report export",
        generated_at => generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        columns => EXPORT_COLUMNS,
        rows => rows,
    })?;
    Ok(html)
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unknown export format '{0}' (expected csv or html)")]
    UnknownFormat(String),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export buffer error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export produced invalid utf-8: {0}")]
    Encoding(String),
    #[error("html template error: {0}")]
    Template(#[from] minijinja::Error),
}
