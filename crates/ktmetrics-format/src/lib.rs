//! # ktmetrics-format
//!
//! **Tier 3 (Formatting)**
//!
//! This crate handles the rendering and serialization of `ktmetrics` reports.
//! It supports Markdown, TSV, CSV, JSON and JSONL formats, all over the fixed
//! column set in [`ktmetrics_types::COLUMNS`].
//!
//! ## What belongs here
//! * Serialization logic (JSON/CSV)
//! * Markdown table rendering
//! * Output file writing
//!
//! ## What does NOT belong here
//! * Business logic (calculating metrics)
//! * CLI arg parsing

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;

use ktmetrics_types::{
    COLUMNS, FlatRow, MetricRow, MetricsReceipt, MetricsReport, OutputFormat, SCHEMA_VERSION,
    ToolInfo,
};

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Columns that hold numbers are right-aligned in Markdown.
fn is_numeric_column(index: usize) -> bool {
    (3..16).contains(&index)
}

/// Pipes inside a cell would split the Markdown row.
fn escape_md(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

/// Tabs and newlines inside a cell would break TSV framing.
fn escape_tsv(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

// -----------------------
// Table output
// -----------------------

pub fn render_md(report: &MetricsReport) -> String {
    let mut s = String::new();

    s.push('|');
    s.push_str(&COLUMNS.join("|"));
    s.push_str("|\n|");
    for i in 0..COLUMNS.len() {
        s.push_str(if is_numeric_column(i) { "---:|" } else { "---|" });
    }
    s.push('\n');

    let rows = report.flat_rows();
    let last = rows.len().saturating_sub(1);
    for (i, row) in rows.iter().enumerate() {
        let total = report.total.is_some() && i == last;
        s.push('|');
        for (col, cell) in row.cells().iter().enumerate() {
            if total && col == 0 {
                s.push_str(&format!("**{cell}**"));
            } else {
                s.push_str(&escape_md(cell));
            }
            s.push('|');
        }
        s.push('\n');
    }

    s
}

pub fn render_tsv(report: &MetricsReport) -> String {
    let mut s = String::new();
    s.push_str(&COLUMNS.join("\t"));
    s.push('\n');
    for row in report.flat_rows() {
        let cells: Vec<String> = row.cells().iter().map(|c| escape_tsv(c)).collect();
        s.push_str(&cells.join("\t"));
        s.push('\n');
    }
    s
}

pub fn write_csv_to<W: Write>(out: &mut W, report: &MetricsReport) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(COLUMNS)?;
    for row in report.flat_rows() {
        wtr.write_record(row.cells())?;
    }
    wtr.flush()?;
    Ok(())
}

// -----------------------
// JSON output
// -----------------------

pub fn write_json_to<W: Write>(out: &mut W, report: &MetricsReport) -> Result<()> {
    let receipt = MetricsReceipt::new(report, now_ms());
    writeln!(out, "{}", serde_json::to_string(&receipt)?)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonlMeta {
    #[serde(rename = "type")]
    ty: &'static str,
    schema_version: u32,
    generated_at_ms: u128,
    tool: ToolInfo,
    columns: [&'static str; 17],
}

#[derive(Serialize)]
struct JsonlRow<'a> {
    #[serde(rename = "type")]
    ty: &'static str,
    #[serde(flatten)]
    row: &'a FlatRow,
}

/// A meta line, one `row` line per unit row, then a `total` line when the
/// run produced one.
pub fn write_jsonl_to<W: Write>(out: &mut W, report: &MetricsReport) -> Result<()> {
    let meta = JsonlMeta {
        ty: "meta",
        schema_version: SCHEMA_VERSION,
        generated_at_ms: now_ms(),
        tool: ToolInfo::current(),
        columns: COLUMNS,
    };
    writeln!(out, "{}", serde_json::to_string(&meta)?)?;

    for row in &report.rows {
        let flat = MetricRow::to_flat(row);
        let wrapper = JsonlRow {
            ty: "row",
            row: &flat,
        };
        writeln!(out, "{}", serde_json::to_string(&wrapper)?)?;
    }

    if let Some(total) = &report.total {
        let flat = total.to_flat();
        let wrapper = JsonlRow {
            ty: "total",
            row: &flat,
        };
        writeln!(out, "{}", serde_json::to_string(&wrapper)?)?;
    }
    Ok(())
}

// -----------------------
// Dispatch
// -----------------------

pub fn write_report_to<W: Write>(
    out: &mut W,
    report: &MetricsReport,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Md => write!(out, "{}", render_md(report))?,
        OutputFormat::Tsv => write!(out, "{}", render_tsv(report))?,
        OutputFormat::Csv => write_csv_to(out, report)?,
        OutputFormat::Json => write_json_to(out, report)?,
        OutputFormat::Jsonl => write_jsonl_to(out, report)?,
    }
    Ok(())
}

/// Write `report` to `out`, or to stdout when no path is given.
pub fn write_report(report: &MetricsReport, format: OutputFormat, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_report_to(&mut out, report, format)?;
            out.flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report_to(&mut out, report, format)?;
            out.flush()?;
        }
    }
    Ok(())
}
