//! # ktmetrics-types
//!
//! **Tier 0 (Core Types)**
//!
//! This crate defines the core data structures and contracts for `ktmetrics`.
//! It contains only data types, Serde definitions, and `SCHEMA_VERSION`.
//!
//! ## Stability Policy
//!
//! **Column-first stability**: the primary contract is the fixed export column
//! set ([`COLUMNS`]) and the JSON shape of [`FlatRow`], not Rust struct literals.
//! Renaming or removing a column bumps `SCHEMA_VERSION`.
//!
//! ## What belongs here
//! * Pure data structs (records, rows, totals, reports)
//! * Serialization/Deserialization logic
//! * Sentinel markers shared by every tier
//!
//! ## What does NOT belong here
//! * File I/O
//! * CLI argument parsing
//! * Metric computation

use serde::{Deserialize, Serialize};

/// The current schema version for all report types.
pub const SCHEMA_VERSION: u32 = 1;

/// Package identifier used when a unit declares no `package` header.
pub const UNKNOWN_PACKAGE: &str = "UNKNOWN";
/// Class column value for free (top-level) functions.
pub const TOP_LEVEL_CLASS: &str = "TopLevel";
/// Class/Method marker for a unit with no declarations.
pub const NONE_MARKER: &str = "None";
/// Package/Class/LOC marker for a unit that failed to process.
pub const ERROR_MARKER: &str = "Error";
/// Package marker for the synthetic summary row.
pub const TOTAL_MARKER: &str = "TOTAL";
/// Error message carried by the sentinel row of a declaration-free unit.
pub const NO_FUNCTIONS_MESSAGE: &str = "No functions found";

/// The fixed export column set, in output order.
pub const COLUMNS: [&str; 17] = [
    "Package",
    "Class",
    "Method",
    "LOC",
    "Max Nesting",
    "CC",
    "WOC",
    "MaMCL",
    "NOAV",
    "CM",
    "LOC_type",
    "LOCNAMM_type",
    "CFNAMM_type",
    "NOMNAMM_Package",
    "NOI_Package",
    "LOC_package",
    "Error",
];

/// Package-level aggregates (file-local before reconciliation, global after).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageMetrics {
    /// Number of non-accessor methods and functions.
    pub nomnamm: usize,
    /// Number of interface declarations.
    pub noi: usize,
    /// Lines of code.
    pub loc: usize,
}

/// Type-level aggregates attached to every method record of a class.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeMetrics {
    pub loc: usize,
    pub locnamm: usize,
    pub cfnamm: f64,
}

/// Method-level metrics produced by the lexical scanners.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MethodMetrics {
    pub loc: usize,
    pub max_nesting: usize,
    pub cc: usize,
    pub woc: f64,
    pub mamcl: usize,
    pub noav: usize,
    pub cm: usize,
}

/// One row per method or top-level function.
///
/// After creation, only the package-level columns are ever rewritten
/// (by package reconciliation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    pub package: String,
    pub class: String,
    pub method: String,
    pub metrics: MethodMetrics,
    pub type_metrics: TypeMetrics,
    pub package_metrics: PackageMetrics,
    /// Explanatory marker for sentinel records (e.g. "No functions found").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetricRecord {
    /// Sentinel record for a unit that declares nothing.
    pub fn no_declarations(package: &str, package_metrics: PackageMetrics) -> Self {
        Self {
            package: package.to_string(),
            class: NONE_MARKER.to_string(),
            method: NONE_MARKER.to_string(),
            metrics: MethodMetrics::default(),
            type_metrics: TypeMetrics::default(),
            package_metrics,
            error: Some(NO_FUNCTIONS_MESSAGE.to_string()),
        }
    }
}

/// A unit (or whole run) that could not be turned into metric records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailedUnit {
    /// Where the failure happened: a unit path, or "Error" for run-level failures.
    pub context: String,
    pub message: String,
}

/// A report row: either a real record or a failure sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricRow {
    Record(MetricRecord),
    Failed(FailedUnit),
}

impl MetricRow {
    pub fn as_record(&self) -> Option<&MetricRecord> {
        match self {
            MetricRow::Record(r) => Some(r),
            MetricRow::Failed(_) => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut MetricRecord> {
        match self {
            MetricRow::Record(r) => Some(r),
            MetricRow::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MetricRow::Failed(_))
    }

    /// Flatten to the column-keyed export shape.
    pub fn to_flat(&self) -> FlatRow {
        match self {
            MetricRow::Record(r) => FlatRow {
                package: r.package.clone(),
                class: r.class.clone(),
                method: r.method.clone(),
                loc: LocCell::Count(r.metrics.loc),
                max_nesting: r.metrics.max_nesting,
                cc: r.metrics.cc,
                woc: r.metrics.woc,
                mamcl: r.metrics.mamcl,
                noav: r.metrics.noav,
                cm: r.metrics.cm,
                loc_type: r.type_metrics.loc,
                locnamm_type: r.type_metrics.locnamm,
                cfnamm_type: r.type_metrics.cfnamm,
                nomnamm_package: r.package_metrics.nomnamm,
                noi_package: r.package_metrics.noi,
                loc_package: r.package_metrics.loc,
                error: r.error.clone().unwrap_or_default(),
            },
            MetricRow::Failed(f) => FlatRow {
                package: ERROR_MARKER.to_string(),
                class: ERROR_MARKER.to_string(),
                method: f.context.clone(),
                loc: LocCell::Sentinel(ERROR_MARKER.to_string()),
                error: f.message.clone(),
                ..FlatRow::zeroed()
            },
        }
    }
}

/// Column sums over every non-total row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricTotals {
    pub loc: usize,
    pub max_nesting: usize,
    pub cc: usize,
    pub woc: f64,
    pub mamcl: usize,
    pub noav: usize,
    pub cm: usize,
    pub loc_type: usize,
    pub locnamm_type: usize,
    pub cfnamm_type: f64,
    pub nomnamm_package: usize,
    pub noi_package: usize,
    pub loc_package: usize,
}

impl MetricTotals {
    /// Flatten to the synthetic `TOTAL` row.
    pub fn to_flat(&self) -> FlatRow {
        FlatRow {
            package: TOTAL_MARKER.to_string(),
            class: String::new(),
            method: String::new(),
            loc: LocCell::Count(self.loc),
            max_nesting: self.max_nesting,
            cc: self.cc,
            woc: self.woc,
            mamcl: self.mamcl,
            noav: self.noav,
            cm: self.cm,
            loc_type: self.loc_type,
            locnamm_type: self.locnamm_type,
            cfnamm_type: self.cfnamm_type,
            nomnamm_package: self.nomnamm_package,
            noi_package: self.noi_package,
            loc_package: self.loc_package,
            error: String::new(),
        }
    }
}

/// The LOC cell is the only column that may hold a non-numeric sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LocCell {
    Count(usize),
    Sentinel(String),
}

impl LocCell {
    /// Numeric value, with sentinels coerced to 0.
    pub fn as_count(&self) -> usize {
        match self {
            LocCell::Count(n) => *n,
            LocCell::Sentinel(_) => 0,
        }
    }
}

impl std::fmt::Display for LocCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocCell::Count(n) => write!(f, "{n}"),
            LocCell::Sentinel(s) => f.write_str(s),
        }
    }
}

/// A report row keyed by export column name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatRow {
    #[serde(rename = "Package")]
    pub package: String,
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "LOC")]
    pub loc: LocCell,
    #[serde(rename = "Max Nesting")]
    pub max_nesting: usize,
    #[serde(rename = "CC")]
    pub cc: usize,
    #[serde(rename = "WOC")]
    pub woc: f64,
    #[serde(rename = "MaMCL")]
    pub mamcl: usize,
    #[serde(rename = "NOAV")]
    pub noav: usize,
    #[serde(rename = "CM")]
    pub cm: usize,
    #[serde(rename = "LOC_type")]
    pub loc_type: usize,
    #[serde(rename = "LOCNAMM_type")]
    pub locnamm_type: usize,
    #[serde(rename = "CFNAMM_type")]
    pub cfnamm_type: f64,
    #[serde(rename = "NOMNAMM_Package")]
    pub nomnamm_package: usize,
    #[serde(rename = "NOI_Package")]
    pub noi_package: usize,
    #[serde(rename = "LOC_package")]
    pub loc_package: usize,
    #[serde(rename = "Error")]
    pub error: String,
}

impl FlatRow {
    fn zeroed() -> Self {
        Self {
            package: String::new(),
            class: String::new(),
            method: String::new(),
            loc: LocCell::Count(0),
            max_nesting: 0,
            cc: 0,
            woc: 0.0,
            mamcl: 0,
            noav: 0,
            cm: 0,
            loc_type: 0,
            locnamm_type: 0,
            cfnamm_type: 0.0,
            nomnamm_package: 0,
            noi_package: 0,
            loc_package: 0,
            error: String::new(),
        }
    }

    /// Cell values rendered as text, in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 17] {
        [
            self.package.clone(),
            self.class.clone(),
            self.method.clone(),
            self.loc.to_string(),
            self.max_nesting.to_string(),
            self.cc.to_string(),
            format_ratio(self.woc),
            self.mamcl.to_string(),
            self.noav.to_string(),
            self.cm.to_string(),
            self.loc_type.to_string(),
            self.locnamm_type.to_string(),
            format_ratio(self.cfnamm_type),
            self.nomnamm_package.to_string(),
            self.noi_package.to_string(),
            self.loc_package.to_string(),
            self.error.clone(),
        ]
    }
}

/// Render a ratio column with at most four decimals and no trailing zeros.
pub fn format_ratio(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// The finished output of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsReport {
    pub rows: Vec<MetricRow>,
    /// Absent only when the whole run failed before producing unit rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<MetricTotals>,
}

impl MetricsReport {
    /// Every row flattened, followed by the `TOTAL` row when present.
    pub fn flat_rows(&self) -> Vec<FlatRow> {
        let mut out: Vec<FlatRow> = self.rows.iter().map(MetricRow::to_flat).collect();
        if let Some(total) = &self.total {
            out.push(total.to_flat());
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl ToolInfo {
    pub fn current() -> Self {
        Self {
            name: "ktmetrics".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// JSON envelope for a finished report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReceipt {
    pub schema_version: u32,
    pub generated_at_ms: u128,
    pub tool: ToolInfo,
    pub rows: Vec<FlatRow>,
    /// The `TOTAL` row; absent when the whole run failed.
    pub total: Option<FlatRow>,
}

impl MetricsReceipt {
    pub fn new(report: &MetricsReport, generated_at_ms: u128) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at_ms,
            tool: ToolInfo::current(),
            rows: report.rows.iter().map(MetricRow::to_flat).collect(),
            total: report.total.as_ref().map(MetricTotals::to_flat),
        }
    }
}

// -----------------------------------------------------------------------------
// Enums shared with CLI
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Markdown table.
    #[default]
    Md,
    /// Tab-separated values.
    Tsv,
    /// CSV with a header row.
    Csv,
    /// A single JSON receipt.
    Json,
    /// One JSON object per line.
    Jsonl,
}

/// How attribute references are recognised when computing NOAV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum NoavMode {
    /// Only `this.x`, `this?.x` and `this!!.x` count as accesses.
    #[default]
    Qualified,
    /// Self-qualified accesses plus bare identifiers that are not calls.
    Broad,
}
