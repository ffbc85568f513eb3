//! Two-stage driver: per-unit processing in parallel, then the global
//! package reconciliation and totals.

use ktmetrics_settings::AnalysisSettings;
use ktmetrics_syntax::{SourceParser, SourceUnit};
use ktmetrics_types::{ERROR_MARKER, FailedUnit, MetricRow, MetricsReport};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::reconcile::{merge_noav_by_name, reconcile_packages};
use crate::totals::totalize;
use crate::unit::process_unit;

/// Message of the run-level failure row.
pub const NO_SOURCES_MESSAGE: &str = "No Kotlin files found";

/// One discovered file, as handed over by file discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Display path; becomes the context of a failure row.
    pub path: String,
    /// File text, or the reason it could not be read.
    pub content: Result<String, String>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Ok(text.into()),
        }
    }

    /// A file that was discovered but could not be read.
    pub fn unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Err(message.into()),
        }
    }
}

/// Run the full metric pipeline over `sources`, in order.
///
/// Units are parsed and processed on the current rayon pool; row order
/// follows `sources` regardless of scheduling. An empty input yields a
/// report with one failure row and no total.
pub fn analyze(
    sources: &[SourceFile],
    parser: &dyn SourceParser,
    settings: &AnalysisSettings,
) -> MetricsReport {
    if sources.is_empty() {
        warn!("{NO_SOURCES_MESSAGE}");
        return MetricsReport {
            rows: vec![MetricRow::Failed(FailedUnit {
                context: ERROR_MARKER.to_string(),
                message: NO_SOURCES_MESSAGE.to_string(),
            })],
            total: None,
        };
    }

    let processed: Vec<(Option<SourceUnit>, Vec<MetricRow>)> = sources
        .par_iter()
        .map(|source| {
            let text = match &source.content {
                Ok(text) => text,
                Err(message) => {
                    warn!(path = %source.path, error = %message, "unreadable unit");
                    let failed = MetricRow::Failed(FailedUnit {
                        context: source.path.clone(),
                        message: message.clone(),
                    });
                    return (None, vec![failed]);
                }
            };
            let parsed = parser.parse(text);
            match &parsed {
                Ok(unit) => debug!(
                    path = %source.path,
                    package = %unit.package,
                    declarations = unit.declarations.len(),
                    "parsed unit"
                ),
                Err(err) => warn!(path = %source.path, error = %err, "failed to parse unit"),
            }
            let rows = process_unit(&source.path, parsed.as_ref(), settings);
            (parsed.ok(), rows)
        })
        .collect();

    let mut units = Vec::with_capacity(processed.len());
    let mut rows = Vec::new();
    for (unit, unit_rows) in processed {
        units.extend(unit);
        rows.extend(unit_rows);
    }

    let packages = reconcile_packages(&units, &mut rows);
    info!(
        units = units.len(),
        failed = sources.len() - units.len(),
        packages = packages.len(),
        "package aggregates reconciled"
    );

    if settings.noav_merge_by_name {
        merge_noav_by_name(&mut rows);
        debug!("NOAV merged by method name");
    }

    let total = totalize(&rows);
    info!(rows = rows.len(), loc = total.loc, cc = total.cc, "totals computed");

    MetricsReport {
        rows,
        total: Some(total),
    }
}
