//! Unit Processor: one parsed source unit to metric rows.

use std::collections::BTreeSet;

use ktmetrics_scan::{
    coupling, cyclomatic, is_accessor, loc, mamcl, max_nesting, noav, top_level_woc, woc,
};
use ktmetrics_settings::AnalysisSettings;
use ktmetrics_syntax::{Declaration, FunctionDecl, ParseError, SourceUnit};
use ktmetrics_types::{
    FailedUnit, MethodMetrics, MetricRecord, MetricRow, NoavMode, PackageMetrics,
    TOP_LEVEL_CLASS, TypeMetrics,
};
use tracing::debug;

use crate::class::{ClassMetrics, declared_attributes};

/// File-local package aggregates of one unit.
pub fn package_metrics(unit: &SourceUnit) -> PackageMetrics {
    let functions = unit.functions().filter(|f| !is_accessor(&f.name)).count();
    let methods: usize = unit
        .classes()
        .map(|c| c.methods().filter(|m| !is_accessor(&m.name)).count())
        .sum();

    PackageMetrics {
        nomnamm: functions + methods,
        noi: unit.interfaces().count(),
        loc: unit.text.matches('\n').count() + 1,
    }
}

/// Names a call can couple to: non-accessor top-level functions and
/// non-accessor methods declared directly in a class body.
///
/// Functions inside companion or nested objects are not part of the set.
pub fn known_names(unit: &SourceUnit) -> BTreeSet<String> {
    unit.functions()
        .chain(unit.classes().flat_map(|c| c.methods()))
        .map(|f| f.name.as_str())
        .filter(|name| !is_accessor(name))
        .map(str::to_string)
        .collect()
}

/// Turn one parse result into rows.
///
/// A parse failure becomes a single [`MetricRow::Failed`]; a unit that
/// yields no method or function records becomes a single "None" sentinel
/// carrying the package aggregates.
pub fn process_unit(
    context: &str,
    parsed: Result<&SourceUnit, &ParseError>,
    settings: &AnalysisSettings,
) -> Vec<MetricRow> {
    let unit = match parsed {
        Ok(unit) => unit,
        Err(err) => {
            return vec![MetricRow::Failed(FailedUnit {
                context: context.to_string(),
                message: err.to_string(),
            })];
        }
    };

    let package = package_metrics(unit);
    let names = known_names(unit);
    let mut rows = Vec::new();

    for decl in &unit.declarations {
        match decl {
            Declaration::Class(class) => {
                let aggregate = ClassMetrics::compute(class);
                debug!(
                    class = %class.name,
                    noav_class = aggregate.noav_class,
                    loc_type = aggregate.loc_type,
                    "class aggregated"
                );
                let declared = declared_attributes(class);
                let type_metrics = aggregate.type_metrics();

                let methods: Vec<&FunctionDecl> = class.methods().collect();
                let scanned: Vec<MethodMetrics> = methods
                    .iter()
                    .map(|m| scan_body(m, &names, &declared, settings.noav))
                    .collect();
                let ccs: Vec<usize> = scanned.iter().map(|s| s.cc).collect();

                for ((method, mut metrics), weight) in methods.iter().zip(scanned).zip(woc(&ccs)) {
                    metrics.woc = weight;
                    rows.push(MetricRow::Record(MetricRecord {
                        package: unit.package.clone(),
                        class: class.name.clone(),
                        method: method.name.clone(),
                        metrics,
                        type_metrics,
                        package_metrics: package,
                        error: None,
                    }));
                }
            }
            Declaration::Function(function) => {
                let mut metrics = scan_body(function, &names, &BTreeSet::new(), settings.noav);
                metrics.woc = top_level_woc(metrics.cc);
                metrics.noav = 0;
                rows.push(MetricRow::Record(MetricRecord {
                    package: unit.package.clone(),
                    class: TOP_LEVEL_CLASS.to_string(),
                    method: function.name.clone(),
                    metrics,
                    type_metrics: TypeMetrics::default(),
                    package_metrics: package,
                    error: None,
                }));
            }
            Declaration::Interface(_) => {}
        }
    }

    if rows.is_empty() {
        debug!(context, "unit has no methods or functions");
        rows.push(MetricRow::Record(MetricRecord::no_declarations(
            &unit.package,
            package,
        )));
    }
    rows
}

/// Method-level scanners over one body; WOC is filled in by the caller.
fn scan_body(
    function: &FunctionDecl,
    names: &BTreeSet<String>,
    declared: &BTreeSet<String>,
    mode: NoavMode,
) -> MethodMetrics {
    let body = function.body.as_deref().unwrap_or("");
    MethodMetrics {
        loc: loc(function.body.as_deref()),
        max_nesting: max_nesting(body),
        cc: cyclomatic(body),
        woc: 0.0,
        mamcl: mamcl(body),
        noav: noav(body, declared, mode),
        cm: coupling(body, names, &function.name),
    }
}
