//! Package Reconciler and the NOAV merge post-pass.

use std::collections::BTreeMap;

use ktmetrics_syntax::SourceUnit;
use ktmetrics_types::{MetricRow, PackageMetrics};

use crate::unit::package_metrics;

/// Package aggregates summed over every unit sharing a package identifier.
pub fn package_totals<'a>(
    units: impl IntoIterator<Item = &'a SourceUnit>,
) -> BTreeMap<String, PackageMetrics> {
    let mut totals: BTreeMap<String, PackageMetrics> = BTreeMap::new();
    for unit in units {
        let local = package_metrics(unit);
        let entry = totals.entry(unit.package.clone()).or_default();
        entry.nomnamm += local.nomnamm;
        entry.noi += local.noi;
        entry.loc += local.loc;
    }
    totals
}

/// Overwrite the package columns of every record with the package-wide
/// aggregates. Failed rows are left alone. Running this twice over the same
/// units gives the same rows.
pub fn reconcile_packages<'a>(
    units: impl IntoIterator<Item = &'a SourceUnit>,
    rows: &mut [MetricRow],
) -> BTreeMap<String, PackageMetrics> {
    let totals = package_totals(units);
    for record in rows.iter_mut().filter_map(MetricRow::as_record_mut) {
        if let Some(pm) = totals.get(&record.package) {
            record.package_metrics = *pm;
        }
    }
    totals
}

/// Replace each record's NOAV with the sum of NOAV over all records that
/// share its method name.
pub fn merge_noav_by_name(rows: &mut [MetricRow]) {
    let mut sums: BTreeMap<String, usize> = BTreeMap::new();
    for record in rows.iter().filter_map(MetricRow::as_record) {
        *sums.entry(record.method.clone()).or_default() += record.metrics.noav;
    }
    for record in rows.iter_mut().filter_map(MetricRow::as_record_mut) {
        if let Some(sum) = sums.get(&record.method) {
            record.metrics.noav = *sum;
        }
    }
}
