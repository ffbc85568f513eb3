//! Totalizer.

use ktmetrics_types::{MetricRow, MetricTotals};

/// Column sums over all rows, computed on the exported cell values so an
/// "Error" LOC sentinel counts as 0.
pub fn totalize(rows: &[MetricRow]) -> MetricTotals {
    rows.iter()
        .map(MetricRow::to_flat)
        .fold(MetricTotals::default(), |mut t, row| {
            t.loc += row.loc.as_count();
            t.max_nesting += row.max_nesting;
            t.cc += row.cc;
            t.woc += row.woc;
            t.mamcl += row.mamcl;
            t.noav += row.noav;
            t.cm += row.cm;
            t.loc_type += row.loc_type;
            t.locnamm_type += row.locnamm_type;
            t.cfnamm_type += row.cfnamm_type;
            t.nomnamm_package += row.nomnamm_package;
            t.noi_package += row.noi_package;
            t.loc_package += row.loc_package;
            t
        })
}
