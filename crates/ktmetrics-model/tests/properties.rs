//! Property-based tests for aggregation invariants.

use std::collections::BTreeMap;

use ktmetrics_model::{SourceFile, analyze, reconcile_packages};
use ktmetrics_settings::AnalysisSettings;
use ktmetrics_syntax::{KotlinParser, SourceParser};
use ktmetrics_types::MetricRow;
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}".prop_map(|s| format!("m{s}"))
}

/// One method body line: plain, a branch, or a chained call.
fn body_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("val t = 1".to_string()),
        Just("if (t > 0) {\n        t()\n    }".to_string()),
        Just("while (ok) {\n    }".to_string()),
        Just("a.b().c()".to_string()),
    ]
}

fn class_source() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        "[a-c]",
        prop::collection::btree_map(ident(), prop::collection::vec(body_line(), 0..4), 1..5),
    )
        .prop_map(|(pkg, methods)| {
            let mut text = format!("package {pkg}\n\nclass K {{\n");
            for (name, lines) in &methods {
                text.push_str(&format!("    fun {name}() {{\n"));
                for l in lines {
                    text.push_str(&format!("    {l}\n"));
                }
                text.push_str("    }\n");
            }
            text.push_str("}\n");
            (text, methods.keys().cloned().collect())
        })
}

proptest! {
    #[test]
    fn woc_sums_to_one_per_class(files in prop::collection::vec(class_source(), 1..4)) {
        let sources: Vec<SourceFile> = files
            .iter()
            .enumerate()
            .map(|(i, (text, _))| SourceFile::new(format!("F{i}.kt"), text.clone()))
            .collect();
        let report = analyze(&sources, &KotlinParser, &AnalysisSettings::default());

        // every file contributes its own K; group by position
        let mut offset = 0;
        for (_, methods) in &files {
            let slice = &report.rows[offset..offset + methods.len()];
            let sum: f64 = slice
                .iter()
                .filter_map(MetricRow::as_record)
                .map(|r| r.metrics.woc)
                .sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
            offset += methods.len();
        }
    }

    #[test]
    fn total_equals_column_sums(files in prop::collection::vec(class_source(), 1..4)) {
        let sources: Vec<SourceFile> = files
            .iter()
            .enumerate()
            .map(|(i, (text, _))| SourceFile::new(format!("F{i}.kt"), text.clone()))
            .collect();
        let report = analyze(&sources, &KotlinParser, &AnalysisSettings::default());
        let total = report.total.expect("non-empty run has a total");

        let flat: Vec<_> = report.rows.iter().map(MetricRow::to_flat).collect();
        prop_assert_eq!(total.loc, flat.iter().map(|r| r.loc.as_count()).sum::<usize>());
        prop_assert_eq!(total.cc, flat.iter().map(|r| r.cc).sum::<usize>());
        prop_assert_eq!(total.max_nesting, flat.iter().map(|r| r.max_nesting).sum::<usize>());
        prop_assert_eq!(total.mamcl, flat.iter().map(|r| r.mamcl).sum::<usize>());
        prop_assert_eq!(total.cm, flat.iter().map(|r| r.cm).sum::<usize>());
        prop_assert_eq!(total.loc_type, flat.iter().map(|r| r.loc_type).sum::<usize>());
        prop_assert_eq!(total.nomnamm_package, flat.iter().map(|r| r.nomnamm_package).sum::<usize>());
        prop_assert_eq!(total.loc_package, flat.iter().map(|r| r.loc_package).sum::<usize>());
    }

    #[test]
    fn package_columns_agree_within_package(files in prop::collection::vec(class_source(), 1..5)) {
        let sources: Vec<SourceFile> = files
            .iter()
            .enumerate()
            .map(|(i, (text, _))| SourceFile::new(format!("F{i}.kt"), text.clone()))
            .collect();
        let report = analyze(&sources, &KotlinParser, &AnalysisSettings::default());

        let mut expected: BTreeMap<String, usize> = BTreeMap::new();
        for (text, methods) in &files {
            let pkg = KotlinParser.parse(text).unwrap().package;
            *expected.entry(pkg).or_default() += methods.len();
        }
        for r in report.rows.iter().filter_map(MetricRow::as_record) {
            prop_assert_eq!(r.package_metrics.nomnamm, expected[&r.package]);
        }
    }

    #[test]
    fn reconciliation_is_idempotent(files in prop::collection::vec(class_source(), 1..4)) {
        let sources: Vec<SourceFile> = files
            .iter()
            .enumerate()
            .map(|(i, (text, _))| SourceFile::new(format!("F{i}.kt"), text.clone()))
            .collect();
        let mut report = analyze(&sources, &KotlinParser, &AnalysisSettings::default());
        let units: Vec<_> = files
            .iter()
            .map(|(text, _)| KotlinParser.parse(text).unwrap())
            .collect();
        let before = report.rows.clone();
        reconcile_packages(&units, &mut report.rows);
        reconcile_packages(&units, &mut report.rows);
        prop_assert_eq!(report.rows, before);
    }

    #[test]
    fn coupling_bounded_by_sibling_count(files in prop::collection::vec(class_source(), 1..2)) {
        let (text, methods) = &files[0];
        let report = analyze(
            &[SourceFile::new("F.kt", text.clone())],
            &KotlinParser,
            &AnalysisSettings::default(),
        );
        for r in report.rows.iter().filter_map(MetricRow::as_record) {
            prop_assert!(r.metrics.cm < methods.len());
            prop_assert!(r.metrics.cc >= 1);
            prop_assert!(r.metrics.loc >= 1);
        }
    }
}
