//! # ktmetrics-model
//!
//! **Tier 2 (Aggregation)**
//!
//! Folds scanner output into the final row set: class aggregates, one record
//! per method or function, package-wide reconciliation across units, and the
//! trailing totals.
//!
//! The pipeline has two stages. Stage one is a pure function of one parsed
//! unit and runs in parallel. Stage two needs every unit and runs once.
//!
//! ## What belongs here
//! * Class, unit, package and run-level aggregation
//! * Row ordering and sentinel rows
//!
//! ## What does NOT belong here
//! * Text scanning (use ktmetrics-scan)
//! * File discovery or output rendering

pub mod class;
pub mod pipeline;
pub mod reconcile;
pub mod totals;
pub mod unit;

pub use class::{ClassMetrics, declared_attributes};
pub use pipeline::{NO_SOURCES_MESSAGE, SourceFile, analyze};
pub use reconcile::{merge_noav_by_name, package_totals, reconcile_packages};
pub use totals::totalize;
pub use unit::{known_names, package_metrics, process_unit};
