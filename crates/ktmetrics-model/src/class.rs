//! Class Aggregator: per-type metrics folded from a class's members.

use std::collections::BTreeSet;

use ktmetrics_scan::{coupling, is_accessor, loc};
use ktmetrics_syntax::{ClassDecl, FunctionDecl};
use ktmetrics_types::TypeMetrics;

/// Type-level metrics for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassMetrics {
    /// LOC of the class's full source text.
    pub loc_type: usize,
    /// Summed LOC of the direct non-accessor methods.
    pub locnamm: usize,
    /// Share of direct non-accessor methods that call another one.
    pub cfnamm: f64,
    /// Properties declared directly on the class body.
    pub noav_class: usize,
}

impl ClassMetrics {
    pub fn compute(class: &ClassDecl) -> Self {
        let namm: Vec<&FunctionDecl> = class.methods().filter(|m| !is_accessor(&m.name)).collect();

        Self {
            loc_type: loc(Some(&class.text)),
            locnamm: namm.iter().map(|m| loc(m.body.as_deref())).sum(),
            cfnamm: coupling_factor(&namm),
            noav_class: class.properties().count(),
        }
    }

    /// The exported subset; `noav_class` has no column.
    pub fn type_metrics(&self) -> TypeMetrics {
        TypeMetrics {
            loc: self.loc_type,
            locnamm: self.locnamm,
            cfnamm: self.cfnamm,
        }
    }
}

fn coupling_factor(namm: &[&FunctionDecl]) -> f64 {
    if namm.is_empty() {
        return 0.0;
    }
    let names: BTreeSet<String> = namm.iter().map(|m| m.name.clone()).collect();
    let coupled = namm
        .iter()
        .filter(|m| {
            m.body
                .as_deref()
                .is_some_and(|body| coupling(body, &names, &m.name) > 0)
        })
        .count();
    coupled as f64 / namm.len() as f64
}

/// Attribute names visible to a class's methods: its own properties plus
/// those of directly nested objects (companion included).
pub fn declared_attributes(class: &ClassDecl) -> BTreeSet<String> {
    class
        .properties()
        .chain(class.objects().flat_map(|o| o.properties()))
        .map(|p| p.name.clone())
        .collect()
}
