use std::collections::HashMap;

use crate::models::{Interval, ReferenceTable};

/// Reference intervals grouped by identifier, each group in source order.
#[derive(Debug, Default)]
pub struct IntervalIndex<'a> {
    groups: HashMap<&'a str, Vec<&'a Interval>>,
}

impl<'a> IntervalIndex<'a> {
    pub fn build(reference: &'a ReferenceTable) -> Self {
        let mut groups: HashMap<&'a str, Vec<&'a Interval>> = HashMap::new();
        for interval in &reference.intervals {
            groups
                .entry(interval.identifier.as_str())
                .or_default()
                .push(interval);
        }
        Self { groups }
    }

    /// Intervals for `identifier`; empty when the identifier is unknown.
    pub fn intervals_for(&self, identifier: &str) -> &[&'a Interval] {
        self.groups.get(identifier).map(Vec::as_slice).unwrap_or(&[])
    }

    #[allow(dead_code)]
    pub fn identifier_count(&self) -> usize {
        self.groups.len()
    }
}
