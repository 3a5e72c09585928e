use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::days;
use crate::index::IntervalIndex;
use crate::models::{ControlPeriod, ControlRecord, Label, MatchResult, ReferenceTable};

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scan the identifier's intervals for one containing the date.
    Containment,
    /// Expand intervals into a per-day calendar and join on (identifier, date).
    Calendar,
}

const ALL_STRATEGIES: &[Strategy] = &[Strategy::Containment, Strategy::Calendar];

impl Strategy {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Containment => "containment",
            Self::Calendar => "calendar",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Containment => "Interval containment",
            Self::Calendar => "Calendar expansion",
        }
    }
}

pub fn get_by_key(key: &str) -> Option<Strategy> {
    let key = key.trim().to_lowercase();
    ALL_STRATEGIES.iter().find(|s| s.key() == key).copied()
}

// ---------------------------------------------------------------------------
// Calendar expansion
// ---------------------------------------------------------------------------

/// Reference table expanded to one label per (identifier, day).
#[derive(Debug, Default)]
pub struct Calendar<'a> {
    days: HashMap<&'a str, HashMap<NaiveDate, &'a str>>,
}

impl<'a> Calendar<'a> {
    /// Intervals are expanded in source order and the first label written for
    /// a given (identifier, day) is kept, so overlapping intervals resolve the
    /// same way as containment.
    pub fn expand(reference: &'a ReferenceTable) -> Self {
        let mut calendar: HashMap<&'a str, HashMap<NaiveDate, &'a str>> = HashMap::new();
        for interval in &reference.intervals {
            let per_day = calendar.entry(interval.identifier.as_str()).or_default();
            for day in days(interval.start_date, interval.end_date) {
                per_day.entry(day).or_insert(interval.label.as_str());
            }
        }
        Self { days: calendar }
    }

    pub fn label_for(&self, identifier: &str, date: NaiveDate) -> Option<&'a str> {
        self.days.get(identifier)?.get(&date).copied()
    }

    /// Number of expanded (identifier, day) rows.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.days.values().map(HashMap::len).sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Prepared matcher
// ---------------------------------------------------------------------------

/// A strategy bound to one run's reference table, shared by every sheet.
#[derive(Debug)]
pub enum Matcher<'a> {
    Containment(IntervalIndex<'a>),
    Calendar(Calendar<'a>),
}

impl<'a> Matcher<'a> {
    pub fn prepare(strategy: Strategy, reference: &'a ReferenceTable) -> Self {
        match strategy {
            Strategy::Containment => Self::Containment(IntervalIndex::build(reference)),
            Strategy::Calendar => Self::Calendar(Calendar::expand(reference)),
        }
    }

    #[allow(dead_code)]
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Containment(_) => Strategy::Containment,
            Self::Calendar(_) => Strategy::Calendar,
        }
    }

    /// A blank identifier never matches, not even a blank reference row.
    pub fn classify(&self, identifier: &str, date: NaiveDate) -> Label {
        if identifier.is_empty() {
            return Label::Unmatched;
        }
        let found = match self {
            Self::Containment(index) => index
                .intervals_for(identifier)
                .iter()
                .find(|interval| interval.contains(date))
                .map(|interval| interval.label.as_str()),
            Self::Calendar(calendar) => calendar.label_for(identifier, date),
        };
        match found {
            Some(label) => Label::Matched(label.to_string()),
            None => Label::Unmatched,
        }
    }

    pub fn match_records(&self, records: &[ControlRecord]) -> Vec<MatchResult> {
        records
            .iter()
            .map(|r| MatchResult {
                identifier: r.identifier.clone(),
                control_date: r.control_date,
                label: self.classify(&r.identifier, r.control_date),
            })
            .collect()
    }

    /// One result per day of each period, in period order then date order.
    pub fn match_periods(&self, periods: &[ControlPeriod]) -> Vec<MatchResult> {
        let mut results = Vec::new();
        for period in periods {
            for day in days(period.start_date, period.end_date) {
                results.push(MatchResult {
                    identifier: period.identifier.clone(),
                    control_date: day,
                    label: self.classify(&period.identifier, day),
                });
            }
        }
        results
    }
}
