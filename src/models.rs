use chrono::NaiveDate;

/// One cell of a loaded sheet, before any normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    /// A cell the source container already typed as a date.
    Date(NaiveDate),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Date(_) => false,
        }
    }

    /// Text form of the cell as it would appear to a reader of the sheet.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// A named sheet of header strings and raw cells, as handed over by a loader.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    #[cfg(test)]
    pub fn from_strings(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        }
    }

    /// Cell at `(row, col)`; short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(EMPTY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub identifier: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub label: String,
}

impl Interval {
    /// Closed-range containment. An interval with `start_date > end_date`
    /// contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Reference intervals in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    pub intervals: Vec<Interval>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRecord {
    pub identifier: String,
    pub control_date: NaiveDate,
}

/// Range-shaped control row, expanded to one control date per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPeriod {
    pub identifier: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSheet {
    pub name: String,
    pub records: Vec<ControlRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Matched(String),
    Unmatched,
}

impl Label {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Text written for this label, with `sentinel` standing in for an unmatched date.
    pub fn render<'a>(&'a self, sentinel: &'a str) -> &'a str {
        match self {
            Self::Matched(label) => label.as_str(),
            Self::Unmatched => sentinel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub identifier: String,
    pub control_date: NaiveDate,
    pub label: Label,
}

/// Classification of one control sheet, tagged with the sheet's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetResult {
    pub sheet: String,
    pub rows: Vec<MatchResult>,
}

impl SheetResult {
    pub fn matched(&self) -> usize {
        self.rows.iter().filter(|r| r.label.is_matched()).count()
    }

    pub fn unmatched(&self) -> usize {
        self.rows.len() - self.matched()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_interval_contains_is_inclusive() {
        let iv = Interval {
            identifier: "7".into(),
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 5),
            label: "training".into(),
        };
        assert!(iv.contains(d(2024, 1, 1)));
        assert!(iv.contains(d(2024, 1, 3)));
        assert!(iv.contains(d(2024, 1, 5)));
        assert!(!iv.contains(d(2024, 1, 6)));
        assert!(!iv.contains(d(2023, 12, 31)));
    }

    #[test]
    fn test_inverted_interval_contains_nothing() {
        let iv = Interval {
            identifier: "1".into(),
            start_date: d(2024, 1, 5),
            end_date: d(2024, 1, 1),
            label: "x".into(),
        };
        assert!(!iv.contains(d(2024, 1, 3)));
        assert!(!iv.contains(d(2024, 1, 5)));
    }

    #[test]
    fn test_label_render_uses_sentinel() {
        assert_eq!(Label::Matched("A".into()).render("none"), "A");
        assert_eq!(Label::Unmatched.render("none"), "none");
    }

    #[test]
    fn test_sheet_result_counts() {
        let row = |label| MatchResult {
            identifier: "1".into(),
            control_date: d(2024, 1, 1),
            label,
        };
        let result = SheetResult {
            sheet: "S".into(),
            rows: vec![row(Label::Matched("A".into())), row(Label::Unmatched), row(Label::Unmatched)],
        };
        assert_eq!(result.matched(), 1);
        assert_eq!(result.unmatched(), 2);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = RawTable::from_strings("S", &["a", "b"], &[&["x"]]);
        assert_eq!(table.cell(0, 0), &Cell::Text("x".into()));
        assert_eq!(table.cell(0, 1), &Cell::Empty);
        assert_eq!(table.cell(5, 0), &Cell::Empty);
    }
}
