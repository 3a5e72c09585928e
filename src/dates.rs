use chrono::NaiveDate;

use crate::error::{DatecheckError, Result};
use crate::models::{Cell, RawTable};

/// Expected textual format of a date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat {
    /// `2024-01-31`, used by reference exports.
    Iso,
    /// `31/01/2024`, the display format of control sheets.
    DayMonthYear,
    /// Any other chrono `strftime` pattern.
    Custom(String),
}

impl DateFormat {
    /// Accepts `iso`, `dmy`, or a raw chrono pattern.
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "iso" | "%Y-%m-%d" => Self::Iso,
            "dmy" | "%d/%m/%Y" => Self::DayMonthYear,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            Self::Iso => "%Y-%m-%d",
            Self::DayMonthYear => "%d/%m/%Y",
            Self::Custom(p) => p,
        }
    }

    /// Strict parse under this format; no guessing.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), self.pattern()).ok()
    }

    /// Fails when the pattern cannot render a bare calendar date, e.g. it
    /// carries time fields or an unknown specifier.
    pub fn validate(&self) -> Result<()> {
        use std::fmt::Write;

        let mut rendered = String::new();
        let sample = NaiveDate::from_ymd_opt(2000, 1, 31).unwrap_or_default();
        write!(rendered, "{}", sample.format(self.pattern())).map_err(|_| {
            DatecheckError::Settings(format!(
                "Date format '{}' cannot be used for plain dates",
                self.pattern()
            ))
        })
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }

    /// Typed date cells pass through whatever the expected format is.
    pub fn parse_cell(&self, cell: &Cell) -> Option<NaiveDate> {
        match cell {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => self.parse(s),
            Cell::Empty => None,
        }
    }
}

/// Parse one whole column. Any unparsable cell rejects the column; the error
/// names the sheet, the source column, and the first offending cell.
pub fn parse_date_column(
    table: &RawTable,
    col: usize,
    column_name: &str,
    format: &DateFormat,
) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(table.rows.len());
    let mut first_bad: Option<(usize, String)> = None;
    let mut bad = 0usize;

    for row in 0..table.rows.len() {
        let cell = table.cell(row, col);
        match format.parse_cell(cell) {
            Some(date) => dates.push(date),
            None => {
                bad += 1;
                if first_bad.is_none() {
                    first_bad = Some((row + 1, cell.as_text()));
                }
            }
        }
    }

    match first_bad {
        None => Ok(dates),
        Some((row, value)) => Err(DatecheckError::DateFormat {
            sheet: table.name.clone(),
            column: column_name.to_string(),
            expected: format.pattern().to_string(),
            count: bad,
            row,
            value,
        }),
    }
}

/// Every date from `start` to `end` inclusive; empty when `start > end`.
pub fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Excel serial day number to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::TimeDelta::try_days(serial.floor() as i64)?)
}
