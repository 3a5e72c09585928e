use std::path::Path;

use tracing::debug;

use crate::error::{DatecheckError, Result};
use crate::models::{Cell, RawTable};

// ---------------------------------------------------------------------------
// Input kinds — enum dispatch on file extension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    Csv,
    #[cfg(feature = "xlsx")]
    Spreadsheet,
}

impl InputKind {
    pub fn detect(path: &Path) -> Option<InputKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub fn load(&self, path: &Path) -> Result<Vec<RawTable>> {
        match self {
            Self::Csv => load_csv(path).map(|t| vec![t]),
            #[cfg(feature = "xlsx")]
            Self::Spreadsheet => load_spreadsheet(path),
        }
    }
}

/// Every sheet of the file, in workbook order. A CSV file is one sheet named
/// after its file stem.
pub fn load_sheets(path: &Path) -> Result<Vec<RawTable>> {
    let kind = InputKind::detect(path)
        .ok_or_else(|| DatecheckError::UnsupportedInput(path.display().to_string()))?;
    let tables = kind.load(path)?;
    debug!(path = %path.display(), sheets = tables.len(), "loaded input");
    Ok(tables)
}

pub fn load_first_sheet(path: &Path) -> Result<RawTable> {
    load_sheets(path)?
        .into_iter()
        .next()
        .ok_or_else(|| DatecheckError::Other(format!("{} contains no sheets", path.display())))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

fn is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut headers = Vec::new();
    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        if i == 0 {
            headers = record.iter().map(|f| f.trim().to_string()).collect();
            continue;
        }
        let row: Vec<Cell> = record.iter().map(|f| Cell::from(f.trim())).collect();
        if !is_blank(&row) {
            rows.push(row);
        }
    }
    Ok(RawTable::new(file_stem(path), headers, rows))
}

// ---------------------------------------------------------------------------
// Spreadsheets (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn load_spreadsheet(path: &Path) -> Result<Vec<RawTable>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(names.len());

    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let mut rows_iter = range.rows();
        let headers: Vec<String> = rows_iter
            .next()
            .map(|r| r.iter().map(|c| convert_cell(c).as_text()).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<Cell>> = rows_iter
            .map(|r| r.iter().map(convert_cell).collect::<Vec<_>>())
            .filter(|r| !is_blank(r))
            .collect();
        tables.push(RawTable::new(name, headers, rows));
    }
    Ok(tables)
}

#[cfg(feature = "xlsx")]
fn convert_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;

    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.trim()),
        // Numeric identifiers: integers without decimals
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Cell::Text(format!("{}", *f as i64)),
        Data::Float(f) => Cell::Text(f.to_string()),
        Data::Int(i) => Cell::Text(i.to_string()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match crate::dates::excel_serial_to_date(dt.as_f64()) {
            Some(date) => Cell::Date(date),
            None => Cell::Text(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|prefix| chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}
