use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dates::DateFormat;
use crate::error::Result;
use crate::models::SheetResult;
use crate::reconciler::Reconciliation;

/// Excel rejects longer worksheet names.
const MAX_SHEET_NAME: usize = 31;
const DATE_COLUMN_WIDTH: f64 = 18.0;

/// How result rows are rendered on the way out.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Titles for the identifier, control date and label columns.
    pub headers: [String; 3],
    pub unmatched_label: String,
    pub date_format: DateFormat,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            headers: [
                "Identifier".to_string(),
                "Control date".to_string(),
                "Result".to_string(),
            ],
            unmatched_label: "no matching date".to_string(),
            date_format: DateFormat::DayMonthYear,
        }
    }
}

impl OutputOptions {
    fn render_row(&self, sheet: &SheetResult, i: usize) -> [String; 3] {
        let row = &sheet.rows[i];
        [
            row.identifier.clone(),
            self.date_format.format(row.control_date),
            row.label.render(&self.unmatched_label).to_string(),
        ]
    }
}

pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let truncated: String = cleaned.trim().chars().take(MAX_SHEET_NAME).collect();
    // Excel rejects names that begin or end with an apostrophe
    let trimmed = truncated.trim_matches(|c: char| c == '\'' || c.is_whitespace());
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitised names, made unique (case-insensitively) in input order.
pub fn unique_sheet_names(sheets: &[SheetResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let base = sanitize_sheet_name(&sheet.sheet);
        let mut name = base.clone();
        let mut n = 2;
        while !seen.insert(name.to_lowercase()) {
            let suffix = format!("_{n}");
            let keep = MAX_SHEET_NAME - suffix.chars().count();
            name = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
            n += 1;
        }
        names.push(name);
    }
    names
}

/// Write a finished run. `.xlsx` paths get one worksheet per sheet; any
/// other path is a directory receiving one CSV per sheet. Returns the files
/// written.
pub fn write_reconciliation(
    reconciliation: &Reconciliation,
    path: &Path,
    options: &OutputOptions,
) -> Result<Vec<PathBuf>> {
    #[cfg(feature = "xlsx")]
    {
        let is_xlsx = path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            write_xlsx(reconciliation, path, options)?;
            return Ok(vec![path.to_path_buf()]);
        }
    }
    write_csv_dir(reconciliation, path, options)
}

pub fn write_csv_dir(
    reconciliation: &Reconciliation,
    dir: &Path,
    options: &OutputOptions,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let names = unique_sheet_names(&reconciliation.sheets);
    let mut written = Vec::with_capacity(names.len());

    for (sheet, name) in reconciliation.sheets.iter().zip(&names) {
        let path = dir.join(format!("{name}.csv"));
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(&options.headers)?;
        for i in 0..sheet.rows.len() {
            wtr.write_record(options.render_row(sheet, i))?;
        }
        wtr.flush()?;
        debug!(path = %path.display(), rows = sheet.rows.len(), "wrote sheet");
        written.push(path);
    }
    Ok(written)
}

#[cfg(feature = "xlsx")]
pub fn write_xlsx(reconciliation: &Reconciliation, path: &Path, options: &OutputOptions) -> Result<()> {
    use rust_xlsxwriter::{Format, Workbook};

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let names = unique_sheet_names(&reconciliation.sheets);

    for (sheet, name) in reconciliation.sheets.iter().zip(&names) {
        let worksheet = workbook.add_worksheet().set_name(name)?;
        for (col, title) in options.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title, &bold)?;
        }
        for i in 0..sheet.rows.len() {
            let row = (i + 1) as u32;
            for (col, value) in options.render_row(sheet, i).iter().enumerate() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
        worksheet.set_column_width(1, DATE_COLUMN_WIDTH)?;
        debug!(sheet = %name, rows = sheet.rows.len(), "wrote worksheet");
    }

    workbook.save(path)?;
    Ok(())
}
