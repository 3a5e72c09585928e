use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatecheckError {
    #[error("Sheet '{sheet}' has no column for required field '{missing_field}'")]
    Schema { sheet: String, missing_field: String },

    #[error(
        "Malformed dates in column '{column}' of sheet '{sheet}': {count} cell(s) do not match '{expected}' (first at row {row}: '{value}')"
    )]
    DateFormat {
        sheet: String,
        column: String,
        expected: String,
        count: usize,
        row: usize,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[cfg(feature = "xlsx")]
    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unsupported input file: {0}")]
    UnsupportedInput(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DatecheckError>;
