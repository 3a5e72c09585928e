use comfy_table::{Cell, Table};

use crate::error::{DatecheckError, Result};
use crate::settings::{load_settings, save_settings, settings_path};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let strategy = settings.strategy.as_deref().unwrap_or("(command default)");

    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("reference_date_format"), Cell::new(&settings.reference_date_format)]);
    table.add_row(vec![Cell::new("control_date_format"), Cell::new(&settings.control_date_format)]);
    table.add_row(vec![Cell::new("unmatched_label"), Cell::new(&settings.unmatched_label)]);
    table.add_row(vec![Cell::new("strategy"), Cell::new(strategy)]);
    table.add_row(vec![
        Cell::new("output_headers"),
        Cell::new(settings.output_headers.join(", ")),
    ]);
    for (header, field) in &settings.header_aliases {
        table.add_row(vec![
            Cell::new(format!("alias: {header}")),
            Cell::new(field),
        ]);
    }
    println!("Settings ({})\n{table}", settings_path().display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Set {key} = {value}");
    Ok(())
}

pub fn alias(header: &str, field: &str) -> Result<()> {
    if header.trim().is_empty() {
        return Err(DatecheckError::Settings("Header alias cannot be empty".to_string()));
    }
    let mut settings = load_settings();
    settings.add_alias(header, field)?;
    save_settings(&settings)?;
    println!("Added alias: '{}' \u{2192} {}", header.trim(), field.trim().to_lowercase());
    Ok(())
}
