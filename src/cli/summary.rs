use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::fmt::percent;
use crate::reconciler::Reconciliation;

pub fn print(reconciliation: &Reconciliation) {
    let mut table = Table::new();
    table.set_header(vec!["Sheet", "Rows", "Matched", "Unmatched", "Matched %"]);
    for sheet in &reconciliation.sheets {
        let unmatched = sheet.unmatched();
        let unmatched_cell = if unmatched > 0 {
            Cell::new(unmatched.to_string().yellow())
        } else {
            Cell::new(unmatched)
        };
        table.add_row(vec![
            Cell::new(&sheet.sheet),
            Cell::new(sheet.rows.len()),
            Cell::new(sheet.matched()),
            unmatched_cell,
            Cell::new(percent(sheet.matched(), sheet.rows.len())),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(reconciliation.total_rows()),
        Cell::new(reconciliation.total_rows() - reconciliation.total_unmatched()),
        Cell::new(reconciliation.total_unmatched()),
        Cell::new(""),
    ]);
    println!("{} ({})\n{table}", "Reconciliation".bold(), reconciliation.strategy.name());
}
