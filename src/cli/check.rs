use tracing::info;

use crate::cli::{summary, RunArgs};
use crate::error::Result;
use crate::loader::{load_first_sheet, load_sheets};
use crate::matcher::Strategy;
use crate::reconciler::reconcile;
use crate::settings::load_settings;
use crate::writer::write_reconciliation;

pub fn run(args: &RunArgs) -> Result<()> {
    let settings = load_settings();
    let ctx = settings.run_context(&args.overrides(), Strategy::Containment)?;

    let reference = load_first_sheet(&args.reference)?;
    let sheets = load_sheets(&args.control)?;
    info!(
        reference = %args.reference.display(),
        intervals = reference.rows.len(),
        sheets = sheets.len(),
        strategy = ctx.strategy.key(),
        "checking control dates"
    );

    let reconciliation = reconcile(&ctx, &reference, &sheets)?;

    let output = args.output_path();
    let options = settings.output_options(&ctx.control_format);
    let written = write_reconciliation(&reconciliation, &output, &options)?;

    summary::print(&reconciliation);
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
