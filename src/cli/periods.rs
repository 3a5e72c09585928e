use tracing::info;

use crate::cli::{summary, RunArgs};
use crate::error::Result;
use crate::loader::load_first_sheet;
use crate::matcher::Strategy;
use crate::reconciler::reconcile_periods;
use crate::settings::load_settings;
use crate::writer::write_reconciliation;

pub fn run(args: &RunArgs) -> Result<()> {
    let settings = load_settings();
    let ctx = settings.run_context(&args.overrides(), Strategy::Calendar)?;

    let reference = load_first_sheet(&args.reference)?;
    let periods = load_first_sheet(&args.control)?;
    info!(
        reference = %args.reference.display(),
        periods = periods.rows.len(),
        strategy = ctx.strategy.key(),
        "expanding control periods"
    );

    let reconciliation = reconcile_periods(&ctx, &reference, &periods)?;

    let output = args.output_path();
    let options = settings.output_options(&ctx.control_format);
    let written = write_reconciliation(&reconciliation, &output, &options)?;

    summary::print(&reconciliation);
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
