pub mod check;
pub mod config;
pub mod periods;
pub mod summary;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::settings::RunOverrides;

#[derive(Parser)]
#[command(
    name = "datecheck",
    about = "Check control dates against per-identifier validity intervals."
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every control date of every sheet of a control workbook.
    Check {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Expand range-shaped control rows into days and classify each day.
    Periods {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Reference table (identifier, start, end, label)
    pub reference: PathBuf,
    /// Control file (CSV, or a workbook whose sheets are all checked)
    pub control: PathBuf,
    /// Output path: .xlsx workbook, or a directory of CSV files
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Matching strategy: containment, calendar
    #[arg(long)]
    pub strategy: Option<String>,
    /// Date format of the reference table (iso, dmy, or a strftime pattern)
    #[arg(long = "reference-format")]
    pub reference_format: Option<String>,
    /// Date format of the control file (iso, dmy, or a strftime pattern)
    #[arg(long = "control-format")]
    pub control_format: Option<String>,
}

impl RunArgs {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            strategy: self.strategy.clone(),
            reference_format: self.reference_format.clone(),
            control_format: self.control_format.clone(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.control))
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Set a setting: reference_date_format, control_date_format, unmatched_label, strategy
    Set {
        key: String,
        value: String,
    },
    /// Map an extra header spelling onto a field (identifier, start_date,
    /// end_date, label, control_date).
    Alias {
        header: String,
        field: String,
    },
}

/// `output_<control stem>.xlsx` beside the control file.
pub(crate) fn default_output_path(control: &Path) -> PathBuf {
    let stem = control
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("control");
    let name = if cfg!(feature = "xlsx") {
        format!("output_{stem}.xlsx")
    } else {
        format!("output_{stem}")
    };
    control.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("/data/june.xlsx"));
        #[cfg(feature = "xlsx")]
        assert_eq!(path, PathBuf::from("/data/output_june.xlsx"));
        #[cfg(not(feature = "xlsx"))]
        assert_eq!(path, PathBuf::from("/data/output_june"));
    }

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "datecheck", "-v", "check", "ref.csv", "ctl.csv", "--strategy", "calendar",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Check { run } => {
                assert_eq!(run.reference, PathBuf::from("ref.csv"));
                assert_eq!(run.overrides().strategy.as_deref(), Some("calendar"));
                assert_eq!(run.output_path(), default_output_path(Path::new("ctl.csv")));
            }
            _ => panic!("expected check"),
        }
    }
}
