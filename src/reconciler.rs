use crate::dates::{parse_date_column, DateFormat};
use crate::error::Result;
use crate::matcher::{Matcher, Strategy};
use crate::models::{
    ControlPeriod, ControlRecord, ControlSheet, Interval, RawTable, ReferenceTable, SheetResult,
};
use crate::schema::{Field, FieldMap, SchemaNormalizer, TableRole};

/// Sheet name used for the single output table of a periods run.
pub const PERIODS_SHEET: &str = "Results";

/// Everything one run needs, owned by the caller and passed in explicitly.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub strategy: Strategy,
    pub reference_format: DateFormat,
    pub control_format: DateFormat,
    pub normalizer: SchemaNormalizer,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            strategy: Strategy::Containment,
            reference_format: DateFormat::Iso,
            control_format: DateFormat::DayMonthYear,
            normalizer: SchemaNormalizer::new(),
        }
    }
}

/// Output of a successful run: one result per control sheet, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub strategy: Strategy,
    pub sheets: Vec<SheetResult>,
}

impl Reconciliation {
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }

    pub fn total_unmatched(&self) -> usize {
        self.sheets.iter().map(SheetResult::unmatched).sum()
    }
}

// ---------------------------------------------------------------------------
// Table parsing
// ---------------------------------------------------------------------------

fn column(map: &FieldMap, field: Field) -> (usize, &str) {
    // map_headers guarantees every required field is present
    let idx = map.index(field).unwrap_or_default();
    (idx, map.source_name(field).unwrap_or(field.key()))
}

fn text_column(table: &RawTable, col: usize) -> Vec<String> {
    (0..table.rows.len())
        .map(|row| table.cell(row, col).as_text())
        .collect()
}

fn date_column(table: &RawTable, map: &FieldMap, field: Field, format: &DateFormat) -> Result<Vec<chrono::NaiveDate>> {
    let (idx, name) = column(map, field);
    parse_date_column(table, idx, name, format)
}

pub fn parse_reference(ctx: &RunContext, table: &RawTable) -> Result<ReferenceTable> {
    let map = ctx
        .normalizer
        .map_headers(&table.headers, TableRole::Reference, &table.name)?;
    let starts = date_column(table, &map, Field::StartDate, &ctx.reference_format)?;
    let ends = date_column(table, &map, Field::EndDate, &ctx.reference_format)?;
    let ids = text_column(table, column(&map, Field::Identifier).0);
    let labels = text_column(table, column(&map, Field::Label).0);

    let intervals = ids
        .into_iter()
        .zip(labels)
        .zip(starts.into_iter().zip(ends))
        .map(|((identifier, label), (start_date, end_date))| Interval {
            identifier,
            start_date,
            end_date,
            label,
        })
        .collect();
    Ok(ReferenceTable { intervals })
}

pub fn parse_control_sheet(ctx: &RunContext, table: &RawTable) -> Result<ControlSheet> {
    let map = ctx
        .normalizer
        .map_headers(&table.headers, TableRole::ControlPoints, &table.name)?;
    let dates = date_column(table, &map, Field::ControlDate, &ctx.control_format)?;
    let ids = text_column(table, column(&map, Field::Identifier).0);

    let records = ids
        .into_iter()
        .zip(dates)
        .map(|(identifier, control_date)| ControlRecord {
            identifier,
            control_date,
        })
        .collect();
    Ok(ControlSheet {
        name: table.name.clone(),
        records,
    })
}

pub fn parse_control_periods(ctx: &RunContext, table: &RawTable) -> Result<Vec<ControlPeriod>> {
    let map = ctx
        .normalizer
        .map_headers(&table.headers, TableRole::ControlPeriods, &table.name)?;
    let starts = date_column(table, &map, Field::StartDate, &ctx.control_format)?;
    let ends = date_column(table, &map, Field::EndDate, &ctx.control_format)?;
    let ids = text_column(table, column(&map, Field::Identifier).0);

    Ok(ids
        .into_iter()
        .zip(starts.into_iter().zip(ends))
        .map(|(identifier, (start_date, end_date))| ControlPeriod {
            identifier,
            start_date,
            end_date,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Reconcile every control sheet against one reference table. All tables are
/// validated before any matching; the first failure aborts the whole run.
pub fn reconcile(ctx: &RunContext, reference: &RawTable, sheets: &[RawTable]) -> Result<Reconciliation> {
    let reference = parse_reference(ctx, reference)?;
    let controls = sheets
        .iter()
        .map(|sheet| parse_control_sheet(ctx, sheet))
        .collect::<Result<Vec<_>>>()?;

    let matcher = Matcher::prepare(ctx.strategy, &reference);
    let sheets = controls
        .iter()
        .map(|sheet| SheetResult {
            sheet: sheet.name.clone(),
            rows: matcher.match_records(&sheet.records),
        })
        .collect();

    Ok(Reconciliation {
        strategy: ctx.strategy,
        sheets,
    })
}

/// Reconcile a range-shaped control table: each period is expanded to one
/// row per day, all written to a single `Results` sheet.
pub fn reconcile_periods(ctx: &RunContext, reference: &RawTable, periods: &RawTable) -> Result<Reconciliation> {
    let reference = parse_reference(ctx, reference)?;
    let periods = parse_control_periods(ctx, periods)?;

    let matcher = Matcher::prepare(ctx.strategy, &reference);
    Ok(Reconciliation {
        strategy: ctx.strategy,
        sheets: vec![SheetResult {
            sheet: PERIODS_SHEET.to_string(),
            rows: matcher.match_periods(&periods),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatecheckError;
    use crate::models::{Cell, Label};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reference() -> RawTable {
        RawTable::from_strings(
            "reference",
            &["Matricule", "Début", "Fin", "Libellé"],
            &[
                &["7", "2024-01-01", "2024-01-05", "training"],
                &["1", "2024-03-01", "2024-03-10", "A"],
                &["1", "2024-03-05", "2024-03-08", "B"],
            ],
        )
    }

    fn sheet(name: &str, rows: &[&[&str]]) -> RawTable {
        RawTable::from_strings(name, &["Matricule", "Date à contrôler"], rows)
    }

    fn labels(result: &SheetResult) -> Vec<String> {
        result
            .rows
            .iter()
            .map(|r| r.label.render("no matching date").to_string())
            .collect()
    }

    #[test]
    fn test_multi_sheet_run() {
        let ctx = RunContext::default();
        let sheets = vec![
            sheet("Team A", &[&["7", "03/01/2024"], &["7", "06/01/2024"], &["99", "03/01/2024"]]),
            sheet("Team B", &[&["1", "06/03/2024"]]),
        ];
        let result = reconcile(&ctx, &reference(), &sheets).unwrap();
        assert_eq!(result.sheets.len(), 2);
        assert_eq!(result.sheets[0].sheet, "Team A");
        assert_eq!(
            labels(&result.sheets[0]),
            vec!["training", "no matching date", "no matching date"]
        );
        assert_eq!(result.sheets[1].sheet, "Team B");
        assert_eq!(labels(&result.sheets[1]), vec!["A"]);
        assert_eq!(result.total_rows(), 4);
        assert_eq!(result.total_unmatched(), 2);
    }

    #[test]
    fn test_strategies_produce_identical_output() {
        let sheets = vec![sheet(
            "S",
            &[&["7", "01/01/2024"], &["7", "05/01/2024"], &["1", "09/03/2024"], &["1", "11/03/2024"]],
        )];
        let containment = RunContext::default();
        let calendar = RunContext {
            strategy: Strategy::Calendar,
            ..RunContext::default()
        };
        let a = reconcile(&containment, &reference(), &sheets).unwrap();
        let b = reconcile(&calendar, &reference(), &sheets).unwrap();
        assert_eq!(a.sheets, b.sheets);
    }

    #[test]
    fn test_bad_date_in_later_sheet_aborts_run() {
        let ctx = RunContext::default();
        let sheets = vec![
            sheet("Good", &[&["7", "03/01/2024"]]),
            sheet("Bad", &[&["7", "31/13/2024"]]),
        ];
        let err = reconcile(&ctx, &reference(), &sheets).unwrap_err();
        match err {
            DatecheckError::DateFormat { sheet, column, .. } => {
                assert_eq!(sheet, "Bad");
                assert_eq!(column, "Date à contrôler");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_reference_column_aborts_run() {
        let ctx = RunContext::default();
        let reference = RawTable::from_strings(
            "reference",
            &["Matricule", "Début", "Libellé"],
            &[&["7", "2024-01-01", "training"]],
        );
        let err = reconcile(&ctx, &reference, &[sheet("S", &[&["7", "03/01/2024"]])]).unwrap_err();
        assert!(matches!(
            err,
            DatecheckError::Schema { ref sheet, ref missing_field } if sheet == "reference" && missing_field == "end_date"
        ));
    }

    #[test]
    fn test_reference_uses_its_own_format() {
        let ctx = RunContext::default();
        let reference = RawTable::from_strings(
            "reference",
            &["matricule", "début", "fin", "libellé"],
            &[&["7", "01/01/2024", "2024-01-05", "x"]],
        );
        let err = reconcile(&ctx, &reference, &[]).unwrap_err();
        assert!(matches!(err, DatecheckError::DateFormat { ref column, .. } if column == "début"));
    }

    #[test]
    fn test_typed_date_cells_accepted() {
        let ctx = RunContext::default();
        let control = RawTable::new(
            "S",
            vec!["id".into(), "control_date".into()],
            vec![vec![Cell::Text("7".into()), Cell::Date(d(2024, 1, 2))]],
        );
        let result = reconcile(&ctx, &reference(), &[control]).unwrap();
        assert_eq!(result.sheets[0].rows[0].label, Label::Matched("training".into()));
    }

    #[test]
    fn test_periods_run_expands_days() {
        let periods = RawTable::from_strings(
            "periods",
            &["Matricule", "Date de début", "Date de fin"],
            &[&["7", "04/01/2024", "06/01/2024"], &["1", "10/03/2024", "09/03/2024"]],
        );
        for strategy in [Strategy::Containment, Strategy::Calendar] {
            let ctx = RunContext {
                strategy,
                ..RunContext::default()
            };
            let result = reconcile_periods(&ctx, &reference(), &periods).unwrap();
            assert_eq!(result.sheets.len(), 1);
            assert_eq!(result.sheets[0].sheet, PERIODS_SHEET);
            assert_eq!(
                labels(&result.sheets[0]),
                vec!["training", "training", "no matching date"]
            );
            assert_eq!(result.sheets[0].rows[2].control_date, d(2024, 1, 6));
        }
    }

    #[test]
    fn test_blank_identifiers_do_not_join() {
        let reference = RawTable::from_strings(
            "reference",
            &["Matricule", "Début", "Fin", "Libellé"],
            &[&["", "2024-01-01", "2024-01-31", "orphan"]],
        );
        let sheets = vec![sheet("S", &[&["", "03/01/2024"]])];
        for strategy in [Strategy::Containment, Strategy::Calendar] {
            let ctx = RunContext {
                strategy,
                ..RunContext::default()
            };
            let result = reconcile(&ctx, &reference, &sheets).unwrap();
            assert_eq!(result.sheets[0].rows[0].label, Label::Unmatched);
        }
    }

    #[test]
    fn test_run_is_repeatable() {
        let ctx = RunContext::default();
        let sheets = vec![sheet("S", &[&["1", "06/03/2024"], &["7", "02/01/2024"]])];
        let first = reconcile(&ctx, &reference(), &sheets).unwrap();
        let second = reconcile(&ctx, &reference(), &sheets).unwrap();
        assert_eq!(first, second);
    }
}
