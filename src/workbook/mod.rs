//! Workbook module - styled multi-sheet Excel reports
//!
//! Two variants share the helpers below: the analysis workbook (summary
//! sheets, pivot, lookup reference, KPI dashboard) and the interactive
//! workbook (indicator selector with live formulas, per-indicator sheets).

mod analysis;
mod interactive;
mod styles;

pub use analysis::AnalysisWorkbook;
pub use interactive::InteractiveWorkbook;

use crate::aggregate::{round2, shares, AggregateError, AggregateGroup};
use crate::data::schema::{AGE_GROUP, GENDER, INDICATOR, PROVINCE, QUARTER, TARGET, VALUE, YEAR};
use crate::data::CleanedDataset;
use polars::prelude::PolarsError;
use rust_xlsxwriter::{Chart, ChartType, Workbook, XlsxError};
use styles::{absolute_range, sheet_ref, Cell, Styles};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Excel error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
}

/// Sheet holding the cleaned rows the live formulas point at.
pub(crate) const DATA_SHEET: &str = "Donnees";

/// Data sheet columns, each exposed as a workbook-level name.
const DATA_COLUMNS: [&str; 8] = [PROVINCE, YEAR, QUARTER, INDICATOR, TARGET, GENDER, AGE_GROUP, VALUE];

/// Write the cleaned rows to the data sheet and define one name per column
/// (`provinces`, `annees`, ..., `Valeur`). Returns the number of rows.
pub(crate) fn write_data_sheet(
    workbook: &mut Workbook,
    styles: &Styles,
    ds: &CleanedDataset,
) -> Result<u32, WorkbookError> {
    let years = ds.years()?;
    let values = ds.values()?;
    let text: Vec<Vec<String>> = [PROVINCE, QUARTER, INDICATOR, TARGET, GENDER, AGE_GROUP]
        .iter()
        .map(|c| ds.strings(c))
        .collect::<Result<_, _>>()?;
    let n = values.len() as u32;

    let sheet = workbook.add_worksheet();
    sheet.set_name(DATA_SHEET)?;
    for (j, header) in DATA_COLUMNS.iter().enumerate() {
        sheet.write_with_format(0, j as u16, *header, &styles.header)?;
    }
    for i in 0..values.len() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, text[0][i].as_str())?;
        sheet.write_number(row, 1, years[i] as f64)?;
        sheet.write_string(row, 2, text[1][i].as_str())?;
        sheet.write_string(row, 3, text[2][i].as_str())?;
        sheet.write_string(row, 4, text[3][i].as_str())?;
        sheet.write_string(row, 5, text[4][i].as_str())?;
        sheet.write_string(row, 6, text[5][i].as_str())?;
        sheet.write_number(row, 7, values[i])?;
    }
    sheet.set_column_width(3, 60)?;
    sheet.set_freeze_panes(1, 0)?;

    if n > 0 {
        for (j, name) in DATA_COLUMNS.iter().enumerate() {
            let range = sheet_ref(DATA_SHEET, &absolute_range(j as u16, 1, n));
            workbook.define_name(*name, &format!("={}", range))?;
        }
    }
    log::debug!("Wrote {} data rows to '{}'", n, DATA_SHEET);
    Ok(n)
}

/// `label, Total, Moyenne, Nb_Records, Pourcentage` rows of a one-dimension group.
pub(crate) fn share_rows(group: &AggregateGroup) -> Vec<Vec<Cell>> {
    shares(group)
        .into_iter()
        .zip(&group.rows)
        .map(|(share, r)| {
            vec![
                Cell::Text(share.label),
                Cell::Number(round2(share.total)),
                Cell::Number(round2(r.mean)),
                Cell::Integer(r.count as f64),
                Cell::Number(share.percent),
            ]
        })
        .collect()
}

/// Chart with a title and a pixel size.
pub(crate) fn titled_chart(kind: ChartType, title: &str, (width, height): (u32, u32)) -> Chart {
    let mut chart = Chart::new(kind);
    chart.title().set_name(title);
    chart.set_width(width).set_height(height);
    chart
}

/// Add a series whose categories and values are single columns of `sheet`
/// over rows `first..=last`.
pub(crate) fn add_column_series(
    chart: &mut Chart,
    sheet: &str,
    name: &str,
    (first, last): (u32, u32),
    (category_col, value_col): (u16, u16),
) {
    chart
        .add_series()
        .set_name(name)
        .set_categories((sheet, first, category_col, last, category_col))
        .set_values((sheet, first, value_col, last, value_col));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::data::fixtures::{dataset, row};
    use crate::data::Dimension;

    #[test]
    fn share_rows_carry_percentages() {
        let ds = dataset(&[
            row("Kinshasa", 2020, "T1", "A", 30.0),
            row("Ituri", 2020, "T1", "A", 10.0),
        ]);
        let group = Aggregator::group_by(&ds, &[Dimension::Province]).unwrap();
        let rows = share_rows(&group);
        assert_eq!(rows[0][0], Cell::text("Kinshasa"));
        assert_eq!(rows[0][4], Cell::Number(75.0));
        assert_eq!(rows[1][4], Cell::Number(25.0));
    }

    #[test]
    fn data_sheet_defines_column_names() {
        let ds = dataset(&[row("Kinshasa", 2020, "T1", "A", 1.0)]);
        let mut workbook = Workbook::new();
        let styles = Styles::new(&crate::config::WorkbookStyle::default());
        assert_eq!(write_data_sheet(&mut workbook, &styles, &ds).unwrap(), 1);
        let bytes = workbook.save_to_buffer().unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }
}
