//! CSV export of the cleaned dataset and derived tables.
//!
//! Every file is UTF-8 with a byte-order mark so spreadsheet tools pick up
//! the accented province and indicator names.

use crate::aggregate::{round2, AggregateError, Aggregator};
use crate::cascade::CascadeIndicators;
use crate::data::schema::{PROVINCE, YEAR};
use crate::data::{CleanedDataset, Dimension};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct CsvExporter;

impl CsvExporter {
    /// Cleaned rows plus the `period` column. Returns the row count.
    pub fn cleaned(ds: &CleanedDataset, path: &Path) -> Result<usize, ExportError> {
        let mut df = ds.with_period()?;
        write_frame(&mut df, path)
    }

    /// Total, mean and count of `Valeur` per province and year, rounded to
    /// two decimals.
    pub fn province_year_summary(ds: &CleanedDataset, path: &Path) -> Result<usize, ExportError> {
        let mut df = province_year_frame(ds)?;
        write_frame(&mut df, path)
    }

    /// Rows of the four cascade indicators only.
    pub fn cascade_rows(
        ds: &CleanedDataset,
        indicators: &CascadeIndicators,
        path: &Path,
    ) -> Result<usize, ExportError> {
        let cascade = ds.filter_indicators(&indicators.names())?;
        if cascade.is_empty() {
            log::warn!("No cascade indicator rows, {} has headers only", path.display());
        }
        let mut df = cascade.frame().clone();
        write_frame(&mut df, path)
    }
}

fn province_year_frame(ds: &CleanedDataset) -> Result<DataFrame, ExportError> {
    let group = Aggregator::group_by(ds, &[Dimension::Province, Dimension::Year])?.sorted_by_key();
    let provinces: Vec<String> = group.rows.iter().map(|r| r.keys[0].clone()).collect();
    let years: Vec<i64> = group
        .rows
        .iter()
        .map(|r| r.keys[1].parse().unwrap_or_default())
        .collect();
    let totals: Vec<f64> = group.rows.iter().map(|r| round2(r.sum)).collect();
    let averages: Vec<f64> = group.rows.iter().map(|r| round2(r.mean)).collect();
    let counts: Vec<u32> = group.rows.iter().map(|r| r.count as u32).collect();

    let df = df!(
        PROVINCE => provinces,
        YEAR => years,
        "Total" => totals,
        "Average" => averages,
        "Count" => counts,
    )?;
    Ok(df)
}

fn write_frame(df: &mut DataFrame, path: &Path) -> Result<usize, ExportError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_bom(true)
        .include_header(true)
        .finish(df)?;
    log::info!("Exported {} rows to {}", df.height(), path.display());
    Ok(df.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset, row};

    const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

    fn sample() -> CleanedDataset {
        dataset(&[
            row("Kinshasa", 2020, "T1", "Nombre de clients testés", 10.0),
            row("Kinshasa", 2020, "T2", "Nombre de clients testés", 5.0),
            row("Ituri", 2021, "T1", "Autre", 1.0),
        ])
    }

    fn first_line(path: &Path) -> String {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        text.lines().next().unwrap().to_string()
    }

    #[test]
    fn cleaned_export_has_bom_and_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");
        assert_eq!(CsvExporter::cleaned(&sample(), &path).unwrap(), 3);
        let header = first_line(&path);
        assert!(header.starts_with("provinces,annees,trimestres"));
        assert!(header.ends_with("period"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("2020-T1"));
    }

    #[test]
    fn summary_sums_per_province_and_year() {
        let df = province_year_frame(&sample()).unwrap();
        assert_eq!(df.height(), 2);
        let totals: Vec<Option<f64>> = df.column("Total").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(totals, vec![Some(1.0), Some(15.0)]);
        let averages: Vec<Option<f64>> = df.column("Average").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(averages, vec![Some(1.0), Some(7.5)]);
        let provinces: Vec<Option<&str>> = df.column(PROVINCE).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(provinces, vec![Some("Ituri"), Some("Kinshasa")]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        CsvExporter::province_year_summary(&sample(), &path).unwrap();
        assert_eq!(first_line(&path), "provinces,annees,Total,Average,Count");
    }

    #[test]
    fn cascade_export_keeps_only_cascade_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cascade.csv");
        let n = CsvExporter::cascade_rows(&sample(), &CascadeIndicators::default(), &path).unwrap();
        assert_eq!(n, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("Autre"));
    }
}
