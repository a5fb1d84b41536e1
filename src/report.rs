//! Machine-readable summary of one analysis run.

use crate::aggregate::GrowthPoint;
use crate::cascade::CascadeRecord;
use crate::data::schema::{INDICATOR, PROVINCE};
use crate::data::{CleaningReport, DatasetProfile, MissingColumn};
use crate::export::ExportError;
use crate::stats::{ChiSquareTest, DescriptiveStats, NormalityTest, TTest};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub rows_after_cleaning: usize,
    pub provinces: usize,
    pub indicators: usize,
    pub first_year: Option<i64>,
    pub last_year: Option<i64>,
    pub unique_counts: Vec<(String, usize)>,
}

impl DatasetOverview {
    pub fn new(
        profile: &DatasetProfile,
        rows_after_cleaning: usize,
        year_span: Option<(i64, i64)>,
    ) -> Self {
        Self {
            rows: profile.rows,
            columns: profile.columns,
            rows_after_cleaning,
            provinces: profile.unique_count(PROVINCE),
            indicators: profile.unique_count(INDICATOR),
            first_year: year_span.map(|(first, _)| first),
            last_year: year_span.map(|(_, last)| last),
            unique_counts: profile.unique_counts.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutlierCounts {
    pub iqr: usize,
    pub iqr_percent: f64,
    pub zscore: usize,
    pub zscore_percent: f64,
}

/// Headline results. Statistics that were skipped stay `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyFindings {
    pub total_value: f64,
    pub top_province: Option<(String, f64)>,
    pub summary: Option<DescriptiveStats>,
    pub outliers: Option<OutlierCounts>,
    pub normality: Option<NormalityTest>,
    pub gender_t_test: Option<TTest>,
    pub province_gender_chi_square: Option<ChiSquareTest>,
    pub yearly_growth: Vec<GrowthPoint>,
    pub cascade: Option<CascadeRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub overview: DatasetOverview,
    pub missing_before_cleaning: Vec<MissingColumn>,
    pub cleaning: CleaningReport,
    pub key_findings: KeyFindings,
    pub files: Vec<PathBuf>,
}

impl AnalysisReport {
    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        log::info!("Report saved: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DatasetProfile {
        DatasetProfile {
            rows: 10,
            columns: 8,
            unique_counts: vec![(PROVINCE.to_string(), 3), (INDICATOR.to_string(), 4)],
            missing: vec![MissingColumn {
                column: "sexes".to_string(),
                count: 2,
                percent: 20.0,
            }],
        }
    }

    #[test]
    fn overview_reads_profile_counts() {
        let overview = DatasetOverview::new(&profile(), 9, Some((2019, 2024)));
        assert_eq!(overview.provinces, 3);
        assert_eq!(overview.indicators, 4);
        assert_eq!(overview.first_year, Some(2019));
        assert_eq!(overview.last_year, Some(2024));
    }

    #[test]
    fn report_is_written_as_json() {
        let p = profile();
        let report = AnalysisReport {
            overview: DatasetOverview::new(&p, 9, None),
            missing_before_cleaning: p.missing.clone(),
            cleaning: CleaningReport::default(),
            key_findings: KeyFindings {
                total_value: 42.0,
                top_province: Some(("Kinshasa".to_string(), 30.0)),
                ..Default::default()
            },
            files: vec![PathBuf::from("charts/01_value_distribution.png")],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["overview"]["rows_after_cleaning"], 9);
        assert_eq!(parsed["key_findings"]["total_value"], 42.0);
        assert_eq!(parsed["key_findings"]["top_province"][0], "Kinshasa");
        assert!(parsed["key_findings"]["normality"].is_null());
        assert_eq!(parsed["missing_before_cleaning"][0]["column"], "sexes");
    }
}
