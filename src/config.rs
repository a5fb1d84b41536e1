//! Analysis Configuration
//! Explicit settings for every pipeline stage, including presentation styles
//! handed to the chart and workbook renderers.

use crate::cascade::CascadeIndicators;
use crate::stats::DEFAULT_ZSCORE_THRESHOLD;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "vih_analysis.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Chart presentation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub title_size: u32,
    pub label_size: u32,
    pub histogram_bins: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 720,
            font_family: "sans-serif".to_string(),
            title_size: 26,
            label_size: 16,
            histogram_bins: 50,
        }
    }
}

/// Workbook presentation settings. Colours are `0xRRGGBB`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkbookStyle {
    pub accent_color: u32,
    pub header_font_color: u32,
    pub kpi_fill_color: u32,
    pub selector_fill_color: u32,
    pub scale_min_color: u32,
    pub scale_mid_color: u32,
    pub scale_max_color: u32,
    pub period_note: String,
}

impl Default for WorkbookStyle {
    fn default() -> Self {
        Self {
            accent_color: 0x2E75B6,
            header_font_color: 0xFFFFFF,
            kpi_fill_color: 0xE2EFDA,
            selector_fill_color: 0xFFFF00,
            scale_min_color: 0xFFFFFF,
            scale_mid_color: 0xFFC7CE,
            scale_max_color: 0x006400,
            period_note: "Février 2026".to_string(),
        }
    }
}

/// Settings for the whole analysis run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub charts_dir: String,
    pub cleaned_csv: String,
    pub summary_csv: String,
    pub cascade_csv: String,
    pub analysis_workbook: String,
    pub interactive_workbook: String,
    pub report_json: String,
    pub sample_seed: u64,
    pub normality_sample_size: usize,
    pub ttest_sample_size: usize,
    pub zscore_threshold: f64,
    pub top_provinces: usize,
    pub top_trend_provinces: usize,
    pub cascade: CascadeIndicators,
    pub outlier_indicator: String,
    pub featured_indicators: Vec<String>,
    pub male_label: String,
    pub female_label: String,
    pub chart_style: ChartStyle,
    pub workbook_style: WorkbookStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("datavih.xlsx"),
            output_dir: PathBuf::from("."),
            charts_dir: "charts".to_string(),
            cleaned_csv: "datavih_cleaned.csv".to_string(),
            summary_csv: "summary_by_province_year.csv".to_string(),
            cascade_csv: "unaids_95_95_95_data.csv".to_string(),
            analysis_workbook: "datavih_analysis.xlsx".to_string(),
            interactive_workbook: "datavih_analysis_v2.xlsx".to_string(),
            report_json: "analysis_report.json".to_string(),
            sample_seed: 42,
            normality_sample_size: 5000,
            ttest_sample_size: 1000,
            zscore_threshold: DEFAULT_ZSCORE_THRESHOLD,
            top_provinces: 10,
            top_trend_provinces: 5,
            cascade: CascadeIndicators::default(),
            outlier_indicator: "Nombre de préservatifs masculins distribués".to_string(),
            featured_indicators: default_featured_indicators(),
            male_label: "Masculin".to_string(),
            female_label: "Féminin".to_string(),
            chart_style: ChartStyle::default(),
            workbook_style: WorkbookStyle::default(),
        }
    }
}

fn default_featured_indicators() -> Vec<String> {
    [
        "Nombre de clients testés",
        "Nombre de clients diagnostiqués VIH+",
        "Nombre de PVVIH sous TAR",
        "Nombre  de PVVIH sous TAR qui ont supprimée la charge virale",
        "Nombre de préservatifs masculins distribués",
        "Nombre de femmes enceintes séropositives ayant reçu des ARV pour la PTME",
        "Nombre de nouveau-nés exposés ayant bénéficié de la PCR dans les deux mois de vie",
        "Nombre de clients testés (Clinique)",
        "Nombre de clients testés (Communautaire)",
        "Nombre de préservatifs féminins distribués",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AnalysisConfig {
    /// Load `vih_analysis.json` from `dir` if it exists, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            log::info!("Using configuration from {}", path.display());
            Self::from_file(&path)
        } else {
            log::info!("No {} found, using default configuration", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zscore_threshold > 0.0) {
            return Err(ConfigError::Invalid {
                field: "zscore_threshold",
                reason: format!("must be positive, got {}", self.zscore_threshold),
            });
        }
        if self.chart_style.width == 0 || self.chart_style.height == 0 {
            return Err(ConfigError::Invalid {
                field: "chart_style",
                reason: "width and height must be non-zero".to_string(),
            });
        }
        if self.chart_style.histogram_bins == 0 {
            return Err(ConfigError::Invalid {
                field: "chart_style.histogram_bins",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn charts_path(&self) -> PathBuf {
        self.output_dir.join(&self.charts_dir)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
