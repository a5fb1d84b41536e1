//! Stats module - descriptive statistics, outliers and hypothesis tests

mod correlation;
mod descriptive;
mod inference;
mod outliers;
mod sampling;

pub use correlation::{pearson_pairwise, CorrelationMatrix};
pub use descriptive::{median, percentile, DescriptiveStats, StatsCalculator};
pub use inference::{
    chi_square_independence, normality_test, t_test, ChiSquareTest, ContingencyTable,
    NormalityTest, TTest, TTestKind, NORMALITY_MIN_SAMPLE,
};
pub use outliers::{iqr_outliers, zscore_outliers, IqrOutliers, ZScoreOutliers, DEFAULT_ZSCORE_THRESHOLD};
pub use sampling::{sample, DEFAULT_SEED};

use thiserror::Error;

/// Significance threshold for hypothesis tests
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("{test} needs at least {required} values, got {actual}")]
    InsufficientData {
        test: &'static str,
        required: usize,
        actual: usize,
    },
    #[error("{0}: sample has zero variance")]
    ZeroVariance(&'static str),
    #[error("{0}: degenerate sample")]
    Degenerate(&'static str),
    #[error("Invalid contingency table: {0}")]
    InvalidTable(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Distribution error: {0}")]
    Distribution(String),
}
