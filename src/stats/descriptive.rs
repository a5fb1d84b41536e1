//! Descriptive Statistics Module
//! Central tendency, dispersion and shape of a numeric series.

use super::StatsError;
use serde::Serialize;

/// Summary of a numeric series.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Adjusted Fisher-Pearson skewness; needs at least 3 values.
    pub skewness: Option<f64>,
    /// Excess kurtosis (unbiased); needs at least 4 values.
    pub kurtosis: Option<f64>,
    /// `std / mean * 100`; undefined when the mean is zero.
    pub coefficient_of_variation: Option<f64>,
}

impl DescriptiveStats {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Count", Some(self.count as f64)),
            ("Mean", Some(self.mean)),
            ("Median", Some(self.median)),
            ("Mode", Some(self.mode)),
            ("Standard Deviation", Some(self.std)),
            ("Variance", Some(self.variance)),
            ("Min", Some(self.min)),
            ("Max", Some(self.max)),
            ("Range", Some(self.range)),
            ("Q1 (25%)", Some(self.q1)),
            ("Q2 (50%)", Some(self.q2)),
            ("Q3 (75%)", Some(self.q3)),
            ("IQR", Some(self.iqr)),
            ("Skewness", self.skewness),
            ("Kurtosis", self.kurtosis),
            ("Coefficient of Variation", self.coefficient_of_variation),
        ]
    }
}

/// Handles descriptive statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics, ignoring NaN entries.
    pub fn describe(values: &[f64]) -> Result<DescriptiveStats, StatsError> {
        let data = drop_missing(values);
        let n = data.len();
        if n == 0 {
            return Err(StatsError::InsufficientData {
                test: "descriptive statistics",
                required: 1,
                actual: 0,
            });
        }

        let sorted = sorted_copy(&data);
        let mean = mean(&data);
        let variance = sample_variance(&data, mean);
        let std = variance.sqrt();

        let q1 = percentile(&sorted, 25.0);
        let q2 = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let min = sorted[0];
        let max = sorted[n - 1];

        Ok(DescriptiveStats {
            count: n,
            mean,
            median: q2,
            mode: mode_of_sorted(&sorted),
            std,
            variance,
            min,
            max,
            range: max - min,
            q1,
            q2,
            q3,
            iqr: q3 - q1,
            skewness: skewness(&data, mean),
            kurtosis: excess_kurtosis(&data, mean),
            coefficient_of_variation: (mean != 0.0).then(|| std / mean * 100.0),
        })
    }
}

pub(crate) fn drop_missing(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

pub(crate) fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (ddof = 1); zero for a single value.
pub fn sample_variance(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    }
}

/// Median of the non-missing values; `None` for an empty series.
pub fn median(values: &[f64]) -> Option<f64> {
    let data = drop_missing(values);
    if data.is_empty() {
        return None;
    }
    Some(percentile(&sorted_copy(&data), 50.0))
}

/// Calculate percentile using linear interpolation (NumPy compatible).
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Most frequent value; the smallest one when several tie.
fn mode_of_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_run {
            best_run = j - i;
            best = sorted[i];
        }
        i = j;
    }
    best
}

/// Central moment sums `Σ(x-mean)^2`, `Σ(x-mean)^3`, `Σ(x-mean)^4`.
fn moment_sums(values: &[f64], mean: f64) -> (f64, f64, f64) {
    values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), x| {
        let d = x - mean;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    })
}

fn skewness(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 3 {
        return None;
    }
    let (s2, s3, _) = moment_sums(values, mean);
    let m2 = s2 / n;
    let m3 = s3 / n;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * g1)
}

fn excess_kurtosis(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 4 {
        return None;
    }
    let (s2, _, s4) = moment_sums(values, mean);
    if s2 == 0.0 {
        return Some(0.0);
    }
    let adj = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    let numer = n * (n + 1.0) * (n - 1.0) * s4;
    let denom = (n - 2.0) * (n - 3.0) * s2 * s2;
    Some(numer / denom - adj)
}
