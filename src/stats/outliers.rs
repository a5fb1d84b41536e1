//! Outlier detection by interquartile range and by z-score.

use super::descriptive::{drop_missing, mean, percentile, sorted_copy};
use super::StatsError;
use serde::Serialize;

pub const IQR_FENCE: f64 = 1.5;
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Serialize)]
pub struct IqrOutliers {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Positions in the input series, NaN entries included in the numbering.
    pub indices: Vec<usize>,
    pub percent: f64,
}

impl IqrOutliers {
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZScoreOutliers {
    pub threshold: f64,
    pub mean: f64,
    /// Population standard deviation (ddof = 0).
    pub std: f64,
    pub indices: Vec<usize>,
    pub percent: f64,
}

impl ZScoreOutliers {
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Values strictly outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
pub fn iqr_outliers(values: &[f64]) -> Result<IqrOutliers, StatsError> {
    let data = drop_missing(values);
    if data.is_empty() {
        return Err(StatsError::InsufficientData {
            test: "IQR outliers",
            required: 1,
            actual: 0,
        });
    }

    let sorted = sorted_copy(&data);
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower_bound = q1 - IQR_FENCE * iqr;
    let upper_bound = q3 + IQR_FENCE * iqr;

    let indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan() && (**v < lower_bound || **v > upper_bound))
        .map(|(i, _)| i)
        .collect();

    Ok(IqrOutliers {
        q1,
        q3,
        iqr,
        lower_bound,
        upper_bound,
        percent: indices.len() as f64 / data.len() as f64 * 100.0,
        indices,
    })
}

/// Values whose absolute z-score exceeds `threshold`.
pub fn zscore_outliers(values: &[f64], threshold: f64) -> Result<ZScoreOutliers, StatsError> {
    if threshold <= 0.0 {
        return Err(StatsError::InvalidParameter(format!(
            "z-score threshold must be positive, got {}",
            threshold
        )));
    }
    let data = drop_missing(values);
    if data.is_empty() {
        return Err(StatsError::InsufficientData {
            test: "z-score outliers",
            required: 1,
            actual: 0,
        });
    }

    let mean = mean(&data);
    let std = (data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64).sqrt();

    let indices: Vec<usize> = if std == 0.0 {
        Vec::new()
    } else {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan() && ((**v - mean) / std).abs() > threshold)
            .map(|(i, _)| i)
            .collect()
    };

    Ok(ZScoreOutliers {
        threshold,
        mean,
        std,
        percent: indices.len() as f64 / data.len() as f64 * 100.0,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iqr_flags_values_strictly_outside_bounds() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0, -50.0, 2.5];
        let out = iqr_outliers(&values).unwrap();
        let expected = values
            .iter()
            .filter(|v| **v < out.lower_bound || **v > out.upper_bound)
            .count();
        assert_eq!(out.count(), expected);
        assert_eq!(out.indices, vec![4, 5]);
    }

    #[test]
    fn iqr_boundary_values_are_not_outliers() {
        // Q1 = 2, Q3 = 4, bounds [-1, 7]
        let out = iqr_outliers(&[-1.0, 2.0, 2.0, 2.0, 3.0, 4.0, 4.0, 4.0, 7.0]).unwrap();
        assert!((out.lower_bound + 1.0).abs() < 1e-12);
        assert!((out.upper_bound - 7.0).abs() < 1e-12);
        assert_eq!(out.count(), 0);
    }

    #[test]
    fn iqr_indices_skip_missing_entries() {
        let out = iqr_outliers(&[f64::NAN, 1.0, 1.0, 1.0, 1.0, 50.0]).unwrap();
        assert_eq!(out.indices, vec![5]);
        assert!((out.percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn zscore_uses_population_std() {
        let mut values = vec![10.0; 20];
        values.push(1000.0);
        let out = zscore_outliers(&values, 3.0).unwrap();
        assert_eq!(out.indices, vec![20]);
    }

    #[test]
    fn zscore_constant_series_has_no_outliers() {
        let out = zscore_outliers(&[5.0, 5.0, 5.0], 3.0).unwrap();
        assert_eq!(out.std, 0.0);
        assert_eq!(out.count(), 0);
    }

    #[test]
    fn empty_and_invalid_inputs_are_rejected() {
        assert!(iqr_outliers(&[]).is_err());
        assert!(zscore_outliers(&[f64::NAN], 3.0).is_err());
        assert!(zscore_outliers(&[1.0, 2.0], 0.0).is_err());
    }
}
