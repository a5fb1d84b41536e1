//! Dataset profiling: shape, unique values and missing-value analysis.

use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize)]
pub struct MissingColumn {
    pub column: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    /// Distinct non-missing values per column, in column order.
    pub unique_counts: Vec<(String, usize)>,
    /// Columns with at least one missing value, most incomplete first.
    pub missing: Vec<MissingColumn>,
}

impl DatasetProfile {
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        let rows = df.height();
        let mut unique_counts = Vec::with_capacity(df.width());
        let mut missing = Vec::new();

        for column in df.get_columns() {
            let name = column.name().to_string();
            let as_text = column.cast(&DataType::String)?;
            let distinct: HashSet<&str> = as_text
                .as_materialized_series()
                .str()?
                .into_iter()
                .flatten()
                .collect();
            unique_counts.push((name.clone(), distinct.len()));

            let count = column.null_count();
            if count > 0 {
                missing.push(MissingColumn {
                    column: name,
                    count,
                    percent: count as f64 / rows.max(1) as f64 * 100.0,
                });
            }
        }

        // Stable sort keeps column order among equal percentages.
        missing.sort_by(|a, b| {
            b.percent
                .partial_cmp(&a.percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(Self {
            rows,
            columns: df.width(),
            unique_counts,
            missing,
        })
    }

    pub fn unique_count(&self, column: &str) -> usize {
        self.unique_counts
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn log_summary(&self) {
        log::info!("Dataset shape: {} rows x {} columns", self.rows, self.columns);
        for (column, n) in &self.unique_counts {
            log::debug!("  {}: {} unique values", column, n);
        }
        if self.missing.is_empty() {
            log::info!("No missing values found");
        }
        for m in &self.missing {
            log::info!(
                "  Missing in '{}': {} ({:.2}%)",
                m.column,
                m.count,
                m.percent
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_counts_uniques_and_missing() {
        let df = df!(
            "provinces" => [Some("Kinshasa"), Some("Ituri"), Some("Kinshasa"), None],
            "Valeur" => [Some(1.0f64), None, None, Some(4.0)]
        )
        .unwrap();

        let profile = DatasetProfile::from_frame(&df).unwrap();
        assert_eq!(profile.rows, 4);
        assert_eq!(profile.columns, 2);
        assert_eq!(profile.unique_count("provinces"), 2);
        assert_eq!(profile.unique_count("Valeur"), 2);

        assert_eq!(profile.missing.len(), 2);
        assert_eq!(profile.missing[0].column, "Valeur");
        assert_eq!(profile.missing[0].count, 2);
        assert!((profile.missing[0].percent - 50.0).abs() < 1e-9);
        assert_eq!(profile.missing[1].column, "provinces");
    }
}
