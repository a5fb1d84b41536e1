//! Group-by aggregation over the grouping dimensions.

use super::AggregateError;
use crate::data::schema::VALUE;
use crate::data::{CleanedDataset, Dimension};
use polars::prelude::*;
use serde::Serialize;

const SUM: &str = "sum";
const MEAN: &str = "mean";
const MEDIAN: &str = "median";
const COUNT: &str = "count";
const MIN: &str = "min";
const MAX: &str = "max";
const STD: &str = "std";

/// Aggregation applied to `Valeur` within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggFunc {
    Sum,
    Mean,
    Median,
    Count,
    Min,
    Max,
    Std,
}

impl AggFunc {
    pub const ALL: [AggFunc; 7] = [
        AggFunc::Count,
        AggFunc::Sum,
        AggFunc::Mean,
        AggFunc::Median,
        AggFunc::Std,
        AggFunc::Min,
        AggFunc::Max,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AggFunc::Sum => SUM,
            AggFunc::Mean => MEAN,
            AggFunc::Median => MEDIAN,
            AggFunc::Count => COUNT,
            AggFunc::Min => MIN,
            AggFunc::Max => MAX,
            AggFunc::Std => STD,
        }
    }
}

/// One group: its key tuple and the aggregates of its values.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub keys: Vec<String>,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; `None` for a single-row group.
    pub std: Option<f64>,
}

impl GroupRow {
    pub fn key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or("")
    }

    pub fn get(&self, func: AggFunc) -> Option<f64> {
        match func {
            AggFunc::Sum => Some(self.sum),
            AggFunc::Mean => Some(self.mean),
            AggFunc::Median => Some(self.median),
            AggFunc::Count => Some(self.count as f64),
            AggFunc::Min => Some(self.min),
            AggFunc::Max => Some(self.max),
            AggFunc::Std => self.std,
        }
    }
}

/// Groups in first-appearance order of their key.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateGroup {
    pub dimensions: Vec<Dimension>,
    pub rows: Vec<GroupRow>,
}

impl AggregateGroup {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.sum).sum()
    }

    pub fn find(&self, keys: &[&str]) -> Option<&GroupRow> {
        self.rows
            .iter()
            .find(|r| r.keys.iter().map(String::as_str).eq(keys.iter().copied()))
    }

    /// Rows sorted by sum, largest first. Ties keep first-appearance order.
    pub fn sorted_by_sum_desc(mut self) -> Self {
        self.rows.sort_by(|a, b| {
            b.sum
                .partial_cmp(&a.sum)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self
    }

    /// Rows sorted by their key labels (numeric years ascending).
    pub fn sorted_by_key(mut self) -> Self {
        self.rows.sort_by(|a, b| {
            for (x, y) in a.keys.iter().zip(&b.keys) {
                let ord = match (x.parse::<i64>(), y.parse::<i64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ord.is_ne() {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
        self
    }
}

/// Builds aggregates from a cleaned dataset.
pub struct Aggregator;

impl Aggregator {
    /// Group by `dims` and compute every aggregate of `Valeur`.
    pub fn group_by(ds: &CleanedDataset, dims: &[Dimension]) -> Result<AggregateGroup, AggregateError> {
        if dims.is_empty() {
            return Err(AggregateError::NoDimensions);
        }

        let keys: Vec<Expr> = dims.iter().map(|d| col(d.column())).collect();
        let value = || col(VALUE);
        let grouped = ds
            .frame()
            .clone()
            .lazy()
            .group_by_stable(keys)
            .agg([
                value().sum().alias(SUM),
                value().mean().alias(MEAN),
                value().median().alias(MEDIAN),
                value().count().alias(COUNT),
                value().min().alias(MIN),
                value().max().alias(MAX),
                value().std(1).alias(STD),
            ])
            .collect()?;

        let key_columns = dims
            .iter()
            .map(|d| text_column(&grouped, d.column()))
            .collect::<PolarsResult<Vec<_>>>()?;
        let sum = float_column(&grouped, SUM)?;
        let mean = float_column(&grouped, MEAN)?;
        let median = float_column(&grouped, MEDIAN)?;
        let count = float_column(&grouped, COUNT)?;
        let min = float_column(&grouped, MIN)?;
        let max = float_column(&grouped, MAX)?;
        let std = float_column(&grouped, STD)?;

        let rows = (0..grouped.height())
            .map(|i| GroupRow {
                keys: key_columns.iter().map(|k| k[i].clone()).collect(),
                sum: sum[i].unwrap_or(0.0),
                mean: mean[i].unwrap_or(f64::NAN),
                median: median[i].unwrap_or(f64::NAN),
                count: count[i].unwrap_or(0.0) as usize,
                min: min[i].unwrap_or(f64::NAN),
                max: max[i].unwrap_or(f64::NAN),
                std: std[i].filter(|s| !s.is_nan()),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Grouped {} rows by {:?} into {} groups",
            ds.height(),
            dims,
            rows.len()
        );
        Ok(AggregateGroup {
            dimensions: dims.to_vec(),
            rows,
        })
    }

    /// Largest `n` groups of `dim` by total value, optionally restricted to
    /// one indicator. An indicator with no rows gives an empty ranking.
    pub fn top_n(
        ds: &CleanedDataset,
        dim: Dimension,
        n: usize,
        indicator: Option<&str>,
    ) -> Result<Vec<(String, f64)>, AggregateError> {
        let scoped;
        let source = match indicator {
            Some(name) => {
                scoped = ds.filter_indicator(name)?;
                if scoped.is_empty() {
                    log::warn!("Indicator '{}' has no rows, ranking is empty", name);
                    return Ok(Vec::new());
                }
                &scoped
            }
            None => ds,
        };

        let ranked = Self::group_by(source, &[dim])?.sorted_by_sum_desc();
        Ok(ranked
            .rows
            .into_iter()
            .take(n)
            .map(|r| (r.key().to_string(), r.sum))
            .collect())
    }
}

pub(crate) fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let casted = df.column(name)?.cast(&DataType::String)?;
    Ok(casted
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

pub(crate) fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset, row};

    fn sample() -> CleanedDataset {
        dataset(&[
            row("Kinshasa", 2020, "T1", "Tests", 10.0),
            row("Ituri", 2020, "T1", "Tests", 4.0),
            row("Kinshasa", 2021, "T2", "Tests", 30.0),
            row("Ituri", 2021, "T1", "Condoms", 100.0),
            row("Kinshasa", 2020, "T2", "Tests", 20.0),
        ])
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let g = Aggregator::group_by(&sample(), &[Dimension::Province]).unwrap();
        let keys: Vec<&str> = g.rows.iter().map(|r| r.key()).collect();
        assert_eq!(keys, ["Kinshasa", "Ituri"]);

        let kin = g.find(&["Kinshasa"]).unwrap();
        assert_eq!(kin.count, 3);
        assert_eq!(kin.sum, 60.0);
        assert_eq!(kin.mean, 20.0);
        assert_eq!(kin.median, 20.0);
        assert_eq!(kin.min, 10.0);
        assert_eq!(kin.max, 30.0);
        assert!((kin.std.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn group_sums_conserve_mass() {
        let ds = sample();
        let total: f64 = ds.values().unwrap().iter().sum();
        for dims in [
            vec![Dimension::Province],
            vec![Dimension::Year, Dimension::Quarter],
            vec![Dimension::Province, Dimension::Year, Dimension::Indicator],
        ] {
            let g = Aggregator::group_by(&ds, &dims).unwrap();
            assert!((g.total() - total).abs() < 1e-9, "dims {:?}", dims);
        }
    }

    #[test]
    fn multi_key_groups_and_single_row_std() {
        let g = Aggregator::group_by(&sample(), &[Dimension::Year, Dimension::Province]).unwrap();
        assert_eq!(g.len(), 4);
        let row = g.find(&["2021", "Ituri"]).unwrap();
        assert_eq!(row.count, 1);
        assert_eq!(row.std, None);
        assert_eq!(row.get(AggFunc::Count), Some(1.0));
    }

    #[test]
    fn sorted_by_key_orders_years_numerically() {
        let g = Aggregator::group_by(&sample(), &[Dimension::Year])
            .unwrap()
            .sorted_by_key();
        let keys: Vec<&str> = g.rows.iter().map(|r| r.key()).collect();
        assert_eq!(keys, ["2020", "2021"]);
    }

    #[test]
    fn top_n_ranks_by_sum() {
        let ds = sample();
        let top = Aggregator::top_n(&ds, Dimension::Province, 1, None).unwrap();
        assert_eq!(top, vec![("Ituri".to_string(), 104.0)]);

        let top = Aggregator::top_n(&ds, Dimension::Province, 5, Some("Tests")).unwrap();
        assert_eq!(top, vec![("Kinshasa".to_string(), 60.0), ("Ituri".to_string(), 4.0)]);

        assert!(Aggregator::top_n(&ds, Dimension::Province, 5, Some("Absent")).unwrap().is_empty());
    }

    #[test]
    fn grouping_needs_a_dimension() {
        assert!(matches!(
            Aggregator::group_by(&sample(), &[]),
            Err(AggregateError::NoDimensions)
        ));
    }
}
