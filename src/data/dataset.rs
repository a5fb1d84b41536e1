//! Cleaned dataset wrapper: typed column access and filtering.

use super::schema::{period_label, sort_labels, Dimension, INDICATOR, PERIOD, QUARTER, VALUE, YEAR};
use polars::prelude::*;

/// A dataset that went through the cleaner: no missing fields, no
/// duplicates, trimmed text.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    df: DataFrame,
}

impl CleanedDataset {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Text values of a column, in row order.
    pub fn strings(&self, column: &str) -> PolarsResult<Vec<String>> {
        let casted = self.df.column(column)?.cast(&DataType::String)?;
        Ok(casted
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    pub fn values(&self) -> PolarsResult<Vec<f64>> {
        let col = self.df.column(VALUE)?.cast(&DataType::Float64)?;
        Ok(col.f64()?.into_iter().flatten().collect())
    }

    pub fn years(&self) -> PolarsResult<Vec<i64>> {
        let col = self.df.column(YEAR)?.cast(&DataType::Int64)?;
        Ok(col.i64()?.into_iter().flatten().collect())
    }

    /// Sorted distinct values of a dimension.
    pub fn unique_values(&self, dim: Dimension) -> PolarsResult<Vec<String>> {
        let mut seen = self.strings(dim.column())?;
        seen.sort();
        seen.dedup();
        sort_labels(&mut seen);
        Ok(seen)
    }

    /// Distinct values in order of first appearance.
    pub fn values_in_order(&self, dim: Dimension) -> PolarsResult<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for v in self.strings(dim.column())? {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        Ok(out)
    }

    pub fn n_unique(&self, dim: Dimension) -> PolarsResult<usize> {
        Ok(self.unique_values(dim)?.len())
    }

    pub fn year_span(&self) -> PolarsResult<Option<(i64, i64)>> {
        let years = self.years()?;
        Ok(years
            .iter()
            .min()
            .copied()
            .zip(years.iter().max().copied()))
    }

    /// Values of the rows matching `dim == key`. Missing values never occur
    /// in a cleaned dataset, so none are dropped.
    pub fn values_where(&self, dim: Dimension, key: &str) -> PolarsResult<Vec<f64>> {
        self.filter(dim, key)?.values()
    }

    /// Rows whose dimension equals `key`.
    pub fn filter(&self, dim: Dimension, key: &str) -> PolarsResult<CleanedDataset> {
        let predicate = match dim {
            Dimension::Year => match key.parse::<i64>() {
                Ok(year) => col(YEAR).eq(lit(year)),
                Err(_) => lit(false),
            },
            other => col(other.column()).eq(lit(key)),
        };
        self.filter_expr(predicate)
    }

    pub fn filter_indicator(&self, indicator: &str) -> PolarsResult<CleanedDataset> {
        self.filter(Dimension::Indicator, indicator)
    }

    pub fn filter_year(&self, year: i64) -> PolarsResult<CleanedDataset> {
        self.filter_expr(col(YEAR).eq(lit(year)))
    }

    pub fn filter_province(&self, province: &str) -> PolarsResult<CleanedDataset> {
        self.filter(Dimension::Province, province)
    }

    /// Rows whose indicator is any of `names`.
    pub fn filter_indicators(&self, names: &[&str]) -> PolarsResult<CleanedDataset> {
        let predicate = names
            .iter()
            .map(|name| col(INDICATOR).eq(lit(*name)))
            .reduce(|acc, e| acc.or(e))
            .unwrap_or_else(|| lit(false));
        self.filter_expr(predicate)
    }

    fn filter_expr(&self, predicate: Expr) -> PolarsResult<CleanedDataset> {
        let df = self.df.clone().lazy().filter(predicate).collect()?;
        Ok(CleanedDataset::new(df))
    }

    /// Frame with the synthesized `period` column (`{year}-{quarter}`).
    pub fn with_period(&self) -> PolarsResult<DataFrame> {
        let years = self.years()?;
        let quarters = self.strings(QUARTER)?;
        let periods: Vec<String> = years
            .iter()
            .zip(quarters.iter())
            .map(|(y, q)| period_label(*y, q))
            .collect();
        let mut df = self.df.clone();
        df.with_column(Column::new(PERIOD.into(), periods))?;
        Ok(df)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::data::schema::ColumnBuffers;

    /// One row of a synthetic dataset.
    pub struct Row<'a> {
        pub province: &'a str,
        pub year: i64,
        pub quarter: &'a str,
        pub indicator: &'a str,
        pub gender: &'a str,
        pub age_group: &'a str,
        pub value: f64,
    }

    pub fn row<'a>(
        province: &'a str,
        year: i64,
        quarter: &'a str,
        indicator: &'a str,
        value: f64,
    ) -> Row<'a> {
        Row {
            province,
            year,
            quarter,
            indicator,
            gender: "Féminin",
            age_group: "15-24",
            value,
        }
    }

    pub fn dataset(rows: &[Row]) -> CleanedDataset {
        let mut b = ColumnBuffers::with_capacity(rows.len());
        for r in rows {
            b.provinces.push(Some(r.province.to_string()));
            b.years.push(Some(r.year));
            b.quarters.push(Some(r.quarter.to_string()));
            b.indicators.push(Some(r.indicator.to_string()));
            b.targets.push(Some("Oui".to_string()));
            b.genders.push(Some(r.gender.to_string()));
            b.age_groups.push(Some(r.age_group.to_string()));
            b.values.push(Some(r.value));
        }
        CleanedDataset::new(b.into_frame().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{dataset, row};
    use super::*;

    #[test]
    fn filters_by_dimension() {
        let ds = dataset(&[
            row("Kinshasa", 2020, "T1", "A", 1.0),
            row("Ituri", 2021, "T2", "B", 2.0),
            row("Kinshasa", 2021, "T1", "B", 3.0),
        ]);
        assert_eq!(ds.filter_province("Kinshasa").unwrap().height(), 2);
        assert_eq!(ds.filter_year(2021).unwrap().values().unwrap(), vec![2.0, 3.0]);
        assert_eq!(ds.values_where(Dimension::Year, "2021").unwrap(), vec![2.0, 3.0]);
        assert_eq!(ds.filter_indicators(&["A", "B"]).unwrap().height(), 3);
        assert_eq!(ds.filter_indicators(&[]).unwrap().height(), 0);
        assert_eq!(ds.filter_indicator("missing").unwrap().height(), 0);
    }

    #[test]
    fn unique_values_are_sorted() {
        let ds = dataset(&[
            row("Kinshasa", 2022, "T1", "A", 1.0),
            row("Ituri", 2020, "T2", "B", 2.0),
            row("Kinshasa", 2021, "T1", "B", 3.0),
        ]);
        assert_eq!(ds.unique_values(Dimension::Year).unwrap(), ["2020", "2021", "2022"]);
        assert_eq!(ds.values_in_order(Dimension::Province).unwrap(), ["Kinshasa", "Ituri"]);
        assert_eq!(ds.year_span().unwrap(), Some((2020, 2022)));
    }

    #[test]
    fn period_column_is_added() {
        let ds = dataset(&[row("Kinshasa", 2022, "T3", "A", 1.0)]);
        let df = ds.with_period().unwrap();
        let period = df.column(PERIOD).unwrap();
        assert_eq!(period.get(0).unwrap().get_str(), Some("2022-T3"));
    }
}
