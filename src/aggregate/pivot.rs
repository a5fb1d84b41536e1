//! Two-dimensional pivot tables.

use super::group::{AggFunc, Aggregator};
use super::AggregateError;
use crate::data::schema::sort_labels;
use crate::data::{CleanedDataset, Dimension};
use crate::stats::CorrelationMatrix;
use serde::Serialize;

/// Row labels x column labels x cells. Cells are `None` for absent
/// combinations unless a fill value was requested.
#[derive(Debug, Clone, Serialize)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub col_dimension: Dimension,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    /// Pivot `func(Valeur)` over `rows` x `cols`, labels sorted naturally.
    pub fn build(
        ds: &CleanedDataset,
        rows: Dimension,
        cols: Dimension,
        func: AggFunc,
        fill: Option<f64>,
    ) -> Result<Self, AggregateError> {
        if rows == cols {
            return Err(AggregateError::SameDimension(rows));
        }

        let grouped = Aggregator::group_by(ds, &[rows, cols])?;
        let mut row_labels: Vec<String> = grouped.rows.iter().map(|r| r.keys[0].clone()).collect();
        let mut col_labels: Vec<String> = grouped.rows.iter().map(|r| r.keys[1].clone()).collect();
        for labels in [&mut row_labels, &mut col_labels] {
            labels.sort();
            labels.dedup();
            sort_labels(labels);
        }

        let mut cells = vec![vec![fill; col_labels.len()]; row_labels.len()];
        for group in &grouped.rows {
            let i = row_labels.iter().position(|l| *l == group.keys[0]);
            let j = col_labels.iter().position(|l| *l == group.keys[1]);
            if let (Some(i), Some(j)) = (i, j) {
                cells[i][j] = group.get(func).or(fill);
            }
        }

        Ok(Self {
            row_dimension: rows,
            col_dimension: cols,
            row_labels,
            col_labels,
            cells,
        })
    }

    /// Sum pivot with absent combinations set to 0.
    pub fn sum(ds: &CleanedDataset, rows: Dimension, cols: Dimension) -> Result<Self, AggregateError> {
        Self::build(ds, rows, cols, AggFunc::Sum, Some(0.0))
    }

    pub fn value(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.row_labels.iter().position(|l| l == row)?;
        let j = self.col_labels.iter().position(|l| l == col)?;
        self.cells[i][j]
    }

    /// Per-row sum of the present cells.
    pub fn row_totals(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|r| r.iter().flatten().sum())
            .collect()
    }

    pub fn col_totals(&self) -> Vec<f64> {
        (0..self.col_labels.len())
            .map(|j| self.cells.iter().filter_map(|r| r[j]).sum())
            .collect()
    }

    pub fn column(&self, j: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|r| r[j]).collect()
    }

    /// Rows reordered by total, largest first.
    pub fn sorted_by_total_desc(mut self) -> Self {
        let totals = self.row_totals();
        let mut order: Vec<usize> = (0..self.row_labels.len()).collect();
        order.sort_by(|&a, &b| {
            totals[b]
                .partial_cmp(&totals[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.row_labels = order.iter().map(|&i| self.row_labels[i].clone()).collect();
        self.cells = order.iter().map(|&i| self.cells[i].clone()).collect();
        self
    }

    /// First `n` rows.
    pub fn head(mut self, n: usize) -> Self {
        self.row_labels.truncate(n);
        self.cells.truncate(n);
        self
    }

    /// Pearson correlation between columns, pairwise-complete.
    pub fn correlation(&self) -> CorrelationMatrix {
        let columns: Vec<Vec<Option<f64>>> =
            (0..self.col_labels.len()).map(|j| self.column(j)).collect();
        CorrelationMatrix::pearson(self.col_labels.clone(), &columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset, row};

    fn sample() -> CleanedDataset {
        dataset(&[
            row("Kinshasa", 2021, "T1", "Tests", 10.0),
            row("Kinshasa", 2020, "T1", "Tests", 5.0),
            row("Ituri", 2021, "T2", "Tests", 40.0),
            row("Kinshasa", 2021, "T2", "Tests", 7.0),
        ])
    }

    #[test]
    fn sum_pivot_fills_absent_cells_with_zero() {
        let p = PivotTable::sum(&sample(), Dimension::Province, Dimension::Year).unwrap();
        assert_eq!(p.row_labels, ["Ituri", "Kinshasa"]);
        assert_eq!(p.col_labels, ["2020", "2021"]);
        assert_eq!(p.value("Ituri", "2020"), Some(0.0));
        assert_eq!(p.value("Kinshasa", "2021"), Some(17.0));
        assert!(p.cells.iter().flatten().all(Option::is_some));
        assert_eq!(p.row_totals(), vec![40.0, 22.0]);
        assert_eq!(p.col_totals(), vec![5.0, 57.0]);
    }

    #[test]
    fn mean_pivot_without_fill_leaves_gaps() {
        let p = PivotTable::build(&sample(), Dimension::Year, Dimension::Quarter, AggFunc::Mean, None)
            .unwrap();
        assert_eq!(p.value("2020", "T2"), None);
        assert_eq!(p.value("2021", "T2"), Some(23.5));
    }

    #[test]
    fn spread_pivots_use_each_aggregate() {
        let build = |func| {
            PivotTable::build(&sample(), Dimension::Province, Dimension::Year, func, None).unwrap()
        };
        assert_eq!(build(AggFunc::Min).value("Kinshasa", "2021"), Some(7.0));
        assert_eq!(build(AggFunc::Max).value("Kinshasa", "2021"), Some(10.0));
        assert_eq!(build(AggFunc::Median).value("Kinshasa", "2021"), Some(8.5));
        assert_eq!(build(AggFunc::Count).value("Kinshasa", "2021"), Some(2.0));

        let std = build(AggFunc::Std);
        let spread = std.value("Kinshasa", "2021").unwrap();
        assert!((spread - 4.5_f64.sqrt()).abs() < 1e-9);
        // A single value has no sample deviation.
        assert_eq!(std.value("Ituri", "2021"), None);
        assert_eq!(std.value("Ituri", "2020"), None);

        let filled =
            PivotTable::build(&sample(), Dimension::Province, Dimension::Year, AggFunc::Std, Some(0.0))
                .unwrap();
        assert_eq!(filled.value("Kinshasa", "2020"), Some(0.0));
    }

    #[test]
    fn rows_sort_by_total() {
        let p = PivotTable::sum(&sample(), Dimension::Province, Dimension::Year)
            .unwrap()
            .sorted_by_total_desc()
            .head(1);
        assert_eq!(p.row_labels, ["Ituri"]);
        assert_eq!(p.cells, vec![vec![Some(0.0), Some(40.0)]]);
    }

    #[test]
    fn pivot_rejects_identical_dimensions() {
        assert!(matches!(
            PivotTable::sum(&sample(), Dimension::Year, Dimension::Year),
            Err(AggregateError::SameDimension(Dimension::Year))
        ));
    }

    #[test]
    fn correlation_covers_every_column() {
        let p = PivotTable::sum(&sample(), Dimension::Province, Dimension::Year).unwrap();
        let corr = p.correlation();
        assert_eq!(corr.labels, ["2020", "2021"]);
        // Two rows: (0, 40) and (5, 17) are perfectly anti-correlated.
        assert!((corr.get("2020", "2021").unwrap() + 1.0).abs() < 1e-12);
    }
}
