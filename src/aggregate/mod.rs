//! Aggregate module - group-by, pivots, shares and trends

mod group;
mod pivot;
mod trend;

pub use group::{AggFunc, AggregateGroup, Aggregator, GroupRow};
pub use pivot::PivotTable;
pub use trend::{
    growth_by_indicator, percent_of_total, round2, shares, year_over_year, yearly_totals,
    GrowthPoint,
};

use crate::data::Dimension;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Grouping needs at least one dimension")]
    NoDimensions,
    #[error("Pivot rows and columns are both {0:?}")]
    SameDimension(Dimension),
}
