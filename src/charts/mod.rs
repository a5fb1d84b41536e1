//! Charts module - static PNG charts for the report

mod renderer;
mod series;

pub use renderer::StaticChartRenderer;
pub use series::{ChartInputs, OutlierSeries};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to draw {chart}: {message}")]
    Drawing { chart: String, message: String },
}
