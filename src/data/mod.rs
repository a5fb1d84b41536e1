//! Data module - dataset loading, profiling and cleaning

mod cleaner;
mod dataset;
mod loader;
mod profile;
pub mod schema;

pub use cleaner::{CleanError, Cleaner, CleaningReport, ColumnFill, FillValue};
pub use dataset::CleanedDataset;
pub use loader::{DataLoader, LoaderError};
pub use profile::{DatasetProfile, MissingColumn};
pub use schema::Dimension;

#[cfg(test)]
pub(crate) use dataset::fixtures;
#[cfg(test)]
pub(crate) use loader::write_xlsx;
