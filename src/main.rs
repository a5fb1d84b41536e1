//! VIH Analytics - HIV/AIDS indicator analysis for DRC provinces
//!
//! Loads the indicator workbook, cleans it, computes statistics and the
//! UNAIDS 95-95-95 cascade, then writes charts, Excel reports, CSV exports
//! and a JSON summary. Settings come from `vih_analysis.json` when present.

mod aggregate;
mod cascade;
mod charts;
mod classify;
mod config;
mod data;
mod export;
mod pipeline;
mod report;
mod stats;
mod workbook;

use anyhow::Context;
use config::AnalysisConfig;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::discover(Path::new(".")).context("reading configuration")?;
    pipeline::run(&config)?;
    Ok(())
}
