//! UNAIDS 95-95-95 treatment cascade.
//!
//! Four indicator totals (tested, diagnosed positive, on treatment, virally
//! suppressed) and the two rates derived from them. Indicators are matched
//! on their exact name; an absent indicator contributes a total of 0.

use crate::aggregate::{AggregateError, Aggregator};
use crate::data::{CleanedDataset, Dimension};
use serde::{Deserialize, Serialize};

/// Names of the four cascade indicators in the dataset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CascadeIndicators {
    pub tested: String,
    pub diagnosed: String,
    pub on_treatment: String,
    pub suppressed: String,
}

impl Default for CascadeIndicators {
    fn default() -> Self {
        Self {
            tested: "Nombre de clients testés".to_string(),
            diagnosed: "Nombre de clients diagnostiqués VIH+".to_string(),
            on_treatment: "Nombre de PVVIH sous TAR".to_string(),
            // The source workbook spells this one with a double space.
            suppressed: "Nombre  de PVVIH sous TAR qui ont supprimée la charge virale".to_string(),
        }
    }
}

impl CascadeIndicators {
    pub fn names(&self) -> [&str; 4] {
        [
            self.tested.as_str(),
            self.diagnosed.as_str(),
            self.on_treatment.as_str(),
            self.suppressed.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CascadeTotals {
    pub tested: f64,
    pub diagnosed: f64,
    pub on_treatment: f64,
    pub suppressed: f64,
}

impl CascadeTotals {
    /// On treatment / diagnosed, in percent.
    pub fn treatment_rate(&self) -> f64 {
        rate(self.on_treatment, self.diagnosed)
    }

    /// Virally suppressed / on treatment, in percent.
    pub fn suppression_rate(&self) -> f64 {
        rate(self.suppressed, self.on_treatment)
    }

    /// Diagnosed / tested, in percent.
    pub fn positivity_rate(&self) -> f64 {
        rate(self.diagnosed, self.tested)
    }
}

/// Cascade for one scope: a year, a province, or the whole dataset.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeRecord {
    pub scope: String,
    pub totals: CascadeTotals,
    pub treatment_rate: f64,
    pub suppression_rate: f64,
}

impl CascadeRecord {
    fn new(scope: String, totals: CascadeTotals) -> Self {
        Self {
            scope,
            treatment_rate: totals.treatment_rate(),
            suppression_rate: totals.suppression_rate(),
            totals,
        }
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn rate(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

pub struct CascadeCalculator<'a> {
    indicators: &'a CascadeIndicators,
}

impl<'a> CascadeCalculator<'a> {
    pub fn new(indicators: &'a CascadeIndicators) -> Self {
        Self { indicators }
    }

    pub fn overall(&self, ds: &CleanedDataset) -> Result<CascadeRecord, AggregateError> {
        Ok(CascadeRecord::new("Total".to_string(), self.totals(ds)?))
    }

    pub fn for_year(&self, ds: &CleanedDataset, year: i64) -> Result<CascadeRecord, AggregateError> {
        let scoped = ds.filter_year(year)?;
        Ok(CascadeRecord::new(year.to_string(), self.totals(&scoped)?))
    }

    pub fn for_province(
        &self,
        ds: &CleanedDataset,
        province: &str,
    ) -> Result<CascadeRecord, AggregateError> {
        let scoped = ds.filter_province(province)?;
        Ok(CascadeRecord::new(province.to_string(), self.totals(&scoped)?))
    }

    /// One record per year, oldest first.
    pub fn by_year(&self, ds: &CleanedDataset) -> Result<Vec<CascadeRecord>, AggregateError> {
        self.breakdown(ds, Dimension::Year)
    }

    /// One record per province, by name.
    pub fn by_province(&self, ds: &CleanedDataset) -> Result<Vec<CascadeRecord>, AggregateError> {
        self.breakdown(ds, Dimension::Province)
    }

    fn breakdown(
        &self,
        ds: &CleanedDataset,
        dim: Dimension,
    ) -> Result<Vec<CascadeRecord>, AggregateError> {
        let scopes = ds.unique_values(dim)?;
        let cascade = ds.filter_indicators(&self.indicators.names())?;
        if cascade.is_empty() {
            log::warn!("No cascade indicator found in the dataset, all totals are 0");
            return Ok(scopes
                .into_iter()
                .map(|s| CascadeRecord::new(s, CascadeTotals::default()))
                .collect());
        }

        let grouped = Aggregator::group_by(&cascade, &[dim, Dimension::Indicator])?;
        Ok(scopes
            .into_iter()
            .map(|scope| {
                let totals = self.collect(|name| {
                    grouped
                        .find(&[scope.as_str(), name])
                        .map_or(0.0, |r| r.sum)
                });
                CascadeRecord::new(scope, totals)
            })
            .collect())
    }

    /// Totals of the four indicators over `ds`.
    pub fn totals(&self, ds: &CleanedDataset) -> Result<CascadeTotals, AggregateError> {
        let cascade = ds.filter_indicators(&self.indicators.names())?;
        if cascade.is_empty() {
            return Ok(CascadeTotals::default());
        }
        let grouped = Aggregator::group_by(&cascade, &[Dimension::Indicator])?;
        Ok(self.collect(|name| grouped.find(&[name]).map_or(0.0, |r| r.sum)))
    }

    fn collect(&self, total: impl Fn(&str) -> f64) -> CascadeTotals {
        CascadeTotals {
            tested: total(&self.indicators.tested),
            diagnosed: total(&self.indicators.diagnosed),
            on_treatment: total(&self.indicators.on_treatment),
            suppressed: total(&self.indicators.suppressed),
        }
    }
}
