//! Data Cleaner Module
//! Fills missing values, removes duplicate rows and trims text, in that order.

use super::dataset::CleanedDataset;
use super::schema::{ColumnBuffers, CATEGORICAL_COLUMNS, SENTINEL, VALUE, YEAR};
use crate::stats::median;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' has no values to compute a median from")]
    NoMedian(&'static str),
}

/// Value substituted for missing entries of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FillValue {
    Sentinel(String),
    Median(f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnFill {
    pub column: String,
    pub missing: usize,
    pub fill: Option<FillValue>,
}

/// What the cleaner changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    pub fills: Vec<ColumnFill>,
}

impl CleaningReport {
    pub fn missing_count(&self, column: &str) -> usize {
        self.fills
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.missing)
            .unwrap_or(0)
    }

    pub fn fill_value(&self, column: &str) -> Option<&FillValue> {
        self.fills
            .iter()
            .find(|f| f.column == column)
            .and_then(|f| f.fill.as_ref())
    }

    pub fn total_filled(&self) -> usize {
        self.fills.iter().map(|f| f.missing).sum()
    }
}

/// Row key for duplicate detection: trimmed text fields plus the raw bits
/// of the numeric fields.
#[derive(Hash, PartialEq, Eq)]
struct RowKey<'a> {
    text: [&'a str; 6],
    year: i64,
    value: u64,
}

/// Single-pass dataset cleaner.
pub struct Cleaner;

impl Cleaner {
    /// Clean a raw dataset: categorical fill, numeric median fill,
    /// de-duplication, trimming.
    pub fn clean(df: &DataFrame) -> Result<(CleanedDataset, CleaningReport), CleanError> {
        let mut buffers = ColumnBuffers::from_frame(df)?;
        let rows_before = buffers.len();
        let mut fills = Vec::with_capacity(CATEGORICAL_COLUMNS.len() + 2);

        // 1. Categorical columns
        for name in CATEGORICAL_COLUMNS {
            let Some(column) = buffers.categorical_mut(name) else {
                continue;
            };
            let mut missing = 0;
            for cell in column.iter_mut().filter(|c| c.is_none()) {
                *cell = Some(SENTINEL.to_string());
                missing += 1;
            }
            if missing > 0 {
                log::info!(
                    "Filled {} missing values in '{}' with '{}'",
                    missing,
                    name,
                    SENTINEL
                );
            }
            fills.push(ColumnFill {
                column: name.to_string(),
                missing,
                fill: (missing > 0).then(|| FillValue::Sentinel(SENTINEL.to_string())),
            });
        }

        // 2. Numeric columns, median over the values present before filling
        let year_fill = fill_with_median(&mut buffers.years, YEAR, |y| y as f64, |m| m.round() as i64)?;
        fills.push(year_fill);
        let value_fill = fill_with_median(&mut buffers.values, VALUE, |v| v, |m| m)?;
        fills.push(value_fill);

        // 3. Duplicates, first occurrence wins
        let n = buffers.len();
        let mut keep = vec![true; n];
        {
            let mut seen: HashSet<RowKey> = HashSet::with_capacity(n);
            for (i, flag) in keep.iter_mut().enumerate() {
                let key = RowKey {
                    text: [
                        trimmed_at(&buffers.provinces, i),
                        trimmed_at(&buffers.quarters, i),
                        trimmed_at(&buffers.indicators, i),
                        trimmed_at(&buffers.targets, i),
                        trimmed_at(&buffers.genders, i),
                        trimmed_at(&buffers.age_groups, i),
                    ],
                    year: buffers.years[i].unwrap_or_default(),
                    value: buffers.values[i].unwrap_or_default().to_bits(),
                };
                *flag = seen.insert(key);
            }
        }
        let duplicates_removed = keep.iter().filter(|k| !**k).count();
        if duplicates_removed > 0 {
            log::info!("Removed {} duplicate rows", duplicates_removed);
        } else {
            log::info!("No duplicate rows found");
        }

        // 4. Trim, dropping duplicate rows on the way
        let mut cleaned = ColumnBuffers::with_capacity(n - duplicates_removed);
        let trimmed = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string());
        for i in (0..n).filter(|&i| keep[i]) {
            cleaned.provinces.push(trimmed(&buffers.provinces[i]));
            cleaned.years.push(buffers.years[i]);
            cleaned.quarters.push(trimmed(&buffers.quarters[i]));
            cleaned.indicators.push(trimmed(&buffers.indicators[i]));
            cleaned.targets.push(trimmed(&buffers.targets[i]));
            cleaned.genders.push(trimmed(&buffers.genders[i]));
            cleaned.age_groups.push(trimmed(&buffers.age_groups[i]));
            cleaned.values.push(buffers.values[i]);
        }

        let rows_after = cleaned.len();
        log::info!(
            "Final cleaned dataset shape: {} rows (from {})",
            rows_after,
            rows_before
        );

        let report = CleaningReport {
            rows_before,
            rows_after,
            duplicates_removed,
            fills,
        };
        Ok((CleanedDataset::new(cleaned.into_frame()?), report))
    }
}

fn trimmed_at(column: &[Option<String>], i: usize) -> &str {
    column[i].as_deref().unwrap_or("").trim()
}

fn fill_with_median<T: Copy>(
    column: &mut [Option<T>],
    name: &'static str,
    to_f64: impl Fn(T) -> f64,
    from_f64: impl Fn(f64) -> T,
) -> Result<ColumnFill, CleanError> {
    let missing = column.iter().filter(|v| v.is_none()).count();
    if missing == 0 {
        return Ok(ColumnFill {
            column: name.to_string(),
            missing: 0,
            fill: None,
        });
    }

    let present: Vec<f64> = column.iter().flatten().map(|v| to_f64(*v)).collect();
    let median = median(&present).ok_or(CleanError::NoMedian(name))?;
    let filler = from_f64(median);
    for cell in column.iter_mut().filter(|c| c.is_none()) {
        *cell = Some(filler);
    }
    log::info!(
        "Filled {} missing values in '{}' with median: {}",
        missing,
        name,
        median
    );

    Ok(ColumnFill {
        column: name.to_string(),
        missing,
        fill: Some(FillValue::Median(to_f64(filler))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{GENDER, PROVINCE};

    fn raw(rows: &[(Option<&str>, Option<i64>, Option<&str>, Option<f64>)]) -> DataFrame {
        let mut b = ColumnBuffers::with_capacity(rows.len());
        for (province, year, gender, value) in rows {
            b.provinces.push(province.map(str::to_string));
            b.years.push(*year);
            b.quarters.push(Some("T1".to_string()));
            b.indicators.push(Some("Nombre de clients testés".to_string()));
            b.targets.push(Some("Oui".to_string()));
            b.genders.push(gender.map(str::to_string));
            b.age_groups.push(Some("15-24".to_string()));
            b.values.push(*value);
        }
        b.into_frame().unwrap()
    }

    #[test]
    fn missing_categorical_gets_sentinel() {
        let df = raw(&[
            (Some("Kinshasa"), Some(2020), None, Some(1.0)),
            (None, Some(2021), Some("Féminin"), Some(2.0)),
        ]);
        let (clean, report) = Cleaner::clean(&df).unwrap();

        assert_eq!(clean.strings(GENDER).unwrap()[0], SENTINEL);
        assert_eq!(clean.strings(PROVINCE).unwrap()[1], SENTINEL);
        assert_eq!(report.missing_count(GENDER), 1);
        assert_eq!(report.missing_count(PROVINCE), 1);
        assert_eq!(
            report.fill_value(GENDER),
            Some(&FillValue::Sentinel(SENTINEL.to_string()))
        );
    }

    #[test]
    fn missing_numeric_gets_median_of_present_values() {
        let df = raw(&[
            (Some("A"), Some(2020), Some("M"), Some(1.0)),
            (Some("B"), Some(2020), Some("M"), Some(2.0)),
            (Some("C"), Some(2020), Some("M"), Some(3.0)),
            (Some("D"), Some(2020), Some("M"), Some(4.0)),
            (Some("E"), Some(2020), Some("M"), Some(100.0)),
            (Some("F"), Some(2020), Some("M"), None),
        ]);
        let (clean, report) = Cleaner::clean(&df).unwrap();

        assert_eq!(clean.values().unwrap()[5], 3.0);
        assert_eq!(report.missing_count(VALUE), 1);
        assert_eq!(report.fill_value(VALUE), Some(&FillValue::Median(3.0)));
        assert_eq!(clean.frame().column(VALUE).unwrap().null_count(), 0);
    }

    #[test]
    fn missing_year_gets_rounded_median() {
        let df = raw(&[
            (Some("A"), Some(2020), Some("M"), Some(1.0)),
            (Some("B"), Some(2021), Some("M"), Some(2.0)),
            (Some("C"), Some(2023), Some("M"), Some(3.0)),
            (Some("D"), None, Some("M"), Some(4.0)),
        ]);
        let (clean, _) = Cleaner::clean(&df).unwrap();
        assert_eq!(clean.years().unwrap()[3], 2021);
    }

    #[test]
    fn duplicate_rows_collapse_to_one() {
        let df = raw(&[
            (Some("Kinshasa"), Some(2020), Some("M"), Some(5.0)),
            (Some("Ituri"), Some(2020), Some("M"), Some(5.0)),
            (Some("Kinshasa"), Some(2020), Some("M"), Some(5.0)),
        ]);
        let (clean, report) = Cleaner::clean(&df).unwrap();
        assert_eq!(clean.height(), 2);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(clean.strings(PROVINCE).unwrap(), vec!["Kinshasa", "Ituri"]);
    }

    #[test]
    fn strings_are_trimmed() {
        let df = raw(&[(Some("  Kinshasa "), Some(2020), Some(" Féminin"), Some(1.0))]);
        let (clean, _) = Cleaner::clean(&df).unwrap();
        assert_eq!(clean.strings(PROVINCE).unwrap(), vec!["Kinshasa"]);
        assert_eq!(clean.strings(GENDER).unwrap(), vec!["Féminin"]);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let df = raw(&[
            (Some(" Kinshasa"), Some(2020), None, Some(5.0)),
            (Some("Kinshasa"), Some(2020), None, Some(5.0)),
            (None, None, Some("M"), None),
            (Some("Ituri"), Some(2022), Some("M"), Some(7.0)),
            (Some("Ituri"), Some(2022), Some("M"), Some(7.0)),
        ]);
        let (once, first) = Cleaner::clean(&df).unwrap();
        let (twice, second) = Cleaner::clean(once.frame()).unwrap();

        assert!(first.total_filled() > 0);
        assert_eq!(second.total_filled(), 0);
        assert_eq!(second.duplicates_removed, 0);
        assert!(once.frame().equals(twice.frame()));
        assert!(once.height() <= df.height());
    }

    #[test]
    fn all_missing_numeric_column_is_an_error() {
        let df = raw(&[(Some("A"), Some(2020), Some("M"), None)]);
        let err = Cleaner::clean(&df).unwrap_err();
        assert!(matches!(err, CleanError::NoMedian(VALUE)));
    }
}
