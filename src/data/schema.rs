//! Dataset Schema
//! Column names of the indicator workbook and the grouping dimensions.

use polars::prelude::*;
use serde::Serialize;

pub const PROVINCE: &str = "provinces";
pub const YEAR: &str = "annees";
pub const QUARTER: &str = "trimestres";
pub const INDICATOR: &str = "indicateurs";
pub const TARGET: &str = "cibles";
pub const GENDER: &str = "sexes";
pub const AGE_GROUP: &str = "tranches_ages";
pub const VALUE: &str = "Valeur";
pub const PERIOD: &str = "period";

/// Placeholder for missing categorical values.
pub const SENTINEL: &str = "Non spécifié";

/// Columns in file order.
pub const ALL_COLUMNS: [&str; 8] = [
    PROVINCE, YEAR, QUARTER, INDICATOR, TARGET, GENDER, AGE_GROUP, VALUE,
];

pub const CATEGORICAL_COLUMNS: [&str; 6] = [PROVINCE, QUARTER, INDICATOR, TARGET, GENDER, AGE_GROUP];

/// Columns that may be absent from the input file.
pub const OPTIONAL_COLUMNS: [&str; 2] = [GENDER, AGE_GROUP];

/// Grouping dimension of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Province,
    Year,
    Quarter,
    Gender,
    AgeGroup,
    Indicator,
}

impl Dimension {
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Province => PROVINCE,
            Dimension::Year => YEAR,
            Dimension::Quarter => QUARTER,
            Dimension::Gender => GENDER,
            Dimension::AgeGroup => AGE_GROUP,
            Dimension::Indicator => INDICATOR,
        }
    }

    /// Display label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Province => "Province",
            Dimension::Year => "Année",
            Dimension::Quarter => "Trimestre",
            Dimension::Gender => "Sexe",
            Dimension::AgeGroup => "Tranche d'Âge",
            Dimension::Indicator => "Indicateur",
        }
    }
}

/// Column-oriented buffers matching the dataset schema.
#[derive(Debug, Clone, Default)]
pub struct ColumnBuffers {
    pub provinces: Vec<Option<String>>,
    pub years: Vec<Option<i64>>,
    pub quarters: Vec<Option<String>>,
    pub indicators: Vec<Option<String>>,
    pub targets: Vec<Option<String>>,
    pub genders: Vec<Option<String>>,
    pub age_groups: Vec<Option<String>>,
    pub values: Vec<Option<f64>>,
}

impl ColumnBuffers {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            provinces: Vec::with_capacity(n),
            years: Vec::with_capacity(n),
            quarters: Vec::with_capacity(n),
            indicators: Vec::with_capacity(n),
            targets: Vec::with_capacity(n),
            genders: Vec::with_capacity(n),
            age_groups: Vec::with_capacity(n),
            values: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Mutable access to a categorical column by name.
    pub fn categorical_mut(&mut self, name: &str) -> Option<&mut Vec<Option<String>>> {
        match name {
            PROVINCE => Some(&mut self.provinces),
            QUARTER => Some(&mut self.quarters),
            INDICATOR => Some(&mut self.indicators),
            TARGET => Some(&mut self.targets),
            GENDER => Some(&mut self.genders),
            AGE_GROUP => Some(&mut self.age_groups),
            _ => None,
        }
    }

    /// Read the schema columns out of a DataFrame. Optional columns that are
    /// absent come back all-missing.
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        let height = df.height();
        let strings = |name: &str| -> PolarsResult<Vec<Option<String>>> {
            if OPTIONAL_COLUMNS.contains(&name) && df.column(name).is_err() {
                return Ok(vec![None; height]);
            }
            let casted = df.column(name)?.cast(&DataType::String)?;
            Ok(casted
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect())
        };

        let years_col = df.column(YEAR)?.cast(&DataType::Int64)?;
        let values_col = df.column(VALUE)?.cast(&DataType::Float64)?;

        Ok(Self {
            provinces: strings(PROVINCE)?,
            years: years_col.i64()?.into_iter().collect(),
            quarters: strings(QUARTER)?,
            indicators: strings(INDICATOR)?,
            targets: strings(TARGET)?,
            genders: strings(GENDER)?,
            age_groups: strings(AGE_GROUP)?,
            values: values_col
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect(),
        })
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(PROVINCE.into(), self.provinces),
            Column::new(YEAR.into(), self.years),
            Column::new(QUARTER.into(), self.quarters),
            Column::new(INDICATOR.into(), self.indicators),
            Column::new(TARGET.into(), self.targets),
            Column::new(GENDER.into(), self.genders),
            Column::new(AGE_GROUP.into(), self.age_groups),
            Column::new(VALUE.into(), self.values),
        ])
    }
}

/// Sort labels numerically when every label is an integer, lexically otherwise.
pub fn sort_labels(labels: &mut [String]) {
    let all_numeric = labels.iter().all(|l| l.parse::<i64>().is_ok());
    if all_numeric {
        labels.sort_by_key(|l| l.parse::<i64>().unwrap_or_default());
    } else {
        labels.sort();
    }
}

/// Synthesized period label, e.g. `2021-T1`.
pub fn period_label(year: i64, quarter: &str) -> String {
    format!("{}-{}", year, quarter)
}
