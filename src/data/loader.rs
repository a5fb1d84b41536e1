//! Dataset Loader Module
//! Reads the indicator table from a spreadsheet (calamine) or a CSV file
//! (Polars) into a DataFrame with the fixed dataset schema.

use super::schema::{
    ColumnBuffers, AGE_GROUP, ALL_COLUMNS, GENDER, INDICATOR, OPTIONAL_COLUMNS, PROVINCE, QUARTER,
    TARGET, VALUE, YEAR,
};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Anything wrong with the file's content, including a corrupt workbook.
    #[error("Invalid format: {0}")]
    Format(String),
}

impl From<calamine::Error> for LoaderError {
    fn from(e: calamine::Error) -> Self {
        LoaderError::Format(format!("unreadable workbook: {}", e))
    }
}

impl From<PolarsError> for LoaderError {
    fn from(e: PolarsError) -> Self {
        LoaderError::Format(format!("failed to parse table: {}", e))
    }
}

/// Loads the raw dataset. Single attempt, fail-fast.
pub struct DataLoader;

impl DataLoader {
    /// Load a dataset, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let df = match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Self::load_workbook(path)?,
            "csv" => Self::load_csv(path)?,
            other => {
                return Err(LoaderError::Format(format!(
                    "unsupported file extension '.{}'",
                    other
                )))
            }
        };

        log::info!(
            "Data successfully loaded from {}: {} rows x {} columns",
            path.display(),
            df.height(),
            df.width()
        );
        Ok(df)
    }

    /// Read the first worksheet; its first row is the header.
    fn load_workbook(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names().to_vec();
        let Some(sheet_name) = sheet_names.first() else {
            return Err(LoaderError::Format("workbook has no sheets".to_string()));
        };
        log::debug!(
            "Reading sheet '{}' (first of {} sheets)",
            sheet_name,
            sheet_names.len()
        );

        let range = workbook.worksheet_range(sheet_name)?;
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| LoaderError::Format(format!("sheet '{}' is empty", sheet_name)))?;
        let headers: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();
        let index = ColumnIndex::resolve(&headers)?;

        let mut buffers = ColumnBuffers::with_capacity(range.height().saturating_sub(1));
        for (i, row) in rows.enumerate() {
            // Spreadsheet row number, 1-based, after the header.
            let line = i + 2;
            if row.iter().all(is_blank) {
                continue;
            }
            let cell = |col: Option<usize>| col.and_then(|c| row.get(c));

            buffers.provinces.push(cell(index.province).and_then(cell_text));
            buffers.years.push(cell_year(cell(index.year), line)?);
            buffers.quarters.push(cell(index.quarter).and_then(cell_text));
            buffers.indicators.push(cell(index.indicator).and_then(cell_text));
            buffers.targets.push(cell(index.target).and_then(cell_text));
            buffers.genders.push(cell(index.gender).and_then(cell_text));
            buffers.age_groups.push(cell(index.age_group).and_then(cell_text));
            buffers.values.push(cell_number(cell(index.value), VALUE, line)?);
        }
        if buffers.len() == 0 {
            return Err(LoaderError::Format(format!(
                "sheet '{}' has a header but no data rows",
                sheet_name
            )));
        }

        Ok(buffers.into_frame()?)
    }

    /// Load a CSV export of the same table using Polars.
    fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let raw = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        if raw.height() == 0 {
            return Err(LoaderError::Format("CSV has a header but no data rows".to_string()));
        }

        let headers: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let index = ColumnIndex::resolve(&headers)?;

        // Rename trimmed headers to the canonical names, then coerce types.
        let mut columns = Vec::with_capacity(ALL_COLUMNS.len());
        for (name, position) in index.entries() {
            let Some(position) = position else {
                continue;
            };
            let mut column = raw.get_columns()[position].clone();
            column.rename(name.into());
            let series = column.as_materialized_series();
            let casted = match name {
                YEAR => whole_years(series)?,
                VALUE => strict_cast(series, &DataType::Float64)?,
                _ => strict_cast(series, &DataType::String)?,
            };
            columns.push(casted.into_column());
        }

        let df = DataFrame::new(columns)?;
        Ok(ColumnBuffers::from_frame(&df)?.into_frame()?)
    }
}

fn strict_cast(series: &Series, target: &DataType) -> Result<Series, LoaderError> {
    series.strict_cast(target).map_err(|e| {
        LoaderError::Format(format!("column '{}' is not {}: {}", series.name(), target, e))
    })
}

/// Year column as integers; a fractional year is rejected like in workbooks.
fn whole_years(series: &Series) -> Result<Series, LoaderError> {
    let years = strict_cast(series, &DataType::Float64)?;
    let fractional = years
        .f64()?
        .into_iter()
        .enumerate()
        .find_map(|(i, y)| y.filter(|y| y.fract() != 0.0).map(|y| (i, y)));
    if let Some((i, y)) = fractional {
        return Err(LoaderError::Format(format!(
            "row {}: column '{}' holds non-integer year {}",
            i + 2,
            YEAR,
            y
        )));
    }
    Ok(years.cast(&DataType::Int64)?)
}

/// Positions of the schema columns in the header row.
#[derive(Debug, Default)]
struct ColumnIndex {
    province: Option<usize>,
    year: Option<usize>,
    quarter: Option<usize>,
    indicator: Option<usize>,
    target: Option<usize>,
    gender: Option<usize>,
    age_group: Option<usize>,
    value: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, LoaderError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let index = Self {
            province: find(PROVINCE),
            year: find(YEAR),
            quarter: find(QUARTER),
            indicator: find(INDICATOR),
            target: find(TARGET),
            gender: find(GENDER),
            age_group: find(AGE_GROUP),
            value: find(VALUE),
        };

        let missing: Vec<&str> = index
            .entries()
            .into_iter()
            .filter(|(name, pos)| pos.is_none() && !OPTIONAL_COLUMNS.contains(name))
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::Format(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }
        Ok(index)
    }

    fn entries(&self) -> [(&'static str, Option<usize>); 8] {
        [
            (PROVINCE, self.province),
            (YEAR, self.year),
            (QUARTER, self.quarter),
            (INDICATOR, self.indicator),
            (TARGET, self.target),
            (GENDER, self.gender),
            (AGE_GROUP, self.age_group),
            (VALUE, self.value),
        ]
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text content of a categorical cell. Whitespace is kept for the cleaner.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.is_nan() => None,
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}

fn cell_number(cell: Option<&Data>, column: &str, line: usize) -> Result<Option<f64>, LoaderError> {
    let Some(cell) = cell else {
        return Ok(None);
    };
    match cell {
        Data::Empty | Data::Error(_) => Ok(None),
        Data::Float(f) if f.is_nan() => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            LoaderError::Format(format!(
                "row {}: column '{}' holds non-numeric text '{}'",
                line, column, s
            ))
        }),
        other => Err(LoaderError::Format(format!(
            "row {}: column '{}' holds unsupported cell '{}'",
            line, column, other
        ))),
    }
}

fn cell_year(cell: Option<&Data>, line: usize) -> Result<Option<i64>, LoaderError> {
    match cell_number(cell, YEAR, line)? {
        None => Ok(None),
        Some(y) if y.fract() == 0.0 => Ok(Some(y as i64)),
        Some(y) => Err(LoaderError::Format(format!(
            "row {}: column '{}' holds non-integer year {}",
            line, YEAR, y
        ))),
    }
}

/// Write `rows` to the first sheet of a new xlsx. The first row is the
/// header; other cells become numbers when they parse, blanks when empty.
#[cfg(test)]
pub(crate) fn write_xlsx(path: &Path, rows: &[&[&str]]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            if text.is_empty() {
                continue;
            }
            match text.parse::<f64>() {
                Ok(v) if r > 0 => sheet.write_number(r, c, v).unwrap(),
                _ => sheet.write_string(r, c, *text).unwrap(),
            };
        }
    }
    workbook.save(path).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &[&str] = &[
        "provinces", "annees", "trimestres", "indicateurs", "cibles", "sexes", "tranches_ages", "Valeur",
    ];

    fn format_message(err: LoaderError) -> String {
        match err {
            LoaderError::Format(msg) => msg,
            other => panic!("expected a format error, got {other}"),
        }
    }

    #[test]
    fn workbook_blank_cells_become_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datavih.xlsx");
        write_xlsx(
            &path,
            &[
                HEADER,
                &[" Kinshasa ", "2021", "T1", "Nombre de clients testés", "Oui", "", "15-24", "120"],
                &["Ituri", "2022", "T2", "Nombre de clients testés", "Oui", "Masculin", "", ""],
            ],
        );

        let df = DataLoader::load(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), ALL_COLUMNS.len());
        assert_eq!(df.column(GENDER).unwrap().null_count(), 1);
        assert_eq!(df.column(AGE_GROUP).unwrap().null_count(), 1);
        assert_eq!(df.column(VALUE).unwrap().null_count(), 1);

        let provinces = df.column(PROVINCE).unwrap().as_materialized_series().clone();
        assert_eq!(provinces.str().unwrap().get(0), Some(" Kinshasa "));
        let years = df.column(YEAR).unwrap().as_materialized_series().clone();
        assert_eq!(years.i64().unwrap().get(1), Some(2022));
    }

    #[test]
    fn workbook_without_cells_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_xlsx(&path, &[]);
        let msg = format_message(DataLoader::load(&path).unwrap_err());
        assert!(msg.contains("is empty"));
    }

    #[test]
    fn workbook_header_only_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.xlsx");
        write_xlsx(&path, &[HEADER]);
        let msg = format_message(DataLoader::load(&path).unwrap_err());
        assert!(msg.contains("no data rows"));
    }

    #[test]
    fn workbook_missing_value_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.xlsx");
        write_xlsx(
            &path,
            &[&HEADER[..7], &["Kinshasa", "2021", "T1", "Tests", "Oui", "Masculin", "15-24"]],
        );
        let msg = format_message(DataLoader::load(&path).unwrap_err());
        assert!(msg.contains("Valeur"));
    }

    #[test]
    fn workbook_text_value_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.xlsx");
        write_xlsx(
            &path,
            &[
                HEADER,
                &["Kinshasa", "2021", "T1", "Tests", "Oui", "Masculin", "15-24", "10"],
                &["Kinshasa", "2021", "T2", "Tests", "Oui", "Masculin", "15-24", "beaucoup"],
            ],
        );
        let msg = format_message(DataLoader::load(&path).unwrap_err());
        assert!(msg.contains("row 3"));
        assert!(msg.contains("beaucoup"));
    }

    #[test]
    fn corrupt_workbook_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "broken.xlsx", "this is not a zip archive");
        let msg = format_message(DataLoader::load(&path).unwrap_err());
        assert!(msg.contains("unreadable workbook"));
    }

    #[test]
    fn csv_fractional_year_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "data.csv",
            "provinces,annees,trimestres,indicateurs,cibles,Valeur\n\
             Kinshasa,2021,T1,Tests,Oui,1\n\
             Ituri,2021.5,T2,Tests,Oui,2\n",
        );
        let msg = format_message(DataLoader::load(&path).unwrap_err());
        assert!(msg.contains("row 3"));
        assert!(msg.contains("2021.5"));
    }

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = DataLoader::load(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "data.txt", "a,b\n1,2\n");
        let err = DataLoader::load(&path).unwrap_err();
        assert!(matches!(err, LoaderError::Format(_)));
    }

    #[test]
    fn csv_with_optional_columns_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "data.csv",
            "provinces,annees,trimestres,indicateurs,cibles,Valeur\n\
             Kinshasa,2021,T1,Nombre de clients testés,Oui,120\n\
             Ituri,2022,T2,Nombre de clients testés,Oui,\n",
        );
        let df = DataLoader::load(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), ALL_COLUMNS.len());
        assert_eq!(df.column(GENDER).unwrap().null_count(), 2);
        assert_eq!(df.column(VALUE).unwrap().null_count(), 1);
        assert_eq!(df.column(YEAR).unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn csv_missing_required_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "data.csv", "provinces,annees\nKinshasa,2021\n");
        let err = DataLoader::load(&path).unwrap_err();
        match err {
            LoaderError::Format(msg) => assert!(msg.contains("Valeur")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn numeric_cells_parse_or_fail() {
        assert_eq!(cell_number(Some(&Data::Int(4)), VALUE, 2).unwrap(), Some(4.0));
        assert_eq!(
            cell_number(Some(&Data::String(" 12.5 ".into())), VALUE, 2).unwrap(),
            Some(12.5)
        );
        assert_eq!(cell_number(Some(&Data::Empty), VALUE, 2).unwrap(), None);
        assert!(cell_number(Some(&Data::String("n/a".into())), VALUE, 2).is_err());
        assert!(cell_year(Some(&Data::Float(2021.5)), 3).is_err());
        assert_eq!(cell_year(Some(&Data::Float(2021.0)), 3).unwrap(), Some(2021));
    }

    #[test]
    fn text_cells_keep_whitespace() {
        assert_eq!(cell_text(&Data::String(" Kinshasa ".into())), Some(" Kinshasa ".into()));
        assert_eq!(cell_text(&Data::Float(2020.0)), Some("2020".into()));
        assert_eq!(cell_text(&Data::Empty), None);
    }
}
