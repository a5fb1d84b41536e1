//! Shared formats and table-writing helpers for both workbooks.

use crate::config::WorkbookStyle;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Worksheet, XlsxError};

pub(crate) const NUMBER_FORMAT: &str = "#,##0.00";
pub(crate) const INTEGER_FORMAT: &str = "#,##0";

/// Reusable cell formats derived from the configured colours.
pub(crate) struct Styles {
    pub title: Format,
    pub subtitle: Format,
    pub section: Format,
    pub header: Format,
    pub text: Format,
    pub number: Format,
    pub integer: Format,
    pub kpi_title: Format,
    pub kpi_value: Format,
    pub selector: Format,
    pub notice: Format,
}

impl Styles {
    pub fn new(style: &WorkbookStyle) -> Self {
        let accent = style.accent_color;
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_font_color(accent),
            subtitle: Format::new().set_italic().set_font_size(10),
            section: Format::new()
                .set_bold()
                .set_font_size(12)
                .set_font_color(accent),
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_background_color(accent)
                .set_font_color(style.header_font_color)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            number: Format::new()
                .set_num_format(NUMBER_FORMAT)
                .set_border(FormatBorder::Thin),
            integer: Format::new()
                .set_num_format(INTEGER_FORMAT)
                .set_border(FormatBorder::Thin),
            kpi_title: Format::new().set_bold().set_font_size(10),
            kpi_value: Format::new()
                .set_bold()
                .set_font_size(20)
                .set_font_color(accent)
                .set_background_color(style.kpi_fill_color)
                .set_num_format(INTEGER_FORMAT),
            selector: Format::new()
                .set_bold()
                .set_background_color(style.selector_fill_color)
                .set_border(FormatBorder::Thin),
            notice: Format::new()
                .set_bold()
                .set_font_size(12)
                .set_font_color(0xC00000),
        }
    }
}

/// One cell of a styled table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Text(String),
    Number(f64),
    Integer(f64),
    Formula(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

/// Merged title across `last_col + 1` columns.
pub(crate) fn write_title(
    sheet: &mut Worksheet,
    row: u32,
    last_col: u16,
    text: &str,
    format: &Format,
) -> Result<(), XlsxError> {
    sheet.merge_range(row, 0, row, last_col, text, format)?;
    Ok(())
}

/// Header row plus bordered body rows. Returns the last row written.
pub(crate) fn write_table(
    sheet: &mut Worksheet,
    styles: &Styles,
    (first_row, first_col): (u32, u16),
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> Result<u32, XlsxError> {
    for (j, header) in headers.iter().enumerate() {
        sheet.write_with_format(first_row, first_col + j as u16, *header, &styles.header)?;
    }
    for (i, cells) in rows.iter().enumerate() {
        let row = first_row + 1 + i as u32;
        for (j, cell) in cells.iter().enumerate() {
            let col = first_col + j as u16;
            match cell {
                Cell::Text(s) => sheet.write_with_format(row, col, s.as_str(), &styles.text)?,
                Cell::Number(v) => sheet.write_with_format(row, col, *v, &styles.number)?,
                Cell::Integer(v) => sheet.write_with_format(row, col, *v, &styles.integer)?,
                Cell::Formula(f) => {
                    sheet.write_formula_with_format(row, col, f.as_str(), &styles.number)?
                }
            };
        }
    }
    Ok(first_row + rows.len() as u32)
}

pub(crate) fn set_widths(sheet: &mut Worksheet, widths: &[f64]) -> Result<(), XlsxError> {
    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

/// Spreadsheet column name for a zero-based index: 0 -> A, 26 -> AA.
pub(crate) fn col_letter(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name.iter().rev().collect()
}

/// Absolute A1 range such as `$B$4:$B$20` (rows zero-based).
pub(crate) fn absolute_range(col: u16, first_row: u32, last_row: u32) -> String {
    let letter = col_letter(col);
    format!("${0}${1}:${0}${2}", letter, first_row + 1, last_row + 1)
}

/// Sheet-qualified reference, quoted when the name needs it.
pub(crate) fn sheet_ref(sheet: &str, range: &str) -> String {
    if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        format!("{}!{}", sheet, range)
    } else {
        format!("'{}'!{}", sheet, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_letter(0), "A");
        assert_eq!(col_letter(25), "Z");
        assert_eq!(col_letter(26), "AA");
        assert_eq!(col_letter(51), "AZ");
        assert_eq!(col_letter(52), "BA");
    }

    #[test]
    fn references_are_absolute_and_quoted() {
        assert_eq!(absolute_range(1, 3, 19), "$B$4:$B$20");
        assert_eq!(sheet_ref("Data", "$A$2:$A$9"), "Data!$A$2:$A$9");
        assert_eq!(sheet_ref("Cascade_95-95-95", "$A$1"), "'Cascade_95-95-95'!$A$1");
    }
}
