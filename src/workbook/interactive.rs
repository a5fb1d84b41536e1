//! Interactive workbook: an indicator selector bound to a named range, live
//! SUMIF/COUNTIF/AVERAGEIF results over the data sheet, the cascade by year
//! and province, and one analysis sheet per featured indicator.

use super::styles::{absolute_range, set_widths, sheet_ref, write_table, write_title, Cell, Styles};
use super::{add_column_series, titled_chart, write_data_sheet, WorkbookError};
use crate::aggregate::{round2, shares, year_over_year, Aggregator, PivotTable};
use crate::cascade::{CascadeCalculator, CascadeIndicators, CascadeRecord};
use crate::classify::categorize_all;
use crate::config::WorkbookStyle;
use crate::data::schema::{INDICATOR, VALUE, YEAR};
use crate::data::{CleanedDataset, Dimension};
use rust_xlsxwriter::{ChartType, DataValidation, Formula, Workbook, Worksheet, XlsxError};
use std::path::Path;

const INDICATOR_LIST: &str = "Liste_Indicateurs";
const DASHBOARD: &str = "Dashboard_Interactif";
const CASCADE: &str = "Cascade_95-95-95";
const FORMULAS: &str = "Formules_Reference";

/// Workbook-level name of the indicator list the selector validates against.
pub(crate) const INDICATOR_RANGE_NAME: &str = "ListeIndicateurs";

/// Upper bound on per-indicator sheets.
pub const MAX_INDICATOR_SHEETS: usize = 10;

const CASCADE_HEADERS: [&str; 4] = ["Testés", "Diagnostiqués VIH+", "Sous TAR", "Charge Virale Supprimée"];

/// Interactive workbook writer.
pub struct InteractiveWorkbook<'a> {
    style: &'a WorkbookStyle,
    cascade: &'a CascadeIndicators,
    featured: &'a [String],
}

impl<'a> InteractiveWorkbook<'a> {
    pub fn new(
        style: &'a WorkbookStyle,
        cascade: &'a CascadeIndicators,
        featured: &'a [String],
    ) -> Self {
        Self {
            style,
            cascade,
            featured,
        }
    }

    pub fn save(&self, ds: &CleanedDataset, path: &Path) -> Result<(), WorkbookError> {
        let mut workbook = self.build(ds)?;
        workbook.save(path)?;
        log::info!("Workbook saved: {}", path.display());
        Ok(())
    }

    /// Featured indicators present in the dataset, at most ten.
    pub fn available_indicators(&self, ds: &CleanedDataset) -> Result<Vec<String>, WorkbookError> {
        let present = ds.unique_values(Dimension::Indicator)?;
        let available: Vec<String> = self
            .featured
            .iter()
            .filter(|name| present.contains(name))
            .take(MAX_INDICATOR_SHEETS)
            .cloned()
            .collect();
        for missing in self.featured.iter().filter(|name| !present.contains(name)) {
            log::warn!("Featured indicator not in dataset, no sheet: '{}'", missing);
        }
        Ok(available)
    }

    pub(crate) fn build(&self, ds: &CleanedDataset) -> Result<Workbook, WorkbookError> {
        let styles = Styles::new(self.style);
        let mut workbook = Workbook::new();
        let indicators = ds.unique_values(Dimension::Indicator)?;
        let available = self.available_indicators(ds)?;

        let list_rows = self.indicator_list_sheet(&mut workbook, &styles, &indicators)?;
        if let Some((first, last)) = list_rows {
            let range = sheet_ref(INDICATOR_LIST, &absolute_range(1, first, last));
            workbook.define_name(INDICATOR_RANGE_NAME, &format!("={}", range))?;
        }
        self.dashboard_sheet(&mut workbook, &styles, ds, &indicators, &available)?;
        self.cascade_sheet(&mut workbook, &styles, ds)?;
        for (i, indicator) in available.iter().enumerate() {
            log::debug!("Indicator sheet Ind_{}: {}", i + 1, indicator);
            let scoped = ds.filter_indicator(indicator)?;
            self.indicator_sheet(&mut workbook, &styles, &scoped, indicator, i + 1)?;
        }
        self.formulas_sheet(&mut workbook, &styles)?;
        write_data_sheet(&mut workbook, &styles, ds)?;

        log::info!(
            "Interactive workbook: {} indicators listed, {} indicator sheets",
            indicators.len(),
            available.len()
        );
        Ok(workbook)
    }

    /// Returns the first and last rows of the indicator names, if any.
    fn indicator_list_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        indicators: &[String],
    ) -> Result<Option<(u32, u32)>, WorkbookError> {
        let rows: Vec<Vec<Cell>> = categorize_all(indicators)
            .into_iter()
            .enumerate()
            .map(|(i, (name, category))| {
                vec![
                    Cell::Integer((i + 1) as f64),
                    Cell::text(name),
                    Cell::text(category.label()),
                ]
            })
            .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(INDICATOR_LIST)?;
        write_title(sheet, 0, 2, "LISTE DES INDICATEURS VIH/SIDA", &styles.title)?;
        let last = write_table(sheet, styles, (2, 0), &["N°", "Indicateur", "Catégorie"], &rows)?;
        set_widths(sheet, &[5.0, 70.0, 20.0])?;

        Ok((!rows.is_empty()).then_some((3, last)))
    }

    fn dashboard_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
        indicators: &[String],
        available: &[String],
    ) -> Result<(), WorkbookError> {
        let years = ds.unique_values(Dimension::Year)?;
        let sheet = workbook.add_worksheet();
        sheet.set_name(DASHBOARD)?;
        write_title(sheet, 0, 7, "TABLEAU DE BORD INTERACTIF - VIH/SIDA RDC", &styles.title)?;
        sheet.merge_range(
            1,
            0,
            1,
            7,
            "Sélectionnez un indicateur dans la liste ci-dessous pour voir les analyses correspondantes",
            &styles.subtitle,
        )?;

        // Selector in B4, validated against the named indicator list.
        sheet.write_with_format(3, 0, "SÉLECTIONNER UN INDICATEUR:", &styles.kpi_title)?;
        let default = indicators.first().map(String::as_str).unwrap_or("");
        sheet.merge_range(3, 1, 3, 6, default, &styles.selector)?;
        if !indicators.is_empty() {
            let validation = DataValidation::new()
                .allow_list_formula(Formula::new(format!("={}", INDICATOR_RANGE_NAME)));
            sheet.add_data_validation(3, 1, 3, 1, &validation)?;
        }

        sheet.write_with_format(5, 0, "INSTRUCTIONS:", &styles.notice)?;
        let instructions = [
            "1. Cliquez sur la cellule jaune ci-dessus (B4)".to_string(),
            "2. Un menu déroulant apparaîtra avec la liste des indicateurs".to_string(),
            "3. Sélectionnez l'indicateur que vous souhaitez analyser".to_string(),
            "4. Les résultats ci-dessous se recalculent automatiquement".to_string(),
            String::new(),
            "ONGLETS DE CE CLASSEUR:".to_string(),
            format!(
                "• {}: Liste complète des {} indicateurs",
                INDICATOR_LIST,
                indicators.len()
            ),
            format!("• {}: Cette page (sélection d'indicateur)", DASHBOARD),
            format!("• {}: Analyse de la cascade ONUSIDA", CASCADE),
            format!(
                "• Ind_1 à Ind_{}: Analyses détaillées par indicateur",
                available.len()
            ),
        ];
        for (i, line) in instructions.iter().enumerate() {
            sheet.write_string(6 + i as u32, 0, line.as_str())?;
        }

        let mut row = 6 + instructions.len() as u32 + 1;
        row = live_results(sheet, styles, row, &years)?;

        row += 2;
        sheet.write_with_format(row, 0, "INDEX DES ONGLETS D'ANALYSE PAR INDICATEUR:", &styles.section)?;
        let index_rows: Vec<Vec<Cell>> = available
            .iter()
            .enumerate()
            .map(|(i, name)| vec![Cell::text(format!("Ind_{}", i + 1)), Cell::text(name.as_str())])
            .collect();
        row = write_table(sheet, styles, (row + 1, 0), &["Onglet", "Indicateur"], &index_rows)?;

        row += 2;
        sheet.write_with_format(row, 0, "STATISTIQUES RAPIDES DU DATASET:", &styles.section)?;
        let period = match ds.year_span()? {
            Some((first, last)) => format!("{} - {}", first, last),
            None => "N/A".to_string(),
        };
        let quick = vec![
            vec![Cell::text("Nombre total d'enregistrements"), Cell::Integer(ds.height() as f64)],
            vec![
                Cell::text("Nombre de provinces"),
                Cell::Integer(ds.n_unique(Dimension::Province)? as f64),
            ],
            vec![Cell::text("Nombre d'indicateurs"), Cell::Integer(indicators.len() as f64)],
            vec![Cell::text("Période couverte"), Cell::text(period)],
        ];
        write_table(sheet, styles, (row + 1, 0), &["Métrique", "Valeur"], &quick)?;

        set_widths(sheet, &[40.0, 70.0])?;
        Ok(())
    }

    fn cascade_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let calculator = CascadeCalculator::new(self.cascade);
        let by_year = calculator.by_year(ds)?;
        let mut by_province = calculator.by_province(ds)?;
        by_province.sort_by(|a, b| {
            b.totals
                .tested
                .partial_cmp(&a.totals.tested)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let sheet = workbook.add_worksheet();
        sheet.set_name(CASCADE)?;
        write_title(sheet, 0, 7, "CASCADE ONUSIDA 95-95-95 - RDC", &styles.title)?;
        sheet.merge_range(
            1,
            0,
            1,
            7,
            "Objectif: 95% diagnostiqués | 95% sous traitement | 95% charge virale supprimée",
            &styles.subtitle,
        )?;

        sheet.write_with_format(3, 0, "Cascade par Année", &styles.section)?;
        let year_last = write_table(
            sheet,
            styles,
            (4, 0),
            &with_scope("Année"),
            &cascade_rows(&by_year),
        )?;

        let rate_row = year_last + 2;
        let rates: Vec<Vec<Cell>> = by_year
            .iter()
            .map(|r| {
                vec![
                    Cell::text(r.scope.as_str()),
                    Cell::Number(round2(r.treatment_rate)),
                    Cell::Number(round2(r.suppression_rate)),
                ]
            })
            .collect();
        let rate_last = write_table(
            sheet,
            styles,
            (rate_row, 0),
            &["Année", "Taux Traitement (%)", "Taux Suppression (%)"],
            &rates,
        )?;

        if !by_year.is_empty() {
            let mut chart = titled_chart(ChartType::Column, "Cascade ONUSIDA par Année", (720, 480));
            for (j, name) in CASCADE_HEADERS.iter().enumerate() {
                add_column_series(&mut chart, CASCADE, name, (5, year_last), (0, j as u16 + 1));
            }
            chart.x_axis().set_name("Année");
            chart.y_axis().set_name("Nombre de Personnes");
            sheet.insert_chart(3, 6, &chart)?;
        }

        let province_row = rate_last + 3;
        sheet.write_with_format(province_row, 0, "Cascade par Province", &styles.section)?;
        write_table(
            sheet,
            styles,
            (province_row + 1, 0),
            &with_scope("Province"),
            &cascade_rows(&by_province),
        )?;

        set_widths(sheet, &[22.0; 6])?;
        Ok(())
    }

    fn indicator_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
        indicator: &str,
        index: usize,
    ) -> Result<(), WorkbookError> {
        let name = format!("Ind_{}", index);
        let total: f64 = ds.values()?.iter().sum();

        let years = Aggregator::group_by(ds, &[Dimension::Year])?.sorted_by_key();
        let year_series: Vec<(String, f64)> = years
            .rows
            .iter()
            .map(|r| (r.key().to_string(), r.sum.round()))
            .collect();
        let year_rows: Vec<Vec<Cell>> = year_over_year(&year_series)
            .into_iter()
            .map(|g| {
                vec![
                    Cell::Text(g.period),
                    Cell::Integer(g.value),
                    Cell::Number(round2(g.growth)),
                ]
            })
            .collect();

        let provinces = Aggregator::group_by(ds, &[Dimension::Province])?.sorted_by_sum_desc();
        let province_rows: Vec<Vec<Cell>> = shares(&provinces)
            .into_iter()
            .enumerate()
            .map(|(i, share)| {
                vec![
                    Cell::Integer((i + 1) as f64),
                    Cell::Text(share.label),
                    Cell::Integer(share.total.round()),
                    Cell::Number(share.percent),
                ]
            })
            .collect();

        let pivot = PivotTable::sum(ds, Dimension::Province, Dimension::Year)?.sorted_by_total_desc();

        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        write_title(sheet, 0, 5, &format!("ANALYSE: {}", indicator), &styles.section)?;
        sheet.write_with_format(2, 0, "TOTAL", &styles.kpi_title)?;
        sheet.write_with_format(2, 1, total.round(), &styles.kpi_value)?;

        // By year, with growth.
        sheet.write_with_format(4, 0, "Analyse par Année", &styles.section)?;
        let year_last = write_table(
            sheet,
            styles,
            (5, 0),
            &["Année", "Valeur", "Croissance (%)"],
            &year_rows,
        )?;
        if !year_rows.is_empty() {
            let mut chart = titled_chart(ChartType::Line, "Évolution Annuelle", (480, 320));
            add_column_series(&mut chart, &name, "Valeur", (6, year_last), (0, 1));
            chart.y_axis().set_name("Valeur");
            sheet.insert_chart(4, 4, &chart)?;
        }

        // By province, ranked.
        let province_row = year_last.max(20) + 3;
        sheet.write_with_format(province_row, 0, "Analyse par Province", &styles.section)?;
        let province_last = write_table(
            sheet,
            styles,
            (province_row + 1, 0),
            &["Rang", "Province", "Valeur", "% du Total"],
            &province_rows,
        )?;
        if !province_rows.is_empty() {
            let mut chart = titled_chart(ChartType::Column, "Top 10 Provinces", (560, 400));
            let top_last = province_last.min(province_row + 11);
            add_column_series(&mut chart, &name, "Valeur", (province_row + 2, top_last), (1, 2));
            chart.legend().set_hidden();
            sheet.insert_chart(province_row, 5, &chart)?;
        }

        // Quarter, gender and age splits.
        let mut row = province_last + 3;
        for (dim, title) in [
            (Dimension::Quarter, "Analyse par Trimestre"),
            (Dimension::Gender, "Analyse par Sexe"),
            (Dimension::AgeGroup, "Analyse par Tranche d'Âge"),
        ] {
            let group = Aggregator::group_by(ds, &[dim])?.sorted_by_key();
            let rows: Vec<Vec<Cell>> = shares(&group)
                .into_iter()
                .map(|share| {
                    vec![
                        Cell::Text(share.label),
                        Cell::Integer(share.total.round()),
                        Cell::Number(share.percent),
                    ]
                })
                .collect();

            sheet.write_with_format(row, 0, title, &styles.section)?;
            let last = write_table(
                sheet,
                styles,
                (row + 1, 0),
                &[dim.label(), "Valeur", "% du Total"],
                &rows,
            )?;
            if rows.len() > 1 && dim != Dimension::Quarter {
                let (kind, chart_title) = if dim == Dimension::Gender {
                    (ChartType::Pie, "Répartition par Sexe")
                } else {
                    (ChartType::Column, "Distribution par Âge")
                };
                let mut chart = titled_chart(kind, chart_title, (480, 320));
                add_column_series(&mut chart, &name, "Valeur", (row + 2, last), (0, 1));
                sheet.insert_chart(row, 4, &chart)?;
                row = last.max(row + 16) + 3;
            } else {
                row = last + 3;
            }
        }

        // Province x year cross-tab.
        sheet.write_with_format(row, 0, "Tableau Croisé: Province × Année", &styles.section)?;
        let totals = pivot.row_totals();
        let pivot_rows: Vec<Vec<Cell>> = pivot
            .row_labels
            .iter()
            .zip(&pivot.cells)
            .zip(&totals)
            .map(|((label, cells), total)| {
                let mut r = vec![Cell::text(label.as_str())];
                r.extend(cells.iter().map(|c| Cell::Integer(c.unwrap_or(0.0).round())));
                r.push(Cell::Integer(total.round()));
                r
            })
            .collect();
        let mut headers: Vec<&str> = vec!["provinces"];
        headers.extend(pivot.col_labels.iter().map(String::as_str));
        headers.push("TOTAL");
        write_table(sheet, styles, (row + 1, 0), &headers, &pivot_rows)?;

        set_widths(sheet, &[20.0, 18.0, 15.0, 12.0])?;
        Ok(())
    }

    fn formulas_sheet(&self, workbook: &mut Workbook, styles: &Styles) -> Result<(), WorkbookError> {
        let rows: Vec<Vec<Cell>> = [
            ["SUMIF", "=SUMIF(plage_critère, critère, plage_somme)", "Somme conditionnelle", "=SUMIF(indicateurs,B4,Valeur)"],
            ["COUNTIF", "=COUNTIF(plage, critère)", "Comptage conditionnel", "=COUNTIF(indicateurs,B4)"],
            [
                "AVERAGEIF",
                "=AVERAGEIF(plage_critère, critère, plage_moyenne)",
                "Moyenne conditionnelle",
                "=AVERAGEIF(indicateurs,B4,Valeur)",
            ],
            [
                "SUMIFS",
                "=SUMIFS(somme, plage1, crit1, plage2, crit2)",
                "Somme multi-critères",
                "=SUMIFS(Valeur,indicateurs,B4,annees,2024)",
            ],
            ["FILTER", "=FILTER(données, condition)", "Filtrage dynamique (Excel 365)", "=FILTER(A:H,D:D=B4)"],
            ["UNIQUE", "=UNIQUE(plage)", "Valeurs uniques", "=UNIQUE(provinces)"],
            ["SORT", "=SORT(plage, col, ordre)", "Tri dynamique", "=SORT(FILTER(...),2,-1)"],
            ["XLOOKUP", "=XLOOKUP(valeur, recherche, retour)", "Recherche moderne", "=XLOOKUP(B4,indicateurs,Valeur)"],
        ]
        .iter()
        .map(|r| r.iter().map(|s| Cell::text(*s)).collect())
        .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(FORMULAS)?;
        write_title(sheet, 0, 3, "FORMULES EXCEL POUR ANALYSE DYNAMIQUE", &styles.title)?;
        sheet.merge_range(
            2,
            0,
            2,
            3,
            "Ces formules peuvent être utilisées avec le dropdown pour filtrer les données:",
            &styles.subtitle,
        )?;
        write_table(
            sheet,
            styles,
            (4, 0),
            &["Fonction", "Syntaxe", "Description", "Exemple"],
            &rows,
        )?;
        set_widths(sheet, &[15.0, 50.0, 35.0, 45.0])?;
        Ok(())
    }
}

/// Totals and rates for the selected indicator, recomputed by the
/// spreadsheet from the data sheet names. Returns the last row written.
fn live_results(
    sheet: &mut Worksheet,
    styles: &Styles,
    row: u32,
    years: &[String],
) -> Result<u32, XlsxError> {
    let selected = "$B$4";
    sheet.write_with_format(row, 0, "RÉSULTATS POUR L'INDICATEUR SÉLECTIONNÉ:", &styles.section)?;
    let summary = vec![
        vec![
            Cell::text("Total (SUMIF)"),
            Cell::Formula(format!("=SUMIF({},{},{})", INDICATOR, selected, VALUE)),
        ],
        vec![
            Cell::text("Nombre d'enregistrements (COUNTIF)"),
            Cell::Formula(format!("=COUNTIF({},{})", INDICATOR, selected)),
        ],
        vec![
            Cell::text("Moyenne (AVERAGEIF)"),
            Cell::Formula(format!(
                "=IFERROR(AVERAGEIF({},{},{}),0)",
                INDICATOR, selected, VALUE
            )),
        ],
    ];
    let last = write_table(sheet, styles, (row + 1, 0), &["Métrique", "Valeur"], &summary)?;

    let by_year: Vec<Vec<Cell>> = years
        .iter()
        .enumerate()
        .map(|(i, year)| {
            let year_cell = format!("$A${}", last + 4 + i as u32);
            vec![
                Cell::Integer(year.parse::<f64>().unwrap_or(0.0)),
                Cell::Formula(format!(
                    "=SUMIFS({},{},{},{},{})",
                    VALUE, INDICATOR, selected, YEAR, year_cell
                )),
            ]
        })
        .collect();
    write_table(sheet, styles, (last + 2, 0), &["Année", "Total (SUMIFS)"], &by_year)
}

fn with_scope(scope: &'static str) -> [&'static str; 5] {
    [
        scope,
        CASCADE_HEADERS[0],
        CASCADE_HEADERS[1],
        CASCADE_HEADERS[2],
        CASCADE_HEADERS[3],
    ]
}

fn cascade_rows(records: &[CascadeRecord]) -> Vec<Vec<Cell>> {
    records
        .iter()
        .map(|r| {
            vec![
                Cell::text(r.scope.as_str()),
                Cell::Integer(r.totals.tested.round()),
                Cell::Integer(r.totals.diagnosed.round()),
                Cell::Integer(r.totals.on_treatment.round()),
                Cell::Integer(r.totals.suppressed.round()),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset, row};

    fn featured() -> Vec<String> {
        vec![
            "Nombre de clients testés".to_string(),
            "Absent".to_string(),
            "Nombre de PVVIH sous TAR".to_string(),
        ]
    }

    fn sample() -> CleanedDataset {
        dataset(&[
            row("Kinshasa", 2020, "T1", "Nombre de clients testés", 100.0),
            row("Ituri", 2021, "T2", "Nombre de clients testés", 50.0),
            row("Kinshasa", 2021, "T1", "Nombre de PVVIH sous TAR", 60.0),
            row("Kinshasa", 2021, "T1", "Indicateur inconnu", 1.0),
        ])
    }

    #[test]
    fn only_present_featured_indicators_get_sheets() {
        let style = WorkbookStyle::default();
        let cascade = CascadeIndicators::default();
        let featured = featured();
        let wb = InteractiveWorkbook::new(&style, &cascade, &featured);
        let available = wb.available_indicators(&sample()).unwrap();
        assert_eq!(
            available,
            ["Nombre de clients testés", "Nombre de PVVIH sous TAR"]
        );
    }

    #[test]
    fn saves_interactive_workbook() {
        let style = WorkbookStyle::default();
        let cascade = CascadeIndicators::default();
        let featured = featured();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactive.xlsx");

        InteractiveWorkbook::new(&style, &cascade, &featured)
            .save(&sample(), &path)
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn cascade_rows_round_totals() {
        let ds = sample();
        let records = CascadeCalculator::new(&CascadeIndicators::default())
            .by_year(&ds)
            .unwrap();
        let rows = cascade_rows(&records);
        assert_eq!(rows[0][0], Cell::text("2020"));
        assert_eq!(rows[0][1], Cell::Integer(100.0));
        assert_eq!(rows[1][3], Cell::Integer(60.0));
    }
}
