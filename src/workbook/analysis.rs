//! Analysis workbook: summary sheets with embedded charts, a province x year
//! pivot, lookup reference tables and a KPI dashboard.

use super::styles::{absolute_range, set_widths, write_table, write_title, Cell, Styles};
use super::{add_column_series, share_rows, titled_chart, write_data_sheet, WorkbookError};
use crate::aggregate::{round2, year_over_year, yearly_totals, Aggregator, PivotTable};
use crate::cascade::{CascadeCalculator, CascadeIndicators};
use crate::classify::{categorize_all, province_codes};
use crate::config::WorkbookStyle;
use crate::data::{CleanedDataset, Dimension};
use crate::stats::DescriptiveStats;
use rust_xlsxwriter::{
    ChartType, ConditionalFormat3ColorScale, ConditionalFormatType, Table, TableColumn,
    TableStyle, Workbook,
};
use std::path::Path;

const SUMMARY: &str = "Statistiques_Resume";
const PROVINCES: &str = "Resume_Province";
const YEARS: &str = "Resume_Annee";
const CASCADE: &str = "Cascade_ONUSIDA";
const PIVOT: &str = "Tableau_Croise";
const LOOKUP: &str = "Reference_Lookup";
const DASHBOARD: &str = "Dashboard";
const FORMULAS: &str = "Formules_Analyse";
const GENDER: &str = "Analyse_Genre";
const AGE: &str = "Analyse_Age";

/// Analysis workbook writer.
pub struct AnalysisWorkbook<'a> {
    style: &'a WorkbookStyle,
    cascade: &'a CascadeIndicators,
}

impl<'a> AnalysisWorkbook<'a> {
    pub fn new(style: &'a WorkbookStyle, cascade: &'a CascadeIndicators) -> Self {
        Self { style, cascade }
    }

    /// Build every sheet and save to `path`.
    pub fn save(
        &self,
        ds: &CleanedDataset,
        summary: Option<&DescriptiveStats>,
        path: &Path,
    ) -> Result<(), WorkbookError> {
        let mut workbook = self.build(ds, summary)?;
        workbook.save(path)?;
        log::info!("Workbook saved: {}", path.display());
        Ok(())
    }

    pub(crate) fn build(
        &self,
        ds: &CleanedDataset,
        summary: Option<&DescriptiveStats>,
    ) -> Result<Workbook, WorkbookError> {
        let styles = Styles::new(self.style);
        let mut workbook = Workbook::new();

        self.summary_sheet(&mut workbook, &styles, ds, summary)?;
        self.province_sheet(&mut workbook, &styles, ds)?;
        self.year_sheet(&mut workbook, &styles, ds)?;
        self.cascade_sheet(&mut workbook, &styles, ds)?;
        self.pivot_sheet(&mut workbook, &styles, ds)?;
        self.lookup_sheet(&mut workbook, &styles, ds)?;
        self.dashboard_sheet(&mut workbook, &styles, ds)?;
        self.formulas_sheet(&mut workbook, &styles)?;
        self.share_sheet(&mut workbook, &styles, ds, Dimension::Gender)?;
        self.share_sheet(&mut workbook, &styles, ds, Dimension::AgeGroup)?;
        write_data_sheet(&mut workbook, &styles, ds)?;

        Ok(workbook)
    }

    fn summary_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
        summary: Option<&DescriptiveStats>,
    ) -> Result<(), WorkbookError> {
        let values = ds.values()?;
        let total: f64 = values.iter().sum();
        let span = match ds.year_span()? {
            Some((first, last)) => format!("{} - {}", first, last),
            None => "N/A".to_string(),
        };

        let mut basics = vec![
            vec![Cell::text("Nombre total d'enregistrements"), Cell::Integer(ds.height() as f64)],
            vec![
                Cell::text("Nombre de provinces"),
                Cell::Integer(ds.n_unique(Dimension::Province)? as f64),
            ],
            vec![
                Cell::text("Nombre d'années"),
                Cell::Integer(ds.n_unique(Dimension::Year)? as f64),
            ],
            vec![Cell::text("Années couvertes"), Cell::text(span)],
            vec![
                Cell::text("Nombre d'indicateurs"),
                Cell::Integer(ds.n_unique(Dimension::Indicator)? as f64),
            ],
            vec![Cell::text("Valeur totale"), Cell::Number(total)],
        ];
        if let Some(s) = summary {
            basics.extend([
                vec![Cell::text("Valeur moyenne"), Cell::Number(round2(s.mean))],
                vec![Cell::text("Valeur médiane"), Cell::Number(s.median)],
                vec![Cell::text("Valeur maximale"), Cell::Number(s.max)],
                vec![Cell::text("Valeur minimale"), Cell::Number(s.min)],
                vec![Cell::text("Écart-type"), Cell::Number(round2(s.std))],
            ]);
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name(SUMMARY)?;
        write_title(sheet, 0, 5, "RÉSUMÉ STATISTIQUE - DONNÉES VIH/SIDA RDC", &styles.title)?;
        sheet.write_with_format(2, 0, "Statistiques de Base", &styles.section)?;
        let last = write_table(sheet, styles, (3, 0), &["Métrique", "Valeur"], &basics)?;

        if let Some(s) = summary {
            let row = last + 2;
            sheet.write_with_format(row, 0, "Statistiques Descriptives", &styles.section)?;
            let rows: Vec<Vec<Cell>> = s
                .rows()
                .into_iter()
                .map(|(label, value)| {
                    let v = match value {
                        Some(v) => Cell::Number(round2(v)),
                        None => Cell::text("N/A"),
                    };
                    vec![Cell::text(label), v]
                })
                .collect();
            write_table(sheet, styles, (row + 1, 0), &["Statistique", "Valeur"], &rows)?;
        }
        set_widths(sheet, &[35.0, 25.0])?;
        Ok(())
    }

    fn province_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let group = Aggregator::group_by(ds, &[Dimension::Province])?.sorted_by_sum_desc();
        let rows: Vec<Vec<Cell>> = group
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                vec![
                    Cell::Integer((i + 1) as f64),
                    Cell::text(r.key()),
                    Cell::Number(round2(r.sum)),
                    Cell::Number(round2(r.mean)),
                    Cell::Number(round2(r.min)),
                    Cell::Number(round2(r.max)),
                    Cell::Integer(r.count as f64),
                ]
            })
            .collect();
        let headers = ["Rang", "provinces", "Total", "Moyenne", "Min", "Max", "Nb_Records"];

        let sheet = workbook.add_worksheet();
        sheet.set_name(PROVINCES)?;
        write_title(sheet, 0, 6, "RÉSUMÉ PAR PROVINCE", &styles.title)?;
        let last = write_table(sheet, styles, (2, 0), &headers, &rows)?;

        if !rows.is_empty() {
            let columns: Vec<TableColumn> = headers
                .iter()
                .map(|h| TableColumn::new().set_header(*h))
                .collect();
            let table = Table::new()
                .set_name("TableProvince")
                .set_style(TableStyle::Medium2)
                .set_columns(&columns);
            sheet.add_table(2, 0, last, 6, &table)?;

            let mut chart = titled_chart(
                ChartType::Column,
                "Top 10 Provinces par Valeur Totale",
                (720, 400),
            );
            add_column_series(&mut chart, PROVINCES, "Total", (3, last.min(12)), (1, 2));
            chart.x_axis().set_name("Province");
            chart.y_axis().set_name("Valeur Totale");
            chart.legend().set_hidden();
            sheet.insert_chart(2, 8, &chart)?;
        }
        set_widths(sheet, &[15.0, 20.0, 15.0, 15.0, 15.0, 15.0, 15.0])?;
        Ok(())
    }

    fn year_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let group = Aggregator::group_by(ds, &[Dimension::Year])?.sorted_by_key();
        let totals: Vec<(String, f64)> = group
            .rows
            .iter()
            .map(|r| (r.key().to_string(), round2(r.sum)))
            .collect();
        let growth = year_over_year(&totals);
        let rows: Vec<Vec<Cell>> = group
            .rows
            .iter()
            .zip(&growth)
            .map(|(r, g)| {
                vec![
                    Cell::text(r.key()),
                    Cell::Number(round2(r.sum)),
                    Cell::Number(round2(r.mean)),
                    Cell::Integer(r.count as f64),
                    Cell::Number(round2(g.growth)),
                ]
            })
            .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(YEARS)?;
        write_title(sheet, 0, 4, "RÉSUMÉ PAR ANNÉE", &styles.title)?;
        let last = write_table(
            sheet,
            styles,
            (2, 0),
            &["annees", "Total", "Moyenne", "Nb_Records", "Croissance_YoY"],
            &rows,
        )?;

        if !rows.is_empty() {
            let mut chart = titled_chart(ChartType::Line, "Évolution Annuelle", (600, 400));
            add_column_series(&mut chart, YEARS, "Total", (3, last), (0, 1));
            chart.x_axis().set_name("Année");
            chart.y_axis().set_name("Valeur Totale");
            sheet.insert_chart(2, 6, &chart)?;
        }
        set_widths(sheet, &[18.0; 5])?;
        Ok(())
    }

    fn cascade_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let records = CascadeCalculator::new(self.cascade).by_year(ds)?;
        let rows: Vec<Vec<Cell>> = records
            .iter()
            .map(|r| {
                vec![
                    Cell::text(r.scope.as_str()),
                    Cell::Integer(r.totals.tested),
                    Cell::Integer(r.totals.diagnosed),
                    Cell::Integer(r.totals.on_treatment),
                    Cell::Integer(r.totals.suppressed),
                    Cell::Number(round2(r.treatment_rate)),
                    Cell::Number(round2(r.suppression_rate)),
                ]
            })
            .collect();
        let headers = [
            "Année",
            "Testés",
            "Diagnostiqués",
            "Sous TAR",
            "Charge Virale Supprimée",
            "Taux Traitement (%)",
            "Taux Suppression (%)",
        ];

        let sheet = workbook.add_worksheet();
        sheet.set_name(CASCADE)?;
        write_title(sheet, 0, 6, "CASCADE ONUSIDA 95-95-95", &styles.title)?;
        sheet.merge_range(
            1,
            0,
            1,
            6,
            "Objectifs: 95% Testés | 95% Sous Traitement | 95% Charge Virale Supprimée",
            &styles.subtitle,
        )?;
        let last = write_table(sheet, styles, (3, 0), &headers, &rows)?;

        if !rows.is_empty() {
            let mut chart = titled_chart(ChartType::Column, "Cascade ONUSIDA par Année", (720, 480));
            for (j, name) in headers.iter().enumerate().skip(1).take(4) {
                add_column_series(&mut chart, CASCADE, name, (4, last), (0, j as u16));
            }
            chart.y_axis().set_name("Nombre de Personnes");
            sheet.insert_chart(3, 8, &chart)?;
        }
        set_widths(sheet, &[20.0; 7])?;
        Ok(())
    }

    fn pivot_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let pivot = PivotTable::sum(ds, Dimension::Province, Dimension::Year)?.sorted_by_total_desc();
        let totals = pivot.row_totals();
        let rows: Vec<Vec<Cell>> = pivot
            .row_labels
            .iter()
            .zip(&pivot.cells)
            .zip(&totals)
            .map(|((label, cells), total)| {
                let mut row = vec![Cell::text(label.as_str())];
                row.extend(cells.iter().map(|c| Cell::Number(c.unwrap_or(0.0))));
                row.push(Cell::Number(*total));
                row
            })
            .collect();
        let mut headers: Vec<&str> = vec!["provinces"];
        headers.extend(pivot.col_labels.iter().map(String::as_str));
        headers.push("TOTAL");

        let sheet = workbook.add_worksheet();
        sheet.set_name(PIVOT)?;
        write_title(
            sheet,
            0,
            6,
            "TABLEAU CROISÉ DYNAMIQUE - PROVINCE PAR ANNÉE",
            &styles.title,
        )?;
        let last = write_table(sheet, styles, (2, 0), &headers, &rows)?;

        let years = pivot.col_labels.len() as u16;
        if !rows.is_empty() && years > 0 {
            let scale = ConditionalFormat3ColorScale::new()
                .set_minimum_color(self.style.scale_min_color)
                .set_midpoint(ConditionalFormatType::Percentile, 50)
                .set_midpoint_color(self.style.scale_mid_color)
                .set_maximum_color(self.style.scale_max_color);
            sheet.add_conditional_format(3, 1, last, years, &scale)?;
        }
        sheet.set_column_width(0, 20)?;
        for col in 1..=years + 1 {
            sheet.set_column_width(col, 15)?;
        }
        Ok(())
    }

    fn lookup_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let provinces = ds.unique_values(Dimension::Province)?;
        let codes = province_codes(&provinces);
        let code_rows: Vec<Vec<Cell>> = codes
            .iter()
            .map(|c| {
                vec![
                    Cell::text(c.code.as_str()),
                    Cell::text(c.province.as_str()),
                    Cell::text(c.region_label()),
                ]
            })
            .collect();

        let indicators = ds.values_in_order(Dimension::Indicator)?;
        let category_rows: Vec<Vec<Cell>> = categorize_all(&indicators)
            .into_iter()
            .map(|(name, category)| vec![Cell::text(name), Cell::text(category.label())])
            .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(LOOKUP)?;
        write_title(sheet, 0, 5, "TABLES DE RÉFÉRENCE POUR LOOKUP", &styles.title)?;

        sheet.write_with_format(2, 0, "Table 1: Codes Provinces", &styles.section)?;
        let codes_last = write_table(sheet, styles, (3, 0), &["Code", "Province", "Region"], &code_rows)?;

        let mut row = codes_last + 3;
        sheet.write_with_format(row, 0, "Table 2: Catégories d'Indicateurs", &styles.section)?;
        let categories_last = write_table(
            sheet,
            styles,
            (row + 1, 0),
            &["Indicateur", "Catégorie"],
            &category_rows,
        )?;

        // Live lookups against table 1.
        row = categories_last + 3;
        sheet.write_with_format(row, 0, "Exemples de Formules LOOKUP", &styles.section)?;
        if let Some(first) = codes.first() {
            let code_col = absolute_range(0, 4, codes_last);
            let name_col = absolute_range(1, 4, codes_last);
            let region_col = absolute_range(2, 4, codes_last);
            let table = format!("$A$5:$C${}", codes_last + 1);
            let examples = [
                (
                    format!("=VLOOKUP(\"{}\",{},2,FALSE)", first.code, table),
                    "Trouver province par code",
                ),
                (
                    format!(
                        "=INDEX({},MATCH(\"{}\",{},0))",
                        code_col, first.province, name_col
                    ),
                    "INDEX-MATCH: code d'une province",
                ),
                (
                    format!("=VLOOKUP(\"{}\",{},3,FALSE)", first.code, table),
                    "Région d'une province",
                ),
                (
                    format!("=COUNTIF({},\"{}\")", region_col, first.region_label()),
                    "Compter par région",
                ),
            ];
            let rows: Vec<Vec<Cell>> = examples
                .iter()
                .map(|(formula, description)| {
                    vec![
                        Cell::text(formula.as_str()),
                        Cell::text(*description),
                        Cell::Formula(formula.clone()),
                    ]
                })
                .collect();
            write_table(sheet, styles, (row + 1, 0), &["Formule", "Description", "Résultat"], &rows)?;
        }
        set_widths(sheet, &[45.0, 35.0, 20.0])?;
        Ok(())
    }

    fn dashboard_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
    ) -> Result<(), WorkbookError> {
        let top5 = Aggregator::top_n(ds, Dimension::Province, 5, None)?;
        let year_totals = yearly_totals(ds)?;
        let total: f64 = ds.values()?.iter().sum();
        let period = match ds.year_span()? {
            Some((first, last)) => format!("{} - {}", first, last),
            None => "N/A".to_string(),
        };

        let sheet = workbook.add_worksheet();
        sheet.set_name(DASHBOARD)?;
        write_title(sheet, 0, 7, "TABLEAU DE BORD VIH/SIDA - RDC", &styles.title)?;
        sheet.merge_range(
            1,
            0,
            1,
            7,
            &format!(
                "Période: {} | Dernière mise à jour: {}",
                period, self.style.period_note
            ),
            &styles.subtitle,
        )?;

        let kpis = [
            ("Total Enregistrements", ds.height() as f64),
            ("Valeur Totale", total.round()),
            ("Provinces Couvertes", ds.n_unique(Dimension::Province)? as f64),
            ("Indicateurs Suivis", ds.n_unique(Dimension::Indicator)? as f64),
        ];
        for (k, (label, value)) in kpis.iter().enumerate() {
            let col = 2 * k as u16;
            sheet.write_with_format(3, col, *label, &styles.kpi_title)?;
            sheet.write_with_format(4, col, *value, &styles.kpi_value)?;
        }

        sheet.write_with_format(7, 0, "Top 5 Provinces", &styles.section)?;
        let top_rows: Vec<Vec<Cell>> = top5
            .iter()
            .enumerate()
            .map(|(i, (province, value))| {
                vec![
                    Cell::Integer((i + 1) as f64),
                    Cell::text(province.as_str()),
                    Cell::Number(*value),
                ]
            })
            .collect();
        let top_last = write_table(sheet, styles, (8, 0), &["Rang", "Province", "Valeur"], &top_rows)?;

        sheet.write_with_format(7, 4, "Totaux par Année", &styles.section)?;
        let year_rows: Vec<Vec<Cell>> = year_totals
            .iter()
            .map(|(year, value)| vec![Cell::text(year.as_str()), Cell::Number(*value)])
            .collect();
        let year_last = write_table(sheet, styles, (8, 4), &["Année", "Total"], &year_rows)?;

        let chart_row = top_last.max(year_last) + 3;
        if !top_rows.is_empty() {
            let mut pie = titled_chart(ChartType::Pie, "Répartition Top 5 Provinces", (480, 400));
            add_column_series(&mut pie, DASHBOARD, "Valeur", (9, top_last), (1, 2));
            sheet.insert_chart(chart_row, 0, &pie)?;
        }
        if !year_rows.is_empty() {
            let mut line = titled_chart(ChartType::Line, "Tendance Annuelle", (480, 400));
            add_column_series(&mut line, DASHBOARD, "Total", (9, year_last), (4, 5));
            line.x_axis().set_name("Année");
            line.y_axis().set_name("Valeur");
            sheet.insert_chart(chart_row, 4, &line)?;
        }
        set_widths(sheet, &[15.0; 8])?;
        sheet.set_column_width(1, 20)?;
        Ok(())
    }

    fn formulas_sheet(&self, workbook: &mut Workbook, styles: &Styles) -> Result<(), WorkbookError> {
        const FORMULAS_LIST: [[&str; 4]; 20] = [
            ["Statistiques", "=AVERAGE(range)", "Moyenne", "=AVERAGE(Valeur)"],
            ["Statistiques", "=MEDIAN(range)", "Médiane", "=MEDIAN(Valeur)"],
            ["Statistiques", "=STDEV(range)", "Écart-type", "=STDEV(Valeur)"],
            ["Statistiques", "=VAR(range)", "Variance", "=VAR(Valeur)"],
            ["Statistiques", "=PERCENTILE(range, k)", "Percentile", "=PERCENTILE(Valeur, 0.75)"],
            [
                "Agrégation",
                "=SUMIF(range, criteria, sum_range)",
                "Somme conditionnelle",
                "=SUMIF(provinces,\"Kinshasa\",Valeur)",
            ],
            [
                "Agrégation",
                "=SUMIFS(sum, range1, crit1, range2, crit2)",
                "Somme multi-critères",
                "=SUMIFS(Valeur,provinces,\"Kinshasa\",annees,2024)",
            ],
            [
                "Agrégation",
                "=COUNTIF(range, criteria)",
                "Comptage conditionnel",
                "=COUNTIF(provinces,\"Kinshasa\")",
            ],
            [
                "Agrégation",
                "=AVERAGEIF(range, criteria, avg_range)",
                "Moyenne conditionnelle",
                "=AVERAGEIF(provinces,\"Kinshasa\",Valeur)",
            ],
            [
                "Lookup",
                "=VLOOKUP(value, table, col, exact)",
                "Recherche verticale",
                "=VLOOKUP(\"P01\",A:C,2,FALSE)",
            ],
            ["Lookup", "=INDEX(range, row, col)", "Retourne valeur à position", "=INDEX(B:B,5)"],
            ["Lookup", "=MATCH(value, range, type)", "Trouve position", "=MATCH(\"Kinshasa\",B:B,0)"],
            [
                "Lookup",
                "=XLOOKUP(value, lookup, return)",
                "Lookup moderne",
                "=XLOOKUP(\"Kinshasa\",provinces,Valeur)",
            ],
            [
                "Logique",
                "=IF(condition, true, false)",
                "Condition simple",
                "=IF(Valeur>1000,\"Élevé\",\"Bas\")",
            ],
            [
                "Logique",
                "=IFS(cond1, val1, cond2, val2)",
                "Conditions multiples",
                "=IFS(Valeur>1000,\"A\",Valeur>500,\"B\")",
            ],
            [
                "Texte",
                "=CONCATENATE(text1, text2)",
                "Concaténation",
                "=CONCATENATE(provinces,\"-\",annees)",
            ],
            ["Texte", "=TEXT(value, format)", "Formatage texte", "=TEXT(Valeur,\"#,##0\")"],
            ["Avancé", "=UNIQUE(range)", "Valeurs uniques", "=UNIQUE(provinces)"],
            ["Avancé", "=FILTER(range, criteria)", "Filtrage dynamique", "=FILTER(A:H,annees=2024)"],
            ["Avancé", "=SORT(range, col, order)", "Tri dynamique", "=SORT(A:H,8,-1)"],
        ];

        let rows: Vec<Vec<Cell>> = FORMULAS_LIST
            .iter()
            .map(|r| r.iter().map(|s| Cell::text(*s)).collect())
            .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(FORMULAS)?;
        write_title(sheet, 0, 3, "RÉFÉRENCE DES FORMULES D'ANALYSE EXCEL", &styles.title)?;
        write_table(
            sheet,
            styles,
            (2, 0),
            &["Catégorie", "Formule", "Description", "Exemple"],
            &rows,
        )?;
        set_widths(sheet, &[15.0, 45.0, 30.0, 45.0])?;
        Ok(())
    }

    /// Gender or age-group split with its chart.
    fn share_sheet(
        &self,
        workbook: &mut Workbook,
        styles: &Styles,
        ds: &CleanedDataset,
        dim: Dimension,
    ) -> Result<(), WorkbookError> {
        let group = Aggregator::group_by(ds, &[dim])?.sorted_by_key();
        let rows = share_rows(&group);
        let (name, title) = match dim {
            Dimension::Gender => (GENDER, "ANALYSE PAR GENRE"),
            _ => (AGE, "ANALYSE PAR TRANCHE D'ÂGE"),
        };

        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_title(sheet, 0, 4, title, &styles.title)?;
        let last = write_table(
            sheet,
            styles,
            (2, 0),
            &[dim.column(), "Total", "Moyenne", "Nb_Records", "Pourcentage"],
            &rows,
        )?;

        if !rows.is_empty() {
            if dim == Dimension::Gender {
                sheet.write_with_format(last + 2, 0, "Répartition par Genre", &styles.section)?;
                let mut pie = titled_chart(ChartType::Pie, "Distribution par Genre", (480, 400));
                add_column_series(&mut pie, name, "Total", (3, last), (0, 1));
                sheet.insert_chart(last + 3, 0, &pie)?;
            } else {
                let mut chart =
                    titled_chart(ChartType::Column, "Distribution par Tranche d'Âge", (600, 400));
                add_column_series(&mut chart, name, "Total", (3, last), (0, 1));
                chart.y_axis().set_name("Valeur Totale");
                chart.legend().set_hidden();
                sheet.insert_chart(2, 6, &chart)?;
            }
        }
        set_widths(sheet, &[20.0, 18.0, 18.0, 18.0, 18.0])?;
        Ok(())
    }
}
