//! End-to-end analysis run: load, clean, compute, render, export.
//!
//! Statistics whose preconditions fail are logged and left out of the
//! report. Load, render and export failures abort the run.

use crate::aggregate::{
    growth_by_indicator, percent_of_total, year_over_year, yearly_totals, AggFunc, Aggregator,
    GrowthPoint, PivotTable,
};
use crate::cascade::{CascadeCalculator, CascadeRecord};
use crate::charts::{ChartInputs, OutlierSeries, StaticChartRenderer};
use crate::config::AnalysisConfig;
use crate::data::schema::{GENDER, PROVINCE};
use crate::data::{Cleaner, CleanedDataset, DataLoader, DatasetProfile, Dimension};
use crate::export::CsvExporter;
use crate::report::{AnalysisReport, DatasetOverview, KeyFindings, OutlierCounts};
use crate::stats::{
    chi_square_independence, iqr_outliers, normality_test, sample, t_test, zscore_outliers,
    ContingencyTable, StatsCalculator, StatsError, TTestKind,
};
use crate::workbook::{AnalysisWorkbook, InteractiveWorkbook};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Number of provinces listed per indicator ranking.
const INDICATOR_TOP_N: usize = 5;
/// Focus-indicator outlier rows echoed to the log.
const OUTLIER_SAMPLE_ROWS: usize = 5;

/// Run every stage and return the report that was written.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    log::info!("Loading {}", config.input_path.display());
    let raw = DataLoader::load(&config.input_path)
        .with_context(|| format!("loading {}", config.input_path.display()))?;
    let profile = DatasetProfile::from_frame(&raw).context("profiling the raw dataset")?;
    profile.log_summary();

    let (ds, cleaning) = Cleaner::clean(&raw).context("cleaning the dataset")?;
    log::info!(
        "Cleaned: {} -> {} rows, {} duplicates removed, {} values filled",
        cleaning.rows_before,
        cleaning.rows_after,
        cleaning.duplicates_removed,
        cleaning.total_filled()
    );
    let overview = DatasetOverview::new(&profile, ds.height(), ds.year_span()?);

    let mut findings = statistics(&ds, config).context("computing statistics")?;
    log_dimension_tables(&ds).context("grouping by dimension")?;
    log_indicator_rankings(&ds, config).context("ranking provinces per indicator")?;

    let cascade = CascadeCalculator::new(&config.cascade);
    let overall = cascade.overall(&ds).context("computing the cascade")?;
    log_cascade(&overall);
    for record in cascade.by_year(&ds).context("computing the cascade by year")? {
        log::debug!(
            "Cascade {}: treatment {:.1}%, suppression {:.1}%",
            record.scope,
            record.treatment_rate,
            record.suppression_rate
        );
    }
    findings.cascade = Some(overall);

    let mut files: Vec<PathBuf> = Vec::new();

    let inputs = chart_inputs(&ds, config, &findings).context("preparing chart data")?;
    let charts = StaticChartRenderer::new(&config.chart_style)
        .render_all(&inputs, &config.charts_path())
        .context("rendering charts")?;
    files.extend(charts);

    let analysis_path = config.output_path(&config.analysis_workbook);
    AnalysisWorkbook::new(&config.workbook_style, &config.cascade)
        .save(&ds, findings.summary.as_ref(), &analysis_path)
        .with_context(|| format!("writing {}", analysis_path.display()))?;
    files.push(analysis_path);

    let interactive_path = config.output_path(&config.interactive_workbook);
    InteractiveWorkbook::new(
        &config.workbook_style,
        &config.cascade,
        &config.featured_indicators,
    )
    .save(&ds, &interactive_path)
    .with_context(|| format!("writing {}", interactive_path.display()))?;
    files.push(interactive_path);

    let cleaned_path = config.output_path(&config.cleaned_csv);
    CsvExporter::cleaned(&ds, &cleaned_path)
        .with_context(|| format!("writing {}", cleaned_path.display()))?;
    files.push(cleaned_path);

    let summary_path = config.output_path(&config.summary_csv);
    CsvExporter::province_year_summary(&ds, &summary_path)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    files.push(summary_path);

    let cascade_path = config.output_path(&config.cascade_csv);
    CsvExporter::cascade_rows(&ds, &config.cascade, &cascade_path)
        .with_context(|| format!("writing {}", cascade_path.display()))?;
    files.push(cascade_path);

    let report_path = config.output_path(&config.report_json);
    files.push(report_path.clone());
    let report = AnalysisReport {
        overview,
        missing_before_cleaning: profile.missing.clone(),
        cleaning,
        key_findings: findings,
        files,
    };
    report
        .write(&report_path)
        .with_context(|| format!("writing {}", report_path.display()))?;

    log::info!("Analysis complete, {} files generated", report.files.len());
    Ok(report)
}

/// Keep a statistic, or log why it was skipped.
fn skip_on_error<T>(what: &str, result: Result<T, StatsError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Skipping {}: {}", what, e);
            None
        }
    }
}

/// Descriptive statistics, outliers and the three hypothesis tests.
fn statistics(ds: &CleanedDataset, config: &AnalysisConfig) -> Result<KeyFindings> {
    let values = ds.values()?;
    let total_value: f64 = values.iter().sum();

    let summary = skip_on_error("descriptive statistics", StatsCalculator::describe(&values));
    if let Some(s) = &summary {
        log::info!(
            "Valeur: n={}, mean={:.2}, median={:.2}, std={:.2}",
            s.count,
            s.mean,
            s.median,
            s.std
        );
    }

    let iqr = skip_on_error("IQR outliers", iqr_outliers(&values));
    let zscore = skip_on_error(
        "z-score outliers",
        zscore_outliers(&values, config.zscore_threshold),
    );
    let outliers = match (&iqr, &zscore) {
        (Some(iqr), Some(z)) => {
            log::info!(
                "Outliers: {} by IQR ({:.2}%), {} by z-score > {} ({:.2}%)",
                iqr.count(),
                iqr.percent,
                z.count(),
                z.threshold,
                z.percent
            );
            Some(OutlierCounts {
                iqr: iqr.count(),
                iqr_percent: iqr.percent,
                zscore: z.count(),
                zscore_percent: z.percent,
            })
        }
        _ => None,
    };

    let normality_sample = sample(&values, config.normality_sample_size, config.sample_seed);
    let normality = skip_on_error("normality test", normality_test(&normality_sample));
    if let Some(n) = &normality {
        log::info!(
            "D'Agostino-Pearson: K2={:.4}, p={:.4e} ({})",
            n.statistic,
            n.p_value,
            if n.looks_normal() { "normal" } else { "not normal" }
        );
    }

    let male = ds.values_where(Dimension::Gender, &config.male_label)?;
    let female = ds.values_where(Dimension::Gender, &config.female_label)?;
    let gender_t_test = if male.is_empty() || female.is_empty() {
        log::warn!(
            "Skipping t-test: no '{}' or no '{}' rows",
            config.male_label,
            config.female_label
        );
        None
    } else {
        let male = sample(&male, config.ttest_sample_size, config.sample_seed);
        let female = sample(&female, config.ttest_sample_size, config.sample_seed);
        skip_on_error("t-test", t_test(&male, &female, TTestKind::Student))
    };
    if let Some(t) = &gender_t_test {
        log::info!(
            "t-test {} vs {}: t={:.4}, p={:.4e} ({})",
            config.male_label,
            config.female_label,
            t.statistic,
            t.p_value,
            if t.is_significant() { "significant" } else { "not significant" }
        );
    }

    let table = ContingencyTable::from_pairs(&ds.strings(PROVINCE)?, &ds.strings(GENDER)?);
    let province_gender_chi_square =
        skip_on_error("chi-square test", chi_square_independence(&table));
    if let Some(c) = &province_gender_chi_square {
        log::info!(
            "Chi-square province x gender: {:.4}, dof={}, p={:.4e} ({})",
            c.statistic,
            c.dof,
            c.p_value,
            if c.is_dependent() { "dependent" } else { "independent" }
        );
    }

    let top_province = Aggregator::top_n(ds, Dimension::Province, 1, None)?
        .into_iter()
        .next();
    let yearly_growth: Vec<GrowthPoint> = year_over_year(&yearly_totals(ds)?);
    for g in &yearly_growth {
        log::info!("Year {}: total {:.0}, growth {:.2}%", g.period, g.value, g.growth);
    }

    Ok(KeyFindings {
        total_value,
        top_province,
        summary,
        outliers,
        normality,
        gender_t_test,
        province_gender_chi_square,
        yearly_growth,
        cascade: None,
    })
}

/// Per-dimension statistics tables and the province x year x quarter
/// breakdown, written to the log.
fn log_dimension_tables(ds: &CleanedDataset) -> Result<()> {
    for dim in [Dimension::Province, Dimension::Year, Dimension::Gender] {
        let group = Aggregator::group_by(ds, &[dim])?.sorted_by_sum_desc();
        let total = group.total();
        log::info!("Statistics by {}: {} groups", dim.label(), group.len());
        for r in &group.rows {
            let values: Vec<String> = AggFunc::ALL
                .iter()
                .map(|&func| match r.get(func) {
                    Some(v) => format!("{}={:.2}", func.label(), v),
                    None => format!("{}=N/A", func.label()),
                })
                .collect();
            log::debug!(
                "  {}: {}, share={:.2}%",
                r.key(),
                values.join(", "),
                percent_of_total(r.sum, total)
            );
        }
    }

    let detailed = Aggregator::group_by(
        ds,
        &[Dimension::Province, Dimension::Year, Dimension::Quarter],
    )?;
    log::info!("Province x year x quarter: {} groups", detailed.len());

    let gender_age = PivotTable::sum(ds, Dimension::Gender, Dimension::AgeGroup)?;
    log::debug!(
        "Gender x age group pivot: {} x {}",
        gender_age.row_labels.len(),
        gender_age.col_labels.len()
    );
    Ok(())
}

/// Top provinces for each cascade indicator, then year-over-year growth of
/// every indicator.
fn log_indicator_rankings(ds: &CleanedDataset, config: &AnalysisConfig) -> Result<()> {
    for name in config.cascade.names() {
        let top = Aggregator::top_n(ds, Dimension::Province, INDICATOR_TOP_N, Some(name))?;
        if top.is_empty() {
            continue;
        }
        log::info!("Top {} provinces for '{}':", top.len(), name);
        for (i, (province, total)) in top.iter().enumerate() {
            log::info!("  {}. {}: {:.0}", i + 1, province, total);
        }
    }

    let growth = growth_by_indicator(ds)?;
    log::info!("Year-over-year growth computed for {} indicators", growth.len());
    for (indicator, points) in &growth {
        if let Some(last) = points.last() {
            log::debug!("  {} ({}): {:.2}%", indicator, last.period, last.growth);
        }
    }
    Ok(())
}

fn log_cascade(record: &CascadeRecord) {
    let t = &record.totals;
    log::info!(
        "Cascade: tested {:.0}, diagnosed {:.0}, on treatment {:.0}, suppressed {:.0}",
        t.tested,
        t.diagnosed,
        t.on_treatment,
        t.suppressed
    );
    log::info!(
        "Cascade rates: treatment {:.2}%, viral suppression {:.2}%",
        record.treatment_rate,
        record.suppression_rate
    );
}

/// Focus-indicator values with their IQR upper fence, or `None` when the
/// indicator has no rows.
fn outlier_series(ds: &CleanedDataset, indicator: &str) -> Result<Option<OutlierSeries>> {
    let focus = ds.filter_indicator(indicator)?;
    if focus.is_empty() {
        log::warn!("Focus indicator '{}' has no rows", indicator);
        return Ok(None);
    }
    let values = focus.values()?;
    let years = focus.years()?;
    let Some(iqr) = skip_on_error("focus-indicator outliers", iqr_outliers(&values)) else {
        return Ok(None);
    };

    log::info!(
        "'{}': {} outliers above {:.0} out of {} rows",
        indicator,
        iqr.count(),
        iqr.upper_bound,
        values.len()
    );
    let provinces = focus.strings(PROVINCE)?;
    for &i in iqr.indices.iter().take(OUTLIER_SAMPLE_ROWS) {
        log::info!("  {} {}: {:.0}", provinces[i], years[i], values[i]);
    }

    Ok(Some(OutlierSeries {
        indicator: indicator.to_string(),
        values,
        years,
        upper_bound: iqr.upper_bound,
    }))
}

fn totals_by(ds: &CleanedDataset, dim: Dimension) -> Result<Vec<(String, f64)>> {
    let group = Aggregator::group_by(ds, &[dim])?.sorted_by_key();
    Ok(group
        .rows
        .into_iter()
        .map(|r| (r.key().to_string(), r.sum))
        .collect())
}

fn chart_inputs(
    ds: &CleanedDataset,
    config: &AnalysisConfig,
    findings: &KeyFindings,
) -> Result<ChartInputs> {
    let mut province_trends = Vec::new();
    for (province, _) in Aggregator::top_n(ds, Dimension::Province, config.top_trend_provinces, None)? {
        let series = yearly_totals(&ds.filter_province(&province)?)?
            .into_iter()
            .filter_map(|(year, total)| year.parse::<i64>().ok().map(|y| (y, total)))
            .collect();
        province_trends.push((province, series));
    }

    let correlation =
        PivotTable::build(ds, Dimension::Province, Dimension::Year, AggFunc::Sum, None)?
            .correlation();

    Ok(ChartInputs {
        values: ds.values()?,
        yearly_totals: findings
            .yearly_growth
            .iter()
            .map(|g| (g.period.clone(), g.value))
            .collect(),
        top_provinces: Aggregator::top_n(ds, Dimension::Province, config.top_provinces, None)?,
        gender_totals: totals_by(ds, Dimension::Gender)?,
        age_totals: totals_by(ds, Dimension::AgeGroup)?,
        quarterly: PivotTable::build(ds, Dimension::Year, Dimension::Quarter, AggFunc::Sum, None)?,
        outliers: outlier_series(ds, &config.outlier_indicator)?,
        province_trends,
        cascade: findings
            .cascade
            .as_ref()
            .map(|c| c.totals)
            .unwrap_or_default(),
        correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset, row, Row};
    use crate::data::write_xlsx;

    fn gendered(province: &'static str, year: i64, gender: &'static str, value: f64) -> Row<'static> {
        Row {
            gender,
            ..row(province, year, "T1", "Nombre de clients testés", value)
        }
    }

    fn sample_dataset() -> CleanedDataset {
        let mut rows = Vec::new();
        for i in 0..40 {
            let province = if i % 2 == 0 { "Kinshasa" } else { "Ituri" };
            let gender = if i % 4 < 2 { "Masculin" } else { "Féminin" };
            let year = 2020 + (i % 3) as i64;
            rows.push(gendered(province, year, gender, (i * 7 % 23) as f64 + 1.0));
        }
        dataset(&rows)
    }

    #[test]
    fn statistics_run_every_test() {
        let findings = statistics(&sample_dataset(), &AnalysisConfig::default()).unwrap();
        assert!(findings.summary.is_some());
        assert!(findings.outliers.is_some());
        assert!(findings.normality.is_some());

        let t = findings.gender_t_test.unwrap();
        assert_eq!(t.n1, 20);
        assert_eq!(t.n2, 20);
        let chi = findings.province_gender_chi_square.unwrap();
        assert_eq!(chi.dof, 1);
        assert_eq!(findings.yearly_growth.len(), 3);
        assert_eq!(findings.yearly_growth[0].growth, 0.0);
    }

    #[test]
    fn t_test_skipped_without_both_genders() {
        let ds = dataset(&[
            gendered("Kinshasa", 2020, "Féminin", 1.0),
            gendered("Kinshasa", 2021, "Féminin", 2.0),
        ]);
        let findings = statistics(&ds, &AnalysisConfig::default()).unwrap();
        assert!(findings.gender_t_test.is_none());
        assert!(findings.normality.is_none());
    }

    #[test]
    fn chart_inputs_rank_and_trend_provinces() {
        let ds = sample_dataset();
        let config = AnalysisConfig::default();
        let findings = statistics(&ds, &config).unwrap();
        let inputs = chart_inputs(&ds, &config, &findings).unwrap();

        assert_eq!(inputs.values.len(), 40);
        assert_eq!(inputs.top_provinces.len(), 2);
        assert!(inputs.top_provinces[0].1 >= inputs.top_provinces[1].1);
        assert_eq!(inputs.province_trends.len(), 2);
        assert_eq!(inputs.province_trends[0].1.len(), 3);
        assert_eq!(inputs.gender_totals.len(), 2);
        assert!(inputs.outliers.is_none());
        assert_eq!(inputs.correlation.labels, ["2020", "2021", "2022"]);
    }

    #[test]
    fn run_writes_every_output() {
        let config = AnalysisConfig::default();
        let indicators = [
            config.cascade.tested.as_str(),
            config.cascade.diagnosed.as_str(),
            config.cascade.on_treatment.as_str(),
            config.cascade.suppressed.as_str(),
            config.outlier_indicator.as_str(),
        ];

        let mut cells: Vec<Vec<String>> = vec![[
            "provinces", "annees", "trimestres", "indicateurs", "cibles", "sexes", "tranches_ages", "Valeur",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()];
        let mut n = 0;
        for province in ["Kinshasa", "Ituri", "Kasaï"] {
            for year in ["2021", "2022"] {
                for quarter in ["T1", "T2"] {
                    for (k, indicator) in indicators.iter().enumerate() {
                        for gender in ["Masculin", "Féminin"] {
                            n += 1;
                            let age = if n % 2 == 0 { "15-24" } else { "25-49" };
                            let value = ((5 - k) * 100 + n * 13 % 37) as f64;
                            cells.push(
                                [province, year, quarter, *indicator, "Population générale", gender, age]
                                    .iter()
                                    .map(|s| s.to_string())
                                    .chain([value.to_string()])
                                    .collect(),
                            );
                        }
                    }
                }
            }
        }
        let rows: Vec<Vec<&str>> = cells.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();

        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("datavih.xlsx");
        write_xlsx(&input_path, &rows);
        let config = AnalysisConfig {
            input_path,
            output_dir: dir.path().join("out"),
            ..config
        };

        let report = run(&config).unwrap();
        assert_eq!(report.overview.rows, 120);
        assert_eq!(report.overview.provinces, 3);
        assert_eq!(report.files.len(), 16);
        for file in &report.files {
            assert!(file.exists(), "{} missing", file.display());
        }
        let cascade = report.key_findings.cascade.unwrap();
        assert!(cascade.totals.tested > cascade.totals.diagnosed);
    }

    #[test]
    fn failed_statistic_becomes_none() {
        let err: Result<u8, StatsError> = Err(StatsError::ZeroVariance("t-test"));
        assert_eq!(skip_on_error("t-test", err), None);
        assert_eq!(skip_on_error("t-test", Ok::<u8, StatsError>(3)), Some(3));
    }
}
