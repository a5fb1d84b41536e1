//! Static Chart Renderer
//! Draws the report charts as PNG files.
//!
//! Layout per file:
//! 01 value distribution (log histogram + box plot), 02 yearly totals,
//! 03 top provinces, 04 gender split (pie + bars), 05 age groups,
//! 06 year x quarter heat map, 07 focus-indicator outliers,
//! 08 province trend lines, 09 cascade bars, 10 year correlation matrix.

use super::series::{
    diverging_color, headroom, heat_color, log1p_all, padded_range, palette, short_number,
    year_color, Bins, BoxSummary, ChartInputs, OutlierSeries,
};
use super::ChartError;
use crate::aggregate::PivotTable;
use crate::cascade::CascadeTotals;
use crate::config::ChartStyle;
use crate::stats::CorrelationMatrix;
use plotters::coord::ranged1d::SegmentValue;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::path::{Path, PathBuf};

type DrawResult = Result<(), Box<dyn Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Output file names, in drawing order.
pub const CHART_FILES: [&str; 10] = [
    "01_value_distribution.png",
    "02_yearly_trend.png",
    "03_top_provinces.png",
    "04_gender_distribution.png",
    "05_age_groups.png",
    "06_quarterly_heatmap.png",
    "07_outlier_scatter.png",
    "08_province_trends.png",
    "09_unaids_cascade.png",
    "10_correlation_matrix.png",
];

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const TEAL: RGBColor = RGBColor(0, 128, 128);
const CORAL: RGBColor = RGBColor(255, 127, 80);
const PURPLE: RGBColor = RGBColor(147, 112, 219);
const EMPTY_CELL: RGBColor = RGBColor(235, 235, 235);
const GENDER_COLORS: [RGBColor; 3] = [
    RGBColor(255, 153, 153),
    RGBColor(102, 179, 255),
    RGBColor(153, 255, 153),
];
const CASCADE_COLORS: [RGBColor; 4] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
];

pub struct StaticChartRenderer<'s> {
    style: &'s ChartStyle,
}

impl<'s> StaticChartRenderer<'s> {
    pub fn new(style: &'s ChartStyle) -> Self {
        Self { style }
    }

    /// Draw every chart into `dir`, returning the files written.
    pub fn render_all(&self, inputs: &ChartInputs, dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(CHART_FILES.len());

        self.render(dir, CHART_FILES[0], &mut written, |p| {
            self.value_distribution(p, &inputs.values)
        })?;
        self.render(dir, CHART_FILES[1], &mut written, |p| {
            self.yearly_trend(p, &inputs.yearly_totals)
        })?;
        self.render(dir, CHART_FILES[2], &mut written, |p| {
            self.top_provinces(p, &inputs.top_provinces)
        })?;
        self.render(dir, CHART_FILES[3], &mut written, |p| {
            self.gender_distribution(p, &inputs.gender_totals)
        })?;
        self.render(dir, CHART_FILES[4], &mut written, |p| {
            self.age_groups(p, &inputs.age_totals)
        })?;
        self.render(dir, CHART_FILES[5], &mut written, |p| {
            self.quarterly_heatmap(p, &inputs.quarterly)
        })?;
        match &inputs.outliers {
            Some(series) => self.render(dir, CHART_FILES[6], &mut written, |p| {
                self.outlier_scatter(p, series)
            })?,
            None => log::warn!("No focus-indicator rows, skipping {}", CHART_FILES[6]),
        }
        self.render(dir, CHART_FILES[7], &mut written, |p| {
            self.province_trends(p, &inputs.province_trends)
        })?;
        self.render(dir, CHART_FILES[8], &mut written, |p| {
            self.cascade(p, &inputs.cascade)
        })?;
        self.render(dir, CHART_FILES[9], &mut written, |p| {
            self.correlation_matrix(p, &inputs.correlation)
        })?;

        log::info!("All charts saved to '{}'", dir.display());
        Ok(written)
    }

    fn render(
        &self,
        dir: &Path,
        name: &str,
        written: &mut Vec<PathBuf>,
        draw: impl FnOnce(&Path) -> DrawResult,
    ) -> Result<(), ChartError> {
        let path = dir.join(name);
        draw(&path).map_err(|e| ChartError::Drawing {
            chart: name.to_string(),
            message: e.to_string(),
        })?;
        log::info!("Chart saved: {}", path.display());
        written.push(path);
        Ok(())
    }

    fn font(&self, size: u32) -> FontDesc<'_> {
        (self.style.font_family.as_str(), size as f64).into_font()
    }

    fn title_font(&self) -> FontDesc<'_> {
        self.font(self.style.title_size)
    }

    fn label_font(&self) -> FontDesc<'_> {
        self.font(self.style.label_size)
    }

    fn canvas<'a>(&self, path: &'a Path) -> Result<Area<'a>, Box<dyn Error>> {
        let root = BitMapBackend::new(path, (self.style.width, self.style.height)).into_drawing_area();
        root.fill(&WHITE)?;
        Ok(root)
    }

    fn no_data(&self, area: &Area<'_>, caption: &str) -> DrawResult {
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            format!("{} - no data", caption),
            (w as i32 / 2, h as i32 / 2),
            self.title_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        Ok(())
    }

    // 01
    fn value_distribution(&self, path: &Path, values: &[f64]) -> DrawResult {
        let root = self.canvas(path)?;
        let logged = log1p_all(values);
        let panels = root.split_evenly((1, 2));

        match Bins::new(&logged, self.style.histogram_bins) {
            Some(bins) => {
                let x_max = bins.min + bins.width * bins.counts.len() as f64;
                let y_max = headroom(bins.max_count() as f64);
                let mut chart = ChartBuilder::on(&panels[0])
                    .caption("Distribution of Values (Log-transformed)", self.title_font())
                    .margin(15)
                    .x_label_area_size(45)
                    .y_label_area_size(60)
                    .build_cartesian_2d(bins.min..x_max, 0f64..y_max)?;
                chart
                    .configure_mesh()
                    .x_desc("Log(Value + 1)")
                    .y_desc("Frequency")
                    .label_style(self.label_font())
                    .draw()?;

                chart.draw_series(bins.counts.iter().enumerate().map(|(i, &c)| {
                    let (lo, hi) = bins.bin_range(i);
                    Rectangle::new([(lo, 0.0), (hi, c as f64)], STEEL_BLUE.mix(0.7).filled())
                }))?;
                chart.draw_series(bins.counts.iter().enumerate().map(|(i, &c)| {
                    let (lo, hi) = bins.bin_range(i);
                    Rectangle::new([(lo, 0.0), (hi, c as f64)], BLACK.stroke_width(1))
                }))?;

                if let Some(median) = crate::stats::median(&logged) {
                    chart
                        .draw_series(LineSeries::new(
                            vec![(median, 0.0), (median, y_max)],
                            RED.stroke_width(2),
                        ))?
                        .label("Median")
                        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
                    chart
                        .configure_series_labels()
                        .background_style(WHITE.mix(0.8).filled())
                        .border_style(BLACK.stroke_width(1))
                        .label_font(self.label_font())
                        .draw()?;
                }
            }
            None => self.no_data(&panels[0], "Distribution of Values")?,
        }

        match BoxSummary::new(&logged) {
            Some(b) => {
                let lo = logged.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = logged.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let (y_min, y_max) = padded_range(lo, hi);
                let mut chart = ChartBuilder::on(&panels[1])
                    .caption("Box Plot of Values (Log-transformed)", self.title_font())
                    .margin(15)
                    .x_label_area_size(30)
                    .y_label_area_size(60)
                    .build_cartesian_2d(0f64..1f64, y_min..y_max)?;
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_labels(0)
                    .y_desc("Log(Value + 1)")
                    .label_style(self.label_font())
                    .draw()?;

                chart.draw_series(std::iter::once(Rectangle::new(
                    [(0.3, b.q1), (0.7, b.q3)],
                    STEEL_BLUE.mix(0.3).filled(),
                )))?;
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(0.3, b.q1), (0.7, b.q3)],
                    BLACK.stroke_width(1),
                )))?;
                let segments = [
                    vec![(0.3, b.median), (0.7, b.median)],
                    vec![(0.5, b.q3), (0.5, b.whisker_high)],
                    vec![(0.5, b.q1), (0.5, b.whisker_low)],
                    vec![(0.4, b.whisker_high), (0.6, b.whisker_high)],
                    vec![(0.4, b.whisker_low), (0.6, b.whisker_low)],
                ];
                for (i, segment) in segments.into_iter().enumerate() {
                    let color = if i == 0 { RGBColor(255, 140, 0) } else { BLACK };
                    chart.draw_series(LineSeries::new(segment, color.stroke_width(2)))?;
                }
                chart.draw_series(
                    logged
                        .iter()
                        .filter(|v| **v < b.whisker_low || **v > b.whisker_high)
                        .map(|v| Circle::new((0.5, *v), 3, BLACK.stroke_width(1))),
                )?;
            }
            None => self.no_data(&panels[1], "Box Plot of Values")?,
        }

        root.present()?;
        Ok(())
    }

    // 02
    fn yearly_trend(&self, path: &Path, totals: &[(String, f64)]) -> DrawResult {
        let root = self.canvas(path)?;
        self.vertical_bars(
            &root,
            "Total Values by Year",
            "Year",
            "Total Value",
            totals,
            &[TEAL],
        )?;
        root.present()?;
        Ok(())
    }

    // 03
    fn top_provinces(&self, path: &Path, ranking: &[(String, f64)]) -> DrawResult {
        let root = self.canvas(path)?;
        // Largest on top.
        let bottom_up: Vec<(String, f64)> = ranking.iter().rev().cloned().collect();
        self.horizontal_bars(
            &root,
            &format!("Top {} Provinces by Total Value", ranking.len()),
            "Total Value",
            "Province",
            &bottom_up,
            CORAL,
        )?;
        root.present()?;
        Ok(())
    }

    // 04
    fn gender_distribution(&self, path: &Path, totals: &[(String, f64)]) -> DrawResult {
        let root = self.canvas(path)?;
        let panels = root.split_evenly((1, 2));
        self.pie(&panels[0], "Distribution by Gender", totals, &GENDER_COLORS)?;
        self.vertical_bars(
            &panels[1],
            "Total Values by Gender",
            "Gender",
            "Total Value",
            totals,
            &GENDER_COLORS,
        )?;
        root.present()?;
        Ok(())
    }

    // 05
    fn age_groups(&self, path: &Path, totals: &[(String, f64)]) -> DrawResult {
        let root = self.canvas(path)?;
        let mut ascending = totals.to_vec();
        ascending.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        self.horizontal_bars(
            &root,
            "Values by Age Group",
            "Total Value",
            "Age Group",
            &ascending,
            PURPLE,
        )?;
        root.present()?;
        Ok(())
    }

    // 06
    fn quarterly_heatmap(&self, path: &Path, pivot: &PivotTable) -> DrawResult {
        let root = self.canvas(path)?;
        let max = pivot
            .cells
            .iter()
            .flatten()
            .flatten()
            .copied()
            .fold(0.0, f64::max);
        self.heatmap(
            &root,
            "Quarterly Values by Year",
            ("Quarter", "Year"),
            (&pivot.row_labels, &pivot.col_labels),
            &pivot.cells,
            |v| heat_color(if max > 0.0 { v / max } else { 0.0 }),
            short_number,
        )?;
        root.present()?;
        Ok(())
    }

    // 07
    fn outlier_scatter(&self, path: &Path, series: &OutlierSeries) -> DrawResult {
        let root = self.canvas(path)?;
        if series.values.is_empty() {
            self.no_data(&root, "Outlier Detection")?;
            root.present()?;
            return Ok(());
        }

        let n = series.values.len() as f64;
        let y_top = headroom(
            series
                .values
                .iter()
                .copied()
                .fold(series.upper_bound, f64::max),
        );
        let first_year = series.years.iter().copied().min().unwrap_or(0);
        let last_year = series.years.iter().copied().max().unwrap_or(first_year);
        let span = (last_year - first_year).max(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Outlier Detection: {}", series.indicator), self.title_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..n, 0f64..y_top)?;
        chart
            .configure_mesh()
            .x_desc("Observation Index")
            .y_desc("Value")
            .y_label_formatter(&|v| short_number(*v))
            .label_style(self.label_font())
            .draw()?;

        chart.draw_series(series.values.iter().zip(&series.years).enumerate().map(
            |(i, (v, year))| {
                let t = (*year - first_year) as f64 / span;
                Circle::new((i as f64, *v), 3, year_color(t).mix(0.6).filled())
            },
        ))?;

        let fence = series.upper_bound;
        chart
            .draw_series(LineSeries::new(vec![(0.0, fence), (n, fence)], RED.stroke_width(2)))?
            .label(format!("Outlier Threshold: {}", short_number(fence)))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .label_font(self.label_font())
            .draw()?;

        root.present()?;
        Ok(())
    }

    // 08
    fn province_trends(&self, path: &Path, trends: &[(String, Vec<(i64, f64)>)]) -> DrawResult {
        let root = self.canvas(path)?;
        let points = trends.iter().flat_map(|(_, s)| s.iter());
        let (mut first, mut last, mut top) = (i64::MAX, i64::MIN, 0.0f64);
        for (year, value) in points {
            first = first.min(*year);
            last = last.max(*year);
            top = top.max(*value);
        }
        if first > last {
            self.no_data(&root, "Yearly Trends")?;
            root.present()?;
            return Ok(());
        }

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Yearly Trends - Top {} Provinces", trends.len()), self.title_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(first as f64 - 0.5..last as f64 + 0.5, 0f64..headroom(top))?;
        chart
            .configure_mesh()
            .x_labels((last - first + 1) as usize)
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| short_number(*v))
            .x_desc("Year")
            .y_desc("Total Value")
            .label_style(self.label_font())
            .draw()?;

        for (i, (province, series)) in trends.iter().enumerate() {
            let color = palette(i);
            let line: Vec<(f64, f64)> = series.iter().map(|(y, v)| (*y as f64, *v)).collect();
            chart
                .draw_series(LineSeries::new(line.clone(), color.stroke_width(2)))?
                .label(province.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart.draw_series(line.into_iter().map(|p| Circle::new(p, 5, color.filled())))?;
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .label_font(self.label_font())
            .draw()?;

        root.present()?;
        Ok(())
    }

    // 09
    fn cascade(&self, path: &Path, totals: &CascadeTotals) -> DrawResult {
        let root = self.canvas(path)?;
        let bars = vec![
            ("Tested".to_string(), totals.tested),
            ("Diagnosed HIV+".to_string(), totals.diagnosed),
            ("On TAR".to_string(), totals.on_treatment),
            ("Viral Suppression".to_string(), totals.suppressed),
        ];
        self.vertical_bars(
            &root,
            "UNAIDS 95-95-95 Cascade Indicators (Total)",
            "",
            "Value",
            &bars,
            &CASCADE_COLORS,
        )?;
        root.present()?;
        Ok(())
    }

    // 10
    fn correlation_matrix(&self, path: &Path, corr: &CorrelationMatrix) -> DrawResult {
        let root = self.canvas(path)?;
        self.heatmap(
            &root,
            "Year-to-Year Correlation Matrix",
            ("", ""),
            (&corr.labels, &corr.labels),
            &corr.values,
            diverging_color,
            |r| format!("{:.3}", r),
        )?;
        root.present()?;
        Ok(())
    }

    fn vertical_bars(
        &self,
        area: &Area<'_>,
        caption: &str,
        x_desc: &str,
        y_desc: &str,
        data: &[(String, f64)],
        colors: &[RGBColor],
    ) -> DrawResult {
        if data.is_empty() {
            return self.no_data(area, caption);
        }
        let n = data.len();
        let top = data.iter().map(|(_, v)| *v).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(area)
            .caption(caption, self.title_font())
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..headroom(top))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|v| segment_label(v, data))
            .y_label_formatter(&|v| short_number(*v))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(self.label_font())
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                colors[i % colors.len()].filled(),
            );
            bar.set_margin(0, 0, 10, 10);
            bar
        }))?;
        chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
            Text::new(
                short_number(*v),
                (SegmentValue::CenterOf(i), *v),
                self.label_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Bottom)),
            )
        }))?;
        Ok(())
    }

    fn horizontal_bars(
        &self,
        area: &Area<'_>,
        caption: &str,
        x_desc: &str,
        y_desc: &str,
        data: &[(String, f64)],
        color: RGBColor,
    ) -> DrawResult {
        if data.is_empty() {
            return self.no_data(area, caption);
        }
        let n = data.len();
        let top = data.iter().map(|(_, v)| *v).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(area)
            .caption(caption, self.title_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(200)
            .build_cartesian_2d(0f64..headroom(top), (0..n).into_segmented())?;
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&|v| segment_label(v, data))
            .x_label_formatter(&|v| short_number(*v))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(self.label_font())
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
                color.filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))?;
        Ok(())
    }

    fn pie(
        &self,
        area: &Area<'_>,
        caption: &str,
        data: &[(String, f64)],
        colors: &[RGBColor],
    ) -> DrawResult {
        let total: f64 = data.iter().map(|(_, v)| v.max(0.0)).sum();
        if total <= 0.0 {
            return self.no_data(area, caption);
        }
        let inner = area.titled(caption, self.title_font())?;
        let (w, h) = inner.dim_in_pixel();
        let center = (w as f64 / 2.0, h as f64 / 2.0);
        let radius = w.min(h) as f64 * 0.35;
        let at = |angle: f64, r: f64| {
            (
                (center.0 + r * angle.cos()).round() as i32,
                (center.1 + r * angle.sin()).round() as i32,
            )
        };

        // Clockwise from twelve o'clock.
        let mut start = -std::f64::consts::FRAC_PI_2;
        for (i, (label, value)) in data.iter().enumerate() {
            let share = value.max(0.0) / total;
            let sweep = share * std::f64::consts::TAU;
            let steps = ((sweep.to_degrees()).ceil() as usize).max(1);
            let mut outline = vec![at(0.0, 0.0)];
            outline.extend((0..=steps).map(|k| at(start + sweep * k as f64 / steps as f64, radius)));
            inner.draw(&Polygon::new(outline, colors[i % colors.len()].filled()))?;

            let mid = start + sweep / 2.0;
            inner.draw(&Text::new(
                format!("{} ({:.1}%)", label, share * 100.0),
                at(mid, radius * 1.2),
                self.label_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
            start += sweep;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn heatmap(
        &self,
        area: &Area<'_>,
        caption: &str,
        (x_desc, y_desc): (&str, &str),
        (rows, cols): (&[String], &[String]),
        cells: &[Vec<Option<f64>>],
        color: impl Fn(f64) -> RGBColor,
        annotate: impl Fn(f64) -> String,
    ) -> DrawResult {
        if rows.is_empty() || cols.is_empty() {
            return self.no_data(area, caption);
        }
        let (nr, nc) = (rows.len(), cols.len());
        let row_data: Vec<(String, f64)> = rows.iter().map(|r| (r.clone(), 0.0)).collect();
        let col_data: Vec<(String, f64)> = cols.iter().map(|c| (c.clone(), 0.0)).collect();

        let mut chart = ChartBuilder::on(area)
            .caption(caption, self.title_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d((0..nc).into_segmented(), (0..nr).into_segmented())?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(nc)
            .y_labels(nr)
            .x_label_formatter(&|v| segment_label(v, &col_data))
            .y_label_formatter(&|v| segment_label(v, &row_data))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(self.label_font())
            .draw()?;

        let cell_at = |i: usize, j: usize| cells.get(i).and_then(|r| r.get(j)).copied().flatten();
        let grid = (0..nr).flat_map(|i| (0..nc).map(move |j| (i, j)));

        chart.draw_series(grid.clone().map(|(i, j)| {
            let fill = cell_at(i, j).map_or(EMPTY_CELL, &color);
            Rectangle::new(
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(i)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(i + 1)),
                ],
                fill.filled(),
            )
        }))?;
        chart.draw_series(grid.filter_map(|(i, j)| {
            cell_at(i, j).map(|v| {
                Text::new(
                    annotate(v),
                    (SegmentValue::CenterOf(j), SegmentValue::CenterOf(i)),
                    self.label_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
                )
            })
        }))?;
        Ok(())
    }
}

/// Category label for the centre of a segment; blank elsewhere.
fn segment_label(v: &SegmentValue<usize>, data: &[(String, f64)]) -> String {
    match v {
        SegmentValue::CenterOf(i) => data.get(*i).map(|(l, _)| l.clone()).unwrap_or_default(),
        _ => String::new(),
    }
}
