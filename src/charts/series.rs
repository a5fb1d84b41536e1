//! Chart inputs and the pure helpers that shape them for drawing.

use crate::aggregate::PivotTable;
use crate::cascade::CascadeTotals;
use crate::stats::{percentile, CorrelationMatrix};
use plotters::style::RGBColor;

/// Everything the ten report charts draw from.
#[derive(Debug, Clone)]
pub struct ChartInputs {
    /// Every cleaned value, for the distribution chart.
    pub values: Vec<f64>,
    pub yearly_totals: Vec<(String, f64)>,
    pub top_provinces: Vec<(String, f64)>,
    pub gender_totals: Vec<(String, f64)>,
    pub age_totals: Vec<(String, f64)>,
    /// Year x quarter sums, absent combinations left empty.
    pub quarterly: PivotTable,
    pub outliers: Option<OutlierSeries>,
    /// Yearly totals of the largest provinces.
    pub province_trends: Vec<(String, Vec<(i64, f64)>)>,
    pub cascade: CascadeTotals,
    pub correlation: CorrelationMatrix,
}

/// Observations of the focus indicator with the IQR upper fence.
#[derive(Debug, Clone)]
pub struct OutlierSeries {
    pub indicator: String,
    pub values: Vec<f64>,
    pub years: Vec<i64>,
    pub upper_bound: f64,
}

/// Equal-width bins over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    pub min: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl Bins {
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

        let mut counts = vec![0; bins];
        for v in finite {
            // The last bin is closed on the right.
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Self { min, width, counts })
    }

    pub fn bin_range(&self, i: usize) -> (f64, f64) {
        let lo = self.min + i as f64 * self.width;
        (lo, lo + self.width)
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Five-number summary for a box plot, whiskers at 1.5 IQR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

impl BoxSummary {
    pub fn new(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        Some(Self {
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
        })
    }
}

/// `ln(1 + x)` of every value; the distribution chart works on this scale.
pub fn log1p_all(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.ln_1p()).filter(|v| v.is_finite()).collect()
}

/// Axis range padded by 15% of the span on both sides.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max == min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.15;
    (min - pad, max + pad)
}

/// Upper axis bound leaving headroom for value labels above bars.
pub fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// Compact magnitude label: `1.23B`, `4.5M`, `12.0K`.
pub fn short_number(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{:.0}", v)
    }
}

/// Bar and line colours, cycled by series index.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(255, 87, 34),
    RGBColor(96, 125, 139),
];

pub fn palette(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

fn lerp_color(stops: &[(f64, (u8, u8, u8))], t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return RGBColor(mix(c0.0, c1.0), mix(c0.1, c1.1), mix(c0.2, c1.2));
        }
    }
    let (_, last) = stops[stops.len() - 1];
    RGBColor(last.0, last.1, last.2)
}

/// Sequential yellow-orange-red scale, `t` in `[0, 1]`.
pub fn heat_color(t: f64) -> RGBColor {
    lerp_color(
        &[
            (0.0, (255, 255, 204)),
            (0.5, (253, 141, 60)),
            (1.0, (189, 0, 38)),
        ],
        t,
    )
}

/// Diverging blue-white-red scale for correlations in `[-1, 1]`.
pub fn diverging_color(r: f64) -> RGBColor {
    lerp_color(
        &[
            (0.0, (59, 76, 192)),
            (0.5, (221, 221, 221)),
            (1.0, (180, 4, 38)),
        ],
        (r + 1.0) / 2.0,
    )
}

/// Sequential scale for colouring points by year.
pub fn year_color(t: f64) -> RGBColor {
    lerp_color(
        &[
            (0.0, (68, 1, 84)),
            (0.5, (33, 145, 140)),
            (1.0, (253, 231, 37)),
        ],
        t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_value() {
        let h = Bins::new(&[0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN], 4).unwrap();
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.bin_range(1), (1.0, 2.0));
        assert_eq!(h.max_count(), 2);
        assert!(Bins::new(&[], 10).is_none());

        let flat = Bins::new(&[5.0, 5.0], 3).unwrap();
        assert_eq!(flat.counts, vec![2, 0, 0]);
    }

    #[test]
    fn box_summary_whiskers_stop_at_fences() {
        let b = BoxSummary::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(b.median, 3.5);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 5.0);
    }

    #[test]
    fn ranges_and_labels() {
        assert_eq!(padded_range(0.0, 10.0), (-1.5, 11.5));
        assert_eq!(padded_range(2.0, 2.0), (1.0, 3.0));
        assert_eq!(headroom(0.0), 1.0);
        assert_eq!(short_number(2_346_000_000.0), "2.35B");
        assert_eq!(short_number(4_500_000.0), "4.5M");
        assert_eq!(short_number(950.0), "950");
        assert_eq!(log1p_all(&[0.0]), vec![0.0]);
    }

    #[test]
    fn colour_scales_hit_their_ends() {
        assert_eq!(heat_color(0.0), RGBColor(255, 255, 204));
        assert_eq!(heat_color(1.0), RGBColor(189, 0, 38));
        assert_eq!(heat_color(f64::NAN), RGBColor(255, 255, 204));
        assert_eq!(diverging_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(diverging_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(palette(12), PALETTE[2]);
    }
}
