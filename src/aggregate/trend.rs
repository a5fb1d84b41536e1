//! Shares and period-over-period growth.

use super::group::{AggregateGroup, Aggregator};
use super::AggregateError;
use crate::data::{CleanedDataset, Dimension};
use serde::Serialize;

/// Round half away from zero to 2 decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `value / total * 100`, rounded to 2 decimals; 0 when the total is 0.
pub fn percent_of_total(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        round2(value / total * 100.0)
    }
}

/// A group's total and its share of the overall total.
#[derive(Debug, Clone, Serialize)]
pub struct Share {
    pub label: String,
    pub total: f64,
    pub percent: f64,
}

/// Shares of each group of a one-dimensional aggregate, in group order.
pub fn shares(group: &AggregateGroup) -> Vec<Share> {
    let total = group.total();
    group
        .rows
        .iter()
        .map(|r| Share {
            label: r.key().to_string(),
            total: r.sum,
            percent: percent_of_total(r.sum, total),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthPoint {
    pub period: String,
    pub value: f64,
    /// Growth over the previous period, in percent.
    pub growth: f64,
}

/// Growth of each period over the one before it. The first period and any
/// period following a non-positive value get 0.
pub fn year_over_year(series: &[(String, f64)]) -> Vec<GrowthPoint> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|(period, value)| {
            let growth = match previous {
                Some(prev) if prev > 0.0 => (value - prev) / prev * 100.0,
                _ => 0.0,
            };
            previous = Some(*value);
            GrowthPoint {
                period: period.clone(),
                value: *value,
                growth,
            }
        })
        .collect()
}

/// Yearly totals, oldest first.
pub fn yearly_totals(ds: &CleanedDataset) -> Result<Vec<(String, f64)>, AggregateError> {
    let group = Aggregator::group_by(ds, &[Dimension::Year])?.sorted_by_key();
    Ok(group
        .rows
        .into_iter()
        .map(|r| (r.key().to_string(), r.sum))
        .collect())
}

/// Year-over-year growth of the yearly totals of each indicator.
pub fn growth_by_indicator(
    ds: &CleanedDataset,
) -> Result<Vec<(String, Vec<GrowthPoint>)>, AggregateError> {
    let group = Aggregator::group_by(ds, &[Dimension::Indicator, Dimension::Year])?.sorted_by_key();
    let mut out: Vec<(String, Vec<(String, f64)>)> = Vec::new();
    for row in group.rows {
        let indicator = &row.keys[0];
        let point = (row.keys[1].clone(), row.sum);
        match out.iter_mut().find(|(name, _)| name == indicator) {
            Some((_, series)) => series.push(point),
            None => out.push((indicator.clone(), vec![point])),
        }
    }
    Ok(out
        .into_iter()
        .map(|(name, series)| (name, year_over_year(&series)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dataset, row};

    fn periods(values: &[(&str, f64)]) -> Vec<(String, f64)> {
        values.iter().map(|(p, v)| (p.to_string(), *v)).collect()
    }

    #[test]
    fn first_period_has_zero_growth() {
        let g = year_over_year(&periods(&[("2020", 100.0), ("2021", 150.0), ("2022", 120.0)]));
        assert_eq!(g[0].growth, 0.0);
        assert!((g[1].growth - 50.0).abs() < 1e-12);
        assert!((g[2].growth + 20.0).abs() < 1e-12);
    }

    #[test]
    fn non_positive_previous_gives_zero_growth() {
        let g = year_over_year(&periods(&[("2020", 0.0), ("2021", 10.0), ("2022", 20.0)]));
        assert_eq!(g[1].growth, 0.0);
        assert_eq!(g[2].growth, 100.0);
        assert!(year_over_year(&[]).is_empty());
    }

    #[test]
    fn percent_of_total_rounds_and_guards_zero() {
        assert_eq!(percent_of_total(1.0, 3.0), 33.33);
        assert_eq!(percent_of_total(2.0, 3.0), 66.67);
        assert_eq!(percent_of_total(5.0, 0.0), 0.0);
        assert_eq!(round2(-1.005), -1.0);
    }

    #[test]
    fn shares_and_trends_from_dataset() {
        let ds = dataset(&[
            row("Kinshasa", 2021, "T1", "Tests", 30.0),
            row("Ituri", 2020, "T1", "Tests", 10.0),
            row("Ituri", 2020, "T1", "Condoms", 60.0),
            row("Ituri", 2021, "T1", "Condoms", 30.0),
        ]);

        let by_province = Aggregator::group_by(&ds, &[Dimension::Province]).unwrap();
        let s = shares(&by_province);
        assert_eq!(s[0].label, "Kinshasa");
        assert_eq!(s[0].percent, 23.08);
        assert_eq!(s[1].percent, 76.92);

        assert_eq!(
            yearly_totals(&ds).unwrap(),
            periods(&[("2020", 70.0), ("2021", 60.0)])
        );

        let growth = growth_by_indicator(&ds).unwrap();
        let condoms = &growth.iter().find(|(n, _)| n == "Condoms").unwrap().1;
        assert_eq!(condoms[1].growth, -50.0);
        let tests = &growth.iter().find(|(n, _)| n == "Tests").unwrap().1;
        assert_eq!(tests[1].growth, 200.0);
    }
}
