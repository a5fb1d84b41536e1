//! Inferential tests: normality, two-sample comparison, independence.

use super::descriptive::{drop_missing, mean, sample_variance};
use super::{StatsError, SIGNIFICANCE_THRESHOLD};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

/// Smallest sample the skewness test accepts.
pub const NORMALITY_MIN_SAMPLE: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct NormalityTest {
    pub n: usize,
    pub skew_z: f64,
    pub kurtosis_z: f64,
    /// Omnibus K² statistic.
    pub statistic: f64,
    pub p_value: f64,
}

impl NormalityTest {
    pub fn looks_normal(&self) -> bool {
        self.p_value > SIGNIFICANCE_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TTestKind {
    /// Pooled variance.
    Student,
    /// Unequal variances, Welch-Satterthwaite degrees of freedom.
    Welch,
}

#[derive(Debug, Clone, Serialize)]
pub struct TTest {
    pub kind: TTestKind,
    pub n1: usize,
    pub n2: usize,
    pub mean1: f64,
    pub mean2: f64,
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

impl TTest {
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_THRESHOLD
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    pub yates_corrected: bool,
}

impl ChiSquareTest {
    pub fn is_dependent(&self) -> bool {
        self.p_value < SIGNIFICANCE_THRESHOLD
    }
}

/// Cross-tabulated counts of two categorical series.
#[derive(Debug, Clone, Serialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub counts: Vec<Vec<f64>>,
}

impl ContingencyTable {
    /// Count co-occurrences of `rows[i]` and `cols[i]`. Labels are sorted.
    pub fn from_pairs(rows: &[String], cols: &[String]) -> Self {
        let mut row_labels: Vec<String> = rows.to_vec();
        row_labels.sort();
        row_labels.dedup();
        let mut col_labels: Vec<String> = cols.to_vec();
        col_labels.sort();
        col_labels.dedup();

        let mut counts = vec![vec![0.0; col_labels.len()]; row_labels.len()];
        for (r, c) in rows.iter().zip(cols) {
            if let (Ok(i), Ok(j)) = (row_labels.binary_search(r), col_labels.binary_search(c)) {
                counts[i][j] += 1.0;
            }
        }

        Self {
            row_labels,
            col_labels,
            counts,
        }
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }
}

/// D'Agostino-Pearson omnibus test for departure from normality.
pub fn normality_test(values: &[f64]) -> Result<NormalityTest, StatsError> {
    let data = drop_missing(values);
    let n = data.len();
    if n < NORMALITY_MIN_SAMPLE {
        return Err(StatsError::InsufficientData {
            test: "normality test",
            required: NORMALITY_MIN_SAMPLE,
            actual: n,
        });
    }

    let m = mean(&data);
    let nf = n as f64;
    let (m2, m3, m4) = data.iter().fold((0.0, 0.0, 0.0), |(a, b, c), x| {
        let d = x - m;
        (a + d * d / nf, b + d * d * d / nf, c + d * d * d * d / nf)
    });
    if m2 == 0.0 {
        return Err(StatsError::ZeroVariance("normality test"));
    }

    let skew_z = skew_z_score(m3 / m2.powf(1.5), nf);
    let kurtosis_z = kurtosis_z_score(m4 / (m2 * m2), nf)?;
    let statistic = skew_z * skew_z + kurtosis_z * kurtosis_z;
    let p_value = chi2_sf(statistic, 2.0)?;

    Ok(NormalityTest {
        n,
        skew_z,
        kurtosis_z,
        statistic,
        p_value,
    })
}

/// Z-score of the sample skewness `b1` (D'Agostino, 1970).
fn skew_z_score(b1: f64, n: f64) -> f64 {
    let y = b1 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    let ratio = y / alpha;
    delta * (ratio + (ratio * ratio + 1.0).sqrt()).ln()
}

/// Z-score of the sample kurtosis `b2` (Anscombe & Glynn, 1983).
fn kurtosis_z_score(b2: f64, n: f64) -> Result<f64, StatsError> {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return Err(StatsError::Degenerate("kurtosis test"));
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    Ok((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}

/// Two-sided two-sample t-test.
pub fn t_test(a: &[f64], b: &[f64], kind: TTestKind) -> Result<TTest, StatsError> {
    let a = drop_missing(a);
    let b = drop_missing(b);
    for group in [&a, &b] {
        if group.len() < 2 {
            return Err(StatsError::InsufficientData {
                test: "t-test",
                required: 2,
                actual: group.len(),
            });
        }
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let mean1 = mean(&a);
    let mean2 = mean(&b);
    let var1 = sample_variance(&a, mean1);
    let var2 = sample_variance(&b, mean2);

    let (se, df) = match kind {
        TTestKind::Student => {
            let df = n1 + n2 - 2.0;
            let pooled = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        TTestKind::Welch => {
            let s1 = var1 / n1;
            let s2 = var2 / n2;
            let df = (s1 + s2).powi(2) / (s1.powi(2) / (n1 - 1.0) + s2.powi(2) / (n2 - 1.0));
            ((s1 + s2).sqrt(), df)
        }
    };
    if se == 0.0 {
        return Err(StatsError::ZeroVariance("t-test"));
    }

    let statistic = (mean1 - mean2) / se;
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = (2.0 * dist.sf(statistic.abs())).min(1.0);

    Ok(TTest {
        kind,
        n1: a.len(),
        n2: b.len(),
        mean1,
        mean2,
        statistic,
        df,
        p_value,
    })
}

/// Chi-square test of independence, Yates-corrected for 2x2 tables.
pub fn chi_square_independence(table: &ContingencyTable) -> Result<ChiSquareTest, StatsError> {
    let observed = &table.counts;
    let rows = observed.len();
    let cols = observed.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(StatsError::InvalidTable("contingency table is empty".to_string()));
    }
    if observed.iter().any(|r| r.len() != cols) {
        return Err(StatsError::InvalidTable("contingency table is ragged".to_string()));
    }

    let row_totals: Vec<f64> = observed.iter().map(|r| r.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..cols).map(|j| observed.iter().map(|r| r[j]).sum()).collect();
    let total: f64 = row_totals.iter().sum();

    let dof = (rows - 1) * (cols - 1);
    if dof == 0 {
        return Ok(ChiSquareTest {
            statistic: 0.0,
            p_value: 1.0,
            dof,
            yates_corrected: false,
        });
    }

    let yates = dof == 1;
    let mut statistic = 0.0;
    for (i, row) in observed.iter().enumerate() {
        for (j, &o) in row.iter().enumerate() {
            let expected = row_totals[i] * col_totals[j] / total;
            if expected == 0.0 {
                return Err(StatsError::InvalidTable(format!(
                    "zero expected frequency at ({}, {})",
                    table.row_labels.get(i).map_or("?", String::as_str),
                    table.col_labels.get(j).map_or("?", String::as_str)
                )));
            }
            let o = if yates {
                let diff = expected - o;
                o + diff.signum() * diff.abs().min(0.5)
            } else {
                o
            };
            statistic += (o - expected).powi(2) / expected;
        }
    }

    Ok(ChiSquareTest {
        statistic,
        p_value: chi2_sf(statistic, dof as f64)?,
        dof,
        yates_corrected: yates,
    })
}

fn chi2_sf(x: f64, dof: f64) -> Result<f64, StatsError> {
    let dist = ChiSquared::new(dof).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(dist.sf(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::distribution::Normal;

    fn normal_quantiles(n: usize) -> Vec<f64> {
        let dist = Normal::new(0.0, 1.0).unwrap();
        (1..=n)
            .map(|i| dist.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    #[test]
    fn symmetric_sample_looks_normal() {
        let test = normality_test(&normal_quantiles(30)).unwrap();
        assert_eq!(test.n, 30);
        assert!(test.p_value > 0.05, "p = {}", test.p_value);
        assert!(test.looks_normal());
    }

    #[test]
    fn spiked_sample_is_not_normal() {
        let mut values = vec![1.0; 19];
        values.push(1000.0);
        let test = normality_test(&values).unwrap();
        assert!(test.p_value < 0.001);
        assert!(!test.looks_normal());
    }

    #[test]
    fn normality_needs_eight_values() {
        let err = normality_test(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientData { required: 8, actual: 7, .. }));
        assert!(normality_test(&[2.0; 10]).is_err());
    }

    #[test]
    fn student_t_test_known_values() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [6.0, 7.0, 8.0, 9.0, 10.0];
        let test = t_test(&a, &b, TTestKind::Student).unwrap();
        assert!((test.statistic + 5.0).abs() < 1e-12);
        assert!((test.df - 8.0).abs() < 1e-12);
        assert!(test.p_value > 0.0005 && test.p_value < 0.002);
        assert!(test.is_significant());

        let welch = t_test(&a, &b, TTestKind::Welch).unwrap();
        assert!((welch.statistic + 5.0).abs() < 1e-12);
        assert!((welch.df - 8.0).abs() < 1e-9);
    }

    #[test]
    fn welch_df_shrinks_with_unequal_variance() {
        let a = [1.0, 1.1, 0.9, 1.0, 1.05, 0.95];
        let b = [0.0, 10.0, -5.0, 15.0];
        let test = t_test(&a, &b, TTestKind::Welch).unwrap();
        assert!(test.df < 8.0);
        assert!(!test.is_significant());
    }

    #[test]
    fn t_test_preconditions() {
        assert!(matches!(
            t_test(&[1.0], &[1.0, 2.0], TTestKind::Student),
            Err(StatsError::InsufficientData { .. })
        ));
        assert!(matches!(
            t_test(&[3.0, 3.0], &[3.0, 3.0], TTestKind::Student),
            Err(StatsError::ZeroVariance(_))
        ));
    }

    fn table(counts: Vec<Vec<f64>>) -> ContingencyTable {
        ContingencyTable {
            row_labels: (0..counts.len()).map(|i| format!("r{i}")).collect(),
            col_labels: (0..counts[0].len()).map(|j| format!("c{j}")).collect(),
            counts,
        }
    }

    #[test]
    fn proportional_table_is_independent() {
        let test = chi_square_independence(&table(vec![vec![10.0, 20.0], vec![20.0, 40.0]])).unwrap();
        assert_eq!(test.dof, 1);
        assert!(test.yates_corrected);
        assert!(test.statistic.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-12);
        assert!(!test.is_dependent());
    }

    #[test]
    fn diagonal_table_is_dependent() {
        let test = chi_square_independence(&table(vec![vec![50.0, 0.0], vec![0.0, 50.0]])).unwrap();
        // (|50 - 25| - 0.5)^2 / 25 per cell
        assert!((test.statistic - 4.0 * 24.5f64.powi(2) / 25.0).abs() < 1e-9);
        assert!(test.is_dependent());

        let test = chi_square_independence(&table(vec![
            vec![30.0, 0.0, 10.0],
            vec![0.0, 30.0, 10.0],
        ]))
        .unwrap();
        assert_eq!(test.dof, 2);
        assert!(!test.yates_corrected);
        assert!((test.statistic - 60.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_tables() {
        let single = chi_square_independence(&table(vec![vec![5.0, 7.0]])).unwrap();
        assert_eq!(single.dof, 0);
        assert_eq!(single.statistic, 0.0);
        assert_eq!(single.p_value, 1.0);

        let zero_column = table(vec![vec![5.0, 0.0], vec![3.0, 0.0]]);
        assert!(matches!(
            chi_square_independence(&zero_column),
            Err(StatsError::InvalidTable(_))
        ));
    }

    #[test]
    fn contingency_from_pairs() {
        let rows: Vec<String> = ["Kinshasa", "Ituri", "Kinshasa"].map(String::from).to_vec();
        let cols: Vec<String> = ["Féminin", "Masculin", "Masculin"].map(String::from).to_vec();
        let t = ContingencyTable::from_pairs(&rows, &cols);
        assert_eq!(t.row_labels, ["Ituri", "Kinshasa"]);
        assert_eq!(t.col_labels, ["Féminin", "Masculin"]);
        assert_eq!(t.counts, vec![vec![0.0, 1.0], vec![1.0, 1.0]]);
        assert_eq!(t.total(), 3.0);
    }
}
