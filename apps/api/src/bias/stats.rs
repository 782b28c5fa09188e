//! Significance tests used by the parity and score analyzers.
//!
//! - `chi_square_independence`: group × outcome contingency table (Yates-corrected at 1 dof)
//! - `two_sample_t_test`: Student's t with pooled variance, two-sided
//! - `one_way_anova`: F test across three or more groups
//!
//! The t and F tests return `None` on degenerate input (too few rows, zero variance); callers
//! substitute a neutral p-value.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

use crate::bias::numeric::{finite_or, mean, sample_variance};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceTest {
    ChiSquare,
    StudentT,
    Anova,
}

/// Result of a chi-square test of independence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// True when the table collapsed to fewer than two rows or columns.
    pub degenerate: bool,
}

impl ChiSquareResult {
    fn degenerate() -> Self {
        Self {
            statistic: 0.0,
            degrees_of_freedom: 0,
            p_value: 1.0,
            degenerate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test: SignificanceTest,
    pub statistic: f64,
    pub p_value: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Chi-square
// ────────────────────────────────────────────────────────────────────────────

/// Chi-square test of independence over a contingency table of observed counts.
///
/// All-zero rows and columns are dropped first. A table left with fewer than two rows or
/// columns is degenerate: statistic 0, p-value 1.0.
pub fn chi_square_independence(table: &[Vec<f64>]) -> ChiSquareResult {
    let width = table.iter().map(Vec::len).max().unwrap_or(0);
    let cell = |row: &Vec<f64>, j: usize| row.get(j).copied().unwrap_or(0.0);

    let live_cols: Vec<usize> = (0..width)
        .filter(|&j| table.iter().map(|row| cell(row, j)).sum::<f64>() > 0.0)
        .collect();
    let rows: Vec<Vec<f64>> = table
        .iter()
        .map(|row| live_cols.iter().map(|&j| cell(row, j)).collect::<Vec<f64>>())
        .filter(|row| row.iter().sum::<f64>() > 0.0)
        .collect();

    if rows.len() < 2 || live_cols.len() < 2 {
        return ChiSquareResult::degenerate();
    }

    let row_sums: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..live_cols.len())
        .map(|j| rows.iter().map(|r| r[j]).sum())
        .collect();
    let total: f64 = row_sums.iter().sum();
    let dof = (rows.len() - 1) * (live_cols.len() - 1);
    let yates = dof == 1;

    let mut statistic = 0.0;
    for (i, row) in rows.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_sums[i] * col_sums[j] / total;
            let mut diff = (observed - expected).abs();
            if yates {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / expected;
        }
    }
    let statistic = finite_or(statistic, 0.0);

    let p_value = ChiSquared::new(dof as f64)
        .map(|dist| dist.sf(statistic))
        .map(|p| finite_or(p, 1.0).clamp(0.0, 1.0))
        .unwrap_or(1.0);

    ChiSquareResult {
        statistic,
        degrees_of_freedom: dof,
        p_value,
        degenerate: false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// t-test / ANOVA
// ────────────────────────────────────────────────────────────────────────────

/// Two-sided Student's t-test assuming equal variances.
pub fn two_sample_t_test(a: &[f64], b: &[f64]) -> Option<TestOutcome> {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    if a.is_empty() || b.is_empty() || df <= 0.0 {
        return None;
    }

    let pooled = ((n1 - 1.0) * sample_variance(a) + (n2 - 1.0) * sample_variance(b)) / df;
    let standard_error = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if !standard_error.is_finite() || standard_error <= 0.0 {
        return None;
    }

    let t = (mean(a) - mean(b)) / standard_error;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = 2.0 * dist.sf(t.abs());

    finite_p(t, p).map(|(statistic, p_value)| TestOutcome {
        test: SignificanceTest::StudentT,
        statistic,
        p_value,
    })
}

/// One-way ANOVA F test across `groups`. Empty groups are ignored.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<TestOutcome> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;
    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    if ss_within <= 0.0 {
        return None;
    }

    let f = (ss_between / df_between) / (ss_within / df_within);
    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    let p = dist.sf(f);

    finite_p(f, p).map(|(statistic, p_value)| TestOutcome {
        test: SignificanceTest::Anova,
        statistic,
        p_value,
    })
}

fn finite_p(statistic: f64, p: f64) -> Option<(f64, f64)> {
    if statistic.is_finite() && p.is_finite() {
        Some((statistic, p.clamp(0.0, 1.0)))
    } else {
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chi_square_two_by_two_applies_yates() {
        // Expected 15 in every cell, |O−E| = 5 → corrected 4.5² / 15 × 4 = 5.4
        let table = vec![vec![10.0, 20.0], vec![20.0, 10.0]];
        let r = chi_square_independence(&table);
        assert!((r.statistic - 5.4).abs() < 1e-9, "statistic was {}", r.statistic);
        assert_eq!(r.degrees_of_freedom, 1);
        assert!(r.p_value > 0.01 && r.p_value < 0.03, "p was {}", r.p_value);
        assert!(!r.degenerate);
    }

    #[test]
    fn test_chi_square_independent_table_is_not_significant() {
        let table = vec![vec![10.0, 10.0], vec![10.0, 10.0], vec![10.0, 10.0]];
        let r = chi_square_independence(&table);
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.degrees_of_freedom, 2);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_chi_square_single_outcome_column_is_degenerate() {
        // Nobody hired → "hired" column is all zero
        let table = vec![vec![0.0, 5.0], vec![0.0, 7.0]];
        let r = chi_square_independence(&table);
        assert!(r.degenerate);
        assert_eq!(r.p_value, 1.0);
        assert_eq!(r.statistic, 0.0);
    }

    #[test]
    fn test_chi_square_empty_table_is_degenerate() {
        assert!(chi_square_independence(&[]).degenerate);
        assert!(chi_square_independence(&[vec![0.0, 0.0], vec![0.0, 0.0]]).degenerate);
    }

    #[test]
    fn test_t_test_separated_groups_significant() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [6.0, 7.0, 8.0, 9.0, 10.0];
        let r = two_sample_t_test(&a, &b).unwrap();
        assert!((r.statistic + 5.0).abs() < 1e-9, "t was {}", r.statistic);
        assert!(r.p_value < 0.01);
        assert_eq!(r.test, SignificanceTest::StudentT);
    }

    #[test]
    fn test_t_test_identical_groups_not_significant() {
        let a = [70.0, 75.0, 80.0];
        let r = two_sample_t_test(&a, &a).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_t_test_zero_variance_is_none() {
        assert!(two_sample_t_test(&[5.0, 5.0], &[5.0, 5.0]).is_none());
        assert!(two_sample_t_test(&[5.0], &[6.0]).is_none());
        assert!(two_sample_t_test(&[], &[6.0, 7.0]).is_none());
    }

    #[test]
    fn test_anova_three_groups() {
        // SSB = 54 (df 2), SSW = 6 (df 6) → F = 27
        let groups = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ];
        let r = one_way_anova(&groups).unwrap();
        assert!((r.statistic - 27.0).abs() < 1e-9, "F was {}", r.statistic);
        assert!(r.p_value < 0.01);
        assert_eq!(r.test, SignificanceTest::Anova);
    }

    #[test]
    fn test_anova_degenerate_inputs_are_none() {
        assert!(one_way_anova(&[vec![1.0, 2.0]]).is_none());
        assert!(one_way_anova(&[vec![3.0, 3.0], vec![3.0, 3.0], vec![3.0]]).is_none());
        assert!(one_way_anova(&[vec![1.0], vec![2.0]]).is_none());
    }
}
