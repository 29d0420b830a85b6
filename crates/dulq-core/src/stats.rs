//! Summary statistics and lowest-quarter distribution uniformity (DUlq).
//!
//! DUlq = mean of the lowest quarter / mean of all readings × 100.
//! The lowest quarter is every reading `<=` the 25th percentile, so ties at
//! the threshold are all included and it can hold more than a quarter of
//! the readings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DulqError, Result};
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Sum of all readings.
    pub sum: f64,
    /// Number of cells with a reading.
    pub count: usize,
    pub mean: f64,
    /// 25th percentile of the readings (linear between order statistics).
    pub low_quarter_threshold: f64,
    /// Readings `<=` the threshold.
    pub low_quarter_count: usize,
    pub low_quarter_sum: f64,
    pub low_quarter_mean: f64,
    /// Distribution uniformity, percent.
    pub uniformity: f64,
}

/// `p`-th percentile of `values` (`p` in `[0, 100]`), interpolating linearly
/// between the order statistics around rank `p/100 · (n − 1)`.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(DulqError::EmptyDataset);
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(DulqError::InvalidConfig(format!("percentile {p} is outside [0, 100]")));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (a, b) = (sorted[lo], sorted[hi]);
    let t = rank - lo as f64;
    // Interpolate from whichever end is nearer to keep the error small.
    Ok(if t < 0.5 { a + (b - a) * t } else { b - (b - a) * (1.0 - t) })
}

/// Summarise the readings of `grid`.
///
/// # Errors
/// - `EmptyDataset` if no cell has a reading.
/// - `DivisionUndefined` if the mean reading is zero.
pub fn summarize(grid: &Grid) -> Result<SummaryStatistics> {
    let values = grid.values();
    if values.is_empty() {
        return Err(DulqError::EmptyDataset);
    }

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;

    let threshold = percentile(&values, 25.0)?;
    let low: Vec<f64> = values.iter().copied().filter(|&v| v <= threshold).collect();
    let low_quarter_count = low.len();
    let low_quarter_sum: f64 = low.iter().sum();
    let low_quarter_mean = low_quarter_sum / low_quarter_count as f64;

    if mean == 0.0 {
        return Err(DulqError::DivisionUndefined);
    }
    let uniformity = low_quarter_mean / mean * 100.0;

    Ok(SummaryStatistics {
        sum,
        count,
        mean,
        low_quarter_threshold: threshold,
        low_quarter_count,
        low_quarter_sum,
        low_quarter_mean,
        uniformity,
    })
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sums keep a decimal point ("50.0"), as the survey apps print them.
        writeln!(f, "Sum: {:?}", self.sum)?;
        writeln!(f, "Count: {}", self.count)?;
        writeln!(f, "Avg: {:.2}", self.mean)?;
        writeln!(f, "Low Qtr Cups: {}", self.low_quarter_count)?;
        writeln!(f, "Low Qtr Sum: {:?}", self.low_quarter_sum)?;
        writeln!(f, "Low Qtr Count: {}", self.low_quarter_count)?;
        writeln!(f, "Low Qtr Avg: {:.2}", self.low_quarter_mean)?;
        write!(f, "DUlq: {:.2}%", self.uniformity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn grid_of(values: &[f64]) -> Grid {
        Grid::from_readings(1, values.len(), values.iter().enumerate().map(|(c, &v)| ((0, c), v))).unwrap()
    }

    #[test]
    fn two_by_two_example() {
        let grid =
            Grid::from_readings(2, 2, [((0, 0), 5.0), ((0, 1), 10.0), ((1, 0), 15.0), ((1, 1), 20.0)]).unwrap();
        let s = summarize(&grid).unwrap();
        assert_eq!(s.count, 4);
        assert_relative_eq!(s.sum, 50.0);
        assert_relative_eq!(s.mean, 12.5);
        // rank 0.25 · 3 = 0.75 → 5 + 0.75 · (10 − 5)
        assert_relative_eq!(s.low_quarter_threshold, 8.75);
        assert_eq!(s.low_quarter_count, 1);
        assert_relative_eq!(s.low_quarter_sum, 5.0);
        assert_relative_eq!(s.low_quarter_mean, 5.0);
        assert_relative_eq!(s.uniformity, 40.0);
    }

    #[test]
    fn percentile_matches_linear_definition() {
        assert_relative_eq!(percentile(&[20.0, 5.0, 15.0, 10.0], 25.0).unwrap(), 8.75);
        assert_relative_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 25.0).unwrap(), 2.0);
        assert_relative_eq!(percentile(&[7.0], 25.0).unwrap(), 7.0);
        assert_relative_eq!(percentile(&[1.0, 3.0], 50.0).unwrap(), 2.0);
        assert_relative_eq!(percentile(&[1.0, 3.0], 100.0).unwrap(), 3.0);
        assert!(percentile(&[1.0], 101.0).is_err());
        assert!(matches!(percentile(&[], 25.0), Err(DulqError::EmptyDataset)));
    }

    #[test]
    fn ties_at_threshold_are_all_in_the_low_quarter() {
        let s = summarize(&grid_of(&[4.0, 4.0, 4.0, 4.0, 10.0, 12.0])).unwrap();
        assert_relative_eq!(s.low_quarter_threshold, 4.0);
        assert_eq!(s.low_quarter_count, 4);
        assert_relative_eq!(s.low_quarter_sum, 16.0);
    }

    #[test]
    fn empty_grid_fails() {
        let grid = Grid::new(3, 3).unwrap();
        assert!(matches!(summarize(&grid), Err(DulqError::EmptyDataset)));
    }

    #[test]
    fn all_zero_readings_are_undefined() {
        assert!(matches!(summarize(&grid_of(&[0.0, 0.0, 0.0])), Err(DulqError::DivisionUndefined)));
    }

    #[test]
    fn uniform_readings_give_full_uniformity() {
        let s = summarize(&grid_of(&[12.0; 9])).unwrap();
        assert_relative_eq!(s.uniformity, 100.0);
        assert_eq!(s.low_quarter_count, 9);
    }

    #[test]
    fn low_quarter_is_bounded_by_the_whole() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let n = rng.gen_range(1..40);
            let values: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..35.0)).collect();
            let s = summarize(&grid_of(&values)).unwrap();
            assert!(s.low_quarter_count >= 1);
            assert!(s.low_quarter_count <= s.count);
            assert!(s.low_quarter_sum <= s.sum + 1e-9);
            assert!(s.uniformity <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn text_summary_lists_every_line() {
        let grid =
            Grid::from_readings(2, 2, [((0, 0), 5.0), ((0, 1), 10.0), ((1, 0), 15.0), ((1, 1), 20.0)]).unwrap();
        let text = summarize(&grid).unwrap().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Sum: 50.0",
                "Count: 4",
                "Avg: 12.50",
                "Low Qtr Cups: 1",
                "Low Qtr Sum: 5.0",
                "Low Qtr Count: 1",
                "Low Qtr Avg: 5.00",
                "DUlq: 40.00%",
            ]
        );
    }

    #[test]
    fn fractional_sums_print_in_full() {
        let text = summarize(&grid_of(&[2.5, 10.0, 12.25])).unwrap().to_string();
        assert!(text.starts_with("Sum: 24.75\n"), "{text}");
        assert!(text.contains("Low Qtr Sum: 2.5\n"), "{text}");
    }
}
