//! Scattered-data interpolation of grid readings onto a dense lattice.
//!
//! Readings are triangulated (Delaunay) and an interpolant is evaluated at
//! every lattice point. Lattice points outside the convex hull of the
//! readings stay `NaN`; nothing is extrapolated.
pub mod clough_tocher;
pub mod linear;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::delaunay::Triangulation;
use crate::error::{DulqError, Result};
use crate::field::{linspace, ScalarField};
use crate::grid::Grid;
use clough_tocher::CloughTocher;
use linear::Linear;

/// Fewest readings accepted by [`interpolate`].
pub const MIN_SAMPLES: usize = 4;

/// Evaluator for one triangulated surface.
pub trait Interpolant: Sync {
    fn triangulation(&self) -> &Triangulation;

    /// Value inside triangle `tri` at barycentric coordinates `bary`.
    fn eval(&self, tri: usize, bary: [f64; 3]) -> f64;
}

/// Interpolation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Clough–Tocher piecewise cubic, C1 continuous.
    #[default]
    Cubic,
    /// Barycentric piecewise linear.
    Linear,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Cubic => f.write_str("cubic"),
            Method::Linear => f.write_str("linear"),
        }
    }
}

impl FromStr for Method {
    type Err = DulqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cubic" => Ok(Method::Cubic),
            "linear" => Ok(Method::Linear),
            other => Err(DulqError::InvalidConfig(format!(
                "unknown interpolation method '{other}' (expected cubic or linear)"
            ))),
        }
    }
}

/// Lattice points per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: usize,
    pub y: usize,
}

impl Resolution {
    pub const fn square(n: usize) -> Self {
        Self { x: n, y: n }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::square(100)
    }
}

/// Interpolate `grid` with the cubic method.
pub fn interpolate(grid: &Grid, resolution: Resolution) -> Result<ScalarField> {
    interpolate_with(grid, resolution, Method::Cubic)
}

/// Interpolate `grid` onto a `resolution.x × resolution.y` lattice spanning
/// `[0, cols] × [0, rows]`.
///
/// # Errors
/// - `InvalidConfig` if either axis has fewer than 2 lattice points.
/// - `InsufficientData` with fewer than [`MIN_SAMPLES`] readings.
/// - `DegenerateGeometry` when the readings do not span an area (for
///   example a single row) and `method` is [`Method::Cubic`]. The cubic
///   surface needs a triangulation; [`Method::Linear`] instead interpolates
///   along the line of readings, so callers can retry with it.
pub fn interpolate_with(grid: &Grid, resolution: Resolution, method: Method) -> Result<ScalarField> {
    if resolution.x < 2 || resolution.y < 2 {
        return Err(DulqError::InvalidConfig(format!(
            "resolution must be at least 2×2, got {}×{}",
            resolution.x, resolution.y
        )));
    }

    let samples = grid.samples();
    if samples.len() < MIN_SAMPLES {
        return Err(DulqError::InsufficientData {
            found: samples.len(),
            required: MIN_SAMPLES,
        });
    }

    let points: Vec<[f64; 2]> = samples.iter().map(|s| [s.x, s.y]).collect();
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let xs = linspace(0.0, grid.cols() as f64, resolution.x);
    let ys = linspace(0.0, grid.rows() as f64, resolution.y);
    let mut field = ScalarField::undefined(xs, ys);

    match (Triangulation::new(&points), method) {
        (Ok(tri), Method::Cubic) => evaluate(&CloughTocher::new(&tri, &values), &mut field),
        (Ok(tri), Method::Linear) => evaluate(&Linear::new(&tri, &values), &mut field),
        (Err(DulqError::DegenerateGeometry(reason)), Method::Linear) => {
            tracing::debug!(%reason, "readings are collinear; interpolating along the line");
            linear::evaluate_collinear(&points, &values, &mut field);
        }
        (Err(e), _) => return Err(e),
    }

    tracing::debug!(
        %method,
        samples = samples.len(),
        width = field.width,
        height = field.height,
        defined = field.defined_count(),
        "interpolated grid"
    );
    Ok(field)
}

fn evaluate_row(interp: &dyn Interpolant, xs: &[f64], y: f64, row: &mut [f64]) {
    let tri = interp.triangulation();
    let mut hint = 0;
    for (out, &x) in row.iter_mut().zip(xs) {
        if let Some((t, bary)) = tri.locate([x, y], hint) {
            hint = t;
            *out = interp.eval(t, bary);
        }
    }
}

#[cfg(not(feature = "threading"))]
fn evaluate(interp: &dyn Interpolant, field: &mut ScalarField) {
    evaluate_sequential(interp, field);
}

#[cfg_attr(feature = "threading", allow(dead_code))]
fn evaluate_sequential(interp: &dyn Interpolant, field: &mut ScalarField) {
    let width = field.width;
    for (row, &y) in field.data.chunks_mut(width).zip(&field.ys) {
        evaluate_row(interp, &field.xs, y, row);
    }
}

#[cfg(feature = "threading")]
fn evaluate(interp: &dyn Interpolant, field: &mut ScalarField) {
    use rayon::prelude::*;

    let width = field.width;
    let xs = &field.xs;
    field
        .data
        .par_chunks_mut(width)
        .zip(field.ys.par_iter())
        .for_each(|(row, &y)| evaluate_row(interp, xs, y, row));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn two_by_two() -> Grid {
        Grid::from_readings(2, 2, [((0, 0), 5.0), ((0, 1), 10.0), ((1, 0), 15.0), ((1, 1), 20.0)]).unwrap()
    }

    /// Inside (or on) a counter-clockwise convex polygon.
    fn inside_hull(hull: &[[f64; 2]], p: [f64; 2]) -> bool {
        (0..hull.len()).all(|i| {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]) >= -1e-9
        })
    }

    #[test]
    fn three_readings_are_insufficient() {
        let grid = Grid::from_readings(3, 3, [((0, 0), 1.0), ((0, 2), 2.0), ((2, 1), 3.0)]).unwrap();
        let err = interpolate(&grid, Resolution::default()).unwrap_err();
        assert!(matches!(err, DulqError::InsufficientData { found: 3, required: 4 }));
    }

    #[test]
    fn collinear_readings_are_degenerate_for_cubic() {
        let grid = Grid::from_readings(3, 6, (0..6).map(|c| ((1, c), c as f64))).unwrap();
        let err = interpolate_with(&grid, Resolution::default(), Method::Cubic).unwrap_err();
        assert!(matches!(err, DulqError::DegenerateGeometry(_)), "{err}");
    }

    #[test]
    fn linear_retry_covers_only_the_line_of_readings() {
        let grid = Grid::from_readings(3, 6, (0..6).map(|c| ((1, c), 2.0 * c as f64))).unwrap();
        // ys = 0, 1, 2, 3 and xs = 0..=6, so row 1 of the lattice lies on the readings.
        let field = interpolate_with(&grid, Resolution { x: 13, y: 4 }, Method::Linear).unwrap();
        for (j, &y) in field.ys.iter().enumerate() {
            for (i, &x) in field.xs.iter().enumerate() {
                let v = field.get(j, i);
                if y == 1.0 && x <= 5.0 {
                    assert_relative_eq!(v, 2.0 * x, epsilon = 1e-9);
                } else {
                    assert!(v.is_nan(), "({x}, {y}) should be undefined, got {v}");
                }
            }
        }
    }

    #[test]
    fn tiny_resolution_is_rejected() {
        let err = interpolate(&two_by_two(), Resolution { x: 1, y: 50 }).unwrap_err();
        assert!(matches!(err, DulqError::InvalidConfig(_)));
    }

    #[test]
    fn lattice_spans_grid_extent_inclusive() {
        let field = interpolate(&two_by_two(), Resolution::default()).unwrap();
        assert_eq!(field.width, 100);
        assert_eq!(field.height, 100);
        assert_eq!(field.xs[0], 0.0);
        assert_eq!(field.xs[99], 2.0);
        assert_eq!(field.ys[99], 2.0);
    }

    #[test]
    fn only_the_sample_hull_is_defined() {
        // Readings on [0,1]² of a 2×2 grid; the lattice runs to 2.0.
        let field = interpolate(&two_by_two(), Resolution::square(21)).unwrap();
        for (j, &y) in field.ys.iter().enumerate() {
            for (i, &x) in field.xs.iter().enumerate() {
                let v = field.get(j, i);
                let inside = x <= 1.0 + 1e-9 && y <= 1.0 + 1e-9;
                assert_eq!(!v.is_nan(), inside, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn sample_values_are_reproduced_on_lattice_nodes() {
        let grid = Grid::from_readings(
            4,
            4,
            [((0, 0), 12.0), ((0, 3), 3.0), ((3, 0), 18.0), ((3, 3), 22.0), ((1, 2), 9.0)],
        )
        .unwrap();
        for method in [Method::Cubic, Method::Linear] {
            // 5 lattice points over [0, 4] land exactly on columns and rows 0..=4.
            let field = interpolate_with(&grid, Resolution::square(5), method).unwrap();
            assert_relative_eq!(field.get(0, 0), 12.0, epsilon = 1e-9);
            assert_relative_eq!(field.get(0, 3), 3.0, epsilon = 1e-9);
            assert_relative_eq!(field.get(3, 0), 18.0, epsilon = 1e-9);
            assert_relative_eq!(field.get(3, 3), 22.0, epsilon = 1e-9);
            assert_relative_eq!(field.get(1, 2), 9.0, epsilon = 1e-9);
            assert!(field.get(4, 4).is_nan());
        }
    }

    #[test]
    fn planes_are_reproduced() {
        let plane = |x: f64, y: f64| 3.0 + 1.5 * x + 0.5 * y;
        let cells: Vec<((usize, usize), f64)> = [(0, 0), (0, 5), (5, 0), (5, 5), (2, 3), (4, 1), (1, 4)]
            .into_iter()
            .map(|(r, c)| ((r, c), plane(c as f64, r as f64)))
            .collect();
        let grid = Grid::from_readings(6, 6, cells).unwrap();
        for (method, tol) in [(Method::Linear, 1e-9), (Method::Cubic, 1e-3)] {
            let field = interpolate_with(&grid, Resolution::square(31), method).unwrap();
            for (j, &y) in field.ys.iter().enumerate() {
                for (i, &x) in field.xs.iter().enumerate() {
                    let v = field.get(j, i);
                    if !v.is_nan() {
                        assert_relative_eq!(v, plane(x, y), epsilon = tol);
                    }
                }
            }
        }
    }

    #[test]
    fn random_grids_are_undefined_outside_the_hull() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let (rows, cols) = (rng.gen_range(3..9), rng.gen_range(3..9));
            let mut grid = Grid::new(rows, cols).unwrap();
            // Four corners of a random sub-rectangle guarantee a 2D hull.
            let (r0, r1) = (rng.gen_range(0..rows - 1), rows - 1);
            let (c0, c1) = (0, rng.gen_range(1..cols));
            for (r, c) in [(r0, c0), (r0, c1), (r1, c0), (r1, c1)] {
                grid.set(r, c, rng.gen_range(0.0..30.0)).unwrap();
            }
            let hull = [
                [c0 as f64, r0 as f64],
                [c1 as f64, r0 as f64],
                [c1 as f64, r1 as f64],
                [c0 as f64, r1 as f64],
            ];
            let field = interpolate(&grid, Resolution::square(40)).unwrap();
            for (j, &y) in field.ys.iter().enumerate() {
                for (i, &x) in field.xs.iter().enumerate() {
                    let defined = !field.get(j, i).is_nan();
                    assert_eq!(defined, inside_hull(&hull, [x, y]), "({x}, {y}) in {rows}×{cols}");
                }
            }
        }
    }

    #[cfg(feature = "threading")]
    #[test]
    fn parallel_lattice_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = Grid::new(7, 9).unwrap();
        for r in 0..7 {
            for c in 0..9 {
                if rng.gen_bool(0.6) {
                    grid.set(r, c, rng.gen_range(0.0..30.0)).unwrap();
                }
            }
        }
        for (r, c) in [(0, 0), (0, 8), (6, 0), (6, 8)] {
            grid.set(r, c, rng.gen_range(0.0..30.0)).unwrap();
        }
        let samples = grid.samples();
        let points: Vec<[f64; 2]> = samples.iter().map(|s| [s.x, s.y]).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let tri = Triangulation::new(&points).unwrap();
        let interp = CloughTocher::new(&tri, &values);

        let parallel = interpolate(&grid, Resolution { x: 53, y: 37 }).unwrap();
        let mut sequential = ScalarField::undefined(parallel.xs.clone(), parallel.ys.clone());
        evaluate_sequential(&interp, &mut sequential);
        for (a, b) in parallel.data.iter().zip(&sequential.data) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("Cubic".parse::<Method>().unwrap(), Method::Cubic);
        assert_eq!("linear".parse::<Method>().unwrap(), Method::Linear);
        assert!("nearest".parse::<Method>().is_err());
    }
}
