//! Piecewise-linear interpolation on the Delaunay triangulation, and along
//! a single line when the readings are collinear.

use super::Interpolant;
use crate::delaunay::Triangulation;
use crate::field::ScalarField;

/// Distance from the line of readings within which a lattice point counts as on it.
const ON_LINE_EPS: f64 = 1e-9;

pub struct Linear<'a> {
    tri: &'a Triangulation,
    values: &'a [f64],
}

impl<'a> Linear<'a> {
    pub fn new(tri: &'a Triangulation, values: &'a [f64]) -> Self {
        Self { tri, values }
    }
}

impl Interpolant for Linear<'_> {
    fn triangulation(&self) -> &Triangulation {
        self.tri
    }

    fn eval(&self, tri: usize, bary: [f64; 3]) -> f64 {
        let v = self.tri.triangles()[tri];
        bary[0] * self.values[v[0]] + bary[1] * self.values[v[1]] + bary[2] * self.values[v[2]]
    }
}

/// Fill `field` by interpolating linearly along collinear `points`.
///
/// The convex hull of collinear points is the segment between the two
/// extreme points; only lattice points on that segment receive a value.
pub fn evaluate_collinear(points: &[[f64; 2]], values: &[f64], field: &mut ScalarField) {
    let Some(&origin) = points.first() else { return };
    let dist2 = |p: [f64; 2]| (p[0] - origin[0]).powi(2) + (p[1] - origin[1]).powi(2);
    let Some(&far) = points.iter().max_by(|a, b| dist2(**a).total_cmp(&dist2(**b))) else {
        return;
    };
    let len = dist2(far).sqrt();
    if len == 0.0 {
        return;
    }
    let dir = [(far[0] - origin[0]) / len, (far[1] - origin[1]) / len];

    // Readings as (position along the line, value), sorted.
    let mut line: Vec<(f64, f64)> = points
        .iter()
        .zip(values)
        .map(|(p, &v)| ((p[0] - origin[0]) * dir[0] + (p[1] - origin[1]) * dir[1], v))
        .collect();
    line.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (t_min, t_max) = (line[0].0, line[line.len() - 1].0);

    for j in 0..field.height {
        for i in 0..field.width {
            let (dx, dy) = (field.xs[i] - origin[0], field.ys[j] - origin[1]);
            if (dx * dir[1] - dy * dir[0]).abs() > ON_LINE_EPS {
                continue;
            }
            let t = dx * dir[0] + dy * dir[1];
            if t < t_min - ON_LINE_EPS || t > t_max + ON_LINE_EPS {
                continue;
            }
            let k = line.partition_point(|&(tk, _)| tk <= t).clamp(1, line.len() - 1);
            let (t0, v0) = line[k - 1];
            let (t1, v1) = line[k];
            let w = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
            field.set(j, i, v0 + (v1 - v0) * w);
        }
    }
}
