//! Clough–Tocher C1 piecewise-cubic interpolation.
//!
//! Each Delaunay triangle is split at its centroid into three cubic Bézier
//! patches. Control points come from vertex values and vertex gradients;
//! the inner edge control points are fixed by requiring the cross-edge
//! derivative to vary linearly along every shared edge, which makes the
//! surface C1 across triangles.
//!
//! Vertex gradients are estimated globally by minimising the second
//! derivative of the cubic along every triangulation edge (Nielson 1983),
//! solved with Gauss–Seidel sweeps.

use tracing::warn;

use super::Interpolant;
use crate::delaunay::Triangulation;

/// Gradient sweep stops once the largest relative update drops below this.
pub const GRADIENT_TOL: f64 = 1e-6;
pub const GRADIENT_MAX_ITER: usize = 400;

pub struct CloughTocher<'a> {
    tri: &'a Triangulation,
    values: &'a [f64],
    gradients: Vec<[f64; 2]>,
}

impl<'a> CloughTocher<'a> {
    pub fn new(tri: &'a Triangulation, values: &'a [f64]) -> Self {
        let (gradients, sweeps) = estimate_gradients(tri, values, GRADIENT_TOL, GRADIENT_MAX_ITER);
        match sweeps {
            Some(n) => tracing::debug!(sweeps = n, "gradient estimation converged"),
            None => warn!(
                max_iter = GRADIENT_MAX_ITER,
                "gradient estimation did not converge; cubic surface may be inaccurate"
            ),
        }
        Self { tri, values, gradients }
    }

    pub fn gradients(&self) -> &[[f64; 2]] {
        &self.gradients
    }
}

/// Estimate `(df/dx, df/dy)` at every vertex.
///
/// Returns the gradients and the number of sweeps used, or `None` for the
/// sweep count when `max_iter` was exhausted.
pub fn estimate_gradients(
    tri: &Triangulation,
    values: &[f64],
    tol: f64,
    max_iter: usize,
) -> (Vec<[f64; 2]>, Option<usize>) {
    let pts = tri.points();
    let mut grad = vec![[0.0f64; 2]; pts.len()];

    for iter in 0..max_iter {
        let mut err = 0.0f64;
        for i in 0..pts.len() {
            let (mut q00, mut q01, mut q11) = (0.0, 0.0, 0.0);
            let (mut s0, mut s1) = (0.0, 0.0);

            for &j in tri.vertex_neighbors(i) {
                let ex = pts[j][0] - pts[i][0];
                let ey = pts[j][1] - pts[i][1];
                let l = (ex * ex + ey * ey).sqrt();
                let l3 = l * l * l;

                // Neighbour gradient projected on the edge.
                let df2 = -ex * grad[j][0] - ey * grad[j][1];
                let rhs = 6.0 * (values[i] - values[j]) - 2.0 * df2;

                q00 += 4.0 * ex * ex / l3;
                q01 += 4.0 * ex * ey / l3;
                q11 += 4.0 * ey * ey / l3;
                s0 += rhs * ex / l3;
                s1 += rhs * ey / l3;
            }

            let det = q00 * q11 - q01 * q01;
            let r0 = (q11 * s0 - q01 * s1) / det;
            let r1 = (-q01 * s0 + q00 * s1) / det;

            let change = (grad[i][0] + r0).abs().max((grad[i][1] + r1).abs());
            grad[i] = [-r0, -r1];

            err = err.max(change / r0.abs().max(r1.abs()).max(1.0));
        }
        if err < tol {
            return (grad, Some(iter + 1));
        }
    }
    (grad, None)
}

impl Interpolant for CloughTocher<'_> {
    fn triangulation(&self) -> &Triangulation {
        self.tri
    }

    fn eval(&self, t: usize, b: [f64; 3]) -> f64 {
        let tri = self.tri;
        let pts = tri.points();
        let [i0, i1, i2] = tri.triangles()[t];
        let (p0, p1, p2) = (pts[i0], pts[i1], pts[i2]);
        let (g0, g1, g2) = (self.gradients[i0], self.gradients[i1], self.gradients[i2]);

        let (e12x, e12y) = (p1[0] - p0[0], p1[1] - p0[1]);
        let (e23x, e23y) = (p2[0] - p1[0], p2[1] - p1[1]);
        let (e31x, e31y) = (p0[0] - p2[0], p0[1] - p2[1]);

        let f1 = self.values[i0];
        let f2 = self.values[i1];
        let f3 = self.values[i2];

        // Directional derivatives along the triangle edges.
        let df12 = g0[0] * e12x + g0[1] * e12y;
        let df21 = -(g1[0] * e12x + g1[1] * e12y);
        let df23 = g1[0] * e23x + g1[1] * e23y;
        let df32 = -(g2[0] * e23x + g2[1] * e23y);
        let df31 = g2[0] * e31x + g2[1] * e31y;
        let df13 = -(g0[0] * e31x + g0[1] * e31y);

        // ── Bézier control net ────────────────────────────────────────────────
        let c3000 = f1;
        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0300 = f2;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c0030 = f3;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        // Cross-edge derivative condition; hull edges use the centroid direction.
        let mut g = [-0.5f64; 3];
        for (k, neighbour) in tri.neighbors(t).into_iter().enumerate() {
            let Some(nt) = neighbour else { continue };
            let nv = tri.triangles()[nt];
            let centroid = [
                (pts[nv[0]][0] + pts[nv[1]][0] + pts[nv[2]][0]) / 3.0,
                (pts[nv[0]][1] + pts[nv[1]][1] + pts[nv[2]][1]) / 3.0,
            ];
            let c = tri.barycentric(t, centroid);
            g[k] = match k {
                0 => (2.0 * c[2] + c[1] - 1.0) / (2.0 - 3.0 * c[2] - 3.0 * c[1]),
                1 => (2.0 * c[0] + c[2] - 1.0) / (2.0 - 3.0 * c[0] - 3.0 * c[2]),
                _ => (2.0 * c[1] + c[0] - 1.0) / (2.0 - 3.0 * c[1] - 3.0 * c[0]),
            };
        }

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;

        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Barycentric coordinates in the sub-triangle holding the point:
        // one of b1..b3 is always zero, so a single expression covers all three.
        let minval = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - minval;
        let b2 = b[1] - minval;
        let b3 = b[2] - minval;
        let b4 = 3.0 * minval;

        b1.powi(3) * c3000
            + 3.0 * b1 * b1 * b2 * c2100
            + 3.0 * b1 * b1 * b3 * c2010
            + 3.0 * b1 * b1 * b4 * c2001
            + 3.0 * b1 * b2 * b2 * c1200
            + 6.0 * b1 * b2 * b4 * c1101
            + 3.0 * b1 * b3 * b3 * c1020
            + 6.0 * b1 * b3 * b4 * c1011
            + 3.0 * b1 * b4 * b4 * c1002
            + b2.powi(3) * c0300
            + 3.0 * b2 * b2 * b3 * c0210
            + 3.0 * b2 * b2 * b4 * c0201
            + 3.0 * b2 * b3 * b3 * c0120
            + 6.0 * b2 * b3 * b4 * c0111
            + 3.0 * b2 * b4 * b4 * c0102
            + b3.powi(3) * c0030
            + 3.0 * b3 * b3 * b4 * c0021
            + 3.0 * b3 * b4 * b4 * c0012
            + b4.powi(3) * c0003
    }
}
