//! Planar Delaunay triangulation (Bowyer–Watson) with point location.
//!
//! Built for sample coordinates on an integer lattice. The in-circle
//! predicate is evaluated relative to the query point, which is exact for
//! small integer coordinates, so co-circular grid squares are split
//! consistently and hull points on a shared line never form sliver triangles.
//!
//! The union of the output triangles is the convex hull of the input points.

use std::collections::HashMap;

use crate::error::{DulqError, Result};

/// Barycentric slack when testing whether a point lies in a triangle.
/// Lets lattice points that sit exactly on a hull edge count as inside.
const LOCATE_EPS: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    /// Vertex indices, counter-clockwise.
    triangles: Vec<[usize; 3]>,
    /// `neighbors[t][k]` is the triangle across the edge opposite vertex `k`.
    neighbors: Vec<[Option<usize>; 3]>,
    /// Sorted vertex adjacency lists.
    vertex_neighbors: Vec<Vec<usize>>,
}

#[inline]
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Positive when `d` is strictly inside the circumcircle of ccw triangle `abc`.
#[inline]
fn in_circle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);
    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;
    alift * (bdx * cdy - cdx * bdy) + blift * (cdx * ady - adx * cdy) + clift * (adx * bdy - bdx * ady)
}

/// Reject inputs that cannot span a triangle: fewer than three points,
/// all points coincident, or all points on one line.
fn check_rank(points: &[[f64; 2]]) -> Result<()> {
    if points.len() < 3 {
        return Err(DulqError::DegenerateGeometry(format!(
            "{} points cannot span a triangle",
            points.len()
        )));
    }
    let p0 = points[0];
    let dist2 = |p: [f64; 2]| (p[0] - p0[0]).powi(2) + (p[1] - p0[1]).powi(2);
    let far = points
        .iter()
        .copied()
        .max_by(|a, b| dist2(*a).total_cmp(&dist2(*b)))
        .unwrap_or(p0);
    let span2 = dist2(far);
    if span2 == 0.0 {
        return Err(DulqError::DegenerateGeometry("all points coincide".into()));
    }
    let widest = points
        .iter()
        .map(|&p| orient(p0, far, p).abs())
        .fold(0.0f64, f64::max);
    if widest <= 1e-12 * span2 {
        return Err(DulqError::DegenerateGeometry("all points are collinear".into()));
    }
    Ok(())
}

impl Triangulation {
    /// Triangulate `points`.
    ///
    /// Fails with `DegenerateGeometry` for collinear or repeated points.
    pub fn new(points: &[[f64; 2]]) -> Result<Self> {
        check_rank(points)?;
        let n = points.len();

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p[0]);
            min_y = min_y.min(p[1]);
            max_x = max_x.max(p[0]);
            max_y = max_y.max(p[1]);
        }
        let span = (max_x - min_x).max(max_y - min_y).max(1.0);
        let cx = ((min_x + max_x) / 2.0).floor();
        let cy = ((min_y + max_y) / 2.0).floor();
        // Far enough that super-vertex circles act as half-planes over the
        // sample extent; otherwise hull triangles get eaten by the super triangle.
        let m = (1.0e3 * span.powi(3)).ceil();

        let mut pts = points.to_vec();
        pts.push([cx - m, cy - m]);
        pts.push([cx + m, cy - m]);
        pts.push([cx, cy + m]);

        let mut tris: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];
        for i in 0..n {
            let p = pts[i];
            let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = tris
                .into_iter()
                .partition(|t| in_circle(pts[t[0]], pts[t[1]], pts[t[2]], p) > 0.0);
            if bad.is_empty() {
                return Err(DulqError::DegenerateGeometry(format!(
                    "point ({}, {}) is repeated",
                    p[0], p[1]
                )));
            }

            let mut edge_count: HashMap<(usize, usize), u32> = HashMap::new();
            for t in &bad {
                for k in 0..3 {
                    let (a, b) = (t[k], t[(k + 1) % 3]);
                    *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
                }
            }

            tris = good;
            for t in &bad {
                for k in 0..3 {
                    let (a, b) = (t[k], t[(k + 1) % 3]);
                    if edge_count[&(a.min(b), a.max(b))] == 1 {
                        tris.push([a, b, i]);
                    }
                }
            }
        }

        tris.retain(|t| t.iter().all(|&v| v < n) && orient(pts[t[0]], pts[t[1]], pts[t[2]]) > 0.0);
        pts.truncate(n);

        if tris.is_empty() {
            return Err(DulqError::DegenerateGeometry("no non-degenerate triangles".into()));
        }

        // ── Adjacency ─────────────────────────────────────────────────────────
        let mut edge_owner: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        let mut neighbors = vec![[None; 3]; tris.len()];
        for (ti, t) in tris.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (t[(k + 1) % 3], t[(k + 2) % 3]);
                let key = (a.min(b), a.max(b));
                if let Some((tj, kj)) = edge_owner.remove(&key) {
                    neighbors[ti][k] = Some(tj);
                    neighbors[tj][kj] = Some(ti);
                } else {
                    edge_owner.insert(key, (ti, k));
                }
            }
        }

        let mut vertex_neighbors = vec![Vec::new(); n];
        for t in &tris {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                vertex_neighbors[a].push(b);
                vertex_neighbors[b].push(a);
            }
        }
        for adj in &mut vertex_neighbors {
            adj.sort_unstable();
            adj.dedup();
        }

        tracing::debug!(points = n, triangles = tris.len(), "delaunay triangulation built");

        Ok(Self {
            points: pts,
            triangles: tris,
            neighbors,
            vertex_neighbors,
        })
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn neighbors(&self, tri: usize) -> [Option<usize>; 3] {
        self.neighbors[tri]
    }

    pub fn vertex_neighbors(&self, vertex: usize) -> &[usize] {
        &self.vertex_neighbors[vertex]
    }

    /// Barycentric coordinates of `p` relative to triangle `tri`.
    /// Not clamped: negative entries mean `p` is outside.
    pub fn barycentric(&self, tri: usize, p: [f64; 2]) -> [f64; 3] {
        let [a, b, c] = self.triangles[tri].map(|v| self.points[v]);
        let det = (a[0] - c[0]) * (b[1] - c[1]) - (b[0] - c[0]) * (a[1] - c[1]);
        let l0 = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / det;
        let l1 = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / det;
        [l0, l1, 1.0 - l0 - l1]
    }

    /// Find the triangle containing `p`, walking from `hint`.
    ///
    /// Returns `None` when `p` is outside the convex hull.
    pub fn locate(&self, p: [f64; 2], hint: usize) -> Option<(usize, [f64; 3])> {
        let mut tri = hint.min(self.triangles.len() - 1);
        for _ in 0..self.triangles.len() {
            let bary = self.barycentric(tri, p);
            let (k, &worst) = bary
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))?;
            if worst >= -LOCATE_EPS {
                return Some((tri, bary));
            }
            match self.neighbors[tri][k] {
                Some(next) => tri = next,
                // Beyond a hull edge of a convex triangulation.
                None => return None,
            }
        }
        self.locate_scan(p)
    }

    fn locate_scan(&self, p: [f64; 2]) -> Option<(usize, [f64; 3])> {
        (0..self.triangles.len()).find_map(|t| {
            let bary = self.barycentric(t, p);
            bary.iter().all(|&l| l >= -LOCATE_EPS).then_some((t, bary))
        })
    }
}
