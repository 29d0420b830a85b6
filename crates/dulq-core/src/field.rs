use serde::{Deserialize, Serialize};

/// A dense scalar field on a regular evaluation lattice, row-major.
/// `NaN` marks lattice points with no defined value (outside the sample hull).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarField {
    /// Row-major values; row `j` holds the points at `ys[j]`.
    pub data: Vec<f64>,
    pub width: usize,
    pub height: usize,
    /// Lattice x-coordinates, ascending, evenly spaced.
    pub xs: Vec<f64>,
    /// Lattice y-coordinates, ascending, evenly spaced.
    pub ys: Vec<f64>,
}

/// `num` evenly spaced values over `[start, stop]`, both endpoints included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            out[num - 1] = stop;
            out
        }
    }
}

impl ScalarField {
    /// Create a field over `xs × ys` filled with `NaN`.
    pub fn undefined(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        let (width, height) = (xs.len(), ys.len());
        Self {
            data: vec![f64::NAN; width * height],
            width,
            height,
            xs,
            ys,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.data[row * self.width + col] = val;
    }

    /// Sample the field at `(x, y)` using bilinear interpolation.
    ///
    /// Returns `NaN` outside the lattice, or when any of the four surrounding
    /// lattice values is undefined.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        if self.width < 2 || self.height < 2 {
            return f64::NAN;
        }
        let (min_x, max_x) = (self.xs[0], self.xs[self.width - 1]);
        let (min_y, max_y) = (self.ys[0], self.ys[self.height - 1]);
        if !(min_x..=max_x).contains(&x) || !(min_y..=max_y).contains(&y) {
            return f64::NAN;
        }

        let fx = (x - min_x) / (max_x - min_x) * (self.width - 1) as f64;
        let fy = (y - min_y) / (max_y - min_y) * (self.height - 1) as f64;

        let x0 = (fx.floor() as usize).min(self.width - 1);
        let y0 = (fy.floor() as usize).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;

        let v00 = self.get(y0, x0);
        let v10 = self.get(y0, x1);
        let v01 = self.get(y1, x0);
        let v11 = self.get(y1, x1);

        v00 * (1.0 - tx) * (1.0 - ty) + v10 * tx * (1.0 - ty) + v01 * (1.0 - tx) * ty + v11 * tx * ty
    }

    /// Number of lattice points with a defined value.
    pub fn defined_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Smallest and largest defined values, or `None` if nothing is defined.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
