//! Sparse survey grid: one optional moisture reading (percent) per cell.
//!
//! Cell `(row, col)` sits at sample coordinate `(x = col, y = row)`.
//! Unset cells are `None`; a reading of zero is a real reading.

use serde::{Deserialize, Serialize};

use crate::error::{DulqError, Result};

/// A rows × cols grid of optional readings, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f64>>,
}

/// Wire form of a [`Grid`]; validated on the way in.
#[derive(Serialize, Deserialize)]
struct GridRepr {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f64>>,
}

/// `rows * cols`, rejecting empty and overflowing shapes.
fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(DulqError::InvalidConfig(format!(
            "grid dimensions must be at least 1×1, got {rows}×{cols}"
        )));
    }
    rows.checked_mul(cols)
        .ok_or_else(|| DulqError::InvalidConfig(format!("grid of {rows}×{cols} cells is too large")))
}

/// A set cell lifted into sample space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Grid {
    /// Create a grid with every cell unset.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let len = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![None; len],
        })
    }

    /// Build a grid from a sparse `(row, col) → value` mapping.
    pub fn from_readings<I>(rows: usize, cols: usize, readings: I) -> Result<Self>
    where
        I: IntoIterator<Item = ((usize, usize), f64)>,
    {
        let mut grid = Self::new(rows, cols)?;
        for ((row, col), value) in readings {
            grid.set(row, col, value)?;
        }
        Ok(grid)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(DulqError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Option<f64>> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let idx = self.index(row, col)?;
        if !value.is_finite() || value < 0.0 {
            return Err(DulqError::InvalidReading { row, col, value });
        }
        self.cells[idx] = Some(value);
        Ok(())
    }

    /// Unset a cell. Clearing an already-unset cell is a no-op.
    pub fn clear(&mut self, row: usize, col: usize) -> Result<()> {
        let idx = self.index(row, col)?;
        self.cells[idx] = None;
        Ok(())
    }

    /// Number of cells holding a reading.
    pub fn reading_count(&self) -> usize {
        self.cells.iter().filter(|v| v.is_some()).count()
    }

    /// All readings in row-major order.
    pub fn values(&self) -> Vec<f64> {
        self.cells.iter().filter_map(|v| *v).collect()
    }

    /// Set cells as scattered samples, row-major.
    pub fn samples(&self) -> Vec<SamplePoint> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                v.map(|value| SamplePoint {
                    x: (i % self.cols) as f64,
                    y: (i / self.cols) as f64,
                    value,
                })
            })
            .collect()
    }
}

impl TryFrom<GridRepr> for Grid {
    type Error = DulqError;

    fn try_from(repr: GridRepr) -> Result<Self> {
        // Shape is checked against the cells actually sent before allocating.
        let expected = cell_count(repr.rows, repr.cols)?;
        if repr.cells.len() != expected {
            return Err(DulqError::InvalidConfig(format!(
                "grid of {}×{} needs {expected} cells, got {}",
                repr.rows,
                repr.cols,
                repr.cells.len()
            )));
        }
        for (i, cell) in repr.cells.iter().enumerate() {
            if let Some(value) = *cell {
                if !value.is_finite() || value < 0.0 {
                    return Err(DulqError::InvalidReading {
                        row: i / repr.cols,
                        col: i % repr.cols,
                        value,
                    });
                }
            }
        }
        Ok(Grid {
            rows: repr.rows,
            cols: repr.cols,
            cells: repr.cells,
        })
    }
}

impl From<Grid> for GridRepr {
    fn from(grid: Grid) -> Self {
        Self {
            rows: grid.rows,
            cols: grid.cols,
            cells: grid.cells,
        }
    }
}
