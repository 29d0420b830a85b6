//! Moisture survey grids: scattered-reading interpolation, band
//! classification and lowest-quarter distribution uniformity.
//!
//! ```
//! use dulq_core::{classify, interpolate, summarize, Grid, Resolution, MOISTURE_BOUNDARIES};
//!
//! let mut grid = Grid::new(4, 4)?;
//! grid.set(0, 0, 12.0)?;
//! grid.set(0, 3, 8.5)?;
//! grid.set(3, 0, 17.0)?;
//! grid.set(3, 3, 21.0)?;
//!
//! let field = interpolate(&grid, Resolution::default())?;
//! let bands = classify(&field, &MOISTURE_BOUNDARIES)?;
//! let summary = summarize(&grid)?;
//! assert_eq!(bands.width, 100);
//! assert_eq!(summary.count, 4);
//! # Ok::<(), dulq_core::DulqError>(())
//! ```
pub mod bands;
pub mod config;
pub mod delaunay;
pub mod error;
pub mod field;
pub mod grid;
pub mod interpolate;
pub mod stats;

pub use bands::{classify, BandField, BandScale, MOISTURE_BOUNDARIES, MOISTURE_COLORS};
pub use config::{Canvas, HeatmapConfig};
pub use error::{DulqError, Result};
pub use field::ScalarField;
pub use grid::{Grid, SamplePoint};
pub use interpolate::{interpolate, interpolate_with, Method, Resolution};
pub use stats::{percentile, summarize, SummaryStatistics};
