//! Discrete moisture bands.
//!
//! A band scale is a strictly increasing list of boundaries plus one colour
//! per interval. Band `i` covers `[b[i], b[i+1])`; values below the first
//! boundary fall in band 0 and values at or above the last fall in the last
//! band, so every defined value gets a band.

use serde::{Deserialize, Serialize};

use crate::error::{DulqError, Result};
use crate::field::ScalarField;

/// Volumetric water content boundaries, percent.
pub const MOISTURE_BOUNDARIES: [f64; 5] = [0.0, 9.0, 16.0, 20.0, 25.0];

/// yellow, limegreen, green, darkgreen.
pub const MOISTURE_COLORS: [[u8; 3]; 4] = [[255, 255, 0], [50, 205, 50], [0, 128, 0], [0, 100, 0]];

/// Band indices on the lattice of the field they were classified from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandField {
    /// Row-major; `None` where the source field was undefined.
    pub bands: Vec<Option<usize>>,
    pub width: usize,
    pub height: usize,
}

impl BandField {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.bands[row * self.width + col]
    }

    /// Lattice points per band.
    pub fn histogram(&self, band_count: usize) -> Vec<usize> {
        let mut counts = vec![0usize; band_count];
        for b in self.bands.iter().flatten() {
            if let Some(c) = counts.get_mut(*b) {
                *c += 1;
            }
        }
        counts
    }
}

/// Check that `boundaries` describe at least one band and strictly increase.
pub fn validate_boundaries(boundaries: &[f64]) -> Result<()> {
    if boundaries.len() < 2 {
        return Err(DulqError::InvalidConfig(format!(
            "need at least 2 band boundaries, got {}",
            boundaries.len()
        )));
    }
    if let Some(bad) = boundaries.iter().find(|b| !b.is_finite()) {
        return Err(DulqError::InvalidConfig(format!("band boundary {bad} is not finite")));
    }
    if let Some(w) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
        return Err(DulqError::InvalidConfig(format!(
            "band boundaries must be strictly increasing ({} >= {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

/// Band of `value` against already-validated `boundaries`.
#[inline]
fn band_of(boundaries: &[f64], value: f64) -> Option<usize> {
    if value.is_nan() {
        return None;
    }
    let last_band = boundaries.len() - 2;
    let above = boundaries.partition_point(|&b| b <= value);
    Some(above.saturating_sub(1).min(last_band))
}

/// Classify every lattice point of `field` into a band.
pub fn classify(field: &ScalarField, boundaries: &[f64]) -> Result<BandField> {
    validate_boundaries(boundaries)?;
    Ok(BandField {
        bands: field.data.iter().map(|&v| band_of(boundaries, v)).collect(),
        width: field.width,
        height: field.height,
    })
}

/// Boundaries together with a colour per band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandScaleRepr", into = "BandScaleRepr")]
pub struct BandScale {
    boundaries: Vec<f64>,
    colors: Vec<[u8; 3]>,
}

#[derive(Serialize, Deserialize)]
struct BandScaleRepr {
    boundaries: Vec<f64>,
    colors: Vec<[u8; 3]>,
}

impl BandScale {
    pub fn new(boundaries: Vec<f64>, colors: Vec<[u8; 3]>) -> Result<Self> {
        validate_boundaries(&boundaries)?;
        if colors.len() != boundaries.len() - 1 {
            return Err(DulqError::InvalidConfig(format!(
                "{} boundaries describe {} bands but {} colours were given",
                boundaries.len(),
                boundaries.len() - 1,
                colors.len()
            )));
        }
        Ok(Self { boundaries, colors })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn band_count(&self) -> usize {
        self.colors.len()
    }

    pub fn classify_value(&self, value: f64) -> Option<usize> {
        band_of(&self.boundaries, value)
    }

    pub fn classify(&self, field: &ScalarField) -> BandField {
        BandField {
            bands: field.data.iter().map(|&v| self.classify_value(v)).collect(),
            width: field.width,
            height: field.height,
        }
    }

    pub fn color_of(&self, band: usize) -> Option<[u8; 3]> {
        self.colors.get(band).copied()
    }

    /// Colour for a raw value, `None` if the value is undefined.
    pub fn color_for_value(&self, value: f64) -> Option<[u8; 3]> {
        self.classify_value(value).and_then(|b| self.color_of(b))
    }
}

impl Default for BandScale {
    fn default() -> Self {
        Self {
            boundaries: MOISTURE_BOUNDARIES.to_vec(),
            colors: MOISTURE_COLORS.to_vec(),
        }
    }
}

impl TryFrom<BandScaleRepr> for BandScale {
    type Error = DulqError;

    fn try_from(repr: BandScaleRepr) -> Result<Self> {
        BandScale::new(repr.boundaries, repr.colors)
    }
}

impl From<BandScale> for BandScaleRepr {
    fn from(scale: BandScale) -> Self {
        Self {
            boundaries: scale.boundaries,
            colors: scale.colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::linspace;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn row_field(values: &[f64]) -> ScalarField {
        let mut f = ScalarField::undefined(linspace(0.0, 1.0, values.len()), vec![0.0]);
        f.data = values.to_vec();
        f
    }

    #[test]
    fn moisture_bands_clamp_at_both_ends() {
        let field = row_field(&[0.0, 8.9, 9.0, 20.0, 25.0, 30.0]);
        let bands = classify(&field, &MOISTURE_BOUNDARIES).unwrap();
        assert_eq!(
            bands.bands,
            vec![Some(0), Some(0), Some(1), Some(3), Some(3), Some(3)]
        );
    }

    #[test]
    fn below_first_boundary_is_band_zero_and_nan_is_unset() {
        let field = row_field(&[-4.0, f64::NAN, 16.0, 19.99]);
        let bands = classify(&field, &MOISTURE_BOUNDARIES).unwrap();
        assert_eq!(bands.bands, vec![Some(0), None, Some(2), Some(2)]);
        assert_eq!(bands.histogram(4), vec![1, 0, 2, 0]);
    }

    #[test]
    fn classification_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(11);
        let scale = BandScale::default();
        for _ in 0..1000 {
            let a: f64 = rng.gen_range(-10.0..40.0);
            let b: f64 = rng.gen_range(-10.0..40.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            assert!(scale.classify_value(lo) <= scale.classify_value(hi), "{lo} vs {hi}");
        }
    }

    #[test]
    fn bad_boundaries_are_rejected() {
        let field = row_field(&[1.0]);
        for bad in [vec![], vec![1.0], vec![0.0, 9.0, 9.0], vec![0.0, 5.0, 2.0], vec![0.0, f64::NAN]] {
            assert!(matches!(classify(&field, &bad), Err(DulqError::InvalidConfig(_))), "{bad:?}");
        }
    }

    #[test]
    fn scale_requires_one_colour_per_band() {
        assert!(BandScale::new(vec![0.0, 1.0, 2.0], vec![[0, 0, 0]]).is_err());
        let scale = BandScale::new(vec![0.0, 1.0, 2.0], vec![[0, 0, 0], [9, 9, 9]]).unwrap();
        assert_eq!(scale.color_for_value(1.5), Some([9, 9, 9]));
        assert_eq!(scale.color_for_value(f64::NAN), None);
    }

    #[test]
    fn scale_deserialises_with_validation() {
        let ok: BandScale =
            serde_json::from_str(r#"{"boundaries":[0,10,20],"colors":[[1,2,3],[4,5,6]]}"#).unwrap();
        assert_eq!(ok.band_count(), 2);
        let bad = serde_json::from_str::<BandScale>(r#"{"boundaries":[10,0],"colors":[[1,2,3]]}"#);
        assert!(bad.is_err());
    }
}
