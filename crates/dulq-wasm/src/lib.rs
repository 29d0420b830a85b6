use serde::Serialize;
use wasm_bindgen::prelude::*;

use dulq_core::{interpolate_with, summarize, Grid, HeatmapConfig, SummaryStatistics};

/// Banded lattice handed to the browser for drawing.
#[derive(Debug, Serialize)]
pub struct BandFieldView {
    pub width: usize,
    pub height: usize,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// Row-major band indices; `null` outside the readings.
    pub bands: Vec<Option<usize>>,
    pub colors: Vec<[u8; 3]>,
}

fn parse_grid(grid_json: &str) -> Result<Grid, String> {
    serde_json::from_str(grid_json).map_err(|e| format!("Invalid grid: {e}"))
}

pub fn summary_for(grid_json: &str) -> Result<SummaryStatistics, String> {
    let grid = parse_grid(grid_json)?;
    summarize(&grid).map_err(|e| e.to_string())
}

/// `config_json` may be empty for the default settings.
pub fn band_field_for(grid_json: &str, config_json: &str) -> Result<BandFieldView, String> {
    let grid = parse_grid(grid_json)?;
    let config = if config_json.trim().is_empty() {
        HeatmapConfig::default()
    } else {
        HeatmapConfig::from_json(config_json).map_err(|e| format!("Invalid config: {e}"))?
    };
    let field = interpolate_with(&grid, config.resolution, config.method).map_err(|e| e.to_string())?;
    let bands = config.bands.classify(&field);
    Ok(BandFieldView {
        width: bands.width,
        height: bands.height,
        xs: field.xs,
        ys: field.ys,
        bands: bands.bands,
        colors: config.bands.colors().to_vec(),
    })
}

/// Summary statistics for a grid JSON (`{"rows","cols","cells"}`).
#[wasm_bindgen]
pub fn get_summary(grid_json: &str) -> Result<JsValue, JsValue> {
    let summary = summary_for(grid_json).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Interpolated, banded lattice for a grid JSON and optional config JSON.
#[wasm_bindgen]
pub fn get_band_field(grid_json: &str, config_json: &str) -> Result<JsValue, JsValue> {
    let view = band_field_for(grid_json, config_json).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&view).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"{"rows":2,"cols":2,"cells":[5.0,10.0,15.0,20.0]}"#;

    #[test]
    fn summary_round_trips_through_json() {
        let s = summary_for(GRID).unwrap();
        assert_eq!(s.count, 4);
        assert!((s.uniformity - 40.0).abs() < 1e-9);
    }

    #[test]
    fn band_field_uses_config_resolution() {
        let view = band_field_for(GRID, r#"{"resolution":{"x":11,"y":6}}"#).unwrap();
        assert_eq!((view.width, view.height), (11, 6));
        assert_eq!(view.bands.len(), 66);
        assert_eq!(view.colors.len(), 4);
        // Far corner (2, 2) is outside the readings.
        assert_eq!(view.bands[65], None);
    }

    #[test]
    fn errors_become_messages() {
        let err = summary_for(r#"{"rows":1,"cols":1,"cells":[null]}"#).unwrap_err();
        assert!(err.contains("no readings"), "{err}");
        let err = band_field_for(r#"{"rows":1,"cols":3,"cells":[1,2,3]}"#, "").unwrap_err();
        assert!(err.contains("at least 4"), "{err}");
        assert!(summary_for("not json").unwrap_err().starts_with("Invalid grid"));
    }
}
