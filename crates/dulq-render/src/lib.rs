//! PNG rendering for moisture heatmaps.
//!
//! The interpolated field is drawn over the survey photo using the photo's
//! own pixel grid: the field's lattice extent `[0, cols] × [0, rows]` is
//! stretched over the whole image, with y growing downward like the rows.

use std::io::Cursor;
use std::path::Path;

use dulq_core::{BandScale, Canvas, DulqError, ScalarField};
use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Core(#[from] DulqError),
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, Copy)]
pub struct OverlayOptions {
    /// Band colour opacity over the background, 0-1.
    pub alpha: f32,
    /// Size of the white canvas used when there is no background.
    pub canvas: Canvas,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            canvas: Canvas::default(),
        }
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn blend(top: [u8; 3], bottom: [u8; 3], alpha: f32) -> [u8; 3] {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |t: u8, b: u8| (t as f32 * a + b as f32 * (1.0 - a)).round() as u8;
    [mix(top[0], bottom[0]), mix(top[1], bottom[1]), mix(top[2], bottom[2])]
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Paint the banded `field` over `background` (or a white canvas).
///
/// Pixels whose field value is undefined keep the background colour.
pub fn render_heatmap(
    field: &ScalarField,
    scale: &BandScale,
    background: Option<&RgbImage>,
    options: &OverlayOptions,
) -> RgbImage {
    let mut img = match background {
        Some(bg) => bg.clone(),
        None => RgbImage::from_pixel(options.canvas.width, options.canvas.height, Rgb([255, 255, 255])),
    };
    let (w, h) = img.dimensions();
    if field.width == 0 || field.height == 0 {
        return img;
    }
    let (x0, x1) = (field.xs[0], field.xs[field.width - 1]);
    let (y0, y1) = (field.ys[0], field.ys[field.height - 1]);

    let mut painted = 0usize;
    for py in 0..h {
        let y = y0 + (py as f64 + 0.5) / h as f64 * (y1 - y0);
        for px in 0..w {
            let x = x0 + (px as f64 + 0.5) / w as f64 * (x1 - x0);
            if let Some(color) = scale.color_for_value(field.sample(x, y)) {
                let pixel = img.get_pixel_mut(px, py);
                pixel.0 = blend(color, pixel.0, options.alpha);
                painted += 1;
            }
        }
    }
    tracing::debug!(width = w, height = h, painted, "rendered heatmap");
    img
}

/// Draw the interior lines of a `rows × cols` survey grid.
pub fn draw_grid(img: &mut RgbImage, rows: usize, cols: usize, color: [u8; 3]) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(DulqError::InvalidConfig(format!("cannot draw a {rows}×{cols} grid")).into());
    }
    let (w, h) = img.dimensions();
    for i in 1..cols as u32 {
        let x = (i as u64 * w as u64 / cols as u64) as u32;
        if x < w {
            for y in 0..h {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
    for j in 1..rows as u32 {
        let y = (j as u64 * h as u64 / rows as u64) as u32;
        if y < h {
            for x in 0..w {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
    Ok(())
}

/// Paint the band colours as a vertical bar at the right edge, lowest band
/// at the bottom.
pub fn draw_legend(img: &mut RgbImage, scale: &BandScale) {
    let (w, h) = img.dimensions();
    let bands = scale.band_count() as u32;
    let bar_w = (w / 40).max(4).min(w);
    let bar_h = (h / 3).max(bands).min(h);
    if bands == 0 || bar_h == 0 {
        return;
    }
    let top = (h / 10).min(h - bar_h);
    let left = w - bar_w - (w / 80).min(w - bar_w);

    for dy in 0..bar_h {
        // Row 0 of the bar is the top (highest band).
        let band = ((bar_h - 1 - dy) * bands / bar_h) as usize;
        let Some(color) = scale.color_of(band) else { continue };
        for dx in 0..bar_w {
            img.put_pixel(left + dx, top + dy, Rgb(color));
        }
    }
}

/// Load a background photo as RGB.
pub fn load_background(path: impl AsRef<Path>) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Encode `img` as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
