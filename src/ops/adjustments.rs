// ============================================================================
// COLOR ADJUSTMENTS — per-source brightness / contrast / saturation
// ============================================================================
//
// Applied independently to each source image before compositing. The order is
// fixed — brightness, then contrast, then saturation — the stages do not
// commute. Alpha is carried through unchanged.
// Parallelized via rayon for multi-core performance.
// ============================================================================

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// Per-source adjustment values.
///
/// `rotation` is carried through configuration and worker messages for front
/// ends that rotate at the canvas-transform level; the pixel adjuster itself
/// never applies it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustments {
    /// -100 to 100 (additive offset)
    #[serde(default)]
    pub brightness: f64,
    /// -100 to 100 (multiplier around the midpoint)
    #[serde(default)]
    pub contrast: f64,
    /// -100 to 100 (luma-preserving scale)
    #[serde(default)]
    pub saturation: f64,
    /// Degrees. Carried as data only — see above.
    #[serde(default)]
    pub rotation: f64,
}

impl Adjustments {
    /// True when every pixel-affecting value is at its neutral setting.
    pub fn is_neutral(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.saturation == 0.0
    }
}

/// Apply brightness → contrast → saturation to a source raster, returning a
/// new raster. The input is never modified.
pub fn apply_adjustments(source: &Raster, adjustments: &Adjustments) -> Raster {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return source.clone();
    }

    // Normalize once, outside the pixel loop
    let brightness_amount = adjustments.brightness / 100.0; // -1 to 1
    let contrast_factor = (adjustments.contrast + 100.0) / 100.0; // 0 to 2
    let saturation_factor = 1.0 + adjustments.saturation / 100.0; // 0 to 2

    let src_raw = source.as_raw();
    let stride = w as usize * 4;

    let mut result = Raster::new(w, h);
    result
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for x in 0..w as usize {
                let pi = x * 4;
                let mut r = row_in[pi] as f64;
                let mut g = row_in[pi + 1] as f64;
                let mut b = row_in[pi + 2] as f64;

                // Brightness
                r += brightness_amount * 255.0;
                g += brightness_amount * 255.0;
                b += brightness_amount * 255.0;

                // Contrast
                r = ((r / 255.0 - 0.5) * contrast_factor + 0.5) * 255.0;
                g = ((g / 255.0 - 0.5) * contrast_factor + 0.5) * 255.0;
                b = ((b / 255.0 - 0.5) * contrast_factor + 0.5) * 255.0;

                // Saturation, around the post-contrast luma
                let luma = 0.299 * r + 0.587 * g + 0.114 * b;
                r = luma + (r - luma) * saturation_factor;
                g = luma + (g - luma) * saturation_factor;
                b = luma + (b - luma) * saturation_factor;

                row_out[pi] = r.round().clamp(0.0, 255.0) as u8;
                row_out[pi + 1] = g.round().clamp(0.0, 255.0) as u8;
                row_out[pi + 2] = b.round().clamp(0.0, 255.0) as u8;
                row_out[pi + 3] = row_in[pi + 3];
            }
        });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_adjustments_are_identity() {
        let src = Raster::filled(8, 8, [12, 200, 77, 180]);
        let out = apply_adjustments(&src, &Adjustments::default());
        assert_eq!(out, src);
    }

    #[test]
    fn rotation_does_not_touch_pixels() {
        let src = Raster::filled(4, 4, [10, 20, 30, 255]);
        let adj = Adjustments { rotation: 90.0, ..Default::default() };
        assert_eq!(apply_adjustments(&src, &adj), src);
    }

    #[test]
    fn brightness_shifts_channels() {
        let src = Raster::filled(2, 2, [100, 100, 100, 255]);
        let adj = Adjustments { brightness: 20.0, ..Default::default() };
        // +20% of 255 = +51
        assert_eq!(apply_adjustments(&src, &adj).get_pixel(0, 0), [151, 151, 151, 255]);
    }

    #[test]
    fn brightness_clamps_at_extremes() {
        let src = Raster::filled(2, 2, [200, 200, 200, 255]);
        let up = Adjustments { brightness: 100.0, ..Default::default() };
        assert_eq!(apply_adjustments(&src, &up).get_pixel(0, 0), [255, 255, 255, 255]);
        let down = Adjustments { brightness: -100.0, ..Default::default() };
        assert_eq!(apply_adjustments(&src, &down).get_pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn contrast_expands_around_midpoint() {
        let src = Raster::filled(2, 2, [64, 128, 192, 255]);
        let adj = Adjustments { contrast: 100.0, ..Default::default() };
        let out = apply_adjustments(&src, &adj).get_pixel(0, 0);
        // factor 2: 64 → 0 (rounded from -0.5 offset math), 128 → 128ish, 192 → 255
        assert!(out[0] < 64);
        assert!((out[1] as i32 - 128).abs() <= 1);
        assert!(out[2] > 192);
    }

    #[test]
    fn full_desaturation_converges_to_luma() {
        let src = Raster::filled(2, 2, [255, 0, 0, 255]);
        let adj = Adjustments { saturation: -100.0, ..Default::default() };
        let out = apply_adjustments(&src, &adj).get_pixel(0, 0);
        // luma of pure red = 0.299 * 255 ≈ 76
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert!((out[0] as i32 - 76).abs() <= 1);
    }

    #[test]
    fn alpha_is_preserved() {
        let src = Raster::filled(2, 2, [50, 60, 70, 42]);
        let adj = Adjustments {
            brightness: 30.0,
            contrast: -40.0,
            saturation: 55.0,
            rotation: 0.0,
        };
        assert_eq!(apply_adjustments(&src, &adj).get_pixel(1, 1)[3], 42);
    }

    #[test]
    fn input_is_left_untouched() {
        let src = Raster::filled(3, 3, [9, 9, 9, 9]);
        let copy = src.clone();
        let _ = apply_adjustments(&src, &Adjustments { brightness: 50.0, ..Default::default() });
        assert_eq!(src, copy);
    }
}
