// ============================================================================
// COMPOSITOR — mask-driven blending of two source rasters
// ============================================================================
//
// White mask areas (255) show source1, black areas (0) show source2, gray
// values blend proportionally. Only the mask's R channel is consulted.
// Also hosts the upload path that turns an arbitrary image into a mask
// (grayscale → threshold → optional invert).
// ============================================================================

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::log_info;
use crate::raster::Raster;

/// Options for one composite invocation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct CompositeOptions {
    #[serde(default)]
    pub invert_mask: bool,
}

/// Failure modes of the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    /// The two sources and the mask must all share identical dimensions.
    DimensionMismatch {
        source1: (u32, u32),
        source2: (u32, u32),
        mask: (u32, u32),
    },
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeError::DimensionMismatch { source1, source2, mask } => write!(
                f,
                "source images and mask must have the same dimensions \
                 (source1: {}x{}, source2: {}x{}, mask: {}x{})",
                source1.0, source1.1, source2.0, source2.1, mask.0, mask.1
            ),
        }
    }
}

impl std::error::Error for CompositeError {}

/// Composite two sources through a mask via per-pixel linear interpolation.
///
/// Returns a new raster; inputs are never modified. The output is always
/// fully opaque regardless of source alpha. Mismatched dimensions between any
/// of the three inputs fail outright — nothing is cropped or coerced.
pub fn composite_images(
    source1: &Raster,
    source2: &Raster,
    mask: &Raster,
    options: &CompositeOptions,
) -> Result<Raster, CompositeError> {
    log_info!(
        "[compositor] Compositing {}x{} images, invert_mask: {}",
        source1.width(), source1.height(), options.invert_mask
    );

    if !source1.same_dimensions(source2) || !source1.same_dimensions(mask) {
        return Err(CompositeError::DimensionMismatch {
            source1: source1.dimensions(),
            source2: source2.dimensions(),
            mask: mask.dimensions(),
        });
    }

    let (w, h) = source1.dimensions();
    let mut result = Raster::new(w, h);
    if w == 0 || h == 0 {
        return Ok(result);
    }

    let data1 = source1.as_raw();
    let data2 = source2.as_raw();
    let mask_data = mask.as_raw();
    let stride = w as usize * 4;
    let invert = options.invert_mask;

    result
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let base = y * stride;
            for x in 0..w as usize {
                let i = base + x * 4;
                let pi = x * 4;

                // Blend weight from the mask's R channel, normalized to 0-1
                let mut mask_value = mask_data[i] as f64 / 255.0;
                if invert {
                    mask_value = 1.0 - mask_value;
                }

                for c in 0..3 {
                    let blended = data1[i + c] as f64 * mask_value
                        + data2[i + c] as f64 * (1.0 - mask_value);
                    row_out[pi + c] = blended.round().clamp(0.0, 255.0) as u8;
                }
                row_out[pi + 3] = 255; // Full opacity
            }
        });

    Ok(result)
}

/// Convert an uploaded image into a binary mask: luma grayscale, then
/// threshold (value > threshold → 255, else 0). Alpha is normalized to 255.
pub fn mask_from_image(image: &Raster, threshold: u8) -> Raster {
    let (w, h) = image.dimensions();
    let mut result = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let [r, g, b, _] = image.get_pixel(x, y);
            let gray = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            let bw = if gray > threshold as f64 { 255 } else { 0 };
            result.put_pixel(x, y, [bw, bw, bw, 255]);
        }
    }
    result
}

/// Invert a mask's color channels (255 - value on R, G, B). Alpha untouched.
pub fn invert_mask(mask: &Raster) -> Raster {
    let mut result = mask.clone();
    for px in result.as_raw_mut().chunks_exact_mut(4) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
    result
}
