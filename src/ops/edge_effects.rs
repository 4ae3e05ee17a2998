// ============================================================================
// EDGE EFFECTS — artistic transforms applied to mask rasters
// ============================================================================
//
// Every effect consumes a mask raster and produces a new one of identical
// dimensions. Outputs are always gray (R = G = B) with alpha forced to 255.
// Effect strength is a single intensity value in [0, 100] that maps onto the
// concrete transform parameters (blur radius, wave amplitude, …).
//
// Math is f64 throughout so the torn-paper noise hash stays reproducible
// across platforms.
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::log_info;
use crate::raster::Raster;

/// The available edge-effect kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeEffectType {
    #[default]
    None,
    SoftFeather,
    ShadowFeather,
    Wavy,
    TornPaper,
    GradientBlend,
}

impl EdgeEffectType {
    pub const ALL: [EdgeEffectType; 6] = [
        EdgeEffectType::None,
        EdgeEffectType::SoftFeather,
        EdgeEffectType::ShadowFeather,
        EdgeEffectType::Wavy,
        EdgeEffectType::TornPaper,
        EdgeEffectType::GradientBlend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeEffectType::None => "none",
            EdgeEffectType::SoftFeather => "soft-feather",
            EdgeEffectType::ShadowFeather => "shadow-feather",
            EdgeEffectType::Wavy => "wavy",
            EdgeEffectType::TornPaper => "torn-paper",
            EdgeEffectType::GradientBlend => "gradient-blend",
        }
    }
}

impl fmt::Display for EdgeEffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeEffectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgeEffectType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown edge effect '{}'", s))
    }
}

/// Options for one edge-effect invocation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EdgeEffectOptions {
    #[serde(rename = "type")]
    pub effect: EdgeEffectType,
    /// Effect strength, 0–100.
    pub intensity: f64,
    /// Reserved per-effect parameter overrides.
    #[serde(default)]
    pub params: HashMap<String, f64>,
}

impl EdgeEffectOptions {
    pub fn new(effect: EdgeEffectType, intensity: f64) -> Self {
        Self { effect, intensity, params: HashMap::new() }
    }
}

/// Apply an edge effect to a mask, producing a new raster of the same
/// dimensions. `None` hands the input back untouched with no new allocation.
pub fn apply_edge_effect(mask: Raster, options: &EdgeEffectOptions) -> Raster {
    log_info!(
        "[edge-effects] Applying {} effect, intensity: {}",
        options.effect, options.intensity
    );

    let intensity = options.intensity;
    match options.effect {
        EdgeEffectType::None => mask,
        EdgeEffectType::SoftFeather => apply_soft_feather(&mask, intensity),
        EdgeEffectType::ShadowFeather => apply_shadow_feather(&mask, intensity),
        EdgeEffectType::Wavy => apply_wavy(&mask, intensity),
        EdgeEffectType::TornPaper => apply_torn_paper(&mask, intensity),
        EdgeEffectType::GradientBlend => apply_gradient_blend(&mask, intensity),
    }
}

/// Soft-feather: box-blur approximation of a Gaussian blur on the mask.
fn apply_soft_feather(mask: &Raster, intensity: f64) -> Raster {
    let radius = ((intensity / 100.0 * 20.0).round() as i64).max(1); // 1-20px blur
    log_info!("[edge-effects] Soft-feather blur radius: {}px", radius);
    box_blur(mask, radius)
}

/// Shadow-feather: offset drop shadow composited under the mask, then blurred.
fn apply_shadow_feather(mask: &Raster, intensity: f64) -> Raster {
    let offset = (intensity / 100.0 * 10.0).round() as i64; // 0-10px offset
    let blur_radius = (intensity / 100.0 * 8.0).round() as i64; // 0-8px blur
    log_info!(
        "[edge-effects] Shadow-feather offset: {}px, blur: {}px",
        offset, blur_radius
    );

    let (w, h) = mask.dimensions();
    let mut result = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            // Sample the shadow from the offset position, clamped to bounds
            let sx = ((x as i64 + offset).max(0) as u32).min(w - 1);
            let sy = ((y as i64 + offset).max(0) as u32).min(h - 1);

            let original = mask.get_pixel(x, y)[0] as f64;
            let shadow = mask.get_pixel(sx, sy)[0] as f64 * 0.5; // darkened

            // Composite original over shadow, using the mask's own value as alpha
            let mask_alpha = original / 255.0;
            let value = (shadow * (1.0 - mask_alpha) + original * mask_alpha).round() as u8;
            result.put_pixel(x, y, [value, value, value, 255]);
        }
    }

    if blur_radius > 0 { box_blur(&result, blur_radius) } else { result }
}

/// Wavy: sinusoidal pull distortion — each destination pixel reads from a
/// displaced source coordinate.
fn apply_wavy(mask: &Raster, intensity: f64) -> Raster {
    let amplitude = (intensity / 100.0 * 15.0).round(); // 0-15px wave height
    let frequency = 0.05 + intensity / 100.0 * 0.1;
    log_info!(
        "[edge-effects] Wavy amplitude: {}px, frequency: {}",
        amplitude, frequency
    );

    let (w, h) = mask.dimensions();
    let mut result = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let wave_x = (x as f64 + (y as f64 * frequency).sin() * amplitude).round() as i64;
            let wave_y = (y as f64 + (x as f64 * frequency).sin() * amplitude).round() as i64;

            let sx = (wave_x.max(0) as u32).min(w - 1);
            let sy = (wave_y.max(0) as u32).min(h - 1);

            let value = mask.get_pixel(sx, sy)[0];
            result.put_pixel(x, y, [value, value, value, 255]);
        }
    }
    result
}

/// Torn-paper: jagged edges from deterministic per-pixel noise. The hash is
/// seed-free on purpose — the same coordinates always produce the same
/// displacement.
fn apply_torn_paper(mask: &Raster, intensity: f64) -> Raster {
    let roughness = (intensity / 100.0 * 20.0).round(); // 0-20px roughness
    log_info!("[edge-effects] Torn-paper roughness: {}px", roughness);

    let (w, h) = mask.dimensions();
    let mut result = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let noise = ((x as f64 * 12.9898 + y as f64 * 78.233).sin() * 43758.5453) % 1.0;
            let displacement = ((noise - 0.5) * roughness * 2.0).round() as i64;

            let sx = ((x as i64 + displacement).max(0) as u32).min(w - 1);
            let sy = ((y as i64 + displacement).max(0) as u32).min(h - 1);

            let value = mask.get_pixel(sx, sy)[0];
            result.put_pixel(x, y, [value, value, value, 255]);
        }
    }
    result
}

/// Gradient-blend: pixels far from any black/white edge snap fully toward 0
/// or 255; pixels near an edge keep more of their original value, producing a
/// smooth transition band.
///
/// This searches a (2×featherWidth+1)² neighborhood per pixel and is by far
/// the most expensive operation in the pipeline, so rows run in parallel.
fn apply_gradient_blend(mask: &Raster, intensity: f64) -> Raster {
    let feather_width = ((intensity / 100.0 * 50.0).round() as i64).max(1); // 1-50px feather
    log_info!("[edge-effects] Gradient-blend feather width: {}px", feather_width);

    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return mask.clone();
    }
    let src = mask.as_raw();
    let stride = w as usize * 4;

    let mut result = Raster::new(w, h);
    result
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let y = y as i64;
            for x in 0..w as i64 {
                let i = (y * w as i64 + x) as usize * 4;
                let value = src[i] as f64;

                // Minimum distance to an opposing-side neighbor, capped at the
                // feather width. Adjacent neighbors are at distance 1, so stop
                // searching once that bound is reached.
                let mut min_dist = feather_width as f64;
                'search: for dy in -feather_width..=feather_width {
                    for dx in -feather_width..=feather_width {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx < 0 || nx >= w as i64 || ny < 0 || ny >= h as i64 {
                            continue;
                        }
                        let ni = (ny * w as i64 + nx) as usize * 4;
                        let n_value = src[ni] as f64;
                        if (value - n_value).abs() > 128.0 {
                            let dist = ((dx * dx + dy * dy) as f64).sqrt();
                            if dist < min_dist {
                                min_dist = dist;
                                if min_dist <= 1.0 {
                                    break 'search;
                                }
                            }
                        }
                    }
                }

                let gradient_factor = (min_dist / feather_width as f64).min(1.0);
                let snap = if value < 128.0 { 0.0 } else { 255.0 };
                let new_value =
                    (value * gradient_factor + snap * (1.0 - gradient_factor)).round() as u8;

                let pi = x as usize * 4;
                row_out[pi] = new_value;
                row_out[pi + 1] = new_value;
                row_out[pi + 2] = new_value;
                row_out[pi + 3] = 255;
            }
        });
    result
}

/// Two-pass separable box blur on the mask's R channel. Window averages use
/// only in-bounds samples (variable count at the edges) and truncate to u8.
fn box_blur(mask: &Raster, radius: i64) -> Raster {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return mask.clone();
    }
    let src = mask.as_raw();
    let wi = w as usize;

    // Horizontal pass over the R channel
    let mut temp = vec![0u8; wi * h as usize];
    temp.par_chunks_mut(wi).enumerate().for_each(|(y, row)| {
        let row_base = y * wi * 4;
        for x in 0..w as i64 {
            let mut sum = 0u64;
            let mut count = 0u64;
            for kx in -radius..=radius {
                let nx = x + kx;
                if nx >= 0 && nx < w as i64 {
                    sum += src[row_base + nx as usize * 4] as u64;
                    count += 1;
                }
            }
            row[x as usize] = (sum / count) as u8;
        }
    });

    // Vertical pass over the intermediate result
    let mut result = Raster::new(w, h);
    result
        .as_raw_mut()
        .par_chunks_mut(wi * 4)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..wi {
                let mut sum = 0u64;
                let mut count = 0u64;
                for ky in -radius..=radius {
                    let ny = y as i64 + ky;
                    if ny >= 0 && ny < h as i64 {
                        sum += temp[ny as usize * wi + x] as u64;
                        count += 1;
                    }
                }
                let avg = (sum / count) as u8;
                let pi = x * 4;
                row_out[pi] = avg;
                row_out[pi + 1] = avg;
                row_out[pi + 2] = avg;
                row_out[pi + 3] = 255;
            }
        });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::patterns::generate_pattern_mask;

    fn half_mask(w: u32, h: u32) -> Raster {
        generate_pattern_mask("half-vertical", w, h, 100.0).unwrap()
    }

    #[test]
    fn all_effects_preserve_dimensions() {
        for effect in EdgeEffectType::ALL {
            for intensity in [0.0, 50.0, 100.0] {
                let mask = half_mask(32, 24);
                let out = apply_edge_effect(mask, &EdgeEffectOptions::new(effect, intensity));
                assert_eq!(out.dimensions(), (32, 24), "effect {}", effect);
            }
        }
    }

    #[test]
    fn effects_handle_zero_area_rasters() {
        for effect in EdgeEffectType::ALL {
            let out = apply_edge_effect(
                Raster::new(0, 0),
                &EdgeEffectOptions::new(effect, 50.0),
            );
            assert_eq!(out.dimensions(), (0, 0));
        }
    }

    #[test]
    fn none_returns_input_unchanged() {
        let mask = half_mask(10, 10);
        let expected = mask.clone();
        let out = apply_edge_effect(mask, &EdgeEffectOptions::new(EdgeEffectType::None, 100.0));
        assert_eq!(out, expected);
    }

    #[test]
    fn effect_outputs_are_gray_and_opaque() {
        for effect in EdgeEffectType::ALL {
            let out = apply_edge_effect(half_mask(20, 20), &EdgeEffectOptions::new(effect, 80.0));
            for y in 0..20 {
                for x in 0..20 {
                    let [r, g, b, a] = out.get_pixel(x, y);
                    assert_eq!(r, g, "effect {}", effect);
                    assert_eq!(g, b, "effect {}", effect);
                    assert_eq!(a, 255, "effect {}", effect);
                }
            }
        }
    }

    #[test]
    fn box_blur_leaves_uniform_mask_uniform() {
        let mask = Raster::filled(16, 16, [200, 200, 200, 255]);
        let out = box_blur(&mask, 3);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(out.get_pixel(x, y)[0], 200);
            }
        }
    }

    #[test]
    fn soft_feather_softens_the_edge() {
        let mask = half_mask(100, 10);
        let out = apply_soft_feather(&mask, 100.0);
        // Pixels straddling the former hard edge are now gray
        let mid = out.get_pixel(50, 5)[0];
        assert!(mid > 0 && mid < 255, "expected gray at edge, got {}", mid);
        // Deep inside each half the value is out of reach of the 20px blur
        assert_eq!(out.get_pixel(0, 5)[0], 255);
        assert_eq!(out.get_pixel(99, 5)[0], 0);
    }

    #[test]
    fn torn_paper_is_deterministic() {
        let opts = EdgeEffectOptions::new(EdgeEffectType::TornPaper, 70.0);
        let a = apply_edge_effect(half_mask(30, 30), &opts);
        let b = apply_edge_effect(half_mask(30, 30), &opts);
        assert_eq!(a, b);
    }

    #[test]
    fn gradient_blend_low_intensity_stays_near_binary() {
        // intensity 0 → feather width floors at 1px: only pixels directly at
        // the edge may hold intermediate values
        let out = apply_gradient_blend(&half_mask(64, 64), 0.0);
        let mut gray_pixels = 0;
        for y in 0..64 {
            for x in 0..64 {
                let v = out.get_pixel(x, y)[0];
                if v != 0 && v != 255 {
                    gray_pixels += 1;
                }
            }
        }
        assert_eq!(gray_pixels, 0);
    }

    #[test]
    fn gradient_blend_high_intensity_widens_the_band() {
        let low = apply_gradient_blend(&half_mask(128, 16), 10.0);
        let high = apply_gradient_blend(&half_mask(128, 16), 100.0);
        let count_gray = |r: &Raster| {
            let mut n = 0;
            for x in 0..128 {
                let v = r.get_pixel(x, 8)[0];
                if v != 0 && v != 255 {
                    n += 1;
                }
            }
            n
        };
        assert!(count_gray(&high) > count_gray(&low));
    }

    #[test]
    fn effect_type_parses_from_kebab_case() {
        assert_eq!(
            "gradient-blend".parse::<EdgeEffectType>().unwrap(),
            EdgeEffectType::GradientBlend
        );
        assert!("sparkles".parse::<EdgeEffectType>().is_err());
    }
}
