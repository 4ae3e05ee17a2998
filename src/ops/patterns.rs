// ============================================================================
// PATTERN GENERATOR — procedural binary/grayscale masks
// ============================================================================
//
// Each pattern is a deterministic pure function of (width, height, scale).
// Masks follow the crate-wide convention: the R channel carries the blend
// weight (255 = source1, 0 = source2), replicated into G and B, alpha 255.
// ============================================================================

use crate::log_warn;
use crate::raster::Raster;

/// Descriptor for one procedural mask pattern.
pub struct Pattern {
    pub id: &'static str,
    pub name: &'static str,
    /// Single-character glyph used by front ends for pattern pickers.
    pub preview: &'static str,
    /// True for tiling patterns whose density is driven by `scale`
    /// (stripes, checkerboard) rather than fixed geometry.
    pub is_infinite: bool,
    pub generate: fn(u32, u32, f64) -> Raster,
}

/// All built-in patterns, in presentation order.
pub static PATTERNS: &[Pattern] = &[
    Pattern { id: "half-vertical",   name: "Half Vertical",      preview: "◧", is_infinite: false, generate: half_vertical },
    Pattern { id: "half-horizontal", name: "Half Horizontal",    preview: "⬒", is_infinite: false, generate: half_horizontal },
    Pattern { id: "diagonal",        name: "Diagonal",           preview: "◪", is_infinite: false, generate: diagonal },
    Pattern { id: "circle",          name: "Circle",             preview: "◯", is_infinite: false, generate: circle },
    Pattern { id: "diamond",         name: "Diamond",            preview: "◇", is_infinite: false, generate: diamond },
    Pattern { id: "stripes-v",       name: "Vertical Stripes",   preview: "║", is_infinite: true,  generate: stripes_v },
    Pattern { id: "stripes-h",       name: "Horizontal Stripes", preview: "═", is_infinite: true,  generate: stripes_h },
    Pattern { id: "checkerboard",    name: "Checkerboard",       preview: "▦", is_infinite: true,  generate: checkerboard },
];

/// Look up a pattern descriptor by id.
pub fn get_pattern(id: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.id == id)
}

/// Generate a mask raster for the given pattern id.
///
/// `scale` defaults to 100 ("reference density") at call sites; only the
/// tiling patterns consume it. Unknown ids log a warning and return `None` —
/// the caller decides whether that surfaces as an error or a fallback.
pub fn generate_pattern_mask(id: &str, width: u32, height: u32, scale: f64) -> Option<Raster> {
    let pattern = match get_pattern(id) {
        Some(p) => p,
        None => {
            log_warn!("[patterns] Unknown pattern: {}", id);
            return None;
        }
    };

    crate::log_info!(
        "[patterns] Generating {} mask at {}x{}, scale={}%",
        id, width, height, scale
    );
    Some((pattern.generate)(width, height, scale))
}

#[inline]
fn gray(value: u8) -> [u8; 4] {
    [value, value, value, 255]
}

/// Fill a raster by evaluating `f` at each pixel; `f` returns the mask value.
fn fill_with(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Raster {
    let mut raster = Raster::new(width, height);
    for y in 0..height {
        for x in 0..width {
            raster.put_pixel(x, y, gray(f(x, y)));
        }
    }
    raster
}

/// Left half = source1, right half = source2.
fn half_vertical(width: u32, height: u32, _scale: f64) -> Raster {
    fill_with(width, height, |x, _| if x * 2 < width { 255 } else { 0 })
}

/// Top half = source1, bottom half = source2.
fn half_horizontal(width: u32, height: u32, _scale: f64) -> Raster {
    fill_with(width, height, |_, y| if y * 2 < height { 255 } else { 0 })
}

/// White field with the lower-left triangle (below the top-left to
/// bottom-right diagonal) painted black.
fn diagonal(width: u32, height: u32, _scale: f64) -> Raster {
    let (w, h) = (width as f64, height as f64);
    fill_with(width, height, |x, y| {
        // Pixel centers: below the diagonal when y/h >= x/w
        let below = (y as f64 + 0.5) * w >= (x as f64 + 0.5) * h;
        if below { 0 } else { 255 }
    })
}

/// Black field with a centered white disk, radius 0.4 × min(w, h).
fn circle(width: u32, height: u32, _scale: f64) -> Raster {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let radius = width.min(height) as f64 * 0.4;
    fill_with(width, height, |x, y| {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        if dx * dx + dy * dy <= radius * radius { 255 } else { 0 }
    })
}

/// Black field with a white quadrilateral spanning 10%–90% of each axis.
fn diamond(width: u32, height: u32, _scale: f64) -> Raster {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let half_w = width as f64 * 0.4;
    let half_h = height as f64 * 0.4;
    fill_with(width, height, |x, y| {
        if half_w <= 0.0 || half_h <= 0.0 {
            return 0;
        }
        // Diamond with vertices at (50%,10%), (90%,50%), (50%,90%), (10%,50%)
        let nx = (x as f64 + 0.5 - cx).abs() / half_w;
        let ny = (y as f64 + 0.5 - cy).abs() / half_h;
        if nx + ny <= 1.0 { 255 } else { 0 }
    })
}

/// Stripe/cell count shared by the tiling patterns: 8 bands at 100% scale,
/// halving the scale doubles the density, never fewer than 2 bands.
fn tiling_count(scale: f64) -> u32 {
    const BASE_COUNT: f64 = 8.0;
    let density = 100.0 / scale;
    ((BASE_COUNT * density).round() as i64).max(2) as u32
}

fn stripes_v(width: u32, height: u32, scale: f64) -> Raster {
    let count = tiling_count(scale);
    let stripe_width = width as f64 / count as f64;
    fill_with(width, height, |x, _| {
        let band = ((x as f64 / stripe_width) as u32).min(count - 1);
        if band % 2 == 0 { 255 } else { 0 }
    })
}

fn stripes_h(width: u32, height: u32, scale: f64) -> Raster {
    let count = tiling_count(scale);
    let stripe_height = height as f64 / count as f64;
    fill_with(width, height, |_, y| {
        let band = ((y as f64 / stripe_height) as u32).min(count - 1);
        if band % 2 == 0 { 255 } else { 0 }
    })
}

fn checkerboard(width: u32, height: u32, scale: f64) -> Raster {
    let rows = tiling_count(scale);
    let cols = tiling_count(scale);
    let cell_w = width as f64 / cols as f64;
    let cell_h = height as f64 / rows as f64;
    fill_with(width, height, |x, y| {
        let col = ((x as f64 / cell_w) as u32).min(cols - 1);
        let row = ((y as f64 / cell_h) as u32).min(rows - 1);
        if (row + col) % 2 == 0 { 255 } else { 0 }
    })
}
