// ============================================================================
// FILE I/O — image decoding, composite export, .glue project files
// ============================================================================

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, imageops};
use serde::{Deserialize, Serialize};

use crate::log_info;
use crate::project::{GlueProject, ProjectState};
use crate::raster::Raster;

/// Current .glue document version.
const PROJECT_VERSION: &str = "1.0";

// ============================================================================
// IMAGE LOADING
// ============================================================================

/// Decode any raster format supported by the `image` crate into a [`Raster`].
pub fn load_image(path: &Path) -> Result<Raster, String> {
    let img = image::open(path)
        .map_err(|e| format!("could not decode '{}': {}", path.display(), e))?
        .into_rgba8();
    log_info!(
        "[io] Loaded {} ({}x{})",
        path.display(), img.width(), img.height()
    );
    Ok(Raster::from_rgba_image(&img))
}

// ============================================================================
// EXPORT
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Options for exporting a finished composite.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Scale multiplier (1.0 = original size, 2.0 = 2x, …).
    pub scale: f64,
    pub format: ExportFormat,
    /// JPEG quality, 0.0 to 1.0 (ignored for PNG).
    pub quality: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { scale: 1.0, format: ExportFormat::Png, quality: 0.95 }
    }
}

/// Encode a finished raster to disk, optionally resampling.
///
/// Scaling uses Lanczos3 resampling. A failure here is scoped to this one
/// export — the raster itself is untouched.
pub fn export_image(raster: &Raster, path: &Path, options: &ExportOptions) -> Result<(), String> {
    let scaled_w = (raster.width() as f64 * options.scale).round() as u32;
    let scaled_h = (raster.height() as f64 * options.scale).round() as u32;
    if scaled_w == 0 || scaled_h == 0 {
        return Err(format!(
            "cannot export a {}x{} image (source {}x{} at scale {})",
            scaled_w, scaled_h, raster.width(), raster.height(), options.scale
        ));
    }

    let img = raster.to_rgba_image();
    let img = if options.scale != 1.0 {
        imageops::resize(&img, scaled_w, scaled_h, imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let file = File::create(path)
        .map_err(|e| format!("could not create '{}': {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    match options.format {
        ExportFormat::Png => {
            let encoder = PngEncoder::new(&mut writer);
            #[allow(deprecated)]
            encoder
                .encode(img.as_raw(), img.width(), img.height(), image::ColorType::Rgba8)
                .map_err(|e| format!("PNG encode failed: {}", e))?;
        }
        ExportFormat::Jpeg => {
            let rgb_image = DynamicImage::ImageRgba8(img).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality(options.quality));
            encoder
                .encode(
                    rgb_image.as_raw(),
                    rgb_image.width(),
                    rgb_image.height(),
                    image::ColorType::Rgb8,
                )
                .map_err(|e| format!("JPEG encode failed: {}", e))?;
        }
    }

    log_info!(
        "[io] Exported {} ({}x{}, {:?})",
        path.display(), scaled_w, scaled_h, options.format
    );
    Ok(())
}

/// Map a 0.0–1.0 quality to the encoder's 1–100 range.
fn jpeg_quality(quality: f64) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Suggested export filename based on the current timestamp.
pub fn default_export_filename(prefix: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}-{}.png", prefix, secs)
}

// ============================================================================
// PROJECT FILES (.glue)
// ============================================================================

/// Error type for .glue file operations
#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Io(e) => write!(f, "I/O error: {}", e),
            ProjectError::Serialize(e) => write!(f, "Serialization error: {}", e),
            ProjectError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(e: std::io::Error) -> Self {
        ProjectError::Io(e)
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(e: serde_json::Error) -> Self {
        ProjectError::Serialize(e.to_string())
    }
}

/// Save a project state as a .glue document.
pub fn save_project(state: &ProjectState, name: &str, path: &Path) -> Result<(), ProjectError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string();

    let project = GlueProject {
        version: PROJECT_VERSION.to_string(),
        name: name.to_string(),
        created_at: now.clone(),
        modified_at: now,
        data: state.clone(),
    };

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &project)?;
    Ok(())
}

/// Load a .glue document from disk.
pub fn load_project(path: &Path) -> Result<GlueProject, ProjectError> {
    let raw = std::fs::read(path)?;
    let project: GlueProject = serde_json::from_slice(&raw)?;

    if project.version != PROJECT_VERSION {
        return Err(ProjectError::InvalidFormat(format!(
            "unsupported project version '{}'",
            project.version
        )));
    }
    Ok(project)
}
