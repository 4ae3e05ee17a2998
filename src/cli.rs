// ============================================================================
// DigitalGlue CLI — headless mask compositing via command-line arguments
// ============================================================================
//
// Usage examples:
//   digitalglue -1 left.png -2 right.png --pattern circle -o out.png
//   digitalglue -1 a.jpg -2 b.jpg --mask mask.png --threshold 100 --invert-mask
//   digitalglue -1 a.png -2 b.png --pattern stripes-v --pattern-scale 50 \
//       --effect soft-feather --intensity 80 --output out.jpg --quality 85
//
// All processing runs through the compositor worker thread, exactly as an
// interactive front end would drive it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{self, ExportFormat, ExportOptions};
use crate::ops::adjustments::Adjustments;
use crate::ops::compositor::CompositeOptions;
use crate::ops::edge_effects::{EdgeEffectOptions, EdgeEffectType, apply_edge_effect};
use crate::project::{EffectConfig, MaskConfig, MaskKind, ProjectState, SourceConfig};
use crate::worker::{
    CompositeRequest, CompositorWorker, MaskRequest, MaskSource, WorkerRequest, WorkerResponse,
};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// DigitalGlue headless compositor.
///
/// Blend two images through a procedural or uploaded mask — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "digitalglue",
    about = "DigitalGlue headless mask compositor",
    long_about = "Blend two source images pixel-by-pixel through a grayscale mask.\n\
                  The mask comes from a built-in pattern or an uploaded image, and can\n\
                  be reshaped with artistic edge effects before compositing.\n\n\
                  Example:\n  \
                  digitalglue -1 left.png -2 right.png --pattern circle -o out.png\n  \
                  digitalglue -1 a.jpg -2 b.jpg --mask m.png --effect wavy --intensity 70"
)]
pub struct CliArgs {
    /// First source image (shown where the mask is white).
    #[arg(short = '1', long, value_name = "FILE")]
    pub source1: PathBuf,

    /// Second source image (shown where the mask is black).
    #[arg(short = '2', long, value_name = "FILE")]
    pub source2: PathBuf,

    /// Mask image file. Converted to grayscale and binarized at --threshold.
    /// Mutually exclusive with --pattern.
    #[arg(short = 'm', long, value_name = "FILE", conflicts_with = "pattern")]
    pub mask: Option<PathBuf>,

    /// Procedural mask pattern: half-vertical, half-horizontal, diagonal,
    /// circle, diamond, stripes-v, stripes-h, checkerboard.
    #[arg(short = 'p', long, value_name = "NAME")]
    pub pattern: Option<String>,

    /// Density scale for tiling patterns (100 = reference; 50 = twice as dense).
    #[arg(long, default_value_t = 100.0, value_name = "PERCENT")]
    pub pattern_scale: f64,

    /// Binarization threshold for uploaded masks (0-255).
    #[arg(short = 't', long, default_value_t = 128, value_name = "0-255")]
    pub threshold: u8,

    /// Invert the mask (swap which source shows through).
    #[arg(long)]
    pub invert_mask: bool,

    /// Edge effect applied to the mask: none, soft-feather, shadow-feather,
    /// wavy, torn-paper, gradient-blend. Unknown names fall back to none.
    #[arg(short = 'e', long, default_value = "none", value_name = "NAME")]
    pub effect: String,

    /// Edge effect intensity (0-100).
    #[arg(long, default_value_t = 50.0, value_name = "0-100")]
    pub intensity: f64,

    /// Brightness adjustment for source 1 (-100 to 100).
    #[arg(long, default_value_t = 0.0)]
    pub brightness1: f64,
    /// Contrast adjustment for source 1 (-100 to 100).
    #[arg(long, default_value_t = 0.0)]
    pub contrast1: f64,
    /// Saturation adjustment for source 1 (-100 to 100).
    #[arg(long, default_value_t = 0.0)]
    pub saturation1: f64,

    /// Brightness adjustment for source 2 (-100 to 100).
    #[arg(long, default_value_t = 0.0)]
    pub brightness2: f64,
    /// Contrast adjustment for source 2 (-100 to 100).
    #[arg(long, default_value_t = 0.0)]
    pub contrast2: f64,
    /// Saturation adjustment for source 2 (-100 to 100).
    #[arg(long, default_value_t = 0.0)]
    pub saturation2: f64,

    /// Output file path. Defaults to a timestamped name in the current
    /// directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format: png or jpeg. When omitted, inferred from --output's
    /// extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1-100, default 95).
    #[arg(short, long, default_value_t = 95, value_name = "1-100")]
    pub quality: u8,

    /// Output scale multiplier (1.0 = original size).
    #[arg(long, default_value_t = 1.0, value_name = "FACTOR")]
    pub export_scale: f64,

    /// Also write the session configuration as a .glue project file.
    #[arg(long, value_name = "FILE")]
    pub save_project: Option<PathBuf>,

    /// Print per-stage timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the full pipeline and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    match run_inner(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(), String> {
    let start = Instant::now();

    // -- Step 1: Load sources --------------------------------------------
    let source1 = io::load_image(&args.source1)?;
    let source2 = io::load_image(&args.source2)?;
    if !source1.same_dimensions(&source2) {
        return Err(format!(
            "source images must have the same dimensions \
             ({} is {}x{}, {} is {}x{})",
            args.source1.display(), source1.width(), source1.height(),
            args.source2.display(), source2.width(), source2.height()
        ));
    }
    let (width, height) = source1.dimensions();

    if args.verbose {
        println!(
            "loaded sources {}x{} ({:.0}ms)",
            width, height,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let worker = CompositorWorker::spawn();

    // -- Step 2: Build the mask ------------------------------------------
    let mask_source = match &args.mask {
        Some(path) => {
            let image = io::load_image(path)?;
            if image.dimensions() != (width, height) {
                return Err(format!(
                    "mask '{}' is {}x{} but the sources are {}x{}",
                    path.display(), image.width(), image.height(), width, height
                ));
            }
            MaskSource::Upload { image, threshold: args.threshold }
        }
        None => MaskSource::Pattern {
            id: args.pattern.clone().unwrap_or_else(|| "half-vertical".to_string()),
            scale: args.pattern_scale,
        },
    };

    let mask = match worker
        .request(WorkerRequest::GenerateMask(MaskRequest {
            width,
            height,
            source: mask_source,
            invert: false, // CLI inversion happens at composite time
        }))
        .map_err(|e| format!("worker failed: {}", e))?
    {
        WorkerResponse::MaskGenerated { mask } => mask,
        WorkerResponse::Error(e) => return Err(e),
        other => return Err(format!("unexpected worker response: {:?}", other)),
    };

    // -- Step 3: Edge effect ---------------------------------------------
    let effect = parse_effect(&args.effect);
    let mask = apply_edge_effect(mask, &EdgeEffectOptions::new(effect, args.intensity));

    if args.verbose {
        println!(
            "mask ready ({} effect, {:.0}ms)",
            effect,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    // -- Step 4: Composite ------------------------------------------------
    let adjustments1 = Adjustments {
        brightness: args.brightness1,
        contrast: args.contrast1,
        saturation: args.saturation1,
        rotation: 0.0,
    };
    let adjustments2 = Adjustments {
        brightness: args.brightness2,
        contrast: args.contrast2,
        saturation: args.saturation2,
        rotation: 0.0,
    };

    let result = match worker
        .request(WorkerRequest::Composite(CompositeRequest {
            source1,
            source2,
            mask,
            adjustments1,
            adjustments2,
            options: CompositeOptions { invert_mask: args.invert_mask },
        }))
        .map_err(|e| format!("worker failed: {}", e))?
    {
        WorkerResponse::CompositeComplete { result } => result,
        WorkerResponse::Error(e) => return Err(e),
        other => return Err(format!("unexpected worker response: {:?}", other)),
    };

    // -- Step 5: Export ----------------------------------------------------
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(io::default_export_filename("digitalglue")));
    let format = parse_format(args.format.as_deref(), &output);
    let export_options = ExportOptions {
        scale: args.export_scale,
        format,
        quality: args.quality as f64 / 100.0,
    };
    io::export_image(&result, &output, &export_options)?;

    if args.verbose {
        println!(
            "wrote {} ({:.0}ms total)",
            output.display(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    } else {
        println!("{}", output.display());
    }

    // -- Step 6: Project file (optional) ----------------------------------
    if let Some(project_path) = &args.save_project {
        let state = build_project_state(args, width, height, effect);
        io::save_project(&state, "CLI Session", project_path)
            .map_err(|e| format!("project save failed: {}", e))?;
        if args.verbose {
            println!("saved project {}", project_path.display());
        }
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse the effect name, warning and falling back to `none` on unknown input.
fn parse_effect(name: &str) -> EdgeEffectType {
    match name.parse::<EdgeEffectType>() {
        Ok(effect) => effect,
        Err(e) => {
            eprintln!("warning: {}; applying no effect", e);
            EdgeEffectType::None
        }
    }
}

/// Choose the [`ExportFormat`] from the `--format` string or infer it from
/// the output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: &Path) -> ExportFormat {
    if let Some(f) = format_arg {
        return match f.to_lowercase().as_str() {
            "jpeg" | "jpg" => ExportFormat::Jpeg,
            _ => ExportFormat::Png,
        };
    }

    match output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => ExportFormat::Jpeg,
        _ => ExportFormat::Png,
    }
}

/// Mirror the CLI invocation as a serializable session state.
fn build_project_state(
    args: &CliArgs,
    width: u32,
    height: u32,
    effect: EdgeEffectType,
) -> ProjectState {
    let mut state = ProjectState::default();

    let mut source1 = SourceConfig::new(args.source1.display().to_string(), width, height);
    source1.brightness = args.brightness1;
    source1.contrast = args.contrast1;
    source1.saturation = args.saturation1;
    state.set_source1(Some(source1));

    let mut source2 = SourceConfig::new(args.source2.display().to_string(), width, height);
    source2.brightness = args.brightness2;
    source2.contrast = args.contrast2;
    source2.saturation = args.saturation2;
    state.set_source2(Some(source2));

    state.set_mask(match &args.mask {
        Some(_) => MaskConfig {
            kind: MaskKind::Upload,
            pattern_id: None,
            pattern_scale: 100.0,
            threshold: args.threshold,
            invert: args.invert_mask,
        },
        None => MaskConfig {
            kind: MaskKind::Pattern,
            pattern_id: Some(
                args.pattern.clone().unwrap_or_else(|| "half-vertical".to_string()),
            ),
            pattern_scale: args.pattern_scale,
            threshold: args.threshold,
            invert: args.invert_mask,
        },
    });

    state.set_effect(EffectConfig {
        mode: effect,
        intensity: args.intensity,
        params: Default::default(),
    });

    state
}
