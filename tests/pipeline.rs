// End-to-end pipeline tests: pattern → edge effect → adjustments → composite,
// driven both directly and through the worker boundary.

use digitalglue::Raster;
use digitalglue::ops::adjustments::Adjustments;
use digitalglue::ops::compositor::{CompositeOptions, composite_images};
use digitalglue::ops::edge_effects::{EdgeEffectOptions, EdgeEffectType, apply_edge_effect};
use digitalglue::ops::patterns::generate_pattern_mask;
use digitalglue::worker::{
    CompositeRequest, CompositorWorker, MaskRequest, MaskSource, WorkerRequest, WorkerResponse,
};

fn all_red(w: u32, h: u32) -> Raster {
    Raster::filled(w, h, [255, 0, 0, 255])
}

fn all_blue(w: u32, h: u32) -> Raster {
    Raster::filled(w, h, [0, 0, 255, 255])
}

#[test]
fn half_vertical_composite_splits_red_and_blue() {
    let mask = generate_pattern_mask("half-vertical", 10, 10, 100.0).unwrap();
    let result = composite_images(
        &all_red(10, 10),
        &all_blue(10, 10),
        &mask,
        &CompositeOptions::default(),
    )
    .unwrap();

    assert_eq!(result.get_pixel(2, 5), [255, 0, 0, 255]);
    assert_eq!(result.get_pixel(7, 5), [0, 0, 255, 255]);
}

#[test]
fn inverted_composite_swaps_the_halves() {
    let mask = generate_pattern_mask("half-vertical", 10, 10, 100.0).unwrap();
    let result = composite_images(
        &all_red(10, 10),
        &all_blue(10, 10),
        &mask,
        &CompositeOptions { invert_mask: true },
    )
    .unwrap();

    assert_eq!(result.get_pixel(2, 5), [0, 0, 255, 255]);
    assert_eq!(result.get_pixel(7, 5), [255, 0, 0, 255]);
}

#[test]
fn uniform_gray_mask_blends_every_pixel() {
    let mask = Raster::filled(10, 10, [128, 128, 128, 255]);
    let result = composite_images(
        &all_red(10, 10),
        &all_blue(10, 10),
        &mask,
        &CompositeOptions::default(),
    )
    .unwrap();

    for y in 0..10 {
        for x in 0..10 {
            let [r, g, b, a] = result.get_pixel(x, y);
            assert!((r as i32 - 128).abs() <= 1);
            assert_eq!(g, 0);
            assert!((b as i32 - 128).abs() <= 1);
            assert_eq!(a, 255);
        }
    }
}

#[test]
fn pattern_dimension_fidelity_including_large_rasters() {
    for &(w, h) in &[(0u32, 0u32), (1, 1), (4000, 3000)] {
        let mask = generate_pattern_mask("half-vertical", w, h, 100.0).unwrap();
        assert_eq!(mask.dimensions(), (w, h));
    }
}

#[test]
fn full_chain_through_the_worker_boundary() {
    let worker = CompositorWorker::spawn();

    let mask = match worker
        .request(WorkerRequest::GenerateMask(MaskRequest {
            width: 10,
            height: 10,
            source: MaskSource::Pattern { id: "half-vertical".into(), scale: 100.0 },
            invert: false,
        }))
        .unwrap()
    {
        WorkerResponse::MaskGenerated { mask } => mask,
        other => panic!("unexpected response: {:?}", other),
    };

    let mask = apply_edge_effect(mask, &EdgeEffectOptions::new(EdgeEffectType::None, 50.0));

    let result = match worker
        .request(WorkerRequest::Composite(CompositeRequest {
            source1: all_red(10, 10),
            source2: all_blue(10, 10),
            mask,
            adjustments1: Adjustments::default(),
            adjustments2: Adjustments::default(),
            options: CompositeOptions::default(),
        }))
        .unwrap()
    {
        WorkerResponse::CompositeComplete { result } => result,
        other => panic!("unexpected response: {:?}", other),
    };

    assert_eq!(result.get_pixel(2, 5), [255, 0, 0, 255]);
    assert_eq!(result.get_pixel(7, 5), [0, 0, 255, 255]);
}

#[test]
fn adjusted_sources_feed_the_composite() {
    // Brightness +100 pushes source1 to pure white before blending
    let worker = CompositorWorker::spawn();
    let mask = Raster::filled(4, 4, [255, 255, 255, 255]);

    let result = match worker
        .request(WorkerRequest::Composite(CompositeRequest {
            source1: Raster::filled(4, 4, [10, 20, 30, 255]),
            source2: all_blue(4, 4),
            mask,
            adjustments1: Adjustments { brightness: 100.0, ..Default::default() },
            adjustments2: Adjustments::default(),
            options: CompositeOptions::default(),
        }))
        .unwrap()
    {
        WorkerResponse::CompositeComplete { result } => result,
        other => panic!("unexpected response: {:?}", other),
    };

    assert_eq!(result.get_pixel(0, 0), [255, 255, 255, 255]);
}

#[test]
fn feathered_pattern_still_composites_cleanly() {
    let mask = generate_pattern_mask("circle", 40, 40, 100.0).unwrap();
    let mask = apply_edge_effect(mask, &EdgeEffectOptions::new(EdgeEffectType::SoftFeather, 50.0));

    let result = composite_images(
        &all_red(40, 40),
        &all_blue(40, 40),
        &mask,
        &CompositeOptions::default(),
    )
    .unwrap();

    // Center is still fully source1, far corner fully source2
    assert_eq!(result.get_pixel(20, 20), [255, 0, 0, 255]);
    assert_eq!(result.get_pixel(0, 0), [0, 0, 255, 255]);
}

#[test]
fn every_edge_effect_composes_with_every_tiling_pattern() {
    for pattern in ["stripes-v", "stripes-h", "checkerboard"] {
        for effect in EdgeEffectType::ALL {
            let mask = generate_pattern_mask(pattern, 24, 24, 100.0).unwrap();
            let mask = apply_edge_effect(mask, &EdgeEffectOptions::new(effect, 60.0));
            let result = composite_images(
                &all_red(24, 24),
                &all_blue(24, 24),
                &mask,
                &CompositeOptions::default(),
            )
            .unwrap();
            assert_eq!(result.dimensions(), (24, 24), "{} + {}", pattern, effect);
        }
    }
}
