//! Behavioral properties of the degradation stages

use image::{ImageBuffer, Rgb, Rgba};
use plate_synth::{
    effects::{
        add_noise, add_noise_with_rng,
        compression::{quality_for_level, scale_factor_for_level},
        degrade, motion_blur, resize, sharpen, EffectRegistry, Pipeline, Preset, UpscaleMode,
    },
    raster::{psnr, ColorMode, Raster},
};
use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::*;

/// Colorful, non-uniform test plate
fn patterned(width: u32, height: u32) -> Raster {
    Raster::from_rgb(ImageBuffer::from_fn(width, height, |x, y| {
        let stripe = if (x / 6 + y / 5) % 2 == 0 { 40 } else { 210 };
        Rgb([
            stripe,
            ((x * 7 + y * 3) % 256) as u8,
            ((x * 2 + y * 11) % 256) as u8,
        ])
    }))
    .unwrap()
}

fn translucent(width: u32, height: u32) -> Raster {
    Raster::from_rgba(ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x * 9) as u8, (y * 13) as u8, 128, (x * 5 + 40) as u8])
    }))
    .unwrap()
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

fn red_channel(raster: &Raster) -> Vec<f64> {
    raster.as_rgba().pixels().map(|p| p[0] as f64).collect()
}

#[test]
fn test_motion_blur_identity_for_low_intensity() {
    for raster in [patterned(40, 12), translucent(17, 9)] {
        for angle in [0.0, 33.0, -90.0, 720.0] {
            assert_eq!(motion_blur(&raster, angle, 0), raster);
            assert_eq!(motion_blur(&raster, angle, 1), raster);
        }
    }
}

#[test]
fn test_zero_noise_is_identity() {
    let raster = patterned(40, 12);

    assert_eq!(add_noise(&raster, 0.0), raster);
    assert_eq!(add_noise(&raster, -3.0), raster);
}

#[test]
fn test_full_noise_is_uncorrelated() {
    let raster = Raster::from_rgb(ImageBuffer::from_fn(256, 256, |x, y| {
        Rgb([x as u8, y as u8, (x ^ y) as u8])
    }))
    .unwrap();
    let mut rng = SmallRng::seed_from_u64(2024);

    let noisy = add_noise_with_rng(&raster, 1.0, &mut rng);

    let corr = pearson(&red_channel(&raster), &red_channel(&noisy));
    assert!(corr.abs() < 0.05, "correlation {corr}");
}

#[test]
fn test_degrade_level_zero_is_identity() {
    let raster = patterned(40, 12);

    assert_eq!(degrade(&raster, 0, UpscaleMode::Blocky).unwrap(), raster);
    assert_eq!(degrade(&raster, 0, UpscaleMode::Smooth).unwrap(), raster);
}

#[test]
fn test_degrade_keeps_dimensions() {
    let sources = [patterned(520, 130), patterned(37, 13), translucent(23, 7)];

    for raster in &sources {
        for level in [1, 50, 51, 100, 520] {
            for upscale in [UpscaleMode::Blocky, UpscaleMode::Smooth] {
                let degraded = degrade(raster, level, upscale).unwrap();
                assert_eq!(degraded.dimensions(), raster.dimensions(), "level {level}");
                assert_eq!(degraded.mode(), ColorMode::Rgb);
            }
        }
    }
}

#[test]
fn test_scale_factor_schedule() {
    assert_eq!(scale_factor_for_level(50), 1.0);
    assert_eq!(scale_factor_for_level(100), 0.5);
    assert_eq!(scale_factor_for_level(200), 0.25);
}

#[test]
fn test_quality_schedule() {
    assert_eq!(quality_for_level(10), 85);
    assert_eq!(quality_for_level(94), 1);
    assert_eq!(quality_for_level(150), 1);
}

#[test]
fn test_degrade_changes_non_uniform_input() {
    let raster = patterned(64, 24);

    for level in [1, 30, 120] {
        let degraded = degrade(&raster, level, UpscaleMode::Blocky).unwrap();
        assert_ne!(degraded, raster, "level {level}");
    }
}

#[test]
fn test_upscale_modes_give_different_results() {
    let raster = patterned(64, 32);

    let blocky = degrade(&raster, 200, UpscaleMode::Blocky).unwrap();
    let smooth = degrade(&raster, 200, UpscaleMode::Smooth).unwrap();

    assert_ne!(blocky, smooth);
}

#[test]
fn test_repeated_degradation_compounds() {
    let raster = patterned(120, 40);

    let once = degrade(&raster, 60, UpscaleMode::Smooth).unwrap();
    let twice = degrade(&once, 60, UpscaleMode::Smooth).unwrap();

    let psnr_once = psnr(&raster, &once).unwrap();
    let psnr_twice = psnr(&raster, &twice).unwrap();
    assert!(
        psnr_twice < psnr_once,
        "once {psnr_once:.2} dB, twice {psnr_twice:.2} dB"
    );
}

#[test]
fn test_sharpen_flat_image_unchanged() {
    let raster = Raster::new_filled(30, 30, [200, 200, 200]).unwrap();

    assert_eq!(sharpen(&raster, 200.0, 2.0, 3), raster);
    assert_eq!(sharpen(&raster, 500.0, 6.0, 0), raster);
}

#[test]
fn test_resize_to_same_size_is_equivalent() {
    let raster = patterned(52, 13);

    let resized = resize(&raster, 52, 13).unwrap();
    assert_eq!(resized, raster);
}

#[test]
fn test_parallel_batch_matches_sequential() {
    // Noise is excluded so the comparison is exact
    let registry = EffectRegistry::new();
    let stages: Vec<_> = Preset::Cctv
        .stages()
        .into_iter()
        .filter(|stage| stage.effect != "noise")
        .collect();
    let pipeline = Pipeline::from_configs(&registry, &stages).unwrap();

    let sources: Vec<Raster> = (0..8).map(|i| patterned(40 + i * 3, 12 + i)).collect();
    let levels = [0u32, 20, 80, 200];

    let run = |raster: &Raster, level: u32| {
        let staged = pipeline.apply(raster).unwrap();
        degrade(&staged, level, UpscaleMode::Blocky).unwrap()
    };

    let sequential: Vec<Raster> = sources
        .iter()
        .flat_map(|raster| levels.iter().map(move |&level| (raster, level)))
        .map(|(raster, level)| run(raster, level))
        .collect();

    let parallel: Vec<Raster> = sources
        .par_iter()
        .flat_map_iter(|raster| levels.iter().map(move |&level| (raster, level)))
        .map(|(raster, level)| run(raster, level))
        .collect();

    assert_eq!(sequential, parallel);
}
