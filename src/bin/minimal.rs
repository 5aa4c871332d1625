// Minimal check that the degradation pipeline works without a font

use image::{ImageBuffer, Rgb};
use plate_synth::{
    effects::{Compression, EffectRegistry, Pipeline, Preset, UpscaleMode},
    raster::{psnr, Raster},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing Plate-Synth core functionality");

    // Test 1: Effect Registry
    println!("\n1. Testing Effect Registry...");
    let registry = EffectRegistry::new();
    let available = registry.available_effects();
    println!("   Available effects: {:?}", available);
    assert_eq!(available.len(), 5);

    // Test 2: Synthetic plate
    println!("\n2. Creating synthetic plate...");
    let plate = Raster::from_rgb(ImageBuffer::from_fn(520, 130, |x, y| {
        // Dark vertical strokes on a light background
        if (x / 20) % 3 == 0 && (30..100).contains(&y) {
            Rgb([20, 20, 20])
        } else {
            Rgb([200, 200, 200])
        }
    }))?;
    println!("   Created raster: {}x{}", plate.width(), plate.height());

    // Test 3: Individual effects
    println!("\n3. Testing individual effects...");
    for name in ["motion_blur", "sharpen", "noise"] {
        let config = Preset::Cctv
            .stages()
            .into_iter()
            .find(|stage| stage.effect == name)
            .ok_or("preset stage missing")?;
        let effect = registry.create(&config)?;
        let output = effect.apply(&plate)?;
        println!(
            "   {:<12} {:<45} psnr {:.1} dB",
            effect.name(),
            effect.description(),
            psnr(&plate, &output)?
        );
    }

    // Test 4: Full CCTV pipeline per level
    println!("\n4. Testing CCTV pipeline...");
    for level in [0, 30, 80, 200] {
        let pipeline = Pipeline::from_configs(&registry, &Preset::Cctv.stages())?
            .then(Box::new(Compression::new(level, UpscaleMode::Blocky)));
        let degraded = pipeline.apply(&plate)?;
        assert_eq!(degraded.dimensions(), plate.dimensions());

        let path = format!("minimal_test_L{:03}.jpg", level);
        match degraded.save_jpeg(&path, 95) {
            Ok(()) => println!("   Level {:>3}: saved to {}", level, path),
            Err(e) => println!("   Level {:>3}: could not save file: {}", level, e),
        }
    }

    println!("\nAll checks passed! Plate-Synth core is working.");
    Ok(())
}
