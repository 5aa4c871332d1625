use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    config::Config,
    effects::{Compression, EffectRegistry, Pipeline, Resize, ResizeParams},
    error::{Result, SynthError},
    plate::PlateRenderer,
    raster::Raster,
};

/// Summary of a finished batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Number of source plates (or files) processed
    pub plates: usize,
    pub images_written: usize,
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    fn merge(mut self, other: BatchReport) -> Self {
        self.plates += other.plates;
        self.images_written += other.images_written;
        self.outputs.extend(other.outputs);
        self
    }
}

/// Drives plate rendering and per-level degradation across a worker pool
///
/// For every level the pipeline is: configured stages, then `h264` at that
/// level, then the optional output resize.
pub struct BatchGenerator {
    config: Config,
    registry: EffectRegistry,
    pool: rayon::ThreadPool,
}

impl BatchGenerator {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, EffectRegistry::new())
    }

    /// Use a registry that may carry custom effects
    pub fn with_registry(config: Config, registry: EffectRegistry) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.output.processing_threads)
            .build()
            .map_err(|e| SynthError::generic(format!("Failed to build worker pool: {}", e)))?;

        Ok(Self {
            config,
            registry,
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full stage list for one degradation level
    pub fn pipeline_for_level(&self, level: u32) -> Result<Pipeline> {
        let mut pipeline = Pipeline::from_configs(&self.registry, &self.config.degradation.stages)?;
        pipeline.push(Box::new(Compression::new(
            level,
            self.config.degradation.upscale,
        )));

        if let Some([width, height]) = self.config.output.resize {
            pipeline.push(Box::new(Resize::new(ResizeParams { width, height })));
        }

        Ok(pipeline)
    }

    fn level_pipelines(&self) -> Result<Vec<(u32, Pipeline)>> {
        self.config
            .degradation
            .levels
            .iter()
            .map(|&level| Ok((level, self.pipeline_for_level(level)?)))
            .collect()
    }

    /// Render each plate, save its clean version if enabled, then one
    /// degraded image per configured level
    pub fn run(&self, plates: &[String]) -> Result<BatchReport> {
        let renderer = PlateRenderer::new(&self.config.plate, &self.config.watermark)?;
        let pipelines = self.level_pipelines()?;
        let directory = &self.config.output.directory;
        std::fs::create_dir_all(directory)?;
        let plates = unique_plates(plates);

        info!(
            "Generating {} plates x {} levels into {:?}",
            plates.len(),
            pipelines.len(),
            directory
        );

        let reports = self.pool.install(|| {
            plates
                .par_iter()
                .map(|plate| self.generate_plate(&renderer, &pipelines, plate))
                .collect::<Result<Vec<_>>>()
        })?;

        let report = reports.into_iter().fold(BatchReport::default(), BatchReport::merge);
        info!(
            "Wrote {} images for {} plates",
            report.images_written, report.plates
        );
        Ok(report)
    }

    fn generate_plate(
        &self,
        renderer: &PlateRenderer,
        pipelines: &[(u32, Pipeline)],
        plate: &str,
    ) -> Result<BatchReport> {
        let stem = file_stem_for(plate);
        let clean = renderer.render(plate)?;
        let mut report = BatchReport {
            plates: 1,
            ..BatchReport::default()
        };

        if self.config.output.save_clean {
            let clean_out = match self.config.output.resize {
                Some([width, height]) => crate::effects::resize(&clean, width, height)?,
                None => clean.clone(),
            };
            let path = self.output_path(&format!("{}_clean.jpg", stem));
            clean_out.save_jpeg(&path, self.config.output.jpeg_quality)?;
            report.images_written += 1;
            report.outputs.push(path);
        }

        for (level, pipeline) in pipelines {
            let path = self.write_level(&clean, pipeline, &stem, *level)?;
            report.images_written += 1;
            report.outputs.push(path);
        }

        info!("Plate {} done ({} images)", plate, report.images_written);
        Ok(report)
    }

    /// Run the per-level pipeline on an existing image, writing
    /// `{stem}_L{level:03}.jpg` for every level
    pub fn degrade_file<P: AsRef<Path>>(&self, path: P) -> Result<BatchReport> {
        let path = path.as_ref();
        let source = Raster::open(path)?.into_rgb();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let pipelines = self.level_pipelines()?;
        std::fs::create_dir_all(&self.config.output.directory)?;

        info!(
            "Degrading {:?} at {} levels",
            path,
            pipelines.len()
        );

        let outputs = self.pool.install(|| {
            pipelines
                .par_iter()
                .map(|(level, pipeline)| self.write_level(&source, pipeline, &stem, *level))
                .collect::<Result<Vec<_>>>()
        })?;

        Ok(BatchReport {
            plates: 1,
            images_written: outputs.len(),
            outputs,
        })
    }

    fn write_level(
        &self,
        clean: &Raster,
        pipeline: &Pipeline,
        stem: &str,
        level: u32,
    ) -> Result<PathBuf> {
        let degraded = pipeline.apply(clean)?;
        let path = self.output_path(&format!("{}_L{:03}.jpg", stem, level));
        degraded.save_jpeg(&path, self.config.output.jpeg_quality)?;
        debug!("Saved {:?}", path);
        Ok(path)
    }

    fn output_path(&self, file_name: &str) -> PathBuf {
        self.config.output.directory.join(file_name)
    }
}

/// Drop plates whose output files would collide with an earlier one
fn unique_plates(plates: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    plates
        .iter()
        .map(|plate| plate.as_str())
        .filter(|plate| {
            let fresh = seen.insert(file_stem_for(plate));
            if !fresh {
                debug!("Skipping duplicate plate {}", plate);
            }
            fresh
        })
        .collect()
}

/// Plate text made safe to use as a file name
fn file_stem_for(plate: &str) -> String {
    plate
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | ' ' => '_',
            c => c,
        })
        .collect()
}
