use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{rngs::SmallRng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use plate_synth::{
    batch::BatchGenerator,
    config::Config,
    effects::UpscaleMode,
    plate::{is_mercosul, random_plate},
    SynthError,
};

#[derive(Parser)]
#[command(
    name = "plate-synth",
    version,
    about = "Synthesize degraded CCTV-style license plate images",
    long_about = "Plate-Synth renders clean license plates and degrades them with motion blur, sharpening, sensor noise and H.264-style compression, producing training data for plate recognition."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render plates and write one degraded image per level
    Generate {
        /// Plate text, may be repeated
        #[arg(short, long = "plate")]
        plates: Vec<String>,

        /// Also generate N random Mercosul plates
        #[arg(short, long)]
        random: Option<usize>,

        /// Seed for random plates
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Degrade an existing image at every level
    Degrade {
        /// Source image (PNG or JPEG)
        input: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write the default configuration as TOML
    InitConfig {
        /// Destination file
        #[arg(default_value = "plate-synth.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory, overrides the configuration
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Degradation levels, comma separated (e.g. 0,30,120)
    #[arg(short, long, value_delimiter = ',')]
    levels: Vec<u32>,

    /// Upscale mode for macroblocked levels (blocky, smooth)
    #[arg(short, long)]
    upscale: Option<UpscaleMode>,
}

impl CommonArgs {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => {
                info!("Loading configuration from {:?}", config_path);
                Config::from_file(config_path)?
            }
            None => {
                info!("Using default configuration");
                Config::default()
            }
        };

        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
        if !self.levels.is_empty() {
            config.degradation.levels = self.levels.clone();
        }
        if let Some(upscale) = self.upscale {
            config.degradation.upscale = upscale;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging, RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting Plate-Synth v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(cli.command) {
        if let Some(synth) = err.downcast_ref::<SynthError>() {
            error!("{}", synth.user_message());
        }
        return Err(err);
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate {
            mut plates,
            random,
            seed,
            common,
        } => {
            if let Some(count) = random {
                let mut rng = match seed {
                    Some(seed) => SmallRng::seed_from_u64(seed),
                    None => SmallRng::from_entropy(),
                };
                plates.extend((0..count).map(|_| random_plate(&mut rng)));
            }
            if plates.is_empty() {
                bail!("Nothing to generate: pass --plate or --random");
            }
            for plate in plates.iter().filter(|p| !is_mercosul(p)) {
                info!("Plate {} is not in Mercosul format", plate);
            }

            let generator = BatchGenerator::new(common.load_config()?)?;
            let report = generator.run(&plates)?;
            info!(
                "Generation complete! {} images saved to: {:?}",
                report.images_written,
                generator.config().output.directory
            );
        }

        Command::Degrade { input, common } => {
            let generator = BatchGenerator::new(common.load_config()?)?;
            let report = generator
                .degrade_file(&input)
                .with_context(|| format!("Failed to degrade {:?}", input))?;
            info!(
                "Degradation complete! {} images saved to: {:?}",
                report.images_written,
                generator.config().output.directory
            );
        }

        Command::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{:?} already exists, use --force to overwrite", path);
            }
            Config::default().save_to_file(&path)?;
            info!("Default configuration written to {:?}", path);
        }
    }

    Ok(())
}
