//! Command-line interface for spectral_scan
//!
//! Calibrate from a chart photo, correct later photos against a saved
//! calibration, or write a default configuration file.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use spectral_scan::image_loader::load_image;
use spectral_scan::{
    load_calibration, save_calibration, AnalysisError, CorrectionApplier, PipelineConfig,
    ProcessOutcome, SpectralProcessor,
};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "spectral-scan")]
#[command(version, about = "Phone-camera spectrometer calibration", long_about = None)]
struct Cli {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a photo and print the JSON response
    Process {
        /// Input image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Return raw colour regions even when calibration is possible
        #[arg(long)]
        force_analysis: bool,

        /// Save a successful calibration to this file
        #[arg(short, long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Correct the colour regions of a photo with a saved calibration
    Correct {
        /// Input image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Calibration file written by `process --save`
        #[arg(long, value_name = "FILE")]
        calibration: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if e.is_recoverable() {
            eprintln!("{}", e.user_message());
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> spectral_scan::Result<()> {
    match cli.command {
        Commands::Process {
            image,
            force_analysis,
            save,
        } => {
            let processor = build_processor(cli.config.as_deref())?;
            let outcome = processor.process_image(&load_image(&image)?, force_analysis);
            print_json(&outcome.to_response())?;

            if let (Some(path), ProcessOutcome::Calibration(result)) = (save, &outcome) {
                save_calibration(&path, result)?;
            }
            match outcome {
                ProcessOutcome::Error(e) => Err(e),
                _ => Ok(()),
            }
        }
        Commands::Correct { image, calibration } => {
            let config = load_config(cli.config.as_deref())?;
            let calibration = load_calibration(&calibration)?;
            let processor = SpectralProcessor::new(config.clone())?;
            let applier = CorrectionApplier::new(&config.correction);

            match processor.process_image(&load_image(&image)?, true) {
                ProcessOutcome::AnalysisOnly(analysis) => {
                    let corrected = applier.apply_to_regions(&analysis, Some(&calibration));
                    print_json(&corrected)
                }
                ProcessOutcome::Error(e) => Err(e),
                other => print_json(&other.to_response()),
            }
        }
        Commands::InitConfig { path } => {
            PipelineConfig::default().to_json_file(&path)?;
            tracing::info!("Default configuration written to {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> spectral_scan::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn build_processor(path: Option<&Path>) -> spectral_scan::Result<SpectralProcessor> {
    SpectralProcessor::new(load_config(path)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> spectral_scan::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AnalysisError::persistence("Failed to serialize output", e))?;
    println!("{}", json);
    Ok(())
}
