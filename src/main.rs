//! LayerForge CLI
//!
//! Usage:
//!   layerforge layer <layer.json> [--config FILE] [--svg OUT] [--output OUT] [--index N]
//!   layerforge svg <layer.json> <out.svg> [--config FILE]
//!   layerforge default-config [--output FILE]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layerforge::{init_json_logging, init_logging, Config, LayerProcessor, PolygonList, SliceLayer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Border and hatch toolpaths for sliced layers
#[derive(Parser, Debug)]
#[command(name = "layerforge")]
#[command(author, version, about, long_about = None)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the toolpath for one layer
    Layer {
        /// Layer file (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Configuration file (.json or .toml); defaults are used when absent
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Write borders and hatches as SVG
        #[arg(long, value_name = "SVG")]
        svg: Option<PathBuf>,

        /// Write the toolpath segments as JSON
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Layer number, used for hatch alternation and seam placement
        #[arg(long, default_value = "0")]
        index: usize,
    },

    /// Export the loops of a layer file as SVG
    Svg {
        /// Layer file (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output SVG file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Configuration file; its tolerances govern edge chaining
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Write the default configuration
    DefaultConfig {
        /// Destination (.json or .toml); the platform config path when absent
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        init_json_logging()?;
    } else {
        init_logging()?;
    }

    match cli.command {
        Commands::Layer {
            input,
            config,
            svg,
            output,
            index,
        } => run_layer(&input, config.as_deref(), svg.as_deref(), output.as_deref(), index),
        Commands::Svg {
            input,
            output,
            config,
        } => run_svg(&input, &output, config.as_deref()),
        Commands::DefaultConfig { output } => run_default_config(output),
    }
}

fn load_layer(path: &Path) -> Result<SliceLayer> {
    SliceLayer::load_from_file(path)
        .with_context(|| format!("Failed to read layer file {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// The layer's loops, with raw edges chained at the configured resolution.
fn layer_loops(layer: &SliceLayer, config: &Config) -> PolygonList {
    layer.polygons(config.tolerances.point_resolution)
}

fn run_layer(
    input: &Path,
    config: Option<&Path>,
    svg: Option<&Path>,
    output: Option<&Path>,
    index: usize,
) -> Result<()> {
    let config = load_config(config)?;
    let layer = load_layer(input)?;

    let processor = LayerProcessor::from_config(&config);
    let toolpath = processor
        .process_layer(index, &layer)
        .with_context(|| format!("Failed to process layer {}", index))?;

    if let Some(path) = svg {
        fs::write(path, toolpath.outlines().to_svg())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote SVG to {}", path.display());
    }
    if let Some(path) = output {
        toolpath
            .save_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote toolpath to {}", path.display());
    }

    info!(
        "Layer {} at Z={}: {} border loops, {} hatch chains, {} segments",
        index,
        toolpath.z,
        toolpath.borders.len(),
        toolpath.hatches.len(),
        toolpath.segment_count()
    );
    info!(
        "Extrude {:.2} mm, travel {:.2} mm, dwell {} ms",
        toolpath.extrude_length(),
        toolpath.travel_length(),
        toolpath.dwell_time_ms()
    );
    Ok(())
}

fn run_svg(input: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let layer = load_layer(input)?;
    let loops = layer_loops(&layer, &config);
    fs::write(output, loops.to_svg())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} loops to {}", loops.len(), output.display());
    Ok(())
}

fn run_default_config(output: Option<PathBuf>) -> Result<()> {
    let path = match output {
        Some(path) => path,
        None => Config::default_config_path()?,
    };
    Config::default()
        .save_to_file(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}
