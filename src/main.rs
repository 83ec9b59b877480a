//! MNIST Realtime Benchmark CLI
//!
//! ```text
//! mnist_bench <gpu|cpu> <training|inference|test> [OPTIONS]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use mnist_bench::backend::{DeviceKind, NvidiaSmi};
use mnist_bench::bench::{self, BenchOptions, DeviceRequest, Interrupt};
use mnist_bench::config::{BenchmarkConfig, Mode};
use mnist_bench::dataset::MnistSource;
use mnist_bench::utils::logging::{init_logging, LogConfig};

/// Training and inference benchmark for an MNIST classifier
#[derive(Parser, Debug)]
#[command(name = "mnist_bench")]
#[command(version)]
#[command(about = "Time MNIST training and per-sample inference on CPU or GPU", long_about = None)]
struct Cli {
    /// Device to run on
    #[arg(value_enum)]
    device_type: DeviceKind,

    /// Benchmark to run
    #[arg(value_enum)]
    mode: Mode,

    /// GPU index
    #[arg(short = 'g', long = "gpu_index", default_value = "0")]
    gpu_index: usize,

    /// Training epochs for the training benchmark [default: 50]
    #[arg(short = 'n', long = "n_epochs_training")]
    n_epochs_training: Option<usize>,

    /// Accepted for compatibility, has no effect
    #[arg(short = 't', long = "test_mode", default_value = "false")]
    test_mode: bool,

    /// Maximum number of inference passes (0 = until interrupted)
    #[arg(short = 'l', long = "iteration_limit")]
    iteration_limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Load the benchmark configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read MNIST IDX files from this directory instead of downloading
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory receiving the stats files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Random seed for weight init and shuffling
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if cli.test_mode {
        debug!("--test_mode is accepted but ignored");
    }

    let Some(kind) = cli.mode.benchmark() else {
        debug!("Test mode: skipping device, dataset and model");
        bench::run_test_mode(&mut std::io::stdout().lock())?;
        return Ok(());
    };

    let config = load_config(&cli)?;
    let source = match &cli.data_dir {
        Some(dir) => MnistSource::IdxDir(dir.clone()),
        None => MnistSource::Download,
    };
    let options = BenchOptions {
        output_dir: cli.output_dir.clone(),
        iteration_limit: cli.iteration_limit,
        verbose: cli.verbose,
    };
    let request = DeviceRequest {
        kind: cli.device_type,
        gpu_index: cli.gpu_index,
    };

    let (device, outcome) = bench::select_and_run(
        kind,
        request,
        &NvidiaSmi,
        &source,
        &config,
        &options,
        &Interrupt::ctrlc(),
    )?;

    info!("Stats written to {}", outcome.stats_path.display());
    if let Some(path) = &cli.report {
        outcome
            .report(&device.to_string())
            .save(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Config file (if any) with command line overrides applied
fn load_config(cli: &Cli) -> Result<BenchmarkConfig> {
    let mut config = match &cli.config {
        Some(path) => BenchmarkConfig::from_file(path)?,
        None => BenchmarkConfig::new(),
    };

    if let Some(epochs) = cli.n_epochs_training {
        config.training_epochs = epochs;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    config.validate()?;
    debug!("{:?}", config);
    Ok(config)
}
