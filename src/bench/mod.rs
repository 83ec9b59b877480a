//! Benchmark drivers
//!
//! - Training benchmark: timed optimizer steps over the training split
//! - Inference benchmark: warm-up training, then timed per-sample forward passes
//! - Test mode: prints a zero summary without touching any device

pub mod inference;
pub mod interrupt;
pub mod training;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::tensor::backend::{AutodiffBackend, Backend};
use chrono::{DateTime, Local};
use colored::Colorize;

pub use inference::inference_benchmark;
pub use interrupt::Interrupt;
pub use training::training_benchmark;

use crate::backend::{
    cpu_device, has_gpu_backend, resolve_device, ComputeDevice, CpuTrainingBackend, DeviceKind,
    GpuProbe,
};
use crate::config::BenchmarkConfig;
use crate::dataset::{BatchLoader, MnistBatcher, MnistSource, MnistSplit, MnistSplits};
use crate::model::{MnistClassifier, MnistClassifierConfig};
use crate::stats::{BenchmarkKind, BenchmarkReport, BenchmarkSummary, LatencyStats};
use crate::utils::error::BenchError;

/// Run options that come from the command line rather than the config
#[derive(Debug, Clone)]
pub struct BenchOptions {
    /// Directory receiving the stats file
    pub output_dir: PathBuf,
    /// Maximum inference passes; `None` or `Some(0)` runs until interrupted
    pub iteration_limit: Option<usize>,
    /// Progress bars during training
    pub verbose: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            iteration_limit: None,
            verbose: false,
        }
    }
}

/// What a finished benchmark run produced
#[derive(Debug, Clone)]
pub struct BenchOutcome {
    pub kind: BenchmarkKind,
    pub summary: BenchmarkSummary,
    pub latency: LatencyStats,
    /// Training epochs or inference passes completed
    pub iterations: usize,
    pub interrupted: bool,
    pub stats_path: PathBuf,
    pub started: DateTime<Local>,
}

impl BenchOutcome {
    pub fn report(&self, device: &str) -> BenchmarkReport {
        BenchmarkReport {
            kind: self.kind,
            device: device.to_string(),
            timestamp: self.started.to_rfc3339(),
            summary: self.summary,
            latency: self.latency.clone(),
            iterations: self.iterations,
            interrupted: self.interrupted,
            stats_file: self.stats_path.clone(),
        }
    }
}

/// Device requested on the command line
#[derive(Debug, Clone, Copy)]
pub struct DeviceRequest {
    pub kind: DeviceKind,
    pub gpu_index: usize,
}

/// Resolve the device, load MNIST and run one benchmark on it
///
/// The device is resolved before anything else: a missing GPU fails
/// without reading the dataset or creating a stats file.
pub fn select_and_run(
    kind: BenchmarkKind,
    request: DeviceRequest,
    gpus: &dyn GpuProbe,
    source: &MnistSource,
    config: &BenchmarkConfig,
    options: &BenchOptions,
    interrupt: &Interrupt,
) -> Result<(ComputeDevice, BenchOutcome)> {
    let device = resolve_device(request.kind, request.gpu_index, gpus)?;
    if matches!(device, ComputeDevice::Gpu(_)) && !has_gpu_backend() {
        return Err(BenchError::GpuBackendUnavailable.into());
    }

    let splits = MnistSplits::load(source).context("Failed to load MNIST")?;

    eprintln!(
        "{} {} on {}",
        "Running".cyan().bold(),
        kind,
        device.to_string().cyan()
    );

    let outcome = match &device {
        ComputeDevice::Cpu => {
            run::<CpuTrainingBackend>(kind, &splits, config, &cpu_device(), options, interrupt)?
        }
        ComputeDevice::Gpu(gpu) => run_on_gpu(gpu.index, kind, &splits, config, options, interrupt)?,
    };
    Ok((device, outcome))
}

#[cfg(feature = "cuda")]
fn run_on_gpu(
    index: usize,
    kind: BenchmarkKind,
    splits: &MnistSplits,
    config: &BenchmarkConfig,
    options: &BenchOptions,
    interrupt: &Interrupt,
) -> Result<BenchOutcome> {
    use crate::backend::{gpu_device, GpuTrainingBackend};

    run::<GpuTrainingBackend>(kind, splits, config, &gpu_device(index), options, interrupt)
}

#[cfg(not(feature = "cuda"))]
fn run_on_gpu(
    _index: usize,
    _kind: BenchmarkKind,
    _splits: &MnistSplits,
    _config: &BenchmarkConfig,
    _options: &BenchOptions,
    _interrupt: &Interrupt,
) -> Result<BenchOutcome> {
    Err(BenchError::GpuBackendUnavailable.into())
}

/// Run one benchmark on backend `B`
pub fn run<B: AutodiffBackend>(
    kind: BenchmarkKind,
    splits: &MnistSplits,
    config: &BenchmarkConfig,
    device: &B::Device,
    options: &BenchOptions,
    interrupt: &Interrupt,
) -> Result<BenchOutcome> {
    match kind {
        BenchmarkKind::Training => training_benchmark::<B>(&splits.train, config, device, options),
        BenchmarkKind::Inference => {
            inference_benchmark::<B>(splits, config, device, options, interrupt)
        }
    }
}

/// Test mode: write the zero summary
pub fn run_test_mode(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", BenchmarkSummary::zero())
}

/// Seeded, freshly initialized classifier
pub(crate) fn build_model<B: Backend>(
    config: &BenchmarkConfig,
    device: &B::Device,
) -> MnistClassifier<B> {
    B::seed(config.seed);
    MnistClassifierConfig::new()
        .with_num_classes(config.num_classes)
        .init(device)
}

/// Training-split loader configured from `config`
pub(crate) fn train_loader<B: Backend>(
    split: &MnistSplit,
    config: &BenchmarkConfig,
    device: &B::Device,
) -> BatchLoader<B> {
    let loader = BatchLoader::new(
        split.clone(),
        MnistBatcher::new(device.clone()),
        config.batch_size,
    )
    .with_prefetch(config.prefetch_batches);

    if config.shuffle {
        loader.shuffled(config.seed)
    } else {
        loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_output() {
        let mut out = Vec::new();
        run_test_mode(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "total_time: 0.0\navg_time_per_sample: 0.0\n"
        );
    }

    struct OneGpu;

    impl GpuProbe for OneGpu {
        fn list_gpus(&self) -> Vec<crate::backend::GpuInfo> {
            vec![crate::backend::GpuInfo {
                index: 0,
                name: "Test GPU".to_string(),
                memory_total_mb: None,
            }]
        }
    }

    #[test]
    fn test_unknown_gpu_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = BenchOptions {
            output_dir: dir.path().to_path_buf(),
            iteration_limit: Some(1),
            verbose: false,
        };
        let request = DeviceRequest {
            kind: DeviceKind::Gpu,
            gpu_index: 3,
        };

        for kind in [BenchmarkKind::Training, BenchmarkKind::Inference] {
            let err = select_and_run(
                kind,
                request,
                &OneGpu,
                &MnistSource::IdxDir(dir.path().join("missing")),
                &BenchmarkConfig::new(),
                &options,
                &Interrupt::manual(),
            )
            .unwrap_err();

            assert!(matches!(
                err.downcast_ref::<BenchError>(),
                Some(BenchError::GpuNotFound {
                    index: 3,
                    available: 1
                })
            ));
        }
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_default_options() {
        let options = BenchOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert_eq!(options.iteration_limit, None);
    }
}
