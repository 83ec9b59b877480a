//! Training benchmark
//!
//! Every optimizer step is timed by a `TimeHistory`. The per-step times are
//! written to the stats file in bulk once training finishes.

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use burn::optim::AdamConfig;
use burn::tensor::backend::AutodiffBackend;
use chrono::Local;
use colored::Colorize;
use tracing::info;

use super::{build_model, train_loader, BenchOptions, BenchOutcome};
use crate::config::BenchmarkConfig;
use crate::model::MnistClassifier;
use crate::dataset::MnistSplit;
use crate::stats::{BenchmarkKind, BenchmarkSummary, LatencyStats, StatsFile};
use crate::training::{TimeHistory, Trainer};
use crate::utils::{format_duration, format_number};

/// Train for `config.training_epochs` epochs and record every step time
pub fn training_benchmark<B: AutodiffBackend>(
    train: &MnistSplit,
    config: &BenchmarkConfig,
    device: &B::Device,
    options: &BenchOptions,
) -> Result<BenchOutcome> {
    let started = Local::now();
    let epochs = config.training_epochs;

    let model = build_model::<B>(config, device);
    let loader = train_loader::<B>(train, config, device);
    let batches = loader.len();

    eprintln!("{}", "Training benchmark".green().bold());
    info!(
        "{} epochs x {} batches of {} ({} samples)",
        epochs,
        batches,
        config.batch_size,
        format_number(train.len())
    );

    let mut history = TimeHistory::new();
    let optimizer = AdamConfig::new().init::<B, MnistClassifier<B>>();
    Trainer::new(model, optimizer, config.learning_rate, loader)
        .with_progress(options.verbose)
        .fit(epochs, &mut history);

    let mut stats = StatsFile::create_at(&options.output_dir, BenchmarkKind::Training, &started)
        .context("Failed to create training stats file")?;
    stats
        .write_all(&history.batch_times)
        .context("Failed to write training stats")?;

    let summary = BenchmarkSummary::new(history.total_batch_time(), epochs * train.len());
    let latency = LatencyStats::from_seconds(&history.batch_times);
    info!(
        "{} optimizer steps in {} | {}",
        format_number(stats.lines()),
        format_duration(summary.total_time),
        latency.summary()
    );

    println!("TRAINING COMPLETED!");
    println!("{}", summary);

    Ok(BenchOutcome {
        kind: BenchmarkKind::Training,
        summary,
        latency,
        iterations: epochs,
        interrupted: false,
        stats_path: stats.path().to_path_buf(),
        started,
    })
}
