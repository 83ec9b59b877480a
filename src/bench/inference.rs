//! Inference benchmark
//!
//! The model is first trained, untimed, for `warmup_epochs`. After that the
//! interrupt is armed and the test split is replayed pass after pass: every
//! sample goes through its own forward pass, timed and appended (flushed) to
//! the stats file. A pass that sees the interrupt stops early; it still counts
//! if it timed at least one sample.

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::optim::AdamConfig;
use burn::tensor::backend::AutodiffBackend;
use chrono::Local;
use colored::Colorize;
use tracing::{debug, info};

use super::{build_model, train_loader, BenchOptions, BenchOutcome, Interrupt};
use crate::config::BenchmarkConfig;
use crate::model::MnistClassifier;
use crate::dataset::{BatchLoader, MnistBatcher, MnistSplits};
use crate::stats::{BenchmarkKind, BenchmarkSummary, LatencyStats, StatsFile};
use crate::training::{LifecycleHooks, NoopHooks, TimeHistory, Trainer};
use crate::utils::{format_duration, format_number};

/// Warm up, then time single-sample inference until the pass limit or an interrupt
pub fn inference_benchmark<B: AutodiffBackend>(
    splits: &MnistSplits,
    config: &BenchmarkConfig,
    device: &B::Device,
    options: &BenchOptions,
    interrupt: &Interrupt,
) -> Result<BenchOutcome> {
    if splits.test.len() == 0 {
        anyhow::bail!("The test split is empty, nothing to time");
    }
    let started = Local::now();
    let limit = options.iteration_limit.filter(|&limit| limit > 0);

    eprintln!("{}", "Inference benchmark".green().bold());
    info!(
        "Warm-up: {} training epochs over {} samples",
        config.warmup_epochs,
        format_number(splits.train.len())
    );

    let model = build_model::<B>(config, device);
    let warmup_loader = train_loader::<B>(&splits.train, config, device);
    let optimizer = AdamConfig::new().init::<B, MnistClassifier<B>>();
    let model = Trainer::new(model, optimizer, config.learning_rate, warmup_loader)
        .with_progress(options.verbose)
        .fit(config.warmup_epochs, &mut NoopHooks)
        .model
        .valid();
    println!("TRAINING COMPLETED!");

    let mut test_loader = BatchLoader::new(
        splits.test.clone(),
        MnistBatcher::<B::InnerBackend>::new(device.clone()),
        config.batch_size,
    )
    .with_prefetch(config.prefetch_batches);

    let mut stats = StatsFile::create_at(&options.output_dir, BenchmarkKind::Inference, &started)
        .context("Failed to create inference stats file")?;

    interrupt.arm().context("Failed to install the interrupt handler")?;
    match limit {
        Some(limit) => info!("Timing {} pass(es) over {} test samples", limit, splits.test.len()),
        None => info!(
            "Timing passes over {} test samples until interrupted (Ctrl-C)",
            splits.test.len()
        ),
    }

    let step = config.inference_batch_size;
    let mut history = TimeHistory::new();
    let mut total_time = 0.0f64;
    let mut samples = 0usize;
    let mut passes = 0usize;
    let mut step_index = 0usize;
    let mut interrupted = false;

    history.on_run_begin();
    loop {
        println!("Iteration {}", passes);
        history.on_epoch_begin(passes);
        let samples_before = samples;

        'pass: for batch in test_loader.iter() {
            let len = batch.len();
            let mut start = 0;
            while start < len {
                if interrupt.is_set() {
                    interrupted = true;
                    break 'pass;
                }
                let end = (start + step).min(len);
                let input = batch.rows(start, end);

                history.on_batch_begin(step_index);
                let output = model.forward(input);
                // reading back waits for asynchronous devices
                let _ = output.into_data();
                history.on_batch_end(step_index);

                let elapsed = history.last_batch_time().unwrap_or(0.0);
                total_time += elapsed;
                samples += end - start;
                step_index += 1;
                stats
                    .record_flushed(elapsed)
                    .context("Failed to write inference stats")?;

                start = end;
            }
        }

        history.on_epoch_end(passes);

        if interrupted && samples == samples_before {
            info!("Interrupted before pass {} timed any sample", passes + 1);
            break;
        }
        passes += 1;
        debug!(
            "Pass {} finished in {}",
            passes,
            format_duration(history.epoch_times.last().copied().unwrap_or(0.0))
        );

        if interrupted {
            info!("Interrupted during pass {}", passes);
            break;
        }
        if limit.is_some_and(|limit| passes >= limit) {
            break;
        }
    }
    history.on_run_end();

    let summary = BenchmarkSummary::new(total_time, samples);
    let latency = LatencyStats::from_seconds(&history.batch_times);
    info!(
        "{} pass(es), {} samples timed | {}",
        passes,
        format_number(samples),
        latency.summary()
    );

    println!("INFERENCE COMPLETED!");
    println!("{}", summary);

    Ok(BenchOutcome {
        kind: BenchmarkKind::Inference,
        summary,
        latency,
        iterations: passes,
        interrupted,
        stats_path: stats.path().to_path_buf(),
        started,
    })
}
