//! Benchmark Configuration
//!
//! Batch sizes, epoch counts and optimizer settings shared by the loader,
//! the model and both benchmark drivers.

use std::path::Path;

use burn::config::Config;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::stats::BenchmarkKind;
use crate::utils::error::BenchError;

/// Configuration for a benchmark run
#[derive(Config, Debug)]
pub struct BenchmarkConfig {
    /// Batch size used to prepare both dataset splits
    #[config(default = 128)]
    pub batch_size: usize,

    /// Number of samples per timed inference forward pass
    #[config(default = 1)]
    pub inference_batch_size: usize,

    /// Untimed training epochs run before the inference benchmark
    #[config(default = 6)]
    pub warmup_epochs: usize,

    /// Timed training epochs for the training benchmark
    #[config(default = 50)]
    pub training_epochs: usize,

    /// Number of output classes
    #[config(default = 10)]
    pub num_classes: usize,

    /// Adam learning rate
    #[config(default = 1e-3)]
    pub learning_rate: f64,

    /// Seed for weight init and shuffling
    #[config(default = 42)]
    pub seed: u64,

    /// How many batches the loader assembles ahead of the consumer
    #[config(default = 2)]
    pub prefetch_batches: usize,

    /// Reshuffle the training split every epoch
    #[config(default = true)]
    pub shuffle: bool,
}

impl BenchmarkConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> std::result::Result<Self, BenchError> {
        Self::load(path)
            .map_err(|e| BenchError::Config(format!("Failed to load {}: {}", path.display(), e)))
    }

    /// Check the values the drivers divide or chunk by
    pub fn validate(&self) -> std::result::Result<(), BenchError> {
        if self.batch_size == 0 {
            return Err(BenchError::Config("batch_size must be greater than 0".into()));
        }
        if self.inference_batch_size == 0 {
            return Err(BenchError::Config(
                "inference_batch_size must be greater than 0".into(),
            ));
        }
        if self.num_classes == 0 {
            return Err(BenchError::Config("num_classes must be greater than 0".into()));
        }
        if self.prefetch_batches == 0 {
            return Err(BenchError::Config(
                "prefetch_batches must be greater than 0".into(),
            ));
        }
        if !(self.learning_rate > 0.0) {
            return Err(BenchError::Config("learning_rate must be positive".into()));
        }
        Ok(())
    }
}

/// Benchmark mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Timed training over the training split
    Training,
    /// Warm-up training, then per-sample timed inference passes
    Inference,
    /// No-op smoke check that prints a zero summary
    Test,
}

impl Mode {
    /// The benchmark this mode runs; test mode runs none
    pub fn benchmark(&self) -> Option<BenchmarkKind> {
        match self {
            Mode::Training => Some(BenchmarkKind::Training),
            Mode::Inference => Some(BenchmarkKind::Inference),
            Mode::Test => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Training => write!(f, "training"),
            Mode::Inference => write!(f, "inference"),
            Mode::Test => write!(f, "test"),
        }
    }
}
