//! # MNIST Realtime Benchmark
//!
//! Measures training throughput and per-sample inference latency of a small
//! fully-connected MNIST classifier on CPU or GPU, using the Burn framework.
//!
//! ## Modules
//!
//! - `backend`: Device selection and Burn backend aliases
//! - `config`: Benchmark configuration and run modes
//! - `dataset`: MNIST loading, caching, batching and prefetch
//! - `model`: The MLP classifier
//! - `training`: Lifecycle hooks, timing recorder and the training loop
//! - `bench`: Training and inference benchmark drivers
//! - `stats`: Stats files, summaries and JSON reports
//! - `utils`: Logging, errors and formatting helpers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mnist_bench::backend::{cpu_device, CpuTrainingBackend};
//! use mnist_bench::bench::{self, BenchOptions, Interrupt};
//! use mnist_bench::{BenchmarkConfig, BenchmarkKind, MnistSource, MnistSplits};
//!
//! let splits = MnistSplits::load(&MnistSource::Download)?;
//! let outcome = bench::run::<CpuTrainingBackend>(
//!     BenchmarkKind::Training,
//!     &splits,
//!     &BenchmarkConfig::new(),
//!     &cpu_device(),
//!     &BenchOptions::default(),
//!     &Interrupt::manual(),
//! )?;
//! ```

pub mod backend;
pub mod bench;
pub mod config;
pub mod dataset;
pub mod model;
pub mod stats;
pub mod training;
pub mod utils;

// Re-export commonly used items for convenience
pub use backend::{resolve_device, ComputeDevice, DeviceKind, GpuProbe, NvidiaSmi};
pub use bench::{BenchOptions, BenchOutcome, Interrupt};
pub use config::{BenchmarkConfig, Mode};
pub use dataset::{MnistBatch, MnistBatcher, MnistSample, MnistSource, MnistSplit, MnistSplits};
pub use model::{MnistClassifier, MnistClassifierConfig};
pub use stats::{BenchmarkKind, BenchmarkReport, BenchmarkSummary, LatencyStats, StatsFile};
pub use training::{LifecycleHooks, NoopHooks, TimeHistory, Trainer};
pub use utils::error::{BenchError, Result};
