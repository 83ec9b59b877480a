//! Benchmark artifacts
//!
//! - Stats files (one timing per line)
//! - The stdout summary and latency statistics
//! - Optional JSON reports

pub mod report;
pub mod stats_file;
pub mod summary;

pub use report::BenchmarkReport;
pub use stats_file::{stats_file_name, BenchmarkKind, StatsFile};
pub use summary::{BenchmarkSummary, LatencyStats};
