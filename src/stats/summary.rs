//! Benchmark summary and latency statistics

use serde::{Deserialize, Serialize};

/// Totals printed to stdout at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    /// Sum of all timed windows, in seconds
    pub total_time: f64,
    /// `total_time` divided by the number of samples processed
    pub avg_time_per_sample: f64,
    pub samples: usize,
}

impl BenchmarkSummary {
    pub fn new(total_time: f64, samples: usize) -> Self {
        let avg_time_per_sample = if samples == 0 {
            0.0
        } else {
            total_time / samples as f64
        };
        Self {
            total_time,
            avg_time_per_sample,
            samples,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0)
    }
}

/// Float with a decimal point, even when integral
fn float_text(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

impl std::fmt::Display for BenchmarkSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "total_time: {}", float_text(self.total_time))?;
        write!(f, "avg_time_per_sample: {}", float_text(self.avg_time_per_sample))
    }
}

/// Latency statistics over a set of timings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Mean latency in milliseconds
    pub mean_ms: f64,
    /// Standard deviation in milliseconds
    pub std_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Median (50th percentile)
    pub p50_ms: f64,
    /// 95th percentile
    pub p95_ms: f64,
    /// 99th percentile
    pub p99_ms: f64,
}

impl LatencyStats {
    /// Calculate statistics from timings in seconds
    pub fn from_seconds(seconds: &[f64]) -> Self {
        if seconds.is_empty() {
            return Self::default();
        }

        let mut times_ms: Vec<f64> = seconds.iter().map(|s| s * 1000.0).collect();
        times_ms.sort_by(f64::total_cmp);

        let n = times_ms.len();
        let mean = times_ms.iter().sum::<f64>() / n as f64;
        let variance = times_ms.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n as f64;

        Self {
            mean_ms: mean,
            std_ms: variance.sqrt(),
            min_ms: times_ms[0],
            max_ms: times_ms[n - 1],
            p50_ms: percentile(&times_ms, 50.0),
            p95_ms: percentile(&times_ms, 95.0),
            p99_ms: percentile(&times_ms, 99.0),
        }
    }

    /// One-line summary for the logs
    pub fn summary(&self) -> String {
        format!(
            "Latency: {:.3}ms (mean) ±{:.3} | min {:.3}ms | p50 {:.3}ms | p95 {:.3}ms | p99 {:.3}ms | max {:.3}ms",
            self.mean_ms, self.std_ms, self.min_ms, self.p50_ms, self.p95_ms, self.p99_ms, self.max_ms
        )
    }
}

/// Nearest-rank percentile of sorted data
fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_data.len() - 1) as f64).round() as usize;
    sorted_data[idx.min(sorted_data.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_summary_text() {
        assert_eq!(
            BenchmarkSummary::zero().to_string(),
            "total_time: 0.0\navg_time_per_sample: 0.0"
        );
    }

    #[test]
    fn test_average_is_per_sample() {
        let summary = BenchmarkSummary::new(3.0, 12);
        assert_eq!(summary.avg_time_per_sample, 0.25);
        assert_eq!(
            summary.to_string(),
            "total_time: 3.0\navg_time_per_sample: 0.25"
        );
    }

    #[test]
    fn test_small_values_stay_decimal() {
        let text = BenchmarkSummary::new(0.000012, 4).to_string();
        assert!(text.starts_with("total_time: 0.000012\n"));
        for line in text.lines() {
            let (_, value) = line.split_once(": ").unwrap();
            assert!(!value.contains('e'), "scientific notation in {:?}", line);
        }
    }

    #[test]
    fn test_latency_stats() {
        let stats = LatencyStats::from_seconds(&[0.004, 0.001, 0.003, 0.002]);
        assert!((stats.mean_ms - 2.5).abs() < 1e-9);
        assert!((stats.min_ms - 1.0).abs() < 1e-9);
        assert!((stats.max_ms - 4.0).abs() < 1e-9);
        assert!(stats.p50_ms <= stats.p95_ms && stats.p95_ms <= stats.p99_ms);
    }

    #[test]
    fn test_latency_stats_empty() {
        assert_eq!(LatencyStats::from_seconds(&[]), LatencyStats::default());
    }

    #[test]
    fn test_percentile() {
        let data: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(percentile(&data, 50.0), 51.0);
        assert_eq!(percentile(&data, 99.0), 99.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
