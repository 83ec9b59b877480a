//! JSON report written alongside the stats file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{BenchmarkKind, BenchmarkSummary, LatencyStats};
use crate::utils::error::Result;

/// Machine-readable record of one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub kind: BenchmarkKind,
    /// Resolved device, e.g. `CPU` or `GPU:0 (Tesla T4)`
    pub device: String,
    /// RFC 3339 start time
    pub timestamp: String,
    pub summary: BenchmarkSummary,
    pub latency: LatencyStats,
    /// Training epochs or inference passes completed
    pub iterations: usize,
    pub interrupted: bool,
    pub stats_file: PathBuf,
}

impl BenchmarkReport {
    /// Save the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");

        let report = BenchmarkReport {
            kind: BenchmarkKind::Inference,
            device: "CPU".into(),
            timestamp: chrono::Local::now().to_rfc3339(),
            summary: BenchmarkSummary::new(1.0, 4),
            latency: LatencyStats::from_seconds(&[0.25; 4]),
            iterations: 2,
            interrupted: true,
            stats_file: dir.path().join("stats_file_inference.txt"),
        };
        report.save(&path).unwrap();

        let loaded = BenchmarkReport::load(&path).unwrap();
        assert_eq!(loaded.kind, BenchmarkKind::Inference);
        assert_eq!(loaded.summary, report.summary);
        assert!(loaded.interrupted);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"kind\": \"inference\""));
    }

    #[test]
    fn test_load_garbage_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let err = BenchmarkReport::load(&path).unwrap_err();
        assert!(matches!(err, crate::utils::error::BenchError::Report(_)));
    }
}
