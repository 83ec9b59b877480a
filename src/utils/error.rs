//! Error Handling Module
//!
//! Defines the error type shared by the benchmark library.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for benchmark operations
#[derive(Error, Debug)]
pub enum BenchError {
    /// A GPU was requested but none could be enumerated
    #[error("No GPU found")]
    NoGpu,

    /// The requested GPU index is outside the enumerated device list
    #[error("GPU {index} not found ({available} GPU(s) available)")]
    GpuNotFound { index: usize, available: usize },

    /// The binary was built without a GPU backend
    #[error("GPU backend unavailable: rebuild with `--features cuda`")]
    GpuBackendUnavailable,

    /// Error with dataset operations
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Malformed IDX file
    #[error("Invalid IDX file '{0}': {1}")]
    Idx(PathBuf, String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report serialization error
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),

    /// Signal handler installation error
    #[error("Signal handler error: {0}")]
    Signal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_not_found_display() {
        let err = BenchError::GpuNotFound {
            index: 3,
            available: 1,
        };
        assert_eq!(format!("{}", err), "GPU 3 not found (1 GPU(s) available)");
    }

    #[test]
    fn test_idx_error_mentions_path() {
        let err = BenchError::Idx(PathBuf::from("/data/train-images-idx3-ubyte"), "bad magic".into());
        let msg = format!("{}", err);
        assert!(msg.contains("train-images-idx3-ubyte"));
        assert!(msg.contains("bad magic"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BenchError = io.into();
        assert!(matches!(err, BenchError::Io(_)));
    }
}
