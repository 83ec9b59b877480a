//! Stats file artifacts
//!
//! One timing value (seconds) per line, in a file named
//! `stats_file_<kind>_<YYYY-MM-DD_HH-MM-SS>.txt`. The file is always created
//! fresh; a name already taken gets `_1`, `_2`, ... appended.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utils::error::Result;

/// Which benchmark produced a stats file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkKind {
    Training,
    Inference,
}

impl std::fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchmarkKind::Training => write!(f, "training"),
            BenchmarkKind::Inference => write!(f, "inference"),
        }
    }
}

/// Base file name for a run started at `timestamp`
pub fn stats_file_name(kind: BenchmarkKind, timestamp: &DateTime<Local>) -> String {
    format!(
        "stats_file_{}_{}.txt",
        kind,
        timestamp.format("%Y-%m-%d_%H-%M-%S")
    )
}

fn with_suffix(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.strip_suffix(".txt") {
        Some(stem) => format!("{}_{}.txt", stem, attempt),
        None => format!("{}_{}", name, attempt),
    }
}

/// An open stats file
pub struct StatsFile {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl StatsFile {
    /// Create a stats file for a run starting now
    pub fn create(dir: &Path, kind: BenchmarkKind) -> Result<Self> {
        Self::create_at(dir, kind, &Local::now())
    }

    pub fn create_at(dir: &Path, kind: BenchmarkKind, timestamp: &DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let name = stats_file_name(kind, timestamp);

        let mut attempt = 0;
        loop {
            let path = dir.join(with_suffix(&name, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    info!("Writing {} timings to {}", kind, path.display());
                    return Ok(Self {
                        path,
                        writer: BufWriter::new(file),
                        lines: 0,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists", path.display());
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Append one value
    pub fn record(&mut self, seconds: f64) -> Result<()> {
        writeln!(self.writer, "{}", seconds)?;
        self.lines += 1;
        Ok(())
    }

    /// Append one value and flush it to disk
    pub fn record_flushed(&mut self, seconds: f64) -> Result<()> {
        self.record(seconds)?;
        self.flush()
    }

    /// Append every value, then flush
    pub fn write_all(&mut self, values: &[f64]) -> Result<()> {
        for &value in values {
            self.record(value)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Values written so far
    pub fn lines(&self) -> usize {
        self.lines
    }
}
