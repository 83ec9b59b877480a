//! Logging setup
//!
//! Everything goes to stderr through `tracing`, leaving stdout to the
//! benchmark summary. `RUST_LOG` overrides the configured level.

use std::io::IsTerminal;
use std::time::Instant;

use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    /// Print module paths and thread ids
    pub detailed: bool,
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            detailed: false,
            ansi_colors: std::io::stderr().is_terminal(),
        }
    }
}

impl LogConfig {
    /// Debug level with module paths and thread ids
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            detailed: true,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(LevelFilter::from_level(self.level).into())
        })
    }
}

/// Install the global subscriber
///
/// Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(config.filter())
        .with_ansi(config.ansi_colors)
        .with_target(config.detailed)
        .with_thread_ids(config.detailed)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Per-epoch progress lines for the training loop
pub struct EpochLogger {
    total_epochs: usize,
    current: usize,
    run_start: Instant,
    epoch_start: Instant,
}

impl EpochLogger {
    pub fn new(total_epochs: usize) -> Self {
        let now = Instant::now();
        Self {
            total_epochs,
            current: 0,
            run_start: now,
            epoch_start: now,
        }
    }

    pub fn start_epoch(&mut self, epoch: usize) {
        self.current = epoch;
        self.epoch_start = Instant::now();
        tracing::debug!("Epoch {}/{}", epoch + 1, self.total_epochs);
    }

    /// Seconds left at the average epoch pace so far
    pub fn eta_secs(&self) -> f64 {
        let done = self.current + 1;
        let remaining = self.total_epochs.saturating_sub(done);
        remaining as f64 * self.run_start.elapsed().as_secs_f64() / done as f64
    }

    /// `accuracy` is a fraction in [0, 1]
    pub fn end_epoch(&self, loss: f64, accuracy: f64, samples: usize) {
        let secs = self.epoch_start.elapsed().as_secs_f64();
        tracing::info!(
            "Epoch {}/{} | loss {:.4} | acc {:.2}% | {:.0} samples/s | ETA {:.0}s",
            self.current + 1,
            self.total_epochs,
            loss,
            accuracy * 100.0,
            samples as f64 / secs.max(f64::EPSILON),
            self.eta_secs()
        );
    }

    pub fn finish(&self, final_accuracy: f64) {
        tracing::info!(
            "{} epoch(s) done in {:.1}s, final training accuracy {:.2}%",
            self.total_epochs,
            self.run_start.elapsed().as_secs_f64(),
            final_accuracy * 100.0
        );
    }
}
