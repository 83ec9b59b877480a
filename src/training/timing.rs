//! Timing recorder
//!
//! `TimeHistory` measures every batch, every epoch and the whole run with the
//! monotonic clock. Values are seconds.

use std::time::{Duration, Instant};

use super::hooks::LifecycleHooks;

#[derive(Debug, Clone, Default)]
pub struct TimeHistory {
    pub batch_times: Vec<f64>,
    pub epoch_times: Vec<f64>,
    pub run_times: Vec<f64>,
    run_start: Option<Instant>,
    epoch_start: Option<Instant>,
    batch_start: Option<Instant>,
}

impl TimeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all batch times
    pub fn total_batch_time(&self) -> f64 {
        self.batch_times.iter().sum()
    }

    /// Most recent batch time, if any
    pub fn last_batch_time(&self) -> Option<f64> {
        self.batch_times.last().copied()
    }

    fn elapsed(start: Option<Instant>) -> f64 {
        start
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
            .as_secs_f64()
    }
}

impl LifecycleHooks for TimeHistory {
    fn on_run_begin(&mut self) {
        self.batch_times.clear();
        self.epoch_times.clear();
        self.run_times.clear();
        self.run_start = Some(Instant::now());
    }

    fn on_epoch_begin(&mut self, _epoch: usize) {
        self.epoch_start = Some(Instant::now());
    }

    fn on_batch_begin(&mut self, _batch: usize) {
        self.batch_start = Some(Instant::now());
    }

    fn on_batch_end(&mut self, _batch: usize) {
        self.batch_times.push(Self::elapsed(self.batch_start.take()));
    }

    fn on_epoch_end(&mut self, _epoch: usize) {
        self.epoch_times.push(Self::elapsed(self.epoch_start.take()));
    }

    fn on_run_end(&mut self) {
        self.run_times.push(Self::elapsed(self.run_start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn run(history: &mut TimeHistory, epochs: usize, batches: usize) {
        history.on_run_begin();
        for epoch in 0..epochs {
            history.on_epoch_begin(epoch);
            for batch in 0..batches {
                history.on_batch_begin(batch);
                history.on_batch_end(batch);
            }
            history.on_epoch_end(epoch);
        }
        history.on_run_end();
    }

    #[test]
    fn test_counts() {
        let mut history = TimeHistory::new();
        run(&mut history, 3, 4);

        assert_eq!(history.batch_times.len(), 12);
        assert_eq!(history.epoch_times.len(), 3);
        assert_eq!(history.run_times.len(), 1);
        assert!(history.batch_times.iter().all(|t| *t >= 0.0));
    }

    #[test]
    fn test_run_begin_clears() {
        let mut history = TimeHistory::new();
        run(&mut history, 2, 2);
        run(&mut history, 1, 1);

        assert_eq!(history.batch_times.len(), 1);
        assert_eq!(history.epoch_times.len(), 1);
        assert_eq!(history.run_times.len(), 1);
    }

    #[test]
    fn test_nesting_of_measurements() {
        let mut history = TimeHistory::new();
        history.on_run_begin();
        history.on_epoch_begin(0);
        history.on_batch_begin(0);
        sleep(Duration::from_millis(5));
        history.on_batch_end(0);
        history.on_epoch_end(0);
        history.on_run_end();

        let batch = history.batch_times[0];
        assert!(batch >= 0.005);
        assert!(history.epoch_times[0] >= batch);
        assert!(history.run_times[0] >= history.epoch_times[0]);
        assert_eq!(history.total_batch_time(), batch);
    }

    #[test]
    fn test_batch_end_without_begin_is_zero() {
        let mut history = TimeHistory::new();
        history.on_batch_end(0);
        assert_eq!(history.last_batch_time(), Some(0.0));
    }
}
