//! Training loop
//!
//! A manual Burn loop: forward, cross-entropy, backward, optimizer step.
//! Hooks fire around the run, every epoch and every optimizer step; batch
//! assembly happens before `on_batch_begin` so it stays out of the timings.

use burn::{
    optim::{GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::hooks::LifecycleHooks;
use crate::dataset::BatchLoader;
use crate::model::{correct_predictions, MnistClassifier};
use crate::utils::logging::EpochLogger;

/// Metrics for a single epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Mean batch loss
    pub loss: f64,
    /// Fraction of correctly classified training samples
    pub accuracy: f64,
    pub samples: usize,
}

/// Result of [`Trainer::fit`]
pub struct FitOutput<B: AutodiffBackend> {
    pub model: MnistClassifier<B>,
    pub metrics: Vec<EpochMetrics>,
}

impl<B: AutodiffBackend> FitOutput<B> {
    pub fn final_accuracy(&self) -> f64 {
        self.metrics.last().map(|m| m.accuracy).unwrap_or(0.0)
    }
}

pub struct Trainer<B: AutodiffBackend, O> {
    model: MnistClassifier<B>,
    optimizer: O,
    learning_rate: f64,
    loader: BatchLoader<B>,
    verbose: bool,
}

impl<B, O> Trainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<MnistClassifier<B>, B>,
{
    pub fn new(
        model: MnistClassifier<B>,
        optimizer: O,
        learning_rate: f64,
        loader: BatchLoader<B>,
    ) -> Self {
        Self {
            model,
            optimizer,
            learning_rate,
            loader,
            verbose: false,
        }
    }

    /// Show a progress bar on stderr
    pub fn with_progress(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Batches per epoch
    pub fn batches_per_epoch(&self) -> usize {
        self.loader.len()
    }

    /// Train for `epochs` epochs
    pub fn fit(self, epochs: usize, hooks: &mut dyn LifecycleHooks) -> FitOutput<B> {
        let Self {
            mut model,
            mut optimizer,
            learning_rate,
            mut loader,
            verbose,
        } = self;

        let num_batches = loader.len();
        let progress = if verbose {
            let bar = ProgressBar::new((epochs * num_batches) as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({eta}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut logger = EpochLogger::new(epochs);
        let mut metrics = Vec::with_capacity(epochs);

        hooks.on_run_begin();
        for epoch in 0..epochs {
            logger.start_epoch(epoch);
            hooks.on_epoch_begin(epoch);

            let mut epoch_loss = 0.0f64;
            let mut correct = 0usize;
            let mut seen = 0usize;

            for (batch_idx, batch) in loader.iter().enumerate() {
                let batch_len = batch.len();
                hooks.on_batch_begin(batch_idx);

                let logits = model.forward(batch.images);
                let loss = model.loss(logits.clone(), batch.targets.clone());

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optimizer.step(learning_rate, model, grads);

                // reading the scalars waits for the device
                let loss_value: f64 = loss.into_scalar().elem();
                let batch_correct = correct_predictions(logits, batch.targets);

                hooks.on_batch_end(batch_idx);

                epoch_loss += loss_value;
                correct += batch_correct;
                seen += batch_len;
                progress.inc(1);
            }

            hooks.on_epoch_end(epoch);

            let epoch_metrics = EpochMetrics {
                epoch,
                loss: epoch_loss / num_batches.max(1) as f64,
                accuracy: correct as f64 / seen.max(1) as f64,
                samples: seen,
            };
            logger.end_epoch(epoch_metrics.loss, epoch_metrics.accuracy, seen);
            progress.set_message(format!("loss {:.4}", epoch_metrics.loss));
            metrics.push(epoch_metrics);
        }
        hooks.on_run_end();
        progress.finish_and_clear();

        let output = FitOutput { model, metrics };
        if epochs > 0 {
            logger.finish(output.final_accuracy());
        } else {
            debug!("No training epochs requested");
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    use crate::dataset::test_util::synthetic_split;
    use crate::dataset::MnistBatcher;
    use crate::model::MnistClassifierConfig;
    use crate::training::{NoopHooks, TimeHistory};

    type TestBackend = Autodiff<NdArray>;

    fn trainer(
        samples: usize,
        batch_size: usize,
    ) -> Trainer<TestBackend, impl Optimizer<MnistClassifier<TestBackend>, TestBackend>> {
        let device = NdArrayDevice::Cpu;
        let loader =
            BatchLoader::new(synthetic_split(samples), MnistBatcher::new(device), batch_size)
                .shuffled(1);
        let model = MnistClassifierConfig::new().init::<TestBackend>(&device);
        let optimizer = AdamConfig::new().init::<TestBackend, MnistClassifier<TestBackend>>();
        Trainer::new(model, optimizer, 1e-3, loader)
    }

    #[test]
    fn test_fit_drives_hooks() {
        let trainer = trainer(10, 4);
        assert_eq!(trainer.batches_per_epoch(), 3);

        let mut history = TimeHistory::new();
        let output = trainer.fit(2, &mut history);

        assert_eq!(history.batch_times.len(), 6);
        assert_eq!(history.epoch_times.len(), 2);
        assert_eq!(history.run_times.len(), 1);
        assert_eq!(output.metrics.len(), 2);
        assert_eq!(output.metrics[1].samples, 10);
    }

    #[test]
    fn test_metrics_are_sane() {
        let output = trainer(20, 8).fit(1, &mut NoopHooks);
        let m = &output.metrics[0];
        assert!(m.loss.is_finite() && m.loss > 0.0);
        assert!((0.0..=1.0).contains(&m.accuracy));
    }

    #[test]
    fn test_zero_epochs() {
        let mut history = TimeHistory::new();
        let output = trainer(4, 4).fit(0, &mut history);
        assert!(output.metrics.is_empty());
        assert!(history.batch_times.is_empty());
        assert_eq!(history.run_times.len(), 1);
        assert_eq!(output.final_accuracy(), 0.0);
    }
}
