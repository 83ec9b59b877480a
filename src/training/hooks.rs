//! Lifecycle hooks invoked by the training loop and the inference driver
//!
//! Indices are zero-based. A "batch" is one optimizer step during training
//! and one timed forward pass during inference.

/// Callbacks around a run, its epochs and its batches
pub trait LifecycleHooks {
    fn on_run_begin(&mut self) {}

    fn on_epoch_begin(&mut self, _epoch: usize) {}

    fn on_batch_begin(&mut self, _batch: usize) {}

    fn on_batch_end(&mut self, _batch: usize) {}

    fn on_epoch_end(&mut self, _epoch: usize) {}

    fn on_run_end(&mut self) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}
