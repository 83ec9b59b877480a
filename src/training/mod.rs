//! Training module
//!
//! - Lifecycle hooks and the timing recorder built on them
//! - The training loop that drives the hooks

pub mod hooks;
pub mod timing;
pub mod trainer;

pub use hooks::{LifecycleHooks, NoopHooks};
pub use timing::TimeHistory;
pub use trainer::{EpochMetrics, FitOutput, Trainer};
