//! Neural network model for MNIST classification

pub mod mlp;

pub use mlp::{correct_predictions, MnistClassifier, MnistClassifierConfig};
