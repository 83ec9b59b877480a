//! Fully-connected MNIST classifier
//!
//! Flatten -> Dense(128, ReLU) -> Dense(64, ReLU) -> Dense(32, ReLU) -> Dense(10).
//! The network outputs logits; the loss applies the softmax.

use burn::{
    config::Config,
    module::Module,
    nn::{loss::CrossEntropyLossConfig, Linear, LinearConfig, Relu},
    tensor::{backend::Backend, ElementConversion, Int, Tensor},
};

/// Configuration for the MnistClassifier
#[derive(Config, Debug)]
pub struct MnistClassifierConfig {
    /// Flattened input width
    #[config(default = "784")]
    pub input_size: usize,

    /// Hidden layer widths, each followed by a ReLU
    #[config(default = "vec![128, 64, 32]")]
    pub hidden_sizes: Vec<usize>,

    /// Number of output classes
    #[config(default = "10")]
    pub num_classes: usize,
}

impl MnistClassifierConfig {
    /// Initialize a classifier on `device`
    pub fn init<B: Backend>(&self, device: &B::Device) -> MnistClassifier<B> {
        MnistClassifier::new(self, device)
    }
}

/// MNIST multi-layer perceptron
#[derive(Module, Debug)]
pub struct MnistClassifier<B: Backend> {
    pub hidden: Vec<Linear<B>>,
    pub output: Linear<B>,
    pub activation: Relu,
    num_classes: usize,
}

impl<B: Backend> MnistClassifier<B> {
    pub fn new(config: &MnistClassifierConfig, device: &B::Device) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_sizes.len());
        let mut width = config.input_size;
        for &size in &config.hidden_sizes {
            hidden.push(LinearConfig::new(width, size).init(device));
            width = size;
        }

        Self {
            hidden,
            output: LinearConfig::new(width, config.num_classes).init(device),
            activation: Relu::new(),
            num_classes: config.num_classes,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `images` - Tensor of shape [batch_size, 28, 28]
    ///
    /// # Returns
    /// * Logits of shape [batch_size, num_classes]
    pub fn forward(&self, images: Tensor<B, 3>) -> Tensor<B, 2> {
        let mut x = images.flatten::<2>(1, 2);
        for layer in &self.hidden {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }

    /// Sparse categorical cross-entropy on the logits
    pub fn loss(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

/// Number of predictions whose argmax matches the label
pub fn correct_predictions<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let predictions = logits.argmax(1).squeeze::<1>(1);
    let correct: i64 = predictions
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem();
    correct.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    #[test]
    fn test_default_layout() {
        let config = MnistClassifierConfig::new();
        assert_eq!(config.input_size, 784);
        assert_eq!(config.hidden_sizes, vec![128, 64, 32]);
        assert_eq!(config.num_classes, 10);

        let model = config.init::<TestBackend>(&Default::default());
        assert_eq!(model.hidden.len(), 3);
        assert_eq!(model.num_classes(), 10);
        // 784*128+128 + 128*64+64 + 64*32+32 + 32*10+10
        assert_eq!(model.num_params(), 111_146);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = MnistClassifierConfig::new().init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 3>::zeros([4, 28, 28], &device);
        assert_eq!(model.forward(input).dims(), [4, 10]);

        let single = Tensor::<TestBackend, 3>::ones([1, 28, 28], &device);
        assert_eq!(model.forward(single).dims(), [1, 10]);
    }

    #[test]
    fn test_loss_is_finite_and_differentiable() {
        type AdBackend = Autodiff<TestBackend>;
        let device = Default::default();
        let model = MnistClassifierConfig::new().init::<AdBackend>(&device);

        let images = Tensor::<AdBackend, 3>::ones([2, 28, 28], &device);
        let targets = Tensor::<AdBackend, 1, Int>::from_data(TensorData::new(vec![3i64, 7], [2]), &device);
        let loss = model.loss(model.forward(images), targets);

        let value: f64 = loss.clone().into_scalar().elem();
        assert!(value.is_finite() && value > 0.0);
        let _grads = loss.backward();
    }

    #[test]
    fn test_correct_predictions() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 2>::from_floats(
            TensorData::new(vec![0.1f32, 0.9, 0.8, 0.2, 0.3, 0.7], [3, 2]),
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_data(TensorData::new(vec![1i64, 0, 0], [3]), &device);
        assert_eq!(correct_predictions(logits, targets), 2);
    }
}
