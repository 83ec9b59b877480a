//! Burn batcher turning cached samples into tensors

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;

use super::{MnistSample, IMAGE_HEIGHT, IMAGE_WIDTH};

/// A batch of MNIST images
#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    /// Images with shape [batch_size, 28, 28]
    pub images: Tensor<B, 3>,
    /// Labels with shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> MnistBatch<B> {
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single-sample batch holding row `index`
    pub fn sample(&self, index: usize) -> Tensor<B, 3> {
        self.rows(index, index + 1)
    }

    /// Images `start..end` as their own batch
    pub fn rows(&self, start: usize, end: usize) -> Tensor<B, 3> {
        self.images
            .clone()
            .slice([start..end, 0..IMAGE_HEIGHT, 0..IMAGE_WIDTH])
    }
}

/// Batcher placing MNIST batches on a device
#[derive(Clone, Debug)]
pub struct MnistBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> MnistBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<MnistSample, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<MnistSample>) -> MnistBatch<B> {
        let batch_size = items.len();

        let images_data: Vec<f32> = items
            .iter()
            .flat_map(|item| item.pixels.iter().copied())
            .collect();
        let images = Tensor::<B, 3>::from_floats(
            TensorData::new(images_data, [batch_size, IMAGE_HEIGHT, IMAGE_WIDTH]),
            &self.device,
        );

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(targets_data, [batch_size]),
            &self.device,
        );

        MnistBatch { images, targets }
    }
}
