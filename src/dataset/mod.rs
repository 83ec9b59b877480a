//! Dataset module for MNIST
//!
//! This module handles:
//! - Decoding MNIST from Burn's vision dataset or local IDX files
//! - Caching normalized splits in memory
//! - Batching into Burn tensors
//! - Shuffled, prefetched batch streams

pub mod batcher;
pub mod idx;
pub mod loader;
pub mod mnist;

pub use batcher::{MnistBatch, MnistBatcher};
pub use loader::{BatchLoader, BatchStream};
pub use mnist::{MnistSample, MnistSource, MnistSplit, MnistSplits};

/// Image width in pixels
pub const IMAGE_WIDTH: usize = 28;

/// Image height in pixels
pub const IMAGE_HEIGHT: usize = 28;

/// Pixels per image
pub const IMAGE_PIXELS: usize = IMAGE_WIDTH * IMAGE_HEIGHT;

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::Path;

    use super::{MnistSplit, IMAGE_HEIGHT, IMAGE_PIXELS, IMAGE_WIDTH};

    /// `n` images of repeating byte ramps, labels cycling 0-9
    pub fn synthetic_raw(n: usize) -> (Vec<u8>, Vec<u8>) {
        let images = (0..n * IMAGE_PIXELS).map(|i| (i % 256) as u8).collect();
        let labels = (0..n).map(|i| (i % 10) as u8).collect();
        (images, labels)
    }

    pub fn synthetic_split(n: usize) -> MnistSplit {
        let (images, labels) = synthetic_raw(n);
        MnistSplit::from_raw(&images, &labels).unwrap()
    }

    /// Write a matching IDX image/label pair of `n` samples into `dir`
    pub fn write_idx_pair(dir: &Path, images_name: &str, labels_name: &str, n: usize) {
        let (pixels, labels) = synthetic_raw(n);

        let mut images = 2051u32.to_be_bytes().to_vec();
        for dim in [n, IMAGE_HEIGHT, IMAGE_WIDTH] {
            images.extend((dim as u32).to_be_bytes());
        }
        images.extend(pixels);
        std::fs::write(dir.join(images_name), images).unwrap();

        let mut label_bytes = 2049u32.to_be_bytes().to_vec();
        label_bytes.extend((n as u32).to_be_bytes());
        label_bytes.extend(labels);
        std::fs::write(dir.join(labels_name), label_bytes).unwrap();
    }
}
