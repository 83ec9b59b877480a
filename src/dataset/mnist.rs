//! MNIST samples and in-memory splits
//!
//! Both sources (Burn's downloader and local IDX files) end up in the same
//! cached representation: a normalized `f32` pixel buffer per sample.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use burn::data::dataset::vision::MnistDataset;
use burn::data::dataset::Dataset;
use rayon::prelude::*;
use tracing::info;

use super::idx;
use super::{IMAGE_HEIGHT, IMAGE_PIXELS, IMAGE_WIDTH};
use crate::utils::error::{BenchError, Result};

/// A single normalized MNIST image with its class label
#[derive(Clone, Debug, PartialEq)]
pub struct MnistSample {
    /// Row-major pixels in [0, 1], `IMAGE_PIXELS` long
    pub pixels: Vec<f32>,
    /// Class label (0-9)
    pub label: u8,
}

impl MnistSample {
    /// Build a sample from raw 0-255 intensities
    pub fn from_bytes(bytes: &[u8], label: u8) -> Self {
        Self {
            pixels: bytes.iter().map(|&b| b as f32 / 255.0).collect(),
            label,
        }
    }
}

/// A decoded split held in memory
#[derive(Clone, Debug)]
pub struct MnistSplit {
    samples: Arc<Vec<MnistSample>>,
}

impl MnistSplit {
    pub fn new(samples: Vec<MnistSample>) -> Self {
        Self {
            samples: Arc::new(samples),
        }
    }

    /// Normalize raw images in parallel
    ///
    /// `images` is `labels.len() * IMAGE_PIXELS` bytes.
    pub fn from_raw(images: &[u8], labels: &[u8]) -> Result<Self> {
        if images.len() != labels.len() * IMAGE_PIXELS {
            return Err(BenchError::Dataset(format!(
                "{} image bytes do not match {} labels",
                images.len(),
                labels.len()
            )));
        }

        let samples = images
            .par_chunks_exact(IMAGE_PIXELS)
            .zip(labels.par_iter())
            .map(|(bytes, &label)| MnistSample::from_bytes(bytes, label))
            .collect();

        Ok(Self::new(samples))
    }

    /// Shared handle to the cached samples
    pub fn samples(&self) -> Arc<Vec<MnistSample>> {
        Arc::clone(&self.samples)
    }

    /// Number of batches of `batch_size` needed to cover the split
    pub fn num_batches(&self, batch_size: usize) -> usize {
        self.samples.len().div_ceil(batch_size)
    }
}

impl Dataset<MnistSample> for MnistSplit {
    fn get(&self, index: usize) -> Option<MnistSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Where the MNIST data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum MnistSource {
    /// Burn's vision dataset (downloaded and cached on first use)
    Download,
    /// A directory holding the four uncompressed IDX files
    IdxDir(PathBuf),
}

/// Training and test splits
#[derive(Clone, Debug)]
pub struct MnistSplits {
    pub train: MnistSplit,
    pub test: MnistSplit,
}

impl MnistSplits {
    pub fn load(source: &MnistSource) -> Result<Self> {
        let splits = match source {
            MnistSource::Download => Self::from_burn_vision()?,
            MnistSource::IdxDir(dir) => Self::from_idx_dir(dir)?,
        };

        info!(
            "Loaded MNIST: {} training / {} test samples",
            splits.train.len(),
            splits.test.len()
        );
        Ok(splits)
    }

    /// Fetch through `burn::data::dataset::vision::MnistDataset`
    pub fn from_burn_vision() -> Result<Self> {
        info!("Fetching MNIST through the Burn dataset cache");
        Ok(Self {
            train: split_from_burn(&MnistDataset::train())?,
            test: split_from_burn(&MnistDataset::test())?,
        })
    }

    /// Read `train-*` and `t10k-*` IDX files from a directory
    pub fn from_idx_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(BenchError::Dataset(format!(
                "MNIST directory not found: {}",
                dir.display()
            )));
        }
        info!("Reading MNIST IDX files from {}", dir.display());

        let load = |images: &str, labels: &str| -> Result<MnistSplit> {
            let (rows, cols, pixels) = idx::read_images(&dir.join(images))?;
            if (rows, cols) != (IMAGE_HEIGHT, IMAGE_WIDTH) {
                return Err(BenchError::Dataset(format!(
                    "{} holds {}x{} images, expected {}x{}",
                    images, rows, cols, IMAGE_HEIGHT, IMAGE_WIDTH
                )));
            }
            let labels = idx::read_labels(&dir.join(labels))?;
            MnistSplit::from_raw(&pixels, &labels)
        };

        Ok(Self {
            train: load(idx::TRAIN_IMAGES, idx::TRAIN_LABELS)?,
            test: load(idx::TEST_IMAGES, idx::TEST_LABELS)?,
        })
    }
}

fn split_from_burn(dataset: &MnistDataset) -> Result<MnistSplit> {
    let len = dataset.len();
    let mut images = Vec::with_capacity(len * IMAGE_PIXELS);
    let mut labels = Vec::with_capacity(len);

    for index in 0..len {
        let item = dataset
            .get(index)
            .ok_or_else(|| BenchError::Dataset(format!("MNIST item {} missing", index)))?;
        // Burn keeps raw 0-255 intensities as f32
        images.extend(item.image.iter().flatten().map(|&p| p as u8));
        labels.push(item.label);
    }

    MnistSplit::from_raw(&images, &labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_util::{synthetic_raw, write_idx_pair};

    #[test]
    fn test_from_bytes_normalizes_to_unit_range() {
        let sample = MnistSample::from_bytes(&[0, 51, 255], 4);
        assert_eq!(sample.pixels, vec![0.0, 0.2, 1.0]);
        assert_eq!(sample.label, 4);
    }

    #[test]
    fn test_from_raw_builds_all_samples() {
        let (images, labels) = synthetic_raw(5);
        let split = MnistSplit::from_raw(&images, &labels).unwrap();

        assert_eq!(split.len(), 5);
        let third = split.get(3).unwrap();
        assert_eq!(third.label, 3);
        assert_eq!(third.pixels.len(), IMAGE_PIXELS);
        assert!(third.pixels.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(split.get(5).is_none());
    }

    #[test]
    fn test_from_raw_rejects_mismatched_lengths() {
        let (images, _) = synthetic_raw(2);
        let err = MnistSplit::from_raw(&images, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, BenchError::Dataset(_)));
    }

    #[test]
    fn test_num_batches_rounds_up() {
        let (images, labels) = synthetic_raw(10);
        let split = MnistSplit::from_raw(&images, &labels).unwrap();
        assert_eq!(split.num_batches(4), 3);
        assert_eq!(split.num_batches(5), 2);
        assert_eq!(split.num_batches(128), 1);
    }

    #[test]
    fn test_missing_idx_dir() {
        let err = MnistSplits::from_idx_dir(Path::new("/nonexistent/mnist")).unwrap_err();
        assert!(matches!(err, BenchError::Dataset(_)));
    }

    #[test]
    fn test_load_idx_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_idx_pair(dir.path(), idx::TRAIN_IMAGES, idx::TRAIN_LABELS, 6);
        write_idx_pair(dir.path(), idx::TEST_IMAGES, idx::TEST_LABELS, 2);

        let splits = MnistSplits::load(&MnistSource::IdxDir(dir.path().to_path_buf())).unwrap();
        assert_eq!(splits.train.len(), 6);
        assert_eq!(splits.test.len(), 2);
        assert_eq!(splits.test.get(1).unwrap().label, 1);
    }
}
