//! Batch loader with per-epoch shuffling and background prefetch
//!
//! Each call to [`BatchLoader::iter`] plans one epoch of index chunks, then a
//! worker thread turns the chunks into tensors ahead of the consumer. The
//! channel is bounded, so at most `prefetch` batches wait in memory. A panic
//! in the worker is re-raised on the consuming thread.

use std::sync::Arc;
use std::panic;
use std::thread::{self, JoinHandle};

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use crossbeam_channel::{bounded, Receiver};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use super::{MnistBatch, MnistBatcher, MnistSample, MnistSplit};

/// Epoch-by-epoch batch source over a cached split
pub struct BatchLoader<B: Backend> {
    split: MnistSplit,
    batcher: MnistBatcher<B>,
    batch_size: usize,
    prefetch: usize,
    rng: Option<ChaCha8Rng>,
}

impl<B: Backend> BatchLoader<B> {
    /// Sequential loader, one batch prefetched
    pub fn new(split: MnistSplit, batcher: MnistBatcher<B>, batch_size: usize) -> Self {
        Self {
            split,
            batcher,
            batch_size: batch_size.max(1),
            prefetch: 1,
            rng: None,
        }
    }

    /// Reshuffle the whole split every epoch
    pub fn shuffled(mut self, seed: u64) -> Self {
        self.rng = Some(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    pub fn with_prefetch(mut self, depth: usize) -> Self {
        self.prefetch = depth.max(1);
        self
    }

    /// Number of batches per epoch
    pub fn len(&self) -> usize {
        self.split.num_batches(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index chunks for the next epoch
    pub fn plan_epoch(&mut self) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..self.split.len()).collect();
        if let Some(rng) = self.rng.as_mut() {
            indices.shuffle(rng);
        }
        indices
            .chunks(self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }

    /// Start streaming the next epoch
    pub fn iter(&mut self) -> BatchStream<B> {
        let plan = self.plan_epoch();
        BatchStream::spawn(plan, self.split.samples(), self.batcher.clone(), self.prefetch)
    }
}

/// Batches of one epoch, assembled by a background worker
pub struct BatchStream<B: Backend> {
    receiver: Receiver<MnistBatch<B>>,
    remaining: usize,
    worker: Option<JoinHandle<()>>,
}

impl<B: Backend> BatchStream<B> {
    fn spawn(
        plan: Vec<Vec<usize>>,
        samples: Arc<Vec<MnistSample>>,
        batcher: MnistBatcher<B>,
        prefetch: usize,
    ) -> Self {
        let (sender, receiver) = bounded(prefetch);
        let remaining = plan.len();

        let worker = thread::spawn(move || {
            for (index, chunk) in plan.into_iter().enumerate() {
                let items: Vec<_> = chunk.iter().map(|&i| samples[i].clone()).collect();
                if sender.send(batcher.batch(items)).is_err() {
                    trace!("Batch stream dropped after {} batches", index);
                    break;
                }
            }
        });

        Self {
            receiver,
            remaining,
            worker: Some(worker),
        }
    }
}

impl<B: Backend> Iterator for BatchStream<B> {
    type Item = MnistBatch<B>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match self.receiver.recv() {
            Ok(batch) => {
                self.remaining -= 1;
                Some(batch)
            }
            Err(_) => {
                // the worker hung up early
                if let Some(Err(payload)) = self.worker.take().map(JoinHandle::join) {
                    panic::resume_unwind(payload);
                }
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<B: Backend> ExactSizeIterator for BatchStream<B> {}
