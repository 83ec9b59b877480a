//! Reader for the uncompressed IDX files MNIST is distributed as
//!
//! Layout: big-endian magic, big-endian dimension sizes, then raw `u8` data.

use std::fs;
use std::path::Path;

use crate::utils::error::{BenchError, Result};

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let chunk = bytes.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

fn read_header(path: &Path, bytes: &[u8], magic: u32, dims: usize) -> Result<Vec<usize>> {
    let invalid = |msg: String| BenchError::Idx(path.to_path_buf(), msg);

    let found = read_u32(bytes, 0).ok_or_else(|| invalid("truncated header".into()))?;
    if found != magic {
        return Err(invalid(format!("magic {} (expected {})", found, magic)));
    }

    (0..dims)
        .map(|i| {
            read_u32(bytes, 4 + 4 * i)
                .map(|d| d as usize)
                .ok_or_else(|| invalid("truncated header".into()))
        })
        .collect()
}

fn check_payload(path: &Path, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(BenchError::Idx(
            path.to_path_buf(),
            format!("{} data bytes (expected {})", payload.len(), expected),
        ));
    }
    Ok(())
}

/// Read an image file, returning `(rows, cols, pixels)`
pub fn read_images(path: &Path) -> Result<(usize, usize, Vec<u8>)> {
    let bytes = fs::read(path)?;
    let dims = read_header(path, &bytes, IMAGES_MAGIC, 3)?;
    let (count, rows, cols) = (dims[0], dims[1], dims[2]);

    let expected = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or_else(|| BenchError::Idx(path.to_path_buf(), "dimensions overflow".into()))?;

    let payload = &bytes[16..];
    check_payload(path, payload, expected)?;
    Ok((rows, cols, payload.to_vec()))
}

/// Read a label file
pub fn read_labels(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    let dims = read_header(path, &bytes, LABELS_MAGIC, 1)?;

    let payload = &bytes[8..];
    check_payload(path, payload, dims[0])?;
    Ok(payload.to_vec())
}
