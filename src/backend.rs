//! Backend selection - NdArray on CPU, CUDA on GPU
//!
//! The device kind and GPU index come from the command line. GPUs are
//! enumerated before any backend is touched so that a bad index is reported
//! as a configuration error instead of a runtime failure deep inside Burn.

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utils::error::{BenchError, Result};

/// CPU inference backend
pub type CpuBackend = NdArray<f32>;

/// CPU training backend
pub type CpuTrainingBackend = Autodiff<CpuBackend>;

/// GPU inference backend
#[cfg(feature = "cuda")]
pub type GpuBackend = burn_cuda::Cuda;

/// GPU training backend
#[cfg(feature = "cuda")]
pub type GpuTrainingBackend = Autodiff<GpuBackend>;

/// The only CPU device
pub fn cpu_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

/// CUDA device for an enumerated GPU index
#[cfg(feature = "cuda")]
pub fn gpu_device(index: usize) -> burn_cuda::CudaDevice {
    burn_cuda::CudaDevice::new(index)
}

/// Whether this binary was compiled with a GPU backend
pub fn has_gpu_backend() -> bool {
    cfg!(feature = "cuda")
}

/// Device kind requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Gpu,
    Cpu,
}

/// A GPU reported by the probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub index: usize,
    pub name: String,
    /// Total memory in MB, when the probe reports it
    pub memory_total_mb: Option<f64>,
}

/// Resolved execution device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComputeDevice {
    Cpu,
    Gpu(GpuInfo),
}

impl std::fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeDevice::Cpu => write!(f, "CPU"),
            ComputeDevice::Gpu(gpu) => write!(f, "GPU:{} ({})", gpu.index, gpu.name),
        }
    }
}

/// Source of the GPU device list
pub trait GpuProbe {
    fn list_gpus(&self) -> Vec<GpuInfo>;
}

/// Enumerates NVIDIA GPUs through `nvidia-smi`
#[derive(Debug, Clone, Copy, Default)]
pub struct NvidiaSmi;

impl GpuProbe for NvidiaSmi {
    fn list_gpus(&self) -> Vec<GpuInfo> {
        let output = match std::process::Command::new("nvidia-smi")
            .args([
                "--query-gpu=index,name,memory.total",
                "--format=csv,noheader,nounits",
            ])
            .output()
        {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                debug!("nvidia-smi exited with {}", output.status);
                return Vec::new();
            }
            Err(e) => {
                debug!("nvidia-smi unavailable: {}", e);
                return Vec::new();
            }
        };

        parse_gpu_list(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `index, name, memory.total` CSV rows
pub fn parse_gpu_list(csv: &str) -> Vec<GpuInfo> {
    csv.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 2 {
                return None;
            }
            let index = parts[0].parse().ok()?;
            Some(GpuInfo {
                index,
                name: parts[1].to_string(),
                memory_total_mb: parts.get(2).and_then(|m| m.parse().ok()),
            })
        })
        .collect()
}

/// Resolve the requested device against the enumerated GPUs
pub fn resolve_device(kind: DeviceKind, gpu_index: usize, probe: &dyn GpuProbe) -> Result<ComputeDevice> {
    match kind {
        DeviceKind::Cpu => {
            info!("Using CPU backend");
            Ok(ComputeDevice::Cpu)
        }
        DeviceKind::Gpu => {
            let gpus = probe.list_gpus();
            if gpus.is_empty() {
                return Err(BenchError::NoGpu);
            }
            if gpu_index >= gpus.len() {
                return Err(BenchError::GpuNotFound {
                    index: gpu_index,
                    available: gpus.len(),
                });
            }

            let gpu = gpus[gpu_index].clone();
            info!("Using GPU {}: {}", gpu.index, gpu.name);
            // cubecl's memory pool grows on demand, nothing is reserved up front
            debug!("GPU memory is allocated on demand");
            Ok(ComputeDevice::Gpu(gpu))
        }
    }
}
