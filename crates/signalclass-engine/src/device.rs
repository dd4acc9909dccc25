//! Device selection

use candle_core::Device;
use signalclass_core::{DeviceKind, Error, Result};

/// Resolve the candle device an engine binds to.
///
/// An explicit override is honored or fails; without one the first
/// available GPU backend is used, falling back to CPU.
pub fn resolve_device(requested: Option<DeviceKind>) -> Result<Device> {
    match requested {
        Some(DeviceKind::Cpu) => Ok(Device::Cpu),
        Some(DeviceKind::Gpu) => create_gpu().ok_or_else(|| {
            Error::model_load("GPU requested but no CUDA or Metal device is available")
        }),
        None => Ok(create_gpu().unwrap_or(Device::Cpu)),
    }
}

/// Classify a candle device back into the coarse kind exposed to callers
pub fn device_kind(device: &Device) -> DeviceKind {
    if device.is_cpu() {
        DeviceKind::Cpu
    } else {
        DeviceKind::Gpu
    }
}

fn create_gpu() -> Option<Device> {
    if candle_core::utils::cuda_is_available() {
        match Device::new_cuda(0) {
            Ok(device) => return Some(device),
            Err(e) => tracing::warn!("CUDA reported available but failed to initialize: {}", e),
        }
    }

    if candle_core::utils::metal_is_available() {
        match Device::new_metal(0) {
            Ok(device) => return Some(device),
            Err(e) => tracing::warn!("Metal reported available but failed to initialize: {}", e),
        }
    }

    None
}
