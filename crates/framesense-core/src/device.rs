//! Hardware acceleration availability detection.
//!
//! Gates are deliberately conservative: a mode is reported available only
//! when the matching execution provider is compiled in *and* the platform can
//! actually host it. The ONNX provider consults this module before building a
//! session so an unavailable backend becomes an explicit error instead of a
//! silent CPU fallback.
//!
//! | Mode | Backing | Available when |
//! |------|---------|----------------|
//! | Cpu  | ONNX Runtime CPU | always |
//! | Gpu  | CoreML (GPU compute units) | `coreml-ep` feature on macOS/iOS |
//! | Npu  | CoreML (Neural Engine) | `coreml-ep` feature on macOS/iOS |

use crate::config::AccelerationMode;

/// Returns whether the given acceleration mode can be used on this device.
pub fn acceleration_available(mode: AccelerationMode) -> bool {
    match mode {
        AccelerationMode::Cpu => true,
        AccelerationMode::Gpu => gpu_available(),
        AccelerationMode::Npu => npu_available(),
    }
}

#[cfg(all(feature = "coreml-ep", any(target_os = "macos", target_os = "ios")))]
fn gpu_available() -> bool {
    true
}

#[cfg(not(all(feature = "coreml-ep", any(target_os = "macos", target_os = "ios"))))]
fn gpu_available() -> bool {
    false
}

#[cfg(all(feature = "coreml-ep", any(target_os = "macos", target_os = "ios")))]
fn npu_available() -> bool {
    true
}

#[cfg(not(all(feature = "coreml-ep", any(target_os = "macos", target_os = "ios"))))]
fn npu_available() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_is_always_available() {
        assert!(acceleration_available(AccelerationMode::Cpu));
    }

    #[cfg(not(feature = "coreml-ep"))]
    #[test]
    fn test_hardware_modes_unavailable_without_execution_provider() {
        assert!(!acceleration_available(AccelerationMode::Gpu));
        assert!(!acceleration_available(AccelerationMode::Npu));
    }
}
