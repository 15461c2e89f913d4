//! Unified error types for the framesense-core public API.
//!
//! Internal modules use their own error types (notably [`EngineError`] in the
//! engine layer) and convert to [`ClassifyError`] at the session boundary.
//!
//! # Error Hierarchy
//!
//! ```text
//! ClassifyError
//! ├── EngineInit(String)                   -- model load / backend setup failed (transient)
//! ├── UnsupportedAcceleration(mode)        -- requested backend unavailable on this device
//! ├── Inference(String)                    -- the engine failed during a classify call
//! ├── InvalidFrame(String)                 -- frame buffer inconsistent with its metadata
//! ├── Config(String)                       -- configuration value out of range
//! ├── SessionClosed                        -- worker already shut down
//! └── Io(std::io::Error)                   -- I/O errors
//! ```

use crate::config::AccelerationMode;
use crate::engine::EngineError;
use thiserror::Error;

/// The canonical error type for the framesense-core public API.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Engine construction failed (model load or acceleration-backend setup).
    ///
    /// Transient: the coordinator stays uninitialized and retries construction
    /// on the next classify call.
    #[error("engine initialization failed: {0}")]
    EngineInit(String),

    /// The requested acceleration backend is unavailable on this device.
    #[error("{0} acceleration is not available on this device")]
    UnsupportedAcceleration(AccelerationMode),

    /// The engine raised an error during a classify call.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Frame buffer does not match its declared dimensions.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The worker has been shut down; no further frames are accepted.
    #[error("session is shut down")]
    SessionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for framesense-core.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

// ─────────────────────────────────────────────────────────────────────────────
// Conversions from the engine-level error
// ─────────────────────────────────────────────────────────────────────────────

impl ClassifyError {
    /// Maps an engine error raised during engine *construction*.
    ///
    /// There is deliberately no blanket `From<EngineError>`: the same engine
    /// error maps differently depending on whether it happened while building
    /// the engine or while running inference.
    pub fn engine_init(err: EngineError) -> Self {
        match err {
            EngineError::UnsupportedAcceleration(mode) => {
                ClassifyError::UnsupportedAcceleration(mode)
            }
            other => ClassifyError::EngineInit(other.to_string()),
        }
    }

    /// Maps an engine error raised during *inference*.
    pub fn inference(err: EngineError) -> Self {
        ClassifyError::Inference(err.to_string())
    }

    /// Create an invalid-frame error.
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        ClassifyError::InvalidFrame(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        ClassifyError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ClassifyError::EngineInit("model file unreadable".to_string());
        assert_eq!(
            err.to_string(),
            "engine initialization failed: model file unreadable"
        );

        let err = ClassifyError::UnsupportedAcceleration(AccelerationMode::Gpu);
        assert_eq!(
            err.to_string(),
            "gpu acceleration is not available on this device"
        );

        assert_eq!(
            ClassifyError::SessionClosed.to_string(),
            "session is shut down"
        );
    }

    #[test]
    fn test_engine_init_mapping_preserves_unsupported_acceleration() {
        let err = ClassifyError::engine_init(EngineError::UnsupportedAcceleration(
            AccelerationMode::Npu,
        ));
        assert!(matches!(
            err,
            ClassifyError::UnsupportedAcceleration(AccelerationMode::Npu)
        ));

        let err = ClassifyError::engine_init(EngineError::ModelNotFound("x.onnx".to_string()));
        assert!(matches!(err, ClassifyError::EngineInit(_)));
    }

    #[test]
    fn test_inference_mapping() {
        let err = ClassifyError::inference(EngineError::Inference("runtime crash".to_string()));
        assert!(matches!(err, ClassifyError::Inference(_)));
    }
}
