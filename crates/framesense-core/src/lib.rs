//! Framesense Core - On-device image classification over a live camera-rate frame stream.
//!
//! ## Module Organization
//!
//! The crate is organized into logical groups:
//!
//! ### Core Coordination
//! - [`session`] - Session coordinator: engine lifecycle + single-flight classification
//! - [`worker`] - Frame dispatch worker: dedicated inference thread, latest-wins backpressure
//!
//! ### Data Types
//! - [`config`] - Engine configuration (model variant, acceleration, thresholds)
//! - [`frame`] - Camera frames and orientation metadata
//!
//! ### Runtime
//! - [`engine`] - Classifier engine trait seam and the ONNX Runtime backend
//! - [`preprocess`] - Orientation normalization and tensor conversion
//! - [`device`] - Hardware acceleration availability checks
//!
//! ### Support
//! - [`error`] - Public API error types
//! - [`testing`] - Mock engines and providers for tests

// ============================================================================
// Core Coordination (SessionCoordinator → ClassifierEngine)
// ============================================================================

/// Session coordinator: owns the engine, rebuilds it lazily, classifies one frame at a time
pub mod session;

/// Frame dispatch worker: single worker thread, one-slot mailbox, event channel
pub mod worker;

// ============================================================================
// Data Types
// ============================================================================

/// Engine configuration value objects
pub mod config;

/// Camera frames and rotation metadata
pub mod frame;

// ============================================================================
// Runtime & Preprocessing
// ============================================================================

/// Classifier engine traits and the ONNX Runtime backend
pub mod engine;

/// Orientation normalization and RGBA-to-tensor conversion
pub mod preprocess;

/// Hardware acceleration availability detection
pub mod device;

// ============================================================================
// Support
// ============================================================================

/// Public API error types
pub mod error;

/// Mock implementations for testing
pub mod testing;

pub use config::{AccelerationMode, EngineConfig, ModelVariant};
pub use engine::{Category, ClassifierEngine, EngineProvider, OnnxEngineProvider};
pub use error::{ClassifyError, ClassifyResult};
pub use frame::{Frame, Rotation};
pub use session::{Classification, SessionCoordinator, SessionState};
pub use worker::{ClassifyWorker, SessionEvent};
