//! Engine module - the seam between the coordinator and inference backends.
//!
//! The [`ClassifierEngine`] trait abstracts one loaded model bound to one
//! configuration; the [`EngineProvider`] trait abstracts how such an engine is
//! built. The session coordinator only ever talks to these traits, which is
//! what lets tests substitute mock engines and lets hosts plug in a different
//! runtime without touching the coordination logic.
//!
//! # Module Organization
//!
//! - `onnx` - ONNX Runtime backend (the concrete engine shipped with the crate)

use crate::config::{AccelerationMode, EngineConfig};
use ndarray::ArrayD;
use thiserror::Error;

pub mod onnx;

pub use onnx::{OnnxClassifier, OnnxEngineProvider};

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("{0} acceleration is not available on this device")]
    UnsupportedAcceleration(AccelerationMode),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// One classification candidate: a label and its confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Human-readable class label
    pub label: String,
    /// Confidence score in `[0, 1]`
    pub score: f32,
}

impl Category {
    /// Creates a category.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A loaded classifier bound to exactly one configuration.
///
/// Engines are never reconfigured in place - a configuration change destroys
/// the engine and a new one is built from the new configuration. `infer`
/// takes `&mut self` because backends may mutate internal session state; the
/// coordinator guarantees at most one call executes at a time.
pub trait ClassifierEngine: Send {
    /// Returns the name of the engine (e.g. "onnx/mobilenet-v1").
    fn name(&self) -> &str;

    /// Input resolution (width, height) this engine expects.
    fn input_size(&self) -> (u32, u32);

    /// Runs inference on an upright NCHW f32 tensor.
    ///
    /// Returns every candidate the model produced, unfiltered and in model
    /// output order - threshold filtering and ranking are the coordinator's
    /// responsibility.
    fn infer(&mut self, input: &ArrayD<f32>) -> EngineResult<Vec<Category>>;
}

/// Builds engines from configurations.
///
/// Implementations must be cheap to keep around; all expensive work (model
/// load, backend setup) belongs in `build`, which the coordinator defers
/// until a frame actually needs the engine.
pub trait EngineProvider: Send {
    /// Builds a new engine for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedAcceleration`] if the requested
    /// backend is unavailable on this device, or another variant if the model
    /// cannot be loaded.
    fn build(&self, config: &EngineConfig) -> EngineResult<Box<dyn ClassifierEngine>>;
}
