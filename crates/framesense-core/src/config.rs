//! Engine configuration value objects.
//!
//! [`EngineConfig`] describes everything needed to build a classifier engine:
//! model variant, acceleration mode, intra-op thread count, score threshold,
//! and the result-count cap. Configurations are immutable values - changing
//! one means replacing the whole object via [`SessionCoordinator::configure`]
//! (or [`ClassifyWorker::reconfigure`]), never mutating a live engine.
//!
//! [`SessionCoordinator::configure`]: crate::session::SessionCoordinator::configure
//! [`ClassifyWorker::reconfigure`]: crate::worker::ClassifyWorker::reconfigure

use crate::error::{ClassifyError, ClassifyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model variant selection.
///
/// Each variant maps to a model file inside the model directory handed to the
/// ONNX provider; all variants share one ImageNet label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelVariant {
    /// MobileNetV1 (default): smallest and fastest
    MobileNetV1,
    /// EfficientNet-Lite0
    EfficientNetLite0,
    /// EfficientNet-Lite1
    EfficientNetLite1,
    /// EfficientNet-Lite2: largest and most accurate of the set
    EfficientNetLite2,
}

impl ModelVariant {
    /// File name of this variant's model inside the model directory.
    pub fn model_file(&self) -> &'static str {
        match self {
            Self::MobileNetV1 => "mobilenet_v1.onnx",
            Self::EfficientNetLite0 => "efficientnet_lite0.onnx",
            Self::EfficientNetLite1 => "efficientnet_lite1.onnx",
            Self::EfficientNetLite2 => "efficientnet_lite2.onnx",
        }
    }

    /// File name of the label table shared by all variants.
    pub fn labels_file(&self) -> &'static str {
        "labels.txt"
    }

    /// Input resolution (width, height) the variant was trained at.
    pub fn input_size(&self) -> (u32, u32) {
        match self {
            Self::MobileNetV1 => (224, 224),
            Self::EfficientNetLite0 => (224, 224),
            Self::EfficientNetLite1 => (240, 240),
            Self::EfficientNetLite2 => (260, 260),
        }
    }

    /// Parses a variant from a string.
    ///
    /// Accepts: "mobilenet-v1", "efficientnet-lite0", "efficientnet-lite1",
    /// "efficientnet-lite2"
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mobilenet-v1" | "mobilenetv1" => Some(Self::MobileNetV1),
            "efficientnet-lite0" => Some(Self::EfficientNetLite0),
            "efficientnet-lite1" => Some(Self::EfficientNetLite1),
            "efficientnet-lite2" => Some(Self::EfficientNetLite2),
            _ => None,
        }
    }
}

impl Default for ModelVariant {
    fn default() -> Self {
        Self::MobileNetV1
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MobileNetV1 => write!(f, "mobilenet-v1"),
            Self::EfficientNetLite0 => write!(f, "efficientnet-lite0"),
            Self::EfficientNetLite1 => write!(f, "efficientnet-lite1"),
            Self::EfficientNetLite2 => write!(f, "efficientnet-lite2"),
        }
    }
}

/// Hardware acceleration selection for inference.
///
/// Requesting a backend that is unavailable on the current device is an
/// explicit error at engine-construction time - never a silent downgrade
/// to CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccelerationMode {
    /// CPU execution (default, always available)
    Cpu,
    /// Graphics-processor execution
    Gpu,
    /// Neural-accelerator execution
    Npu,
}

impl AccelerationMode {
    /// Returns the name of this acceleration mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Npu => "npu",
        }
    }

    /// Returns whether this mode requires specific hardware.
    pub fn requires_hardware(&self) -> bool {
        !matches!(self, Self::Cpu)
    }

    /// Parses a mode from a string.
    ///
    /// Accepts: "cpu", "gpu", "npu", "neural-engine"
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" => Some(Self::Cpu),
            "gpu" => Some(Self::Gpu),
            "npu" | "neural-engine" => Some(Self::Npu),
            _ => None,
        }
    }
}

impl Default for AccelerationMode {
    fn default() -> Self {
        Self::Cpu
    }
}

impl fmt::Display for AccelerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classifier engine configuration.
///
/// Immutable value object; a new configuration replaces the old one wholesale.
/// Defaults: threshold 0.5, 2 threads, 3 results, CPU execution, MobileNetV1.
///
/// # Example
///
/// ```rust
/// use framesense_core::{AccelerationMode, EngineConfig, ModelVariant};
///
/// let config = EngineConfig::default()
///     .with_score_threshold(0.3)
///     .with_max_results(5)
///     .with_model(ModelVariant::EfficientNetLite0);
/// assert_eq!(config.acceleration, AccelerationMode::Cpu);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model variant to load
    pub model: ModelVariant,
    /// Hardware backend to run inference on
    pub acceleration: AccelerationMode,
    /// Intra-op thread count for the inference runtime (must be > 0)
    pub num_threads: usize,
    /// Minimum score a candidate needs to be reported (in [0, 1], inclusive)
    pub score_threshold: f32,
    /// Maximum number of categories per classification (must be > 0)
    pub max_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: ModelVariant::default(),
            acceleration: AccelerationMode::default(),
            num_threads: 2,
            score_threshold: 0.5,
            max_results: 3,
        }
    }
}

impl EngineConfig {
    /// Replaces the model variant.
    pub fn with_model(mut self, model: ModelVariant) -> Self {
        self.model = model;
        self
    }

    /// Replaces the acceleration mode.
    pub fn with_acceleration(mut self, acceleration: AccelerationMode) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Replaces the thread count.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Replaces the score threshold.
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Replaces the result-count cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Validates all fields, rejecting out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] if the thread count or result cap is
    /// zero, or the score threshold is outside `[0, 1]`.
    pub fn validate(&self) -> ClassifyResult<()> {
        if self.num_threads == 0 {
            return Err(ClassifyError::config("num_threads must be positive"));
        }
        if self.max_results == 0 {
            return Err(ClassifyError::config("max_results must be positive"));
        }
        if !self.score_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.score_threshold)
        {
            return Err(ClassifyError::config(format!(
                "score_threshold must be in [0, 1], got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.model, ModelVariant::MobileNetV1);
        assert_eq!(config.acceleration, AccelerationMode::Cpu);
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.score_threshold, 0.5);
        assert_eq!(config.max_results, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::default()
            .with_model(ModelVariant::EfficientNetLite2)
            .with_acceleration(AccelerationMode::Npu)
            .with_num_threads(4)
            .with_score_threshold(0.25)
            .with_max_results(10);
        assert_eq!(config.model, ModelVariant::EfficientNetLite2);
        assert_eq!(config.acceleration, AccelerationMode::Npu);
        assert_eq!(config.num_threads, 4);
        assert_eq!(config.score_threshold, 0.25);
        assert_eq!(config.max_results, 10);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        assert!(EngineConfig::default()
            .with_num_threads(0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_max_results(0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_score_threshold(-0.1)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_score_threshold(1.5)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_score_threshold(f32::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        assert!(EngineConfig::default()
            .with_score_threshold(0.0)
            .validate()
            .is_ok());
        assert!(EngineConfig::default()
            .with_score_threshold(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_model_variant_files_and_sizes() {
        assert_eq!(ModelVariant::MobileNetV1.model_file(), "mobilenet_v1.onnx");
        assert_eq!(
            ModelVariant::EfficientNetLite1.model_file(),
            "efficientnet_lite1.onnx"
        );
        assert_eq!(ModelVariant::MobileNetV1.input_size(), (224, 224));
        assert_eq!(ModelVariant::EfficientNetLite2.input_size(), (260, 260));
    }

    #[test]
    fn test_parse_round_trips_display() {
        for variant in [
            ModelVariant::MobileNetV1,
            ModelVariant::EfficientNetLite0,
            ModelVariant::EfficientNetLite1,
            ModelVariant::EfficientNetLite2,
        ] {
            assert_eq!(ModelVariant::parse(&variant.to_string()), Some(variant));
        }
        assert_eq!(ModelVariant::parse("resnet50"), None);

        for mode in [
            AccelerationMode::Cpu,
            AccelerationMode::Gpu,
            AccelerationMode::Npu,
        ] {
            assert_eq!(AccelerationMode::parse(&mode.to_string()), Some(mode));
        }
        assert_eq!(AccelerationMode::parse("neural-engine"), Some(AccelerationMode::Npu));
        assert_eq!(AccelerationMode::parse("dsp"), None);
    }

    #[test]
    fn test_acceleration_hardware_requirements() {
        assert!(!AccelerationMode::Cpu.requires_hardware());
        assert!(AccelerationMode::Gpu.requires_hardware());
        assert!(AccelerationMode::Npu.requires_hardware());
    }
}
