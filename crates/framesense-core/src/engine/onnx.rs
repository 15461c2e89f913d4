//! ONNX Runtime classifier backend.
//!
//! This module provides the concrete [`ClassifierEngine`] shipped with the
//! crate:
//! - Resolves a [`ModelVariant`](crate::config::ModelVariant) to a model file
//!   and label table inside a model directory
//! - Builds an ONNX Runtime session with the configured execution provider
//!   and intra-op thread count
//! - Runs inference and converts logits to labeled, softmax-normalized
//!   candidates
//!
//! Acceleration is checked *before* session construction: requesting a
//! backend that is compiled out or absent on this device yields
//! [`EngineError::UnsupportedAcceleration`] instead of ONNX Runtime's silent
//! CPU fallback.

use super::{Category, ClassifierEngine, EngineError, EngineProvider, EngineResult};
use crate::config::{AccelerationMode, EngineConfig};
use crate::device;
use ndarray::ArrayD;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Builds [`OnnxClassifier`] engines out of a model directory.
///
/// The directory is expected to contain one `.onnx` file per
/// [`ModelVariant`](crate::config::ModelVariant) plus a shared `labels.txt`
/// (one label per line, line index = class index).
pub struct OnnxEngineProvider {
    model_dir: PathBuf,
}

impl OnnxEngineProvider {
    /// Creates a provider rooted at the given model directory.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

impl EngineProvider for OnnxEngineProvider {
    fn build(&self, config: &EngineConfig) -> EngineResult<Box<dyn ClassifierEngine>> {
        Ok(Box::new(OnnxClassifier::from_config(
            &self.model_dir,
            config,
        )?))
    }
}

/// ONNX Runtime classifier engine.
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    labels: Vec<String>,
    input_size: (u32, u32),
    name: String,
}

impl OnnxClassifier {
    /// Loads the configured model variant and builds an inference session.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The requested acceleration backend is unavailable on this device
    /// - The model or label file is missing or unreadable
    /// - Session creation or execution-provider setup fails
    pub fn from_config(model_dir: &Path, config: &EngineConfig) -> EngineResult<Self> {
        if !device::acceleration_available(config.acceleration) {
            return Err(EngineError::UnsupportedAcceleration(config.acceleration));
        }

        let model_path = model_dir.join(config.model.model_file());
        if !model_path.exists() {
            return Err(EngineError::ModelNotFound(
                model_path.display().to_string(),
            ));
        }

        let labels = load_labels(&model_dir.join(config.model.labels_file()))?;

        // Initialize ONNX Runtime environment (singleton, safe to call multiple times)
        let _ = ort::init().commit();

        let mut builder = Session::builder()
            .map_err(|e| EngineError::Runtime(format!("failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EngineError::Runtime(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| EngineError::Runtime(format!("failed to set thread count: {e}")))?;

        builder = configure_acceleration(builder, config.acceleration)?;

        let session = builder
            .commit_from_file(&model_path)
            .map_err(|e| EngineError::Runtime(format!("failed to load ONNX model: {e}")))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| EngineError::InvalidInput("model declares no inputs".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| EngineError::InvalidInput("model declares no outputs".to_string()))?;

        let name = format!("onnx/{}", config.model);
        log::info!(
            "loaded {} with {} acceleration, {} threads, {} labels",
            name,
            config.acceleration,
            config.num_threads,
            labels.len()
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            labels,
            input_size: config.model.input_size(),
            name,
        })
    }

    fn label_for(&self, class_index: usize) -> String {
        self.labels
            .get(class_index)
            .cloned()
            .unwrap_or_else(|| format!("class {class_index}"))
    }
}

impl ClassifierEngine for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    fn infer(&mut self, input: &ArrayD<f32>) -> EngineResult<Vec<Category>> {
        use ort::session::SessionInputs;

        let value = Value::from_array(input.clone())
            .map_err(|e| EngineError::InvalidInput(format!("failed to convert tensor: {e}")))?;

        let inputs: Vec<(std::borrow::Cow<'_, str>, ort::session::SessionInputValue<'_>)> =
            vec![(std::borrow::Cow::Owned(self.input_name.clone()), value.into())];

        let outputs = self
            .session
            .run(SessionInputs::from(inputs))
            .map_err(|e| EngineError::Inference(format!("ONNX Runtime inference failed: {e}")))?;

        let scores = {
            let logits = outputs[self.output_name.as_str()]
                .try_extract_array::<f32>()
                .map_err(|e| EngineError::Inference(format!("failed to extract output: {e}")))?;

            softmax(&logits.iter().copied().collect::<Vec<f32>>())
        };
        drop(outputs);

        Ok(scores
            .iter()
            .enumerate()
            .map(|(class_index, &score)| Category::new(self.label_for(class_index), score))
            .collect())
    }
}

/// Configures the execution provider on the session builder.
fn configure_acceleration(
    builder: ort::session::builder::SessionBuilder,
    mode: AccelerationMode,
) -> EngineResult<ort::session::builder::SessionBuilder> {
    match mode {
        AccelerationMode::Cpu => Ok(builder),

        #[cfg(feature = "coreml-ep")]
        AccelerationMode::Gpu => {
            use ort::ep;

            let coreml_ep = ep::CoreML::default()
                .with_subgraphs(true)
                .with_compute_units(ep::coreml::ComputeUnits::CPUAndGPU)
                .build();

            log::debug!("configuring CoreML execution provider (GPU compute units)");
            builder.with_execution_providers([coreml_ep]).map_err(|e| {
                EngineError::Runtime(format!("failed to configure GPU execution provider: {e}"))
            })
        }

        #[cfg(feature = "coreml-ep")]
        AccelerationMode::Npu => {
            use ort::ep;

            let coreml_ep = ep::CoreML::default()
                .with_subgraphs(true)
                .with_compute_units(ep::coreml::ComputeUnits::CPUAndNeuralEngine)
                .build();

            log::debug!("configuring CoreML execution provider (Neural Engine compute units)");
            builder.with_execution_providers([coreml_ep]).map_err(|e| {
                EngineError::Runtime(format!("failed to configure NPU execution provider: {e}"))
            })
        }

        // Unreachable in practice: device::acceleration_available() rejects
        // these modes before session construction when the feature is off.
        #[cfg(not(feature = "coreml-ep"))]
        AccelerationMode::Gpu | AccelerationMode::Npu => {
            Err(EngineError::UnsupportedAcceleration(mode))
        }
    }
}

/// Softmax over raw logits.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 {
        return vec![0.0; logits.len()];
    }
    exps.iter().map(|&v| v / sum).collect()
}

/// Loads a label table: one label per line, line index = class index.
fn load_labels(path: &Path) -> EngineResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        EngineError::Runtime(format!("failed to read labels from {}: {e}", path.display()))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
