//! Session coordinator: engine lifecycle plus single-flight classification.
//!
//! [`SessionCoordinator`] is the core of the crate. It owns at most one live
//! [`ClassifierEngine`], rebuilds it lazily after a configuration change, and
//! exposes a single classify-one-frame operation:
//!
//! 1. Build the engine from the stored configuration if none is live
//! 2. Normalize the frame's orientation and convert to the engine's tensor
//! 3. Run inference, wall-clocking only the inference call
//! 4. Filter by score threshold, rank descending (stable), cap the count
//!
//! The coordinator is `Send` but deliberately not shared: exactly one owner
//! drives it, which serializes `classify` against `configure` without a lock.
//! Cross-thread use goes through [`ClassifyWorker`](crate::worker::ClassifyWorker),
//! which owns a coordinator on its dedicated inference thread.
//!
//! # Example
//!
//! ```rust
//! use framesense_core::testing::MockProvider;
//! use framesense_core::{Category, EngineConfig, Frame, Rotation, SessionCoordinator};
//!
//! let provider = MockProvider::new().with_candidates(vec![Category::new("cat", 0.9)]);
//! let mut session = SessionCoordinator::new(EngineConfig::default(), Box::new(provider))?;
//!
//! let frame = Frame::new(vec![0u8; 8 * 8 * 4], 8, 8, Rotation::Deg0);
//! let outcome = session.classify(&frame)?;
//! assert_eq!(outcome.categories[0].label, "cat");
//! # Ok::<(), framesense_core::ClassifyError>(())
//! ```

use crate::config::EngineConfig;
use crate::engine::{Category, ClassifierEngine, EngineProvider};
use crate::error::{ClassifyError, ClassifyResult};
use crate::frame::Frame;
use crate::preprocess;
use std::time::{Duration, Instant};

/// Coordinator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live engine; the next classify call will build one
    Uninitialized,
    /// Engine built and ready for frames
    Ready,
}

/// Outcome of one classify call.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Categories above the score threshold, descending by score, capped at
    /// the configured maximum; may be empty
    pub categories: Vec<Category>,
    /// Wall-clock duration of the inference call (preprocessing excluded)
    pub inference_time: Duration,
}

/// Owns the current engine and serializes classification against
/// configuration changes.
pub struct SessionCoordinator {
    config: EngineConfig,
    engine: Option<Box<dyn ClassifierEngine>>,
    provider: Box<dyn EngineProvider>,
}

impl SessionCoordinator {
    /// Creates a coordinator with the given configuration and engine provider.
    ///
    /// No engine is built yet - construction is deferred to the first
    /// [`classify`](Self::classify) call.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] if the configuration is invalid.
    pub fn new(config: EngineConfig, provider: Box<dyn EngineProvider>) -> ClassifyResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine: None,
            provider,
        })
    }

    /// Replaces the configuration and drops the current engine.
    ///
    /// The engine is *not* rebuilt here: rapid configuration changes cost
    /// nothing, and backends that must initialize on the consuming thread get
    /// to do so inside the next [`classify`](Self::classify) call.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] if the new configuration is invalid;
    /// the stored configuration and engine are left untouched in that case.
    pub fn configure(&mut self, config: EngineConfig) -> ClassifyResult<()> {
        config.validate()?;
        log::debug!(
            "configuration replaced ({} / {} / {} threads), engine invalidated",
            config.model,
            config.acceleration,
            config.num_threads
        );
        self.config = config;
        self.engine = None;
        Ok(())
    }

    /// Drops the current engine, releasing acceleration resources.
    ///
    /// Idempotent; the coordinator returns to [`SessionState::Uninitialized`]
    /// and rebuilds on the next classify call.
    pub fn invalidate(&mut self) {
        if self.engine.take().is_some() {
            log::debug!("engine invalidated");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.engine.is_some() {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classifies one frame.
    ///
    /// Builds the engine first if none is live. An engine-construction
    /// failure leaves the coordinator uninitialized so the next call retries;
    /// an inference failure keeps the engine alive.
    ///
    /// # Errors
    ///
    /// - [`ClassifyError::EngineInit`] / [`ClassifyError::UnsupportedAcceleration`]
    ///   when engine construction fails
    /// - [`ClassifyError::InvalidFrame`] when the buffer contradicts its metadata
    /// - [`ClassifyError::Inference`] when the engine fails mid-call
    pub fn classify(&mut self, frame: &Frame) -> ClassifyResult<Classification> {
        if self.engine.is_none() {
            let built = self
                .provider
                .build(&self.config)
                .map_err(ClassifyError::engine_init)?;
            log::info!("engine {} ready", built.name());
            self.engine = Some(built);
        }
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| ClassifyError::EngineInit("engine slot empty".to_string()))?;

        let upright = preprocess::normalize_orientation(frame)?;
        let (width, height) = engine.input_size();
        let tensor = preprocess::to_input_tensor(&upright, width, height);

        let started = Instant::now();
        let candidates = engine.infer(&tensor).map_err(ClassifyError::inference)?;
        let inference_time = started.elapsed();

        let categories = rank_categories(
            candidates,
            self.config.score_threshold,
            self.config.max_results,
        );

        Ok(Classification {
            categories,
            inference_time,
        })
    }
}

/// Threshold filter, stable descending sort, result cap - in that order, so
/// the cap keeps the highest-scoring candidates.
fn rank_categories(mut candidates: Vec<Category>, threshold: f32, cap: usize) -> Vec<Category> {
    candidates.retain(|category| category.score >= threshold);
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(cap);
    candidates
}
