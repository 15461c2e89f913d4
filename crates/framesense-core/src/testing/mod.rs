//! Mock implementations for testing.
//!
//! Provides a mock engine/provider pair that can be used to exercise the
//! session coordinator and the frame dispatch worker without real model
//! files:
//! - Configurable candidate lists and input resolution
//! - Recorded input tensors (for asserting orientation normalization)
//! - Simulated construction and inference failures
//! - An optional gate that holds inference open so tests can interleave
//!   configuration changes with an in-flight classify call
//!
//! # Example
//!
//! ```rust
//! use framesense_core::testing::MockProvider;
//! use framesense_core::Category;
//!
//! let provider = MockProvider::new().with_candidates(vec![Category::new("cat", 0.9)]);
//! provider.fail_next_builds(1);
//! assert_eq!(provider.build_count(), 0);
//! ```

use crate::config::EngineConfig;
use crate::engine::{Category, ClassifierEngine, EngineError, EngineProvider, EngineResult};
use ndarray::ArrayD;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct MockState {
    candidates: Vec<Category>,
    input_size: (u32, u32),
    fail_builds: usize,
    fail_inference: Option<String>,
    gated: bool,
    inferences_started: usize,
    permits: usize,
    builds: usize,
    infer_calls: usize,
    recorded: Vec<ArrayD<f32>>,
}

#[derive(Debug)]
struct MockShared {
    state: Mutex<MockState>,
    signal: Condvar,
}

/// A mock engine provider with shared, inspectable state.
///
/// Clones share the same state, so a test can keep a handle while a worker
/// owns another.
pub struct MockProvider {
    shared: Arc<MockShared>,
}

impl MockProvider {
    /// Creates a provider whose engines report one "mock" candidate at 0.9.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(MockShared {
                state: Mutex::new(MockState {
                    candidates: vec![Category::new("mock", 0.9)],
                    input_size: (8, 8),
                    fail_builds: 0,
                    fail_inference: None,
                    gated: false,
                    inferences_started: 0,
                    permits: 0,
                    builds: 0,
                    infer_calls: 0,
                    recorded: Vec::new(),
                }),
                signal: Condvar::new(),
            }),
        }
    }

    /// Replaces the candidates every engine returns.
    pub fn with_candidates(self, candidates: Vec<Category>) -> Self {
        self.shared.state.lock().unwrap().candidates = candidates;
        self
    }

    /// Replaces the input resolution engines report.
    pub fn with_input_size(self, width: u32, height: u32) -> Self {
        self.shared.state.lock().unwrap().input_size = (width, height);
        self
    }

    /// Gates inference: each `infer` call blocks until [`release`](Self::release)
    /// grants it a permit.
    pub fn gated(self) -> Self {
        self.shared.state.lock().unwrap().gated = true;
        self
    }

    /// Makes the next `count` build attempts fail.
    pub fn fail_next_builds(&self, count: usize) {
        self.shared.state.lock().unwrap().fail_builds = count;
    }

    /// Makes the next inference call fail with the given message.
    pub fn fail_next_inference(&self, message: impl Into<String>) {
        self.shared.state.lock().unwrap().fail_inference = Some(message.into());
    }

    /// Number of successful engine builds so far.
    pub fn build_count(&self) -> usize {
        self.shared.state.lock().unwrap().builds
    }

    /// Number of completed inference calls so far.
    pub fn infer_count(&self) -> usize {
        self.shared.state.lock().unwrap().infer_calls
    }

    /// Clones of every input tensor the engines received.
    pub fn recorded_inputs(&self) -> Vec<ArrayD<f32>> {
        self.shared.state.lock().unwrap().recorded.clone()
    }

    /// Blocks until at least `count` inference calls have started.
    ///
    /// Only meaningful for gated providers. Panics after five seconds to keep
    /// a broken test from hanging forever.
    pub fn wait_for_inference_started(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut state = self.shared.state.lock().unwrap();
        while state.inferences_started < count {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .expect("timed out waiting for inference to start");
            let (guard, _) = self
                .shared
                .signal
                .wait_timeout(state, remaining)
                .unwrap();
            state = guard;
        }
    }

    /// Grants `count` permits to gated inference calls.
    pub fn release(&self, count: usize) {
        let mut state = self.shared.state.lock().unwrap();
        state.permits += count;
        drop(state);
        self.shared.signal.notify_all();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl EngineProvider for MockProvider {
    fn build(&self, _config: &EngineConfig) -> EngineResult<Box<dyn ClassifierEngine>> {
        let mut state = self.shared.state.lock().unwrap();
        if state.fail_builds > 0 {
            state.fail_builds -= 1;
            return Err(EngineError::Runtime("simulated build failure".to_string()));
        }
        state.builds += 1;
        let input_size = state.input_size;
        drop(state);

        Ok(Box::new(MockEngine {
            shared: Arc::clone(&self.shared),
            input_size,
        }))
    }
}

/// Engine produced by [`MockProvider`]; records inputs and replays the
/// configured candidates.
pub struct MockEngine {
    shared: Arc<MockShared>,
    input_size: (u32, u32),
}

impl ClassifierEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    fn infer(&mut self, input: &ArrayD<f32>) -> EngineResult<Vec<Category>> {
        let mut state = self.shared.state.lock().unwrap();
        state.recorded.push(input.clone());

        if state.gated {
            state.inferences_started += 1;
            self.shared.signal.notify_all();
            while state.permits == 0 {
                state = self.shared.signal.wait(state).unwrap();
            }
            state.permits -= 1;
        }

        if let Some(message) = state.fail_inference.take() {
            return Err(EngineError::Inference(message));
        }

        state.infer_calls += 1;
        Ok(state.candidates.clone())
    }
}
