//! Frame dispatch worker: a dedicated inference thread with latest-wins
//! backpressure.
//!
//! [`ClassifyWorker`] owns a [`SessionCoordinator`] on a single dedicated
//! thread - acceleration backends initialize and run on one consistent
//! thread for their whole life. Producers hand frames over through a
//! one-slot mailbox:
//!
//! - `submit` replaces any pending frame (queue depth 0, latest wins) and
//!   never blocks on an in-flight classify call
//! - `reconfigure` stores a pending configuration that the worker applies
//!   between classify calls, never during one
//! - every frame the worker consumes produces exactly one [`SessionEvent`]
//!   on the channel returned by [`ClassifyWorker::spawn`]
//!
//! Shutdown waits for the in-flight call to complete, then drops the
//! coordinator (and with it the engine) on the worker thread.
//!
//! # Example
//!
//! ```rust
//! use framesense_core::testing::MockProvider;
//! use framesense_core::{ClassifyWorker, EngineConfig, Frame, Rotation, SessionEvent};
//!
//! let provider = MockProvider::new();
//! let (worker, events) =
//!     ClassifyWorker::spawn(EngineConfig::default(), Box::new(provider))?;
//!
//! worker.submit(Frame::new(vec![0u8; 8 * 8 * 4], 8, 8, Rotation::Deg0))?;
//! match events.recv().unwrap() {
//!     SessionEvent::Results { categories, .. } => assert!(!categories.is_empty()),
//!     SessionEvent::Error { message } => panic!("{message}"),
//! }
//! # Ok::<(), framesense_core::ClassifyError>(())
//! ```

use crate::config::EngineConfig;
use crate::engine::{Category, EngineProvider};
use crate::error::{ClassifyError, ClassifyResult};
use crate::frame::Frame;
use crate::session::SessionCoordinator;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// Notification delivered to the result sink, exactly one per consumed frame.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A classify call completed.
    Results {
        /// Ranked categories (descending score, capped, possibly empty)
        categories: Vec<Category>,
        /// Wall-clock inference duration in milliseconds
        inference_time_ms: u64,
    },
    /// A classify call failed; the worker stays usable.
    Error {
        /// Human-readable failure description
        message: String,
    },
}

#[derive(Default)]
struct Mailbox {
    pending: Option<Frame>,
    config: Option<EngineConfig>,
    shutdown: bool,
}

struct Shared {
    mailbox: Mutex<Mailbox>,
    available: Condvar,
}

/// Handle to the dedicated classification thread.
///
/// Dropping the handle shuts the worker down, joining the thread after any
/// in-flight classify call has completed.
pub struct ClassifyWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ClassifyWorker {
    /// Spawns the worker thread and returns the handle plus the event channel.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] for an invalid configuration or
    /// [`ClassifyError::Io`] if the thread cannot be spawned.
    pub fn spawn(
        config: EngineConfig,
        provider: Box<dyn EngineProvider>,
    ) -> ClassifyResult<(Self, Receiver<SessionEvent>)> {
        config.validate()?;

        let (events, receiver) = mpsc::channel();
        let shared = Arc::new(Shared {
            mailbox: Mutex::new(Mailbox::default()),
            available: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("framesense-classify".to_string())
            .spawn(move || worker_loop(worker_shared, config, provider, events))?;

        Ok((
            Self {
                shared,
                handle: Some(handle),
            },
            receiver,
        ))
    }

    /// Submits a frame, replacing any pending one (latest wins).
    ///
    /// Never blocks on an in-flight classify call. Returns `true` if a
    /// pending frame was displaced.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::SessionClosed`] after
    /// [`shutdown`](Self::shutdown).
    pub fn submit(&self, frame: Frame) -> ClassifyResult<bool> {
        let mut mailbox = self
            .shared
            .mailbox
            .lock()
            .map_err(|_| ClassifyError::SessionClosed)?;
        if mailbox.shutdown {
            return Err(ClassifyError::SessionClosed);
        }

        let displaced = mailbox.pending.replace(frame).is_some();
        if displaced {
            log::trace!("stale frame displaced by a newer one");
        }
        drop(mailbox);
        self.shared.available.notify_one();
        Ok(displaced)
    }

    /// Stores a configuration the worker applies before consuming the next
    /// frame.
    ///
    /// An update arriving while a classify call is in flight does not disturb
    /// that call; it takes effect from the next frame on. A second update
    /// before the worker wakes replaces the first.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] for an invalid configuration, or
    /// [`ClassifyError::SessionClosed`] after [`shutdown`](Self::shutdown).
    pub fn reconfigure(&self, config: EngineConfig) -> ClassifyResult<()> {
        config.validate()?;

        let mut mailbox = self
            .shared
            .mailbox
            .lock()
            .map_err(|_| ClassifyError::SessionClosed)?;
        if mailbox.shutdown {
            return Err(ClassifyError::SessionClosed);
        }

        mailbox.config = Some(config);
        drop(mailbox);
        self.shared.available.notify_one();
        Ok(())
    }

    /// Shuts the worker down and joins its thread.
    ///
    /// Waits for any in-flight classify call to complete - inference is never
    /// cancelled mid-call - then drops the coordinator and engine on the
    /// worker thread. A pending, not-yet-consumed frame is discarded.
    /// Idempotent.
    pub fn shutdown(&mut self) {
        if let Ok(mut mailbox) = self.shared.mailbox.lock() {
            mailbox.shutdown = true;
        }
        self.shared.available.notify_all();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("classify worker panicked during shutdown");
            }
        }
    }
}

impl Drop for ClassifyWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    shared: Arc<Shared>,
    config: EngineConfig,
    provider: Box<dyn EngineProvider>,
    events: Sender<SessionEvent>,
) {
    // The configuration was validated in spawn(); a failure here means the
    // worker can never classify anything, so report it once and stop.
    let mut coordinator = match SessionCoordinator::new(config, provider) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            let _ = events.send(SessionEvent::Error {
                message: err.to_string(),
            });
            return;
        }
    };

    log::debug!("classify worker started");

    loop {
        let (frame, pending_config) = {
            let mut mailbox = shared.mailbox.lock().unwrap();
            while mailbox.pending.is_none() && mailbox.config.is_none() && !mailbox.shutdown {
                mailbox = shared.available.wait(mailbox).unwrap();
            }
            if mailbox.shutdown {
                break;
            }
            (mailbox.pending.take(), mailbox.config.take())
        };

        if let Some(config) = pending_config {
            if let Err(err) = coordinator.configure(config) {
                log::warn!("rejected configuration update: {err}");
            }
        }

        if let Some(frame) = frame {
            let event = match coordinator.classify(&frame) {
                Ok(outcome) => SessionEvent::Results {
                    categories: outcome.categories,
                    inference_time_ms: outcome.inference_time.as_millis() as u64,
                },
                Err(err) => {
                    log::warn!("classification failed: {err}");
                    SessionEvent::Error {
                        message: err.to_string(),
                    }
                }
            };

            if events.send(event).is_err() {
                log::debug!("event receiver dropped, continuing without a consumer");
            }
        }
    }

    coordinator.invalidate();
    log::debug!("classify worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rotation;
    use crate::testing::MockProvider;

    fn test_frame() -> Frame {
        Frame::new(vec![0u8; 8 * 8 * 4], 8, 8, Rotation::Deg0)
    }

    #[test]
    fn test_spawn_rejects_invalid_config() {
        let result = ClassifyWorker::spawn(
            EngineConfig::default().with_num_threads(0),
            Box::new(MockProvider::new()),
        );
        assert!(matches!(result, Err(ClassifyError::Config(_))));
    }

    #[test]
    fn test_submit_after_shutdown_errors() {
        let (mut worker, _events) =
            ClassifyWorker::spawn(EngineConfig::default(), Box::new(MockProvider::new())).unwrap();
        worker.shutdown();

        assert!(matches!(
            worker.submit(test_frame()),
            Err(ClassifyError::SessionClosed)
        ));
        assert!(matches!(
            worker.reconfigure(EngineConfig::default()),
            Err(ClassifyError::SessionClosed)
        ));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (mut worker, _events) =
            ClassifyWorker::spawn(EngineConfig::default(), Box::new(MockProvider::new())).unwrap();
        worker.shutdown();
        worker.shutdown();
    }
}
