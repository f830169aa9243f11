//! Progress reporting and cooperative cancellation
//!
//! Both types are cheap handles that can be cloned into a blocking task.
//! Progress percentages are clamped so the reported value never decreases;
//! the cancel flag is polled by the pipeline, never pushed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Callback = Box<dyn FnMut(f32, &str) + Send>;

struct SinkState {
    callback: Callback,
    last_percent: f32,
}

/// Destination for progress updates.
///
/// Constructed from a callback, or [`ProgressSink::none`] to discard all
/// updates. Reported percentages are monotonically non-decreasing.
#[derive(Clone, Default)]
pub struct ProgressSink {
    state: Option<Arc<Mutex<SinkState>>>,
}

impl ProgressSink {
    pub fn new(callback: impl FnMut(f32, &str) + Send + 'static) -> Self {
        Self {
            state: Some(Arc::new(Mutex::new(SinkState {
                callback: Box::new(callback),
                last_percent: 0.0,
            }))),
        }
    }

    /// A sink that ignores every update.
    pub fn none() -> Self {
        Self::default()
    }

    /// Report progress. A percentage lower than a previously reported one
    /// is raised to the running maximum before the callback is invoked.
    pub fn report(&self, percent: f32, message: &str) {
        if let Some(state) = &self.state {
            let mut state = state.lock().expect("progress sink poisoned");
            let percent = percent.max(state.last_percent);
            state.last_percent = percent;
            (state.callback)(percent, message);
        }
    }
}

/// Cooperative cancellation flag, settable from any thread at any time.
///
/// The pipeline polls this at suspension-safe points; work already in
/// flight is never interrupted, but no new work begins once the flag is
/// observed.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
