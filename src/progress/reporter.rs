//! Progress reporter shared between an upload job and the transport.
//!
//! The transport calls [`ProgressReporter::report`] once per tick. The reporter
//! converts the tick to a percentage, keeps it non-decreasing, and invokes the
//! caller's sink synchronously.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::progress::event::UploadProgress;

/// Caller-supplied progress sink. Receives a percentage in `[0, 100]`.
pub type ProgressSink = Box<dyn FnMut(u8) + Send>;

struct ReporterState {
    sink: Option<ProgressSink>,
    last_percent: Option<u8>,
}

#[derive(Clone)]
pub struct ProgressReporter {
    label: Arc<str>,
    state: Arc<Mutex<ReporterState>>,
}

impl ProgressReporter {
    pub fn new(label: impl Into<String>, sink: Option<ProgressSink>) -> Self {
        Self {
            label: Arc::from(label.into()),
            state: Arc::new(Mutex::new(ReporterState {
                sink,
                last_percent: None,
            })),
        }
    }

    /// Reporter with no sink; ticks are only logged.
    pub fn silent(label: impl Into<String>) -> Self {
        Self::new(label, None)
    }

    /// Record one transport tick and forward it to the sink.
    ///
    /// Returns the percentage that was delivered.
    pub fn report(&self, loaded: u64, total: u64) -> u8 {
        let tick = UploadProgress::new(loaded, total);
        let mut state = self.state.lock();
        let percent = match state.last_percent {
            Some(last) if last > tick.percent() => last,
            _ => tick.percent(),
        };
        state.last_percent = Some(percent);
        debug!(
            file = %self.label,
            loaded = tick.loaded,
            total = tick.total,
            percent,
            "upload progress"
        );
        if let Some(sink) = state.sink.as_mut() {
            sink(percent);
        }
        percent
    }

    /// Last percentage delivered, if any tick has been seen.
    pub fn last_percent(&self) -> Option<u8> {
        self.state.lock().last_percent
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("label", &self.label)
            .field("last_percent", &self.last_percent())
            .finish()
    }
}
