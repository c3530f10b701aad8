//! Scoped timing of construction phases.
//!
//! A [`PhaseEvent`] reports its start when created and its elapsed time when
//! dropped, on success and error paths alike.

use log::{debug, info};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receiver of phase start/finish notifications.
pub trait PhaseSink: Send + Sync + Debug {
    fn phase_started(&self, _name: &str) {}

    fn phase_finished(&self, name: &str, elapsed: Duration);
}

/// Sink writing phases to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl PhaseSink for LogSink {
    fn phase_started(&self, name: &str) {
        debug!("phase `{}` started", name);
    }

    fn phase_finished(&self, name: &str, elapsed: Duration) {
        info!("phase `{}` finished in {:.2?}", name, elapsed);
    }
}

/// Sink remembering finished phase names in order.
#[derive(Debug, Default)]
pub struct PhaseRecorder {
    finished: Mutex<Vec<String>>,
}

impl PhaseRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().clone()
    }

    /// How many times `name` finished.
    pub fn count(&self, name: &str) -> usize {
        self.finished.lock().iter().filter(|n| *n == name).count()
    }
}

impl PhaseSink for PhaseRecorder {
    fn phase_finished(&self, name: &str, _elapsed: Duration) {
        self.finished.lock().push(name.to_string());
    }
}

/// Guard for one running phase.
#[must_use = "the phase ends when the guard is dropped"]
pub struct PhaseEvent {
    name: &'static str,
    start: Instant,
    sink: Arc<dyn PhaseSink>,
}

impl PhaseEvent {
    pub fn begin(name: &'static str, sink: Arc<dyn PhaseSink>) -> Self {
        sink.phase_started(name);
        Self {
            name,
            start: Instant::now(),
            sink,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for PhaseEvent {
    fn drop(&mut self) {
        self.sink.phase_finished(self.name, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(sink: Arc<dyn PhaseSink>) -> Result<(), ()> {
        let _event = PhaseEvent::begin("failing", sink);
        Err(())
    }

    #[test]
    fn test_reports_on_every_exit_path() {
        let recorder = PhaseRecorder::new();
        {
            let _outer = PhaseEvent::begin("outer", recorder.clone());
            let _inner = PhaseEvent::begin("inner", recorder.clone());
        }
        assert!(failing(recorder.clone()).is_err());
        assert_eq!(recorder.finished(), vec!["inner", "outer", "failing"]);
        assert_eq!(recorder.count("outer"), 1);
    }
}
