//! Recorded track replay
//!
//! Plays back a JSON array of recorded samples once, at a fixed interval.
//! Each sample is a position, optionally carrying the heading measured at
//! that point:
//!
//! ```json
//! [
//!   { "lng": 3.883528, "lat": 43.608749, "accuracy": 10 },
//!   { "lng": 3.881970, "lat": 43.609040, "accuracy": 12, "heading": 280 }
//! ]
//! ```
//!
//! Restarting after `stop` or after the end of the track plays it again
//! from the first sample.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{PositionProvider, ProviderEvent, ProviderSink, MIN_PROVIDER_INTERVAL};
use crate::position::{Heading, Position};

/// Default delay between two replayed samples.
pub const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_millis(1000);

/// Errors while loading a replay file.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid replay JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Replay file contains no samples")]
    Empty,
}

/// One recorded sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySample {
    #[serde(flatten)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<Heading>,
}

/// Provider replaying recorded samples.
#[derive(Debug)]
pub struct ReplayProvider {
    samples: Arc<Vec<ReplaySample>>,
    interval: Duration,
    sink: Option<ProviderSink>,
    task: Option<JoinHandle<()>>,
}

impl ReplayProvider {
    /// Create from already loaded samples.
    pub fn new(samples: Vec<ReplaySample>) -> Result<Self, ReplayError> {
        if samples.is_empty() {
            return Err(ReplayError::Empty);
        }
        Ok(Self {
            samples: Arc::new(samples),
            interval: DEFAULT_REPLAY_INTERVAL,
            sink: None,
            task: None,
        })
    }

    /// Parse a JSON array of samples.
    pub fn from_json_str(json: &str) -> Result<Self, ReplayError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a JSON replay file.
    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        let provider = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            samples = provider.samples.len(),
            "Loaded replay file"
        );
        Ok(provider)
    }

    /// Set the delay between samples, at least [`MIN_PROVIDER_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_PROVIDER_INTERVAL);
        self
    }

    /// Delay between samples.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Loaded samples.
    pub fn samples(&self) -> &[ReplaySample] {
        &self.samples
    }

    /// Whether playback is in progress.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl PositionProvider for ReplayProvider {
    fn name(&self) -> &str {
        "replay"
    }

    fn connect(&mut self, sink: ProviderSink) {
        self.sink = Some(sink);
    }

    fn disconnect(&mut self) {
        self.sink = None;
    }

    fn start(&mut self) {
        if self.is_running() {
            debug!("Replay already running");
            return;
        }
        let Some(sink) = self.sink.clone() else {
            warn!("Replay started without a sink, ignoring");
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!("Replay started outside a tokio runtime, ignoring");
            return;
        };

        let samples = Arc::clone(&self.samples);
        let interval = self.interval;
        info!(samples = samples.len(), "Replay started");

        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            for (index, sample) in samples.iter().enumerate() {
                ticker.tick().await;

                if !sink.send(ProviderEvent::Position(Some(sample.position.clone().shared()))) {
                    debug!(index, "Replay sink closed, ending");
                    return;
                }
                if let Some(heading) = sample.heading {
                    if !sink.heading(heading) {
                        return;
                    }
                }
            }

            info!("Replay finished");
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Replay stopped");
        }
    }
}

impl Drop for ReplayProvider {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
