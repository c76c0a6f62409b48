//! Handle-driven provider for hosts that obtain positions themselves.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{PositionProvider, ProviderEvent, ProviderSink};
use crate::position::{Heading, Position, SharedPosition};

#[derive(Debug, Default)]
struct ManualState {
    sink: Option<ProviderSink>,
    running: bool,
    starts: usize,
    stops: usize,
}

/// A provider whose updates are pushed through a [`ManualHandle`].
///
/// Pushes are only forwarded while the provider is started.
#[derive(Debug, Default)]
pub struct ManualProvider {
    state: Arc<Mutex<ManualState>>,
}

/// Pushing side of a [`ManualProvider`].
#[derive(Debug, Clone)]
pub struct ManualHandle {
    state: Arc<Mutex<ManualState>>,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle for pushing updates.
    pub fn handle(&self) -> ManualHandle {
        ManualHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl PositionProvider for ManualProvider {
    fn name(&self) -> &str {
        "manual"
    }

    fn connect(&mut self, sink: ProviderSink) {
        self.state.lock().sink = Some(sink);
    }

    fn disconnect(&mut self) {
        self.state.lock().sink = None;
    }

    fn start(&mut self) {
        let mut state = self.state.lock();
        state.running = true;
        state.starts += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.stops += 1;
    }
}

impl ManualHandle {
    /// Push a position. Returns `false` if it was dropped.
    pub fn push_position(&self, position: Position) -> bool {
        self.push(ProviderEvent::Position(Some(position.shared())))
    }

    /// Push an already shared position, keeping its identity.
    pub fn push_shared(&self, position: SharedPosition) -> bool {
        self.push(ProviderEvent::Position(Some(position)))
    }

    /// Push a heading. Returns `false` if it was dropped.
    pub fn push_heading(&self, heading: Heading) -> bool {
        self.push(ProviderEvent::Heading(Some(heading)))
    }

    /// Push a raw event.
    pub fn push(&self, event: ProviderEvent) -> bool {
        let state = self.state.lock();
        match (&state.sink, state.running) {
            (Some(sink), true) => sink.send(event),
            _ => {
                debug!(event = event.as_str(), "Manual provider not running, dropping");
                false
            }
        }
    }

    /// Whether the provider is started.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Number of `start` calls received.
    pub fn start_count(&self) -> usize {
        self.state.lock().starts
    }

    /// Number of `stop` calls received.
    pub fn stop_count(&self) -> usize {
        self.state.lock().stops
    }
}
