//! Position providers
//!
//! A provider is an external source of position and heading updates. It is
//! started and stopped by the [`GeolocationControl`](crate::GeolocationControl)
//! and pushes [`ProviderEvent`]s into a [`ProviderSink`]. The control drains
//! the sink and applies each event to the map as a fresh top-level mutation,
//! so a provider never runs inside a render pass.
//!
//! # Providers
//!
//! | Provider              | Source                                          |
//! |-----------------------|-------------------------------------------------|
//! | [`SimulatorProvider`] | straight route sampled every few meters, looped |
//! | [`ReplayProvider`]    | JSON array of recorded positions, played once   |
//! | [`ManualProvider`]    | host code pushing through a [`ManualHandle`]    |
//!
//! Stopping is a logical request: events already queued in the sink are
//! still delivered.

mod manual;
mod replay;
mod simulator;

pub use manual::{ManualHandle, ManualProvider};
pub use replay::{ReplayError, ReplayProvider, ReplaySample};
pub use simulator::SimulatorProvider;

use std::time::Duration;

use tokio::sync::mpsc;

use crate::position::{Heading, Position, SharedPosition};

/// Shortest delay between two timed emissions. `tokio::time::interval`
/// rejects a zero period.
pub const MIN_PROVIDER_INTERVAL: Duration = Duration::from_millis(1);

/// A single update pushed by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// `position.changed`
    Position(Option<SharedPosition>),
    /// `heading.changed`
    Heading(Option<Heading>),
}

impl ProviderEvent {
    /// Event name as emitted by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEvent::Position(_) => "position.changed",
            ProviderEvent::Heading(_) => "heading.changed",
        }
    }
}

/// Sending half of the provider channel.
#[derive(Debug, Clone)]
pub struct ProviderSink {
    tx: mpsc::UnboundedSender<ProviderEvent>,
}

/// Receiving half of the provider channel.
pub type ProviderEvents = mpsc::UnboundedReceiver<ProviderEvent>;

/// Create a connected sink/receiver pair.
pub fn provider_channel() -> (ProviderSink, ProviderEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProviderSink { tx }, rx)
}

impl ProviderSink {
    /// Push an event. Returns `false` once the receiving side is gone.
    pub fn send(&self, event: ProviderEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Push a new position.
    pub fn position(&self, position: Position) -> bool {
        self.send(ProviderEvent::Position(Some(position.shared())))
    }

    /// Push a new heading.
    pub fn heading(&self, heading: Heading) -> bool {
        self.send(ProviderEvent::Heading(Some(heading)))
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A source of position and heading updates.
///
/// `start` and `stop` must not block. Implementations that produce events
/// over time spawn a task on the current tokio runtime.
pub trait PositionProvider: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Hand the provider the sink it pushes into. Replaces any previous sink.
    fn connect(&mut self, sink: ProviderSink);

    /// Drop the sink. Later pushes are discarded.
    fn disconnect(&mut self);

    /// Begin producing updates.
    fn start(&mut self);

    /// Stop producing updates.
    fn stop(&mut self);
}
