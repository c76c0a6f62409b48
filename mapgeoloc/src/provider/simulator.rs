//! Route simulator
//!
//! Walks a straight great-circle route between two points, emitting one
//! position (with a fixed accuracy) and one heading per tick. When the end
//! of the route is reached it starts over from the first sample.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{PositionProvider, ProviderSink, MIN_PROVIDER_INTERVAL};
use crate::config::SimulationSettings;
use crate::geo::{sample_route, LngLat};
use crate::position::Position;

/// Simulated provider following a sampled route.
#[derive(Debug)]
pub struct SimulatorProvider {
    samples: Arc<Vec<LngLat>>,
    interval: Duration,
    accuracy_m: f64,
    heading: f64,
    cursor: Arc<AtomicUsize>,
    sink: Option<ProviderSink>,
    task: Option<JoinHandle<()>>,
}

impl SimulatorProvider {
    /// Sample the route from `start` to `end` using `settings`.
    pub fn new(start: LngLat, end: LngLat, settings: &SimulationSettings) -> Self {
        let samples = sample_route(start, end, settings.step_m);
        debug!(
            samples = samples.len(),
            step_m = settings.step_m,
            "Sampled simulator route"
        );

        Self {
            samples: Arc::new(samples),
            interval: settings.interval.max(MIN_PROVIDER_INTERVAL),
            accuracy_m: settings.accuracy_m,
            heading: settings.heading,
            cursor: Arc::new(AtomicUsize::new(0)),
            sink: None,
            task: None,
        }
    }

    /// Delay between two emitted samples.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Route samples, start point first.
    pub fn samples(&self) -> &[LngLat] {
        &self.samples
    }

    /// Index of the next sample to emit.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Whether the emitting task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl PositionProvider for SimulatorProvider {
    fn name(&self) -> &str {
        "simulator"
    }

    fn connect(&mut self, sink: ProviderSink) {
        self.sink = Some(sink);
    }

    fn disconnect(&mut self) {
        self.sink = None;
    }

    fn start(&mut self) {
        if self.is_running() {
            debug!("Simulator already running");
            return;
        }
        let Some(sink) = self.sink.clone() else {
            warn!("Simulator started without a sink, ignoring");
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!("Simulator started outside a tokio runtime, ignoring");
            return;
        };

        let samples = Arc::clone(&self.samples);
        let cursor = Arc::clone(&self.cursor);
        let interval = self.interval;
        let accuracy_m = self.accuracy_m;
        let heading = self.heading;

        info!(
            samples = samples.len(),
            interval_ms = interval.as_millis() as u64,
            "Simulator started"
        );

        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; emit one interval after start
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let index = cursor.load(Ordering::Relaxed) % samples.len();
                let point = samples[index];
                let position = Position::from(point).with_accuracy(accuracy_m);

                if !sink.position(position) || !sink.heading(heading) {
                    debug!("Simulator sink closed, ending");
                    break;
                }

                cursor.store((index + 1) % samples.len(), Ordering::Relaxed);
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!(cursor = self.cursor(), "Simulator stopped");
        }
    }
}

impl Drop for SimulatorProvider {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{provider_channel, ProviderEvent};

    fn settings() -> SimulationSettings {
        SimulationSettings {
            interval: Duration::from_millis(300),
            step_m: 50.0,
            accuracy_m: 10.0,
            heading: 280.0,
        }
    }

    fn route() -> (LngLat, LngLat) {
        (
            LngLat::new(3.883528, 43.608749),
            LngLat::new(3.881970, 43.609040),
        )
    }

    #[test]
    fn test_route_is_sampled() {
        let (start, end) = route();
        let simulator = SimulatorProvider::new(start, end, &settings());

        // ~129 m in 50 m steps: start, 50 m, 100 m
        assert_eq!(simulator.samples().len(), 3);
        assert_eq!(simulator.samples()[0], start);
    }

    #[test]
    fn test_start_without_runtime_is_ignored() {
        let (start, end) = route();
        let mut simulator = SimulatorProvider::new(start, end, &settings());
        let (sink, _events) = provider_channel();
        simulator.connect(sink);

        simulator.start();
        assert!(!simulator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_position_then_heading_and_loops() {
        let (start, end) = route();
        let mut simulator = SimulatorProvider::new(start, end, &settings());
        let (sink, mut events) = provider_channel();
        simulator.connect(sink);
        simulator.start();

        let mut lng_lats = Vec::new();
        for _ in 0..4 {
            match events.recv().await {
                Some(ProviderEvent::Position(Some(position))) => {
                    assert_eq!(position.accuracy, Some(10.0));
                    lng_lats.push(position.lng_lat());
                }
                other => panic!("expected position, got {:?}", other),
            }
            assert_eq!(events.recv().await, Some(ProviderEvent::Heading(Some(280.0))));
        }

        simulator.stop();

        assert_eq!(lng_lats[0], start);
        assert_eq!(lng_lats[3], start, "route should loop after the last sample");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_emission_and_start_resumes() {
        let (start, end) = route();
        let mut simulator = SimulatorProvider::new(start, end, &settings());
        let (sink, mut events) = provider_channel();
        simulator.connect(sink);

        simulator.start();
        assert!(simulator.is_running());
        assert!(matches!(events.recv().await, Some(ProviderEvent::Position(_))));
        assert!(matches!(events.recv().await, Some(ProviderEvent::Heading(_))));

        simulator.stop();
        assert!(!simulator.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(events.try_recv().is_err());

        simulator.start();
        match events.recv().await {
            Some(ProviderEvent::Position(Some(position))) => {
                assert_eq!(position.lng_lat(), simulator.samples()[1]);
            }
            other => panic!("expected position, got {:?}", other),
        }
        simulator.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let (start, end) = route();
        let settings = SimulationSettings {
            interval: Duration::ZERO,
            ..settings()
        };
        let mut simulator = SimulatorProvider::new(start, end, &settings);
        assert_eq!(simulator.interval(), MIN_PROVIDER_INTERVAL);

        let (sink, mut events) = provider_channel();
        simulator.connect(sink);
        simulator.start();

        let first = tokio::time::timeout(Duration::from_millis(500), events.recv()).await;
        assert!(matches!(first, Ok(Some(ProviderEvent::Position(Some(_))))));
        assert!(simulator.is_running());
        simulator.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_spawns_once() {
        let (start, end) = route();
        let mut simulator = SimulatorProvider::new(start, end, &settings());
        let (sink, mut events) = provider_channel();
        simulator.connect(sink);

        simulator.start();
        simulator.start();

        tokio::time::sleep(Duration::from_millis(350)).await;
        simulator.stop();

        let mut received = 0;
        while events.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 2, "one position and one heading");
    }
}
