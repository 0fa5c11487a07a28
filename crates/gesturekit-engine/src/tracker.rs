//! Frame tracking: sample ingestion, sliding window, per-frame signals.
//!
//! The tracker codifies each raw sample into a feature vector, keeps the
//! most recent `window_length` vectors in a sliding buffer, and derives
//! two per-frame signals: the derivative (difference from the previous
//! frame) and the distance from the current cycle's anchor frame. Frame
//! listeners hear every accepted sample; window listeners hear every
//! completed buffer cycle. No recognition logic lives here.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use gesturekit_core::error::ConfigError;
use gesturekit_core::{
    CoreResult, FeatureVector, FrameListener, ListenerKey, RawSample, WindowListener,
    DEFAULT_WINDOW_LENGTH,
};

use crate::codifier::{FeatureCodifier, SkeletonCodifier};
use crate::events::ListenerSet;

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Frame capacity of the sliding window.
    pub window_length: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
        }
    }
}

/// Outcome of one accepted sample.
#[derive(Debug, Clone, Copy)]
pub struct FrameUpdate {
    /// Index of the accepted frame, wrapping modulo the window length.
    pub frame_index: usize,
    /// Difference from the previous accepted frame.
    pub derivative: FeatureVector,
    /// Offset from the current cycle's anchor frame.
    pub distance: FeatureVector,
    /// Whether this frame completed a full buffer cycle.
    pub window_completed: bool,
    /// Sensor timestamp of the sample.
    pub timestamp_ms: u64,
}

/// Sliding-window frame tracker.
pub struct Tracker {
    buffer: VecDeque<FeatureVector>,
    window_length: usize,
    frame_index: usize,
    codifier: Box<dyn FeatureCodifier>,
    previous: Option<FeatureVector>,
    cycle_anchor: FeatureVector,
    frame_listeners: ListenerSet<dyn FrameListener>,
    window_listeners: ListenerSet<dyn WindowListener>,
}

impl Tracker {
    /// Create a tracker with an explicit codifier.
    pub fn with_codifier(
        config: TrackerConfig,
        codifier: Box<dyn FeatureCodifier>,
    ) -> CoreResult<Self> {
        if config.window_length == 0 {
            return Err(ConfigError::ZeroWindowLength.into());
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(config.window_length),
            window_length: config.window_length,
            frame_index: 0,
            codifier,
            previous: None,
            cycle_anchor: FeatureVector::ZERO,
            frame_listeners: ListenerSet::new(),
            window_listeners: ListenerSet::new(),
        })
    }

    /// Create a tracker with the default skeleton codifier.
    pub fn new(config: TrackerConfig) -> CoreResult<Self> {
        Self::with_codifier(config, Box::<SkeletonCodifier>::default())
    }

    /// Ingest one raw sample.
    ///
    /// Non-finite samples and variants the codifier does not understand
    /// are dropped without advancing the frame index. Returns the frame
    /// update for accepted samples.
    pub fn on_sample(&mut self, sample: &RawSample) -> Option<FrameUpdate> {
        if !sample.is_finite() {
            warn!(timestamp_ms = sample.timestamp_ms(), "dropping non-finite sample");
            return None;
        }

        let Some(feature) = self.codifier.codify(sample) else {
            debug!(
                timestamp_ms = sample.timestamp_ms(),
                "codifier skipped unsupported sample variant"
            );
            return None;
        };

        let frame_index = self.frame_index;
        if frame_index == 0 {
            self.cycle_anchor = feature;
        }

        let derivative = match self.previous {
            Some(prev) => feature.delta(&prev),
            None => FeatureVector::ZERO,
        };
        let distance = feature.delta(&self.cycle_anchor);

        self.buffer.push_back(feature);
        if self.buffer.len() > self.window_length {
            self.buffer.pop_front();
        }
        self.previous = Some(feature);

        let window_completed = frame_index + 1 == self.window_length;
        self.frame_index = (frame_index + 1) % self.window_length;

        for listener in self.frame_listeners.snapshot() {
            listener.on_frame(frame_index, derivative, distance);
        }
        if window_completed {
            for listener in self.window_listeners.snapshot() {
                listener.on_window_ready();
            }
        }

        Some(FrameUpdate {
            frame_index,
            derivative,
            distance,
            window_completed,
            timestamp_ms: sample.timestamp_ms(),
        })
    }

    /// Copy of the current buffer contents, oldest frame first.
    ///
    /// Recognition passes read this snapshot, never the live buffer.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FeatureVector> {
        self.buffer.iter().copied().collect()
    }

    /// Frame capacity of the sliding window.
    #[must_use]
    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Number of frames currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no frames are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the buffer has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.window_length
    }

    /// Drop buffered frames, derived state, and codifier state.
    ///
    /// Listener registrations survive.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.frame_index = 0;
        self.previous = None;
        self.cycle_anchor = FeatureVector::ZERO;
        self.codifier.reset();
    }

    /// Register a frame listener.
    pub fn add_frame_listener(&mut self, listener: Arc<dyn FrameListener>) -> ListenerKey {
        self.frame_listeners.add(listener)
    }

    /// Deregister a frame listener.
    pub fn remove_frame_listener(&mut self, key: ListenerKey) -> bool {
        self.frame_listeners.remove(key)
    }

    /// Register a window listener.
    pub fn add_window_listener(&mut self, listener: Arc<dyn WindowListener>) -> ListenerKey {
        self.window_listeners.add(listener)
    }

    /// Deregister a window listener.
    pub fn remove_window_listener(&mut self, key: ListenerKey) -> bool {
        self.window_listeners.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesturekit_core::{SkeletonSample, Vector3};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample(x: f64, y: f64, timestamp_ms: u64) -> RawSample {
        RawSample::Skeleton(SkeletonSample {
            primary: Vector3::new(x, y, 1.0),
            secondary: Vector3::new(0.0, 0.0, 1.0),
            timestamp_ms,
        })
    }

    fn tracker(window_length: usize) -> Tracker {
        Tracker::new(TrackerConfig { window_length }).unwrap()
    }

    struct WindowCounter {
        count: AtomicUsize,
    }

    impl WindowListener for WindowCounter {
        fn on_window_ready(&self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn zero_window_length_rejected() {
        assert!(Tracker::new(TrackerConfig { window_length: 0 }).is_err());
    }

    #[test]
    fn buffer_slides_at_capacity() {
        let mut t = tracker(5);
        for i in 0..12 {
            t.on_sample(&sample(i as f64, 0.0, i));
            assert!(t.len() <= 5, "buffer exceeded capacity at sample {i}");
        }
        assert!(t.is_full());
        assert_eq!(t.len(), 5);

        // Oldest entries were evicted: buffer holds samples 7..=11
        let snapshot = t.snapshot();
        assert!((snapshot[0].x - 7.0).abs() < f64::EPSILON);
        assert!((snapshot[4].x - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn frame_index_wraps_modulo_window_length() {
        let mut t = tracker(3);
        let indices: Vec<usize> = (0..7)
            .map(|i| t.on_sample(&sample(i as f64, 0.0, i)).unwrap().frame_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn window_completion_fires_once_per_cycle() {
        let mut t = tracker(4);
        let counter = Arc::new(WindowCounter {
            count: AtomicUsize::new(0),
        });
        t.add_window_listener(counter.clone());

        for i in 0..12 {
            t.on_sample(&sample(i as f64, 0.0, i));
        }
        assert_eq!(counter.count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn non_finite_sample_dropped_without_advancing() {
        let mut t = tracker(4);
        t.on_sample(&sample(1.0, 1.0, 0));

        let rejected = t.on_sample(&sample(f64::NAN, 0.0, 1));
        assert!(rejected.is_none());
        assert_eq!(t.len(), 1);

        // The next good sample continues at index 1
        let update = t.on_sample(&sample(2.0, 2.0, 2)).unwrap();
        assert_eq!(update.frame_index, 1);
    }

    #[test]
    fn derivative_and_distance_signals() {
        let mut t = tracker(4);

        // First frame anchors the cycle: both signals are zero
        let first = t.on_sample(&sample(1.0, 2.0, 0)).unwrap();
        assert_eq!(first.derivative, FeatureVector::ZERO);
        assert_eq!(first.distance, FeatureVector::ZERO);

        let second = t.on_sample(&sample(3.0, 2.5, 1)).unwrap();
        assert!((second.derivative.x - 2.0).abs() < 1e-12);
        assert!((second.derivative.y - 0.5).abs() < 1e-12);
        assert!((second.distance.x - 2.0).abs() < 1e-12);

        let third = t.on_sample(&sample(4.0, 4.0, 2)).unwrap();
        assert!((third.derivative.x - 1.0).abs() < 1e-12);
        // Distance is measured from the cycle anchor, not the previous frame
        assert!((third.distance.x - 3.0).abs() < 1e-12);
        assert!((third.distance.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn anchor_resets_each_cycle() {
        let mut t = tracker(2);
        t.on_sample(&sample(0.0, 0.0, 0));
        t.on_sample(&sample(1.0, 0.0, 1));

        // New cycle: the anchor becomes this frame
        let update = t.on_sample(&sample(5.0, 5.0, 2)).unwrap();
        assert_eq!(update.frame_index, 0);
        assert_eq!(update.distance, FeatureVector::ZERO);

        let next = t.on_sample(&sample(6.0, 5.0, 3)).unwrap();
        assert!((next.distance.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clear_resets_state_but_keeps_listeners() {
        let mut t = tracker(3);
        let counter = Arc::new(WindowCounter {
            count: AtomicUsize::new(0),
        });
        t.add_window_listener(counter.clone());

        t.on_sample(&sample(1.0, 1.0, 0));
        t.on_sample(&sample(2.0, 2.0, 1));
        t.clear();
        assert!(t.is_empty());

        for i in 0..3 {
            t.on_sample(&sample(i as f64, 0.0, 10 + i));
        }
        assert_eq!(counter.count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_deregistration() {
        let mut t = tracker(2);
        let counter = Arc::new(WindowCounter {
            count: AtomicUsize::new(0),
        });
        let key = t.add_window_listener(counter.clone());

        t.on_sample(&sample(0.0, 0.0, 0));
        t.on_sample(&sample(1.0, 0.0, 1));
        assert_eq!(counter.count.load(Ordering::SeqCst), 1);

        assert!(t.remove_window_listener(key));
        t.on_sample(&sample(2.0, 0.0, 2));
        t.on_sample(&sample(3.0, 0.0, 3));
        assert_eq!(counter.count.load(Ordering::SeqCst), 1);
    }
}
