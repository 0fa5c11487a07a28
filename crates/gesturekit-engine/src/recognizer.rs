//! Recognition state machine.
//!
//! The recognizer owns a [`Tracker`] and drives matching off its frame
//! stream. Every `update_rate` accepted frames it snapshots the window,
//! scores it against every template in the active library, filters by the
//! acceptance thresholds, and runs a majority vote. A winner fires a
//! [`GestureEvent`] and arms the hold-off state so a sustained gesture
//! does not re-fire every window; a miss drops straight back to idle so a
//! new gesture can be detected without waiting out the cooldown.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, trace};

use gesturekit_core::{
    AccelerationSample, CoreError, CoreResult, FeatureVector, FrameListener, GestureEvent,
    GestureListener, GestureTemplate, ListenerKey, RawSample, Recognition, RecognitionSettings,
    SkeletonSample, TemplateLibrary, TemplateRepository, WindowListener, DEFAULT_WINDOW_LENGTH,
};

use crate::codifier::FeatureCodifier;
use crate::dtw::dtw_distance;
use crate::events::ListenerSet;
use crate::tracker::{Tracker, TrackerConfig};

/// Recognizer configuration.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Frame capacity of the tracking window.
    pub window_length: usize,
    /// Initial recognition settings.
    pub settings: RecognitionSettings,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            settings: RecognitionSettings::default(),
        }
    }
}

/// Debounce state of the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecognitionState {
    /// No gesture currently considered held.
    Idle,
    /// The most recent pass recognized a gesture; hold-off in effect.
    Holding {
        /// Timestamp of the firing pass, in sensor milliseconds.
        last_fire_ms: u64,
    },
}

/// Per-gesture vote tally of one matching pass.
#[derive(Debug, Clone, Copy)]
struct VoteTally {
    votes: usize,
    distance_sum: f64,
    best_distance: f64,
}

/// DTW gesture recognizer over a tracked sample stream.
pub struct Recognizer {
    tracker: Tracker,
    settings: RecognitionSettings,
    library: Arc<TemplateLibrary>,
    state: RecognitionState,
    repository: Option<Box<dyn TemplateRepository>>,
    gesture_listeners: ListenerSet<dyn GestureListener>,
}

impl Recognizer {
    /// Create a recognizer with the default skeleton codifier and no
    /// repository attached.
    pub fn new(config: RecognizerConfig) -> CoreResult<Self> {
        config.settings.validate(config.window_length)?;
        let tracker = Tracker::new(TrackerConfig {
            window_length: config.window_length,
        })?;
        Ok(Self {
            tracker,
            settings: config.settings,
            library: Arc::new(TemplateLibrary::new()),
            state: RecognitionState::Idle,
            repository: None,
            gesture_listeners: ListenerSet::new(),
        })
    }

    /// Create a recognizer with an explicit codifier.
    pub fn with_codifier(
        config: RecognizerConfig,
        codifier: Box<dyn FeatureCodifier>,
    ) -> CoreResult<Self> {
        config.settings.validate(config.window_length)?;
        let tracker = Tracker::with_codifier(
            TrackerConfig {
                window_length: config.window_length,
            },
            codifier,
        )?;
        Ok(Self {
            tracker,
            settings: config.settings,
            library: Arc::new(TemplateLibrary::new()),
            state: RecognitionState::Idle,
            repository: None,
            gesture_listeners: ListenerSet::new(),
        })
    }

    /// Attach the persistence collaborator used by profile and settings
    /// operations.
    pub fn set_repository(&mut self, repository: Box<dyn TemplateRepository>) {
        self.repository = Some(repository);
    }

    /// Swap in a template library directly, bypassing the repository.
    ///
    /// The swap is atomic with respect to recognition passes: the next
    /// pass sees the new library wholesale.
    pub fn set_template_library(&mut self, library: Arc<TemplateLibrary>) {
        self.library = library;
    }

    /// The library the next recognition pass will match against.
    #[must_use]
    pub fn template_library(&self) -> Arc<TemplateLibrary> {
        Arc::clone(&self.library)
    }

    /// Re-pull the library snapshot from the repository, picking up
    /// templates recorded since profile activation.
    pub fn reload_dataset(&mut self) -> CoreResult<()> {
        let library = self.require_repository()?.dataset_for_recognition()?;
        self.library = library;
        Ok(())
    }

    /// Ingest one skeletal-joint sample.
    pub fn on_skeleton_sample(&mut self, sample: SkeletonSample) -> Option<GestureEvent> {
        self.on_sample(RawSample::Skeleton(sample))
    }

    /// Ingest one accelerometer sample.
    pub fn on_acceleration_sample(&mut self, sample: AccelerationSample) -> Option<GestureEvent> {
        self.on_sample(RawSample::Acceleration(sample))
    }

    /// Ingest one raw sample, running a recognition pass when due.
    ///
    /// Returns the recognition event if this sample's pass declared a
    /// winner; listeners are notified either way.
    pub fn on_sample(&mut self, sample: RawSample) -> Option<GestureEvent> {
        let update = self.tracker.on_sample(&sample)?;

        // Recognition attempts happen every update_rate frames, not on
        // every sample.
        if (update.frame_index + 1) % self.settings.update_rate() != 0 {
            return None;
        }

        let now_ms = update.timestamp_ms;
        if let RecognitionState::Holding { last_fire_ms } = self.state {
            if now_ms.saturating_sub(last_fire_ms) <= self.settings.min_time_separation_ms() {
                trace!(now_ms, last_fire_ms, "hold-off active, skipping pass");
                return None;
            }
        }

        let window = self.tracker.snapshot();
        self.recognize(&window, now_ms)
    }

    /// Score a window against the library and resolve the vote.
    fn recognize(&mut self, window: &[FeatureVector], now_ms: u64) -> Option<GestureEvent> {
        let mut tallies: HashMap<&str, VoteTally> = HashMap::new();

        for (name, templates) in self.library.iter() {
            for template in templates {
                let d = dtw_distance(template.points(), window, self.settings.dtw_radius());
                // Both bounds exclusive: the lower bound rejects trivial
                // near-zero matches from near-static windows.
                if d > self.settings.min_dtw_threshold() && d < self.settings.max_dtw_threshold() {
                    tallies
                        .entry(name)
                        .and_modify(|t| {
                            t.votes += 1;
                            t.distance_sum += d;
                            t.best_distance = t.best_distance.min(d);
                        })
                        .or_insert(VoteTally {
                            votes: 1,
                            distance_sum: d,
                            best_distance: d,
                        });
                }
            }
        }

        let winner = Self::elect(&tallies).filter(|(_, t)| t.votes > self.settings.match_number());

        match winner {
            Some((name, tally)) => {
                self.state = RecognitionState::Holding {
                    last_fire_ms: now_ms,
                };
                let event = GestureEvent {
                    gesture: name.to_owned(),
                    votes: tally.votes,
                    best_distance: tally.best_distance,
                    timestamp: Utc::now(),
                };
                debug!(
                    gesture = %event.gesture,
                    votes = event.votes,
                    best_distance = event.best_distance,
                    "gesture recognized"
                );
                for listener in self.gesture_listeners.snapshot() {
                    listener.on_gesture_recognized(&event);
                }
                Some(event)
            }
            None => {
                self.state = RecognitionState::Idle;
                None
            }
        }
    }

    /// Pick the winning tally: most votes, then lowest summed distance,
    /// then lexicographically smallest name. Deterministic regardless of
    /// map iteration order.
    fn elect<'a>(tallies: &HashMap<&'a str, VoteTally>) -> Option<(&'a str, VoteTally)> {
        let mut winner: Option<(&str, VoteTally)> = None;
        for (&name, &tally) in tallies {
            let better = match winner {
                None => true,
                Some((best_name, best)) => {
                    tally.votes > best.votes
                        || (tally.votes == best.votes && tally.distance_sum < best.distance_sum)
                        || (tally.votes == best.votes
                            && tally.distance_sum == best.distance_sum
                            && name < best_name)
                }
            };
            if better {
                winner = Some((name, tally));
            }
        }
        winner
    }

    /// Whether the recognizer currently holds a recognized gesture.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        matches!(self.state, RecognitionState::Holding { .. })
    }

    /// Frame capacity of the tracking window.
    #[must_use]
    pub fn window_length(&self) -> usize {
        self.tracker.window_length()
    }

    /// Drop buffered frames and return to the idle state.
    ///
    /// Settings, library, and listener registrations survive.
    pub fn clear(&mut self) {
        self.tracker.clear();
        self.state = RecognitionState::Idle;
    }

    /// Register a frame listener on the underlying tracker.
    pub fn add_frame_listener(&mut self, listener: Arc<dyn FrameListener>) -> ListenerKey {
        self.tracker.add_frame_listener(listener)
    }

    /// Deregister a frame listener.
    pub fn remove_frame_listener(&mut self, key: ListenerKey) -> bool {
        self.tracker.remove_frame_listener(key)
    }

    /// Register a window listener on the underlying tracker.
    pub fn add_window_listener(&mut self, listener: Arc<dyn WindowListener>) -> ListenerKey {
        self.tracker.add_window_listener(listener)
    }

    /// Deregister a window listener.
    pub fn remove_window_listener(&mut self, key: ListenerKey) -> bool {
        self.tracker.remove_window_listener(key)
    }

    fn require_repository(&self) -> CoreResult<&dyn TemplateRepository> {
        self.repository
            .as_deref()
            .ok_or_else(|| CoreError::invalid_state("repository attached", "none"))
    }
}

impl Recognition for Recognizer {
    fn load_user_profile(&mut self, name: &str) -> CoreResult<bool> {
        let repository = self.require_repository()?;
        let existed = repository.load_or_create_user(name)?;
        let settings = repository.recognition_settings()?;
        settings.validate(self.tracker.window_length())?;
        let library = repository.dataset_for_recognition()?;

        self.settings = settings;
        self.library = library;
        self.state = RecognitionState::Idle;
        debug!(user = name, existed, "user profile activated");
        Ok(existed)
    }

    fn user_name(&self) -> Option<String> {
        self.repository.as_deref().and_then(TemplateRepository::user_name)
    }

    fn gesture_names(&self) -> CoreResult<Vec<String>> {
        Ok(self.library.names())
    }

    fn gesture_dataset(&self, name: &str) -> CoreResult<Vec<GestureTemplate>> {
        self.library
            .templates(name)
            .map(<[GestureTemplate]>::to_vec)
            .ok_or_else(|| CoreError::validation(format!("unknown gesture '{name}'")))
    }

    fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    fn save_settings(&mut self) -> CoreResult<()> {
        let repository = self.require_repository()?;
        repository.set_recognition_settings(&self.settings)?;
        Ok(())
    }

    fn set_dtw_radius(&mut self, radius: f64) -> CoreResult<()> {
        self.settings.set_dtw_radius(radius)?;
        Ok(())
    }

    fn set_min_dtw_threshold(&mut self, min: f64) -> CoreResult<()> {
        self.settings.set_min_dtw_threshold(min)?;
        Ok(())
    }

    fn set_max_dtw_threshold(&mut self, max: f64) -> CoreResult<()> {
        self.settings.set_max_dtw_threshold(max)?;
        Ok(())
    }

    fn set_update_rate(&mut self, update_rate: usize) -> CoreResult<()> {
        self.settings
            .set_update_rate(update_rate, self.tracker.window_length())?;
        Ok(())
    }

    fn set_min_time_separation_ms(&mut self, ms: u64) {
        self.settings.set_min_time_separation_ms(ms);
    }

    fn set_match_number(&mut self, count: usize) {
        self.settings.set_match_number(count);
    }

    fn add_gesture_listener(&mut self, listener: Arc<dyn GestureListener>) -> ListenerKey {
        self.gesture_listeners.add(listener)
    }

    fn remove_gesture_listener(&mut self, key: ListenerKey) -> bool {
        self.gesture_listeners.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(votes: usize, sum: f64) -> VoteTally {
        VoteTally {
            votes,
            distance_sum: sum,
            best_distance: sum,
        }
    }

    #[test]
    fn elect_prefers_vote_count() {
        let mut tallies = HashMap::new();
        tallies.insert("wave", tally(3, 30.0));
        tallies.insert("circle", tally(2, 2.0));
        let (name, _) = Recognizer::elect(&tallies).unwrap();
        assert_eq!(name, "wave");
    }

    #[test]
    fn elect_breaks_vote_ties_by_distance_sum() {
        let mut tallies = HashMap::new();
        tallies.insert("wave", tally(2, 11.0));
        tallies.insert("circle", tally(2, 7.0));
        let (name, _) = Recognizer::elect(&tallies).unwrap();
        assert_eq!(name, "circle");
    }

    #[test]
    fn elect_breaks_exact_ties_by_name() {
        let mut tallies = HashMap::new();
        tallies.insert("beta", tally(1, 5.0));
        tallies.insert("alpha", tally(1, 5.0));
        let (name, _) = Recognizer::elect(&tallies).unwrap();
        assert_eq!(name, "alpha");
    }

    #[test]
    fn elect_empty_is_none() {
        let tallies: HashMap<&str, VoteTally> = HashMap::new();
        assert!(Recognizer::elect(&tallies).is_none());
    }

    #[test]
    fn constructor_validates_settings_against_window() {
        let mut settings = RecognitionSettings::default();
        settings.set_update_rate(6, 30).unwrap();
        // 6 divides 30 but not 20
        let config = RecognizerConfig {
            window_length: 20,
            settings,
        };
        assert!(Recognizer::new(config).is_err());
    }

    #[test]
    fn update_rate_setter_validates_against_window() {
        let mut recognizer = Recognizer::new(RecognizerConfig::default()).unwrap();
        assert!(recognizer.set_update_rate(5).is_ok());
        assert!(recognizer.set_update_rate(7).is_err());
        assert_eq!(recognizer.settings().update_rate(), 5);
    }

    #[test]
    fn profile_operations_require_repository() {
        let mut recognizer = Recognizer::new(RecognizerConfig::default()).unwrap();
        assert!(recognizer.load_user_profile("ada").is_err());
        assert!(recognizer.save_settings().is_err());
        assert!(recognizer.user_name().is_none());
    }
}
