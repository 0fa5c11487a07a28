//! Core trait abstractions for the GestureKit engine.
//!
//! Defines the contracts between the recognition core and its
//! collaborators:
//!
//! - [`TemplateRepository`]: the persistence collaborator that owns user
//!   profiles, gesture datasets, and stored settings. The engine calls it
//!   on profile activation and explicit settings save, and never touches
//!   storage directly.
//! - [`FrameListener`], [`WindowListener`], [`GestureListener`]: observer
//!   interfaces the engine fans events out to.
//! - [`Recognition`]: the capability surface of a recognizer, kept as a
//!   trait so hosts depend on the contract rather than the concrete
//!   pipeline.

use std::sync::Arc;

use crate::error::{CoreResult, StorageError};
use crate::settings::RecognitionSettings;
use crate::types::{FeatureVector, GestureEvent, GestureTemplate, TemplateLibrary};

/// Identity handle for a registered listener, returned at registration
/// and used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

impl ListenerKey {
    /// Build a key from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw key value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Observer notified on every accepted frame.
pub trait FrameListener: Send + Sync {
    /// Called after a sample is codified and buffered.
    ///
    /// `frame_index` wraps modulo the window length; `derivative` is the
    /// difference from the previous frame and `distance` the offset from
    /// the current cycle's anchor frame.
    fn on_frame(&self, frame_index: usize, derivative: FeatureVector, distance: FeatureVector);
}

/// Observer notified when the frame buffer completes a full cycle.
pub trait WindowListener: Send + Sync {
    /// Called once per `window_length` accepted samples.
    fn on_window_ready(&self);
}

/// Observer notified when a gesture wins a recognition pass.
pub trait GestureListener: Send + Sync {
    /// Called with the winning gesture, synchronously with the pass.
    fn on_gesture_recognized(&self, event: &GestureEvent);
}

/// Persistence collaborator owning user profiles and gesture datasets.
///
/// Storage failures propagate unchanged to the caller; the engine applies
/// no retry policy of its own. Methods take `&self` so implementations can
/// be shared between the engine and a recording host; mutation is an
/// implementation concern (interior locking, file I/O, etc.).
pub trait TemplateRepository: Send + Sync {
    /// Name of the active user profile, if one is loaded.
    fn user_name(&self) -> Option<String>;

    /// Activate a user profile, creating it when absent.
    ///
    /// Returns `true` if the profile already existed.
    fn load_or_create_user(&self, name: &str) -> Result<bool, StorageError>;

    /// Snapshot of the active user's template library.
    ///
    /// The snapshot is immutable; later dataset edits produce a new
    /// snapshot rather than mutating one already handed out.
    fn dataset_for_recognition(&self) -> Result<Arc<TemplateLibrary>, StorageError>;

    /// Stored recognition settings of the active user.
    fn recognition_settings(&self) -> Result<RecognitionSettings, StorageError>;

    /// Persist recognition settings for the active user.
    fn set_recognition_settings(&self, settings: &RecognitionSettings)
        -> Result<(), StorageError>;

    /// All gesture names recorded for the active user.
    fn gesture_names(&self) -> Result<Vec<String>, StorageError>;

    /// All templates recorded for one gesture.
    fn gesture_dataset(&self, name: &str) -> Result<Vec<GestureTemplate>, StorageError>;

    /// Record a new template under a gesture name.
    fn add_template(&self, name: &str, template: GestureTemplate) -> Result<(), StorageError>;

    /// Remove a gesture and its whole dataset.
    fn remove_gesture(&self, name: &str) -> Result<(), StorageError>;

    /// Remove one template of a gesture by dataset index.
    fn remove_template(&self, name: &str, index: usize) -> Result<(), StorageError>;

    /// Delete the active user profile.
    fn delete_user(&self) -> Result<(), StorageError>;
}

impl<T: TemplateRepository + ?Sized> TemplateRepository for Arc<T> {
    fn user_name(&self) -> Option<String> {
        (**self).user_name()
    }

    fn load_or_create_user(&self, name: &str) -> Result<bool, StorageError> {
        (**self).load_or_create_user(name)
    }

    fn dataset_for_recognition(&self) -> Result<Arc<TemplateLibrary>, StorageError> {
        (**self).dataset_for_recognition()
    }

    fn recognition_settings(&self) -> Result<RecognitionSettings, StorageError> {
        (**self).recognition_settings()
    }

    fn set_recognition_settings(&self, settings: &RecognitionSettings)
        -> Result<(), StorageError> {
        (**self).set_recognition_settings(settings)
    }

    fn gesture_names(&self) -> Result<Vec<String>, StorageError> {
        (**self).gesture_names()
    }

    fn gesture_dataset(&self, name: &str) -> Result<Vec<GestureTemplate>, StorageError> {
        (**self).gesture_dataset(name)
    }

    fn add_template(&self, name: &str, template: GestureTemplate) -> Result<(), StorageError> {
        (**self).add_template(name, template)
    }

    fn remove_gesture(&self, name: &str) -> Result<(), StorageError> {
        (**self).remove_gesture(name)
    }

    fn remove_template(&self, name: &str, index: usize) -> Result<(), StorageError> {
        (**self).remove_template(name, index)
    }

    fn delete_user(&self) -> Result<(), StorageError> {
        (**self).delete_user()
    }
}

/// Capability surface of a gesture recognizer.
///
/// Configuration setters validate synchronously and take effect for the
/// next recognition pass only; a rejected call leaves settings unchanged.
pub trait Recognition {
    /// Activate a user profile through the repository collaborator,
    /// swapping in its template library and stored settings.
    ///
    /// Returns `true` if the profile already existed.
    fn load_user_profile(&mut self, name: &str) -> CoreResult<bool>;

    /// Name of the active user profile, if any.
    fn user_name(&self) -> Option<String>;

    /// Gesture names available for recognition.
    fn gesture_names(&self) -> CoreResult<Vec<String>>;

    /// Recorded templates for one gesture.
    fn gesture_dataset(&self, name: &str) -> CoreResult<Vec<GestureTemplate>>;

    /// Current recognition settings.
    fn settings(&self) -> &RecognitionSettings;

    /// Persist the current settings through the repository collaborator.
    fn save_settings(&mut self) -> CoreResult<()>;

    /// Set the DTW band radius.
    fn set_dtw_radius(&mut self, radius: f64) -> CoreResult<()>;

    /// Set the lower acceptance threshold.
    fn set_min_dtw_threshold(&mut self, min: f64) -> CoreResult<()>;

    /// Set the upper acceptance threshold.
    fn set_max_dtw_threshold(&mut self, max: f64) -> CoreResult<()>;

    /// Set the recognition update rate (frames between attempts).
    fn set_update_rate(&mut self, update_rate: usize) -> CoreResult<()>;

    /// Set the minimum re-fire gap in milliseconds.
    fn set_min_time_separation_ms(&mut self, ms: u64);

    /// Set the vote count a winner must strictly exceed.
    fn set_match_number(&mut self, count: usize);

    /// Register a gesture listener.
    fn add_gesture_listener(&mut self, listener: Arc<dyn GestureListener>) -> ListenerKey;

    /// Deregister a gesture listener. Returns `true` if it was registered.
    fn remove_gesture_listener(&mut self, key: ListenerKey) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        frames: AtomicUsize,
    }

    impl FrameListener for CountingListener {
        fn on_frame(&self, _frame_index: usize, _derivative: FeatureVector, _distance: FeatureVector) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_listener_key_roundtrip() {
        let key = ListenerKey::from_raw(42);
        assert_eq!(key.raw(), 42);
        assert_eq!(key, ListenerKey::from_raw(42));
        assert_ne!(key, ListenerKey::from_raw(43));
    }

    #[test]
    fn test_frame_listener_object_safety() {
        let listener = CountingListener {
            frames: AtomicUsize::new(0),
        };
        let dyn_listener: &dyn FrameListener = &listener;
        dyn_listener.on_frame(0, FeatureVector::ZERO, FeatureVector::ZERO);
        dyn_listener.on_frame(1, FeatureVector::ZERO, FeatureVector::ZERO);
        assert_eq!(listener.frames.load(Ordering::SeqCst), 2);
    }
}
