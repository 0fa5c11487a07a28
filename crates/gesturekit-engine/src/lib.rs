//! Real-time DTW gesture recognition pipeline.
//!
//! Consumes a stream of skeletal-joint or accelerometer samples, buffers
//! them into a fixed-length sliding window, and periodically matches the
//! window against a per-user library of recorded gesture templates.
//!
//! # Architecture
//!
//! The pipeline processes samples through four stages:
//!
//! 1. **Codification** ([`SkeletonCodifier`] / [`AccelerationCodifier`]):
//!    raw 3D sensor samples become 2D feature vectors.
//! 2. **Tracking** ([`Tracker`]): feature vectors accumulate in a sliding
//!    window; derivative and anchor-distance signals fan out to frame
//!    listeners.
//! 3. **Matching** ([`dtw_distance`]): every `update_rate` frames the
//!    window is scored against each template under a Sakoe-Chiba band.
//! 4. **Recognition** ([`Recognizer`]): threshold filtering, majority
//!    voting with a deterministic tie-break, and hold-off debouncing
//!    decide when a [`GestureEvent`](gesturekit_core::GestureEvent) fires.
//!
//! Template libraries come from a [`TemplateRepository`]
//! (`gesturekit_core`) collaborator; [`InMemoryTemplateStore`] is the
//! bundled reference implementation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gesturekit_core::{
//!     FeatureVector, GestureTemplate, SkeletonSample, TemplateLibrary, Vector3,
//! };
//! use gesturekit_engine::{Recognizer, RecognizerConfig};
//!
//! let mut library = TemplateLibrary::new();
//! let template = GestureTemplate::new(
//!     (0..30).map(|i| FeatureVector::new(f64::from(i) * 0.1, 0.0)).collect(),
//! );
//! library.insert_template("swipe-right", template).unwrap();
//!
//! let mut recognizer = Recognizer::new(RecognizerConfig::default()).unwrap();
//! recognizer.set_template_library(Arc::new(library));
//!
//! for i in 0..30u64 {
//!     let sample = SkeletonSample {
//!         primary: Vector3::new(i as f64 * 0.1, 0.02, 1.0),
//!         secondary: Vector3::new(0.0, 0.0, 1.0),
//!         timestamp_ms: i * 33,
//!     };
//!     if let Some(event) = recognizer.on_skeleton_sample(sample) {
//!         println!("recognized {}", event.gesture);
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codifier;
pub mod dtw;
pub mod events;
pub mod recognizer;
pub mod store;
pub mod tracker;

// Re-export main types for convenience
pub use codifier::{AccelerationCodifier, FeatureCodifier, SkeletonCodifier};
pub use dtw::dtw_distance;
pub use events::ListenerSet;
pub use recognizer::{Recognizer, RecognizerConfig};
pub use store::InMemoryTemplateStore;
pub use tracker::{FrameUpdate, Tracker, TrackerConfig};

// The core contract types travel with the engine
pub use gesturekit_core::{
    CoreError, CoreResult, GestureEvent, Recognition, RecognitionSettings, TemplateRepository,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codifier::{AccelerationCodifier, FeatureCodifier, SkeletonCodifier};
    pub use crate::dtw::dtw_distance;
    pub use crate::recognizer::{Recognizer, RecognizerConfig};
    pub use crate::store::InMemoryTemplateStore;
    pub use crate::tracker::{Tracker, TrackerConfig};
    pub use gesturekit_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
