//! # GestureKit Core
//!
//! Core types, traits, and settings for the GestureKit gesture
//! recognition engine.
//!
//! This crate provides the foundational building blocks used throughout
//! the GestureKit workspace:
//!
//! - **Core Data Types**: [`FeatureVector`], [`GestureTemplate`],
//!   [`TemplateLibrary`], and the raw sample types delivered by the
//!   sensor layer.
//!
//! - **Error Types**: the [`error`] module, with configuration and
//!   storage error types unified under [`CoreError`].
//!
//! - **Settings**: [`RecognitionSettings`], the validated value object
//!   tuning DTW matching, vote counting, and debounce.
//!
//! - **Traits**: the [`TemplateRepository`] persistence seam, the
//!   listener interfaces, and the [`Recognition`] capability surface.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization of domain types
//!
//! ## Example
//!
//! ```rust
//! use gesturekit_core::{FeatureVector, GestureTemplate, TemplateLibrary};
//!
//! let mut library = TemplateLibrary::new();
//! let template = GestureTemplate::new(vec![
//!     FeatureVector::new(0.0, 0.0),
//!     FeatureVector::new(0.5, 0.5),
//! ]);
//! library.insert_template("wave", template).unwrap();
//!
//! assert_eq!(library.gesture_count(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod settings;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::{ConfigError, CoreError, CoreResult, StorageError};
pub use settings::RecognitionSettings;
pub use traits::{
    FrameListener, GestureListener, ListenerKey, Recognition, TemplateRepository, WindowListener,
};
pub use types::{
    AccelerationSample, FeatureVector, GestureEvent, GestureTemplate, RawSample, SkeletonSample,
    TemplateLibrary, Vector3,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default frame window length (one second of gesture at 30 fps)
pub const DEFAULT_WINDOW_LENGTH: usize = 30;

/// Prelude module for convenient imports.
///
/// ```rust
/// use gesturekit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ConfigError, CoreError, CoreResult, StorageError};
    pub use crate::settings::RecognitionSettings;
    pub use crate::traits::{
        FrameListener, GestureListener, ListenerKey, Recognition, TemplateRepository,
        WindowListener,
    };
    pub use crate::types::{
        AccelerationSample, FeatureVector, GestureEvent, GestureTemplate, RawSample,
        SkeletonSample, TemplateLibrary, Vector3,
    };
}
