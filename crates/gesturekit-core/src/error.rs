//! Error types for the GestureKit engine.
//!
//! This module provides error handling using [`thiserror`] for automatic
//! `Display` and `Error` trait implementations.
//!
//! # Error Hierarchy
//!
//! - [`CoreError`]: Top-level error type that encompasses all subsystem errors
//! - [`ConfigError`]: Invalid recognition or tracking configuration, rejected
//!   synchronously at the setter call with state unchanged
//! - [`StorageError`]: Errors propagated unchanged from the template
//!   repository collaborator
//!
//! Malformed input samples are not errors: they are dropped with a
//! diagnostic, and "no gesture recognized" is a normal recognition outcome.
//!
//! # Example
//!
//! ```rust
//! use gesturekit_core::error::{ConfigError, CoreError};
//!
//! fn apply_update_rate(rate: usize, window_length: usize) -> Result<(), CoreError> {
//!     Err(ConfigError::UpdateRateNotDivisor { update_rate: rate, window_length }.into())
//! }
//! ```

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Top-level error type for the GestureKit engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Configuration rejected by a validated setter
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Template repository failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation error for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },

    /// Invalid state for the requested operation
    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },
}

impl CoreError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new invalid state error.
    #[must_use]
    pub fn invalid_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Configuration and validation errors are recoverable: the caller can
    /// correct the offending value and retry, since the rejected call left
    /// state unchanged. Storage errors defer to the repository
    /// classification.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Validation { .. } => true,
            Self::Storage(e) => e.is_recoverable(),
            Self::InvalidState { .. } => false,
        }
    }
}

/// Errors raised when a configuration update fails validation.
///
/// Every variant is rejected synchronously at the setter call; the previous
/// settings remain in effect.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Update rate does not evenly divide the frame window length
    #[error("Update rate {update_rate} must evenly divide window length {window_length}")]
    UpdateRateNotDivisor {
        /// The rejected update rate
        update_rate: usize,
        /// The configured window length in frames
        window_length: usize,
    },

    /// Update rate of zero would never trigger a recognition pass
    #[error("Update rate must be positive")]
    ZeroUpdateRate,

    /// Window length of zero cannot hold any frames
    #[error("Window length must be positive")]
    ZeroWindowLength,

    /// Acceptance thresholds must satisfy min < max
    #[error("DTW thresholds out of order: min {min} must be below max {max}")]
    ThresholdOrder {
        /// The minimum acceptance threshold
        min: f64,
        /// The maximum acceptance threshold
        max: f64,
    },

    /// Sakoe-Chiba band radius must be non-negative
    #[error("DTW band radius {radius} must be non-negative")]
    NegativeRadius {
        /// The rejected radius
        radius: f64,
    },

    /// A threshold value must be a finite number
    #[error("Configuration value {name} must be finite, got {value}")]
    NonFiniteValue {
        /// Name of the rejected setting
        name: &'static str,
        /// The rejected value
        value: f64,
    },
}

/// Errors propagated from the template repository collaborator.
///
/// The engine does not retry storage operations; retry policy belongs to
/// the storage layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageError {
    /// No user profile is currently active
    #[error("No active user profile")]
    NoActiveUser,

    /// The named gesture has no recorded templates
    #[error("Gesture not found: '{name}'")]
    GestureNotFound {
        /// The missing gesture name
        name: String,
    },

    /// Template index outside the gesture's dataset
    #[error("Template index {index} out of range for gesture '{name}' ({len} templates)")]
    TemplateIndexOutOfRange {
        /// The gesture name
        name: String,
        /// The rejected index
        index: usize,
        /// Number of templates recorded for the gesture
        len: usize,
    },

    /// Gesture name failed repository validation
    #[error("Invalid gesture name: {reason}")]
    InvalidGestureName {
        /// Why the name was rejected
        reason: String,
    },

    /// User name failed repository validation
    #[error("Invalid user name: {reason}")]
    InvalidUserName {
        /// Why the name was rejected
        reason: String,
    },

    /// Serialization or deserialization failure in the backing store
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error
        message: String,
    },

    /// Backend I/O failure
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of the backend error
        message: String,
    },
}

impl StorageError {
    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Backend { .. } => true,
            Self::NoActiveUser
            | Self::GestureNotFound { .. }
            | Self::TemplateIndexOutOfRange { .. }
            | Self::InvalidGestureName { .. }
            | Self::InvalidUserName { .. }
            | Self::Serialization { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UpdateRateNotDivisor {
            update_rate: 7,
            window_length: 30,
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::ZeroUpdateRate;
        let core_err: CoreError = config_err.into();
        assert!(matches!(core_err, CoreError::Config(_)));

        let storage_err = StorageError::NoActiveUser;
        let core_err: CoreError = storage_err.into();
        assert!(matches!(core_err, CoreError::Storage(_)));
    }

    #[test]
    fn test_config_errors_recoverable() {
        let err: CoreError = ConfigError::ZeroWindowLength.into();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_storage_recoverability() {
        assert!(StorageError::backend("disk offline").is_recoverable());
        assert!(!StorageError::NoActiveUser.is_recoverable());
        assert!(!StorageError::serialization("bad json").is_recoverable());
    }

    #[test]
    fn test_threshold_order_display() {
        let err = ConfigError::ThresholdOrder { min: 10.0, max: 5.0 };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains('5'));
    }
}
