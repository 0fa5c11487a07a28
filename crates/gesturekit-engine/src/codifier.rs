//! Feature codification: raw sensor samples to 2D feature vectors.
//!
//! A codifier is a deterministic function of the incoming sample plus its
//! own prior state. Two codifiers ship with the engine:
//!
//! - [`SkeletonCodifier`]: tracked joint position relative to an anchor
//!   joint, projected to the X/Y plane and scaled.
//! - [`AccelerationCodifier`]: X/Y acceleration residuals over an
//!   EMA-tracked baseline, suppressing gravity and sensor drift.

use gesturekit_core::{FeatureVector, RawSample};

/// Turns raw sensor samples into 2D feature vectors.
///
/// Returns `None` for sample variants the codifier does not understand;
/// the tracker drops such samples without advancing the frame index.
pub trait FeatureCodifier: Send {
    /// Codify one raw sample.
    fn codify(&mut self, sample: &RawSample) -> Option<FeatureVector>;

    /// Discard accumulated codifier state.
    fn reset(&mut self);
}

/// Codifies skeletal-joint samples as the primary joint's offset from the
/// secondary (anchor) joint, scaled into feature space.
#[derive(Debug, Clone)]
pub struct SkeletonCodifier {
    scale: f64,
}

impl SkeletonCodifier {
    /// Create a codifier with the given feature-space scale factor.
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self {
            scale: if scale.is_finite() && scale > 0.0 {
                scale
            } else {
                1.0
            },
        }
    }

    /// Current scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for SkeletonCodifier {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FeatureCodifier for SkeletonCodifier {
    fn codify(&mut self, sample: &RawSample) -> Option<FeatureVector> {
        match sample {
            RawSample::Skeleton(s) => Some(FeatureVector::new(
                (s.primary.x - s.secondary.x) * self.scale,
                (s.primary.y - s.secondary.y) * self.scale,
            )),
            RawSample::Acceleration(_) => None,
        }
    }

    fn reset(&mut self) {}
}

/// Codifies accelerometer samples as X/Y residuals over an EMA baseline.
///
/// The baseline absorbs the static component (gravity, mounting bias) so
/// the residuals isolate deliberate motion. The first observation seeds
/// the baseline and codifies to the origin.
#[derive(Debug, Clone)]
pub struct AccelerationCodifier {
    baseline: Option<(f64, f64)>,
    /// EMA smoothing factor (lower = slower tracking, better static suppression).
    alpha: f64,
}

impl AccelerationCodifier {
    /// Create a codifier with EMA smoothing factor `alpha` in `(0, 1)`.
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self {
            baseline: None,
            alpha: alpha.clamp(0.001, 0.999),
        }
    }

    /// Current EMA smoothing factor.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for AccelerationCodifier {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl FeatureCodifier for AccelerationCodifier {
    fn codify(&mut self, sample: &RawSample) -> Option<FeatureVector> {
        let accel = match sample {
            RawSample::Acceleration(s) => s.acceleration,
            RawSample::Skeleton(_) => return None,
        };

        match self.baseline {
            Some((bx, by)) => {
                let residual = FeatureVector::new(accel.x - bx, accel.y - by);
                self.baseline = Some((
                    self.alpha * accel.x + (1.0 - self.alpha) * bx,
                    self.alpha * accel.y + (1.0 - self.alpha) * by,
                ));
                Some(residual)
            }
            None => {
                self.baseline = Some((accel.x, accel.y));
                Some(FeatureVector::ZERO)
            }
        }
    }

    fn reset(&mut self) {
        self.baseline = None;
    }
}
