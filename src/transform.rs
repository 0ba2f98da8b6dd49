//! Rigid 3D transforms and the frame-lookup service seam.
//!
//! The layer never talks to a transform buffer directly. It goes through the
//! [`TransformSource`] trait, which resolves a rigid transform between two
//! frames at a given time, or fails. The drift-correction variant
//! [`TransformSource::lookup_with_anchor`] takes an explicit fixed-frame
//! interpolation anchor and two timestamps, so the same logic works whether
//! the working frame is a drifting odometry frame or the fixed frame itself.

use std::collections::HashMap;
use std::time::Duration;

use glam::{EulerRot, Quat, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transform lookup failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Requested frame pair has no data.
    #[error("Frame not available: {0}")]
    FrameUnavailable(String),

    /// Requested time is outside the buffered range.
    #[error("Extrapolation beyond buffered range at {time_us}us")]
    Extrapolation {
        /// Requested lookup time in microseconds
        time_us: u64,
    },

    /// Lookup did not resolve within the bounded wait.
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// A rigid body transform: rotation (quaternion) + translation.
///
/// Maps points expressed in the source frame into the target frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Rotation component
    pub rotation: Quat,
    /// Translation component in meters
    pub translation: Vec3,
}

impl Transform3D {
    /// Identity transform (no rotation or translation).
    #[inline]
    pub const fn identity() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }

    /// Transform with only translation.
    #[inline]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation,
        }
    }

    /// Transform with only rotation.
    #[inline]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            translation: Vec3::ZERO,
        }
    }

    /// Transform from rotation and translation.
    #[inline]
    pub const fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Inverse transform.
    #[inline]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            rotation: inv_rotation,
            translation: inv_rotation * (-self.translation),
        }
    }

    /// Compose two transforms: `self * other`.
    ///
    /// The result applies `other` first, then `self`.
    #[inline]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Heading about the world Z axis in radians, normalized to [-π, π].
    ///
    /// Roll and pitch are discarded; the cost grid is planar.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.rotation.to_euler(EulerRot::ZYX).0
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Frame-lookup service.
///
/// Implementations resolve rigid transforms between named frames at given
/// times. A real deployment backs this with a transform buffer fed by
/// localization; tests and playback use [`StaticTransformSource`].
pub trait TransformSource: Send + Sync {
    /// Resolve the transform mapping `source_frame` into `target_frame`,
    /// evaluated at `time_us`.
    fn lookup(
        &self,
        target_frame: &str,
        source_frame: &str,
        time_us: u64,
    ) -> Result<Transform3D, TransformError>;

    /// Resolve the transform mapping `source_frame` at `source_time_us` into
    /// `target_frame` at `target_time_us`, interpolating through
    /// `fixed_frame`.
    ///
    /// Waits at most `timeout` for the transform to become available. The
    /// anchor frame isolates "how much did localization correct itself since
    /// capture" from "how much did the robot move since capture".
    fn lookup_with_anchor(
        &self,
        target_frame: &str,
        target_time_us: u64,
        source_frame: &str,
        source_time_us: u64,
        fixed_frame: &str,
        timeout: Duration,
    ) -> Result<Transform3D, TransformError>;
}

/// Table-backed transform source.
///
/// Holds one transform per (target, source) frame pair, independent of time.
/// `target == source` always resolves to identity. Used by tests and offline
/// playback where frames do not move between lookups.
#[derive(Debug, Default)]
pub struct StaticTransformSource {
    transforms: RwLock<HashMap<(String, String), Transform3D>>,
}

impl StaticTransformSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transform mapping `source_frame` into `target_frame`.
    pub fn set(&self, target_frame: &str, source_frame: &str, transform: Transform3D) {
        self.transforms
            .write()
            .insert((target_frame.to_string(), source_frame.to_string()), transform);
    }

    /// Remove the transform for a frame pair.
    pub fn remove(&self, target_frame: &str, source_frame: &str) {
        self.transforms
            .write()
            .remove(&(target_frame.to_string(), source_frame.to_string()));
    }
}

impl TransformSource for StaticTransformSource {
    fn lookup(
        &self,
        target_frame: &str,
        source_frame: &str,
        _time_us: u64,
    ) -> Result<Transform3D, TransformError> {
        if target_frame == source_frame {
            return Ok(Transform3D::identity());
        }
        self.transforms
            .read()
            .get(&(target_frame.to_string(), source_frame.to_string()))
            .copied()
            .ok_or_else(|| {
                TransformError::FrameUnavailable(format!("{target_frame} <- {source_frame}"))
            })
    }

    fn lookup_with_anchor(
        &self,
        target_frame: &str,
        target_time_us: u64,
        source_frame: &str,
        source_time_us: u64,
        fixed_frame: &str,
        _timeout: Duration,
    ) -> Result<Transform3D, TransformError> {
        // source -> fixed at source time, then fixed -> target at target time
        let to_fixed = self.lookup(fixed_frame, source_frame, source_time_us)?;
        let to_target = self.lookup(target_frame, fixed_frame, target_time_us)?;
        Ok(to_target.compose(&to_fixed))
    }
}
