//! 68-point facial landmark layout and pose-sample extraction.
//!
//! The detector reports the standard 68-point layout: a 17-point jaw
//! outline at indices 0..17 and six-point eye rings at 36..42 (left) and
//! 42..48 (right). The pose math only consumes the two eye centers and the
//! two jaw outline endpoints.

use glam::Vec2;
use std::ops::Range;

use crate::error::TrackingError;
use crate::pose::PoseSample;

/// Number of points in the landmark layout
pub const LANDMARK_COUNT: usize = 68;

const JAW: Range<usize> = 0..17;
const LEFT_EYE: Range<usize> = 36..42;
const RIGHT_EYE: Range<usize> = 42..48;

/// One face's landmark set in a known coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Vec2>,
}

impl FaceLandmarks {
    /// Build from a full 68-point set.
    pub fn new(points: Vec<Vec2>) -> Result<Self, TrackingError> {
        if points.len() != LANDMARK_COUNT {
            return Err(TrackingError::LandmarkCount {
                expected: LANDMARK_COUNT,
                got: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Build from raw `[x, y]` pairs as they arrive on the wire.
    pub fn from_pairs(pairs: &[[f32; 2]]) -> Result<Self, TrackingError> {
        Self::new(pairs.iter().map(|p| Vec2::new(p[0], p[1])).collect())
    }

    fn centroid(&self, range: Range<usize>) -> Vec2 {
        let slice = &self.points[range];
        slice.iter().copied().sum::<Vec2>() / slice.len() as f32
    }

    /// Left eye center: average of the six left eye-ring points.
    pub fn left_eye_center(&self) -> Vec2 {
        self.centroid(LEFT_EYE)
    }

    /// Right eye center: average of the six right eye-ring points.
    pub fn right_eye_center(&self) -> Vec2 {
        self.centroid(RIGHT_EYE)
    }

    /// Jaw outline endpoints: leftmost and rightmost points of the outline.
    pub fn jaw_endpoints(&self) -> [Vec2; 2] {
        [self.points[JAW.start], self.points[JAW.end - 1]]
    }

    /// Rescale from the detector's frame space into the display surface.
    pub fn rescaled(&self, source: Vec2, display: Vec2) -> Self {
        let scale = display / source;
        Self {
            points: self.points.iter().map(|p| *p * scale).collect(),
        }
    }

    /// Extract the landmark subset the pose mapper consumes.
    pub fn pose_sample(&self) -> PoseSample {
        PoseSample {
            left_eye: self.left_eye_center(),
            right_eye: self.right_eye_center(),
            jaw: self.jaw_endpoints(),
        }
    }
}
