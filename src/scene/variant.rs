//! Glasses mesh variants and the yaw-based selection policy.

use serde::{Deserialize, Serialize};

/// Yaw at the center of the front-facing band, in radians.
const FRONT_BAND_CENTER: f32 = 0.06;
/// Half-width of the front-facing band, in radians.
const FRONT_BAND_HALF_WIDTH: f32 = 0.05;

/// One of the three pre-authored perspectives of a glasses model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Head facing the camera
    Front,
    /// Head turned left
    Left,
    /// Head turned right
    Right,
}

impl Default for Variant {
    fn default() -> Self {
        Self::Front
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Variant {
    pub const ALL: [Variant; 3] = [Self::Front, Self::Left, Self::Right];

    /// Select the variant for a yaw angle.
    ///
    /// Total over all f32 values: NaN fails both comparisons and falls
    /// through to `Right`. The band is asymmetric around zero and applies
    /// no hysteresis; every cycle reselects from scratch.
    pub fn select(yaw: f32) -> Self {
        if (yaw - FRONT_BAND_CENTER).abs() < FRONT_BAND_HALF_WIDTH {
            Self::Front
        } else if yaw > FRONT_BAND_CENTER {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Stable lowercase name, also the mesh file-stem suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}
