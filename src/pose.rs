//! Landmark-to-pose mapping.
//!
//! Converts one detection cycle's eye and jaw landmarks into the rotation,
//! translation, and depth offset applied to the glasses mesh. Every
//! derivation is plain trigonometry over four points; nothing is smoothed
//! or clamped, so each cycle snaps directly to the newly computed pose.
//!
//! Degenerate geometry (coincident eyes, swapped points) produces NaN or
//! infinite components that flow through unchecked. Downstream consumers
//! apply them verbatim; the next valid sample self-corrects.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Pixels of eye-to-jaw vertical offset per pi radians of pitch.
const PITCH_SPAN: f32 = 450.0;
/// Pixels of left/right face-span asymmetry per pi radians of yaw.
const YAW_SPAN: f32 = 550.0;
/// Inter-eye distance in pixels at the reference face-to-camera distance.
const NEUTRAL_EYE_SPAN: f32 = 160.0;
/// Pixels of inter-eye distance per world unit of depth offset.
const DEPTH_SCALE: f32 = 2.0;

/// The minimal landmark subset one pose is computed from.
///
/// All four points must come from the same detected face in the same frame,
/// in display pixel space. No validation happens here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Left eye center (average of the six eye-ring points)
    pub left_eye: Vec2,
    /// Right eye center
    pub right_eye: Vec2,
    /// Jaw outline endpoints: leftmost, rightmost
    pub jaw: [Vec2; 2],
}

/// Render-ready transform for the glasses mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseParameters {
    /// Rotation around x/y/z in radians (pitch, yaw, roll)
    pub rotation: Vec3,
    /// Translation in world units
    pub position: Vec2,
    /// Depth offset in world units; zero at the reference distance
    pub depth: f32,
}

/// Pitch (nod) from the vertical offset between the left eye and the
/// leftmost jaw point. Unbounded for degenerate input.
pub fn pitch(sample: &PoseSample) -> f32 {
    (sample.left_eye.y - sample.jaw[0].y) * PI / PITCH_SPAN
}

/// Yaw (head turn) from the asymmetry between the left and right
/// face-to-jaw horizontal spans. The leading negation makes a rightward
/// turn rotate the mesh the way the mirror image suggests; do not drop it.
pub fn yaw(sample: &PoseSample) -> f32 {
    let span_asymmetry =
        (sample.jaw[0].x - sample.left_eye.x) - (sample.right_eye.x - sample.jaw[1].x);
    -span_asymmetry * PI / YAW_SPAN
}

/// Roll from the eye-line slope. NaN when the eyes coincide or noisy
/// landmarks push the ratio outside [-1, 1].
pub fn roll(sample: &PoseSample) -> f32 {
    let eye_span = sample.left_eye.distance(sample.right_eye);
    -((sample.right_eye.y - sample.left_eye.y) / eye_span).asin()
}

/// Depth offset from the inter-eye distance. Zero at the reference span,
/// growing as the face approaches the camera.
pub fn depth_offset(sample: &PoseSample) -> f32 {
    (sample.left_eye.distance(sample.right_eye) - NEUTRAL_EYE_SPAN) / DEPTH_SCALE
}

/// Maps pose samples into render transforms for a fixed display surface.
///
/// The translation mapping is a linear pixel-to-percent transform with a
/// vertical flip: image y grows downward, world y grows upward.
#[derive(Debug, Clone, Copy)]
pub struct PoseMapper {
    surface: Vec2,
}

impl PoseMapper {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: Vec2::new(width as f32, height as f32),
        }
    }

    /// Compute the full transform for one sample.
    pub fn map(&self, sample: &PoseSample) -> PoseParameters {
        let face_center = (sample.left_eye + sample.right_eye) / 2.0;

        PoseParameters {
            rotation: Vec3::new(pitch(sample), yaw(sample), roll(sample)),
            position: Vec2::new(
                face_center.x / self.surface.x * 100.0 - 50.0,
                -face_center.y / self.surface.y * 100.0 + 72.0,
            ),
            depth: depth_offset(sample),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn sample(left: (f32, f32), right: (f32, f32), jaw_l: (f32, f32), jaw_r: (f32, f32)) -> PoseSample {
        PoseSample {
            left_eye: Vec2::new(left.0, left.1),
            right_eye: Vec2::new(right.0, right.1),
            jaw: [Vec2::new(jaw_l.0, jaw_l.1), Vec2::new(jaw_r.0, jaw_r.1)],
        }
    }

    /// Eyes (300,280)/(420,280), jaw (280,400)/(440,400): a level,
    /// symmetric face 120 px across the eyes.
    fn level_face() -> PoseSample {
        sample((300.0, 280.0), (420.0, 280.0), (280.0, 400.0), (440.0, 400.0))
    }

    #[test]
    fn test_level_eyes_have_zero_roll() {
        assert_eq!(roll(&level_face()), 0.0);
    }

    #[test]
    fn test_reference_eye_span_has_zero_depth() {
        let s = sample((280.0, 280.0), (440.0, 280.0), (260.0, 400.0), (460.0, 400.0));
        assert_eq!(s.left_eye.distance(s.right_eye), 160.0);
        assert_eq!(depth_offset(&s), 0.0);
    }

    #[test]
    fn test_depth_monotonic_in_eye_span() {
        let mut previous = f32::NEG_INFINITY;
        for span in [40.0, 80.0, 120.0, 160.0, 200.0, 320.0] {
            let s = sample((300.0, 280.0), (300.0 + span, 280.0), (280.0, 400.0), (460.0, 400.0));
            let depth = depth_offset(&s);
            assert!(
                depth > previous,
                "depth must grow with eye span: {} -> {}",
                previous,
                depth
            );
            previous = depth;
        }
    }

    #[test]
    fn test_symmetric_face_scenario() {
        let s = level_face();

        assert_eq!(s.left_eye.distance(s.right_eye), 120.0);
        assert_eq!(depth_offset(&s), -20.0);
        assert_eq!(roll(&s), 0.0);
        // Both face-to-jaw spans are 20 px, so the asymmetry cancels
        assert_eq!(yaw(&s), 0.0);

        // Neutral yaw sits below the asymmetric front band, which is
        // centered at 0.06 rather than zero
        assert_eq!(
            crate::scene::Variant::select(yaw(&s)),
            crate::scene::Variant::Right
        );
    }

    #[test]
    fn test_pitch_sign_follows_eye_above_jaw() {
        let s = level_face();
        // Eye above jaw: negative offset, negative pitch
        let expected = (280.0 - 400.0) * PI / 450.0;
        assert!((pitch(&s) - expected).abs() < 1e-6);
        assert!(pitch(&s) < 0.0);
    }

    #[test]
    fn test_yaw_sign_on_right_turn() {
        // Turning right compresses the right face-to-jaw span: the right
        // jaw endpoint pulls toward the right eye.
        let s = sample((300.0, 280.0), (420.0, 280.0), (280.0, 400.0), (425.0, 400.0));
        let asymmetry = (280.0 - 300.0) - (420.0 - 425.0); // -20 - (-5) = -15
        let expected = -asymmetry * PI / 550.0;
        assert!((yaw(&s) - expected).abs() < 1e-6);
        assert!(yaw(&s) > 0.0);
    }

    #[test]
    fn test_max_roll_edge_case() {
        // dy == inter-eye distance: eyes stacked vertically, the asin
        // argument hits exactly 1
        let s = sample((300.0, 280.0), (300.0, 400.0), (280.0, 400.0), (440.0, 400.0));
        let r = roll(&s);
        assert!((r - (-FRAC_PI_2)).abs() < 1e-6, "expected -pi/2, got {}", r);
    }

    #[test]
    fn test_coincident_eyes_yield_nan_without_panic() {
        let s = sample((300.0, 280.0), (300.0, 280.0), (280.0, 400.0), (440.0, 400.0));
        assert!(roll(&s).is_nan());
        // Zero span: depth is finite but the roll ratio is 0/0
        assert_eq!(depth_offset(&s), (0.0 - 160.0) / 2.0);

        let params = PoseMapper::new(720, 560).map(&s);
        assert!(params.rotation.z.is_nan());
        assert!(params.position.x.is_finite());
    }

    #[test]
    fn test_mapper_recovers_after_degenerate_sample() {
        let mapper = PoseMapper::new(720, 560);

        let degenerate = sample((300.0, 280.0), (300.0, 280.0), (280.0, 400.0), (440.0, 400.0));
        assert!(mapper.map(&degenerate).rotation.z.is_nan());

        // Pure function: the next valid sample is unaffected
        let params = mapper.map(&level_face());
        assert!(params.rotation.z == 0.0);
        assert!(params.position.x.is_finite() && params.position.y.is_finite());
    }

    #[test]
    fn test_position_mapping_on_default_surface() {
        let mapper = PoseMapper::new(720, 560);
        let params = mapper.map(&level_face());

        // Face center (360, 280): dead center horizontally, mid-height
        assert!((params.position.x - 0.0).abs() < 1e-5);
        assert!((params.position.y - 22.0).abs() < 1e-4);
    }

    #[test]
    fn test_position_vertical_flip() {
        let mapper = PoseMapper::new(720, 560);

        let high = sample((300.0, 100.0), (420.0, 100.0), (280.0, 220.0), (440.0, 220.0));
        let low = sample((300.0, 460.0), (420.0, 460.0), (280.0, 540.0), (440.0, 540.0));

        // Higher in the image means higher in world space
        assert!(mapper.map(&high).position.y > mapper.map(&low).position.y);
    }
}
