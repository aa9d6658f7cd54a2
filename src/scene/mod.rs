//! Render scene state
//!
//! Owns what the viewer's scene graph mirrors: the light rig and the single
//! attached glasses node. The light rig and the glasses node are separate
//! members; swapping the glasses variant never touches the lights.

pub mod assets;
pub mod variant;

pub use variant::Variant;

use glam::Vec3;
use serde::Serialize;

use crate::pose::PoseParameters;

/// Light descriptors mirrored into the viewer scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Light {
    Ambient { color: u32, intensity: f32 },
    Point { color: u32, intensity: f32 },
}

/// The glasses node currently attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlassesNode {
    /// Which variant mesh this node holds
    pub variant: Variant,
    /// Rotation around x/y/z in radians
    pub rotation: Vec3,
    /// Position in world units; z carries the depth offset
    pub position: Vec3,
}

impl GlassesNode {
    fn new(variant: Variant) -> Self {
        Self {
            variant,
            rotation: Vec3::ZERO,
            position: Vec3::ZERO,
        }
    }
}

/// Scene state driven by the pose mapper.
///
/// Invariant: at most one glasses node is attached at any time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    lights: Vec<Light>,
    glasses: Option<GlassesNode>,
    /// Number of attach operations performed; stable while the selected
    /// variant does not change.
    #[serde(skip)]
    attach_count: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene with the standard light rig and no glasses attached.
    pub fn new() -> Self {
        Self {
            lights: vec![
                Light::Ambient {
                    color: 0xffffff,
                    intensity: 0.5,
                },
                Light::Point {
                    color: 0xffffff,
                    intensity: 0.5,
                },
            ],
            glasses: None,
            attach_count: 0,
        }
    }

    /// Apply one cycle's pose to the scene.
    ///
    /// Runs the selection policy, swaps only the glasses node when the
    /// selected variant differs from the attached one, then writes the
    /// rotation followed by the position. Returns the selected variant.
    pub fn apply(&mut self, params: &PoseParameters) -> Variant {
        // An empty scene starts from the front-facing default
        if self.glasses.is_none() {
            self.attach(Variant::default());
        }

        let selected = Variant::select(params.rotation.y);
        if self.attached() != Some(selected) {
            self.glasses = None;
            self.attach(selected);
        }

        if let Some(node) = &mut self.glasses {
            node.rotation = params.rotation;
            node.position = Vec3::new(params.position.x, params.position.y, params.depth);
        }

        selected
    }

    fn attach(&mut self, variant: Variant) {
        self.glasses = Some(GlassesNode::new(variant));
        self.attach_count += 1;
    }

    /// Variant currently attached, if any.
    pub fn attached(&self) -> Option<Variant> {
        self.glasses.as_ref().map(|n| n.variant)
    }

    /// The attached glasses node, if any.
    pub fn glasses(&self) -> Option<&GlassesNode> {
        self.glasses.as_ref()
    }

    /// The light rig.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Total attach operations so far.
    pub fn attach_count(&self) -> u64 {
        self.attach_count
    }
}
