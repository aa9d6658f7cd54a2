//! Output surfaces
//!
//! Streams render-ready pose frames to the browser viewer, which owns the
//! webcam and the rasterizer.

pub mod sse;
pub mod viewer;

use serde::{Deserialize, Serialize};

use crate::scene::Variant;

/// One render-ready frame broadcast to viewers.
///
/// Non-finite transform components serialize as JSON `null`; the viewer
/// applies them verbatim and recovers on the next valid frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// File stem of the active glasses model
    pub model: String,
    /// Selected mesh variant
    pub variant: Variant,
    /// Rotation around x/y/z in radians
    pub rotation: [f32; 3],
    /// Position in world units; z carries the depth offset
    pub position: [f32; 3],
}
