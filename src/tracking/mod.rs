//! Tracking module
//!
//! Landmark ingestion from the external face detector:
//! - 68-point landmark layout and pose-sample extraction
//! - JSON-over-UDP detection receiver, polled on the detection timer

pub mod landmarks;
pub mod receiver;

pub use landmarks::FaceLandmarks;
pub use receiver::{DetectionData, DetectionReceiver};
