//! Detection receiver
//!
//! Receives JSON-over-UDP packets from the external landmark detector
//! helper. The receiver only caches the newest packet; the detection task
//! polls it on a fixed timer and the render loop re-reads the extracted
//! sample until the next poll overwrites it.

use glam::Vec2;
use serde::Deserialize;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::DetectorConfig;
use crate::error::{LunetteError, TrackingError};
use crate::pose::PoseSample;
use crate::tracking::landmarks::FaceLandmarks;

/// A single JSON packet from the detector
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionPacket {
    /// Width of the frame the detector ran on
    pub frame_width: f32,
    /// Height of the frame the detector ran on
    pub frame_height: f32,
    /// Zero or more detected faces
    pub faces: Vec<FaceDetection>,
}

/// One detected face
#[derive(Debug, Clone, Deserialize)]
pub struct FaceDetection {
    /// 68 `[x, y]` landmark points in detector frame space
    pub landmarks: Vec<[f32; 2]>,
    /// Bounding box `[x, y, width, height]`
    pub bounding_box: [f32; 4],
}

impl FaceDetection {
    /// Parse the raw point list into the typed landmark layout.
    pub fn face_landmarks(&self) -> Result<FaceLandmarks, TrackingError> {
        FaceLandmarks::from_pairs(&self.landmarks)
    }
}

/// Latest detection state
#[derive(Debug, Clone, Default)]
pub struct DetectionData {
    /// Most recently parsed packet
    pub packet: Option<DetectionPacket>,
    /// Whether any packet has been received
    pub has_data: bool,
}

impl DetectionData {
    /// Extract the pose sample for the primary face, rescaled from the
    /// detector's frame space into the display surface.
    ///
    /// Returns `Ok(None)` when no packet has arrived yet or the latest
    /// packet contains no faces.
    pub fn pose_sample(&self, display: Vec2) -> Result<Option<PoseSample>, TrackingError> {
        let Some(packet) = &self.packet else {
            return Ok(None);
        };
        let Some(face) = packet.faces.first() else {
            return Ok(None);
        };

        let marks = face
            .face_landmarks()?
            .rescaled(Vec2::new(packet.frame_width, packet.frame_height), display);

        Ok(Some(marks.pose_sample()))
    }

    /// Whether the latest packet contains at least one face.
    pub fn face_present(&self) -> bool {
        self.packet
            .as_ref()
            .is_some_and(|p| !p.faces.is_empty())
    }
}

/// JSON-over-UDP detection receiver
pub struct DetectionReceiver {
    config: DetectorConfig,
    socket: Option<UdpSocket>,
    data: Arc<RwLock<DetectionData>>,
}

impl DetectionReceiver {
    /// Create a new receiver (does not bind yet)
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            config: config.clone(),
            socket: None,
            data: Arc::new(RwLock::new(DetectionData::default())),
        }
    }

    /// Bind the UDP socket and start receiving
    pub fn start(&mut self) -> Result<(), LunetteError> {
        let addr = format!("{}:{}", self.config.listen_address, self.config.port);

        let socket = UdpSocket::bind(&addr).map_err(|e| {
            TrackingError::Receiver(format!("Failed to bind to {}: {}", addr, e))
        })?;

        socket.set_nonblocking(true).map_err(|e| {
            TrackingError::Receiver(format!("Failed to set non-blocking: {}", e))
        })?;

        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .ok();

        tracing::info!("Detection receiver listening on {}", addr);
        self.socket = Some(socket);

        Ok(())
    }

    /// Drain pending packets (non-blocking), keeping only the newest one.
    pub async fn process(&self) -> Result<Option<DetectionData>, LunetteError> {
        let socket = match &self.socket {
            Some(s) => s,
            None => return Ok(None),
        };

        let mut buf = [0u8; 65536];
        let mut newest: Option<DetectionPacket> = None;

        loop {
            match socket.recv(&mut buf) {
                Ok(size) if size > 0 => {
                    let packet: DetectionPacket =
                        serde_json::from_slice(&buf[..size]).map_err(|e| {
                            TrackingError::Parse(format!("JSON parse error: {}", e))
                        })?;
                    newest = Some(packet);
                }
                Ok(_) => break,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    return Err(
                        TrackingError::Receiver(format!("Receive error: {}", e)).into(),
                    );
                }
            }
        }

        if let Some(packet) = newest {
            let mut data = self.data.write().await;
            data.packet = Some(packet);
            data.has_data = true;
        }

        Ok(Some(self.data.read().await.clone()))
    }

    /// Get the current detection state
    pub async fn get_data(&self) -> DetectionData {
        self.data.read().await.clone()
    }

    /// Stop the receiver
    pub fn stop(&mut self) {
        self.socket = None;
        tracing::info!("Detection receiver stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::landmarks::LANDMARK_COUNT;

    fn sample_json(face_count: usize) -> String {
        let face = serde_json::json!({
            "landmarks": vec![[10.0, 20.0]; LANDMARK_COUNT],
            "bounding_box": [5.0, 5.0, 100.0, 120.0],
        });

        serde_json::json!({
            "frame_width": 640.0,
            "frame_height": 480.0,
            "faces": vec![face; face_count],
        })
        .to_string()
    }

    #[test]
    fn test_parse_packet() {
        let pkt: DetectionPacket = serde_json::from_str(&sample_json(1)).unwrap();

        assert_eq!(pkt.frame_width, 640.0);
        assert_eq!(pkt.frame_height, 480.0);
        assert_eq!(pkt.faces.len(), 1);
        assert_eq!(pkt.faces[0].landmarks.len(), LANDMARK_COUNT);
        assert_eq!(pkt.faces[0].bounding_box[2], 100.0);
    }

    #[test]
    fn test_parse_no_face_packet() {
        let pkt: DetectionPacket = serde_json::from_str(&sample_json(0)).unwrap();
        assert!(pkt.faces.is_empty());
    }

    #[test]
    fn test_pose_sample_absent_without_face() {
        let data = DetectionData {
            packet: Some(serde_json::from_str(&sample_json(0)).unwrap()),
            has_data: true,
        };

        assert!(!data.face_present());
        let sample = data.pose_sample(Vec2::new(720.0, 560.0)).unwrap();
        assert!(sample.is_none());
    }

    #[test]
    fn test_pose_sample_rescales_to_display() {
        let data = DetectionData {
            packet: Some(serde_json::from_str(&sample_json(1)).unwrap()),
            has_data: true,
        };

        assert!(data.face_present());
        // Every landmark sits at (10, 20) in a 640x480 frame; on the
        // 720x560 display that becomes (11.25, 23.333)
        let sample = data
            .pose_sample(Vec2::new(720.0, 560.0))
            .unwrap()
            .expect("one face");
        assert!((sample.left_eye.x - 11.25).abs() < 1e-4);
        assert!((sample.left_eye.y - 20.0 * 560.0 / 480.0).abs() < 1e-3);
    }

    #[test]
    fn test_truncated_landmarks_rejected() {
        let face = serde_json::json!({
            "landmarks": vec![[10.0, 20.0]; 30],
            "bounding_box": [0.0, 0.0, 10.0, 10.0],
        });
        let json = serde_json::json!({
            "frame_width": 640.0,
            "frame_height": 480.0,
            "faces": [face],
        })
        .to_string();

        let data = DetectionData {
            packet: Some(serde_json::from_str(&json).unwrap()),
            has_data: true,
        };

        let err = data.pose_sample(Vec2::new(720.0, 560.0)).unwrap_err();
        assert!(matches!(err, TrackingError::LandmarkCount { got: 30, .. }));
    }

    #[test]
    fn test_detection_data_default() {
        let data = DetectionData::default();
        assert!(!data.has_data);
        assert!(!data.face_present());
        assert!(data.packet.is_none());
    }
}
