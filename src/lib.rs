//! Lunette - Virtual Glasses Try-On Service
//!
//! A modular Rust service that:
//! - Receives facial landmark detections from an external tracker over UDP
//! - Maps eye and jaw landmarks to head pose parameters
//! - Selects the glasses mesh variant matching the head turn
//! - Streams render-ready pose frames to a browser viewer over SSE

pub mod config;
pub mod error;
pub mod output;
pub mod pose;
pub mod scene;
pub mod tracking;

pub use config::Config;
pub use error::{LunetteError, Result};

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use error::AssetError;
use output::PoseFrame;
use pose::PoseSample;
use scene::assets::GlassesCatalog;
use scene::Scene;

/// Application state shared across all components
#[derive(Debug)]
pub struct AppState {
    /// Current configuration
    pub config: RwLock<Config>,
    /// Latest pose sample; `None` while no face is present
    sample: RwLock<Option<PoseSample>>,
    /// Render scene state
    pub scene: RwLock<Scene>,
    /// Glasses model catalog (immutable after startup)
    pub catalog: GlassesCatalog,
    /// Display name of the active glasses model
    active_model: RwLock<String>,
    /// Channel for pose frame broadcasts
    frame_tx: broadcast::Sender<PoseFrame>,
    /// Shutdown signal
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Create a new application state with the given configuration and
    /// loaded catalog
    pub fn new(config: Config, catalog: GlassesCatalog) -> Arc<Self> {
        let (frame_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        let active_model = catalog.default_model().to_string();

        Arc::new(Self {
            config: RwLock::new(config),
            sample: RwLock::new(None),
            scene: RwLock::new(Scene::new()),
            catalog,
            active_model: RwLock::new(active_model),
            frame_tx,
            shutdown_tx,
        })
    }

    /// Publish the latest detection result. `None` signals face absence;
    /// the render loop idles until a sample returns.
    pub async fn set_sample(&self, sample: Option<PoseSample>) {
        let mut current = self.sample.write().await;
        *current = sample;
    }

    /// Get the latest pose sample, which may be stale between detection
    /// ticks
    pub async fn get_sample(&self) -> Option<PoseSample> {
        *self.sample.read().await
    }

    /// Broadcast a pose frame to all viewers
    pub fn publish_frame(&self, frame: PoseFrame) {
        let _ = self.frame_tx.send(frame);
    }

    /// Subscribe to pose frames
    pub fn subscribe_frames(&self) -> broadcast::Receiver<PoseFrame> {
        self.frame_tx.subscribe()
    }

    /// Get the active glasses model name
    pub async fn active_model(&self) -> String {
        self.active_model.read().await.clone()
    }

    /// Switch the active glasses model, validated against the catalog
    pub async fn set_active_model(&self, name: &str) -> Result<()> {
        if self.catalog.get(name).is_none() {
            return Err(AssetError::ModelNotFound(name.to_string()).into());
        }
        let mut current = self.active_model.write().await;
        *current = name.to_string();
        Ok(())
    }

    /// Subscribe to shutdown signal
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tempfile::TempDir;

    fn test_state() -> (TempDir, Arc<AppState>) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("models.json"), r#"{"Aviator": "aviator"}"#).unwrap();
        for variant in scene::Variant::ALL {
            std::fs::write(
                dir.path().join(format!("aviator_{}.glb", variant.as_str())),
                b"glTF",
            )
            .unwrap();
        }

        let mut config = Config::default();
        config.glasses.assets_dir = dir.path().to_path_buf();
        let catalog = GlassesCatalog::load(&config.glasses).unwrap();

        (dir, AppState::new(config, catalog))
    }

    #[tokio::test]
    async fn test_sample_round_trip() {
        let (_dir, state) = test_state();
        assert!(state.get_sample().await.is_none());

        let sample = PoseSample {
            left_eye: Vec2::new(300.0, 280.0),
            right_eye: Vec2::new(420.0, 280.0),
            jaw: [Vec2::new(280.0, 400.0), Vec2::new(440.0, 400.0)],
        };
        state.set_sample(Some(sample)).await;
        assert_eq!(state.get_sample().await, Some(sample));

        // Face absence clears the sample
        state.set_sample(None).await;
        assert!(state.get_sample().await.is_none());
    }

    #[tokio::test]
    async fn test_active_model_validation() {
        let (_dir, state) = test_state();
        assert_eq!(state.active_model().await, "Aviator");

        let err = state.set_active_model("Cat-Eye").await.unwrap_err();
        assert!(matches!(
            err,
            LunetteError::Asset(AssetError::ModelNotFound(_))
        ));
        // Failed switch leaves the active model untouched
        assert_eq!(state.active_model().await, "Aviator");
    }

    #[tokio::test]
    async fn test_frame_broadcast() {
        let (_dir, state) = test_state();
        let mut rx = state.subscribe_frames();

        let frame = PoseFrame {
            model: "aviator".to_string(),
            variant: scene::Variant::Front,
            rotation: [0.0, 0.06, 0.0],
            position: [0.0, 22.0, -20.0],
        };
        state.publish_frame(frame.clone());

        assert_eq!(rx.recv().await.unwrap(), frame);
    }
}
