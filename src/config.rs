//! Configuration parsing and management for Lunette

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, LunetteError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub detector: DetectorConfig,
    pub render: RenderConfig,
    pub glasses: GlassesConfig,
    pub viewer: ViewerConfig,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            detector: DetectorConfig::default(),
            render: RenderConfig::default(),
            glasses: GlassesConfig::default(),
            viewer: ViewerConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LunetteError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, LunetteError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, LunetteError> {
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LunetteError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display".to_string(),
                message: "Width and height must be greater than 0".to_string(),
            }
            .into());
        }

        if self.detector.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "detector.interval_ms".to_string(),
                message: "Poll interval must be greater than 0".to_string(),
            }
            .into());
        }

        // The pose math is calibrated against detections arriving every
        // 50-100 ms; outside that band selection behavior degrades.
        if !(50..=100).contains(&self.detector.interval_ms) {
            tracing::warn!(
                "detector.interval_ms = {} is outside the calibrated 50-100 ms band",
                self.detector.interval_ms
            );
        }

        if self.render.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "render.frame_interval_ms".to_string(),
                message: "Frame interval must be greater than 0".to_string(),
            }
            .into());
        }

        if !(0.0..=1.0).contains(&self.glasses.lens.opacity) {
            return Err(ConfigError::InvalidValue {
                field: "glasses.lens.opacity".to_string(),
                message: "Opacity must be between 0.0 and 1.0".to_string(),
            }
            .into());
        }

        if !(0.0..180.0).contains(&self.viewer.camera_fov) || self.viewer.camera_fov == 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "viewer.camera_fov".to_string(),
                message: "Field of view must be in (0, 180) degrees".to_string(),
            }
            .into());
        }

        if self.http.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Display surface configuration.
///
/// The detector's landmark coordinates are rescaled into this space and the
/// viewer rasterizes at exactly this size; the position mapping constants
/// assume these proportions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 560,
        }
    }
}

/// External landmark detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// UDP port to receive detection packets on
    pub port: u16,
    /// Listen address for the UDP socket
    pub listen_address: String,
    /// Detection poll interval in milliseconds
    pub interval_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            port: 12347,
            listen_address: "127.0.0.1".to_string(),
            interval_ms: 100,
        }
    }
}

/// Render loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pose frame interval in milliseconds (~display refresh)
    pub frame_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
        }
    }
}

/// Glasses model assets configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassesConfig {
    /// Directory containing the catalog file and variant meshes
    pub assets_dir: PathBuf,
    /// Catalog file name inside the assets directory
    pub catalog_file: String,
    /// Model active at startup; defaults to the catalog's first entry
    pub default_model: Option<String>,
    /// Lens submesh material
    pub lens: LensConfig,
}

impl Default for GlassesConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("./assets/glasses"),
            catalog_file: "models.json".to_string(),
            default_model: None,
            lens: LensConfig::default(),
        }
    }
}

/// Lens submesh material applied by the viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Tint color as a hex string
    pub color: String,
    /// Opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            color: "#A4ACDD".to_string(),
            opacity: 0.4,
        }
    }
}

/// Viewer scene camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Perspective camera field of view in degrees
    pub camera_fov: f32,
    /// Camera height in world units
    pub camera_y: f32,
    /// Camera distance from the scene origin in world units
    pub camera_z: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera_fov: 50.0,
            camera_y: 30.0,
            camera_z: 70.0,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Enable HTTP server
    pub enabled: bool,
    /// HTTP server host
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_enabled: true,
        }
    }
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("lunette");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/lunette");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/lunette");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("lunette");
        }
    }

    PathBuf::from(".")
}
