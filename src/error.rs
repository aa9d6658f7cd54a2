//! Error types for Lunette

use thiserror::Error;

/// Main error type for Lunette
#[derive(Error, Debug)]
pub enum LunetteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Web server error: {0}")]
    Web(#[from] WebError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Landmark tracking errors
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Detection receiver error: {0}")]
    Receiver(String),

    #[error("Detection parse error: {0}")]
    Parse(String),

    #[error("Landmark set has {got} points, expected {expected}")]
    LandmarkCount { expected: usize, got: usize },
}

/// Glasses asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read model catalog: {0}")]
    CatalogRead(String),

    #[error("Failed to parse model catalog: {0}")]
    CatalogParse(String),

    #[error("Model catalog is empty")]
    EmptyCatalog,

    #[error("Model not found in catalog: {0}")]
    ModelNotFound(String),

    #[error("Model {model} is missing its {variant} mesh: {path}")]
    VariantMissing {
        model: String,
        variant: String,
        path: String,
    },
}

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    #[error("Server startup failed: {0}")]
    Startup(String),
}

/// Result type alias for Lunette operations
pub type Result<T> = std::result::Result<T, LunetteError>;
