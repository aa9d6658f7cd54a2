//! Glasses model catalog
//!
//! Resolves display names to the three variant meshes on disk. The catalog
//! file is a JSON object mapping display names to file stems; each stem
//! must have `<stem>_front.glb`, `<stem>_left.glb`, and `<stem>_right.glb`
//! next to it. Incomplete models fail catalog load up front rather than
//! surfacing as a missing mesh the first time that variant is selected.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::GlassesConfig;
use crate::error::{AssetError, LunetteError};
use crate::scene::Variant;

/// One glasses model with its variant meshes resolved on disk.
#[derive(Debug, Clone)]
pub struct GlassesModel {
    /// Display name from the catalog
    name: String,
    /// File stem shared by the variant meshes
    stem: String,
    /// Variant mesh paths, one per variant
    paths: HashMap<Variant, PathBuf>,
}

impl GlassesModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// On-disk path of one variant mesh.
    pub fn path(&self, variant: Variant) -> &Path {
        &self.paths[&variant]
    }

    /// URL path the viewer loads this variant from.
    pub fn url_path(&self, variant: Variant) -> String {
        format!("/assets/{}_{}.glb", self.stem, variant.as_str())
    }
}

/// Catalog of available glasses models
#[derive(Debug, Clone)]
pub struct GlassesCatalog {
    base_dir: PathBuf,
    models: HashMap<String, GlassesModel>,
    default_model: String,
}

impl GlassesCatalog {
    /// Load the catalog and resolve every model's variant meshes.
    pub fn load(config: &GlassesConfig) -> Result<Self, LunetteError> {
        let base_dir = if config.assets_dir.is_absolute() {
            config.assets_dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&config.assets_dir)
        };

        let catalog_path = base_dir.join(&config.catalog_file);
        let contents = std::fs::read_to_string(&catalog_path).map_err(|e| {
            AssetError::CatalogRead(format!("{}: {}", catalog_path.display(), e))
        })?;

        let entries: HashMap<String, String> = serde_json::from_str(&contents)
            .map_err(|e| AssetError::CatalogParse(e.to_string()))?;

        if entries.is_empty() {
            return Err(AssetError::EmptyCatalog.into());
        }

        let mut models = HashMap::new();
        for (name, stem) in entries {
            let mut paths = HashMap::new();
            for variant in Variant::ALL {
                let path = base_dir.join(format!("{}_{}.glb", stem, variant.as_str()));
                if !path.exists() {
                    return Err(AssetError::VariantMissing {
                        model: name,
                        variant: variant.to_string(),
                        path: path.display().to_string(),
                    }
                    .into());
                }
                paths.insert(variant, path);
            }

            tracing::debug!("Loaded glasses model: {} ({})", name, stem);
            models.insert(name.clone(), GlassesModel { name, stem, paths });
        }

        let default_model = match &config.default_model {
            Some(name) => {
                if !models.contains_key(name) {
                    return Err(AssetError::ModelNotFound(name.clone()).into());
                }
                name.clone()
            }
            // First name in sorted order, for a stable default
            None => {
                let mut names: Vec<&String> = models.keys().collect();
                names.sort();
                names[0].clone()
            }
        };

        tracing::info!(
            "Glasses catalog loaded: {} models, default {}",
            models.len(),
            default_model
        );

        Ok(Self {
            base_dir,
            models,
            default_model,
        })
    }

    /// Look up a model by display name.
    pub fn get(&self, name: &str) -> Option<&GlassesModel> {
        self.models.get(name)
    }

    /// All display names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// The model active at startup.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Directory the variant meshes are served from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_model_files(dir: &Path, stem: &str) {
        for variant in Variant::ALL {
            std::fs::write(
                dir.join(format!("{}_{}.glb", stem, variant.as_str())),
                b"glTF",
            )
            .unwrap();
        }
    }

    fn create_test_catalog() -> (TempDir, GlassesConfig) {
        let dir = TempDir::new().unwrap();

        std::fs::write(
            dir.path().join("models.json"),
            r#"{"Aviator": "aviator", "Round": "round"}"#,
        )
        .unwrap();
        write_model_files(dir.path(), "aviator");
        write_model_files(dir.path(), "round");

        let config = GlassesConfig {
            assets_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        (dir, config)
    }

    #[test]
    fn test_catalog_load() {
        let (_dir, config) = create_test_catalog();
        let catalog = GlassesCatalog::load(&config).unwrap();

        assert_eq!(catalog.names(), vec!["Aviator", "Round"]);
        let model = catalog.get("Aviator").unwrap();
        assert_eq!(model.stem(), "aviator");
        assert!(model.path(Variant::Left).exists());
    }

    #[test]
    fn test_default_model_is_first_sorted_name() {
        let (_dir, config) = create_test_catalog();
        let catalog = GlassesCatalog::load(&config).unwrap();
        assert_eq!(catalog.default_model(), "Aviator");
    }

    #[test]
    fn test_configured_default_model() {
        let (_dir, mut config) = create_test_catalog();
        config.default_model = Some("Round".to_string());

        let catalog = GlassesCatalog::load(&config).unwrap();
        assert_eq!(catalog.default_model(), "Round");
    }

    #[test]
    fn test_unknown_default_model_rejected() {
        let (_dir, mut config) = create_test_catalog();
        config.default_model = Some("Cat-Eye".to_string());

        let err = GlassesCatalog::load(&config).unwrap_err();
        assert!(matches!(
            err,
            LunetteError::Asset(AssetError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_missing_variant_mesh_rejected() {
        let (dir, config) = create_test_catalog();
        std::fs::remove_file(dir.path().join("round_right.glb")).unwrap();

        let err = GlassesCatalog::load(&config).unwrap_err();
        match err {
            LunetteError::Asset(AssetError::VariantMissing { model, variant, .. }) => {
                assert_eq!(model, "Round");
                assert_eq!(variant, "right");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("models.json"), "{}").unwrap();

        let config = GlassesConfig {
            assets_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = GlassesCatalog::load(&config).unwrap_err();
        assert!(matches!(err, LunetteError::Asset(AssetError::EmptyCatalog)));
    }

    #[test]
    fn test_url_path() {
        let (_dir, config) = create_test_catalog();
        let catalog = GlassesCatalog::load(&config).unwrap();
        let model = catalog.get("Round").unwrap();

        assert_eq!(model.url_path(Variant::Front), "/assets/round_front.glb");
        assert_eq!(model.url_path(Variant::Right), "/assets/round_right.glb");
    }
}
