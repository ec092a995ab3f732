//! Configuration system
//!
//! Configuration files are loaded once at startup. Both TOML and RON are
//! accepted, selected by file extension.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its accepted range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default distance along a pick ray used to place the 2D mask sample point
pub const DEFAULT_MASK_RAY_DISTANCE: f32 = 1000.0;

/// # Partition Configuration
///
/// Tuning for culling precision, mask probing and entity node reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Also test an entity's world bounds against the frustum planes.
    ///
    /// Off by default: a visible entity is always accepted and only
    /// containers cull.
    pub precise_entity_culling: bool,
    /// Distance from the ray origin of the far point used for mask hit tests
    pub mask_ray_distance: f32,
    /// Maximum number of cleared entity nodes kept for reuse
    pub entity_pool_capacity: usize,
    /// Log filter used when the host installs the logger
    pub log_level: String,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            precise_entity_culling: false,
            mask_ray_distance: DEFAULT_MASK_RAY_DISTANCE,
            entity_pool_capacity: 64,
            log_level: "info".to_string(),
        }
    }
}

impl Config for PartitionConfig {}

impl PartitionConfig {
    /// Enable or disable precise entity culling
    pub fn with_precise_entity_culling(mut self, enabled: bool) -> Self {
        self.precise_entity_culling = enabled;
        self
    }

    /// Set the mask sample distance
    pub fn with_mask_ray_distance(mut self, distance: f32) -> Self {
        self.mask_ray_distance = distance;
        self
    }

    /// Set the entity node pool capacity
    pub fn with_entity_pool_capacity(mut self, capacity: usize) -> Self {
        self.entity_pool_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mask_ray_distance.is_finite() || self.mask_ray_distance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mask_ray_distance must be positive and finite, got {}",
                self.mask_ray_distance
            )));
        }
        Ok(())
    }
}
