//! Configuration for mosaic generation.

use serde::{Deserialize, Serialize};

use crate::policy::{ImageTypePolicy, TileWritingPolicy, FILL_VALUE};

/// Configuration shared by mosaic readers and writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MosaicConfig {
    /// Which tiles are written.
    pub tile_writing_policy: TileWritingPolicy,

    /// How the mosaic image type is chosen. `None` picks one after the number
    /// of reader providers, see [`ImageTypePolicy::default_for`].
    pub image_type_policy: Option<ImageTypePolicy>,

    /// Sample value treated as "no data" when detecting empty tiles.
    pub fill_value: i32,

    /// Verify that a `SUPPORTED_BY_ONE` image type holds for every tile.
    pub check_type_consistency: bool,

    /// Worker threads for existence checks (0 = one per core).
    pub check_threads: usize,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            tile_writing_policy: TileWritingPolicy::default(),
            image_type_policy: None,
            fill_value: FILL_VALUE,
            check_type_consistency: cfg!(debug_assertions),
            check_threads: 0,
        }
    }
}

impl MosaicConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparseable values are ignored and leave the default in place.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("MOSAIC_TILE_WRITING_POLICY") {
            if let Ok(policy) = val.parse() {
                config.tile_writing_policy = policy;
            }
        }

        if let Some(val) = lookup("MOSAIC_IMAGE_TYPE_POLICY") {
            if val.eq_ignore_ascii_case("auto") {
                config.image_type_policy = None;
            } else if let Ok(policy) = val.parse() {
                config.image_type_policy = Some(policy);
            }
        }

        if let Some(val) = lookup("MOSAIC_FILL_VALUE") {
            if let Ok(fill) = val.trim().parse() {
                config.fill_value = fill;
            }
        }

        if let Some(val) = lookup("MOSAIC_CHECK_TYPE_CONSISTENCY") {
            config.check_type_consistency = val.to_lowercase() == "true" || val == "1";
        }

        if let Some(val) = lookup("MOSAIC_CHECK_THREADS") {
            if let Ok(threads) = val.trim().parse() {
                config.check_threads = threads;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.check_threads > 256 {
            return Err("check_threads must be <= 256".to_string());
        }

        Ok(())
    }

    /// The configured image type policy, or the default for `provider_count`.
    pub fn image_type_policy_for(&self, provider_count: usize) -> ImageTypePolicy {
        self.image_type_policy
            .unwrap_or_else(|| ImageTypePolicy::default_for(provider_count))
    }
}
