//! Generator configuration.
//!
//! Settings come from a TOML file named by `XVFS_GEN_CONFIG`; every field is
//! optional. Without the variable the defaults apply.
//!
//! ```toml
//! bucket_cap = 32
//! block_size = 8192
//! follow_symlinks = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use xvfs_core::constants::DEFAULT_BUCKET_CAP;

use crate::error::{GenError, GenResult};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "XVFS_GEN_CONFIG";

/// Default streaming block for measuring files.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Upper bound on the number of hash buckets. Trees with more records
    /// than this share buckets and lookups walk longer chains.
    pub bucket_cap: usize,
    /// Bytes read per step while loading a file.
    pub block_size: usize,
    /// Embed what symlinks point at instead of skipping them.
    pub follow_symlinks: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bucket_cap: DEFAULT_BUCKET_CAP,
            block_size: DEFAULT_BLOCK_SIZE,
            follow_symlinks: false,
        }
    }
}

impl GeneratorConfig {
    /// Parse TOML text. `origin` is only used in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> GenResult<Self> {
        let config: Self = toml::from_str(text).map_err(|source| GenError::Config {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::from_toml_str(&text, path)
    }

    /// Load from `$XVFS_GEN_CONFIG` when set, else defaults.
    pub fn from_env() -> GenResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                tracing::debug!(path = %path.display(), "loading generator config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.bucket_cap == 0 {
            return Err(GenError::InvalidConfig("bucket_cap must be at least 1".into()));
        }
        if self.block_size == 0 {
            return Err(GenError::InvalidConfig("block_size must be at least 1".into()));
        }
        Ok(())
    }
}
