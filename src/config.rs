//! Container configuration.
//!
//! Controls cache bound, auto-compression and the codec used on both paths.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{Codec, CodecKind, DEFAULT_ZSTD_LEVEL};
use crate::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
pub const DEFAULT_MAX_CACHED: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Maximum decompressed chunks held in memory. 0 disables caching.
    /// Default: 1000
    pub max_cached: usize,

    /// Compress the source when the index exists but the compressed artifact is missing.
    /// Default: false
    pub compress_on_open: bool,

    /// Uncompressed chunk size used when compressing.
    /// Default: 1 MB
    pub chunk_size: usize,

    /// Block codec. Must match the codec the container was written with.
    /// Default: lz4
    pub codec: CodecKind,

    /// Zstd compression level (1-22), ignored for lz4.
    /// Default: 3
    pub zstd_level: i32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_cached: DEFAULT_MAX_CACHED,
            compress_on_open: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            codec: CodecKind::default(),
            zstd_level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

impl ContainerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|err| {
            Error::InvalidConfig(format!("{}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be > 0".into()));
        }
        Ok(())
    }

    pub fn build_codec(&self) -> Box<dyn Codec> {
        self.codec.build(self.zstd_level)
    }
}
