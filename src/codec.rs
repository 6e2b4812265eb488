//! Block codecs.
//!
//! Every chunk is compressed on its own, so a codec never carries state from
//! one block to the next. Neither the codec nor its level is recorded in the
//! index: readers must be opened with the codec the container was written with.

use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>>;

    fn decompress(&self, block: &[u8]) -> Result<Vec<u8>>;
}

/// LZ4 frame format, readable by any LZ4 frame decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::with_capacity(raw.len() / 2));
        encoder.write_all(raw)?;
        encoder.finish().map_err(|err| Error::Codec {
            codec: self.name(),
            message: err.to_string(),
        })
    }

    fn decompress(&self, block: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = lz4_flex::frame::FrameDecoder::new(block);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(|err| Error::Codec {
            codec: self.name(),
            message: err.to_string(),
        })?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        zstd::stream::encode_all(raw, self.level).map_err(|err| Error::Codec {
            codec: self.name(),
            message: err.to_string(),
        })
    }

    fn decompress(&self, block: &[u8]) -> Result<Vec<u8>> {
        zstd::stream::decode_all(block).map_err(|err| Error::Codec {
            codec: self.name(),
            message: err.to_string(),
        })
    }
}

/// Codec selector used by configuration and the CLI.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    #[default]
    Lz4,
    Zstd,
}

impl CodecKind {
    /// `level` only applies to zstd.
    pub fn build(self, level: i32) -> Box<dyn Codec> {
        match self {
            CodecKind::Lz4 => Box::new(Lz4Codec),
            CodecKind::Zstd => Box::new(ZstdCodec::new(level)),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Lz4 => f.write_str("lz4"),
            CodecKind::Zstd => f.write_str("zstd"),
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lz4" => Ok(CodecKind::Lz4),
            "zstd" | "zst" => Ok(CodecKind::Zstd),
            other => Err(Error::InvalidConfig(format!("unknown codec '{other}'"))),
        }
    }
}
