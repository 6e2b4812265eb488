use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The compressed artifact is absent and `compress_on_open` was not set.
    #[error(
        "the file {} is not compressed and 'compress_on_open' was not set",
        .0.display()
    )]
    NotCompressed(PathBuf),

    #[error("index {} not found", .0.display())]
    MissingIndex(PathBuf),

    #[error("corrupt container: {0}")]
    Format(String),

    #[error("{codec} codec error: {message}")]
    Codec {
        codec: &'static str,
        message: String,
    },

    #[error("chunk {index} out of range ({count} chunks)")]
    ChunkOutOfRange { index: usize, count: usize },

    #[error("range {start}..{end} out of bounds for length {len}")]
    OffsetOutOfRange { start: u64, end: u64, len: u64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Chunk index or logical offset outside the container.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Error::ChunkOutOfRange { .. } | Error::OffsetOutOfRange { .. }
        )
    }

    /// Index or block content that cannot be trusted.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Codec { .. })
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    pub(crate) fn poisoned(what: &str) -> Self {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{what} lock poisoned"),
        ))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
