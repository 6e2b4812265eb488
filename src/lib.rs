//! Chunked compression container.
//!
//! A source file is split into fixed-size chunks that are compressed one by
//! one into a single artifact, next to a text index of compressed offsets.
//! Any logical byte range, or the file's lines, can then be read back while
//! decompressing only the chunks involved.

pub mod cache;
pub mod codec;
pub mod compress;
pub mod config;
pub mod container;
pub mod cursor;
pub mod error;
pub mod index;
pub mod lines;
pub mod observe;
pub mod paths;

pub use cache::{CacheStats, Chunk, ChunkCache};
pub use codec::{Codec, CodecKind, Lz4Codec, ZstdCodec};
pub use compress::{CompressSummary, Compressor};
pub use config::ContainerConfig;
pub use container::Container;
pub use cursor::ContainerReader;
pub use error::{Error, Result};
pub use index::ChunkIndex;
pub use lines::Lines;
pub use observe::{Event, EventSink, LogSink, NullSink};
pub use paths::ContainerPaths;
