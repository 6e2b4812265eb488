//! Structured events emitted by the compressor and the container.
//!
//! Components receive an `Arc<dyn EventSink>` instead of logging on their own.
//! [`LogSink`] forwards to the `log` facade and is what `Container::open` uses.

use std::path::Path;
use std::time::Duration;

const MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    IndexLoaded {
        path: &'a Path,
        chunks: usize,
        chunk_size: u64,
        uncompressed_len: u64,
    },
    NotCompressed {
        source: &'a Path,
    },
    AutoCompress {
        source: &'a Path,
    },
    ChunkCompressed {
        chunk: usize,
        uncompressed: usize,
        compressed: usize,
        elapsed: Duration,
        /// Bytes consumed before this chunk and time since the pass began.
        cumulative_uncompressed: u64,
        total_elapsed: Duration,
    },
    CompressFinished {
        source: Option<&'a Path>,
        chunks: usize,
        uncompressed_len: u64,
        compressed_len: u64,
        elapsed: Duration,
    },
    CacheHit {
        chunk: usize,
    },
    CacheMiss {
        chunk: usize,
    },
    CacheEvict {
        chunk: usize,
    },
    LineScanChunk {
        chunk: usize,
        len: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: &Event<'_>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &Event<'_>) {}
}

/// Renders events through `log`, tagged with a target name.
#[derive(Debug, Clone)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn for_source(source: &Path) -> Self {
        Self::new(format!("lzchunk({})", source.display()))
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("lzchunk")
    }
}

impl EventSink for LogSink {
    fn record(&self, event: &Event<'_>) {
        let target = self.target.as_str();
        match *event {
            Event::IndexLoaded {
                path,
                chunks,
                chunk_size,
                uncompressed_len,
            } => log::info!(
                target: target,
                "loaded index '{}': {chunks} chunks of {chunk_size} bytes, {uncompressed_len} bytes total",
                path.display()
            ),
            Event::NotCompressed { source } => log::error!(
                target: target,
                "the file {} is not compressed and 'compress_on_open' was not set",
                source.display()
            ),
            Event::AutoCompress { source } => {
                log::info!(target: target, "compressing {} on open", source.display())
            }
            Event::ChunkCompressed {
                chunk,
                uncompressed,
                compressed,
                elapsed,
                cumulative_uncompressed,
                total_elapsed,
            } => {
                let ratio = if uncompressed == 0 {
                    0.0
                } else {
                    100.0 * compressed as f64 / uncompressed as f64
                };
                let secs = total_elapsed.as_secs_f64();
                let throughput = if secs > 0.0 {
                    cumulative_uncompressed as f64 / secs / MB
                } else {
                    0.0
                };
                log::debug!(
                    target: target,
                    "compressed chunk {chunk}: {:.2}MB ({ratio:.1}%) in {:.3} sec, {throughput:.2} MB/s",
                    uncompressed as f64 / MB,
                    elapsed.as_secs_f64()
                );
            }
            Event::CompressFinished {
                source,
                chunks,
                uncompressed_len,
                compressed_len,
                elapsed,
            } => {
                let name = source
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "stream".to_string());
                log::info!(
                    target: target,
                    "compressed {name}: {chunks} chunks, {uncompressed_len} -> {compressed_len} bytes in {:.2} sec",
                    elapsed.as_secs_f64()
                );
            }
            Event::CacheHit { chunk } => log::trace!(target: target, "cache hit chunk {chunk}"),
            Event::CacheMiss { chunk } => log::trace!(target: target, "cache miss chunk {chunk}"),
            Event::CacheEvict { chunk } => log::trace!(target: target, "evicted chunk {chunk}"),
            Event::LineScanChunk { chunk, len } => log::debug!(
                target: target,
                "iterating over chunk {chunk} of {len} bytes"
            ),
        }
    }
}
